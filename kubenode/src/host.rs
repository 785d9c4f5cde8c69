//! Host configuration steps required before the Kubernetes packages are installed
//!
//! Each step is idempotent and safe to re-run on an already prepared host

use std::io::Write;

use anyhow::Result;
use tracing::{debug, info};

use crate::{
  config::{path_str, YumConfig},
  utils::{self, CommandExecutor},
};

const SELINUX_PERMISSIVE: &str = "s/^SELINUX=enforcing$/SELINUX=permissive/";
/// Comments out every active fstab entry of type swap
const FSTAB_SWAP_OFF: &str = r"s/^\([^#].*[[:space:]]swap[[:space:]].*\)$/#\1/";

/// Put SELinux into permissive mode now and across reboots
pub fn set_selinux_permissive(exec: &dyn CommandExecutor, out: &mut dyn Write, config: &YumConfig) -> Result<()> {
  info!("Setting SELinux to permissive mode");
  exec.exec_streaming("setenforce", &["0"], out)?;
  exec.exec_streaming(
    "sed",
    &["-i", SELINUX_PERMISSIVE, path_str(&config.selinux_config)?],
    out,
  )?;

  Ok(())
}

/// Disable swap now and across reboots; the kubelet refuses to start with swap enabled
pub fn swap_off(exec: &dyn CommandExecutor, out: &mut dyn Write, config: &YumConfig) -> Result<()> {
  info!("Disabling swap");
  exec.exec_streaming("swapoff", &["-a"], out)?;
  exec.exec_streaming("sed", &["-i", FSTAB_SWAP_OFF, path_str(&config.fstab)?], out)?;

  Ok(())
}

pub fn load_kube_proxy_ipvs_modules(
  exec: &dyn CommandExecutor,
  out: &mut dyn Write,
  config: &YumConfig,
) -> Result<()> {
  for module in &config.kernel_modules {
    debug!("Loading kernel module {module}");
    exec.exec_streaming("modprobe", &[module.as_str()], out)?;
  }

  Ok(())
}

pub fn sysctl_load_all_files(exec: &dyn CommandExecutor, out: &mut dyn Write) -> Result<()> {
  exec.exec_streaming("sysctl", &["--system"], out)?;

  Ok(())
}

/// Write the Kubernetes package repository definition
///
/// Hosts that already carry the alternative repository file are left untouched
pub fn ensure_repo_file(config: &YumConfig) -> Result<()> {
  if config.alternative_repo_file.exists() {
    info!(
      "Repository file {} present, skipping {}",
      config.alternative_repo_file.display(),
      config.repo_file.display()
    );
    return Ok(());
  }

  info!("Writing repository file {}", config.repo_file.display());
  utils::write_file(config.repo_contents()?.as_bytes(), &config.repo_file, Some(0o644), false)
}

#[cfg(test)]
mod tests {
  use std::fs;

  use tempfile::tempdir;

  use super::*;
  use crate::{error::PackageError, utils::testing::FakeExecutor};

  #[test]
  fn it_sets_selinux_permissive() {
    let exec = FakeExecutor::new();
    let mut out = Vec::new();
    set_selinux_permissive(&exec, &mut out, &YumConfig::default()).unwrap();

    assert_eq!(
      exec.calls(),
      vec![
        "setenforce 0".to_string(),
        format!("sed -i {SELINUX_PERMISSIVE} /etc/selinux/config"),
      ]
    );
  }

  #[test]
  fn it_stops_on_setenforce_failure() {
    let exec = FakeExecutor::new().fail("setenforce 0", 1);
    let mut out = Vec::new();
    let err = set_selinux_permissive(&exec, &mut out, &YumConfig::default()).unwrap_err();

    assert!(matches!(
      err.downcast_ref::<PackageError>(),
      Some(PackageError::Command { .. })
    ));
    assert_eq!(exec.calls().len(), 1);
  }

  #[test]
  fn it_loads_each_kernel_module() {
    let exec = FakeExecutor::new();
    let mut out = Vec::new();
    let config = YumConfig {
      kernel_modules: vec!["ip_vs".to_string(), "ip_vs_rr".to_string()],
      ..Default::default()
    };
    load_kube_proxy_ipvs_modules(&exec, &mut out, &config).unwrap();

    assert_eq!(exec.calls(), vec!["modprobe ip_vs", "modprobe ip_vs_rr"]);
  }

  #[test]
  fn it_writes_repo_file() {
    let dir = tempdir().unwrap();
    let config = YumConfig {
      repo_file: dir.path().join("kubernetes.repo"),
      alternative_repo_file: dir.path().join("banzaicloud.repo"),
      ..Default::default()
    };
    ensure_repo_file(&config).unwrap();

    let contents = fs::read_to_string(&config.repo_file).unwrap();
    assert_eq!(contents, config.repo_contents().unwrap());
  }

  #[test]
  fn it_skips_repo_file_when_alternative_exists() {
    let dir = tempdir().unwrap();
    let config = YumConfig {
      repo_file: dir.path().join("kubernetes.repo"),
      alternative_repo_file: dir.path().join("banzaicloud.repo"),
      ..Default::default()
    };
    fs::write(&config.alternative_repo_file, "[banzaicloud]\n").unwrap();
    ensure_repo_file(&config).unwrap();

    assert!(!config.repo_file.exists());
  }
}
