use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::Assets;

pub const REPO_TEMPLATE: &str = "kubernetes.repo";

/// Package names used for each Kubernetes package role
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageNames {
  pub kubeadm: String,
  pub kubectl: String,
  pub kubelet: String,
  pub kubernetes_cni: String,
}

impl Default for PackageNames {
  fn default() -> Self {
    Self {
      kubeadm: "kubeadm".to_string(),
      kubectl: "kubectl".to_string(),
      kubelet: "kubelet".to_string(),
      kubernetes_cni: "kubernetes-cni".to_string(),
    }
  }
}

/// Configuration for the `yum`/`rpm` backed installer
///
/// Every field has a compiled-in default; a TOML file only needs to carry the
/// values it overrides
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct YumConfig {
  /// Package manager used to install packages
  pub yum: PathBuf,

  /// Query tool used to inspect installed packages
  pub rpm: PathBuf,

  pub packages: PackageNames,

  /// Flag passed along with Kubernetes packages so the repository `exclude=kube*` is ignored
  pub disable_excludes_flag: String,

  /// Packages installed ahead of containerd
  pub containerd_prerequisites: Vec<String>,

  /// Kernel modules required by kube-proxy in IPVS mode
  pub kernel_modules: Vec<String>,

  pub selinux_config: PathBuf,
  pub fstab: PathBuf,

  /// The Kubernetes repository file is not written when this file exists
  pub alternative_repo_file: PathBuf,

  pub repo_file: PathBuf,

  /// Body of the Kubernetes repository file; the embedded template is used when unset
  #[serde(skip_serializing_if = "Option::is_none")]
  pub repo_contents: Option<String>,
}

impl Default for YumConfig {
  fn default() -> Self {
    Self {
      yum: PathBuf::from("/bin/yum"),
      rpm: PathBuf::from("/bin/rpm"),
      packages: PackageNames::default(),
      disable_excludes_flag: "--disableexcludes=kubernetes".to_string(),
      containerd_prerequisites: vec!["libseccomp".to_string()],
      kernel_modules: ["ip_vs", "ip_vs_rr", "ip_vs_wrr", "ip_vs_sh", "nf_conntrack_ipv4"]
        .iter()
        .map(|m| m.to_string())
        .collect(),
      selinux_config: PathBuf::from("/etc/selinux/config"),
      fstab: PathBuf::from("/etc/fstab"),
      alternative_repo_file: PathBuf::from("/etc/yum.repos.d/banzaicloud.repo"),
      repo_file: PathBuf::from("/etc/yum.repos.d/kubernetes.repo"),
      repo_contents: None,
    }
  }
}

impl YumConfig {
  pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
    let file = std::fs::read_to_string(path)?;
    let config: YumConfig = toml::from_str(&file)?;

    Ok(config)
  }

  /// Load the configuration from `path` when given, otherwise use the defaults
  pub fn load(path: Option<&Path>) -> Result<Self> {
    match path {
      Some(path) => Self::read(path),
      None => Ok(Self::default()),
    }
  }

  /// Contents written to the Kubernetes repository file
  pub fn repo_contents(&self) -> Result<String> {
    match &self.repo_contents {
      Some(contents) => Ok(contents.to_owned()),
      None => {
        let file = Assets::get(REPO_TEMPLATE).ok_or_else(|| anyhow!("Missing embedded {REPO_TEMPLATE} template"))?;
        Ok(std::str::from_utf8(file.data.as_ref())?.to_owned())
      }
    }
  }

  pub(crate) fn yum_path(&self) -> Result<&str> {
    path_str(&self.yum)
  }

  pub(crate) fn rpm_path(&self) -> Result<&str> {
    path_str(&self.rpm)
  }
}

pub(crate) fn path_str(path: &Path) -> Result<&str> {
  path
    .to_str()
    .ok_or_else(|| anyhow!("Path {} is not valid UTF-8", path.display()))
}
