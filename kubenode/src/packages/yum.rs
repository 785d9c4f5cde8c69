use std::io::Write;

use anyhow::{Context, Result};
use tracing::{debug, info};

use super::{map_package_version, rpm, ContainerdPackages, InstallArg, KubernetesPackages, PackageRole, PackageSpec};
use crate::{
  config::YumConfig,
  error::PackageError,
  host,
  utils::{CommandExecutor, SystemExecutor},
};

/// Kubernetes node packages, in install order
const KUBERNETES_PACKAGES: [PackageRole; 4] = [
  PackageRole::Kubelet,
  PackageRole::Kubeadm,
  PackageRole::Kubectl,
  PackageRole::KubernetesCni,
];

/// kubeadm followed by the packages it depends on
const KUBEADM_PACKAGES: [PackageRole; 3] = [PackageRole::Kubeadm, PackageRole::Kubelet, PackageRole::KubernetesCni];

/// Installs packages with `yum` and verifies the result with `rpm`
pub struct YumInstaller<E = SystemExecutor> {
  executor: E,
  config: YumConfig,
}

impl YumInstaller<SystemExecutor> {
  pub fn from_config(config: YumConfig) -> Self {
    Self::new(SystemExecutor, config)
  }
}

impl<E: CommandExecutor> YumInstaller<E> {
  pub fn new(executor: E, config: YumConfig) -> Self {
    Self { executor, config }
  }

  pub fn config(&self) -> &YumConfig {
    &self.config
  }

  /// Resolve the install arguments for `roles`, followed by the flag lifting the repository exclusion
  pub fn resolve(&self, roles: &[PackageRole], kubernetes_version: &str) -> Result<Vec<InstallArg>, PackageError> {
    let mut args = roles
      .iter()
      .map(|role| map_package_version(*role, kubernetes_version, &self.config.packages).map(InstallArg::from))
      .collect::<Result<Vec<_>, _>>()?;
    args.push(InstallArg::Flag(self.config.disable_excludes_flag.clone()));

    Ok(args)
  }

  pub fn resolve_kubernetes_packages(&self, kubernetes_version: &str) -> Result<Vec<InstallArg>, PackageError> {
    self.resolve(&KUBERNETES_PACKAGES, kubernetes_version)
  }

  pub fn resolve_kubeadm_packages(&self, kubernetes_version: &str) -> Result<Vec<InstallArg>, PackageError> {
    self.resolve(&KUBEADM_PACKAGES, kubernetes_version)
  }

  /// Query the installed identities of package `name`
  pub fn query(&self, name: &str) -> Result<Vec<rpm::RpmPackage>> {
    let output = self.executor.exec(self.config.rpm_path()?, &["-q", name])?;
    Ok(rpm::parse_query_output(&output.stdout)?)
  }

  /// Same as [`query`](Self::query), forwarding the `rpm` output to `out`
  fn query_streaming(&self, name: &str, out: &mut dyn Write) -> Result<Vec<rpm::RpmPackage>> {
    let output = self
      .executor
      .exec_streaming(self.config.rpm_path()?, &["-q", name], out)?;
    Ok(rpm::parse_query_output(&output.stdout)?)
  }

  /// Install `args` in a single `yum` transaction, then verify every package against `rpm`
  ///
  /// Nothing is rolled back when verification fails
  pub fn install(&self, out: &mut dyn Write, args: &[InstallArg]) -> Result<()> {
    let args_str = args.iter().map(ToString::to_string).collect::<Vec<_>>();
    info!("Installing packages: {}", args_str.join(" "));

    let mut yum_args = vec!["install", "-y"];
    yum_args.extend(args_str.iter().map(String::as_str));
    self
      .executor
      .exec_streaming(self.config.yum_path()?, &yum_args, out)?;

    for arg in args {
      let spec = match arg {
        InstallArg::Package(spec) if !arg.is_flag() => spec,
        _ => continue,
      };
      self.verify(spec, out)?;
    }

    Ok(())
  }

  fn verify(&self, spec: &PackageSpec, out: &mut dyn Write) -> Result<()> {
    let requested = spec.to_string();
    let installed = self.query_streaming(&spec.name, out)?;

    match installed.iter().find(|pkg| pkg.matches(&requested)) {
      Some(pkg) => {
        debug!("Verified {requested} as {pkg}");
        Ok(())
      }
      None => Err(
        PackageError::VersionMismatch {
          expected: requested,
          actual: installed.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "),
        }
        .into(),
      ),
    }
  }
}

impl<E: CommandExecutor> ContainerdPackages for YumInstaller<E> {
  fn install_containerd_prerequisites(&self, out: &mut dyn Write, containerd_version: &str) -> Result<()> {
    debug!("Installing prerequisites for containerd {containerd_version}");
    let args = self
      .config
      .containerd_prerequisites
      .iter()
      .map(|name| InstallArg::from(PackageSpec::new(name)))
      .collect::<Vec<_>>();

    self
      .install(out, &args)
      .with_context(|| format!("unable to install {} package", self.config.containerd_prerequisites.join(", ")))
  }
}

impl<E: CommandExecutor> KubernetesPackages for YumInstaller<E> {
  fn install_kubernetes_prerequisites(&self, out: &mut dyn Write, kubernetes_version: &str) -> Result<()> {
    debug!("Preparing host for Kubernetes {kubernetes_version}");

    host::set_selinux_permissive(&self.executor, out, &self.config)?;
    host::swap_off(&self.executor, out, &self.config)?;
    host::load_kube_proxy_ipvs_modules(&self.executor, out, &self.config)?;
    host::sysctl_load_all_files(&self.executor, out).context("unable to load all sysctl rules from files")?;
    host::ensure_repo_file(&self.config)
  }

  fn install_kubernetes_packages(&self, out: &mut dyn Write, kubernetes_version: &str) -> Result<()> {
    let args = self.resolve_kubernetes_packages(kubernetes_version)?;
    self.install(out, &args)
  }

  fn install_kubeadm_package(&self, out: &mut dyn Write, kubernetes_version: &str) -> Result<()> {
    let args = self.resolve_kubeadm_packages(kubernetes_version)?;
    self.install(out, &args)
  }
}
