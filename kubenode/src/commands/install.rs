use std::io;

use anyhow::Result;
use clap::Args;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
  config::YumConfig,
  packages::{ContainerdPackages, KubernetesPackages, YumInstaller},
};

#[derive(Args, Debug, Default, Serialize, Deserialize)]
pub struct PackagesInput {
  /// Kubernetes version the packages are pinned to
  #[arg(long)]
  pub kubernetes_version: String,

  /// Install only kubeadm and the packages it depends on (kubelet, CNI plugins)
  #[arg(long)]
  pub kubeadm_only: bool,
}

impl PackagesInput {
  pub fn install(&self, config: YumConfig) -> Result<()> {
    let installer = YumInstaller::from_config(config);
    let mut out = io::stdout().lock();

    match self.kubeadm_only {
      true => installer.install_kubeadm_package(&mut out, &self.kubernetes_version)?,
      false => installer.install_kubernetes_packages(&mut out, &self.kubernetes_version)?,
    }

    info!("Kubernetes {} packages installed", self.kubernetes_version);
    Ok(())
  }
}

#[derive(Args, Debug, Default, Serialize, Deserialize)]
pub struct PrerequisitesInput {
  /// Kubernetes version the host is being prepared for
  #[arg(long)]
  pub kubernetes_version: String,
}

impl PrerequisitesInput {
  pub fn install(&self, config: YumConfig) -> Result<()> {
    let installer = YumInstaller::from_config(config);
    installer.install_kubernetes_prerequisites(&mut io::stdout().lock(), &self.kubernetes_version)
  }
}

#[derive(Args, Debug, Default, Serialize, Deserialize)]
pub struct ContainerdInput {
  /// Version of containerd that will be installed
  #[arg(long, default_value = "")]
  pub containerd_version: String,
}

impl ContainerdInput {
  pub fn install(&self, config: YumConfig) -> Result<()> {
    let installer = YumInstaller::from_config(config);
    installer.install_containerd_prerequisites(&mut io::stdout().lock(), &self.containerd_version)
  }
}
