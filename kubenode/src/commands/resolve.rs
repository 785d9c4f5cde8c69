use anyhow::Result;
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::{
  config::YumConfig,
  packages::{InstallArg, PackageRole, YumInstaller},
};

/// Input arguments for `resolve` command
#[derive(Args, Debug, Default, Serialize, Deserialize)]
pub struct ResolveInput {
  /// Kubernetes version the packages are pinned to
  #[arg(long)]
  pub kubernetes_version: String,

  /// Resolve only these packages (kubeadm, kubectl, kubelet, kubernetes-cni)
  #[arg(long = "package")]
  pub packages: Vec<PackageRole>,

  /// Resolve only kubeadm and the packages it depends on
  #[arg(long, conflicts_with = "packages")]
  pub kubeadm_only: bool,
}

impl ResolveInput {
  pub fn args(&self, config: YumConfig) -> Result<Vec<InstallArg>> {
    let installer = YumInstaller::from_config(config);

    let args = match (self.packages.is_empty(), self.kubeadm_only) {
      (false, _) => installer.resolve(&self.packages, &self.kubernetes_version)?,
      (true, true) => installer.resolve_kubeadm_packages(&self.kubernetes_version)?,
      (true, false) => installer.resolve_kubernetes_packages(&self.kubernetes_version)?,
    };

    Ok(args)
  }

  pub fn resolve(&self, config: YumConfig) -> Result<()> {
    let args = self.args(config)?;
    println!("{}", serde_json::to_string_pretty(&args)?);

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn it_resolves_selected_packages() {
    let input = ResolveInput {
      kubernetes_version: "1.12.6".to_string(),
      packages: vec![PackageRole::Kubectl, PackageRole::KubernetesCni],
      kubeadm_only: false,
    };
    let args = input.args(YumConfig::default()).unwrap();
    let args = args.iter().map(ToString::to_string).collect::<Vec<_>>();

    assert_eq!(
      args,
      vec!["kubectl-1.12.6-0", "kubernetes-cni-0.6.0-0", "--disableexcludes=kubernetes"]
    );
  }

  #[test]
  fn it_fails_on_invalid_version() {
    let input = ResolveInput {
      kubernetes_version: "stable".to_string(),
      ..Default::default()
    };
    assert!(input.args(YumConfig::default()).is_err());
  }
}
