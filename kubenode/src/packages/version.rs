use std::{fmt, str::FromStr};

use semver::Version;
use serde::{Deserialize, Serialize};

use super::PackageSpec;
use crate::{config::PackageNames, error::PackageError, utils};

/// Release pinned for every Kubernetes package
pub const PACKAGE_RELEASE: &str = "0";

pub const CNI_VERSION_CURRENT: &str = "0.7.5";
pub const CNI_VERSION_LEGACY: &str = "0.6.0";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PackageRole {
  Kubeadm,
  Kubectl,
  Kubelet,
  KubernetesCni,
}

impl PackageRole {
  pub fn package_name<'a>(&self, names: &'a PackageNames) -> &'a str {
    match self {
      Self::Kubeadm => &names.kubeadm,
      Self::Kubectl => &names.kubectl,
      Self::Kubelet => &names.kubelet,
      Self::KubernetesCni => &names.kubernetes_cni,
    }
  }
}

impl fmt::Display for PackageRole {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Kubeadm => write!(f, "kubeadm"),
      Self::Kubectl => write!(f, "kubectl"),
      Self::Kubelet => write!(f, "kubelet"),
      Self::KubernetesCni => write!(f, "kubernetes-cni"),
    }
  }
}

impl FromStr for PackageRole {
  type Err = PackageError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "kubeadm" => Ok(Self::Kubeadm),
      "kubectl" => Ok(Self::Kubectl),
      "kubelet" => Ok(Self::Kubelet),
      "kubernetes-cni" => Ok(Self::KubernetesCni),
      _ => Err(PackageError::CompatibilityUnresolved { role: s.to_owned() }),
    }
  }
}

/// CNI plugins 0.7.5 are required from 1.12.7 within 1.12, and from 1.13.5 onwards
///
/// Pre-releases order below their release, so `1.13.5-rc.1` still maps to 0.6.0
fn cni_version(kubernetes_version: &Version) -> &'static str {
  let v1_12_7 = Version::new(1, 12, 7);
  let v1_13_0 = Version::new(1, 13, 0);
  let v1_13_5 = Version::new(1, 13, 5);

  match kubernetes_version {
    v if (*v >= v1_12_7 && *v < v1_13_0) || *v >= v1_13_5 => CNI_VERSION_CURRENT,
    _ => CNI_VERSION_LEGACY,
  }
}

/// Pin the package for `role` to the version compatible with `kubernetes_version`
///
/// kubeadm, kubectl and kubelet are versioned in lockstep with Kubernetes itself;
/// the CNI plugins follow their own release line
pub fn map_package_version(
  role: PackageRole,
  kubernetes_version: &str,
  names: &PackageNames,
) -> Result<PackageSpec, PackageError> {
  let name = role.package_name(names);

  match role {
    PackageRole::Kubeadm | PackageRole::Kubectl | PackageRole::Kubelet => {
      Ok(PackageSpec::pinned(name, kubernetes_version, PACKAGE_RELEASE))
    }
    PackageRole::KubernetesCni => {
      let version = utils::get_semver(kubernetes_version).map_err(|_| PackageError::InvalidVersion {
        version: kubernetes_version.to_owned(),
      })?;
      Ok(PackageSpec::pinned(name, cni_version(&version), PACKAGE_RELEASE))
    }
  }
}
