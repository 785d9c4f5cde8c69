pub mod rpm;
pub mod version;
pub mod yum;

use std::{fmt, io::Write};

use anyhow::Result;
use serde::{Serialize, Serializer};

pub use rpm::RpmPackage;
pub use version::{map_package_version, PackageRole};
pub use yum::YumInstaller;

/// Leading character that marks an install argument as a package manager flag
pub const FLAG_MARKER: char = '-';

/// A package install argument: `name`, `name-version` or `name-version-release`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackageSpec {
  pub name: String,
  pub version: Option<String>,
  pub release: Option<String>,
}

impl PackageSpec {
  pub fn new(name: &str) -> Self {
    Self {
      name: name.to_owned(),
      version: None,
      release: None,
    }
  }

  pub fn pinned(name: &str, version: &str, release: &str) -> Self {
    Self {
      name: name.to_owned(),
      version: Some(version.to_owned()),
      release: Some(release.to_owned()),
    }
  }
}

impl fmt::Display for PackageSpec {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.name)?;
    if let Some(version) = &self.version {
      write!(f, "-{version}")?;
      if let Some(release) = &self.release {
        write!(f, "-{release}")?;
      }
    }
    Ok(())
  }
}

/// Single entry of the argument list handed to the package manager
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InstallArg {
  Package(PackageSpec),
  /// Passed through to the package manager, never queried or verified
  Flag(String),
}

impl InstallArg {
  pub fn is_flag(&self) -> bool {
    match self {
      Self::Flag(_) => true,
      Self::Package(spec) => spec.name.starts_with(FLAG_MARKER),
    }
  }
}

impl fmt::Display for InstallArg {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Package(spec) => fmt::Display::fmt(spec, f),
      Self::Flag(flag) => f.write_str(flag),
    }
  }
}

impl Serialize for InstallArg {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

impl From<PackageSpec> for InstallArg {
  fn from(spec: PackageSpec) -> Self {
    Self::Package(spec)
  }
}

/// Installs what containerd needs on the host ahead of the runtime itself
pub trait ContainerdPackages {
  fn install_containerd_prerequisites(&self, out: &mut dyn Write, containerd_version: &str) -> Result<()>;
}

/// Prepares the host and installs the Kubernetes node packages
pub trait KubernetesPackages {
  fn install_kubernetes_prerequisites(&self, out: &mut dyn Write, kubernetes_version: &str) -> Result<()>;

  /// Install kubelet, kubeadm, kubectl and the CNI plugins
  fn install_kubernetes_packages(&self, out: &mut dyn Write, kubernetes_version: &str) -> Result<()>;

  /// Install kubeadm and the packages it depends on (kubelet, CNI plugins)
  fn install_kubeadm_package(&self, out: &mut dyn Write, kubernetes_version: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn it_renders_package_specs() {
    assert_eq!(PackageSpec::new("libseccomp").to_string(), "libseccomp");
    assert_eq!(
      PackageSpec::pinned("kubernetes-cni", "0.7.5", "0").to_string(),
      "kubernetes-cni-0.7.5-0"
    );

    let versioned = PackageSpec {
      version: Some("1.18.3".to_string()),
      ..PackageSpec::new("kubeadm")
    };
    assert_eq!(versioned.to_string(), "kubeadm-1.18.3");
  }

  #[test]
  fn it_treats_leading_marker_as_flag() {
    assert!(InstallArg::Flag("--disableexcludes=kubernetes".to_string()).is_flag());
    assert!(InstallArg::Package(PackageSpec::new("--nogpgcheck")).is_flag());
    assert!(!InstallArg::Package(PackageSpec::new("kubeadm")).is_flag());
  }

  #[test]
  fn it_serializes_install_args_as_strings() {
    let args = vec![
      InstallArg::from(PackageSpec::pinned("kubeadm", "1.18.3", "0")),
      InstallArg::Flag("--disableexcludes=kubernetes".to_string()),
    ];
    assert_eq!(
      serde_json::to_string(&args).unwrap(),
      r#"["kubeadm-1.18.3-0","--disableexcludes=kubernetes"]"#
    );
  }
}
