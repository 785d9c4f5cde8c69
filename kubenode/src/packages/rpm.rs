use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::PackageError;

const ARCH_SEPARATOR: char = '.';
const SEPARATOR: char = '-';

/// Installed package identity as reported by `rpm -q`
///
/// Rendered and parsed in the `name-version-release.arch` form
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpmPackage {
  pub name: String,
  pub version: String,
  pub release: String,
  pub arch: String,
}

impl RpmPackage {
  /// Identity strings from least to most qualified:
  /// `name`, `name-version`, `name-version-release`, `name-version-release.arch`
  pub fn candidates(&self) -> [String; 4] {
    let name_version = format!("{}{SEPARATOR}{}", self.name, self.version);
    let name_version_release = format!("{name_version}{SEPARATOR}{}", self.release);
    let qualified = format!("{name_version_release}{ARCH_SEPARATOR}{}", self.arch);

    [self.name.clone(), name_version, name_version_release, qualified]
  }

  /// Whether `requested` names this package at any qualification level
  pub fn matches(&self, requested: &str) -> bool {
    self.candidates().iter().any(|candidate| candidate == requested)
  }
}

impl fmt::Display for RpmPackage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{}{SEPARATOR}{}{SEPARATOR}{}{ARCH_SEPARATOR}{}",
      self.name, self.version, self.release, self.arch
    )
  }
}

impl FromStr for RpmPackage {
  type Err = PackageError;

  /// Splits on the rightmost separators so that package names may contain dashes
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let pkg = s.trim();
    let err = || PackageError::Parse { output: s.to_owned() };

    let (rest, arch) = pkg.rsplit_once(ARCH_SEPARATOR).ok_or_else(err)?;
    let (rest, release) = rest.rsplit_once(SEPARATOR).ok_or_else(err)?;
    let (name, version) = rest.rsplit_once(SEPARATOR).ok_or_else(err)?;

    if [name, version, release, arch].iter().any(|part| part.is_empty()) {
      return Err(err());
    }

    Ok(Self {
      name: name.to_owned(),
      version: version.to_owned(),
      release: release.to_owned(),
      arch: arch.to_owned(),
    })
  }
}

/// Parse the output of `rpm -q <name>`
///
/// One identity is printed per line; more than one is reported when several
/// versions of the same package are installed side by side
pub fn parse_query_output(output: &str) -> Result<Vec<RpmPackage>, PackageError> {
  let packages = output
    .lines()
    .filter(|line| !line.trim().is_empty())
    .map(str::parse::<RpmPackage>)
    .collect::<Result<Vec<RpmPackage>, _>>()?;

  match packages.is_empty() {
    true => Err(PackageError::Parse {
      output: output.to_owned(),
    }),
    false => Ok(packages),
  }
}
