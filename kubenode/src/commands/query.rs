use std::collections::BTreeMap;

use anyhow::Result;
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::{
  config::YumConfig,
  packages::{RpmPackage, YumInstaller},
};

/// Input arguments for `query` command
#[derive(Args, Debug, Default, Serialize, Deserialize)]
pub struct QueryInput {
  /// Names of the installed packages to query
  #[arg(required = true)]
  pub names: Vec<String>,
}

impl QueryInput {
  pub fn query(&self, config: YumConfig) -> Result<()> {
    let installer = YumInstaller::from_config(config);

    let installed = self
      .names
      .iter()
      .map(|name| -> Result<(String, Vec<RpmPackage>)> { Ok((name.to_owned(), installer.query(name)?)) })
      .collect::<Result<BTreeMap<String, Vec<RpmPackage>>>>()?;
    println!("{}", serde_json::to_string_pretty(&installed)?);

    Ok(())
  }
}
