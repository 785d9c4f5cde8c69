use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_verbosity_flag::Verbosity;

use crate::commands;

/// Styles for CLI
fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .literal(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::BrightCyan))),
    )
    .usage(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
}

#[derive(Debug, Parser)]
#[command(author, about, version)]
#[command(propagate_version = true)]
#[command(styles=get_styles())]
pub struct Cli {
  #[command(subcommand)]
  pub command: Commands,

  /// TOML file overriding the default package manager configuration
  #[arg(long, global = true)]
  pub config: Option<PathBuf>,

  /// Disable colored log output
  #[arg(long, global = true)]
  pub no_color: bool,

  #[clap(flatten)]
  pub verbose: Verbosity,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
  /// Install the pinned Kubernetes node packages and verify the installed versions
  InstallPackages(commands::install::PackagesInput),

  /// Prepare the host for Kubernetes (SELinux, swap, kernel modules, sysctl, package repository)
  InstallPrerequisites(commands::install::PrerequisitesInput),

  /// Install the packages containerd depends on
  InstallContainerdPrerequisites(commands::install::ContainerdInput),

  /// Print the package install arguments for a Kubernetes version without installing anything
  Resolve(commands::resolve::ResolveInput),

  /// Print the installed identity of one or more packages
  Query(commands::query::QueryInput),
}
