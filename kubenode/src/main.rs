use anyhow::Result;
use clap::Parser;
use kubenode::{Cli, Commands, YumConfig};
use tracing_log::AsTrace;
use tracing_subscriber::FmtSubscriber;

#[cfg(not(tarpaulin_include))]
fn main() -> Result<()> {
  let cli = Cli::parse();
  let subscriber = FmtSubscriber::builder()
    .with_max_level(cli.verbose.log_level_filter().as_trace())
    .with_writer(std::io::stderr)
    .without_time()
    .with_ansi(!cli.no_color)
    .finish();
  tracing::subscriber::set_global_default(subscriber).expect("Setting default subscriber failed");

  let config = YumConfig::load(cli.config.as_deref())?;

  match &cli.command {
    Commands::InstallPackages(packages) => packages.install(config),
    Commands::InstallPrerequisites(prereqs) => prereqs.install(config),
    Commands::InstallContainerdPrerequisites(containerd) => containerd.install(config),
    Commands::Resolve(resolve) => resolve.resolve(config),
    Commands::Query(query) => query.query(config),
  }
}
