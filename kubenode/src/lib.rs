pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod host;
pub mod packages;
pub mod utils;

pub use cli::{Cli, Commands};
pub use config::YumConfig;
pub use error::PackageError;
use rust_embed::RustEmbed;

/// Embeds the contents of the `files/` directory into the binary
///
/// This struct contains the static data used within `kubenode`
#[derive(RustEmbed)]
#[folder = "files/"]
pub struct Assets;
