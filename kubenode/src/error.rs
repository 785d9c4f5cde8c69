use thiserror::Error;

/// Failures raised while installing or verifying node packages
#[derive(Debug, Error)]
pub enum PackageError {
  /// The command could not be spawned, waited on, or its output streamed
  #[error("error executing command {cmd}: {source}")]
  Io {
    cmd: String,
    #[source]
    source: std::io::Error,
  },

  /// The command ran but exited non-zero
  #[error("command `{cmd}` exited with status {status}: {output}")]
  Command { cmd: String, status: i32, output: String },

  /// The query tool printed something other than `name-version-release.arch`
  #[error("unable to parse rpm output: {output:?}")]
  Parse { output: String },

  /// The installed package identity does not match what was requested
  #[error("expected package version after installation: {expected:?}, got: {actual:?}")]
  VersionMismatch { expected: String, actual: String },

  /// There is no package mapping for the given role
  #[error("no package is known for role {role:?}")]
  CompatibilityUnresolved { role: String },

  #[error("unable to parse Kubernetes version {version:?}")]
  InvalidVersion { version: String },
}
