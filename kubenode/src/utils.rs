use std::{
  fs::OpenOptions,
  io::{self, BufRead, BufReader, Read, Write},
  os::unix::fs::{self, OpenOptionsExt},
  path::Path,
  process::{Command, Stdio},
  sync::mpsc::{self, Sender},
  thread::{self, JoinHandle},
};

use anyhow::{anyhow, Result};
use regex_lite::Regex;
use semver::Version;
use tracing::debug;

use crate::error::PackageError;

/// Parse the semantic version from the version string provided
///
/// A leading `v` is accepted; pre-release and build metadata are kept so the
/// result orders as semver
pub fn get_semver(ver: &str) -> Result<Version> {
  let re = Regex::new(r"^v?(\d+\.\d+\.\d+(?:[-+].*)?)$")?;
  match re.captures(ver).and_then(|cap| cap.get(1)) {
    Some(cap) => Ok(Version::parse(cap.as_str())?),
    None => Err(anyhow!("Unable to parse version")),
  }
}

#[derive(Debug, Default)]
pub struct CmdResult {
  pub stdout: String,
  pub stderr: String,
  pub status: i32,
}

/// Runs OS commands on behalf of the installer
///
/// Both variants fail when the command cannot be spawned or exits non-zero
pub trait CommandExecutor {
  /// Execute a command and capture its output
  fn exec(&self, cmd: &str, args: &[&str]) -> Result<CmdResult, PackageError>;

  /// Execute a command, forwarding its combined stdout/stderr to `out` as it is produced
  fn exec_streaming(&self, cmd: &str, args: &[&str], out: &mut dyn Write) -> Result<CmdResult, PackageError>;
}

/// Executes commands on the local host
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemExecutor;

pub(crate) fn command_line(cmd: &str, args: &[&str]) -> String {
  std::iter::once(cmd).chain(args.iter().copied()).collect::<Vec<_>>().join(" ")
}

fn check_status(cmd: String, result: CmdResult) -> Result<CmdResult, PackageError> {
  if result.status == 0 {
    return Ok(result);
  }

  let output = match result.stderr.trim() {
    "" => result.stdout.trim().to_owned(),
    stderr => stderr.to_owned(),
  };
  Err(PackageError::Command {
    cmd,
    status: result.status,
    output,
  })
}

#[derive(Clone, Copy)]
enum Stream {
  Stdout,
  Stderr,
}

/// Forward a child pipe line by line until it closes
fn forward<R: Read + Send + 'static>(
  pipe: Option<R>,
  stream: Stream,
  tx: Sender<(Stream, String)>,
) -> Option<JoinHandle<()>> {
  pipe.map(|pipe| {
    thread::spawn(move || {
      let mut reader = BufReader::new(pipe);
      let mut buf = Vec::new();
      loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
          Ok(0) | Err(_) => break,
          Ok(_) => {
            if tx.send((stream, String::from_utf8_lossy(&buf).into_owned())).is_err() {
              break;
            }
          }
        }
      }
    })
  })
}

/// Wait for the pipe readers; a panicked reader means the captured output is incomplete
fn join_readers<const N: usize>(readers: [Option<JoinHandle<()>>; N]) -> io::Result<()> {
  let mut result = Ok(());
  for reader in readers.into_iter().flatten() {
    if reader.join().is_err() && result.is_ok() {
      result = Err(io::Error::new(io::ErrorKind::Other, "output reader thread panicked"));
    }
  }
  result
}

impl CommandExecutor for SystemExecutor {
  fn exec(&self, cmd: &str, args: &[&str]) -> Result<CmdResult, PackageError> {
    let line = command_line(cmd, args);
    debug!("Executing: {line}");

    let output = Command::new(cmd).args(args).output().map_err(|source| PackageError::Io {
      cmd: line.clone(),
      source,
    })?;

    check_status(
      line,
      CmdResult {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        status: output.status.code().unwrap_or(1),
      },
    )
  }

  fn exec_streaming(&self, cmd: &str, args: &[&str], out: &mut dyn Write) -> Result<CmdResult, PackageError> {
    let line = command_line(cmd, args);
    debug!("Executing: {line}");
    let io_err = |source| PackageError::Io {
      cmd: line.clone(),
      source,
    };

    let mut child = Command::new(cmd)
      .args(args)
      .stdin(Stdio::null())
      .stdout(Stdio::piped())
      .stderr(Stdio::piped())
      .spawn()
      .map_err(io_err)?;

    let (tx, rx) = mpsc::channel();
    let readers = [
      forward(child.stdout.take(), Stream::Stdout, tx.clone()),
      forward(child.stderr.take(), Stream::Stderr, tx),
    ];

    let mut result = CmdResult::default();
    let mut sink_error = None;
    // Drains until both reader threads drop their senders
    for (stream, chunk) in rx {
      if sink_error.is_none() {
        if let Err(e) = out.write_all(chunk.as_bytes()) {
          sink_error = Some(e);
        }
      }
      match stream {
        Stream::Stdout => result.stdout.push_str(&chunk),
        Stream::Stderr => result.stderr.push_str(&chunk),
      }
    }

    let joined = join_readers(readers);
    let status = child.wait().map_err(io_err)?;
    if let Some(e) = sink_error.or(joined.err()) {
      return Err(io_err(e));
    }
    out.flush().map_err(io_err)?;

    result.status = status.code().unwrap_or(1);
    check_status(line, result)
  }
}

/// Write a file to disk, setting the file mode and owner (gid/uid)
///
/// Existing contents are replaced
pub fn write_file<P: AsRef<Path>>(contents: &[u8], path: P, mode: Option<u32>, chown: bool) -> Result<()> {
  let mut file = OpenOptions::new()
    .write(true)
    .create(true)
    .truncate(true)
    .mode(mode.unwrap_or(0o644))
    .open(&path)?;
  file.write_all(contents)?;

  if chown {
    fs::chown(&path, Some(0), Some(0))?
  }

  Ok(())
}
