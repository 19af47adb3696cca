use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Everything one capture run needs, fixed at startup and shared read-only
/// with the deadline flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureSession {
    pub interface: String,
    pub bitrate: Option<u32>,
    pub duration_secs: u64,
    pub output_path: PathBuf,
}

impl CaptureSession {
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_secs)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgsError {
    #[error("expected 3 or 4 arguments, got {0}")]
    WrongCount(usize),
    #[error("'{0}' is not a valid bitrate")]
    BadBitrate(String),
    #[error("'{0}' is not a valid duration (whole seconds, at least 1)")]
    BadDuration(String),
}

/// Parses the positional arguments, program name excluded:
/// `<interface> [bitrate] <seconds> <output-file>`. The optional bitrate
/// is recognized by argument count alone.
pub fn parse_args(args: &[String]) -> Result<CaptureSession, ArgsError> {
    let (interface, bitrate_raw, duration_raw, output) = match args.len() {
        3 => (&args[0], None, &args[1], &args[2]),
        4 => (&args[0], Some(&args[1]), &args[2], &args[3]),
        n => return Err(ArgsError::WrongCount(n)),
    };
    let bitrate: Option<u32> = match bitrate_raw {
        Some(raw) => match raw.parse() {
            Ok(value) => Some(value),
            Err(_) => return Err(ArgsError::BadBitrate(raw.clone())),
        },
        None => None,
    };
    let duration_secs: u64 = match duration_raw.parse() {
        Ok(value) if value > 0 => value,
        _ => return Err(ArgsError::BadDuration(duration_raw.clone())),
    };
    Ok(CaptureSession {
        interface: interface.clone(),
        bitrate,
        duration_secs,
        output_path: PathBuf::from(output),
    })
}
