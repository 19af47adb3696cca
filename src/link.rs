use std::io;
use std::process::Command;

use thiserror::Error;

/// Inclusive bounds accepted by `configure`.
pub const BITRATE_MIN: u32 = 10;
pub const BITRATE_MAX: u32 = 1_000_000;

#[derive(Debug, Error)]
pub enum LinkError {
    /// The bitrate failed validation; no OS command was run.
    #[error("bitrate {0} out of range [{}, {}]", BITRATE_MIN, BITRATE_MAX)]
    BitrateOutOfRange(u32),
    /// The `ip` binary could not be started.
    #[error("could not run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    /// The command ran and reported failure.
    #[error("'{command}' failed: {stderr}")]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
}

/// Rejects any bitrate outside `[BITRATE_MIN, BITRATE_MAX]`.
pub fn validate_bitrate(bitrate: u32) -> Result<(), LinkError> {
    if bitrate < BITRATE_MIN || bitrate > BITRATE_MAX {
        return Err(LinkError::BitrateOutOfRange(bitrate));
    }
    Ok(())
}

/// Privileged interface lifecycle operations the capture run needs.
///
/// `reset` and `bring_down` put the interface into the down state, which
/// is also the safe state to leave behind on any failure.
pub trait LinkControl {
    /// Forces the interface down. Succeeds if it is already down.
    fn reset(&self, interface: &str) -> Result<(), LinkError>;
    /// Applies the bitrate to a downed interface. Validates the value
    /// before invoking anything.
    fn configure(&self, interface: &str, bitrate: u32) -> Result<(), LinkError>;
    fn bring_up(&self, interface: &str) -> Result<(), LinkError>;
    fn bring_down(&self, interface: &str) -> Result<(), LinkError>;
}

/// Drives the interface through `ip link set`, one child process per
/// operation, arguments passed structurally (never through a shell).
/// Needs CAP_NET_ADMIN or root.
pub struct IpLink;

impl IpLink {
    fn ip_link_set(&self, args: &[&str]) -> Result<(), LinkError> {
        let rendered: String = format!("ip link set {}", args.join(" "));
        log::debug!("running {}", rendered);
        let output = match Command::new("ip").arg("link").arg("set").args(args).output() {
            Ok(output) => output,
            Err(e) => {
                return Err(LinkError::Spawn {
                    command: rendered,
                    source: e,
                })
            }
        };
        if output.status.success() {
            Ok(())
        } else {
            Err(LinkError::CommandFailed {
                command: rendered,
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

impl LinkControl for IpLink {
    fn reset(&self, interface: &str) -> Result<(), LinkError> {
        self.ip_link_set(&[interface, "down"])
    }

    fn configure(&self, interface: &str, bitrate: u32) -> Result<(), LinkError> {
        validate_bitrate(bitrate)?;
        let bitrate_arg: String = bitrate.to_string();
        self.ip_link_set(&[interface, "type", "can", "bitrate", &bitrate_arg])
    }

    fn bring_up(&self, interface: &str) -> Result<(), LinkError> {
        self.ip_link_set(&[interface, "up"])
    }

    fn bring_down(&self, interface: &str) -> Result<(), LinkError> {
        self.ip_link_set(&[interface, "down"])
    }
}
