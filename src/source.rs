use std::io;
use std::time::Duration;

use socketcan::{CANFrame, CANSocket, CANSocketOpenError, EFF_FLAG, ERR_FLAG, RTR_FLAG};
use thiserror::Error;

use crate::frame::RawFrame;

/// Socket-level failures while setting up the capture source.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("could not open CAN socket on '{interface}': {source}")]
    Open {
        interface: String,
        #[source]
        source: CANSocketOpenError,
    },
    #[error("could not set the socket read timeout: {0}")]
    ReadTimeout(#[source] io::Error),
}

/// Anything that yields raw frames one at a time with a bounded wait.
pub trait FrameSource {
    /// Waits for the next frame. `Ok(None)` means the wait ended without
    /// one, timed out or interrupted, and the caller should check for a
    /// stop request before trying again.
    fn recv(&mut self) -> io::Result<Option<RawFrame>>;
}

/// A raw CAN socket bound to a single interface.
pub struct CanSource {
    socket: CANSocket,
}

impl CanSource {
    /// Opens a raw socket bound to `interface` and applies `poll_interval`
    /// as the read timeout, so `recv` never blocks longer than that.
    pub fn bind(interface: &str, poll_interval: Duration) -> Result<CanSource, DeviceError> {
        let socket: CANSocket = match CANSocket::open(interface) {
            Ok(socket) => socket,
            Err(e) => {
                return Err(DeviceError::Open {
                    interface: interface.to_string(),
                    source: e,
                })
            }
        };
        socket
            .set_read_timeout(poll_interval)
            .map_err(DeviceError::ReadTimeout)?;
        Ok(CanSource { socket })
    }
}

impl FrameSource for CanSource {
    fn recv(&mut self) -> io::Result<Option<RawFrame>> {
        match self.socket.read_frame() {
            Ok(frame) => Ok(Some(RawFrame::from(frame))),
            Err(e) if idle_read(e.kind()) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Read outcomes that end without a frame: the poll interval elapsed, or
/// a signal handler cut the blocked read short. A socket with a read
/// timeout never restarts a read after a signal, so Ctrl+C surfaces here
/// as `Interrupted` rather than as a device failure.
fn idle_read(kind: io::ErrorKind) -> bool {
    kind == io::ErrorKind::WouldBlock
        || kind == io::ErrorKind::TimedOut
        || kind == io::ErrorKind::Interrupted
}

impl From<CANFrame> for RawFrame {
    fn from(frame: CANFrame) -> RawFrame {
        // rebuild the raw identifier word the decoder expects
        let mut id: u32 = frame.id();
        if frame.is_extended() {
            id |= EFF_FLAG;
        }
        if frame.is_rtr() {
            id |= RTR_FLAG;
        }
        if frame.is_error() {
            id |= ERR_FLAG;
        }
        let mut data: [u8; 8] = [0; 8];
        let len: usize = frame.data().len().min(8);
        data[..len].copy_from_slice(&frame.data()[..len]);
        RawFrame {
            id,
            dlc: len as u8,
            data,
        }
    }
}
