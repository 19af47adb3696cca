//! Records CAN bus traffic to a CSV file for a fixed duration.
//!
//! The pipeline: reset the interface (optionally setting its bitrate) and
//! bring it up, bind a raw socket, then receive/decode/record until the
//! deadline or a Ctrl+C requests a stop. Teardown brings the interface
//! back down and closes the file, exactly once, on every path. The
//! `can-record` binary wraps this into a command line tool.

pub mod capture;
pub mod exit;
pub mod frame;
pub mod link;
pub mod record;
pub mod session;
pub mod source;

pub use capture::{run, CaptureError, CaptureSummary, StopFlag};
pub use frame::{Frame, RawFrame};
pub use link::{IpLink, LinkControl};
pub use session::{parse_args, CaptureSession};
