//! Process exit codes. The values are plain errnos so wrapper scripts
//! can tell the failure classes apart without parsing stderr.

use std::io;

use crate::capture::CaptureError;
use crate::link::LinkError;

pub mod codes {
    /// Clean duration-based stop, or Ctrl+C.
    pub const SUCCESS: i32 = 0;
    /// Capture loop aborted after recording had started.
    pub const FAILURE: i32 = 1;
    /// Socket, bind, or file I/O failure (EIO).
    pub const IO: i32 = 5;
    /// Output file already exists (EEXIST).
    pub const OUTPUT_EXISTS: i32 = 17;
    /// Bad arguments or bitrate out of range (EINVAL).
    pub const INVALID: i32 = 22;
}

/// Maps a failed run to the code the process exits with. Interface
/// command failures propagate the `ip` child's own exit code; a child
/// killed by a signal has none and counts as an I/O failure.
pub fn exit_code(error: &CaptureError) -> i32 {
    match error {
        CaptureError::OutputExists(_) => codes::OUTPUT_EXISTS,
        CaptureError::Link(LinkError::BitrateOutOfRange(_)) => codes::INVALID,
        CaptureError::Link(LinkError::CommandFailed {
            code: Some(code), ..
        }) => *code,
        CaptureError::Link(_) => codes::IO,
        CaptureError::Device(_) => codes::IO,
        // the output can appear between the startup check and create_new
        CaptureError::Output(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            codes::OUTPUT_EXISTS
        }
        CaptureError::Output(_) => codes::IO,
        CaptureError::Aborted(_) => codes::FAILURE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::DeviceError;
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn test_existing_output_maps_to_eexist() {
        let error = CaptureError::OutputExists(PathBuf::from("/tmp/x.csv"));
        assert_eq!(17, exit_code(&error));
    }

    #[test]
    fn test_bad_bitrate_maps_to_einval() {
        let error = CaptureError::Link(LinkError::BitrateOutOfRange(9));
        assert_eq!(22, exit_code(&error));
    }

    #[test]
    fn test_command_failure_propagates_the_child_exit_code() {
        let error = CaptureError::Link(LinkError::CommandFailed {
            command: "ip link set can0 up".to_string(),
            code: Some(2),
            stderr: "Operation not permitted".to_string(),
        });
        assert_eq!(2, exit_code(&error));
    }

    #[test]
    fn test_signal_killed_command_maps_to_eio() {
        let error = CaptureError::Link(LinkError::CommandFailed {
            command: "ip link set can0 up".to_string(),
            code: None,
            stderr: String::new(),
        });
        assert_eq!(5, exit_code(&error));
    }

    #[test]
    fn test_device_and_file_errors_map_to_eio() {
        let device = CaptureError::Device(DeviceError::ReadTimeout(io::Error::new(
            io::ErrorKind::Other,
            "x",
        )));
        assert_eq!(5, exit_code(&device));
        let output = CaptureError::Output(io::Error::new(io::ErrorKind::PermissionDenied, "x"));
        assert_eq!(5, exit_code(&output));
    }

    #[test]
    fn test_output_appearing_after_the_startup_check_maps_to_eexist() {
        let error =
            CaptureError::Output(io::Error::new(io::ErrorKind::AlreadyExists, "File exists"));
        assert_eq!(17, exit_code(&error));
    }

    #[test]
    fn test_aborted_capture_is_a_generic_failure() {
        let error = CaptureError::Aborted(io::Error::new(io::ErrorKind::Other, "x"));
        assert_eq!(1, exit_code(&error));
    }
}
