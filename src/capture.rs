use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::frame::Frame;
use crate::link::{LinkControl, LinkError};
use crate::record::Recorder;
use crate::session::CaptureSession;
use crate::source::{CanSource, DeviceError, FrameSource};

/// Upper bound on how long one receive waits before the stop flag is
/// checked again.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Set-once stop request shared between the capture loop and whoever asks
/// it to stop (the deadline thread, the Ctrl+C handler). Setters only set
/// the flag; the capture loop alone acts on it and owns the teardown.
#[derive(Debug, Clone)]
pub struct StopFlag {
    stop: Arc<AtomicBool>,
}

impl StopFlag {
    pub fn new() -> StopFlag {
        StopFlag {
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn trigger(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// Arms the session deadline: a detached thread sets the flag once
    /// `delay` has elapsed. The thread holds nothing but its own clone of
    /// the flag and never outlives the process.
    pub fn trigger_after(&self, delay: Duration) {
        let flag: StopFlag = self.clone();
        thread::spawn(move || {
            thread::sleep(delay);
            flag.trigger();
        });
    }

    /// Routes Ctrl+C to the same flag, turning an interactive interrupt
    /// into the ordinary clean stop.
    pub fn trigger_on_ctrl_c(&self) {
        let flag: StopFlag = self.clone();
        // registration only fails if a handler is already installed
        let _ = ctrlc::set_handler(move || flag.trigger());
    }
}

#[derive(Debug, Error)]
pub enum CaptureError {
    /// The target file was already present; nothing was touched.
    #[error("output file '{}' already exists", .0.display())]
    OutputExists(PathBuf),
    #[error("interface setup failed: {0}")]
    Link(#[from] LinkError),
    #[error(transparent)]
    Device(#[from] DeviceError),
    #[error("output file error: {0}")]
    Output(#[from] io::Error),
    /// Receive or write failure after recording had started.
    #[error("capture aborted: {0}")]
    Aborted(io::Error),
}

/// What a finished session did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureSummary {
    pub frames: u64,
}

/// Runs one complete capture session: interface setup, socket and file
/// creation, the bounded receive loop, and the single teardown.
///
/// Deadline expiry and Ctrl+C both land on the same stop flag and take
/// the clean path. Any receive or write failure after recording has
/// started takes the abnormal path; teardown still runs.
pub fn run<L: LinkControl>(
    session: &CaptureSession,
    link: &L,
) -> Result<CaptureSummary, CaptureError> {
    if session.output_path.exists() {
        return Err(CaptureError::OutputExists(session.output_path.clone()));
    }
    link.reset(&session.interface)?;
    if let Some(bitrate) = session.bitrate {
        link.configure(&session.interface, bitrate)?;
    }
    link.bring_up(&session.interface)?;

    let source: CanSource = CanSource::bind(&session.interface, POLL_INTERVAL)?;
    let recorder: Recorder<io::Stdout> = Recorder::create(&session.output_path)?;
    log::info!(
        "recording to \"{}\" for {} seconds",
        session.output_path.display(),
        session.duration_secs
    );

    let stop: StopFlag = StopFlag::new();
    stop.trigger_on_ctrl_c();
    stop.trigger_after(session.duration());
    record_session(source, recorder, &stop, link, &session.interface)
}

/// The recording and stopping phases, separated from `run` so tests can
/// drive them with a scripted source and a mock interface controller.
fn record_session<S, L, W>(
    mut source: S,
    mut recorder: Recorder<W>,
    stop: &StopFlag,
    link: &L,
    interface: &str,
) -> Result<CaptureSummary, CaptureError>
where
    S: FrameSource,
    L: LinkControl,
    W: io::Write,
{
    let started: Instant = Instant::now();
    let outcome: io::Result<()> = loop {
        if stop.is_set() {
            break Ok(());
        }
        match source.recv() {
            Ok(Some(raw)) => {
                let timestamp_us: u64 = started.elapsed().as_micros() as u64;
                let frame: Frame = Frame::decode(&raw);
                if let Err(e) = recorder.record(&frame, timestamp_us) {
                    break Err(e);
                }
            }
            Ok(None) => continue, // timed out, re-check the stop flag
            // a signal can end the read before its handler sets the flag
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => break Err(e),
        }
    };

    // the single teardown path, clean or abnormal
    if let Err(e) = link.bring_down(interface) {
        log::warn!("could not bring {} down: {}", interface, e);
    }
    let frames: u64 = recorder.rows();
    match outcome {
        Ok(()) => {
            recorder.finish()?;
            Ok(CaptureSummary { frames })
        }
        Err(e) => {
            if let Err(close_error) = recorder.finish() {
                log::warn!("could not close the capture file: {}", close_error);
            }
            Err(CaptureError::Aborted(e))
        }
    }
}
