use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use crate::frame::Frame;

/// First line of every capture file.
pub const CSV_HEADER: &str =
    "Timestamp (us),CAN ID,Extended,RTR,Error,Data Size (byte),1,2,3,4,5,6,7,8\r\n";

/// Renders one CRLF-terminated CSV row, every field decimal. All eight
/// payload columns are always present regardless of `dlc`.
pub fn csv_row(frame: &Frame, timestamp_us: u64) -> String {
    format!(
        "{},{},{},{},{},{},{},{},{},{},{},{},{},{}\r\n",
        timestamp_us,
        frame.id,
        frame.extended as u8,
        frame.rtr as u8,
        frame.error as u8,
        frame.dlc,
        frame.data[0],
        frame.data[1],
        frame.data[2],
        frame.data[3],
        frame.data[4],
        frame.data[5],
        frame.data[6],
        frame.data[7],
    )
}

/// Renders the console mirror of a row: elapsed seconds with microsecond
/// precision, the id as 8-digit hex, fixed-width flag tokens (blank when
/// the flag is absent), the dlc, and all eight payload bytes in hex.
pub fn console_line(frame: &Frame, timestamp_us: u64) -> String {
    let seconds: f64 = timestamp_us as f64 / 1_000_000.0;
    format!(
        "{:>12.6}  {:08X}  {} {} {}  [{}]  {:02X} {:02X} {:02X} {:02X} {:02X} {:02X} {:02X} {:02X}",
        seconds,
        frame.id,
        if frame.extended { "EXT" } else { "   " },
        if frame.rtr { "RTR" } else { "   " },
        if frame.error { "ERR" } else { "   " },
        frame.dlc,
        frame.data[0],
        frame.data[1],
        frame.data[2],
        frame.data[3],
        frame.data[4],
        frame.data[5],
        frame.data[6],
        frame.data[7],
    )
}

/// Writes the capture: one CSV row per frame into an exclusively created
/// file, one mirror line per frame to the console sink.
///
/// Rows go straight to the file handle with no userspace buffering, so
/// every row `record` returned Ok for has already reached the kernel.
pub struct Recorder<W: Write> {
    file: File,
    console: W,
    rows: u64,
}

impl Recorder<io::Stdout> {
    /// Creates `path` (refusing to touch an existing file) and writes the
    /// header, mirroring frames to stdout.
    pub fn create(path: &Path) -> io::Result<Recorder<io::Stdout>> {
        Recorder::with_console(path, io::stdout())
    }
}

impl<W: Write> Recorder<W> {
    /// Same as `create` but with a caller-supplied console sink.
    pub fn with_console(path: &Path, console: W) -> io::Result<Recorder<W>> {
        let mut file: File = OpenOptions::new().write(true).create_new(true).open(path)?;
        file.write_all(CSV_HEADER.as_bytes())?;
        Ok(Recorder {
            file,
            console,
            rows: 0,
        })
    }

    /// Appends the CSV row and emits the console mirror line.
    pub fn record(&mut self, frame: &Frame, timestamp_us: u64) -> io::Result<()> {
        self.file.write_all(csv_row(frame, timestamp_us).as_bytes())?;
        self.console
            .write_all(console_line(frame, timestamp_us).as_bytes())?;
        self.console.write_all(b"\n")?;
        self.rows += 1;
        Ok(())
    }

    /// Rows written so far, header not counted.
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Flushes the console and syncs the file before closing both.
    pub fn finish(mut self) -> io::Result<()> {
        self.console.flush()?;
        self.file.sync_all()
    }
}
