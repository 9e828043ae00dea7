//! Telemetry sources feeding raw byte chunks to the frame driver.
//!
//! Each source runs on its own thread and only hands over owned chunks
//! through a channel; all decoding and control state stay with the
//! receiver.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::Sender;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::SourceConfig;

/// Read timeout on the serial port; only bounds how long a read blocks
const SERIAL_READ_TIMEOUT: Duration = Duration::from_millis(100);

const READ_BUF_SIZE: usize = 256;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Start the source described by `config`, sending chunks into `tx`.
///
/// Returns `None` for [`SourceConfig::Fixed`], which has no reader; `tx` is
/// dropped so the receiver sees a disconnected channel.
pub fn spawn(
    config: &SourceConfig,
    tx: Sender<Vec<u8>>,
) -> Result<Option<JoinHandle<()>>, SourceError> {
    match config {
        SourceConfig::Serial { port, baud } => spawn_serial(port, *baud, tx).map(Some),
        SourceConfig::Replay {
            path,
            chunk_size,
            interval,
        } => spawn_replay(path, *chunk_size, *interval, tx).map(Some),
        SourceConfig::Fixed => {
            info!("Using fixed test inputs; no telemetry source opened");
            Ok(None)
        }
    }
}

/// Open `port` and forward everything read from it.
///
/// The thread exits when the receiver goes away or the port reports a
/// non-timeout error.
pub fn spawn_serial(
    port: &str,
    baud: u32,
    tx: Sender<Vec<u8>>,
) -> Result<JoinHandle<()>, SourceError> {
    info!("Opening {port} at {baud} baud...");
    let mut serial = serialport::new(port, baud)
        .timeout(SERIAL_READ_TIMEOUT)
        .open()?;
    info!("Connected to sensor on {port}");

    let handle = thread::spawn(move || {
        let mut buf = [0u8; READ_BUF_SIZE];
        loop {
            match serial.read(&mut buf) {
                Ok(n) if n > 0 => {
                    if tx.send(buf[..n].to_vec()).is_err() {
                        debug!("Telemetry receiver closed; stopping serial reader");
                        break;
                    }
                }
                Ok(_) => {}
                Err(ref e) if e.kind() == ErrorKind::TimedOut => {}
                Err(e) => {
                    warn!("Serial read error: {e}");
                    break;
                }
            }
        }
    });

    Ok(handle)
}

/// Replay a captured serial stream from `path`.
///
/// The file is sent in `chunk_size` pieces with `interval` between them,
/// so lines arrive split across chunks as they do from the port.
pub fn spawn_replay(
    path: &Path,
    chunk_size: usize,
    interval: Duration,
    tx: Sender<Vec<u8>>,
) -> Result<JoinHandle<()>, SourceError> {
    let file = File::open(path)?;
    info!("Replaying telemetry from {}", path.display());

    let handle = thread::spawn(move || {
        let sent = pump(file, chunk_size.max(1), interval, &tx);
        info!("Replay finished after {sent} bytes");
    });

    Ok(handle)
}

/// Copy `reader` into `tx` chunk by chunk; returns bytes sent
fn pump<R: Read>(
    mut reader: R,
    chunk_size: usize,
    interval: Duration,
    tx: &Sender<Vec<u8>>,
) -> usize {
    let mut buf = vec![0u8; chunk_size];
    let mut sent = 0;
    loop {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                if tx.send(buf[..n].to_vec()).is_err() {
                    break;
                }
                sent += n;
            }
            Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!("Replay read error: {e}");
                break;
            }
        }
        if !interval.is_zero() {
            thread::sleep(interval);
        }
    }
    sent
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_pump_splits_into_chunks() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let data: &[u8] = b"Orientation: 1 2 3\r\nPot: 4\r\n";

        let sent = pump(data, 8, Duration::ZERO, &tx);
        drop(tx);

        assert_eq!(sent, data.len());
        let chunks: Vec<Vec<u8>> = rx.iter().collect();
        assert!(chunks.iter().all(|c| c.len() <= 8));
        assert_eq!(chunks.concat(), data);
    }

    #[test]
    fn test_pump_stops_when_receiver_dropped() {
        let (tx, rx) = crossbeam_channel::unbounded();
        drop(rx);
        assert_eq!(pump(&b"Pot: 1\r\n"[..], 4, Duration::ZERO, &tx), 0);
    }

    #[test]
    fn test_replay_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"Pot: 100\r\nPot: 200\r\n").unwrap();

        let (tx, rx) = crossbeam_channel::unbounded();
        let config = SourceConfig::Replay {
            path: file.path().to_path_buf(),
            chunk_size: 5,
            interval: Duration::ZERO,
        };
        let handle = spawn(&config, tx).unwrap().unwrap();
        handle.join().unwrap();

        let bytes: Vec<u8> = rx.iter().flatten().collect();
        assert_eq!(bytes, b"Pot: 100\r\nPot: 200\r\n");
    }

    #[test]
    fn test_replay_missing_file() {
        let (tx, _rx) = crossbeam_channel::unbounded();
        let result = spawn_replay(
            Path::new("/nonexistent/capture.txt"),
            16,
            Duration::ZERO,
            tx,
        );
        assert!(matches!(result, Err(SourceError::Io(_))));
    }

    #[test]
    fn test_fixed_source_has_no_reader() {
        let (tx, rx) = crossbeam_channel::unbounded::<Vec<u8>>();
        assert!(spawn(&SourceConfig::Fixed, tx).unwrap().is_none());
        assert!(rx.recv().is_err());
    }
}
