//! The connection engine: request/response sessions against the device
//! stream.
//!
//! A session runs two independently paced tasks over one device handle: the
//! sender writes the serialized request every poll interval, the receiver
//! drains the byte stream, resynchronizing to checksum-valid 128-byte frames.
//! The sender only ever writes and the receiver only ever reads, so neither
//! direction contends with the other; the receive buffer is owned by the
//! receiver alone. Teardown is cooperative: both loops check a cancellation
//! token at every iteration.

use crate::codec::Value;
use crate::constants::{FRAME_SIZE, RECEIVE_IDLE_DELAY, RECONNECT_DELAY};
use crate::error::BtError;
use crate::field::{Command, Field};
use crate::packet::{self, Packet};
use bytes::BytesMut;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// The byte-stream seam the engine drives.
///
/// The real implementation is [`CharDevice`]; tests drive the engine through
/// a scripted port.
pub trait DevicePort: Send + Sync {
    /// Write one serialized frame.
    fn write_frame(&self, frame: &[u8]) -> io::Result<()>;

    /// Non-blocking read of whatever bytes are currently available,
    /// appended to `buffer`. "Would block" and end-of-stream are no-ops,
    /// reported as zero bytes.
    fn read_available(&self, buffer: &mut BytesMut) -> io::Result<usize>;

    /// Close any existing handle and open the device again.
    fn reopen(&self) -> io::Result<()>;
}

/// A character device bound to a filesystem path (typically an rfcomm
/// serial-over-Bluetooth link), opened for binary read/write with
/// non-blocking reads.
pub struct CharDevice {
    path: PathBuf,
    file: Mutex<Arc<File>>,
}

impl CharDevice {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        info!("opening {}", path.display());
        let file = open_device(&path)?;
        Ok(CharDevice {
            path,
            file: Mutex::new(Arc::new(file)),
        })
    }

    fn current(&self) -> Arc<File> {
        self.file
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl DevicePort for CharDevice {
    fn write_frame(&self, frame: &[u8]) -> io::Result<()> {
        (&*self.current()).write_all(frame)
    }

    fn read_available(&self, buffer: &mut BytesMut) -> io::Result<usize> {
        let file = self.current();
        let mut chunk = [0u8; FRAME_SIZE];
        match (&*file).read(&mut chunk) {
            Ok(n) => {
                buffer.extend_from_slice(&chunk[..n]);
                Ok(n)
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(0),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(0),
            Err(e) => Err(e),
        }
    }

    fn reopen(&self) -> io::Result<()> {
        info!("reopening {}", self.path.display());
        let file = open_device(&self.path)?;
        // The previous handle closes once the last task drops its clone.
        *self
            .file
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Arc::new(file);
        Ok(())
    }
}

fn open_device(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .custom_flags(libc::O_NONBLOCK)
        .open(path)
}

/// A send/receive session handle for one BlueTherm device.
pub struct Connection {
    port: Arc<dyn DevicePort>,
    poll_interval: Duration,
    cancel: CancellationToken,
}

impl Connection {
    /// Open the device at `path` and build an engine polling at
    /// `poll_interval`.
    pub fn open(path: impl AsRef<Path>, poll_interval: Duration) -> Result<Self, BtError> {
        let port = CharDevice::open(path)?;
        Ok(Self::with_port(Arc::new(port), poll_interval))
    }

    /// Build an engine over an already-constructed port.
    pub fn with_port(port: Arc<dyn DevicePort>, poll_interval: Duration) -> Self {
        Connection {
            port,
            poll_interval,
            cancel: CancellationToken::new(),
        }
    }

    /// Close and reopen the underlying device handle.
    pub fn reopen(&self) -> Result<(), BtError> {
        self.port.reopen()?;
        Ok(())
    }

    /// Cancel all active session tasks. The device handle closes once the
    /// last task winds down. Safe to call with no session active.
    pub fn close(&self) {
        debug!("closing connection");
        self.cancel.cancel();
    }

    /// Continuously send a `GET` for `fields`, invoking `on_values` with the
    /// decoded values (in request order) for every `GET` response. Frames
    /// with any other command, such as `BUTTON` and `SHUTDOWN`, are dropped
    /// on this path.
    ///
    /// Runs until [`close`](Self::close) or a fatal session error; there is
    /// no timeout for a device that never replies.
    pub async fn poll<F>(&self, fields: &[Field], mut on_values: F) -> Result<(), BtError>
    where
        F: FnMut(&[Value]),
    {
        let mut request = Packet::from_command(Command::Get);
        request.set_data_flags(fields)?;
        self.poll_request(request, true, |response| {
            if response.command() == Command::Get {
                let values: Vec<Value> = fields.iter().map(|&field| response.get(field)).collect();
                on_values(&values);
            }
        })
        .await
    }

    /// Send `request` (with retries) until one receive pass yields a valid
    /// frame, returning the most recently delivered response.
    ///
    /// Stale or duplicate frames can surface while the stream resynchronizes;
    /// taking the last delivered one guards against acting on them.
    pub async fn poll_once(&self, request: Packet) -> Result<Option<Packet>, BtError> {
        let mut last = None;
        self.poll_request(request, false, |response| last = Some(response))
            .await?;
        Ok(last)
    }

    /// Run one session: write `request` every poll interval while draining
    /// the stream, invoking `on_response` for every structurally valid frame
    /// in wire arrival order.
    ///
    /// With `loop_mode` false the session ends after the first receive pass
    /// that found a valid frame and the sender is wound down without
    /// draining in-flight writes; with `loop_mode` true it runs until
    /// [`close`](Self::close). A disconnect-class write failure is recovered
    /// internally (wait, reopen, continue) and never surfaced; any other
    /// error in either task cancels the session and propagates.
    pub async fn poll_request<F>(
        &self,
        request: Packet,
        loop_mode: bool,
        mut on_response: F,
    ) -> Result<(), BtError>
    where
        F: FnMut(Packet),
    {
        let session = self.cancel.child_token();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let sender = tokio::spawn(sender_loop(
            self.port.clone(),
            request,
            self.poll_interval,
            session.clone(),
        ));
        let receiver = tokio::spawn(receiver_loop(
            self.port.clone(),
            tx,
            loop_mode,
            session.clone(),
        ));

        while let Some(response) = rx.recv().await {
            on_response(response);
        }

        // The receiver is done: single-shot success, fatal error, or close.
        // Wind the sender down; no graceful drain of in-flight writes.
        session.cancel();
        let receiver_result = receiver.await?;
        let sender_result = sender.await?;
        receiver_result?;
        sender_result
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn sender_loop(
    port: Arc<dyn DevicePort>,
    request: Packet,
    poll_interval: Duration,
    cancel: CancellationToken,
) -> Result<(), BtError> {
    let frame = *request.serialize();
    let label = request.command();
    loop {
        if cancel.is_cancelled() {
            return Ok(());
        }
        debug!("sending {label} request");
        match port.write_frame(&frame) {
            Ok(()) => {
                if sleep_or_cancelled(poll_interval, &cancel).await {
                    return Ok(());
                }
            }
            Err(e) if is_disconnect(&e) => {
                // The only self-healing path: wait, reopen, keep sending.
                // Never surfaced to the session caller.
                warn!("device write failed ({e}), waiting then reopening");
                if sleep_or_cancelled(RECONNECT_DELAY, &cancel).await {
                    return Ok(());
                }
                if let Err(e) = port.reopen() {
                    cancel.cancel();
                    return Err(e.into());
                }
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                // Link-side buffer full; retry next cycle.
                if sleep_or_cancelled(poll_interval, &cancel).await {
                    return Ok(());
                }
            }
            Err(e) => {
                cancel.cancel();
                return Err(e.into());
            }
        }
    }
}

async fn receiver_loop(
    port: Arc<dyn DevicePort>,
    tx: mpsc::UnboundedSender<Packet>,
    loop_mode: bool,
    cancel: CancellationToken,
) -> Result<(), BtError> {
    let mut buffer = BytesMut::with_capacity(FRAME_SIZE * 2);
    loop {
        if cancel.is_cancelled() {
            return Ok(());
        }
        if let Err(e) = port.read_available(&mut buffer) {
            cancel.cancel();
            return Err(e.into());
        }

        let frames = packet::extract_frames(&mut buffer);
        let packet_found = !frames.is_empty();
        for frame in frames {
            debug!("{} packet received", frame.command());
            if tx.send(frame).is_err() {
                // Session caller went away.
                return Ok(());
            }
        }

        if packet_found && !loop_mode {
            return Ok(());
        }
        if sleep_or_cancelled(RECEIVE_IDLE_DELAY, &cancel).await {
            return Ok(());
        }
    }
}

/// Sleep for `duration`, returning early (true) if the session is cancelled.
async fn sleep_or_cancelled(duration: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => true,
        _ = tokio::time::sleep(duration) => false,
    }
}

/// Write failures that mean the radio link dropped rather than a programming
/// or protocol error. These trigger the reopen path instead of ending the
/// session.
fn is_disconnect(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::BrokenPipe
            | io::ErrorKind::NotConnected
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
    ) || e.raw_os_error() == Some(libc::EIO)
}
