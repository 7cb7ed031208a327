// src/engine.rs
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, sync_channel, Receiver, Sender, SyncSender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::drivers::{
    ChannelBufferSet, IngestCounts, IngestPipeline, IngestStats, PlotterError, SerialTransport,
    SimulatedTransport, Transport,
};
use crate::types::ConnectionMode;

const READ_CHUNK_BYTES: usize = 1024;
// Chunks the reader may run ahead of ingest before it blocks.
const CHUNK_QUEUE_DEPTH: usize = 64;
const SIMULATED_LINES_PER_SECOND: f64 = 250.0;

// What the status indicator shows
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectionStatus {
    Waiting,
    Connected { port: String, baud: u32 },
    Disconnected,
    InvalidBaud,
    Error(String),
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionStatus::Waiting => write!(f, "⏳ Waiting for connection..."),
            ConnectionStatus::Connected { port, baud } => write!(f, "✅ Connected to {port} @ {baud}"),
            ConnectionStatus::Disconnected => write!(f, "🔌 Disconnected"),
            ConnectionStatus::InvalidBaud => write!(f, "⚠ Invalid baud rate"),
            ConnectionStatus::Error(msg) => write!(f, "❌ {msg}"),
        }
    }
}

// Session threads -> engine
#[derive(Debug)]
enum EngineEvent {
    Ended { session: u64, error: Option<String> },
}

/// Baud text from the connection form must be a positive integer.
pub fn parse_baud(text: &str) -> Result<u32, PlotterError> {
    match text.trim().parse::<u32>() {
        Ok(baud) if baud > 0 => Ok(baud),
        _ => Err(PlotterError::InvalidBaudRate(text.to_owned())),
    }
}

/// One live connection: a reader thread pulling bytes off the transport and an
/// ingest thread framing, decoding and buffering them.
struct Session {
    id: u64,
    stop: Arc<AtomicBool>,
    reader: Option<JoinHandle<()>>,
    ingest: Option<JoinHandle<()>>,
}

impl Session {
    fn spawn(
        id: u64,
        transport: Box<dyn Transport>,
        pipeline: IngestPipeline,
        events: Sender<EngineEvent>,
    ) -> Result<Self, PlotterError> {
        let stop = Arc::new(AtomicBool::new(false));
        let (tx_chunk, rx_chunk) = sync_channel::<Vec<u8>>(CHUNK_QUEUE_DEPTH);

        let ingest = thread::Builder::new()
            .name(format!("ingest-{id}"))
            .spawn(move || run_ingest(rx_chunk, pipeline))?;

        let reader_stop = Arc::clone(&stop);
        let reader = thread::Builder::new()
            .name(format!("reader-{id}"))
            .spawn(move || run_reader(id, transport, reader_stop, tx_chunk, events));
        let reader = match reader {
            Ok(handle) => handle,
            Err(e) => {
                // tx_chunk went down with the failed closure, so ingest exits.
                ingest.join().ok();
                return Err(e.into());
            }
        };

        Ok(Self {
            id,
            stop,
            reader: Some(reader),
            ingest: Some(ingest),
        })
    }

    /// Signals the reader and waits for both threads. Once this returns no
    /// further samples reach the buffers. Safe to call more than once.
    fn stop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(reader) = self.reader.take() {
            if reader.join().is_err() {
                log::error!("session {} reader thread panicked", self.id);
            }
        }
        if let Some(ingest) = self.ingest.take() {
            if ingest.join().is_err() {
                log::error!("session {} ingest thread panicked", self.id);
            }
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_reader(
    id: u64,
    mut transport: Box<dyn Transport>,
    stop: Arc<AtomicBool>,
    chunks: SyncSender<Vec<u8>>,
    events: Sender<EngineEvent>,
) {
    let mut buf = [0u8; READ_CHUNK_BYTES];
    let mut error = None;
    while !stop.load(Ordering::SeqCst) {
        match transport.read_chunk(&mut buf) {
            Ok(0) => continue,
            Ok(n) => {
                if chunks.send(buf[..n].to_vec()).is_err() {
                    break;
                }
            }
            Err(e) => {
                log::error!("session {id}: serial read failed: {e}");
                error = Some(e.to_string());
                break;
            }
        }
    }
    // Closing the chunk channel lets the ingest thread drain and exit.
    drop(chunks);
    drop(transport);
    events.send(EngineEvent::Ended { session: id, error }).ok();
}

fn run_ingest(chunks: Receiver<Vec<u8>>, mut pipeline: IngestPipeline) {
    for chunk in chunks {
        pipeline.push_chunk(&chunk);
    }
}

/// Owns the (at most one) transport session and the connection status.
pub struct Engine {
    buffers: Arc<ChannelBufferSet>,
    stats: Arc<IngestStats>,
    session: Option<Session>,
    next_session: u64,
    status: ConnectionStatus,
    read_timeout: Duration,
    max_line_len: usize,
    tx: Sender<EngineEvent>,
    rx: Receiver<EngineEvent>,
}

impl Engine {
    pub fn new(buffers: Arc<ChannelBufferSet>, read_timeout: Duration, max_line_len: usize) -> Self {
        let (tx, rx) = channel();
        Self {
            buffers,
            stats: Arc::new(IngestStats::default()),
            session: None,
            next_session: 0,
            status: ConnectionStatus::Waiting,
            read_timeout,
            max_line_len,
            tx,
            rx,
        }
    }

    pub fn status(&self) -> &ConnectionStatus {
        &self.status
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Totals across every session since startup.
    pub fn counts(&self) -> IngestCounts {
        self.stats.counts()
    }

    /// Validates the form input, tears down any current session and starts a
    /// new one. Invalid baud text is rejected before anything else happens.
    pub fn connect(
        &mut self,
        mode: ConnectionMode,
        port: &str,
        baud_text: &str,
    ) -> Result<(), PlotterError> {
        let baud = match parse_baud(baud_text) {
            Ok(baud) => baud,
            Err(e) => {
                log::warn!("{e}");
                self.status = ConnectionStatus::InvalidBaud;
                return Err(e);
            }
        };
        self.disconnect();
        let transport: Box<dyn Transport> = match mode {
            ConnectionMode::Simulation => Box::new(SimulatedTransport::new(
                self.buffers.num_channels(),
                SIMULATED_LINES_PER_SECOND,
                self.read_timeout,
            )),
            ConnectionMode::Hardware => {
                match SerialTransport::open(port, baud, self.read_timeout) {
                    Ok(t) => Box::new(t),
                    Err(e) => {
                        log::error!("{e}");
                        self.status = ConnectionStatus::Error(e.to_string());
                        return Err(e);
                    }
                }
            }
        };
        let label = match mode {
            ConnectionMode::Simulation => "simulator",
            ConnectionMode::Hardware => port,
        };
        self.connect_transport(transport, label, baud)
    }

    /// Starts a session over an already opened transport, replacing any
    /// current one.
    pub fn connect_transport(
        &mut self,
        transport: Box<dyn Transport>,
        port: &str,
        baud: u32,
    ) -> Result<(), PlotterError> {
        self.disconnect();
        self.next_session += 1;
        let id = self.next_session;
        let pipeline = IngestPipeline::new(
            Arc::clone(&self.buffers),
            Arc::clone(&self.stats),
            self.max_line_len,
        );
        match Session::spawn(id, transport, pipeline, self.tx.clone()) {
            Ok(session) => {
                log::info!("session {id}: connected to {port} @ {baud}");
                self.session = Some(session);
                self.status = ConnectionStatus::Connected {
                    port: port.to_owned(),
                    baud,
                };
                Ok(())
            }
            Err(e) => {
                log::error!("session {id}: failed to start: {e}");
                self.status = ConnectionStatus::Error(e.to_string());
                Err(e)
            }
        }
    }

    /// Stops the current session, if any, and waits for its threads.
    pub fn disconnect(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.stop();
            log::info!("session {}: disconnected", session.id);
            self.status = ConnectionStatus::Disconnected;
        }
    }

    /// Applies session-ended notifications; returns the current status.
    pub fn poll_events(&mut self) -> &ConnectionStatus {
        while let Ok(event) = self.rx.try_recv() {
            match event {
                EngineEvent::Ended { session, error } => {
                    let current = self.session.as_ref().map(|s| s.id);
                    if current != Some(session) {
                        continue;
                    }
                    if let Some(mut ended) = self.session.take() {
                        ended.stop();
                    }
                    self.status = match error {
                        Some(msg) => ConnectionStatus::Error(msg),
                        None => ConnectionStatus::Disconnected,
                    };
                }
            }
        }
        &self.status
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.disconnect();
    }
}
