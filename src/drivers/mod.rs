// src/drivers/mod.rs
// Streaming core: transport -> framer/decoder -> channel buffers -> render frame
pub mod buffer;
pub mod error;
pub mod framer;
pub mod pipeline;
pub mod plot;
pub mod render;
pub mod routing;
pub mod simulator;
pub mod transport;
// Re-exports for the engine and the window
pub use buffer::{ChannelBufferSet, SampleVector};
pub use error::PlotterError;
pub use framer::{decode_line, LineFramer};
pub use pipeline::{IngestCounts, IngestPipeline, IngestStats};
pub use plot::{render_frame_png, PlotStyle};
pub use render::{Curve, RenderFrame, RenderScheduler};
pub use routing::RoutingTable;
pub use simulator::SimulatedTransport;
pub use transport::{available_ports, SerialTransport, Transport};
#[cfg(test)]
pub use transport::{AfterScript, ManualTransport};
