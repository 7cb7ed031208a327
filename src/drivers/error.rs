use thiserror::Error;
#[derive(Debug, Error)]
pub enum PlotterError {
    #[error("baud rate must be a positive integer, got {0:?}")]
    InvalidBaudRate(String),
    #[error("channel capacity must be greater than zero, got {0}")]
    InvalidCapacity(usize),
    #[error("channel {channel} out of range: only {count} channels")]
    ChannelOutOfRange { channel: usize, count: usize },
    #[error("failed to open serial port {port}: {source}")]
    PortOpen {
        port: String,
        #[source]
        source: serialport::Error,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to render plot: {0}")]
    Plot(String),
}
impl<E: std::error::Error + Send + Sync + 'static> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for PlotterError
{
    fn from(value: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        PlotterError::Plot(format!("{value:?}"))
    }
}
impl From<image::ImageError> for PlotterError {
    fn from(value: image::ImageError) -> Self {
        PlotterError::Plot(value.to_string())
    }
}
