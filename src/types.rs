// src/types.rs
use serde::Deserialize;

// Which transport `connect` opens
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
pub enum ConnectionMode {
    Simulation,
    #[default]
    Hardware,
}

// sRGB curve color, independent of any GUI toolkit
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn to_array(self) -> [u8; 3] {
        [self.0, self.1, self.2]
    }
    pub fn from_array([r, g, b]: [u8; 3]) -> Self {
        Rgb(r, g, b)
    }
}

pub const DEFAULT_PALETTE: [Rgb; 4] = [
    Rgb(0, 255, 255),
    Rgb(255, 100, 100),
    Rgb(100, 255, 100),
    Rgb(255, 255, 0),
];

// Per-channel presentation state, edited only from the UI thread
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelStyle {
    pub title: String,
    pub color: Rgb,
    pub x_label: String,
    pub y_label: String,
}

impl ChannelStyle {
    pub fn default_for(index: usize) -> Self {
        Self {
            title: format!("Channel {}", index + 1),
            color: DEFAULT_PALETTE[index % DEFAULT_PALETTE.len()],
            x_label: "Samples per second".to_owned(),
            y_label: "Amplitude".to_owned(),
        }
    }
}
