// src/plotter.rs
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::PlotterConfig;
use crate::drivers::{
    ChannelBufferSet, IngestCounts, PlotterError, RenderFrame, RenderScheduler, RoutingTable,
};
use crate::engine::{ConnectionStatus, Engine};
use crate::types::{ChannelStyle, ConnectionMode, Rgb};

/// Everything the window drives, minus the widgets: buffers, routing, styles,
/// redraw cadence and the serial session.
pub struct Plotter {
    buffers: Arc<ChannelBufferSet>,
    routing: RoutingTable,
    styles: Vec<ChannelStyle>,
    scheduler: RenderScheduler,
    engine: Engine,
    frame: RenderFrame,
}

impl Plotter {
    pub fn new(config: &PlotterConfig) -> Result<Self, PlotterError> {
        config.validate()?;
        let buffers = Arc::new(ChannelBufferSet::with_capacities(config.capacities())?);
        let engine = Engine::new(Arc::clone(&buffers), config.read_timeout(), config.max_line_len);
        Ok(Self {
            routing: RoutingTable::identity(config.num_channels),
            styles: config.styles(),
            scheduler: RenderScheduler::with_rate_hz(config.refresh_hz),
            frame: RenderFrame::default(),
            buffers,
            engine,
        })
    }

    pub fn num_channels(&self) -> usize {
        self.buffers.num_channels()
    }

    #[cfg(test)]
    pub fn buffers(&self) -> &Arc<ChannelBufferSet> {
        &self.buffers
    }

    pub fn routing(&self) -> &RoutingTable {
        &self.routing
    }

    pub fn styles(&self) -> &[ChannelStyle] {
        &self.styles
    }

    /// Latest rendered frame; rebuilt only on scheduler ticks.
    pub fn frame(&self) -> &RenderFrame {
        &self.frame
    }

    pub fn status(&self) -> &ConnectionStatus {
        self.engine.status()
    }

    pub fn is_connected(&self) -> bool {
        self.engine.is_active()
    }

    pub fn counts(&self) -> IngestCounts {
        self.engine.counts()
    }

    // --- connection ---

    pub fn connect(
        &mut self,
        mode: ConnectionMode,
        port: &str,
        baud_text: &str,
    ) -> Result<(), PlotterError> {
        self.engine.connect(mode, port, baud_text)
    }

    pub fn disconnect(&mut self) {
        self.engine.disconnect();
    }

    // --- channel settings ---

    pub fn capacity(&self, channel: usize) -> Option<usize> {
        self.buffers.capacity(channel)
    }

    pub fn set_capacity(&mut self, channel: usize, max_points: usize) -> Result<(), PlotterError> {
        self.buffers.set_capacity(channel, max_points)
    }

    pub fn assign(&mut self, channel: usize, slot: usize) -> Result<(), PlotterError> {
        self.routing.assign(channel, slot)
    }

    pub fn reset_routing(&mut self) {
        self.routing.reset();
    }

    pub fn set_color(&mut self, channel: usize, color: Rgb) -> Result<(), PlotterError> {
        self.style_mut(channel)?.color = color;
        Ok(())
    }

    pub fn set_title(&mut self, channel: usize, title: &str) -> Result<(), PlotterError> {
        self.style_mut(channel)?.title = title.to_owned();
        Ok(())
    }

    pub fn set_x_label(&mut self, channel: usize, label: &str) -> Result<(), PlotterError> {
        self.style_mut(channel)?.x_label = label.to_owned();
        Ok(())
    }

    pub fn set_y_label(&mut self, channel: usize, label: &str) -> Result<(), PlotterError> {
        self.style_mut(channel)?.y_label = label.to_owned();
        Ok(())
    }

    fn style_mut(&mut self, channel: usize) -> Result<&mut ChannelStyle, PlotterError> {
        let count = self.styles.len();
        self.styles
            .get_mut(channel)
            .ok_or(PlotterError::ChannelOutOfRange { channel, count })
    }

    pub fn clear_buffers(&mut self) {
        self.buffers.clear();
    }

    // --- render cadence ---

    pub fn refresh_hz(&self) -> f64 {
        self.scheduler.rate_hz()
    }

    pub fn set_refresh_hz(&mut self, rate_hz: f64) {
        self.scheduler.set_rate_hz(rate_hz);
    }

    pub fn time_until_next_tick(&self, now: Instant) -> Duration {
        self.scheduler.time_until_next(now)
    }

    /// Picks up session events and, if a render tick is due, rebuilds the
    /// frame from fresh snapshots. Returns whether a new frame was built.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.engine.poll_events();
        if !self.scheduler.poll(now) {
            return false;
        }
        self.scheduler
            .render(&self.buffers, &self.routing, &self.styles, &mut self.frame);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plotter() -> Plotter {
        Plotter::new(&PlotterConfig::default()).unwrap()
    }

    #[test]
    fn setters_take_effect_on_next_tick_only() {
        let mut p = plotter();
        let t0 = Instant::now();
        p.buffers().append(&[1.0, 2.0, 3.0, 4.0]);
        assert!(p.tick(t0));
        assert_eq!(p.frame().slot(2)[0].values, vec![3.0]);

        p.assign(2, 1).unwrap();
        p.set_color(2, Rgb(9, 9, 9)).unwrap();
        // Same instant: no tick, frame unchanged.
        assert!(!p.tick(t0));
        assert_eq!(p.frame().slot(2)[0].channel, 2);

        assert!(p.tick(t0 + Duration::from_millis(20)));
        assert!(p.frame().slot(2).is_empty());
        let moved = &p.frame().slot(1)[1];
        assert_eq!((moved.channel, moved.color), (2, Rgb(9, 9, 9)));
    }

    #[test]
    fn capacity_and_labels_are_validated_per_channel() {
        let mut p = plotter();
        for v in 0..10 {
            p.buffers().append(&[v as f64]);
        }
        p.set_capacity(0, 4).unwrap();
        assert_eq!(p.capacity(0), Some(4));
        assert_eq!(p.buffers().len(0), Some(4));
        assert!(p.set_capacity(0, 0).is_err());
        p.set_title(1, "Torque").unwrap();
        p.set_x_label(1, "t").unwrap();
        p.set_y_label(1, "Nm").unwrap();
        assert_eq!(p.styles()[1].title, "Torque");
        assert!(p.set_y_label(4, "oops").is_err());
        p.clear_buffers();
        assert_eq!(p.buffers().len(0), Some(0));
    }

    #[test]
    fn invalid_baud_is_surfaced_without_session() {
        let mut p = plotter();
        assert!(p.connect(ConnectionMode::Hardware, "/dev/ttyUSB0", "abc").is_err());
        assert!(!p.is_connected());
        assert_eq!(p.status().to_string(), "⚠ Invalid baud rate");
    }

    #[test]
    fn refresh_rate_is_adjustable() {
        let mut p = plotter();
        assert_eq!(p.refresh_hz(), 60.0);
        p.set_refresh_hz(30.0);
        let t0 = Instant::now();
        assert!(p.tick(t0));
        assert!(!p.tick(t0 + Duration::from_millis(20)));
        assert!(p.tick(t0 + Duration::from_millis(34)));
        assert!(p.time_until_next_tick(t0 + Duration::from_millis(34)) > Duration::from_millis(30));
    }
}
