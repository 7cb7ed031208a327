use std::time::{Duration, Instant};
use crate::drivers::{ChannelBufferSet, RoutingTable};
use crate::types::{ChannelStyle, Rgb};
pub const MIN_REFRESH_HZ: f64 = 1.0;
pub const MAX_REFRESH_HZ: f64 = 240.0;
/// One channel's curve as handed to a plot slot.
#[derive(Clone, Debug, PartialEq)]
pub struct Curve {
    pub channel: usize,
    pub color: Rgb,
    pub values: Vec<f64>,
}
/// Receiver of one rendered frame: every slot is cleared first, then curves
/// arrive in channel order.
pub trait RenderSink {
    fn begin_frame(&mut self, slot_count: usize);
    fn draw(&mut self, slot: usize, curve: Curve);
}
/// Collected frame, drawn by the window and by the PNG exporter.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderFrame {
    slots: Vec<Vec<Curve>>,
}
impl RenderFrame {
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }
    pub fn slot(&self, index: usize) -> &[Curve] {
        self.slots.get(index).map(Vec::as_slice).unwrap_or(&[])
    }
    pub fn slots(&self) -> impl Iterator<Item = &[Curve]> {
        self.slots.iter().map(Vec::as_slice)
    }
}
impl RenderSink for RenderFrame {
    fn begin_frame(&mut self, slot_count: usize) {
        self.slots.iter_mut().for_each(Vec::clear);
        self.slots.resize_with(slot_count, Vec::new);
    }
    fn draw(&mut self, slot: usize, curve: Curve) {
        if let Some(curves) = self.slots.get_mut(slot) {
            curves.push(curve);
        }
    }
}
/// Fixed-cadence redraw clock, decoupled from how fast samples arrive.
pub struct RenderScheduler {
    rate_hz: f64,
    interval: Duration,
    last_tick: Option<Instant>,
}
impl RenderScheduler {
    pub fn with_rate_hz(rate_hz: f64) -> Self {
        let mut scheduler = Self {
            rate_hz: 0.0,
            interval: Duration::ZERO,
            last_tick: None,
        };
        scheduler.set_rate_hz(rate_hz);
        scheduler
    }
    pub fn set_rate_hz(&mut self, rate_hz: f64) {
        let rate_hz = if rate_hz.is_finite() {
            rate_hz.clamp(MIN_REFRESH_HZ, MAX_REFRESH_HZ)
        } else {
            60.0
        };
        self.rate_hz = rate_hz;
        self.interval = Duration::from_secs_f64(1.0 / rate_hz);
        log::debug!("render cadence set to {rate_hz:.1} Hz");
    }
    pub fn rate_hz(&self) -> f64 {
        self.rate_hz
    }
    #[cfg(test)]
    pub fn interval(&self) -> Duration {
        self.interval
    }
    /// True when a tick is due at `now`; the tick is then considered taken.
    ///
    /// Ticks advance on a fixed phase rather than from the moment of the poll,
    /// so polls landing slightly early or late do not drop frames. After a
    /// stall of more than one interval the phase restarts at `now`.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(last) = self.last_tick else {
            self.last_tick = Some(now);
            return true;
        };
        let next = last + self.interval;
        if now < next {
            return false;
        }
        let late = now.saturating_duration_since(next);
        self.last_tick = Some(if late >= self.interval { now } else { next });
        true
    }
    pub fn time_until_next(&self, now: Instant) -> Duration {
        self.last_tick
            .map(|last| (last + self.interval).saturating_duration_since(now))
            .unwrap_or(Duration::ZERO)
    }
    /// Snapshots every channel and submits each to its routed slot.
    pub fn render(
        &self,
        buffers: &ChannelBufferSet,
        routing: &RoutingTable,
        styles: &[ChannelStyle],
        sink: &mut dyn RenderSink,
    ) {
        sink.begin_frame(routing.slot_count());
        for (channel, snapshot) in buffers.snapshot_all().into_iter().enumerate() {
            let Some(slot) = routing.route(channel) else {
                continue;
            };
            let color = styles
                .get(channel)
                .map(|s| s.color)
                .unwrap_or(Rgb(255, 255, 255));
            sink.draw(
                slot,
                Curve {
                    channel,
                    color,
                    values: snapshot.values,
                },
            );
        }
    }
}
