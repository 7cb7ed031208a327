use crate::drivers::PlotterError;
/// Channel -> plot slot mapping, read once per render tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoutingTable {
    targets: Vec<usize>,
}
impl RoutingTable {
    /// Identity routing: channel `i` draws into slot `i`.
    pub fn identity(num_channels: usize) -> Self {
        Self {
            targets: (0..num_channels).collect(),
        }
    }
    pub fn slot_count(&self) -> usize {
        self.targets.len()
    }
    /// Points `channel` at `slot`. The slot is stored as given; one outside
    /// `0..slot_count()` simply makes the channel invisible.
    pub fn assign(&mut self, channel: usize, slot: usize) -> Result<(), PlotterError> {
        let count = self.targets.len();
        let target = self
            .targets
            .get_mut(channel)
            .ok_or(PlotterError::ChannelOutOfRange { channel, count })?;
        *target = slot;
        log::debug!("channel {channel} routed to plot {slot}");
        Ok(())
    }
    /// Raw stored target, for populating selectors.
    pub fn target(&self, channel: usize) -> Option<usize> {
        self.targets.get(channel).copied()
    }
    /// Slot to draw `channel` into this frame, or `None` to skip it.
    pub fn route(&self, channel: usize) -> Option<usize> {
        self.target(channel)
            .filter(|&slot| slot < self.slot_count())
    }
    pub fn reset(&mut self) {
        *self = Self::identity(self.targets.len());
    }
}
