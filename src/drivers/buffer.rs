use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use crate::drivers::PlotterError;
/// One decoded input record: the value for channel `i` sits at index `i`.
pub type SampleVector = Vec<f64>;
/// Point-in-time copy of one channel, taken under the buffer lock.
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelSnapshot {
    pub values: Vec<f64>,
    /// Capacity in force when the copy was taken.
    pub max_points: usize,
}
#[cfg(test)]
impl ChannelSnapshot {
    pub fn len(&self) -> usize {
        self.values.len()
    }
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
struct ChannelBuffer {
    samples: VecDeque<f64>,
    max_points: usize,
}
impl ChannelBuffer {
    fn with_capacity(max_points: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(max_points),
            max_points,
        }
    }
    fn push(&mut self, value: f64) {
        self.samples.push_back(value);
        self.trim();
    }
    fn trim(&mut self) {
        while self.samples.len() > self.max_points {
            self.samples.pop_front();
        }
    }
    fn snapshot(&self) -> ChannelSnapshot {
        ChannelSnapshot {
            values: self.samples.iter().copied().collect(),
            max_points: self.max_points,
        }
    }
}
/// Drop-oldest ring buffers, one per channel, shared between the ingest
/// thread (writer) and the render tick (reader).
///
/// A single lock guards every channel, so `append`, `set_capacity` and the
/// snapshot calls are serialized against each other and a snapshot never sees a
/// half-applied sample vector.
pub struct ChannelBufferSet {
    channels: Mutex<Vec<ChannelBuffer>>,
    num_channels: usize,
}
impl ChannelBufferSet {
    #[cfg(test)]
    pub fn new(num_channels: usize, max_points: usize) -> Result<Self, PlotterError> {
        Self::with_capacities(vec![max_points; num_channels])
    }
    pub fn with_capacities(capacities: Vec<usize>) -> Result<Self, PlotterError> {
        if let Some(&bad) = capacities.iter().find(|&&c| c == 0) {
            return Err(PlotterError::InvalidCapacity(bad));
        }
        let num_channels = capacities.len();
        let channels = capacities
            .into_iter()
            .map(ChannelBuffer::with_capacity)
            .collect();
        Ok(Self {
            channels: Mutex::new(channels),
            num_channels,
        })
    }
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }
    fn lock(&self) -> MutexGuard<'_, Vec<ChannelBuffer>> {
        // Every mutation leaves the buffers consistent, so a panic elsewhere
        // while holding the lock does not invalidate the data.
        self.channels.lock().unwrap_or_else(PoisonError::into_inner)
    }
    fn check_channel(&self, channel: usize) -> Result<(), PlotterError> {
        if channel >= self.num_channels {
            return Err(PlotterError::ChannelOutOfRange {
                channel,
                count: self.num_channels,
            });
        }
        Ok(())
    }
    /// Appends `sample[i]` to channel `i` for every channel the vector covers.
    /// Extra values are ignored; channels past the end of a short vector keep
    /// their previous contents.
    pub fn append(&self, sample: &[f64]) {
        let mut channels = self.lock();
        for (buffer, &value) in channels.iter_mut().zip(sample) {
            buffer.push(value);
        }
    }
    /// Changes a channel's capacity, truncating to the newest `max_points`
    /// entries right away.
    pub fn set_capacity(&self, channel: usize, max_points: usize) -> Result<(), PlotterError> {
        self.check_channel(channel)?;
        if max_points == 0 {
            return Err(PlotterError::InvalidCapacity(max_points));
        }
        let mut channels = self.lock();
        let buffer = &mut channels[channel];
        buffer.max_points = max_points;
        buffer.trim();
        log::debug!("channel {channel} capacity set to {max_points}");
        Ok(())
    }
    pub fn capacity(&self, channel: usize) -> Option<usize> {
        self.lock().get(channel).map(|b| b.max_points)
    }
    #[cfg(test)]
    pub fn len(&self, channel: usize) -> Option<usize> {
        self.lock().get(channel).map(|b| b.samples.len())
    }
    #[cfg(test)]
    pub fn snapshot(&self, channel: usize) -> Option<ChannelSnapshot> {
        self.lock().get(channel).map(ChannelBuffer::snapshot)
    }
    /// Copies every channel under one lock acquisition.
    pub fn snapshot_all(&self) -> Vec<ChannelSnapshot> {
        self.lock().iter().map(ChannelBuffer::snapshot).collect()
    }
    /// Empties every channel; capacities are kept.
    pub fn clear(&self) {
        for buffer in self.lock().iter_mut() {
            buffer.samples.clear();
        }
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;
    #[test]
    fn drops_oldest_values_once_full() {
        let set = ChannelBufferSet::new(1, 3).unwrap();
        for v in 1..=5 {
            set.append(&[v as f64]);
        }
        assert_eq!(set.snapshot(0).unwrap().values, vec![3.0, 4.0, 5.0]);
    }
    #[test]
    fn shrinking_capacity_keeps_newest_entries() {
        let set = ChannelBufferSet::new(2, 10).unwrap();
        for v in 0..8 {
            set.append(&[v as f64, -(v as f64)]);
        }
        set.set_capacity(0, 3).unwrap();
        assert_eq!(set.snapshot(0).unwrap().values, vec![5.0, 6.0, 7.0]);
        assert_eq!(set.len(1), Some(8));
        set.set_capacity(1, 20).unwrap();
        assert_eq!(set.len(1), Some(8));
        assert_eq!(set.capacity(1), Some(20));
    }
    #[test]
    fn short_vector_leaves_trailing_channels_untouched() {
        let set = ChannelBufferSet::new(4, 10).unwrap();
        set.append(&[1.0, 2.0, 3.0, 4.0]);
        set.append(&[5.0, 6.0]);
        set.append(&[7.0, 8.0, 9.0, 10.0, 11.0, 12.0]);
        let all = set.snapshot_all();
        assert_eq!(all[0].values, vec![1.0, 5.0, 7.0]);
        assert_eq!(all[1].values, vec![2.0, 6.0, 8.0]);
        assert_eq!(all[2].values, vec![3.0, 9.0]);
        assert_eq!(all[3].values, vec![4.0, 10.0]);
    }
    #[test]
    fn rejects_zero_capacity_and_unknown_channels() {
        assert!(matches!(
            ChannelBufferSet::new(2, 0),
            Err(PlotterError::InvalidCapacity(0))
        ));
        let set = ChannelBufferSet::new(2, 5).unwrap();
        assert!(matches!(
            set.set_capacity(0, 0),
            Err(PlotterError::InvalidCapacity(0))
        ));
        assert!(matches!(
            set.set_capacity(2, 5),
            Err(PlotterError::ChannelOutOfRange { channel: 2, count: 2 })
        ));
        assert!(set.snapshot(2).is_none());
    }
    #[test]
    fn clear_keeps_capacity() {
        let set = ChannelBufferSet::new(1, 4).unwrap();
        set.append(&[1.0]);
        set.clear();
        let snap = set.snapshot(0).unwrap();
        assert!(snap.is_empty());
        assert_eq!(snap.max_points, 4);
    }
    #[test]
    fn concurrent_appends_snapshots_and_resizes_stay_consistent() {
        const TOTAL: u32 = 50_000;
        let set = Arc::new(ChannelBufferSet::new(2, 500).unwrap());
        let done = Arc::new(AtomicBool::new(false));
        let writer = {
            let set = Arc::clone(&set);
            thread::spawn(move || {
                for v in 0..TOTAL {
                    let v = v as f64;
                    set.append(&[v, v]);
                }
            })
        };
        let resizer = {
            let set = Arc::clone(&set);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let sizes = [50, 5000, 120, 500, 1];
                let mut i = 0;
                while !done.load(Ordering::Relaxed) {
                    set.set_capacity(0, sizes[i % sizes.len()]).unwrap();
                    i += 1;
                    thread::yield_now();
                }
            })
        };
        let reader = {
            let set = Arc::clone(&set);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut checked = 0usize;
                while !done.load(Ordering::Relaxed) || checked == 0 {
                    for snap in set.snapshot_all() {
                        assert!(snap.len() <= snap.max_points);
                        // Contiguous run of consecutive values: nothing lost
                        // in the middle, nothing duplicated.
                        for pair in snap.values.windows(2) {
                            assert_eq!(pair[1], pair[0] + 1.0);
                        }
                    }
                    checked += 1;
                }
            })
        };
        writer.join().unwrap();
        done.store(true, Ordering::Relaxed);
        resizer.join().unwrap();
        reader.join().unwrap();
        let last = set.snapshot(1).unwrap();
        assert_eq!(last.len(), 500);
        assert_eq!(last.values.last().copied(), Some((TOTAL - 1) as f64));
    }
    proptest! {
        #[test]
        fn buffer_never_exceeds_capacity(
            capacity in 1usize..64,
            values in proptest::collection::vec(-1.0e6f64..1.0e6, 0..256),
        ) {
            let set = ChannelBufferSet::new(1, capacity).unwrap();
            for &v in &values {
                set.append(&[v]);
                prop_assert!(set.len(0).unwrap() <= capacity);
            }
            let keep = values.len().min(capacity);
            let expected = values[values.len() - keep..].to_vec();
            prop_assert_eq!(set.snapshot(0).unwrap().values, expected);
        }
    }
}
