use std::collections::VecDeque;

use log::debug;

use crate::consts;

/// Bounded FIFO of accepted beat timestamps (ms). Strictly increasing; the
/// oldest entry is evicted when full.
#[derive(Clone, Debug)]
pub struct BeatHistory {
    timestamps: VecDeque<f64>,
    capacity: usize,
}

impl BeatHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(2);
        Self {
            timestamps: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends `timestamp`. Returns `false` and leaves the history unchanged
    /// if it does not come strictly after the newest entry.
    pub fn push(&mut self, timestamp: f64) -> bool {
        if let Some(&last) = self.timestamps.back() {
            if !(timestamp > last) {
                return false;
            }
        }
        if self.timestamps.len() == self.capacity {
            self.timestamps.pop_front();
        }
        self.timestamps.push_back(timestamp);
        true
    }

    pub fn last(&self) -> Option<f64> {
        self.timestamps.back().copied()
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.timestamps.iter()
    }

    pub fn clear(&mut self) {
        self.timestamps.clear();
    }
}

impl Default for BeatHistory {
    fn default() -> Self {
        Self::new(consts::BEAT_HISTORY_SIZE)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BeatEvent {
    pub timestamp_ms: f64,
    /// Running beat counter after this beat.
    pub count: u64,
}

/// Collapses the burst of peaks produced by one attack into a single beat.
#[derive(Debug, Default)]
pub struct BeatGate {
    history: BeatHistory,
    beat_count: u64,
}

impl BeatGate {
    pub fn new(history_size: usize) -> Self {
        Self {
            history: BeatHistory::new(history_size),
            beat_count: 0,
        }
    }

    /// Decides whether this frame's peaks count as a new beat.
    pub fn on_frame(
        &mut self,
        peaks: &[usize],
        now_ms: f64,
        min_peak_distance_ms: f64,
    ) -> Option<BeatEvent> {
        if peaks.is_empty() {
            return None;
        }

        if let Some(last) = self.history.last() {
            if now_ms - last <= min_peak_distance_ms {
                return None;
            }
        }

        if !self.history.push(now_ms) {
            return None;
        }
        self.beat_count += 1;
        debug!("Beat #{} at {:.1}ms", self.beat_count, now_ms);

        Some(BeatEvent {
            timestamp_ms: now_ms,
            count: self.beat_count,
        })
    }

    pub fn history(&self) -> &BeatHistory {
        &self.history
    }

    pub fn last_beat_ms(&self) -> Option<f64> {
        self.history.last()
    }

    /// Total beats accepted since the gate was created. Not reset by
    /// [`BeatGate::reset`].
    pub fn beat_count(&self) -> u64 {
        self.beat_count
    }

    /// The beat flash is lit for a fixed time after each accepted beat.
    pub fn flash_active(&self, now_ms: f64) -> bool {
        self.history
            .last()
            .is_some_and(|last| now_ms >= last && now_ms - last < consts::BEAT_FLASH_MS)
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_keeps_most_recent_in_order() {
        let mut history = BeatHistory::new(4);
        for t in [10.0, 20.0, 30.0, 40.0, 50.0] {
            assert!(history.push(t));
        }
        assert_eq!(history.len(), 4);
        let kept: Vec<f64> = history.iter().copied().collect();
        assert_eq!(kept, vec![20.0, 30.0, 40.0, 50.0]);
    }

    #[test]
    fn history_rejects_non_increasing() {
        let mut history = BeatHistory::new(4);
        assert!(history.push(10.0));
        assert!(!history.push(10.0));
        assert!(!history.push(5.0));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn first_beat_is_always_accepted() {
        let mut gate = BeatGate::new(8);
        let event = gate.on_frame(&[3], 12.0, 350.0).unwrap();
        assert_eq!(event.count, 1);
        assert_eq!(event.timestamp_ms, 12.0);
    }

    #[test]
    fn frames_without_peaks_are_ignored() {
        let mut gate = BeatGate::new(8);
        assert!(gate.on_frame(&[], 1000.0, 350.0).is_none());
        assert!(gate.history().is_empty());
    }

    #[test]
    fn beats_inside_the_window_are_debounced() {
        let mut gate = BeatGate::new(8);
        gate.on_frame(&[1], 0.0, 350.0);
        assert!(gate.on_frame(&[1], 200.0, 350.0).is_none());
        // the window is exclusive at its end
        assert!(gate.on_frame(&[1], 350.0, 350.0).is_none());
        let event = gate.on_frame(&[1], 351.0, 350.0).unwrap();
        assert_eq!(event.count, 2);
        let kept: Vec<f64> = gate.history().iter().copied().collect();
        assert_eq!(kept, vec![0.0, 351.0]);
    }

    #[test]
    fn flash_decays_after_100ms() {
        let mut gate = BeatGate::new(8);
        assert!(!gate.flash_active(0.0));
        gate.on_frame(&[1], 1000.0, 350.0);
        assert!(gate.flash_active(1000.0));
        assert!(gate.flash_active(1099.0));
        assert!(!gate.flash_active(1100.0));
    }

    #[test]
    fn reset_keeps_the_counter() {
        let mut gate = BeatGate::new(8);
        gate.on_frame(&[1], 0.0, 100.0);
        gate.on_frame(&[1], 500.0, 100.0);
        gate.reset();
        assert!(gate.history().is_empty());
        assert_eq!(gate.beat_count(), 2);
        assert_eq!(gate.on_frame(&[1], 10.0, 100.0).unwrap().count, 3);
    }
}
