// src/window.rs
use crate::reading::Reading;
use std::collections::VecDeque;

/// Most-recent-N readings shown on the live graph. Never persisted.
#[derive(Debug)]
pub struct DisplayWindow {
    readings: VecDeque<Reading>,
    capacity: usize,
}

impl DisplayWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            readings: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn push(&mut self, reading: Reading) {
        self.readings.push_back(reading);
        while self.readings.len() > self.capacity {
            self.readings.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn latest(&self) -> Option<&Reading> {
        self.readings.back()
    }

    /// `[index, distance]` pairs for the plot, oldest first.
    pub fn plot_points(&self) -> Vec<[f64; 2]> {
        self.readings
            .iter()
            .enumerate()
            .map(|(i, r)| [i as f64, r.distance_cm as f64])
            .collect()
    }

    /// Timestamp label for each point, index-aligned with [`Self::plot_points`].
    pub fn labels(&self) -> Vec<String> {
        self.readings.iter().map(Reading::timestamp_label).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn reading(cm: i32, ms: u32) -> Reading {
        let t = NaiveTime::from_hms_milli_opt(10, 0, ms / 1000, ms % 1000).unwrap();
        Reading::new(cm, t)
    }

    #[test]
    fn never_exceeds_capacity() {
        let mut w = DisplayWindow::new(50);
        for i in 0..500 {
            w.push(reading(i % 60, (i as u32) * 100 % 60_000));
            assert!(w.len() <= 50);
        }
        assert_eq!(w.len(), 50);
    }

    #[test]
    fn keeps_most_recent_in_order() {
        let mut w = DisplayWindow::new(3);
        for cm in 1..=5 {
            w.push(reading(cm, cm as u32));
        }
        assert_eq!(w.latest().map(|r| r.distance_cm), Some(5));
        assert_eq!(w.plot_points(), vec![[0.0, 3.0], [1.0, 4.0], [2.0, 5.0]]);
        assert_eq!(w.labels()[0], "10:00:00.003");
    }

    #[test]
    fn starts_empty() {
        let w = DisplayWindow::new(50);
        assert!(w.is_empty());
        assert!(w.plot_points().is_empty());
        assert!(w.latest().is_none());
    }
}
