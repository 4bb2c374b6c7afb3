//! Per-section write lanes.
//!
//! Operations that write positions hold the lane of every section they touch
//! until all of their remote writes have settled, so position batches for one
//! section never interleave.

use tokio::sync::{Mutex, MutexGuard};

use crate::models::Section;

#[derive(Debug, Default)]
pub(crate) struct SectionLanes {
    lanes: [Mutex<()>; 3],
}

/// Held lanes; released on drop
pub(crate) struct LaneGuard<'a> {
    _held: Vec<MutexGuard<'a, ()>>,
}

impl SectionLanes {
    pub async fn lock(&self, section: Section) -> LaneGuard<'_> {
        LaneGuard {
            _held: vec![self.lanes[section.index()].lock().await],
        }
    }

    /// Lock two sections, always in section order.
    pub async fn lock_pair(&self, a: Section, b: Section) -> LaneGuard<'_> {
        if a == b {
            return self.lock(a).await;
        }
        let (low, high) = if a < b { (a, b) } else { (b, a) };
        let first = self.lanes[low.index()].lock().await;
        let second = self.lanes[high.index()].lock().await;
        LaneGuard {
            _held: vec![first, second],
        }
    }

    /// Lock every section, in section order.
    pub async fn lock_all(&self) -> LaneGuard<'_> {
        let mut held = Vec::with_capacity(self.lanes.len());
        for lane in &self.lanes {
            held.push(lane.lock().await);
        }
        LaneGuard { _held: held }
    }
}
