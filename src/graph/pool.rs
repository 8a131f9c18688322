use std::collections::BTreeSet;

use tracing::trace;

use crate::graph::{GraphError, Lane};

/// Owns which lane positions are taken during one layout pass.
///
/// Released positions go to a free-list and are handed out smallest-first, so
/// the width of the graph tracks how many branches are open at once rather
/// than how many were ever opened.
#[derive(Debug, Default, Clone)]
pub struct LanePool {
    active: BTreeSet<Lane>,
    free: BTreeSet<Lane>,
    high_water: usize,
}

impl LanePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> Lane {
        let lane = match self.free.pop_first() {
            Some(lane) => lane,
            None => {
                let lane = Lane::new(self.high_water);
                self.high_water += 1;
                lane
            }
        };
        self.active.insert(lane);
        trace!("Allocated lane {}", lane);
        lane
    }

    pub fn release(&mut self, lane: Lane) -> Result<(), GraphError> {
        if !self.active.remove(&lane) {
            return Err(GraphError::InvalidLaneRelease { lane });
        }
        self.free.insert(lane);
        trace!("Released lane {}", lane);
        Ok(())
    }

    /// Lanes currently in use.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Number of distinct positions handed out so far.
    pub fn high_water(&self) -> usize {
        self.high_water
    }

    pub fn is_active(&self, lane: Lane) -> bool {
        self.active.contains(&lane)
    }

    pub fn is_free(&self, lane: Lane) -> bool {
        self.free.contains(&lane)
    }

    /// Active lanes in ascending position order.
    pub fn active_lanes(&self) -> impl Iterator<Item = Lane> + '_ {
        self.active.iter().copied()
    }
}
