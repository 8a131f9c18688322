//! Splitting the lanes of one row into passing, forking-off and merging sets.
//!
//! This is pure bookkeeping over lane positions. The builder has already done
//! every allocation and release for the row by the time it asks.

use std::collections::BTreeSet;

use crate::graph::Lane;

/// Everything the classifier needs to know about one row.
#[derive(Debug, Clone, Copy)]
pub struct RowInput<'a> {
    /// Lanes that were active when the row was entered.
    pub active: &'a BTreeSet<Lane>,
    /// The lane the commit itself sits on.
    pub own: Lane,
    /// Lanes of already-visited children that pointed at this commit.
    pub child_lanes: &'a [Lane],
    /// One lane per parent, in parent order. The first parent continues on `own`.
    pub parent_lanes: &'a [Lane],
}

impl RowInput<'_> {
    pub fn child_count(&self) -> usize {
        self.child_lanes.len()
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RowLanes {
    pub passing: BTreeSet<Lane>,
    pub forking_off: BTreeSet<Lane>,
    pub merging: BTreeSet<Lane>,
}

/// Classify the lanes of a row.
///
/// - forking-off: child lanes other than `own`. Those children branched off at
///   this commit, so their lanes end here.
/// - merging: lanes of the second and later parents. They start here and run
///   down to the merged-in parent.
/// - passing: every other lane that was active on entry.
pub fn classify_row(input: &RowInput<'_>) -> RowLanes {
    let forking_off: BTreeSet<Lane> = input
        .child_lanes
        .iter()
        .copied()
        .filter(|lane| *lane != input.own)
        .collect();

    let merging: BTreeSet<Lane> = input
        .parent_lanes
        .iter()
        .skip(1)
        .copied()
        .filter(|lane| *lane != input.own)
        .collect();

    let passing = input
        .active
        .iter()
        .copied()
        .filter(|lane| {
            *lane != input.own && !forking_off.contains(lane) && !merging.contains(lane)
        })
        .collect();

    RowLanes {
        passing,
        forking_off,
        merging,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lanes(positions: &[usize]) -> Vec<Lane> {
        positions.iter().copied().map(Lane::new).collect()
    }

    fn set(positions: &[usize]) -> BTreeSet<Lane> {
        positions.iter().copied().map(Lane::new).collect()
    }

    #[test]
    fn straight_continuation_has_no_sets() {
        let active = set(&[0]);
        let row = classify_row(&RowInput {
            active: &active,
            own: Lane::new(0),
            child_lanes: &lanes(&[0]),
            parent_lanes: &lanes(&[0]),
        });
        assert_eq!(row, RowLanes::default());
    }

    #[test]
    fn unrelated_lanes_pass_through() {
        let active = set(&[0, 1, 2]);
        let row = classify_row(&RowInput {
            active: &active,
            own: Lane::new(1),
            child_lanes: &lanes(&[1]),
            parent_lanes: &lanes(&[1]),
        });
        assert_eq!(row.passing, set(&[0, 2]));
        assert!(row.forking_off.is_empty());
        assert!(row.merging.is_empty());
    }

    #[test]
    fn extra_parents_are_merging() {
        let active = set(&[0, 3]);
        let row = classify_row(&RowInput {
            active: &active,
            own: Lane::new(0),
            child_lanes: &lanes(&[0]),
            parent_lanes: &lanes(&[0, 1, 2]),
        });
        assert_eq!(row.merging, set(&[1, 2]));
        assert_eq!(row.passing, set(&[3]));
        assert!(row.forking_off.is_empty());
    }

    #[test]
    fn converging_children_are_forking_off() {
        let active = set(&[0, 1, 2]);
        let row = classify_row(&RowInput {
            active: &active,
            own: Lane::new(0),
            child_lanes: &lanes(&[0, 2]),
            parent_lanes: &lanes(&[0]),
        });
        assert_eq!(row.forking_off, set(&[2]));
        assert_eq!(row.passing, set(&[1]));
        assert!(row.merging.is_empty());
    }

    #[test]
    fn merge_lane_may_reuse_a_lane_ending_on_the_same_row() {
        let active = set(&[0, 1]);
        let row = classify_row(&RowInput {
            active: &active,
            own: Lane::new(0),
            child_lanes: &lanes(&[0, 1]),
            parent_lanes: &lanes(&[0, 1]),
        });
        assert_eq!(row.forking_off, set(&[1]));
        assert_eq!(row.merging, set(&[1]));
        assert!(row.passing.is_empty());
    }

    #[test]
    fn new_tip_on_fresh_lane_sees_everything_else_passing() {
        let active = set(&[0, 2]);
        let row = classify_row(&RowInput {
            active: &active,
            own: Lane::new(1),
            child_lanes: &[],
            parent_lanes: &[],
        });
        assert_eq!(row.passing, set(&[0, 2]));
        assert!(row.forking_off.is_empty());
        assert!(row.merging.is_empty());
    }
}
