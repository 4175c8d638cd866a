//! Sub-tile interpolation along a discrete path, shared by every actor.

use std::time::Duration;

use donut_panic_core::{CellCoord, CellPoint};

/// Completed hop between two adjacent grid cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Step {
    pub(crate) from: CellCoord,
    pub(crate) to: CellCoord,
}

/// Ordered path plus a cursor tracking the next cell to reach.
///
/// Continuous position lags the grid position only while a move is in
/// flight; upon arrival at a waypoint both are snapped back into agreement.
#[derive(Clone, Debug, Default)]
pub(crate) struct Motion {
    path: Vec<CellCoord>,
    cursor: usize,
}

impl Motion {
    pub(crate) const fn idle() -> Self {
        Self {
            path: Vec::new(),
            cursor: 0,
        }
    }

    /// Replaces any in-flight path with a fresh one.
    pub(crate) fn follow(&mut self, path: Vec<CellCoord>) {
        self.path = path;
        self.cursor = 0;
    }

    pub(crate) fn clear(&mut self) {
        self.path.clear();
        self.cursor = 0;
    }

    pub(crate) fn is_moving(&self) -> bool {
        self.cursor < self.path.len()
    }

    /// Advances the continuous position toward the next waypoint.
    ///
    /// Moves `speed × dt` tiles along the straight segment to the waypoint,
    /// measured with Euclidean distance in continuous tile space. Within one
    /// step of the waypoint the position snaps exactly onto it, the grid
    /// cell is updated to match, and the cursor advances. Returns the
    /// completed hop, if any.
    pub(crate) fn advance(
        &mut self,
        position: &mut CellPoint,
        cell: &mut CellCoord,
        speed: f32,
        dt: Duration,
    ) -> Option<Step> {
        let target = *self.path.get(self.cursor)?;
        let step = speed * dt.as_secs_f32();

        let dx = target.column() as f32 - position.x();
        let dy = target.row() as f32 - position.y();
        let distance = (dx * dx + dy * dy).sqrt();

        if distance <= step {
            *position = CellPoint::from_cell(target);
            let from = *cell;
            *cell = target;
            self.cursor += 1;
            return Some(Step { from, to: target });
        }

        *position = CellPoint::new(
            position.x() + dx / distance * step,
            position.y() + dy / distance * step,
        );
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick(milliseconds: u64) -> Duration {
        Duration::from_millis(milliseconds)
    }

    #[test]
    fn advances_partially_toward_the_waypoint() {
        let mut motion = Motion::idle();
        motion.follow(vec![CellCoord::new(1, 0)]);
        let mut position = CellPoint::new(0.0, 0.0);
        let mut cell = CellCoord::new(0, 0);

        // 2 tiles/s for 100 ms covers a fifth of the segment.
        let step = motion.advance(&mut position, &mut cell, 2.0, tick(100));

        assert_eq!(step, None);
        assert!((position.x() - 0.2).abs() < 1e-6);
        assert!((position.y()).abs() < 1e-6);
        assert_eq!(cell, CellCoord::new(0, 0));
        assert!(motion.is_moving());
    }

    #[test]
    fn snaps_onto_the_waypoint_within_one_step() {
        let mut motion = Motion::idle();
        motion.follow(vec![CellCoord::new(0, 1)]);
        let mut position = CellPoint::new(0.0, 0.9);
        let mut cell = CellCoord::new(0, 0);

        let step = motion.advance(&mut position, &mut cell, 2.0, tick(100));

        assert_eq!(
            step,
            Some(Step {
                from: CellCoord::new(0, 0),
                to: CellCoord::new(0, 1),
            })
        );
        assert_eq!(position, CellPoint::new(0.0, 1.0));
        assert_eq!(cell, CellCoord::new(0, 1));
        assert!(!motion.is_moving());
    }

    #[test]
    fn exhausted_path_stops_reporting_motion() {
        let mut motion = Motion::idle();
        motion.follow(vec![CellCoord::new(1, 0), CellCoord::new(2, 0)]);
        let mut position = CellPoint::new(0.0, 0.0);
        let mut cell = CellCoord::new(0, 0);

        // Generous speed completes one waypoint per call.
        for _ in 0..2 {
            let _ = motion.advance(&mut position, &mut cell, 20.0, tick(100));
        }

        assert_eq!(cell, CellCoord::new(2, 0));
        assert_eq!(position, CellPoint::from_cell(cell));
        assert!(!motion.is_moving());
        assert_eq!(motion.advance(&mut position, &mut cell, 20.0, tick(100)), None);
    }

    #[test]
    fn follow_replaces_an_in_flight_path() {
        let mut motion = Motion::idle();
        motion.follow(vec![CellCoord::new(1, 0)]);
        let mut position = CellPoint::new(0.0, 0.0);
        let mut cell = CellCoord::new(0, 0);
        let _ = motion.advance(&mut position, &mut cell, 2.0, tick(100));

        motion.follow(vec![CellCoord::new(0, 1)]);
        assert!(motion.is_moving());

        // The new segment pulls the position back toward the fresh waypoint.
        let step = motion.advance(&mut position, &mut cell, 50.0, tick(100));
        assert_eq!(
            step,
            Some(Step {
                from: CellCoord::new(0, 0),
                to: CellCoord::new(0, 1),
            })
        );
    }

    #[test]
    fn clear_discards_motion_state() {
        let mut motion = Motion::idle();
        motion.follow(vec![CellCoord::new(1, 0)]);
        motion.clear();
        assert!(!motion.is_moving());
    }
}
