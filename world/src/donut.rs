//! Placed donut lures and their single-owner reservations.

use std::time::Duration;

use donut_panic_core::{CellCoord, DonutId, DonutKind, MonsterId, DONUT_LIFETIME};

/// A placed, time-limited attractor.
///
/// At most one monster may hold the reservation at a time; the reservation
/// is a weak relation carried as the monster's id, never an owning
/// reference. Expiry releases the reservation; consumption deactivates the
/// donut permanently.
#[derive(Clone, Debug)]
pub(crate) struct Donut {
    id: DonutId,
    kind: DonutKind,
    cell: CellCoord,
    active: bool,
    reserved_by: Option<MonsterId>,
    remaining: Duration,
}

impl Donut {
    pub(crate) fn new(id: DonutId, kind: DonutKind, cell: CellCoord) -> Self {
        Self {
            id,
            kind,
            cell,
            active: true,
            reserved_by: None,
            remaining: DONUT_LIFETIME,
        }
    }

    pub(crate) const fn id(&self) -> DonutId {
        self.id
    }

    pub(crate) const fn kind(&self) -> DonutKind {
        self.kind
    }

    pub(crate) const fn cell(&self) -> CellCoord {
        self.cell
    }

    pub(crate) const fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) const fn reserved_by(&self) -> Option<MonsterId> {
        self.reserved_by
    }

    pub(crate) const fn remaining(&self) -> Duration {
        self.remaining
    }

    /// Effective lure radius in tiles.
    pub(crate) fn lure_radius(&self) -> f32 {
        self.kind.lure_radius()
    }

    /// Time the eater spends consuming this donut.
    pub(crate) fn eat_duration(&self) -> Duration {
        self.kind.eat_duration()
    }

    /// Claims the donut for the provided monster.
    ///
    /// Succeeds when the donut is unreserved or already held by the same
    /// monster (idempotent); a reservation held by a different monster is
    /// never evicted.
    pub(crate) fn reserve(&mut self, owner: MonsterId) -> bool {
        match self.reserved_by {
            None => {
                self.reserved_by = Some(owner);
                true
            }
            Some(holder) => holder == owner,
        }
    }

    /// Marks the donut as eaten. An eaten donut never reactivates.
    pub(crate) fn consume(&mut self) {
        self.active = false;
    }

    /// Counts the lifetime down by one frame delta.
    ///
    /// Returns `true` on the tick the lifetime reaches zero; the donut
    /// deactivates and its reservation is released.
    pub(crate) fn tick(&mut self, dt: Duration) -> bool {
        if !self.active {
            return false;
        }

        self.remaining = self.remaining.saturating_sub(dt);
        if self.remaining.is_zero() {
            self.active = false;
            self.reserved_by = None;
            return true;
        }

        false
    }
}
