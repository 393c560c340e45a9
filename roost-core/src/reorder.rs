//! Move planning for ordered lists.
//!
//! [`plan_move`] takes one fully materialised, sorted list (see
//! [`roost_types::ListSelector`]) and a move request, and returns the
//! position writes that realise the move. Nothing else in the list is
//! renumbered, except once when every member still sits at position 0.
//!
//! The caller reads the list, plans and writes inside one unit of work; if
//! the list changed underneath, the plan must be recomputed.

use rand::Rng;
use roost_types::{ListEntry, PositionWrite};

use crate::error::CoreError;
use crate::position::{allocate_with, EDGE_GAP};

/// The writes that realise one move.
#[derive(Debug, Clone, PartialEq)]
pub struct MovePlan {
    /// The moved member and its new position.
    pub moved: PositionWrite,
    /// Its position before the move.
    pub previous: f64,
    /// One-time renumbering of the other members when the list was all
    /// zeroes; empty otherwise.
    pub repairs: Vec<PositionWrite>,
}

impl MovePlan {
    /// Whether the list was in the all-zero state and got renumbered.
    pub fn repaired(&self) -> bool {
        !self.repairs.is_empty()
    }

    /// All writes, repairs first.
    pub fn writes(&self) -> impl Iterator<Item = PositionWrite> + '_ {
        self.repairs.iter().copied().chain(std::iter::once(self.moved))
    }

    /// Consume the plan into its writes, repairs first.
    pub fn into_writes(self) -> Vec<PositionWrite> {
        let mut writes = self.repairs;
        writes.push(self.moved);
        writes
    }
}

/// Plan moving the member at `from` to `to` using the thread RNG.
pub fn plan_move(list: &[ListEntry], from: usize, to: usize) -> Result<MovePlan, CoreError> {
    plan_move_with(&mut rand::thread_rng(), list, from, to)
}

/// Plan moving the member at `from` to `to`.
///
/// `list` must already be in list order. `from == to` is allowed and still
/// allocates a fresh position that keeps the member where it is.
pub fn plan_move_with<R: Rng + ?Sized>(
    rng: &mut R,
    list: &[ListEntry],
    from: usize,
    to: usize,
) -> Result<MovePlan, CoreError> {
    let len = list.len();
    if from >= len || to >= len {
        return Err(CoreError::InvalidIndex { from, to, len });
    }

    let at_zero = list.iter().all(|entry| entry.position == 0.0);
    let (positions, repairs) = if at_zero {
        let positions: Vec<f64> = (0..len).map(|i| i as f64).collect();
        let repairs = list
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != from)
            .map(|(i, entry)| PositionWrite {
                id: entry.id,
                position: i as f64,
            })
            .collect();
        (positions, repairs)
    } else {
        (list.iter().map(|entry| entry.position).collect(), Vec::new())
    };

    let last = len - 1;
    let position = if to == 0 {
        allocate_with(rng, positions[0] - EDGE_GAP, positions[0])
    } else if to == last {
        allocate_with(rng, positions[last], positions[last] + EDGE_GAP)
    } else if to > from {
        allocate_with(rng, positions[to], positions[to + 1])
    } else {
        allocate_with(rng, positions[to - 1], positions[to])
    };

    Ok(MovePlan {
        moved: PositionWrite {
            id: list[from].id,
            position,
        },
        previous: list[from].position,
        repairs,
    })
}
