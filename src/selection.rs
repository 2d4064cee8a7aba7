//! Fitness-proportional room selection.
//!
//! Roulette-wheel sampling without replacement: each room's slice of the
//! wheel is its area raised to the fitness exponent. The boss room never
//! enters the wheel and is added unconditionally afterwards.

use std::collections::BTreeSet;

use log::{debug, warn};
use rand::Rng;

use crate::constants::{SELECTION_CUMULATIVE_TOLERANCE, SELECTION_MAX_RETRIES};
use crate::error::{FloorError, FloorResult};

/// Cumulative fitness over the candidate rooms, in original index order.
#[derive(Debug, Clone)]
pub struct SelectionPool {
    /// `(room_index, cumulative_fitness)`, non-decreasing and ending at 1
    entries: Vec<(usize, f64)>,
}

impl SelectionPool {
    /// Build the wheel from room areas, leaving `boss_index` out.
    pub fn new(areas: &[f32], boss_index: usize, fitness_exponent: f64) -> FloorResult<Self> {
        let candidates: Vec<(usize, f64)> = areas
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != boss_index)
            .map(|(i, &area)| (i, (area as f64).powf(fitness_exponent)))
            .collect();

        let total: f64 = candidates.iter().map(|(_, fitness)| fitness).sum();
        if candidates.is_empty() || !(total > 0.0) || !total.is_finite() {
            return Err(FloorError::EmptySelectionPool);
        }

        let mut cumulative = 0.0;
        let entries = candidates
            .into_iter()
            .map(|(i, fitness)| {
                cumulative += fitness / total;
                (i, cumulative)
            })
            .collect::<Vec<_>>();

        let last = entries.last().map(|(_, c)| *c).unwrap_or(0.0);
        if (last - 1.0).abs() > SELECTION_CUMULATIVE_TOLERANCE {
            return Err(FloorError::InvariantViolation(format!(
                "cumulative fitness ends at {last}, expected 1"
            )));
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Position of the first bucket whose cumulative value reaches `draw`.
    fn bucket(&self, draw: f64) -> usize {
        let slot = self.entries.partition_point(|(_, cumulative)| *cumulative < draw);
        // Rounding can leave the last value a hair under the draw
        slot.min(self.entries.len() - 1)
    }

    /// Draw `count` distinct room indices.
    ///
    /// A draw that lands on a taken bucket is redrawn up to
    /// `SELECTION_MAX_RETRIES` times. If every retry collides, the first
    /// free bucket scanning forward (and wrapping) from the last landing
    /// spot is taken, so each slot always makes progress.
    pub fn sample(&self, count: usize, rng: &mut impl Rng) -> FloorResult<BTreeSet<usize>> {
        puffin::profile_function!();

        if count > self.entries.len() {
            return Err(FloorError::EmptySelectionPool);
        }

        let mut taken = vec![false; self.entries.len()];
        let mut selected = BTreeSet::new();

        for _ in 0..count {
            let mut landed = 0;
            let mut chosen = None;
            for _ in 0..=SELECTION_MAX_RETRIES {
                landed = self.bucket(rng.gen::<f64>());
                if !taken[landed] {
                    chosen = Some(landed);
                    break;
                }
            }

            let slot = match chosen {
                Some(slot) => slot,
                None => {
                    let slot = (0..self.entries.len())
                        .map(|offset| (landed + offset) % self.entries.len())
                        .find(|&slot| !taken[slot])
                        .ok_or(FloorError::EmptySelectionPool)?;
                    warn!(
                        "selection retries exhausted, falling back to room {}",
                        self.entries[slot].0
                    );
                    slot
                }
            };

            taken[slot] = true;
            selected.insert(self.entries[slot].0);
        }

        Ok(selected)
    }
}

/// Select `count` rooms weighted by area, plus the boss room.
///
/// The result always holds exactly `count + 1` distinct indices.
pub fn select(
    areas: &[f32],
    boss_index: usize,
    count: usize,
    fitness_exponent: f64,
    rng: &mut impl Rng,
) -> FloorResult<BTreeSet<usize>> {
    puffin::profile_function!();

    if boss_index >= areas.len() {
        return Err(FloorError::InvariantViolation(format!(
            "boss index {boss_index} out of range for {} rooms",
            areas.len()
        )));
    }

    let mut selected = if count == 0 {
        BTreeSet::new()
    } else {
        SelectionPool::new(areas, boss_index, fitness_exponent)?.sample(count, rng)?
    };
    selected.insert(boss_index);

    if selected.len() != count + 1 {
        return Err(FloorError::InvariantViolation(format!(
            "selected {} rooms, expected {}",
            selected.len(),
            count + 1
        )));
    }

    debug!("selected rooms {:?}", selected);
    Ok(selected)
}
