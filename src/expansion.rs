//! Margin expansion pass.
//!
//! Selected rooms are resettled with boxes grown by a margin on every side
//! and a much larger mass, then get their true-size boxes back at the new
//! positions. The layout keeps the margin spacing while stored geometry
//! stays the real room size.

use std::collections::BTreeSet;

use log::debug;

use crate::config::SimulationBudget;
use crate::error::{FloorError, FloorResult};
use crate::physics::{ConvexQuad, SimulationSpace};
use crate::relaxation::{drain, Relaxer, SpaceRoom};
use crate::room::{RoomFootprint, SimulatedRoom};

/// Keep the rooms whose index is in `selected`, removing the rest from the space.
///
/// Builds a fresh collection in original order, so the boss room (last
/// before filtering) is still last afterwards. On failure the kept rooms
/// are removed from the space as well.
pub fn retain_selected<S: SimulationSpace>(
    space: &mut S,
    rooms: Vec<SpaceRoom<S>>,
    selected: &BTreeSet<usize>,
) -> FloorResult<Vec<SpaceRoom<S>>> {
    puffin::profile_function!();

    let mut kept = Vec::with_capacity(selected.len());
    let mut failure = None;
    for (i, room) in rooms.into_iter().enumerate() {
        if selected.contains(&i) {
            kept.push(room);
        } else if let Err(err) = space.remove(room.body, room.shape) {
            failure.get_or_insert(err);
        }
    }

    if let Some(err) = failure.or_else(|| check_kept(&kept, selected).err()) {
        drain(space, &kept)?;
        return Err(err);
    }
    Ok(kept)
}

fn check_kept<B, S>(kept: &[SimulatedRoom<B, S>], selected: &BTreeSet<usize>) -> FloorResult<()> {
    if kept.len() != selected.len() {
        return Err(FloorError::InvariantViolation(format!(
            "kept {} rooms for {} selected indices",
            kept.len(),
            selected.len()
        )));
    }
    if !kept.last().is_some_and(|room| room.is_boss) {
        return Err(FloorError::InvariantViolation("boss room missing from selection".into()));
    }
    Ok(())
}

/// Grow every room by `margin`, resettle, then restore true sizes in place.
///
/// The space must hold exactly these rooms; unselected rooms are removed
/// beforehand by [`retain_selected`]. Each room's `shape` always names a
/// shape attached to its body, so the rooms can be drained even after a
/// failure.
pub fn expand_and_resettle<S: SimulationSpace>(
    space: &mut S,
    relaxer: &Relaxer,
    rooms: &mut [SpaceRoom<S>],
    margin: f32,
    budget: SimulationBudget,
) -> FloorResult<Vec<RoomFootprint>> {
    puffin::profile_function!();

    if space.body_count() != rooms.len() {
        return Err(FloorError::InvariantViolation(format!(
            "space holds {} bodies but {} rooms are being expanded",
            space.body_count(),
            rooms.len()
        )));
    }

    for room in rooms.iter_mut() {
        let enlarged = space.attach(room.body, ConvexQuad::expanded_for_room(&room.footprint, margin))?;
        space.detach(room.shape)?;
        room.shape = enlarged;
    }

    let bodies: Vec<S::BodyHandle> = rooms.iter().map(|room| room.body).collect();
    relaxer.run(space, &bodies, budget)?;

    for room in rooms.iter_mut() {
        let position = space.body(room.body)?.position;
        room.footprint = room.footprint.moved_to(position);
        let true_size = space.attach(room.body, ConvexQuad::for_room(&room.footprint))?;
        space.detach(room.shape)?;
        room.shape = true_size;
    }

    debug!("expanded {} rooms by margin {}", rooms.len(), margin);
    Ok(rooms.iter().map(|room| room.footprint).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::physics::RepulsionSpace;

    fn seeds() -> Vec<RoomFootprint> {
        vec![
            RoomFootprint::new(4.0, 4.0, 40.0, 40.0),
            RoomFootprint::new(3.0, 5.0, 46.0, 40.0),
            RoomFootprint::new(5.0, 3.0, 40.0, 46.0),
            RoomFootprint::new(4.0, 6.0, 60.0, 60.0),
            RoomFootprint::new(6.0, 6.0, 43.0, 43.0),
        ]
    }

    fn relaxed(space: &mut RepulsionSpace) -> (Relaxer, Vec<SpaceRoom<RepulsionSpace>>) {
        let relaxer = Relaxer::new(&SimulationConfig::default());
        let rooms = relaxer.relax(space, &seeds(), SimulationBudget::Frames(60)).unwrap();
        (relaxer, rooms)
    }

    #[test]
    fn test_retain_selected_removes_others() {
        let mut space = RepulsionSpace::new();
        let (_, rooms) = relaxed(&mut space);
        let kept = retain_selected(&mut space, rooms, &BTreeSet::from([0, 2, 4])).unwrap();

        assert_eq!(kept.len(), 3);
        assert_eq!(space.body_count(), 3);
        assert_eq!(space.shape_count(), 3);
        assert!(kept[2].is_boss);
        assert_eq!(kept[1].footprint.size(), seeds()[2].size());
    }

    #[test]
    fn test_retain_without_boss_fails() {
        let mut space = RepulsionSpace::new();
        let (_, rooms) = relaxed(&mut space);
        assert!(matches!(
            retain_selected(&mut space, rooms, &BTreeSet::from([0, 1])),
            Err(FloorError::InvariantViolation(_))
        ));
        assert!(space.is_empty());
    }

    #[test]
    fn test_retain_out_of_range_index_fails() {
        let mut space = RepulsionSpace::new();
        let (_, rooms) = relaxed(&mut space);
        assert!(retain_selected(&mut space, rooms, &BTreeSet::from([0, 4, 9])).is_err());
        assert!(space.is_empty());
    }

    #[test]
    fn test_expansion_keeps_one_shape_per_room() {
        let mut space = RepulsionSpace::new();
        let (relaxer, rooms) = relaxed(&mut space);
        let mut rooms = retain_selected(&mut space, rooms, &BTreeSet::from([0, 2, 4])).unwrap();

        expand_and_resettle(&mut space, &relaxer, &mut rooms, 2.0, SimulationBudget::Frames(5)).unwrap();

        assert_eq!(space.shape_count(), 3);
        drain(&mut space, &rooms).unwrap();
        assert!(space.is_empty());
    }

    #[test]
    fn test_expansion_spreads_rooms_apart() {
        let mut space = RepulsionSpace::new();
        let (relaxer, rooms) = relaxed(&mut space);
        let mut rooms = retain_selected(&mut space, rooms, &BTreeSet::from([0, 1, 2, 4])).unwrap();

        let footprints =
            expand_and_resettle(&mut space, &relaxer, &mut rooms, 2.0, SimulationBudget::Frames(200)).unwrap();

        for (i, a) in footprints.iter().enumerate() {
            for b in &footprints[i + 1..] {
                let gap = (a.center() - b.center()).abs() - (a.size() + b.size()) * 0.5;
                assert!(gap.x >= 3.5 || gap.y >= 3.5, "gap {gap:?} between {a:?} and {b:?}");
            }
        }
    }

    #[test]
    fn test_expansion_restores_true_size() {
        let mut space = RepulsionSpace::new();
        let (relaxer, rooms) = relaxed(&mut space);
        let mut rooms = retain_selected(&mut space, rooms, &BTreeSet::from([1, 3, 4])).unwrap();

        let footprints =
            expand_and_resettle(&mut space, &relaxer, &mut rooms, 2.0, SimulationBudget::Frames(50)).unwrap();

        let expected = [seeds()[1], seeds()[3], seeds()[4]];
        for ((footprint, room), seed) in footprints.iter().zip(&rooms).zip(expected) {
            assert_eq!(footprint.size(), seed.size());
            assert_eq!(space.body(room.body).unwrap().position, footprint.center());
        }
        assert_eq!(space.shape_count(), 3);

        drain(&mut space, &rooms).unwrap();
        assert!(space.is_empty());
    }

    #[test]
    fn test_expansion_requires_drained_space() {
        let mut space = RepulsionSpace::new();
        let (relaxer, mut rooms) = relaxed(&mut space);
        rooms.truncate(2);
        assert!(expand_and_resettle(&mut space, &relaxer, &mut rooms, 2.0, SimulationBudget::Frames(1)).is_err());
    }
}
