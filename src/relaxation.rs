//! Physics-driven overlap removal.
//!
//! Rooms go into the space as boxes and the simulation runs for a fixed
//! budget rather than until it settles. Rotation only ever comes from
//! collision torque, so it is wiped after every substep to keep rooms
//! axis-aligned.

use std::time::Instant;

use log::debug;

use crate::config::{SimulationBudget, SimulationConfig};
use crate::error::FloorResult;
use crate::physics::{Body, ConvexQuad, SimulationSpace};
use crate::room::{RoomFootprint, SimulatedRoom};

pub type SpaceRoom<S> =
    SimulatedRoom<<S as SimulationSpace>::BodyHandle, <S as SimulationSpace>::ShapeHandle>;

/// Drives a simulation space with a fixed timestep.
#[derive(Debug, Clone, Copy)]
pub struct Relaxer {
    timestep: f32,
    substeps_per_frame: u32,
}

impl Relaxer {
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            timestep: config.timestep,
            substeps_per_frame: config.substeps_per_frame,
        }
    }

    /// Insert every footprint and run the space for `budget`.
    ///
    /// The last footprint is taken to be the boss room. Returned rooms keep
    /// their seeded size with positions read back from the space. If the
    /// run fails, the rooms inserted here are removed again.
    pub fn relax<S: SimulationSpace>(
        &self,
        space: &mut S,
        footprints: &[RoomFootprint],
        budget: SimulationBudget,
    ) -> FloorResult<Vec<SpaceRoom<S>>> {
        puffin::profile_function!();

        let boss_index = footprints.len().checked_sub(1);
        let mut rooms = Vec::with_capacity(footprints.len());
        for (i, footprint) in footprints.iter().enumerate() {
            let (body, shape) = space.add(Body::at(footprint.center()), ConvexQuad::for_room(footprint));
            rooms.push(SimulatedRoom::new(*footprint, body, shape, Some(i) == boss_index));
        }

        let bodies: Vec<S::BodyHandle> = rooms.iter().map(|room| room.body).collect();
        let settled = match self.run(space, &bodies, budget) {
            Ok(_) => read_positions(space, &mut rooms),
            Err(err) => Err(err),
        };
        if let Err(err) = settled {
            drain(space, &rooms)?;
            return Err(err);
        }
        Ok(rooms)
    }

    /// Step the space until `budget` is spent, zeroing rotation of `bodies`
    /// after every substep. Returns the number of frames run.
    pub fn run<S: SimulationSpace>(
        &self,
        space: &mut S,
        bodies: &[S::BodyHandle],
        budget: SimulationBudget,
    ) -> FloorResult<u32> {
        puffin::profile_function!();

        let mut frames = 0;
        match budget {
            SimulationBudget::Frames(limit) => {
                while frames < limit {
                    self.frame(space, bodies)?;
                    frames += 1;
                }
            }
            SimulationBudget::WallClock(duration) => {
                let start = Instant::now();
                while start.elapsed() < duration {
                    self.frame(space, bodies)?;
                    frames += 1;
                }
            }
        }

        debug!("relaxation ran {} frames over {} bodies", frames, bodies.len());
        Ok(frames)
    }

    fn frame<S: SimulationSpace>(&self, space: &mut S, bodies: &[S::BodyHandle]) -> FloorResult<()> {
        for _ in 0..self.substeps_per_frame {
            space.step(self.timestep);
            lock_rotation(space, bodies)?;
        }
        Ok(())
    }
}

/// Force angle and angular velocity of every body back to zero.
pub fn lock_rotation<S: SimulationSpace>(space: &mut S, bodies: &[S::BodyHandle]) -> FloorResult<()> {
    for &body in bodies {
        let mut state = space.body(body)?;
        state.angle = 0.0;
        state.angular_velocity = 0.0;
        space.set_body(body, state)?;
    }
    Ok(())
}

/// Copy current body positions into the rooms' footprints.
pub fn read_positions<S: SimulationSpace>(space: &S, rooms: &mut [SpaceRoom<S>]) -> FloorResult<()> {
    for room in rooms.iter_mut() {
        let position = space.body(room.body)?.position;
        room.footprint = room.footprint.moved_to(position);
    }
    Ok(())
}

/// Remove every room's body and shape from the space.
pub fn drain<S: SimulationSpace>(space: &mut S, rooms: &[SpaceRoom<S>]) -> FloorResult<()> {
    for room in rooms {
        space.remove(room.body, room.shape)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::RepulsionSpace;
    use glam::Vec2;

    /// Wraps a space and records every body's pose right before each step.
    ///
    /// With `set_body_budget` set, `set_body` starts failing once that many
    /// calls have gone through.
    struct Recording {
        inner: RepulsionSpace,
        bodies: Vec<<RepulsionSpace as SimulationSpace>::BodyHandle>,
        poses: Vec<(f32, f32)>,
        steps: usize,
        set_body_budget: Option<usize>,
    }

    fn recording(set_body_budget: Option<usize>) -> Recording {
        Recording {
            inner: RepulsionSpace::new(),
            bodies: Vec::new(),
            poses: Vec::new(),
            steps: 0,
            set_body_budget,
        }
    }

    impl SimulationSpace for Recording {
        type BodyHandle = <RepulsionSpace as SimulationSpace>::BodyHandle;
        type ShapeHandle = <RepulsionSpace as SimulationSpace>::ShapeHandle;

        fn add(&mut self, body: Body, shape: ConvexQuad) -> (Self::BodyHandle, Self::ShapeHandle) {
            let handles = self.inner.add(body, shape);
            self.bodies.push(handles.0);
            handles
        }
        fn attach(&mut self, body: Self::BodyHandle, shape: ConvexQuad) -> FloorResult<Self::ShapeHandle> {
            self.inner.attach(body, shape)
        }
        fn detach(&mut self, shape: Self::ShapeHandle) -> FloorResult<()> {
            self.inner.detach(shape)
        }
        fn remove(&mut self, body: Self::BodyHandle, shape: Self::ShapeHandle) -> FloorResult<()> {
            self.bodies.retain(|b| *b != body);
            self.inner.remove(body, shape)
        }
        fn step(&mut self, dt: f32) {
            for &body in &self.bodies {
                let state = self.inner.body(body).unwrap();
                self.poses.push((state.angle, state.angular_velocity));
            }
            self.steps += 1;
            self.inner.step(dt);
        }
        fn body(&self, body: Self::BodyHandle) -> FloorResult<Body> {
            self.inner.body(body)
        }
        fn set_body(&mut self, body: Self::BodyHandle, state: Body) -> FloorResult<()> {
            match self.set_body_budget.as_mut() {
                Some(0) => return Err(crate::error::FloorError::UnknownBody),
                Some(left) => *left -= 1,
                None => {}
            }
            self.inner.set_body(body, state)
        }
        fn body_count(&self) -> usize {
            self.inner.body_count()
        }
        fn shape_count(&self) -> usize {
            self.inner.shape_count()
        }
    }

    fn crowded_rooms() -> Vec<RoomFootprint> {
        vec![
            RoomFootprint::new(4.0, 4.0, 50.0, 50.0),
            RoomFootprint::new(5.0, 3.0, 51.0, 52.0),
            RoomFootprint::new(3.0, 6.0, 49.0, 48.5),
            RoomFootprint::new(6.0, 6.0, 50.5, 49.0),
        ]
    }

    fn relaxer() -> Relaxer {
        Relaxer::new(&SimulationConfig::default())
    }

    #[test]
    fn test_relax_keeps_sizes_and_marks_boss() {
        let mut space = RepulsionSpace::new();
        let footprints = crowded_rooms();
        let rooms = relaxer().relax(&mut space, &footprints, SimulationBudget::Frames(30)).unwrap();

        assert_eq!(rooms.len(), footprints.len());
        for (room, seed) in rooms.iter().zip(&footprints) {
            assert_eq!(room.footprint.size(), seed.size());
            assert_eq!(room.area, seed.area());
        }
        assert!(rooms.last().unwrap().is_boss);
        assert_eq!(rooms.iter().filter(|r| r.is_boss).count(), 1);
    }

    #[test]
    fn test_relax_removes_overlaps() {
        let mut space = RepulsionSpace::new();
        let rooms = relaxer().relax(&mut space, &crowded_rooms(), SimulationBudget::Frames(120)).unwrap();

        for (i, a) in rooms.iter().enumerate() {
            for b in &rooms[i + 1..] {
                assert!(!a.footprint.overlaps(&b.footprint, 0.1), "{:?} overlaps {:?}", a.footprint, b.footprint);
            }
        }
    }

    #[test]
    fn test_rotation_is_zero_before_every_step() {
        let mut space = recording(None);
        let rooms = relaxer().relax(&mut space, &crowded_rooms(), SimulationBudget::Frames(20)).unwrap();

        assert_eq!(space.steps, 20 * 10);
        assert!(space.poses.iter().all(|&(angle, spin)| angle == 0.0 && spin == 0.0));
        for room in &rooms {
            let state = space.body(room.body).unwrap();
            assert_eq!(state.angle, 0.0);
            assert_eq!(state.angular_velocity, 0.0);
        }
    }

    #[test]
    fn test_frame_budget_is_deterministic() {
        let run = || {
            let mut space = RepulsionSpace::new();
            relaxer()
                .relax(&mut space, &crowded_rooms(), SimulationBudget::Frames(40))
                .unwrap()
                .iter()
                .map(|r| r.footprint.center())
                .collect::<Vec<Vec2>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_wall_clock_budget_runs_frames() {
        let mut space = RepulsionSpace::new();
        let footprints = crowded_rooms();
        let rooms = relaxer().relax(&mut space, &footprints, SimulationBudget::Frames(0)).unwrap();
        let bodies: Vec<_> = rooms.iter().map(|r| r.body).collect();

        let frames = relaxer()
            .run(&mut space, &bodies, SimulationBudget::WallClock(std::time::Duration::from_millis(20)))
            .unwrap();
        assert!(frames > 0);
    }

    #[test]
    fn test_failed_relax_leaves_space_empty() {
        let mut space = recording(Some(7));
        let result = relaxer().relax(&mut space, &crowded_rooms(), SimulationBudget::Frames(5));
        assert_eq!(result.err(), Some(crate::error::FloorError::UnknownBody));
        assert!(space.is_empty());
    }

    #[test]
    fn test_drain_empties_space() {
        let mut space = RepulsionSpace::new();
        let rooms = relaxer().relax(&mut space, &crowded_rooms(), SimulationBudget::Frames(5)).unwrap();
        drain(&mut space, &rooms).unwrap();
        assert!(space.is_empty());
    }
}
