//! Time-driven playback of piece and dice paths

use glam::{Quat, Vec3};
use rand::Rng;

use super::dice::build_dice_path;
use super::moves::build_move_path;
use super::path::Path;
use crate::board::{BoardConfig, DicePlacement, piece_rotation};
use crate::error::Result;
use crate::settings::AnimationSettings;

/// Where a moving piece is this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PiecePose {
    pub position: Vec3,
    pub rotation: Quat,
    pub finished: bool,
}

/// One piece travelling along a move path
#[derive(Debug, Clone)]
pub struct PieceAnimation {
    path: Path,
    /// Board units per millisecond
    speed: f32,
    /// Orientation once landed
    landing: Quat,
}

impl PieceAnimation {
    pub fn new(path: Path, to_point: u32, speed: f32) -> Self {
        Self {
            path,
            speed,
            landing: piece_rotation(to_point),
        }
    }

    /// Build the move path and wrap it at the configured speed
    pub fn for_move(
        cfg: &BoardConfig,
        anim: &AnimationSettings,
        (from_point, from_depth): (u32, u32),
        (to_point, to_depth): (u32, u32),
        mirrored: bool,
    ) -> Result<Self> {
        let path = build_move_path(cfg, from_point, from_depth, to_point, to_depth, mirrored)?;
        Ok(Self::new(path, to_point, anim.units_per_ms(cfg)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Milliseconds from start to landing
    pub fn duration_ms(&self) -> f32 {
        self.path.total_length() / self.speed
    }

    /// Pose `elapsed_ms` after the animation started
    pub fn tick(&mut self, elapsed_ms: f32) -> PiecePose {
        let sample = self.path.advance(elapsed_ms.max(0.0) * self.speed);
        let rotation = match sample.rotate {
            Some(f) => Quat::IDENTITY.slerp(self.landing, f),
            None => Quat::IDENTITY,
        };
        PiecePose {
            position: sample.point,
            rotation,
            finished: sample.finished,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DicePose {
    pub position: Vec3,
    pub rotation: Quat,
    pub finished: bool,
}

#[derive(Debug, Clone)]
struct DieFlight {
    path: Path,
    axis: Vec3,
    /// Tumble angle still to unwind at launch, radians
    tumble: f32,
    rest: Quat,
}

/// Both dice bouncing onto their scattered resting places
#[derive(Debug, Clone)]
pub struct DiceAnimation {
    dice: [DieFlight; 2],
    speed: f32,
}

impl DiceAnimation {
    pub fn new<R: Rng>(
        cfg: &BoardConfig,
        placement: &DicePlacement,
        anim: &AnimationSettings,
        rng: &mut R,
    ) -> Result<Self> {
        let step = cfg.dice_size();
        let flight = |die: usize, rng: &mut R| -> Result<DieFlight> {
            let path = build_dice_path(die, step, placement.resting_centre(cfg, die))?;
            let axis = Vec3::new(
                rng.random_range(-1.0f32..=1.0),
                rng.random_range(-1.0f32..=1.0),
                rng.random_range(-1.0f32..=1.0),
            )
            .try_normalize()
            .unwrap_or(Vec3::Y);
            // Roll roughly as far as the die travels
            let tumble = path.total_length() / (step / 2.0);
            Ok(DieFlight {
                path,
                axis,
                tumble,
                rest: Quat::from_rotation_z(placement.spins[die]),
            })
        };

        Ok(Self {
            dice: [flight(0, rng)?, flight(1, rng)?],
            speed: anim.units_per_ms(cfg),
        })
    }

    pub fn duration_ms(&self) -> f32 {
        self.dice
            .iter()
            .map(|d| d.path.total_length())
            .fold(0.0, f32::max)
            / self.speed
    }

    pub fn tick(&mut self, elapsed_ms: f32) -> [DicePose; 2] {
        let distance = elapsed_ms.max(0.0) * self.speed;
        self.dice.each_mut().map(|die| {
            let total = die.path.total_length();
            let sample = die.path.advance(distance);
            let remaining = if sample.finished {
                0.0
            } else {
                (1.0 - distance / total).clamp(0.0, 1.0)
            };
            DicePose {
                position: sample.point,
                rotation: die.rest * Quat::from_axis_angle(die.axis, die.tumble * remaining),
                finished: sample.finished,
            }
        })
    }

    pub fn is_finished(&self) -> bool {
        self.dice.iter().all(|d| d.path.is_finished())
    }
}
