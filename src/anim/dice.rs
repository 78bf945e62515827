//! Bouncing dice throw paths

use glam::Vec3;

use super::path::{Path, PathType};
use crate::error::{Error, Result};

/// Launch offset from the resting position, in steps along x
const LAUNCH_STEPS: f32 = 5.0;

/// Build the throw path for die `die_index` landing on `target`
///
/// The die falls in from above and to the right of its resting place, then
/// makes two shrinking bounces toward -x. Each die launches half a step
/// further out than the previous one so the pair don't move in lockstep.
pub fn build_dice_path(die_index: usize, step_size: f32, target: Vec3) -> Result<Path> {
    if !(step_size > 0.0) || !step_size.is_finite() {
        return Err(Error::InvalidStep(step_size));
    }
    let s = step_size;
    let stagger = die_index as f32 * s / 2.0;

    let start = target + Vec3::new(LAUNCH_STEPS * s + stagger, 0.0, s);
    let first_landing = Vec3::new(target.x + 3.0 * s, target.y, target.z);
    let second_landing = Vec3::new(target.x + s, target.y, target.z);

    let mut path = Path::new(start);
    path.push(PathType::Parabola12To3, first_landing)?;
    path.push(PathType::Parabola, second_landing)?;
    path.push(PathType::Parabola, target)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anim::path::advance_segment;

    #[test]
    fn test_dice_path_reaches_target() {
        let target = Vec3::new(12.0, 5.5, 0.65);
        let mut path = build_dice_path(0, 0.7, target).unwrap();
        assert_eq!(
            path.segments().iter().map(|s| s.kind).collect::<Vec<_>>(),
            vec![PathType::Parabola12To3, PathType::Parabola, PathType::Parabola]
        );

        let sample = path.advance(path.total_length());
        assert!((sample.point - target).length() < 1e-4);
        let done = path.advance(path.total_length() + 1.0);
        assert!(done.finished);
        assert_eq!(done.point, target);
    }

    #[test]
    fn test_bounces_rise_above_the_board() {
        let target = Vec3::new(12.0, 5.5, 0.65);
        let path = build_dice_path(0, 0.7, target).unwrap();
        let mut start = path.start();
        for segment in path.segments() {
            if segment.kind == PathType::Parabola {
                let (mid, _) =
                    advance_segment(segment.kind, start, segment.end, segment.length / 2.0)
                        .unwrap();
                assert!(mid.z > start.z);
            }
            start = segment.end;
        }
    }

    #[test]
    fn test_falling_segment_starts_at_apex() {
        let target = Vec3::ZERO;
        let path = build_dice_path(0, 1.0, target).unwrap();
        let first = path.segments()[0];
        let (early, _) = advance_segment(first.kind, path.start(), first.end, 0.1).unwrap();
        assert!(early.z < path.start().z);
        assert!(early.x < path.start().x);
    }

    #[test]
    fn test_second_die_launches_further_out() {
        let a = build_dice_path(0, 0.5, Vec3::ZERO).unwrap();
        let b = build_dice_path(1, 0.5, Vec3::ZERO).unwrap();
        assert!(b.start().x > a.start().x);
        assert!((b.total_length() - a.total_length() - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_rejects_non_positive_step() {
        assert!(matches!(
            build_dice_path(0, 0.0, Vec3::ZERO),
            Err(Error::InvalidStep(_))
        ));
        assert!(matches!(
            build_dice_path(0, -1.0, Vec3::ZERO),
            Err(Error::InvalidStep(_))
        ));
    }
}
