//! Piece move paths that lift over whatever lies between two points
//!
//! Every move is three segments: a quarter-ellipse lift-off to the near edge
//! of an obstacle corridor at clearance height, a straight run across the
//! corridor, and a quarter-ellipse descent onto the destination.

use glam::Vec3;

use super::path::{Path, PathType};
use crate::board::{BoardConfig, HOME_BOTTOM, HOME_TOP, piece_position};
use crate::error::{Error, Result};

/// Strip the path must cross at clearance height
#[derive(Debug, Clone, Copy, PartialEq)]
enum Corridor {
    /// Bounded in x (bar, tray walls)
    X { lo: f32, hi: f32 },
    /// Bounded in y (gap between the two rows of points)
    Y { lo: f32, hi: f32 },
}

/// Layers in the tallest legal stack (15 pieces, five per layer)
const TALLEST_STACK_LAYERS: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Obstacle {
    corridor: Corridor,
    clearance: f32,
}

fn is_tray(point: u32) -> bool {
    point == HOME_BOTTOM || point == HOME_TOP
}

/// Bottom row: 0-12 and 26; top row: 13-25 and 27
fn is_top_row(point: u32) -> bool {
    matches!(point, 13..=25 | HOME_TOP)
}

/// Build the animation path for moving a piece between two board slots
pub fn build_move_path(
    cfg: &BoardConfig,
    from_point: u32,
    from_depth: u32,
    to_point: u32,
    to_depth: u32,
    mirrored: bool,
) -> Result<Path> {
    let from = piece_position(cfg, from_point, from_depth, mirrored);
    let to = piece_position(cfg, to_point, to_depth, mirrored);

    let obstacle = obstacle_between(cfg, from_point, to_point, from, to);
    let height = obstacle
        .clearance
        .max(from.z + cfg.piece_depth())
        .max(to.z + cfg.piece_depth());
    let (lift_end, descent_start) = cross_corridor(obstacle.corridor, from, to, height)?;

    let mut path = Path::new(from);
    if is_tray(to_point) {
        path = path.with_rotation();
    }
    path.push(PathType::Curve9To12, lift_end)?;
    path.push(PathType::Line, descent_start)?;
    path.push(PathType::Curve12To3, to)?;

    log::trace!(
        "move path {from_point}/{from_depth} -> {to_point}/{to_depth}: {:?} at height {height}",
        obstacle.corridor
    );
    Ok(path)
}

/// Pick the corridor a move has to clear
///
/// Moves that pass over the bar or a tray wall clear those (the bar may be
/// carrying the cube). Otherwise a move between rows crosses the mid-board
/// gap, where a thrown die may lie. A move along one row only has to hop
/// over the pieces between its ends.
fn obstacle_between(
    cfg: &BoardConfig,
    from_point: u32,
    to_point: u32,
    from: Vec3,
    to: Vec3,
) -> Obstacle {
    let min_x = from.x.min(to.x);
    let max_x = from.x.max(to.x);
    let overlaps = |(lo, hi): (f32, f32)| lo < max_x && hi > min_x;

    let bar_clearance = cfg.edge_top() + cfg.cube_size() + cfg.piece_depth();
    let wall_clearance = cfg.edge_top() + cfg.piece_depth();
    let candidates = [
        (cfg.bar_extent(), bar_clearance),
        (cfg.tray_wall_extent(false), wall_clearance),
        (cfg.tray_wall_extent(true), wall_clearance),
    ];

    let mut crossed: Option<Obstacle> = None;
    for (extent, clearance) in candidates {
        if !overlaps(extent) {
            continue;
        }
        crossed = Some(match crossed {
            Some(Obstacle {
                corridor: Corridor::X { lo, hi },
                clearance: c,
            }) => Obstacle {
                corridor: Corridor::X {
                    lo: lo.min(extent.0),
                    hi: hi.max(extent.1),
                },
                clearance: c.max(clearance),
            },
            _ => Obstacle {
                corridor: Corridor::X {
                    lo: extent.0,
                    hi: extent.1,
                },
                clearance,
            },
        });
    }
    if let Some(obstacle) = crossed {
        return obstacle;
    }

    if is_top_row(from_point) != is_top_row(to_point) {
        let (lo, hi) = cfg.mid_gap_extent();
        return Obstacle {
            corridor: Corridor::Y { lo, hi },
            clearance: cfg.base_depth() + cfg.dice_size() + cfg.piece_depth(),
        };
    }

    // Same row, same half: hop over any stack on the points between
    let inset = cfg.piece_hole() / 4.0;
    let (lo, hi) = (min_x + inset, max_x - inset);
    let corridor = if hi > lo {
        Corridor::X { lo, hi }
    } else {
        let mid = (min_x + max_x) / 2.0;
        Corridor::X { lo: mid, hi: mid }
    };
    let over_stacks = cfg.base_depth() + (TALLEST_STACK_LAYERS + 1.0) * cfg.piece_depth();
    Obstacle {
        corridor,
        clearance: (from.z.max(to.z) + cfg.piece_depth() * 2.0).max(over_stacks),
    }
}

/// Points where the path reaches clearance height and where it starts down
///
/// Both lie on the straight line between the ends (seen from above), at the
/// corridor's near and far edges. An end already inside the corridor rises
/// or drops vertically.
fn cross_corridor(corridor: Corridor, from: Vec3, to: Vec3, height: f32) -> Result<(Vec3, Vec3)> {
    let (axis, lo, hi) = match corridor {
        Corridor::X { lo, hi } => (0, lo, hi),
        Corridor::Y { lo, hi } => (1, lo, hi),
    };

    let start = from[axis];
    let delta = to[axis] - start;
    if delta.abs() <= f32::EPSILON {
        return Err(Error::DegenerateSegment {
            kind: PathType::Line,
            at: from,
        });
    }

    let (near, far) = if delta > 0.0 { (lo, hi) } else { (hi, lo) };
    let t_near = ((near - start) / delta).clamp(0.0, 1.0);
    let t_far = ((far - start) / delta).clamp(0.0, 1.0);

    let at = |t: f32| from.truncate().lerp(to.truncate(), t).extend(height);
    Ok((at(t_near), at(t_far)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{BAR_TOP, HOME_BOTTOM};
    use proptest::prelude::*;

    fn cfg() -> BoardConfig {
        BoardConfig::default()
    }

    fn kinds(path: &Path) -> Vec<PathType> {
        path.segments().iter().map(|s| s.kind).collect()
    }

    /// Sample the whole path at `steps` evenly spaced distances
    fn samples(path: &mut Path, steps: usize) -> Vec<Vec3> {
        let total = path.total_length();
        (0..=steps)
            .map(|i| path.advance(total * i as f32 / steps as f32).point)
            .collect()
    }

    #[test]
    fn test_one_to_twenty_four_crosses_mid_gap() {
        let cfg = cfg();
        let path = build_move_path(&cfg, 1, 1, 24, 1, false).unwrap();
        assert_eq!(
            kinds(&path),
            vec![PathType::Curve9To12, PathType::Line, PathType::Curve12To3]
        );

        let (lo, hi) = cfg.mid_gap_extent();
        let line_start = path.segments()[0].end;
        let line_end = path.segments()[1].end;
        assert!((line_start.y - lo).abs() < 1e-5);
        assert!((line_end.y - hi).abs() < 1e-5);
        assert!(line_start.z >= cfg.base_depth() + cfg.dice_size());
    }

    #[test]
    fn test_crossing_the_bar_clamps_to_bar_extent() {
        let cfg = cfg();
        let (lo, hi) = cfg.bar_extent();
        let path = build_move_path(&cfg, 19, 1, 13, 2, false).unwrap();
        assert_eq!(path.segments().len(), 3);

        // Moving right to left: over the bar's right edge first
        let line_start = path.segments()[0].end;
        let line_end = path.segments()[1].end;
        assert!((line_start.x - hi).abs() < 1e-5);
        assert!((line_end.x - lo).abs() < 1e-5);
        assert!(line_start.z >= cfg.edge_top() + cfg.cube_size());
    }

    #[test]
    fn test_path_clears_the_bar() {
        let cfg = cfg();
        let (lo, hi) = cfg.bar_extent();
        let mut path = build_move_path(&cfg, 12, 1, 6, 1, false).unwrap();
        for p in samples(&mut path, 400) {
            if p.x > lo && p.x < hi {
                assert!(p.z >= cfg.edge_top() + cfg.cube_size() - 1e-4);
            }
        }
    }

    #[test]
    fn test_entering_from_bar_rises_vertically() {
        let cfg = cfg();
        let from = piece_position(&cfg, BAR_TOP, 1, false);
        let path = build_move_path(&cfg, BAR_TOP, 1, 20, 1, false).unwrap();
        let lift = path.segments()[0].end;
        assert!((lift.truncate() - from.truncate()).length() < 1e-5);
        assert!(lift.z > from.z);
    }

    #[test]
    fn test_bearing_off_rotates_and_clears_wall() {
        let cfg = cfg();
        let path = build_move_path(&cfg, 3, 1, HOME_BOTTOM, 1, false).unwrap();
        assert!(path.rotates());
        let (lo, _) = cfg.tray_wall_extent(false);
        assert!((path.segments()[0].end.x - lo).abs() < 1e-5);
        assert!(path.segments()[1].end.z > cfg.edge_top());

        let plain = build_move_path(&cfg, 3, 1, 5, 1, false).unwrap();
        assert!(!plain.rotates());
    }

    #[test]
    fn test_same_row_hop_clears_both_stacks() {
        let cfg = cfg();
        let from = piece_position(&cfg, 8, 7, false);
        let to = piece_position(&cfg, 7, 1, false);
        let path = build_move_path(&cfg, 8, 7, 7, 1, false).unwrap();
        let top = path.segments()[1].end.z;
        assert!(top >= from.z.max(to.z) + cfg.piece_depth() * 2.0 - 1e-6);
        let width = (path.segments()[1].end.x - path.segments()[0].end.x).abs();
        assert!((width - cfg.piece_hole() / 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_same_row_hop_clears_stacks_in_between() {
        let cfg = cfg();
        // 12 -> 9 passes over 11 and 10, which may hold up to 15 pieces
        let tallest = piece_position(&cfg, 10, 15, false).z + cfg.piece_depth();
        let mut path = build_move_path(&cfg, 12, 1, 9, 1, false).unwrap();
        let line = path.segments()[1];
        assert!(line.end.z > tallest);

        let (lo, hi) = {
            let a = piece_position(&cfg, 11, 1, false).x;
            let b = piece_position(&cfg, 10, 1, false).x;
            (a.min(b), a.max(b))
        };
        for p in samples(&mut path, 400) {
            if p.x >= lo && p.x <= hi {
                assert!(p.z > tallest, "dips into a stack at x = {}", p.x);
            }
        }
    }

    #[test]
    fn test_same_point_is_rejected() {
        let err = build_move_path(&cfg(), 8, 1, 8, 3, false).unwrap_err();
        assert!(matches!(err, Error::DegenerateSegment { .. }));
    }

    proptest! {
        #[test]
        fn prop_full_distance_reaches_destination(
            from_point in 1u32..=24,
            to_point in 0u32..=27,
            from_depth in 1u32..=15,
            to_depth in 1u32..=15,
            mirrored: bool,
        ) {
            prop_assume!(from_point != to_point);
            let cfg = cfg();
            let mut path = build_move_path(&cfg, from_point, from_depth, to_point, to_depth, mirrored)
                .unwrap();
            prop_assert_eq!(path.segments().len(), 3);

            let to = piece_position(&cfg, to_point, to_depth, mirrored);
            let sample = path.advance(path.total_length());
            prop_assert!((sample.point - to).length() < 1e-4);
        }

        #[test]
        fn prop_path_never_dips_below_its_ends(
            from_point in 1u32..=24,
            to_point in 0u32..=27,
            depth in 1u32..=10,
        ) {
            prop_assume!(from_point != to_point);
            let cfg = cfg();
            let from = piece_position(&cfg, from_point, depth, false);
            let to = piece_position(&cfg, to_point, 1, false);
            let mut path = build_move_path(&cfg, from_point, depth, to_point, 1, false).unwrap();
            let floor = from.z.min(to.z) - 1e-4;
            for p in samples(&mut path, 60) {
                prop_assert!(p.z >= floor);
            }
        }
    }
}
