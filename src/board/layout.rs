//! Logical board position -> board-local 3D coordinates
//!
//! Point numbering (unmirrored): 1-12 run along the bottom from right to
//! left, 13-24 along the top from left to right. 0 and 25 are the two bar
//! stacks, 26 and 27 the home trays. Positions are the centre of the
//! piece's base (or of the piece itself when it lies in a tray).

use glam::{Quat, Vec3};
use std::f32::consts::FRAC_PI_2;

use super::config::BoardConfig;
use super::dice::DiceDisplay;
use super::{CubeOwner, CubeState, Player};

pub const BAR_BOTTOM: u32 = 0;
pub const BAR_TOP: u32 = 25;
pub const HOME_BOTTOM: u32 = 26;
pub const HOME_TOP: u32 = 27;
pub const NUM_POINTS: usize = 28;

/// Pieces per row on a playing point before stacking a new layer
const POINT_ROW: u32 = 5;
/// Pieces per row on the bar
const BAR_ROW: u32 = 3;
/// Spacing between pieces lying in a tray, in piece depths
const TRAY_SPACING: f32 = 1.2;

/// Swap left/right numbering of a playing point; other points are unchanged
pub fn mirror_point(point: u32) -> u32 {
    match point {
        1..=12 => 13 - point,
        13..=24 => 37 - point,
        _ => point,
    }
}

/// Position of the `depth`-th piece (1-based) on `point`
pub fn piece_position(cfg: &BoardConfig, point: u32, depth: u32, mirrored: bool) -> Vec3 {
    assert!(point < NUM_POINTS as u32, "point index {point} out of range");
    assert!(depth >= 1, "piece depth is 1-based");

    let mut v = match point {
        BAR_BOTTOM | BAR_TOP => bar_position(cfg, point, depth),
        HOME_BOTTOM | HOME_TOP => tray_position(cfg, point, depth, mirrored),
        _ => {
            let point = if mirrored { mirror_point(point) } else { point };
            point_position(cfg, point, depth)
        }
    };
    v.z += cfg.lift_off();
    v
}

fn bar_position(cfg: &BoardConfig, point: u32, depth: u32) -> Vec3 {
    let centre = cfg.centre();
    let layer = (depth - 1) / BAR_ROW;
    let slot = ((depth - 1) % BAR_ROW) as f32;

    let offset = cfg.cube_size() / 2.0
        + cfg.piece_gap()
        + (cfg.piece_hole() + cfg.piece_gap()) * slot
        + cfg.piece_hole() / 2.0;
    let y = if point == BAR_TOP {
        centre.y + offset
    } else {
        centre.y - offset
    };

    Vec3::new(
        centre.x,
        y,
        cfg.edge_top() + layer as f32 * cfg.piece_depth(),
    )
}

fn tray_position(cfg: &BoardConfig, point: u32, depth: u32, mirrored: bool) -> Vec3 {
    let x = if mirrored {
        cfg.tray_width() / 2.0
    } else {
        cfg.total_width() - cfg.tray_width() / 2.0
    };

    // Lying on its side: thickness runs along y
    let along = cfg.piece_depth() * TRAY_SPACING * (depth - 1) as f32 + cfg.piece_depth() / 2.0;
    let y = if point == HOME_BOTTOM {
        cfg.edge_height() + along
    } else {
        cfg.total_height() - cfg.edge_height() - along
    };

    Vec3::new(x, y, cfg.base_depth() + cfg.piece_hole() / 2.0)
}

fn point_position(cfg: &BoardConfig, point: u32, depth: u32) -> Vec3 {
    let hole = cfg.piece_hole();
    let (column, top) = if point <= 12 {
        (point - 1, false)
    } else {
        (24 - point, true)
    };

    // Columns count from the right-hand tray
    let mut x = cfg.total_width() - cfg.tray_width() - hole * (column as f32 + 0.5);
    if column >= 6 {
        x -= cfg.bar_width();
    }

    let layer = (depth - 1) / POINT_ROW;
    let slot = ((depth - 1) % POINT_ROW) as f32;
    let along = hole * (slot + 0.5);
    let y = if top {
        cfg.total_height() - cfg.edge_height() - along
    } else {
        cfg.edge_height() + along
    };

    Vec3::new(x, y, cfg.base_depth() + layer as f32 * cfg.piece_depth())
}

/// Resting orientation of a piece on `point`
pub fn piece_rotation(point: u32) -> Quat {
    match point {
        HOME_BOTTOM => Quat::from_rotation_x(FRAC_PI_2),
        HOME_TOP => Quat::from_rotation_x(-FRAC_PI_2),
        _ => Quat::IDENTITY,
    }
}

/// Centre of die `die` (0 or 1), or `None` when the dice are not shown
pub fn dice_position(cfg: &BoardConfig, die: usize, display: &DiceDisplay) -> Option<Vec3> {
    assert!(die < 2, "die index {die} out of range");

    match display {
        DiceDisplay::Hidden => None,
        DiceDisplay::BelowBoard { turn } => {
            let x = half_board_centre(cfg, *turn) + (die as f32 - 0.5) * cfg.dice_size() * 1.5;
            Some(Vec3::new(
                x,
                -cfg.dice_area_height() / 2.0,
                cfg.dice_size() / 2.0 + cfg.lift_off(),
            ))
        }
        DiceDisplay::OnBoard(placement) => Some(placement.resting_centre(cfg, die)),
    }
}

/// x of the centre of the half board `player` rolls onto
pub(crate) fn half_board_centre(cfg: &BoardConfig, player: Player) -> f32 {
    match player {
        Player::One => cfg.total_width() - cfg.tray_width() - cfg.board_width() / 2.0,
        Player::Two => cfg.tray_width() + cfg.board_width() / 2.0,
    }
}

/// Centre of the doubling cube
pub fn double_cube_position(cfg: &BoardConfig, cube: &CubeState) -> Vec3 {
    let centre = cfg.centre();
    let half = cfg.cube_size() / 2.0;

    if let Some(offerer) = cube.offered_by {
        let beside = cfg.bar_width() / 2.0 + half + cfg.piece_gap();
        let x = match offerer {
            Player::One => centre.x + beside,
            Player::Two => centre.x - beside,
        };
        return Vec3::new(x, centre.y, cfg.base_depth() + half + cfg.lift_off());
    }

    let y = match cube.owner {
        CubeOwner::Centred => centre.y,
        CubeOwner::Bottom => cfg.edge_height() + half,
        CubeOwner::Top => cfg.total_height() - cfg.edge_height() - half,
    };
    Vec3::new(centre.x, y, cfg.edge_top() + half + cfg.lift_off())
}
