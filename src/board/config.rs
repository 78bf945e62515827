//! Board dimensions
//!
//! Every dimension is stored as a multiple of `base_unit`; the accessors
//! return absolute board units. A point's width (the "piece hole") is 20
//! base units.
//!
//! Board-local frame: origin at the bottom-left corner of the frame, x to
//! the right, y up the board (away from the bottom player), z out of the
//! playing surface toward the viewer.

use glam::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Size of one base unit in board units
    pub base_unit: f32,
    /// Width of a point (and diameter of a piece)
    pub piece_hole: f32,
    /// Thickness of a piece
    pub piece_depth: f32,
    /// Gap between pieces stacked on the bar
    pub piece_gap: f32,
    /// Frame edge width (x)
    pub edge_width: f32,
    /// Frame edge height (y)
    pub edge_height: f32,
    /// How far the frame and bar stand above the playing surface
    pub edge_depth: f32,
    /// Height of the playing surface above the table
    pub base_depth: f32,
    pub bar_width: f32,
    /// Gap between the point tips of the bottom and top rows
    pub mid_gap: f32,
    pub dice_size: f32,
    pub cube_size: f32,
    /// Depth of the dice area below the board when dice are shown there
    pub dice_area_height: f32,
    /// Added to every resting z to avoid z-fighting
    pub lift_off: f32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            base_unit: 0.05,
            piece_hole: 20.0,
            piece_depth: 4.0,
            piece_gap: 1.0,
            edge_width: 5.0,
            edge_height: 5.0,
            edge_depth: 4.0,
            base_depth: 6.0,
            bar_width: 30.0,
            mid_gap: 20.0,
            dice_size: 14.0,
            cube_size: 20.0,
            dice_area_height: 25.0,
            lift_off: 0.1,
        }
    }
}

impl BoardConfig {
    #[inline]
    pub fn piece_hole(&self) -> f32 {
        self.piece_hole * self.base_unit
    }

    #[inline]
    pub fn piece_depth(&self) -> f32 {
        self.piece_depth * self.base_unit
    }

    #[inline]
    pub fn piece_gap(&self) -> f32 {
        self.piece_gap * self.base_unit
    }

    #[inline]
    pub fn edge_width(&self) -> f32 {
        self.edge_width * self.base_unit
    }

    #[inline]
    pub fn edge_height(&self) -> f32 {
        self.edge_height * self.base_unit
    }

    #[inline]
    pub fn edge_depth(&self) -> f32 {
        self.edge_depth * self.base_unit
    }

    #[inline]
    pub fn base_depth(&self) -> f32 {
        self.base_depth * self.base_unit
    }

    #[inline]
    pub fn bar_width(&self) -> f32 {
        self.bar_width * self.base_unit
    }

    #[inline]
    pub fn mid_gap(&self) -> f32 {
        self.mid_gap * self.base_unit
    }

    #[inline]
    pub fn dice_size(&self) -> f32 {
        self.dice_size * self.base_unit
    }

    #[inline]
    pub fn cube_size(&self) -> f32 {
        self.cube_size * self.base_unit
    }

    #[inline]
    pub fn dice_area_height(&self) -> f32 {
        self.dice_area_height * self.base_unit
    }

    #[inline]
    pub fn lift_off(&self) -> f32 {
        self.lift_off * self.base_unit
    }

    /// Tray width including its outer and inner walls
    pub fn tray_width(&self) -> f32 {
        self.edge_width() * 2.0 + self.piece_hole()
    }

    /// Width of one half board (six points)
    pub fn board_width(&self) -> f32 {
        self.piece_hole() * 6.0
    }

    /// Length of a point (five pieces)
    pub fn point_height(&self) -> f32 {
        self.piece_hole() * 5.0
    }

    pub fn total_width(&self) -> f32 {
        (self.tray_width() + self.board_width()) * 2.0 + self.bar_width()
    }

    pub fn total_height(&self) -> f32 {
        self.edge_height() * 2.0 + self.point_height() * 2.0 + self.mid_gap()
    }

    /// Board centre on the playing surface plane
    pub fn centre(&self) -> Vec2 {
        Vec2::new(self.total_width() / 2.0, self.total_height() / 2.0)
    }

    /// Top of the frame edges and bar
    pub fn edge_top(&self) -> f32 {
        self.base_depth() + self.edge_depth()
    }

    /// x-extent of the bar
    pub fn bar_extent(&self) -> (f32, f32) {
        let half = self.bar_width() / 2.0;
        let c = self.total_width() / 2.0;
        (c - half, c + half)
    }

    /// y-extent of the gap between point tips
    pub fn mid_gap_extent(&self) -> (f32, f32) {
        let half = self.mid_gap() / 2.0;
        let c = self.total_height() / 2.0;
        (c - half, c + half)
    }

    /// x-extent of the inner wall of the right (`mirrored == false`) or left tray
    pub fn tray_wall_extent(&self, mirrored: bool) -> (f32, f32) {
        if mirrored {
            let inner = self.tray_width();
            (inner - self.edge_width(), inner)
        } else {
            let inner = self.total_width() - self.tray_width();
            (inner, inner + self.edge_width())
        }
    }
}
