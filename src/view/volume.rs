//! Camera fitting for the tilted board
//!
//! The board is centred, tilted away from the viewer about x, and the camera
//! is pulled back along z until a set of anchor points fits a frustum of the
//! requested field of view. A final pass projects every anchor exactly and
//! rescales the frustum so the tightest anchor sits on the edge of the view.

use glam::{Mat4, Vec3};

use crate::board::{BoardConfig, CubeOwner, CubeState, double_cube_position};
use crate::error::{Error, Result};
use crate::settings::ViewSettings;

/// Narrowest aspect the fit works against; taller viewports widen the
/// vertical frustum afterwards instead of shrinking the board further
pub const MIN_FIT_ASPECT: f32 = 0.5;

/// Extent of the anchors in the tilted, recentred frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewArea {
    pub top: f32,
    pub bottom: f32,
    /// Full width, symmetric about the board centre
    pub width: f32,
}

impl Default for ViewArea {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewArea {
    /// Empty area; the first point added sets every bound
    pub fn new() -> Self {
        Self {
            top: f32::NEG_INFINITY,
            bottom: f32::INFINITY,
            width: f32::NEG_INFINITY,
        }
    }

    pub fn add_height_point(&mut self, y: f32) {
        self.top = self.top.max(y);
        self.bottom = self.bottom.min(y);
    }

    /// Add a point `offset` from the vertical centre line
    pub fn add_width_point(&mut self, offset: f32) {
        self.width = self.width.max(offset.abs() * 2.0);
    }

    pub fn is_empty(&self) -> bool {
        self.top < self.bottom || self.width < 0.0
    }

    pub fn height(&self) -> f32 {
        self.top - self.bottom
    }

    pub fn centre(&self) -> f32 {
        (self.top + self.bottom) / 2.0
    }

    pub fn ratio(&self) -> f32 {
        self.width / self.height()
    }
}

/// Board-local points that must stay on screen
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewAnchors {
    points: Vec<Vec3>,
}

impl ViewAnchors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, point: Vec3) {
        self.points.push(point);
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Board corners at table and frame height, plus the dice tray and a
    /// raised cube when those are showing
    pub fn for_board(cfg: &BoardConfig, cube: &CubeState, dice_below_board: bool) -> Self {
        let (w, h) = (cfg.total_width(), cfg.total_height());
        let mut anchors = Self::new();
        for z in [0.0, cfg.edge_top()] {
            for (x, y) in [(0.0, 0.0), (w, 0.0), (0.0, h), (w, h)] {
                anchors.push(Vec3::new(x, y, z));
            }
        }

        if dice_below_board {
            let y = -cfg.dice_area_height();
            let z = cfg.dice_size() + cfg.lift_off();
            anchors.push(Vec3::new(0.0, y, z));
            anchors.push(Vec3::new(w, y, z));
        }

        if cube.owner != CubeOwner::Centred || cube.offered_by.is_some() {
            let centre = double_cube_position(cfg, cube);
            anchors.push(centre + Vec3::Z * (cfg.cube_size() / 2.0));
        }
        anchors
    }
}

/// Fitted camera
#[derive(Debug, Clone, PartialEq)]
pub struct ViewVolume {
    /// Half width of the frustum at the near plane (of the box when orthographic)
    pub hor_frustum: f32,
    /// Half height of the frustum at the near plane (of the box when orthographic)
    pub vert_frustum: f32,
    pub near: f32,
    pub far: f32,
    /// Camera distance from the recentred board
    pub zoom: f32,
    pub area: ViewArea,
    /// Board-local to eye space
    pub model_view: Mat4,
    pub orthographic: bool,
}

impl ViewVolume {
    pub fn aspect(&self) -> f32 {
        self.hor_frustum / self.vert_frustum
    }

    /// Vertical field of view in radians (perspective only)
    pub fn fov_y(&self) -> f32 {
        2.0 * (self.vert_frustum / self.near).atan()
    }

    /// Eye to clip space, wgpu depth range
    pub fn projection(&self) -> Mat4 {
        if self.orthographic {
            Mat4::orthographic_rh(
                -self.hor_frustum,
                self.hor_frustum,
                -self.vert_frustum,
                self.vert_frustum,
                self.near,
                self.far,
            )
        } else {
            Mat4::perspective_rh(self.fov_y(), self.aspect(), self.near, self.far)
        }
    }

    /// Projection with the far plane at infinity, so shadow volume vertices
    /// extruded to `w = 0` are never clipped
    ///
    /// An orthographic view has no image for points at infinity, so plan view
    /// returns `None` and is drawn without shadows.
    pub fn shadow_projection(&self) -> Option<Mat4> {
        (!self.orthographic)
            .then(|| Mat4::perspective_infinite_rh(self.fov_y(), self.aspect(), self.near))
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.model_view
    }

    /// Board-local point to normalised device coordinates
    pub fn project(&self, point: Vec3) -> Vec3 {
        self.view_projection().project_point3(point)
    }
}

/// Fit the camera so every anchor is visible in a viewport of `aspect`
/// (width over height)
pub fn fit_view_volume(
    cfg: &BoardConfig,
    view: &ViewSettings,
    anchors: &ViewAnchors,
    aspect: f32,
) -> Result<ViewVolume> {
    if !(aspect > 0.0) || !aspect.is_finite() {
        return Err(Error::InvalidAspect(aspect));
    }
    if !(view.fov_degrees > 0.0 && view.fov_degrees < 180.0) {
        return Err(Error::InvalidFov(view.fov_degrees));
    }
    assert!(!anchors.points().is_empty(), "no view anchors");

    if view.plan_view {
        return Ok(fit_plan_view(cfg, view, anchors, aspect));
    }

    let near = view.near;
    let tan_v = (view.fov_degrees.to_radians() / 2.0).tan();
    let fit_aspect = aspect.max(MIN_FIT_ASPECT);
    let tan_h = tan_v * fit_aspect;

    let recentre = Mat4::from_translation(Vec3::new(
        -cfg.total_width() / 2.0,
        -cfg.total_height() / 2.0,
        0.0,
    ));
    let tilt = Mat4::from_rotation_x(-view.board_angle_degrees.to_radians());
    let board = tilt * recentre;

    // Fold every anchor into the area. Points nearer the camera than the
    // board centre will look bigger, so push them outward by how far the
    // frustum edge spreads over that depth.
    let mut area = ViewArea::new();
    let mut nearest = f32::NEG_INFINITY;
    for &p in anchors.points() {
        let r = board.transform_point3(p);
        let lift = r.z * tan_v;
        area.add_height_point(if r.y > 0.0 { r.y + lift } else { r.y - lift });
        area.add_width_point((r.x.abs() + r.z * tan_h).max(0.0));
        nearest = nearest.max(r.z);
    }

    let half_height = (area.height() / 2.0).max(near);
    let width_driven = area.ratio() > fit_aspect;
    let mut zoom = if width_driven {
        (area.width / 2.0) / tan_h
    } else {
        half_height / tan_v
    };
    zoom = zoom.max(nearest + near * 2.0);

    let fov_scale = near * tan_v;
    let mut hor = fov_scale * fit_aspect;
    let mut vert = fov_scale;
    if aspect < fit_aspect {
        vert = hor / aspect;
    }

    let model_view = Mat4::from_translation(Vec3::new(0.0, -area.centre(), -zoom)) * board;

    // Exact pass: scale the frustum to the anchor that projects furthest out
    let mut extent = 0.0f32;
    let mut farthest = 0.0f32;
    for &p in anchors.points() {
        let eye = model_view.transform_point3(p);
        let depth = -eye.z;
        extent = extent
            .max((eye.x * near / depth / hor).abs())
            .max((eye.y * near / depth / vert).abs());
        farthest = farthest.max(depth);
    }
    if extent > 0.0 {
        hor *= extent;
        vert *= extent;
    }

    log::debug!(
        "view fit: {} driven, zoom {zoom:.3}, frustum {hor:.4} x {vert:.4}, refit x{extent:.3}",
        if width_driven { "width" } else { "height" }
    );

    Ok(ViewVolume {
        hor_frustum: hor,
        vert_frustum: vert,
        near,
        far: view.far.max(farthest + near),
        zoom,
        area,
        model_view,
        orthographic: false,
    })
}

/// Straight-down orthographic view of the same anchors
fn fit_plan_view(
    cfg: &BoardConfig,
    view: &ViewSettings,
    anchors: &ViewAnchors,
    aspect: f32,
) -> ViewVolume {
    let centre = cfg.centre();
    let mut area = ViewArea::new();
    let mut top_z = f32::NEG_INFINITY;
    for p in anchors.points() {
        area.add_height_point(p.y - centre.y);
        area.add_width_point(p.x - centre.x);
        top_z = top_z.max(p.z);
    }

    let mut vert = (area.height() / 2.0).max(f32::EPSILON);
    let mut hor = vert * aspect;
    if area.width / 2.0 > hor {
        hor = area.width / 2.0;
        vert = hor / aspect;
    }

    let near = view.near;
    let zoom = top_z + near * 2.0;
    let model_view = Mat4::from_translation(Vec3::new(
        -centre.x,
        -centre.y - area.centre(),
        -zoom,
    ));

    ViewVolume {
        hor_frustum: hor,
        vert_frustum: vert,
        near,
        far: view.far.max(zoom + near),
        zoom,
        area,
        model_view,
        orthographic: true,
    }
}
