//! Stencil shadow volumes
//!
//! Occluder geometry, silhouette extrusion and the board's set of shadow
//! casters. The GPU side lives in `renderer::shadow_pipeline`.

pub mod casters;
pub mod occluder;
pub mod stencil;
pub mod tessellate;

pub use casters::{BoardSnapshot, MAX_PIECES, ShadowCasters};
pub use occluder::{Edge, Face, Occluder, OccluderGeometry, VERTICES_PER_EDGE};
pub use stencil::{StencilConfig, StencilProbe, shadows_disabled};
pub use tessellate::{Grid3, bevelled_cylinder};
