//! WebGPU rendering module
//!
//! Only the shadow volume pass lives here; visible board meshes are drawn
//! by the embedding application.

pub mod shadow_pipeline;
pub mod vertex;

pub use shadow_pipeline::ShadowRenderer;
pub use vertex::ShadowVertex;
