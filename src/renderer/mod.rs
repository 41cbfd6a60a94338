//! WebGPU rendering module
//!
//! The scene is rebuilt as flat-shaded triangles every frame and drawn in
//! two passes over one vertex buffer: opaque geometry, then translucent
//! effects sorted back to front.

pub mod camera;
pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use camera::{CameraUniform, FollowCamera};
pub use pipeline::{RenderError, RenderState};
pub use scene::SceneMesh;
pub use vertex::Vertex;
