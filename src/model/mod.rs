// MODEL: Scene data
pub mod camera;
pub mod geometry;
pub mod material;
pub mod scene;

pub use camera::{Camera, CameraRig};
pub use geometry::{Mesh, MeshBuffer, Vertex};
pub use material::{ColorParams, PointsMaterial, Rgb, ToonGradient, ToonMaterial};
pub use scene::{DirectionalLight, Particles, SceneGraph, SectionMesh, SectionShape};
