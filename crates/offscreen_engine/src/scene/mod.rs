//! # Scene Management
//!
//! Models, their placed entities and the single-model scene the render
//! thread draws from.

pub mod entity;
pub mod model;
pub mod scene_graph;

pub use entity::Entity;
pub use model::{Mesh, Model};
pub use scene_graph::{BoundingBox, Scene, SceneModel};
