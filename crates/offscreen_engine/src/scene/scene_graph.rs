//! Render-thread scene state
//!
//! The scene holds at most one installed model. Only the render thread owns a
//! [`Scene`]; callers never see it.

use std::sync::Arc;

use crate::foundation::math::{Point3, Vec3};

use super::entity::Entity;
use super::model::Model;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl BoundingBox {
    /// Create a new bounding box from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Smallest box containing every point, or `None` for no points
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(Self::new(first, first), |bounds, p| {
            Self::new(bounds.min.inf(&p), bounds.max.sup(&p))
        }))
    }

    /// Get the center of the box
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the extents (half-size) of the box
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Radius of the sphere around the center that encloses the box
    pub fn radius(&self) -> f32 {
        self.extents().norm()
    }
}

/// A model installed in the scene together with its placed entities
#[derive(Debug, Clone)]
pub struct SceneModel {
    /// The installed model
    pub model: Arc<Model>,
    /// Entities drawing the model's geometry
    pub entities: Vec<Entity>,
}

impl SceneModel {
    /// Identifier of the installed model
    pub fn id(&self) -> &str {
        &self.model.id
    }

    /// World-space triangles with their surface colour, over every entity
    pub fn world_triangles(&self) -> impl Iterator<Item = ([Vec3; 3], [f32; 3])> + '_ {
        self.entities.iter().flat_map(move |entity| {
            self.model.meshes.iter().flat_map(move |mesh| {
                mesh.triangles().map(move |tri| {
                    let world = tri.map(|p| {
                        entity
                            .model_matrix
                            .transform_point(&Point3::from(p))
                            .coords
                    });
                    (world, mesh.color)
                })
            })
        })
    }
}

/// Scene content owned by the render thread
#[derive(Debug, Default)]
pub struct Scene {
    current: Option<SceneModel>,
}

impl Scene {
    /// Create an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove the installed model
    pub fn clear(&mut self) {
        if let Some(previous) = self.current.take() {
            log::trace!("Removed model '{}' from scene", previous.id());
        }
    }

    /// Currently installed model
    pub fn current(&self) -> Option<&SceneModel> {
        self.current.as_ref()
    }

    /// Whether no model is installed
    pub fn is_empty(&self) -> bool {
        self.current.is_none()
    }

    /// Replace the scene content with `model`.
    ///
    /// A model without renderable triangles, or with a mesh that fails
    /// validation, is swapped for a placeholder cube carrying the same id. A
    /// model without entities gets one normalized default entity.
    pub fn install(&mut self, model: Arc<Model>) -> &SceneModel {
        self.clear();

        let model = match model.validate() {
            Ok(()) if model.has_geometry() => model,
            Ok(()) => {
                log::warn!(
                    "Model '{}' has no renderable geometry, installing placeholder cube",
                    model.id
                );
                Arc::new(Model::placeholder_cube(model.id.clone()))
            }
            Err(error) => {
                log::warn!("{}, installing placeholder cube for '{}'", error, model.id);
                Arc::new(Model::placeholder_cube(model.id.clone()))
            }
        };

        let mut entities = model.entities.clone();
        if entities.is_empty() {
            entities.push(Entity::normalized(format!("{}#0", model.id), &model));
        }
        log::debug!(
            "Installed model '{}' ({} triangles, {} entities)",
            model.id,
            model.triangle_count(),
            entities.len()
        );

        self.current.insert(SceneModel { model, entities })
    }

    /// Recompute the model matrix of every entity
    pub fn update_transforms(&mut self) {
        if let Some(scene_model) = self.current.as_mut() {
            for entity in &mut scene_model.entities {
                entity.update_model_matrix();
            }
        }
    }
}
