//! Placed instances of a model

use crate::foundation::math::{Mat4, Transform};

use super::model::Model;

/// Radius of the sphere a normalized entity is fitted into
pub const NORMALIZED_RADIUS: f32 = 0.5;

/// Instance of a model's geometry with its own transform
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    /// Entity identifier
    pub id: String,
    /// Identifier of the model whose geometry this entity draws
    pub model_id: String,
    /// Local transform
    pub transform: Transform,
    /// Cached `transform` matrix, refreshed by [`Entity::update_model_matrix`]
    pub model_matrix: Mat4,
}

impl Entity {
    /// Create an entity with the given transform
    pub fn new(id: impl Into<String>, model_id: impl Into<String>, transform: Transform) -> Self {
        let model_matrix = transform.to_matrix();
        Self {
            id: id.into(),
            model_id: model_id.into(),
            transform,
            model_matrix,
        }
    }

    /// Entity that centres the model's bounds at the origin and scales them
    /// into a sphere of radius [`NORMALIZED_RADIUS`].
    ///
    /// Models without bounds or with zero extent keep the identity transform.
    pub fn normalized(id: impl Into<String>, model: &Model) -> Self {
        let transform = match model.bounding_box() {
            Some(bounds) if bounds.radius() > f32::EPSILON => {
                let scale = NORMALIZED_RADIUS / bounds.radius();
                Transform::from_position_scale(-bounds.center() * scale, scale)
            }
            _ => Transform::identity(),
        };
        Self::new(id, model.id.clone(), transform)
    }

    /// Recompute the model matrix from the transform
    pub fn update_model_matrix(&mut self) {
        self.model_matrix = self.transform.to_matrix();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Point3, Vec3};
    use crate::scene::Mesh;
    use approx::assert_relative_eq;

    #[test]
    fn test_normalized_entity_fits_unit_sphere() {
        let positions = vec![
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(14.0, 0.0, 0.0),
            Vec3::new(10.0, 3.0, 0.0),
        ];
        let model = Model::new("tri").with_mesh(Mesh::new("t", positions.clone(), vec![[0, 1, 2]]));
        let entity = Entity::normalized("e", &model);

        for p in positions {
            let world = entity.model_matrix.transform_point(&Point3::from(p));
            assert!(world.coords.norm() <= NORMALIZED_RADIUS + 1e-5);
        }

        let center = entity
            .model_matrix
            .transform_point(&Point3::new(12.0, 1.5, 0.0));
        assert_relative_eq!(center.coords, Vec3::zeros(), epsilon = 1e-5);
    }

    #[test]
    fn test_update_model_matrix_tracks_transform() {
        let mut entity = Entity::new("e", "m", Transform::identity());
        entity.transform.position = Vec3::new(0.0, 2.0, 0.0);
        entity.update_model_matrix();

        let moved = entity.model_matrix.transform_point(&Point3::origin());
        assert_relative_eq!(moved.y, 2.0);
    }
}
