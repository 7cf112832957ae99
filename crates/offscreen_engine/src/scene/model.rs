//! Renderable model data
//!
//! A [`Model`] is owned by the caller and shared with the render thread as an
//! `Arc<Model>`. The pipeline never mutates it.

use crate::foundation::math::Vec3;
use crate::render::{RenderError, RenderResult};

use super::entity::Entity;
use super::scene_graph::BoundingBox;

/// Default surface colour of meshes that do not specify one
pub const DEFAULT_MESH_COLOR: [f32; 3] = [0.8, 0.8, 0.8];

/// Indexed triangle mesh with a flat surface colour
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Mesh identifier, unique within its model
    pub id: String,
    /// Vertex positions in model space
    pub positions: Vec<Vec3>,
    /// Triangles as indices into `positions`
    pub indices: Vec<[u32; 3]>,
    /// Linear RGB surface colour
    pub color: [f32; 3],
}

impl Mesh {
    /// Create a mesh with the default colour
    pub fn new(id: impl Into<String>, positions: Vec<Vec3>, indices: Vec<[u32; 3]>) -> Self {
        Self {
            id: id.into(),
            positions,
            indices,
            color: DEFAULT_MESH_COLOR,
        }
    }

    /// Set the surface colour
    pub fn with_color(mut self, color: [f32; 3]) -> Self {
        self.color = color;
        self
    }

    /// Axis-aligned cube of edge length 1 centred at the origin
    pub fn cube(id: impl Into<String>) -> Self {
        let positions = vec![
            Vec3::new(-0.5, -0.5, -0.5),
            Vec3::new(0.5, -0.5, -0.5),
            Vec3::new(0.5, 0.5, -0.5),
            Vec3::new(-0.5, 0.5, -0.5),
            Vec3::new(-0.5, -0.5, 0.5),
            Vec3::new(0.5, -0.5, 0.5),
            Vec3::new(0.5, 0.5, 0.5),
            Vec3::new(-0.5, 0.5, 0.5),
        ];
        let indices = vec![
            // front (+z)
            [4, 5, 6], [4, 6, 7],
            // back (-z)
            [1, 0, 3], [1, 3, 2],
            // right (+x)
            [5, 1, 2], [5, 2, 6],
            // left (-x)
            [0, 4, 7], [0, 7, 3],
            // top (+y)
            [7, 6, 2], [7, 2, 3],
            // bottom (-y)
            [0, 1, 5], [0, 5, 4],
        ];
        Self::new(id, positions, indices)
    }

    /// Check that every index is in range and every position is finite
    pub fn validate(&self) -> RenderResult<()> {
        if let Some(bad) = self
            .indices
            .iter()
            .flatten()
            .find(|&&i| i as usize >= self.positions.len())
        {
            return Err(RenderError::InvalidInput(format!(
                "mesh '{}' references vertex {} of {}",
                self.id,
                bad,
                self.positions.len()
            )));
        }
        if self.positions.iter().any(|p| !p.iter().all(|c| c.is_finite())) {
            return Err(RenderError::InvalidInput(format!(
                "mesh '{}' has non-finite vertex positions",
                self.id
            )));
        }
        Ok(())
    }

    /// Iterate over the triangles whose indices are all in range
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.iter().filter_map(move |tri| {
            let a = self.positions.get(tri[0] as usize)?;
            let b = self.positions.get(tri[1] as usize)?;
            let c = self.positions.get(tri[2] as usize)?;
            Some([*a, *b, *c])
        })
    }
}

/// # Model
///
/// Opaque renderable asset identified by a stable string id. Geometry lives in
/// `meshes`; `entities` place instances of the geometry in the scene. A model
/// without entities gets one default entity when it is installed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    /// Stable identifier carried by every frame rendered from this model
    pub id: String,
    /// Geometry
    pub meshes: Vec<Mesh>,
    /// Instances of the geometry
    pub entities: Vec<Entity>,
}

impl Model {
    /// Create an empty model
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Add a mesh
    pub fn with_mesh(mut self, mesh: Mesh) -> Self {
        self.meshes.push(mesh);
        self
    }

    /// Add an entity
    pub fn with_entity(mut self, entity: Entity) -> Self {
        self.entities.push(entity);
        self
    }

    /// Model consisting of a single unit cube
    pub fn placeholder_cube(id: impl Into<String>) -> Self {
        Self::new(id).with_mesh(Mesh::cube("cube"))
    }

    /// Number of renderable triangles over all meshes
    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(|m| m.triangles().count()).sum()
    }

    /// Whether at least one mesh carries a renderable triangle
    pub fn has_geometry(&self) -> bool {
        self.meshes.iter().any(|m| m.triangles().next().is_some())
    }

    /// Validate every mesh
    ///
    /// # Errors
    /// `InvalidInput` naming the first mesh with out-of-range indices or
    /// non-finite positions.
    pub fn validate(&self) -> RenderResult<()> {
        self.meshes.iter().try_for_each(Mesh::validate)
    }

    /// Bounds of every vertex referenced by a triangle
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(
            self.meshes
                .iter()
                .flat_map(Mesh::triangles)
                .flat_map(|tri| tri.into_iter()),
        )
    }
}
