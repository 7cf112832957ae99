//! Procedural demo models

use offscreen_engine::foundation::math::{Transform, Vec3};
use offscreen_engine::scene::{Entity, Mesh, Model};

/// Square pyramid standing on the XZ plane
pub fn pyramid(id: &str) -> Model {
    let positions = vec![
        Vec3::new(-1.0, 0.0, -1.0),
        Vec3::new(1.0, 0.0, -1.0),
        Vec3::new(1.0, 0.0, 1.0),
        Vec3::new(-1.0, 0.0, 1.0),
        Vec3::new(0.0, 1.5, 0.0),
    ];
    let indices = vec![
        [0, 1, 2], [0, 2, 3],
        [0, 4, 1], [1, 4, 2], [2, 4, 3], [3, 4, 0],
    ];
    Model::new(id).with_mesh(Mesh::new("pyramid", positions, indices).with_color([0.9, 0.6, 0.2]))
}

/// Regular octahedron
pub fn octahedron(id: &str) -> Model {
    let positions = vec![
        Vec3::x(), -Vec3::x(),
        Vec3::y(), -Vec3::y(),
        Vec3::z(), -Vec3::z(),
    ];
    let indices = vec![
        [0, 2, 4], [4, 2, 1], [1, 2, 5], [5, 2, 0],
        [0, 4, 3], [4, 1, 3], [1, 5, 3], [5, 0, 3],
    ];
    Model::new(id)
        .with_mesh(Mesh::new("octahedron", positions, indices).with_color([0.3, 0.7, 0.9]))
}

/// Two offset cubes sharing one mesh, placed by explicit entities
pub fn twin_cubes(id: &str) -> Model {
    let place = |name: &str, offset: Vec3| {
        Entity::new(format!("{}-{}", id, name), id, Transform::from_position_scale(offset, 0.3))
    };
    Model::new(id)
        .with_mesh(Mesh::cube("cube").with_color([0.5, 0.9, 0.4]))
        .with_entity(place("low", Vec3::new(-0.15, -0.15, 0.0)))
        .with_entity(place("high", Vec3::new(0.15, 0.15, 0.1)))
}

/// Models rendered by the demo
pub fn catalog() -> Vec<Model> {
    vec![
        Model::placeholder_cube("cube"),
        pyramid("pyramid"),
        octahedron("octahedron"),
        twin_cubes("twin_cubes"),
        // No geometry: rendered as a placeholder cube.
        Model::new("empty"),
    ]
}
