//! # Software Backend
//!
//! CPU reference implementation of [`RenderBackend`]. Triangles are
//! rasterized with edge functions into a depth-tested frame buffer and shaded
//! with a fixed key light plus ambient term.
//!
//! It needs no graphics context, so the pipeline can run headless and tests
//! can render real scenes.

use image::{Rgba, RgbaImage};

use crate::core::config::WindowOptions;
use crate::foundation::math::{Mat4, Point3, Vec3};
use crate::scene::SceneModel;

use super::backend::RenderBackend;
use super::camera::Camera;
use super::{RenderError, RenderResult};

/// Direction towards the key light (unnormalized)
const KEY_LIGHT: Vec3 = Vec3::new(0.4, 0.8, 0.45);

/// Light intensity applied regardless of orientation
const AMBIENT: f32 = 0.2;

/// Screen-space area below which a triangle is skipped
const MIN_AREA: f32 = 1.0e-6;

#[derive(Debug, Clone, Copy)]
struct SceneTriangle {
    vertices: [Vec3; 3],
    color: [f32; 3],
}

/// Headless CPU rasterizer
#[derive(Debug)]
pub struct SoftwareBackend {
    width: u32,
    height: u32,
    background: Rgba<u8>,
    camera: Camera,
    light_dir: Vec3,
    triangles: Vec<SceneTriangle>,
    depth: Vec<f32>,
    frames_rendered: u64,
    disposed: bool,
}

impl SoftwareBackend {
    /// Create a backend rendering into a buffer described by `options`
    ///
    /// # Errors
    /// `InvalidInput` when the options do not validate.
    pub fn new(options: &WindowOptions) -> RenderResult<Self> {
        options.validate().map_err(RenderError::InvalidInput)?;
        log::info!(
            "Software backend created ({}x{})",
            options.width,
            options.height
        );

        Ok(Self {
            width: options.width,
            height: options.height,
            background: Rgba(options.background),
            camera: Camera::orthographic(options.ortho_half_extent, options.aspect()),
            light_dir: KEY_LIGHT.normalize(),
            triangles: Vec::new(),
            depth: vec![f32::INFINITY; (options.width * options.height) as usize],
            frames_rendered: 0,
            disposed: false,
        })
    }

    /// Number of frames rendered since creation
    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Number of triangles currently uploaded
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    fn ensure_alive(&self) -> RenderResult<()> {
        if self.disposed {
            Err(RenderError::BackendFatal(
                "software backend has been disposed".to_string(),
            ))
        } else {
            Ok(())
        }
    }

    fn shade(&self, triangle: &SceneTriangle) -> Option<Rgba<u8>> {
        let [a, b, c] = triangle.vertices;
        let mut normal = (b - a).cross(&(c - a)).try_normalize(f32::EPSILON)?;

        // Two-sided: orient the normal towards the viewer.
        let to_viewer = -self.camera.forward();
        if normal.dot(&to_viewer) < 0.0 {
            normal = -normal;
        }

        let diffuse = normal.dot(&self.light_dir).max(0.0);
        let intensity = (AMBIENT + (1.0 - AMBIENT) * diffuse).min(1.0);
        let channel = |c: f32| (c * intensity * 255.0).round().clamp(0.0, 255.0) as u8;
        Some(Rgba([
            channel(triangle.color[0]),
            channel(triangle.color[1]),
            channel(triangle.color[2]),
            255,
        ]))
    }

    fn rasterize(
        &mut self,
        image: &mut RgbaImage,
        triangle: &SceneTriangle,
        view_projection: &Mat4,
    ) {
        let Some(color) = self.shade(triangle) else {
            return;
        };

        let (w, h) = (self.width as f32, self.height as f32);
        let screen = triangle.vertices.map(|v| {
            let ndc = view_projection.transform_point(&Point3::from(v));
            Vec3::new((ndc.x + 1.0) * 0.5 * w, (1.0 - ndc.y) * 0.5 * h, ndc.z)
        });
        let [v0, v1, v2] = screen;

        let area = edge(&v0, &v1, &v2);
        if area.abs() < MIN_AREA {
            return;
        }

        let min_x = v0.x.min(v1.x).min(v2.x).floor().max(0.0) as u32;
        let min_y = v0.y.min(v1.y).min(v2.y).floor().max(0.0) as u32;
        let max_x = (v0.x.max(v1.x).max(v2.x).ceil().max(0.0) as u32).min(self.width);
        let max_y = (v0.y.max(v1.y).max(v2.y).ceil().max(0.0) as u32).min(self.height);

        for y in min_y..max_y {
            for x in min_x..max_x {
                let p = Vec3::new(x as f32 + 0.5, y as f32 + 0.5, 0.0);
                let b0 = edge(&v1, &v2, &p) / area;
                let b1 = edge(&v2, &v0, &p) / area;
                let b2 = edge(&v0, &v1, &p) / area;
                if b0 < 0.0 || b1 < 0.0 || b2 < 0.0 {
                    continue;
                }

                let z = b0 * v0.z + b1 * v1.z + b2 * v2.z;
                if !(-1.0..=1.0).contains(&z) {
                    continue;
                }

                let index = (y * self.width + x) as usize;
                if z < self.depth[index] {
                    self.depth[index] = z;
                    image.put_pixel(x, y, color);
                }
            }
        }
    }
}

/// Signed doubled area of the triangle (a, b, p) in screen space
fn edge(a: &Vec3, b: &Vec3, p: &Vec3) -> f32 {
    (p.x - a.x) * (b.y - a.y) - (p.y - a.y) * (b.x - a.x)
}

impl RenderBackend for SoftwareBackend {
    fn load_model(&mut self, model: &SceneModel) -> RenderResult<()> {
        self.ensure_alive()?;
        self.triangles = model
            .world_triangles()
            .map(|(vertices, color)| SceneTriangle { vertices, color })
            .collect();
        log::debug!(
            "Uploaded model '{}' ({} triangles)",
            model.id(),
            self.triangles.len()
        );
        Ok(())
    }

    fn clear_scene(&mut self) {
        self.triangles.clear();
    }

    fn set_camera(&mut self, position: Vec3, look_at: Vec3) -> RenderResult<()> {
        self.ensure_alive()?;
        self.camera.place(position, look_at)
    }

    fn render_frame(&mut self) -> RenderResult<RgbaImage> {
        self.ensure_alive()?;

        let mut image = RgbaImage::from_pixel(self.width, self.height, self.background);
        self.depth.fill(f32::INFINITY);

        let view_projection = self.camera.view_projection_matrix();
        let triangles = std::mem::take(&mut self.triangles);
        for triangle in &triangles {
            self.rasterize(&mut image, triangle, &view_projection);
        }
        self.triangles = triangles;

        self.frames_rendered += 1;
        log::trace!("Software frame {} rendered", self.frames_rendered);
        Ok(image)
    }

    fn dispose(&mut self) {
        if !self.disposed {
            self.disposed = true;
            self.triangles = Vec::new();
            self.depth = Vec::new();
            log::info!(
                "Software backend disposed after {} frames",
                self.frames_rendered
            );
        }
    }

    fn extent(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
