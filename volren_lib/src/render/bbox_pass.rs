use nalgebra::{vector, Matrix4, Point3, Vector2, Vector3, Vector4};

use crate::error::EngineError;

use super::{
    geometry::{CUBE_INDICES, CUBE_VERTICES},
    target::CoordImage,
};

/// Which triangle facing gets culled during rasterization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullFace {
    /// Keep only back faces: rasterizes the far side of the cube,
    /// producing the ray exit coordinates
    Front,
    /// Keep only front faces: rasterizes the near side,
    /// producing the ray entry coordinates
    Back,
}

/// Rasterizes the bounding cube into a coordinate image.
///
/// Fragment output is the cube-local position remapped from `<-1;1>` to
/// `<0;1>`, which doubles as a normalized texture coordinate into the
/// volume. The cube is convex, so after culling at most one surface covers
/// each pixel and no depth test is needed.
pub struct BoundingBoxPass {
    vertices: [Point3<f32>; 8],
    indices: [u16; 36],
}

impl BoundingBoxPass {
    /// Prepare the constant vertex and index buffers
    pub fn new() -> Result<BoundingBoxPass, EngineError> {
        let pass = BoundingBoxPass {
            vertices: CUBE_VERTICES,
            indices: CUBE_INDICES,
        };

        // the rasterizer indexes the vertex buffer without bounds checks
        if let Some(&bad) = pass
            .indices
            .iter()
            .find(|&&i| (i as usize) >= pass.vertices.len())
        {
            return Err(EngineError::PipelineBuild {
                reason: format!("cube index {} out of range", bad),
            });
        }

        Ok(pass)
    }

    /// Render all 12 triangles under `mvp` into `target`, culling the given
    /// facing. The target is cleared first; pixels outside the cube
    /// silhouette keep the zero miss sentinel.
    pub fn render(&self, mvp: &Matrix4<f32>, cull: CullFace, target: &mut CoordImage) {
        target.clear();

        let width = target.width() as f32;
        let height = target.height() as f32;

        let clip: Vec<Vector4<f32>> = self
            .vertices
            .iter()
            .map(|p| mvp * vector![p.x, p.y, p.z, 1.0])
            .collect();

        for tri in self.indices.chunks_exact(3) {
            let c = [
                clip[tri[0] as usize],
                clip[tri[1] as usize],
                clip[tri[2] as usize],
            ];

            // no near-plane clipping; the camera is assumed outside the cube
            if c.iter().any(|v| v.w <= f32::EPSILON) {
                continue;
            }

            let mut win = [Vector2::zeros(); 3];
            let mut inv_w = [0.0f32; 3];
            for i in 0..3 {
                inv_w[i] = 1.0 / c[i].w;
                let ndc_x = c[i].x * inv_w[i];
                let ndc_y = c[i].y * inv_w[i];
                // window coordinates, y up
                win[i] = vector![
                    (ndc_x + 1.0) * 0.5 * width,
                    (ndc_y + 1.0) * 0.5 * height
                ];
            }

            // counter-clockwise (positive area) triangles face the camera
            let area = edge(win[0], win[1], win[2]);
            let keep = match cull {
                CullFace::Front => area < 0.0,
                CullFace::Back => area > 0.0,
            };
            if !keep {
                continue;
            }

            // interpolated attribute: normalized cube position, pre-divided
            // by w for perspective correction
            let mut attr = [Vector3::zeros(); 3];
            for i in 0..3 {
                let local = self.vertices[tri[i] as usize].coords;
                attr[i] = local.add_scalar(1.0) * 0.5 * inv_w[i];
            }

            fill_triangle(&win, &inv_w, &attr, area, target);
        }
    }
}

fn fill_triangle(
    win: &[Vector2<f32>; 3],
    inv_w: &[f32; 3],
    attr: &[Vector3<f32>; 3],
    area: f32,
    target: &mut CoordImage,
) {
    let min_x = win.iter().map(|v| v.x).fold(f32::INFINITY, f32::min);
    let max_x = win.iter().map(|v| v.x).fold(f32::NEG_INFINITY, f32::max);
    let min_y = win.iter().map(|v| v.y).fold(f32::INFINITY, f32::min);
    let max_y = win.iter().map(|v| v.y).fold(f32::NEG_INFINITY, f32::max);

    let x0 = min_x.floor().max(0.0) as usize;
    let x1 = (max_x.ceil().max(0.0) as usize).min(target.width());
    let y0 = min_y.floor().max(0.0) as usize;
    let y1 = (max_y.ceil().max(0.0) as usize).min(target.height());

    for y in y0..y1 {
        for x in x0..x1 {
            let p = vector![x as f32 + 0.5, y as f32 + 0.5];

            // normalized barycentrics; dividing by the signed area makes
            // them positive inside for either winding
            let w0 = edge(win[1], win[2], p) / area;
            let w1 = edge(win[2], win[0], p) / area;
            let w2 = edge(win[0], win[1], p) / area;
            if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                continue;
            }

            let one_over_w = w0 * inv_w[0] + w1 * inv_w[1] + w2 * inv_w[2];
            let coord = (attr[0] * w0 + attr[1] * w1 + attr[2] * w2) / one_over_w;
            target.put(x, y, coord);
        }
    }
}

// twice the signed area of triangle (a, b, c)
fn edge(a: Vector2<f32>, b: Vector2<f32>, c: Vector2<f32>) -> f32 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}
