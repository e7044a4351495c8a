use nalgebra::{Matrix4, Point3, Rotation3, Vector3};

use crate::error::EngineError;

/// Dense scalar field, one byte per voxel.
///
/// Storage is row major with x varying fastest, matching the raw asset
/// layout. Created once at startup and never mutated afterwards.
pub struct Volume {
    size: Vector3<usize>,
    scale: Vector3<f32>,
    rotation: Rotation3<f32>,
    data: Vec<u8>,
}

impl std::fmt::Debug for Volume {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Volume")
            .field("size", &self.size)
            .field("scale", &self.scale)
            .field("data len", &self.data.len())
            .finish()
    }
}

impl Volume {
    /// Assemble a volume from raw voxel bytes.
    ///
    /// `scale` is the anisotropic shape of the bounding cube, `rotation` the
    /// dataset orientation. `data` length must match `size`.
    pub fn from_data(
        size: Vector3<usize>,
        scale: Vector3<f32>,
        rotation: Rotation3<f32>,
        data: Vec<u8>,
    ) -> Result<Volume, EngineError> {
        let voxels = size.x * size.y * size.z;
        if data.len() != voxels {
            return Err(EngineError::AssetRetrieval {
                asset: "in-memory volume".into(),
                reason: format!("{} voxels declared, {} bytes supplied", voxels, data.len()),
            });
        }

        Ok(Volume {
            size,
            scale,
            rotation,
            data,
        })
    }

    pub fn get_size(&self) -> Vector3<usize> {
        self.size
    }

    /// Model transform mapping the canonical `<-1;1>` cube onto the
    /// dataset's physical proportions. Derived once from metadata.
    pub fn model_matrix(&self) -> Matrix4<f32> {
        self.rotation
            .to_homogeneous()
            .prepend_nonuniform_scaling(&self.scale)
    }

    fn voxel(&self, x: usize, y: usize, z: usize) -> f32 {
        self.data[x + self.size.x * (y + self.size.y * z)] as f32
    }

    /// Voxel byte at integer coordinates, for building and tests mostly
    pub fn get_data(&self, x: usize, y: usize, z: usize) -> Option<u8> {
        if x >= self.size.x || y >= self.size.y || z >= self.size.z {
            return None;
        }
        self.data.get(x + self.size.x * (y + self.size.y * z)).copied()
    }

    /// Trilinear sample at normalized coordinates `<0;1>^3`.
    ///
    /// Texel centers sit at `(i + 0.5) / n`; coordinates outside the field
    /// clamp to the edge. Returns intensity normalized to `<0;1>`.
    pub fn sample_at(&self, pos: Point3<f32>) -> f32 {
        let (x0, x1, tx) = axis_coord(pos.x, self.size.x);
        let (y0, y1, ty) = axis_coord(pos.y, self.size.y);
        let (z0, z1, tz) = axis_coord(pos.z, self.size.z);

        let c000 = self.voxel(x0, y0, z0);
        let c100 = self.voxel(x1, y0, z0);
        let c010 = self.voxel(x0, y1, z0);
        let c110 = self.voxel(x1, y1, z0);
        let c001 = self.voxel(x0, y0, z1);
        let c101 = self.voxel(x1, y0, z1);
        let c011 = self.voxel(x0, y1, z1);
        let c111 = self.voxel(x1, y1, z1);

        let c00 = c000 + (c100 - c000) * tx;
        let c10 = c010 + (c110 - c010) * tx;
        let c01 = c001 + (c101 - c001) * tx;
        let c11 = c011 + (c111 - c011) * tx;

        let c0 = c00 + (c10 - c00) * ty;
        let c1 = c01 + (c11 - c01) * ty;

        (c0 + (c1 - c0) * tz) / 255.0
    }
}

// Map one normalized axis coordinate to the two neighbouring texel indices
// and the interpolation weight, clamping to the edge.
fn axis_coord(u: f32, n: usize) -> (usize, usize, f32) {
    let v = u * n as f32 - 0.5;
    let lo = v.floor();
    let t = v - lo;

    let max = (n - 1) as f32;
    let i0 = lo.clamp(0.0, max) as usize;
    let i1 = (lo + 1.0).clamp(0.0, max) as usize;

    (i0, i1, t)
}
