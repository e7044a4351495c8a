use nalgebra::Vector3;

/// Off-screen image storing one object-space coordinate per pixel.
///
/// Cleared to zero each frame; a pixel left at the clear value in both the
/// entry and exit image marks a ray that misses the volume. Row 0 is the
/// bottom of the image.
pub struct CoordImage {
    width: usize,
    height: usize,
    data: Vec<Vector3<f32>>,
}

impl CoordImage {
    pub fn new(width: usize, height: usize) -> CoordImage {
        CoordImage {
            width,
            height,
            data: vec![Vector3::zeros(); width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self) {
        self.data.fill(Vector3::zeros());
    }

    pub fn get(&self, x: usize, y: usize) -> Vector3<f32> {
        self.data[x + y * self.width]
    }

    pub fn put(&mut self, x: usize, y: usize, coord: Vector3<f32>) {
        self.data[x + y * self.width] = coord;
    }
}

/// Final RGBA8 image, row 0 at the bottom
pub struct Frame {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl Frame {
    pub fn new(width: usize, height: usize) -> Frame {
        Frame {
            width,
            height,
            data: vec![0; width * height * 4],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Fill with opaque black
    pub fn clear(&mut self) {
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&[0, 0, 0, 255]);
        }
    }

    pub fn get(&self, x: usize, y: usize) -> [u8; 4] {
        let base = (x + y * self.width) * 4;
        [
            self.data[base],
            self.data[base + 1],
            self.data[base + 2],
            self.data[base + 3],
        ]
    }

    pub fn put(&mut self, x: usize, y: usize, rgba: [u8; 4]) {
        let base = (x + y * self.width) * 4;
        self.data[base..base + 4].copy_from_slice(&rgba);
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}
