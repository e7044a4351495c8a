//! Synthetic volumes shared by unit tests, integration tests and benches.

use nalgebra::{vector, Rotation3, Vector3};

use crate::volumetric::Volume;

/// Volume filled with a single value
pub fn solid_volume(size: Vector3<usize>, value: u8) -> Volume {
    let data = vec![value; size.x * size.y * size.z];
    Volume::from_data(size, vector![1.0, 1.0, 1.0], Rotation3::identity(), data)
        .expect("solid volume")
}

/// All-zero volume
pub fn zero_volume(size: Vector3<usize>) -> Volume {
    solid_volume(size, 0)
}

/// Scalar ramp along the z axis, 0 at the bottom slice up to 255 at the top
pub fn ramp_volume(size: Vector3<usize>) -> Volume {
    let mut data = Vec::with_capacity(size.x * size.y * size.z);
    for z in 0..size.z {
        let value = (z * 255 / (size.z - 1).max(1)) as u8;
        data.extend(std::iter::repeat(value).take(size.x * size.y));
    }
    Volume::from_data(size, vector![1.0, 1.0, 1.0], Rotation3::identity(), data)
        .expect("ramp volume")
}
