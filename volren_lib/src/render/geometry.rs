use nalgebra::{point, Point3};

/// Bounding cube vertices, side length 2 centered on the origin.
///
/// ```text
///       7---------------6
///      /|              /|
///     3-+-------------2 |
///     | |             | |
///     | 4-------------+-5
///     |/              |/
///     0---------------1
/// ```
///
/// The model transform scales this cube onto the dataset's physical
/// proportions; fragment positions remapped to `<0;1>` double as volume
/// texture coordinates.
pub const CUBE_VERTICES: [Point3<f32>; 8] = [
    point![-1.0, -1.0, -1.0],
    point![1.0, -1.0, -1.0],
    point![1.0, 1.0, -1.0],
    point![-1.0, 1.0, -1.0],
    point![-1.0, -1.0, 1.0],
    point![1.0, -1.0, 1.0],
    point![1.0, 1.0, 1.0],
    point![-1.0, 1.0, 1.0],
];

/// 6 faces * 2 triangles, wound counter-clockwise seen from outside
pub const CUBE_INDICES: [u16; 36] = [
    0, 2, 1, 0, 3, 2, // front
    1, 6, 5, 1, 2, 6, // right
    4, 3, 0, 4, 7, 3, // left
    4, 6, 7, 4, 5, 6, // back
    3, 6, 2, 3, 7, 6, // top
    1, 4, 0, 1, 5, 4, // bottom
];
