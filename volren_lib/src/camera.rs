use nalgebra::{point, vector, Matrix4, Perspective3, Point3};

/// Orbiting camera described by spherical coordinates around the origin.
///
/// Angles are in degrees, up axis is +z. The conversion accepts any numeric
/// input; `radius == 0` puts the eye at the target and merely yields a
/// degenerate view transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    pub radius: f32,
    pub azimuth: f32,
    pub elevation: f32,
}

impl OrbitCamera {
    pub fn new(radius: f32, azimuth: f32, elevation: f32) -> OrbitCamera {
        OrbitCamera {
            radius,
            azimuth,
            elevation,
        }
    }

    /// Cartesian eye position on the orbit sphere
    pub fn eye(&self) -> Point3<f32> {
        let phi = self.azimuth.to_radians();
        let theta = self.elevation.to_radians();

        point![
            self.radius * theta.sin() * phi.cos(),
            self.radius * theta.sin() * phi.sin(),
            self.radius * theta.cos()
        ]
    }

    /// World to camera transform, looking at the origin
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.eye(), &Point3::origin(), &vector![0.0, 0.0, 1.0])
    }
}

/// Fixed perspective projection used by the bounding box pass.
///
/// 45 degree vertical field of view, near plane 0.1, far plane 100.
pub struct Projection {
    perspective: Perspective3<f32>,
}

impl Projection {
    pub fn new(aspect: f32) -> Projection {
        Projection {
            perspective: Perspective3::new(aspect, 45.0_f32.to_radians(), 0.1, 100.0),
        }
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        self.perspective.to_homogeneous()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-5, "{} != {}", a, b);
    }

    #[test]
    fn eye_on_polar_axis() {
        // elevation 0 means straight up the z axis, azimuth irrelevant
        let cam = OrbitCamera::new(4.0, 123.0, 0.0);
        let eye = cam.eye();

        assert_close(eye.x, 0.0);
        assert_close(eye.y, 0.0);
        assert_close(eye.z, 4.0);
    }

    #[test]
    fn eye_in_equatorial_plane() {
        let cam = OrbitCamera::new(2.0, 0.0, 90.0);
        let eye = cam.eye();

        assert_close(eye.x, 2.0);
        assert_close(eye.y, 0.0);
        assert_close(eye.z, 0.0);
    }

    #[test]
    fn view_matrix_maps_eye_to_origin() {
        let cam = OrbitCamera::new(3.0, 40.0, 70.0);
        let view = cam.view_matrix();
        let eye_in_cam = view.transform_point(&cam.eye());

        assert!(eye_in_cam.coords.magnitude() < 1e-4);
    }

    #[test]
    fn zero_radius_is_accepted() {
        // degenerate, but must not panic or be rejected
        let cam = OrbitCamera::new(0.0, 10.0, 10.0);
        let _ = cam.view_matrix();
        assert_eq!(cam.eye().coords.magnitude(), 0.0);
    }
}
