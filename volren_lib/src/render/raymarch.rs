//! Per-pixel ray marching and compositing over the entry/exit images.

use nalgebra::{point, vector, Point3, Vector3};

use crate::{color::RGBA, transfer_function::LookupTable, volumetric::Volume};

use super::{
    params::{CompositingMode, OutputMode, RenderParams},
    target::{CoordImage, Frame},
};

/// Sampling density the front-to-back opacity correction is normalized
/// against, so the image brightness stays independent of the step size
const REFERENCE_SAMPLING_INTERVAL: f32 = 150.0;

/// Accumulates samples along one ray under the selected compositing rule.
///
/// Callers are expected to skip fully transparent samples.
pub struct RayAccumulator {
    result: RGBA,
    first_hit_done: bool,
    mode: CompositingMode,
    step_size: f32,
}

impl RayAccumulator {
    pub fn new(mode: CompositingMode, step_size: f32) -> RayAccumulator {
        RayAccumulator {
            result: crate::color::zero(),
            first_hit_done: false,
            mode,
            step_size,
        }
    }

    /// Feed one sample with nonzero opacity
    pub fn add_sample(&mut self, mut color: RGBA) {
        match self.mode {
            CompositingMode::FrontToBack => {
                color.w = 1.0
                    - (1.0 - color.w).powf(self.step_size * REFERENCE_SAMPLING_INTERVAL);
                // accumulation is additive, without attenuating by the
                // transmittance collected so far; downstream baselines are
                // built against this exact behavior
                self.result += color;
            }
            CompositingMode::FirstHitPoint => {
                if !self.first_hit_done {
                    self.result = color;
                    self.first_hit_done = true;
                }
            }
            CompositingMode::MaxIntensity => {
                if color.w > self.result.w {
                    self.result = color;
                }
            }
        }
    }

    /// Early ray termination threshold reached
    pub fn saturated(&self) -> bool {
        self.result.w >= 0.99
    }

    pub fn result(&self) -> RGBA {
        self.result
    }
}

/// March one ray between `entry` and `exit` (normalized volume coordinates)
/// and return the accumulated, unresolved color.
///
/// `step_size` is expressed in the same normalized units as the
/// coordinates. Samples whose opacity is exactly zero contribute nothing.
pub fn traverse_ray(
    volume: &Volume,
    lut: &LookupTable,
    entry: Point3<f32>,
    exit: Point3<f32>,
    mode: CompositingMode,
    step_size: f32,
) -> RGBA {
    let mut acc = RayAccumulator::new(mode, step_size);

    let direction = exit - entry;
    let t_end = direction.magnitude();
    let direction = direction.normalize();

    let mut t = 0.0;
    while t < t_end && !acc.saturated() {
        let pos = entry + t * direction;
        let color = lut.sample(volume.sample_at(pos));

        if color.w > 0.0 {
            acc.add_sample(color);
        }

        t += step_size;
    }

    acc.result()
}

/// Full-screen pass resolving every pixel of `frame` from the entry/exit
/// images.
///
/// In `Volume` mode, pixels whose ray misses the bounding geometry
/// (entry == exit) are left untouched. All other modes write every pixel.
pub fn render(
    volume: &Volume,
    lut: &LookupTable,
    entry: &CoordImage,
    exit: &CoordImage,
    params: &RenderParams,
    frame: &mut Frame,
) {
    let width = frame.width();
    let height = frame.height();

    for y in 0..height {
        for x in 0..width {
            // normalized pixel coordinate, origin bottom left
            let st = vector![
                (x as f32 + 0.5) / width as f32,
                (y as f32 + 0.5) / height as f32
            ];

            let entry_c = entry.get(x, y);
            let exit_c = exit.get(x, y);

            let color = match params.output {
                OutputMode::Volume => {
                    if entry_c == exit_c {
                        // ray misses the volume, keep the pixel as is
                        continue;
                    }
                    let result = traverse_ray(
                        volume,
                        lut,
                        entry_c.into(),
                        exit_c.into(),
                        params.compositing,
                        params.step_size,
                    );
                    over_black(result)
                }
                OutputMode::EntryPoints => opaque(entry_c),
                OutputMode::ExitPoints => opaque(exit_c),
                OutputMode::RayDirection => opaque((exit_c - entry_c).abs()),
                OutputMode::TransferFunction => {
                    let c = lut.sample(st.x);
                    opaque(c.xyz())
                }
                OutputMode::Slice => {
                    let v = volume.sample_at(point![st.x, st.y, 0.5]);
                    crate::color::mono(v, 1.0)
                }
                OutputMode::SliceWithTransferFunction => {
                    let c = lut.sample(volume.sample_at(point![st.x, st.y, 0.5]));
                    opaque(c.xyz())
                }
            };

            frame.put(x, y, to_bytes(color));
        }
    }
}

// mix(opaque black, c, c.a)
fn over_black(c: RGBA) -> RGBA {
    let a = c.w;
    vector![c.x * a, c.y * a, c.z * a, 1.0 - a + c.w * a]
}

fn opaque(v: Vector3<f32>) -> RGBA {
    vector![v.x, v.y, v.z, 1.0]
}

fn to_bytes(c: RGBA) -> [u8; 4] {
    let b = |v: f32| (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u8;
    [b(c.x), b(c.y), b(c.z), b(c.w)]
}

#[cfg(test)]
mod test {
    use nalgebra::{vector, Rotation3};

    use super::*;
    use crate::{
        render::params::RenderParams,
        test_helpers,
        transfer_function::TransferFunctionParams,
    };

    fn identity_lut() -> LookupTable {
        LookupTable::build(&TransferFunctionParams {
            opacity: 1.0,
            red: 1.0,
            green: 1.0,
            blue: 1.0,
            threshold: 0.0,
        })
    }

    #[test]
    fn first_hit_point_keeps_the_first_nonzero_sample() {
        let mut acc = RayAccumulator::new(CompositingMode::FirstHitPoint, 0.1);

        let first = vector![0.2, 0.4, 0.6, 0.5];
        acc.add_sample(first);
        acc.add_sample(vector![0.9, 0.9, 0.9, 0.8]);
        acc.add_sample(vector![0.1, 0.1, 0.1, 0.3]);

        assert_eq!(acc.result(), first);
    }

    #[test]
    fn max_intensity_keeps_the_most_opaque_sample() {
        let mut acc = RayAccumulator::new(CompositingMode::MaxIntensity, 0.1);

        acc.add_sample(vector![0.1, 0.0, 0.0, 0.1]);
        acc.add_sample(vector![0.9, 0.0, 0.0, 0.9]);
        acc.add_sample(vector![0.3, 0.0, 0.0, 0.3]);

        assert!((acc.result().w - 0.9).abs() < 1e-6);
        assert!((acc.result().x - 0.9).abs() < 1e-6);
    }

    #[test]
    fn front_to_back_corrects_opacity_for_step_size() {
        let mut a = RayAccumulator::new(CompositingMode::FrontToBack, 1.0 / 150.0);
        a.add_sample(vector![0.0, 0.0, 0.0, 0.5]);
        // step of one reference interval leaves the opacity unchanged
        assert!((a.result().w - 0.5).abs() < 1e-5);

        let mut b = RayAccumulator::new(CompositingMode::FrontToBack, 2.0 / 150.0);
        b.add_sample(vector![0.0, 0.0, 0.0, 0.5]);
        // double step: 1 - 0.5^2
        assert!((b.result().w - 0.75).abs() < 1e-5);
    }

    #[test]
    fn traverse_first_hit_takes_the_nearest_visible_sample() {
        // scalar ramp along z; the cutoff keeps the near samples invisible
        let volume = test_helpers::ramp_volume(vector![4, 4, 32]);
        let lut = identity_lut();

        let entry = nalgebra::point![0.5, 0.5, 0.0];
        let exit = nalgebra::point![0.5, 0.5, 1.0];

        let result = traverse_ray(
            &volume,
            &lut,
            entry,
            exit,
            CompositingMode::FirstHitPoint,
            0.01,
        );

        // replicate the first visible sample by walking the same ray
        let mut expected = crate::color::zero();
        let mut t = 0.0;
        while t < 1.0 {
            let c = lut.sample(volume.sample_at(nalgebra::point![0.5, 0.5, t]));
            if c.w > 0.0 {
                expected = c;
                break;
            }
            t += 0.01;
        }

        assert!(expected.w > 0.0);
        assert_eq!(result, expected);
    }

    #[test]
    fn step_size_independent_opacity() {
        // rgb weights zero; the property concerns the corrected opacity
        let volume = test_helpers::ramp_volume(vector![4, 4, 32]);
        let lut = LookupTable::build(&TransferFunctionParams {
            opacity: 0.01,
            red: 0.0,
            green: 0.0,
            blue: 0.0,
            threshold: 0.0,
        });

        let entry = nalgebra::point![0.5, 0.5, 0.0];
        let exit = nalgebra::point![0.5, 0.5, 1.0];

        let a = traverse_ray(&volume, &lut, entry, exit, CompositingMode::FrontToBack, 0.02);
        let b = traverse_ray(&volume, &lut, entry, exit, CompositingMode::FrontToBack, 0.005);

        assert!(a.w > 0.01);
        assert!((a.w - b.w).abs() < 0.05, "{} vs {}", a.w, b.w);
    }

    #[test]
    fn miss_pixels_are_left_untouched() {
        let volume = test_helpers::solid_volume(vector![2, 2, 2], 200);
        let lut = identity_lut();

        let entry = CoordImage::new(4, 4);
        let exit = CoordImage::new(4, 4);

        let mut frame = Frame::new(4, 4);
        for y in 0..4 {
            for x in 0..4 {
                frame.put(x, y, [255, 0, 255, 255]);
            }
        }

        let params = RenderParams {
            output: OutputMode::Volume,
            ..RenderParams::default()
        };
        render(&volume, &lut, &entry, &exit, &params, &mut frame);

        // every ray has entry == exit, nothing may be overwritten
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(frame.get(x, y), [255, 0, 255, 255]);
            }
        }
    }

    #[test]
    fn zero_result_resolves_to_opaque_black() {
        let c = over_black(crate::color::zero());
        assert_eq!(to_bytes(c), [0, 0, 0, 255]);
    }

    #[test]
    fn slice_mode_shows_the_mid_plane() {
        // lower half dark, upper half bright along z
        let volume = {
            let size = vector![2, 2, 2];
            let data = vec![10, 10, 10, 10, 240, 240, 240, 240];
            crate::volumetric::Volume::from_data(
                size,
                vector![1.0, 1.0, 1.0],
                Rotation3::identity(),
                data,
            )
            .unwrap()
        };
        let lut = identity_lut();

        let entry = CoordImage::new(2, 2);
        let exit = CoordImage::new(2, 2);
        let mut frame = Frame::new(2, 2);

        let params = RenderParams {
            output: OutputMode::Slice,
            ..RenderParams::default()
        };
        render(&volume, &lut, &entry, &exit, &params, &mut frame);

        // mid-depth plane averages the two slices
        let px = frame.get(0, 0);
        assert_eq!(px[0], px[1]);
        assert_eq!(px[1], px[2]);
        assert_eq!(px[3], 255);
        assert!((px[0] as i32 - 125).abs() <= 1);
    }
}
