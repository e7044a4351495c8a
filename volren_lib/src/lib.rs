pub mod camera;
mod error;
pub mod render;
pub mod test_helpers;
pub mod transfer_function;
pub mod volumetric;

pub use camera::OrbitCamera;
pub use error::EngineError;
pub use transfer_function::{LookupTable, TransferFunctionParams};
pub use volumetric::Volume;

pub mod color {
    use nalgebra::{vector, Vector4};

    /// Color with straight alpha, all channels in `<0;1>`
    pub type RGBA = Vector4<f32>;

    pub fn new(r: f32, g: f32, b: f32, a: f32) -> RGBA {
        vector![r, g, b, a]
    }

    pub fn zero() -> RGBA {
        vector![0.0, 0.0, 0.0, 0.0]
    }

    pub fn mono(v: f32, opacity: f32) -> RGBA {
        vector![v, v, v, opacity]
    }
}

/// Render a single frame of `volume` with default parameters.
///
/// Convenience entry for hosts that do not drive the tick loop themselves.
/// Returns the RGBA8 buffer, row 0 at the bottom.
pub fn render_frame(
    volume: Volume,
    width: usize,
    height: usize,
) -> Result<Vec<u8>, EngineError> {
    use render::{DirtyFlags, RenderParams, Renderer};

    let mut renderer = Renderer::new(volume, (width, height))?;
    let params = RenderParams::default();
    let mut dirty = DirtyFlags::default();
    renderer.tick(&params, &mut dirty);

    Ok(renderer.frame().to_vec())
}
