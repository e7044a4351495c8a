use log::{debug, error};

use crate::{
    camera::{OrbitCamera, Projection},
    error::EngineError,
    transfer_function::LookupTable,
    volumetric::Volume,
};

use super::{
    bbox_pass::{BoundingBoxPass, CullFace},
    params::{DirtyFlags, RenderParams},
    raymarch,
    target::{CoordImage, Frame},
};

/// What a single scheduler tick actually did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub table_rebuilt: bool,
    pub rendered: bool,
}

/// Top-level driver of the rendering pipeline.
///
/// Owns every backend resource: the volume, the lookup table, the cube
/// buffers, the entry/exit targets and the output frame. All of them are
/// created exactly once in [`Renderer::new`] and live for the whole session.
///
/// The host's frame clock calls [`Renderer::tick`] once per display refresh.
/// The call is synchronous and non-reentrant; a tick with clean flags issues
/// no work at all.
pub struct Renderer {
    volume: Volume,
    lut: LookupTable,
    bbox_pass: BoundingBoxPass,
    projection: Projection,
    entry: CoordImage,
    exit: CoordImage,
    frame: Frame,
}

impl Renderer {
    pub fn new(volume: Volume, resolution: (usize, usize)) -> Result<Renderer, EngineError> {
        let (width, height) = resolution;
        if width == 0 || height == 0 {
            let err = EngineError::ContextUnavailable {
                reason: format!("zero-area output surface {}x{}", width, height),
            };
            error!("{}", err);
            return Err(err);
        }

        debug!("creating entry/exit targets and frame, {}x{}", width, height);
        let entry = CoordImage::new(width, height);
        let exit = CoordImage::new(width, height);
        let frame = Frame::new(width, height);

        debug!("building bounding box pass");
        let bbox_pass = BoundingBoxPass::new().map_err(|e| {
            error!("{}", e);
            e
        })?;

        let projection = Projection::new(width as f32 / height as f32);

        Ok(Renderer {
            volume,
            lut: LookupTable::empty(),
            bbox_pass,
            projection,
            entry,
            exit,
            frame,
        })
    }

    /// One cooperative tick of the render loop.
    ///
    /// Rebuilds and adopts the lookup table when it is stale (which also
    /// invalidates the image), then re-renders the frame if anything
    /// invalidated it. Returns immediately when both flags are clean.
    pub fn tick(&mut self, params: &RenderParams, dirty: &mut DirtyFlags) -> TickReport {
        let mut report = TickReport::default();

        if dirty.table {
            self.lut = LookupTable::build(&params.transfer);
            dirty.table = false;
            // a new table always invalidates the current image
            dirty.render = true;
            report.table_rebuilt = true;
        }

        if !dirty.render {
            return report;
        }

        self.render(params);
        dirty.render = false;
        report.rendered = true;
        report
    }

    fn render(&mut self, params: &RenderParams) {
        let camera = OrbitCamera::new(
            params.camera.radius,
            params.camera.azimuth,
            params.camera.elevation,
        );
        let mvp = self.projection.matrix() * camera.view_matrix() * self.volume.model_matrix();

        self.bbox_pass.render(&mvp, CullFace::Front, &mut self.exit);
        self.bbox_pass.render(&mvp, CullFace::Back, &mut self.entry);

        self.frame.clear();
        raymarch::render(
            &self.volume,
            &self.lut,
            &self.entry,
            &self.exit,
            params,
            &mut self.frame,
        );
    }

    /// Last rendered frame, RGBA8, row 0 at the bottom
    pub fn frame(&self) -> &[u8] {
        self.frame.data()
    }

    pub fn resolution(&self) -> (usize, usize) {
        (self.frame.width(), self.frame.height())
    }
}

#[cfg(test)]
mod test {
    use nalgebra::vector;

    use super::*;
    use crate::test_helpers;

    fn small_renderer() -> Renderer {
        let volume = test_helpers::ramp_volume(vector![4, 4, 8]);
        Renderer::new(volume, (16, 16)).unwrap()
    }

    #[test]
    fn zero_resolution_is_rejected() {
        let volume = test_helpers::zero_volume(vector![2, 2, 2]);
        let res = Renderer::new(volume, (0, 16));

        assert!(matches!(res, Err(EngineError::ContextUnavailable { .. })));
    }

    #[test]
    fn first_tick_builds_table_and_renders() {
        let mut renderer = small_renderer();
        let params = RenderParams::default();
        let mut dirty = DirtyFlags::default();

        let report = renderer.tick(&params, &mut dirty);

        assert!(report.table_rebuilt);
        assert!(report.rendered);
        assert!(!dirty.table);
        assert!(!dirty.render);
    }

    #[test]
    fn clean_ticks_do_no_work() {
        let mut renderer = small_renderer();
        let params = RenderParams::default();
        let mut dirty = DirtyFlags::default();

        let mut renders = 0;
        for _ in 0..6 {
            let report = renderer.tick(&params, &mut dirty);
            if report.rendered {
                renders += 1;
            }
        }

        // one dirty tick followed by idle ticks renders exactly once
        assert_eq!(renders, 1);
    }

    #[test]
    fn table_mark_causes_rebuild_and_render() {
        let mut renderer = small_renderer();
        let mut params = RenderParams::default();
        let mut dirty = DirtyFlags::default();

        renderer.tick(&params, &mut dirty);

        params.transfer.opacity = 0.9;
        dirty.mark_table();
        let report = renderer.tick(&params, &mut dirty);

        assert!(report.table_rebuilt);
        assert!(report.rendered);
    }

    #[test]
    fn render_mark_skips_table_rebuild() {
        let mut renderer = small_renderer();
        let mut params = RenderParams::default();
        let mut dirty = DirtyFlags::default();

        renderer.tick(&params, &mut dirty);

        params.camera.azimuth += 10.0;
        dirty.mark_render();
        let report = renderer.tick(&params, &mut dirty);

        assert!(!report.table_rebuilt);
        assert!(report.rendered);
    }
}
