mod bbox_pass;
mod geometry;
mod params;
pub mod raymarch;
mod renderer;
mod target;

pub use bbox_pass::{BoundingBoxPass, CullFace};
pub use geometry::{CUBE_INDICES, CUBE_VERTICES};
pub use params::{
    CameraParams, CompositingMode, DirtyFlags, OutputMode, RenderParams,
};
pub use renderer::{Renderer, TickReport};
pub use target::{CoordImage, Frame};
