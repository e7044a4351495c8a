pub mod parse;
mod vol_builder;
mod volume;

pub use vol_builder::{build, from_file, DataSource, SampleFormat, VolumeMetadata};
pub use volume::Volume;
