//! Parser for the text descriptor (`.dat`) that accompanies a raw volume.
//!
//! The descriptor names the raw file and carries the metadata the raw bytes
//! lack: resolution, voxel spacing and sample format.
//!
//! ```text
//! ObjectFileName: pig.raw
//! Resolution: 512 512 134
//! SliceThickness: 1.0 1.0 2.7
//! Format: USHORT
//! ```

use nalgebra::{vector, Rotation3};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{multispace0, space0, space1, u32 as decimal},
    number::complete::float,
    IResult,
};

use super::vol_builder::{SampleFormat, VolumeMetadata};

/// Descriptor contents: the raw file name plus assembled metadata
#[derive(Debug, Clone)]
pub struct DatDescriptor {
    pub object_file: String,
    pub meta: VolumeMetadata,
}

pub fn dat_parser(input: &str) -> Result<DatDescriptor, &'static str> {
    match dat_inner(input) {
        Ok((_rest, descriptor)) => Ok(descriptor),
        Err(_) => Err("malformed volume descriptor"),
    }
}

fn key<'a>(name: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, ()> {
    move |s| {
        let (s, _) = multispace0(s)?;
        let (s, _) = tag(name)(s)?;
        let (s, _) = tag(":")(s)?;
        let (s, _) = space0(s)?;
        Ok((s, ()))
    }
}

fn dat_inner(s: &str) -> IResult<&str, DatDescriptor> {
    let (s, _) = key("ObjectFileName")(s)?;
    let (s, name) = take_while1(|c: char| !c.is_whitespace())(s)?;

    let (s, _) = key("Resolution")(s)?;
    let (s, x) = decimal(s)?;
    let (s, _) = space1(s)?;
    let (s, y) = decimal(s)?;
    let (s, _) = space1(s)?;
    let (s, z) = decimal(s)?;

    let (s, _) = key("SliceThickness")(s)?;
    let (s, tx) = float(s)?;
    let (s, _) = space1(s)?;
    let (s, ty) = float(s)?;
    let (s, _) = space1(s)?;
    let (s, tz) = float(s)?;

    let (s, _) = key("Format")(s)?;
    let (s, format) = alt((tag("USHORT"), tag("UCHAR")))(s)?;

    let (format, source_max) = match format {
        "USHORT" => (SampleFormat::U16, 4096),
        _ => (SampleFormat::U8, 256),
    };

    let meta = VolumeMetadata {
        size: vector![x as usize, y as usize, z as usize],
        format,
        source_max,
        thickness: vector![tx, ty, tz],
        orientation: Rotation3::identity(),
        data_offset: 0,
    };

    Ok((
        s,
        DatDescriptor {
            object_file: name.to_string(),
            meta,
        },
    ))
}
