use std::{fs::File, path::Path};

use log::debug;
use memmap::{Mmap, MmapOptions};
use nalgebra::{vector, Rotation3, Vector3};

use crate::error::EngineError;

use super::{parse, Volume};

/// Width of one source sample in the raw asset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    /// One byte per sample, used as is
    U8,
    /// Two bytes per sample, little endian, rescaled down to one byte
    U16,
}

/// Raw volume bytes, either owned or memory mapped
pub enum DataSource {
    Vec(Vec<u8>),
    Mmap(Mmap),
}

impl DataSource {
    pub fn get_slice(&self) -> &[u8] {
        match self {
            DataSource::Vec(v) => v.as_slice(),
            DataSource::Mmap(m) => &m[..],
        }
    }

    pub fn from_vec(vec: Vec<u8>) -> DataSource {
        DataSource::Vec(vec)
    }

    /// Memory map the file at `path`
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<DataSource, EngineError> {
        let path = path.as_ref();
        let asset = path.display().to_string();

        let file = File::open(path).map_err(|e| EngineError::AssetRetrieval {
            asset: asset.clone(),
            reason: e.to_string(),
        })?;

        let mmap = unsafe { MmapOptions::new().map(&file) };
        let mmap = mmap.map_err(|e| EngineError::AssetRetrieval {
            asset,
            reason: e.to_string(),
        })?;

        Ok(DataSource::Mmap(mmap))
    }
}

/// Parsed description of a raw volume asset
#[derive(Debug, Clone)]
pub struct VolumeMetadata {
    pub size: Vector3<usize>,
    pub format: SampleFormat,
    /// Exclusive upper bound of the source sample range, e.g. 4096 for
    /// 12-bit data stored in 16-bit samples
    pub source_max: u32,
    /// Physical voxel spacing per axis
    pub thickness: Vector3<f32>,
    /// Dataset orientation, identity unless the descriptor says otherwise
    pub orientation: Rotation3<f32>,
    pub data_offset: usize,
}

impl VolumeMetadata {
    /// Anisotropic scale of the bounding cube: physical extents normalized
    /// by the largest axis
    pub fn model_scale(&self) -> Vector3<f32> {
        let extent = self
            .size
            .map(|v| v as f32)
            .component_mul(&self.thickness);
        let max = extent.x.max(extent.y).max(extent.z);

        if max <= 0.0 {
            vector![1.0, 1.0, 1.0]
        } else {
            extent / max
        }
    }
}

/// Build a volume from metadata and raw bytes.
///
/// Wider source samples are rescaled to one byte per voxel:
/// `floor(v / source_max * 256)`, saturating at 255. `asset` names the
/// source in error reports.
pub fn build(
    meta: &VolumeMetadata,
    data: &DataSource,
    asset: &str,
) -> Result<Volume, EngineError> {
    let slice = data.get_slice();
    if slice.len() < meta.data_offset {
        return Err(EngineError::AssetRetrieval {
            asset: asset.into(),
            reason: "data shorter than declared offset".into(),
        });
    }
    let slice = &slice[meta.data_offset..];

    let voxels = meta.size.x * meta.size.y * meta.size.z;
    let short = |have: usize| EngineError::AssetRetrieval {
        asset: asset.into(),
        reason: format!("{} voxels declared, {} bytes of data", voxels, have),
    };

    let bytes = match meta.format {
        SampleFormat::U8 => {
            if slice.len() < voxels {
                return Err(short(slice.len()));
            }
            slice[..voxels].to_vec()
        }
        SampleFormat::U16 => {
            if slice.len() < voxels * 2 {
                return Err(short(slice.len()));
            }
            let source_max = meta.source_max as f32;
            slice[..voxels * 2]
                .chunks_exact(2)
                .map(|c| {
                    let v = u16::from_le_bytes([c[0], c[1]]) as f32;
                    (v / source_max * 256.0) as u8
                })
                .collect()
        }
    };

    debug!(
        "built volume {}x{}x{} from '{}'",
        meta.size.x, meta.size.y, meta.size.z, asset
    );

    Volume::from_data(meta.size, meta.model_scale(), meta.orientation, bytes)
}

/// Read the `.dat` descriptor at `path` and the raw file it names, and
/// assemble the volume. The raw file is looked up next to the descriptor.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Volume, EngineError> {
    let path = path.as_ref();
    let asset = path.display().to_string();

    let descriptor =
        std::fs::read_to_string(path).map_err(|e| EngineError::AssetRetrieval {
            asset: asset.clone(),
            reason: e.to_string(),
        })?;

    let parsed = parse::dat_parser(&descriptor).map_err(|reason| {
        EngineError::AssetRetrieval {
            asset: asset.clone(),
            reason: reason.into(),
        }
    })?;

    let raw_path = path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(&parsed.object_file);

    let data = DataSource::from_file(&raw_path)?;
    build(&parsed.meta, &data, &raw_path.display().to_string())
}

#[cfg(test)]
mod test {
    use super::*;

    fn u16_meta(size: Vector3<usize>) -> VolumeMetadata {
        VolumeMetadata {
            size,
            format: SampleFormat::U16,
            source_max: 4096,
            thickness: vector![1.0, 1.0, 1.0],
            orientation: Rotation3::identity(),
            data_offset: 0,
        }
    }

    #[test]
    fn u16_rescale_floors() {
        let meta = u16_meta(vector![4, 1, 1]);
        let samples: [u16; 4] = [0, 16, 2048, 4095];
        let mut raw = Vec::new();
        for s in samples {
            raw.extend_from_slice(&s.to_le_bytes());
        }

        let vol = build(&meta, &DataSource::from_vec(raw), "test").unwrap();

        // floor(v / 4096 * 256)
        assert_eq!(vol.get_data(0, 0, 0), Some(0));
        assert_eq!(vol.get_data(1, 0, 0), Some(1));
        assert_eq!(vol.get_data(2, 0, 0), Some(128));
        assert_eq!(vol.get_data(3, 0, 0), Some(255));
    }

    #[test]
    fn short_data_is_rejected() {
        let meta = u16_meta(vector![4, 4, 4]);
        let res = build(&meta, &DataSource::from_vec(vec![0; 10]), "test");

        match res {
            Err(EngineError::AssetRetrieval { asset, .. }) => assert_eq!(asset, "test"),
            _ => panic!("expected asset retrieval error"),
        }
    }

    #[test]
    fn missing_file_is_fatal() {
        let res = DataSource::from_file("volumes/does_not_exist.raw");
        assert!(matches!(res, Err(EngineError::AssetRetrieval { .. })));
    }

    #[test]
    fn model_scale_normalizes_largest_axis() {
        let meta = VolumeMetadata {
            size: vector![512, 512, 134],
            format: SampleFormat::U16,
            source_max: 4096,
            thickness: vector![1.0, 1.0, 2.7],
            orientation: Rotation3::identity(),
            data_offset: 0,
        };

        let scale = meta.model_scale();
        assert!((scale.x - 1.0).abs() < 1e-5);
        assert!((scale.y - 1.0).abs() < 1e-5);
        assert!((scale.z - 134.0 * 2.7 / 512.0).abs() < 1e-5);
    }
}
