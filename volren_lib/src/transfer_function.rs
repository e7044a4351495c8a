use nalgebra::vector;

use crate::color::RGBA;

/// Number of entries in the lookup table
pub const TABLE_SIZE: usize = 256;

/// Entries below this index are always transparent black, regardless of
/// parameters. Suppresses low-intensity noise around the dataset.
pub const NOISE_CUTOFF: usize = 50;

/// The five user-tunable transfer function parameters, each in `<0;1>`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransferFunctionParams {
    pub opacity: f32,
    pub red: f32,
    pub green: f32,
    pub blue: f32,
    pub threshold: f32,
}

impl Default for TransferFunctionParams {
    fn default() -> Self {
        TransferFunctionParams {
            opacity: 0.5,
            red: 1.0,
            green: 1.0,
            blue: 1.0,
            threshold: 0.0,
        }
    }
}

/// 256-entry RGBA byte table mapping a scalar intensity to color and opacity.
///
/// Channel values are truncated toward zero and wrap modulo 256 when they
/// overflow the byte range; downstream images depend on that exact store
/// semantics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTable {
    data: Vec<u8>,
}

impl LookupTable {
    /// All-transparent placeholder, replaced by the first rebuild
    pub fn empty() -> LookupTable {
        LookupTable {
            data: vec![0; TABLE_SIZE * 4],
        }
    }

    /// Derive the full table from `params`.
    ///
    /// Pure function; identical parameters always produce a byte-identical
    /// table. There is no incremental update, the table is always rebuilt
    /// whole.
    pub fn build(params: &TransferFunctionParams) -> LookupTable {
        let mut data = vec![0; TABLE_SIZE * 4];

        for i in NOISE_CUTOFF..TABLE_SIZE {
            if (i as f32) < params.threshold * 255.0 {
                continue;
            }

            let it = i as f32 * params.opacity;
            let base = i * 4;
            data[base] = wrap_byte(2.0 * it * params.red);
            data[base + 1] = wrap_byte(it * params.green);
            data[base + 2] = wrap_byte(3.0 * it * params.blue);
            data[base + 3] = wrap_byte(it);
        }

        LookupTable { data }
    }

    /// Raw RGBA bytes of entry `i`
    pub fn entry(&self, i: usize) -> [u8; 4] {
        let base = i * 4;
        [
            self.data[base],
            self.data[base + 1],
            self.data[base + 2],
            self.data[base + 3],
        ]
    }

    /// Sample the table at intensity `value` in `<0;1>`.
    ///
    /// Linear filtering between neighbouring entries, clamped at both ends;
    /// the fixed mid-row access avoids boundary artifacts. Channels come back
    /// normalized to `<0;1>`.
    pub fn sample(&self, value: f32) -> RGBA {
        let u = value.clamp(0.0, 1.0) * TABLE_SIZE as f32 - 0.5;
        let lo = u.floor();
        let t = u - lo;

        let max = (TABLE_SIZE - 1) as f32;
        let i0 = lo.clamp(0.0, max) as usize;
        let i1 = (lo + 1.0).clamp(0.0, max) as usize;

        let a = self.entry(i0);
        let b = self.entry(i1);

        let lerp = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t) / 255.0;
        vector![
            lerp(a[0], b[0]),
            lerp(a[1], b[1]),
            lerp(a[2], b[2]),
            lerp(a[3], b[3])
        ]
    }
}

// Byte-store semantics of the table: truncate toward zero, wrap modulo 256
fn wrap_byte(v: f32) -> u8 {
    (v as i64).rem_euclid(256) as u8
}
