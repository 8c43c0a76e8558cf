//! BYTE_STREAM_SPLIT: for width-`W` fixed values, write `count` bytes
//! of plane 0, then plane 1, ... plane `W-1`. Supported for FLOAT,
//! DOUBLE, INT32, INT64, FIXED_LEN_BYTE_ARRAY.

use crate::error::Result;

/// `values` is the already-PLAIN-encoded fixed-width byte stream
/// (i.e. `count * width` bytes); this just transposes it into planes.
pub fn encode(values: &[u8], width: usize, out: &mut Vec<u8>) -> Result<()> {
    if width == 0 || values.len() % width != 0 {
        return Err(general_err!(
            "byte_stream_split input length {} is not a multiple of width {}",
            values.len(),
            width
        ));
    }
    let count = values.len() / width;
    out.reserve(values.len());
    for plane in 0..width {
        for i in 0..count {
            out.push(values[i * width + plane]);
        }
    }
    Ok(())
}

/// Inverse of [`encode`]. Used only by tests.
pub fn decode(planes: &[u8], width: usize) -> Vec<u8> {
    let count = planes.len() / width;
    let mut out = vec![0u8; planes.len()];
    for plane in 0..width {
        for i in 0..count {
            out[i * width + plane] = planes[plane * count + i];
        }
    }
    out
}
