//! RLE / bit-packed hybrid: Parquet's encoding for definition levels,
//! repetition levels, and (as `RLE_DICTIONARY`) dictionary indices.
//!
//! Two run kinds share one ULEB128 header (spec.md §4.3):
//! - bit-packed: `header = (num_groups << 1) | 1`, then `num_groups * 8`
//!   values bit-packed LSB-first at `bit_width`.
//! - RLE run: `header = count << 1`, then `ceil(bit_width / 8)` bytes
//!   of the repeated value, little-endian.

use super::{bitpacking, uleb128};

/// `ceil(log2(max_level + 1))`, the bit width needed to represent every
/// value in `0..=max_level`. Zero when `max_level` is zero (the column
/// has no optional/repeated ancestors and the level stream is omitted
/// entirely).
pub fn get_bit_width(max_level: i16) -> u8 {
    let max_level = max_level as u64;
    if max_level == 0 {
        return 0;
    }
    64 - (max_level).leading_zeros() as u8
}

fn write_uleb(out: &mut Vec<u8>, v: u64) {
    let mut container = [0u8; 10];
    let used = uleb128::encode(v, &mut container);
    out.extend_from_slice(&container[..used]);
}

/// Flushes `pending` as one bit-packed run (header + packed bytes),
/// zero-padding the trailing partial group of 8 as needed. No-op if
/// `pending` is empty.
fn flush_bitpacked(pending: &mut Vec<u32>, bit_width: u8, out: &mut Vec<u8>) {
    if pending.is_empty() {
        return;
    }
    let num_groups = (pending.len() + 7) / 8;
    pending.resize(num_groups * 8, 0);

    let header = ((num_groups as u64) << 1) | 1;
    write_uleb(out, header);

    let mut packed = vec![0u8; bitpacking::required_bytes(pending.len(), bit_width)];
    bitpacking::encode(pending, bit_width, &mut packed);
    out.extend_from_slice(&packed);

    pending.clear();
}

/// Encodes `values` (each `< 2^bit_width`) as the RLE/bit-packed
/// hybrid. A no-op when `bit_width == 0` (nothing to encode: every
/// value is implicitly zero).
pub fn encode(values: &[u32], bit_width: u8, out: &mut Vec<u8>) {
    if bit_width == 0 {
        return;
    }

    let mut pending: Vec<u32> = Vec::with_capacity(8);
    let n = values.len();
    let mut i = 0;
    while i < n {
        let run_value = values[i];
        let mut run_len = 1;
        while i + run_len < n && values[i + run_len] == run_value {
            run_len += 1;
        }

        if run_len >= 8 {
            flush_bitpacked(&mut pending, bit_width, out);

            write_uleb(out, (run_len as u64) << 1);
            let nbytes = ((bit_width as usize) + 7) / 8;
            let value_bytes = (run_value as u64).to_le_bytes();
            out.extend_from_slice(&value_bytes[..nbytes]);
        } else {
            for k in 0..run_len {
                pending.push(values[i + k]);
                if pending.len() == 8 {
                    flush_bitpacked(&mut pending, bit_width, out);
                }
            }
        }
        i += run_len;
    }
    flush_bitpacked(&mut pending, bit_width, out);
}

/// Decodes a hybrid-encoded stream of exactly `count` values. Used
/// only by tests (spec.md §8, property 4 & 7) since the writer never
/// reads its own output back.
pub fn decode(bytes: &[u8], bit_width: u8, count: usize) -> Vec<u32> {
    let mut out = Vec::with_capacity(count);
    if bit_width == 0 {
        out.resize(count, 0);
        return out;
    }
    let mut pos = 0;
    while out.len() < count {
        let (header, used) = uleb128::decode(&bytes[pos..]);
        pos += used;
        if header & 1 == 1 {
            let num_groups = (header >> 1) as usize;
            let values_in_group = num_groups * 8;
            let nbytes = bitpacking::required_bytes(values_in_group, bit_width);
            let mut group = vec![0u32; values_in_group];
            bitpacking::decode(&bytes[pos..pos + nbytes], bit_width, &mut group);
            pos += nbytes;
            out.extend(group);
        } else {
            let run_len = (header >> 1) as usize;
            let nbytes = ((bit_width as usize) + 7) / 8;
            let mut value_bytes = [0u8; 8];
            value_bytes[..nbytes].copy_from_slice(&bytes[pos..pos + nbytes]);
            pos += nbytes;
            let value = u64::from_le_bytes(value_bytes) as u32;
            out.extend(std::iter::repeat(value).take(run_len));
        }
    }
    out.truncate(count);
    out
}
