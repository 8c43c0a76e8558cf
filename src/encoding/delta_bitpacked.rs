//! DELTA_BINARY_PACKED: blocks of 128 values split into 4 miniblocks
//! of 32, each miniblock bit-packed at its own width (spec.md §4.3).
//!
//! Header: `varint(block_size=128), varint(miniblocks=4), varint(count),
//! zigzag(first_value)`. Per block: `zigzag(min_delta)`, 4 bit-widths
//! (one byte each), then each miniblock's `(delta - min_delta)` values
//! bit-packed at its width; unused miniblock tail is zero-padded.

use super::{bitpacking, uleb128, zigzag_leb128};

const BLOCK_SIZE: usize = 128;
const MINIBLOCKS: usize = 4;
const MINIBLOCK_SIZE: usize = BLOCK_SIZE / MINIBLOCKS;

fn write_uleb(out: &mut Vec<u8>, v: u64) {
    let mut container = [0u8; 10];
    let used = uleb128::encode(v, &mut container);
    out.extend_from_slice(&container[..used]);
}

fn write_zigzag(out: &mut Vec<u8>, v: i64) {
    let (container, used) = zigzag_leb128::encode(v);
    out.extend_from_slice(&container[..used]);
}

/// `ceil(log2(max+1))`, the bit width required to hold `0..=max`.
fn bit_width_for(max: u64) -> u8 {
    if max == 0 {
        0
    } else {
        64 - max.leading_zeros() as u8
    }
}

/// Encodes `values` (64-bit signed; callers widen INT32 deltas before
/// calling) as DELTA_BINARY_PACKED.
pub fn encode(values: &[i64], out: &mut Vec<u8>) {
    write_uleb(out, BLOCK_SIZE as u64);
    write_uleb(out, MINIBLOCKS as u64);
    write_uleb(out, values.len() as u64);

    if values.is_empty() {
        write_zigzag(out, 0);
        return;
    }

    write_zigzag(out, values[0]);

    let mut prev = values[0];
    let mut chunks = values[1..].chunks(BLOCK_SIZE);
    for chunk in &mut chunks {
        let mut deltas = [0i64; BLOCK_SIZE];
        for (i, &v) in chunk.iter().enumerate() {
            deltas[i] = v - prev;
            prev = v;
        }
        let used = chunk.len();
        let min_delta = deltas[..used].iter().copied().min().unwrap();

        let mut relative = [0u32; BLOCK_SIZE];
        for i in 0..used {
            relative[i] = (deltas[i] - min_delta) as u32;
        }

        write_zigzag(out, min_delta);

        let mut widths = [0u8; MINIBLOCKS];
        for (m, width) in widths.iter_mut().enumerate() {
            let start = m * MINIBLOCK_SIZE;
            if start >= used {
                *width = 0;
                continue;
            }
            let end = (start + MINIBLOCK_SIZE).min(used);
            let max = relative[start..end].iter().copied().max().unwrap_or(0);
            *width = bit_width_for(max as u64);
        }
        out.extend_from_slice(&widths);

        for (m, &width) in widths.iter().enumerate() {
            let start = m * MINIBLOCK_SIZE;
            let mut miniblock = [0u32; MINIBLOCK_SIZE];
            if start < used {
                let end = (start + MINIBLOCK_SIZE).min(used);
                miniblock[..end - start].copy_from_slice(&relative[start..end]);
            }
            let mut packed = vec![0u8; bitpacking::required_bytes(MINIBLOCK_SIZE, width)];
            bitpacking::encode(&miniblock, width, &mut packed);
            out.extend_from_slice(&packed);
        }
    }
}

/// Decodes a DELTA_BINARY_PACKED stream. Used only by tests (spec.md
/// §8) — the writer itself never reads its own output back.
pub fn decode(bytes: &[u8]) -> Vec<i64> {
    let mut pos = 0;
    let (block_size, used) = uleb128::decode(&bytes[pos..]);
    pos += used;
    let (miniblocks, used) = uleb128::decode(&bytes[pos..]);
    pos += used;
    let (count, used) = uleb128::decode(&bytes[pos..]);
    pos += used;
    let (first_value, used) = zigzag_leb128::decode(&bytes[pos..]);
    pos += used;

    let count = count as usize;
    let mut out = Vec::with_capacity(count);
    out.push(first_value);
    if count <= 1 {
        return out;
    }

    let block_size = block_size as usize;
    let miniblocks = miniblocks as usize;
    let miniblock_size = block_size / miniblocks;

    let mut prev = first_value;
    let mut remaining = count - 1;
    while remaining > 0 {
        let (min_delta, used) = zigzag_leb128::decode(&bytes[pos..]);
        pos += used;
        let widths = &bytes[pos..pos + miniblocks];
        pos += miniblocks;

        let in_this_block = remaining.min(block_size);
        let mut produced = 0;
        for &width in widths {
            if produced >= in_this_block {
                // still need to skip the bit-packed bytes even if this
                // miniblock is entirely past the end of the real data
                let nbytes = bitpacking::required_bytes(miniblock_size, width);
                pos += nbytes;
                continue;
            }
            let mut packed_values = vec![0u32; miniblock_size];
            let nbytes = bitpacking::required_bytes(miniblock_size, width);
            bitpacking::decode(&bytes[pos..pos + nbytes], width, &mut packed_values);
            pos += nbytes;

            for &rel in &packed_values {
                if produced >= in_this_block {
                    break;
                }
                let delta = rel as i64 + min_delta;
                prev += delta;
                out.push(prev);
                produced += 1;
            }
        }
        remaining -= in_this_block;
    }

    out
}
