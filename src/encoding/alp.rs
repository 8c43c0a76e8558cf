//! ALP (Adaptive Lossless floating-Point), spec.md §4.3.
//!
//! Per 1024-value vector: sample up to 256 values, search an
//! `(exponent, factor)` pair that minimizes the exception count, then
//! Frame-of-Reference + bit-pack the non-exception values while storing
//! exceptions (position + original value) verbatim.
//!
//! File layout: an 8-byte header (version, compression mode, integer
//! encoding, log2(vector size), then a 4-byte element count), an
//! `AlpInfo` triple `(e, f, num_exceptions)` per vector, a `ForInfo`
//! pair (FOR value, bit width) per vector, then each vector's packed
//! data back to back.

use super::bitpacking;

pub const VECTOR_SIZE: usize = 1024;
const SAMPLE_SIZE: usize = 256;
const MAX_EXPONENT_F32: u32 = 10;
const MAX_EXPONENT_F64: u32 = 18;

const VERSION: u8 = 1;
const COMPRESSION_MODE: u8 = 0;
const INT_ENCODING_F32: u8 = 0;
const INT_ENCODING_F64: u8 = 1;
const LOG_VECTOR_SIZE: u8 = 10; // log2(1024)

fn write_header(out: &mut Vec<u8>, int_encoding: u8, num_elements: i32) {
    out.push(VERSION);
    out.push(COMPRESSION_MODE);
    out.push(int_encoding);
    out.push(LOG_VECTOR_SIZE);
    out.extend_from_slice(&num_elements.to_le_bytes());
}

fn bit_width_for_range(min: i64, max: i64) -> u8 {
    if max <= min {
        return 0;
    }
    let span = (max - min) as u64;
    64 - span.leading_zeros() as u8
}

/// `None` for an exception (non-finite, negative zero, integer
/// overflow, or failed round-trip).
fn try_encode_f32(v: f32, e: u32, f: u32) -> Option<i32> {
    if !v.is_finite() || (v == 0.0 && v.is_sign_negative()) {
        return None;
    }
    let scale = 10f32.powi((e as i32) - (f as i32));
    let scaled = (v * scale).round();
    if scaled < i32::MIN as f32 || scaled > i32::MAX as f32 {
        return None;
    }
    let encoded = scaled as i32;
    let descale = 10f32.powi((f as i32) - (e as i32));
    let decoded = (encoded as f32) * descale;
    if decoded == v {
        Some(encoded)
    } else {
        None
    }
}

fn try_encode_f64(v: f64, e: u32, f: u32) -> Option<i64> {
    if !v.is_finite() || (v == 0.0 && v.is_sign_negative()) {
        return None;
    }
    let scale = 10f64.powi((e as i32) - (f as i32));
    let scaled = (v * scale).round();
    if scaled < i64::MIN as f64 || scaled > i64::MAX as f64 {
        return None;
    }
    let encoded = scaled as i64;
    let descale = 10f64.powi((f as i32) - (e as i32));
    let decoded = (encoded as f64) * descale;
    if decoded == v {
        Some(encoded)
    } else {
        None
    }
}

fn best_combination_f32(sample: &[f32]) -> (u32, u32) {
    let mut best = (0u32, 0u32);
    let mut best_exceptions = usize::MAX;
    for e in 0..=MAX_EXPONENT_F32 {
        for f in 0..=e {
            let exceptions = sample
                .iter()
                .filter(|&&v| try_encode_f32(v, e, f).is_none())
                .count();
            if exceptions < best_exceptions {
                best_exceptions = exceptions;
                best = (e, f);
                if exceptions == 0 {
                    return best;
                }
            }
        }
    }
    best
}

fn best_combination_f64(sample: &[f64]) -> (u32, u32) {
    let mut best = (0u32, 0u32);
    let mut best_exceptions = usize::MAX;
    for e in 0..=MAX_EXPONENT_F64 {
        for f in 0..=e {
            let exceptions = sample
                .iter()
                .filter(|&&v| try_encode_f64(v, e, f).is_none())
                .count();
            if exceptions < best_exceptions {
                best_exceptions = exceptions;
                best = (e, f);
                if exceptions == 0 {
                    return best;
                }
            }
        }
    }
    best
}

fn encode_vector_f32(vector: &[f32], e: u32, f: u32, info_buf: &mut Vec<u8>, data_buf: &mut Vec<u8>) {
    let mut encoded = vec![0i32; vector.len()];
    let mut is_exception = vec![false; vector.len()];
    for (i, &v) in vector.iter().enumerate() {
        match try_encode_f32(v, e, f) {
            Some(x) => encoded[i] = x,
            None => is_exception[i] = true,
        }
    }

    let non_exception_values: Vec<i32> = encoded
        .iter()
        .zip(is_exception.iter())
        .filter(|(_, &ex)| !ex)
        .map(|(&x, _)| x)
        .collect();

    let (min, max) = if non_exception_values.is_empty() {
        (0i64, 0i64)
    } else {
        (
            non_exception_values.iter().copied().min().unwrap() as i64,
            non_exception_values.iter().copied().max().unwrap() as i64,
        )
    };
    let bit_width = bit_width_for_range(min, max);

    let for_values: Vec<u32> = encoded
        .iter()
        .zip(is_exception.iter())
        .map(|(&x, &ex)| if ex { 0 } else { (x as i64 - min) as u32 })
        .collect();

    let exception_positions: Vec<u16> = is_exception
        .iter()
        .enumerate()
        .filter(|(_, &ex)| ex)
        .map(|(i, _)| i as u16)
        .collect();
    let exception_values: Vec<f32> = is_exception
        .iter()
        .enumerate()
        .filter(|(_, &ex)| ex)
        .map(|(i, _)| vector[i])
        .collect();

    info_buf.push(e as u8);
    info_buf.push(f as u8);
    info_buf.extend_from_slice(&(exception_positions.len() as u16).to_le_bytes());
    info_buf.extend_from_slice(&(min as i32).to_le_bytes());
    info_buf.push(bit_width);

    let mut packed = vec![0u8; bitpacking::required_bytes(for_values.len(), bit_width)];
    bitpacking::encode(&for_values, bit_width, &mut packed);
    data_buf.extend_from_slice(&packed);
    for p in exception_positions {
        data_buf.extend_from_slice(&p.to_le_bytes());
    }
    for v in exception_values {
        data_buf.extend_from_slice(&v.to_le_bytes());
    }
}

fn encode_vector_f64(vector: &[f64], e: u32, f: u32, info_buf: &mut Vec<u8>, data_buf: &mut Vec<u8>) {
    let mut encoded = vec![0i64; vector.len()];
    let mut is_exception = vec![false; vector.len()];
    for (i, &v) in vector.iter().enumerate() {
        match try_encode_f64(v, e, f) {
            Some(x) => encoded[i] = x,
            None => is_exception[i] = true,
        }
    }

    let non_exception_values: Vec<i64> = encoded
        .iter()
        .zip(is_exception.iter())
        .filter(|(_, &ex)| !ex)
        .map(|(&x, _)| x)
        .collect();

    let (min, max) = if non_exception_values.is_empty() {
        (0i64, 0i64)
    } else {
        (
            non_exception_values.iter().copied().min().unwrap(),
            non_exception_values.iter().copied().max().unwrap(),
        )
    };
    let bit_width = bit_width_for_range(min, max);

    let for_values: Vec<u32> = encoded
        .iter()
        .zip(is_exception.iter())
        .map(|(&x, &ex)| if ex { 0 } else { (x - min) as u32 })
        .collect();

    let exception_positions: Vec<u16> = is_exception
        .iter()
        .enumerate()
        .filter(|(_, &ex)| ex)
        .map(|(i, _)| i as u16)
        .collect();
    let exception_values: Vec<f64> = is_exception
        .iter()
        .enumerate()
        .filter(|(_, &ex)| ex)
        .map(|(i, _)| vector[i])
        .collect();

    info_buf.push(e as u8);
    info_buf.push(f as u8);
    info_buf.extend_from_slice(&(exception_positions.len() as u16).to_le_bytes());
    info_buf.extend_from_slice(&min.to_le_bytes());
    info_buf.push(bit_width);

    let mut packed = vec![0u8; bitpacking::required_bytes(for_values.len(), bit_width)];
    bitpacking::encode(&for_values, bit_width, &mut packed);
    data_buf.extend_from_slice(&packed);
    for p in exception_positions {
        data_buf.extend_from_slice(&p.to_le_bytes());
    }
    for v in exception_values {
        data_buf.extend_from_slice(&v.to_le_bytes());
    }
}

pub fn encode_f32(values: &[f32], out: &mut Vec<u8>) {
    write_header(out, INT_ENCODING_F32, values.len() as i32);
    let mut info_buf = Vec::new();
    let mut data_buf = Vec::new();
    for vector in values.chunks(VECTOR_SIZE) {
        let sample_len = vector.len().min(SAMPLE_SIZE);
        let (e, f) = best_combination_f32(&vector[..sample_len]);
        encode_vector_f32(vector, e, f, &mut info_buf, &mut data_buf);
    }
    out.extend_from_slice(&info_buf);
    out.extend_from_slice(&data_buf);
}

pub fn encode_f64(values: &[f64], out: &mut Vec<u8>) {
    write_header(out, INT_ENCODING_F64, values.len() as i32);
    let mut info_buf = Vec::new();
    let mut data_buf = Vec::new();
    for vector in values.chunks(VECTOR_SIZE) {
        let sample_len = vector.len().min(SAMPLE_SIZE);
        let (e, f) = best_combination_f64(&vector[..sample_len]);
        encode_vector_f64(vector, e, f, &mut info_buf, &mut data_buf);
    }
    out.extend_from_slice(&info_buf);
    out.extend_from_slice(&data_buf);
}
