//! Rich logical values -> a leaf's primitive on-disk shape
//! ("unconvert", spec.md §3/§9). parquet2 never needs this: its
//! writers take pre-typed Arrow arrays already in primitive form.
//! This crate accepts row-shaped [`Value`]s, so the column writer and
//! statistics both funnel every value through [`unconvert`] before
//! handing it to [`crate::encoding::plain::encode`] or one of the
//! other bit codecs.
//!
//! Truncation vs. rounding policy (spec.md §9 Open Questions, decided
//! here and recorded in DESIGN.md): FLOAT16 conversion **rounds** to
//! nearest (ties-to-even, via the same bit manipulation every
//! reference half-float implementation uses), it does not truncate
//! the mantissa. DECIMAL conversion stores the unscaled integer
//! exactly (no rounding happens here at all; the caller is expected to
//! have already scaled the value to an integer of the column's
//! `scale`).

use crate::error::Result;
use crate::schema::types::PhysicalType;
use crate::thrift::metadata::ConvertedType;
use crate::value::Value;

/// Milliseconds in one day, for DATE (INT32, days since epoch).
const MILLIS_PER_DAY: i64 = 86_400_000;

/// Converts one logical value into the [`Value`] shape its leaf's
/// `physical_type` expects, applying the widening and date/decimal/
/// float16 rules spec.md names. Values already in the right shape
/// pass through unchanged.
pub fn unconvert(value: &Value, physical_type: PhysicalType, converted_type: Option<ConvertedType>) -> Result<Value> {
    if value.is_null() {
        return Ok(Value::Null);
    }

    match (value, physical_type, converted_type) {
        // INT32 -> DOUBLE/FLOAT widening (spec.md §4.5 "the column's type may only widen INT32 -> DOUBLE").
        (Value::I32(x), PhysicalType::Double, _) => Ok(Value::F64(*x as f64)),
        (Value::I32(x), PhysicalType::Float, _) => Ok(Value::F32(*x as f32)),

        // DATE/TIMESTAMP.
        (Value::Date(ms), PhysicalType::Int32, Some(ConvertedType::Date)) => {
            Ok(Value::I32((ms.div_euclid(MILLIS_PER_DAY)) as i32))
        }
        (Value::Date(ms), PhysicalType::Int64, Some(ConvertedType::TimestampMicros)) => {
            Ok(Value::I64(ms * 1_000))
        }
        (Value::Date(ms), PhysicalType::Int64, _) => Ok(Value::I64(*ms)),
        (Value::I64(x), PhysicalType::Int32, Some(ConvertedType::Date)) => {
            Ok(Value::I32((x.div_euclid(MILLIS_PER_DAY)) as i32))
        }

        // DECIMAL: the unscaled integer, encoded two's-complement big-endian.
        (Value::I32(x), PhysicalType::FixedLenByteArray(n), Some(ConvertedType::Decimal)) => {
            Ok(Value::Bytes(decimal_bytes(*x as i64, *n as usize)))
        }
        (Value::I64(x), PhysicalType::FixedLenByteArray(n), Some(ConvertedType::Decimal)) => {
            Ok(Value::Bytes(decimal_bytes(*x, *n as usize)))
        }

        // FLOAT16: 2-byte IEEE 754 half precision, round-to-nearest-even.
        (Value::F32(x), PhysicalType::FixedLenByteArray(2), _) => {
            Ok(Value::Bytes(f32_to_f16_bytes(*x).to_vec()))
        }

        // JSON: arbitrary nested values serialized to a compact JSON document.
        (v @ (Value::Struct(_) | Value::List(_) | Value::Map(_)), PhysicalType::ByteArray, Some(ConvertedType::Json)) => {
            Ok(Value::Bytes(to_json_bytes(v)))
        }

        // Already in the target physical shape.
        (Value::Bool(_), PhysicalType::Boolean, _)
        | (Value::I32(_), PhysicalType::Int32, _)
        | (Value::I64(_), PhysicalType::Int64, _)
        | (Value::F32(_), PhysicalType::Float, _)
        | (Value::F64(_), PhysicalType::Double, _)
        | (Value::Str(_), PhysicalType::ByteArray, _)
        | (Value::Bytes(_), PhysicalType::ByteArray, _)
        | (Value::Bytes(_), PhysicalType::FixedLenByteArray(_), _) => Ok(value.clone()),

        (other, pt, _) => Err(general_err!(
            "cannot unconvert value {:?} to physical type {:?}",
            other,
            pt
        )),
    }
}

/// Sign-extends (or truncates, for values that fit) `x` into an
/// `n`-byte two's-complement big-endian buffer.
fn decimal_bytes(x: i64, n: usize) -> Vec<u8> {
    let full = x.to_be_bytes();
    if n >= full.len() {
        let fill = if x < 0 { 0xFFu8 } else { 0x00u8 };
        let mut out = vec![fill; n - full.len()];
        out.extend_from_slice(&full);
        out
    } else {
        full[full.len() - n..].to_vec()
    }
}

/// Rounds `x` to the nearest representable `f16`, ties-to-even, and
/// returns its 2-byte little-endian representation.
fn f32_to_f16_bytes(x: f32) -> [u8; 2] {
    let bits = x.to_bits();
    let sign = (bits >> 16) & 0x8000;
    let exp = ((bits >> 23) & 0xFF) as i32;
    let mantissa = bits & 0x7F_FFFF;

    if exp == 0xFF {
        // Inf / NaN.
        let half_mantissa = if mantissa != 0 { 0x200 } else { 0 };
        return ((sign | 0x7C00 | half_mantissa) as u16).to_le_bytes();
    }

    let unbiased = exp - 127;
    if unbiased > 15 {
        // Overflow -> infinity.
        return ((sign | 0x7C00) as u16).to_le_bytes();
    }
    if unbiased < -24 {
        // Underflows to zero.
        return (sign as u16).to_le_bytes();
    }
    if unbiased < -14 {
        // Subnormal half: shift the implicit-1 mantissa right.
        let shift = (-unbiased - 14) as u32;
        let full_mantissa = mantissa | 0x80_0000;
        let half = round_shift(full_mantissa, shift + 13);
        return ((sign | half) as u16).to_le_bytes();
    }

    let half_exp = ((unbiased + 15) as u32) << 10;
    let half_mantissa = round_shift(mantissa, 13);
    // Rounding the mantissa may carry into the exponent.
    let (half_exp, half_mantissa) = if half_mantissa > 0x3FF {
        (half_exp + 0x400, 0)
    } else {
        (half_exp, half_mantissa)
    };
    ((sign | half_exp | half_mantissa) as u16).to_le_bytes()
}

/// Shifts `value` right by `shift` bits, rounding to nearest with
/// ties-to-even.
fn round_shift(value: u32, shift: u32) -> u32 {
    if shift >= 32 {
        return 0;
    }
    let half = 1u32 << (shift - 1);
    let truncated = value >> shift;
    let remainder = value & ((1 << shift) - 1);
    match remainder.cmp(&half) {
        std::cmp::Ordering::Greater => truncated + 1,
        std::cmp::Ordering::Less => truncated,
        std::cmp::Ordering::Equal => truncated + (truncated & 1),
    }
}

/// A minimal, dependency-free JSON writer for the handful of `Value`
/// shapes the JSON conversion path needs. Not a general-purpose
/// serializer: no escaping beyond quotes/backslashes/control chars.
fn to_json_bytes(v: &Value) -> Vec<u8> {
    let mut out = String::new();
    write_json(v, &mut out);
    out.into_bytes()
}

fn write_json(v: &Value, out: &mut String) {
    match v {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::I32(x) => out.push_str(&x.to_string()),
        Value::I64(x) => out.push_str(&x.to_string()),
        Value::F32(x) => out.push_str(&x.to_string()),
        Value::F64(x) => out.push_str(&x.to_string()),
        Value::Date(ms) => out.push_str(&ms.to_string()),
        Value::Str(s) => write_json_string(s, out),
        Value::Bytes(b) => write_json_string(&String::from_utf8_lossy(b), out),
        Value::List(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_json(item, out);
            }
            out.push(']');
        }
        Value::Map(pairs) => {
            out.push('{');
            for (i, (k, v)) in pairs.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                let key = match k {
                    Value::Str(s) => s.clone(),
                    other => format!("{:?}", other),
                };
                write_json_string(&key, out);
                out.push(':');
                write_json(v, out);
            }
            out.push('}');
        }
        Value::Struct(fields) => {
            out.push('{');
            for (i, (k, v)) in fields.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_json_string(k, out);
                out.push(':');
                write_json(v, out);
            }
            out.push('}');
        }
    }
}

fn write_json_string(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}
