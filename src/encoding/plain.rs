//! PLAIN encoding: the baseline fixed-width / length-prefixed layout
//! every other encoding is defined relative to (e.g. dictionary pages
//! are always PLAIN-encoded).

use crate::error::Result;
use crate::schema::types::PhysicalType;
use crate::value::Value;

/// Packs `bools` LSB-first, 8 to a byte, with a zero-padded final
/// partial byte.
pub fn encode_boolean(bools: &[bool], out: &mut Vec<u8>) {
    for chunk in bools.chunks(8) {
        let mut byte = 0u8;
        for (i, &b) in chunk.iter().enumerate() {
            if b {
                byte |= 1 << i;
            }
        }
        out.push(byte);
    }
}

/// Encodes `values` (already unconverted to their leaf physical type)
/// as PLAIN bytes. Fails with [`crate::error::ParquetError::General`]
/// if a value's runtime shape doesn't match `physical_type`.
pub fn encode(values: &[Value], physical_type: &PhysicalType, out: &mut Vec<u8>) -> Result<()> {
    match physical_type {
        PhysicalType::Boolean => {
            let bools: Result<Vec<bool>> = values
                .iter()
                .map(|v| match v {
                    Value::Bool(b) => Ok(*b),
                    other => Err(general_err!("expected BOOLEAN, got {:?}", other)),
                })
                .collect();
            encode_boolean(&bools?, out);
        }
        PhysicalType::Int32 => {
            for v in values {
                match v {
                    Value::I32(x) => out.extend_from_slice(&x.to_le_bytes()),
                    other => return Err(general_err!("expected INT32, got {:?}", other)),
                }
            }
        }
        PhysicalType::Int64 => {
            for v in values {
                match v {
                    Value::I64(x) => out.extend_from_slice(&x.to_le_bytes()),
                    other => return Err(general_err!("expected INT64, got {:?}", other)),
                }
            }
        }
        PhysicalType::Float => {
            for v in values {
                match v {
                    Value::F32(x) => out.extend_from_slice(&x.to_le_bytes()),
                    other => return Err(general_err!("expected FLOAT, got {:?}", other)),
                }
            }
        }
        PhysicalType::Double => {
            for v in values {
                match v {
                    Value::F64(x) => out.extend_from_slice(&x.to_le_bytes()),
                    other => return Err(general_err!("expected DOUBLE, got {:?}", other)),
                }
            }
        }
        PhysicalType::ByteArray => {
            for v in values {
                let bytes = match v {
                    Value::Bytes(b) => b.as_slice(),
                    Value::Str(s) => s.as_bytes(),
                    other => return Err(general_err!("expected BYTE_ARRAY, got {:?}", other)),
                };
                out.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
                out.extend_from_slice(bytes);
            }
        }
        PhysicalType::FixedLenByteArray(type_length) => {
            let type_length = *type_length as usize;
            for v in values {
                let bytes = match v {
                    Value::Bytes(b) => b.as_slice(),
                    other => {
                        return Err(general_err!(
                            "expected FIXED_LEN_BYTE_ARRAY, got {:?}",
                            other
                        ))
                    }
                };
                if bytes.len() != type_length {
                    return Err(general_err!(
                        "FIXED_LEN_BYTE_ARRAY value has length {} but type_length is {}",
                        bytes.len(),
                        type_length
                    ));
                }
                out.extend_from_slice(bytes);
            }
        }
        PhysicalType::Int96 => return Err(general_err!("INT96 is not supported by this writer")),
    }
    Ok(())
}
