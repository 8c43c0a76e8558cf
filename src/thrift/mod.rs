//! A from-scratch Thrift Compact Protocol writer (spec.md §4.4). The
//! footer's `FileMetaData` and the `PageHeader` preceding each page are
//! Thrift structs; rather than depend on a generated-Thrift crate, this
//! models the wire values as [`ThriftValue`] and serializes a struct as
//! an ordered list of `(field_id, value)` pairs.
//!
//! Field headers use the standard compact-protocol delta encoding: a
//! single byte holding `(delta << 4) | type` when the field id advances
//! by 1-15 over the previous field in the same struct, otherwise a
//! zero-delta byte followed by the zigzag-varint absolute id. Booleans
//! are folded into the field header's type nibble (`TRUE`/`FALSE`) and
//! never get a value byte of their own, except inside a list, where
//! there is no per-element header and each element is one byte.

pub mod metadata;

use crate::encoding::{uleb128, zigzag_leb128};
use crate::error::Result;

const TYPE_STOP: u8 = 0;
const TYPE_BOOL_TRUE: u8 = 1;
const TYPE_BOOL_FALSE: u8 = 2;
const TYPE_I32: u8 = 5;
const TYPE_I64: u8 = 6;
const TYPE_DOUBLE: u8 = 7;
const TYPE_BINARY: u8 = 8;
const TYPE_LIST: u8 = 9;
const TYPE_STRUCT: u8 = 12;

/// A dynamically-typed Thrift value. Structs carry their field ids
/// explicitly rather than relying on declaration order, since the
/// typed metadata in [`metadata`] assembles fields non-contiguously
/// (optional fields are simply omitted).
#[derive(Debug, Clone, PartialEq)]
pub enum ThriftValue {
    Bool(bool),
    I32(i32),
    I64(i64),
    Double(f64),
    Binary(Vec<u8>),
    List(Vec<ThriftValue>),
    Struct(Vec<(i16, ThriftValue)>),
}

impl ThriftValue {
    fn compact_type(&self) -> u8 {
        match self {
            ThriftValue::Bool(_) => TYPE_BOOL_TRUE,
            ThriftValue::I32(_) => TYPE_I32,
            ThriftValue::I64(_) => TYPE_I64,
            ThriftValue::Double(_) => TYPE_DOUBLE,
            ThriftValue::Binary(_) => TYPE_BINARY,
            ThriftValue::List(_) => TYPE_LIST,
            ThriftValue::Struct(_) => TYPE_STRUCT,
        }
    }
}

/// Serializes `fields` as a Thrift struct (including the trailing
/// STOP byte) and returns the bytes. This is the entry point for
/// writing a root-level value such as `FileMetaData` or `PageHeader`.
pub fn write_struct(fields: &[(i16, ThriftValue)]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    write_struct_into(&mut out, fields)?;
    Ok(out)
}

/// Convenience wrapper for the common `thing.to_thrift()` -> bytes
/// path, used by every page/metadata writer in this crate so callers
/// don't repeat the `let ThriftValue::Struct(fields) = ...` destructure.
pub fn write_thrift_struct(value: ThriftValue) -> Result<Vec<u8>> {
    match value {
        ThriftValue::Struct(fields) => write_struct(&fields),
        other => Err(general_err!("expected a thrift struct, got {:?}", other)),
    }
}

fn write_struct_into(out: &mut Vec<u8>, fields: &[(i16, ThriftValue)]) -> Result<()> {
    let mut last_id: i16 = 0;
    for (field_id, value) in fields {
        if *field_id <= last_id {
            return Err(out_of_spec_err!(
                "thrift field id {} does not strictly increase after {}",
                field_id,
                last_id
            ));
        }
        let compact_type = match value {
            ThriftValue::Bool(b) => bool_compact_type(*b),
            other => other.compact_type(),
        };
        write_field_header(out, last_id, *field_id, compact_type)?;
        last_id = *field_id;
        write_field_value(out, value)?;
    }
    out.push(TYPE_STOP);
    Ok(())
}

fn write_field_header(
    out: &mut Vec<u8>,
    last_id: i16,
    field_id: i16,
    compact_type: u8,
) -> Result<()> {
    let delta = field_id - last_id;
    if (1..=15).contains(&delta) {
        out.push(((delta as u8) << 4) | compact_type);
    } else {
        out.push(compact_type);
        write_zigzag_i32(out, field_id as i32);
    }
    Ok(())
}

/// Writes the value payload following a field header. Booleans are
/// already folded into the header's type nibble, so nothing follows
/// for them.
fn write_field_value(out: &mut Vec<u8>, value: &ThriftValue) -> Result<()> {
    match value {
        ThriftValue::Bool(_) => Ok(()),
        ThriftValue::I32(v) => {
            write_zigzag_i32(out, *v);
            Ok(())
        }
        ThriftValue::I64(v) => {
            write_zigzag_i64(out, *v);
            Ok(())
        }
        ThriftValue::Double(v) => {
            out.extend_from_slice(&v.to_le_bytes());
            Ok(())
        }
        ThriftValue::Binary(bytes) => {
            write_varint_u32(out, bytes.len() as u32)?;
            out.extend_from_slice(bytes);
            Ok(())
        }
        ThriftValue::List(items) => write_list(out, items),
        ThriftValue::Struct(fields) => write_struct_into(out, fields),
    }
}

/// Field header's type nibble actually carries the bool's truthiness
/// (`TRUE`/`FALSE`); overridden here since `compact_type()` always
/// answers `TYPE_BOOL_TRUE`.
fn bool_compact_type(value: bool) -> u8 {
    if value {
        TYPE_BOOL_TRUE
    } else {
        TYPE_BOOL_FALSE
    }
}

fn write_list(out: &mut Vec<u8>, items: &[ThriftValue]) -> Result<()> {
    if items.is_empty() {
        // size 0; the element-type nibble is unobserved by any reader
        // since no elements follow, so any valid type code will do.
        out.push((0u8 << 4) | TYPE_BOOL_TRUE);
        return Ok(());
    }

    let elem_type = resolve_list_element_type(items)?;

    if items.len() < 15 {
        out.push(((items.len() as u8) << 4) | elem_type);
    } else {
        out.push(0xF0 | elem_type);
        write_varint_u32(out, items.len() as u32)?;
    }

    for item in items {
        write_list_element(out, item, elem_type)?;
    }
    Ok(())
}

/// Infers the element type from the first item; a later `I32` inside
/// an otherwise-`Double` list (or vice versa) is accepted and widened
/// to `Double`, anything else mixed in is rejected.
fn resolve_list_element_type(items: &[ThriftValue]) -> Result<u8> {
    let mut elem_type = items[0].compact_type();
    for item in &items[1..] {
        let item_type = item.compact_type();
        if item_type == elem_type {
            continue;
        }
        let is_numeric = |t: u8| matches!(t, TYPE_I32 | TYPE_I64 | TYPE_DOUBLE);
        if is_numeric(elem_type) && is_numeric(item_type) {
            elem_type = TYPE_DOUBLE;
            continue;
        }
        return Err(general_err!(
            "cannot mix thrift list element types {} and {}",
            elem_type,
            item_type
        ));
    }
    Ok(elem_type)
}

fn write_list_element(out: &mut Vec<u8>, item: &ThriftValue, elem_type: u8) -> Result<()> {
    match (item, elem_type) {
        (ThriftValue::Bool(b), TYPE_BOOL_TRUE) => {
            out.push(if *b { 1 } else { 0 });
            Ok(())
        }
        (ThriftValue::I32(v), TYPE_I32) => {
            write_zigzag_i32(out, *v);
            Ok(())
        }
        (ThriftValue::I64(v), TYPE_I64) => {
            write_zigzag_i64(out, *v);
            Ok(())
        }
        (ThriftValue::I32(v), TYPE_DOUBLE) => {
            out.extend_from_slice(&(*v as f64).to_le_bytes());
            Ok(())
        }
        (ThriftValue::I64(v), TYPE_DOUBLE) => {
            out.extend_from_slice(&(*v as f64).to_le_bytes());
            Ok(())
        }
        (ThriftValue::Double(v), TYPE_DOUBLE) => {
            out.extend_from_slice(&v.to_le_bytes());
            Ok(())
        }
        (ThriftValue::Binary(bytes), TYPE_BINARY) => {
            write_varint_u32(out, bytes.len() as u32)?;
            out.extend_from_slice(bytes);
            Ok(())
        }
        (ThriftValue::List(items), TYPE_LIST) => write_list(out, items),
        (ThriftValue::Struct(fields), TYPE_STRUCT) => write_struct_into(out, fields),
        _ => Err(general_err!("thrift list element does not match its resolved element type")),
    }
}

fn write_zigzag_i32(out: &mut Vec<u8>, value: i32) {
    let (container, used) = zigzag_leb128::encode(value as i64);
    out.extend_from_slice(&container[..used]);
}

fn write_zigzag_i64(out: &mut Vec<u8>, value: i64) {
    let (container, used) = zigzag_leb128::encode(value);
    out.extend_from_slice(&container[..used]);
}

fn write_varint_u32(out: &mut Vec<u8>, value: u32) -> Result<()> {
    let mut container = [0u8; 10];
    let used = uleb128::encode(value as u64, &mut container);
    out.extend_from_slice(&container[..used]);
    Ok(())
}

/// Builder used by [`metadata`] to assemble `(field_id, value)` lists
/// without repeating `ThriftValue::X(..)` wrapping at every call site.
#[derive(Debug, Default)]
pub struct StructBuilder {
    fields: Vec<(i16, ThriftValue)>,
}

impl StructBuilder {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    pub fn bool_field(mut self, field_id: i16, value: bool) -> Self {
        self.fields.push((field_id, ThriftValue::Bool(value)));
        self
    }

    pub fn opt_bool_field(self, field_id: i16, value: Option<bool>) -> Self {
        match value {
            Some(v) => self.bool_field(field_id, v),
            None => self,
        }
    }

    pub fn i32_field(mut self, field_id: i16, value: i32) -> Self {
        self.fields.push((field_id, ThriftValue::I32(value)));
        self
    }

    pub fn opt_i32_field(self, field_id: i16, value: Option<i32>) -> Self {
        match value {
            Some(v) => self.i32_field(field_id, v),
            None => self,
        }
    }

    pub fn i64_field(mut self, field_id: i16, value: i64) -> Self {
        self.fields.push((field_id, ThriftValue::I64(value)));
        self
    }

    pub fn opt_i64_field(self, field_id: i16, value: Option<i64>) -> Self {
        match value {
            Some(v) => self.i64_field(field_id, v),
            None => self,
        }
    }

    pub fn binary_field(mut self, field_id: i16, value: Vec<u8>) -> Self {
        self.fields.push((field_id, ThriftValue::Binary(value)));
        self
    }

    pub fn opt_binary_field(self, field_id: i16, value: Option<Vec<u8>>) -> Self {
        match value {
            Some(v) => self.binary_field(field_id, v),
            None => self,
        }
    }

    pub fn string_field(self, field_id: i16, value: &str) -> Self {
        self.binary_field(field_id, value.as_bytes().to_vec())
    }

    pub fn opt_string_field(self, field_id: i16, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.string_field(field_id, v),
            None => self,
        }
    }

    pub fn struct_field(mut self, field_id: i16, value: ThriftValue) -> Self {
        debug_assert!(matches!(value, ThriftValue::Struct(_)));
        self.fields.push((field_id, value));
        self
    }

    pub fn opt_struct_field(self, field_id: i16, value: Option<ThriftValue>) -> Self {
        match value {
            Some(v) => self.struct_field(field_id, v),
            None => self,
        }
    }

    pub fn list_field(mut self, field_id: i16, items: Vec<ThriftValue>) -> Self {
        self.fields.push((field_id, ThriftValue::List(items)));
        self
    }

    pub fn opt_list_field(self, field_id: i16, items: Option<Vec<ThriftValue>>) -> Self {
        match items {
            Some(v) => self.list_field(field_id, v),
            None => self,
        }
    }

    pub fn build(self) -> ThriftValue {
        ThriftValue::Struct(self.fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_true_field_has_no_payload_byte() {
        let bytes = write_struct(&[(1, ThriftValue::Bool(true))]).unwrap();
        // header byte: delta=1, type=TRUE(1) -> 0x11, then STOP
        assert_eq!(bytes, vec![0x11, 0x00]);
    }

    #[test]
    fn bool_false_field() {
        let bytes = write_struct(&[(1, ThriftValue::Bool(false))]).unwrap();
        assert_eq!(bytes, vec![0x12, 0x00]);
    }

    #[test]
    fn i32_field_uses_zigzag_varint() {
        let bytes = write_struct(&[(1, ThriftValue::I32(-1))]).unwrap();
        // header: delta=1, type=I32(5) -> 0x15; zigzag(-1) = 1
        assert_eq!(bytes, vec![0x15, 0x01, 0x00]);
    }

    #[test]
    fn field_id_jump_uses_long_form() {
        let bytes = write_struct(&[(20, ThriftValue::I32(0))]).unwrap();
        // delta 20 > 15, so: type byte alone, then zigzag(20) as field id
        assert_eq!(bytes[0], TYPE_I32);
        let (decoded_id, _) = zigzag_leb128::decode(&bytes[1..]);
        assert_eq!(decoded_id, 20);
    }

    #[test]
    fn non_increasing_field_id_is_rejected() {
        let result = write_struct(&[(2, ThriftValue::I32(1)), (1, ThriftValue::I32(2))]);
        assert!(result.is_err());
    }

    #[test]
    fn duplicate_field_id_is_rejected() {
        let result = write_struct(&[(1, ThriftValue::I32(1)), (1, ThriftValue::I32(2))]);
        assert!(result.is_err());
    }

    #[test]
    fn nested_struct_round_trips_field_ids() {
        let inner = ThriftValue::Struct(vec![(1, ThriftValue::I32(7))]);
        let bytes = write_struct(&[(1, inner)]).unwrap();
        // outer header (0x1c = delta 1, type STRUCT 12), inner header (0x15), zigzag(7)=14, inner STOP, outer STOP
        assert_eq!(bytes, vec![0x1c, 0x15, 14, 0x00, 0x00]);
    }

    #[test]
    fn list_of_i32_round_trips_header() {
        let list = ThriftValue::List(vec![ThriftValue::I32(1), ThriftValue::I32(2)]);
        let bytes = write_struct(&[(1, list)]).unwrap();
        // field header 0x19 (delta 1, type LIST 9), list header (size=2)<<4|I32(5) = 0x25
        assert_eq!(bytes[0], 0x19);
        assert_eq!(bytes[1], 0x25);
    }

    #[test]
    fn list_widens_int_to_double() {
        let list = ThriftValue::List(vec![ThriftValue::I32(1), ThriftValue::Double(2.5)]);
        let bytes = write_struct(&[(1, list)]).unwrap();
        let list_header = bytes[1];
        assert_eq!(list_header & 0x0f, TYPE_DOUBLE);
    }

    #[test]
    fn list_rejects_incompatible_mixed_types() {
        let list = ThriftValue::List(vec![
            ThriftValue::I32(1),
            ThriftValue::Binary(vec![1, 2, 3]),
        ]);
        assert!(write_struct(&[(1, list)]).is_err());
    }

    #[test]
    fn long_list_uses_varint_size() {
        let items: Vec<_> = (0..20).map(ThriftValue::I32).collect();
        let list = ThriftValue::List(items);
        let bytes = write_struct(&[(1, list)]).unwrap();
        assert_eq!(bytes[1], 0xF0 | TYPE_I32);
    }

    #[test]
    fn struct_builder_matches_manual_construction() {
        let built = StructBuilder::new()
            .i32_field(1, 42)
            .string_field(2, "x")
            .build();
        let manual = ThriftValue::Struct(vec![
            (1, ThriftValue::I32(42)),
            (2, ThriftValue::Binary(b"x".to_vec())),
        ]);
        assert_eq!(built, manual);
    }

    #[test]
    fn struct_builder_skips_none_optional_fields() {
        let built = StructBuilder::new()
            .i32_field(1, 1)
            .opt_i32_field(2, None)
            .i32_field(3, 3)
            .build();
        assert_eq!(
            built,
            ThriftValue::Struct(vec![(1, ThriftValue::I32(1)), (3, ThriftValue::I32(3))])
        );
    }
}
