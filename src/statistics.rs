//! Per-page/per-chunk `{min_value, max_value, null_count}` (spec.md
//! §3 "Statistics"), computed over logical, pre-conversion
//! [`Value`]s and merged the way parquet2's `write/statistics.rs`
//! folds typed statistics across pages, generalized here to the
//! dynamic `Value` this crate shreds from instead of typed arrays.

use std::cmp::Ordering;

use crate::convert::unconvert;
use crate::error::Result;
use crate::schema::types::PhysicalType;
use crate::thrift::metadata::{ConvertedType, Statistics as ThriftStatistics};
use crate::value::Value;

/// `BYTE_ARRAY` min/max are truncated to this many bytes before being
/// stored (spec.md §3).
const BYTE_ARRAY_TRUNCATE_LEN: usize = 16;

#[derive(Debug, Clone, Default)]
pub struct ColumnStatistics {
    pub null_count: i64,
    pub min_value: Option<Value>,
    pub max_value: Option<Value>,
}

/// Orders two same-shaped logical values. Returns `None` for shapes
/// that cannot be ordered (nested values never reach here: the
/// shredder always flattens to leaf values before statistics run).
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::I32(x), Value::I32(y)) => Some(x.cmp(y)),
        (Value::I64(x), Value::I64(y)) => Some(x.cmp(y)),
        (Value::F32(x), Value::F32(y)) => x.partial_cmp(y),
        (Value::F64(x), Value::F64(y)) => x.partial_cmp(y),
        (Value::Str(x), Value::Str(y)) => Some(x.as_bytes().cmp(y.as_bytes())),
        (Value::Bytes(x), Value::Bytes(y)) => Some(x.cmp(y)),
        (Value::Date(x), Value::Date(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

impl ColumnStatistics {
    pub fn from_values(values: &[Value]) -> Self {
        let mut stats = ColumnStatistics::default();
        for v in values {
            stats.observe(v);
        }
        stats
    }

    pub fn observe(&mut self, v: &Value) {
        if v.is_null() {
            self.null_count += 1;
            return;
        }
        self.min_value = Some(match self.min_value.take() {
            None => v.clone(),
            Some(cur) => match compare_values(v, &cur) {
                Some(Ordering::Less) => v.clone(),
                _ => cur,
            },
        });
        self.max_value = Some(match self.max_value.take() {
            None => v.clone(),
            Some(cur) => match compare_values(v, &cur) {
                Some(Ordering::Greater) => v.clone(),
                _ => cur,
            },
        });
    }

    /// Folds `other` (e.g. another page's stats) into `self`, the way
    /// parquet2's `reduce_primitive`/`reduce_binary` accumulate across
    /// pages into a row-group-level chunk statistic.
    pub fn merge(&mut self, other: &ColumnStatistics) {
        self.null_count += other.null_count;
        if let Some(v) = &other.min_value {
            self.observe_extreme(v, Ordering::Less);
        }
        if let Some(v) = &other.max_value {
            self.observe_extreme(v, Ordering::Greater);
        }
    }

    fn observe_extreme(&mut self, v: &Value, keep: Ordering) {
        let slot = if keep == Ordering::Less {
            &mut self.min_value
        } else {
            &mut self.max_value
        };
        *slot = Some(match slot.take() {
            None => v.clone(),
            Some(cur) => match compare_values(v, &cur) {
                Some(ord) if ord == keep => v.clone(),
                _ => cur,
            },
        });
    }

    pub fn is_empty(&self) -> bool {
        self.min_value.is_none() && self.max_value.is_none() && self.null_count == 0
    }

    /// Unconverts min/max to the leaf's primitive raw bytes (no
    /// length prefix), truncating `BYTE_ARRAY` to 16 bytes, and
    /// assembles the Thrift `Statistics` struct.
    pub fn to_thrift(
        &self,
        physical_type: PhysicalType,
        converted_type: Option<ConvertedType>,
    ) -> Result<ThriftStatistics> {
        let min_value = self
            .min_value
            .as_ref()
            .map(|v| raw_value_bytes(v, physical_type, converted_type))
            .transpose()?
            .map(|b| truncate(b, physical_type));
        let max_value = self
            .max_value
            .as_ref()
            .map(|v| raw_value_bytes(v, physical_type, converted_type))
            .transpose()?
            .map(|b| truncate(b, physical_type));

        Ok(ThriftStatistics {
            null_count: Some(self.null_count),
            distinct_count: None,
            max_value,
            min_value,
            is_max_value_exact: None,
            is_min_value_exact: None,
        })
    }
}

fn truncate(mut bytes: Vec<u8>, physical_type: PhysicalType) -> Vec<u8> {
    if matches!(physical_type, PhysicalType::ByteArray) && bytes.len() > BYTE_ARRAY_TRUNCATE_LEN {
        bytes.truncate(BYTE_ARRAY_TRUNCATE_LEN);
    }
    bytes
}

/// Encodes a single logical value as its leaf's raw PLAIN bytes,
/// without `BYTE_ARRAY`'s 4-byte length prefix (Statistics min/max
/// are the bare value bytes, unlike a PLAIN page body).
fn raw_value_bytes(
    v: &Value,
    physical_type: PhysicalType,
    converted_type: Option<ConvertedType>,
) -> Result<Vec<u8>> {
    let unconverted = unconvert(v, physical_type, converted_type)?;
    let mut out = Vec::new();
    crate::encoding::plain::encode(&[unconverted], &physical_type, &mut out)?;
    if matches!(physical_type, PhysicalType::ByteArray) {
        out.drain(0..4);
    }
    Ok(out)
}
