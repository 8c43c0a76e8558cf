//! The physical on-disk type, carrying `FIXED_LEN_BYTE_ARRAY`'s length
//! inline so callers never need a second optional field to track it.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhysicalType {
    Boolean,
    Int32,
    Int64,
    Int96,
    Float,
    Double,
    ByteArray,
    FixedLenByteArray(i32),
}

impl PhysicalType {
    /// The Thrift wire enum this maps to, per `parquet.thrift`'s `Type`.
    pub fn to_thrift(self) -> crate::thrift::metadata::Type {
        use crate::thrift::metadata::Type as WireType;
        match self {
            PhysicalType::Boolean => WireType::Boolean,
            PhysicalType::Int32 => WireType::Int32,
            PhysicalType::Int64 => WireType::Int64,
            PhysicalType::Int96 => WireType::Int96,
            PhysicalType::Float => WireType::Float,
            PhysicalType::Double => WireType::Double,
            PhysicalType::ByteArray => WireType::ByteArray,
            PhysicalType::FixedLenByteArray(_) => WireType::FixedLenByteArray,
        }
    }

    pub fn type_length(self) -> Option<i32> {
        match self {
            PhysicalType::FixedLenByteArray(n) => Some(n),
            _ => None,
        }
    }

    /// Fixed per-value byte cost used by the column writer's paging
    /// policy (spec.md §4.7); `None` for `BYTE_ARRAY`, whose cost is
    /// the value's actual encoded length.
    pub fn fixed_byte_cost(self) -> Option<usize> {
        match self {
            PhysicalType::Boolean => Some(1),
            PhysicalType::Int32 | PhysicalType::Float => Some(4),
            PhysicalType::Int64 | PhysicalType::Double => Some(8),
            PhysicalType::Int96 => Some(12),
            PhysicalType::FixedLenByteArray(n) => Some(n as usize),
            PhysicalType::ByteArray => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_len_byte_array_carries_its_length() {
        let t = PhysicalType::FixedLenByteArray(12);
        assert_eq!(t.type_length(), Some(12));
        assert_eq!(t.fixed_byte_cost(), Some(12));
    }

    #[test]
    fn byte_array_has_no_fixed_cost() {
        assert_eq!(PhysicalType::ByteArray.fixed_byte_cost(), None);
    }
}
