pub mod alp;
pub mod bitpacking;
pub mod byte_stream_split;
pub mod delta_bitpacked;
pub mod delta_byte_array;
pub mod delta_length_byte_array;
pub mod hybrid_rle;
pub mod plain;
pub mod uleb128;
pub mod zigzag_leb128;

/// The Parquet `Encoding` values this writer can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    Plain,
    Rle,
    RleDictionary,
    DeltaBinaryPacked,
    DeltaLengthByteArray,
    DeltaByteArray,
    ByteStreamSplit,
    Alp,
}

impl Encoding {
    /// The Thrift enum value for this encoding, per `parquet.thrift`.
    pub fn to_thrift(self) -> i32 {
        match self {
            Encoding::Plain => 0,
            Encoding::Rle => 3,
            Encoding::DeltaBinaryPacked => 5,
            Encoding::DeltaLengthByteArray => 6,
            Encoding::DeltaByteArray => 7,
            Encoding::RleDictionary => 8,
            Encoding::ByteStreamSplit => 9,
            // Not an official parquet-format encoding; 9000 keeps it
            // distinguishable from standard encodings for test purposes.
            Encoding::Alp => 9000,
        }
    }
}

/// Returns the ceil of value/divisor.
#[inline]
pub fn ceil8(value: usize) -> usize {
    value / 8 + ((value % 8 != 0) as usize)
}
