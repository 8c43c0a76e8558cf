//! Page-body compression. Only Snappy is implemented; the `Codec`
//! trait leaves a pluggable slot for anything else (spec.md §1 keeps
//! general compression beyond Snappy a non-goal for the core).

use crate::error::Result;

/// The compression codec recorded on a column chunk.
#[derive(Debug, Eq, PartialEq, Hash, Clone, Copy)]
pub enum Compression {
    Uncompressed,
    Snappy,
    Gzip,
    Lzo,
    Brotli,
    Lz4,
    Zstd,
    Lz4Raw,
}

impl Compression {
    /// The Thrift `CompressionCodec` enum value, per `parquet.thrift`.
    pub fn to_thrift(self) -> i32 {
        match self {
            Compression::Uncompressed => 0,
            Compression::Snappy => 1,
            Compression::Gzip => 2,
            Compression::Lzo => 3,
            Compression::Brotli => 4,
            Compression::Lz4 => 5,
            Compression::Zstd => 6,
            Compression::Lz4Raw => 7,
        }
    }
}

/// Compresses data stored in `input_buf`, appending to `output_buf`.
pub trait Codec: std::fmt::Debug {
    fn compress(&mut self, input_buf: &[u8], output_buf: &mut Vec<u8>) -> Result<()>;
}

/// Given `codec`, returns a codec to compress bytes, or `None` for
/// `Uncompressed` (callers should skip compression entirely, not call
/// through a no-op codec).
pub fn create_codec(codec: Compression) -> Result<Option<Box<dyn Codec>>> {
    match codec {
        Compression::Uncompressed => Ok(None),
        Compression::Snappy => Ok(Some(Box::new(SnappyCodec))),
        other => Err(general_err!("compression codec {:?} is not implemented", other)),
    }
}

/// Codec for the hand-rolled Snappy encoder in [`crate::snappy`].
#[derive(Debug)]
pub struct SnappyCodec;

impl Codec for SnappyCodec {
    fn compress(&mut self, input_buf: &[u8], output_buf: &mut Vec<u8>) -> Result<()> {
        crate::snappy::compress(input_buf, output_buf);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uncompressed_has_no_codec() {
        assert!(create_codec(Compression::Uncompressed).unwrap().is_none());
    }

    #[test]
    fn unimplemented_codec_errors() {
        assert!(create_codec(Compression::Gzip).is_err());
    }

    #[test]
    fn snappy_codec_compresses() {
        let mut codec = create_codec(Compression::Snappy).unwrap().unwrap();
        let mut out = Vec::new();
        codec.compress(b"aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", &mut out).unwrap();
        assert!(!out.is_empty());
    }
}
