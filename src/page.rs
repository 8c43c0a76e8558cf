//! Page assembly: a Data Page V2 or a Dictionary page, each a Thrift
//! `PageHeader` followed by its body (spec.md §6 "Data Page V2
//! on-disk"). Grounded on parquet2's `write/page.rs` `write_page`/
//! `assemble_*_header`, generalized here to a synchronous single
//! `ByteSink` instead of parquet2's `Write`/`AsyncWrite` pair (this
//! crate has no async surface, spec.md §5).

use crate::byte_sink::ByteSink;
use crate::error::{ParquetError, Result};
use crate::thrift::metadata::{self, PageType, Statistics as ThriftStatistics};
use crate::thrift::write_thrift_struct;

/// A Data Page V2 body plus the header fields describing it.
#[derive(Debug, Clone)]
pub struct CompressedDataPage {
    pub num_values: i32,
    pub num_nulls: i32,
    pub num_rows: i32,
    pub encoding: i32,
    pub repetition_levels: Vec<u8>,
    pub definition_levels: Vec<u8>,
    pub compressed_body: Vec<u8>,
    pub uncompressed_body_len: usize,
    pub is_compressed: bool,
    pub statistics: Option<ThriftStatistics>,
}

impl CompressedDataPage {
    fn uncompressed_size(&self) -> usize {
        self.repetition_levels.len() + self.definition_levels.len() + self.uncompressed_body_len
    }

    fn compressed_size(&self) -> usize {
        self.repetition_levels.len() + self.definition_levels.len() + self.compressed_body.len()
    }
}

#[derive(Debug, Clone)]
pub struct CompressedDictPage {
    pub buffer: Vec<u8>,
    pub uncompressed_page_size: usize,
    pub num_values: usize,
}

#[derive(Debug, Clone)]
pub enum CompressedPage {
    Data(CompressedDataPage),
    Dict(CompressedDictPage),
}

/// What the column writer needs to know after a page lands in the
/// sink: its exact offset (spec.md §5 offset-exactness invariant),
/// how many bytes it occupied, and enough to build the page index.
pub struct PageWriteSpec {
    pub offset: u64,
    pub bytes_written: u64,
    /// `bytes_written` minus the header: the on-disk (post-compression)
    /// page body size, matching `ColumnMetaData.total_compressed_size`'s
    /// per-page term.
    pub compressed_body_size: u64,
    /// The page body size before compression, matching
    /// `ColumnMetaData.total_uncompressed_size`'s per-page term
    /// (DESIGN.md: this must be the true uncompressed sum, not the
    /// compressed size repeated).
    pub uncompressed_body_size: u64,
    pub header_size: u64,
    pub page_type: PageType,
    pub num_values: usize,
    pub num_rows: Option<usize>,
    pub statistics: Option<ThriftStatistics>,
}

fn checked_i32(n: usize, what: &str) -> Result<i32> {
    n.try_into()
        .map_err(|_| ParquetError::OutOfSpec(format!("{} exceeds i32::MAX ({})", what, n)))
}

/// Writes one page to `sink`, recording the offset it began at.
pub fn write_page<S: ByteSink + ?Sized>(sink: &mut S, page: &CompressedPage) -> Result<PageWriteSpec> {
    let offset = sink.offset();
    let header = match page {
        CompressedPage::Data(p) => assemble_data_page_header(p)?,
        CompressedPage::Dict(p) => assemble_dict_page_header(p)?,
    };
    let header_bytes = write_thrift_struct(header.to_thrift())?;
    let header_size = header_bytes.len() as u64;
    sink.append_slice(&header_bytes)?;

    let (compressed_body_size, uncompressed_body_size) = match page {
        CompressedPage::Data(p) => (p.compressed_size() as u64, p.uncompressed_size() as u64),
        CompressedPage::Dict(p) => (p.buffer.len() as u64, p.uncompressed_page_size as u64),
    };

    match page {
        CompressedPage::Data(p) => {
            sink.append_slice(&p.repetition_levels)?;
            sink.append_slice(&p.definition_levels)?;
            sink.append_slice(&p.compressed_body)?;
        }
        CompressedPage::Dict(p) => {
            sink.append_slice(&p.buffer)?;
        }
    }

    let bytes_written = sink.offset() - offset;
    let (page_type, num_values, num_rows, statistics) = match page {
        CompressedPage::Data(p) => (
            PageType::DataPageV2,
            p.num_values as usize,
            Some(p.num_rows as usize),
            p.statistics.clone(),
        ),
        CompressedPage::Dict(p) => (PageType::DictionaryPage, p.num_values, None, None),
    };

    Ok(PageWriteSpec {
        offset,
        bytes_written,
        compressed_body_size,
        uncompressed_body_size,
        header_size,
        page_type,
        num_values,
        num_rows,
        statistics,
    })
}

fn assemble_data_page_header(page: &CompressedDataPage) -> Result<metadata::PageHeader> {
    let uncompressed_page_size = checked_i32(page.uncompressed_size(), "uncompressed data page size")?;
    let compressed_page_size = checked_i32(page.compressed_size(), "compressed data page size")?;
    Ok(metadata::PageHeader {
        type_: PageType::DataPageV2,
        uncompressed_page_size,
        compressed_page_size,
        dictionary_page_header: None,
        data_page_header_v2: Some(metadata::DataPageHeaderV2 {
            num_values: page.num_values,
            num_nulls: page.num_nulls,
            num_rows: page.num_rows,
            encoding: page.encoding,
            definition_levels_byte_length: page.definition_levels.len() as i32,
            repetition_levels_byte_length: page.repetition_levels.len() as i32,
            is_compressed: page.is_compressed,
            statistics: page.statistics.clone(),
        }),
    })
}

fn assemble_dict_page_header(page: &CompressedDictPage) -> Result<metadata::PageHeader> {
    let uncompressed_page_size = checked_i32(page.uncompressed_page_size, "uncompressed dictionary page size")?;
    let compressed_page_size = checked_i32(page.buffer.len(), "compressed dictionary page size")?;
    let num_values = checked_i32(page.num_values, "dictionary page value count")?;
    Ok(metadata::PageHeader {
        type_: PageType::DictionaryPage,
        uncompressed_page_size,
        compressed_page_size,
        dictionary_page_header: Some(metadata::DictionaryPageHeader {
            num_values,
            encoding: crate::encoding::Encoding::Plain.to_thrift(),
            is_sorted: None,
        }),
        data_page_header_v2: None,
    })
}
