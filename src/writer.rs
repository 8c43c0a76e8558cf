//! The top-level entry point: `PAR1` header, one or more row groups,
//! the page-index region, and the Thrift footer (spec.md §4.8 "Parquet
//! writer", §4.9 state machine, §6 file layout). Grounded on parquet2's
//! `write/file.rs` `FileWriter` (`start_file`/`end_file`), generalized
//! from its chunk-iterator-of-pages interface to this crate's row-
//! oriented `ColumnValues` input and extended with the page-index
//! region parquet2's synchronous `FileWriter` never emits itself.

use std::collections::HashMap;

use crate::byte_sink::ByteSink;
use crate::column_writer::{ColumnChunkResult, ColumnOptions};
use crate::compression::Compression;
use crate::error::{ParquetError, Result};
use crate::row_group::{write_row_group, ColumnValues};
use crate::schema::{ColumnDescriptor, SchemaDescriptor};
use crate::thrift::metadata::{FileMetaData, KeyValue, RowGroup};
use crate::thrift::write_thrift_struct;
use crate::{FOOTER_SIZE, PARQUET_MAGIC};

/// Writer-level knobs (spec.md §6 "Recognized options (writer-level)").
/// Per-column overrides (`forced_encoding`, `write_page_index`) are
/// layered on top of these defaults via [`ParquetWriter::set_column_options`].
#[derive(Debug, Clone)]
pub struct WriteOptions {
    pub compression: Compression,
    pub write_statistics: bool,
    pub data_page_size_limit: usize,
    pub write_page_index: bool,
    pub row_group_size: RowGroupSizePolicy,
    pub created_by: Option<String>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            compression: Compression::Snappy,
            write_statistics: true,
            data_page_size_limit: crate::column_writer::DEFAULT_DATA_PAGE_SIZE,
            write_page_index: true,
            row_group_size: RowGroupSizePolicy::Uniform(100_000),
            created_by: None,
        }
    }
}

impl WriteOptions {
    fn base_column_options(&self) -> ColumnOptions {
        ColumnOptions {
            compression: self.compression,
            forced_encoding: None,
            data_page_size_limit: self.data_page_size_limit,
            write_page_index: self.write_page_index,
        }
    }
}

/// Row-group sizing (spec.md §3 "Row group", §3 GLOSSARY): either every
/// group has the same row count, or an explicit sequence is consumed
/// one entry per group, with the last entry repeating once exhausted.
#[derive(Debug, Clone)]
pub enum RowGroupSizePolicy {
    Uniform(usize),
    Sequence(Vec<usize>),
}

impl RowGroupSizePolicy {
    fn size_for(&self, group_index: usize) -> Result<usize> {
        match self {
            RowGroupSizePolicy::Uniform(n) => Ok(*n),
            RowGroupSizePolicy::Sequence(sizes) => sizes
                .get(group_index)
                .or_else(|| sizes.last())
                .copied()
                .ok_or_else(|| general_err!("row-group size sequence must not be empty")),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum WriterState {
    Initialized,
    Writing,
    Finished,
}

struct PendingRowGroup {
    row_group: RowGroup,
    results: Vec<(ColumnDescriptor, ColumnChunkResult)>,
}

/// Drives a sink through `Initialized -> (Writing*)* -> Finished`
/// (spec.md §4.9). Constructing a writer emits the `PAR1` header
/// immediately: the API surface (spec.md §6) has no separate `start`
/// call, unlike parquet2's `FileWriter::start`.
pub struct ParquetWriter<S: ByteSink> {
    sink: S,
    schema: SchemaDescriptor,
    schema_name: String,
    options: WriteOptions,
    column_overrides: HashMap<String, ColumnOptions>,
    kv_metadata: Vec<KeyValue>,
    row_groups: Vec<PendingRowGroup>,
    state: WriterState,
    next_group_index: usize,
}

impl<S: ByteSink> ParquetWriter<S> {
    pub fn new(mut sink: S, schema: SchemaDescriptor, options: WriteOptions) -> Result<Self> {
        sink.append_slice(&PARQUET_MAGIC)?;
        Ok(Self {
            sink,
            schema,
            schema_name: "schema".to_string(),
            options,
            column_overrides: HashMap::new(),
            kv_metadata: Vec::new(),
            row_groups: Vec::new(),
            state: WriterState::Initialized,
            next_group_index: 0,
        })
    }

    /// Overrides forced-encoding/page-index options for one root
    /// column's leaves (spec.md §6 "per-column `encoding`", `columnIndex`/`offsetIndex`).
    pub fn set_column_options(&mut self, root_name: &str, options: ColumnOptions) {
        self.column_overrides.insert(root_name.to_string(), options);
    }

    pub fn add_key_value_metadata(&mut self, key: impl Into<String>, value: Option<String>) {
        self.kv_metadata.push(KeyValue { key: key.into(), value });
    }

    pub fn schema(&self) -> &SchemaDescriptor {
        &self.schema
    }

    fn column_options_for(&self, root_name: &str) -> ColumnOptions {
        self.column_overrides
            .get(root_name)
            .cloned()
            .unwrap_or_else(|| self.options.base_column_options())
    }

    /// Writes one row group from row-oriented column data (spec.md
    /// §4.8): `columns` must carry every root named in the schema,
    /// each with exactly `num_rows` values. `write` after `finish` is
    /// an error (spec.md §4.9).
    pub fn write(&mut self, columns: &ColumnValues, num_rows: usize) -> Result<()> {
        if self.state == WriterState::Finished {
            return Err(general_err!("cannot write a row group after finish() has been called"));
        }
        if num_rows == 0 {
            return Ok(());
        }

        let root_names: Vec<String> = self.schema.roots.iter().map(|r| r.name().to_string()).collect();

        let mut remaining = num_rows;
        let mut row_cursor = 0;
        while remaining > 0 {
            let group_size = self.options.row_group_size.size_for(self.next_group_index)?;
            self.next_group_index += 1;
            let this_rows = remaining.min(group_size);
            let slice: ColumnValues = root_names
                .iter()
                .map(|name| {
                    let values = columns
                        .get(name)
                        .ok_or_else(|| general_err!("no values were supplied for column `{}`", name))?;
                    if values.len() != num_rows {
                        return Err(general_err!(
                            "column `{}` has {} rows but `write` was called with num_rows = {}",
                            name,
                            values.len(),
                            num_rows
                        ));
                    }
                    Ok((name.clone(), values[row_cursor..row_cursor + this_rows].to_vec()))
                })
                .collect::<Result<_>>()?;

            self.write_one_group(&root_names, &slice, this_rows)?;
            row_cursor += this_rows;
            remaining -= this_rows;
        }

        self.state = WriterState::Writing;
        Ok(())
    }

    fn write_one_group(&mut self, root_names: &[String], columns: &ColumnValues, num_rows: usize) -> Result<()> {
        // `write_row_group` needs one `ColumnOptions` per call; every
        // leaf of a root shares that root's options.
        let mut pending_columns = Vec::new();
        for name in root_names {
            let opts = self.column_options_for(name);
            let (row_group, results) = write_row_group(
                &mut self.sink,
                &self.schema,
                std::slice::from_ref(name),
                columns,
                num_rows,
                &opts,
            )?;
            pending_columns.push((row_group, results));
        }

        // Fold the per-root row groups (one leaf set each) into a
        // single `RowGroup` spanning every column.
        let file_offset = pending_columns
            .first()
            .and_then(|(rg, _)| rg.columns.first())
            .map(|c| c.file_offset);
        let mut columns_out = Vec::new();
        let mut results_out = Vec::new();
        let mut total_byte_size = 0i64;
        for (rg, results) in pending_columns {
            total_byte_size += rg.total_byte_size;
            columns_out.extend(rg.columns);
            results_out.extend(results);
        }

        self.row_groups.push(PendingRowGroup {
            row_group: RowGroup {
                columns: columns_out,
                total_byte_size,
                num_rows: num_rows as i64,
                file_offset,
                total_compressed_size: None,
                ordinal: Some(self.row_groups.len() as i32),
            },
            results: results_out,
        });
        Ok(())
    }

    /// Emits the page-index region (if any column opted in and
    /// produced more than one page — spec.md §4.7 step 8), the
    /// Thrift `FileMetaData`, the little-endian u32 metadata length,
    /// and the trailing `PAR1` (spec.md §6 file layout). A second call
    /// is an error (spec.md §4.9).
    pub fn finish(mut self) -> Result<S> {
        if self.state == WriterState::Finished {
            return Err(general_err!("finish() was already called on this writer"));
        }

        // Column indexes, then offset indexes, each region contiguous
        // and ordered (row group, column) — spec.md §6's file layout.
        for phase_is_column_index in [true, false] {
            for group in &mut self.row_groups {
                for (chunk, (descriptor, result)) in group.row_group.columns.iter_mut().zip(&group.results) {
                    if result.write_page_index && result.page_index.len() > 1 {
                        if phase_is_column_index {
                            let index = result
                                .page_index
                                .build_column_index(descriptor.physical_type, descriptor.converted_type)?;
                            let (offset, length) = crate::indexes::write_index(&mut self.sink, index.to_thrift())?;
                            chunk.column_index_offset = Some(offset);
                            chunk.column_index_length = Some(length);
                        } else {
                            let index = result.page_index.build_offset_index();
                            let (offset, length) = crate::indexes::write_index(&mut self.sink, index.to_thrift())?;
                            chunk.offset_index_offset = Some(offset);
                            chunk.offset_index_length = Some(length);
                        }
                    }
                }
            }
        }

        let num_rows = self.row_groups.iter().map(|g| g.row_group.num_rows).sum();
        let row_groups: Vec<RowGroup> = self.row_groups.into_iter().map(|g| g.row_group).collect();
        let metadata = FileMetaData {
            version: 2,
            schema: self.schema.to_thrift_elements(&self.schema_name),
            num_rows,
            row_groups,
            key_value_metadata: self.kv_metadata,
            created_by: self.options.created_by.clone(),
        };

        let metadata_bytes = write_thrift_struct(metadata.to_thrift())?;
        let metadata_len: i32 = metadata_bytes
            .len()
            .try_into()
            .map_err(|_| ParquetError::OutOfSpec("file metadata exceeds i32::MAX bytes".to_string()))?;
        self.sink.append_slice(&metadata_bytes)?;

        let mut footer = [0u8; FOOTER_SIZE as usize];
        footer[0..4].copy_from_slice(&metadata_len.to_le_bytes());
        footer[4..8].copy_from_slice(&PARQUET_MAGIC);
        self.sink.append_slice(&footer)?;
        self.sink.finish()?;

        self.state = WriterState::Finished;
        Ok(self.sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::byte_sink::MemSink;
    use crate::schema::types::PhysicalType;
    use crate::schema::{PrimitiveNode, Repetition, SchemaNode};
    use crate::value::Value;

    fn int_schema() -> SchemaDescriptor {
        SchemaDescriptor::new(vec![SchemaNode::Primitive(PrimitiveNode::new(
            "a",
            Repetition::Required,
            PhysicalType::Int32,
        ))])
    }

    #[test]
    fn writes_a_minimal_valid_file() {
        let schema = int_schema();
        let mut writer = ParquetWriter::new(MemSink::new(), schema, WriteOptions::default()).unwrap();

        let mut columns = ColumnValues::new();
        columns.insert("a".to_string(), vec![Value::I32(1), Value::I32(2), Value::I32(3)]);
        writer.write(&columns, 3).unwrap();

        let sink = writer.finish().unwrap();
        let bytes = sink.into_vec();

        assert_eq!(&bytes[0..4], b"PAR1");
        assert_eq!(&bytes[bytes.len() - 4..], b"PAR1");
        let metadata_len = u32::from_le_bytes(bytes[bytes.len() - 8..bytes.len() - 4].try_into().unwrap()) as usize;
        assert!(metadata_len > 0);
        assert!(metadata_len + 8 < bytes.len());
    }

    #[test]
    fn write_after_finish_is_an_error() {
        let schema = int_schema();
        let mut writer = ParquetWriter::new(MemSink::new(), schema, WriteOptions::default()).unwrap();
        let mut columns = ColumnValues::new();
        columns.insert("a".to_string(), vec![Value::I32(1)]);
        writer.write(&columns, 1).unwrap();

        // force the Finished state directly rather than calling
        // finish(), which would consume the writer
        let schema2 = int_schema();
        let mut writer2 = ParquetWriter::new(MemSink::new(), schema2, WriteOptions::default()).unwrap();
        writer2.state = WriterState::Finished;
        let err = writer2.write(&columns, 1);
        assert!(err.is_err());
    }

    #[test]
    fn sequence_row_group_policy_repeats_last_entry() {
        let schema = int_schema();
        let mut options = WriteOptions::default();
        options.row_group_size = RowGroupSizePolicy::Sequence(vec![2]);
        let mut writer = ParquetWriter::new(MemSink::new(), schema, options).unwrap();

        let mut columns = ColumnValues::new();
        columns.insert(
            "a".to_string(),
            (0..5).map(Value::I32).collect(),
        );
        writer.write(&columns, 5).unwrap();
        assert_eq!(writer.row_groups.len(), 3); // 2 + 2 + 1
        let sink = writer.finish().unwrap();
        assert!(sink.into_vec().len() > 8);
    }
}
