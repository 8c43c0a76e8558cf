//! Typed mirrors of the `parquet.thrift` structs this writer emits:
//! the footer (`FileMetaData`), per-page headers, and the page-index
//! structures. Each type carries a `to_thrift` that builds the
//! `(field_id, value)` list the IDL assigns it; field ids below are
//! exactly `parquet.thrift`'s, not renumbered.

use crate::thrift::{StructBuilder, ThriftValue};

/// Physical on-disk type, `parquet.thrift`'s `Type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Boolean,
    Int32,
    Int64,
    Int96,
    Float,
    Double,
    ByteArray,
    FixedLenByteArray,
}

impl Type {
    pub fn to_thrift(self) -> i32 {
        match self {
            Type::Boolean => 0,
            Type::Int32 => 1,
            Type::Int64 => 2,
            Type::Int96 => 3,
            Type::Float => 4,
            Type::Double => 5,
            Type::ByteArray => 6,
            Type::FixedLenByteArray => 7,
        }
    }
}

/// `parquet.thrift`'s `FieldRepetitionType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldRepetitionType {
    Required,
    Optional,
    Repeated,
}

impl FieldRepetitionType {
    pub fn to_thrift(self) -> i32 {
        match self {
            FieldRepetitionType::Required => 0,
            FieldRepetitionType::Optional => 1,
            FieldRepetitionType::Repeated => 2,
        }
    }
}

/// `parquet.thrift`'s `ConvertedType` (legacy logical-type annotation,
/// still written alongside `LogicalType` for older readers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConvertedType {
    Utf8,
    Map,
    MapKeyValue,
    List,
    Enum,
    Decimal,
    Date,
    TimeMillis,
    TimeMicros,
    TimestampMillis,
    TimestampMicros,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Int8,
    Int16,
    Int32,
    Int64,
    Json,
    Bson,
    Interval,
}

impl ConvertedType {
    pub fn to_thrift(self) -> i32 {
        match self {
            ConvertedType::Utf8 => 0,
            ConvertedType::Map => 1,
            ConvertedType::MapKeyValue => 2,
            ConvertedType::List => 3,
            ConvertedType::Enum => 4,
            ConvertedType::Decimal => 5,
            ConvertedType::Date => 6,
            ConvertedType::TimeMillis => 7,
            ConvertedType::TimeMicros => 8,
            ConvertedType::TimestampMillis => 9,
            ConvertedType::TimestampMicros => 10,
            ConvertedType::Uint8 => 11,
            ConvertedType::Uint16 => 12,
            ConvertedType::Uint32 => 13,
            ConvertedType::Uint64 => 14,
            ConvertedType::Int8 => 15,
            ConvertedType::Int16 => 16,
            ConvertedType::Int32 => 17,
            ConvertedType::Int64 => 18,
            ConvertedType::Json => 19,
            ConvertedType::Bson => 20,
            ConvertedType::Interval => 21,
        }
    }
}

/// `parquet.thrift`'s `PageType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageType {
    DataPage,
    IndexPage,
    DictionaryPage,
    DataPageV2,
}

impl PageType {
    pub fn to_thrift(self) -> i32 {
        match self {
            PageType::DataPage => 0,
            PageType::IndexPage => 1,
            PageType::DictionaryPage => 2,
            PageType::DataPageV2 => 3,
        }
    }
}

/// `parquet.thrift`'s `BoundaryOrder`, used by `ColumnIndex`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundaryOrder {
    Unordered,
    Ascending,
    Descending,
}

impl BoundaryOrder {
    pub fn to_thrift(self) -> i32 {
        match self {
            BoundaryOrder::Unordered => 0,
            BoundaryOrder::Ascending => 1,
            BoundaryOrder::Descending => 2,
        }
    }
}

/// One schema-tree node, linearized in preorder (spec.md §3).
#[derive(Debug, Clone)]
pub struct SchemaElement {
    pub type_: Option<Type>,
    pub type_length: Option<i32>,
    pub repetition_type: Option<FieldRepetitionType>,
    pub name: String,
    pub num_children: Option<i32>,
    pub converted_type: Option<ConvertedType>,
    pub scale: Option<i32>,
    pub precision: Option<i32>,
    pub field_id: Option<i32>,
    pub logical_type: Option<ThriftValue>,
}

impl SchemaElement {
    pub fn to_thrift(&self) -> ThriftValue {
        StructBuilder::new()
            .opt_i32_field(1, self.type_.map(Type::to_thrift))
            .opt_i32_field(2, self.type_length)
            .opt_i32_field(3, self.repetition_type.map(FieldRepetitionType::to_thrift))
            .string_field(4, &self.name)
            .opt_i32_field(5, self.num_children)
            .opt_i32_field(6, self.converted_type.map(ConvertedType::to_thrift))
            .opt_i32_field(7, self.scale)
            .opt_i32_field(8, self.precision)
            .opt_i32_field(9, self.field_id)
            .opt_struct_field(10, self.logical_type.clone())
            .build()
    }
}

#[derive(Debug, Clone)]
pub struct KeyValue {
    pub key: String,
    pub value: Option<String>,
}

impl KeyValue {
    pub fn to_thrift(&self) -> ThriftValue {
        StructBuilder::new()
            .string_field(1, &self.key)
            .opt_string_field(2, self.value.as_deref())
            .build()
    }
}

/// Min/max/null-count summary for a column chunk or a data page
/// (spec.md §4.7). Unconverted logical values, truncated to 16 bytes
/// for `BYTE_ARRAY`/`FIXED_LEN_BYTE_ARRAY` (see DESIGN.md).
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    pub null_count: Option<i64>,
    pub distinct_count: Option<i64>,
    pub max_value: Option<Vec<u8>>,
    pub min_value: Option<Vec<u8>>,
    pub is_max_value_exact: Option<bool>,
    pub is_min_value_exact: Option<bool>,
}

impl Statistics {
    pub fn to_thrift(&self) -> ThriftValue {
        StructBuilder::new()
            .opt_i64_field(3, self.null_count)
            .opt_i64_field(4, self.distinct_count)
            .opt_binary_field(5, self.max_value.clone())
            .opt_binary_field(6, self.min_value.clone())
            .opt_bool_field(7, self.is_max_value_exact)
            .opt_bool_field(8, self.is_min_value_exact)
            .build()
    }
}

#[derive(Debug, Clone)]
pub struct DataPageHeaderV2 {
    pub num_values: i32,
    pub num_nulls: i32,
    pub num_rows: i32,
    pub encoding: i32,
    pub definition_levels_byte_length: i32,
    pub repetition_levels_byte_length: i32,
    pub is_compressed: bool,
    pub statistics: Option<Statistics>,
}

impl DataPageHeaderV2 {
    pub fn to_thrift(&self) -> ThriftValue {
        StructBuilder::new()
            .i32_field(1, self.num_values)
            .i32_field(2, self.num_nulls)
            .i32_field(3, self.num_rows)
            .i32_field(4, self.encoding)
            .i32_field(5, self.definition_levels_byte_length)
            .i32_field(6, self.repetition_levels_byte_length)
            .bool_field(7, self.is_compressed)
            .opt_struct_field(8, self.statistics.as_ref().map(Statistics::to_thrift))
            .build()
    }
}

#[derive(Debug, Clone)]
pub struct DictionaryPageHeader {
    pub num_values: i32,
    pub encoding: i32,
    pub is_sorted: Option<bool>,
}

impl DictionaryPageHeader {
    pub fn to_thrift(&self) -> ThriftValue {
        StructBuilder::new()
            .i32_field(1, self.num_values)
            .i32_field(2, self.encoding)
            .opt_bool_field(3, self.is_sorted)
            .build()
    }
}

#[derive(Debug, Clone)]
pub struct PageHeader {
    pub type_: PageType,
    pub uncompressed_page_size: i32,
    pub compressed_page_size: i32,
    pub data_page_header_v2: Option<DataPageHeaderV2>,
    pub dictionary_page_header: Option<DictionaryPageHeader>,
}

impl PageHeader {
    pub fn to_thrift(&self) -> ThriftValue {
        StructBuilder::new()
            .i32_field(1, self.type_.to_thrift())
            .i32_field(2, self.uncompressed_page_size)
            .i32_field(3, self.compressed_page_size)
            .opt_struct_field(7, self.dictionary_page_header.as_ref().map(DictionaryPageHeader::to_thrift))
            .opt_struct_field(8, self.data_page_header_v2.as_ref().map(DataPageHeaderV2::to_thrift))
            .build()
    }
}

#[derive(Debug, Clone)]
pub struct ColumnMetaData {
    pub type_: Type,
    pub encodings: Vec<i32>,
    pub path_in_schema: Vec<String>,
    pub codec: i32,
    pub num_values: i64,
    pub total_uncompressed_size: i64,
    pub total_compressed_size: i64,
    pub data_page_offset: i64,
    pub dictionary_page_offset: Option<i64>,
    pub statistics: Option<Statistics>,
}

impl ColumnMetaData {
    pub fn to_thrift(&self) -> ThriftValue {
        StructBuilder::new()
            .i32_field(1, self.type_.to_thrift())
            .list_field(2, self.encodings.iter().map(|&e| ThriftValue::I32(e)).collect())
            .list_field(
                3,
                self.path_in_schema
                    .iter()
                    .map(|s| ThriftValue::Binary(s.as_bytes().to_vec()))
                    .collect(),
            )
            .i32_field(4, self.codec)
            .i64_field(5, self.num_values)
            .i64_field(6, self.total_uncompressed_size)
            .i64_field(7, self.total_compressed_size)
            .i64_field(9, self.data_page_offset)
            .opt_i64_field(11, self.dictionary_page_offset)
            .opt_struct_field(12, self.statistics.as_ref().map(Statistics::to_thrift))
            .build()
    }
}

#[derive(Debug, Clone)]
pub struct ColumnChunk {
    pub file_offset: i64,
    pub meta_data: ColumnMetaData,
    pub offset_index_offset: Option<i64>,
    pub offset_index_length: Option<i32>,
    pub column_index_offset: Option<i64>,
    pub column_index_length: Option<i32>,
}

impl ColumnChunk {
    pub fn to_thrift(&self) -> ThriftValue {
        StructBuilder::new()
            .i64_field(2, self.file_offset)
            .struct_field(3, self.meta_data.to_thrift())
            .opt_i64_field(4, self.offset_index_offset)
            .opt_i32_field(5, self.offset_index_length)
            .opt_i64_field(6, self.column_index_offset)
            .opt_i32_field(7, self.column_index_length)
            .build()
    }
}

#[derive(Debug, Clone)]
pub struct RowGroup {
    pub columns: Vec<ColumnChunk>,
    pub total_byte_size: i64,
    pub num_rows: i64,
    pub file_offset: Option<i64>,
    pub total_compressed_size: Option<i64>,
    pub ordinal: Option<i32>,
}

impl RowGroup {
    pub fn to_thrift(&self) -> ThriftValue {
        StructBuilder::new()
            .list_field(1, self.columns.iter().map(ColumnChunk::to_thrift).collect())
            .i64_field(2, self.total_byte_size)
            .i64_field(3, self.num_rows)
            .opt_i64_field(5, self.file_offset)
            .opt_i64_field(6, self.total_compressed_size)
            .opt_i32_field(7, self.ordinal.map(|v| v as i32))
            .build()
    }
}

#[derive(Debug, Clone)]
pub struct FileMetaData {
    pub version: i32,
    pub schema: Vec<SchemaElement>,
    pub num_rows: i64,
    pub row_groups: Vec<RowGroup>,
    pub key_value_metadata: Vec<KeyValue>,
    pub created_by: Option<String>,
}

impl FileMetaData {
    pub fn to_thrift(&self) -> ThriftValue {
        StructBuilder::new()
            .i32_field(1, self.version)
            .list_field(2, self.schema.iter().map(SchemaElement::to_thrift).collect())
            .i64_field(3, self.num_rows)
            .list_field(4, self.row_groups.iter().map(RowGroup::to_thrift).collect())
            .opt_list_field(
                5,
                if self.key_value_metadata.is_empty() {
                    None
                } else {
                    Some(self.key_value_metadata.iter().map(KeyValue::to_thrift).collect())
                },
            )
            .opt_string_field(6, self.created_by.as_deref())
            .build()
    }
}

#[derive(Debug, Clone)]
pub struct PageLocation {
    pub offset: i64,
    pub compressed_page_size: i32,
    pub first_row_index: i64,
}

impl PageLocation {
    pub fn to_thrift(&self) -> ThriftValue {
        StructBuilder::new()
            .i64_field(1, self.offset)
            .i32_field(2, self.compressed_page_size)
            .i64_field(3, self.first_row_index)
            .build()
    }
}

#[derive(Debug, Clone)]
pub struct OffsetIndex {
    pub page_locations: Vec<PageLocation>,
}

impl OffsetIndex {
    pub fn to_thrift(&self) -> ThriftValue {
        StructBuilder::new()
            .list_field(1, self.page_locations.iter().map(PageLocation::to_thrift).collect())
            .build()
    }
}

#[derive(Debug, Clone)]
pub struct ColumnIndex {
    pub null_pages: Vec<bool>,
    pub min_values: Vec<Vec<u8>>,
    pub max_values: Vec<Vec<u8>>,
    pub boundary_order: BoundaryOrder,
    pub null_counts: Option<Vec<i64>>,
}

impl ColumnIndex {
    pub fn to_thrift(&self) -> ThriftValue {
        StructBuilder::new()
            .list_field(1, self.null_pages.iter().map(|&b| ThriftValue::Bool(b)).collect())
            .list_field(2, self.min_values.iter().cloned().map(ThriftValue::Binary).collect())
            .list_field(3, self.max_values.iter().cloned().map(ThriftValue::Binary).collect())
            .i32_field(4, self.boundary_order.to_thrift())
            .opt_list_field(
                5,
                self.null_counts
                    .as_ref()
                    .map(|counts| counts.iter().map(|&c| ThriftValue::I64(c)).collect()),
            )
            .build()
    }
}
