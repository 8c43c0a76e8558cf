//! End-to-end scenarios (spec.md §8 "End-to-end scenarios (seed the
//! test suite)"), built against the public API: [`SchemaDescriptor`],
//! [`ParquetWriter`], and (where the assertion needs a column's
//! encoding list or page index rather than just file bytes) the
//! lower-level `column_writer`/`row_group` entry points directly.

mod basic_round_trip;
mod low_cardinality_strings;
mod map_round_trip;
mod nested_list;
mod page_index;
mod sparse_booleans;
