//! Sparkplug B payload translation.
//!
//! This crate turns Sparkplug B payloads into fully typed values and back. Every value in a payload travels in a
//! tagged union whose populated member is selected by a separate type code; the codecs here resolve each (type code,
//! slot) pair against a single [`catalog`], decode recursive property graphs into ordered maps, decode data sets into
//! rows of native values (and, on request, into typed [`Table`]s), and check every structural invariant before any
//! value is resolved.
//!
//! The entry point is [`PayloadCodec`], which moves a [`Payload`] between its resolved form, a generic
//! `serde_json` tree, the protobuf message tree of [`sparkplug_protos`], and the binary wire form.
#![deny(warnings)]
#![deny(missing_docs)]

pub mod alias;

pub mod catalog;
pub use self::catalog::DataType;

mod config;
pub use self::config::CodecConfiguration;

mod dataset;
pub use self::dataset::{DataSet, DataSetBuilder};

mod error;
pub use self::error::{CodecError, FieldPath, Segment};

mod metric;
pub use self::metric::{MetaData, Metric};

mod payload;
pub use self::payload::{ExtractedTable, Payload, PayloadCodec};

mod properties;
pub use self::properties::{Property, PropertyMap};

pub mod resolver;
pub use self::resolver::Resolver;

mod table;
pub use self::table::{Column, ColumnData, ColumnarType, Table};

mod template;
pub use self::template::{Parameter, Template};

mod tree;

mod validate;
pub use self::validate::Validator;

mod value;
pub use self::value::Value;
