//! Type catalog.
//!
//! Every Sparkplug type code maps to a single [`CatalogEntry`] describing how values of that type are resolved: which
//! union slot carries them on the wire, which native value they decode to, and which columnar type a data set column
//! of that type projects to. The table is a `static`, so it is built at compile time and shared freely across threads.

use std::fmt;

use crate::{
    error::{CodecError, UnsupportedType},
    table::ColumnarType,
};

/// A Sparkplug B data type code.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[repr(u32)]
pub enum DataType {
    /// Unknown. Only valid structurally, such as on a null value.
    Unknown = 0,
    /// Signed 8-bit integer.
    Int8 = 1,
    /// Signed 16-bit integer.
    Int16 = 2,
    /// Signed 32-bit integer.
    Int32 = 3,
    /// Signed 64-bit integer.
    Int64 = 4,
    /// Unsigned 8-bit integer.
    UInt8 = 5,
    /// Unsigned 16-bit integer.
    UInt16 = 6,
    /// Unsigned 32-bit integer.
    UInt32 = 7,
    /// Unsigned 64-bit integer.
    UInt64 = 8,
    /// Single precision float.
    Float = 9,
    /// Double precision float.
    Double = 10,
    /// Boolean.
    Boolean = 11,
    /// UTF-8 string.
    String = 12,
    /// Milliseconds since the Unix epoch.
    DateTime = 13,
    /// UTF-8 text.
    Text = 14,
    /// UUID, in its textual form.
    Uuid = 15,
    /// Columnar data set.
    DataSet = 16,
    /// Opaque bytes.
    Bytes = 17,
    /// File contents.
    File = 18,
    /// Template definition or instance.
    Template = 19,
    /// Property set.
    PropertySet = 20,
    /// List of property sets.
    PropertySetList = 21,
    /// Signed 128-bit integer.
    Int128 = 22,
    /// Unsigned 128-bit integer.
    UInt128 = 23,
    /// XML document.
    Xml = 24,
}

const DATA_TYPES: [DataType; 25] = [
    DataType::Unknown,
    DataType::Int8,
    DataType::Int16,
    DataType::Int32,
    DataType::Int64,
    DataType::UInt8,
    DataType::UInt16,
    DataType::UInt32,
    DataType::UInt64,
    DataType::Float,
    DataType::Double,
    DataType::Boolean,
    DataType::String,
    DataType::DateTime,
    DataType::Text,
    DataType::Uuid,
    DataType::DataSet,
    DataType::Bytes,
    DataType::File,
    DataType::Template,
    DataType::PropertySet,
    DataType::PropertySetList,
    DataType::Int128,
    DataType::UInt128,
    DataType::Xml,
];

impl DataType {
    /// Returns the numeric type code.
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Returns the data type for the given numeric code, if one exists.
    pub fn from_code(code: u32) -> Option<Self> {
        DATA_TYPES.get(code as usize).copied()
    }

    /// Returns the name of the data type.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Int8 => "Int8",
            Self::Int16 => "Int16",
            Self::Int32 => "Int32",
            Self::Int64 => "Int64",
            Self::UInt8 => "UInt8",
            Self::UInt16 => "UInt16",
            Self::UInt32 => "UInt32",
            Self::UInt64 => "UInt64",
            Self::Float => "Float",
            Self::Double => "Double",
            Self::Boolean => "Boolean",
            Self::String => "String",
            Self::DateTime => "DateTime",
            Self::Text => "Text",
            Self::Uuid => "UUID",
            Self::DataSet => "DataSet",
            Self::Bytes => "Bytes",
            Self::File => "File",
            Self::Template => "Template",
            Self::PropertySet => "PropertySet",
            Self::PropertySetList => "PropertySetList",
            Self::Int128 => "Int128",
            Self::UInt128 => "UInt128",
            Self::Xml => "XML",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<DataType> for u32 {
    fn from(datatype: DataType) -> Self {
        datatype.code()
    }
}

impl TryFrom<u32> for DataType {
    type Error = CodecError;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        match Self::from_code(code) {
            Some(datatype) => Ok(datatype),
            None => UnsupportedType { code }.fail(),
        }
    }
}

/// How a value of a given type is resolved.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResolutionKind {
    /// A scalar read from one of the numeric, boolean, or string slots.
    Primitive,
    /// A byte sequence.
    Bytes,
    /// A columnar data set.
    DataSet,
    /// A template.
    Template,
    /// A single property set.
    PropertySet,
    /// A list of property sets.
    PropertySetList,
}

impl ResolutionKind {
    /// Returns `true` if values of this kind can be held by a data set cell.
    pub const fn is_columnar(self) -> bool {
        matches!(self, Self::Primitive | Self::Bytes)
    }
}

/// The native value a type decodes to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NativeKind {
    /// Signed integer, widened to 64 bits.
    Signed,
    /// Unsigned integer, widened to 64 bits.
    Unsigned,
    /// Single precision float.
    Float,
    /// Double precision float.
    Double,
    /// Boolean.
    Boolean,
    /// String.
    String,
    /// Byte sequence.
    Bytes,
    /// Data set.
    DataSet,
    /// Template.
    Template,
    /// Property map.
    PropertySet,
    /// Property map, or a sequence of them.
    PropertySetList,
}

impl NativeKind {
    /// Returns a short description of the values this kind accepts.
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Signed | Self::Unsigned => "integer",
            Self::Float | Self::Double => "float",
            Self::Boolean => "boolean",
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::DataSet => "data set",
            Self::Template => "template",
            Self::PropertySet => "property set",
            Self::PropertySetList => "property set or property set list",
        }
    }
}

/// A member of the value union.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SlotKind {
    /// `int_value` (unsigned 32-bit).
    Int,
    /// `long_value` (unsigned 64-bit).
    Long,
    /// `float_value`.
    Float,
    /// `double_value`.
    Double,
    /// `boolean_value`.
    Boolean,
    /// `string_value`.
    String,
    /// `bytes_value`.
    Bytes,
    /// `dataset_value`.
    DataSet,
    /// `template_value`.
    Template,
    /// `propertyset_value`.
    PropertySet,
    /// `propertysets_value`.
    PropertySetList,
}

impl SlotKind {
    /// Returns the field name of the slot.
    pub const fn field_name(self) -> &'static str {
        match self {
            Self::Int => "int_value",
            Self::Long => "long_value",
            Self::Float => "float_value",
            Self::Double => "double_value",
            Self::Boolean => "boolean_value",
            Self::String => "string_value",
            Self::Bytes => "bytes_value",
            Self::DataSet => "dataset_value",
            Self::Template => "template_value",
            Self::PropertySet => "propertyset_value",
            Self::PropertySetList => "propertysets_value",
        }
    }

    /// Returns the other slot of the same numeric family, if any.
    pub const fn sibling(self) -> Option<Self> {
        match self {
            Self::Int => Some(Self::Long),
            Self::Long => Some(Self::Int),
            Self::Float => Some(Self::Double),
            Self::Double => Some(Self::Float),
            _ => None,
        }
    }
}

/// Resolution rules for a single data type.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CatalogEntry {
    /// The data type this entry describes.
    pub datatype: DataType,
    /// How values are resolved.
    pub kind: ResolutionKind,
    /// The native value produced by decoding.
    pub native: NativeKind,
    /// The union slot used when encoding.
    pub slot: SlotKind,
    /// Storage type when projected into a table, for columnar kinds.
    pub columnar: Option<ColumnarType>,
    /// Inclusive integer bounds enforced when encoding.
    pub bounds: Option<(i128, i128)>,
}

const fn integer(
    datatype: DataType, native: NativeKind, slot: SlotKind, columnar: ColumnarType, min: i128, max: i128,
) -> Option<CatalogEntry> {
    Some(CatalogEntry {
        datatype,
        kind: ResolutionKind::Primitive,
        native,
        slot,
        columnar: Some(columnar),
        bounds: Some((min, max)),
    })
}

const fn scalar(
    datatype: DataType, kind: ResolutionKind, native: NativeKind, slot: SlotKind, columnar: Option<ColumnarType>,
) -> Option<CatalogEntry> {
    Some(CatalogEntry {
        datatype,
        kind,
        native,
        slot,
        columnar,
        bounds: None,
    })
}

use self::{NativeKind as N, ResolutionKind as R, SlotKind as S};

static CATALOG: [Option<CatalogEntry>; 25] = [
    None,
    integer(DataType::Int8, N::Signed, S::Int, ColumnarType::Int8, i8::MIN as i128, i8::MAX as i128),
    integer(DataType::Int16, N::Signed, S::Int, ColumnarType::Int16, i16::MIN as i128, i16::MAX as i128),
    integer(DataType::Int32, N::Signed, S::Int, ColumnarType::Int32, i32::MIN as i128, i32::MAX as i128),
    integer(DataType::Int64, N::Signed, S::Long, ColumnarType::Int64, i64::MIN as i128, i64::MAX as i128),
    integer(DataType::UInt8, N::Unsigned, S::Int, ColumnarType::UInt8, 0, u8::MAX as i128),
    integer(DataType::UInt16, N::Unsigned, S::Int, ColumnarType::UInt16, 0, u16::MAX as i128),
    integer(DataType::UInt32, N::Unsigned, S::Int, ColumnarType::UInt32, 0, u32::MAX as i128),
    integer(DataType::UInt64, N::Unsigned, S::Long, ColumnarType::UInt64, 0, u64::MAX as i128),
    scalar(DataType::Float, R::Primitive, N::Float, S::Float, Some(ColumnarType::Float32)),
    scalar(DataType::Double, R::Primitive, N::Double, S::Double, Some(ColumnarType::Float64)),
    scalar(DataType::Boolean, R::Primitive, N::Boolean, S::Boolean, Some(ColumnarType::Boolean)),
    scalar(DataType::String, R::Primitive, N::String, S::String, Some(ColumnarType::Utf8)),
    integer(DataType::DateTime, N::Unsigned, S::Long, ColumnarType::Timestamp, 0, u64::MAX as i128),
    scalar(DataType::Text, R::Primitive, N::String, S::String, Some(ColumnarType::Utf8)),
    scalar(DataType::Uuid, R::Primitive, N::String, S::String, Some(ColumnarType::Utf8)),
    scalar(DataType::DataSet, R::DataSet, N::DataSet, S::DataSet, None),
    scalar(DataType::Bytes, R::Bytes, N::Bytes, S::Bytes, Some(ColumnarType::Binary)),
    scalar(DataType::File, R::Bytes, N::Bytes, S::Bytes, Some(ColumnarType::Binary)),
    scalar(DataType::Template, R::Template, N::Template, S::Template, None),
    scalar(DataType::PropertySet, R::PropertySet, N::PropertySet, S::PropertySet, None),
    scalar(DataType::PropertySetList, R::PropertySetList, N::PropertySetList, S::PropertySetList, None),
    // No 128-bit slot exists in the value union.
    None,
    None,
    scalar(DataType::Xml, R::Primitive, N::String, S::String, Some(ColumnarType::Utf8)),
];

/// Resolves the catalog entry for the given data type.
///
/// # Errors
///
/// `Unknown`, `Int128`, and `UInt128` have no value resolution, and fail with [`CodecError::UnsupportedType`].
pub fn resolve(datatype: DataType) -> Result<&'static CatalogEntry, CodecError> {
    match CATALOG.get(datatype.code() as usize) {
        Some(Some(entry)) => Ok(entry),
        _ => UnsupportedType { code: datatype.code() }.fail(),
    }
}

/// Resolves the catalog entry for the given numeric type code.
///
/// # Errors
///
/// If the code is not a known data type, or has no value resolution, [`CodecError::UnsupportedType`] is returned.
pub fn lookup(code: u32) -> Result<&'static CatalogEntry, CodecError> {
    resolve(DataType::try_from(code)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for code in 0..25 {
            let datatype = DataType::from_code(code).unwrap();
            assert_eq!(datatype.code(), code);
            assert_eq!(u32::from(datatype), code);
        }
        assert_eq!(DataType::from_code(25), None);
    }

    #[test]
    fn entries_describe_their_own_type() {
        for code in 0..25 {
            if let Ok(entry) = lookup(code) {
                assert_eq!(entry.datatype.code(), code);
            }
        }
    }

    #[test]
    fn unresolvable_codes() {
        for code in [0, 22, 23, 25, 1000] {
            match lookup(code) {
                Err(CodecError::UnsupportedType { code: reported, .. }) => assert_eq!(reported, code),
                other => panic!("expected unsupported type for {}, got {:?}", code, other),
            }
        }
    }

    #[test]
    fn slots() {
        let slot = |datatype| resolve(datatype).unwrap().slot;

        for datatype in [
            DataType::Int8,
            DataType::Int16,
            DataType::Int32,
            DataType::UInt8,
            DataType::UInt16,
            DataType::UInt32,
        ] {
            assert_eq!(slot(datatype), SlotKind::Int);
        }
        for datatype in [DataType::Int64, DataType::UInt64, DataType::DateTime] {
            assert_eq!(slot(datatype), SlotKind::Long);
        }
        for datatype in [DataType::String, DataType::Text, DataType::Uuid, DataType::Xml] {
            assert_eq!(slot(datatype), SlotKind::String);
        }
        assert_eq!(slot(DataType::Float), SlotKind::Float);
        assert_eq!(slot(DataType::Double), SlotKind::Double);
        assert_eq!(slot(DataType::File), SlotKind::Bytes);
        assert_eq!(slot(DataType::PropertySetList).field_name(), "propertysets_value");
    }

    #[test]
    fn only_primitive_and_bytes_kinds_are_columnar() {
        for code in 1..25 {
            if let Ok(entry) = lookup(code) {
                assert_eq!(entry.kind.is_columnar(), entry.columnar.is_some(), "{}", entry.datatype);
            }
        }
    }

    #[test]
    fn integer_bounds() {
        assert_eq!(resolve(DataType::Int8).unwrap().bounds, Some((-128, 127)));
        assert_eq!(resolve(DataType::UInt32).unwrap().bounds, Some((0, 4_294_967_295)));
        assert_eq!(resolve(DataType::Double).unwrap().bounds, None);
    }
}
