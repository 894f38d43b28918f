//! Value resolution.
//!
//! Sparkplug values live in a tagged union whose populated member is chosen by a separate type code. The resolver
//! turns a (type code, union slot) pair into a native [`Value`], and a native value plus its declared type back into
//! the single slot that type calls for. Composite kinds are handed to the data set, template, and property codecs,
//! which call back into the resolver for their leaves.

use snafu::ensure;
use sparkplug_protos::{self as proto, data_set::data_set_value, metric, property_value, template::parameter};
use tracing::warn;

use crate::{
    catalog::{self, CatalogEntry, DataType, NativeKind, ResolutionKind, SlotKind},
    config::CodecConfiguration,
    error::{CodecError, RecursionLimitExceeded, TypeMismatch, ValueOutOfRange},
    value::Value,
};

/// A borrowed view of a populated union slot.
///
/// Each message that carries a value (`Metric`, `PropertyValue`, `DataSetValue`, and template `Parameter`) has its
/// own union type, holding a different subset of slots. `SlotRef` is the union of all of them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SlotRef<'a> {
    /// `int_value`.
    Int(u32),
    /// `long_value`.
    Long(u64),
    /// `float_value`.
    Float(f32),
    /// `double_value`.
    Double(f64),
    /// `boolean_value`.
    Boolean(bool),
    /// `string_value`.
    String(&'a str),
    /// `bytes_value`.
    Bytes(&'a [u8]),
    /// `dataset_value`.
    DataSet(&'a proto::DataSet),
    /// `template_value`.
    Template(&'a proto::Template),
    /// `propertyset_value`.
    PropertySet(&'a proto::PropertySet),
    /// `propertysets_value`.
    PropertySetList(&'a proto::PropertySetList),
    /// `extension_value`, which carries nothing resolvable.
    Extension,
}

impl SlotRef<'_> {
    /// Returns the slot kind, or `None` for an extension value.
    pub fn kind(&self) -> Option<SlotKind> {
        Some(match self {
            Self::Int(_) => SlotKind::Int,
            Self::Long(_) => SlotKind::Long,
            Self::Float(_) => SlotKind::Float,
            Self::Double(_) => SlotKind::Double,
            Self::Boolean(_) => SlotKind::Boolean,
            Self::String(_) => SlotKind::String,
            Self::Bytes(_) => SlotKind::Bytes,
            Self::DataSet(_) => SlotKind::DataSet,
            Self::Template(_) => SlotKind::Template,
            Self::PropertySet(_) => SlotKind::PropertySet,
            Self::PropertySetList(_) => SlotKind::PropertySetList,
            Self::Extension => return None,
        })
    }

    fn field_name(&self) -> &'static str {
        self.kind().map_or("extension_value", SlotKind::field_name)
    }
}

impl<'a> From<&'a metric::Value> for SlotRef<'a> {
    fn from(value: &'a metric::Value) -> Self {
        match value {
            metric::Value::IntValue(v) => Self::Int(*v),
            metric::Value::LongValue(v) => Self::Long(*v),
            metric::Value::FloatValue(v) => Self::Float(*v),
            metric::Value::DoubleValue(v) => Self::Double(*v),
            metric::Value::BooleanValue(v) => Self::Boolean(*v),
            metric::Value::StringValue(v) => Self::String(v),
            metric::Value::BytesValue(v) => Self::Bytes(v),
            metric::Value::DatasetValue(v) => Self::DataSet(v),
            metric::Value::TemplateValue(v) => Self::Template(v),
            metric::Value::ExtensionValue(_) => Self::Extension,
        }
    }
}

impl<'a> From<&'a property_value::Value> for SlotRef<'a> {
    fn from(value: &'a property_value::Value) -> Self {
        match value {
            property_value::Value::IntValue(v) => Self::Int(*v),
            property_value::Value::LongValue(v) => Self::Long(*v),
            property_value::Value::FloatValue(v) => Self::Float(*v),
            property_value::Value::DoubleValue(v) => Self::Double(*v),
            property_value::Value::BooleanValue(v) => Self::Boolean(*v),
            property_value::Value::StringValue(v) => Self::String(v),
            property_value::Value::PropertysetValue(v) => Self::PropertySet(v),
            property_value::Value::PropertysetsValue(v) => Self::PropertySetList(v),
            property_value::Value::ExtensionValue(_) => Self::Extension,
        }
    }
}

impl<'a> From<&'a data_set_value::Value> for SlotRef<'a> {
    fn from(value: &'a data_set_value::Value) -> Self {
        match value {
            data_set_value::Value::IntValue(v) => Self::Int(*v),
            data_set_value::Value::LongValue(v) => Self::Long(*v),
            data_set_value::Value::FloatValue(v) => Self::Float(*v),
            data_set_value::Value::DoubleValue(v) => Self::Double(*v),
            data_set_value::Value::BooleanValue(v) => Self::Boolean(*v),
            data_set_value::Value::StringValue(v) => Self::String(v),
            data_set_value::Value::ExtensionValue(_) => Self::Extension,
        }
    }
}

impl<'a> From<&'a parameter::Value> for SlotRef<'a> {
    fn from(value: &'a parameter::Value) -> Self {
        match value {
            parameter::Value::IntValue(v) => Self::Int(*v),
            parameter::Value::LongValue(v) => Self::Long(*v),
            parameter::Value::FloatValue(v) => Self::Float(*v),
            parameter::Value::DoubleValue(v) => Self::Double(*v),
            parameter::Value::BooleanValue(v) => Self::Boolean(*v),
            parameter::Value::StringValue(v) => Self::String(v),
            parameter::Value::ExtensionValue(_) => Self::Extension,
        }
    }
}

/// A populated union slot, ready to be placed into a message.
#[derive(Clone, Debug, PartialEq)]
pub enum Slot {
    /// `int_value`.
    Int(u32),
    /// `long_value`.
    Long(u64),
    /// `float_value`.
    Float(f32),
    /// `double_value`.
    Double(f64),
    /// `boolean_value`.
    Boolean(bool),
    /// `string_value`.
    String(String),
    /// `bytes_value`.
    Bytes(Vec<u8>),
    /// `dataset_value`.
    DataSet(proto::DataSet),
    /// `template_value`.
    Template(proto::Template),
    /// `propertyset_value`.
    PropertySet(proto::PropertySet),
    /// `propertysets_value`.
    PropertySetList(proto::PropertySetList),
}

impl Slot {
    /// Returns the slot kind.
    pub fn kind(&self) -> SlotKind {
        match self {
            Self::Int(_) => SlotKind::Int,
            Self::Long(_) => SlotKind::Long,
            Self::Float(_) => SlotKind::Float,
            Self::Double(_) => SlotKind::Double,
            Self::Boolean(_) => SlotKind::Boolean,
            Self::String(_) => SlotKind::String,
            Self::Bytes(_) => SlotKind::Bytes,
            Self::DataSet(_) => SlotKind::DataSet,
            Self::Template(_) => SlotKind::Template,
            Self::PropertySet(_) => SlotKind::PropertySet,
            Self::PropertySetList(_) => SlotKind::PropertySetList,
        }
    }

    /// Converts the slot into a metric value, if metrics have a slot of this kind.
    pub fn into_metric_value(self) -> Option<metric::Value> {
        Some(match self {
            Self::Int(v) => metric::Value::IntValue(v),
            Self::Long(v) => metric::Value::LongValue(v),
            Self::Float(v) => metric::Value::FloatValue(v),
            Self::Double(v) => metric::Value::DoubleValue(v),
            Self::Boolean(v) => metric::Value::BooleanValue(v),
            Self::String(v) => metric::Value::StringValue(v),
            Self::Bytes(v) => metric::Value::BytesValue(v),
            Self::DataSet(v) => metric::Value::DatasetValue(v),
            Self::Template(v) => metric::Value::TemplateValue(v),
            Self::PropertySet(_) | Self::PropertySetList(_) => return None,
        })
    }

    /// Converts the slot into a property value, if property values have a slot of this kind.
    pub fn into_property_value(self) -> Option<property_value::Value> {
        Some(match self {
            Self::Int(v) => property_value::Value::IntValue(v),
            Self::Long(v) => property_value::Value::LongValue(v),
            Self::Float(v) => property_value::Value::FloatValue(v),
            Self::Double(v) => property_value::Value::DoubleValue(v),
            Self::Boolean(v) => property_value::Value::BooleanValue(v),
            Self::String(v) => property_value::Value::StringValue(v),
            Self::PropertySet(v) => property_value::Value::PropertysetValue(v),
            Self::PropertySetList(v) => property_value::Value::PropertysetsValue(v),
            Self::Bytes(_) | Self::DataSet(_) | Self::Template(_) => return None,
        })
    }

    /// Converts the slot into a data set cell value, if cells have a slot of this kind.
    pub fn into_dataset_value(self) -> Option<data_set_value::Value> {
        Some(match self {
            Self::Int(v) => data_set_value::Value::IntValue(v),
            Self::Long(v) => data_set_value::Value::LongValue(v),
            Self::Float(v) => data_set_value::Value::FloatValue(v),
            Self::Double(v) => data_set_value::Value::DoubleValue(v),
            Self::Boolean(v) => data_set_value::Value::BooleanValue(v),
            Self::String(v) => data_set_value::Value::StringValue(v),
            _ => return None,
        })
    }

    /// Converts the slot into a template parameter value, if parameters have a slot of this kind.
    pub fn into_parameter_value(self) -> Option<parameter::Value> {
        Some(match self {
            Self::Int(v) => parameter::Value::IntValue(v),
            Self::Long(v) => parameter::Value::LongValue(v),
            Self::Float(v) => parameter::Value::FloatValue(v),
            Self::Double(v) => parameter::Value::DoubleValue(v),
            Self::Boolean(v) => parameter::Value::BooleanValue(v),
            Self::String(v) => parameter::Value::StringValue(v),
            _ => return None,
        })
    }
}

/// A message that carries a value union.
///
/// Each carrier holds a different subset of slots: metrics have no property set slots, property values have no
/// bytes, data set, or template slots, and template parameters hold primitives only.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Carrier {
    /// `Metric`.
    Metric,
    /// `PropertyValue`.
    Property,
    /// Template `Parameter`.
    Parameter,
}

impl Carrier {
    /// Returns `true` if this carrier has a slot of the given kind.
    pub const fn holds(self, slot: SlotKind) -> bool {
        match self {
            Self::Metric => !matches!(slot, SlotKind::PropertySet | SlotKind::PropertySetList),
            Self::Property => !matches!(slot, SlotKind::Bytes | SlotKind::DataSet | SlotKind::Template),
            Self::Parameter => matches!(
                slot,
                SlotKind::Int | SlotKind::Long | SlotKind::Float | SlotKind::Double | SlotKind::Boolean | SlotKind::String
            ),
        }
    }

    pub(crate) const fn describe(self) -> &'static str {
        match self {
            Self::Metric => "a value a metric can hold",
            Self::Property => "a value a property can hold",
            Self::Parameter => "a value a parameter can hold",
        }
    }
}

/// Checks that `value` can be encoded as `datatype`.
///
/// Null is accepted for every type. Integers are checked against the bounds of the declared width.
///
/// # Errors
///
/// If the type has no resolution, the value's shape disagrees with the type, or an integer does not fit the declared
/// width, an error is returned.
pub fn check(datatype: DataType, value: &Value) -> Result<(), CodecError> {
    if value.is_null() {
        return Ok(());
    }
    check_entry(catalog::resolve(datatype)?, value)
}

/// Checks that `value` can be encoded as `datatype` and placed into `carrier`.
///
/// Null is accepted for every type the carrier has a slot for, and for types with no resolution at all.
///
/// # Errors
///
/// If the carrier has no slot for `datatype`, or `value` fails [`check`], an error is returned.
pub fn check_carried(carrier: Carrier, datatype: DataType, value: &Value) -> Result<(), CodecError> {
    let entry = match catalog::resolve(datatype) {
        Ok(entry) => entry,
        Err(_) if value.is_null() => return Ok(()),
        Err(e) => return Err(e),
    };
    ensure!(
        carrier.holds(entry.slot),
        TypeMismatch {
            datatype,
            expected: carrier.describe(),
            found: entry.slot.field_name(),
        }
    );
    check_entry(entry, value)
}

pub(crate) fn check_entry(entry: &CatalogEntry, value: &Value) -> Result<(), CodecError> {
    let compatible = match (entry.native, value) {
        (_, Value::Null) => true,
        (NativeKind::Signed | NativeKind::Unsigned, Value::Int(_) | Value::UInt(_)) => true,
        (NativeKind::Float | NativeKind::Double, Value::Float(_) | Value::Double(_)) => true,
        (NativeKind::Boolean, Value::Boolean(_)) => true,
        (NativeKind::String, Value::String(_)) => true,
        (NativeKind::Bytes, Value::Bytes(_)) => true,
        (NativeKind::DataSet, Value::DataSet(_)) => true,
        (NativeKind::Template, Value::Template(_)) => true,
        (NativeKind::PropertySet, Value::PropertySet(_)) => true,
        (NativeKind::PropertySetList, Value::PropertySet(_) | Value::PropertySetList(_)) => true,
        _ => false,
    };
    ensure!(
        compatible,
        TypeMismatch {
            datatype: entry.datatype,
            expected: entry.native.describe(),
            found: value.kind_name(),
        }
    );

    if let (Some((min, max)), Some(n)) = (entry.bounds, value.as_integer()) {
        ensure!(
            (min..=max).contains(&n),
            ValueOutOfRange {
                datatype: entry.datatype,
                value: n,
            }
        );
    }
    Ok(())
}

/// Resolves values between union slots and native values.
///
/// A resolver tracks how deeply nested the value it is working on is, and refuses to go past the configured maximum
/// depth.
#[derive(Clone, Copy, Debug)]
pub struct Resolver<'c> {
    config: &'c CodecConfiguration,
    depth: usize,
}

impl<'c> Resolver<'c> {
    /// Creates a new `Resolver` at the top level of a payload.
    pub fn new(config: &'c CodecConfiguration) -> Self {
        Self { config, depth: 0 }
    }

    /// Returns the configuration in use.
    pub fn config(&self) -> &'c CodecConfiguration {
        self.config
    }

    /// Returns a resolver for the next nesting level.
    pub(crate) fn descend(&self) -> Result<Self, CodecError> {
        let limit = self.config.max_depth();
        ensure!(self.depth < limit, RecursionLimitExceeded { limit });
        Ok(Self {
            config: self.config,
            depth: self.depth + 1,
        })
    }

    /// Decodes the value held in `slot` as `datatype`.
    ///
    /// If `is_null` is set, the value is null regardless of the type or slot.
    ///
    /// # Errors
    ///
    /// If the type has no resolution, the slot is missing or does not belong to the type, or a nested value fails to
    /// decode, an error is returned.
    pub fn decode(&self, datatype: DataType, is_null: bool, slot: Option<SlotRef<'_>>) -> Result<Value, CodecError> {
        if is_null {
            return Ok(Value::Null);
        }
        let entry = catalog::resolve(datatype)?;
        self.decode_entry(entry, slot)
    }

    /// Decodes the value held in `slot` with an already resolved catalog entry.
    ///
    /// A missing slot is a type mismatch; callers that treat an empty slot as null check for that first.
    pub(crate) fn decode_entry(&self, entry: &CatalogEntry, slot: Option<SlotRef<'_>>) -> Result<Value, CodecError> {
        let Some(slot) = slot else {
            return TypeMismatch {
                datatype: entry.datatype,
                expected: entry.slot.field_name(),
                found: "nothing",
            }
            .fail();
        };

        match (entry.kind, slot) {
            (ResolutionKind::Primitive | ResolutionKind::Bytes, slot) => self.decode_primitive(entry, slot),
            (ResolutionKind::DataSet, SlotRef::DataSet(dataset)) => self
                .decode_dataset(dataset)
                .map(Value::DataSet)
                .map_err(|e| e.at(SlotKind::DataSet.field_name())),
            (ResolutionKind::Template, SlotRef::Template(template)) => self
                .descend()
                .and_then(|r| r.decode_template(template))
                .map(Value::Template)
                .map_err(|e| e.at(SlotKind::Template.field_name())),
            (ResolutionKind::PropertySet, SlotRef::PropertySet(set)) => self
                .descend()
                .and_then(|r| r.decode_property_set(set))
                .map(Value::PropertySet),
            (ResolutionKind::PropertySetList, SlotRef::PropertySetList(list)) => {
                self.descend().and_then(|r| r.decode_property_list(list))
            }
            (_, slot) => mismatched_slot(entry, slot),
        }
    }

    fn decode_primitive(&self, entry: &CatalogEntry, slot: SlotRef<'_>) -> Result<Value, CodecError> {
        let slot_kind = slot.kind();
        if slot_kind != Some(entry.slot) {
            if self.config.strict_slots() || slot_kind.is_none() || entry.slot.sibling() != slot_kind {
                return mismatched_slot(entry, slot);
            }
            warn!(
                datatype = %entry.datatype,
                expected = entry.slot.field_name(),
                found = slot.field_name(),
                "Value found in the sibling slot of its type."
            );
        }

        let value = match (entry.native, slot) {
            // Signed types narrower than 64 bits travel as 32-bit two's complement.
            (NativeKind::Signed, SlotRef::Int(v)) => Value::Int(i64::from(v as i32)),
            (NativeKind::Signed, SlotRef::Long(v)) => Value::Int(v as i64),
            (NativeKind::Unsigned, SlotRef::Int(v)) => Value::UInt(u64::from(v)),
            (NativeKind::Unsigned, SlotRef::Long(v)) => Value::UInt(v),
            (NativeKind::Float, SlotRef::Float(v)) => Value::Float(v),
            (NativeKind::Float, SlotRef::Double(v)) => Value::Float(v as f32),
            (NativeKind::Double, SlotRef::Double(v)) => Value::Double(v),
            (NativeKind::Double, SlotRef::Float(v)) => Value::Double(f64::from(v)),
            (NativeKind::Boolean, SlotRef::Boolean(v)) => Value::Boolean(v),
            (NativeKind::String, SlotRef::String(v)) => Value::String(v.to_string()),
            (NativeKind::Bytes, SlotRef::Bytes(v)) => Value::Bytes(v.to_vec()),
            (_, slot) => return mismatched_slot(entry, slot),
        };
        Ok(value)
    }

    /// Encodes `value` into the slot that `datatype` calls for.
    ///
    /// Returns `None` for a null value, which is represented by the null indicator rather than by a slot.
    ///
    /// # Errors
    ///
    /// If the type has no resolution, the value's shape disagrees with the type, an integer does not fit the declared
    /// width, or a nested value fails to encode, an error is returned.
    pub fn encode(&self, value: &Value, datatype: DataType) -> Result<Option<Slot>, CodecError> {
        if value.is_null() {
            return Ok(None);
        }
        self.encode_entry(catalog::resolve(datatype)?, value)
    }

    pub(crate) fn encode_entry(&self, entry: &CatalogEntry, value: &Value) -> Result<Option<Slot>, CodecError> {
        check_entry(entry, value)?;

        let slot = match (entry.slot, value) {
            (_, Value::Null) => return Ok(None),
            // Both casts keep the low bits, which is the two's complement form of a negative value.
            (SlotKind::Int, Value::Int(_) | Value::UInt(_)) => Slot::Int(integer_of(entry, value)? as u32),
            (SlotKind::Long, Value::Int(_) | Value::UInt(_)) => Slot::Long(integer_of(entry, value)? as u64),
            (SlotKind::Float, Value::Float(v)) => Slot::Float(*v),
            (SlotKind::Float, Value::Double(v)) => Slot::Float(*v as f32),
            (SlotKind::Double, Value::Double(v)) => Slot::Double(*v),
            (SlotKind::Double, Value::Float(v)) => Slot::Double(f64::from(*v)),
            (SlotKind::Boolean, Value::Boolean(v)) => Slot::Boolean(*v),
            (SlotKind::String, Value::String(v)) => Slot::String(v.clone()),
            (SlotKind::Bytes, Value::Bytes(v)) => Slot::Bytes(v.clone()),
            (SlotKind::DataSet, Value::DataSet(dataset)) => Slot::DataSet(
                self.encode_dataset(dataset)
                    .map_err(|e| e.at(SlotKind::DataSet.field_name()))?,
            ),
            (SlotKind::Template, Value::Template(template)) => Slot::Template(
                self.descend()
                    .and_then(|r| r.encode_template(template))
                    .map_err(|e| e.at(SlotKind::Template.field_name()))?,
            ),
            (SlotKind::PropertySet, Value::PropertySet(map)) => {
                Slot::PropertySet(self.descend()?.encode_property_set(map)?)
            }
            (SlotKind::PropertySetList, Value::PropertySet(map)) => {
                Slot::PropertySetList(self.descend()?.encode_property_list(std::slice::from_ref(map))?)
            }
            (SlotKind::PropertySetList, Value::PropertySetList(maps)) => {
                Slot::PropertySetList(self.descend()?.encode_property_list(maps)?)
            }
            _ => {
                return TypeMismatch {
                    datatype: entry.datatype,
                    expected: entry.native.describe(),
                    found: value.kind_name(),
                }
                .fail()
            }
        };
        Ok(Some(slot))
    }
}

fn integer_of(entry: &CatalogEntry, value: &Value) -> Result<i128, CodecError> {
    match value.as_integer() {
        Some(n) => Ok(n),
        None => TypeMismatch {
            datatype: entry.datatype,
            expected: entry.native.describe(),
            found: value.kind_name(),
        }
        .fail(),
    }
}

fn mismatched_slot<T>(entry: &CatalogEntry, slot: SlotRef<'_>) -> Result<T, CodecError> {
    TypeMismatch {
        datatype: entry.datatype,
        expected: entry.slot.field_name(),
        found: slot.field_name(),
    }
    .fail()
}
