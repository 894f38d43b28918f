//! Generic tree codec.
//!
//! Converts between payload messages and `serde_json` trees shaped like the protobuf JSON mapping: field names follow
//! the schema (`datatype`, `int_value`, `propertysets_value`, ...), 64-bit integers may be numbers or decimal strings,
//! bytes are base64 strings (or arrays of octets on input), and non-finite floats are the strings `"NaN"`,
//! `"Infinity"`, and `"-Infinity"`. `null` fields are treated as absent, and unknown fields are ignored.
//!
//! The tree codec is mostly structural. Whether a slot matches its type code is decided later, when the message is
//! resolved. Negative integers are only read where the type code is signed, floats must fit the slot they are in, and
//! data set cells may hold nothing but primitive slots.
//!
//! Written trees are canonical: metrics always carry `datatype` (never the `type` alias), and data sets always carry
//! `num_of_columns`.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{Map, Number, Value as Json};
use sparkplug_protos::{self as proto, data_set, metric, property_value, template};

use crate::{
    catalog::DataType,
    error::{CodecError, MalformedTree, RecursionLimitExceeded},
    resolver::Slot,
};

const METRIC_SLOTS: &[&str] = &[
    "int_value",
    "long_value",
    "float_value",
    "double_value",
    "boolean_value",
    "string_value",
    "bytes_value",
    "dataset_value",
    "template_value",
];

const PROPERTY_SLOTS: &[&str] = &[
    "int_value",
    "long_value",
    "float_value",
    "double_value",
    "boolean_value",
    "string_value",
    "propertyset_value",
    "propertysets_value",
];

// Data set cells and template parameters share the same primitive slots.
const PRIMITIVE_SLOTS: &[&str] = &[
    "int_value",
    "long_value",
    "float_value",
    "double_value",
    "boolean_value",
    "string_value",
];

// Cells written with an extension value read back as empty.
const CELL_FIELDS: &[&str] = &[
    "int_value",
    "long_value",
    "float_value",
    "double_value",
    "boolean_value",
    "string_value",
    "extension_value",
];

fn malformed<T, S: Into<String>>(reason: S) -> Result<T, CodecError> {
    MalformedTree { reason: reason.into() }.fail()
}

fn kind_of(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

/// The fields of a JSON object.
struct Fields<'a>(&'a Map<String, Json>);

impl<'a> Fields<'a> {
    fn of(value: &'a Json) -> Result<Self, CodecError> {
        match value {
            Json::Object(map) => Ok(Self(map)),
            other => malformed(format!("expected an object, found {}", kind_of(other))),
        }
    }

    fn get(&self, field: &str) -> Option<&'a Json> {
        self.0.get(field).filter(|value| !value.is_null())
    }

    fn parse<T, F>(&self, field: &'static str, parse: F) -> Result<Option<T>, CodecError>
    where
        F: FnOnce(&'a Json) -> Result<T, CodecError>,
    {
        self.get(field)
            .map(|value| parse(value).map_err(|e| e.at(field)))
            .transpose()
    }

    fn list<T, F>(&self, field: &'static str, mut parse: F) -> Result<Vec<T>, CodecError>
    where
        F: FnMut(&'a Json) -> Result<T, CodecError>,
    {
        self.list_enumerated(field, |_, item| parse(item))
    }

    fn list_enumerated<T, F>(&self, field: &'static str, mut parse: F) -> Result<Vec<T>, CodecError>
    where
        F: FnMut(usize, &'a Json) -> Result<T, CodecError>,
    {
        match self.get(field) {
            None => Ok(Vec::new()),
            Some(Json::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| parse(i, item).map_err(|e| e.at_index(field, i)))
                .collect(),
            Some(other) => malformed(format!("expected an array, found {}", kind_of(other))).map_err(|e| e.at(field)),
        }
    }

    /// Returns the single populated member of a union, if any.
    fn slot(&self, members: &[&'static str]) -> Result<Option<(&'static str, &'a Json)>, CodecError> {
        let mut found: Option<(&'static str, &'a Json)> = None;
        for member in members {
            if let Some(value) = self.get(member) {
                if let Some((first, _)) = found {
                    return malformed(format!("both '{}' and '{}' are set", first, member));
                }
                found = Some((*member, value));
            }
        }
        Ok(found)
    }

    /// Returns the first populated field that is not one of `known`, if any.
    fn unknown(&self, known: &[&str]) -> Option<&'a str> {
        self.0
            .iter()
            .find(|(field, value)| !value.is_null() && !known.contains(&field.as_str()))
            .map(|(field, _)| field.as_str())
    }
}

fn to_i128(value: &Json) -> Result<i128, CodecError> {
    let parsed = match value {
        Json::Number(n) => n.as_i64().map(i128::from).or_else(|| n.as_u64().map(i128::from)),
        Json::String(s) => s.parse::<i128>().ok(),
        _ => None,
    };
    match parsed {
        Some(n) => Ok(n),
        None => malformed(format!("expected an integer, found {}", value)),
    }
}

fn to_u64(value: &Json) -> Result<u64, CodecError> {
    let n = to_i128(value)?;
    match u64::try_from(n) {
        Ok(n) => Ok(n),
        Err(_) => malformed(format!("{} is not an unsigned 64-bit integer", n)),
    }
}

fn to_u32(value: &Json) -> Result<u32, CodecError> {
    let n = to_i128(value)?;
    match u32::try_from(n) {
        Ok(n) => Ok(n),
        Err(_) => malformed(format!("{} is not an unsigned 32-bit integer", n)),
    }
}

fn is_signed(datatype: Option<u32>) -> bool {
    matches!(
        datatype.and_then(DataType::from_code),
        Some(DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64)
    )
}

fn unsigned_only<T>(n: i128) -> Result<T, CodecError> {
    malformed(format!("{} is negative, but the declared type is not a signed integer", n))
}

/// Reads a 32-bit slot. Negative values are taken as two's complement, and only for signed types.
fn to_int_slot(value: &Json, signed: bool) -> Result<u32, CodecError> {
    let n = to_i128(value)?;
    if n < 0 && !signed {
        return unsigned_only(n);
    }
    if n < i128::from(i32::MIN) || n > i128::from(u32::MAX) {
        return malformed(format!("{} does not fit in 32 bits", n));
    }
    Ok(n as u32)
}

/// Reads a 64-bit slot. Negative values are taken as two's complement, and only for signed types.
fn to_long_slot(value: &Json, signed: bool) -> Result<u64, CodecError> {
    let n = to_i128(value)?;
    if n < 0 && !signed {
        return unsigned_only(n);
    }
    if n < i128::from(i64::MIN) || n > i128::from(u64::MAX) {
        return malformed(format!("{} does not fit in 64 bits", n));
    }
    Ok(n as u64)
}

fn to_f64(value: &Json) -> Result<f64, CodecError> {
    match value {
        Json::Number(n) => match n.as_f64() {
            Some(f) => Ok(f),
            None => malformed(format!("{} is not a float", n)),
        },
        Json::String(s) => match s.as_str() {
            "NaN" => Ok(f64::NAN),
            "Infinity" => Ok(f64::INFINITY),
            "-Infinity" => Ok(f64::NEG_INFINITY),
            _ => malformed(format!("'{}' is not a float", s)),
        },
        other => malformed(format!("expected a float, found {}", kind_of(other))),
    }
}

fn to_f32(value: &Json) -> Result<f32, CodecError> {
    let wide = to_f64(value)?;
    let narrowed = wide as f32;
    if wide.is_finite() && narrowed.is_infinite() {
        return malformed(format!("{} does not fit in a 32-bit float", wide));
    }
    Ok(narrowed)
}

fn to_bool(value: &Json) -> Result<bool, CodecError> {
    match value {
        Json::Bool(b) => Ok(*b),
        other => malformed(format!("expected a boolean, found {}", kind_of(other))),
    }
}

fn to_string(value: &Json) -> Result<String, CodecError> {
    match value {
        Json::String(s) => Ok(s.clone()),
        other => malformed(format!("expected a string, found {}", kind_of(other))),
    }
}

fn to_bytes(value: &Json) -> Result<Vec<u8>, CodecError> {
    match value {
        Json::String(s) => match STANDARD.decode(s) {
            Ok(bytes) => Ok(bytes),
            Err(e) => malformed(format!("invalid base64: {}", e)),
        },
        Json::Array(octets) => octets
            .iter()
            .enumerate()
            .map(|(i, octet)| match octet.as_u64().and_then(|n| u8::try_from(n).ok()) {
                Some(b) => Ok(b),
                None => malformed::<u8, _>(format!("{} is not an octet", octet)).map_err(|e| e.at(i)),
            })
            .collect(),
        other => malformed(format!("expected bytes, found {}", kind_of(other))),
    }
}

fn fitted<T>(value: Option<T>, member: &str) -> Result<T, CodecError> {
    match value {
        Some(value) => Ok(value),
        None => malformed(format!("'{}' cannot be used here", member)),
    }
}

/// Reads payload messages from generic trees.
#[derive(Clone, Copy, Debug)]
pub(crate) struct TreeReader {
    max_depth: usize,
}

impl TreeReader {
    pub(crate) fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    fn descend(&self, depth: usize) -> Result<usize, CodecError> {
        if depth >= self.max_depth {
            return RecursionLimitExceeded { limit: self.max_depth }.fail();
        }
        Ok(depth + 1)
    }

    pub(crate) fn payload(&self, value: &Json) -> Result<proto::Payload, CodecError> {
        let fields = Fields::of(value)?;
        Ok(proto::Payload {
            timestamp: fields.parse("timestamp", to_u64)?,
            metrics: fields.list("metrics", |metric| self.metric(metric, 0))?,
            seq: fields.parse("seq", to_u64)?,
            uuid: fields.parse("uuid", to_string)?,
            body: fields.parse("body", to_bytes)?,
        })
    }

    fn metric(&self, value: &Json, depth: usize) -> Result<proto::Metric, CodecError> {
        let fields = Fields::of(value)?;
        let datatype = match fields.parse("datatype", to_u32)? {
            Some(code) => Some(code),
            None => fields.parse("type", to_u32)?,
        };
        let value = match fields.slot(METRIC_SLOTS)? {
            Some((member, value)) => Some(
                self.slot(member, value, is_signed(datatype), depth)
                    .and_then(|slot| fitted(slot.into_metric_value(), member))
                    .map_err(|e| e.at(member))?,
            ),
            None => None,
        };

        Ok(proto::Metric {
            name: fields.parse("name", to_string)?,
            alias: fields.parse("alias", to_u64)?,
            timestamp: fields.parse("timestamp", to_u64)?,
            datatype,
            is_historical: fields.parse("is_historical", to_bool)?,
            is_transient: fields.parse("is_transient", to_bool)?,
            is_null: fields.parse("is_null", to_bool)?,
            metadata: fields.parse("metadata", metadata)?,
            properties: fields.parse("properties", |set| self.property_set(set, depth))?,
            value,
        })
    }

    fn slot(&self, member: &'static str, value: &Json, signed: bool, depth: usize) -> Result<Slot, CodecError> {
        let slot = match member {
            "int_value" => Slot::Int(to_int_slot(value, signed)?),
            "long_value" => Slot::Long(to_long_slot(value, signed)?),
            "float_value" => Slot::Float(to_f32(value)?),
            "double_value" => Slot::Double(to_f64(value)?),
            "boolean_value" => Slot::Boolean(to_bool(value)?),
            "string_value" => Slot::String(to_string(value)?),
            "bytes_value" => Slot::Bytes(to_bytes(value)?),
            "dataset_value" => Slot::DataSet(dataset(value)?),
            "template_value" => Slot::Template(self.template(value, self.descend(depth)?)?),
            "propertyset_value" => Slot::PropertySet(self.property_set(value, self.descend(depth)?)?),
            "propertysets_value" => Slot::PropertySetList(self.property_list(value, self.descend(depth)?)?),
            other => return malformed(format!("'{}' is not a value slot", other)),
        };
        Ok(slot)
    }

    fn property_set(&self, value: &Json, depth: usize) -> Result<proto::PropertySet, CodecError> {
        let fields = Fields::of(value)?;
        Ok(proto::PropertySet {
            keys: fields.list("keys", to_string)?,
            values: fields.list("values", |value| self.property_value(value, depth))?,
        })
    }

    fn property_list(&self, value: &Json, depth: usize) -> Result<proto::PropertySetList, CodecError> {
        // Both `{"propertyset": [...]}` and a bare array of property sets are accepted.
        let propertyset = match value {
            Json::Array(sets) => sets
                .iter()
                .enumerate()
                .map(|(i, set)| self.property_set(set, depth).map_err(|e| e.at(i)))
                .collect::<Result<Vec<_>, _>>()?,
            value => Fields::of(value)?.list("propertyset", |set| self.property_set(set, depth))?,
        };
        Ok(proto::PropertySetList { propertyset })
    }

    fn property_value(&self, value: &Json, depth: usize) -> Result<proto::PropertyValue, CodecError> {
        let fields = Fields::of(value)?;
        let r#type = fields.parse("type", to_u32)?;
        let value = match fields.slot(PROPERTY_SLOTS)? {
            Some((member, value)) => Some(
                self.slot(member, value, is_signed(r#type), depth)
                    .and_then(|slot| fitted(slot.into_property_value(), member))
                    .map_err(|e| e.at(member))?,
            ),
            None => None,
        };

        Ok(proto::PropertyValue {
            r#type,
            is_null: fields.parse("is_null", to_bool)?,
            value,
        })
    }

    fn template(&self, value: &Json, depth: usize) -> Result<proto::Template, CodecError> {
        let fields = Fields::of(value)?;
        Ok(proto::Template {
            version: fields.parse("version", to_string)?,
            metrics: fields.list("metrics", |metric| self.metric(metric, depth))?,
            parameters: fields.list("parameters", |parameter| self.parameter(parameter, depth))?,
            template_ref: fields.parse("template_ref", to_string)?,
            is_definition: fields.parse("is_definition", to_bool)?,
        })
    }

    fn parameter(&self, value: &Json, depth: usize) -> Result<template::Parameter, CodecError> {
        let fields = Fields::of(value)?;
        let r#type = fields.parse("type", to_u32)?;
        let value = match fields.slot(PRIMITIVE_SLOTS)? {
            Some((member, value)) => Some(
                self.slot(member, value, is_signed(r#type), depth)
                    .and_then(|slot| fitted(slot.into_parameter_value(), member))
                    .map_err(|e| e.at(member))?,
            ),
            None => None,
        };

        Ok(template::Parameter {
            name: fields.parse("name", to_string)?,
            r#type,
            value,
        })
    }
}

fn dataset(value: &Json) -> Result<proto::DataSet, CodecError> {
    let fields = Fields::of(value)?;
    let types = fields.list("types", to_u32)?;
    let rows = fields.list("rows", |row| {
        let elements = Fields::of(row)?.list_enumerated("elements", |column, element| {
            cell(element, is_signed(types.get(column).copied()))
        })?;
        Ok(data_set::Row { elements })
    })?;

    Ok(proto::DataSet {
        num_of_columns: fields.parse("num_of_columns", to_u64)?,
        columns: fields.list("columns", to_string)?,
        types,
        rows,
    })
}

fn cell(value: &Json, signed: bool) -> Result<data_set::DataSetValue, CodecError> {
    let fields = Fields::of(value)?;
    match fields.unknown(CELL_FIELDS) {
        Some("bytes_value") => return malformed("data set cells cannot hold 'bytes_value'"),
        Some(other) => return malformed(format!("'{}' is not a data set cell slot", other)),
        None => {}
    }

    let value = match fields.slot(PRIMITIVE_SLOTS)? {
        Some((member, value)) => {
            let slot = match member {
                "int_value" => to_int_slot(value, signed).map(Slot::Int),
                "long_value" => to_long_slot(value, signed).map(Slot::Long),
                "float_value" => to_f32(value).map(Slot::Float),
                "double_value" => to_f64(value).map(Slot::Double),
                "boolean_value" => to_bool(value).map(Slot::Boolean),
                _ => to_string(value).map(Slot::String),
            };
            Some(
                slot.and_then(|slot| fitted(slot.into_dataset_value(), member))
                    .map_err(|e| e.at(member))?,
            )
        }
        None => None,
    };
    Ok(data_set::DataSetValue { value })
}

fn metadata(value: &Json) -> Result<proto::MetaData, CodecError> {
    let fields = Fields::of(value)?;
    Ok(proto::MetaData {
        is_multi_part: fields.parse("is_multi_part", to_bool)?,
        content_type: fields.parse("content_type", to_string)?,
        size: fields.parse("size", to_u64)?,
        seq: fields.parse("seq", to_u64)?,
        file_name: fields.parse("file_name", to_string)?,
        file_type: fields.parse("file_type", to_string)?,
        md5: fields.parse("md5", to_string)?,
        description: fields.parse("description", to_string)?,
    })
}

/// Builds generic trees from payload messages.
#[derive(Default)]
struct Object(Map<String, Json>);

impl Object {
    fn put<V: Into<Json>>(mut self, field: &str, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.0.insert(field.to_string(), value.into());
        }
        self
    }

    fn put_slot(self, slot: Option<(&str, Json)>) -> Self {
        match slot {
            Some((member, value)) => self.put(member, Some(value)),
            None => self,
        }
    }

    fn build(self) -> Json {
        Json::Object(self.0)
    }
}

fn int_to_tree(value: u32, signed: bool) -> Json {
    if signed {
        Json::from(value as i32)
    } else {
        Json::from(value)
    }
}

fn long_to_tree(value: u64, signed: bool) -> Json {
    if signed {
        Json::from(value as i64)
    } else {
        Json::from(value)
    }
}

fn double_to_tree(value: f64) -> Json {
    match Number::from_f64(value) {
        Some(n) => Json::Number(n),
        None if value.is_nan() => Json::from("NaN"),
        None if value > 0.0 => Json::from("Infinity"),
        None => Json::from("-Infinity"),
    }
}

fn float_to_tree(value: f32) -> Json {
    // Go through the shortest decimal form, so that 23.7f32 is written as 23.7 rather than 23.700000762939453.
    let widened = value.to_string().parse::<f64>().unwrap_or(f64::from(value));
    double_to_tree(widened)
}

fn bytes_to_tree(value: &[u8]) -> Json {
    Json::from(STANDARD.encode(value))
}

pub(crate) fn payload_to_tree(payload: &proto::Payload) -> Json {
    Object::default()
        .put("timestamp", payload.timestamp)
        .put("metrics", Some(payload.metrics.iter().map(metric_to_tree).collect::<Vec<_>>()))
        .put("seq", payload.seq)
        .put("uuid", payload.uuid.clone())
        .put("body", payload.body.as_deref().map(bytes_to_tree))
        .build()
}

fn metric_to_tree(metric: &proto::Metric) -> Json {
    let signed = is_signed(metric.datatype);
    let slot = metric.value.as_ref().map(|value| match value {
        metric::Value::IntValue(v) => ("int_value", int_to_tree(*v, signed)),
        metric::Value::LongValue(v) => ("long_value", long_to_tree(*v, signed)),
        metric::Value::FloatValue(v) => ("float_value", float_to_tree(*v)),
        metric::Value::DoubleValue(v) => ("double_value", double_to_tree(*v)),
        metric::Value::BooleanValue(v) => ("boolean_value", Json::from(*v)),
        metric::Value::StringValue(v) => ("string_value", Json::from(v.as_str())),
        metric::Value::BytesValue(v) => ("bytes_value", bytes_to_tree(v)),
        metric::Value::DatasetValue(v) => ("dataset_value", dataset_to_tree(v)),
        metric::Value::TemplateValue(v) => ("template_value", template_to_tree(v)),
        metric::Value::ExtensionValue(_) => ("extension_value", Json::Object(Map::new())),
    });

    Object::default()
        .put("name", metric.name.clone())
        .put("alias", metric.alias)
        .put("timestamp", metric.timestamp)
        .put("datatype", metric.datatype)
        .put("is_historical", metric.is_historical)
        .put("is_transient", metric.is_transient)
        .put("is_null", metric.is_null)
        .put("metadata", metric.metadata.as_ref().map(metadata_to_tree))
        .put("properties", metric.properties.as_ref().map(property_set_to_tree))
        .put_slot(slot)
        .build()
}

fn property_set_to_tree(set: &proto::PropertySet) -> Json {
    Object::default()
        .put("keys", Some(set.keys.clone()))
        .put("values", Some(set.values.iter().map(property_value_to_tree).collect::<Vec<_>>()))
        .build()
}

fn property_value_to_tree(value: &proto::PropertyValue) -> Json {
    let signed = is_signed(value.r#type);
    let slot = value.value.as_ref().map(|value| match value {
        property_value::Value::IntValue(v) => ("int_value", int_to_tree(*v, signed)),
        property_value::Value::LongValue(v) => ("long_value", long_to_tree(*v, signed)),
        property_value::Value::FloatValue(v) => ("float_value", float_to_tree(*v)),
        property_value::Value::DoubleValue(v) => ("double_value", double_to_tree(*v)),
        property_value::Value::BooleanValue(v) => ("boolean_value", Json::from(*v)),
        property_value::Value::StringValue(v) => ("string_value", Json::from(v.as_str())),
        property_value::Value::PropertysetValue(v) => ("propertyset_value", property_set_to_tree(v)),
        property_value::Value::PropertysetsValue(v) => (
            "propertysets_value",
            Object::default()
                .put(
                    "propertyset",
                    Some(v.propertyset.iter().map(property_set_to_tree).collect::<Vec<_>>()),
                )
                .build(),
        ),
        property_value::Value::ExtensionValue(_) => ("extension_value", Json::Object(Map::new())),
    });

    Object::default()
        .put("type", value.r#type)
        .put("is_null", value.is_null)
        .put_slot(slot)
        .build()
}

fn dataset_to_tree(dataset: &proto::DataSet) -> Json {
    let signed = dataset.types.iter().map(|code| is_signed(Some(*code))).collect::<Vec<_>>();
    let rows = dataset
        .rows
        .iter()
        .map(|row| {
            let elements = row
                .elements
                .iter()
                .enumerate()
                .map(|(i, cell)| {
                    let signed = signed.get(i).copied().unwrap_or(false);
                    let slot = cell.value.as_ref().map(|value| match value {
                        data_set::data_set_value::Value::IntValue(v) => ("int_value", int_to_tree(*v, signed)),
                        data_set::data_set_value::Value::LongValue(v) => ("long_value", long_to_tree(*v, signed)),
                        data_set::data_set_value::Value::FloatValue(v) => ("float_value", float_to_tree(*v)),
                        data_set::data_set_value::Value::DoubleValue(v) => ("double_value", double_to_tree(*v)),
                        data_set::data_set_value::Value::BooleanValue(v) => ("boolean_value", Json::from(*v)),
                        data_set::data_set_value::Value::StringValue(v) => ("string_value", Json::from(v.as_str())),
                        data_set::data_set_value::Value::ExtensionValue(_) => {
                            ("extension_value", Json::Object(Map::new()))
                        }
                    });
                    Object::default().put_slot(slot).build()
                })
                .collect::<Vec<_>>();
            Object::default().put("elements", Some(elements)).build()
        })
        .collect::<Vec<_>>();

    Object::default()
        .put("num_of_columns", dataset.num_of_columns)
        .put("columns", Some(dataset.columns.clone()))
        .put("types", Some(dataset.types.clone()))
        .put("rows", Some(rows))
        .build()
}

fn template_to_tree(template: &proto::Template) -> Json {
    let parameters = template
        .parameters
        .iter()
        .map(|parameter| {
            let signed = is_signed(parameter.r#type);
            let slot = parameter.value.as_ref().map(|value| match value {
                template::parameter::Value::IntValue(v) => ("int_value", int_to_tree(*v, signed)),
                template::parameter::Value::LongValue(v) => ("long_value", long_to_tree(*v, signed)),
                template::parameter::Value::FloatValue(v) => ("float_value", float_to_tree(*v)),
                template::parameter::Value::DoubleValue(v) => ("double_value", double_to_tree(*v)),
                template::parameter::Value::BooleanValue(v) => ("boolean_value", Json::from(*v)),
                template::parameter::Value::StringValue(v) => ("string_value", Json::from(v.as_str())),
                template::parameter::Value::ExtensionValue(_) => ("extension_value", Json::Object(Map::new())),
            });
            Object::default()
                .put("name", parameter.name.clone())
                .put("type", parameter.r#type)
                .put_slot(slot)
                .build()
        })
        .collect::<Vec<_>>();

    Object::default()
        .put("version", template.version.clone())
        .put("metrics", Some(template.metrics.iter().map(metric_to_tree).collect::<Vec<_>>()))
        .put("parameters", Some(parameters))
        .put("template_ref", template.template_ref.clone())
        .put("is_definition", template.is_definition)
        .build()
}

fn metadata_to_tree(metadata: &proto::MetaData) -> Json {
    Object::default()
        .put("is_multi_part", metadata.is_multi_part)
        .put("content_type", metadata.content_type.clone())
        .put("size", metadata.size)
        .put("seq", metadata.seq)
        .put("file_name", metadata.file_name.clone())
        .put("file_type", metadata.file_type.clone())
        .put("md5", metadata.md5.clone())
        .put("description", metadata.description.clone())
        .build()
}
