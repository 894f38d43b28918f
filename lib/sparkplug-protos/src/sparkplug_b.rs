// Message definitions for `org.eclipse.tahu.protobuf.Payload` (Sparkplug B, proto2).
//
// Nested messages of `Payload` are hoisted to the crate root; oneofs live in a module named after their message.

/// A Sparkplug B payload.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Payload {
    /// Payload timestamp, in milliseconds since the Unix epoch.
    #[prost(uint64, optional, tag = "1")]
    pub timestamp: Option<u64>,
    #[prost(message, repeated, tag = "2")]
    pub metrics: Vec<Metric>,
    /// Sequence number, 0 through 255.
    #[prost(uint64, optional, tag = "3")]
    pub seq: Option<u64>,
    #[prost(string, optional, tag = "4")]
    pub uuid: Option<String>,
    /// Opaque application body.
    #[prost(bytes = "vec", optional, tag = "5")]
    pub body: Option<Vec<u8>>,
}

/// A template definition or instance.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Template {
    #[prost(string, optional, tag = "1")]
    pub version: Option<String>,
    #[prost(message, repeated, tag = "2")]
    pub metrics: Vec<Metric>,
    #[prost(message, repeated, tag = "3")]
    pub parameters: Vec<template::Parameter>,
    #[prost(string, optional, tag = "4")]
    pub template_ref: Option<String>,
    #[prost(bool, optional, tag = "5")]
    pub is_definition: Option<bool>,
}

/// Nested message and oneof types of [`Template`].
pub mod template {
    /// A template parameter.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Parameter {
        #[prost(string, optional, tag = "1")]
        pub name: Option<String>,
        #[prost(uint32, optional, tag = "2")]
        pub r#type: Option<u32>,
        #[prost(oneof = "parameter::Value", tags = "3, 4, 5, 6, 7, 8, 9")]
        pub value: Option<parameter::Value>,
    }

    /// Nested oneof types of [`Parameter`].
    pub mod parameter {
        /// Value slot of a template parameter.
        #[derive(Clone, PartialEq, ::prost::Oneof)]
        pub enum Value {
            #[prost(uint32, tag = "3")]
            IntValue(u32),
            #[prost(uint64, tag = "4")]
            LongValue(u64),
            #[prost(float, tag = "5")]
            FloatValue(f32),
            #[prost(double, tag = "6")]
            DoubleValue(f64),
            #[prost(bool, tag = "7")]
            BooleanValue(bool),
            #[prost(string, tag = "8")]
            StringValue(String),
            #[prost(message, tag = "9")]
            ExtensionValue(super::ParameterValueExtension),
        }
    }

    /// Placeholder for vendor extensions of a parameter value.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ParameterValueExtension {}
}

/// A columnar table.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DataSet {
    #[prost(uint64, optional, tag = "1")]
    pub num_of_columns: Option<u64>,
    #[prost(string, repeated, tag = "2")]
    pub columns: Vec<String>,
    #[prost(uint32, repeated, packed = "false", tag = "3")]
    pub types: Vec<u32>,
    #[prost(message, repeated, tag = "4")]
    pub rows: Vec<data_set::Row>,
}

/// Nested message and oneof types of [`DataSet`].
pub mod data_set {
    /// A single cell. Cells carry no type code of their own; the column type applies.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct DataSetValue {
        #[prost(oneof = "data_set_value::Value", tags = "1, 2, 3, 4, 5, 6, 7")]
        pub value: Option<data_set_value::Value>,
    }

    /// Nested oneof types of [`DataSetValue`].
    pub mod data_set_value {
        /// Value slot of a data set cell.
        #[derive(Clone, PartialEq, ::prost::Oneof)]
        pub enum Value {
            #[prost(uint32, tag = "1")]
            IntValue(u32),
            #[prost(uint64, tag = "2")]
            LongValue(u64),
            #[prost(float, tag = "3")]
            FloatValue(f32),
            #[prost(double, tag = "4")]
            DoubleValue(f64),
            #[prost(bool, tag = "5")]
            BooleanValue(bool),
            #[prost(string, tag = "6")]
            StringValue(String),
            #[prost(message, tag = "7")]
            ExtensionValue(super::DataSetValueExtension),
        }
    }

    /// Placeholder for vendor extensions of a data set cell.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct DataSetValueExtension {}

    /// A table row.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Row {
        #[prost(message, repeated, tag = "1")]
        pub elements: Vec<DataSetValue>,
    }
}

/// A type-tagged property value.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PropertyValue {
    #[prost(uint32, optional, tag = "1")]
    pub r#type: Option<u32>,
    #[prost(bool, optional, tag = "2")]
    pub is_null: Option<bool>,
    #[prost(oneof = "property_value::Value", tags = "3, 4, 5, 6, 7, 8, 9, 10, 11")]
    pub value: Option<property_value::Value>,
}

/// Nested oneof types of [`PropertyValue`].
pub mod property_value {
    /// Value slot of a property value.
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Value {
        #[prost(uint32, tag = "3")]
        IntValue(u32),
        #[prost(uint64, tag = "4")]
        LongValue(u64),
        #[prost(float, tag = "5")]
        FloatValue(f32),
        #[prost(double, tag = "6")]
        DoubleValue(f64),
        #[prost(bool, tag = "7")]
        BooleanValue(bool),
        #[prost(string, tag = "8")]
        StringValue(String),
        #[prost(message, tag = "9")]
        PropertysetValue(super::PropertySet),
        #[prost(message, tag = "10")]
        PropertysetsValue(super::PropertySetList),
        #[prost(message, tag = "11")]
        ExtensionValue(PropertyValueExtension),
    }

    /// Placeholder for vendor extensions of a property value.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct PropertyValueExtension {}
}

/// An ordered set of keys and positionally aligned values.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PropertySet {
    #[prost(string, repeated, tag = "1")]
    pub keys: Vec<String>,
    #[prost(message, repeated, tag = "2")]
    pub values: Vec<PropertyValue>,
}

/// A list of property sets.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PropertySetList {
    #[prost(message, repeated, tag = "1")]
    pub propertyset: Vec<PropertySet>,
}

/// Descriptive metadata for a metric, mostly used by file and multi-part transfers.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MetaData {
    #[prost(bool, optional, tag = "1")]
    pub is_multi_part: Option<bool>,
    #[prost(string, optional, tag = "2")]
    pub content_type: Option<String>,
    #[prost(uint64, optional, tag = "3")]
    pub size: Option<u64>,
    #[prost(uint64, optional, tag = "4")]
    pub seq: Option<u64>,
    #[prost(string, optional, tag = "5")]
    pub file_name: Option<String>,
    #[prost(string, optional, tag = "6")]
    pub file_type: Option<String>,
    #[prost(string, optional, tag = "7")]
    pub md5: Option<String>,
    #[prost(string, optional, tag = "8")]
    pub description: Option<String>,
}

/// A single metric.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Metric {
    #[prost(string, optional, tag = "1")]
    pub name: Option<String>,
    #[prost(uint64, optional, tag = "2")]
    pub alias: Option<u64>,
    #[prost(uint64, optional, tag = "3")]
    pub timestamp: Option<u64>,
    #[prost(uint32, optional, tag = "4")]
    pub datatype: Option<u32>,
    #[prost(bool, optional, tag = "5")]
    pub is_historical: Option<bool>,
    #[prost(bool, optional, tag = "6")]
    pub is_transient: Option<bool>,
    #[prost(bool, optional, tag = "7")]
    pub is_null: Option<bool>,
    #[prost(message, optional, tag = "8")]
    pub metadata: Option<MetaData>,
    #[prost(message, optional, tag = "9")]
    pub properties: Option<PropertySet>,
    #[prost(oneof = "metric::Value", tags = "10, 11, 12, 13, 14, 15, 16, 17, 18, 19")]
    pub value: Option<metric::Value>,
}

/// Nested oneof types of [`Metric`].
pub mod metric {
    /// Value slot of a metric.
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Value {
        #[prost(uint32, tag = "10")]
        IntValue(u32),
        #[prost(uint64, tag = "11")]
        LongValue(u64),
        #[prost(float, tag = "12")]
        FloatValue(f32),
        #[prost(double, tag = "13")]
        DoubleValue(f64),
        #[prost(bool, tag = "14")]
        BooleanValue(bool),
        #[prost(string, tag = "15")]
        StringValue(String),
        #[prost(bytes = "vec", tag = "16")]
        BytesValue(Vec<u8>),
        #[prost(message, tag = "17")]
        DatasetValue(super::DataSet),
        #[prost(message, tag = "18")]
        TemplateValue(super::Template),
        #[prost(message, tag = "19")]
        ExtensionValue(MetricValueExtension),
    }

    /// Placeholder for vendor extensions of a metric value.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct MetricValueExtension {}
}
