use sparkplug_protos as proto;
use tracing::trace;

use crate::{
    catalog::DataType,
    error::{CodecError, TypeMismatch},
    properties::{Property, PropertyMap},
    resolver::{self, Carrier, Resolver, SlotRef},
    value::Value,
};

/// Descriptive metadata attached to a metric.
pub use sparkplug_protos::MetaData;

/// A single metric.
#[derive(Clone, Debug, PartialEq)]
pub struct Metric {
    name: Option<String>,
    alias: Option<u64>,
    timestamp: Option<u64>,
    datatype: DataType,
    value: Value,
    properties: Option<PropertyMap>,
    is_historical: bool,
    is_transient: bool,
    metadata: Option<MetaData>,
}

impl Metric {
    /// Creates a new `Metric`.
    ///
    /// # Errors
    ///
    /// If metrics have no slot for `datatype`, or the value cannot be encoded as `datatype`, an error is returned.
    pub fn new<S, V>(name: S, datatype: DataType, value: V) -> Result<Self, CodecError>
    where
        S: Into<String>,
        V: Into<Value>,
    {
        let mut metric = Self::unnamed(datatype, value)?;
        metric.name = Some(name.into());
        Ok(metric)
    }

    /// Creates a new `Metric` without a name.
    ///
    /// Metrics in data messages are usually identified by alias alone.
    ///
    /// # Errors
    ///
    /// If metrics have no slot for `datatype`, or the value cannot be encoded as `datatype`, an error is returned.
    pub fn unnamed<V>(datatype: DataType, value: V) -> Result<Self, CodecError>
    where
        V: Into<Value>,
    {
        let value = value.into();
        resolver::check_carried(Carrier::Metric, datatype, &value)?;
        Ok(Self {
            name: None,
            alias: None,
            timestamp: None,
            datatype,
            value,
            properties: None,
            is_historical: false,
            is_transient: false,
            metadata: None,
        })
    }

    /// Sets the alias.
    pub fn with_alias(mut self, alias: u64) -> Self {
        self.alias = Some(alias);
        self
    }

    /// Sets the timestamp, in milliseconds since the Unix epoch.
    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Sets the properties.
    pub fn with_properties(mut self, properties: PropertyMap) -> Self {
        self.properties = Some(properties);
        self
    }

    /// Adds a single property.
    pub fn with_property<S>(mut self, key: S, property: Property) -> Self
    where
        S: Into<String>,
    {
        self.properties.get_or_insert_with(PropertyMap::new).insert(key.into(), property);
        self
    }

    /// Sets whether the metric holds a historical value.
    pub fn with_historical(mut self, is_historical: bool) -> Self {
        self.is_historical = is_historical;
        self
    }

    /// Sets whether the metric is transient, and should not be stored.
    pub fn with_transient(mut self, is_transient: bool) -> Self {
        self.is_transient = is_transient;
        self
    }

    /// Sets the metadata.
    pub fn with_metadata(mut self, metadata: MetaData) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Returns the name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the alias, if any.
    pub fn alias(&self) -> Option<u64> {
        self.alias
    }

    /// Returns the timestamp, if any.
    pub fn timestamp(&self) -> Option<u64> {
        self.timestamp
    }

    /// Returns the declared type.
    pub fn datatype(&self) -> DataType {
        self.datatype
    }

    /// Returns the value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Returns the properties, if any were attached.
    pub fn properties(&self) -> Option<&PropertyMap> {
        self.properties.as_ref()
    }

    /// Returns the property with the given key, if any.
    pub fn property(&self, key: &str) -> Option<&Property> {
        self.properties.as_ref().and_then(|properties| properties.get(key))
    }

    /// Returns `true` if the metric holds a historical value.
    pub fn is_historical(&self) -> bool {
        self.is_historical
    }

    /// Returns `true` if the metric is transient.
    pub fn is_transient(&self) -> bool {
        self.is_transient
    }

    /// Returns the metadata, if any.
    pub fn metadata(&self) -> Option<&MetaData> {
        self.metadata.as_ref()
    }
}

impl Resolver<'_> {
    /// Decodes a metric.
    ///
    /// A metric without a type code is treated as `Unknown`, which only a null value can have.
    ///
    /// # Errors
    ///
    /// If the type code is unsupported, the value does not match it, or the properties fail to decode, an error is
    /// returned.
    pub fn decode_metric(&self, metric: &proto::Metric) -> Result<Metric, CodecError> {
        let datatype = DataType::try_from(metric.datatype.unwrap_or(0)).map_err(|e| e.at("datatype"))?;
        let value = self.decode(
            datatype,
            metric.is_null.unwrap_or(false),
            metric.value.as_ref().map(SlotRef::from),
        )?;
        let properties = metric
            .properties
            .as_ref()
            .map(|set| self.decode_property_set(set).map_err(|e| e.at("properties")))
            .transpose()?;

        trace!(
            name = metric.name.as_deref().unwrap_or_default(),
            alias = ?metric.alias,
            %datatype,
            "Resolved metric."
        );

        Ok(Metric {
            name: metric.name.clone(),
            alias: metric.alias,
            timestamp: metric.timestamp,
            datatype,
            value,
            properties,
            is_historical: metric.is_historical.unwrap_or(false),
            is_transient: metric.is_transient.unwrap_or(false),
            metadata: metric.metadata.clone(),
        })
    }

    /// Encodes a metric.
    ///
    /// # Errors
    ///
    /// If the value or properties fail to encode, an error is returned.
    pub fn encode_metric(&self, metric: &Metric) -> Result<proto::Metric, CodecError> {
        let value = match self.encode(&metric.value, metric.datatype)? {
            None => None,
            Some(slot) => {
                let kind = slot.kind();
                match slot.into_metric_value() {
                    Some(value) => Some(value),
                    None => {
                        return TypeMismatch {
                            datatype: metric.datatype,
                            expected: "a value a metric can hold",
                            found: kind.field_name(),
                        }
                        .fail()
                    }
                }
            }
        };
        let properties = metric
            .properties
            .as_ref()
            .map(|map| self.encode_property_set(map).map_err(|e| e.at("properties")))
            .transpose()?;

        Ok(proto::Metric {
            name: metric.name.clone(),
            alias: metric.alias,
            timestamp: metric.timestamp,
            datatype: Some(metric.datatype.code()),
            is_historical: metric.is_historical.then_some(true),
            is_transient: metric.is_transient.then_some(true),
            is_null: metric.value.is_null().then_some(true),
            metadata: metric.metadata.clone(),
            properties,
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use sparkplug_protos::metric::Value as Slot;

    use super::*;
    use crate::config::CodecConfiguration;

    fn resolver(config: &CodecConfiguration) -> Resolver<'_> {
        Resolver::new(config)
    }

    #[test]
    fn primitive_metric_without_properties() {
        let config = CodecConfiguration::default();
        let message = proto::Metric {
            name: Some("temperature".into()),
            datatype: Some(DataType::Float.code()),
            value: Some(Slot::FloatValue(23.7)),
            ..Default::default()
        };

        let metric = resolver(&config).decode_metric(&message).unwrap();
        assert_eq!(metric.name(), Some("temperature"));
        assert_eq!(metric.value(), &Value::Float(23.7));
        assert!(metric.properties().is_none());
        assert_eq!(resolver(&config).encode_metric(&metric).unwrap(), message);
    }

    #[test]
    fn envelope_fields_survive() {
        let config = CodecConfiguration::default();
        let metadata = MetaData {
            content_type: Some("application/pdf".into()),
            size: Some(1024),
            file_name: Some("manual.pdf".into()),
            ..Default::default()
        };
        let metric = Metric::new("manual", DataType::File, vec![0x25u8, 0x50, 0x44, 0x46])
            .unwrap()
            .with_alias(12)
            .with_timestamp(1_700_000_000_000)
            .with_historical(true)
            .with_metadata(metadata.clone())
            .with_property("revision", Property::new(3u32).unwrap());

        let message = resolver(&config).encode_metric(&metric).unwrap();
        assert_eq!(message.is_historical, Some(true));
        assert_eq!(message.is_transient, None);
        assert_eq!(message.metadata, Some(metadata));

        assert_eq!(resolver(&config).decode_metric(&message).unwrap(), metric);
    }

    #[test]
    fn null_metrics() {
        let config = CodecConfiguration::default();
        let metric = Metric::new("setpoint", DataType::Double, Value::Null).unwrap();

        let message = resolver(&config).encode_metric(&metric).unwrap();
        assert_eq!(message.is_null, Some(true));
        assert_eq!(message.value, None);
        assert_eq!(resolver(&config).decode_metric(&message).unwrap(), metric);
    }

    #[test]
    fn untyped_values_are_unsupported() {
        let config = CodecConfiguration::default();
        let message = proto::Metric {
            alias: Some(4),
            value: Some(Slot::IntValue(1)),
            ..Default::default()
        };

        assert!(matches!(
            resolver(&config).decode_metric(&message),
            Err(CodecError::UnsupportedType { code: 0, .. })
        ));
    }

    #[test]
    fn constructor_checks_the_value() {
        assert!(matches!(
            Metric::new("count", DataType::Int16, "many"),
            Err(CodecError::TypeMismatch { .. })
        ));
        assert!(matches!(
            Metric::new("count", DataType::UInt16, 70_000u32),
            Err(CodecError::ValueOutOfRange { .. })
        ));
        assert!(matches!(
            Metric::unnamed(DataType::Int128, 1),
            Err(CodecError::UnsupportedType { code: 22, .. })
        ));
    }

    #[test]
    fn metrics_hold_no_property_sets() {
        for datatype in [DataType::PropertySet, DataType::PropertySetList] {
            match Metric::new("m", datatype, PropertyMap::new()) {
                Err(CodecError::TypeMismatch { expected, .. }) => assert_eq!(expected, "a value a metric can hold"),
                other => panic!("unexpected result for {}: {:?}", datatype, other),
            }
        }
        assert!(matches!(
            Metric::new("m", DataType::PropertySet, Value::Null),
            Err(CodecError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn property_errors_are_located() {
        let config = CodecConfiguration::default();
        let message = proto::Metric {
            name: Some("ds".into()),
            datatype: Some(DataType::Boolean.code()),
            value: Some(Slot::BooleanValue(true)),
            properties: Some(proto::PropertySet {
                keys: vec!["unit".into()],
                values: vec![proto::PropertyValue {
                    r#type: Some(DataType::String.code()),
                    is_null: None,
                    value: Some(proto::property_value::Value::BooleanValue(false)),
                }],
            }),
            ..Default::default()
        };

        let error = resolver(&config).decode_metric(&message).unwrap_err();
        assert_eq!(error.path().unwrap().to_string(), "properties.unit");
    }
}
