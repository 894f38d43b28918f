//! Property graph codec.
//!
//! A property set pairs an ordered list of keys with a positionally aligned list of type-tagged values, and a value
//! may itself be another property set or a list of them. Decoding produces a [`PropertyMap`] preserving key order;
//! nesting is bounded by the resolver's depth limit.

use indexmap::IndexMap;
use snafu::ensure;
use sparkplug_protos as proto;
use tracing::debug;

use crate::{
    catalog::DataType,
    error::{CodecError, ShapeMismatch, TypeMismatch},
    resolver::{self, Carrier, Resolver, SlotRef},
    value::Value,
};

/// An ordered mapping of property keys to properties.
///
/// Keys keep the order they had on the wire. When the same key appears more than once, the last value wins, in the
/// position of the first occurrence.
pub type PropertyMap = IndexMap<String, Property>;

/// A property value together with its declared type.
#[derive(Clone, Debug, PartialEq)]
pub struct Property {
    datatype: DataType,
    value: Value,
}

impl Property {
    /// Creates a new `Property`, inferring the declared type from the value.
    ///
    /// Signed and unsigned integers are declared as `Int64` and `UInt64`, and property maps (single or several) as
    /// `PropertySetList`. Null is declared as `Unknown`.
    ///
    /// # Errors
    ///
    /// Property values have no slot for bytes, data sets, or templates. If `value` is one of those, an error is
    /// returned.
    pub fn new<V>(value: V) -> Result<Self, CodecError>
    where
        V: Into<Value>,
    {
        let value = value.into();
        let datatype = match &value {
            Value::Null => DataType::Unknown,
            Value::Int(_) => DataType::Int64,
            Value::UInt(_) => DataType::UInt64,
            Value::Float(_) => DataType::Float,
            Value::Double(_) => DataType::Double,
            Value::Boolean(_) => DataType::Boolean,
            Value::String(_) => DataType::String,
            Value::PropertySet(_) | Value::PropertySetList(_) => DataType::PropertySetList,
            Value::Bytes(_) | Value::DataSet(_) | Value::Template(_) => {
                return TypeMismatch {
                    datatype: DataType::Unknown,
                    expected: Carrier::Property.describe(),
                    found: value.kind_name(),
                }
                .fail()
            }
        };
        Ok(Self { datatype, value })
    }

    /// Creates a new `Property` with an explicit declared type.
    ///
    /// # Errors
    ///
    /// If property values have no slot for `datatype`, or the value cannot be encoded as `datatype`, an error is
    /// returned.
    pub fn typed<V>(datatype: DataType, value: V) -> Result<Self, CodecError>
    where
        V: Into<Value>,
    {
        let value = value.into();
        resolver::check_carried(Carrier::Property, datatype, &value)?;
        Ok(Self { datatype, value })
    }

    /// Returns the declared type.
    pub fn datatype(&self) -> DataType {
        self.datatype
    }

    /// Returns the value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Consumes the property, returning its value.
    pub fn into_value(self) -> Value {
        self.value
    }
}

impl Resolver<'_> {
    pub(crate) fn decode_property_value(&self, value: &proto::PropertyValue) -> Result<Property, CodecError> {
        let datatype = DataType::try_from(value.r#type.unwrap_or(0))?;
        let decoded = self.decode(
            datatype,
            value.is_null.unwrap_or(false),
            value.value.as_ref().map(SlotRef::from),
        )?;
        Ok(Property {
            datatype,
            value: decoded,
        })
    }

    /// Decodes a property set into a property map.
    ///
    /// # Errors
    ///
    /// If the keys and values are not the same length, or any value fails to decode, an error is returned.
    pub fn decode_property_set(&self, set: &proto::PropertySet) -> Result<PropertyMap, CodecError> {
        ensure!(
            set.keys.len() == set.values.len(),
            ShapeMismatch {
                reason: format!("{} keys but {} values", set.keys.len(), set.values.len()),
            }
        );

        let mut map = PropertyMap::with_capacity(set.keys.len());
        for (key, value) in set.keys.iter().zip(&set.values) {
            let property = self.decode_property_value(value).map_err(|e| e.at_key(key))?;
            map.insert(key.clone(), property);
        }
        Ok(map)
    }

    /// Decodes a property set list.
    ///
    /// A list holding exactly one property set decodes to that bare property map when flattening is enabled. Any
    /// other list decodes to a sequence of property maps.
    ///
    /// # Errors
    ///
    /// If any contained property set fails to decode, an error is returned.
    pub fn decode_property_list(&self, list: &proto::PropertySetList) -> Result<Value, CodecError> {
        let mut maps = list
            .propertyset
            .iter()
            .enumerate()
            .map(|(i, set)| self.decode_property_set(set).map_err(|e| e.at(i)))
            .collect::<Result<Vec<_>, _>>()?;

        if self.config().flatten_property_lists() && maps.len() == 1 {
            if let Some(map) = maps.pop() {
                debug!(keys = map.len(), "Flattened single-element property set list.");
                return Ok(Value::PropertySet(map));
            }
        }
        Ok(Value::PropertySetList(maps))
    }

    pub(crate) fn encode_property_value(&self, property: &Property) -> Result<proto::PropertyValue, CodecError> {
        let value = match self.encode(&property.value, property.datatype)? {
            Some(slot) => {
                let kind = slot.kind();
                match slot.into_property_value() {
                    Some(value) => Some(value),
                    None => {
                        return TypeMismatch {
                            datatype: property.datatype,
                            expected: "a value a property can hold",
                            found: kind.field_name(),
                        }
                        .fail()
                    }
                }
            }
            None => None,
        };

        Ok(proto::PropertyValue {
            r#type: Some(property.datatype.code()),
            is_null: property.value.is_null().then_some(true),
            value,
        })
    }

    /// Encodes a property map into a property set.
    ///
    /// # Errors
    ///
    /// If any property fails to encode, an error is returned.
    pub fn encode_property_set(&self, map: &PropertyMap) -> Result<proto::PropertySet, CodecError> {
        let mut set = proto::PropertySet {
            keys: Vec::with_capacity(map.len()),
            values: Vec::with_capacity(map.len()),
        };
        for (key, property) in map {
            set.values
                .push(self.encode_property_value(property).map_err(|e| e.at_key(key))?);
            set.keys.push(key.clone());
        }
        Ok(set)
    }

    /// Encodes a sequence of property maps into a property set list.
    ///
    /// # Errors
    ///
    /// If any property fails to encode, an error is returned.
    pub fn encode_property_list(&self, maps: &[PropertyMap]) -> Result<proto::PropertySetList, CodecError> {
        let propertyset = maps
            .iter()
            .enumerate()
            .map(|(i, map)| self.encode_property_set(map).map_err(|e| e.at(i)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(proto::PropertySetList { propertyset })
    }
}

#[cfg(test)]
mod tests {
    use sparkplug_protos::property_value::Value as Slot;

    use super::*;
    use crate::config::CodecConfiguration;

    fn int32(n: u32) -> proto::PropertyValue {
        proto::PropertyValue {
            r#type: Some(DataType::Int32.code()),
            is_null: None,
            value: Some(Slot::IntValue(n)),
        }
    }

    fn set(keys: &[&str], values: Vec<proto::PropertyValue>) -> proto::PropertySet {
        proto::PropertySet {
            keys: keys.iter().map(|k| k.to_string()).collect(),
            values,
        }
    }

    fn list(sets: Vec<proto::PropertySet>) -> proto::PropertyValue {
        proto::PropertyValue {
            r#type: Some(DataType::PropertySetList.code()),
            is_null: None,
            value: Some(Slot::PropertysetsValue(proto::PropertySetList { propertyset: sets })),
        }
    }

    fn channels(n: u32) -> proto::PropertySet {
        set(&["ch1", "ch2", "ch3", "ch4"], vec![int32(n), int32(n), int32(n), int32(n)])
    }

    #[test]
    fn nested_gain_and_range() {
        let config = CodecConfiguration::default();
        let properties = set(&["gain", "range"], vec![list(vec![channels(1000)]), int32(5)]);

        let map = Resolver::new(&config).decode_property_set(&properties).unwrap();

        assert_eq!(map.keys().collect::<Vec<_>>(), ["gain", "range"]);
        assert_eq!(map["range"].value(), &Value::Int(5));
        assert_eq!(map["range"].datatype(), DataType::Int32);

        let gain = map["gain"].value().as_property_set().unwrap();
        assert_eq!(gain.len(), 4);
        for (key, property) in gain {
            assert!(key.starts_with("ch"));
            assert_eq!(property.value(), &Value::Int(1000));
        }
    }

    #[test]
    fn multi_element_lists_stay_lists() {
        let config = CodecConfiguration::default();
        let properties = set(&["gain"], vec![list(vec![channels(1), channels(2)])]);

        let map = Resolver::new(&config).decode_property_set(&properties).unwrap();
        let gains = map["gain"].value().as_property_set_list().unwrap();
        assert_eq!(gains.len(), 2);
        assert_eq!(gains[1]["ch3"].value(), &Value::Int(2));
    }

    #[test]
    fn flattening_can_be_disabled() {
        let config = CodecConfiguration::default().with_flatten_property_lists(false);
        let properties = set(&["gain"], vec![list(vec![channels(1)])]);

        let map = Resolver::new(&config).decode_property_set(&properties).unwrap();
        assert_eq!(map["gain"].value().as_property_set_list().unwrap().len(), 1);
    }

    #[test]
    fn flattened_maps_encode_as_one_element_lists() {
        let config = CodecConfiguration::default();
        let resolver = Resolver::new(&config);
        let properties = set(&["gain", "range"], vec![list(vec![channels(1000)]), int32(5)]);

        let map = resolver.decode_property_set(&properties).unwrap();
        let encoded = resolver.encode_property_set(&map).unwrap();
        assert_eq!(encoded, properties);
    }

    #[test]
    fn parity_violations_name_the_path() {
        let config = CodecConfiguration::default();
        let broken = set(&["ch1", "ch2"], vec![int32(1)]);
        let properties = set(&["gain"], vec![list(vec![channels(1), broken])]);

        let error = Resolver::new(&config).decode_property_set(&properties).unwrap_err();
        assert!(matches!(error, CodecError::ShapeMismatch { .. }));
        assert_eq!(error.path().unwrap().to_string(), "gain[1]");
    }

    #[test]
    fn null_properties() {
        let config = CodecConfiguration::default();
        let resolver = Resolver::new(&config);
        let null = proto::PropertyValue {
            r#type: Some(DataType::String.code()),
            is_null: Some(true),
            value: None,
        };

        let map = resolver.decode_property_set(&set(&["unit"], vec![null.clone()])).unwrap();
        assert_eq!(map["unit"].value(), &Value::Null);
        assert_eq!(map["unit"].datatype(), DataType::String);
        assert_eq!(resolver.encode_property_set(&map).unwrap().values, vec![null]);
    }

    #[test]
    fn duplicate_keys_keep_the_last_value() {
        let config = CodecConfiguration::default();
        let properties = set(&["a", "b", "a"], vec![int32(1), int32(2), int32(3)]);

        let map = Resolver::new(&config).decode_property_set(&properties).unwrap();
        assert_eq!(map.keys().collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(map["a"].value(), &Value::Int(3));
    }

    #[test]
    fn inferred_types() {
        assert_eq!(Property::new(5i32).unwrap().datatype(), DataType::Int64);
        assert_eq!(Property::new("V").unwrap().datatype(), DataType::String);
        assert_eq!(Property::new(PropertyMap::new()).unwrap().datatype(), DataType::PropertySetList);
        assert_eq!(Property::new(None::<u8>).unwrap().datatype(), DataType::Unknown);
        assert!(matches!(
            Property::typed(DataType::Int8, 1000),
            Err(CodecError::ValueOutOfRange { .. })
        ));
    }

    #[test]
    fn bytes_cannot_be_properties() {
        match Property::new(vec![1u8, 2]) {
            Err(CodecError::TypeMismatch { expected, found, .. }) => {
                assert_eq!(expected, "a value a property can hold");
                assert_eq!(found, "bytes");
            }
            other => panic!("unexpected result: {:?}", other),
        }
        for datatype in [DataType::Bytes, DataType::File, DataType::DataSet, DataType::Template] {
            assert!(matches!(
                Property::typed(datatype, Value::Null),
                Err(CodecError::TypeMismatch { .. })
            ));
        }
    }

    #[test]
    fn deep_nesting_is_rejected() {
        let config = CodecConfiguration::default().with_max_depth(3);
        let mut nested = channels(1);
        for _ in 0..5 {
            nested = set(&["inner"], vec![list(vec![nested])]);
        }

        let error = Resolver::new(&config).decode_property_set(&nested).unwrap_err();
        assert!(matches!(error, CodecError::RecursionLimitExceeded { limit: 3, .. }));
    }
}
