//! Sparkplug B Protocol Buffers definitions.
//!
//! This crate contains the message types of the Eclipse Sparkplug B `Payload` schema (`sparkplug_b.proto`), declared
//! directly as `prost` messages so that no `protoc` toolchain is needed at build time. Field numbers, labels, and
//! oneof layouts match the upstream proto2 definition, so anything encoded here is wire-compatible with other
//! Sparkplug B implementations.
//!
//! Every `oneof value` in the schema is a Rust enum, which means a decoded value can only ever have a single
//! populated slot.
#![deny(warnings)]
#![allow(clippy::enum_variant_names)]

mod sparkplug_b;
pub use self::sparkplug_b::*;

use prost::Message as _;

/// Decodes a Sparkplug B payload from its binary wire form.
///
/// # Errors
///
/// If the buffer is not a valid protobuf encoding of `Payload`, an error is returned.
pub fn decode_payload(buf: &[u8]) -> Result<Payload, prost::DecodeError> {
    Payload::decode(buf)
}

/// Encodes a Sparkplug B payload into its binary wire form.
pub fn encode_payload(payload: &Payload) -> Vec<u8> {
    payload.encode_to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_survives_wire() {
        let payload = Payload {
            timestamp: Some(1626170000000),
            metrics: vec![Metric {
                name: Some("temperature".to_string()),
                datatype: Some(9),
                value: Some(metric::Value::FloatValue(23.7)),
                ..Default::default()
            }],
            seq: Some(4),
            uuid: None,
            body: Some(b"optional raw data here".to_vec()),
        };

        let decoded = decode_payload(&encode_payload(&payload)).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn nested_property_sets_survive_wire() {
        let inner = PropertySet {
            keys: vec!["ch1".to_string(), "ch2".to_string()],
            values: vec![
                PropertyValue {
                    r#type: Some(3),
                    is_null: None,
                    value: Some(property_value::Value::IntValue(1000)),
                },
                PropertyValue {
                    r#type: Some(3),
                    is_null: Some(true),
                    value: None,
                },
            ],
        };
        let properties = PropertySet {
            keys: vec!["gain".to_string()],
            values: vec![PropertyValue {
                r#type: Some(21),
                is_null: None,
                value: Some(property_value::Value::PropertysetsValue(PropertySetList {
                    propertyset: vec![inner],
                })),
            }],
        };
        let metric = Metric {
            name: Some("AXUV_example".to_string()),
            datatype: Some(16),
            properties: Some(properties),
            value: Some(metric::Value::DatasetValue(DataSet {
                num_of_columns: Some(1),
                columns: vec!["idx".to_string()],
                types: vec![3],
                rows: vec![data_set::Row {
                    elements: vec![data_set::DataSetValue {
                        value: Some(data_set::data_set_value::Value::IntValue(7)),
                    }],
                }],
            })),
            ..Default::default()
        };
        let payload = Payload {
            timestamp: Some(1737090405),
            metrics: vec![metric],
            ..Default::default()
        };

        let decoded = decode_payload(&encode_payload(&payload)).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn rejects_truncated_input() {
        let mut bytes = encode_payload(&Payload {
            timestamp: Some(1),
            metrics: vec![Metric {
                name: Some("a-rather-long-metric-name".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        });
        bytes.truncate(bytes.len() - 4);

        assert!(decode_payload(&bytes).is_err());
    }
}
