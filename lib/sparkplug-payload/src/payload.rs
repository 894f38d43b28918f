//! Payload model.
//!
//! A [`Payload`] is the fully resolved form of a Sparkplug B message: every metric carries a native value checked
//! against its declared type, and every property set has been turned into an ordered map. Payloads are built from
//! generic trees, from the protobuf message tree, or from the binary wire form, always through the same pipeline:
//! structural validation first, then value resolution.

use snafu::{ensure, ResultExt as _};
use sparkplug_protos as proto;
use tracing::{debug, warn};

use crate::{
    config::CodecConfiguration,
    error::{CodecError, EmptyPayload, MissingField, WireDecode},
    metric::Metric,
    properties::PropertyMap,
    resolver::Resolver,
    table::Table,
    tree::{self, TreeReader},
    validate::Validator,
};

/// A resolved Sparkplug B payload.
#[derive(Clone, Debug, PartialEq)]
pub struct Payload {
    timestamp: u64,
    metrics: Vec<Metric>,
    seq: Option<u64>,
    uuid: Option<String>,
    body: Option<Vec<u8>>,
}

impl Payload {
    /// Creates a new `Payload`.
    ///
    /// # Errors
    ///
    /// If `metrics` is empty, an error is returned.
    pub fn new(timestamp: u64, metrics: Vec<Metric>) -> Result<Self, CodecError> {
        ensure!(!metrics.is_empty(), EmptyPayload);
        Ok(Self {
            timestamp,
            metrics,
            seq: None,
            uuid: None,
            body: None,
        })
    }

    /// Parses a payload from a generic tree, using the default configuration.
    ///
    /// # Errors
    ///
    /// See [`PayloadCodec::parse`].
    pub fn parse(tree: &serde_json::Value) -> Result<Self, CodecError> {
        PayloadCodec::default().parse(tree)
    }

    /// Serializes this payload to a generic tree, using the default configuration.
    ///
    /// # Errors
    ///
    /// See [`PayloadCodec::serialize`].
    pub fn serialize(&self) -> Result<serde_json::Value, CodecError> {
        PayloadCodec::default().serialize(self)
    }

    /// Sets the sequence number.
    pub fn with_seq(mut self, seq: u64) -> Self {
        self.seq = Some(seq);
        self
    }

    /// Sets the UUID.
    pub fn with_uuid<S>(mut self, uuid: S) -> Self
    where
        S: Into<String>,
    {
        self.uuid = Some(uuid.into());
        self
    }

    /// Sets the opaque body.
    pub fn with_body<B>(mut self, body: B) -> Self
    where
        B: Into<Vec<u8>>,
    {
        self.body = Some(body.into());
        self
    }

    /// Returns the timestamp, in milliseconds since the Unix epoch.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Returns the metrics, in payload order.
    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    /// Returns the first metric with the given name, if any.
    pub fn metric(&self, name: &str) -> Option<&Metric> {
        self.metrics.iter().find(|metric| metric.name() == Some(name))
    }

    /// Returns the sequence number, if any.
    pub fn seq(&self) -> Option<u64> {
        self.seq
    }

    /// Returns the UUID, if any.
    pub fn uuid(&self) -> Option<&str> {
        self.uuid.as_deref()
    }

    /// Returns the opaque body, if any.
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Projects every data set metric into a typed table.
    ///
    /// Tables are returned in payload order. A payload without data set metrics yields no tables.
    ///
    /// # Errors
    ///
    /// If any column cannot be narrowed to its semantic width, an error is returned.
    pub fn tables(&self) -> Result<Vec<ExtractedTable>, CodecError> {
        let mut tables = Vec::new();
        for (index, metric) in self.metrics.iter().enumerate() {
            let Some(dataset) = metric.value().as_dataset() else {
                continue;
            };
            let table = dataset
                .to_table()
                .map_err(|e| e.at("dataset_value").at_index("metrics", index))?;

            tables.push(ExtractedTable {
                name: metric.name().map(str::to_string),
                alias: metric.alias(),
                timestamp: metric.timestamp().unwrap_or(self.timestamp),
                table,
                properties: metric.properties().cloned().unwrap_or_default(),
            });
        }

        if tables.is_empty() {
            warn!(metrics = self.metrics.len(), "Tables requested from payload without any data set metrics.");
        }
        Ok(tables)
    }
}

/// A typed table extracted from a data set metric.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtractedTable {
    name: Option<String>,
    alias: Option<u64>,
    timestamp: u64,
    table: Table,
    properties: PropertyMap,
}

impl ExtractedTable {
    /// Returns the name of the metric the table came from, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the alias of the metric the table came from, if any.
    pub fn alias(&self) -> Option<u64> {
        self.alias
    }

    /// Returns the metric timestamp, or the payload timestamp when the metric has none.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Returns the table.
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Returns the metric's properties.
    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    /// Consumes the extracted table, returning the table itself.
    pub fn into_table(self) -> Table {
        self.table
    }
}

/// Converts payloads between their resolved, generic-tree, message, and wire forms.
#[derive(Clone, Debug, Default)]
pub struct PayloadCodec {
    config: CodecConfiguration,
}

impl PayloadCodec {
    /// Creates a new `PayloadCodec` with the given configuration.
    pub fn new(config: CodecConfiguration) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &CodecConfiguration {
        &self.config
    }

    /// Parses a payload from a generic tree.
    ///
    /// # Errors
    ///
    /// If the tree does not have the shape of a payload, fails validation, or holds a value that does not resolve
    /// against its declared type, an error is returned.
    pub fn parse(&self, tree: &serde_json::Value) -> Result<Payload, CodecError> {
        let message = TreeReader::new(self.config.max_depth()).payload(tree)?;
        self.from_message(&message)
    }

    /// Serializes a payload to a generic tree.
    ///
    /// # Errors
    ///
    /// If a value cannot be encoded as its declared type, an error is returned.
    pub fn serialize(&self, payload: &Payload) -> Result<serde_json::Value, CodecError> {
        let message = self.to_message(payload)?;
        Ok(tree::payload_to_tree(&message))
    }

    /// Resolves a payload from its protobuf message tree.
    ///
    /// # Errors
    ///
    /// If the message fails validation, or holds a value that does not resolve against its declared type, an error
    /// is returned.
    pub fn from_message(&self, message: &proto::Payload) -> Result<Payload, CodecError> {
        Validator::new(&self.config).validate(message)?;

        let Some(timestamp) = message.timestamp else {
            return MissingField { field: "timestamp" }.fail();
        };

        let resolver = Resolver::new(&self.config);
        let metrics = message
            .metrics
            .iter()
            .enumerate()
            .map(|(i, metric)| resolver.decode_metric(metric).map_err(|e| e.at_index("metrics", i)))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            timestamp,
            metrics = metrics.len(),
            has_body = message.body.is_some(),
            "Resolved payload."
        );

        Ok(Payload {
            timestamp,
            metrics,
            seq: message.seq,
            uuid: message.uuid.clone(),
            body: message.body.clone(),
        })
    }

    /// Lowers a payload into its protobuf message tree.
    ///
    /// # Errors
    ///
    /// If a value cannot be encoded as its declared type, an error is returned.
    pub fn to_message(&self, payload: &Payload) -> Result<proto::Payload, CodecError> {
        let resolver = Resolver::new(&self.config);
        let metrics = payload
            .metrics
            .iter()
            .enumerate()
            .map(|(i, metric)| resolver.encode_metric(metric).map_err(|e| e.at_index("metrics", i)))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            timestamp = payload.timestamp,
            metrics = metrics.len(),
            has_body = payload.body.is_some(),
            "Lowered payload."
        );

        Ok(proto::Payload {
            timestamp: Some(payload.timestamp),
            metrics,
            seq: payload.seq,
            uuid: payload.uuid.clone(),
            body: payload.body.clone(),
        })
    }

    /// Decodes a payload from its binary wire form.
    ///
    /// # Errors
    ///
    /// If the buffer is not a valid payload encoding, or the decoded message fails validation or resolution, an
    /// error is returned.
    pub fn decode(&self, buf: &[u8]) -> Result<Payload, CodecError> {
        let message = sparkplug_protos::decode_payload(buf).context(WireDecode)?;
        debug!(len = buf.len(), "Decoded wire payload.");
        self.from_message(&message)
    }

    /// Encodes a payload into its binary wire form.
    ///
    /// # Errors
    ///
    /// If a value cannot be encoded as its declared type, an error is returned.
    pub fn encode(&self, payload: &Payload) -> Result<Vec<u8>, CodecError> {
        let message = self.to_message(payload)?;
        Ok(sparkplug_protos::encode_payload(&message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{catalog::DataType, dataset::DataSetBuilder, properties::Property, value::Value};

    fn readings() -> Payload {
        Payload::new(
            1_626_170_000_000,
            vec![
                Metric::new("temperature", DataType::Float, 23.7f32)
                    .unwrap()
                    .with_property("units", Property::new("C").unwrap()),
                Metric::new("alarm", DataType::Boolean, true).unwrap(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn payloads_need_metrics() {
        assert!(matches!(Payload::new(1, vec![]), Err(CodecError::EmptyPayload)));
    }

    #[test]
    fn wire_round_trip() {
        let codec = PayloadCodec::default();
        let payload = readings().with_seq(7).with_uuid("abc").with_body(b"raw".to_vec());

        let bytes = codec.encode(&payload).unwrap();
        assert_eq!(codec.decode(&bytes).unwrap(), payload);
    }

    #[test]
    fn garbage_is_a_wire_error() {
        let error = PayloadCodec::default().decode(&[0xff, 0xff, 0xff]).unwrap_err();
        assert!(matches!(error, CodecError::WireDecode { .. }));
    }

    #[test]
    fn metric_errors_carry_the_metric_index() {
        let message = proto::Payload {
            timestamp: Some(1),
            metrics: vec![
                proto::Metric {
                    datatype: Some(DataType::Boolean.code()),
                    value: Some(proto::metric::Value::BooleanValue(true)),
                    ..Default::default()
                },
                proto::Metric {
                    datatype: Some(DataType::String.code()),
                    value: Some(proto::metric::Value::IntValue(4)),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        let error = PayloadCodec::default().from_message(&message).unwrap_err();
        assert_eq!(error.path().unwrap().to_string(), "metrics[1]");
    }

    #[test]
    fn tables_follow_payload_order() {
        let first = DataSetBuilder::new(["idx"], [DataType::Int32])
            .unwrap()
            .with_row([Value::Int(1)])
            .unwrap()
            .build();
        let second = DataSetBuilder::new(["flag"], [DataType::Boolean])
            .unwrap()
            .with_row([Value::Boolean(false)])
            .unwrap()
            .build();

        let payload = Payload::new(
            100,
            vec![
                Metric::new("first", DataType::DataSet, first).unwrap().with_timestamp(50),
                Metric::new("scalar", DataType::Int8, 1).unwrap(),
                Metric::new("second", DataType::DataSet, second).unwrap(),
            ],
        )
        .unwrap();

        let tables = payload.tables().unwrap();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].name(), Some("first"));
        assert_eq!(tables[0].timestamp(), 50);
        assert_eq!(tables[1].name(), Some("second"));
        assert_eq!(tables[1].timestamp(), 100);
        assert_eq!(tables[1].table().num_rows(), 1);
    }

    #[test]
    fn no_tables_without_data_sets() {
        assert!(readings().tables().unwrap().is_empty());
    }

    #[test]
    fn lookup_by_name() {
        let payload = readings();
        assert_eq!(payload.metric("alarm").map(Metric::value), Some(&Value::Boolean(true)));
        assert!(payload.metric("pressure").is_none());
    }
}
