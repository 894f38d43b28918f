//! Structural validation of payload messages.
//!
//! Decoding checks shapes as it goes, but stops at the first value it fails to resolve. The validator runs first and
//! walks the whole message, so structural problems (parity violations, missing fields, runaway nesting) are reported
//! before any value is resolved, even when they sit behind a value that would also fail.

use snafu::ensure;
use sparkplug_protos::{self as proto, property_value};

use crate::{
    config::CodecConfiguration,
    dataset,
    error::{CodecError, EmptyPayload, MissingField, RecursionLimitExceeded, ShapeMismatch},
};

/// Validates the structure of payload messages.
#[derive(Clone, Copy, Debug)]
pub struct Validator {
    max_depth: usize,
}

impl Validator {
    /// Creates a new `Validator` using the nesting limit of the given configuration.
    pub fn new(config: &CodecConfiguration) -> Self {
        Self {
            max_depth: config.max_depth(),
        }
    }

    /// Validates a payload.
    ///
    /// # Errors
    ///
    /// If the payload has no timestamp or no metrics, or any property set or data set within it violates its parity
    /// rules, or nesting goes past the configured limit, an error is returned.
    pub fn validate(&self, payload: &proto::Payload) -> Result<(), CodecError> {
        ensure!(payload.timestamp.is_some(), MissingField { field: "timestamp" });
        ensure!(!payload.metrics.is_empty(), EmptyPayload);

        self.validate_metrics(&payload.metrics, 0)
    }

    fn validate_metrics(&self, metrics: &[proto::Metric], depth: usize) -> Result<(), CodecError> {
        for (index, metric) in metrics.iter().enumerate() {
            self.validate_metric(metric, depth)
                .map_err(|e| e.at_index("metrics", index))?;
        }
        Ok(())
    }

    fn validate_metric(&self, metric: &proto::Metric, depth: usize) -> Result<(), CodecError> {
        if let Some(properties) = &metric.properties {
            self.validate_property_set(properties, depth)
                .map_err(|e| e.at("properties"))?;
        }

        match &metric.value {
            Some(proto::metric::Value::DatasetValue(dataset)) => {
                dataset::check_shape(dataset).map_err(|e| e.at("dataset_value"))
            }
            Some(proto::metric::Value::TemplateValue(template)) => {
                let depth = self.descend(depth)?;
                self.validate_metrics(&template.metrics, depth)
                    .map_err(|e| e.at("template_value"))
            }
            _ => Ok(()),
        }
    }

    fn validate_property_set(&self, set: &proto::PropertySet, depth: usize) -> Result<(), CodecError> {
        ensure!(
            set.keys.len() == set.values.len(),
            ShapeMismatch {
                reason: format!("{} keys but {} values", set.keys.len(), set.values.len()),
            }
        );

        for (key, value) in set.keys.iter().zip(&set.values) {
            let result = match &value.value {
                Some(property_value::Value::PropertysetValue(nested)) => self
                    .descend(depth)
                    .and_then(|depth| self.validate_property_set(nested, depth)),
                Some(property_value::Value::PropertysetsValue(list)) => {
                    self.descend(depth).and_then(|depth| {
                        list.propertyset.iter().enumerate().try_for_each(|(i, nested)| {
                            self.validate_property_set(nested, depth).map_err(|e| e.at(i))
                        })
                    })
                }
                _ => Ok(()),
            };
            result.map_err(|e| e.at_key(key))?;
        }
        Ok(())
    }

    fn descend(&self, depth: usize) -> Result<usize, CodecError> {
        ensure!(
            depth < self.max_depth,
            RecursionLimitExceeded { limit: self.max_depth }
        );
        Ok(depth + 1)
    }
}
