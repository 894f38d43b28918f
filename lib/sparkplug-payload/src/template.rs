//! Template codec.
//!
//! Templates are user-defined types: a definition lists member metrics and parameters, and an instance refers to its
//! definition by name and carries concrete member values. Member metrics resolve exactly like top-level metrics.

use sparkplug_protos::{self as proto, template};

use crate::{
    catalog::DataType,
    error::{CodecError, TypeMismatch},
    metric::Metric,
    resolver::{self, Carrier, Resolver, SlotRef},
    value::Value,
};

/// A template definition or instance.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Template {
    version: Option<String>,
    metrics: Vec<Metric>,
    parameters: Vec<Parameter>,
    template_ref: Option<String>,
    is_definition: bool,
}

impl Template {
    /// Creates a new template definition with the given member metrics.
    pub fn definition(metrics: Vec<Metric>) -> Self {
        Self {
            metrics,
            is_definition: true,
            ..Self::default()
        }
    }

    /// Creates a new instance of the named template definition with the given member metrics.
    pub fn instance<S>(template_ref: S, metrics: Vec<Metric>) -> Self
    where
        S: Into<String>,
    {
        Self {
            metrics,
            template_ref: Some(template_ref.into()),
            ..Self::default()
        }
    }

    /// Sets the template version.
    pub fn with_version<S>(mut self, version: S) -> Self
    where
        S: Into<String>,
    {
        self.version = Some(version.into());
        self
    }

    /// Adds a parameter.
    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Returns the template version, if any.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Returns the member metrics.
    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    /// Returns the parameters.
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Returns the name of the definition this instance refers to, if any.
    pub fn template_ref(&self) -> Option<&str> {
        self.template_ref.as_deref()
    }

    /// Returns `true` if this is a definition rather than an instance.
    pub fn is_definition(&self) -> bool {
        self.is_definition
    }
}

/// A template parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct Parameter {
    name: Option<String>,
    datatype: DataType,
    value: Value,
}

impl Parameter {
    /// Creates a new `Parameter`.
    ///
    /// # Errors
    ///
    /// If parameters have no slot for `datatype`, or the value cannot be encoded as `datatype`, an error is
    /// returned.
    pub fn new<S, V>(name: S, datatype: DataType, value: V) -> Result<Self, CodecError>
    where
        S: Into<String>,
        V: Into<Value>,
    {
        let value = value.into();
        resolver::check_carried(Carrier::Parameter, datatype, &value)?;
        Ok(Self {
            name: Some(name.into()),
            datatype,
            value,
        })
    }

    /// Returns the parameter name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the declared type.
    pub fn datatype(&self) -> DataType {
        self.datatype
    }

    /// Returns the value.
    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl Resolver<'_> {
    /// Decodes a template.
    ///
    /// # Errors
    ///
    /// If any member metric or parameter fails to decode, an error is returned.
    pub fn decode_template(&self, message: &proto::Template) -> Result<Template, CodecError> {
        let metrics = message
            .metrics
            .iter()
            .enumerate()
            .map(|(i, metric)| self.decode_metric(metric).map_err(|e| e.at_index("metrics", i)))
            .collect::<Result<Vec<_>, _>>()?;

        let parameters = message
            .parameters
            .iter()
            .enumerate()
            .map(|(i, parameter)| {
                self.decode_parameter(parameter)
                    .map_err(|e| e.at_index("parameters", i))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Template {
            version: message.version.clone(),
            metrics,
            parameters,
            template_ref: message.template_ref.clone(),
            is_definition: message.is_definition.unwrap_or(false),
        })
    }

    fn decode_parameter(&self, parameter: &template::Parameter) -> Result<Parameter, CodecError> {
        let datatype = DataType::try_from(parameter.r#type.unwrap_or(0))?;
        // Definitions commonly leave parameter values unset.
        let value = self.decode(
            datatype,
            parameter.value.is_none(),
            parameter.value.as_ref().map(SlotRef::from),
        )?;
        Ok(Parameter {
            name: parameter.name.clone(),
            datatype,
            value,
        })
    }

    /// Encodes a template.
    ///
    /// # Errors
    ///
    /// If any member metric or parameter fails to encode, an error is returned.
    pub fn encode_template(&self, template: &Template) -> Result<proto::Template, CodecError> {
        let metrics = template
            .metrics
            .iter()
            .enumerate()
            .map(|(i, metric)| self.encode_metric(metric).map_err(|e| e.at_index("metrics", i)))
            .collect::<Result<Vec<_>, _>>()?;

        let parameters = template
            .parameters
            .iter()
            .enumerate()
            .map(|(i, parameter)| {
                self.encode_parameter(parameter)
                    .map_err(|e| e.at_index("parameters", i))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(proto::Template {
            version: template.version.clone(),
            metrics,
            parameters,
            template_ref: template.template_ref.clone(),
            is_definition: template.is_definition.then_some(true),
        })
    }

    fn encode_parameter(&self, parameter: &Parameter) -> Result<template::Parameter, CodecError> {
        let value = match self.encode(&parameter.value, parameter.datatype)? {
            None => None,
            Some(slot) => {
                let kind = slot.kind();
                match slot.into_parameter_value() {
                    Some(value) => Some(value),
                    None => {
                        return TypeMismatch {
                            datatype: parameter.datatype,
                            expected: "a value a parameter can hold",
                            found: kind.field_name(),
                        }
                        .fail()
                    }
                }
            }
        };

        Ok(template::Parameter {
            name: parameter.name.clone(),
            r#type: Some(parameter.datatype.code()),
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CodecConfiguration;

    fn motor() -> Template {
        Template::definition(vec![
            Metric::new("rpm", DataType::UInt32, 0u32).unwrap(),
            Metric::new("label", DataType::String, "idle").unwrap(),
        ])
        .with_version("1.0")
        .with_parameter(Parameter::new("poles", DataType::Int32, 4).unwrap())
    }

    #[test]
    fn definitions_round_trip() {
        let config = CodecConfiguration::default();
        let resolver = Resolver::new(&config);

        let encoded = resolver.encode_template(&motor()).unwrap();
        assert_eq!(encoded.is_definition, Some(true));
        assert_eq!(encoded.metrics.len(), 2);
        assert_eq!(encoded.parameters[0].value, Some(template::parameter::Value::IntValue(4)));

        assert_eq!(resolver.decode_template(&encoded).unwrap(), motor());
    }

    #[test]
    fn instances_refer_to_definitions() {
        let instance = Template::instance("Motor", vec![Metric::new("rpm", DataType::UInt32, 1450u32).unwrap()]);
        assert!(!instance.is_definition());
        assert_eq!(instance.template_ref(), Some("Motor"));
        assert_eq!(instance.metrics()[0].value(), &Value::UInt(1450));
    }

    #[test]
    fn unset_parameter_values_are_null() {
        let config = CodecConfiguration::default();
        let message = proto::Template {
            parameters: vec![template::Parameter {
                name: Some("poles".into()),
                r#type: Some(DataType::Int32.code()),
                value: None,
            }],
            is_definition: Some(true),
            ..Default::default()
        };

        let decoded = Resolver::new(&config).decode_template(&message).unwrap();
        assert_eq!(decoded.parameters()[0].value(), &Value::Null);
        assert_eq!(decoded.parameters()[0].name(), Some("poles"));
    }

    #[test]
    fn member_errors_name_the_member() {
        let config = CodecConfiguration::default();
        let mut message = Resolver::new(&config).encode_template(&motor()).unwrap();
        message.metrics[1].value = Some(proto::metric::Value::IntValue(3));

        let error = Resolver::new(&config).decode_template(&message).unwrap_err();
        assert!(matches!(error, CodecError::TypeMismatch { .. }));
        assert_eq!(error.path().unwrap().to_string(), "metrics[1]");
    }

    #[test]
    fn parameters_hold_only_primitives() {
        for (datatype, value) in [
            (DataType::Bytes, Value::Bytes(vec![1])),
            (DataType::DataSet, Value::Null),
            (DataType::PropertySetList, Value::PropertySetList(vec![])),
        ] {
            match Parameter::new("blob", datatype, value) {
                Err(CodecError::TypeMismatch { expected, .. }) => assert_eq!(expected, "a value a parameter can hold"),
                other => panic!("unexpected result for {}: {:?}", datatype, other),
            }
        }
    }
}
