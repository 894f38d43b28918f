use std::fmt;

use snafu::Snafu;

use crate::{catalog::DataType, table::ColumnarType};

/// A single step in a [`FieldPath`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Segment {
    /// A named field of a message, such as `metrics` or `properties`.
    Field(&'static str),

    /// A property key.
    Key(String),

    /// A position within a repeated field.
    Index(usize),
}

impl From<&'static str> for Segment {
    fn from(field: &'static str) -> Self {
        Self::Field(field)
    }
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// Location of a value within a payload, such as `metrics[2].properties.gain[0].ch1`.
///
/// Paths are built back to front: the innermost codec raises an error with an empty path, and each enclosing layer
/// prepends the segment it was working on as the error propagates.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FieldPath {
    segments: Vec<Segment>,
}

impl FieldPath {
    /// Returns the segments of this path, outermost first.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns `true` if the path points at the payload root.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    fn push_front(&mut self, segment: Segment) {
        self.segments.insert(0, segment);
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("<root>");
        }

        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Field(name) if i == 0 => f.write_str(name)?,
                Segment::Key(key) if i == 0 => f.write_str(key)?,
                Segment::Field(name) => write!(f, ".{}", name)?,
                Segment::Key(key) => write!(f, ".{}", key)?,
                Segment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

impl snafu::GenerateImplicitData for FieldPath {
    fn generate() -> Self {
        Self::default()
    }
}

/// A payload codec error.
#[derive(Debug, Snafu)]
#[snafu(context(suffix(false)), visibility(pub(crate)))]
pub enum CodecError {
    /// A type code has no registered resolution.
    #[snafu(display("unsupported data type code {} at {}", code, path))]
    UnsupportedType {
        /// The offending type code.
        code: u32,
        /// Location of the offending value.
        #[snafu(implicit)]
        path: FieldPath,
    },

    /// A value's shape disagrees with the kind implied by its declared type.
    #[snafu(display("type mismatch at {}: {} expects {}, found {}", path, datatype, expected, found))]
    TypeMismatch {
        /// Declared type.
        datatype: DataType,
        /// What the declared type requires.
        expected: &'static str,
        /// What was actually present.
        found: &'static str,
        /// Location of the offending value.
        #[snafu(implicit)]
        path: FieldPath,
    },

    /// An integer does not fit the declared width.
    #[snafu(display("value {} is out of range for {} at {}", value, datatype, path))]
    ValueOutOfRange {
        /// Declared type.
        datatype: DataType,
        /// The offending value.
        value: i128,
        /// Location of the offending value.
        #[snafu(implicit)]
        path: FieldPath,
    },

    /// Key/value, column/type, or row-length parity was violated.
    #[snafu(display("shape mismatch at {}: {}", path, reason))]
    ShapeMismatch {
        /// Description of the violated parity.
        reason: String,
        /// Location of the offending value.
        #[snafu(implicit)]
        path: FieldPath,
    },

    /// Nesting went deeper than the configured bound.
    #[snafu(display("nesting exceeds the limit of {} levels at {}", limit, path))]
    RecursionLimitExceeded {
        /// Configured limit.
        limit: usize,
        /// Location of the offending value.
        #[snafu(implicit)]
        path: FieldPath,
    },

    /// A data set column was declared with a type that cells cannot hold.
    #[snafu(display("column {} of type {} cannot be used in a data set at {}", column, datatype, path))]
    UnsupportedColumnType {
        /// Column position.
        column: usize,
        /// Declared column type.
        datatype: DataType,
        /// Location of the offending value.
        #[snafu(implicit)]
        path: FieldPath,
    },

    /// A decoded column could not be narrowed to its semantic width.
    #[snafu(display("failed to cast column '{}' to {:?}: {}", column, requested, reason))]
    ColumnCastFailed {
        /// Column name.
        column: String,
        /// Requested columnar type.
        requested: ColumnarType,
        /// Why the cast failed.
        reason: String,
        /// Location of the offending value.
        #[snafu(implicit)]
        path: FieldPath,
    },

    /// A payload without any metrics.
    #[snafu(display("payload contains no metrics"))]
    EmptyPayload,

    /// A required field was absent.
    #[snafu(display("missing required field '{}' at {}", field, path))]
    MissingField {
        /// Name of the missing field.
        field: &'static str,
        /// Location of the offending value.
        #[snafu(implicit)]
        path: FieldPath,
    },

    /// The generic tree does not have the shape of a payload.
    #[snafu(display("malformed payload tree at {}: {}", path, reason))]
    MalformedTree {
        /// Description of the problem.
        reason: String,
        /// Location of the offending value.
        #[snafu(implicit)]
        path: FieldPath,
    },

    /// The binary codec rejected the input.
    #[snafu(display("failed to decode wire payload: {}", source))]
    WireDecode {
        /// Error source.
        source: prost::DecodeError,
    },
}

impl CodecError {
    /// Returns the location of the offending value, if the error is tied to one.
    pub fn path(&self) -> Option<&FieldPath> {
        match self {
            Self::UnsupportedType { path, .. }
            | Self::TypeMismatch { path, .. }
            | Self::ValueOutOfRange { path, .. }
            | Self::ShapeMismatch { path, .. }
            | Self::RecursionLimitExceeded { path, .. }
            | Self::UnsupportedColumnType { path, .. }
            | Self::ColumnCastFailed { path, .. }
            | Self::MissingField { path, .. }
            | Self::MalformedTree { path, .. } => Some(path),
            Self::EmptyPayload | Self::WireDecode { .. } => None,
        }
    }

    fn path_mut(&mut self) -> Option<&mut FieldPath> {
        match self {
            Self::UnsupportedType { path, .. }
            | Self::TypeMismatch { path, .. }
            | Self::ValueOutOfRange { path, .. }
            | Self::ShapeMismatch { path, .. }
            | Self::RecursionLimitExceeded { path, .. }
            | Self::UnsupportedColumnType { path, .. }
            | Self::ColumnCastFailed { path, .. }
            | Self::MissingField { path, .. }
            | Self::MalformedTree { path, .. } => Some(path),
            Self::EmptyPayload | Self::WireDecode { .. } => None,
        }
    }

    /// Prepends `segment` to the error's path.
    pub(crate) fn at<S: Into<Segment>>(mut self, segment: S) -> Self {
        if let Some(path) = self.path_mut() {
            path.push_front(segment.into());
        }
        self
    }

    /// Prepends `field[index]` to the error's path.
    pub(crate) fn at_index(self, field: &'static str, index: usize) -> Self {
        self.at(index).at(field)
    }

    /// Prepends a property key to the error's path.
    pub(crate) fn at_key(self, key: &str) -> Self {
        self.at(Segment::Key(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_built_outward() {
        let error = TypeMismatch {
            datatype: DataType::Int32,
            expected: "integer",
            found: "string",
        }
        .build()
        .at_key("ch1")
        .at(0)
        .at_key("gain")
        .at("properties")
        .at_index("metrics", 2);

        assert_eq!(
            error.path().unwrap().to_string(),
            "metrics[2].properties.gain[0].ch1"
        );
        assert_eq!(
            error.to_string(),
            "type mismatch at metrics[2].properties.gain[0].ch1: Int32 expects integer, found string"
        );
    }

    #[test]
    fn root_path() {
        let error = MissingField { field: "timestamp" }.build();
        assert!(error.path().unwrap().is_root());
        assert_eq!(error.to_string(), "missing required field 'timestamp' at <root>");
    }

    #[test]
    fn pathless_errors_ignore_segments() {
        let error = CodecError::EmptyPayload.at("metrics");
        assert!(error.path().is_none());
    }
}
