use crate::{dataset::DataSet, properties::PropertyMap, template::Template};

/// A resolved native value.
///
/// Integers of every declared width are widened to 64 bits: signed types decode to [`Value::Int`] and unsigned types
/// (including `DateTime`) to [`Value::UInt`]. The declared width is kept alongside the value by its owner, and is
/// enforced again when encoding.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// No value.
    Null,

    /// Signed integer.
    Int(i64),

    /// Unsigned integer.
    UInt(u64),

    /// Single precision float.
    Float(f32),

    /// Double precision float.
    Double(f64),

    /// Boolean.
    Boolean(bool),

    /// String.
    String(String),

    /// Byte sequence.
    Bytes(Vec<u8>),

    /// Columnar data set.
    DataSet(DataSet),

    /// Template.
    Template(Template),

    /// Property map.
    PropertySet(PropertyMap),

    /// Sequence of property maps.
    PropertySetList(Vec<PropertyMap>),
}

impl Value {
    /// Returns `true` if the value is [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns a short description of the value's shape.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Int(_) | Self::UInt(_) => "integer",
            Self::Float(_) | Self::Double(_) => "float",
            Self::Boolean(_) => "boolean",
            Self::String(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::DataSet(_) => "data set",
            Self::Template(_) => "template",
            Self::PropertySet(_) => "property set",
            Self::PropertySetList(_) => "property set list",
        }
    }

    /// Returns the value as an integer in a domain wide enough for every integer type.
    pub fn as_integer(&self) -> Option<i128> {
        match self {
            Self::Int(n) => Some(i128::from(*n)),
            Self::UInt(n) => Some(i128::from(*n)),
            _ => None,
        }
    }

    /// Returns the value as a signed 64-bit integer, if it is an integer that fits.
    pub fn as_i64(&self) -> Option<i64> {
        self.as_integer().and_then(|n| i64::try_from(n).ok())
    }

    /// Returns the value as an unsigned 64-bit integer, if it is an integer that fits.
    pub fn as_u64(&self) -> Option<u64> {
        self.as_integer().and_then(|n| u64::try_from(n).ok())
    }

    /// Returns the value as a double precision float, if it is a float.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(f64::from(*f)),
            Self::Double(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the value as a boolean, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the value as a string, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as bytes, if it is a byte sequence.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the value as a data set, if it is one.
    pub fn as_dataset(&self) -> Option<&DataSet> {
        match self {
            Self::DataSet(dataset) => Some(dataset),
            _ => None,
        }
    }

    /// Returns the value as a template, if it is one.
    pub fn as_template(&self) -> Option<&Template> {
        match self {
            Self::Template(template) => Some(template),
            _ => None,
        }
    }

    /// Returns the value as a property map, if it is one.
    pub fn as_property_set(&self) -> Option<&PropertyMap> {
        match self {
            Self::PropertySet(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the value as a sequence of property maps, if it is one.
    pub fn as_property_set_list(&self) -> Option<&[PropertyMap]> {
        match self {
            Self::PropertySetList(maps) => Some(maps),
            _ => None,
        }
    }
}

macro_rules! impl_from {
    ($variant:ident, $($ty:ty),+) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::$variant(value.into())
                }
            }
        )+
    };
}

impl_from!(Int, i8, i16, i32, i64);
impl_from!(UInt, u8, u16, u32, u64);
impl_from!(Float, f32);
impl_from!(Double, f64);
impl_from!(Boolean, bool);
impl_from!(String, String, &str);
impl_from!(Bytes, Vec<u8>, &[u8]);
impl_from!(DataSet, DataSet);
impl_from!(Template, Template);
impl_from!(PropertySet, PropertyMap);
impl_from!(PropertySetList, Vec<PropertyMap>);

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_views() {
        assert_eq!(Value::from(-3i8), Value::Int(-3));
        assert_eq!(Value::from(7u16), Value::UInt(7));
        assert_eq!(Value::UInt(u64::MAX).as_i64(), None);
        assert_eq!(Value::Int(-1).as_u64(), None);
        assert_eq!(Value::Int(-1).as_integer(), Some(-1));
        assert_eq!(Value::UInt(u64::MAX).as_integer(), Some(u64::MAX as i128));
        assert_eq!(Value::Double(1.0).as_integer(), None);
    }

    #[test]
    fn options_map_to_null() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::String("x".into()));
        assert!(Value::from(None::<bool>).is_null());
    }

    #[test]
    fn kind_names() {
        assert_eq!(Value::UInt(1).kind_name(), "integer");
        assert_eq!(Value::Float(1.0).kind_name(), "float");
        assert_eq!(Value::Bytes(vec![]).kind_name(), "bytes");
        assert_eq!(Value::PropertySetList(vec![]).kind_name(), "property set list");
    }
}
