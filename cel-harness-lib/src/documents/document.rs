use super::LoadError;
use cel_interpreter::Value;
use cel_interpreter::objects::{Key, Map};
use std::collections::HashMap;
use std::sync::Arc;

/// One decoded YAML document, held as a CEL map keyed by its top-level fields.
///
/// Cloning is cheap: the underlying map is shared.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    map: Map,
}

impl Document {
    /// A document with no fields.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            map: Map::from(HashMap::<Key, Value>::new()),
        }
    }

    /// Convert a decoded YAML value into a document.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Shape`] if the value is not a mapping or contains keys CEL cannot index by.
    pub fn from_yaml(value: serde_yaml::Value) -> Result<Self, LoadError> {
        match convert_value(value)? {
            Value::Map(map) => Ok(Self { map }),
            other => Err(LoadError::Shape(format!(
                "expected a mapping at the top level of the document, found {}",
                crate::expr::type_name(&other)
            ))),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.map.is_empty()
    }

    /// Look up a top-level field by name.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.map.map.get(&Key::String(Arc::new(key.to_string())))
    }

    #[must_use]
    pub const fn as_map(&self) -> &Map {
        &self.map
    }

    /// The document as a CEL value, ready to bind into an evaluation context.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Map(self.map.clone())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::empty()
    }
}

/// Convert a YAML value to a CEL value
fn convert_value(value: serde_yaml::Value) -> Result<Value, LoadError> {
    Ok(match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => convert_number(&n),
        serde_yaml::Value::String(s) => Value::String(Arc::new(s)),
        serde_yaml::Value::Sequence(items) => {
            let values = items.into_iter().map(convert_value).collect::<Result<Vec<_>, _>>()?;
            Value::List(Arc::new(values))
        }
        serde_yaml::Value::Mapping(mapping) => {
            let mut fields = HashMap::with_capacity(mapping.len());
            for (key, value) in mapping {
                let _ = fields.insert(convert_key(key)?, convert_value(value)?);
            }
            Value::Map(Map::from(fields))
        }
        serde_yaml::Value::Tagged(tagged) => convert_value(tagged.value)?,
    })
}

fn convert_number(n: &serde_yaml::Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::Int(i)
    } else if let Some(u) = n.as_u64() {
        Value::UInt(u)
    } else {
        Value::Float(n.as_f64().unwrap_or(f64::NAN))
    }
}

fn convert_key(key: serde_yaml::Value) -> Result<Key, LoadError> {
    match key {
        serde_yaml::Value::String(s) => Ok(Key::String(Arc::new(s))),
        serde_yaml::Value::Bool(b) => Ok(Key::Bool(b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Key::Int(i))
            } else if let Some(u) = n.as_u64() {
                Ok(Key::Uint(u))
            } else {
                Ok(Key::String(Arc::new(n.to_string())))
            }
        }
        serde_yaml::Value::Tagged(tagged) => convert_key(tagged.value),
        serde_yaml::Value::Null => Err(LoadError::Shape("mapping keys cannot be null".to_string())),
        serde_yaml::Value::Sequence(_) | serde_yaml::Value::Mapping(_) => {
            Err(LoadError::Shape("mapping keys must be scalars".to_string()))
        }
    }
}
