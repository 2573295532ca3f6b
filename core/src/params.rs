//! Flat request parameters.
//!
//! `Params` is an ordered list of name/value pairs. Order is preserved and
//! names may repeat, which is how the API expresses array parameters such as
//! `localeIdsToAuthorize[]`.

use std::path::{Path, PathBuf};

/// Name of the parameter that carries a local file to upload.
pub const FILE_PARAM: &str = "file";

/// A single parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Text(String),
    Bool(bool),
    Int(i64),
    /// Local path whose contents are sent as a binary part.
    File(PathBuf),
}

impl ParamValue {
    /// String form sent over the wire. Booleans use `1`/`0`.
    pub fn to_form_value(&self) -> String {
        match self {
            ParamValue::Text(s) => s.clone(),
            ParamValue::Bool(true) => "1".to_string(),
            ParamValue::Bool(false) => "0".to_string(),
            ParamValue::Int(n) => n.to_string(),
            ParamValue::File(path) => path.display().to_string(),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        ParamValue::Text(value.clone())
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Int(i64::from(value))
    }
}

/// Ordered, string-keyed parameter map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<(String, ParamValue)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter, keeping any earlier entry with the same name.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Builder form of `push`.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.push(name, value);
        self
    }

    /// Attach a local file under the `file` name, replacing any earlier one.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.entries.retain(|(name, _)| name != FILE_PARAM);
        self.entries
            .push((FILE_PARAM.to_string(), ParamValue::File(path.as_ref().to_path_buf())));
        self
    }

    /// Append every entry of `other` after the existing ones.
    pub fn extend(&mut self, other: Params) {
        self.entries.extend(other.entries);
    }

    /// First value stored under `name`.
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Split off the `file` entry. Returns the remaining scalar parameters and
    /// the path of the last `file` entry, if any. A `file` entry holding a
    /// plain string is treated as a path too.
    pub fn take_file(self) -> (Params, Option<PathBuf>) {
        let mut file = None;
        let mut scalars = Vec::with_capacity(self.entries.len());
        for (name, value) in self.entries {
            if name == FILE_PARAM {
                file = Some(match value {
                    ParamValue::File(path) => path,
                    other => PathBuf::from(other.to_form_value()),
                });
            } else {
                scalars.push((name, value));
            }
        }
        (Params { entries: scalars }, file)
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Params {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}
