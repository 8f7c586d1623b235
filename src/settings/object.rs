//! The settings object handed to a template.

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

use super::value::SettingValue;

/// Insertion-ordered mapping from field names to typed values.
///
/// Field order is significant: it is the order in which fields are
/// serialized and logged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    fields: IndexMap<String, SettingValue>,
}

impl Settings {
    /// Creates an empty settings object.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, replacing any previous value in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<SettingValue>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Builder-style variant of [`Settings::insert`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<SettingValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Returns the value of a field.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SettingValue> {
        self.fields.get(name)
    }

    /// Iterates over fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &SettingValue)> {
        self.fields.iter()
    }

    /// Field names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if there are no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<SettingValue>> FromIterator<(K, V)> for Settings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut settings = Self::new();
        for (name, value) in iter {
            settings.insert(name, value);
        }
        settings
    }
}

impl Serialize for Settings {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
