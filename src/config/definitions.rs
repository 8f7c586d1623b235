//! The raw definition set produced by the loader.

use indexmap::IndexMap;
use tracing::debug;

use crate::error::LoadError;
use crate::settings::SettingValue;

use super::typer::infer_type;

/// Flat mapping from variable names to raw string tokens.
///
/// A definition set is immutable once loaded; applying overrides produces a
/// new set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Definitions {
    values: IndexMap<String, String>,
}

impl Definitions {
    /// Creates an empty definition set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the raw token for a variable.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Returns the typed value for a variable.
    #[must_use]
    pub fn typed(&self, name: &str) -> Option<SettingValue> {
        self.get(name).map(infer_type)
    }

    /// Iterates over definitions in source order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if nothing is defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns a new set with `NAME=VALUE` overrides applied on top.
    ///
    /// # Errors
    ///
    /// Returns an error if an entry has no `=` or an empty name.
    pub fn with_overrides<I, S>(mut self, overrides: I) -> Result<Self, LoadError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for entry in overrides {
            let entry = entry.as_ref();
            let (name, value) = entry
                .split_once('=')
                .map(|(n, v)| (n.trim(), v))
                .filter(|(n, _)| !n.is_empty())
                .ok_or_else(|| LoadError::InvalidOverride {
                    entry: entry.to_string(),
                })?;
            debug!("Overriding definition {name} from command line");
            self.define(name, value);
        }
        Ok(self)
    }

    /// Records a definition; a later definition of the same name wins.
    pub(crate) fn define(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(previous) = self.values.get(&name) {
            if *previous != value {
                debug!("Definition {name} redefined: '{previous}' -> '{value}'");
            }
        }
        self.values.insert(name, value);
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Definitions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut definitions = Self::new();
        for (name, value) in iter {
            definitions.define(name, value);
        }
        definitions
    }
}
