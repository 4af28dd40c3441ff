//! Key/value arguments threaded through to passes.

use crate::error::OptionsError;
use std::collections::HashMap;

/// Arguments set with `--pass-arg KEY:VALUE`.
///
/// Setting a key again overwrites its previous value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassArguments {
    values: HashMap<String, String>,
}

impl PassArguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `raw` as `KEY:VALUE` and stores it.
    ///
    /// The key ends at the first `:`, so the value may itself contain colons.
    /// Nothing is stored when the delimiter is missing.
    pub fn set_argument(&mut self, raw: &str) -> Result<(), OptionsError> {
        let (key, value) = raw.split_once(':').ok_or(OptionsError::MalformedPassArg)?;
        self.insert(key, value);
        Ok(())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
