//! Server-side form handling for the review and judgment boxes.
pub mod judgment;
pub mod review;

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

/// Submitted `application/x-www-form-urlencoded` fields.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct FormData(pub HashMap<String, String>);

impl FormData {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(|v| v.trim())
    }

    /// Non-empty value of a field.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|v| !v.is_empty())
    }

    /// Checkbox semantics: present with any value other than an explicit "no".
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.value(name), Some(v) if !matches!(v, "0" | "false" | "n" | "off"))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        FormData(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Field values and validation errors, keyed by unprefixed field name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    pub prefix: String,
    pub values: BTreeMap<String, String>,
    pub errors: BTreeMap<String, String>,
}

impl FormState {
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Default::default()
        }
    }

    /// Full name of a field as it appears in the submitted data.
    pub fn field_name(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}-{}", self.prefix, name)
        }
    }

    pub fn value(&self, name: &str) -> &str {
        self.values.get(name).map(String::as_str).unwrap_or_default()
    }

    pub fn error(&self, name: &str) -> Option<&str> {
        self.errors.get(name).map(String::as_str)
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.values.insert(name.to_string(), value.into());
    }

    pub fn add_error(&mut self, name: &str, message: impl Into<String>) {
        self.errors.insert(name.to_string(), message.into());
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Copies the submitted values for `names` into the form so they are re-rendered.
    pub fn load(&mut self, data: &FormData, names: impl IntoIterator<Item = String>) {
        self.errors.clear();
        for name in names {
            let value = data.get(&self.field_name(&name)).unwrap_or_default().to_string();
            self.values.insert(name, value);
        }
    }

    /// Parses an optional integer field, recording an error when it is not a number.
    pub fn optional_id(&mut self, name: &str) -> Option<i64> {
        let raw = self.value(name).to_string();
        if raw.is_empty() {
            return None;
        }
        match raw.parse::<i64>() {
            Ok(id) => Some(id),
            Err(_) => {
                self.add_error(name, "Not a valid choice");
                None
            }
        }
    }
}
