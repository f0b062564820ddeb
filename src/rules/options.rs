/*!
 * Rule Options
 * Option bag with a required-name set that follows the object classification
 */

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Well-known option names
pub mod keys {
    pub const FSOBJECT_TYPE: &str = "fsobject_type";
    pub const EXTENSION: &str = "extension";
    pub const PART_NUMBER: &str = "part_number";
    pub const BIT: &str = "bit";
    pub const COLORMETRIC: &str = "colormetric";
    pub const SEPARATOR: &str = "separator";
    pub const PRECISION: &str = "precision";
    pub const COLUMN_COUNT: &str = "column_count";
}

/// How a virtual node presents itself to the filesystem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FsObjectType {
    File,
    Folder,
    /// Unrecognized classification; the node is hidden from attribute lookups
    None,
}

impl FsObjectType {
    pub const fn as_str(self) -> &'static str {
        match self {
            FsObjectType::File => "FILE",
            FsObjectType::Folder => "FOLDER",
            FsObjectType::None => "NONE",
        }
    }

    /// Parse an option value; anything but `FILE`/`FOLDER` is `None`
    pub fn parse(value: &str) -> Self {
        match value {
            "FILE" => FsObjectType::File,
            "FOLDER" => FsObjectType::Folder,
            _ => FsObjectType::None,
        }
    }
}

impl fmt::Display for FsObjectType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Option values of one rule plus the names that must be present
///
/// Every rule requires `fsobject_type`. A rule classified as `FILE` also
/// requires `extension`; a `FOLDER` does not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOptions {
    values: BTreeMap<String, String>,
    required: BTreeSet<String>,
}

impl Default for RuleOptions {
    fn default() -> Self {
        let mut required = BTreeSet::new();
        required.insert(keys::FSOBJECT_TYPE.to_string());
        Self {
            values: BTreeMap::new(),
            required,
        }
    }
}

impl RuleOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options holding only an `fsobject_type`, without touching the required set
    pub fn classified(object_type: FsObjectType) -> Self {
        let mut options = Self::default();
        options
            .values
            .insert(keys::FSOBJECT_TYPE.to_string(), object_type.as_str().to_string());
        options
    }

    /// Replace every value at once, then align the required set with the classification
    pub fn set_options<I, K, V>(&mut self, values: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.values = values
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.correct_required();
    }

    /// Builder form of [`RuleOptions::set_options`]
    pub fn with_options<I, K, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.set_options(values);
        self
    }

    /// Reclassify and toggle the `extension` requirement to match
    pub fn classify_as(&mut self, object_type: FsObjectType) {
        match object_type {
            FsObjectType::Folder => {
                self.required.remove(keys::EXTENSION);
            }
            _ => {
                self.required.insert(keys::EXTENSION.to_string());
            }
        }
        let value = if object_type == FsObjectType::Folder {
            FsObjectType::Folder
        } else {
            FsObjectType::File
        };
        self.values
            .insert(keys::FSOBJECT_TYPE.to_string(), value.as_str().to_string());
    }

    /// Insert or overwrite one value without touching the required set
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Value of `key`, or empty when absent
    pub fn value(&self, key: &str) -> &str {
        self.get(key).unwrap_or("")
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// True when every required name has a value
    pub fn is_complete(&self) -> bool {
        self.required.iter().all(|key| self.values.contains_key(key))
    }

    /// Required names that have no value, sorted
    pub fn missing(&self) -> Vec<&str> {
        self.required
            .iter()
            .filter(|key| !self.values.contains_key(*key))
            .map(String::as_str)
            .collect()
    }

    pub fn is_required(&self, key: &str) -> bool {
        self.required.contains(key)
    }

    /// Declared classification, if any
    pub fn fsobject_type(&self) -> Option<FsObjectType> {
        self.get(keys::FSOBJECT_TYPE).map(FsObjectType::parse)
    }

    /// Declared extension, when non-empty
    pub fn extension(&self) -> Option<&str> {
        self.get(keys::EXTENSION).filter(|ext| !ext.is_empty())
    }

    /// Parse a numeric option
    pub fn parse_number<T: std::str::FromStr>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|v| v.trim().parse().ok())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn correct_required(&mut self) {
        match self.fsobject_type() {
            Some(FsObjectType::File) => {
                self.required.insert(keys::EXTENSION.to_string());
            }
            Some(_) => {
                self.required.remove(keys::EXTENSION);
            }
            None => {}
        }
    }
}
