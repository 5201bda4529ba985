//! Embedded image metadata as extracted by a metadata reader.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Tag names the compliance rules look at.
pub mod tags {
    /// Capture timestamp, `YYYY:MM:DD HH:MM:SS`.
    pub const DATE_TIME_ORIGINAL: &str = "DateTimeOriginal";
    /// GPS latitude.
    pub const GPS_LATITUDE: &str = "GPSLatitude";
    /// GPS longitude.
    pub const GPS_LONGITUDE: &str = "GPSLongitude";
    /// Orientation flag.
    pub const ORIENTATION: &str = "Orientation";
    /// Authoring software signature.
    pub const SOFTWARE: &str = "Software";
}

/// Tag name to value mapping.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataMap {
    tags: HashMap<String, String>,
}

impl MetadataMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tag, builder style.
    #[must_use]
    pub fn with(mut self, tag: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(tag, value);
        self
    }

    /// Inserts or replaces a tag.
    pub fn insert(&mut self, tag: impl Into<String>, value: impl Into<String>) {
        self.tags.insert(tag.into(), value.into());
    }

    /// Value of a tag, treating blank values as absent.
    #[must_use]
    pub fn get(&self, tag: &str) -> Option<&str> {
        self.tags
            .get(tag)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// Returns true if the tag is present with a non-blank value.
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.get(tag).is_some()
    }

    /// Number of tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Returns true if there are no tags.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl FromIterator<(String, String)> for MetadataMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            tags: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_values_count_as_absent() {
        let map = MetadataMap::new().with(tags::SOFTWARE, "  ");
        assert!(!map.contains(tags::SOFTWARE));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_with_and_get() {
        let map = MetadataMap::new().with(tags::ORIENTATION, "1");
        assert_eq!(map.get(tags::ORIENTATION), Some("1"));
        assert!(map.get(tags::GPS_LATITUDE).is_none());
    }
}
