//! Identifier types shared by all graph entities
//!
//! Ids are plain strings, either supplied by the document or derived from an
//! entity's defining attributes, wrapped in one newtype per entity kind so a
//! vertex id can never be handed to an edge lookup.

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&String> for $name {
            fn from(s: &String) -> Self {
                Self(s.clone())
            }
        }

        impl From<&$name> for $name {
            fn from(id: &$name) -> Self {
                id.clone()
            }
        }
    };
}

string_id!(
    /// Unique identifier for a temporal group
    TemporalGroupId
);
string_id!(
    /// Unique identifier for a spatial group
    SpatialGroupId
);
string_id!(
    /// Unique identifier for a vertex
    VertexId
);
string_id!(
    /// Unique identifier for an edge
    EdgeId
);

/// Lowercase, dash-separated form of free text, used to derive ids from names
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Day 1 · Lisbon"), "day-1-lisbon");
        assert_eq!(slugify("  Trip  "), "trip");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_borrow_lookup() {
        let mut map = BTreeMap::new();
        map.insert(VertexId::new("a"), 1);
        assert_eq!(map.get("a"), Some(&1));
    }

    #[test]
    fn test_transparent_serde() {
        let id = EdgeId::new("a:b:route");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"a:b:route\"");
    }
}
