//! Resource Classifier
//!
//! Maps a declared type tag to the endpoint that accepts mutations for it.
//! Supporting a new sub-type means adding a [`DeclaredType`] variant and its
//! collection path; nothing else changes.

use std::fmt;

/// Sub-types that can be mutated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclaredType {
    Blade,
    RackUnit,
}

impl DeclaredType {
    pub const ALL: [DeclaredType; 2] = [DeclaredType::Blade, DeclaredType::RackUnit];

    /// The server-side type tag
    pub fn tag(self) -> &'static str {
        match self {
            DeclaredType::Blade => "compute.Blade",
            DeclaredType::RackUnit => "compute.RackUnit",
        }
    }

    fn collection(self) -> &'static str {
        match self {
            DeclaredType::Blade => "compute/Blades",
            DeclaredType::RackUnit => "compute/RackUnits",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.tag() == tag)
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Endpoint template for one sub-type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointRoute {
    pub declared_type: DeclaredType,
}

impl EndpointRoute {
    /// Path of the resource `id`, relative to the API base
    pub fn resolve(&self, id: &str) -> String {
        format!(
            "{}/{}",
            self.declared_type.collection(),
            urlencoding::encode(id)
        )
    }
}

/// Result of classifying a declared type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Route(EndpointRoute),
    Unsupported,
}

/// Classify a declared type tag. Total: unknown tags are `Unsupported`.
pub fn classify(declared_type: &str) -> Classification {
    match DeclaredType::from_tag(declared_type) {
        Some(declared_type) => Classification::Route(EndpointRoute { declared_type }),
        None => Classification::Unsupported,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_blade_route() {
        let Classification::Route(route) = classify("compute.Blade") else {
            panic!("blades must be routable");
        };
        assert_eq!(route.resolve("A1"), "compute/Blades/A1");
    }

    #[test]
    fn test_rack_unit_route() {
        let Classification::Route(route) = classify("compute.RackUnit") else {
            panic!("rack units must be routable");
        };
        assert_eq!(route.resolve("B1"), "compute/RackUnits/B1");
    }

    #[test]
    fn test_unknown_types_are_unsupported() {
        assert_eq!(classify("equipment.Chassis"), Classification::Unsupported);
        assert_eq!(classify(""), Classification::Unsupported);
        assert_eq!(classify("compute.blade"), Classification::Unsupported);
    }

    #[test]
    fn test_ids_are_percent_encoded() {
        let route = EndpointRoute {
            declared_type: DeclaredType::Blade,
        };
        assert_eq!(route.resolve("a/b c"), "compute/Blades/a%2Fb%20c");
    }

    #[test]
    fn test_tags_round_trip() {
        for t in DeclaredType::ALL {
            assert_eq!(DeclaredType::from_tag(t.tag()), Some(t));
        }
    }

    proptest! {
        /// Every route resolves to a non-empty path under its own collection
        #[test]
        fn routes_never_produce_empty_paths(tag in "[a-zA-Z.]{0,20}", id in "[a-f0-9]{1,24}") {
            match classify(&tag) {
                Classification::Route(route) => {
                    let path = route.resolve(&id);
                    prop_assert!(path.starts_with(route.declared_type.collection()));
                    prop_assert!(path.ends_with(&id));
                }
                Classification::Unsupported => {
                    prop_assert!(DeclaredType::from_tag(&tag).is_none());
                }
            }
        }
    }
}
