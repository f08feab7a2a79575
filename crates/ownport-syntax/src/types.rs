//! Semantic type descriptors attached to declarations and expressions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Spelling used for expressions whose declaration could not be resolved.
const UNRESOLVED: &str = "<unresolved>";

/// Semantic type of a declaration or expression.
///
/// A descriptor either denotes a value type (no pointee) or a raw pointer to
/// exactly one value type. Multi-level indirection is not modelled: asking
/// for a pointer to a pointer produces an opaque value type whose spelling
/// keeps both stars, so it never looks like a migration target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeDescriptor {
    spelling: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pointee: Option<Box<TypeDescriptor>>,
}

impl TypeDescriptor {
    /// Creates a value type with the given spelling.
    #[must_use]
    pub fn value(spelling: impl Into<String>) -> Self {
        Self {
            spelling: spelling.into(),
            pointee: None,
        }
    }

    /// Creates a single-indirection pointer to `pointee`.
    ///
    /// If `pointee` is itself a pointer the result is an opaque value type.
    #[must_use]
    pub fn pointer_to(pointee: Self) -> Self {
        let spelling = format!("{} *", pointee.spelling);
        if pointee.is_pointer() {
            return Self::value(spelling);
        }
        Self {
            spelling,
            pointee: Some(Box::new(pointee)),
        }
    }

    /// Placeholder type for names the provider could not resolve.
    #[must_use]
    pub fn unresolved() -> Self {
        Self::value(UNRESOLVED)
    }

    /// Returns the pointee when this type is a raw pointer.
    #[must_use]
    pub fn pointee(&self) -> Option<&Self> {
        self.pointee.as_deref()
    }

    /// Returns true when this type denotes a raw pointer.
    #[must_use]
    pub const fn is_pointer(&self) -> bool {
        self.pointee.is_some()
    }

    /// Returns the textual spelling of the type.
    #[must_use]
    pub fn spelling(&self) -> &str {
        &self.spelling
    }

    /// Restores the single-indirection invariant on deserialized data.
    ///
    /// Trees read from JSON may nest pointees arbitrarily; anything deeper
    /// than one level collapses into an opaque value type.
    #[must_use]
    pub fn normalised(self) -> Self {
        match self.pointee {
            Some(pointee) if pointee.is_pointer() => Self::value(self.spelling),
            Some(pointee) => Self {
                spelling: self.spelling,
                pointee: Some(pointee),
            },
            None => self,
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.spelling)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_exposes_its_pointee() {
        let ty = TypeDescriptor::pointer_to(TypeDescriptor::value("Widget"));
        assert!(ty.is_pointer());
        assert_eq!(ty.pointee().map(TypeDescriptor::spelling), Some("Widget"));
        assert_eq!(ty.spelling(), "Widget *");
    }

    #[test]
    fn double_indirection_is_opaque() {
        let inner = TypeDescriptor::pointer_to(TypeDescriptor::value("int"));
        let outer = TypeDescriptor::pointer_to(inner);
        assert!(!outer.is_pointer());
        assert_eq!(outer.spelling(), "int * *");
    }

    #[test]
    fn deserialized_nesting_is_collapsed() {
        let json = r#"{"spelling":"int **","pointee":{"spelling":"int *","pointee":{"spelling":"int"}}}"#;
        let ty: TypeDescriptor = serde_json::from_str(json).expect("deserialize");
        let ty = ty.normalised();
        assert!(!ty.is_pointer());
        assert_eq!(ty.spelling(), "int **");
    }

    #[test]
    fn unresolved_is_not_a_pointer() {
        let ty = TypeDescriptor::unresolved();
        assert!(!ty.is_pointer());
        assert!(ty.pointee().is_none());
    }
}
