//! Expression shapes seen by the pattern classifiers.
//!
//! Expressions are not rewritten through this view; it only describes the
//! operands of declarations and statements precisely enough to decide
//! whether a rewrite applies. Nested constructs that may themselves be
//! rewritten (allocations inside initializers, for instance) also appear as
//! child [`SyntaxNode`](crate::SyntaxNode)s.

use serde::{Deserialize, Serialize};

use crate::span::Span;
use crate::types::TypeDescriptor;

/// An expression operand, tagged by shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Expr {
    /// An integer literal such as `0` or `0x10`.
    Literal {
        /// Source range of the literal.
        span: Span,
        /// Literal text as written.
        text: String,
        /// Parsed value, absent when the literal does not fit or is malformed.
        value: Option<u64>,
        /// Semantic type of the literal.
        ty: TypeDescriptor,
    },
    /// A plain reference to a named declaration.
    NameRef {
        /// Source range of the reference.
        span: Span,
        /// Referenced name.
        name: String,
        /// Declared type of the referenced entity.
        ty: TypeDescriptor,
    },
    /// A member access such as `this->buffer` or `node.next`.
    MemberRef {
        /// Source range of the whole access expression.
        span: Span,
        /// Full access text as written.
        text: String,
        /// Name of the accessed member.
        member: String,
        /// Declared type of the member.
        ty: TypeDescriptor,
    },
    /// A conversion the type system inserts without source syntax.
    ImplicitConversion {
        /// Source range, identical to the converted operand's range.
        span: Span,
        /// Target type of the conversion.
        ty: TypeDescriptor,
        /// The converted operand.
        inner: Box<Expr>,
    },
    /// Any other expression.
    Unknown {
        /// Source range of the expression.
        span: Span,
    },
}

impl Expr {
    /// Returns the source range of the expression.
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Self::Literal { span, .. }
            | Self::NameRef { span, .. }
            | Self::MemberRef { span, .. }
            | Self::ImplicitConversion { span, .. }
            | Self::Unknown { span } => *span,
        }
    }

    /// Returns the semantic type, if the shape carries one.
    #[must_use]
    pub const fn ty(&self) -> Option<&TypeDescriptor> {
        match self {
            Self::Literal { ty, .. }
            | Self::NameRef { ty, .. }
            | Self::MemberRef { ty, .. }
            | Self::ImplicitConversion { ty, .. } => Some(ty),
            Self::Unknown { .. } => None,
        }
    }

    /// Strips implicit conversions, returning the innermost operand.
    #[must_use]
    pub fn peeled(&self) -> &Self {
        let mut current = self;
        while let Self::ImplicitConversion { inner, .. } = current {
            current = inner;
        }
        current
    }

    /// Returns true for the integer literal zero, looking through conversions.
    #[must_use]
    pub fn is_zero_literal(&self) -> bool {
        matches!(self.peeled(), Self::Literal { value: Some(0), .. })
    }

    /// Restores the single-indirection invariant on every carried type.
    #[must_use]
    pub fn normalised(self) -> Self {
        match self {
            Self::Literal {
                span,
                text,
                value,
                ty,
            } => Self::Literal {
                span,
                text,
                value,
                ty: ty.normalised(),
            },
            Self::NameRef { span, name, ty } => Self::NameRef {
                span,
                name,
                ty: ty.normalised(),
            },
            Self::MemberRef {
                span,
                text,
                member,
                ty,
            } => Self::MemberRef {
                span,
                text,
                member,
                ty: ty.normalised(),
            },
            Self::ImplicitConversion { span, ty, inner } => Self::ImplicitConversion {
                span,
                ty: ty.normalised(),
                inner: Box::new((*inner).normalised()),
            },
            Self::Unknown { span } => Self::Unknown { span },
        }
    }

    /// Wraps `self` in an implicit conversion to `ty`.
    #[must_use]
    pub fn converted_to(self, ty: TypeDescriptor) -> Self {
        Self::ImplicitConversion {
            span: self.span(),
            ty,
            inner: Box::new(self),
        }
    }
}

/// Parses the value of a C++ integer literal.
///
/// Handles decimal, hexadecimal, binary and octal forms, digit separators,
/// and `u`/`l` suffixes. Returns `None` for anything else, including values
/// that overflow `u64`.
#[must_use]
pub fn parse_integer_literal(text: &str) -> Option<u64> {
    let cleaned: String = text.trim().chars().filter(|c| *c != '\'').collect();
    let body = cleaned.trim_end_matches(['u', 'U', 'l', 'L', 'z', 'Z']);
    if body.is_empty() {
        return None;
    }
    let lower = body.to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix("0x") {
        return u64::from_str_radix(hex, 16).ok();
    }
    if let Some(binary) = lower.strip_prefix("0b") {
        return u64::from_str_radix(binary, 2).ok();
    }
    if lower.len() > 1 && lower.starts_with('0') {
        return u64::from_str_radix(lower.trim_start_matches('0'), 8)
            .ok()
            .or_else(|| lower.bytes().all(|b| b == b'0').then_some(0));
    }
    lower.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("0", Some(0))]
    #[case("00", Some(0))]
    #[case("0x0", Some(0))]
    #[case("0UL", Some(0))]
    #[case("42", Some(42))]
    #[case("0x1F", Some(31))]
    #[case("0b101", Some(5))]
    #[case("017", Some(15))]
    #[case("1'000", Some(1000))]
    #[case("1.5", None)]
    #[case("0x", None)]
    fn integer_literals_parse(#[case] text: &str, #[case] expected: Option<u64>) {
        assert_eq!(parse_integer_literal(text), expected);
    }

    fn literal(value: u64) -> Expr {
        Expr::Literal {
            span: Span::new(4, 5),
            text: value.to_string(),
            value: Some(value),
            ty: TypeDescriptor::value("int"),
        }
    }

    #[test]
    fn zero_is_found_behind_conversions() {
        let target = TypeDescriptor::pointer_to(TypeDescriptor::value("int"));
        let expr = literal(0).converted_to(target);
        assert!(expr.is_zero_literal());
        assert_eq!(expr.span(), Span::new(4, 5));
        assert!(matches!(expr.peeled(), Expr::Literal { .. }));
    }

    #[test]
    fn nonzero_literal_is_not_zero() {
        assert!(!literal(5).is_zero_literal());
    }

    #[test]
    fn unknown_has_no_type() {
        let expr = Expr::Unknown {
            span: Span::new(0, 3),
        };
        assert!(expr.ty().is_none());
    }
}
