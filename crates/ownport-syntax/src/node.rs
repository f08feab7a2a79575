//! The typed syntax tree handed from a provider to the migration engine.

use serde::{Deserialize, Serialize};

use crate::expr::Expr;
use crate::span::Span;
use crate::types::TypeDescriptor;

/// One node of the typed syntax tree.
///
/// The tree is read-only to the engine. `children` holds every nested node
/// the traversal must visit; kind-specific operands live in [`NodeKind`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxNode {
    /// Source range of the whole construct.
    pub span: Span,
    /// Tagged construct data.
    pub kind: NodeKind,
    /// Nested nodes in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    /// Creates a leaf node.
    #[must_use]
    pub const fn new(span: Span, kind: NodeKind) -> Self {
        Self {
            span,
            kind,
            children: Vec::new(),
        }
    }

    /// Replaces the children of this node.
    #[must_use]
    pub fn with_children(mut self, children: Vec<Self>) -> Self {
        self.children = children;
        self
    }

    /// Returns the number of nodes in this subtree, including `self`.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.children
            .iter()
            .map(Self::node_count)
            .fold(1, usize::saturating_add)
    }

    /// Iterates over this subtree in preorder.
    pub fn preorder(&self) -> impl Iterator<Item = &Self> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }

    /// Restores type invariants on every descriptor in the subtree.
    #[must_use]
    pub fn normalised(mut self) -> Self {
        self.kind = self.kind.normalised();
        self.children = self.children.into_iter().map(Self::normalised).collect();
        self
    }
}

/// Construct-specific data for a [`SyntaxNode`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum NodeKind {
    /// Root of a translation unit.
    TranslationUnit,
    /// A class or struct definition.
    Record {
        /// Declared record name, empty for anonymous records.
        name: String,
    },
    /// A data member declaration.
    Field(FieldDecl),
    /// A function, method, constructor or destructor declaration.
    Function(FunctionDecl),
    /// A variable declaration.
    Variable(VarDecl),
    /// A `return` statement.
    Return {
        /// Returned value, absent for a bare `return;`.
        value: Option<Expr>,
    },
    /// A `new` expression.
    Allocation(NewExpr),
    /// A `delete` expression.
    Deallocation(DeleteExpr),
    /// A simple `=` assignment.
    Assignment {
        /// Assigned-to operand.
        lhs: Expr,
        /// Assigned value.
        rhs: Expr,
    },
    /// Any construct without a dedicated variant.
    Other {
        /// Grammar kind the provider saw, for diagnostics.
        label: String,
    },
}

impl NodeKind {
    fn normalised(self) -> Self {
        match self {
            Self::Field(field) => Self::Field(FieldDecl {
                ty: field.ty.normalised(),
                ..field
            }),
            Self::Variable(var) => Self::Variable(VarDecl {
                ty: var.ty.normalised(),
                init: var.init.map(Expr::normalised),
                ..var
            }),
            Self::Return { value } => Self::Return {
                value: value.map(Expr::normalised),
            },
            Self::Deallocation(delete) => Self::Deallocation(DeleteExpr {
                argument: delete.argument.normalised(),
                ..delete
            }),
            Self::Assignment { lhs, rhs } => Self::Assignment {
                lhs: lhs.normalised(),
                rhs: rhs.normalised(),
            },
            Self::Function(function) => Self::Function(FunctionDecl {
                return_type: function.return_type.map(TypeDescriptor::normalised),
                params: function
                    .params
                    .into_iter()
                    .map(|param| ParamDecl {
                        ty: param.ty.normalised(),
                        ..param
                    })
                    .collect(),
                ..function
            }),
            Self::Allocation(new) => Self::Allocation(NewExpr {
                ty: new.ty.normalised(),
                ..new
            }),
            other => other,
        }
    }
}

/// A data member of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDecl {
    /// Member name.
    pub name: String,
    /// Declared type.
    pub ty: TypeDescriptor,
    /// Range of the type clause: from the first type token up to the name.
    pub type_span: Span,
}

/// Where a variable lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarScope {
    /// Declared inside a function body.
    Local,
    /// Declared at namespace scope.
    Global,
}

/// A variable declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarDecl {
    /// Declared name.
    pub name: String,
    /// Declared type.
    pub ty: TypeDescriptor,
    /// Range of the type clause: from the first type token up to the name.
    pub type_span: Span,
    /// Initializer after `=`, if any.
    pub init: Option<Expr>,
    /// Storage location of the variable.
    pub scope: VarScope,
}

/// The role a function plays in its class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionKind {
    /// A namespace-scope function.
    Free,
    /// A member function.
    Method,
    /// A constructor.
    Constructor,
    /// A destructor.
    Destructor,
}

/// A function declaration or definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDecl {
    /// Role of the function.
    pub kind: FunctionKind,
    /// Declarator name as written, including any qualification.
    pub name: String,
    /// Declared return type; absent for constructors and destructors.
    pub return_type: Option<TypeDescriptor>,
    /// Range of the return type clause, up to the function name.
    pub return_type_span: Option<Span>,
    /// Parameters in declaration order.
    pub params: Vec<ParamDecl>,
    /// Range from the start of the return type to the closing parenthesis of
    /// the parameter list.
    pub signature_span: Span,
}

impl FunctionDecl {
    /// Returns true when the return type or any parameter is a raw pointer.
    #[must_use]
    pub fn mentions_pointers(&self) -> bool {
        self.return_type.as_ref().is_some_and(TypeDescriptor::is_pointer)
            || self.params.iter().any(|param| param.ty.is_pointer())
    }
}

/// A function parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamDecl {
    /// Parameter name, absent for unnamed parameters.
    pub name: Option<String>,
    /// Declared type.
    pub ty: TypeDescriptor,
    /// Range of the type clause: from the first type token up to the name,
    /// or the whole parameter when it is unnamed.
    pub type_span: Span,
}

/// A `new` expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewExpr {
    /// Allocated type; the expression's own type is a pointer to it.
    pub ty: TypeDescriptor,
    /// Array length operand for `new T[n]`.
    pub array_length: Option<Expr>,
    /// True for array allocations.
    pub is_array: bool,
}

/// A `delete` expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteExpr {
    /// The deleted operand.
    pub argument: Expr,
    /// True for `delete[]`.
    pub is_array: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(start: usize, label: &str) -> SyntaxNode {
        SyntaxNode::new(
            Span::new(start, start.saturating_add(1)),
            NodeKind::Other {
                label: label.to_owned(),
            },
        )
    }

    #[test]
    fn preorder_visits_parents_before_children() {
        let tree = SyntaxNode::new(Span::new(0, 10), NodeKind::TranslationUnit).with_children(
            vec![
                leaf(1, "a").with_children(vec![leaf(2, "a1"), leaf(3, "a2")]),
                leaf(5, "b"),
            ],
        );

        let labels: Vec<_> = tree
            .preorder()
            .filter_map(|node| match &node.kind {
                NodeKind::Other { label } => Some(label.as_str()),
                _ => None,
            })
            .collect();

        assert_eq!(labels, vec!["a", "a1", "a2", "b"]);
        assert_eq!(tree.node_count(), 5);
    }

    #[test]
    fn function_reports_pointer_parameters() {
        let function = FunctionDecl {
            kind: FunctionKind::Free,
            name: "consume".to_owned(),
            return_type: Some(TypeDescriptor::value("void")),
            return_type_span: Some(Span::new(0, 5)),
            params: vec![ParamDecl {
                name: Some("w".to_owned()),
                ty: TypeDescriptor::pointer_to(TypeDescriptor::value("Widget")),
                type_span: Span::new(13, 21),
            }],
            signature_span: Span::new(0, 23),
        };
        assert!(function.mentions_pointers());
    }

    #[test]
    fn tree_round_trips_through_json() {
        let tree = SyntaxNode::new(Span::new(0, 4), NodeKind::TranslationUnit)
            .with_children(vec![leaf(0, "stmt")]);
        let json = serde_json::to_string(&tree).expect("serialize");
        let back: SyntaxNode = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, tree);
    }
}
