//! Pattern classifiers deciding what, if anything, a node migrates to.
//!
//! Classification is a pure function of one node. It never looks at
//! parents, siblings or children, and it never fails: anything it does not
//! recognize is left verbatim.

use ownport_syntax::{
    DeleteExpr, Expr, FunctionDecl, FunctionKind, NewExpr, NodeKind, Span, SyntaxNode,
    TypeDescriptor, VarDecl, VarScope,
};

use crate::report::Observation;

/// Outcome of classifying one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict<'n> {
    /// The node is a rewrite target.
    Rewrite(Target<'n>),
    /// The node is understood but deliberately left unchanged.
    Recognized(Observation),
    /// The node matches no known pattern.
    Unrecognized,
}

/// A pointer-typed declaration slot whose type clause is replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerSlot<'n> {
    /// The pointed-to type.
    pub pointee: &'n TypeDescriptor,
    /// Range of the written type clause.
    pub type_span: Span,
    /// True when a declared name follows the clause.
    pub named: bool,
}

/// Initializer forms a migrated variable can wrap.
///
/// Both forms are re-emitted from the source bytes they cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Initializer {
    /// An integer literal, cast to the pointer type.
    Literal {
        /// Range of the literal.
        span: Span,
    },
    /// A reference to another name.
    Name {
        /// Range of the reference.
        span: Span,
    },
}

impl Initializer {
    /// Returns the range the wrapped initializer replaces.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Literal { span, .. } | Self::Name { span, .. } => *span,
        }
    }
}

/// A recognized rewrite target and the data its serializer needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target<'n> {
    /// Pointer parameters of a constructor.
    ConstructorParams(Vec<PointerSlot<'n>>),
    /// A pointer data member.
    Field(PointerSlot<'n>),
    /// A local pointer variable and its wrappable initializer.
    Variable {
        /// The declaration's type clause.
        slot: PointerSlot<'n>,
        /// Initializer to wrap, if it has a supported form.
        init: Option<Initializer>,
    },
    /// A function whose return type or parameters involve pointers.
    Signature(&'n FunctionDecl),
    /// A scalar `new` expression.
    Allocation {
        /// Allocated type.
        pointee: &'n TypeDescriptor,
        /// Range of the expression.
        span: Span,
    },
    /// A scalar `delete` of a named pointer.
    Deallocation {
        /// Type of the deleted object.
        pointee: &'n TypeDescriptor,
        /// Range of the deleted operand.
        operand: Span,
        /// Range of the expression.
        span: Span,
    },
    /// Assignment of literal zero to a named pointer.
    Reset {
        /// Range of the assigned pointer name.
        target: Span,
        /// Range of the assignment.
        span: Span,
    },
    /// A returned pointer name.
    Return {
        /// Type the returned pointer points to.
        pointee: &'n TypeDescriptor,
        /// Range of the returned expression.
        span: Span,
    },
}

/// Classifies a single node.
#[must_use]
pub fn classify(node: &SyntaxNode) -> Verdict<'_> {
    match &node.kind {
        NodeKind::Field(field) => field
            .ty
            .pointee()
            .map_or(Verdict::Unrecognized, |pointee| {
                Verdict::Rewrite(Target::Field(PointerSlot {
                    pointee,
                    type_span: field.type_span,
                    named: true,
                }))
            }),
        NodeKind::Variable(var) => classify_variable(node.span, var),
        NodeKind::Function(function) => classify_function(function),
        NodeKind::Allocation(new) => classify_allocation(node.span, new),
        NodeKind::Deallocation(delete) => classify_deallocation(node.span, delete),
        NodeKind::Assignment { lhs, rhs } => classify_assignment(node.span, lhs, rhs),
        NodeKind::Return { value: Some(value) } => classify_return(value),
        NodeKind::TranslationUnit
        | NodeKind::Record { .. }
        | NodeKind::Return { value: None }
        | NodeKind::Other { .. } => Verdict::Unrecognized,
    }
}

fn classify_variable(span: Span, var: &VarDecl) -> Verdict<'_> {
    let Some(pointee) = var.ty.pointee() else {
        return Verdict::Unrecognized;
    };
    if var.scope == VarScope::Global {
        return Verdict::Recognized(Observation::GlobalPointer {
            span,
            name: var.name.clone(),
        });
    }
    let init = var.init.as_ref().and_then(|init| match init.peeled() {
        Expr::Literal { span, .. } => Some(Initializer::Literal { span: *span }),
        Expr::NameRef { span, .. } => Some(Initializer::Name { span: *span }),
        _ => None,
    });
    Verdict::Rewrite(Target::Variable {
        slot: PointerSlot {
            pointee,
            type_span: var.type_span,
            named: true,
        },
        init,
    })
}

fn classify_function(function: &FunctionDecl) -> Verdict<'_> {
    match function.kind {
        FunctionKind::Constructor => {
            let slots: Vec<_> = function
                .params
                .iter()
                .filter_map(|param| {
                    param.ty.pointee().map(|pointee| PointerSlot {
                        pointee,
                        type_span: param.type_span,
                        named: param.name.is_some(),
                    })
                })
                .collect();
            if slots.is_empty() {
                Verdict::Unrecognized
            } else {
                Verdict::Rewrite(Target::ConstructorParams(slots))
            }
        }
        FunctionKind::Destructor => Verdict::Unrecognized,
        FunctionKind::Free | FunctionKind::Method if function.mentions_pointers() => {
            Verdict::Rewrite(Target::Signature(function))
        }
        FunctionKind::Free | FunctionKind::Method => Verdict::Unrecognized,
    }
}

fn classify_allocation(span: Span, new: &NewExpr) -> Verdict<'_> {
    if new.is_array {
        let length = match new.array_length.as_ref().map(Expr::peeled) {
            Some(Expr::Literal { value, .. }) => *value,
            _ => None,
        };
        return Verdict::Recognized(Observation::ArrayAllocation { span, length });
    }
    Verdict::Rewrite(Target::Allocation {
        pointee: &new.ty,
        span,
    })
}

fn classify_deallocation(span: Span, delete: &DeleteExpr) -> Verdict<'_> {
    if delete.is_array {
        return Verdict::Recognized(Observation::ArrayDeallocation { span });
    }
    let operand = delete.argument.peeled();
    let ty = match operand {
        Expr::NameRef { ty, .. } | Expr::MemberRef { ty, .. } => ty,
        _ => return Verdict::Unrecognized,
    };
    ty.pointee().map_or(Verdict::Unrecognized, |pointee| {
        Verdict::Rewrite(Target::Deallocation {
            pointee,
            operand: operand.span(),
            span,
        })
    })
}

fn classify_assignment<'n>(span: Span, lhs: &'n Expr, rhs: &'n Expr) -> Verdict<'n> {
    let Expr::NameRef {
        name,
        ty,
        span: target,
    } = lhs
    else {
        return Verdict::Unrecognized;
    };
    if !ty.is_pointer() {
        return Verdict::Unrecognized;
    }
    if let Expr::NameRef { name: source, .. } = rhs {
        return Verdict::Recognized(Observation::NameAssignment {
            span,
            lhs: name.clone(),
            rhs: source.clone(),
        });
    }
    match rhs.peeled() {
        Expr::Literal { value: Some(0), .. } => Verdict::Rewrite(Target::Reset {
            target: *target,
            span,
        }),
        Expr::Literal { text, .. } => Verdict::Recognized(Observation::NonzeroPointerLiteral {
            span,
            name: name.clone(),
            literal: text.clone(),
        }),
        _ => Verdict::Unrecognized,
    }
}

fn classify_return(value: &Expr) -> Verdict<'_> {
    let Expr::NameRef { ty, .. } = value.peeled() else {
        return Verdict::Unrecognized;
    };
    ty.pointee().map_or(Verdict::Unrecognized, |pointee| {
        Verdict::Rewrite(Target::Return {
            pointee,
            span: value.span(),
        })
    })
}
