//! Declarator shape analysis for C++ declarations.
//!
//! C++ splits a declaration's type between the specifier sequence
//! (`const Widget`) and the declarator (`*w`, `(*f)(int)`, `a[4]`). These
//! helpers recombine the two into a [`TypeDescriptor`] and locate the byte
//! range of the type clause that a rewrite replaces.

use tree_sitter::Node;

use crate::types::TypeDescriptor;

use super::text::{children, collapse_whitespace, named_children, node_text};

/// Grammar kinds that terminate a declarator walk with a declared name.
const NAME_KINDS: &[&str] = &[
    "identifier",
    "field_identifier",
    "qualified_identifier",
    "destructor_name",
    "operator_name",
    "template_function",
    "operator_cast",
];

/// Type specifiers whose spelling cannot be reused as a template argument.
const OPAQUE_TYPE_KINDS: &[&str] = &["placeholder_type_specifier", "auto", "decltype"];

/// What a declarator adds on top of the specifier type.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct DeclaratorShape<'t> {
    /// The declared name, absent for abstract declarators.
    pub(crate) name: Option<Node<'t>>,
    /// Number of `*` levels before any compound declarator.
    pub(crate) pointer_depth: usize,
    /// True when arrays, references, functions or parentheses are involved.
    pub(crate) is_compound: bool,
}

/// Walks a declarator down to the declared name.
pub(crate) fn analyze(declarator: Node<'_>) -> DeclaratorShape<'_> {
    let mut shape = DeclaratorShape::default();
    let mut current = Some(declarator);
    while let Some(node) = current {
        let kind = node.kind();
        current = match kind {
            "pointer_declarator" | "abstract_pointer_declarator" => {
                shape.pointer_depth = shape.pointer_depth.saturating_add(1);
                node.child_by_field_name("declarator")
            }
            "init_declarator" => node.child_by_field_name("declarator"),
            "reference_declarator"
            | "abstract_reference_declarator"
            | "array_declarator"
            | "abstract_array_declarator"
            | "function_declarator"
            | "abstract_function_declarator"
            | "parenthesized_declarator"
            | "abstract_parenthesized_declarator" => {
                shape.is_compound = true;
                node.child_by_field_name("declarator")
                    .or_else(|| named_children(node).into_iter().last())
            }
            _ if NAME_KINDS.contains(&kind) => {
                shape.name = Some(node);
                None
            }
            _ => None,
        };
    }
    shape
}

/// The function part of a declarator such as `Widget *make(int n)`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FunctionShape<'t> {
    /// The `function_declarator` node.
    pub(crate) declarator: Node<'t>,
    /// The declared function name node.
    pub(crate) name: Node<'t>,
    /// Number of `*` levels applied to the return type.
    pub(crate) return_depth: usize,
    /// True when the return type is a reference.
    pub(crate) returns_reference: bool,
}

/// Finds the function declarator of a function declaration.
///
/// Returns `None` for variables, including function pointers, whose
/// function declarator wraps a parenthesised declarator instead of a name.
pub(crate) fn find_function(declarator: Node<'_>) -> Option<FunctionShape<'_>> {
    let mut return_depth = 0_usize;
    let mut returns_reference = false;
    let mut current = declarator;
    loop {
        match current.kind() {
            "pointer_declarator" => {
                return_depth = return_depth.saturating_add(1);
                current = current.child_by_field_name("declarator")?;
            }
            "reference_declarator" => {
                returns_reference = true;
                current = named_children(current).into_iter().last()?;
            }
            "function_declarator" => {
                let name = current.child_by_field_name("declarator")?;
                if !NAME_KINDS.contains(&name.kind()) {
                    return None;
                }
                return Some(FunctionShape {
                    declarator: current,
                    name,
                    return_depth,
                    returns_reference,
                });
            }
            _ => return None,
        }
    }
}

/// The specifier part of a declaration: qualifiers plus the type specifier.
#[derive(Debug, Clone)]
pub(crate) struct TypeClause {
    /// Byte offset of the first qualifier or type token.
    pub(crate) start: usize,
    /// Normalised spelling of the specifier type, e.g. `const Widget`.
    pub(crate) base: String,
    /// True when the spelling cannot stand in as a pointee type.
    pub(crate) opaque: bool,
}

impl TypeClause {
    /// Reads the type clause of a declaration-like node.
    ///
    /// Returns `None` when the node has no `type` field, as for
    /// constructors and destructors.
    pub(crate) fn of(owner: Node<'_>, source: &[u8]) -> Option<Self> {
        let ty = owner.child_by_field_name("type")?;
        let declarator_start = owner
            .child_by_field_name("declarator")
            .map_or(usize::MAX, |node| node.start_byte());

        let mut start = ty.start_byte();
        let mut before = Vec::new();
        let mut after = Vec::new();
        for child in children(owner) {
            if child.kind() != "type_qualifier" {
                continue;
            }
            if child.end_byte() <= ty.start_byte() {
                start = start.min(child.start_byte());
                before.push(node_text(child, source));
            } else if child.end_byte() <= declarator_start {
                after.push(node_text(child, source));
            }
        }

        let mut parts = before;
        parts.push(collapse_whitespace(&node_text(ty, source)));
        parts.extend(after);

        let opaque = OPAQUE_TYPE_KINDS.contains(&ty.kind())
            || ty.child_by_field_name("body").is_some();

        Some(Self {
            start,
            base: parts.join(" "),
            opaque,
        })
    }

    /// Combines the clause with a declarator shape into a semantic type.
    ///
    /// `spelled` is the written type clause, used for anything that is not a
    /// plain value or single pointer.
    pub(crate) fn declared_type(&self, shape: &DeclaratorShape<'_>, spelled: &str) -> TypeDescriptor {
        if self.opaque || shape.is_compound {
            return TypeDescriptor::value(collapse_whitespace(spelled));
        }
        match shape.pointer_depth {
            0 => TypeDescriptor::value(self.base.clone()),
            1 => TypeDescriptor::pointer_to(TypeDescriptor::value(self.base.clone())),
            _ => TypeDescriptor::value(collapse_whitespace(spelled)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::CppParser;

    fn with_first_declaration<R>(source: &str, check: impl FnOnce(Node<'_>, &[u8]) -> R) -> R {
        let mut parser = CppParser::new().expect("parser");
        let parsed = parser.parse(source.as_bytes()).expect("parse");
        let root = parsed.root_node();
        let declaration = named_children(root)
            .into_iter()
            .next()
            .expect("one declaration");
        check(declaration, parsed.source())
    }

    #[test]
    fn single_pointer_declarator_has_depth_one() {
        with_first_declaration("const Widget *w;", |decl, source| {
            let declarator = decl.child_by_field_name("declarator").expect("declarator");
            let shape = analyze(declarator);
            let clause = TypeClause::of(decl, source).expect("clause");
            assert_eq!(shape.pointer_depth, 1);
            assert!(!shape.is_compound);
            assert_eq!(clause.base, "const Widget");
            assert_eq!(clause.start, 0);
            let ty = clause.declared_type(&shape, "const Widget *");
            assert_eq!(ty.pointee().map(TypeDescriptor::spelling), Some("const Widget"));
        });
    }

    #[test]
    fn array_of_pointers_is_compound() {
        with_first_declaration("int *slots[4];", |decl, source| {
            let declarator = decl.child_by_field_name("declarator").expect("declarator");
            let shape = analyze(declarator);
            let clause = TypeClause::of(decl, source).expect("clause");
            assert!(shape.is_compound);
            assert!(!clause.declared_type(&shape, "int *").is_pointer());
        });
    }

    #[test]
    fn double_pointer_is_not_a_target() {
        with_first_declaration("int **grid;", |decl, source| {
            let declarator = decl.child_by_field_name("declarator").expect("declarator");
            let shape = analyze(declarator);
            let clause = TypeClause::of(decl, source).expect("clause");
            assert_eq!(shape.pointer_depth, 2);
            assert!(!clause.declared_type(&shape, "int **").is_pointer());
        });
    }

    #[test]
    fn function_pointer_variable_is_not_a_function() {
        with_first_declaration("int (*callback)(int);", |decl, _| {
            let declarator = decl.child_by_field_name("declarator").expect("declarator");
            assert!(find_function(declarator).is_none());
        });
    }

    #[test]
    fn pointer_returning_prototype_is_found() {
        with_first_declaration("Widget *make(int n);", |decl, _| {
            let declarator = decl.child_by_field_name("declarator").expect("declarator");
            let function = find_function(declarator).expect("function");
            assert_eq!(function.return_depth, 1);
            assert!(!function.returns_reference);
            assert_eq!(function.name.kind(), "identifier");
        });
    }
}
