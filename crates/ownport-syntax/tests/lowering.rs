//! End-to-end tests lowering C++ sources into typed syntax trees.
//!
//! These tests drive the public provider API and check the shapes, spans
//! and types the migration engine relies on.

use rstest::rstest;

use ownport_syntax::{
    CppProvider, Expr, FunctionDecl, FunctionKind, JsonProvider, NodeKind, Span, SyntaxError,
    SyntaxNode, SyntaxProvider, VarDecl, VarScope,
};

fn lower(source: &str) -> SyntaxNode {
    let mut provider = CppProvider::new().unwrap_or_else(|err| panic!("provider: {err}"));
    provider
        .provide(source.as_bytes())
        .unwrap_or_else(|err| panic!("lower: {err}"))
}

/// Span of the first occurrence of `needle` in `source`.
fn span_of(source: &str, needle: &str) -> Span {
    let start = source
        .find(needle)
        .unwrap_or_else(|| panic!("`{needle}` not in source"));
    Span::new(start, start + needle.len())
}

fn variables(tree: &SyntaxNode) -> Vec<VarDecl> {
    tree.preorder()
        .filter_map(|node| match &node.kind {
            NodeKind::Variable(var) => Some(var.clone()),
            _ => None,
        })
        .collect()
}

fn functions(tree: &SyntaxNode) -> Vec<FunctionDecl> {
    tree.preorder()
        .filter_map(|node| match &node.kind {
            NodeKind::Function(function) => Some(function.clone()),
            _ => None,
        })
        .collect()
}

fn first_of<T>(tree: &SyntaxNode, pick: impl Fn(&NodeKind) -> Option<T>) -> T {
    tree.preorder()
        .find_map(|node| pick(&node.kind))
        .unwrap_or_else(|| panic!("no matching node"))
}

// =============================================================================
// Declarations
// =============================================================================

#[test]
fn field_type_clause_ends_at_the_name() {
    let source = "struct Node {\n    Node *next;\n    int value;\n};\n";
    let tree = lower(source);

    let fields: Vec<_> = tree
        .preorder()
        .filter_map(|node| match &node.kind {
            NodeKind::Field(field) => Some(field.clone()),
            _ => None,
        })
        .collect();

    let [next, value] = fields.as_slice() else {
        panic!("expected two fields, got {}", fields.len());
    };
    assert_eq!(next.name, "next");
    assert_eq!(next.type_span, span_of(source, "Node *"));
    assert_eq!(next.ty.pointee().map(|ty| ty.spelling()), Some("Node"));
    assert!(!value.ty.is_pointer());
}

#[test]
fn variables_know_where_they_live() {
    let source = "int *g = 0;\nvoid f() {\n    int *p = new int(4);\n}\n";
    let tree = lower(source);
    let vars = variables(&tree);

    let [global, local] = vars.as_slice() else {
        panic!("expected two variables, got {}", vars.len());
    };
    assert_eq!(global.scope, VarScope::Global);
    assert!(global.init.as_ref().is_some_and(Expr::is_zero_literal));
    assert_eq!(local.scope, VarScope::Local);
    let local_start = span_of(source, "int *p").start;
    assert_eq!(local.type_span, Span::new(local_start, local_start + "int *".len()));
    assert!(matches!(local.init, Some(Expr::Unknown { .. })));

    let allocation = first_of(&tree, |kind| match kind {
        NodeKind::Allocation(new) => Some(new.clone()),
        _ => None,
    });
    assert_eq!(allocation.ty.spelling(), "int");
    assert!(!allocation.is_array);
}

#[rstest]
#[case("void f() { auto *p = new int; }")]
#[case("void f() { int **pp = 0; }")]
#[case("void f() { int *slots[4]; }")]
#[case("void f() { int *&ref = alias(); }")]
fn unsupported_declarators_are_not_pointers(#[case] source: &str) {
    let tree = lower(source);
    let vars = variables(&tree);
    let [var] = vars.as_slice() else {
        panic!("expected one variable, got {}", vars.len());
    };
    assert!(!var.ty.is_pointer());
}

// =============================================================================
// Functions
// =============================================================================

#[test]
fn free_function_signature_is_described() {
    let source = "Widget *make(int n, Widget *seed) { return seed; }";
    let tree = lower(source);
    let function = functions(&tree)
        .into_iter()
        .next()
        .unwrap_or_else(|| panic!("no function"));

    assert_eq!(function.kind, FunctionKind::Free);
    assert_eq!(function.name, "make");
    assert_eq!(function.return_type_span, Some(span_of(source, "Widget *")));
    assert!(function.return_type.as_ref().is_some_and(|ty| ty.is_pointer()));
    assert_eq!(
        function.signature_span,
        span_of(source, "Widget *make(int n, Widget *seed)")
    );

    let [count, seed] = function.params.as_slice() else {
        panic!("expected two parameters");
    };
    assert!(!count.ty.is_pointer());
    assert_eq!(seed.name.as_deref(), Some("seed"));
    let seed_start = span_of(source, "Widget *seed").start;
    assert_eq!(seed.type_span, Span::new(seed_start, seed_start + "Widget *".len()));

    let value = first_of(&tree, |kind| match kind {
        NodeKind::Return { value } => value.clone(),
        _ => None,
    });
    assert!(matches!(value, Expr::ImplicitConversion { .. }));
    assert!(matches!(value.peeled(), Expr::NameRef { name, .. } if name == "seed"));
}

#[test]
fn special_members_are_classified() {
    let source = "class Holder {\npublic:\n    Holder(int *p) : data(p) {}\n    \
                  ~Holder() { delete data; }\nprivate:\n    int *data;\n};\n";
    let tree = lower(source);
    let kinds: Vec<_> = functions(&tree).into_iter().map(|f| f.kind).collect();
    assert_eq!(kinds, vec![FunctionKind::Constructor, FunctionKind::Destructor]);

    let constructor = functions(&tree)
        .into_iter()
        .next()
        .unwrap_or_else(|| panic!("no constructor"));
    assert!(constructor.return_type.is_none());
    assert!(constructor.params.iter().all(|param| param.ty.is_pointer()));

    let delete = first_of(&tree, |kind| match kind {
        NodeKind::Deallocation(delete) => Some(delete.clone()),
        _ => None,
    });
    assert!(!delete.is_array);
    assert!(matches!(
        delete.argument.peeled(),
        Expr::MemberRef { member, ty, .. } if member == "data" && ty.is_pointer()
    ));
}

#[test]
fn out_of_line_constructors_of_unseen_classes_are_constructors() {
    let source = "Holder::Holder(Item *item) : item_(item) {}\nHolder::~Holder() {}\n";
    let tree = lower(source);
    let kinds: Vec<_> = functions(&tree).into_iter().map(|f| f.kind).collect();

    assert_eq!(kinds, vec![FunctionKind::Constructor, FunctionKind::Destructor]);
}

#[test]
fn qualified_free_functions_are_not_constructors() {
    let source = "Item *factory::build(Item *seed) { return seed; }";
    let function = functions(&lower(source))
        .into_iter()
        .next()
        .unwrap_or_else(|| panic!("no function"));

    assert_eq!(function.kind, FunctionKind::Free);
}

#[test]
fn out_of_class_methods_see_their_fields() {
    let source = "struct S { int *m; int *get(); };\nint *S::get() { return m; }\n";
    let tree = lower(source);
    let methods = functions(&tree);

    let [prototype, definition] = methods.as_slice() else {
        panic!("expected two methods, got {}", methods.len());
    };
    assert_eq!(prototype.kind, FunctionKind::Method);
    assert_eq!(definition.kind, FunctionKind::Method);
    assert_eq!(definition.name, "S::get");

    let value = first_of(&tree, |kind| match kind {
        NodeKind::Return { value } => value.clone(),
        _ => None,
    });
    assert!(matches!(value.peeled(), Expr::MemberRef { text, .. } if text == "m"));
}

// =============================================================================
// Statements
// =============================================================================

#[test]
fn array_forms_are_flagged() {
    let source = "void f() { int *a = new int[8]; delete[] a; }";
    let tree = lower(source);

    let allocation = first_of(&tree, |kind| match kind {
        NodeKind::Allocation(new) => Some(new.clone()),
        _ => None,
    });
    assert!(allocation.is_array);
    assert!(matches!(
        allocation.array_length,
        Some(Expr::Literal { value: Some(8), .. })
    ));

    let delete = first_of(&tree, |kind| match kind {
        NodeKind::Deallocation(delete) => Some(delete.clone()),
        _ => None,
    });
    assert!(delete.is_array);
}

#[test]
fn member_access_through_pointer_is_typed() {
    let source = "struct Node { Node *next; };\nvoid f(Node *n) { n->next = 0; }\n";
    let tree = lower(source);

    let (lhs, rhs) = first_of(&tree, |kind| match kind {
        NodeKind::Assignment { lhs, rhs } => Some((lhs.clone(), rhs.clone())),
        _ => None,
    });
    assert!(matches!(
        lhs,
        Expr::MemberRef { ref text, ref ty, .. } if text == "n->next" && ty.is_pointer()
    ));
    assert!(rhs.is_zero_literal());
}

#[test]
fn compound_assignment_is_not_an_assignment_node() {
    let tree = lower("void f(int n) { n += 1; }");
    assert!(
        !tree
            .preorder()
            .any(|node| matches!(node.kind, NodeKind::Assignment { .. }))
    );
}

// =============================================================================
// Unhappy paths
// =============================================================================

#[test]
fn broken_source_is_rejected_in_strict_mode() {
    let mut provider = CppProvider::new().unwrap_or_else(|err| panic!("provider: {err}"));
    let err = provider
        .provide(b"void f() {\n    int *p = ;\n}\n")
        .err()
        .unwrap_or_else(|| panic!("expected a parse error"));

    assert!(matches!(err, SyntaxError::ParseError { .. }));
}

#[test]
fn json_tree_must_fit_the_source() {
    let document = serde_json::to_string(&lower("int *g = 0;"))
        .unwrap_or_else(|err| panic!("serialize: {err}"));
    let mut provider = JsonProvider::new(document);

    let replayed = provider
        .provide(b"int *g = 0;")
        .unwrap_or_else(|err| panic!("replay: {err}"));
    assert_eq!(variables(&replayed).len(), 1);

    assert!(matches!(
        provider.provide(b"int"),
        Err(SyntaxError::SourceMismatch { .. })
    ));
}
