//! Lowering of Tree-sitter C++ parse trees into typed syntax trees.
//!
//! The lowering walks the concrete tree once, keeping lexical scopes so that
//! name references carry the type of the declaration they resolve to.
//! Constructs without a dedicated [`NodeKind`] either become
//! [`NodeKind::Other`] containers (statements and definitions) or are
//! flattened away, leaving only the nested nodes they contain.

use std::mem;

use tree_sitter::Node;

use crate::expr::{Expr, parse_integer_literal};
use crate::node::{
    DeleteExpr, FieldDecl, FunctionDecl, FunctionKind, NewExpr, NodeKind, ParamDecl, SyntaxNode,
    VarDecl, VarScope,
};
use crate::span::Span;
use crate::types::TypeDescriptor;

use super::declarator::{DeclaratorShape, FunctionShape, TypeClause, analyze, find_function};
use super::scope::{ClassTable, Scopes, is_record};
use super::text::{
    children, collapse_whitespace, field_children, named_children, node_text, simple_type_name,
    slice_text,
};

/// Grammar kinds that open a block scope.
const SCOPE_KINDS: &[&str] = &[
    "compound_statement",
    "for_statement",
    "for_range_loop",
    "if_statement",
    "while_statement",
    "do_statement",
    "switch_statement",
    "catch_clause",
];

/// Member lists kept as containers even though their kind names no statement.
const CONTAINER_KINDS: &[&str] = &["declaration_list", "field_declaration_list"];

const PARAMETER_KINDS: &[&str] = &["parameter_declaration", "optional_parameter_declaration"];

/// Lowers a parsed translation unit.
pub(crate) fn lower(root: Node<'_>, source: &[u8]) -> SyntaxNode {
    let mut lowerer = Lowerer::new(root, source);
    let children = lowerer.lower_children(root);
    SyntaxNode::new(Span::new(0, source.len()), NodeKind::TranslationUnit).with_children(children)
}

/// How an expression is used by its parent.
#[derive(Debug, Clone, Copy)]
enum Position<'a> {
    /// Written to; no conversions apply.
    Target,
    /// Right-hand side of an assignment to a target of the given type.
    Assigned(Option<&'a TypeDescriptor>),
    /// Read as a value, converted to the given type where one is known.
    Loaded(Option<&'a TypeDescriptor>),
}

struct Lowerer<'s> {
    source: &'s [u8],
    classes: ClassTable,
    scopes: Scopes,
    current_class: Option<String>,
    in_record_body: bool,
    return_types: Vec<Option<TypeDescriptor>>,
}

impl<'s> Lowerer<'s> {
    fn new(root: Node<'_>, source: &'s [u8]) -> Self {
        let mut scopes = Scopes::default();
        scopes.push();
        Self {
            source,
            classes: ClassTable::collect(root, source),
            scopes,
            current_class: None,
            in_record_body: false,
            return_types: Vec::new(),
        }
    }

    fn lower_children(&mut self, node: Node<'_>) -> Vec<SyntaxNode> {
        let mut lowered = Vec::new();
        for child in named_children(node) {
            lowered.extend(self.lower_node(child));
        }
        lowered
    }

    fn lower_node(&mut self, node: Node<'_>) -> Vec<SyntaxNode> {
        let kind = node.kind();
        match kind {
            "function_definition" => self.lower_function_definition(node),
            "declaration" => self.lower_declaration(node),
            "field_declaration" => self.lower_field_declaration(node),
            "return_statement" => vec![self.lower_return(node)],
            "new_expression" => vec![self.lower_new(node)],
            "delete_expression" => vec![self.lower_delete(node)],
            "assignment_expression" => self.lower_assignment(node),
            "lambda_expression" => self.lower_lambda(node),
            _ if PARAMETER_KINDS.contains(&kind) => self.lower_parameter(node).1,
            _ if is_record(kind) => self.lower_record(node),
            _ if SCOPE_KINDS.contains(&kind) => {
                self.scopes.push();
                let lowered = self.lower_generic(node);
                self.scopes.pop();
                lowered
            }
            _ => self.lower_generic(node),
        }
    }

    fn lower_generic(&mut self, node: Node<'_>) -> Vec<SyntaxNode> {
        let children = self.lower_children(node);
        let kind = node.kind();
        if kind.ends_with("_statement")
            || kind.ends_with("_definition")
            || CONTAINER_KINDS.contains(&kind)
        {
            vec![other(node, children)]
        } else {
            children
        }
    }

    fn lower_record(&mut self, node: Node<'_>) -> Vec<SyntaxNode> {
        let Some(body) = node.child_by_field_name("body") else {
            return Vec::new();
        };
        let name = node
            .child_by_field_name("name")
            .map(|name| node_text(name, self.source))
            .unwrap_or_default();
        let class = simple_type_name(&name).to_owned();

        let saved_class = mem::replace(
            &mut self.current_class,
            (!class.is_empty()).then_some(class),
        );
        let saved_body = mem::replace(&mut self.in_record_body, true);
        let members = self.lower_children(body);
        self.current_class = saved_class;
        self.in_record_body = saved_body;

        vec![SyntaxNode::new(span_of(node), NodeKind::Record { name }).with_children(members)]
    }

    /// Lowers a record defined inline in the type position of a declaration.
    fn lower_type_definition(&mut self, owner: Node<'_>) -> Vec<SyntaxNode> {
        owner
            .child_by_field_name("type")
            .filter(|ty| is_record(ty.kind()))
            .map(|ty| self.lower_record(ty))
            .unwrap_or_default()
    }

    fn lower_field_declaration(&mut self, node: Node<'_>) -> Vec<SyntaxNode> {
        let source = self.source;
        let declarators = field_children(node, "declarator");
        let functions: Vec<_> = declarators.iter().filter_map(|d| find_function(*d)).collect();
        if !functions.is_empty() {
            let mut lowered = self.lower_type_definition(node);
            for function in functions {
                lowered.extend(self.lower_function(node, function, false));
            }
            return lowered;
        }

        let mut children = self.lower_type_definition(node);
        for value in field_children(node, "default_value") {
            children.extend(self.lower_node(value));
        }

        let field = match (declarators.as_slice(), TypeClause::of(node, source)) {
            ([declarator], Some(clause)) => {
                let shape = analyze(*declarator);
                shape.name.map(|name| {
                    let spelled = slice_text(source, clause.start, name.start_byte());
                    FieldDecl {
                        name: node_text(name, source),
                        ty: clause.declared_type(&shape, &spelled),
                        type_span: Span::new(clause.start, name.start_byte()),
                    }
                })
            }
            _ => None,
        };

        let kind = field.map_or_else(
            || NodeKind::Other {
                label: node.kind().to_owned(),
            },
            NodeKind::Field,
        );
        vec![SyntaxNode::new(span_of(node), kind).with_children(children)]
    }

    fn lower_declaration(&mut self, node: Node<'_>) -> Vec<SyntaxNode> {
        let source = self.source;
        let declarators = field_children(node, "declarator");
        let functions: Vec<_> = declarators.iter().filter_map(|d| find_function(*d)).collect();
        if !functions.is_empty() {
            let mut lowered = self.lower_type_definition(node);
            for function in functions {
                lowered.extend(self.lower_function(node, function, false));
            }
            return lowered;
        }

        let clause = TypeClause::of(node, source);
        let scope = if self.return_types.is_empty() {
            VarScope::Global
        } else {
            VarScope::Local
        };

        let mut children = self.lower_type_definition(node);
        let mut variables = Vec::new();
        for declarator in &declarators {
            let shape = analyze(*declarator);
            let (Some(name), Some(clause)) = (shape.name, clause.as_ref()) else {
                children.extend(self.lower_node(*declarator));
                continue;
            };
            let spelled = slice_text(source, clause.start, name.start_byte());
            let ty = clause.declared_type(&shape, &spelled);
            let name_text = node_text(name, source);
            self.scopes.declare(name_text.clone(), ty.clone());

            let value = if declarator.kind() == "init_declarator" {
                declarator.child_by_field_name("value")
            } else {
                None
            };
            let init = value
                .filter(|value| !matches!(value.kind(), "argument_list" | "initializer_list"))
                .map(|value| self.lower_expr(value, Position::Loaded(Some(&ty))));
            if let Some(value) = value {
                children.extend(self.lower_node(value));
            }

            variables.push(VarDecl {
                name: name_text,
                ty,
                type_span: Span::new(clause.start, name.start_byte()),
                init,
                scope,
            });
        }

        let kind = match (declarators.len(), variables.pop()) {
            (1, Some(variable)) => NodeKind::Variable(variable),
            _ => NodeKind::Other {
                label: node.kind().to_owned(),
            },
        };
        vec![SyntaxNode::new(span_of(node), kind).with_children(children)]
    }

    fn lower_function_definition(&mut self, node: Node<'_>) -> Vec<SyntaxNode> {
        let Some(function) = node
            .child_by_field_name("declarator")
            .and_then(find_function)
        else {
            return self.lower_generic(node);
        };
        let mut lowered = self.lower_type_definition(node);
        lowered.extend(self.lower_function(node, function, true));
        lowered
    }

    fn lower_function(
        &mut self,
        owner: Node<'_>,
        function: FunctionShape<'_>,
        definition: bool,
    ) -> Vec<SyntaxNode> {
        let source = self.source;
        let clause = TypeClause::of(owner, source);

        let mut scope_name = None;
        let mut base_name = function.name;
        while base_name.kind() == "qualified_identifier" {
            scope_name = base_name.child_by_field_name("scope");
            match base_name.child_by_field_name("name") {
                Some(inner) => base_name = inner,
                None => break,
            }
        }
        let owner_class = match scope_name {
            Some(scope) => {
                let text = node_text(scope, source);
                let class = simple_type_name(&text);
                self.classes.contains(class).then(|| class.to_owned())
            }
            None if self.in_record_body => self.current_class.clone(),
            None => None,
        };
        let is_member = owner_class.is_some() || self.in_record_body;
        let names_own_scope = scope_name.is_some_and(|scope| {
            simple_type_name(&node_text(scope, source)) == node_text(base_name, source)
        });

        let kind = if base_name.kind() == "destructor_name" {
            FunctionKind::Destructor
        } else if clause.is_none()
            && (is_member || names_own_scope)
            && base_name.kind() != "operator_cast"
        {
            FunctionKind::Constructor
        } else if is_member {
            FunctionKind::Method
        } else {
            FunctionKind::Free
        };

        let name_start = function.name.start_byte();
        let return_type = clause.as_ref().map(|clause| {
            let shape = DeclaratorShape {
                name: Some(function.name),
                pointer_depth: function.return_depth,
                is_compound: function.returns_reference,
            };
            clause.declared_type(&shape, &slice_text(source, clause.start, name_start))
        });
        let return_type_span = clause
            .as_ref()
            .map(|clause| Span::new(clause.start, name_start));

        let parameters = function.declarator.child_by_field_name("parameters");
        let signature_start = clause.as_ref().map_or(name_start, |clause| clause.start);
        let signature_end = parameters.map_or(function.declarator.end_byte(), |list| list.end_byte());

        self.scopes.push();
        let (params, mut children) = self.lower_parameters(parameters);
        if definition {
            children.extend(self.lower_body(owner, return_type.clone(), owner_class));
        }
        self.scopes.pop();

        let decl = FunctionDecl {
            kind,
            name: node_text(function.name, source),
            return_type,
            return_type_span,
            params,
            signature_span: Span::new(signature_start, signature_end),
        };
        vec![SyntaxNode::new(span_of(owner), NodeKind::Function(decl)).with_children(children)]
    }

    /// Lowers everything in a definition except its type and declarator.
    fn lower_body(
        &mut self,
        owner: Node<'_>,
        return_type: Option<TypeDescriptor>,
        owner_class: Option<String>,
    ) -> Vec<SyntaxNode> {
        let skipped = [
            owner.child_by_field_name("type"),
            owner.child_by_field_name("declarator"),
        ];
        let saved_class = mem::replace(&mut self.current_class, owner_class);
        let saved_body = mem::replace(&mut self.in_record_body, false);
        self.return_types.push(return_type);

        let mut lowered = Vec::new();
        for child in named_children(owner) {
            if !skipped.contains(&Some(child)) {
                lowered.extend(self.lower_node(child));
            }
        }

        self.return_types.pop();
        self.current_class = saved_class;
        self.in_record_body = saved_body;
        lowered
    }

    fn lower_parameters(&mut self, list: Option<Node<'_>>) -> (Vec<ParamDecl>, Vec<SyntaxNode>) {
        let mut params = Vec::new();
        let mut defaults = Vec::new();
        let Some(list) = list else {
            return (params, defaults);
        };
        for child in children(list) {
            match child.kind() {
                "(" | ")" | "," | "comment" => {}
                kind if PARAMETER_KINDS.contains(&kind) => {
                    let (param, lowered) = self.lower_parameter(child);
                    params.push(param);
                    defaults.extend(lowered);
                }
                _ => params.push(self.verbatim_parameter(child)),
            }
        }
        (params, defaults)
    }

    /// Lowers one parameter, declaring its name in the innermost scope.
    fn lower_parameter(&mut self, node: Node<'_>) -> (ParamDecl, Vec<SyntaxNode>) {
        let source = self.source;
        let Some(clause) = TypeClause::of(node, source) else {
            return (self.verbatim_parameter(node), Vec::new());
        };
        let declarator = node.child_by_field_name("declarator");
        let shape = declarator.map_or_else(DeclaratorShape::default, analyze);
        let type_end = match shape.name {
            Some(name) => name.start_byte(),
            None => declarator
                .or_else(|| node.child_by_field_name("type"))
                .map_or(node.end_byte(), |part| part.end_byte()),
        };
        let spelled = slice_text(source, clause.start, type_end);
        let ty = clause.declared_type(&shape, &spelled);
        let name = shape.name.map(|name| node_text(name, source));
        if let Some(name) = &name {
            self.scopes.declare(name.clone(), ty.clone());
        }

        let mut defaults = Vec::new();
        for value in field_children(node, "default_value") {
            defaults.extend(self.lower_node(value));
        }

        let param = ParamDecl {
            name,
            ty,
            type_span: Span::new(clause.start, type_end),
        };
        (param, defaults)
    }

    fn verbatim_parameter(&self, node: Node<'_>) -> ParamDecl {
        ParamDecl {
            name: None,
            ty: TypeDescriptor::value(collapse_whitespace(&node_text(node, self.source))),
            type_span: span_of(node),
        }
    }

    fn lower_lambda(&mut self, node: Node<'_>) -> Vec<SyntaxNode> {
        self.scopes.push();
        self.return_types.push(None);
        let saved_body = mem::replace(&mut self.in_record_body, false);
        let lowered = self.lower_children(node);
        self.in_record_body = saved_body;
        self.return_types.pop();
        self.scopes.pop();
        lowered
    }

    fn lower_return(&mut self, node: Node<'_>) -> SyntaxNode {
        let operand = operands(node).into_iter().next();
        let expected = self.return_types.last().cloned().flatten();
        let value =
            operand.map(|operand| self.lower_expr(operand, Position::Loaded(expected.as_ref())));
        let children = operand
            .map(|operand| self.lower_node(operand))
            .unwrap_or_default();
        SyntaxNode::new(span_of(node), NodeKind::Return { value }).with_children(children)
    }

    fn lower_new(&mut self, node: Node<'_>) -> SyntaxNode {
        let children = self.lower_children(node);
        let ty_node = node.child_by_field_name("type");
        let (Some(ty_node), None) = (ty_node, node.child_by_field_name("placement")) else {
            return other(node, children);
        };

        let declarator = node.child_by_field_name("declarator");
        let array_length = declarator
            .and_then(|declarator| {
                declarator
                    .child_by_field_name("length")
                    .or_else(|| operands(declarator).into_iter().next())
            })
            .map(|length| self.lower_expr(length, Position::Target));

        let new = NewExpr {
            ty: TypeDescriptor::value(collapse_whitespace(&node_text(ty_node, self.source))),
            array_length,
            is_array: declarator.is_some(),
        };
        SyntaxNode::new(span_of(node), NodeKind::Allocation(new)).with_children(children)
    }

    fn lower_delete(&mut self, node: Node<'_>) -> SyntaxNode {
        let is_array = children(node).iter().any(|child| child.kind() == "[");
        let Some(operand) = operands(node).into_iter().last() else {
            return other(node, Vec::new());
        };
        let argument = self.lower_expr(operand, Position::Loaded(None));
        let delete = DeleteExpr { argument, is_array };
        SyntaxNode::new(span_of(node), NodeKind::Deallocation(delete))
            .with_children(self.lower_node(operand))
    }

    fn lower_assignment(&mut self, node: Node<'_>) -> Vec<SyntaxNode> {
        let is_plain = node
            .child_by_field_name("operator")
            .is_some_and(|operator| operator.kind() == "=");
        let (true, Some(left), Some(right)) = (
            is_plain,
            node.child_by_field_name("left"),
            node.child_by_field_name("right"),
        ) else {
            return self.lower_generic(node);
        };

        let lhs = self.lower_expr(left, Position::Target);
        let rhs = self.lower_expr(right, Position::Assigned(lhs.ty()));
        let mut children = self.lower_node(left);
        children.extend(self.lower_node(right));
        vec![SyntaxNode::new(span_of(node), NodeKind::Assignment { lhs, rhs }).with_children(children)]
    }

    fn lower_expr(&self, node: Node<'_>, position: Position<'_>) -> Expr {
        let span = span_of(node);
        let expr = match node.kind() {
            "parenthesized_expression" => match operands(node).into_iter().next() {
                Some(inner) => return self.lower_expr(inner, position),
                None => Expr::Unknown { span },
            },
            "number_literal" => {
                let text = node_text(node, self.source);
                match parse_integer_literal(&text) {
                    Some(value) => Expr::Literal {
                        span,
                        text,
                        value: Some(value),
                        ty: TypeDescriptor::value("int"),
                    },
                    None => Expr::Unknown { span },
                }
            }
            "identifier" => self.resolve_name(node),
            "field_expression" => self.resolve_member(node),
            _ => Expr::Unknown { span },
        };
        convert(expr, position)
    }

    fn resolve_name(&self, node: Node<'_>) -> Expr {
        let span = span_of(node);
        let name = node_text(node, self.source);
        if let Some(ty) = self.scopes.lookup(&name) {
            return Expr::NameRef {
                span,
                ty: ty.clone(),
                name,
            };
        }
        let field = self
            .current_class
            .as_deref()
            .and_then(|class| self.classes.field(class, &name));
        match field {
            Some(ty) => Expr::MemberRef {
                span,
                text: name.clone(),
                member: name,
                ty: ty.clone(),
            },
            None => Expr::NameRef {
                span,
                name,
                ty: TypeDescriptor::unresolved(),
            },
        }
    }

    fn resolve_member(&self, node: Node<'_>) -> Expr {
        let member = node
            .child_by_field_name("field")
            .map(|field| node_text(field, self.source))
            .unwrap_or_default();
        let ty = node
            .child_by_field_name("argument")
            .and_then(|object| self.class_of(object))
            .and_then(|class| self.classes.field(&class, &member))
            .cloned()
            .unwrap_or_else(TypeDescriptor::unresolved);
        Expr::MemberRef {
            span: span_of(node),
            text: node_text(node, self.source),
            member,
            ty,
        }
    }

    /// Names the class an object expression refers to, if it is known.
    fn class_of(&self, object: Node<'_>) -> Option<String> {
        if object.kind() == "this" {
            return self.current_class.clone();
        }
        let expr = self.lower_expr(object, Position::Target);
        let ty = expr.ty()?;
        let class = simple_type_name(ty.pointee().unwrap_or(ty).spelling());
        self.classes.contains(class).then(|| class.to_owned())
    }
}

/// Applies the implicit conversions the type system inserts at `position`.
fn convert(expr: Expr, position: Position<'_>) -> Expr {
    let is_literal = matches!(expr, Expr::Literal { .. });
    match position {
        Position::Target => expr,
        Position::Assigned(target) | Position::Loaded(target) if is_literal => {
            match target.filter(|ty| ty.is_pointer()) {
                Some(ty) => expr.converted_to(ty.clone()),
                None => expr,
            }
        }
        Position::Assigned(_) => expr,
        Position::Loaded(_) => match expr.ty().cloned() {
            Some(ty) => expr.converted_to(ty),
            None => expr,
        },
    }
}

fn other(node: Node<'_>, children: Vec<SyntaxNode>) -> SyntaxNode {
    SyntaxNode::new(
        span_of(node),
        NodeKind::Other {
            label: node.kind().to_owned(),
        },
    )
    .with_children(children)
}

/// Named children that are not comments.
fn operands(node: Node<'_>) -> Vec<Node<'_>> {
    named_children(node)
        .into_iter()
        .filter(|child| child.kind() != "comment")
        .collect()
}

fn span_of(node: Node<'_>) -> Span {
    Span::new(node.start_byte(), node.end_byte())
}
