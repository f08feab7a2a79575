//! Lexical name resolution for the C++ lowering.
//!
//! Resolution is purely syntactic: names are looked up in enclosing block
//! scopes, then in the fields of the enclosing class. There is no overload
//! resolution, no template instantiation and no alias analysis.

use std::collections::HashMap;

use tree_sitter::Node;

use crate::types::TypeDescriptor;

use super::declarator::{TypeClause, analyze, find_function};
use super::text::{field_children, named_children, node_text, simple_type_name, slice_text};

/// Stack of block scopes mapping names to declared types.
#[derive(Debug, Default)]
pub(crate) struct Scopes {
    frames: Vec<HashMap<String, TypeDescriptor>>,
}

impl Scopes {
    pub(crate) fn push(&mut self) {
        self.frames.push(HashMap::new());
    }

    pub(crate) fn pop(&mut self) {
        self.frames.pop();
    }

    pub(crate) fn declare(&mut self, name: impl Into<String>, ty: TypeDescriptor) {
        if self.frames.is_empty() {
            self.push();
        }
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name.into(), ty);
        }
    }

    pub(crate) fn lookup(&self, name: &str) -> Option<&TypeDescriptor> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }
}

/// Field types of every class defined in the translation unit.
///
/// Collected up front because member functions may use fields declared
/// later in the class body.
#[derive(Debug, Default)]
pub(crate) struct ClassTable {
    classes: HashMap<String, HashMap<String, TypeDescriptor>>,
}

impl ClassTable {
    pub(crate) fn collect(root: Node<'_>, source: &[u8]) -> Self {
        let mut table = Self::default();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if is_record(node.kind()) {
                table.record(node, source);
            }
            stack.extend(named_children(node));
        }
        table
    }

    fn record(&mut self, node: Node<'_>, source: &[u8]) {
        let (Some(name), Some(body)) = (
            node.child_by_field_name("name"),
            node.child_by_field_name("body"),
        ) else {
            return;
        };
        let class = simple_type_name(&node_text(name, source)).to_owned();
        let fields = self.classes.entry(class).or_default();
        for member in named_children(body) {
            if member.kind() != "field_declaration" {
                continue;
            }
            let Some(clause) = TypeClause::of(member, source) else {
                continue;
            };
            for declarator in field_children(member, "declarator") {
                if find_function(declarator).is_some() {
                    continue;
                }
                let shape = analyze(declarator);
                let Some(field_name) = shape.name else {
                    continue;
                };
                let spelled = slice_text(source, clause.start, field_name.start_byte());
                fields.insert(
                    node_text(field_name, source),
                    clause.declared_type(&shape, &spelled),
                );
            }
        }
    }

    pub(crate) fn contains(&self, class: &str) -> bool {
        self.classes.contains_key(class)
    }

    pub(crate) fn field(&self, class: &str, member: &str) -> Option<&TypeDescriptor> {
        self.classes.get(class)?.get(member)
    }
}

/// Returns true for grammar kinds that define a class-like record.
pub(crate) fn is_record(kind: &str) -> bool {
    matches!(kind, "class_specifier" | "struct_specifier" | "union_specifier")
}
