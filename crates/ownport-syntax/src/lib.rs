//! Typed syntax trees for the ownport migration engine.
//!
//! This crate defines the tree the engine consumes and the providers that
//! produce it:
//!
//! - **Tree model**: [`SyntaxNode`] and [`NodeKind`] describe declarations and
//!   statements, [`Expr`] describes their operands, and every construct
//!   carries a [`Span`] into the original source buffer plus, where
//!   meaningful, a [`TypeDescriptor`].
//! - **Providers**: [`CppProvider`] parses C++ with Tree-sitter and resolves
//!   declared types through lexical scopes; [`JsonProvider`] replays a tree
//!   produced by another front end. Both implement [`SyntaxProvider`].
//!
//! # Example
//!
//! ```
//! use ownport_syntax::{CppProvider, NodeKind, SyntaxProvider};
//!
//! let mut provider = CppProvider::new()?;
//! let tree = provider.provide(b"struct Node { Node *next; };")?;
//!
//! let fields = tree
//!     .preorder()
//!     .filter(|node| matches!(node.kind, NodeKind::Field(_)))
//!     .count();
//! assert_eq!(fields, 1);
//! # Ok::<(), ownport_syntax::SyntaxError>(())
//! ```

mod cpp;
mod error;
mod expr;
mod node;
mod parser;
mod position;
mod provider;
mod span;
mod types;

pub use cpp::CppProvider;
pub use error::SyntaxError;
pub use expr::{Expr, parse_integer_literal};
pub use node::{
    DeleteExpr, FieldDecl, FunctionDecl, FunctionKind, NewExpr, NodeKind, ParamDecl, SyntaxNode,
    VarDecl, VarScope,
};
pub use parser::{CppParser, ParseResult, SyntaxErrorInfo};
pub use position::offset_to_one_based;
pub use provider::{JsonProvider, SyntaxProvider};
pub use span::Span;
pub use types::TypeDescriptor;
