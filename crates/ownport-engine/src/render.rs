//! Serializers rendering the replacement bytes for each rewrite target.
//!
//! Every function here is pure. Text the migration introduces comes from
//! [`RewriteOptions`]; text carried over from the input is always the
//! original bytes, sliced from the source by span, so comments, layout and
//! non-UTF-8 content inside a rewritten construct survive unchanged.

use ownport_syntax::{FunctionDecl, Span, TypeDescriptor};

use crate::classify::{Initializer, PointerSlot, Target};
use crate::ledger::EditRecord;
use crate::options::RewriteOptions;

/// Renders the owning type for `pointee`, e.g. `boost::shared_ptr<Foo>`.
#[must_use]
pub fn owning(options: &RewriteOptions, pointee: &TypeDescriptor) -> String {
    format!("{}<{pointee}>", options.owning_type)
}

/// Renders the deleter type for `pointee`, e.g. `util::deleter<Foo>`.
#[must_use]
pub fn deleter(options: &RewriteOptions, pointee: &TypeDescriptor) -> String {
    format!("{}<{pointee}>", options.deleter_type)
}

/// Renders the replacement for a declaration's type clause.
///
/// The clause runs up to the declared name, so a trailing space keeps the
/// name separated from the new type.
#[must_use]
pub fn declaration_type(options: &RewriteOptions, slot: &PointerSlot<'_>) -> String {
    let owning = owning(options, slot.pointee);
    if slot.named { format!("{owning} ") } else { owning }
}

/// Wraps a raw allocation so the owning pointer frees it with the deleter.
#[must_use]
pub fn allocation(options: &RewriteOptions, pointee: &TypeDescriptor, raw: &[u8]) -> Vec<u8> {
    join(&[
        owning(options, pointee).as_bytes(),
        b"(",
        raw,
        b", ",
        deleter(options, pointee).as_bytes(),
        b"())",
    ])
}

/// Replaces a `delete` with an explicit release through the deleter.
#[must_use]
pub fn deallocation(
    options: &RewriteOptions,
    pointee: &TypeDescriptor,
    operand: &[u8],
) -> Vec<u8> {
    let release = format!("{}::{}(", deleter(options, pointee), options.release_function);
    join(&[release.as_bytes(), operand, b")"])
}

/// Replaces an assignment of literal zero.
#[must_use]
pub fn reset(target: &[u8]) -> Vec<u8> {
    join(&[target, b".reset()"])
}

/// Renders the constructor arguments for a migrated initializer.
#[must_use]
pub fn initializer_arguments(
    options: &RewriteOptions,
    pointee: &TypeDescriptor,
    init: Initializer,
    raw: &[u8],
) -> Vec<u8> {
    match init {
        Initializer::Literal { .. } => {
            let cast = format!("static_cast<{pointee} *>(");
            let deleter = format!("), {}()", deleter(options, pointee));
            join(&[cast.as_bytes(), raw, deleter.as_bytes()])
        }
        Initializer::Name { .. } => raw.to_vec(),
    }
}

/// Renders a complete owning initializer, e.g. `boost::shared_ptr<Foo>(q)`.
#[must_use]
pub fn initializer(
    options: &RewriteOptions,
    pointee: &TypeDescriptor,
    init: Initializer,
    raw: &[u8],
) -> Vec<u8> {
    wrap(
        options,
        pointee,
        &initializer_arguments(options, pointee, init, raw),
    )
}

/// Wraps a returned pointer in the owning type.
#[must_use]
pub fn return_value(options: &RewriteOptions, pointee: &TypeDescriptor, raw: &[u8]) -> Vec<u8> {
    wrap(options, pointee, raw)
}

fn wrap(options: &RewriteOptions, pointee: &TypeDescriptor, arguments: &[u8]) -> Vec<u8> {
    join(&[owning(options, pointee).as_bytes(), b"(", arguments, b")"])
}

fn join(parts: &[&[u8]]) -> Vec<u8> {
    parts.concat()
}

/// Renders a function signature with owning return and parameter types.
///
/// The signature is copied from `source` with only the pointer type
/// clauses replaced; names, comments, default values and line breaks are
/// kept as written.
#[must_use]
pub fn signature(options: &RewriteOptions, source: &[u8], function: &FunctionDecl) -> Vec<u8> {
    let mut clauses = Vec::new();
    if let (Some(pointee), Some(span)) = (
        function.return_type.as_ref().and_then(TypeDescriptor::pointee),
        function.return_type_span,
    ) {
        let slot = PointerSlot {
            pointee,
            type_span: span,
            named: true,
        };
        clauses.push((span, declaration_type(options, &slot)));
    }
    for param in &function.params {
        if let Some(pointee) = param.ty.pointee() {
            let slot = PointerSlot {
                pointee,
                type_span: param.type_span,
                named: param.name.is_some(),
            };
            clauses.push((param.type_span, declaration_type(options, &slot)));
        }
    }
    splice(source, function.signature_span, clauses)
}

/// Copies `outer` from `source`, replacing each contained span.
///
/// Replacements that fall outside `outer` or overlap an earlier one are
/// skipped.
fn splice(source: &[u8], outer: Span, mut replacements: Vec<(Span, String)>) -> Vec<u8> {
    replacements.sort_by_key(|(span, _)| span.start);
    let mut output = Vec::with_capacity(outer.len());
    let mut cursor = outer.start;
    for (span, text) in replacements {
        if span.start < cursor || span.end > outer.end {
            continue;
        }
        output.extend_from_slice(slice(source, Span::new(cursor, span.start)));
        output.extend_from_slice(text.as_bytes());
        cursor = span.end;
    }
    output.extend_from_slice(slice(source, Span::new(cursor, outer.end)));
    output
}

fn slice(source: &[u8], span: Span) -> &[u8] {
    source.get(span.start..span.end).unwrap_or_default()
}

/// Renders the text prepended to every migrated buffer.
#[must_use]
pub fn preamble(options: &RewriteOptions) -> String {
    format!("#include \"{}\"\n\n", options.support_header)
}

/// Renders every edit a target contributes, one per serializer call.
///
/// `source` is the buffer the target's spans address.
#[must_use]
pub fn edits(options: &RewriteOptions, source: &[u8], target: &Target<'_>) -> Vec<EditRecord> {
    match target {
        Target::ConstructorParams(slots) => slots
            .iter()
            .map(|slot| EditRecord::new(slot.type_span, declaration_type(options, slot)))
            .collect(),
        Target::Field(slot) => vec![EditRecord::new(slot.type_span, declaration_type(options, slot))],
        Target::Variable { slot, init } => {
            let mut records = vec![EditRecord::new(
                slot.type_span,
                declaration_type(options, slot),
            )];
            if let Some(init) = init {
                let raw = slice(source, init.span());
                records.push(EditRecord::new(
                    init.span(),
                    initializer(options, slot.pointee, *init, raw),
                ));
            }
            records
        }
        Target::Signature(function) => vec![EditRecord::new(
            function.signature_span,
            signature(options, source, function),
        )],
        Target::Allocation { pointee, span } => vec![EditRecord::new(
            *span,
            allocation(options, pointee, slice(source, *span)),
        )],
        Target::Deallocation {
            pointee,
            operand,
            span,
        } => vec![EditRecord::new(
            *span,
            deallocation(options, pointee, slice(source, *operand)),
        )],
        Target::Reset { target, span } => {
            vec![EditRecord::new(*span, reset(slice(source, *target)))]
        }
        Target::Return { pointee, span } => vec![EditRecord::new(
            *span,
            return_value(options, pointee, slice(source, *span)),
        )],
    }
}
