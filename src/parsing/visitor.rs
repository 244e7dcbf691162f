//! AST traversal that extracts cross-reference data.
//!
//! Two visitors run per translation unit: the inclusion visitor records
//! include-graph edges straight into the shared include accumulator, and
//! the cursor visitor collects definitions, references and symbol-name
//! permutations into job-local accumulators.

use crate::parsing::{AstCursor, CursorKind, Inclusion};
use crate::storage::{Accumulator, SharedAccumulator};

/// USR libclang assigns to cursors it cannot resolve: the prefix with
/// nothing after it.
const USR_SENTINEL: &[u8] = b"c:";

/// Job-local accumulation target for the cursor visitor.
#[derive(Debug, Default)]
pub struct CrossRefSink {
    pub definitions: Accumulator,
    pub references: Accumulator,
    pub symbols: Accumulator,
}

/// Record include-graph edges for one translation unit.
///
/// The included file and every file on its inclusion chain gain an edge
/// `included -> input`; the input itself is filtered out (a file does not
/// include itself). Edges go straight to the shared accumulator, one lock
/// acquisition per edge.
pub fn visit_inclusions(
    inclusions: &[Inclusion],
    input: &[u8],
    includes: &SharedAccumulator,
) {
    for inclusion in inclusions {
        add_include_edge(includes, &inclusion.file, input);
        for site in &inclusion.stack {
            add_include_edge(includes, &site.file, input);
        }
    }
}

fn add_include_edge(includes: &SharedAccumulator, included: &[u8], input: &[u8]) {
    if included == input {
        return;
    }
    includes.insert(included, input);
}

/// Pre-order walk over every cursor below `root`, recording definitions,
/// references and symbol-name permutations into `sink`.
pub fn visit_cursors<C: AstCursor>(root: &C, sink: &mut CrossRefSink) {
    for child in root.children() {
        walk(&child, sink);
    }
}

fn walk<C: AstCursor>(cursor: &C, sink: &mut CrossRefSink) {
    record(cursor, sink);
    for child in cursor.children() {
        walk(&child, sink);
    }
}

fn record<C: AstCursor>(cursor: &C, sink: &mut CrossRefSink) {
    if cursor.kind() == CursorKind::AccessSpecifier {
        return;
    }
    let Some(usr) = usable_usr(cursor) else {
        return;
    };
    let Some(location) = cursor.spelling_location() else {
        return;
    };
    if location.file.is_empty() {
        return;
    }
    let rendered = location.render();

    if cursor.is_definition() {
        sink.definitions.insert(usr.clone(), rendered.clone());
        add_name_permutations(cursor, &usr, &mut sink.symbols);
    }
    sink.references.insert(usr, rendered);
}

/// Resolve a cursor's USR, falling back to the USR of the cursor it
/// references when the direct one is empty or the bare sentinel.
fn usable_usr<C: AstCursor>(cursor: &C) -> Option<Vec<u8>> {
    let usr = cursor.usr();
    if usr_ok(&usr) {
        return Some(usr);
    }
    let referenced = cursor.referenced()?;
    let usr = referenced.usr();
    usr_ok(&usr).then_some(usr)
}

fn usr_ok(usr: &[u8]) -> bool {
    !usr.is_empty() && usr != USR_SENTINEL
}

/// Insert every qualified-name prefix of `cursor` into the symbol
/// accumulator, in both with-parameter and without-parameter form.
///
/// The walk follows semantic parents up to (but not including) the
/// translation-unit root and stops early at a parent with an empty display
/// name. For `N::S::m(int)` this yields `m(int)`, `m`, `S::m(int)`,
/// `S::m`, `N::S::m(int)` and `N::S::m`.
fn add_name_permutations<C: AstCursor>(cursor: &C, usr: &[u8], symbols: &mut Accumulator) {
    let mut with_params: Vec<u8> = Vec::new();
    let mut without_params: Vec<u8> = Vec::new();

    let mut current = Some(cursor.clone());
    while let Some(cur) = current {
        if cur.is_translation_unit() {
            break;
        }
        let name = cur.display_name();
        if name.is_empty() {
            break;
        }

        if with_params.is_empty() {
            with_params = name.clone();
            // Strip from the first '(' of the innermost component onward
            without_params = match name.iter().position(|&b| b == b'(') {
                Some(paren) => name[..paren].to_vec(),
                None => name,
            };
        } else {
            with_params = qualify(&name, &with_params);
            without_params = qualify(&name, &without_params);
        }

        symbols.insert(with_params.clone(), usr);
        if with_params != without_params {
            symbols.insert(without_params.clone(), usr);
        }

        current = cur.semantic_parent();
    }
}

fn qualify(parent: &[u8], inner: &[u8]) -> Vec<u8> {
    let mut qualified = Vec::with_capacity(parent.len() + 2 + inner.len());
    qualified.extend_from_slice(parent);
    qualified.extend_from_slice(b"::");
    qualified.extend_from_slice(inner);
    qualified
}

/// Map the unit's basename to its full filename in the symbol accumulator.
pub fn add_filename_symbol(filename: &[u8], symbols: &mut Accumulator) {
    if let Some(base) = basename(filename) {
        symbols.insert(base, filename);
    }
}

/// The substring after the last unescaped `/`.
///
/// A `/` preceded by an odd run of backslashes is escaped and not a
/// separator. Paths are expected to be canonicalized before they reach the
/// engine; no attempt is made to handle adversarial backslash runs beyond
/// this rule.
fn basename(path: &[u8]) -> Option<&[u8]> {
    let mut i = path.len();
    while i > 0 {
        i -= 1;
        if path[i] != b'/' {
            continue;
        }
        let mut run = i;
        while run > 0 && path[run - 1] == b'\\' {
            run -= 1;
        }
        if (i - run) % 2 == 0 {
            return Some(&path[i + 1..]);
        }
        i = run;
    }
    None
}
