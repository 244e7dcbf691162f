//! Trait seams for the Clang-side collaborators.
//!
//! The engine does not parse anything itself: translation units come from an
//! external unit cache and are traversed through the cursor API below. The
//! traits mirror exactly what the visitors consume (cursor kind, USR,
//! referenced cursor, display name, semantic parent, spelling location,
//! inclusion chains and diagnostics), so a libclang binding and a test
//! double implement the same surface.

pub mod visitor;

use crate::types::SourceLocation;

/// Cursor classification, narrowed to what the visitors act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorKind {
    /// `public:` / `protected:` / `private:` markers; recursed into but
    /// never recorded.
    AccessSpecifier,
    Declaration,
    Reference,
    Expression,
    Statement,
    Other,
}

/// Diagnostic severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Ignored,
    Note,
    Warning,
    Error,
    Fatal,
}

/// One diagnostic produced while parsing a translation unit.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

/// One `#include` discovered during parsing: the included file plus the
/// chain of including locations, with the root of the chain at the deep end.
#[derive(Debug, Clone)]
pub struct Inclusion {
    pub file: Vec<u8>,
    pub stack: Vec<SourceLocation>,
}

/// Where an acquired unit came from.
///
/// `Cached` units were produced (and indexed) by an earlier run; only
/// `Source` units are traversed again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitOrigin {
    Source,
    Cached,
}

/// Acquisition flags passed through to the unit cache.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcquireOptions {
    pub source: bool,
    pub ast: bool,
    pub force: bool,
}

/// A translation unit handed out by the unit cache.
pub struct CachedUnit<U> {
    pub unit: U,
    /// Filename the unit was produced from, canonicalized.
    pub filename: Vec<u8>,
    pub origin: UnitOrigin,
}

/// An AST node reference.
///
/// Cursors are cheap handles: `Clone` is expected to be O(1) or close to it
/// in real bindings.
pub trait AstCursor: Clone {
    fn kind(&self) -> CursorKind;

    /// Unified Symbol Resolution string; empty when the cursor has none.
    fn usr(&self) -> Vec<u8>;

    /// The cursor this one references, if any.
    fn referenced(&self) -> Option<Self>;

    fn is_definition(&self) -> bool;

    /// Display name, including any parenthesized parameter suffix.
    fn display_name(&self) -> Vec<u8>;

    fn semantic_parent(&self) -> Option<Self>;

    fn is_translation_unit(&self) -> bool;

    /// Spelling location; `None` when the cursor maps to no file.
    fn spelling_location(&self) -> Option<SourceLocation>;

    fn children(&self) -> Vec<Self>;
}

/// The parsed result of one top-level source file plus its transitive
/// includes.
pub trait TranslationUnit {
    type Cursor: AstCursor;

    /// Root cursor of the unit.
    fn cursor(&self) -> Self::Cursor;

    /// All inclusions discovered while parsing.
    fn inclusions(&self) -> Vec<Inclusion>;

    fn diagnostics(&self) -> Vec<Diagnostic>;
}

/// External cache producing parsed translation units.
pub trait UnitCache: Send + Sync + 'static {
    type Unit: TranslationUnit;

    /// Acquire a unit for `input` with the given compile arguments, or
    /// `None` when no unit can be produced.
    fn acquire(
        &self,
        input: &[u8],
        args: &[Vec<u8>],
        options: AcquireOptions,
    ) -> Option<CachedUnit<Self::Unit>>;
}
