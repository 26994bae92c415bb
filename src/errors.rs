//! The closed, variant-shaped diagnostic taxonomy (spec.md §7).
//!
//! Parsing and validation never abort; they accumulate [`Diagnostic`]s
//! into a `Vec` alongside the best-effort tree. A small, separate
//! [`Error`] type is reserved for the handful of operations that really
//! can fail outright (reading a file from disk), kept in the teacher's
//! shape: a `#[non_exhaustive]` enum, manual `Display` via
//! `write!(f, "{self:?}")`, and `std::error::Error` gated on `std`.

use core::fmt;
#[cfg(feature = "std")]
use std::error::Error as StdError;

use crate::range::SourceRange;

#[derive(Debug)]
#[non_exhaustive]
/// Operations that can fail outright, as opposed to the accumulated,
/// non-fatal [`Diagnostic`]s produced by parsing and validation.
pub enum Error {
    /// An I/O error occurred while reading a Public Suffix List file.
    #[cfg(feature = "std")]
    Io(std::io::Error),
    /// A domain name failed to parse (see [`crate::domain::DomainError`]).
    InvalidDomain(crate::domain::DomainError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

#[cfg(feature = "std")]
impl StdError for Error {}

impl From<crate::domain::DomainError> for Error {
    fn from(e: crate::domain::DomainError) -> Self {
        Error::InvalidDomain(e)
    }
}

/// A `Result` whose error type is this crate's [`Error`].
pub type Result<T> = core::result::Result<T, Error>;

/// A single accumulated parse/clean/validation finding, carrying the
/// source range of the defect and its [`DiagnosticKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub range: SourceRange,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, range: SourceRange) -> Self {
        Self { kind, range }
    }

    /// Whether this is a hard parse error that blocks rewriting (as
    /// opposed to a structural/Clean finding raised after a tree already
    /// exists). See spec.md §7: "A tree parsed with any error is unsafe
    /// to rewrite".
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self.kind,
            DiagnosticKind::InvalidEncoding { .. }
                | DiagnosticKind::InvalidUnicode
                | DiagnosticKind::UnclosedSection { .. }
                | DiagnosticKind::NestedSection { .. }
                | DiagnosticKind::UnstartedSection { .. }
                | DiagnosticKind::MismatchedSection { .. }
                | DiagnosticKind::UnknownSectionMarker { .. }
                | DiagnosticKind::SectionInSuffixBlock { .. }
                | DiagnosticKind::DuplicateSection { .. }
                | DiagnosticKind::UnknownSection { .. }
                | DiagnosticKind::MissingSection { .. }
                | DiagnosticKind::InvalidSuffix { .. }
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} at {}", self.kind, self.range)
    }
}

/// The closed taxonomy from spec.md §7.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DiagnosticKind {
    // Encoding/text
    InvalidEncoding { label: String, guessed: bool },
    InvalidUnicode,
    // Section markers
    UnclosedSection { name: String },
    NestedSection { outer: String, inner: String },
    UnstartedSection { name: String },
    MismatchedSection { opened: String, closed: String },
    UnknownSectionMarker { text: String },
    SectionInSuffixBlock { text: String },
    // Structure
    DuplicateSection { name: String },
    UnknownSection { name: String },
    MissingSection { name: String },
    InvalidSuffix { text: String },
    // Metadata
    MissingEntityName,
    MissingEntityEmail,
    // Uniqueness
    DuplicateSuffix { domain: String },
    ConflictingSuffixAndException { domain: String },
    // Clean
    CommentPreventsSuffixSort,
    CommentPreventsSectionSort,
}

/// A pluggable policy converting legacy-exempt diagnostics into
/// non-fatal warnings (spec.md §7: "A pluggable `downgrade(error) ->
/// bool` predicate").
pub trait ErrorPolicy {
    fn downgrade(&self, kind: &DiagnosticKind) -> bool;
}

/// Downgrades nothing; every diagnostic is treated at face value.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultPolicy;

impl ErrorPolicy for DefaultPolicy {
    fn downgrade(&self, _kind: &DiagnosticKind) -> bool {
        false
    }
}

/// Downgrades the kinds the spec calls "legacy-exempted": markers this
/// crate can recover from unambiguously, where the original PSL has
/// historically tolerated the defect.
#[derive(Debug, Default, Clone, Copy)]
pub struct LegacyExemptPolicy;

impl ErrorPolicy for LegacyExemptPolicy {
    fn downgrade(&self, kind: &DiagnosticKind) -> bool {
        matches!(
            kind,
            DiagnosticKind::UnknownSectionMarker { .. } | DiagnosticKind::SectionInSuffixBlock { .. }
        )
    }
}

/// Partition diagnostics into `(fatal, warnings)` under the given
/// policy. A tree is "safe to rewrite" (spec.md §4.4, §7) iff `fatal` is
/// empty after this split.
pub fn partition<'a>(
    diagnostics: &'a [Diagnostic],
    policy: &dyn ErrorPolicy,
) -> (Vec<&'a Diagnostic>, Vec<&'a Diagnostic>) {
    let mut fatal = Vec::new();
    let mut warnings = Vec::new();
    for d in diagnostics {
        if d.is_parse_error() && !policy.downgrade(&d.kind) {
            fatal.push(d);
        } else {
            warnings.push(d);
        }
    }
    (fatal, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_downgrades_nothing() {
        let p = DefaultPolicy;
        assert!(!p.downgrade(&DiagnosticKind::UnknownSectionMarker {
            text: "x".into()
        }));
    }

    #[test]
    fn legacy_policy_downgrades_known_kinds() {
        let p = LegacyExemptPolicy;
        assert!(p.downgrade(&DiagnosticKind::UnknownSectionMarker { text: "x".into() }));
        assert!(!p.downgrade(&DiagnosticKind::DuplicateSection { name: "x".into() }));
    }

    #[test]
    fn partition_splits_fatal_from_warnings() {
        let diags = vec![
            Diagnostic::new(
                DiagnosticKind::UnknownSectionMarker { text: "x".into() },
                SourceRange::single(0),
            ),
            Diagnostic::new(
                DiagnosticKind::MissingEntityName,
                SourceRange::single(1),
            ),
        ];
        let (fatal, warnings) = partition(&diags, &LegacyExemptPolicy);
        assert_eq!(fatal.len(), 0);
        assert_eq!(warnings.len(), 2);
    }
}
