//! Thin, `Copy`able option structs, in the teacher's `LoadOpts` /
//! `MatchOpts` shape, for the few places the spec leaves genuinely
//! tunable.

pub use crate::errors::{DefaultPolicy, ErrorPolicy, LegacyExemptPolicy};

/// Options for [`crate::diff::set_base_version`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DiffOptions {
    /// If true, a changed path that crosses a `Suffixes` block marks
    /// every `Suffix`/`Wildcard` descendant of that block as changed,
    /// not just the node(s) that actually differ (spec.md §4.7).
    pub whole_suffix_blocks: bool,
}
