//! A validating, formatting, and diffing engine for the Public Suffix
//! List file format: parse a PSL text into a lossless tree, normalize it
//! (`Clean`), diff it against a prior version, validate it offline, and
//! answer `PublicSuffix`/`RegisteredDomain` queries against it.
//!
//! This crate does not fetch lists over HTTP, does not talk to a VCS or
//! an issue tracker, and does not implement IDNA/collation itself (it
//! calls out to `idna` and a pluggable [`domain::Collator`]) — see each
//! module's docs for the semantics it does own.

pub mod clean;
pub mod diff;
pub mod domain;
pub mod errors;
pub mod exemptions;
pub mod metadata;
pub mod options;
pub mod parser;
pub mod query;
pub mod range;
pub mod text;
pub mod tree;
pub mod validate;
pub mod writer;

#[cfg(feature = "std")]
use std::path::Path;

pub use domain::{DomainError, Label, Name};
pub use errors::{Diagnostic, DiagnosticKind, Error, ErrorPolicy, Result};
pub use options::DiffOptions;
pub use tree::{blocks_of_type, Block, BlockVariant};

use tree::{Info, ListBlock};

/// A parsed Public Suffix List: its tree, plus every diagnostic raised
/// while getting it there. A `List` is never invalid on its own terms —
/// operations that need a parse-error-free tree (clean, marshal) accept
/// a dirty one; it's up to the caller to check [`List::is_safe_to_rewrite`]
/// first if that matters.
#[derive(Debug, Clone)]
pub struct List {
    tree: Block,
    diagnostics: Vec<Diagnostic>,
}

impl core::str::FromStr for List {
    type Err = core::convert::Infallible;

    /// Parses a string slice into a `List`. Parsing never fails outright
    /// (see [`errors::Diagnostic`]); use [`List::diagnostics`] to inspect
    /// what went wrong.
    ///
    /// ```rust
    /// use pslkit::List;
    ///
    /// let list: List = "com\nco.uk\n".parse().unwrap();
    /// assert!(list.diagnostics().is_empty());
    /// ```
    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        Ok(Self::parse(s.as_bytes()))
    }
}

impl List {
    /// Parse raw PSL bytes into a tree, accumulating diagnostics rather
    /// than failing (spec.md §4.4, §6: `Parse`).
    pub fn parse(bytes: &[u8]) -> Self {
        let (root, diagnostics) = parser::parse(bytes);
        List {
            tree: Block::List(root),
            diagnostics,
        }
    }

    /// Load a PSL file from disk and parse it.
    #[cfg(feature = "std")]
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(Error::Io)?;
        Ok(Self::parse(&bytes))
    }

    /// Diagnostics accumulated by parsing and, after [`List::clean`] or
    /// [`List::validate_offline`], by those passes too.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Whether every diagnostic raised so far is safe to downgrade or
    /// ignore under `policy` — i.e. whether this tree is safe to
    /// rewrite (spec.md §7).
    pub fn is_safe_to_rewrite(&self, policy: &dyn ErrorPolicy) -> bool {
        errors::partition(&self.diagnostics, policy).0.is_empty()
    }

    /// The root of the parsed tree.
    pub fn root(&self) -> &Block {
        &self.tree
    }

    /// Run the Clean normalization pass (spec.md §4.5) over this list's
    /// tree in place, appending any diagnostics it raises (only
    /// `CommentPreventsSuffixSort`/`CommentPreventsSectionSort` can
    /// originate here).
    pub fn clean(&mut self) {
        let Block::List(root) = &mut self.tree else {
            unreachable!("List::tree is always the List variant")
        };
        let more = clean::clean(root);
        self.diagnostics.extend(more);
    }

    /// Render this list back to canonical PSL text.
    pub fn marshal_psl(&self) -> String {
        writer::marshal_psl(&self.tree)
    }

    /// Render this list to PSL text with every changed line marked, for
    /// reviewing a [`List::set_base_version`] result.
    pub fn marshal_debug(&self) -> String {
        writer::marshal_debug(&self.tree)
    }

    /// Mark every node of this list's tree unchanged/changed relative to
    /// `old` (spec.md §4.7, `SetBaseVersion`).
    pub fn set_base_version(&mut self, old: &List, options: DiffOptions) {
        diff::set_base_version(&old.tree, &mut self.tree, options);
    }

    /// Run the offline structural validators (spec.md §4.8): section
    /// completeness, PRIVATE maintainer metadata, and
    /// suffix/wildcard/exception uniqueness.
    pub fn validate_offline(&self) -> Vec<Diagnostic> {
        let Block::List(root) = &self.tree else {
            unreachable!("List::tree is always the List variant")
        };
        validate::validate_offline(root)
    }

    /// The public suffix of `name` under this list's rules (spec.md §4.9).
    pub fn public_suffix(&self, name: &Name) -> Name {
        query::public_suffix(&self.tree, name)
    }

    /// The registered domain (eTLD+1) of `name` under this list's rules,
    /// or `None` if `name` has no label left over beyond its own public
    /// suffix.
    pub fn registered_domain(&self, name: &Name) -> Option<Name> {
        query::registered_domain(&self.tree, name)
    }
}

impl Default for List {
    fn default() -> Self {
        List {
            tree: Block::List(ListBlock {
                info: Info::default(),
                children: Vec::new(),
            }),
            diagnostics: Vec::new(),
        }
    }
}
