//! `Label` and `Name` value types: IDNA/UTS-46 canonicalization and
//! English-collation ordering.
//!
//! Domain labels are stored in their canonical ASCII (Punycode) form, the
//! way `idna::Config::default().to_ascii` already normalizes them in the
//! teacher crate's loader. Ordering, however, is a distinct concern from
//! equality: two canonically-equal labels always compare equal, but the
//! *order* of two different labels is delegated to a pluggable
//! [`Collator`], because the real ordering the spec calls for (English
//! CLDR root collation) lives in a library this crate does not implement
//! (see spec.md §1, "we specify *which* semantics we need, not how to
//! implement ... CLDR root collation").

use core::cmp::Ordering;
use core::fmt::{self, Display, Formatter};
use std::sync::Mutex;

use once_cell::sync::Lazy;
use unicode_normalization::UnicodeNormalization;

const MAX_LABEL_LEN: usize = 63;
const MAX_NAME_LEN: usize = 253;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    Empty,
    LabelEmpty,
    LabelTooLong { label: String },
    NameTooLong,
    MultipleLabels,
    Idna(String),
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for DomainError {}

/// A single canonicalized DNS label, stored in ASCII (Punycode) form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Label(String);

impl Label {
    /// Parse a single label, applying UTS-46 and rejecting input that
    /// would split into more than one label.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let name = Name::parse(s)?;
        if name.labels.len() != 1 {
            return Err(DomainError::MultipleLabels);
        }
        Ok(name.labels.into_iter().next().unwrap())
    }

    /// Construct a `Label` from an already-canonical ASCII string,
    /// without re-running IDNA. Used internally for labels that are
    /// known-good (e.g. split from an already-validated `Name`).
    fn from_ascii(s: String) -> Self {
        Label(s)
    }

    pub fn as_ascii(&self) -> &str {
        &self.0
    }

    pub fn to_unicode(&self) -> String {
        idna_to_unicode(&self.0)
    }
}

impl Display for Label {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_unicode())
    }
}

/// A non-empty ordered sequence of [`Label`]s in DNS order: index 0 is
/// the leftmost label, the last element is the rightmost (the top-level
/// domain in its printed position).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Name {
    labels: Vec<Label>,
}

impl Name {
    /// `ParseName`: apply UTS-46 nontransitional processing with
    /// `UseSTD3ASCIIRules=true`, `CheckHyphens=true`; reject empty names
    /// and names exceeding DNS length limits; strip a single trailing
    /// dot before enforcing length; split on ASCII `.`.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        if s.is_empty() {
            return Err(DomainError::Empty);
        }
        let trimmed = s.strip_suffix('.').unwrap_or(s);
        if trimmed.is_empty() {
            return Err(DomainError::Empty);
        }

        let ascii = idna_to_ascii(trimmed)?;
        if ascii.len() > MAX_NAME_LEN {
            return Err(DomainError::NameTooLong);
        }

        let mut labels = Vec::new();
        for part in ascii.split('.') {
            if part.is_empty() {
                return Err(DomainError::LabelEmpty);
            }
            if part.len() > MAX_LABEL_LEN {
                return Err(DomainError::LabelTooLong {
                    label: part.to_string(),
                });
            }
            labels.push(Label::from_ascii(part.to_string()));
        }
        Ok(Name { labels })
    }

    /// Build a `Name` directly from already-canonical labels, without
    /// re-validating each one's IDNA form. Panics (per spec's
    /// `MustAddPrefix`) if the resulting name would violate the length
    /// invariants.
    pub fn from_labels(labels: Vec<Label>) -> Self {
        assert!(!labels.is_empty(), "Name must have at least one label");
        let name = Name { labels };
        assert!(
            name.ascii_string().len() <= MAX_NAME_LEN,
            "Name exceeds DNS length limit"
        );
        name
    }

    pub fn num_labels(&self) -> usize {
        self.labels.len()
    }

    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.labels.iter()
    }

    pub fn last_label(&self) -> &Label {
        self.labels.last().expect("Name is non-empty")
    }

    pub fn first_label(&self) -> &Label {
        self.labels.first().expect("Name is non-empty")
    }

    /// The name with its leftmost label removed, or `None` if this name
    /// has only one label.
    pub fn without_first_label(&self) -> Option<Name> {
        if self.labels.len() < 2 {
            return None;
        }
        Some(Name {
            labels: self.labels[1..].to_vec(),
        })
    }

    /// Punycode (ASCII) form, dot-joined in printed order.
    pub fn ascii_string(&self) -> String {
        self.labels
            .iter()
            .map(Label::as_ascii)
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Unicode form, dot-joined in printed order.
    pub fn to_unicode_string(&self) -> String {
        self.labels
            .iter()
            .map(Label::to_unicode)
            .collect::<Vec<_>>()
            .join(".")
    }

    /// If `self` ends with every label of `other` (in order), return the
    /// remaining leading labels and `true`; otherwise `(&[], false)`.
    pub fn cut_suffix(&self, other: &Name) -> (&[Label], bool) {
        if other.labels.len() > self.labels.len() {
            return (&[], false);
        }
        let split_at = self.labels.len() - other.labels.len();
        let (prefix, suffix) = self.labels.split_at(split_at);
        if suffix == other.labels.as_slice() {
            (prefix, true)
        } else {
            (&[], false)
        }
    }

    /// `AddPrefix`: prepend one label, validating the resulting length.
    pub fn add_prefix(&self, label: Label) -> Result<Name, DomainError> {
        let mut labels = Vec::with_capacity(self.labels.len() + 1);
        labels.push(label);
        labels.extend(self.labels.iter().cloned());
        let name = Name { labels };
        if name.ascii_string().len() > MAX_NAME_LEN {
            return Err(DomainError::NameTooLong);
        }
        Ok(name)
    }

    /// `MustAddPrefix`: prepend labels, panicking on invariant violation.
    /// For construction sites where the input is already known-valid
    /// (e.g. building a wildcard's base domain from validated parts).
    pub fn must_add_prefix(&self, labels: &[Label]) -> Name {
        let mut all = labels.to_vec();
        all.extend(self.labels.iter().cloned());
        Name::from_labels(all)
    }
}

impl Display for Name {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_unicode_string())
    }
}

fn idna_config() -> idna::Config {
    idna::Config::default()
        .use_std3_ascii_rules(true)
        .check_hyphens(true)
        .transitional_processing(false)
        .verify_dns_length(false)
}

fn idna_to_ascii(s: &str) -> Result<String, DomainError> {
    idna_config()
        .to_ascii(s)
        .map_err(|e| DomainError::Idna(format!("{e:?}")))
}

fn idna_to_unicode(label: &str) -> String {
    let (unicode, result) = idna_config().to_unicode(label);
    if result.is_err() {
        label.to_string()
    } else {
        unicode
    }
}

/// A pluggable ordering source. The spec requires precomputed sort keys
/// rather than an incremental "compare as you go" API, because some
/// collation libraries have known bugs in incremental mode; `sort_key`
/// is therefore the only entry point and callers must compare the
/// returned keys with plain byte ordering.
///
/// Implementations that hold shared mutable state (a real CLDR/ICU
/// collator typically does) must guard it themselves: either behind a
/// mutex, or by allocating a fresh instance per call. See
/// [`DefaultCollator`] for the scoped-mutex pattern this crate uses.
pub trait Collator {
    fn sort_key(&self, s: &str) -> Vec<u8>;
}

/// A stand-in for true English (root) CLDR collation: NFC-normalize,
/// then compare Unicode scalar values directly. This is case-,
/// whitespace-, and punctuation-sensitive and does not numeric-sort,
/// matching the spec's stated properties, but it is not a conformant
/// CLDR collation — production deployments should swap in a real one
/// behind the same [`Collator`] trait.
#[derive(Debug, Default)]
pub struct DefaultCollator;

impl Collator for DefaultCollator {
    fn sort_key(&self, s: &str) -> Vec<u8> {
        s.nfc().collect::<String>().into_bytes()
    }
}

static SHARED_COLLATOR: Lazy<Mutex<DefaultCollator>> = Lazy::new(|| Mutex::new(DefaultCollator));

/// Acquire the process-wide default collator for the duration of one
/// comparison. `DefaultCollator` itself holds no state that needs
/// guarding, but the mutex demonstrates (and enforces, for future
/// stateful collators dropped in behind this same call site) the
/// "acquire -> use -> release" scoped-resource discipline spec.md §5
/// requires of any collator that is not safe for concurrent use.
fn with_default_collator<R>(f: impl FnOnce(&DefaultCollator) -> R) -> R {
    let guard = SHARED_COLLATOR.lock().unwrap_or_else(|e| e.into_inner());
    f(&guard)
}

/// The label sequence reversed (rightmost/TLD label first) and dot-joined,
/// so that lexicographic comparison of this form groups a domain
/// immediately before its own subdomains: `com` < `com.foo` < `com.foo.qux`
/// < `com.qux`, i.e. `com` < `foo.com` < `qux.foo.com` < `qux.com` in
/// printed order. Sorting on the plain printed (leftmost-first) form
/// instead would interleave unrelated subtrees, e.g. sort `qux.com` before
/// `qux.foo.com` (spec.md §8 scenario 4 requires the opposite).
fn reversed_label_string(n: &Name) -> String {
    let mut labels: Vec<&str> = n.labels().map(Label::as_ascii).collect();
    labels.reverse();
    labels.join(".")
}

/// Compare two domain names under the domain collation, ordering by label
/// sequence from the rightmost (TLD) label inward rather than by the
/// printed leftmost-first string — this is what makes a domain's own
/// entry sort immediately before its subdomains' entries (spec.md §8
/// scenario 4). Total order: reflexive, antisymmetric, transitive, as
/// long as the underlying `Collator` is itself a total order.
pub fn compare_domain(a: &Name, b: &Name) -> Ordering {
    with_default_collator(|c| {
        let ka = c.sort_key(&reversed_label_string(a));
        let kb = c.sort_key(&reversed_label_string(b));
        ka.cmp(&kb)
    })
}

/// Compare two labels under the same collation used for domain names.
pub fn compare_label(a: &Label, b: &Label) -> Ordering {
    with_default_collator(|c| {
        let ka = c.sort_key(a.as_ascii());
        let kb = c.sort_key(b.as_ascii());
        ka.cmp(&kb)
    })
}

/// Compare two free-form comment-text strings (e.g. maintainer display
/// names) under the same collation engine. This is a distinct call site
/// from [`compare_domain`] because the spec forbids reusing the domain
/// collator for non-domain text in implementations that special-case
/// domain comparisons (spec.md §4.3); here both happen to share one
/// `Collator` implementation, but that is an implementation choice, not
/// a requirement — swap in two different collators if domain and
/// comment-text sorting ever need to diverge.
pub fn compare_comment_text(a: &str, b: &str) -> Ordering {
    with_default_collator(|c| {
        let ka = c.sort_key(a);
        let kb = c.sort_key(b);
        ka.cmp(&kb)
    })
}
