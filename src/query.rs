//! `PublicSuffix`/`RegisteredDomain` (spec.md §4.9): a direct linear
//! traversal over a tree's `Suffix`/`Wildcard` blocks, not a precompiled
//! trie — the non-goals rule out answering faster than linear in list
//! size, so there is no index to keep in sync with edits.

use crate::domain::{Label, Name};
use crate::tree::{blocks_of_type, Block, SuffixBlock, WildcardBlock};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchKind {
    Suffix,
    Wildcard,
    Exception,
}

struct Candidate {
    kind: MatchKind,
    /// Number of labels the rule consumes when matching (used only to
    /// find the longest match among candidates of the same precedence
    /// tier).
    depth: usize,
    /// Number of trailing labels of the query that make up the public
    /// suffix once this candidate wins.
    suffix_len: usize,
}

/// Keep the longer of two same-tier candidates.
fn consider(best: &mut Option<Candidate>, candidate: Candidate) {
    let replace = match best {
        None => true,
        Some(current) => candidate.depth > current.depth,
    };
    if replace {
        *best = Some(candidate);
    }
}

/// The prevailing rule for `name` (spec.md §4.9): exception rules
/// override every non-exception rule regardless of length ("exceptions
/// override everything"), so they are collected and resolved as their
/// own precedence tier; only absent an exception match do suffix and
/// wildcard rules compete on length.
fn best_match(root: &Block, name: &Name) -> Option<Candidate> {
    let mut best_exception: Option<Candidate> = None;
    let mut best_other: Option<Candidate> = None;

    for s in blocks_of_type::<SuffixBlock>(root) {
        if name.cut_suffix(&s.domain).1 {
            let len = s.domain.num_labels();
            consider(&mut best_other, Candidate { kind: MatchKind::Suffix, depth: len, suffix_len: len });
        }
    }

    for w in blocks_of_type::<WildcardBlock>(root) {
        let (prefix, matched) = name.cut_suffix(&w.domain);
        if !matched || prefix.is_empty() {
            continue;
        }
        let base_len = w.domain.num_labels();
        let adjacent = prefix.last().expect("non-empty prefix");
        let is_exception = prefix.len() == 1 && w.exceptions.iter().any(|e| e == adjacent);
        if is_exception {
            consider(&mut best_exception, Candidate { kind: MatchKind::Exception, depth: base_len + 1, suffix_len: base_len });
        } else {
            consider(&mut best_other, Candidate { kind: MatchKind::Wildcard, depth: base_len + 1, suffix_len: base_len + 1 });
        }
    }

    best_exception.or(best_other)
}

fn tail_labels(name: &Name, len: usize) -> Name {
    let all: Vec<Label> = name.labels().cloned().collect();
    let start = all.len().saturating_sub(len.max(1));
    Name::from_labels(all[start..].to_vec())
}

/// The public suffix of `name` under the rules in `root`. Falls back to
/// the implicit `*` rule (the last label alone) when nothing matches.
pub fn public_suffix(root: &Block, name: &Name) -> Name {
    match best_match(root, name) {
        Some(c) => tail_labels(name, c.suffix_len),
        None => tail_labels(name, 1),
    }
}

/// The registered domain (public suffix plus one more label), or `None`
/// if `name` has no label to spare beyond its own public suffix.
pub fn registered_domain(root: &Block, name: &Name) -> Option<Name> {
    let suffix = public_suffix(root, name);
    if name.num_labels() <= suffix.num_labels() {
        return None;
    }
    Some(tail_labels(name, suffix.num_labels() + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn root(text: &str) -> Block {
        Block::List(parse(text.as_bytes()).0)
    }

    #[test]
    fn literal_suffix_match() {
        let tree = root("com\nco.uk\n");
        let name = Name::parse("example.co.uk").unwrap();
        assert_eq!(public_suffix(&tree, &name).ascii_string(), "co.uk");
        assert_eq!(registered_domain(&tree, &name).unwrap().ascii_string(), "example.co.uk");
    }

    #[test]
    fn wildcard_match_consumes_one_extra_label() {
        let tree = root("*.ck\n");
        let name = Name::parse("foo.bar.ck").unwrap();
        assert_eq!(public_suffix(&tree, &name).ascii_string(), "bar.ck");
        assert_eq!(registered_domain(&tree, &name).unwrap().ascii_string(), "foo.bar.ck");
    }

    #[test]
    fn exception_overrides_same_depth_wildcard() {
        let tree = root("*.kobe.jp\n!city.kobe.jp\n");
        let name = Name::parse("city.kobe.jp").unwrap();
        assert_eq!(public_suffix(&tree, &name).ascii_string(), "kobe.jp");
        assert_eq!(registered_domain(&tree, &name).unwrap().ascii_string(), "city.kobe.jp");
    }

    #[test]
    fn deeper_subdomain_under_wildcard_is_unaffected_by_exception() {
        let tree = root("*.kobe.jp\n!city.kobe.jp\n");
        let name = Name::parse("foo.city.kobe.jp").unwrap();
        assert_eq!(public_suffix(&tree, &name).ascii_string(), "city.kobe.jp");
    }

    #[test]
    fn no_match_falls_back_to_the_implicit_star_rule() {
        let tree = root("com\n");
        let name = Name::parse("example.org").unwrap();
        assert_eq!(public_suffix(&tree, &name).ascii_string(), "org");
        assert_eq!(registered_domain(&tree, &name).unwrap().ascii_string(), "example.org");
    }

    #[test]
    fn exception_beats_a_same_depth_literal_suffix_rule() {
        let tree = root("*.kobe.jp\n!city.kobe.jp\ncity.kobe.jp\n");
        let name = Name::parse("city.kobe.jp").unwrap();
        assert_eq!(public_suffix(&tree, &name).ascii_string(), "kobe.jp");
    }

    #[test]
    fn name_equal_to_its_own_suffix_has_no_registered_domain() {
        let tree = root("com\n");
        let name = Name::parse("com").unwrap();
        assert_eq!(public_suffix(&tree, &name).ascii_string(), "com");
        assert!(registered_domain(&tree, &name).is_none());
    }
}
