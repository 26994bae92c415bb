//! Offline validators (spec.md §4.8): structural checks that need no
//! network access — section completeness, PRIVATE DOMAINS maintainer
//! metadata, and suffix/wildcard/exception uniqueness. A finding whose
//! owning block has [`crate::tree::Info::is_unchanged`] set is
//! suppressed: a defect that already existed in the base version is not
//! re-reported on every run (spec.md §7).

use hashbrown::HashMap;

use crate::errors::{Diagnostic, DiagnosticKind};
use crate::exemptions::is_email_exempt;
use crate::range::SourceRange;
use crate::tree::{Block, ListBlock, SuffixBlock, WildcardBlock, ICANN_SECTION, PRIVATE_SECTION};

pub fn validate_offline(list: &ListBlock) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    check_sections(list, &mut diagnostics);
    check_private_metadata(list, &mut diagnostics);
    check_uniqueness(list, &mut diagnostics);
    diagnostics
}

fn check_sections(list: &ListBlock, diagnostics: &mut Vec<Diagnostic>) {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for child in &list.children {
        if let Block::Section(s) = child {
            *seen.entry(s.name.as_str()).or_insert(0) += 1;
            if s.name != ICANN_SECTION && s.name != PRIVATE_SECTION && !s.info.is_unchanged {
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::UnknownSection { name: s.name.clone() },
                    s.info.range,
                ));
            }
        }
    }
    for name in [ICANN_SECTION, PRIVATE_SECTION] {
        match seen.get(name).copied().unwrap_or(0) {
            0 => diagnostics.push(Diagnostic::new(
                DiagnosticKind::MissingSection { name: name.to_string() },
                SourceRange::invalid(),
            )),
            1 => {}
            _ => diagnostics.push(Diagnostic::new(
                DiagnosticKind::DuplicateSection { name: name.to_string() },
                SourceRange::invalid(),
            )),
        }
    }
}

fn check_private_metadata(list: &ListBlock, diagnostics: &mut Vec<Diagnostic>) {
    for child in &list.children {
        let Block::Section(s) = child else { continue };
        if s.name != PRIVATE_SECTION {
            continue;
        }
        for grandchild in &s.children {
            let Block::Suffixes(sfx) = grandchild else { continue };
            if sfx.info.is_unchanged {
                continue;
            }
            if sfx.maintainer.name.is_empty() {
                diagnostics.push(Diagnostic::new(DiagnosticKind::MissingEntityName, sfx.info.range));
                continue;
            }
            if sfx.maintainer.maintainers.is_empty() && !is_email_exempt(&sfx.maintainer.name) {
                diagnostics.push(Diagnostic::new(DiagnosticKind::MissingEntityEmail, sfx.info.range));
            }
        }
    }
}

fn collect_suffix_like<'a>(children: &'a [Block], suffixes: &mut Vec<&'a SuffixBlock>, wildcards: &mut Vec<&'a WildcardBlock>) {
    for child in children {
        match child {
            Block::Suffix(s) => suffixes.push(s),
            Block::Wildcard(w) => wildcards.push(w),
            Block::List(l) => collect_suffix_like(&l.children, suffixes, wildcards),
            Block::Section(s) => collect_suffix_like(&s.children, suffixes, wildcards),
            Block::Suffixes(s) => collect_suffix_like(&s.children, suffixes, wildcards),
            Block::Comment(_) => {}
        }
    }
}

fn check_uniqueness(list: &ListBlock, diagnostics: &mut Vec<Diagnostic>) {
    let mut suffixes = Vec::new();
    let mut wildcards = Vec::new();
    collect_suffix_like(&list.children, &mut suffixes, &mut wildcards);

    let mut seen_suffix: HashMap<String, usize> = HashMap::new();
    for s in &suffixes {
        let key = s.domain.ascii_string();
        let count = seen_suffix.entry(key.clone()).or_insert(0);
        *count += 1;
        if *count > 1 && !s.info.is_unchanged {
            diagnostics.push(Diagnostic::new(DiagnosticKind::DuplicateSuffix { domain: key }, s.info.range));
        }
    }

    let mut seen_wildcard_base: HashMap<String, usize> = HashMap::new();
    for w in &wildcards {
        let key = w.domain.ascii_string();
        let count = seen_wildcard_base.entry(key.clone()).or_insert(0);
        *count += 1;
        if *count > 1 && !w.info.is_unchanged {
            diagnostics.push(Diagnostic::new(DiagnosticKind::DuplicateSuffix { domain: key }, w.info.range));
        }
    }

    let mut exception_domains: HashMap<String, ()> = HashMap::new();
    for w in &wildcards {
        for label in &w.exceptions {
            if let Ok(full) = w.domain.add_prefix(label.clone()) {
                exception_domains.insert(full.ascii_string(), ());
            }
        }
    }
    for s in &suffixes {
        let key = s.domain.ascii_string();
        if exception_domains.contains_key(&key) && !s.info.is_unchanged {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::ConflictingSuffixAndException { domain: key },
                s.info.range,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn parse_list(text: &str) -> ListBlock {
        parse(text.as_bytes()).0
    }

    #[test]
    fn missing_sections_are_flagged() {
        let list = parse_list("com\n");
        let diags = validate_offline(&list);
        let missing: Vec<_> = diags
            .iter()
            .filter(|d| matches!(d.kind, DiagnosticKind::MissingSection { .. }))
            .collect();
        assert_eq!(missing.len(), 2);
    }

    #[test]
    fn unknown_section_name_is_flagged() {
        let list = parse_list("// ===BEGIN BOGUS===\n\ncom\n\n// ===END BOGUS===\n");
        let diags = validate_offline(&list);
        assert!(diags.iter().any(|d| matches!(d.kind, DiagnosticKind::UnknownSection { .. })));
    }

    #[test]
    fn private_block_missing_name_and_email_is_flagged() {
        let list = parse_list(
            "// ===BEGIN PRIVATE DOMAINS===\n\ncom\n\n// ===END PRIVATE DOMAINS===\n// ===BEGIN ICANN DOMAINS===\n\nnet\n\n// ===END ICANN DOMAINS===\n",
        );
        let diags = validate_offline(&list);
        assert!(diags.iter().any(|d| matches!(d.kind, DiagnosticKind::MissingEntityName)));
    }

    #[test]
    fn exempt_maintainer_skips_email_check() {
        let list = parse_list(
            "// ===BEGIN PRIVATE DOMAINS===\n\n// Nokia\nexample.nokia\n\n// ===END PRIVATE DOMAINS===\n// ===BEGIN ICANN DOMAINS===\n\nnet\n\n// ===END ICANN DOMAINS===\n",
        );
        let diags = validate_offline(&list);
        assert!(!diags.iter().any(|d| matches!(d.kind, DiagnosticKind::MissingEntityEmail)));
    }

    #[test]
    fn duplicate_suffix_is_flagged() {
        let list = parse_list("com\ncom\n");
        let diags = validate_offline(&list);
        assert!(diags.iter().any(|d| matches!(d.kind, DiagnosticKind::DuplicateSuffix { .. })));
    }

    #[test]
    fn duplicate_wildcard_base_is_flagged() {
        let list = parse_list("*.foo.com\n*.foo.com\n");
        let diags = validate_offline(&list);
        assert!(diags.iter().any(|d| matches!(
            &d.kind,
            DiagnosticKind::DuplicateSuffix { domain } if domain == "foo.com"
        )));
    }

    #[test]
    fn unchanged_blocks_suppress_reporting() {
        let mut list = parse_list("com\ncom\n");
        for child in &mut list.children {
            if let Block::Suffixes(sfx) = child {
                for grandchild in &mut sfx.children {
                    grandchild.info_mut().is_unchanged = true;
                }
            }
        }
        let diags = validate_offline(&list);
        assert!(!diags.iter().any(|d| matches!(d.kind, DiagnosticKind::DuplicateSuffix { .. })));
    }
}
