//! The Clean normalization pass (spec.md §4.5): canonicalize maintainer
//! headers, sort and dedup a `Suffixes` block's body, and sort PRIVATE
//! DOMAINS blocks by maintainer name — all subject to "comment barriers":
//! Clean never reorders an entry across an inline comment it cannot prove
//! is order-independent, and flags the file instead.

use std::cmp::Ordering;

use crate::domain::{compare_comment_text, compare_domain, compare_label, Name};
use crate::errors::{Diagnostic, DiagnosticKind};
use crate::exemptions::{AMAZON_BLOCK_END, AMAZON_BLOCK_START, AMAZON_GROUP_KEY};
use crate::metadata;
use crate::range::SourceRange;
use crate::tree::{Block, CommentBlock, Info, ListBlock, SectionBlock, SuffixesBlock, PRIVATE_SECTION};

/// Run Clean over an entire tree, mutating it in place, and return the
/// diagnostics raised along the way (only [`DiagnosticKind::CommentPreventsSuffixSort`]
/// and [`DiagnosticKind::CommentPreventsSectionSort`] can originate here).
pub fn clean(list: &mut ListBlock) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for child in &mut list.children {
        clean_block(child, &mut diagnostics);
    }
    diagnostics
}

fn clean_block(block: &mut Block, diagnostics: &mut Vec<Diagnostic>) {
    match block {
        Block::List(l) => {
            for child in &mut l.children {
                clean_block(child, diagnostics);
            }
        }
        Block::Section(s) => {
            for child in &mut s.children {
                clean_block(child, diagnostics);
            }
            if s.name == PRIVATE_SECTION {
                sort_private_section(s, diagnostics);
            }
        }
        Block::Suffixes(sfx) => {
            regenerate_header(sfx);
            sort_suffix_body(sfx, diagnostics);
        }
        Block::Suffix(_) | Block::Wildcard(_) | Block::Comment(_) => {}
    }
}

/// Rewrite a `machine_editable` header back into the canonical
/// `"<name> : <url>"` shape, folding legacy parenthetical/fullwidth-colon
/// forms and `Submitted by` lines into the same order every time.
///
/// When the header is *not* machine-editable (some line could not be
/// classified), the comment is authoritative instead: re-extract
/// `MaintainerInfo` from its current text and overwrite `sfx.maintainer`
/// rather than rewriting the text outward (spec.md §4.5, "do the
/// inverse").
fn regenerate_header(sfx: &mut SuffixesBlock) {
    let maintainer = sfx.maintainer.clone();
    if !maintainer.machine_editable {
        let re_extracted = sfx.header().map(|header| metadata::extract(&header.text));
        if let Some(info) = re_extracted {
            sfx.maintainer = info;
        }
        return;
    }
    if !maintainer.has_info() {
        return;
    }

    let mut lines = Vec::new();
    if !maintainer.name.is_empty() {
        if let Some(url) = maintainer.urls.first() {
            lines.push(format!("{} : {}", maintainer.name, url));
        } else {
            lines.push(maintainer.name.clone());
        }
        lines.extend(maintainer.urls.iter().skip(1).cloned());
    } else {
        lines.extend(maintainer.urls.iter().cloned());
    }
    if !maintainer.maintainers.is_empty() {
        let addrs: Vec<String> = maintainer.maintainers.iter().map(|a| a.submitted_by_text()).collect();
        lines.push(format!("Submitted by {}", addrs.join(" and ")));
    }
    lines.extend(maintainer.other.iter().cloned());

    if let Some(header) = sfx.header_mut() {
        header.text = lines;
    } else {
        sfx.children.insert(
            0,
            Block::Comment(CommentBlock {
                info: Info::new(SourceRange::invalid()),
                text: lines,
            }),
        );
    }
}

fn suffix_like_domain(b: &Block) -> Option<&Name> {
    match b {
        Block::Suffix(s) => Some(&s.domain),
        Block::Wildcard(w) => Some(&w.domain),
        _ => None,
    }
}

/// A `Suffix` sorts before a `Wildcard` of the same domain.
fn compare_suffix_and_wildcard(a: &Block, b: &Block) -> Ordering {
    let (da, db) = (
        suffix_like_domain(a).expect("only called on Suffix/Wildcard"),
        suffix_like_domain(b).expect("only called on Suffix/Wildcard"),
    );
    match compare_domain(da, db) {
        Ordering::Equal => {
            let rank = |x: &Block| u8::from(matches!(x, Block::Wildcard(_)));
            rank(a).cmp(&rank(b))
        }
        other => other,
    }
}

fn normalize_wildcard_exceptions(block: &mut Block) {
    if let Block::Wildcard(w) = block {
        w.exceptions.sort_by(compare_label);
        w.exceptions.dedup();
    }
}

fn dedup_group(items: &mut Vec<Block>) {
    let mut i = 0;
    while i + 1 < items.len() {
        let same_domain = match (&items[i], &items[i + 1]) {
            (Block::Suffix(a), Block::Suffix(b)) => a.domain == b.domain,
            (Block::Wildcard(a), Block::Wildcard(b)) => a.domain == b.domain,
            _ => false,
        };
        if same_domain {
            let dropped = items.remove(i + 1);
            if let Block::Wildcard(dropped_w) = dropped {
                if let Block::Wildcard(keep) = &mut items[i] {
                    for e in dropped_w.exceptions {
                        if !keep.exceptions.contains(&e) {
                            keep.exceptions.push(e);
                        }
                    }
                    keep.exceptions.sort_by(compare_label);
                }
            }
        } else {
            i += 1;
        }
    }
}

enum BodySegment {
    Comment(CommentBlock),
    Group(Vec<Block>),
}

fn sort_suffix_body(sfx: &mut SuffixesBlock, diagnostics: &mut Vec<Diagnostic>) {
    let skip = usize::from(sfx.header().is_some());
    let header: Vec<Block> = sfx.children.drain(..skip).collect();
    let body: Vec<Block> = sfx.children.drain(..).collect();

    let mut segments: Vec<BodySegment> = Vec::new();
    let mut current: Vec<Block> = Vec::new();
    for item in body {
        match item {
            Block::Comment(c) => {
                if !current.is_empty() {
                    segments.push(BodySegment::Group(std::mem::take(&mut current)));
                }
                segments.push(BodySegment::Comment(c));
            }
            mut other => {
                normalize_wildcard_exceptions(&mut other);
                current.push(other);
            }
        }
    }
    if !current.is_empty() {
        segments.push(BodySegment::Group(current));
    }

    for seg in &mut segments {
        if let BodySegment::Group(items) = seg {
            items.sort_by(|a, b| compare_suffix_and_wildcard(a, b));
            dedup_group(items);
        }
    }

    // Track a running high-water mark across all prior groups, not just the
    // immediately preceding one: a comment several groups back can still be
    // the thing that "prevents" today's out-of-order entry (spec.md §4.5,
    // "keep the larger of the two as the new high-water mark").
    let mut high_water: Option<Block> = None;
    let mut pending_comment: Option<SourceRange> = None;
    for seg in &segments {
        match seg {
            BodySegment::Comment(c) => pending_comment = Some(c.info.range),
            BodySegment::Group(items) => {
                if let (Some(hwm), Some(first)) = (&high_water, items.first()) {
                    if compare_suffix_and_wildcard(hwm, first) == Ordering::Greater {
                        let range = pending_comment.unwrap_or(sfx.info.range);
                        diagnostics.push(Diagnostic::new(DiagnosticKind::CommentPreventsSuffixSort, range));
                    }
                }
                if let Some(last) = items.last() {
                    high_water = Some(match &high_water {
                        Some(hwm) if compare_suffix_and_wildcard(hwm, last) == Ordering::Greater => hwm.clone(),
                        _ => last.clone(),
                    });
                }
            }
        }
    }

    let mut rebuilt = header;
    for seg in segments {
        match seg {
            BodySegment::Comment(c) => rebuilt.push(Block::Comment(c)),
            BodySegment::Group(items) => rebuilt.extend(items),
        }
    }
    sfx.children = rebuilt;
}

/// Whether `header`'s text marks the start/end of the Amazon maintainer
/// super-block (spec.md §9 open question (a)): several consecutive
/// maintainer blocks that are conventionally kept together and sorted as
/// one unit keyed by `"Amazon"` rather than by each block's own name.
fn amazon_keys(children: &[Block]) -> Vec<Option<String>> {
    let mut in_amazon = false;
    let mut keys = Vec::with_capacity(children.len());
    for child in children {
        match child {
            Block::Suffixes(sfx) => {
                let header_text = sfx.header().map(|c| c.text.join(" ")).unwrap_or_default();
                if !in_amazon && header_text.contains(AMAZON_BLOCK_START) {
                    in_amazon = true;
                }
                let key = if in_amazon {
                    AMAZON_GROUP_KEY.to_string()
                } else {
                    sfx.maintainer.name.clone()
                };
                if in_amazon && header_text.contains(AMAZON_BLOCK_END) {
                    in_amazon = false;
                }
                keys.push(Some(key));
            }
            _ => keys.push(None),
        }
    }
    keys
}

enum SectionSegment {
    Comment(Block),
    Group(Vec<(Block, String)>),
}

fn sort_private_section(section: &mut SectionBlock, diagnostics: &mut Vec<Diagnostic>) {
    let keys = amazon_keys(&section.children);
    let children: Vec<Block> = section.children.drain(..).collect();

    let mut segments: Vec<SectionSegment> = Vec::new();
    let mut current: Vec<(Block, String)> = Vec::new();
    for (child, key) in children.into_iter().zip(keys) {
        match key {
            Some(k) => current.push((child, k)),
            None => {
                if !current.is_empty() {
                    segments.push(SectionSegment::Group(std::mem::take(&mut current)));
                }
                segments.push(SectionSegment::Comment(child));
            }
        }
    }
    if !current.is_empty() {
        segments.push(SectionSegment::Group(current));
    }

    for seg in &mut segments {
        if let SectionSegment::Group(items) = seg {
            items.sort_by(|(_, ka), (_, kb)| compare_comment_text(ka, kb));
        }
    }

    let mut high_water: Option<String> = None;
    let mut pending_comment: Option<SourceRange> = None;
    for seg in &segments {
        match seg {
            SectionSegment::Comment(c) => pending_comment = Some(c.info().range),
            SectionSegment::Group(items) => {
                if let (Some(hwm), Some((_, first_key))) = (&high_water, items.first()) {
                    if compare_comment_text(hwm, first_key) == Ordering::Greater {
                        let range = pending_comment.unwrap_or(section.info.range);
                        diagnostics.push(Diagnostic::new(DiagnosticKind::CommentPreventsSectionSort, range));
                    }
                }
                if let Some((_, last_key)) = items.last() {
                    high_water = Some(match &high_water {
                        Some(hwm) if compare_comment_text(hwm, last_key) == Ordering::Greater => hwm.clone(),
                        _ => last_key.clone(),
                    });
                }
            }
        }
    }

    let mut rebuilt = Vec::new();
    for seg in segments {
        match seg {
            SectionSegment::Comment(c) => rebuilt.push(c),
            SectionSegment::Group(items) => rebuilt.extend(items.into_iter().map(|(b, _)| b)),
        }
    }
    section.children = rebuilt;
}
