//! Canonical PSL text emission (spec.md §4.6). The inverse of
//! [`crate::parser::parse`] for any tree with no fatal diagnostics:
//! marshal always terminates the file with a single trailing newline
//! and never emits blank lines inside a `Suffixes` block's body.
//!
//! Domains are written in Unicode form (spec.md §4.6, "Suffix: domain in
//! Unicode form"), not the canonical ASCII/Punycode form `Name` stores
//! internally — the round trip through [`crate::parser::parse`] survives
//! either way since `Name::parse` re-applies IDNA on read.

use crate::tree::{Block, CommentBlock, SuffixesBlock, WildcardBlock};

/// Render a tree back to PSL text.
pub fn marshal_psl(root: &Block) -> String {
    write(root, false)
}

/// Render a tree back to PSL text, annotating every line whose owning
/// block [`crate::tree::Info::is_unchanged`] is false with a leading
/// `+ ` marker. Meant for humans reviewing a [`crate::diff::set_base_version`]
/// result, not for round-tripping.
pub fn marshal_debug(root: &Block) -> String {
    write(root, true)
}

fn write(root: &Block, debug: bool) -> String {
    let mut out = String::new();
    write_block(root, &mut out, debug);
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

fn emit_line(out: &mut String, text: &str, changed: bool) {
    if changed {
        out.push_str("+ ");
    }
    out.push_str(text);
    out.push('\n');
}

fn write_top_level(children: &[Block], out: &mut String, debug: bool) {
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        write_block(child, out, debug);
    }
}

fn write_block(block: &Block, out: &mut String, debug: bool) {
    let changed = debug && !block.info().is_unchanged;
    match block {
        Block::List(l) => write_top_level(&l.children, out, debug),
        Block::Section(s) => {
            emit_line(out, &format!("// ===BEGIN {}===", s.name), changed);
            if !s.children.is_empty() {
                out.push('\n');
                write_top_level(&s.children, out, debug);
                out.push('\n');
            }
            emit_line(out, &format!("// ===END {}===", s.name), changed);
        }
        Block::Suffixes(s) => write_suffixes(s, out, debug),
        Block::Suffix(sb) => emit_line(out, &sb.domain.to_unicode_string(), changed),
        Block::Wildcard(w) => write_wildcard(w, out, debug),
        Block::Comment(c) => write_comment(c, out, debug),
    }
}

fn write_suffixes(s: &SuffixesBlock, out: &mut String, debug: bool) {
    for child in &s.children {
        write_body_line(child, out, debug);
    }
}

fn write_body_line(block: &Block, out: &mut String, debug: bool) {
    match block {
        Block::Comment(c) => write_comment(c, out, debug),
        Block::Suffix(sb) => emit_line(out, &sb.domain.to_unicode_string(), debug && !sb.info.is_unchanged),
        Block::Wildcard(w) => write_wildcard(w, out, debug),
        _ => {}
    }
}

fn write_comment(c: &CommentBlock, out: &mut String, debug: bool) {
    let changed = debug && !c.info.is_unchanged;
    for line in &c.text {
        if line.is_empty() {
            emit_line(out, "//", changed);
        } else {
            emit_line(out, &format!("// {line}"), changed);
        }
    }
}

fn write_wildcard(w: &WildcardBlock, out: &mut String, debug: bool) {
    let changed = debug && !w.info.is_unchanged;
    let domain = w.domain.to_unicode_string();
    emit_line(out, &format!("*.{domain}"), changed);
    for label in &w.exceptions {
        emit_line(out, &format!("!{}.{domain}", label.to_unicode()), changed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn round_trips_a_simple_suffix_block() {
        let input = "com\nnet\n";
        let (list, diags) = parse(input.as_bytes());
        assert!(diags.is_empty());
        let text = marshal_psl(&Block::List(list));
        assert_eq!(text, "com\nnet\n");
    }

    #[test]
    fn round_trips_a_section_with_nested_marker() {
        let input = "// ===BEGIN ICANN DOMAINS===\n\ncom\n\n// ===END ICANN DOMAINS===\n";
        let (list, diags) = parse(input.as_bytes());
        assert!(diags.is_empty());
        let text = marshal_psl(&Block::List(list));
        assert_eq!(text, input);
    }

    #[test]
    fn wildcard_and_exception_render_in_order() {
        let input = "*.bar.baz\n!foo.bar.baz\n";
        let (list, diags) = parse(input.as_bytes());
        assert!(diags.is_empty());
        let text = marshal_psl(&Block::List(list));
        assert_eq!(text, input);
    }

    #[test]
    fn idn_suffix_round_trips_in_unicode_form() {
        let input = "\u{5c0f}\u{3055}\u{3044}.jp\n";
        let (list, diags) = parse(input.as_bytes());
        assert!(diags.is_empty());
        let text = marshal_psl(&Block::List(list));
        assert_eq!(text, input);
    }

    #[test]
    fn debug_marshal_marks_changed_lines() {
        let input = "com\n";
        let (mut list, _) = parse(input.as_bytes());
        if let Block::Suffixes(s) = &mut list.children[0] {
            if let Block::Suffix(sb) = &mut s.children[0] {
                sb.info.is_unchanged = false;
            }
        }
        let text = marshal_debug(&Block::List(list));
        assert_eq!(text, "+ com\n");
    }
}
