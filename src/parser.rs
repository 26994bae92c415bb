//! The line-oriented recursive-descent parser (spec.md §4.4): block
//! segmentation, suffix-block/comment-block classification, the
//! section-marker state machine, and error recovery.

use crate::domain::Name;
use crate::errors::{Diagnostic, DiagnosticKind};
use crate::metadata::{self, MaintainerInfo};
use crate::range::SourceRange;
use crate::text;
use crate::tree::{Block, CommentBlock, Info, ListBlock, SectionBlock, SuffixBlock, SuffixesBlock, WildcardBlock};

/// Parse raw bytes into a tree plus accumulated diagnostics. Never
/// panics, never discards the file outright: `(List, errors[])` per
/// spec.md §6.
pub fn parse(bytes: &[u8]) -> (ListBlock, Vec<Diagnostic>) {
    let (lines, text_diags) = text::normalize(bytes);
    let mut diagnostics: Vec<Diagnostic> = text_diags
        .into_iter()
        .enumerate()
        .map(|(i, d)| match d {
            text::TextDiagnostic::InvalidEncoding { label, guessed } => Diagnostic::new(
                DiagnosticKind::InvalidEncoding {
                    label: label.to_string(),
                    guessed,
                },
                SourceRange::single(0),
            ),
            text::TextDiagnostic::InvalidUnicode { range } => {
                let _ = i;
                Diagnostic::new(DiagnosticKind::InvalidUnicode, range)
            }
        })
        .collect();
    let list = parse_lines(&lines, &mut diagnostics);
    (list, diagnostics)
}

/// An open, not-yet-closed `Section` on the parser's stack.
struct Frame {
    name: String,
    children: Vec<Block>,
    start_line: usize,
}

fn parse_lines(lines: &[String], diagnostics: &mut Vec<Diagnostic>) -> ListBlock {
    let n = lines.len();
    let mut stack: Vec<Frame> = Vec::new();
    let mut root_children: Vec<Block> = Vec::new();

    let mut i = 0;
    while i < n {
        if lines[i].is_empty() {
            i += 1;
            continue;
        }
        let start = i;
        while i < n && !lines[i].is_empty() {
            i += 1;
        }
        let block_lines = &lines[start..i];
        if is_comment_block(block_lines) {
            process_comment_block(start, block_lines, &mut stack, &mut root_children, diagnostics);
        } else {
            let block = build_suffixes_block(start, block_lines, diagnostics);
            attach(&mut stack, &mut root_children, block);
        }
    }

    while let Some(frame) = stack.pop() {
        diagnostics.push(Diagnostic::new(
            DiagnosticKind::UnclosedSection {
                name: frame.name.clone(),
            },
            SourceRange::new(frame.start_line, n.max(frame.start_line + 1)),
        ));
        let section = finalize_frame(frame, n);
        attach(&mut stack, &mut root_children, section);
    }

    let range = root_children
        .iter()
        .map(|b| b.info().range)
        .fold(SourceRange::invalid(), SourceRange::merge);
    ListBlock {
        info: Info::new(range),
        children: root_children,
    }
}

fn is_comment_block(lines: &[String]) -> bool {
    lines.iter().all(|l| l.starts_with("//"))
}

fn attach(stack: &mut [Frame], root_children: &mut Vec<Block>, block: Block) {
    if let Some(top) = stack.last_mut() {
        top.children.push(block);
    } else {
        root_children.push(block);
    }
}

fn finalize_frame(frame: Frame, end_line_exclusive: usize) -> Block {
    Block::Section(SectionBlock {
        info: Info::new(SourceRange::new(frame.start_line, end_line_exclusive)),
        name: frame.name,
        children: frame.children,
    })
}

fn strip_comment_prefix(line: &str) -> String {
    let rest = line.strip_prefix("//").unwrap_or(line);
    rest.strip_prefix(' ').unwrap_or(rest).to_string()
}

enum Marker {
    Begin(String),
    End(String),
}

/// A section marker has the form `// ===BEGIN <name>===` or
/// `// ===END <name>===`.
fn parse_marker(line: &str) -> Option<Marker> {
    let rest = line.strip_prefix("// ===")?;
    let rest = rest.strip_suffix("===")?;
    if let Some(name) = rest.strip_prefix("BEGIN ") {
        return Some(Marker::Begin(name.trim().to_string()));
    }
    if let Some(name) = rest.strip_prefix("END ") {
        return Some(Marker::End(name.trim().to_string()));
    }
    None
}

fn flush_comment(
    buf: &mut Vec<String>,
    start: usize,
    end: usize,
    stack: &mut [Frame],
    root_children: &mut Vec<Block>,
) {
    if buf.is_empty() {
        return;
    }
    let comment = Block::Comment(CommentBlock {
        info: Info::new(SourceRange::new(start, end)),
        text: core::mem::take(buf),
    });
    attach(stack, root_children, comment);
}

fn process_comment_block(
    start: usize,
    block_lines: &[String],
    stack: &mut Vec<Frame>,
    root_children: &mut Vec<Block>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let mut buf: Vec<String> = Vec::new();
    let mut buf_start = start;

    for (j, raw) in block_lines.iter().enumerate() {
        let line_idx = start + j;
        let line = raw.as_str();
        if line.starts_with("// ===") {
            match parse_marker(line) {
                Some(Marker::Begin(name)) => {
                    flush_comment(&mut buf, buf_start, line_idx, stack, root_children);
                    if let Some(top) = stack.last() {
                        diagnostics.push(Diagnostic::new(
                            DiagnosticKind::NestedSection {
                                outer: top.name.clone(),
                                inner: name.clone(),
                            },
                            SourceRange::single(line_idx),
                        ));
                    }
                    stack.push(Frame {
                        name,
                        children: Vec::new(),
                        start_line: line_idx,
                    });
                    buf_start = line_idx + 1;
                }
                Some(Marker::End(name)) => {
                    flush_comment(&mut buf, buf_start, line_idx, stack, root_children);
                    match stack.last() {
                        None => {
                            diagnostics.push(Diagnostic::new(
                                DiagnosticKind::UnstartedSection { name },
                                SourceRange::single(line_idx),
                            ));
                        }
                        Some(top) if top.name == name => {
                            let frame = stack.pop().unwrap();
                            let section = finalize_frame(frame, line_idx + 1);
                            attach(stack, root_children, section);
                        }
                        Some(top) => {
                            diagnostics.push(Diagnostic::new(
                                DiagnosticKind::MismatchedSection {
                                    opened: top.name.clone(),
                                    closed: name,
                                },
                                SourceRange::single(line_idx),
                            ));
                            let frame = stack.pop().unwrap();
                            let section = finalize_frame(frame, line_idx + 1);
                            attach(stack, root_children, section);
                        }
                    }
                    buf_start = line_idx + 1;
                }
                None => {
                    diagnostics.push(Diagnostic::new(
                        DiagnosticKind::UnknownSectionMarker {
                            text: line.to_string(),
                        },
                        SourceRange::single(line_idx),
                    ));
                    if buf.is_empty() {
                        buf_start = line_idx;
                    }
                    buf.push(strip_comment_prefix(line));
                }
            }
        } else {
            if buf.is_empty() {
                buf_start = line_idx;
            }
            buf.push(strip_comment_prefix(line));
        }
    }
    flush_comment(&mut buf, buf_start, start + block_lines.len(), stack, root_children);
}

fn build_suffixes_block(start: usize, block_lines: &[String], diagnostics: &mut Vec<Diagnostic>) -> Block {
    let mut idx = 0;
    let mut header_text: Vec<String> = Vec::new();
    while idx < block_lines.len() && block_lines[idx].starts_with("//") {
        let line = &block_lines[idx];
        if line.starts_with("// ===") {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::SectionInSuffixBlock { text: line.clone() },
                SourceRange::single(start + idx),
            ));
        }
        header_text.push(strip_comment_prefix(line));
        idx += 1;
    }

    let header_present = !header_text.is_empty();
    let mut children: Vec<Block> = Vec::new();
    if header_present {
        children.push(Block::Comment(CommentBlock {
            info: Info::new(SourceRange::new(start, start + idx)),
            text: header_text.clone(),
        }));
    }

    let maintainer = if header_present {
        metadata::extract(&header_text)
    } else {
        MaintainerInfo {
            machine_editable: true,
            ..MaintainerInfo::default()
        }
    };

    let mut i = idx;
    let mut comment_buf: Vec<String> = Vec::new();
    let mut comment_start = start + i;
    while i < block_lines.len() {
        let line_idx = start + i;
        let line = block_lines[i].as_str();
        if line.starts_with("//") {
            if line.starts_with("// ===") {
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::SectionInSuffixBlock {
                        text: line.to_string(),
                    },
                    SourceRange::single(line_idx),
                ));
            }
            if comment_buf.is_empty() {
                comment_start = line_idx;
            }
            comment_buf.push(strip_comment_prefix(line));
        } else {
            if !comment_buf.is_empty() {
                children.push(Block::Comment(CommentBlock {
                    info: Info::new(SourceRange::new(comment_start, line_idx)),
                    text: core::mem::take(&mut comment_buf),
                }));
            }
            parse_body_line(line, line_idx, &mut children, diagnostics);
        }
        i += 1;
    }
    if !comment_buf.is_empty() {
        children.push(Block::Comment(CommentBlock {
            info: Info::new(SourceRange::new(comment_start, start + block_lines.len())),
            text: comment_buf,
        }));
    }

    let range = SourceRange::new(start, start + block_lines.len());
    Block::Suffixes(SuffixesBlock {
        info: Info::new(range),
        maintainer,
        children,
    })
}

fn parse_body_line(line: &str, line_idx: usize, children: &mut Vec<Block>, diagnostics: &mut Vec<Diagnostic>) {
    if let Some(rest) = line.strip_prefix('!') {
        if let Ok(full) = Name::parse(rest) {
            if let Some(base) = full.without_first_label() {
                let label = full.first_label().clone();
                let attached = children.iter_mut().rev().find_map(|child| match child {
                    Block::Wildcard(w) if w.domain == base => {
                        if !w.exceptions.contains(&label) {
                            w.exceptions.push(label.clone());
                        }
                        Some(())
                    }
                    _ => None,
                });
                if attached.is_none() {
                    diagnostics.push(Diagnostic::new(
                        DiagnosticKind::InvalidSuffix {
                            text: line.to_string(),
                        },
                        SourceRange::single(line_idx),
                    ));
                }
                return;
            }
        }
        diagnostics.push(Diagnostic::new(
            DiagnosticKind::InvalidSuffix {
                text: line.to_string(),
            },
            SourceRange::single(line_idx),
        ));
        return;
    }

    if let Some(rest) = line.strip_prefix("*.") {
        match Name::parse(rest) {
            Ok(domain) => children.push(Block::Wildcard(WildcardBlock {
                info: Info::new(SourceRange::single(line_idx)),
                domain,
                exceptions: Vec::new(),
            })),
            Err(_) => diagnostics.push(Diagnostic::new(
                DiagnosticKind::InvalidSuffix {
                    text: line.to_string(),
                },
                SourceRange::single(line_idx),
            )),
        }
        return;
    }

    match Name::parse(line) {
        Ok(domain) => children.push(Block::Suffix(SuffixBlock {
            info: Info::new(SourceRange::single(line_idx)),
            domain,
        })),
        Err(_) => diagnostics.push(Diagnostic::new(
            DiagnosticKind::InvalidSuffix {
                text: line.to_string(),
            },
            SourceRange::single(line_idx),
        )),
    }
}
