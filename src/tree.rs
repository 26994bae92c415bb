//! The lossless syntax tree: a tagged-variant `Block` enum, common `Info`
//! (source range + changed bit), and a generic "collect all blocks of a
//! variant" traversal (spec.md §9, "Polymorphic tree").

use crate::domain::{Label, Name};
use crate::metadata::MaintainerInfo;
use crate::range::SourceRange;

/// State every `Block` variant carries: where it came from, and whether
/// [`crate::diff::set_base_version`] found it unchanged relative to a
/// prior version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Info {
    pub range: SourceRange,
    pub is_unchanged: bool,
}

impl Info {
    pub fn new(range: SourceRange) -> Self {
        Self {
            range,
            is_unchanged: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ListBlock {
    pub info: Info,
    pub children: Vec<Block>,
}

#[derive(Debug, Clone)]
pub struct SectionBlock {
    pub info: Info,
    pub name: String,
    pub children: Vec<Block>,
}

pub const ICANN_SECTION: &str = "ICANN DOMAINS";
pub const PRIVATE_SECTION: &str = "PRIVATE DOMAINS";

#[derive(Debug, Clone)]
pub struct SuffixesBlock {
    pub info: Info,
    pub maintainer: MaintainerInfo,
    /// A `Comment` header optionally first, then `Suffix`/`Wildcard`/inline
    /// `Comment`s, in source order.
    pub children: Vec<Block>,
}

impl SuffixesBlock {
    /// The header comment, if the first child is one. By construction
    /// (the parser splits a suffix block at its first non-comment line),
    /// a body comment never appears before the first suffix/wildcard, so
    /// "first child is a Comment" unambiguously means "header".
    pub fn header(&self) -> Option<&CommentBlock> {
        match self.children.first() {
            Some(Block::Comment(c)) => Some(c),
            _ => None,
        }
    }

    pub fn header_mut(&mut self) -> Option<&mut CommentBlock> {
        match self.children.first_mut() {
            Some(Block::Comment(c)) => Some(c),
            _ => None,
        }
    }

    pub fn body(&self) -> impl Iterator<Item = &Block> {
        let skip = usize::from(self.header().is_some());
        self.children.iter().skip(skip)
    }
}

#[derive(Debug, Clone)]
pub struct SuffixBlock {
    pub info: Info,
    pub domain: Name,
}

#[derive(Debug, Clone)]
pub struct WildcardBlock {
    pub info: Info,
    pub domain: Name,
    pub exceptions: Vec<Label>,
}

#[derive(Debug, Clone)]
pub struct CommentBlock {
    pub info: Info,
    /// Leading `//` and surrounding whitespace already stripped.
    pub text: Vec<String>,
}

/// The tagged-variant tree node. See spec.md §3 for the invariants each
/// variant must uphold.
#[derive(Debug, Clone)]
pub enum Block {
    List(ListBlock),
    Section(SectionBlock),
    Suffixes(SuffixesBlock),
    Suffix(SuffixBlock),
    Wildcard(WildcardBlock),
    Comment(CommentBlock),
}

impl Block {
    pub fn info(&self) -> Info {
        match self {
            Block::List(b) => b.info,
            Block::Section(b) => b.info,
            Block::Suffixes(b) => b.info,
            Block::Suffix(b) => b.info,
            Block::Wildcard(b) => b.info,
            Block::Comment(b) => b.info,
        }
    }

    pub fn info_mut(&mut self) -> &mut Info {
        match self {
            Block::List(b) => &mut b.info,
            Block::Section(b) => &mut b.info,
            Block::Suffixes(b) => &mut b.info,
            Block::Suffix(b) => &mut b.info,
            Block::Wildcard(b) => &mut b.info,
            Block::Comment(b) => &mut b.info,
        }
    }

    pub fn children(&self) -> &[Block] {
        match self {
            Block::List(b) => &b.children,
            Block::Section(b) => &b.children,
            Block::Suffixes(b) => &b.children,
            Block::Suffix(_) | Block::Wildcard(_) | Block::Comment(_) => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Block>> {
        match self {
            Block::List(b) => Some(&mut b.children),
            Block::Section(b) => Some(&mut b.children),
            Block::Suffixes(b) => Some(&mut b.children),
            Block::Suffix(_) | Block::Wildcard(_) | Block::Comment(_) => None,
        }
    }
}

/// Implemented by every leaf/branch struct (`SuffixBlock`, `SectionBlock`,
/// ...) so that [`blocks_of_type`] can do `BlocksOfType<V>(tree)` without
/// per-variant visitor boilerplate.
pub trait BlockVariant {
    fn extract(block: &Block) -> Option<&Self>;
}

macro_rules! impl_block_variant {
    ($ty:ty, $variant:ident) => {
        impl BlockVariant for $ty {
            fn extract(block: &Block) -> Option<&Self> {
                match block {
                    Block::$variant(b) => Some(b),
                    _ => None,
                }
            }
        }
    };
}

impl_block_variant!(ListBlock, List);
impl_block_variant!(SectionBlock, Section);
impl_block_variant!(SuffixesBlock, Suffixes);
impl_block_variant!(SuffixBlock, Suffix);
impl_block_variant!(WildcardBlock, Wildcard);
impl_block_variant!(CommentBlock, Comment);

/// Generic "collect all blocks of variant `T`" traversal, e.g.
/// `blocks_of_type::<SuffixBlock>(&list)` to find every suffix in the
/// tree regardless of nesting depth.
pub fn blocks_of_type<T: BlockVariant>(root: &Block) -> Vec<&T> {
    let mut out = Vec::new();
    walk(root, &mut |b| {
        if let Some(t) = T::extract(b) {
            out.push(t);
        }
    });
    out
}

fn walk<'a>(block: &'a Block, visit: &mut impl FnMut(&'a Block)) {
    visit(block);
    for child in block.children() {
        walk(child, visit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::MaintainerInfo;

    fn suffix(domain: &str) -> Block {
        Block::Suffix(SuffixBlock {
            info: Info::default(),
            domain: Name::parse(domain).unwrap(),
        })
    }

    #[test]
    fn blocks_of_type_finds_nested_suffixes() {
        let tree = Block::List(ListBlock {
            info: Info::default(),
            children: vec![Block::Section(SectionBlock {
                info: Info::default(),
                name: ICANN_SECTION.to_string(),
                children: vec![Block::Suffixes(SuffixesBlock {
                    info: Info::default(),
                    maintainer: MaintainerInfo::default(),
                    children: vec![suffix("com"), suffix("net")],
                })],
            })],
        });

        let suffixes = blocks_of_type::<SuffixBlock>(&tree);
        assert_eq!(suffixes.len(), 2);
        assert_eq!(suffixes[0].domain.ascii_string(), "com");
        assert_eq!(suffixes[1].domain.ascii_string(), "net");

        let sections = blocks_of_type::<SectionBlock>(&tree);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].name, ICANN_SECTION);
    }

    #[test]
    fn suffixes_block_header_detection() {
        let mut sb = SuffixesBlock {
            info: Info::default(),
            maintainer: MaintainerInfo::default(),
            children: vec![
                Block::Comment(CommentBlock {
                    info: Info::default(),
                    text: vec!["Example : https://example.com".to_string()],
                }),
                suffix("example.com"),
            ],
        };
        assert!(sb.header().is_some());
        assert_eq!(sb.body().count(), 1);
        sb.header_mut().unwrap().text.push("extra".to_string());
        assert_eq!(sb.header().unwrap().text.len(), 2);
    }
}
