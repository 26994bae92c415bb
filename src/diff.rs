//! Tree diffing (spec.md §4.7, "SetBaseVersion"): mark every node in a
//! new tree with whether it is unchanged relative to a prior version,
//! using a path-shaped identity key per variant rather than a positional
//! (line-number) diff, so that adding a suffix at the top of a long file
//! does not appear to change every line after it.

use hashbrown::{HashMap, HashSet};

use crate::options::DiffOptions;
use crate::tree::Block;

fn variant_tag(block: &Block) -> &'static str {
    match block {
        Block::List(_) => "list",
        Block::Section(_) => "section",
        Block::Suffixes(_) => "suffixes",
        Block::Suffix(_) => "suffix",
        Block::Wildcard(_) => "wildcard",
        Block::Comment(_) => "comment",
    }
}

/// The part of a node's identity that comes from itself, not its
/// ancestry: a `Section`'s name, a `Suffix`'s domain, a `Comment`'s text.
/// `Suffixes` blocks identify by maintainer name since that is the one
/// field expected to be stable across edits to the block's body.
fn local_key(block: &Block) -> String {
    match block {
        Block::List(_) => String::new(),
        Block::Section(s) => s.name.clone(),
        Block::Suffixes(s) => s.maintainer.name.clone(),
        Block::Suffix(s) => s.domain.ascii_string(),
        Block::Wildcard(w) => {
            let exceptions: Vec<&str> = w.exceptions.iter().map(|l| l.as_ascii()).collect();
            format!("{},{}", w.domain.ascii_string(), exceptions.join(","))
        }
        Block::Comment(c) => c.text.join("\n"),
    }
}

fn identity_key(parent_key: &str, block: &Block) -> String {
    format!("{parent_key}/{}:{}", variant_tag(block), local_key(block))
}

struct Indexed {
    key: String,
    parent_key: String,
}

fn collect(block: &Block, parent_key: &str, out: &mut Vec<Indexed>) {
    let key = identity_key(parent_key, block);
    out.push(Indexed {
        key: key.clone(),
        parent_key: parent_key.to_string(),
    });
    for child in block.children() {
        collect(child, &key, out);
    }
}

/// Mark `set_base_version(old, new, options)`: walk `new`, looking up
/// each node's identity key in the index built from `old`. Returns
/// whether `block` itself ended up marked changed, so the caller
/// (recursing) can bubble the dirty bit to its parent without having to
/// walk a separate parent-pointer chain.
fn mark(block: &mut Block, parent_key: &str, changed_keys: &HashSet<String>, options: &DiffOptions) -> bool {
    let key = identity_key(parent_key, block);
    let mut self_changed = changed_keys.contains(&key);

    let is_suffixes = matches!(block, Block::Suffixes(_));
    if let Some(children) = block.children_mut() {
        for child in children.iter_mut() {
            if mark(child, &key, changed_keys, options) {
                self_changed = true;
            }
        }
        if is_suffixes && options.whole_suffix_blocks && self_changed {
            for child in children.iter_mut() {
                child.info_mut().is_unchanged = false;
            }
        }
    }

    block.info_mut().is_unchanged = !self_changed;
    self_changed
}

/// Mark every node of `new` unchanged/changed relative to `old`.
///
/// A node's identity key is ambiguous (and therefore treated as changed)
/// if it occurs more than once on either side; a node whose key vanished
/// from `old` entirely marks its *surviving* parent changed, since that
/// parent's child set differs even though the parent's own key matches.
/// A changed node's ancestors are marked changed in turn, stopping as
/// soon as an already-changed ancestor is reached.
pub fn set_base_version(old: &Block, new: &mut Block, options: DiffOptions) {
    let mut old_index = Vec::new();
    collect(old, "", &mut old_index);
    let mut old_counts: HashMap<String, usize> = HashMap::new();
    for entry in &old_index {
        *old_counts.entry(entry.key.clone()).or_insert(0) += 1;
    }

    let mut new_index = Vec::new();
    collect(new, "", &mut new_index);
    let mut new_counts: HashMap<String, usize> = HashMap::new();
    for entry in &new_index {
        *new_counts.entry(entry.key.clone()).or_insert(0) += 1;
    }

    let deleted_parent_keys: HashSet<String> = old_index
        .iter()
        .filter(|e| old_counts.get(&e.key) == Some(&1) && !new_counts.contains_key(&e.key))
        .map(|e| e.parent_key.clone())
        .collect();

    let changed_keys: HashSet<String> = new_index
        .iter()
        .filter(|e| {
            let duplicated_in_new = new_counts.get(&e.key).copied().unwrap_or(0) > 1;
            let absent_from_old = !old_counts.contains_key(&e.key);
            let duplicated_in_old = old_counts.get(&e.key).copied().unwrap_or(0) > 1;
            let parent_of_a_deletion = deleted_parent_keys.contains(&e.key);
            duplicated_in_new || absent_from_old || duplicated_in_old || parent_of_a_deletion
        })
        .map(|e| e.key.clone())
        .collect();

    mark(new, "", &changed_keys, &options);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::tree::{blocks_of_type, SectionBlock, SuffixBlock, SuffixesBlock};

    fn names(root: &Block) -> Vec<(String, bool)> {
        blocks_of_type::<SuffixBlock>(root)
            .into_iter()
            .map(|s| (s.domain.ascii_string(), s.info.is_unchanged))
            .collect()
    }

    #[test]
    fn identical_trees_are_entirely_unchanged() {
        let (old, _) = parse(b"com\nnet\n");
        let (new, _) = parse(b"com\nnet\n");
        let mut new_block = Block::List(new);
        set_base_version(&Block::List(old), &mut new_block, DiffOptions::default());
        assert!(names(&new_block).iter().all(|(_, unchanged)| *unchanged));
    }

    #[test]
    fn added_suffix_is_changed_and_dirties_ancestors() {
        let (old, _) = parse(b"com\n");
        let (new, _) = parse(b"com\nnet\n");
        let mut new_block = Block::List(new);
        set_base_version(&Block::List(old), &mut new_block, DiffOptions::default());
        let pairs = names(&new_block);
        assert!(pairs.contains(&("com".to_string(), true)));
        assert!(pairs.contains(&("net".to_string(), false)));

        let suffixes = blocks_of_type::<SuffixesBlock>(&new_block);
        assert!(!suffixes[0].info.is_unchanged);
    }

    #[test]
    fn deleted_suffix_dirties_surviving_parent() {
        let (old, _) = parse(b"com\nnet\n");
        let (new, _) = parse(b"com\n");
        let mut new_block = Block::List(new);
        set_base_version(&Block::List(old), &mut new_block, DiffOptions::default());
        let suffixes = blocks_of_type::<SuffixesBlock>(&new_block);
        assert!(!suffixes[0].info.is_unchanged);
        let pairs = names(&new_block);
        assert_eq!(pairs, vec![("com".to_string(), true)]);
    }

    #[test]
    fn whole_suffix_blocks_option_dirties_every_sibling() {
        let (old, _) = parse(b"com\n");
        let (new, _) = parse(b"com\nnet\n");
        let mut new_block = Block::List(new);
        set_base_version(
            &Block::List(old),
            &mut new_block,
            DiffOptions { whole_suffix_blocks: true },
        );
        assert!(names(&new_block).iter().all(|(_, unchanged)| !unchanged));
    }

    #[test]
    fn unrelated_section_stays_unchanged() {
        let input = b"// ===BEGIN ICANN DOMAINS===\n\ncom\n\n// ===END ICANN DOMAINS===\n";
        let (old, _) = parse(input);
        let (new, _) = parse(input);
        let mut new_block = Block::List(new);
        set_base_version(&Block::List(old), &mut new_block, DiffOptions::default());
        let sections = blocks_of_type::<SectionBlock>(&new_block);
        assert!(sections[0].info.is_unchanged);
    }
}
