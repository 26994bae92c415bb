// Self-contained PSL snippets; no external fixtures needed.
//
// spec.md §8, concrete scenario 6: a duplicated entry in `new` that is
// textually identical to a single entry in `old` is still marked changed
// in both occurrences, because the identity key is ambiguous (occurs
// twice in `new`) even though it matches `old` exactly once.

use pslkit::{blocks_of_type, tree::SuffixBlock, DiffOptions, List};

#[test]
fn duplicated_entry_in_new_is_marked_changed_even_though_old_had_one_copy() {
    let old = List::parse(b"com\nnet\n");
    let mut new = List::parse(b"com\ncom\nnet\n");
    new.set_base_version(&old, DiffOptions::default());

    let suffixes = blocks_of_type::<SuffixBlock>(new.root());
    let com_entries: Vec<_> = suffixes
        .iter()
        .filter(|s| s.domain.ascii_string() == "com")
        .collect();
    assert_eq!(com_entries.len(), 2);
    assert!(com_entries.iter().all(|s| !s.info.is_unchanged));

    let net_entry = suffixes.iter().find(|s| s.domain.ascii_string() == "net").unwrap();
    assert!(net_entry.info.is_unchanged);
}
