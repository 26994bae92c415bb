// Self-contained PSL snippets; no external fixtures needed.

use pslkit::{DiffOptions, List, Name};

const SNIPPET: &str = "\
// ===BEGIN ICANN DOMAINS===

com
net
co.uk

// ===END ICANN DOMAINS===
// ===BEGIN PRIVATE DOMAINS===

// Example Org : https://example.org
// Submitted by Jane Doe <jane@example.org>
example.org
*.platform.example.org

// ===END PRIVATE DOMAINS===
";

#[test]
fn parses_a_two_section_list_without_diagnostics() {
    let list: List = SNIPPET.parse().unwrap();
    assert!(list.diagnostics().is_empty());
}

#[test]
fn round_trips_through_marshal_psl() {
    let list = List::parse(SNIPPET.as_bytes());
    assert_eq!(list.marshal_psl(), SNIPPET);
}

#[test]
fn queries_public_suffix_across_both_sections() {
    let list = List::parse(SNIPPET.as_bytes());

    let icann = Name::parse("www.example.co.uk").unwrap();
    assert_eq!(list.public_suffix(&icann).ascii_string(), "co.uk");

    let private = Name::parse("api.platform.example.org").unwrap();
    assert_eq!(list.public_suffix(&private).ascii_string(), "platform.example.org");
    assert_eq!(
        list.registered_domain(&private).unwrap().ascii_string(),
        "api.platform.example.org"
    );
}

#[test]
fn clean_sorts_suffixes_and_leaves_semantics_unchanged() {
    let mut list = List::parse(b"net\ncom\nco.uk\n");
    let before = Name::parse("www.example.co.uk").unwrap();
    let suffix_before = list.public_suffix(&before);

    list.clean();

    // Domain collation orders by label sequence from the TLD inward, so
    // these three single-rule entries (no shared ancestry) sort by their
    // own TLD label: "com" < "net" < "uk" (co.uk's reversed key is
    // "uk.co").
    assert_eq!(list.marshal_psl(), "com\nnet\nco.uk\n");
    assert_eq!(list.public_suffix(&before), suffix_before);
}

#[test]
fn set_base_version_marks_only_the_added_entry_changed() {
    let old = List::parse(b"com\nnet\n");
    let mut new = List::parse(b"com\nnet\norg\n");
    new.set_base_version(&old, DiffOptions::default());

    let debug = new.marshal_debug();
    assert!(debug.contains("+ org"));
    assert!(!debug.contains("+ com"));
    assert!(!debug.contains("+ net"));
}

#[test]
fn validate_offline_flags_a_private_block_with_no_maintainer_contact() {
    let list = List::parse(
        b"// ===BEGIN ICANN DOMAINS===\n\ncom\n\n// ===END ICANN DOMAINS===\n// ===BEGIN PRIVATE DOMAINS===\n\n// Some Org\nexample.net\n\n// ===END PRIVATE DOMAINS===\n",
    );
    let diags = list.validate_offline();
    assert!(diags
        .iter()
        .any(|d| matches!(d.kind, pslkit::DiagnosticKind::MissingEntityEmail)));
}
