// Self-contained PSL snippets; no external fixtures needed.

use pslkit::options::{DefaultPolicy, LegacyExemptPolicy};
use pslkit::{DiagnosticKind, List};

#[test]
fn nested_section_markers_are_fatal_and_block_rewriting() {
    let input = b"// ===BEGIN ICANN DOMAINS===\n// ===BEGIN FOO===\n// ===END FOO===\n// ===END ICANN DOMAINS===\n";
    let list = List::parse(input);
    assert!(!list.is_safe_to_rewrite(&DefaultPolicy));
    assert!(list
        .diagnostics()
        .iter()
        .any(|d| matches!(d.kind, DiagnosticKind::NestedSection { .. })));
}

#[test]
fn legacy_exempt_policy_downgrades_section_marker_noise_in_suffix_blocks() {
    let input = b"// ===BEGIN FOO===\ncom\n";
    let list = List::parse(input);
    assert!(!list.is_safe_to_rewrite(&DefaultPolicy));
    assert!(list.is_safe_to_rewrite(&LegacyExemptPolicy));
}

#[test]
fn a_clean_file_has_no_diagnostics_and_is_safe_to_rewrite() {
    let list = List::parse(b"com\nnet\n");
    assert!(list.diagnostics().is_empty());
    assert!(list.is_safe_to_rewrite(&DefaultPolicy));
}

#[test]
fn invalid_suffix_lines_are_fatal() {
    let list = List::parse(b"this has spaces\n");
    assert!(!list.is_safe_to_rewrite(&DefaultPolicy));
    assert!(!list.is_safe_to_rewrite(&LegacyExemptPolicy));
}
