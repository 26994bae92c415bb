//! Static exception tables: data, not logic (spec.md §9). Keep every
//! special-cased string here so it can be edited without touching
//! parser, Clean, or validator code.

/// Maintainer display names exempt from the contact-email requirement
/// (spec.md §4.8 "Maintainer metadata", §6 "Exemption tables"). Editing
/// a block that carries one of these names revokes the exemption — the
/// check in [`crate::validate`] only consults this table for blocks the
/// diff pass marked unchanged relative to the prior version.
pub const EMAIL_EXEMPT_MAINTAINERS: &[&str] = &[
    "Amazon Registry Services, Inc.",
    "Google, Inc.",
    "Nokia",
    "OVH SAS",
    "Uniregistry, Corp.",
];

pub fn is_email_exempt(maintainer_name: &str) -> bool {
    EMAIL_EXEMPT_MAINTAINERS
        .iter()
        .any(|&exempt| exempt == maintainer_name)
}

/// The two substrings that bound the Amazon super-block during private
/// section sorting (spec.md §4.5, §9 open question (a)). Sorting treats
/// every maintainer block from a comment containing
/// [`AMAZON_BLOCK_START`] through a comment containing
/// [`AMAZON_BLOCK_END`] as one logical group keyed by `"Amazon"`.
pub const AMAZON_BLOCK_START: &str = "Amazon : https://www.amazon.com";
pub const AMAZON_BLOCK_END: &str = "concludes Amazon";
pub const AMAZON_GROUP_KEY: &str = "Amazon";

/// A legacy-obfuscated maintainer address pattern retained only for
/// compatibility with existing list entries (spec.md §9): some
/// maintainer headers spell an address as `user at lohmus dot me`
/// instead of `user@lohmus.me` to dodge scrapers. The metadata
/// extractor does not attempt to de-obfuscate this (it would require
/// guessing at arbitrary future obfuscation schemes); it is recorded
/// here purely as documentation of a known `Other` line a human should
/// not be surprised to see.
pub const LOHMUS_DOT_ME_PATTERN: &str = "lohmus dot me";
