//! Mining a suffix block's header comment for `name`, URLs, contact
//! addresses, and free notes (spec.md §4.4 "Metadata extraction").

/// Parsed form of a `Suffixes` block's maintainer header comment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MaintainerInfo {
    pub name: String,
    pub urls: Vec<String>,
    pub maintainers: Vec<Address>,
    pub other: Vec<String>,
    /// True iff every non-blank header line could be classified *and* no
    /// classified line appeared after an unclassified one.
    pub machine_editable: bool,
}

impl MaintainerInfo {
    pub fn has_info(&self) -> bool {
        !self.name.is_empty()
            || !self.urls.is_empty()
            || !self.maintainers.is_empty()
            || !self.other.is_empty()
    }
}

/// An RFC-5322-shaped address: an optional display name plus the bare
/// address (`user@host`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub display: String,
    pub address: String,
}

impl Address {
    /// `Display <addr>` if a display name is present, else just `<addr>`.
    pub fn submitted_by_text(&self) -> String {
        if self.display.is_empty() {
            self.address.clone()
        } else {
            format!("{} {}", self.display, self.address)
        }
    }
}

const FULLWIDTH_COLON: char = '\u{FF1A}';

/// Case-insensitive string equality for the fixed English phrases this
/// extractor recognizes (`"submitted by"`, `"see also"`). Plain ASCII
/// case-folding is enough for the PSL's own header text, but the
/// `anycase` feature swaps in full Unicode case folding via `unicase`
/// for maintainers who paste in header text typed with a non-ASCII case
/// pair (e.g. a Turkish dotted/dotless I).
#[cfg(feature = "anycase")]
fn eq_ci(a: &str, b: &str) -> bool {
    unicase::UniCase::new(a) == unicase::UniCase::new(b)
}

#[cfg(not(feature = "anycase"))]
fn eq_ci(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Extract [`MaintainerInfo`] from a header comment's lines (leading
/// `//` already stripped, per `CommentBlock::text`).
pub fn extract(lines: &[String]) -> MaintainerInfo {
    let mut info = MaintainerInfo::default();
    let mut lines = lines.iter();
    let mut unclassified_seen = false;
    info.machine_editable = true;

    let Some(first) = lines.next() else {
        info.machine_editable = false;
        return info;
    };
    let first = first.trim();
    if first.is_empty() {
        info.machine_editable = false;
    } else if let Some((name, url)) = split_canonical(first) {
        info.name = name;
        info.urls.push(url);
    } else if let Some((name, url)) = split_legacy_paren(first) {
        info.name = name;
        info.urls.push(url);
    } else if let Some((name, addr)) = split_legacy_submitted_by(first) {
        info.name = name;
        info.maintainers.push(addr);
    } else if looks_like_url(first).is_some()
        || parse_address(first).is_some()
        || eq_ci(first, "see also")
    {
        // First line is itself a classifiable fact, not a name: fall
        // through to per-line classification below without consuming it
        // as the name.
        classify_line(first, &mut info, &mut unclassified_seen);
    } else {
        info.name = first.to_string();
    }

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        classify_line(line, &mut info, &mut unclassified_seen);
    }

    info
}

fn classify_line(line: &str, info: &mut MaintainerInfo, unclassified_seen: &mut bool) {
    if let Some(addrs) = split_submitted_by(line) {
        if *unclassified_seen {
            info.machine_editable = false;
        }
        info.maintainers.extend(addrs);
    } else if let Some(addr) = parse_address(line) {
        if *unclassified_seen {
            info.machine_editable = false;
        }
        info.maintainers.push(addr);
    } else if let Some(url) = looks_like_url(line) {
        if *unclassified_seen {
            info.machine_editable = false;
        }
        info.urls.push(url);
    } else {
        info.other.push(line.to_string());
        *unclassified_seen = true;
    }
}

/// `"<name> : <url>"`, colon may be ASCII or fullwidth, arbitrary
/// surrounding whitespace.
fn split_canonical(line: &str) -> Option<(String, String)> {
    let idx = line.find(|c| c == ':' || c == FULLWIDTH_COLON)?;
    let name = line[..idx].trim();
    let rest = line[idx + line[idx..].chars().next().unwrap().len_utf8()..].trim();
    if name.is_empty() || rest.is_empty() {
        return None;
    }
    let url = looks_like_url(rest)?;
    Some((name.to_string(), url))
}

/// Legacy shape: `"<name> (<url>)"`.
fn split_legacy_paren(line: &str) -> Option<(String, String)> {
    let open = line.rfind('(')?;
    let close = line.rfind(')')?;
    if close < open {
        return None;
    }
    let name = line[..open].trim();
    let inner = line[open + 1..close].trim();
    if name.is_empty() {
        return None;
    }
    let url = looks_like_url(inner)?;
    Some((name.to_string(), url))
}

/// Legacy shape: `"<name> : Submitted by <address>"`.
fn split_legacy_submitted_by(line: &str) -> Option<(String, Address)> {
    let idx = line.find(|c| c == ':' || c == FULLWIDTH_COLON)?;
    let name = line[..idx].trim();
    let rest = line[idx + line[idx..].chars().next().unwrap().len_utf8()..].trim();
    if name.is_empty() {
        return None;
    }
    let mut addrs = split_submitted_by(rest)?;
    if addrs.len() != 1 {
        return None;
    }
    Some((name.to_string(), addrs.remove(0)))
}

/// `"Submitted by X <a@b>" [" and " "Y <c@d>"]*`.
fn split_submitted_by(line: &str) -> Option<Vec<Address>> {
    let rest = strip_prefix_ci(line, "submitted by")?;
    let rest = rest.trim_start();
    if rest.is_empty() {
        return None;
    }
    let mut out = Vec::new();
    for part in split_and(rest) {
        out.push(parse_address(part.trim())?);
    }
    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

fn split_and(s: &str) -> Vec<&str> {
    s.split(" and ").collect()
}

fn strip_prefix_ci<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    if s.len() < prefix.len() {
        return None;
    }
    if eq_ci(&s[..prefix.len()], prefix) {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}

/// A bare RFC-5322 address, optionally preceded by a display name:
/// `Display Name <addr@host>` or a bare `addr@host`.
fn parse_address(s: &str) -> Option<Address> {
    if let (Some(open), Some(close)) = (s.find('<'), s.rfind('>')) {
        if open < close {
            let display = s[..open].trim().trim_matches('"').to_string();
            let addr = s[open + 1..close].trim();
            if is_bare_address(addr) {
                return Some(Address {
                    display,
                    address: addr.to_string(),
                });
            }
        }
    }
    if is_bare_address(s) {
        return Some(Address {
            display: String::new(),
            address: s.to_string(),
        });
    }
    None
}

fn is_bare_address(s: &str) -> bool {
    let Some(at) = s.find('@') else {
        return false;
    };
    let (local, domain) = (&s[..at], &s[at + 1..]);
    !local.is_empty()
        && !domain.is_empty()
        && !local.contains(char::is_whitespace)
        && !domain.contains(char::is_whitespace)
        && domain.contains('.')
}

fn looks_like_url(s: &str) -> Option<String> {
    let s = s.trim();
    if s.starts_with("http://") || s.starts_with("https://") {
        Some(s.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_shape_populates_name_and_url() {
        let lines = vec!["Example Org : https://example.org".to_string()];
        let info = extract(&lines);
        assert_eq!(info.name, "Example Org");
        assert_eq!(info.urls, vec!["https://example.org"]);
        assert!(info.machine_editable);
    }

    #[test]
    fn fullwidth_colon_is_tolerated() {
        let lines = vec!["Example\u{FF1A}https://example.org".to_string()];
        let info = extract(&lines);
        assert_eq!(info.name, "Example");
        assert_eq!(info.urls, vec!["https://example.org"]);
    }

    #[test]
    fn legacy_paren_shape() {
        let lines = vec!["Example Org (https://example.org)".to_string()];
        let info = extract(&lines);
        assert_eq!(info.name, "Example Org");
        assert_eq!(info.urls, vec!["https://example.org"]);
    }

    #[test]
    fn submitted_by_multiple_addresses() {
        let lines = vec![
            "Example Org : https://example.org".to_string(),
            "Submitted by Jane Doe <jane@example.org> and John Roe <john@example.org>"
                .to_string(),
        ];
        let info = extract(&lines);
        assert_eq!(info.maintainers.len(), 2);
        assert_eq!(info.maintainers[0].address, "jane@example.org");
        assert_eq!(info.maintainers[1].display, "John Roe");
    }

    #[test]
    fn unclassified_before_classified_breaks_machine_editable() {
        let lines = vec![
            "Example Org : https://example.org".to_string(),
            "some freeform note".to_string(),
            "Submitted by Jane Doe <jane@example.org>".to_string(),
        ];
        let info = extract(&lines);
        assert!(!info.machine_editable);
    }

    #[test]
    fn fallback_first_line_is_name_when_unrecognizable() {
        let lines = vec!["Example Org".to_string()];
        let info = extract(&lines);
        assert_eq!(info.name, "Example Org");
    }

    #[test]
    fn submitted_by_prefix_is_recognized_regardless_of_case() {
        let lines = vec![
            "Example Org : https://example.org".to_string(),
            "SUBMITTED BY Jane Doe <jane@example.org>".to_string(),
        ];
        let info = extract(&lines);
        assert_eq!(info.maintainers.len(), 1);
        assert_eq!(info.maintainers[0].address, "jane@example.org");
    }
}
