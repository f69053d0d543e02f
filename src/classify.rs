//! Pure path and URL classification used to label analytics events.

/// Known course sections, keyed by the path with its locale prefix removed.
const SECTION_MAP: &[(&str, &str)] = &[("/", "home"), ("/introduction", "introduction")];

/// Host substrings mapped to resource types. First match wins.
const RESOURCE_RULES: &[(&str, &str)] = &[
    ("hubermanlab.com", "huberman_lab"),
    ("youtube.com", "youtube"),
    ("youtu.be", "youtube"),
    ("coursera.org", "coursera"),
    ("the-joy-of-react", "joy_of_react"),
    ("joyofreact", "joy_of_react"),
    ("academicaffairs.arizona.edu", "interleaving_study"),
];

pub const UNKNOWN_SECTION: &str = "unknown";
pub const EXTERNAL_RESOURCE: &str = "external";

/// Maps a navigation path such as `/en/introduction` to a section label.
pub fn section_name(path: &str) -> String {
    let remainder = strip_locale_prefix(path);
    let key = match remainder.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    };

    if let Some((_, section)) = SECTION_MAP.iter().find(|(route, _)| *route == key) {
        return (*section).to_string();
    }

    let normalized = normalize_segment(key);
    if normalized.is_empty() {
        UNKNOWN_SECTION.to_string()
    } else {
        normalized
    }
}

/// Removes a leading `/xx` segment where `xx` is two lowercase ASCII letters.
/// A longer first segment like `/english` is left alone.
fn strip_locale_prefix(path: &str) -> &str {
    let Some(rest) = path.strip_prefix('/') else {
        return path;
    };

    let bytes = rest.as_bytes();
    let is_locale = bytes.len() >= 2
        && bytes[0].is_ascii_lowercase()
        && bytes[1].is_ascii_lowercase()
        && (bytes.len() == 2 || bytes[2] == b'/');

    if is_locale {
        &rest[2..]
    } else {
        path
    }
}

fn normalize_segment(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            c if c.is_alphanumeric() => out.extend(c.to_lowercase()),
            '_' | '-' | '/' | '.' => out.push('_'),
            c if c.is_whitespace() => out.push('_'),
            _ => {}
        }
    }
    out.trim_matches('_').to_string()
}

/// Whether a link leaves the site and should be tracked as outbound.
pub fn is_outbound_href(href: &str) -> bool {
    href.starts_with("http://") || href.starts_with("https://")
}

/// Lowercased hostname of an absolute URL, or `None` when it cannot be parsed.
pub fn link_domain(url: &str) -> Option<String> {
    let (scheme, rest) = url.trim().split_once("://")?;
    if scheme.is_empty()
        || !scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    {
        return None;
    }

    let authority = rest
        .split(|c| matches!(c, '/' | '?' | '#'))
        .next()
        .unwrap_or_default();
    let host_port = authority
        .rsplit_once('@')
        .map_or(authority, |(_, host)| host);

    let host = if let Some(bracketed) = host_port.strip_prefix('[') {
        // IPv6 literal
        let end = bracketed.find(']')?;
        &host_port[..end + 2]
    } else {
        host_port.split(':').next().unwrap_or_default()
    };

    if host.is_empty() || host.chars().any(char::is_whitespace) {
        return None;
    }

    Some(host.to_ascii_lowercase())
}

/// Classifies an outbound resource by host. Unparsable URLs are `external`.
pub fn resource_type(url: &str) -> &'static str {
    let Some(host) = link_domain(url) else {
        return EXTERNAL_RESOURCE;
    };

    RESOURCE_RULES
        .iter()
        .find(|(needle, _)| host.contains(needle))
        .map_or(EXTERNAL_RESOURCE, |(_, kind)| *kind)
}
