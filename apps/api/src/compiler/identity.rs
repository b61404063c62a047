//! Personal-info extraction.
//!
//! Each field has an ordered rule list, most dialect-specific first. The
//! first rule that yields a value wins and later rules for that field are
//! never consulted. Fields are independent of each other.

use std::sync::LazyLock;

use regex::Regex;

use crate::compiler::inline::{to_plain_text, unescape_specials};
use crate::compiler::model::IdentityRecord;

type Rule = fn(&str) -> Option<String>;

static NAME_CMD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\name\s*\{([^{}]*)\}\s*\{([^{}]*)\}").unwrap());
static HUGE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\s*\\(?:Huge|huge|LARGE)\s*(?:\\scshape\s*|\\bfseries\s*)*([^{}\\]+?)\s*\}").unwrap()
});
static AUTHOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\author\s*\{([^{}]+)\}").unwrap());
static BARE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*([A-Z][a-z]+(?:[ \t]+[A-Z][a-z]+){1,2})[ \t]*$").unwrap()
});

static EMAIL_CMD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\email\s*\{([^{}]+)\}").unwrap());
static MAILTO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"mailto:([^\s{}]+@[^\s{}]+)").unwrap());
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z0-9._+-]+@[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,})").unwrap()
});

static PHONE_CMD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\(?:phone|mobile)\s*(?:\[[^\]]*\])?\s*\{([^{}]+)\}").unwrap()
});
static TEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"tel:(\+?[\d\-.() ]*\d)").unwrap());
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+?\(?\d[\d ().-]{6,}\d").unwrap());

static SOCIAL_LINKEDIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\social\s*\[\s*linkedin\s*\]\s*\{([^{}]+)\}").unwrap()
});
static LINKEDIN_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"linkedin\.com/in/([A-Za-z0-9_-]+)").unwrap());
static SOCIAL_GITHUB_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\social\s*\[\s*github\s*\]\s*\{([^{}]+)\}").unwrap());
static GITHUB_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"github\.com/([A-Za-z0-9_-]+)").unwrap());

static HOMEPAGE_CMD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\homepage\s*\{([^{}]+)\}").unwrap());
static LINK_CMD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\(?:href|url)\s*\{([^{}]+)\}").unwrap());
static BARE_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://[^\s{}<>]+").unwrap());

const NAME_RULES: &[Rule] = &[
    name_from_name_command,
    |s| capture(&HUGE_NAME_RE, s),
    |s| capture(&AUTHOR_RE, s),
    |s| capture(&BARE_NAME_RE, s),
];

const EMAIL_RULES: &[Rule] = &[
    |s| capture(&EMAIL_CMD_RE, s),
    |s| capture(&MAILTO_RE, s),
    |s| capture(&EMAIL_RE, s),
];

const PHONE_RULES: &[Rule] = &[
    |s| capture(&PHONE_CMD_RE, s),
    |s| capture(&TEL_RE, s),
    bare_phone,
];

const LINKEDIN_RULES: &[Rule] = &[
    |s| capture(&SOCIAL_LINKEDIN_RE, s).map(|v| handle(&v)),
    |s| capture(&LINKEDIN_URL_RE, s),
];

const GITHUB_RULES: &[Rule] = &[
    |s| capture(&SOCIAL_GITHUB_RE, s).map(|v| handle(&v)),
    |s| capture(&GITHUB_URL_RE, s),
];

const HOMEPAGE_RULES: &[Rule] = &[
    |s| capture(&HOMEPAGE_CMD_RE, s).map(|v| unescape_specials(&v)),
    |s| first_personal_url(LINK_CMD_RE.captures_iter(s).filter_map(|c| c.get(1)).map(|m| m.as_str())),
    |s| first_personal_url(BARE_URL_RE.find_iter(s).map(|m| m.as_str())),
];

/// Builds the identity record for `source`. Never fails.
pub fn extract_identity(source: &str) -> IdentityRecord {
    IdentityRecord {
        name: first_match(source, NAME_RULES),
        email: first_match(source, EMAIL_RULES),
        phone: first_match(source, PHONE_RULES),
        linkedin_handle: first_match(source, LINKEDIN_RULES),
        github_handle: first_match(source, GITHUB_RULES),
        homepage: first_match(source, HOMEPAGE_RULES),
    }
}

fn first_match(source: &str, rules: &[Rule]) -> Option<String> {
    rules.iter().find_map(|rule| rule(source))
}

/// First capture group of the first match, as plain text.
fn capture(re: &Regex, source: &str) -> Option<String> {
    re.captures(source)
        .and_then(|caps| caps.get(1))
        .map(|m| to_plain_text(m.as_str()))
        .filter(|value| !value.is_empty())
}

fn name_from_name_command(source: &str) -> Option<String> {
    let caps = NAME_CMD_RE.captures(source)?;
    let parts: Vec<String> = [caps.get(1), caps.get(2)]
        .into_iter()
        .flatten()
        .map(|m| to_plain_text(m.as_str()))
        .filter(|part| !part.is_empty())
        .collect();
    (!parts.is_empty()).then(|| parts.join(" "))
}

/// Phone-shaped runs with 10 to 15 digits. Year ranges such as
/// `2019 -- 2021` are skipped.
fn bare_phone(source: &str) -> Option<String> {
    PHONE_RE
        .find_iter(source)
        .map(|m| m.as_str().trim())
        .find(|candidate| {
            let digits = candidate.chars().filter(char::is_ascii_digit).count();
            (10..=15).contains(&digits) && !candidate.contains("--")
        })
        .map(str::to_string)
}

/// Last path segment of a profile URL or handle, without a leading `@`.
fn handle(value: &str) -> String {
    value
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(value)
        .trim_start_matches('@')
        .to_string()
}

fn first_personal_url<'a>(candidates: impl Iterator<Item = &'a str>) -> Option<String> {
    candidates
        .map(|url| unescape_specials(url.trim()))
        .find(|url| {
            let lower = url.to_ascii_lowercase();
            !lower.is_empty()
                && !lower.starts_with("mailto:")
                && !lower.starts_with("tel:")
                && !lower.contains("linkedin.com")
                && !lower.contains("github.com")
        })
}
