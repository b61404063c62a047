//! Section segmentation, one strategy per dialect.

use std::sync::LazyLock;

use regex::Regex;

use crate::compiler::error::CompileError;
use crate::compiler::inline::to_plain_text;
use crate::compiler::model::{Dialect, RawSection};
use crate::compiler::scanner::{document_body, BraceMap, Span};

/// Title used when no section marker is recognized at all.
pub const FALLBACK_TITLE: &str = "Resume";

/// Longest bolded token still considered a section title in article sources.
const MAX_TITLE_CHARS: usize = 40;

/// Candidates with more source than this are body text, not titles.
const MAX_TITLE_SOURCE_BYTES: usize = 256;

/// Section names trusted in article-class sources. Anything else is dropped.
const KNOWN_SECTION_TITLES: &[&str] = &[
    "experience",
    "work experience",
    "professional experience",
    "relevant experience",
    "employment",
    "employment history",
    "education",
    "skills",
    "technical skills",
    "skills and interests",
    "projects",
    "personal projects",
    "selected projects",
    "summary",
    "professional summary",
    "profile",
    "objective",
    "certifications",
    "awards",
    "honors",
    "honors and awards",
    "publications",
    "leadership",
    "activities",
    "volunteer",
    "volunteering",
    "interests",
    "languages",
    "references",
    "coursework",
    "relevant coursework",
    "achievements",
];

static SECTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\section\*?\s*(?:\[[^\]]*\])?\s*\{").unwrap());

/// `\textbf{`, `{\bf ` and `\section{` title candidates in article sources.
static ARTICLE_TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\textbf\s*\{|\{\s*\\bf\b|\\section\*?\s*\{").unwrap());

/// Splits `source` into titled bodies in source order.
pub fn segment(source: &str, dialect: Dialect) -> Result<Vec<RawSection>, CompileError> {
    match dialect {
        Dialect::MacroCommand | Dialect::CommercialCv => segment_by_section_command(source),
        Dialect::GenericArticle => Ok(segment_article(source)),
        Dialect::Freeform => Ok(segment_freeform(source)),
    }
}

fn segment_by_section_command(source: &str) -> Result<Vec<RawSection>, CompileError> {
    let body = document_body(source);
    let braces = BraceMap::new(body);
    let span = Span::new(body, &braces);

    let mut headings: Vec<(usize, &str, usize)> = Vec::new();
    for m in SECTION_RE.find_iter(body) {
        // A `\section{` inside the previous title is part of that title.
        if headings.last().is_some_and(|h| m.start() < h.2) {
            continue;
        }
        let open = m.end() - 1;
        let group = span
            .group(open)
            .ok_or_else(|| CompileError::unbalanced("section", &body[open..]))?;
        headings.push((m.start(), group.inner, group.end));
    }

    let sections = headings
        .iter()
        .enumerate()
        .map(|(i, (_, title, body_start))| {
            let body_end = headings.get(i + 1).map(|h| h.0).unwrap_or(body.len());
            RawSection {
                title: to_plain_text(title),
                body: body[*body_start..body_end].to_string(),
            }
        })
        .collect();
    Ok(sections)
}

/// Text of a `\section`-structured source that belongs to no section: the
/// document body before the first `\section`, or all of it when there is none.
/// `None` for dialects that segment some other way.
pub fn unsectioned_text(source: &str, dialect: Dialect) -> Option<&str> {
    match dialect {
        Dialect::MacroCommand | Dialect::CommercialCv => {
            let body = document_body(source);
            let end = SECTION_RE.find(body).map_or(body.len(), |m| m.start());
            Some(&body[..end])
        }
        Dialect::GenericArticle | Dialect::Freeform => None,
    }
}

struct TitleToken {
    start: usize,
    end: usize,
    title: String,
    known: bool,
}

/// Article sources have no section command, so headings are bold runs. A
/// bold run alone on its line ends the current section; only known titles
/// open a new one, and the body under an unknown heading is dropped. Bold
/// text running on into other text on the same line stays in the body.
fn segment_article(source: &str) -> Vec<RawSection> {
    let body = document_body(source);
    let braces = BraceMap::new(body);
    let span = Span::new(body, &braces);

    let mut tokens: Vec<TitleToken> = Vec::new();
    for m in ARTICLE_TITLE_RE.find_iter(body) {
        // Skip candidates inside a title already taken.
        if tokens.last().is_some_and(|t| m.start() < t.end) {
            continue;
        }
        let Some(token) = article_title_token(span, m.start(), m.as_str()) else {
            continue;
        };
        if token.known || m.as_str().starts_with("\\section") || stands_alone(body, token.start, token.end) {
            tokens.push(token);
        }
    }

    if !tokens.iter().any(|t| t.known) {
        return vec![RawSection {
            title: FALLBACK_TITLE.to_string(),
            body: body.trim().to_string(),
        }];
    }

    tokens
        .iter()
        .enumerate()
        .filter(|(_, token)| token.known)
        .map(|(i, token)| {
            let body_end = tokens.get(i + 1).map(|t| t.start).unwrap_or(body.len());
            RawSection {
                title: token.title.clone(),
                body: body[token.end..body_end].to_string(),
            }
        })
        .collect()
}

fn article_title_token(span: Span<'_>, start: usize, matched: &str) -> Option<TitleToken> {
    let (inner, end) = if matched.starts_with('{') {
        // `{\bf Title}`: the group opens at the match start.
        let group = span.group(start)?;
        let inner = group.inner.trim_start().strip_prefix("\\bf")?;
        (inner, group.end)
    } else {
        let group = span.group(start + matched.len() - 1)?;
        (group.inner, group.end)
    };
    if inner.len() > MAX_TITLE_SOURCE_BYTES {
        return None;
    }

    let title = to_plain_text(inner);
    let title = title.trim().trim_end_matches(':').trim().to_string();
    if title.is_empty() || title.chars().count() > MAX_TITLE_CHARS {
        return None;
    }
    let known = is_known_section_title(&title);
    Some(TitleToken {
        start,
        end,
        title,
        known,
    })
}

/// Nothing but whitespace before `start` on its line, and nothing but
/// whitespace, `:` or `\\` after `end`.
fn stands_alone(body: &str, start: usize, end: usize) -> bool {
    let before = body[..start]
        .chars()
        .rev()
        .take_while(|&c| c != '\n')
        .all(char::is_whitespace);
    let after = body[end..]
        .chars()
        .take_while(|&c| c != '\n')
        .all(|c| c.is_whitespace() || c == ':' || c == '\\');
    before && after
}

fn is_known_section_title(title: &str) -> bool {
    let normalized = title
        .to_lowercase()
        .replace('&', " and ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    KNOWN_SECTION_TITLES.contains(&normalized.as_str())
}

/// An all-uppercase line longer than three characters.
pub(crate) fn is_freeform_heading(line: &str) -> bool {
    let line = line.trim();
    line.chars().count() > 3
        && line.chars().any(char::is_alphabetic)
        && !line.chars().any(char::is_lowercase)
}

fn segment_freeform(source: &str) -> Vec<RawSection> {
    let mut sections: Vec<RawSection> = Vec::new();
    for line in source.lines() {
        if is_freeform_heading(line) {
            sections.push(RawSection {
                title: line.trim().trim_end_matches(':').trim().to_string(),
                body: String::new(),
            });
        } else if let Some(current) = sections.last_mut() {
            current.body.push_str(line);
            current.body.push('\n');
        }
    }

    if sections.is_empty() {
        sections.push(RawSection {
            title: FALLBACK_TITLE.to_string(),
            body: source.to_string(),
        });
    }
    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_commands_in_source_order() {
        let src = "\\begin{document}\nintro\n\\section{Education}\nA\n\\section*{Experience}\nB\n\\end{document}\ntrailer";
        let sections = segment(src, Dialect::MacroCommand).unwrap();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, "Education");
        assert_eq!(sections[0].body.trim(), "A");
        assert_eq!(sections[1].title, "Experience");
        assert_eq!(sections[1].body.trim(), "B");
    }

    #[test]
    fn test_no_section_markers_yields_zero_sections() {
        let sections = segment("\\cvitem{a}{b}", Dialect::CommercialCv).unwrap();
        assert!(sections.is_empty());
    }

    #[test]
    fn test_unclosed_section_title_is_error() {
        let err = segment("\\section{Skills\n\\cvitem{a}{b}", Dialect::CommercialCv).unwrap_err();
        assert!(matches!(err, CompileError::UnbalancedBraces { ref command, .. } if command == "section"));
    }

    #[test]
    fn test_section_title_markup_is_flattened() {
        let sections = segment("\\section{Honors \\& \\textbf{Awards}}x", Dialect::MacroCommand).unwrap();
        assert_eq!(sections[0].title, "Honors & Awards");
    }

    #[test]
    fn test_article_unknown_heading_drops_its_body() {
        let src = "\\documentclass{article}\\begin{document}\n\\textbf{Jane Doe}\n\n\\textbf{EXPERIENCE}\nBuilt \\textbf{fast} things.\n\n{\\bf Hobbies}\nChess\n\n\\textbf{Skills:}\nRust\n\\end{document}";
        let sections = segment(src, Dialect::GenericArticle).unwrap();
        let titles: Vec<_> = sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["EXPERIENCE", "Skills"]);
        assert!(!sections[0].body.contains("Chess"));
        assert!(!sections[0].body.contains("Hobbies"));
        assert!(sections[0].body.contains("\\textbf{fast}"));
        assert_eq!(sections[1].body.trim(), "Rust");
    }

    #[test]
    fn test_article_inline_bold_stays_in_body() {
        let src = "\\documentclass{article}\n\\textbf{Experience}\n\\textbf{Data Engineer}, Fabrikam \\hfill 2020\\\\\nBuilt pipelines.\n\\textbf{Analyst}: Litware\n";
        let sections = segment(src, Dialect::GenericArticle).unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "Experience");
        assert!(sections[0].body.contains("Data Engineer"));
        assert!(sections[0].body.contains("Built pipelines."));
        assert!(sections[0].body.contains("Litware"));
    }

    #[test]
    fn test_article_only_unknown_headings_falls_back() {
        let src = "\\documentclass{article}\n\\textbf{Hobbies}\nChess";
        let sections = segment(src, Dialect::GenericArticle).unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, FALLBACK_TITLE);
        assert!(sections[0].body.contains("Chess"));
    }

    #[test]
    fn test_article_bold_flood_segments_quickly() {
        let open = "\\textbf{".repeat(8192);
        let nested = format!("\\documentclass{{article}}\n{open}x{}", "}".repeat(8192));
        let started = std::time::Instant::now();
        assert_eq!(segment(&open, Dialect::GenericArticle).unwrap().len(), 1);
        assert_eq!(segment(&nested, Dialect::GenericArticle).unwrap().len(), 1);
        assert!(started.elapsed() < std::time::Duration::from_secs(5));
    }

    #[test]
    fn test_nested_section_command_stays_in_title() {
        let sections = segment("\\section{A \\section{B} C}\nbody", Dialect::MacroCommand).unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].body.trim(), "body");
    }

    #[test]
    fn test_unsectioned_text_per_dialect() {
        let src = "\\begin{document}\nheader\n\\section{A}\nx\n\\end{document}";
        assert_eq!(unsectioned_text(src, Dialect::MacroCommand), Some("\nheader\n"));
        assert_eq!(unsectioned_text("\\cvitem{a}{b}", Dialect::CommercialCv), Some("\\cvitem{a}{b}"));
        assert_eq!(unsectioned_text(src, Dialect::GenericArticle), None);
    }

    #[test]
    fn test_article_bf_group_title() {
        let src = "\\documentclass{article}\n{\\bf Education}\nState University";
        let sections = segment(src, Dialect::GenericArticle).unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "Education");
        assert_eq!(sections[0].body.trim(), "State University");
    }

    #[test]
    fn test_article_without_known_titles_falls_back() {
        let src = "\\documentclass{article}\\begin{document}Just a paragraph.\\end{document}";
        let sections = segment(src, Dialect::GenericArticle).unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, FALLBACK_TITLE);
        assert_eq!(sections[0].body, "Just a paragraph.");
    }

    #[test]
    fn test_freeform_uppercase_headings() {
        let src = "Jane Doe\njane@x.io\nEXPERIENCE\nAcme, engineer\n\nSKILLS:\nRust, Go\n";
        let sections = segment(src, Dialect::Freeform).unwrap();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, "EXPERIENCE");
        assert_eq!(sections[0].body, "Acme, engineer\n\n");
        assert_eq!(sections[1].title, "SKILLS");
    }

    #[test]
    fn test_freeform_short_uppercase_is_not_heading() {
        assert!(!is_freeform_heading("USA"));
        assert!(!is_freeform_heading("2019 - 2021"));
        assert!(is_freeform_heading("  WORK HISTORY  "));
        assert!(!is_freeform_heading("Work History"));
    }

    #[test]
    fn test_freeform_without_headings_is_one_section() {
        let sections = segment("just some notes\nmore notes", Dialect::Freeform).unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, FALLBACK_TITLE);
    }
}
