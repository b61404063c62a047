//! Entry parsing within a section body, one strategy per dialect.
//!
//! Structural commands are located by name and their arguments read with the
//! brace scanner. An argument whose brace never closes fails the compile;
//! everything else degrades to plainer entries instead of failing.

use std::sync::LazyLock;

use regex::Regex;

use crate::compiler::error::CompileError;
use crate::compiler::inline::resolve_inline;
use crate::compiler::model::{Dialect, Entry, RichText, SubheadingEntry};
use crate::compiler::scanner::{read_args, read_group, skip_ws, try_group};
use crate::compiler::segment::is_freeform_heading;

static MACRO_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\\(?:(resumeSubheading|resumeSubSubheading|resumeProjectHeading|resumeItemListStart|resumeItem|item)\b|begin\s*\{itemize\})",
    )
    .unwrap()
});

static CV_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\(cventry|cvitemwithcomment|cvdoubleitem|cvlistdoubleitem|cvlistitem|cvitem)\b")
        .unwrap()
});

static ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\(resumeItem|item)\b").unwrap());

static ITEM_AT_START_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\\(?:resumeItem|item)\b").unwrap());

static ITEMIZE_BEGIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\begin\s*\{itemize\}").unwrap());

static ITEMIZE_END_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\end\s*\{itemize\}").unwrap());

static ENVIRONMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\(?:begin|end)\s*\{[A-Za-z*]+\}(?:\s*\[[^\]]*\])?").unwrap()
});

static PARAGRAPH_BREAK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n[ \t]*\n").unwrap());

/// `**Label:** rest` lines.
static MARKDOWN_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\*\*([^*]+?):?\*\*\s*:?\s*(.*)$").unwrap());

/// Parses the entries of one section body.
pub fn parse_entries(body: &str, dialect: Dialect) -> Result<Vec<Entry>, CompileError> {
    match dialect {
        Dialect::MacroCommand => parse_macro_command(body),
        Dialect::CommercialCv => parse_commercial_cv(body),
        Dialect::GenericArticle => Ok(parse_article(body)),
        Dialect::Freeform => Ok(parse_freeform(body)),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// List items
// ────────────────────────────────────────────────────────────────────────────

/// One `\item` / `\resumeItem` before it is turned into a bullet or an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Item<'a> {
    label: Option<&'a str>,
    body: &'a str,
}

impl Item<'_> {
    fn to_bullet(&self) -> RichText {
        match self.label {
            Some(label) => labeled_html(&resolve_inline(label), &resolve_inline(self.body)),
            None => resolve_inline(self.body),
        }
    }

    fn into_entries(self) -> Vec<Entry> {
        match self.label {
            Some(label) => vec![Entry::Labeled {
                label: Some(resolve_inline(label)),
                body: resolve_inline(self.body),
            }],
            None => labeled_lines(self.body),
        }
    }
}

fn labeled_html(label: &RichText, body: &RichText) -> RichText {
    RichText::from_html(format!("<strong>{}</strong>: {}", label.as_str(), body.as_str()))
}

/// Splits a list block on its item markers. Text before the first marker is
/// ignored.
fn split_items(block: &str) -> Result<Vec<Item<'_>>, CompileError> {
    let mut items = Vec::new();
    let mut pos = 0;
    while let Some(caps) = ITEM_RE.captures(&block[pos..]) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        let after = pos + whole.end();
        let (item, end) = read_item(block, after, name.as_str())?;
        if !item.body.trim().is_empty() || item.label.is_some() {
            items.push(item);
        }
        pos = end;
    }
    Ok(items)
}

/// Reads one item whose marker ended at `after`.
fn read_item<'a>(
    text: &'a str,
    after: usize,
    command: &str,
) -> Result<(Item<'a>, usize), CompileError> {
    let start = skip_ws(text, after);
    if command == "resumeItem" && text[start..].starts_with('{') {
        let first = read_group(text, start, command)?;
        if text[first.end..].starts_with('{') {
            let second = read_group(text, first.end, command)?;
            let item = Item {
                label: Some(first.inner.trim()),
                body: second.inner,
            };
            return Ok((item, second.end));
        }
        return Ok((
            Item {
                label: None,
                body: first.inner,
            },
            first.end,
        ));
    }

    let end = run_until_next_item(text, after, command)?;
    let mut body = text[after..end].trim();
    // `\item{...}` wrapping the whole item.
    if body.starts_with('{') {
        if let Some(group) = try_group(body, 0) {
            if body[group.end..].trim().is_empty() {
                body = group.inner;
            }
        }
    }
    Ok((Item { label: None, body }, end))
}

/// Offset of the next top-level item marker at or after `from`, or of the
/// brace closing an enclosing group. Groups are skipped whole, so markers
/// inside an argument do not split it.
fn run_until_next_item(text: &str, from: usize, command: &str) -> Result<usize, CompileError> {
    let mut i = from;
    while let Some(c) = text[i..].chars().next() {
        match c {
            '{' => i = read_group(text, i, command)?.end,
            '}' => return Ok(i),
            '\\' if ITEM_AT_START_RE.is_match(&text[i..]) => return Ok(i),
            '\\' => i += 1 + text[i + 1..].chars().next().map_or(0, char::len_utf8),
            _ => i += c.len_utf8(),
        }
    }
    Ok(text.len())
}

/// One labeled entry per `\\`-separated line of `raw`.
fn labeled_lines(raw: &str) -> Vec<Entry> {
    raw.split("\\\\")
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let (label, body) = split_label(line);
            let body = resolve_inline(body);
            if body.is_empty() && label.is_none() {
                return None;
            }
            Some(Entry::Labeled {
                label: label.map(resolve_inline),
                body,
            })
        })
        .collect()
}

/// Recognizes `\textbf{Label}{: rest}`, `\textbf{Label:} rest`,
/// `\textbf{Label}: rest` and `**Label:** rest`.
fn split_label(line: &str) -> (Option<&str>, &str) {
    if let Some(caps) = MARKDOWN_LABEL_RE.captures(line) {
        if let (Some(label), Some(rest)) = (caps.get(1), caps.get(2)) {
            return (Some(label.as_str().trim()), rest.as_str());
        }
    }

    let Some(after) = line.strip_prefix("\\textbf") else {
        return (None, line);
    };
    let Some(group) = try_group(after, skip_ws(after, 0)) else {
        return (None, line);
    };
    let label = group.inner.trim();
    let mut rest = after[group.end..].trim_start();
    if rest.starts_with('{') {
        if let Some(tail) = try_group(rest, 0) {
            if rest[tail.end..].trim().is_empty() {
                rest = tail.inner.trim_start();
            }
        }
    }

    if let Some(label) = label.strip_suffix(':') {
        (Some(label.trim()), rest.trim())
    } else if let Some(rest) = rest.strip_prefix(':') {
        (Some(label), rest.trim())
    } else {
        (None, line)
    }
}

/// Body of the list block starting at `after` and the offset just past its
/// end marker. A missing end marker runs the block to the end of `text`.
fn list_block<'a>(
    text: &'a str,
    after: usize,
    end_marker: &Regex,
    begin_marker: Option<&Regex>,
) -> (&'a str, usize) {
    let mut depth = 0usize;
    let mut pos = after;
    loop {
        let Some(end) = end_marker.find(&text[pos..]) else {
            return (&text[after..], text.len());
        };
        let end_start = pos + end.start();
        let nested = begin_marker
            .map(|re| re.find_iter(&text[pos..end_start]).count())
            .unwrap_or(0);
        depth += nested;
        if depth == 0 {
            return (&text[after..end_start], pos + end.end());
        }
        depth -= 1;
        pos += end.end();
    }
}

fn attach_items(entries: &mut Vec<Entry>, items: Vec<Item<'_>>) {
    if let Some(Entry::Subheading(last)) = entries.last_mut() {
        last.bullets.extend(items.iter().map(Item::to_bullet));
        return;
    }
    entries.extend(items.into_iter().flat_map(Item::into_entries));
}

// ────────────────────────────────────────────────────────────────────────────
// Dialect strategies
// ────────────────────────────────────────────────────────────────────────────

static RESUME_ITEM_LIST_END_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\resumeItemListEnd\b").unwrap());

fn parse_macro_command(body: &str) -> Result<Vec<Entry>, CompileError> {
    let mut entries = Vec::new();
    let mut pos = 0;

    while let Some(caps) = MACRO_MARKER_RE.captures(&body[pos..]) {
        let Some(whole) = caps.get(0) else {
            break;
        };
        let after = pos + whole.end();
        let name = caps.get(1).map(|m| m.as_str()).unwrap_or("itemize");

        pos = match name {
            "resumeSubheading" => {
                let (args, end) = read_args(body, after, 4, name)?;
                entries.push(Entry::Subheading(subheading(args[0], args[1], args[2], args[3])));
                end
            }
            "resumeSubSubheading" | "resumeProjectHeading" => {
                let (args, end) = read_args(body, after, 2, name)?;
                entries.push(Entry::Subheading(subheading(args[0], args[1], "", "")));
                end
            }
            "resumeItemListStart" => {
                let (block, end) = list_block(body, after, &RESUME_ITEM_LIST_END_RE, None);
                attach_items(&mut entries, split_items(block)?);
                end
            }
            "itemize" => {
                let (block, end) = list_block(body, after, &ITEMIZE_END_RE, Some(&ITEMIZE_BEGIN_RE));
                attach_items(&mut entries, split_items(block)?);
                end
            }
            _ => {
                let (item, end) = read_item(body, after, name)?;
                entries.extend(item.into_entries());
                end
            }
        };
    }

    Ok(entries)
}

fn subheading(title: &str, date_range: &str, subtitle: &str, location: &str) -> SubheadingEntry {
    SubheadingEntry {
        title: resolve_inline(title),
        date_range: resolve_inline(date_range),
        subtitle: resolve_inline(subtitle),
        location: resolve_inline(location),
        bullets: Vec::new(),
    }
}

fn parse_commercial_cv(body: &str) -> Result<Vec<Entry>, CompileError> {
    let mut entries = Vec::new();
    let mut pos = 0;

    while let Some(caps) = CV_MARKER_RE.captures(&body[pos..]) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        let name = name.as_str();
        let after = pos + whole.end();

        pos = match name {
            "cventry" => {
                let (args, end) = read_args(body, after, 6, name)?;
                let mut entry = subheading(args[1], args[0], args[2], args[3]);
                entry.bullets = description_bullets(args[5])?;
                entries.push(Entry::Subheading(entry));
                end
            }
            "cvitemwithcomment" => {
                let (args, end) = read_args(body, after, 3, name)?;
                let mut html = resolve_inline(args[1]).as_str().to_string();
                let comment = resolve_inline(args[2]);
                if !comment.is_empty() {
                    html.push_str(&format!(" <em>{}</em>", comment.as_str()));
                }
                entries.push(cv_item(args[0], RichText::from_html(html)));
                end
            }
            "cvdoubleitem" => {
                let (args, end) = read_args(body, after, 4, name)?;
                entries.push(cv_item(args[0], resolve_inline(args[1])));
                entries.push(cv_item(args[2], resolve_inline(args[3])));
                end
            }
            "cvlistdoubleitem" => {
                let (args, end) = read_args(body, after, 2, name)?;
                entries.extend(
                    args.iter()
                        .filter(|a| !a.trim().is_empty())
                        .map(|a| cv_item("", resolve_inline(a))),
                );
                end
            }
            "cvlistitem" => {
                let (args, end) = read_args(body, after, 1, name)?;
                entries.push(cv_item("", resolve_inline(args[0])));
                end
            }
            _ => {
                let (args, end) = read_args(body, after, 2, name)?;
                entries.push(cv_item(args[0], resolve_inline(args[1])));
                end
            }
        };
    }

    Ok(entries)
}

fn cv_item(label: &str, body: RichText) -> Entry {
    let label = resolve_inline(label);
    Entry::Labeled {
        label: (!label.is_empty()).then_some(label),
        body,
    }
}

/// The free-text description of a `\cventry`: intro text, then one bullet per
/// `\item`.
fn description_bullets(description: &str) -> Result<Vec<RichText>, CompileError> {
    let description = ENVIRONMENT_RE.replace_all(description, " ");
    let intro_end = ITEM_RE
        .find(&description)
        .map(|m| m.start())
        .unwrap_or(description.len());

    let mut bullets = Vec::new();
    let intro = resolve_inline(&description[..intro_end]);
    if !intro.is_empty() {
        bullets.push(intro);
    }
    bullets.extend(split_items(&description[intro_end..])?.iter().map(Item::to_bullet));
    Ok(bullets)
}

fn parse_article(body: &str) -> Vec<Entry> {
    let flattened = ENVIRONMENT_RE.replace_all(body, "");
    let flattened = ITEM_RE.replace_all(&flattened, "\\\\ \u{2022} ");
    PARAGRAPH_BREAK_RE
        .split(&flattened)
        .map(|para| para.trim().trim_start_matches("\\\\").trim())
        .filter(|para| !para.is_empty())
        .map(resolve_inline)
        .filter(|text| !text.is_empty())
        .map(|text| Entry::Freeform { text })
        .collect()
}

fn parse_freeform(body: &str) -> Vec<Entry> {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !is_freeform_heading(line))
        .map(|line| {
            ["- ", "* ", "\u{2022} "]
                .iter()
                .find_map(|marker| line.strip_prefix(marker))
                .unwrap_or(line)
        })
        .map(|line| Entry::Freeform {
            text: resolve_inline(line),
        })
        .collect()
}
