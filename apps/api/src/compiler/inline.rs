//! Inline markup transformer: resolves bold, italic and hyperlink commands
//! inside a run of text.
//!
//! Resolution is one left-to-right scan. Command arguments are looked up in a
//! brace table built once per call and resolved recursively, so nested formatting
//! inside an argument comes out right at any depth up to `MAX_DEPTH`.
//! Unknown commands are kept as visible literal text.

use crate::compiler::model::RichText;
use crate::compiler::scanner::{skip_ws, BraceMap, Span};

/// Nesting beyond this is emitted literally instead of recursing.
const MAX_DEPTH: usize = 32;

/// Characters a backslash escapes to themselves.
const ESCAPABLE: &[char] = &['&', '%', '$', '#', '_', '{', '}'];

/// Spacing and font-size switches that only affect layout.
const LAYOUT_SWITCHES: &[&str] = &[
    "hfill", "hfil", "vfill", "small", "footnotesize", "scriptsize", "tiny", "normalsize",
    "large", "Large", "LARGE", "huge", "Huge", "scshape", "bfseries", "itshape", "mdseries",
    "upshape", "bf", "it", "em", "centering", "raggedright", "raggedleft", "noindent",
    "indent", "par", "medskip", "smallskip", "bigskip", "quad", "qquad", "clearpage",
    "newpage", "pagebreak", "hline", "null",
];

/// Layout commands whose single argument is dropped along with them.
const LAYOUT_WITH_ARG: &[&str] = &[
    "vspace", "hspace", "color", "label", "phantom", "hphantom", "vphantom", "pagestyle",
    "thispagestyle",
];

/// Symbols that show up in short inline math as separators.
const MATH_SYMBOLS: &[(&str, &str)] = &[
    ("|", "|"),
    ("\\vert", "|"),
    ("\\cdot", "\u{00B7}"),
    ("\\bullet", "\u{2022}"),
    ("\\diamond", "\u{22C4}"),
    ("\\sim", "~"),
    ("\\times", "\u{00D7}"),
    ("\\approx", "\u{2248}"),
    ("\\pm", "\u{00B1}"),
    ("\\to", "\u{2192}"),
    ("\\rightarrow", "\u{2192}"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Html,
    Plain,
}

/// Output sink. Html mode escapes text and emits tags; Plain mode drops tags.
struct Writer {
    out: String,
    mode: Mode,
}

impl Writer {
    fn new(mode: Mode, capacity: usize) -> Self {
        Writer {
            out: String::with_capacity(capacity),
            mode,
        }
    }

    fn text(&mut self, c: char) {
        if c.is_whitespace() {
            if !self.out.is_empty() && !self.out.ends_with(' ') {
                self.out.push(' ');
            }
            return;
        }
        match self.mode {
            Mode::Html => push_escaped(&mut self.out, c),
            Mode::Plain => self.out.push(c),
        }
    }

    fn literal(&mut self, s: &str) {
        for c in s.chars() {
            self.text(c);
        }
    }

    fn symbol(&mut self, html: &str, plain: &str) {
        match self.mode {
            Mode::Html => self.out.push_str(html),
            Mode::Plain => self.out.push_str(plain),
        }
    }

    fn line_break(&mut self) {
        self.symbol("<br>", " ");
    }

    fn open(&mut self, tag: &str) {
        if self.mode == Mode::Html {
            self.out.push('<');
            self.out.push_str(tag);
            self.out.push('>');
        }
    }

    fn open_link(&mut self, url: &str) {
        if self.mode == Mode::Html {
            self.out.push_str("<a href=\"");
            self.out.push_str(&escape_html(&safe_href(url)));
            self.out.push_str("\">");
        }
    }

    fn close(&mut self, tag: &str) {
        if self.mode == Mode::Html {
            self.out.push_str("</");
            self.out.push_str(tag);
            self.out.push('>');
        }
    }

    fn finish(self) -> String {
        self.out.trim().to_string()
    }
}

/// Resolves inline commands in `text` to an HTML fragment.
pub fn resolve_inline(text: &str) -> RichText {
    let mut writer = Writer::new(Mode::Html, text.len() + text.len() / 4);
    resolve_root(text.trim(), &mut writer);
    RichText::from_html(writer.finish())
}

/// Resolves inline commands and keeps only the readable text.
pub fn to_plain_text(text: &str) -> String {
    let mut writer = Writer::new(Mode::Plain, text.len());
    resolve_root(text.trim(), &mut writer);
    writer.finish()
}

fn resolve_root(text: &str, w: &mut Writer) {
    let braces = BraceMap::new(text);
    resolve_into(Span::new(text, &braces), 0, w);
}

fn resolve_into(s: Span<'_>, depth: usize, w: &mut Writer) {
    let text = s.text;
    let mut i = 0;
    while let Some(c) = text[i..].chars().next() {
        let rest = &text[i..];
        i += match c {
            '\\' => command(s, i, depth, w),
            '{' => group(s, i, depth, w),
            '~' if is_tie(text, i) => {
                w.symbol("&nbsp;", " ");
                1
            }
            '$' => math(s, i, depth, w),
            '-' if rest.starts_with("---") => {
                w.symbol("&mdash;", "\u{2014}");
                3
            }
            '-' if rest.starts_with("--") => {
                w.symbol("&ndash;", "\u{2013}");
                2
            }
            _ => {
                w.text(c);
                c.len_utf8()
            }
        };
    }
}

/// A `~` between two words is a tie; anywhere else it is a literal tilde
/// ("~5 years").
fn is_tie(text: &str, at: usize) -> bool {
    let before = text[..at].chars().next_back();
    let after = text[at + 1..].chars().next();
    matches!((before, after), (Some(b), Some(a)) if !b.is_whitespace() && !a.is_whitespace())
}

/// Short inline math such as `$|$` or `$\cdot$` becomes its symbol. Any other
/// `$` is literal, so amounts like "$50k" survive.
fn math(s: Span<'_>, at: usize, depth: usize, w: &mut Writer) -> usize {
    let rest = &s.text[at + 1..];
    let inner = rest.find('$').map(|close| &rest[..close]).filter(|inner| {
        !inner.is_empty()
            && inner.len() <= 16
            && !inner.chars().any(char::is_whitespace)
            && !inner.starts_with(|c: char| c.is_ascii_digit())
    });
    let Some(inner) = inner else {
        w.text('$');
        return 1;
    };
    match MATH_SYMBOLS.iter().find(|(name, _)| *name == inner) {
        Some((_, symbol)) => w.literal(symbol),
        None => resolve_into(s.slice(at + 1, at + 1 + inner.len()), depth + 1, w),
    }
    inner.len() + 2
}

/// A bare `{...}` group is invisible grouping; `{\bf x}` style switches at
/// its start still apply to its content.
fn group(s: Span<'_>, at: usize, depth: usize, w: &mut Writer) -> usize {
    let found = if depth < MAX_DEPTH { s.group(at) } else { None };
    let Some(found) = found else {
        w.text('{');
        return 1;
    };
    let inner = s.inner(&found);
    let trimmed = inner.text.trim_start();
    let switched = [("bfseries", "strong"), ("bf", "strong"), ("itshape", "em"), ("it", "em"), ("em", "em")]
        .iter()
        .find_map(|(name, tag)| strip_switch(trimmed, name).map(|rest| (*tag, rest)));
    match switched {
        Some((tag, rest)) => {
            w.open(tag);
            resolve_into(inner.tail(rest.trim_start()), depth + 1, w);
            w.close(tag);
        }
        None => resolve_into(inner, depth + 1, w),
    }
    found.end - at
}

fn strip_switch<'a>(text: &'a str, name: &str) -> Option<&'a str> {
    let rest = text.strip_prefix('\\')?.strip_prefix(name)?;
    match rest.chars().next() {
        Some(c) if c.is_ascii_alphabetic() => None,
        _ => Some(rest),
    }
}

/// Handles the command starting at `at`; returns the bytes consumed.
fn command(s: Span<'_>, at: usize, depth: usize, w: &mut Writer) -> usize {
    let text = s.text;
    let after = at + 1;
    let Some(next) = text[after..].chars().next() else {
        w.text('\\');
        return 1;
    };
    if next == '\\' {
        w.line_break();
        return 2;
    }
    if ESCAPABLE.contains(&next) {
        w.text(next);
        return 2;
    }
    if next == ',' || next == ' ' {
        w.text(' ');
        return 2;
    }
    if !next.is_ascii_alphabetic() {
        w.text('\\');
        return 1;
    }

    let name_len = text[after..]
        .bytes()
        .take_while(u8::is_ascii_alphabetic)
        .count();
    let name = &text[after..after + name_len];
    let pos = after + name_len;

    let handled = match name {
        "textbf" => styled(s, pos, depth, w, "strong"),
        "textit" | "emph" => styled(s, pos, depth, w, "em"),
        "underline" => styled(s, pos, depth, w, "u"),
        "textsc" | "mbox" | "text" => unwrap_arg(s, pos, depth, w),
        "href" => href(s, pos, depth, w),
        "url" => url(s, pos, w),
        "newline" | "linebreak" => {
            w.line_break();
            Some(pos)
        }
        _ if LAYOUT_SWITCHES.contains(&name) => Some(pos),
        _ if LAYOUT_WITH_ARG.contains(&name) => drop_arg(s, pos),
        _ => None,
    };

    match handled {
        Some(end) => end - at,
        None => literal_command(s, at, pos, depth, w),
    }
}

/// Emits an unhandled command and its immediately following groups verbatim,
/// with the group contents still resolved.
fn literal_command(s: Span<'_>, at: usize, mut pos: usize, depth: usize, w: &mut Writer) -> usize {
    w.literal(&s.text[at..pos]);
    while depth < MAX_DEPTH && s.text[pos..].starts_with('{') {
        let Some(group) = s.group(pos) else {
            break;
        };
        w.text('{');
        resolve_into(s.inner(&group), depth + 1, w);
        w.text('}');
        pos = group.end;
    }
    pos - at
}

fn styled(s: Span<'_>, pos: usize, depth: usize, w: &mut Writer, tag: &str) -> Option<usize> {
    if depth >= MAX_DEPTH {
        return None;
    }
    let group = s.group(skip_ws(s.text, pos))?;
    w.open(tag);
    resolve_into(s.inner(&group), depth + 1, w);
    w.close(tag);
    Some(group.end)
}

fn unwrap_arg(s: Span<'_>, pos: usize, depth: usize, w: &mut Writer) -> Option<usize> {
    if depth >= MAX_DEPTH {
        return None;
    }
    let group = s.group(skip_ws(s.text, pos))?;
    resolve_into(s.inner(&group), depth + 1, w);
    Some(group.end)
}

fn href(s: Span<'_>, pos: usize, depth: usize, w: &mut Writer) -> Option<usize> {
    if depth >= MAX_DEPTH {
        return None;
    }
    let target = s.group(skip_ws(s.text, pos))?;
    let url = unescape_specials(target.inner.trim());
    w.open_link(&url);
    let end = match s.group(target.end) {
        Some(label) => {
            resolve_into(s.inner(&label), depth + 1, w);
            label.end
        }
        None => {
            w.literal(&url);
            target.end
        }
    };
    w.close("a");
    Some(end)
}

fn url(s: Span<'_>, pos: usize, w: &mut Writer) -> Option<usize> {
    let target = s.group(skip_ws(s.text, pos))?;
    let url = unescape_specials(target.inner.trim());
    w.open_link(&url);
    w.literal(&url);
    w.close("a");
    Some(target.end)
}

fn drop_arg(s: Span<'_>, mut pos: usize) -> Option<usize> {
    if s.text[pos..].starts_with('*') {
        pos += 1;
    }
    s.group(skip_ws(s.text, pos)).map(|g| g.end)
}

/// Turns `\#`, `\%`, `\_`, `\&` back into plain characters (URLs).
pub(crate) fn unescape_specials(text: &str) -> String {
    text.replace("\\#", "#")
        .replace("\\%", "%")
        .replace("\\_", "_")
        .replace("\\&", "&")
}

fn push_escaped(out: &mut String, c: char) {
    match c {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '"' => out.push_str("&quot;"),
        '\'' => out.push_str("&#39;"),
        _ => out.push(c),
    }
}

pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        push_escaped(&mut out, c);
    }
    out
}

/// Link targets limited to web, mail and phone schemes. Scheme-less hosts get
/// `https://`.
pub(crate) fn safe_href(url: &str) -> String {
    let url = url.trim();
    match url.split_once(':') {
        Some((scheme, _)) if !scheme.contains('/') => {
            let scheme = scheme.to_ascii_lowercase();
            if matches!(scheme.as_str(), "http" | "https" | "mailto" | "tel") {
                url.to_string()
            } else {
                "#".to_string()
            }
        }
        _ if url.is_empty() || url.starts_with('/') || url.starts_with('#') => url.to_string(),
        _ => format!("https://{url}"),
    }
}
