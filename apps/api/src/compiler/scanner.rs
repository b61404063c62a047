//! Brace-depth scanner for command arguments.
//!
//! Arguments are located with a depth counter instead of a pattern, so a
//! group is matched correctly whatever its nesting depth. Escaped braces
//! (`\{`, `\}`) never count towards the depth.
//!
//! [`try_group`] scans once from the opening brace. Code that looks up many
//! groups in the same text (inline resolution, title candidates) builds a
//! [`BraceMap`] first so each lookup is constant time.

use std::collections::HashMap;

use crate::compiler::error::CompileError;

/// A balanced `{...}` group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Group<'a> {
    /// Text between the outer braces.
    pub inner: &'a str,
    /// Byte offset just past the closing brace.
    pub end: usize,
}

/// Returns the offset just past the brace closing the group opened at `open`.
fn group_end(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if bytes.get(open) != Some(&b'{') {
        return None;
    }
    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                i += 2;
                continue;
            }
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Reads the group opened at `open`, or `None` when it never closes.
pub fn try_group(text: &str, open: usize) -> Option<Group<'_>> {
    group_end(text, open).map(|end| Group {
        inner: &text[open + 1..end - 1],
        end,
    })
}

/// Closing offsets for every brace in a text that closes, from one stack pass.
///
/// The pairing is the same one [`try_group`] finds: inside a balanced group the
/// nearest unmatched `}` closes it, and a stray `}` with nothing open is ignored.
#[derive(Debug)]
pub struct BraceMap {
    ends: HashMap<usize, usize>,
}

impl BraceMap {
    pub fn new(text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut ends = HashMap::new();
        let mut open = Vec::new();
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\\' => {
                    i += 2;
                    continue;
                }
                b'{' => open.push(i),
                b'}' => {
                    if let Some(start) = open.pop() {
                        ends.insert(start, i + 1);
                    }
                }
                _ => {}
            }
            i += 1;
        }
        BraceMap { ends }
    }
}

/// A slice of the text a [`BraceMap`] was built over.
#[derive(Debug, Clone, Copy)]
pub struct Span<'a> {
    pub text: &'a str,
    offset: usize,
    braces: &'a BraceMap,
}

impl<'a> Span<'a> {
    /// The whole of `text`, which must be the text `braces` was built from.
    pub fn new(text: &'a str, braces: &'a BraceMap) -> Self {
        Span {
            text,
            offset: 0,
            braces,
        }
    }

    /// Same result as [`try_group`] on `self.text`. A group closing past the
    /// end of this span never closes within it.
    pub fn group(&self, open: usize) -> Option<Group<'a>> {
        let end = self.braces.ends.get(&(self.offset + open))? - self.offset;
        (end <= self.text.len()).then(|| Group {
            inner: &self.text[open + 1..end - 1],
            end,
        })
    }

    /// The contents of a group found by [`Span::group`].
    pub fn inner(&self, group: &Group<'a>) -> Span<'a> {
        self.slice(group.end - 1 - group.inner.len(), group.end - 1)
    }

    pub fn slice(&self, start: usize, end: usize) -> Span<'a> {
        Span {
            text: &self.text[start..end],
            offset: self.offset + start,
            braces: self.braces,
        }
    }

    /// The span of `suffix`, a trailing part of `self.text`.
    pub fn tail(&self, suffix: &str) -> Span<'a> {
        self.slice(self.text.len() - suffix.len(), self.text.len())
    }
}

/// Reads the group opened at `open` as an argument of `command`.
pub fn read_group<'a>(text: &'a str, open: usize, command: &str) -> Result<Group<'a>, CompileError> {
    try_group(text, open).ok_or_else(|| CompileError::unbalanced(command, &text[open..]))
}

pub fn skip_ws(text: &str, mut pos: usize) -> usize {
    let bytes = text.as_bytes();
    while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
        pos += 1;
    }
    pos
}

/// Reads up to `n` braced arguments of `command` starting at `pos`.
///
/// Whitespace between arguments and one leading `[...]` optional argument are
/// skipped. Missing arguments come back as empty strings; an argument whose
/// brace never closes is an error.
pub fn read_args<'a>(
    text: &'a str,
    pos: usize,
    n: usize,
    command: &str,
) -> Result<(Vec<&'a str>, usize), CompileError> {
    let mut pos = skip_optional(text, pos);
    let mut args = Vec::with_capacity(n);
    for _ in 0..n {
        let start = skip_ws(text, pos);
        if text[start..].starts_with('{') {
            let group = read_group(text, start, command)?;
            args.push(group.inner);
            pos = group.end;
        } else {
            args.push("");
        }
    }
    Ok((args, pos))
}

/// Skips whitespace and a single `[...]` optional argument.
pub fn skip_optional(text: &str, pos: usize) -> usize {
    let start = skip_ws(text, pos);
    if text[start..].starts_with('[') {
        if let Some(close) = text[start..].find(']') {
            return start + close + 1;
        }
    }
    pos
}

/// Removes unescaped `%` comments. Lines that were nothing but a comment are
/// dropped so they do not read as paragraph breaks.
pub fn strip_comments(text: &str) -> String {
    let mut out = Vec::new();
    for line in text.lines() {
        match comment_start(line) {
            Some(i) if line[..i].trim().is_empty() => continue,
            Some(i) => out.push(&line[..i]),
            None => out.push(line),
        }
    }
    out.join("\n")
}

fn comment_start(line: &str) -> Option<usize> {
    let mut backslashes = 0usize;
    for (i, b) in line.bytes().enumerate() {
        match b {
            b'\\' => backslashes += 1,
            b'%' if backslashes % 2 == 0 => return Some(i),
            _ => backslashes = 0,
        }
    }
    None
}

/// The text between `\begin{document}` and `\end{document}`, where present.
pub fn document_body(text: &str) -> &str {
    const BEGIN: &str = "\\begin{document}";
    const END: &str = "\\end{document}";
    let start = text.find(BEGIN).map(|i| i + BEGIN.len()).unwrap_or(0);
    let end = text[start..]
        .find(END)
        .map(|i| start + i)
        .unwrap_or(text.len());
    &text[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_handles_deep_nesting() {
        let text = r"{a \textbf{b \textit{c}} d} tail";
        let group = try_group(text, 0).unwrap();
        assert_eq!(group.inner, r"a \textbf{b \textit{c}} d");
        assert_eq!(&text[group.end..], " tail");
    }

    #[test]
    fn test_escaped_braces_do_not_count() {
        let text = r"{set \{x\}}";
        let group = try_group(text, 0).unwrap();
        assert_eq!(group.inner, r"set \{x\}");
    }

    #[test]
    fn test_unclosed_group_is_none() {
        assert!(try_group("{never closes", 0).is_none());
        assert!(try_group("no brace", 0).is_none());
    }

    #[test]
    fn test_brace_map_agrees_with_scan() {
        let texts = [
            r"{a \textbf{b \textit{c}} d} tail",
            r"{set \{x\}} {y",
            r"} {a} }{b{c}",
            r"{{{ {x} }",
            "\\{a}{b}",
        ];
        for text in texts {
            let braces = BraceMap::new(text);
            let span = Span::new(text, &braces);
            for (open, _) in text.match_indices('{') {
                let escaped = text[..open].ends_with('\\');
                if !escaped {
                    assert_eq!(span.group(open), try_group(text, open), "{text:?} at {open}");
                }
            }
        }
    }

    #[test]
    fn test_span_group_stays_inside_slice() {
        let text = "{x {y} z}";
        let braces = BraceMap::new(text);
        let outer = Span::new(text, &braces);
        let group = outer.group(0).unwrap();
        let inner = outer.inner(&group);
        assert_eq!(inner.text, "x {y} z");
        assert_eq!(inner.group(2).map(|g| g.inner), Some("y"));

        // The brace at 3 closes past the end of this slice.
        let cut = outer.slice(1, 5);
        assert_eq!(cut.text, "x {y");
        assert_eq!(cut.group(2), None);
    }

    #[test]
    fn test_brace_map_on_unclosed_flood_is_empty() {
        let text = "{".repeat(256 * 1024);
        let braces = BraceMap::new(&text);
        let span = Span::new(&text, &braces);
        assert_eq!(span.group(0), None);
        assert_eq!(span.group(text.len() - 1), None);
    }

    #[test]
    fn test_read_group_reports_command() {
        let err = read_group("{Built things", 0, "resumeItem").unwrap_err();
        match err {
            CompileError::UnbalancedBraces { command, snippet } => {
                assert_eq!(command, "resumeItem");
                assert!(snippet.starts_with("{Built"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_read_args_across_lines_with_optional() {
        let text = "[spacing]{2020}\n  {Engineer}{Acme} rest";
        let (args, end) = read_args(text, 0, 3, "cventry").unwrap();
        assert_eq!(args, vec!["2020", "Engineer", "Acme"]);
        assert_eq!(&text[end..], " rest");
    }

    #[test]
    fn test_read_args_missing_are_empty() {
        let (args, end) = read_args("{one} plain", 0, 3, "x").unwrap();
        assert_eq!(args, vec!["one", "", ""]);
        assert_eq!(end, 5);
    }

    #[test]
    fn test_strip_comments_keeps_escaped_percent() {
        let text = "Grew revenue 40\\% % internal note\n%----HEADER----\nnext line";
        assert_eq!(strip_comments(text), "Grew revenue 40\\% \nnext line");
    }

    #[test]
    fn test_document_body_slices() {
        let text = "pre\\begin{document}body\\end{document}post";
        assert_eq!(document_body(text), "body");
        assert_eq!(document_body("no markers"), "no markers");
    }
}
