//! Single entry point of the compiler and its only failure boundary.
//!
//! Every stage below returns `Result<_, CompileError>`; this module is the one
//! place that turns a failure (or a panic) into a rendered error fragment, so
//! callers always get HTML back.

use std::any::Any;
use std::borrow::Cow;
use std::panic;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::compiler::dialect::detect;
use crate::compiler::entries::parse_entries;
use crate::compiler::error::CompileError;
use crate::compiler::identity::extract_identity;
use crate::compiler::inline::escape_html;
use crate::compiler::model::{Dialect, Document, Section};
use crate::compiler::render::render;
use crate::compiler::scanner::strip_comments;
use crate::compiler::segment::{segment, unsectioned_text};
use crate::compiler::stylesheet::{PLACEHOLDER_HTML, STYLESHEET};

/// Result of one compile. `html` is always a complete fragment.
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOutput {
    pub html: String,
    pub error: Option<String>,
}

/// A compile stamped with the time it ran. `dialect` is absent for blank
/// input and for compiles that crashed before detection finished.
#[derive(Debug, Clone, Serialize)]
pub struct CompileResult {
    pub html: String,
    pub error: Option<String>,
    pub last_compiled_at: DateTime<Utc>,
    pub dialect: Option<Dialect>,
}

/// Compiles `source` to HTML. Never panics and never fails.
// Library entry point; the HTTP handler stamps its own time via compile_at.
#[allow(dead_code)]
pub fn compile(source: &str) -> CompileOutput {
    let result = compile_at(source, Utc::now());
    CompileOutput {
        html: result.html,
        error: result.error,
    }
}

/// Same as [`compile`], stamping the result with `now`.
pub fn compile_at(source: &str, now: DateTime<Utc>) -> CompileResult {
    if source.trim().is_empty() {
        return CompileResult {
            html: PLACEHOLDER_HTML.to_string(),
            error: None,
            last_compiled_at: now,
            dialect: None,
        };
    }

    let outcome = panic::catch_unwind(|| {
        let dialect = detect(source);
        (dialect, run_pipeline(source, dialect))
    });

    let (dialect, result) = match outcome {
        Ok((dialect, result)) => (Some(dialect), result),
        Err(payload) => (None, Err(CompileError::Panicked(panic_message(payload.as_ref())))),
    };

    match result {
        Ok(html) => CompileResult {
            html,
            error: None,
            last_compiled_at: now,
            dialect,
        },
        Err(err) => {
            warn!(
                dialect = dialect.map(|d| d.as_str()).unwrap_or("unknown"),
                error = %err,
                "Compile failed, rendering error fragment"
            );
            CompileResult {
                html: error_fragment(&err),
                error: Some(err.to_string()),
                last_compiled_at: now,
                dialect,
            }
        }
    }
}

fn run_pipeline(source: &str, dialect: Dialect) -> Result<String, CompileError> {
    // Freeform text keeps `%` literal ("grew revenue 40%").
    let source: Cow<'_, str> = if dialect.is_typeset() {
        Cow::Owned(strip_comments(source))
    } else {
        Cow::Borrowed(source)
    };

    let identity = extract_identity(&source);

    // Content outside every section is not rendered but must still be well formed.
    if let Some(loose) = unsectioned_text(&source, dialect) {
        parse_entries(loose, dialect)?;
    }

    let sections = segment(&source, dialect)?
        .into_iter()
        .map(|raw| {
            Ok(Section {
                entries: parse_entries(&raw.body, dialect)?,
                title: raw.title,
            })
        })
        .collect::<Result<Vec<_>, CompileError>>()?;

    debug!(
        dialect = dialect.as_str(),
        sections = sections.len(),
        has_identity = !identity.is_empty(),
        "Compiled resume source"
    );

    Ok(render(&Document { sections }, &identity))
}

fn error_fragment(err: &CompileError) -> String {
    format!(
        "<div class=\"resume-document\">\n<style>{STYLESHEET}</style>\n\
         <div class=\"resume-error\"><strong>This resume could not be compiled.</strong>\
         <pre>{}</pre></div>\n</div>\n",
        escape_html(&err.to_string())
    )
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const MODERNCV_SKILLS: &str = "\\name{Jane}{Doe}\n\\section{Skills}\n\\cvitem{Languages}{Go, Rust}";

    const MACRO_RESUME: &str = r"\documentclass[letterpaper,11pt]{article}
\begin{document}
\begin{center}
    \textbf{\Huge \scshape Jake Ryan} \\
    \small 123-456-7890 $|$ \href{mailto:jake@su.edu}{jake@su.edu}
\end{center}

\section{Education}
  \resumeSubHeadingListStart
    \resumeSubheading
      {Southwestern University}{Georgetown, TX}
      {Bachelor of Arts in Computer Science}{Aug. 2018 -- May 2021}
  \resumeSubHeadingListEnd

\section{Experience}
  \resumeSubHeadingListStart
    \resumeSubheading
      {Undergraduate Research Assistant}{June 2020 -- Present}
      {Texas A\&M University}{College Station, TX}
      \resumeItemListStart
        \resumeItem{Developed a REST API using \textbf{FastAPI}}
        \resumeItem{Wrote 40\% fewer queries} % tuned later
      \resumeItemListEnd
  \resumeSubHeadingListEnd
\end{document}
";

    #[test]
    fn test_blank_source_renders_placeholder() {
        for source in ["", "   ", "\n\t\n"] {
            let out = compile(source);
            assert_eq!(out.html, PLACEHOLDER_HTML);
            assert_eq!(out.error, None);
        }
    }

    #[test]
    fn test_moderncv_skills_scenario() {
        let html = run_pipeline(MODERNCV_SKILLS, Dialect::CommercialCv).unwrap();
        assert!(html.contains("<h1>Jane Doe</h1>"));
        assert_eq!(html.matches("<section class=\"resume-section\">").count(), 1);
        assert!(html.contains("<h2>Skills</h2>"));
        assert!(html.contains("<span class=\"resume-label\">Languages:</span> Go, Rust"));

        let out = compile(&format!("\\documentclass[11pt]{{moderncv}}\n{MODERNCV_SKILLS}"));
        assert_eq!(out.error, None);
        assert!(out.html.contains("<span class=\"resume-label\">Languages:</span> Go, Rust"));
    }

    #[test]
    fn test_unterminated_bullet_renders_error_fragment() {
        let src = "\\section{Experience}\n\\resumeSubheading{Acme}{2020}{Dev}{Remote}\n\\resumeItemListStart\n\\resumeItem{Built \\textbf{things\n\\resumeItemListEnd";
        let out = compile(src);
        let error = out.error.expect("compile should report an error");
        assert!(error.contains("resumeItem"));
        assert!(out.html.contains("class=\"resume-error\""));
        assert!(!out.html.contains("<section"));
    }

    #[test]
    fn test_unterminated_bullet_without_section_is_error() {
        let src = "\\resumeItemListStart\n\\resumeItem{Built \\textbf{things\n\\resumeItemListEnd";
        let out = compile(src);
        let error = out.error.expect("compile should report an error");
        assert!(error.contains("resumeItem"));
        assert!(out.html.contains("class=\"resume-error\""));
    }

    #[test]
    fn test_unterminated_bullet_before_first_section_is_error() {
        let src = "\\documentclass{moderncv}\n\\begin{document}\n\\cvitem{Lost}{never closed\n\\section{Skills}\n\\cvitem{Go}{yes}\n\\end{document}";
        let out = compile(src);
        assert!(out.error.is_some_and(|e| e.contains("cvitem")));
    }

    #[test]
    fn test_well_formed_source_without_sections_compiles() {
        let out = compile("\\resumeItemListStart\n\\resumeItem{Built things}\n\\resumeItemListEnd");
        assert_eq!(out.error, None);
        assert!(!out.html.contains("<section"));
    }

    #[test]
    fn test_unclosed_brace_flood_compiles_quickly() {
        let flood = format!("SUMMARY\n{}", "{".repeat(256 * 1024));
        let started = std::time::Instant::now();
        let out = compile(&flood);
        assert_eq!(out.error, None);
        assert!(started.elapsed() < std::time::Duration::from_secs(5));

        let started = std::time::Instant::now();
        compile(&format!("\\documentclass{{article}}\n{}", "\\textbf{".repeat(8192)));
        assert!(started.elapsed() < std::time::Duration::from_secs(5));
    }

    #[test]
    fn test_error_message_is_escaped_in_fragment() {
        let out = compile("\\documentclass{moderncv}\n\\section{Skills}\n\\cvitem{x}{<b> bold");
        assert!(out.error.is_some());
        assert!(out.html.contains("&lt;b&gt;"));
        assert!(!out.html.contains("<b>"));
    }

    #[test]
    fn test_awkward_inputs_never_panic() {
        let inputs = [
            "{",
            "}",
            "\\",
            "\\\\",
            "$",
            "%",
            "~~~",
            "\\section{",
            "\\section{}",
            "\\href{",
            "\\textbf{\\textbf{\\textbf{",
            "\\documentclass{moderncv}\\cventry",
            "\\documentclass{moderncv}\\section{A}\\cventry{1}{2}",
            "\\documentclass{article}\\textbf{",
            "\\resumeItem",
            "\\resumeItemListStart",
            "\\begin{itemize}\\item",
            "\\é{ü}日本語 \\textbf{ñ",
            "ALLCAPS\n- \n*",
            "\u{0}\u{7f}",
        ];
        for input in inputs {
            let out = compile(input);
            assert!(!out.html.is_empty(), "empty html for {input:?}");
        }
    }

    #[test]
    fn test_deep_nesting_is_total() {
        let deep = format!("{}x{}", "\\textbf{".repeat(200), "}".repeat(200));
        let out = compile(&format!("\\documentclass{{article}}\n{deep}"));
        assert_eq!(out.error, None);
    }

    #[test]
    fn test_dialect_priority_in_result() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let result = compile_at("\\documentclass{moderncv}\n\\resumeItem{x}", now);
        assert_eq!(result.dialect, Some(Dialect::CommercialCv));
        assert_eq!(result.last_compiled_at, now);
        assert_eq!(compile_at("", now).dialect, None);
    }

    #[test]
    fn test_compile_is_idempotent() {
        let first = compile(MACRO_RESUME);
        let second = compile(MACRO_RESUME);
        assert_eq!(first, second);
        assert_eq!(first.error, None);
    }

    #[test]
    fn test_macro_resume_end_to_end() {
        let out = compile(MACRO_RESUME);
        assert_eq!(out.error, None);
        let html = out.html;
        assert!(html.contains("<h1>Jake Ryan</h1>"));
        assert!(html.contains("mailto:jake@su.edu"));
        assert!(html.contains("<li>Developed a REST API using <strong>FastAPI</strong></li>"));
        assert!(html.contains("<li>Wrote 40% fewer queries</li>"));
        assert!(!html.contains("tuned later"));
        assert!(html.contains("Texas A&amp;M University"));

        let education = html.find("<h2>Education</h2>").unwrap();
        let experience = html.find("<h2>Experience</h2>").unwrap();
        assert!(education < experience);
    }

    #[test]
    fn test_entries_keep_source_order() {
        let src = "\\documentclass{moderncv}\n\\section{Skills}\n\\cvitem{Zeta}{1}\n\\cvitem{Alpha}{2}\n\\cvitem{Mid}{3}";
        let html = compile(src).html;
        let zeta = html.find("Zeta").unwrap();
        let alpha = html.find("Alpha").unwrap();
        let mid = html.find("Mid").unwrap();
        assert!(zeta < alpha && alpha < mid);
    }

    #[test]
    fn test_email_without_name_renders_header_without_h1() {
        let out = compile("contact: someone@example.com\nEXPERIENCE\nAcme");
        assert!(out.html.contains("mailto:someone@example.com"));
        assert!(!out.html.contains("<h1>"));
    }

    #[test]
    fn test_freeform_keeps_percent_literal() {
        let out = compile("SUMMARY\nGrew revenue 40% in a year");
        assert!(out.html.contains("Grew revenue 40% in a year"));
    }

    #[test]
    fn test_no_identity_renders_no_header() {
        let out = compile("EXPERIENCE\nacme, engineer");
        assert_eq!(out.error, None);
        assert!(!out.html.contains("resume-header"));
    }

    #[test]
    fn test_panic_message_from_payloads() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
        let payload: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }
}
