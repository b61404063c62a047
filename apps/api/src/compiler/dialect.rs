//! Dialect detection from document-level markers.

use std::sync::LazyLock;

use regex::Regex;

use crate::compiler::model::Dialect;

static MODERNCV_CLASS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\documentclass\s*(?:\[[^\]]*\])?\s*\{\s*moderncv\s*\}").unwrap()
});

static RESUME_MACRO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\\(?:resumeSubheading|resumeSubSubheading|resumeProjectHeading|resumeItemListStart|resumeSubHeadingListStart|resumeItem)\b",
    )
    .unwrap()
});

static ARTICLE_CLASS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\documentclass\s*(?:\[[^\]]*\])?\s*\{\s*article\s*\}").unwrap()
});

/// Classifies `source`. Checks run from most to least specific, so a source
/// carrying several markers lands in the most specific dialect.
pub fn detect(source: &str) -> Dialect {
    if MODERNCV_CLASS_RE.is_match(source) {
        Dialect::CommercialCv
    } else if RESUME_MACRO_RE.is_match(source) {
        Dialect::MacroCommand
    } else if ARTICLE_CLASS_RE.is_match(source) {
        Dialect::GenericArticle
    } else {
        Dialect::Freeform
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moderncv_class() {
        let src = "\\documentclass[11pt,a4paper,sans]{moderncv}\n\\moderncvstyle{banking}";
        assert_eq!(detect(src), Dialect::CommercialCv);
    }

    #[test]
    fn test_moderncv_wins_over_macro_commands() {
        let src = "\\documentclass{moderncv}\n\\resumeSubheading{a}{b}{c}{d}";
        assert_eq!(detect(src), Dialect::CommercialCv);
    }

    #[test]
    fn test_macro_command_wins_over_article() {
        let src = "\\documentclass[letterpaper,11pt]{article}\n\\resumeItem{Shipped it}";
        assert_eq!(detect(src), Dialect::MacroCommand);
    }

    #[test]
    fn test_macro_command_without_class() {
        assert_eq!(
            detect("\\resumeSubHeadingListStart\n\\resumeSubHeadingListEnd"),
            Dialect::MacroCommand
        );
    }

    #[test]
    fn test_article_class() {
        let src = "\\documentclass{article}\n\\begin{document}\\textbf{EXPERIENCE}\\end{document}";
        assert_eq!(detect(src), Dialect::GenericArticle);
    }

    #[test]
    fn test_freeform_fallback() {
        assert_eq!(detect(""), Dialect::Freeform);
        assert_eq!(detect("JANE DOE\nEXPERIENCE\nAcme"), Dialect::Freeform);
        assert_eq!(detect("\\documentclass{report}"), Dialect::Freeform);
    }

    #[test]
    fn test_macro_name_prefix_is_not_a_marker() {
        assert_eq!(detect("\\resumeItemized{x}"), Dialect::Freeform);
    }
}
