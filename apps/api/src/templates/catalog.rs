//! Bundled resume templates, one per dialect, embedded at build time.

use serde::Serialize;

use crate::compiler::Dialect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TemplateInfo {
    pub id: &'static str,
    pub display_name: &'static str,
    pub source_text: &'static str,
    /// Dialect the source is written in.
    #[serde(skip)]
    pub dialect: Dialect,
}

const TEMPLATES: &[TemplateInfo] = &[
    TemplateInfo {
        id: "classic-macro",
        display_name: "Classic (resume macros)",
        source_text: include_str!("../../templates/classic-macro.tex"),
        dialect: Dialect::MacroCommand,
    },
    TemplateInfo {
        id: "moderncv-banking",
        display_name: "ModernCV Banking",
        source_text: include_str!("../../templates/moderncv-banking.tex"),
        dialect: Dialect::CommercialCv,
    },
    TemplateInfo {
        id: "plain-article",
        display_name: "Plain Article",
        source_text: include_str!("../../templates/plain-article.tex"),
        dialect: Dialect::GenericArticle,
    },
    TemplateInfo {
        id: "plain-text",
        display_name: "Plain Text",
        source_text: include_str!("../../templates/plain-text.txt"),
        dialect: Dialect::Freeform,
    },
];

/// All templates in display order.
pub fn list_templates() -> &'static [TemplateInfo] {
    TEMPLATES
}

pub fn find_template(id: &str) -> Option<&'static TemplateInfo> {
    TEMPLATES.iter().find(|t| t.id == id)
}

/// Source text of template `id`, or `None` for an unknown id.
// Library entry point; the HTTP handler returns the whole record instead.
#[allow(dead_code)]
pub fn apply_template(id: &str) -> Option<&'static str> {
    find_template(id).map(|t| t.source_text)
}
