//! Document model produced by the compiler pipeline.
//!
//! Every value here is built fresh for a single `compile()` call and dropped
//! once the HTML string has been rendered.

use serde::{Deserialize, Serialize};

/// Source convention the document is written in. Assigned once per compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dialect {
    /// Custom `\resumeSubheading` / `\resumeItem` macro templates.
    MacroCommand,
    /// The `moderncv` document class (`\cventry`, `\cvitem`).
    CommercialCv,
    /// Plain `article` class documents with bolded section titles.
    GenericArticle,
    /// Anything else: plain text with uppercase headings.
    Freeform,
}

impl Dialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::MacroCommand => "macro-command",
            Dialect::CommercialCv => "commercial-cv",
            Dialect::GenericArticle => "generic-article",
            Dialect::Freeform => "freeform",
        }
    }

    /// True for the dialects written in the typesetting markup language.
    pub fn is_typeset(&self) -> bool {
        !matches!(self, Dialect::Freeform)
    }
}

/// Best-effort identity of the resume owner. Absence of any field is normal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub linkedin_handle: Option<String>,
    pub github_handle: Option<String>,
    pub homepage: Option<String>,
}

impl IdentityRecord {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.linkedin_handle.is_none()
            && self.github_handle.is_none()
            && self.homepage.is_none()
    }
}

/// HTML with inline commands resolved and literal text escaped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RichText(String);

impl RichText {
    pub(crate) fn from_html(html: String) -> Self {
        RichText(html)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubheadingEntry {
    pub title: RichText,
    pub date_range: RichText,
    pub subtitle: RichText,
    pub location: RichText,
    pub bullets: Vec<RichText>,
}

/// One normalized record within a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entry {
    Subheading(SubheadingEntry),
    Labeled {
        label: Option<RichText>,
        body: RichText,
    },
    Freeform {
        text: RichText,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub entries: Vec<Entry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub sections: Vec<Section>,
}

/// A titled slice of source text, before entry parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSection {
    pub title: String,
    pub body: String,
}
