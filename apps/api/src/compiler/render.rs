//! HTML rendering of a parsed document.
//!
//! The output is a single self-contained fragment: the stylesheet travels
//! with the content so the result can be previewed or printed on its own.


use crate::compiler::inline::{escape_html, safe_href};
use crate::compiler::model::{Document, Entry, IdentityRecord, RichText, Section, SubheadingEntry};
use crate::compiler::stylesheet::STYLESHEET;

const CONTACT_SEPARATOR: &str = "<span class=\"resume-contact-sep\">|</span>";

/// Renders `document` with an identity header. Total and deterministic.
pub fn render(document: &Document, identity: &IdentityRecord) -> String {
    let mut out = String::with_capacity(STYLESHEET.len() + 4096);
    out.push_str("<div class=\"resume-document\">\n<style>");
    out.push_str(STYLESHEET);
    out.push_str("</style>\n");

    if !identity.is_empty() {
        render_header(&mut out, identity);
    }
    for section in &document.sections {
        render_section(&mut out, section);
    }

    out.push_str("</div>\n");
    out
}

fn render_header(out: &mut String, identity: &IdentityRecord) {
    out.push_str("<header class=\"resume-header\">\n");
    if let Some(name) = &identity.name {
        out.push_str(&format!("<h1>{}</h1>\n", escape_html(name)));
    }

    let contacts = contact_links(identity);
    if !contacts.is_empty() {
        out.push_str(&format!(
            "<div class=\"resume-contact\">{}</div>\n",
            contacts.join(CONTACT_SEPARATOR)
        ));
    }
    out.push_str("</header>\n");
}

fn contact_links(identity: &IdentityRecord) -> Vec<String> {
    let mut links = Vec::new();
    if let Some(email) = &identity.email {
        links.push(link(&format!("mailto:{email}"), email));
    }
    if let Some(phone) = &identity.phone {
        let dialable: String = phone
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '+')
            .collect();
        links.push(link(&format!("tel:{dialable}"), phone));
    }
    if let Some(handle) = &identity.linkedin_handle {
        let label = format!("linkedin.com/in/{handle}");
        links.push(link(&format!("https://{label}"), &label));
    }
    if let Some(handle) = &identity.github_handle {
        let label = format!("github.com/{handle}");
        links.push(link(&format!("https://{label}"), &label));
    }
    if let Some(homepage) = &identity.homepage {
        let label = homepage
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/');
        links.push(link(homepage, label));
    }
    links
}

fn link(href: &str, label: &str) -> String {
    format!(
        "<a href=\"{}\">{}</a>",
        escape_html(&safe_href(href)),
        escape_html(label)
    )
}

fn render_section(out: &mut String, section: &Section) {
    out.push_str("<section class=\"resume-section\">\n");
    out.push_str(&format!("<h2>{}</h2>\n", escape_html(&section.title)));
    out.push_str("<div class=\"resume-section-body\">\n");
    for entry in &section.entries {
        render_entry(out, entry);
    }
    out.push_str("</div>\n</section>\n");
}

fn render_entry(out: &mut String, entry: &Entry) {
    match entry {
        Entry::Subheading(subheading) => render_subheading(out, subheading),
        Entry::Labeled { label, body } => match label {
            Some(label) if !label.is_empty() => {
                out.push_str(&format!(
                    "<p class=\"resume-labeled\"><span class=\"resume-label\">{}:</span> {}</p>\n",
                    label.as_str(),
                    body.as_str()
                ));
            }
            _ => {
                out.push_str(&format!("<p class=\"resume-labeled\">{}</p>\n", body.as_str()));
            }
        },
        Entry::Freeform { text } => {
            out.push_str(&format!("<p class=\"resume-paragraph\">{}</p>\n", text.as_str()));
        }
    }
}

fn render_subheading(out: &mut String, entry: &SubheadingEntry) {
    out.push_str("<div class=\"resume-entry\">\n");
    render_row(
        out,
        ("resume-entry-title", &entry.title),
        ("resume-entry-date", &entry.date_range),
    );
    if !entry.subtitle.is_empty() || !entry.location.is_empty() {
        render_row(
            out,
            ("resume-entry-subtitle", &entry.subtitle),
            ("resume-entry-location", &entry.location),
        );
    }

    let bullets: Vec<&RichText> = entry.bullets.iter().filter(|b| !b.is_empty()).collect();
    if !bullets.is_empty() {
        out.push_str("<ul class=\"resume-entry-bullets\">\n");
        for bullet in bullets {
            out.push_str(&format!("<li>{}</li>\n", bullet.as_str()));
        }
        out.push_str("</ul>\n");
    }
    out.push_str("</div>\n");
}

fn render_row(out: &mut String, left: (&str, &RichText), right: (&str, &RichText)) {
    out.push_str(&format!(
        "<div class=\"resume-entry-row\"><span class=\"{}\">{}</span><span class=\"{}\">{}</span></div>\n",
        left.0,
        left.1.as_str(),
        right.0,
        right.1.as_str()
    ));
}
