// Fixed markup constants emitted by the renderer and the facade.

/// Stylesheet embedded in every rendered document. Screen rules first, then
/// print rules for letter-size pagination.
pub const STYLESHEET: &str = r#"
.resume-document {
  font-family: "Georgia", "Times New Roman", serif;
  font-size: 10.5pt;
  line-height: 1.35;
  color: #1a1a1a;
  max-width: 8.5in;
  margin: 0 auto;
  padding: 0.5in 0.6in;
  background: #ffffff;
  box-sizing: border-box;
}
.resume-document a {
  color: inherit;
  text-decoration: underline;
}
.resume-header {
  text-align: center;
  margin-bottom: 10pt;
}
.resume-header h1 {
  font-size: 22pt;
  font-variant: small-caps;
  letter-spacing: 0.5pt;
  margin: 0 0 4pt 0;
}
.resume-contact {
  font-size: 9.5pt;
}
.resume-contact .resume-contact-sep {
  margin: 0 5pt;
  color: #777777;
}
.resume-section {
  margin-top: 10pt;
}
.resume-section h2 {
  font-size: 12pt;
  font-variant: small-caps;
  border-bottom: 1px solid #1a1a1a;
  padding-bottom: 1pt;
  margin: 0 0 5pt 0;
}
.resume-entry {
  margin-bottom: 6pt;
}
.resume-entry-row {
  display: flex;
  justify-content: space-between;
  gap: 12pt;
}
.resume-entry-title {
  font-weight: bold;
}
.resume-entry-subtitle {
  font-style: italic;
}
.resume-entry-date,
.resume-entry-location {
  white-space: nowrap;
  font-size: 9.5pt;
}
.resume-entry-bullets {
  margin: 2pt 0 0 0;
  padding-left: 16pt;
}
.resume-entry-bullets li {
  margin-bottom: 1pt;
}
.resume-labeled {
  margin: 0 0 2pt 0;
}
.resume-label {
  font-weight: bold;
}
.resume-paragraph {
  margin: 0 0 5pt 0;
}
.resume-placeholder,
.resume-error {
  font-family: -apple-system, "Segoe UI", Helvetica, Arial, sans-serif;
  padding: 16pt;
  border-radius: 4pt;
}
.resume-placeholder {
  color: #666666;
  border: 1px dashed #bbbbbb;
  text-align: center;
}
.resume-error {
  color: #8a1f11;
  background: #fdecea;
  border: 1px solid #f5c2bb;
}
.resume-error pre {
  white-space: pre-wrap;
  margin: 6pt 0 0 0;
}
@page {
  size: letter;
  margin: 0.5in 0.6in;
}
@media print {
  .resume-document {
    max-width: none;
    margin: 0;
    padding: 0;
  }
  .resume-document a {
    text-decoration: none;
  }
  .resume-section h2 {
    break-after: avoid;
  }
  .resume-entry,
  .resume-labeled,
  .resume-paragraph {
    break-inside: avoid;
  }
}
"#;

/// Shown in place of a document when the source is blank.
pub const PLACEHOLDER_HTML: &str = "<div class=\"resume-placeholder\">\
<p>Start typing or pick a template to see your resume here.</p>\
</div>";
