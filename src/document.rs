// ABOUTME: Document assembly module for the slide-build application
// ABOUTME: Fills template placeholders and joins the header with the slide body

use crate::errors::Result;
use crate::utils;
use log::info;
use std::fs;
use std::path::Path;

pub const DIR_PLACEHOLDER: &str = "@@sdir@@";
pub const TITLE_PLACEHOLDER: &str = "@@stitle@@";
pub const PAUSE_PLACEHOLDER: &str = "%@@pausemode@@";
pub const TEACHER_PLACEHOLDER: &str = "%@@teachermode@@";

pub const END_DOCUMENT: &str = r"\end{document}";

/// Values substituted into a theme template
#[derive(Debug, Clone, Default)]
pub struct TemplateVars {
    /// Course directory, forward-slash separated
    pub dir: String,
    /// Footer text, `"{course} {title}"`
    pub title: String,
    pub handout: bool,
    pub teacher: bool,
}

impl TemplateVars {
    /// Handout output drops the progressive `\pause` reveals
    pub fn pause_directive(&self) -> &'static str {
        if self.handout {
            r"\mypausemodefalse"
        } else {
            r"\mypausemodetrue"
        }
    }

    pub fn teacher_directive(&self) -> &'static str {
        if self.teacher {
            r"\teachermodetrue"
        } else {
            r"\teachermodefalse"
        }
    }

    fn replacements(&self) -> [(&'static str, &str); 4] {
        [
            (DIR_PLACEHOLDER, self.dir.as_str()),
            (TITLE_PLACEHOLDER, self.title.as_str()),
            (PAUSE_PLACEHOLDER, self.pause_directive()),
            (TEACHER_PLACEHOLDER, self.teacher_directive()),
        ]
    }
}

/// Replace placeholders in a single left-to-right pass.
/// Inserted values are never rescanned.
pub fn substitute(template: &str, replacements: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while !rest.is_empty() {
        let hit = replacements
            .iter()
            .filter(|(key, _)| !key.is_empty())
            .filter_map(|(key, value)| rest.find(key).map(|pos| (pos, *key, *value)))
            .min_by_key(|(pos, key, _)| (*pos, std::cmp::Reverse(key.len())));

        match hit {
            Some((pos, key, value)) => {
                out.push_str(&rest[..pos]);
                out.push_str(value);
                rest = &rest[pos + key.len()..];
            }
            None => {
                out.push_str(rest);
                break;
            }
        }
    }

    out
}

/// Render the document header from a theme template
pub fn render_header(template: &str, vars: &TemplateVars) -> String {
    substitute(template, &vars.replacements())
}

/// Join header and body into a compilable document, closing it if the body
/// does not already do so.
pub fn assemble_document(template: &str, vars: &TemplateVars, body: &str) -> String {
    let header = render_header(template, vars);
    let body = body.trim_end();

    let mut doc = String::with_capacity(header.len() + body.len() + 32);
    doc.push_str(&header);
    doc.push_str("\n\n");
    doc.push_str(body);
    if !body.ends_with(END_DOCUMENT) {
        doc.push('\n');
        doc.push_str(END_DOCUMENT);
    }
    doc.push('\n');
    doc
}

/// Write the assembled document to disk
pub fn write_document(content: &str, output_path: &Path) -> Result<()> {
    info!("Writing document: {:?}", output_path);
    utils::ensure_parent_directory_exists(output_path)?;
    fs::write(output_path, content)?;
    Ok(())
}
