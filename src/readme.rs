// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Appends badge markup to the first top-level README heading.
///
/// Documents that already carry an `<h1>` tag are patched as HTML. Anything
/// else is treated as markdown: it is rendered, the heading is located in the
/// rendered tree and the change is mapped back onto the markdown source.
///
/// The patch is not idempotent. Running it on an already patched README
/// finds the patched heading first and appends the badges again.
use tracing::{debug, info, warn};

use crate::{
    badge::escape_html,
    document::Document,
    error::Error,
    markdown::{first_heading_range, heading_to_markdown, normalize_separators, render_html}
};

/// Markup flavor of a README.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    /// Document contains an HTML `<h1>` tag.
    Html,
    /// Any other document, handled as markdown.
    Markdown
}

/// Detects the flavor from the raw content.
///
/// An `<h1` opener followed by `>`, whitespace or `/` anywhere in the text
/// makes the document HTML; tag names are matched case-insensitively.
///
/// # Examples
///
/// ```
/// use readme_badges::{Flavor, detect_flavor};
///
/// assert_eq!(detect_flavor("<h1 align=\"center\">Tool</h1>"), Flavor::Html);
/// assert_eq!(detect_flavor("# Tool\n<h2>Usage</h2>"), Flavor::Markdown);
/// ```
pub fn detect_flavor(content: &str) -> Flavor {
    let has_heading_tag = content.as_bytes().windows(4).any(|window| {
        window[0] == b'<'
            && window[1].eq_ignore_ascii_case(&b'h')
            && window[2] == b'1'
            && (window[3] == b'>' || window[3] == b'/' || window[3].is_ascii_whitespace())
    });

    if has_heading_tag { Flavor::Html } else { Flavor::Markdown }
}

/// Returns the README with `badges` appended to its first top-level heading.
///
/// The new heading is the original heading's plain text, a single space and
/// the badge markup. Only the first heading is touched and every other byte
/// of the document is preserved.
///
/// # Errors
///
/// Returns [`Error::DocumentStructure`] when the document, including an
/// empty one, has no top-level heading.
///
/// # Examples
///
/// ```
/// use readme_badges::patch_readme;
///
/// let html = patch_readme("<h1>Title</h1><p>Body</p>", "[build]")?;
/// assert_eq!(html, "<h1>Title [build]</h1><p>Body</p>");
///
/// let markdown = patch_readme("# My Project\n\nSome text", "[build]")?;
/// assert_eq!(markdown, "# My Project [build]\n\nSome text");
/// # Ok::<(), readme_badges::Error>(())
/// ```
pub fn patch_readme(content: &str, badges: &str) -> Result<String, Error> {
    let flavor = detect_flavor(content);
    info!("Patching README heading as {:?}", flavor);

    match flavor {
        Flavor::Html => patch_html(content, badges),
        Flavor::Markdown => patch_markdown(content, badges)
    }
}

fn patch_html(content: &str, badges: &str) -> Result<String, Error> {
    let document = Document::parse(content);
    let heading = document
        .first_heading()
        .ok_or_else(|| missing_heading(&document))?;

    let replacement = format!(
        "{}{}</h1>",
        opening_tag(document.open_tag(heading), heading.is_self_closing()),
        heading_body(&heading.text(), badges)
    );
    debug!(
        "Replacing heading {:?} with {:?}",
        document.outer_html(heading),
        replacement
    );

    let span = heading.span();
    Ok(splice(content, span.start, span.end, &replacement))
}

fn patch_markdown(content: &str, badges: &str) -> Result<String, Error> {
    let rendered = render_html(content);
    let document = Document::parse(&rendered);
    let heading = document
        .first_heading()
        .ok_or_else(|| missing_heading(&document))?;
    let range = first_heading_range(content).ok_or_else(|| missing_heading(&document))?;
    let source_heading = &content[range.clone()];
    let original_line = heading_to_markdown(heading);

    if let Some(offset) = source_heading.find(&original_line) {
        let new_line = markdown_line(&format!(
            "<h1>{}</h1>",
            heading_body(&heading.text(), badges)
        ))?;
        let start = range.start + offset;
        debug!("Replacing heading line {:?} with {:?}", original_line, new_line);
        return Ok(splice(content, start, start + original_line.len(), &new_line));
    }

    if let Some(title) = atx_title(source_heading) {
        let badge_line = markdown_line(&format!("<h1>{badges}</h1>"))?;
        let badge_markdown = badge_line.trim_start_matches('#').trim_start();
        let new_line = if badge_markdown.is_empty() {
            title.to_owned()
        } else {
            format!("{title} {badge_markdown}")
        };
        debug!(
            "Heading line {:?} differs from its rendering {:?}, appending to the source text",
            source_heading, original_line
        );
        return Ok(splice(content, range.start, range.end, &new_line));
    }

    let new_line = markdown_line(&format!(
        "<h1>{}</h1>",
        heading_body(&heading.text(), badges)
    ))?;
    warn!(
        "Rewriting heading {:?} from its rendered text as {:?}",
        source_heading, new_line
    );
    Ok(splice(content, range.start, range.end, &new_line))
}

/// Converts a single rendered `<h1>` fragment into a normalized ATX line.
fn markdown_line(heading_html: &str) -> Result<String, Error> {
    let document = Document::parse(heading_html);
    let heading = document
        .first_heading()
        .ok_or_else(|| missing_heading(&document))?;
    normalize_separators(&heading_to_markdown(heading))
}

/// Single-line ATX heading text with any closing `#` sequence removed.
fn atx_title(source_heading: &str) -> Option<&str> {
    if source_heading.contains('\n') || !source_heading.trim_start().starts_with('#') {
        return None;
    }

    let line = source_heading.trim_end();
    let without_closing = line.trim_end_matches('#');
    if without_closing.len() < line.len() && without_closing.ends_with([' ', '\t']) {
        Some(without_closing.trim_end())
    } else {
        Some(line)
    }
}

fn opening_tag(open_tag: &str, self_closing: bool) -> String {
    if self_closing {
        let attributes = open_tag.trim_end_matches('>').trim_end_matches('/').trim_end();
        format!("{attributes}>")
    } else {
        open_tag.to_owned()
    }
}

fn heading_body(text: &str, badges: &str) -> String {
    let title = text.trim();
    if title.is_empty() {
        badges.to_owned()
    } else {
        format!("{} {}", escape_html(title), badges)
    }
}

fn splice(content: &str, start: usize, end: usize, replacement: &str) -> String {
    let mut result = String::with_capacity(content.len() - (end - start) + replacement.len());
    result.push_str(&content[..start]);
    result.push_str(replacement);
    result.push_str(&content[end..]);
    result
}

fn missing_heading(document: &Document<'_>) -> Error {
    match document.stopped_at() {
        Some(offset) => Error::document_structure(format!(
            "README has no top-level heading to attach badges to \
             (markup parsing stopped at byte {offset} on a syntax error)"
        )),
        None => Error::document_structure("README has no top-level heading to attach badges to")
    }
}
