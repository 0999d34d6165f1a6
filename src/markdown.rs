// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Markdown rendering and heading back-conversion.
///
/// Markdown READMEs are rendered to HTML with `pulldown-cmark` using the
/// default CommonMark option set, so the same heading locator serves both
/// flavors. A located heading is turned back into an ATX markdown line with
/// a small deterministic converter covering the inline elements that can
/// appear in a heading.
use std::ops::Range;

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, html};
use regex::Regex;

use crate::{
    document::{Element, Node},
    error::Error
};

/// Renders markdown to HTML.
pub fn render_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, Options::empty());
    let mut output = String::with_capacity(markdown.len() + markdown.len() / 2);
    html::push_html(&mut output, parser);
    output
}

/// Converts a rendered `<h1>` element into a single ATX heading line.
///
/// Text is emitted verbatim; `a`, `img`, `code`, `em` and `strong` map to
/// their markdown spellings and any other element contributes its content.
///
/// # Examples
///
/// ```
/// use readme_badges::{Document, heading_to_markdown};
///
/// let document = Document::parse("<h1>Tool <a href=\"/ci\"><img alt=\"ci\" src=\"ci.svg\"></a></h1>");
/// let heading = document.first_heading().expect("heading");
/// assert_eq!(heading_to_markdown(heading), "# Tool [![ci](ci.svg)](/ci)");
/// ```
pub fn heading_to_markdown(heading: &Element) -> String {
    let mut line = String::from("# ");
    line.push_str(inline_markdown(heading.children()).trim());
    line
}

/// Removes separator artifacts left by the back-conversion of badge markup.
///
/// Commas between adjacent badge links collapse to a space, runs of blanks
/// collapse to one space and trailing blanks are dropped.
///
/// # Errors
///
/// Returns [`Error::Validation`] if the built-in patterns fail to compile.
pub fn normalize_separators(line: &str) -> Result<String, Error> {
    let comma_between_links = Regex::new(r"\)[ \t]*,[ \t]*(!?\[)")
        .map_err(|e| Error::validation(format!("invalid regex: {e}")))?;
    let blank_run =
        Regex::new(r"[ \t]{2,}").map_err(|e| Error::validation(format!("invalid regex: {e}")))?;

    let without_commas = comma_between_links.replace_all(line, ") $1");
    let collapsed = blank_run.replace_all(&without_commas, " ");
    Ok(collapsed.trim_end().to_owned())
}

/// Source range of the first level-one heading, trailing line break excluded.
///
/// Covers ATX and setext headings alike.
pub fn first_heading_range(markdown: &str) -> Option<Range<usize>> {
    Parser::new_ext(markdown, Options::empty())
        .into_offset_iter()
        .find_map(|(event, range)| match event {
            Event::Start(Tag::Heading {
                level: HeadingLevel::H1,
                ..
            }) => Some(range),
            _ => None
        })
        .map(|range| {
            let trimmed = markdown[range.clone()].trim_end();
            range.start..range.start + trimmed.len()
        })
}

fn inline_markdown(nodes: &[Node]) -> String {
    let mut buffer = String::new();
    for node in nodes {
        match node {
            Node::Text(text) => buffer.push_str(text),
            Node::Element(element) => buffer.push_str(&element_markdown(element))
        }
    }
    buffer
}

fn element_markdown(element: &Element) -> String {
    match element.name() {
        "a" => format!(
            "[{}]({})",
            inline_markdown(element.children()),
            element.attribute("href").unwrap_or_default()
        ),
        "img" => format!(
            "![{}]({})",
            element.attribute("alt").unwrap_or_default(),
            element.attribute("src").unwrap_or_default()
        ),
        "code" => format!("`{}`", element.text()),
        "em" | "i" => format!("*{}*", inline_markdown(element.children())),
        "strong" | "b" => format!("**{}**", inline_markdown(element.children())),
        "br" => " ".to_owned(),
        _ => inline_markdown(element.children())
    }
}
