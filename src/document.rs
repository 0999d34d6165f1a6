// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Minimal HTML document tree.
//!
//! READMEs mix markdown with loosely written HTML, so the tree is built with
//! a lenient `quick-xml` reader: end tag names are not checked, void
//! elements never wait for a closing tag, unmatched end tags are ignored and
//! elements left open are closed at the end of input. Every element records
//! the byte span it occupies in the source, which lets callers splice the
//! exact original markup.

use std::{borrow::Cow, ops::Range};

use quick_xml::{Reader, escape::unescape_with, events::Event};
use tracing::warn;

const HEADING_TAG: &str = "h1";

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr"
];

/// A node of the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Element with its children.
    Element(Element),
    /// Unescaped character data.
    Text(String)
}

/// An element and the source range it was parsed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name:         String,
    attributes:   Vec<(String, String)>,
    children:     Vec<Node>,
    span:         Range<usize>,
    open_tag_end: usize,
    self_closing: bool
}

impl Element {
    /// Lowercase tag name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the unescaped value of an attribute.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Child nodes in document order.
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Byte range covering the opening tag through the closing tag.
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    /// Whether the element was written as a self-closing tag such as `<h1/>`.
    pub fn is_self_closing(&self) -> bool {
        self.self_closing
    }

    /// Concatenated text of all descendants, like the DOM `textContent`.
    pub fn text(&self) -> String {
        let mut buffer = String::new();
        collect_text(&self.children, &mut buffer);
        buffer
    }

    fn find_first(&self, name: &str) -> Option<&Element> {
        if self.name == name {
            return Some(self);
        }
        find_in(&self.children, name)
    }
}

/// Parsed document borrowing its source text.
#[derive(Debug, Clone)]
pub struct Document<'a> {
    source:     &'a str,
    nodes:      Vec<Node>,
    stopped_at: Option<usize>
}

impl<'a> Document<'a> {
    /// Parses HTML leniently.
    ///
    /// Malformed markup never fails the parse: the reader stops at the first
    /// syntax error and keeps everything built up to that point.
    ///
    /// # Examples
    ///
    /// ```
    /// use readme_badges::Document;
    ///
    /// let source = "<p>intro</p><h1 align=\"center\">Title <img src=\"logo.png\"></h1>";
    /// let document = Document::parse(source);
    /// let heading = document.first_heading().expect("heading");
    /// assert_eq!(heading.text(), "Title ");
    /// assert_eq!(document.open_tag(heading), "<h1 align=\"center\">");
    /// assert_eq!(document.outer_html(heading), &source[12..]);
    /// ```
    pub fn parse(source: &'a str) -> Self {
        let mut reader = Reader::from_str(source);
        {
            let config = reader.config_mut();
            config.check_end_names = false;
            config.allow_unmatched_ends = true;
            config.trim_text(false);
        }

        let mut tree = TreeBuilder::default();
        let mut stopped_at = None;

        loop {
            let event = match reader.read_event() {
                Ok(event) => event,
                Err(error) => {
                    let offset = usize::try_from(reader.error_position())
                        .unwrap_or(source.len())
                        .min(source.len());
                    warn!("Stopping markup parse at byte {}: {}", offset, error);
                    stopped_at = Some(offset);
                    break;
                }
            };
            let end = position(&reader, source);

            match event {
                Event::Start(tag) => {
                    let start = tag_start(source, end, tag.len() + 2, "<");
                    let element = new_element(&tag, start..end);
                    if VOID_ELEMENTS.contains(&element.name.as_str()) {
                        tree.attach(Node::Element(element));
                    } else {
                        tree.open(element);
                    }
                }
                Event::Empty(tag) => {
                    let start = tag_start(source, end, tag.len() + 3, "<");
                    let mut element = new_element(&tag, start..end);
                    element.self_closing = true;
                    tree.attach(Node::Element(element));
                }
                Event::End(tag) => {
                    let name = String::from_utf8_lossy(tag.name().as_ref()).to_ascii_lowercase();
                    let start = tag_start(source, end, tag.len() + 3, "</");
                    tree.close(&name, start, end);
                }
                Event::Text(text) => {
                    let raw = String::from_utf8_lossy(&text);
                    tree.attach(Node::Text(unescape_html(&raw).into_owned()));
                }
                Event::CData(data) => {
                    tree.attach(Node::Text(String::from_utf8_lossy(&data).into_owned()));
                }
                Event::Eof => break,
                Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
            }
        }

        Self {
            source,
            nodes: tree.finish(source.len()),
            stopped_at
        }
    }

    /// Top-level nodes in document order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Byte offset where a syntax error cut the parse short, if it did.
    pub fn stopped_at(&self) -> Option<usize> {
        self.stopped_at
    }

    /// First `<h1>` element in document order, at any depth.
    pub fn first_heading(&self) -> Option<&Element> {
        find_in(&self.nodes, HEADING_TAG)
    }

    /// Exact source markup of an element, including its closing tag.
    pub fn outer_html(&self, element: &Element) -> &'a str {
        &self.source[element.span.clone()]
    }

    /// Exact source markup of the opening tag, attributes included.
    pub fn open_tag(&self, element: &Element) -> &'a str {
        &self.source[element.span.start..element.open_tag_end]
    }
}

#[derive(Default)]
struct TreeBuilder {
    roots: Vec<Node>,
    stack: Vec<Element>
}

impl TreeBuilder {
    fn attach(&mut self, node: Node) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.roots.push(node)
        }
    }

    fn open(&mut self, element: Element) {
        self.stack.push(element);
    }

    fn close(&mut self, name: &str, tag_start: usize, tag_end: usize) {
        let Some(index) = self.stack.iter().rposition(|element| element.name == name) else {
            return;
        };

        while self.stack.len() > index + 1 {
            if let Some(mut unclosed) = self.stack.pop() {
                unclosed.span.end = tag_start;
                self.attach(Node::Element(unclosed));
            }
        }
        if let Some(mut element) = self.stack.pop() {
            element.span.end = tag_end;
            self.attach(Node::Element(element));
        }
    }

    fn finish(mut self, source_len: usize) -> Vec<Node> {
        while let Some(mut unclosed) = self.stack.pop() {
            unclosed.span.end = source_len;
            self.attach(Node::Element(unclosed));
        }
        self.roots
    }
}

fn new_element(tag: &quick_xml::events::BytesStart<'_>, span: Range<usize>) -> Element {
    let name = String::from_utf8_lossy(tag.name().as_ref()).to_ascii_lowercase();
    let attributes = tag
        .html_attributes()
        .filter_map(Result::ok)
        .map(|attribute| {
            let key = String::from_utf8_lossy(attribute.key.as_ref()).to_ascii_lowercase();
            let raw = String::from_utf8_lossy(&attribute.value);
            let value = unescape_html(&raw).into_owned();
            (key, value)
        })
        .collect();

    Element {
        name,
        attributes,
        children: Vec::new(),
        open_tag_end: span.end,
        span,
        self_closing: false
    }
}

fn position(reader: &Reader<&[u8]>, source: &str) -> usize {
    usize::try_from(reader.buffer_position())
        .unwrap_or(source.len())
        .min(source.len())
}

/// Locates the `<` that opens a tag ending at `end`.
///
/// `raw_len` is the tag length implied by the event; when that does not
/// land on the expected opener the source is searched backwards instead.
fn tag_start(source: &str, end: usize, raw_len: usize, opener: &str) -> usize {
    let candidate = end.saturating_sub(raw_len);
    if source
        .get(candidate..)
        .is_some_and(|rest| rest.starts_with(opener))
    {
        return candidate;
    }
    source
        .get(..end)
        .and_then(|head| head.rfind(opener))
        .unwrap_or(candidate)
}

fn unescape_html(raw: &str) -> Cow<'_, str> {
    unescape_with(raw, resolve_entity).unwrap_or(Cow::Borrowed(raw))
}

fn resolve_entity(entity: &str) -> Option<&'static str> {
    let resolved = match entity {
        "lt" => "<",
        "gt" => ">",
        "amp" => "&",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => "\u{a0}",
        "copy" => "\u{a9}",
        "reg" => "\u{ae}",
        "trade" => "\u{2122}",
        "ndash" => "\u{2013}",
        "mdash" => "\u{2014}",
        "hellip" => "\u{2026}",
        _ => return None
    };
    Some(resolved)
}

fn collect_text(nodes: &[Node], buffer: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => buffer.push_str(text),
            Node::Element(element) => collect_text(&element.children, buffer)
        }
    }
}

fn find_in<'n>(nodes: &'n [Node], name: &str) -> Option<&'n Element> {
    nodes.iter().find_map(|node| match node {
        Node::Element(element) => element.find_first(name),
        Node::Text(_) => None
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_first_heading_in_document_order() {
        let source = "<div><p>lead</p><h1>First</h1></div><h1>Second</h1>";
        let document = Document::parse(source);
        let heading = document.first_heading().expect("heading");

        assert_eq!(heading.text(), "First");
        assert_eq!(document.outer_html(heading), "<h1>First</h1>");
    }

    #[test]
    fn heading_need_not_be_first_element() {
        let source = "<p align=\"center\"><img src=\"logo.svg\"></p>\n<h1>Project</h1>";
        let document = Document::parse(source);
        let heading = document.first_heading().expect("heading");
        assert_eq!(heading.text(), "Project");
    }

    #[test]
    fn returns_none_without_heading() {
        let document = Document::parse("<h2>Sub</h2><p>text</p>");
        assert!(document.first_heading().is_none());
        assert!(Document::parse("").first_heading().is_none());
    }

    #[test]
    fn text_includes_nested_elements_and_decodes_entities() {
        let source = "<h1>Tom &amp; <em>Jerry</em>&nbsp;<code>v1</code></h1>";
        let document = Document::parse(source);
        let heading = document.first_heading().expect("heading");

        assert_eq!(heading.text(), "Tom & Jerry\u{a0}v1");
        assert_eq!(document.outer_html(heading), source);
    }

    #[test]
    fn void_elements_do_not_swallow_siblings() {
        let source = "<h1><img src=\"a.png\" alt=\"logo\"> Name<br></h1><p>after</p>";
        let document = Document::parse(source);
        let heading = document.first_heading().expect("heading");

        assert_eq!(document.outer_html(heading), "<h1><img src=\"a.png\" alt=\"logo\"> Name<br></h1>");
        match &heading.children()[0] {
            Node::Element(image) => {
                assert_eq!(image.name(), "img");
                assert_eq!(image.attribute("alt"), Some("logo"));
                assert_eq!(document.outer_html(image), "<img src=\"a.png\" alt=\"logo\">");
            }
            other => panic!("expected image element, got {other:?}")
        }
        assert_eq!(document.nodes().len(), 2);
    }

    #[test]
    fn self_closing_tags_keep_exact_span() {
        let source = "<h1>A <img src=\"b.svg\" /></h1>";
        let document = Document::parse(source);
        let heading = document.first_heading().expect("heading");
        match &heading.children()[1] {
            Node::Element(image) => assert_eq!(document.outer_html(image), "<img src=\"b.svg\" />"),
            other => panic!("expected image element, got {other:?}")
        }
    }

    #[test]
    fn unclosed_elements_end_at_input_end() {
        let source = "<h1>Dangling";
        let document = Document::parse(source);
        let heading = document.first_heading().expect("heading");
        assert_eq!(document.outer_html(heading), source);
    }

    #[test]
    fn mismatched_end_tags_close_inner_elements() {
        let source = "<h1><b>bold</h1><p>x</p>";
        let document = Document::parse(source);
        let heading = document.first_heading().expect("heading");
        assert_eq!(document.outer_html(heading), "<h1><b>bold</h1>");
        assert_eq!(heading.text(), "bold");
    }

    #[test]
    fn syntax_error_records_where_parsing_stopped() {
        let document = Document::parse("<p>intro</p><!-- unterminated\n<h1>Title</h1>");
        assert!(document.first_heading().is_none());
        assert!(document.stopped_at().is_some());

        assert_eq!(Document::parse("<h1>Title</h1>").stopped_at(), None);
    }

    #[test]
    fn self_closing_heading_is_flagged() {
        let document = Document::parse("<h1 align=\"center\"/><p>x</p>");
        let heading = document.first_heading().expect("heading");
        assert!(heading.is_self_closing());
        assert!(heading.children().is_empty());

        let document = Document::parse("<h1>Title</h1>");
        assert!(!document.first_heading().expect("heading").is_self_closing());
    }

    #[test]
    fn uppercase_tags_are_normalized() {
        let source = "<H1 ALIGN=\"center\">Loud</H1>";
        let document = Document::parse(source);
        let heading = document.first_heading().expect("heading");
        assert_eq!(heading.name(), "h1");
        assert_eq!(heading.attribute("align"), Some("center"));
        assert_eq!(document.open_tag(heading), "<H1 ALIGN=\"center\">");
    }
}
