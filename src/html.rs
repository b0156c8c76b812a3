//! XHTML chapter documents to [`Node`] trees.
//!
//! Spine documents are XML, so they go through an XML reader first: an HTML5
//! parser misreads self-closing non-void tags such as `<title/>`. Documents
//! that are not well-formed XML (tag soup, fragments) fall back to scraper.

use crate::error::{Error, Result};
use crate::node::Node;
use quick_xml::events::Event;
use quick_xml::Reader;
use scraper::{ElementRef, Html, Selector};

/// Parse a chapter document and return its `<body>`, or the document
/// element when there is no body.
pub fn parse_document(html: &str) -> Node {
    match parse_xhtml(html) {
        Ok(body) => body,
        Err(e) => {
            tracing::debug!(error = %e, "Not well-formed XHTML, parsing as HTML");
            parse_html(html)
        }
    }
}

/// Element being built while its end tag is still pending.
struct OpenElement {
    tag: String,
    raw_text: String,
    children: Vec<Node>,
}

impl OpenElement {
    fn new(tag: String) -> Self {
        Self {
            tag,
            raw_text: String::new(),
            children: Vec::new(),
        }
    }

    fn close(self) -> (Node, String) {
        let node = Node {
            tag: self.tag,
            text: collapse_whitespace(&self.raw_text),
            children: self.children,
        };
        (node, self.raw_text)
    }
}

fn parse_xhtml(content: &str) -> Result<Node> {
    let mut reader = Reader::from_str(content);
    let mut stack: Vec<OpenElement> = Vec::new();
    let mut root: Option<Node> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                stack.push(OpenElement::new(tag_name(e.name().as_ref())));
            }
            Ok(Event::Empty(e)) => {
                let tag = tag_name(e.name().as_ref());
                let Some(parent) = stack.last_mut() else {
                    return Err(Error::Load("empty document element".to_string()));
                };
                if tag == "br" {
                    parent.raw_text.push(' ');
                }
                parent.children.push(Node {
                    tag,
                    ..Node::default()
                });
            }
            Ok(Event::Text(e)) => {
                if let Some(open) = stack.last_mut() {
                    open.raw_text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(open) = stack.last_mut() {
                    open.raw_text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Ok(Event::GeneralRef(e)) => {
                let entity = String::from_utf8_lossy(e.as_ref());
                match (stack.last_mut(), resolve_entity(&entity)) {
                    (Some(open), Some(resolved)) => open.raw_text.push(resolved),
                    (_, None) => {
                        return Err(Error::Load(format!("unknown entity &{};", entity)));
                    }
                    (None, Some(_)) => {}
                }
            }
            Ok(Event::End(_)) => {
                let Some(open) = stack.pop() else {
                    return Err(Error::Load("unbalanced end tag".to_string()));
                };
                let (node, raw_text) = open.close();
                match stack.last_mut() {
                    Some(parent) => {
                        parent.raw_text.push_str(&raw_text);
                        parent.children.push(node);
                    }
                    None => root = Some(node),
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Load(e.to_string())),
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(Error::Load("unclosed elements at end of document".to_string()));
    }
    let root = root.ok_or_else(|| Error::Load("no document element".to_string()))?;
    find_body(root).ok_or_else(|| Error::Load("document has no body".to_string()))
}

fn find_body(node: Node) -> Option<Node> {
    if node.tag == "body" {
        return Some(node);
    }
    node.children.into_iter().find_map(find_body)
}

/// Lowercased local name, namespace prefix dropped.
fn tag_name(name: &[u8]) -> String {
    let local = name
        .iter()
        .rposition(|&b| b == b':')
        .map_or(name, |i| &name[i + 1..]);
    String::from_utf8_lossy(local).to_ascii_lowercase()
}

/// XML predefined entities, character references and the handful of HTML
/// entities that XHTML doctypes let books use.
fn resolve_entity(entity: &str) -> Option<char> {
    if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
        return u32::from_str_radix(hex, 16).ok().and_then(char::from_u32);
    }
    if let Some(dec) = entity.strip_prefix('#') {
        return dec.parse::<u32>().ok().and_then(char::from_u32);
    }

    let c = match entity {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "mdash" => '—',
        "ndash" => '–',
        "hellip" => '…',
        "lsquo" => '‘',
        "rsquo" => '’',
        "ldquo" => '“',
        "rdquo" => '”',
        "laquo" => '«',
        "raquo" => '»',
        _ => return None,
    };
    Some(c)
}

fn parse_html(html: &str) -> Node {
    let document = Html::parse_document(html);

    let body = Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next());

    match body {
        Some(body) => build(body),
        None => build(document.root_element()),
    }
}

fn build(element: ElementRef) -> Node {
    let children = element
        .children()
        .filter_map(ElementRef::wrap)
        .map(build)
        .collect();

    Node {
        tag: element.value().name().to_ascii_lowercase(),
        text: collapse_whitespace(&element.text().collect::<String>()),
        children,
    }
}

/// Squeeze every whitespace run into one space and trim.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;

    const CHAPTER: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<html xmlns="http://www.w3.org/1999/xhtml">
<head><title>Ignored</title></head>
<body>
  <section>
    <h1>Chapter <em>One</em></h1>
    <p>It was   a
       dark night.</p>
    <div><img src="map.png"/><p>—Who's there?</p></div>
  </section>
</body>
</html>"#;

    #[test]
    fn test_body_is_root() {
        let root = parse_document(CHAPTER);
        assert_eq!(root.tag, "body");
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].kind(), NodeKind::Container);
    }

    #[test]
    fn test_text_is_collapsed() {
        let root = parse_document(CHAPTER);
        let section = &root.children[0];
        assert_eq!(section.children[0].text, "Chapter One");
        assert_eq!(section.children[0].kind(), NodeKind::Heading(1));
        assert_eq!(section.children[1].text, "It was a dark night.");
    }

    #[test]
    fn test_nested_children_kept_in_order() {
        let root = parse_document(CHAPTER);
        let div = &root.children[0].children[2];
        let tags: Vec<&str> = div.children.iter().map(|c| c.tag.as_str()).collect();
        assert_eq!(tags, vec!["img", "p"]);
        assert_eq!(div.children[1].text, "—Who's there?");
    }

    #[test]
    fn test_inline_markup_adds_no_spaces() {
        let xhtml = r#"<html xmlns="http://www.w3.org/1999/xhtml"><body><p><span class="dropcap">T</span>he night was <em>dark</em>, she said.</p></body></html>"#;
        assert_eq!(parse_document(xhtml).children[0].text, "The night was dark, she said.");

        let soup = r#"<body><p><span class="dropcap">T</span>he night was <em>dark</em>, she said.<br></p></body>"#;
        assert_eq!(parse_document(soup).children[0].text, "The night was dark, she said.");
    }

    #[test]
    fn test_self_closing_title_keeps_body() {
        let xhtml = r#"<?xml version="1.0" encoding="utf-8"?>
<html xmlns="http://www.w3.org/1999/xhtml"><head><title/></head><body><p>Hello</p></body></html>"#;
        let root = parse_document(xhtml);
        assert_eq!(root.tag, "body");
        assert_eq!(root.text, "Hello");
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].text, "Hello");
    }

    #[test]
    fn test_entities_and_line_breaks() {
        let xhtml = r#"<html><body><p>Tom&amp;Jerry&nbsp;&#8212;&#x41;<br/>next</p></body></html>"#;
        // no-break spaces collapse like any other whitespace
        assert_eq!(parse_document(xhtml).children[0].text, "Tom&Jerry —A next");
    }

    #[test]
    fn test_namespaced_tags_use_local_name() {
        let xhtml = r#"<html xmlns:x="http://www.w3.org/1999/xhtml"><x:body><x:p>Hi</x:p></x:body></html>"#;
        let root = parse_document(xhtml);
        assert_eq!(root.tag, "body");
        assert_eq!(root.children[0].tag, "p");
    }

    #[test]
    fn test_fragment_without_body_still_parses() {
        let root = parse_document("<p>loose text</p>");
        assert_eq!(root.tag, "body");
        assert_eq!(root.children[0].text, "loose text");
    }
}
