//! Minimal structural HTML parser
//!
//! Parses an HTML fragment into a tree of elements and text nodes. This is
//! not a spec-compliant HTML5 parser; it handles the well-formed fragments a
//! browser's content container produces, and degrades predictably on
//! malformed input:
//!
//! - unmatched close tags are ignored
//! - unclosed elements are auto-closed at the end of their parent (or input)
//! - a `<` that opens no recognizable tag stays in the text as a literal
//! - comments and doctype declarations are dropped
//!
//! Text nodes have the common HTML entities decoded, so downstream code
//! works with plain text.

// ─────────────────────────────────────────────────────────────────────────────
// Node Types
// ─────────────────────────────────────────────────────────────────────────────

/// A node in the parsed HTML tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HtmlNode {
    /// An element with its attributes and children
    Element(Element),
    /// A text run (entities decoded)
    Text(String),
}

/// An HTML element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Tag name, lowercased
    pub tag: String,
    /// Attributes in document order (names lowercased, values decoded)
    pub attrs: Vec<(String, String)>,
    /// Child nodes
    pub children: Vec<HtmlNode>,
}

impl Element {
    /// Look up an attribute value by (case-insensitive) name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Collect the concatenated text content of this element's subtree.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }
}

fn collect_text(nodes: &[HtmlNode], out: &mut String) {
    for node in nodes {
        match node {
            HtmlNode::Text(t) => out.push_str(t),
            HtmlNode::Element(el) => collect_text(&el.children, out),
        }
    }
}

/// Elements that never have children and need no close tag.
fn is_void_element(tag: &str) -> bool {
    matches!(
        tag,
        "area" | "base" | "br" | "col" | "embed" | "hr" | "img" | "input" | "link" | "meta"
            | "source" | "track" | "wbr"
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Parser
// ─────────────────────────────────────────────────────────────────────────────

/// Parse an HTML fragment into a node tree.
pub fn parse_fragment(html: &str) -> Vec<HtmlNode> {
    Parser::new(html).parse()
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
    root: Vec<HtmlNode>,
    stack: Vec<Element>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            root: Vec::new(),
            stack: Vec::new(),
        }
    }

    fn parse(mut self) -> Vec<HtmlNode> {
        let mut text_start = self.pos;

        while self.pos < self.input.len() {
            if self.input.as_bytes()[self.pos] != b'<' {
                self.pos += 1;
                continue;
            }

            let rest = &self.input[self.pos..];
            if rest.starts_with("<!--") {
                self.flush_text(text_start);
                self.pos += match rest.find("-->") {
                    Some(end) => end + 3,
                    None => rest.len(),
                };
                text_start = self.pos;
            } else if rest.starts_with("</") {
                self.flush_text(text_start);
                self.consume_close_tag();
                text_start = self.pos;
            } else if rest[1..]
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic())
            {
                match scan_open_tag(rest) {
                    Some(tag) => {
                        self.flush_text(text_start);
                        self.pos += tag.consumed;
                        self.handle_open_tag(tag);
                        text_start = self.pos;
                    }
                    // No closing '>' — keep the '<' as literal text
                    None => self.pos += 1,
                }
            } else if rest.starts_with("<!") {
                self.flush_text(text_start);
                self.pos += match rest.find('>') {
                    Some(end) => end + 1,
                    None => rest.len(),
                };
                text_start = self.pos;
            } else {
                // Lone '<' (e.g. "a < b") stays in the text run
                self.pos += 1;
            }
        }

        self.flush_text(text_start);

        // Auto-close anything still open
        while let Some(el) = self.stack.pop() {
            self.append(HtmlNode::Element(el));
        }

        self.root
    }

    /// Push accumulated text [start..self.pos] as a text node.
    fn flush_text(&mut self, start: usize) {
        if start < self.pos {
            let text = decode_entities(&self.input[start..self.pos]);
            if !text.is_empty() {
                self.append(HtmlNode::Text(text));
            }
        }
    }

    /// Append a finished node to the open element or the root list.
    fn append(&mut self, node: HtmlNode) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.root.push(node),
        }
    }

    fn handle_open_tag(&mut self, tag: ScannedTag) {
        let element = Element {
            tag: tag.name,
            attrs: tag.attrs,
            children: Vec::new(),
        };
        if tag.self_closing || is_void_element(&element.tag) {
            self.append(HtmlNode::Element(element));
        } else {
            self.stack.push(element);
        }
    }

    /// Consume `</name>` at self.pos and close the nearest matching element.
    fn consume_close_tag(&mut self) {
        let rest = &self.input[self.pos..];
        let end = match rest.find('>') {
            Some(end) => end,
            None => {
                self.pos = self.input.len();
                return;
            }
        };
        let name = rest[2..end].trim().to_lowercase();
        self.pos += end + 1;

        if let Some(index) = self.stack.iter().rposition(|el| el.tag == name) {
            // Auto-close any unclosed descendants, then the element itself
            while self.stack.len() > index {
                let el = self.stack.pop().expect("stack length checked");
                self.append(HtmlNode::Element(el));
            }
        }
        // No matching open element: the close tag is ignored
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tag Scanning
// ─────────────────────────────────────────────────────────────────────────────

struct ScannedTag {
    name: String,
    attrs: Vec<(String, String)>,
    self_closing: bool,
    /// Bytes consumed including the angle brackets
    consumed: usize,
}

/// Scan an opening tag starting at `input` (which begins with '<').
///
/// Returns None when no terminating '>' exists.
fn scan_open_tag(input: &str) -> Option<ScannedTag> {
    let bytes = input.as_bytes();
    let mut i = 1;

    // Tag name
    let name_start = i;
    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'-') {
        i += 1;
    }
    let name = input[name_start..i].to_lowercase();

    let mut attrs = Vec::new();
    let mut self_closing = false;

    loop {
        // Skip whitespace
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= bytes.len() {
            return None;
        }
        match bytes[i] {
            b'>' => {
                return Some(ScannedTag {
                    name,
                    attrs,
                    self_closing,
                    consumed: i + 1,
                });
            }
            b'/' => {
                self_closing = true;
                i += 1;
            }
            _ => {
                // Attribute name
                let attr_start = i;
                while i < bytes.len()
                    && !bytes[i].is_ascii_whitespace()
                    && !matches!(bytes[i], b'=' | b'>' | b'/')
                {
                    i += 1;
                }
                if i == attr_start {
                    // Stray byte; skip it to guarantee progress
                    i += 1;
                    continue;
                }
                let attr_name = input[attr_start..i].to_lowercase();

                // Skip whitespace around '='
                while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                    i += 1;
                }
                let value = if i < bytes.len() && bytes[i] == b'=' {
                    i += 1;
                    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                        i += 1;
                    }
                    if i < bytes.len() && (bytes[i] == b'"' || bytes[i] == b'\'') {
                        let quote = bytes[i];
                        i += 1;
                        let value_start = i;
                        while i < bytes.len() && bytes[i] != quote {
                            i += 1;
                        }
                        if i >= bytes.len() {
                            return None;
                        }
                        let value = &input[value_start..i];
                        i += 1; // closing quote
                        decode_entities(value)
                    } else {
                        let value_start = i;
                        while i < bytes.len()
                            && !bytes[i].is_ascii_whitespace()
                            && !matches!(bytes[i], b'>' | b'/')
                        {
                            i += 1;
                        }
                        decode_entities(&input[value_start..i])
                    }
                } else {
                    // Bare attribute (e.g. "disabled")
                    String::new()
                };

                attrs.push((attr_name, value));
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Entity Decoding
// ─────────────────────────────────────────────────────────────────────────────

/// Decode the common named and numeric HTML entities.
///
/// Unknown entities are left untouched.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        // Entities end with ';' within a short window
        let end = rest[1..].find(';').map(|i| i + 1);
        match end.filter(|&e| e <= 10) {
            Some(end) => {
                let entity = &rest[1..end];
                match decode_entity(entity) {
                    Some(decoded) => {
                        out.push_str(&decoded);
                        rest = &rest[end + 1..];
                    }
                    None => {
                        out.push('&');
                        rest = &rest[1..];
                    }
                }
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<String> {
    let decoded = match entity {
        "amp" => "&".to_string(),
        "lt" => "<".to_string(),
        "gt" => ">".to_string(),
        "quot" => "\"".to_string(),
        "apos" => "'".to_string(),
        "nbsp" => " ".to_string(),
        _ => {
            let code = if let Some(hex) = entity.strip_prefix("#x").or(entity.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse::<u32>().ok()?
            } else {
                return None;
            };
            char::from_u32(code)?.to_string()
        }
    };
    Some(decoded)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
