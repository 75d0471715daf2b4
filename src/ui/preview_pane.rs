//! Rendered preview pane
//!
//! The HTML-based live preview, optionally directly editable. The pane
//! receives HTML fragments from the sync controller, parses them into a
//! flat list of display blocks, and draws them with egui widgets (styled
//! text, syntect-highlighted code blocks, clickable links).
//!
//! In rendered-edit mode each block becomes an editable text field holding
//! that block's markdown form; `content()` re-renders the edited blocks
//! back to HTML, so the pane always speaks HTML at the sync boundary.
//!
//! Content pushes are deferred: the new blocks are laid out on the next
//! frame, and only then does the pane report the push id back, at which
//! point the controller restores the scroll position. This models the
//! asynchronous rendering surface the controller is written against.

use eframe::egui::{self, RichText, ScrollArea, TextEdit, Ui};
use log::warn;

use crate::convert::{inline_markdown, parse_fragment, Element, HtmlNode};
use crate::markdown::{render, SyntaxHighlighter};
use crate::sync::{offset_for_ratio, scroll_ratio, PushId, PushOutcome, SyncableView, ViewKind};

// ─────────────────────────────────────────────────────────────────────────────
// Display Model
// ─────────────────────────────────────────────────────────────────────────────

/// A styled run of text inside a block.
#[derive(Debug, Clone, Default, PartialEq)]
struct InlineSpan {
    text: String,
    bold: bool,
    italic: bool,
    code: bool,
    strike: bool,
    link: Option<String>,
}

/// Block-level display kinds.
#[derive(Debug, Clone, PartialEq)]
enum BlockKind {
    Heading(u8),
    Paragraph,
    ListItem { indent: usize },
    Quote,
    CodeBlock { language: String },
    Rule,
}

/// One block-level element of the preview.
#[derive(Debug, Clone, PartialEq)]
struct PreviewBlock {
    kind: BlockKind,
    spans: Vec<InlineSpan>,
    /// The block's markdown form, edited directly in rendered-edit mode
    markdown: String,
}

/// What happened in the pane this frame.
#[derive(Debug, Default)]
pub struct PreviewPaneOutput {
    /// The user edited a block (current HTML is `PreviewPane::content`)
    pub edited: bool,
    /// The user scrolled to this ratio
    pub scrolled: Option<f32>,
    /// A deferred content push finished laying out
    pub push_completed: Option<PushId>,
}

// ─────────────────────────────────────────────────────────────────────────────
// PreviewPane
// ─────────────────────────────────────────────────────────────────────────────

/// The rendered markdown view.
pub struct PreviewPane {
    html: String,
    blocks: Vec<PreviewBlock>,
    editable: bool,
    font_size: f32,

    /// A block was edited since the last content read
    edited: bool,
    /// Deferred push waiting for the next layout pass
    pending_push: Option<PushId>,
    next_push_id: PushId,

    pending_scroll: Option<f32>,
    pending_block: Option<usize>,

    last_scroll_offset: f32,
    content_height: f32,
    viewport_height: f32,
    current_ratio: f32,
}

impl PreviewPane {
    pub fn new(font_size: f32) -> Self {
        Self {
            html: String::new(),
            blocks: Vec::new(),
            editable: false,
            font_size,
            edited: false,
            pending_push: None,
            next_push_id: 0,
            pending_scroll: None,
            pending_block: None,
            last_scroll_offset: 0.0,
            content_height: 0.0,
            viewport_height: 0.0,
            current_ratio: 0.0,
        }
    }

    pub fn set_font_size(&mut self, size: f32) {
        self.font_size = size;
    }

    /// Parse an HTML fragment into display blocks.
    fn apply_html(&mut self, html: &str) {
        let nodes = parse_fragment(html);
        self.blocks = build_blocks(&nodes);
        self.html = html.to_string();
        self.edited = false;
    }

    /// Reassemble the blocks' markdown forms into one document body.
    fn to_markdown(&self) -> String {
        let mut out = String::new();
        let mut previous: Option<&BlockKind> = None;
        for block in &self.blocks {
            if previous.is_some() {
                let tight = matches!(
                    (previous, &block.kind),
                    (Some(BlockKind::ListItem { .. }), BlockKind::ListItem { .. })
                );
                out.push_str(if tight { "\n" } else { "\n\n" });
            }
            out.push_str(&block.markdown);
            previous = Some(&block.kind);
        }
        out
    }

    /// Draw the pane.
    pub fn show(&mut self, ui: &mut Ui, highlighter: &SyntaxHighlighter) -> PreviewPaneOutput {
        let mut output = PreviewPaneOutput::default();

        let mut scroll_area = ScrollArea::vertical()
            .id_source("preview-scroll")
            .auto_shrink([false, false]);
        let mut programmatic_scroll = false;

        if let Some(ratio) = self.pending_scroll.take() {
            let offset = offset_for_ratio(ratio, self.content_height, self.viewport_height);
            scroll_area = scroll_area.vertical_scroll_offset(offset);
            programmatic_scroll = true;
        }
        let pending_block = self.pending_block.take();

        let font_size = self.font_size;
        let editable = self.editable;
        let dark_mode = ui.visuals().dark_mode;

        let mut block_edited = false;
        let blocks = &mut self.blocks;

        let scroll_output = scroll_area.show(ui, |ui| {
            ui.add_space(8.0);
            for (index, block) in blocks.iter_mut().enumerate() {
                let response = ui
                    .scope(|ui| {
                        if editable {
                            block_edited |= show_editable_block(ui, block, font_size);
                        } else {
                            show_display_block(ui, block, font_size, dark_mode, highlighter);
                        }
                    })
                    .response;

                if pending_block == Some(index) {
                    response.scroll_to_me(Some(egui::Align::Center));
                }
                ui.add_space(6.0);
            }
        });

        if block_edited {
            self.edited = true;
            output.edited = true;
        }

        self.content_height = scroll_output.content_size.y;
        self.viewport_height = scroll_output.inner_rect.height();
        let offset = scroll_output.state.offset.y;
        self.current_ratio = scroll_ratio(offset, self.content_height, self.viewport_height);

        if !programmatic_scroll
            && pending_block.is_none()
            && (offset - self.last_scroll_offset).abs() > 0.5
        {
            output.scrolled = Some(self.current_ratio);
        }
        self.last_scroll_offset = offset;

        // The content pushed last frame is now laid out
        if let Some(id) = self.pending_push.take() {
            output.push_completed = Some(id);
        }

        output
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// SyncableView
// ─────────────────────────────────────────────────────────────────────────────

impl SyncableView for PreviewPane {
    fn kind(&self) -> ViewKind {
        ViewKind::Rendered
    }

    /// The pane's current HTML. Edited blocks are re-rendered so the sync
    /// boundary always sees HTML, never the pane's internal markdown forms.
    fn content(&self) -> String {
        if !self.edited {
            return self.html.clone();
        }
        match render(&self.to_markdown()) {
            Ok(html) => html,
            Err(e) => {
                warn!("Could not re-render edited preview: {}", e);
                self.html.clone()
            }
        }
    }

    fn set_content(&mut self, content: &str) -> PushOutcome {
        self.apply_html(content);
        // Layout happens on the next frame; the push completes there
        self.next_push_id = self.next_push_id.wrapping_add(1);
        let id = self.next_push_id;
        self.pending_push = Some(id);
        PushOutcome::Deferred(id)
    }

    fn scroll_ratio(&self) -> f32 {
        self.current_ratio
    }

    fn set_scroll_ratio(&mut self, ratio: f32) {
        self.pending_scroll = Some(ratio);
    }

    fn set_editable(&mut self, editable: bool) {
        if !editable && self.edited {
            // Leaving edit mode: rebuild the display from the edited text
            if let Ok(html) = render(&self.to_markdown()) {
                self.apply_html(&html);
            }
        }
        self.editable = editable;
    }

    fn block_count(&self) -> usize {
        self.blocks.len()
    }

    fn scroll_block_into_view(&mut self, index: usize) {
        self.pending_block = Some(index.min(self.blocks.len().saturating_sub(1)));
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Block Construction
// ─────────────────────────────────────────────────────────────────────────────

fn build_blocks(nodes: &[HtmlNode]) -> Vec<PreviewBlock> {
    let mut blocks = Vec::new();
    collect_blocks(nodes, &mut blocks, 0);
    blocks
}

fn collect_blocks(nodes: &[HtmlNode], blocks: &mut Vec<PreviewBlock>, quote_depth: usize) {
    for node in nodes {
        let el = match node {
            HtmlNode::Text(text) => {
                if !text.trim().is_empty() {
                    blocks.push(text_block(text.trim(), quote_depth));
                }
                continue;
            }
            HtmlNode::Element(el) => el,
        };

        match el.tag.as_str() {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = el.tag[1..].parse::<u8>().unwrap_or(1);
                let text = inline_markdown(&el.children).trim().to_string();
                blocks.push(PreviewBlock {
                    kind: BlockKind::Heading(level),
                    spans: inline_spans(&el.children),
                    markdown: format!("{} {}", "#".repeat(level as usize), text),
                });
            }
            "p" => {
                let markdown = inline_markdown(&el.children).trim().to_string();
                blocks.push(PreviewBlock {
                    kind: if quote_depth > 0 {
                        BlockKind::Quote
                    } else {
                        BlockKind::Paragraph
                    },
                    spans: inline_spans(&el.children),
                    markdown: if quote_depth > 0 {
                        prefix_quote(&markdown)
                    } else {
                        markdown
                    },
                });
            }
            "ul" => collect_list(el, blocks, 0, false),
            "ol" => collect_list(el, blocks, 0, true),
            "blockquote" => collect_blocks(&el.children, blocks, quote_depth + 1),
            "pre" => blocks.push(code_block(el)),
            "hr" => blocks.push(PreviewBlock {
                kind: BlockKind::Rule,
                spans: Vec::new(),
                markdown: "---".to_string(),
            }),
            "table" => collect_table(el, blocks),
            _ => collect_blocks(&el.children, blocks, quote_depth),
        }
    }
}

fn text_block(text: &str, quote_depth: usize) -> PreviewBlock {
    PreviewBlock {
        kind: if quote_depth > 0 {
            BlockKind::Quote
        } else {
            BlockKind::Paragraph
        },
        spans: vec![InlineSpan {
            text: text.to_string(),
            ..InlineSpan::default()
        }],
        markdown: text.to_string(),
    }
}

fn prefix_quote(markdown: &str) -> String {
    markdown
        .lines()
        .map(|line| format!("> {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}

fn collect_list(list: &Element, blocks: &mut Vec<PreviewBlock>, indent: usize, ordered: bool) {
    let mut index = 1;
    for child in &list.children {
        let item = match child {
            HtmlNode::Element(el) if el.tag == "li" => el,
            _ => continue,
        };

        // Item content excluding nested lists; loose-list paragraphs unwrap
        let mut content: Vec<HtmlNode> = Vec::new();
        for item_child in &item.children {
            match item_child {
                HtmlNode::Element(el) if el.tag == "ul" || el.tag == "ol" => {}
                HtmlNode::Element(el) if el.tag == "p" => {
                    content.extend(el.children.iter().cloned())
                }
                other => content.push(other.clone()),
            }
        }

        let marker = if ordered {
            format!("{}. ", index)
        } else {
            "- ".to_string()
        };
        index += 1;

        let text = inline_markdown(&content).trim().to_string();
        blocks.push(PreviewBlock {
            kind: BlockKind::ListItem { indent },
            spans: inline_spans(&content),
            markdown: format!("{}{}{}", "  ".repeat(indent), marker, text),
        });

        for item_child in &item.children {
            if let HtmlNode::Element(el) = item_child {
                match el.tag.as_str() {
                    "ul" => collect_list(el, blocks, indent + 1, false),
                    "ol" => collect_list(el, blocks, indent + 1, true),
                    _ => {}
                }
            }
        }
    }
}

fn code_block(pre: &Element) -> PreviewBlock {
    let code_el = pre.children.iter().find_map(|child| match child {
        HtmlNode::Element(el) if el.tag == "code" => Some(el),
        _ => None,
    });

    let language = code_el
        .and_then(|el| el.attr("class"))
        .and_then(|class| {
            class
                .split_whitespace()
                .find_map(|c| c.strip_prefix("language-"))
        })
        .unwrap_or("")
        .to_string();

    let code = match code_el {
        Some(el) => el.text_content(),
        None => pre.text_content(),
    };
    let code = code.trim_end_matches('\n').to_string();

    let markdown = format!("```{}\n{}\n```", language, code);
    PreviewBlock {
        kind: BlockKind::CodeBlock { language },
        spans: vec![InlineSpan {
            text: code,
            code: true,
            ..InlineSpan::default()
        }],
        markdown,
    }
}

fn collect_table(table: &Element, blocks: &mut Vec<PreviewBlock>) {
    // Tables degrade to plain text rows in the preview
    for_each_row(table, &mut |row| {
        let mut cells = Vec::new();
        for child in &row.children {
            if let HtmlNode::Element(cell) = child {
                if matches!(cell.tag.as_str(), "td" | "th") {
                    cells.push(inline_markdown(&cell.children).trim().to_string());
                }
            }
        }
        if !cells.is_empty() {
            let line = cells.join(" | ");
            blocks.push(PreviewBlock {
                kind: BlockKind::Paragraph,
                spans: vec![InlineSpan {
                    text: line.clone(),
                    ..InlineSpan::default()
                }],
                markdown: line,
            });
        }
    });
}

fn for_each_row(el: &Element, f: &mut impl FnMut(&Element)) {
    for child in &el.children {
        if let HtmlNode::Element(inner) = child {
            if inner.tag == "tr" {
                f(inner);
            } else {
                for_each_row(inner, f);
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Inline Spans
// ─────────────────────────────────────────────────────────────────────────────

fn inline_spans(nodes: &[HtmlNode]) -> Vec<InlineSpan> {
    let mut spans = Vec::new();
    collect_spans(nodes, &InlineSpan::default(), &mut spans);
    spans
}

fn collect_spans(nodes: &[HtmlNode], style: &InlineSpan, spans: &mut Vec<InlineSpan>) {
    for node in nodes {
        let el = match node {
            HtmlNode::Text(text) => {
                if !text.is_empty() {
                    let mut span = style.clone();
                    span.text = text.replace('\n', " ");
                    spans.push(span);
                }
                continue;
            }
            HtmlNode::Element(el) => el,
        };

        let mut style = style.clone();
        match el.tag.as_str() {
            "strong" | "b" => style.bold = true,
            "em" | "i" => style.italic = true,
            "del" | "s" | "strike" => style.strike = true,
            "code" => {
                let mut span = style.clone();
                span.text = el.text_content();
                span.code = true;
                spans.push(span);
                continue;
            }
            "a" => style.link = el.attr("href").map(|s| s.to_string()),
            "img" => {
                let mut span = style.clone();
                span.text = format!("[{}]", el.attr("alt").unwrap_or("image"));
                span.italic = true;
                span.link = el.attr("src").map(|s| s.to_string());
                spans.push(span);
                continue;
            }
            "br" => {
                let mut span = style.clone();
                span.text = "\n".to_string();
                spans.push(span);
                continue;
            }
            "input" => {
                if el.attr("type") == Some("checkbox") {
                    let mut span = style.clone();
                    span.text = if el.attr("checked").is_some() {
                        "☑ ".to_string()
                    } else {
                        "☐ ".to_string()
                    };
                    spans.push(span);
                }
                continue;
            }
            _ => {}
        }
        collect_spans(&el.children, &style, spans);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Drawing
// ─────────────────────────────────────────────────────────────────────────────

fn show_editable_block(ui: &mut Ui, block: &mut PreviewBlock, font_size: f32) -> bool {
    let rows = block.markdown.lines().count().max(1);
    let response = ui.add(
        TextEdit::multiline(&mut block.markdown)
            .font(egui::FontId::monospace(font_size))
            .desired_width(f32::INFINITY)
            .desired_rows(rows),
    );
    response.changed()
}

fn show_display_block(
    ui: &mut Ui,
    block: &PreviewBlock,
    font_size: f32,
    dark_mode: bool,
    highlighter: &SyntaxHighlighter,
) {
    match &block.kind {
        BlockKind::Heading(level) => {
            let scale = match level {
                1 => 1.9,
                2 => 1.5,
                3 => 1.25,
                4 => 1.1,
                _ => 1.0,
            };
            show_spans(ui, &block.spans, font_size * scale, true);
            ui.separator();
        }
        BlockKind::Paragraph => show_spans(ui, &block.spans, font_size, false),
        BlockKind::ListItem { indent } => {
            ui.horizontal_wrapped(|ui| {
                ui.add_space(12.0 + *indent as f32 * 16.0);
                ui.spacing_mut().item_spacing.x = 0.0;
                ui.label(RichText::new("•  ").size(font_size));
                for span in &block.spans {
                    show_span(ui, span, font_size, false);
                }
            });
        }
        BlockKind::Quote => {
            ui.horizontal_wrapped(|ui| {
                ui.add_space(4.0);
                ui.separator();
                ui.spacing_mut().item_spacing.x = 0.0;
                for span in &block.spans {
                    let mut quoted = span.clone();
                    quoted.italic = true;
                    show_span(ui, &quoted, font_size, false);
                }
            });
        }
        BlockKind::CodeBlock { language } => {
            let fill = if dark_mode {
                egui::Color32::from_gray(26)
            } else {
                egui::Color32::from_gray(243)
            };
            egui::Frame::none()
                .fill(fill)
                .inner_margin(8.0)
                .rounding(4.0)
                .show(ui, |ui| {
                    let code = block.spans.first().map(|s| s.text.as_str()).unwrap_or("");
                    for line in highlighter.highlight_code(code, language, dark_mode) {
                        ui.horizontal_wrapped(|ui| {
                            ui.spacing_mut().item_spacing.x = 0.0;
                            for segment in &line.segments {
                                ui.label(segment.to_rich_text(font_size));
                            }
                        });
                    }
                });
        }
        BlockKind::Rule => {
            ui.separator();
        }
    }
}

fn show_spans(ui: &mut Ui, spans: &[InlineSpan], font_size: f32, strong: bool) {
    ui.horizontal_wrapped(|ui| {
        ui.spacing_mut().item_spacing.x = 0.0;
        for span in spans {
            show_span(ui, span, font_size, strong);
        }
    });
}

fn show_span(ui: &mut Ui, span: &InlineSpan, font_size: f32, strong: bool) {
    let mut rich_text = RichText::new(&span.text).size(font_size);
    if span.bold || strong {
        rich_text = rich_text.strong();
    }
    if span.italic {
        rich_text = rich_text.italics();
    }
    if span.code {
        rich_text = rich_text.code();
    }
    if span.strike {
        rich_text = rich_text.strikethrough();
    }

    match &span.link {
        Some(url) => {
            ui.hyperlink_to(rich_text, url);
        }
        None => {
            ui.label(rich_text);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn pane_with(markdown: &str) -> PreviewPane {
        let mut pane = PreviewPane::new(14.0);
        let html = render(markdown).unwrap();
        pane.set_content(&html);
        pane
    }

    #[test]
    fn test_set_content_defers_and_builds_blocks() {
        let mut pane = PreviewPane::new(14.0);
        let html = render("# Title\n\nbody\n\n- a\n- b\n").unwrap();
        let outcome = pane.set_content(&html);
        assert!(matches!(outcome, PushOutcome::Deferred(_)));
        // heading, paragraph, two list items
        assert_eq!(pane.block_count(), 4);
    }

    #[test]
    fn test_heading_block_shape() {
        let pane = pane_with("## Section title\n");
        assert_eq!(pane.blocks[0].kind, BlockKind::Heading(2));
        assert_eq!(pane.blocks[0].markdown, "## Section title");
        assert_eq!(pane.blocks[0].spans[0].text, "Section title");
    }

    #[test]
    fn test_inline_styles_become_spans() {
        let pane = pane_with("plain **bold** *ital* `code`\n");
        let spans = &pane.blocks[0].spans;
        assert!(spans.iter().any(|s| s.bold && s.text == "bold"));
        assert!(spans.iter().any(|s| s.italic && s.text == "ital"));
        assert!(spans.iter().any(|s| s.code && s.text == "code"));
    }

    #[test]
    fn test_link_span_keeps_url() {
        let pane = pane_with("[text](https://example.com)\n");
        let spans = &pane.blocks[0].spans;
        assert_eq!(spans[0].link.as_deref(), Some("https://example.com"));
    }

    #[test]
    fn test_code_block_language() {
        let pane = pane_with("```rust\nfn main() {}\n```\n");
        assert_eq!(
            pane.blocks[0].kind,
            BlockKind::CodeBlock {
                language: "rust".to_string()
            }
        );
        assert_eq!(pane.blocks[0].markdown, "```rust\nfn main() {}\n```");
    }

    #[test]
    fn test_nested_list_indent() {
        let pane = pane_with("- a\n  - b\n");
        assert_eq!(pane.blocks[0].kind, BlockKind::ListItem { indent: 0 });
        assert_eq!(pane.blocks[1].kind, BlockKind::ListItem { indent: 1 });
        assert_eq!(pane.blocks[1].markdown, "  - b");
    }

    #[test]
    fn test_quote_block_markdown_prefixed() {
        let pane = pane_with("> quoted text\n");
        assert_eq!(pane.blocks[0].kind, BlockKind::Quote);
        assert_eq!(pane.blocks[0].markdown, "> quoted text");
    }

    #[test]
    fn test_to_markdown_joins_blocks() {
        let pane = pane_with("# T\n\npara\n\n- a\n- b\n");
        assert_eq!(pane.to_markdown(), "# T\n\npara\n\n- a\n- b");
    }

    #[test]
    fn test_content_unedited_returns_pushed_html() {
        let mut pane = PreviewPane::new(14.0);
        let html = render("# X\n").unwrap();
        pane.set_content(&html);
        assert_eq!(pane.content(), html);
    }

    #[test]
    fn test_content_after_edit_rerenders() {
        let mut pane = pane_with("- one\n");
        // Simulate the user appending a list item in the rendered view
        pane.blocks[0].markdown = "- one\n- two".to_string();
        pane.edited = true;

        let html = pane.content();
        assert!(html.contains("<li>one</li>"));
        assert!(html.contains("<li>two</li>"));
    }

    #[test]
    fn test_scroll_block_into_view_clamps() {
        let mut pane = pane_with("a\n\nb\n");
        pane.scroll_block_into_view(99);
        assert_eq!(pane.pending_block, Some(1));
    }

    #[test]
    fn test_leaving_edit_mode_rebuilds_display() {
        let mut pane = pane_with("- one\n");
        pane.set_editable(true);
        pane.blocks[0].markdown = "- one\n- two".to_string();
        pane.edited = true;

        pane.set_editable(false);
        assert_eq!(pane.block_count(), 2);
        assert!(!pane.edited);
    }
}
