//! Block-level markdown AST: the block source for the diff pipeline.
//!
//! The pipeline itself never inspects block internals; it depends only on
//! [`block_to_text`], the canonical serialisation of a block to plain text.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Block {
    Paragraph(Vec<Inline>),
    Heading {
        level: u8,
        content: Vec<Inline>,
    },
    BlockQuote(Vec<Block>),
    CodeBlock {
        language: Option<String>,
        code: String,
    },
    List {
        ordered: bool,
        start: Option<u64>,
        items: Vec<Vec<Block>>,
    },
    ThematicBreak,
    Table {
        alignments: Vec<Alignment>,
        header: Vec<Vec<Inline>>,
        rows: Vec<Vec<Vec<Inline>>>,
    },
    HtmlBlock(String),
}

impl Block {
    /// Kind tag for renderers that dispatch on block type.
    pub fn kind(&self) -> &'static str {
        match self {
            Block::Paragraph(_) => "paragraph",
            Block::Heading { .. } => "heading",
            Block::BlockQuote(_) => "blockquote",
            Block::CodeBlock { .. } => "code",
            Block::List { .. } => "list",
            Block::ThematicBreak => "thematic-break",
            Block::Table { .. } => "table",
            Block::HtmlBlock(_) => "html",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Inline {
    Text(String),
    Code(String),
    Emphasis(Vec<Inline>),
    Strong(Vec<Inline>),
    Strikethrough(Vec<Inline>),
    Link {
        url: String,
        title: String,
        content: Vec<Inline>,
    },
    Image {
        url: String,
        title: String,
        alt: Vec<Inline>,
    },
    SoftBreak,
    HardBreak,
    Html(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Alignment {
    None,
    Left,
    Center,
    Right,
}

fn parser_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_HEADING_ATTRIBUTES
}

fn heading_level_from_u8(n: u8) -> HeadingLevel {
    match n {
        1 => HeadingLevel::H1,
        2 => HeadingLevel::H2,
        3 => HeadingLevel::H3,
        4 => HeadingLevel::H4,
        5 => HeadingLevel::H5,
        _ => HeadingLevel::H6,
    }
}

/// Parse markdown into a sequence of top-level blocks.
pub fn parse(markdown: &str) -> Vec<Block> {
    let events: Vec<Event<'_>> = Parser::new_ext(markdown, parser_options()).collect();
    EventReader { events, pos: 0 }.blocks()
}

/// Cursor over the parser event stream.
struct EventReader<'a> {
    events: Vec<Event<'a>>,
    pos: usize,
}

impl EventReader<'_> {
    fn peek(&self) -> Option<&Event<'_>> {
        self.events.get(self.pos)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    /// Read blocks until an unmatched `End` event or the stream runs out.
    /// The `End` event is left for the caller.
    fn blocks(&mut self) -> Vec<Block> {
        let mut blocks = Vec::new();
        while let Some(event) = self.peek() {
            match event {
                Event::Start(Tag::Paragraph) => {
                    self.advance();
                    blocks.push(Block::Paragraph(self.inlines(TagEnd::Paragraph)));
                }
                Event::Start(Tag::Heading { level, .. }) => {
                    let level = *level as u8;
                    self.advance();
                    let content = self.inlines(TagEnd::Heading(heading_level_from_u8(level)));
                    blocks.push(Block::Heading { level, content });
                }
                Event::Start(Tag::BlockQuote(_)) => {
                    self.advance();
                    let inner =
                        self.blocks_until(|e| matches!(e, Event::End(TagEnd::BlockQuote(_))));
                    blocks.push(Block::BlockQuote(inner));
                }
                Event::Start(Tag::CodeBlock(kind)) => {
                    let language = match kind {
                        CodeBlockKind::Fenced(lang) if !lang.is_empty() => Some(lang.to_string()),
                        _ => None,
                    };
                    self.advance();
                    blocks.push(self.code_block(language));
                }
                Event::Start(Tag::List(start)) => {
                    let start = *start;
                    self.advance();
                    blocks.push(self.list(start));
                }
                Event::Start(Tag::Table(alignments)) => {
                    let alignments: Vec<Alignment> = alignments
                        .iter()
                        .map(|a| match a {
                            pulldown_cmark::Alignment::None => Alignment::None,
                            pulldown_cmark::Alignment::Left => Alignment::Left,
                            pulldown_cmark::Alignment::Center => Alignment::Center,
                            pulldown_cmark::Alignment::Right => Alignment::Right,
                        })
                        .collect();
                    self.advance();
                    blocks.push(self.table(alignments));
                }
                Event::Rule => {
                    self.advance();
                    blocks.push(Block::ThematicBreak);
                }
                Event::Start(Tag::HtmlBlock) => {
                    self.advance();
                    blocks.push(self.html_block());
                }
                Event::Html(html) => {
                    let html = html.to_string();
                    self.advance();
                    blocks.push(Block::HtmlBlock(html));
                }
                Event::End(_) => break,
                _ => {
                    // Block-level events we don't model (metadata, footnote
                    // definitions) are skipped.
                    self.advance();
                }
            }
        }
        blocks
    }

    fn blocks_until(&mut self, is_end: impl Fn(&Event<'_>) -> bool) -> Vec<Block> {
        let mut blocks = Vec::new();
        while let Some(event) = self.peek() {
            if is_end(event) {
                self.advance();
                break;
            }
            blocks.extend(self.blocks());
        }
        blocks
    }

    fn html_block(&mut self) -> Block {
        let mut html = String::new();
        while let Some(event) = self.peek() {
            match event {
                Event::Html(h) | Event::Text(h) => {
                    html.push_str(h);
                    self.advance();
                }
                Event::End(TagEnd::HtmlBlock) => {
                    self.advance();
                    break;
                }
                _ => self.advance(),
            }
        }
        Block::HtmlBlock(html)
    }

    fn code_block(&mut self, language: Option<String>) -> Block {
        let mut code = String::new();
        while let Some(event) = self.peek() {
            match event {
                Event::Text(t) => {
                    code.push_str(t);
                    self.advance();
                }
                Event::End(TagEnd::CodeBlock) => {
                    self.advance();
                    break;
                }
                _ => self.advance(),
            }
        }
        Block::CodeBlock { language, code }
    }

    fn list(&mut self, start: Option<u64>) -> Block {
        let mut items = Vec::new();
        while let Some(event) = self.peek() {
            match event {
                Event::Start(Tag::Item) => {
                    self.advance();
                    items.push(self.blocks_until(|e| matches!(e, Event::End(TagEnd::Item))));
                }
                Event::End(TagEnd::List(_)) => {
                    self.advance();
                    break;
                }
                _ => self.advance(),
            }
        }
        Block::List {
            ordered: start.is_some(),
            start,
            items,
        }
    }

    fn table(&mut self, alignments: Vec<Alignment>) -> Block {
        let mut header = Vec::new();
        let mut rows = Vec::new();
        while let Some(event) = self.peek() {
            match event {
                Event::Start(Tag::TableHead) => {
                    self.advance();
                    header = self.table_row(TagEnd::TableHead);
                }
                Event::Start(Tag::TableRow) => {
                    self.advance();
                    rows.push(self.table_row(TagEnd::TableRow));
                }
                Event::End(TagEnd::Table) => {
                    self.advance();
                    break;
                }
                _ => self.advance(),
            }
        }
        Block::Table {
            alignments,
            header,
            rows,
        }
    }

    fn table_row(&mut self, end: TagEnd) -> Vec<Vec<Inline>> {
        let mut cells = Vec::new();
        while let Some(event) = self.peek() {
            match event {
                Event::Start(Tag::TableCell) => {
                    self.advance();
                    cells.push(self.inlines(TagEnd::TableCell));
                }
                e if *e == Event::End(end) => {
                    self.advance();
                    break;
                }
                _ => self.advance(),
            }
        }
        cells
    }

    fn inlines(&mut self, end: TagEnd) -> Vec<Inline> {
        let mut inlines = Vec::new();
        while let Some(event) = self.peek() {
            match event {
                e if *e == Event::End(end) => {
                    self.advance();
                    break;
                }
                Event::Text(t) => {
                    inlines.push(Inline::Text(t.to_string()));
                    self.advance();
                }
                Event::Code(c) => {
                    inlines.push(Inline::Code(c.to_string()));
                    self.advance();
                }
                Event::SoftBreak => {
                    inlines.push(Inline::SoftBreak);
                    self.advance();
                }
                Event::HardBreak => {
                    inlines.push(Inline::HardBreak);
                    self.advance();
                }
                Event::Html(h) => {
                    inlines.push(Inline::Html(h.to_string()));
                    self.advance();
                }
                Event::Start(Tag::Emphasis) => {
                    self.advance();
                    inlines.push(Inline::Emphasis(self.inlines(TagEnd::Emphasis)));
                }
                Event::Start(Tag::Strong) => {
                    self.advance();
                    inlines.push(Inline::Strong(self.inlines(TagEnd::Strong)));
                }
                Event::Start(Tag::Strikethrough) => {
                    self.advance();
                    inlines.push(Inline::Strikethrough(self.inlines(TagEnd::Strikethrough)));
                }
                Event::Start(Tag::Link { dest_url, title, .. }) => {
                    let url = dest_url.to_string();
                    let title = title.to_string();
                    self.advance();
                    inlines.push(Inline::Link {
                        url,
                        title,
                        content: self.inlines(TagEnd::Link),
                    });
                }
                Event::Start(Tag::Image { dest_url, title, .. }) => {
                    let url = dest_url.to_string();
                    let title = title.to_string();
                    self.advance();
                    inlines.push(Inline::Image {
                        url,
                        title,
                        alt: self.inlines(TagEnd::Image),
                    });
                }
                _ => self.advance(),
            }
        }
        inlines
    }
}

/// Canonical plain-text serialisation of a block.
///
/// Headings render as `#… <content>`, strong as `**…**`, emphasis as `*…*`,
/// inline code as backticks, fenced code as triple backticks with optional
/// language, lists as newline-joined `- `/`N. ` items, images as
/// `![alt](url)`, links as `[text](url)`, thematic breaks as `---`. Anything
/// else concatenates its child serialisations, falling back to the node's
/// raw value, else the empty string.
pub fn block_to_text(block: &Block) -> String {
    match block {
        Block::Paragraph(inlines) => inlines_to_text(inlines),
        Block::Heading { level, content } => {
            format!("{} {}", "#".repeat(*level as usize), inlines_to_text(content))
        }
        Block::BlockQuote(inner) => inner
            .iter()
            .map(block_to_text)
            .collect::<Vec<_>>()
            .join("\n"),
        Block::CodeBlock { language, code } => {
            let newline = if code.ends_with('\n') { "" } else { "\n" };
            format!(
                "```{}\n{}{}```",
                language.as_deref().unwrap_or(""),
                code,
                newline
            )
        }
        Block::List {
            ordered,
            start,
            items,
        } => {
            let first = start.unwrap_or(1);
            items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    let body = item
                        .iter()
                        .map(block_to_text)
                        .collect::<Vec<_>>()
                        .join(" ");
                    if *ordered {
                        format!("{}. {}", first + i as u64, body)
                    } else {
                        format!("- {body}")
                    }
                })
                .collect::<Vec<_>>()
                .join("\n")
        }
        Block::ThematicBreak => "---".to_string(),
        Block::Table { header, rows, .. } => {
            let mut lines = Vec::new();
            if !header.is_empty() {
                lines.push(table_row_text(header));
            }
            for row in rows {
                lines.push(table_row_text(row));
            }
            lines.join("\n")
        }
        Block::HtmlBlock(html) => html.trim_end().to_string(),
    }
}

fn table_row_text(cells: &[Vec<Inline>]) -> String {
    let mut out = String::from("|");
    for cell in cells {
        out.push(' ');
        out.push_str(&inlines_to_text(cell));
        out.push_str(" |");
    }
    out
}

/// Serialise an inline sequence, keeping markdown markers.
pub fn inlines_to_text(inlines: &[Inline]) -> String {
    let mut out = String::new();
    for inline in inlines {
        match inline {
            Inline::Text(t) => out.push_str(t),
            Inline::Code(c) => {
                out.push('`');
                out.push_str(c);
                out.push('`');
            }
            Inline::Emphasis(inner) => {
                out.push('*');
                out.push_str(&inlines_to_text(inner));
                out.push('*');
            }
            Inline::Strong(inner) => {
                out.push_str("**");
                out.push_str(&inlines_to_text(inner));
                out.push_str("**");
            }
            Inline::Strikethrough(inner) => {
                out.push_str("~~");
                out.push_str(&inlines_to_text(inner));
                out.push_str("~~");
            }
            Inline::Link { url, content, .. } => {
                out.push('[');
                out.push_str(&inlines_to_text(content));
                out.push_str("](");
                out.push_str(url);
                out.push(')');
            }
            Inline::Image { url, alt, .. } => {
                out.push_str("![");
                out.push_str(&inlines_to_text(alt));
                out.push_str("](");
                out.push_str(url);
                out.push(')');
            }
            Inline::SoftBreak | Inline::HardBreak => out.push('\n'),
            Inline::Html(h) => out.push_str(h),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paragraph_text() {
        let blocks = parse("Hello world.\n");
        assert_eq!(blocks.len(), 1);
        assert!(matches!(&blocks[0], Block::Paragraph(_)));
        assert_eq!(block_to_text(&blocks[0]), "Hello world.");
    }

    #[test]
    fn heading_keeps_level_markers() {
        let blocks = parse("## My Heading\n");
        match &blocks[0] {
            Block::Heading { level, .. } => assert_eq!(*level, 2),
            other => panic!("expected heading, got {other:?}"),
        }
        assert_eq!(block_to_text(&blocks[0]), "## My Heading");
    }

    #[test]
    fn strong_and_emphasis_markers_survive() {
        let blocks = parse("Text with *emphasis* and **strong**.\n");
        assert_eq!(
            block_to_text(&blocks[0]),
            "Text with *emphasis* and **strong**."
        );
    }

    #[test]
    fn inline_code_keeps_backticks() {
        let blocks = parse("Run `cargo doc` locally.\n");
        assert_eq!(block_to_text(&blocks[0]), "Run `cargo doc` locally.");
    }

    #[test]
    fn code_block_fences() {
        let blocks = parse("```rust\nfn main() {}\n```\n");
        match &blocks[0] {
            Block::CodeBlock { language, code } => {
                assert_eq!(language.as_deref(), Some("rust"));
                assert_eq!(code, "fn main() {}\n");
            }
            other => panic!("expected code block, got {other:?}"),
        }
        assert_eq!(block_to_text(&blocks[0]), "```rust\nfn main() {}\n```");
    }

    #[test]
    fn unordered_list_items_joined_by_newlines() {
        let blocks = parse("- item one\n- item two\n- item three\n");
        match &blocks[0] {
            Block::List { ordered, items, .. } => {
                assert!(!ordered);
                assert_eq!(items.len(), 3);
            }
            other => panic!("expected list, got {other:?}"),
        }
        assert_eq!(
            block_to_text(&blocks[0]),
            "- item one\n- item two\n- item three"
        );
    }

    #[test]
    fn ordered_list_numbering_respects_start() {
        let blocks = parse("3. third\n4. fourth\n");
        assert_eq!(block_to_text(&blocks[0]), "3. third\n4. fourth");
    }

    #[test]
    fn link_and_image_serialisation() {
        let blocks = parse("See [example](https://example.com) and ![alt text](image.png).\n");
        assert_eq!(
            block_to_text(&blocks[0]),
            "See [example](https://example.com) and ![alt text](image.png)."
        );
    }

    #[test]
    fn blockquote_concatenates_children() {
        let blocks = parse("> Quoted text.\n>\n> Second line.\n");
        assert!(matches!(&blocks[0], Block::BlockQuote(_)));
        assert_eq!(block_to_text(&blocks[0]), "Quoted text.\nSecond line.");
    }

    #[test]
    fn thematic_break_text() {
        let blocks = parse("Before.\n\n---\n\nAfter.\n");
        assert_eq!(blocks.len(), 3);
        assert_eq!(block_to_text(&blocks[1]), "---");
    }

    #[test]
    fn table_rows_pipe_separated() {
        let blocks = parse("| A | B |\n| --- | --- |\n| 1 | 2 |\n");
        match &blocks[0] {
            Block::Table { header, rows, .. } => {
                assert_eq!(header.len(), 2);
                assert_eq!(rows.len(), 1);
            }
            other => panic!("expected table, got {other:?}"),
        }
        assert_eq!(block_to_text(&blocks[0]), "| A | B |\n| 1 | 2 |");
    }

    #[test]
    fn html_block_kept_verbatim() {
        let blocks = parse("<div class=\"note\">\nraw html inside\n</div>\n\nAfter paragraph.\n");
        assert!(matches!(&blocks[0], Block::HtmlBlock(_)));
        assert!(block_to_text(&blocks[0]).contains("raw html inside"));
        // Parsing continues past the HTML block.
        assert!(matches!(&blocks[1], Block::Paragraph(_)));
    }

    #[test]
    fn soft_break_becomes_newline() {
        let blocks = parse("first line\nsecond line\n");
        assert_eq!(block_to_text(&blocks[0]), "first line\nsecond line");
    }

    #[test]
    fn block_kinds() {
        let blocks = parse("# H\n\ntext\n\n---\n");
        let kinds: Vec<&str> = blocks.iter().map(Block::kind).collect();
        assert_eq!(kinds, vec!["heading", "paragraph", "thematic-break"]);
    }
}
