use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

/// Block structure of a chat message, with inline formatting flattened to text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBlock {
    Paragraph(String),
    Heading { level: u8, text: String },
    Code { language: Option<String>, code: String },
    Quote(Vec<MessageBlock>),
    List { start: Option<u64>, items: Vec<Vec<MessageBlock>> },
    Rule,
}

pub fn parse_markdown(input: &str) -> Vec<MessageBlock> {
    let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES;
    let mut ctx = BlockBuilder::default();
    for event in Parser::new_ext(input, options) {
        ctx.handle_event(event);
    }
    ctx.finish()
}

/// Flatten parsed blocks into terminal lines.
pub fn flatten_blocks(blocks: &[MessageBlock]) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, block) in blocks.iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        flatten_block(block, &mut lines);
    }
    lines
}

fn flatten_block(block: &MessageBlock, lines: &mut Vec<String>) {
    match block {
        MessageBlock::Paragraph(text) | MessageBlock::Heading { text, .. } => {
            lines.extend(text.lines().map(str::to_string));
        }
        MessageBlock::Code { code, .. } => {
            lines.extend(code.lines().map(|l| format!("  {}", l)));
        }
        MessageBlock::Quote(inner) => {
            lines.extend(flatten_blocks(inner).into_iter().map(|l| format!("> {}", l)));
        }
        MessageBlock::List { start, items } => {
            for (n, item) in items.iter().enumerate() {
                let marker = match start {
                    Some(first) => format!("{}. ", first + n as u64),
                    None => "• ".to_string(),
                };
                let indent = " ".repeat(marker.chars().count());
                let mut item_lines = Vec::new();
                for block in item {
                    flatten_block(block, &mut item_lines);
                }
                for (k, line) in item_lines.into_iter().enumerate() {
                    let prefix = if k == 0 { &marker } else { &indent };
                    lines.push(format!("{}{}", prefix, line));
                }
            }
        }
        MessageBlock::Rule => lines.push("─".repeat(12)),
    }
}

enum Frame {
    Quote(Vec<MessageBlock>),
    List {
        start: Option<u64>,
        items: Vec<Vec<MessageBlock>>,
        current: Vec<MessageBlock>,
    },
}

#[derive(Default)]
struct BlockBuilder {
    blocks: Vec<MessageBlock>,
    frames: Vec<Frame>,
    text: String,
    heading: Option<u8>,
    code: Option<(Option<String>, String)>,
    links: Vec<String>,
}

impl BlockBuilder {
    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => match self.code.as_mut() {
                Some((_, code)) => code.push_str(&text),
                None => self.text.push_str(&text),
            },
            Event::Code(code) => {
                self.text.push('`');
                self.text.push_str(&code);
                self.text.push('`');
            }
            Event::SoftBreak => self.text.push(' '),
            Event::HardBreak => self.text.push('\n'),
            Event::Rule => {
                self.flush_text();
                self.push_block(MessageBlock::Rule);
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag) {
        match tag {
            Tag::Heading { level, .. } => {
                self.flush_text();
                self.heading = Some(heading_level(level));
            }
            Tag::CodeBlock(kind) => {
                self.flush_text();
                let language = match kind {
                    CodeBlockKind::Fenced(lang) if !lang.trim().is_empty() => {
                        Some(lang.trim().to_string())
                    }
                    _ => None,
                };
                self.code = Some((language, String::new()));
            }
            Tag::BlockQuote(_) => {
                self.flush_text();
                self.frames.push(Frame::Quote(Vec::new()));
            }
            Tag::List(start) => {
                self.flush_text();
                self.frames.push(Frame::List {
                    start,
                    items: Vec::new(),
                    current: Vec::new(),
                });
            }
            Tag::Link { dest_url, .. } => self.links.push(dest_url.to_string()),
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.flush_text(),
            TagEnd::Heading(_) => {
                let text = std::mem::take(&mut self.text);
                let level = self.heading.take().unwrap_or(1);
                self.push_block(MessageBlock::Heading { level, text });
            }
            TagEnd::CodeBlock => {
                if let Some((language, code)) = self.code.take() {
                    let code = code.trim_end_matches('\n').to_string();
                    self.push_block(MessageBlock::Code { language, code });
                }
            }
            TagEnd::BlockQuote(_) => {
                self.flush_text();
                if let Some(Frame::Quote(inner)) = self.frames.pop() {
                    self.push_block(MessageBlock::Quote(inner));
                }
            }
            TagEnd::Item => {
                self.flush_text();
                if let Some(Frame::List { items, current, .. }) = self.frames.last_mut() {
                    items.push(std::mem::take(current));
                }
            }
            TagEnd::List(_) => {
                self.flush_text();
                if let Some(Frame::List { start, items, .. }) = self.frames.pop() {
                    self.push_block(MessageBlock::List { start, items });
                }
            }
            TagEnd::TableCell => self.text.push_str(" | "),
            TagEnd::TableHead | TagEnd::TableRow => {
                let row_len = self.text.trim_end_matches(" | ").len();
                self.text.truncate(row_len);
                self.text.push('\n');
            }
            TagEnd::Table => self.flush_text(),
            TagEnd::Link => {
                if let Some(url) = self.links.pop() {
                    if !url.is_empty() && !self.text.ends_with(&url) {
                        self.text.push_str(&format!(" ({})", url));
                    }
                }
            }
            _ => {}
        }
    }

    fn flush_text(&mut self) {
        if self.heading.is_some() {
            return;
        }
        let text = std::mem::take(&mut self.text);
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            self.push_block(MessageBlock::Paragraph(trimmed.to_string()));
        }
    }

    fn push_block(&mut self, block: MessageBlock) {
        match self.frames.last_mut() {
            Some(Frame::Quote(inner)) => inner.push(block),
            Some(Frame::List { current, .. }) => current.push(block),
            None => self.blocks.push(block),
        }
    }

    fn finish(mut self) -> Vec<MessageBlock> {
        self.flush_text();
        self.blocks
    }
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
