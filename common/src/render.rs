//! Turns messages into an abstract render tree.
//!
//! Bot text is parsed as markdown (tables and strikethrough enabled). Links
//! are classified by a [`LinkResolver`] into navigations or in-app actions,
//! and every table comes out wrapped in a horizontally scrollable block.
//! The UI layer maps the tree to elements one-to-one.

use chrono::{DateTime, FixedOffset, Local, Offset, Utc};
use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag};

use crate::config::{ChatConfig, DOCUMENT_THUMBNAIL};
use crate::conversation::ConversationState;
use crate::message::{Message, Sender};

pub const DOCUMENTS_HEADING: &str = "Documentos relacionados:";

/// What activating a link should do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LinkIntent {
    /// Navigate, in a new browsing context.
    External { href: String },
    /// Toggle the registration overlay.
    Registration,
}

/// Classifies link targets found in bot markdown.
pub trait LinkResolver {
    fn classify(&self, target: &str) -> LinkIntent;
}

/// Maps one exact anchor to [`LinkIntent::Registration`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnchorResolver {
    anchor: String,
}

impl AnchorResolver {
    pub fn new(anchor: impl Into<String>) -> Self {
        Self {
            anchor: anchor.into(),
        }
    }
}

impl LinkResolver for AnchorResolver {
    fn classify(&self, target: &str) -> LinkIntent {
        if target == self.anchor {
            LinkIntent::Registration
        } else {
            LinkIntent::External {
                href: target.to_string(),
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Inline {
    Text(String),
    Code(String),
    Emphasis(Vec<Inline>),
    Strong(Vec<Inline>),
    Strikethrough(Vec<Inline>),
    Link { intent: LinkIntent, children: Vec<Inline> },
    Image { src: String, alt: String },
    SoftBreak,
    HardBreak,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableView {
    pub header: Vec<Vec<Inline>>,
    pub rows: Vec<Vec<Vec<Inline>>>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Block {
    Paragraph(Vec<Inline>),
    /// Loose text directly inside a tight list item.
    Plain(Vec<Inline>),
    Heading { level: u8, content: Vec<Inline> },
    List { start: Option<u64>, items: Vec<Vec<Block>> },
    Quote(Vec<Block>),
    Code { language: Option<String>, text: String },
    Table(TableView),
    /// Full-width container that scrolls horizontally instead of clipping.
    HorizontalScroll(Vec<Block>),
    Rule,
}

#[derive(Clone, Debug, PartialEq)]
pub enum MessageBody {
    /// User text, shown verbatim.
    Plain(String),
    Markdown(Vec<Block>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentTile {
    pub href: String,
    pub name: String,
    /// Shared preview image, identical on every tile.
    pub thumbnail: String,
    pub thumbnail_alt: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentGallery {
    pub heading: String,
    pub tiles: Vec<DocumentTile>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RenderedMessage {
    pub sender: Sender,
    pub body: MessageBody,
    pub gallery: Option<DocumentGallery>,
    /// Local `HH:MM`.
    pub time: String,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TranscriptEntry {
    Message(RenderedMessage),
    /// Transient indicator shown after the last message while a turn is pending.
    Typing,
}

pub fn format_time(timestamp: DateTime<Utc>, offset: &FixedOffset) -> String {
    timestamp.with_timezone(offset).format("%H:%M").to_string()
}

pub struct Renderer<R = AnchorResolver> {
    resolver: R,
    documents_base_url: String,
    document_thumbnail: String,
    offset: FixedOffset,
}

impl Renderer<AnchorResolver> {
    /// Renderer for the configured anchor and backend, in the local timezone.
    pub fn from_config(config: &ChatConfig) -> Self {
        Self::with_resolver(
            AnchorResolver::new(config.registration_anchor.clone()),
            config.documents_base_url(),
        )
        .with_thumbnail(config.document_thumbnail.clone())
    }
}

impl<R: LinkResolver> Renderer<R> {
    pub fn with_resolver(resolver: R, documents_base_url: impl Into<String>) -> Self {
        Self {
            resolver,
            documents_base_url: documents_base_url.into(),
            document_thumbnail: DOCUMENT_THUMBNAIL.to_string(),
            offset: Local::now().offset().fix(),
        }
    }

    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.document_thumbnail = thumbnail.into();
        self
    }

    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    pub fn render(&self, message: &Message) -> RenderedMessage {
        let body = match message.sender {
            Sender::User => MessageBody::Plain(message.text.clone()),
            Sender::Bot => MessageBody::Markdown(self.markdown(&message.text)),
        };
        RenderedMessage {
            sender: message.sender,
            body,
            gallery: self.gallery(message),
            time: format_time(message.timestamp, &self.offset),
        }
    }

    /// Every message in order, plus the typing indicator while pending.
    pub fn transcript(&self, state: &ConversationState) -> Vec<TranscriptEntry> {
        let mut entries: Vec<_> = state
            .messages()
            .iter()
            .map(|m| TranscriptEntry::Message(self.render(m)))
            .collect();
        if state.is_pending() {
            entries.push(TranscriptEntry::Typing);
        }
        entries
    }

    fn gallery(&self, message: &Message) -> Option<DocumentGallery> {
        let documents = message.documents();
        if documents.is_empty() {
            return None;
        }
        let base = self.documents_base_url.trim_end_matches('/');
        Some(DocumentGallery {
            heading: DOCUMENTS_HEADING.to_string(),
            tiles: documents
                .iter()
                .map(|doc| DocumentTile {
                    href: format!("{base}/{}", doc.id),
                    name: doc.name.clone(),
                    thumbnail: self.document_thumbnail.clone(),
                    thumbnail_alt: format!("Preview de {}", doc.name),
                })
                .collect(),
        })
    }

    pub fn markdown(&self, source: &str) -> Vec<Block> {
        let mut opts = Options::empty();
        opts.insert(Options::ENABLE_TABLES);
        opts.insert(Options::ENABLE_STRIKETHROUGH);

        let mut builder = TreeBuilder::new(&self.resolver);
        for event in Parser::new_ext(source, opts) {
            builder.event(event);
        }
        builder.finish()
    }
}

#[derive(Debug)]
enum InlineKind {
    Paragraph,
    Heading(u8),
    Emphasis,
    Strong,
    Strikethrough,
    Link(LinkIntent),
    Image(String),
    Cell,
}

#[derive(Debug)]
enum Frame {
    Root(Vec<Block>),
    Quote(Vec<Block>),
    Item(Vec<Block>),
    List(Option<u64>, Vec<Vec<Block>>),
    Inlines(InlineKind, Vec<Inline>),
    Code(Option<String>, String),
    Table(TableView),
    Head(Vec<Vec<Inline>>),
    Row(Vec<Vec<Inline>>),
    /// Constructs with no visual counterpart (front matter, footnote bodies).
    Skip,
}

struct TreeBuilder<'r, R> {
    resolver: &'r R,
    stack: Vec<Frame>,
}

impl<'r, R: LinkResolver> TreeBuilder<'r, R> {
    fn new(resolver: &'r R) -> Self {
        Self {
            resolver,
            stack: vec![Frame::Root(Vec::new())],
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.open(tag),
            Event::End(_) => self.close(),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline(Inline::Code(code.into_string())),
            // Raw HTML is never interpreted.
            Event::Html(html) | Event::InlineHtml(html) => self.text(&html),
            Event::SoftBreak => self.inline(Inline::SoftBreak),
            Event::HardBreak => self.inline(Inline::HardBreak),
            Event::Rule => self.block(Block::Rule),
            Event::TaskListMarker(done) => self.text(if done { "☑ " } else { "☐ " }),
            Event::FootnoteReference(label) => self.text(&format!("[{label}]")),
            _ => {}
        }
    }

    fn open(&mut self, tag: Tag<'_>) {
        let frame = match tag {
            Tag::Paragraph | Tag::HtmlBlock => Frame::Inlines(InlineKind::Paragraph, Vec::new()),
            Tag::Heading { level, .. } => {
                Frame::Inlines(InlineKind::Heading(heading_level(level)), Vec::new())
            }
            Tag::BlockQuote(..) => Frame::Quote(Vec::new()),
            Tag::CodeBlock(kind) => {
                let language = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .map(str::to_string),
                    CodeBlockKind::Indented => None,
                };
                Frame::Code(language, String::new())
            }
            Tag::List(start) => Frame::List(start, Vec::new()),
            Tag::Item => Frame::Item(Vec::new()),
            Tag::Table(_) => Frame::Table(TableView::default()),
            Tag::TableHead => Frame::Head(Vec::new()),
            Tag::TableRow => Frame::Row(Vec::new()),
            Tag::TableCell => Frame::Inlines(InlineKind::Cell, Vec::new()),
            Tag::Emphasis => Frame::Inlines(InlineKind::Emphasis, Vec::new()),
            Tag::Strong => Frame::Inlines(InlineKind::Strong, Vec::new()),
            Tag::Strikethrough => Frame::Inlines(InlineKind::Strikethrough, Vec::new()),
            Tag::Link { dest_url, .. } => Frame::Inlines(
                InlineKind::Link(self.resolver.classify(&dest_url)),
                Vec::new(),
            ),
            Tag::Image { dest_url, .. } => {
                Frame::Inlines(InlineKind::Image(dest_url.into_string()), Vec::new())
            }
            _ => Frame::Skip,
        };
        self.stack.push(frame);
    }

    fn close(&mut self) {
        if self.stack.len() < 2 {
            return;
        }
        let Some(frame) = self.stack.pop() else {
            return;
        };
        match frame {
            Frame::Root(_) | Frame::Skip => {}
            Frame::Quote(blocks) => self.block(Block::Quote(blocks)),
            Frame::Item(blocks) => {
                if let Some(Frame::List(_, items)) = self.stack.last_mut() {
                    items.push(blocks);
                }
            }
            Frame::List(start, items) => self.block(Block::List { start, items }),
            Frame::Code(language, text) => self.block(Block::Code { language, text }),
            Frame::Table(table) => {
                self.block(Block::HorizontalScroll(vec![Block::Table(table)]))
            }
            Frame::Head(cells) => {
                if let Some(Frame::Table(table)) = self.stack.last_mut() {
                    table.header = cells;
                }
            }
            Frame::Row(cells) => {
                if let Some(Frame::Table(table)) = self.stack.last_mut() {
                    table.rows.push(cells);
                }
            }
            Frame::Inlines(kind, content) => match kind {
                InlineKind::Paragraph => self.block(Block::Paragraph(content)),
                InlineKind::Heading(level) => self.block(Block::Heading { level, content }),
                InlineKind::Emphasis => self.inline(Inline::Emphasis(content)),
                InlineKind::Strong => self.inline(Inline::Strong(content)),
                InlineKind::Strikethrough => self.inline(Inline::Strikethrough(content)),
                InlineKind::Link(intent) => self.inline(Inline::Link {
                    intent,
                    children: content,
                }),
                InlineKind::Image(src) => self.inline(Inline::Image {
                    src,
                    alt: plain_text(&content),
                }),
                InlineKind::Cell => match self.stack.last_mut() {
                    Some(Frame::Head(cells)) | Some(Frame::Row(cells)) => cells.push(content),
                    _ => {}
                },
            },
        }
    }

    fn text(&mut self, text: &str) {
        if let Some(Frame::Code(_, code)) = self.stack.last_mut() {
            code.push_str(text);
            return;
        }
        self.inline(Inline::Text(text.to_string()));
    }

    fn inline(&mut self, inline: Inline) {
        let target = match self.stack.last_mut() {
            Some(Frame::Inlines(_, content)) => content,
            Some(Frame::Root(blocks)) | Some(Frame::Quote(blocks)) | Some(Frame::Item(blocks)) => {
                if !matches!(blocks.last(), Some(Block::Plain(_))) {
                    blocks.push(Block::Plain(Vec::new()));
                }
                match blocks.last_mut() {
                    Some(Block::Plain(content)) => content,
                    _ => return,
                }
            }
            _ => return,
        };
        push_merged(target, inline);
    }

    fn block(&mut self, block: Block) {
        match self.stack.last_mut() {
            Some(Frame::Root(blocks)) | Some(Frame::Quote(blocks)) | Some(Frame::Item(blocks)) => {
                blocks.push(block)
            }
            _ => {}
        }
    }

    fn finish(mut self) -> Vec<Block> {
        while self.stack.len() > 1 {
            self.close();
        }
        match self.stack.pop() {
            Some(Frame::Root(blocks)) => blocks,
            _ => Vec::new(),
        }
    }
}

fn push_merged(target: &mut Vec<Inline>, inline: Inline) {
    if let (Some(Inline::Text(prev)), Inline::Text(next)) = (target.last_mut(), &inline) {
        prev.push_str(next);
        return;
    }
    target.push(inline);
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

/// Flatten inline content to its visible text.
pub fn plain_text(content: &[Inline]) -> String {
    let mut out = String::new();
    for inline in content {
        match inline {
            Inline::Text(t) | Inline::Code(t) => out.push_str(t),
            Inline::Emphasis(c) | Inline::Strong(c) | Inline::Strikethrough(c) => {
                out.push_str(&plain_text(c))
            }
            Inline::Link { children, .. } => out.push_str(&plain_text(children)),
            Inline::Image { alt, .. } => out.push_str(alt),
            Inline::SoftBreak | Inline::HardBreak => out.push(' '),
        }
    }
    out
}
