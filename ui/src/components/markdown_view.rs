use dioxus::prelude::*;

use sara_common::render::{Block, DocumentGallery, Inline, LinkIntent, TableView};

/// Render a parsed bot message. `on_action` fires for links that resolve to
/// [`LinkIntent::Registration`].
#[component]
pub fn MarkdownBlocks(blocks: Vec<Block>, on_action: EventHandler<()>) -> Element {
    rsx! {
        for block in blocks.iter() {
            {block_view(block, on_action)}
        }
    }
}

fn block_view(block: &Block, on_action: EventHandler<()>) -> Element {
    match block {
        Block::Paragraph(content) => rsx! { p { {inlines_view(content, on_action)} } },
        Block::Plain(content) => inlines_view(content, on_action),
        Block::Heading { level, content } => {
            let inner = inlines_view(content, on_action);
            match level {
                1 => rsx! { h1 { {inner} } },
                2 => rsx! { h2 { {inner} } },
                3 => rsx! { h3 { {inner} } },
                4 => rsx! { h4 { {inner} } },
                5 => rsx! { h5 { {inner} } },
                _ => rsx! { h6 { {inner} } },
            }
        }
        Block::List { start, items } => {
            let children = rsx! {
                for item in items.iter() {
                    li {
                        for child in item.iter() {
                            {block_view(child, on_action)}
                        }
                    }
                }
            };
            match start {
                Some(first) => rsx! { ol { start: "{first}", {children} } },
                None => rsx! { ul { {children} } },
            }
        }
        Block::Quote(children) => rsx! {
            blockquote {
                for child in children.iter() {
                    {block_view(child, on_action)}
                }
            }
        },
        Block::Code { language, text } => {
            let class = language
                .as_ref()
                .map(|lang| format!("language-{lang}"))
                .unwrap_or_default();
            rsx! { pre { code { class: "{class}", "{text}" } } }
        }
        Block::Table(table) => table_view(table, on_action),
        Block::HorizontalScroll(children) => rsx! {
            div {
                class: "table-container",
                style: "width: 100%; overflow-x: auto;",
                for child in children.iter() {
                    {block_view(child, on_action)}
                }
            }
        },
        Block::Rule => rsx! { hr {} },
    }
}

fn table_view(table: &TableView, on_action: EventHandler<()>) -> Element {
    rsx! {
        table {
            thead {
                tr {
                    for cell in table.header.iter() {
                        th { {inlines_view(cell, on_action)} }
                    }
                }
            }
            tbody {
                for row in table.rows.iter() {
                    tr {
                        for cell in row.iter() {
                            td { {inlines_view(cell, on_action)} }
                        }
                    }
                }
            }
        }
    }
}

fn inlines_view(content: &[Inline], on_action: EventHandler<()>) -> Element {
    rsx! {
        for inline in content.iter() {
            {inline_view(inline, on_action)}
        }
    }
}

fn inline_view(inline: &Inline, on_action: EventHandler<()>) -> Element {
    match inline {
        Inline::Text(text) => rsx! { "{text}" },
        Inline::Code(text) => rsx! { code { "{text}" } },
        Inline::Emphasis(children) => rsx! { em { {inlines_view(children, on_action)} } },
        Inline::Strong(children) => rsx! { strong { {inlines_view(children, on_action)} } },
        Inline::Strikethrough(children) => rsx! { del { {inlines_view(children, on_action)} } },
        Inline::Link { intent, children } => match intent {
            LinkIntent::External { href } => rsx! {
                a {
                    href: "{href}",
                    target: "_blank",
                    rel: "noopener noreferrer",
                    {inlines_view(children, on_action)}
                }
            },
            LinkIntent::Registration => rsx! {
                button {
                    class: "registro-link",
                    r#type: "button",
                    onclick: move |evt: MouseEvent| {
                        evt.prevent_default();
                        on_action.call(());
                    },
                    {inlines_view(children, on_action)}
                }
            },
        },
        Inline::Image { src, alt } => rsx! { img { src: "{src}", alt: "{alt}" } },
        Inline::SoftBreak => rsx! { " " },
        Inline::HardBreak => rsx! { br {} },
    }
}

/// Grid of document tiles under a bot reply.
#[component]
pub fn DocumentGalleryView(gallery: DocumentGallery) -> Element {
    rsx! {
        div { class: "documentos-container",
            p { class: "documentos-heading", "{gallery.heading}" }
            div { class: "documentos-grid",
                for tile in gallery.tiles.iter() {
                    a {
                        class: "documento-tile",
                        key: "{tile.href}",
                        href: "{tile.href}",
                        target: "_blank",
                        rel: "noopener noreferrer",
                        img {
                            class: "documento-thumbnail",
                            src: "{tile.thumbnail}",
                            alt: "{tile.thumbnail_alt}",
                        }
                        span { class: "documento-name", "{tile.name}" }
                    }
                }
            }
        }
    }
}
