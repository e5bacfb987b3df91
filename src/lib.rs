//! Convert Feishu / Lark docx block trees into Markdown.
//!
//! A document arrives as a flat list of [`Block`]s plus a [`Document`]
//! descriptor naming the root. Rendering indexes the blocks, then walks the
//! tree depth-first from the root page. Image blocks are emitted as
//! `![](<token>)` and their tokens collected in [`Rendered::image_tokens`] so
//! the caller can download and rewrite them.
//!
//! With [`RenderContext::one_page`] set, headings that are exactly a link to
//! another docx/wiki document are replaced by that document, fetched through
//! an injected [`ChapterResolver`].

mod block;
mod chapter;
mod code_lang;
mod config;
mod doc_url;
mod error;
mod index;
mod inline;
mod list;
mod render;
mod source;
mod table;

pub use block::{
    Block, BlockKind, Document, Emphasis, Link, RichText, Snapshot, Table, TextElement, TextStyle,
};
pub use chapter::{ChapterResolver, NoChapters, chapter_link};
pub use code_lang::fence_language;
pub use config::{Config, LogConfig, OutputConfig, SourceConfig};
pub use doc_url::{DocKind, DocumentUrl, Domain};
pub use error::{Error, Result};
pub use render::{RenderContext, Rendered, render_chapter, render_document};
pub use source::{DocumentSource, SnapshotDir, SnapshotResolver, load_snapshot};

/// Convert a snapshot JSON string to Markdown with no source for chapter links.
pub fn json_to_markdown(json: &str, ctx: RenderContext) -> Result<Rendered> {
    let snapshot: Snapshot = serde_json::from_str(json)?;
    render_document(&snapshot.document, &snapshot.blocks, ctx, &NoChapters)
}
