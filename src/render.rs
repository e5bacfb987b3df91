use tracing::{debug, warn};

use crate::block::{Block, BlockKind, Document, RichText, Table};
use crate::chapter::{self, ChapterResolver, Substitution};
use crate::code_lang::fence_language;
use crate::error::Result;
use crate::index::BlockIndex;
use crate::inline::render_inline;
use crate::list;
use crate::table;

const INDENT: &str = "\t";

/// Options threaded through every recursive render call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderContext {
    /// Use `<strong>`, `<em>` and `<del>` instead of Markdown markers.
    pub use_html_tags: bool,
    /// Inline documents referenced by chapter-link headings.
    pub one_page: bool,
}

/// Output of one conversion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    pub markdown: String,
    /// Image tokens in document order, one per image block.
    pub image_tokens: Vec<String>,
}

/// Render a whole document tree to Markdown.
pub fn render_document(
    document: &Document,
    blocks: &[Block],
    ctx: RenderContext,
    resolver: &dyn ChapterResolver,
) -> Result<Rendered> {
    let mut renderer = Renderer::new(document, blocks, ctx, resolver)?;
    let root = renderer.index.root();
    let markdown = renderer.render(root, 0)?;
    Ok(renderer.finish(markdown))
}

/// Render a document as the body of a chapter-link heading.
///
/// Same as [`render_document`] except that the page title is emitted as bare
/// text so it reads as the body of the heading it replaces.
pub fn render_chapter(
    document: &Document,
    blocks: &[Block],
    ctx: RenderContext,
    resolver: &dyn ChapterResolver,
) -> Result<Rendered> {
    let mut renderer = Renderer::new(document, blocks, ctx, resolver)?;
    let root = renderer.index.root();
    let markdown = match &root.kind {
        BlockKind::Page(title) => renderer.page_body(root, title)?,
        _ => renderer.render(root, 0)?,
    };
    Ok(renderer.finish(markdown))
}

struct Renderer<'a> {
    index: BlockIndex<'a>,
    ctx: RenderContext,
    resolver: &'a dyn ChapterResolver,
    image_tokens: Vec<String>,
}

impl<'a> Renderer<'a> {
    fn new(
        document: &Document,
        blocks: &'a [Block],
        ctx: RenderContext,
        resolver: &'a dyn ChapterResolver,
    ) -> Result<Self> {
        Ok(Self {
            index: BlockIndex::build(document, blocks)?,
            ctx,
            resolver,
            image_tokens: Vec::new(),
        })
    }

    fn finish(self, markdown: String) -> Rendered {
        Rendered {
            markdown,
            image_tokens: self.image_tokens,
        }
    }

    fn text(&self, text: &RichText) -> String {
        render_inline(text, self.ctx)
    }

    fn render(&mut self, block: &'a Block, indent: usize) -> Result<String> {
        let body = match &block.kind {
            // Containers that indent every line themselves
            BlockKind::Code { language, text } => return Ok(self.code(*language, text, indent)),
            BlockKind::Table(table) => return self.table(table, indent),
            BlockKind::QuoteContainer => return self.quote_container(block, indent),
            BlockKind::TableCell => return self.children(block, 0),
            BlockKind::Unsupported(tag) => {
                debug!(block = %block.id, block_type = *tag, "skipping unsupported block");
                return Ok(String::new());
            }

            BlockKind::Page(title) => format!("# {}", self.page_body(block, title)?),
            BlockKind::Text(text) => self.text(text),
            BlockKind::Heading { level, text } => match self.heading(*level, text) {
                Some(heading) => heading,
                // Dropped chapter link: no indent, no line
                None => return Ok(String::new()),
            },
            BlockKind::Bullet(text) => {
                format!("- {}{}", self.text(text), self.children(block, indent + 1)?)
            }
            BlockKind::Ordered(text) => {
                let order = list::ordinal(&self.index, block)?;
                format!("{order}. {}{}", self.text(text), self.children(block, indent + 1)?)
            }
            BlockKind::Quote(text) => format!("> {}", self.text(text)),
            BlockKind::Equation(text) => {
                let source = text.plain_text();
                format!("$$\n{}\n$$\n", source.trim_end_matches('\n'))
            }
            BlockKind::Todo { done, text } => {
                let marker = if *done { "- [x] " } else { "- [ ] " };
                format!("{marker}{}{}", self.text(text), self.children(block, indent + 1)?)
            }
            BlockKind::Divider => "---\n".to_string(),
            BlockKind::Image { token } => {
                self.image_tokens.push(token.clone());
                format!("![]({token})\n")
            }
        };
        Ok(INDENT.repeat(indent) + &body)
    }

    /// Title line followed by every child at indent 0, each child terminated
    /// by a separating newline.
    fn page_body(&mut self, page: &'a Block, title: &RichText) -> Result<String> {
        let mut out = self.text(title);
        for child in self.index.children(page)? {
            out.push_str(&self.render(child, 0)?);
            out.push('\n');
        }
        Ok(out)
    }

    fn children(&mut self, block: &'a Block, indent: usize) -> Result<String> {
        let mut out = String::new();
        for child in self.index.children(block)? {
            out.push_str(&self.render(child, indent)?);
        }
        Ok(out)
    }

    /// `None` when a chapter link could not be resolved.
    fn heading(&mut self, level: u8, text: &RichText) -> Option<String> {
        let prefix = "#".repeat(usize::from(level));
        let body = self.text(text);
        match chapter::substitute(&body, self.ctx, self.resolver) {
            Substitution::NotAChapter => Some(format!("{prefix} {body}")),
            Substitution::Chapter(chapter) => {
                self.image_tokens.extend(chapter.image_tokens);
                Some(format!("{prefix} {}", chapter.markdown))
            }
            Substitution::Dropped => None,
        }
    }

    fn code(&self, language: u16, text: &RichText, indent: usize) -> String {
        let indent = INDENT.repeat(indent);
        let mut out = String::from("\n");
        out.push_str(&format!("{indent}```{}\n", fence_language(language)));
        for line in text.plain_text().lines() {
            out.push_str(&indent);
            out.push_str(line);
            out.push('\n');
        }
        out.push_str(&format!("{indent}```\n\n"));
        out
    }

    fn table(&mut self, table: &'a Table, indent: usize) -> Result<String> {
        if table.column_size == 0 {
            warn!("skipping table without columns");
            return Ok(String::new());
        }
        let visible = table::visible_cells(table.cells.len(), table.column_size, table.row_size);
        let mut cells = Vec::with_capacity(visible);
        for id in &table.cells[..visible] {
            let cell = self.index.get(id)?;
            cells.push(self.render(cell, 0)?.replace('\n', ""));
        }
        let rows = table::group_rows(cells, table.column_size);
        Ok(prefix_lines(&table::format_table(&rows), &INDENT.repeat(indent)))
    }

    fn quote_container(&mut self, block: &'a Block, indent: usize) -> Result<String> {
        let mut quoted = String::new();
        for child in self.index.children(block)? {
            quoted.push_str(&prefix_lines(&self.render(child, 0)?, "> "));
        }
        Ok(prefix_lines(&quoted, &INDENT.repeat(indent)))
    }
}

/// Prefix every line of `text`; blank lines get the prefix without trailing spaces.
fn prefix_lines(text: &str, prefix: &str) -> String {
    if prefix.is_empty() {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        if line == "\n" {
            out.push_str(prefix.trim_end());
        } else {
            out.push_str(prefix);
        }
        out.push_str(line);
    }
    out
}
