use tracing::{debug, warn};

use crate::doc_url::DocumentUrl;
use crate::error::{Error, Result};
use crate::render::{RenderContext, Rendered};

/// Fetch-and-render capability used to inline chapter links.
///
/// Implementations fetch the linked document and render it as a chapter: the
/// page title as plain text on the first line, followed by its blocks.
pub trait ChapterResolver {
    fn resolve(&self, url: &DocumentUrl, ctx: RenderContext) -> Result<Rendered>;
}

/// Resolver for conversions with no document source; every link fails.
pub struct NoChapters;

impl ChapterResolver for NoChapters {
    fn resolve(&self, url: &DocumentUrl, _ctx: RenderContext) -> Result<Rendered> {
        Err(Error::SnapshotNotFound(url.to_string()))
    }
}

/// Extract the target of heading text shaped exactly like `[title](url)`
/// where `url` is a recognized document URL.
pub fn chapter_link(heading: &str) -> Option<DocumentUrl> {
    let link = heading.trim();
    if !link.starts_with('[') || !link.ends_with(')') {
        return None;
    }
    let close = link.find(']')?;
    let open = link.find('(')?;
    if close == 0 || open != close + 1 {
        return None;
    }

    let text = &link[1..close];
    let url = &link[open + 1..link.len() - 1];
    if text.is_empty() || url.is_empty() {
        return None;
    }
    url.parse().ok()
}

pub(crate) enum Substitution {
    NotAChapter,
    Chapter(Rendered),
    Dropped,
}

/// Decide what replaces a heading body in one-page mode.
pub(crate) fn substitute(
    heading: &str,
    ctx: RenderContext,
    resolver: &dyn ChapterResolver,
) -> Substitution {
    if !ctx.one_page {
        return Substitution::NotAChapter;
    }
    let Some(url) = chapter_link(heading) else {
        return Substitution::NotAChapter;
    };

    debug!(url = %url, "expanding chapter link");
    match resolver.resolve(&url, ctx) {
        Ok(chapter) => Substitution::Chapter(chapter),
        Err(err) => {
            warn!(url = %url, error = %err, "dropping unresolvable chapter link");
            Substitution::Dropped
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_document_links() {
        let url = chapter_link("[Intro](https://x.feishu.cn/docx/abc123)\n").unwrap();
        assert_eq!(url.token(), "abc123");
        assert!(chapter_link("  [Wiki](https://t.larksuite.com/wiki/W1)  ").is_some());
    }

    #[test]
    fn rejects_non_links() {
        for heading in [
            "Intro",
            "[](https://x.feishu.cn/docx/abc123)",
            "[Intro]()",
            "[Intro] (https://x.feishu.cn/docx/abc123)",
            "[Intro](https://example.com/docx/abc123)",
            "see [Intro](https://x.feishu.cn/docx/abc123)",
            "[Intro](https://x.feishu.cn/docx/abc123) later",
        ] {
            assert!(chapter_link(heading).is_none(), "{heading}");
        }
    }

    #[test]
    fn substitution_requires_one_page_mode() {
        let heading = "[Intro](https://x.feishu.cn/docx/abc123)";
        let off = RenderContext::default();
        assert!(matches!(
            substitute(heading, off, &NoChapters),
            Substitution::NotAChapter
        ));

        let on = RenderContext {
            one_page: true,
            ..RenderContext::default()
        };
        assert!(matches!(
            substitute(heading, on, &NoChapters),
            Substitution::Dropped
        ));
        assert!(matches!(
            substitute("Plain", on, &NoChapters),
            Substitution::NotAChapter
        ));
    }
}
