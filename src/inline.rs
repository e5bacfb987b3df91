use std::borrow::Cow;

use percent_encoding::percent_decode_str;

use crate::block::{Emphasis, RichText, TextElement};
use crate::render::RenderContext;

/// A rendered element, with bold runs kept apart so adjacent ones can merge.
enum Fragment {
    Bold(String),
    Markup(String),
}

/// Render the inline elements of one block, terminated by a single newline.
///
/// Consecutive bold runs are merged into one bold span: each run's inner text
/// is trimmed, a whitespace boundary between runs collapses to one space, and
/// whitespace at the outer edges of the merged span is moved outside the
/// markers.
pub fn render_inline(text: &RichText, ctx: RenderContext) -> String {
    let inline = text.elements.len() > 1;
    let mut out = String::new();
    let mut fragments = text
        .elements
        .iter()
        .map(|element| render_element(element, inline, ctx))
        .peekable();

    while let Some(fragment) = fragments.next() {
        match fragment {
            Fragment::Markup(markup) => out.push_str(&markup),
            Fragment::Bold(content) => {
                let leading = content.starts_with(char::is_whitespace);
                let mut merged = content.trim().to_string();
                let mut trailing = !merged.is_empty() && content.ends_with(char::is_whitespace);
                let mut gap = trailing;

                while let Some(Fragment::Bold(next)) =
                    fragments.next_if(|f| matches!(f, Fragment::Bold(_)))
                {
                    let trimmed = next.trim();
                    if trimmed.is_empty() {
                        gap |= !next.is_empty();
                        trailing = gap;
                        continue;
                    }
                    if !merged.is_empty() && (gap || next.starts_with(char::is_whitespace)) {
                        merged.push(' ');
                    }
                    merged.push_str(trimmed);
                    trailing = next.ends_with(char::is_whitespace);
                    gap = trailing;
                }

                if leading {
                    out.push(' ');
                }
                if !merged.is_empty() {
                    let (open, close) = bold_markers(ctx);
                    out.push_str(open);
                    out.push_str(&merged);
                    out.push_str(close);
                }
                if trailing {
                    out.push(' ');
                }
            }
        }
    }

    out.push('\n');
    out
}

fn bold_markers(ctx: RenderContext) -> (&'static str, &'static str) {
    if ctx.use_html_tags {
        ("<strong>", "</strong>")
    } else {
        ("**", "**")
    }
}

fn render_element(element: &TextElement, inline: bool, ctx: RenderContext) -> Fragment {
    match element {
        TextElement::Run { content, style } => match style.primary() {
            Some(Emphasis::Bold) => Fragment::Bold(content.clone()),
            Some(emphasis) => Fragment::Markup(wrap(content, emphasis, ctx)),
            None => Fragment::Markup(content.clone()),
        },
        TextElement::MentionUser { user_id } => Fragment::Markup(user_id.clone()),
        TextElement::MentionDoc { title, url } => {
            Fragment::Markup(format!("[{}]({})", title, unescape_url(url)))
        }
        TextElement::Equation { content } => {
            let symbol = if inline { "$" } else { "$$" };
            let content = content.strip_suffix('\n').unwrap_or(content.as_str());
            Fragment::Markup(format!("{symbol}{content}{symbol}"))
        }
        TextElement::Unsupported => Fragment::Markup(String::new()),
    }
}

fn wrap(content: &str, emphasis: Emphasis<'_>, ctx: RenderContext) -> String {
    let html = ctx.use_html_tags;
    match emphasis {
        Emphasis::Bold => unreachable!("bold runs are coalesced, never wrapped singly"),
        Emphasis::Italic if html => format!("<em>{content}</em>"),
        Emphasis::Italic => format!("_{content}_"),
        Emphasis::Strikethrough if html => format!("<del>{content}</del>"),
        Emphasis::Strikethrough => format!("~~{content}~~"),
        Emphasis::Underline => format!("<u>{content}</u>"),
        Emphasis::InlineCode => format!("`{content}`"),
        Emphasis::Link(url) => format!("[{content}]({})", unescape_url(url)),
    }
}

/// Percent-decode a URL as delivered by the docx API.
pub fn unescape_url(url: &str) -> Cow<'_, str> {
    percent_decode_str(url).decode_utf8_lossy()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{Link, TextStyle};

    const MD: RenderContext = RenderContext {
        use_html_tags: false,
        one_page: false,
    };
    const HTML: RenderContext = RenderContext {
        use_html_tags: true,
        one_page: false,
    };

    fn bold() -> TextStyle {
        TextStyle {
            bold: true,
            ..TextStyle::default()
        }
    }

    fn italic() -> TextStyle {
        TextStyle {
            italic: true,
            ..TextStyle::default()
        }
    }

    fn render(elements: Vec<TextElement>, ctx: RenderContext) -> String {
        render_inline(&RichText::new(elements), ctx)
    }

    #[test]
    fn plain_run() {
        assert_eq!(render(vec![TextElement::plain("hello")], MD), "hello\n");
    }

    #[test]
    fn empty_text_is_a_bare_newline() {
        assert_eq!(render(vec![], MD), "\n");
    }

    #[test]
    fn single_style_per_run() {
        let cases = [
            (bold(), "**x**\n", "<strong>x</strong>\n"),
            (italic(), "_x_\n", "<em>x</em>\n"),
            (
                TextStyle {
                    strikethrough: true,
                    ..TextStyle::default()
                },
                "~~x~~\n",
                "<del>x</del>\n",
            ),
            (
                TextStyle {
                    underline: true,
                    ..TextStyle::default()
                },
                "<u>x</u>\n",
                "<u>x</u>\n",
            ),
            (
                TextStyle {
                    inline_code: true,
                    ..TextStyle::default()
                },
                "`x`\n",
                "`x`\n",
            ),
        ];
        for (style, markdown, html) in cases {
            let elements = vec![TextElement::run("x", style)];
            assert_eq!(render(elements.clone(), MD), markdown);
            assert_eq!(render(elements, HTML), html);
        }
    }

    #[test]
    fn priority_drops_lower_styles() {
        let style = TextStyle {
            italic: true,
            underline: true,
            link: Some(Link {
                url: "https://a.b".to_string(),
            }),
            ..TextStyle::default()
        };
        assert_eq!(render(vec![TextElement::run("x", style)], MD), "_x_\n");
    }

    #[test]
    fn link_url_is_unescaped() {
        let style = TextStyle {
            link: Some(Link {
                url: "https%3A%2F%2Fexample.com%2Fa%3Fb%3D1".to_string(),
            }),
            ..TextStyle::default()
        };
        assert_eq!(
            render(vec![TextElement::run("site", style)], MD),
            "[site](https://example.com/a?b=1)\n"
        );
    }

    #[test]
    fn mentions() {
        let elements = vec![
            TextElement::MentionUser {
                user_id: "ou_42".to_string(),
            },
            TextElement::plain(" see "),
            TextElement::MentionDoc {
                title: "Guide".to_string(),
                url: "https%3A%2F%2Fx.feishu.cn%2Fdocx%2Fabc".to_string(),
            },
        ];
        assert_eq!(
            render(elements, MD),
            "ou_42 see [Guide](https://x.feishu.cn/docx/abc)\n"
        );
    }

    #[test]
    fn equation_inline_or_display() {
        let equation = TextElement::Equation {
            content: "a+b\n".to_string(),
        };
        assert_eq!(render(vec![equation.clone()], MD), "$$a+b$$\n");
        assert_eq!(
            render(vec![TextElement::plain("sum "), equation], MD),
            "sum $a+b$\n"
        );
    }

    #[test]
    fn adjacent_bold_runs_coalesce() {
        let elements = vec![
            TextElement::run("foo ", bold()),
            TextElement::run(" bar", bold()),
        ];
        assert_eq!(render(elements, MD), "**foo bar**\n");
    }

    #[test]
    fn bold_runs_split_mid_word_join_directly() {
        let elements = vec![
            TextElement::run("Rust", bold()),
            TextElement::run("acean", bold()),
            TextElement::run("s", bold()),
        ];
        assert_eq!(render(elements, MD), "**Rustaceans**\n");
        let elements = vec![TextElement::run("a", bold()), TextElement::run("b", bold())];
        assert_eq!(render(elements, HTML), "<strong>ab</strong>\n");
    }

    #[test]
    fn separated_or_differently_styled_runs_do_not_merge() {
        let elements = vec![
            TextElement::run("one", bold()),
            TextElement::plain(" and "),
            TextElement::run("two", bold()),
            TextElement::run("three", italic()),
        ];
        assert_eq!(render(elements, MD), "**one** and **two**_three_\n");
    }

    #[test]
    fn bold_edge_whitespace_moves_outside_markers() {
        let elements = vec![
            TextElement::plain("say"),
            TextElement::run(" hello ", bold()),
            TextElement::plain("now"),
        ];
        assert_eq!(render(elements, MD), "say **hello** now\n");
    }
}
