use serde::Deserialize;
use serde_json::{Map, Value};

/// A link attached to a text run
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Link {
    pub url: String,
}

/// Inline formatting flags carried by a text run
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TextStyle {
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub underline: bool,
    pub inline_code: bool,
    pub link: Option<Link>,
}

/// The single style a run is rendered with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emphasis<'a> {
    Bold,
    Italic,
    Strikethrough,
    Underline,
    InlineCode,
    Link(&'a str),
}

impl TextStyle {
    /// Resolve the flags to one style: bold > italic > strikethrough >
    /// underline > inline code > link. Lower-priority flags are dropped.
    pub fn primary(&self) -> Option<Emphasis<'_>> {
        if self.bold {
            Some(Emphasis::Bold)
        } else if self.italic {
            Some(Emphasis::Italic)
        } else if self.strikethrough {
            Some(Emphasis::Strikethrough)
        } else if self.underline {
            Some(Emphasis::Underline)
        } else if self.inline_code {
            Some(Emphasis::InlineCode)
        } else {
            self.link.as_ref().map(|link| Emphasis::Link(&link.url))
        }
    }
}

/// Inline atomic unit inside a text-bearing block
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawElement")]
pub enum TextElement {
    Run { content: String, style: TextStyle },
    MentionUser { user_id: String },
    MentionDoc { title: String, url: String },
    Equation { content: String },
    /// Element kinds this converter does not render (reminders, files, ...)
    Unsupported,
}

impl TextElement {
    pub fn run(content: impl Into<String>, style: TextStyle) -> Self {
        TextElement::Run {
            content: content.into(),
            style,
        }
    }

    pub fn plain(content: impl Into<String>) -> Self {
        Self::run(content, TextStyle::default())
    }
}

/// Ordered inline elements of one text-bearing block
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RichText {
    pub elements: Vec<TextElement>,
}

impl RichText {
    pub fn new(elements: Vec<TextElement>) -> Self {
        Self { elements }
    }

    /// Raw textual content with all formatting discarded.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for element in &self.elements {
            match element {
                TextElement::Run { content, .. } | TextElement::Equation { content } => {
                    out.push_str(content)
                }
                TextElement::MentionUser { user_id } => out.push_str(user_id),
                TextElement::MentionDoc { title, .. } => out.push_str(title),
                TextElement::Unsupported => {}
            }
        }
        out
    }
}

/// Table geometry and its cell block ids in row-major order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub cells: Vec<String>,
    pub column_size: usize,
    pub row_size: usize,
}

/// Type tag plus type-specific payload of a block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Page(RichText),
    Text(RichText),
    Heading { level: u8, text: RichText },
    Bullet(RichText),
    Ordered(RichText),
    Code { language: u16, text: RichText },
    Quote(RichText),
    Equation(RichText),
    Todo { done: bool, text: RichText },
    Divider,
    Image { token: String },
    Table(Table),
    TableCell,
    QuoteContainer,
    /// Block types outside the supported set, keyed by their numeric tag
    Unsupported(u16),
}

/// A node of the document tree; children are referenced by id
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawBlock")]
pub struct Block {
    pub id: String,
    pub parent_id: Option<String>,
    pub children: Vec<String>,
    pub kind: BlockKind,
}

impl Block {
    pub fn new(id: impl Into<String>, kind: BlockKind) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
            children: Vec::new(),
            kind,
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_children<I, S>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.children = children.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_ordered(&self) -> bool {
        matches!(self.kind, BlockKind::Ordered(_))
    }
}

/// Root descriptor of a fetched document
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Document {
    pub document_id: String,
    #[serde(default)]
    pub title: String,
}

/// One document descriptor together with its flat block list
#[derive(Debug, Clone, Deserialize)]
pub struct Snapshot {
    pub document: Document,
    pub blocks: Vec<Block>,
}

// Wire representation of the docx API payloads.

#[derive(Deserialize)]
struct RawElement {
    text_run: Option<RawTextRun>,
    mention_user: Option<RawMentionUser>,
    mention_doc: Option<RawMentionDoc>,
    equation: Option<RawEquation>,
}

#[derive(Deserialize)]
struct RawTextRun {
    #[serde(default)]
    content: String,
    #[serde(default)]
    text_element_style: TextStyle,
}

#[derive(Deserialize)]
struct RawMentionUser {
    user_id: String,
}

#[derive(Deserialize)]
struct RawMentionDoc {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
}

#[derive(Deserialize)]
struct RawEquation {
    #[serde(default)]
    content: String,
}

impl From<RawElement> for TextElement {
    fn from(raw: RawElement) -> Self {
        if let Some(run) = raw.text_run {
            TextElement::Run {
                content: run.content,
                style: run.text_element_style,
            }
        } else if let Some(mention) = raw.mention_user {
            TextElement::MentionUser {
                user_id: mention.user_id,
            }
        } else if let Some(mention) = raw.mention_doc {
            TextElement::MentionDoc {
                title: mention.title,
                url: mention.url,
            }
        } else if let Some(equation) = raw.equation {
            TextElement::Equation {
                content: equation.content,
            }
        } else {
            TextElement::Unsupported
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawTextBlockStyle {
    language: u16,
    done: bool,
}

#[derive(Deserialize)]
struct RawText {
    #[serde(default)]
    elements: Vec<TextElement>,
    #[serde(default)]
    style: RawTextBlockStyle,
}

#[derive(Deserialize)]
struct RawImage {
    token: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawTableProperty {
    column_size: usize,
    row_size: usize,
}

#[derive(Deserialize)]
struct RawTable {
    #[serde(default)]
    cells: Vec<String>,
    #[serde(default)]
    property: RawTableProperty,
}

#[derive(Deserialize)]
struct RawBlock {
    block_id: String,
    #[serde(default)]
    parent_id: String,
    #[serde(default)]
    children: Vec<String>,
    block_type: u16,
    #[serde(flatten)]
    payload: Map<String, Value>,
}

const HEADING_FIELDS: [&str; 9] = [
    "heading1", "heading2", "heading3", "heading4", "heading5", "heading6", "heading7",
    "heading8", "heading9",
];

impl RawBlock {
    fn payload<T: serde::de::DeserializeOwned>(&mut self, field: &str) -> Result<T, String> {
        let value = self.payload.remove(field).ok_or_else(|| {
            format!(
                "block {} (type {}) has no `{field}` payload",
                self.block_id, self.block_type
            )
        })?;
        serde_json::from_value(value)
            .map_err(|e| format!("block {}: invalid `{field}` payload: {e}", self.block_id))
    }

    fn text(&mut self, field: &str) -> Result<RichText, String> {
        self.payload::<RawText>(field)
            .map(|raw| RichText::new(raw.elements))
    }
}

impl TryFrom<RawBlock> for Block {
    type Error = String;

    fn try_from(mut raw: RawBlock) -> Result<Self, Self::Error> {
        let kind = match raw.block_type {
            1 => BlockKind::Page(raw.text("page")?),
            2 => BlockKind::Text(raw.text("text")?),
            n @ 3..=11 => {
                let level = (n - 2) as u8;
                let text = raw.text(HEADING_FIELDS[usize::from(level) - 1])?;
                BlockKind::Heading { level, text }
            }
            12 => BlockKind::Bullet(raw.text("bullet")?),
            13 => BlockKind::Ordered(raw.text("ordered")?),
            14 => {
                let code: RawText = raw.payload("code")?;
                BlockKind::Code {
                    language: code.style.language,
                    text: RichText::new(code.elements),
                }
            }
            15 => BlockKind::Quote(raw.text("quote")?),
            16 => BlockKind::Equation(raw.text("equation")?),
            17 => {
                let todo: RawText = raw.payload("todo")?;
                BlockKind::Todo {
                    done: todo.style.done,
                    text: RichText::new(todo.elements),
                }
            }
            22 => BlockKind::Divider,
            27 => {
                let image: RawImage = raw.payload("image")?;
                BlockKind::Image { token: image.token }
            }
            31 => {
                let table: RawTable = raw.payload("table")?;
                BlockKind::Table(Table {
                    cells: table.cells,
                    column_size: table.property.column_size,
                    row_size: table.property.row_size,
                })
            }
            32 => BlockKind::TableCell,
            34 => BlockKind::QuoteContainer,
            other => BlockKind::Unsupported(other),
        };

        Ok(Block {
            id: raw.block_id,
            parent_id: Some(raw.parent_id).filter(|id| !id.is_empty()),
            children: raw.children,
            kind,
        })
    }
}
