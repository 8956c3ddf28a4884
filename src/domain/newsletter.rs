use serde::{Deserialize, Serialize};

/// One annotated run of text, mirroring the Notion rich-text shape the
/// editor and player both understand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichTextElement {
    #[serde(rename = "type")]
    pub element_type: String,
    pub text: RichTextContent,
    pub annotations: RichTextAnnotations,
    pub plain_text: String,
    pub href: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichTextContent {
    pub content: String,
    pub link: Option<RichTextLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichTextLink {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichTextAnnotations {
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub strikethrough: bool,
    #[serde(default)]
    pub underline: bool,
    #[serde(default)]
    pub code: bool,
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_color() -> String {
    "default".to_string()
}

impl Default for RichTextAnnotations {
    fn default() -> Self {
        Self {
            bold: false,
            italic: false,
            strikethrough: false,
            underline: false,
            code: false,
            color: default_color(),
        }
    }
}

impl RichTextElement {
    /// An unannotated run. The Supabase adapter wraps stored HTML in a
    /// single one of these so the renderer detects and renders it directly.
    pub fn plain(content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            element_type: "text".to_string(),
            text: RichTextContent {
                content: content.clone(),
                link: None,
            },
            annotations: RichTextAnnotations::default(),
            plain_text: content,
            href: None,
        }
    }

    pub fn bold(content: impl Into<String>) -> Self {
        let mut element = Self::plain(content);
        element.annotations.bold = true;
        element
    }
}

/// The persisted magnet page record. Created out-of-band (seeded directly
/// in the document store), mutated only through partial updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Newsletter {
    pub id: String,
    pub template_key: String,
    pub title: String,
    pub author: String,
    /// HTML (or legacy plain text).
    pub content: String,
    pub content_rich_text: Vec<RichTextElement>,
    pub time: String,
    pub annual_price: String,
    pub monthly_price: String,
    pub cta_text: String,
    pub benefits: Vec<String>,
    pub consume: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tts_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benefits_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consume_prompt: Option<String>,
}

/// Field-level partial update. `None` means "leave unchanged"; updates are
/// last-writer-wins overwrites of the named fields only.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsletterPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub content: Option<String>,
    pub time: Option<String>,
    pub annual_price: Option<String>,
    pub monthly_price: Option<String>,
    pub cta_text: Option<String>,
    pub benefits: Option<Vec<String>>,
    pub consume: Option<String>,
    pub tts_url: Option<String>,
    pub benefits_prompt: Option<String>,
    pub consume_prompt: Option<String>,
}

impl NewsletterPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.content.is_none()
            && self.time.is_none()
            && self.annual_price.is_none()
            && self.monthly_price.is_none()
            && self.cta_text.is_none()
            && self.benefits.is_none()
            && self.consume.is_none()
            && self.tts_url.is_none()
            && self.benefits_prompt.is_none()
            && self.consume_prompt.is_none()
    }
}
