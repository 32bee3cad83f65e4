use serde::{Deserialize, Serialize};

/// Represents the author of a message or turn in a conversation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions from the system
    System,
    /// Instructions from the developer (OpenAI "developer" role)
    Developer,
    /// Message from the user
    User,
    /// Message from the assistant
    #[default]
    Assistant,
    /// Legacy function-result role
    Function,
    /// Message from a tool
    Tool,
}

impl Role {
    /// Returns a string representation of the role
    ///
    /// # Examples
    ///
    /// ```
    /// use inference_bridge_core::content::Role;
    ///
    /// assert_eq!(Role::Developer.as_str(), "developer");
    /// ```
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::Developer => "developer",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Function => "function",
            Role::Tool => "tool",
        }
    }
}

/// Lifecycle status of a turn as reported by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Status {
    InProgress,
    Completed,
    Incomplete,
    Failed,
    Cancelled,
    Queued,
    Searching,
}

/// Prompt-caching hint attached to a turn or tool declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CacheControl {
    /// Ephemeral cache entry with an optional TTL such as `"5m"` or `"1h"`
    Ephemeral {
        #[serde(default, skip_serializing_if = "String::is_empty")]
        ttl: String,
    },
}

impl CacheControl {
    /// Ephemeral cache hint without an explicit TTL
    pub fn ephemeral() -> Self {
        CacheControl::Ephemeral { ttl: String::new() }
    }
}

/// A reference from generated text back to a source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Citation {
    #[serde(rename = "urlCitation")]
    Url(UrlCitation),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlCitation {
    pub url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cited_text: String,
    // Inclusiveness and byte-vs-char semantics differ between vendors.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub start_index: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub end_index: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub encrypted_index: String,
}

fn is_zero(v: &i64) -> bool {
    *v == 0
}

/// Whether the provider should produce citations for a document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationConfig {
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextItem {
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub citations: Vec<Citation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefusalItem {
    pub refusal: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageDetail {
    High,
    Low,
    Auto,
}

/// An image referenced by provider id, by URL, or carried inline as base64
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageItem {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<ImageDetail>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub image_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty", rename = "imageMIME")]
    pub image_mime: String,
    #[serde(default, skip_serializing_if = "String::is_empty", rename = "imageURL")]
    pub image_url: String,
    /// Base64 encoded data.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub image_data: String,
}

/// A document referenced by provider id, by URL, or carried inline as base64
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileItem {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub file_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty", rename = "fileMIME")]
    pub file_mime: String,
    #[serde(default, skip_serializing_if = "String::is_empty", rename = "fileURL")]
    pub file_url: String,
    /// Base64 encoded data.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub file_data: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub additional_context: String,
    #[serde(default)]
    pub citation_config: Option<CitationConfig>,
}

/// One piece of message content
///
/// Serialized with a `kind` discriminant next to the payload fields, so the
/// tag and the payload can never disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ContentItem {
    Text(TextItem),
    Refusal(RefusalItem),
    Image(ImageItem),
    File(FileItem),
}

impl ContentItem {
    /// Creates a plain text item without citations
    ///
    /// # Examples
    ///
    /// ```
    /// use inference_bridge_core::content::ContentItem;
    ///
    /// let item = ContentItem::text("Hello, world!");
    /// assert!(matches!(item, ContentItem::Text(t) if t.text == "Hello, world!"));
    /// ```
    pub fn text(text: impl Into<String>) -> Self {
        ContentItem::Text(TextItem {
            text: text.into(),
            citations: Vec::new(),
        })
    }

    pub fn refusal(refusal: impl Into<String>) -> Self {
        ContentItem::Refusal(RefusalItem {
            refusal: refusal.into(),
        })
    }

    /// Creates an image item pointing at a URL
    pub fn image_url(url: impl Into<String>) -> Self {
        ContentItem::Image(ImageItem {
            image_url: url.into(),
            ..Default::default()
        })
    }

    /// Returns the text of a text item, if this is one
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentItem::Text(t) => Some(&t.text),
            _ => None,
        }
    }
}

/// A conversational message: an ordered list of content items from one author
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputOutputContent {
    #[serde(default)]
    pub id: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<CacheControl>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contents: Vec<ContentItem>,
}

impl InputOutputContent {
    /// Creates a message with the given role and content items
    pub fn new(role: Role, contents: Vec<ContentItem>) -> Self {
        Self {
            id: String::new(),
            role,
            status: None,
            cache_control: None,
            contents,
        }
    }

    /// Sets the identifier and returns self for method chaining
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    #[must_use]
    pub fn with_cache_control(mut self, cache_control: CacheControl) -> Self {
        self.cache_control = Some(cache_control);
        self
    }

    /// Concatenates the text items of this message, separated by newlines
    pub fn joined_text(&self) -> String {
        self.contents
            .iter()
            .filter_map(ContentItem::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Reasoning ("thinking") produced by a model, replayable in later turns
///
/// The four string sequences are independent; a vendor typically fills only
/// one or two of them. `signature` authenticates `thinking` for providers that
/// require signed reasoning to be sent back verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReasoningContent {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<CacheControl>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub signature: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub summary: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub thinking: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub redacted_thinking: Vec<String>,
    /// Opaque encrypted reasoning (OpenAI responses `reasoning.encrypted_content`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub encrypted_content: Vec<String>,
}

impl ReasoningContent {
    /// Signed thinking: a signature plus the thinking text it covers
    ///
    /// # Examples
    ///
    /// ```
    /// use inference_bridge_core::content::ReasoningContent;
    ///
    /// let r = ReasoningContent::signed("sig-abc", "Let me check the weather first.");
    /// assert_eq!(r.thinking.len(), 1);
    /// ```
    pub fn signed(signature: impl Into<String>, thinking: impl Into<String>) -> Self {
        Self {
            signature: signature.into(),
            thinking: vec![thinking.into()],
            ..Default::default()
        }
    }

    /// Redacted thinking as returned by the provider
    pub fn redacted(data: impl Into<String>) -> Self {
        Self {
            redacted_thinking: vec![data.into()],
            ..Default::default()
        }
    }

    /// Plain, unsigned thinking text (e.g. from another vendor)
    pub fn unsigned(thinking: impl Into<String>) -> Self {
        Self {
            thinking: vec![thinking.into()],
            ..Default::default()
        }
    }

    pub fn summary(summary: impl Into<String>) -> Self {
        Self {
            summary: vec![summary.into()],
            ..Default::default()
        }
    }
}
