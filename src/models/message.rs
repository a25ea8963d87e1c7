use serde::{Deserialize, Serialize};

pub type ItemId = i64;

/// Kind of item in a conversation feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    #[default]
    Message,
    Thread,
    Update,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Message => "message",
            ItemType::Thread => "thread",
            ItemType::Update => "update",
        }
    }
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Who produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemSource {
    Bot,
    #[default]
    User,
}

impl ItemSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemSource::Bot => "bot",
            ItemSource::User => "user",
        }
    }
}

impl std::fmt::Display for ItemSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Points at a neighbouring item in the feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub id: ItemId,
}

/// Media or data attached to a message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Attachment {
    Image {
        url: String,
        #[serde(default)]
        alt: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
    Audio {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
    Video {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
    Location {
        lat: f64,
        long: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
    FileDownload {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
}

impl Attachment {
    pub fn image(url: impl Into<String>, alt: impl Into<String>) -> Self {
        Attachment::Image {
            url: url.into(),
            alt: alt.into(),
            title: None,
            text: None,
        }
    }

    pub fn audio(url: impl Into<String>) -> Self {
        Attachment::Audio {
            url: url.into(),
            title: None,
            text: None,
        }
    }

    pub fn video(url: impl Into<String>) -> Self {
        Attachment::Video {
            url: url.into(),
            title: None,
            text: None,
        }
    }

    pub fn location(lat: f64, long: f64) -> Self {
        Attachment::Location {
            lat,
            long,
            title: None,
            text: None,
        }
    }

    pub fn file_download(url: impl Into<String>) -> Self {
        Attachment::FileDownload {
            url: url.into(),
            text: None,
        }
    }

    /// Set the title; file downloads carry no title and are left unchanged
    pub fn with_title(mut self, value: impl Into<String>) -> Self {
        match &mut self {
            Attachment::Image { title, .. }
            | Attachment::Audio { title, .. }
            | Attachment::Video { title, .. }
            | Attachment::Location { title, .. } => *title = Some(value.into()),
            Attachment::FileDownload { .. } => {}
        }
        self
    }

    pub fn with_text(mut self, value: impl Into<String>) -> Self {
        match &mut self {
            Attachment::Image { text, .. }
            | Attachment::Audio { text, .. }
            | Attachment::Video { text, .. }
            | Attachment::Location { text, .. }
            | Attachment::FileDownload { text, .. } => *text = Some(value.into()),
        }
        self
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Attachment::Image { .. } => "image",
            Attachment::Audio { .. } => "audio",
            Attachment::Video { .. } => "video",
            Attachment::Location { .. } => "location",
            Attachment::FileDownload { .. } => "file_download",
        }
    }
}

/// A single chat message as it travels over the socket
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub source: ItemSource,
    #[serde(rename = "type", default)]
    pub item_type: ItemType,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<ItemId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_id: Option<ItemId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ItemId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<Cursor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<Cursor>,
}

impl Message {
    /// Plain text message with the default (user) source
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::text(text).with_source(ItemSource::User)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::text(text).with_source(ItemSource::Bot)
    }

    pub fn with_source(mut self, source: ItemSource) -> Self {
        self.source = source;
        self
    }

    pub fn in_thread(mut self, thread_id: ItemId) -> Self {
        self.thread_id = Some(thread_id);
        self
    }

    pub fn reply_to(mut self, reply_id: ItemId) -> Self {
        self.reply_id = Some(reply_id);
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Bot echo of this message: same text, thread and attachments
    pub fn reply(&self) -> Self {
        Self {
            attachments: self.attachments.clone(),
            source: ItemSource::Bot,
            item_type: ItemType::Message,
            text: self.text.clone(),
            thread_id: self.thread_id,
            reply_id: self.id,
            id: None,
            prev: None,
            next: None,
        }
    }

    pub fn is_threaded(&self) -> bool {
        self.thread_id.is_some()
    }
}
