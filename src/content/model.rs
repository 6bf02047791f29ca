use serde::{Deserialize, Deserializer};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    Other,
}

impl MediaKind {
    fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "image" => Self::Image,
            "video" => Self::Video,
            _ => Self::Other,
        }
    }
}

/// A missing, null or blank `type` all mean the entry has no kind.
fn media_kind<'de, D>(deserializer: D) -> Result<Option<MediaKind>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(MediaKind::from_name))
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct MediaRecord {
    #[serde(default, rename = "type", deserialize_with = "media_kind")]
    pub kind: Option<MediaKind>,
    #[serde(default)]
    pub src: String,
    #[serde(default)]
    pub alt: String,
    #[serde(default)]
    pub width: Option<f32>,
    #[serde(default)]
    pub height: Option<f32>,
}

impl MediaRecord {
    pub fn is_valid(&self) -> bool {
        self.kind.is_some() && !self.src.trim().is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DescriptionText {
    Text(String),
    Paragraphs(Vec<String>),
}

impl Default for DescriptionText {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl DescriptionText {
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Paragraphs(paragraphs) => paragraphs.join("\n\n"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ProjectRecord {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: DescriptionText,
    #[serde(default)]
    pub media: Vec<MediaRecord>,
}

impl ProjectRecord {
    pub fn valid_media(&self) -> Vec<MediaRecord> {
        self.media
            .iter()
            .filter(|media| media.is_valid())
            .cloned()
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ContactRecord {
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub(super) struct ContactsFile {
    #[serde(default)]
    pub(super) items: Vec<ContactRecord>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct AboutRecord {
    #[serde(default)]
    pub text: String,
}
