//! Wire types for the generation backend.

use serde::{Deserialize, Serialize};

/// Where a media file lives on the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Output,
    Input,
    /// File resolved from a path on the backend host rather than the
    /// generation engine's output folders.
    Local,
}

/// Handle to a generated or uploaded asset. Retrieval URLs are built
/// from these fields, never from raw paths.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaDescriptor {
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub subfolder: String,
    #[serde(rename = "type", default)]
    pub kind: MediaKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_path: Option<String>,
    /// Inline browser-local image that never touched the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_id: Option<String>,
}

impl MediaDescriptor {
    pub fn output(filename: impl Into<String>, subfolder: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            subfolder: subfolder.into(),
            kind: MediaKind::Output,
            ..Self::default()
        }
    }

    /// Retrieval URL for this asset:
    /// `{base}/api/image/{filename}?subfolder=&type=[&local_path=][&format=][&download=1]`.
    pub fn url(&self, base_url: &str, download: bool) -> String {
        let base = base_url.trim_end_matches('/');
        let kind = match self.kind {
            MediaKind::Output => "output",
            MediaKind::Input => "input",
            MediaKind::Local => "local",
        };
        let mut url = format!(
            "{base}/api/image/{}?subfolder={}&type={kind}",
            urlencoding::encode(&self.filename),
            urlencoding::encode(&self.subfolder),
        );
        if let Some(local_path) = &self.local_path {
            url.push_str(&format!("&local_path={}", urlencoding::encode(local_path)));
        }
        if let Some(format) = &self.format {
            url.push_str(&format!("&format={}", urlencoding::encode(format)));
        }
        if download {
            url.push_str("&download=1");
        }
        url
    }
}

/// Image generation mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    #[default]
    Generate,
    /// Rework an existing image; requires a source image.
    Edit,
}

impl std::fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Generate => write!(f, "generate"),
            Self::Edit => write!(f, "edit"),
        }
    }
}

/// Image model selection, only meaningful in generate mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Model {
    #[default]
    Lumina,
    Chroma,
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lumina => write!(f, "lumina"),
            Self::Chroma => write!(f, "chroma"),
        }
    }
}

impl std::str::FromStr for Model {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lumina" => Ok(Self::Lumina),
            "chroma" => Ok(Self::Chroma),
            other => Err(format!("unknown model: {other}")),
        }
    }
}

/// `POST /api/generate` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
    pub width: u32,
    pub height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<u32>,
    /// 32-bit unsigned seed; the backend draws one when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u32>,
    pub mode: GenerationMode,
    pub model: Model,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<MediaDescriptor>,
}

/// `POST /api/generate` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub images: Vec<MediaDescriptor>,
    #[serde(default)]
    pub error: Option<String>,
}

/// `POST /api/generate-video` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoRequest {
    pub prompt: String,
    pub image: MediaDescriptor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fps: Option<u32>,
    #[serde(default)]
    pub nsfw: bool,
    #[serde(default)]
    pub no_sound: bool,
}

/// `POST /api/generate-video` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub videos: Vec<MediaDescriptor>,
    #[serde(default)]
    pub prompt_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// `POST /api/video/extend` body. Width and height default to the base
/// video's own resolution when omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtendVideoRequest {
    pub prompt: String,
    pub video: MediaDescriptor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
    #[serde(default)]
    pub nsfw: bool,
}

/// `POST /api/video/extend` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtendVideoResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub frame_image: Option<MediaDescriptor>,
    #[serde(default)]
    pub generated_video: Option<MediaDescriptor>,
    #[serde(default)]
    pub combined_video: Option<MediaDescriptor>,
    #[serde(default)]
    pub prompt_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// `GET /api/tags/{category}` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TagsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// `POST /api/improve-prompt` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImprovePromptResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub improved_prompt: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// `POST /api/convert-to-natural-language` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NaturalLanguageResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub natural_language_prompt: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}
