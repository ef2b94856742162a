use crate::VideoHandoff;
use api_client::{ExtendVideoRequest, GenerationApi, MediaDescriptor, VideoRequest};
use prompt::Resolution;
use std::sync::Arc;

/// Video framing preset: the image resolution used when generating the
/// still source, and the smaller resolution the video itself renders at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Square,
    Portrait,
    Landscape,
}

impl Orientation {
    pub const ALL: [Orientation; 3] = [Self::Square, Self::Portrait, Self::Landscape];

    pub fn label(self) -> &'static str {
        match self {
            Self::Square => "Square",
            Self::Portrait => "Portrait",
            Self::Landscape => "Landscape",
        }
    }

    pub fn image_resolution(self) -> Resolution {
        match self {
            Self::Square => Resolution::new(960, 960),
            Self::Portrait => Resolution::new(784, 1168),
            Self::Landscape => Resolution::new(1168, 784),
        }
    }

    pub fn video_resolution(self) -> Resolution {
        match self {
            Self::Square => Resolution::new(560, 560),
            Self::Portrait => Resolution::new(464, 688),
            Self::Landscape => Resolution::new(464, 688),
        }
    }

    /// Resolve a preset from a raw handoff string: preset name first,
    /// then image resolution, then video resolution, falling back to
    /// square.
    pub fn from_raw(raw: &str) -> Self {
        let raw = raw.trim().to_ascii_lowercase();
        for orientation in Self::ALL {
            if raw == orientation.label().to_ascii_lowercase() {
                return orientation;
            }
        }
        for orientation in Self::ALL {
            if raw == orientation.image_resolution().to_string() {
                return orientation;
            }
        }
        for orientation in Self::ALL {
            if raw == orientation.video_resolution().to_string() {
                return orientation;
            }
        }
        Self::Square
    }
}

/// State of the video-generation view: one source image, one prompt, one
/// request at a time. Validation failures and backend errors both land
/// in `last_error`; results accumulate as the video is extended.
pub struct VideoSession {
    api: Arc<dyn GenerationApi>,
    source_image: Option<MediaDescriptor>,
    pub prompt: String,
    pub orientation: Orientation,
    is_generating: bool,
    results: Vec<MediaDescriptor>,
    last_error: Option<String>,
}

impl VideoSession {
    pub fn new(api: Arc<dyn GenerationApi>) -> Self {
        Self {
            api,
            source_image: None,
            prompt: String::new(),
            orientation: Orientation::Square,
            is_generating: false,
            results: Vec::new(),
            last_error: None,
        }
    }

    /// Build the view state from a consumed navigation handoff.
    pub fn from_handoff(api: Arc<dyn GenerationApi>, handoff: VideoHandoff) -> Self {
        let mut session = Self::new(api);
        session.orientation = Orientation::from_raw(&handoff.resolution);
        session.prompt = handoff.prompt;
        session.source_image = Some(handoff.image);
        session
    }

    pub fn set_source_image(&mut self, image: MediaDescriptor) {
        self.source_image = Some(image);
    }

    pub fn source_image(&self) -> Option<&MediaDescriptor> {
        self.source_image.as_ref()
    }

    pub fn is_generating(&self) -> bool {
        self.is_generating
    }

    pub fn results(&self) -> &[MediaDescriptor] {
        &self.results
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Generate a video from the source image. Validation failures are
    /// recorded locally without touching the network; a request already
    /// in flight makes this a no-op.
    pub async fn generate(&mut self) {
        if self.is_generating {
            return;
        }

        let prompt = self.prompt.trim().to_string();
        if prompt.is_empty() {
            self.last_error = Some("Please provide a prompt to generate the video.".into());
            return;
        }
        let Some(image) = self.source_image.clone() else {
            self.last_error = Some("Source image is missing.".into());
            return;
        };

        self.is_generating = true;
        self.last_error = None;
        self.results.clear();

        let resolution = self.orientation.video_resolution();
        let request = VideoRequest {
            prompt,
            image,
            width: Some(resolution.width),
            height: Some(resolution.height),
            negative_prompt: None,
            length: None,
            fps: None,
            nsfw: false,
            no_sound: false,
        };

        let api = self.api.clone();
        match api.generate_video(&request).await {
            Ok(response) if response.success => {
                self.results = response.videos;
                if self.results.is_empty() {
                    self.last_error =
                        Some("Video generation finished but no video was returned.".into());
                }
            }
            Ok(response) => {
                self.last_error =
                    Some(response.error.unwrap_or_else(|| "Failed to generate video".into()));
            }
            Err(err) => {
                self.last_error = Some(err.to_string());
            }
        }
        self.is_generating = false;
    }

    /// Extend the most recent result with a newly generated tail segment.
    /// The merged video replaces the head of the result list.
    pub async fn extend(&mut self) {
        if self.is_generating {
            return;
        }
        let Some(base) = self.results.first().cloned() else {
            self.last_error = Some("No video available to extend.".into());
            return;
        };
        let prompt = self.prompt.trim().to_string();
        if prompt.is_empty() {
            self.last_error = Some("Please provide a prompt to extend the video.".into());
            return;
        }

        self.is_generating = true;
        self.last_error = None;

        let request = ExtendVideoRequest {
            prompt,
            video: base,
            width: None,
            height: None,
            negative_prompt: None,
            nsfw: false,
        };

        let api = self.api.clone();
        match api.extend_video(&request).await {
            Ok(response) if response.success => match response.combined_video {
                Some(combined) => self.results.insert(0, combined),
                None => {
                    self.last_error = Some("Video extension returned no merged video.".into());
                }
            },
            Ok(response) => {
                self.last_error =
                    Some(response.error.unwrap_or_else(|| "Failed to extend video".into()));
            }
            Err(err) => {
                self.last_error = Some(err.to_string());
            }
        }
        self.is_generating = false;
    }
}
