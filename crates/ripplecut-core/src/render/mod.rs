//! Render Module
//!
//! Export profiles, the export planner, and the boundary types handed to an
//! external encoder. The core's job ends at plan construction; executing a
//! plan is delegated through the [`Encoder`] trait.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::Sender;

mod planner;
pub use planner::*;

// =============================================================================
// Codec and Preset Types
// =============================================================================

/// Export preset type
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportPreset {
    /// YouTube 1080p (H.264, AAC)
    Youtube1080p,
    /// YouTube 4K (H.264, AAC)
    Youtube4k,
    /// Vertical shorts (1080x1920)
    ShortsVertical,
    /// WebM (VP9, Opus)
    WebmVp9,
    /// Custom settings
    Custom,
}

impl ExportPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Youtube1080p => "youtube-1080p",
            Self::Youtube4k => "youtube-4k",
            Self::ShortsVertical => "shorts-vertical",
            Self::WebmVp9 => "webm-vp9",
            Self::Custom => "custom",
        }
    }

    /// All presets selectable by name
    pub fn all() -> &'static [ExportPreset] {
        &[
            Self::Youtube1080p,
            Self::Youtube4k,
            Self::ShortsVertical,
            Self::WebmVp9,
            Self::Custom,
        ]
    }
}

impl fmt::Display for ExportPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "youtube-1080p" => Ok(Self::Youtube1080p),
            "youtube-4k" => Ok(Self::Youtube4k),
            "shorts-vertical" => Ok(Self::ShortsVertical),
            "webm-vp9" => Ok(Self::WebmVp9),
            "custom" => Ok(Self::Custom),
            other => Err(format!("Unknown export preset: {}", other)),
        }
    }
}

/// Video codec selection
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoCodec {
    H264,
    H265,
    Vp9,
    ProRes,
}

/// Audio codec selection
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioCodec {
    Aac,
    Mp3,
    Opus,
    Pcm,
}

// =============================================================================
// Export Profile
// =============================================================================

/// Target container/codec profile for an export.
///
/// Always passed explicitly to the planner; never ambient state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportProfile {
    pub preset: ExportPreset,
    /// Output width in pixels
    pub width: u32,
    /// Output height in pixels
    pub height: u32,
    /// Output frame rate
    pub fps: f64,
    pub video_codec: VideoCodec,
    pub audio_codec: AudioCodec,
    /// Video bitrate (e.g., "8M")
    pub video_bitrate: Option<String>,
    /// Audio bitrate (e.g., "192k")
    pub audio_bitrate: Option<String>,
    /// CRF value for quality-based encoding (lower = better quality)
    pub crf: Option<u8>,
    /// Pixel format (e.g., "yuv420p")
    pub pixel_format: String,
}

impl Default for ExportProfile {
    fn default() -> Self {
        Self {
            preset: ExportPreset::Custom,
            width: 1920,
            height: 1080,
            fps: 30.0,
            video_codec: VideoCodec::H264,
            audio_codec: AudioCodec::Aac,
            video_bitrate: Some("8M".to_string()),
            audio_bitrate: Some("192k".to_string()),
            crf: Some(23),
            pixel_format: "yuv420p".to_string(),
        }
    }
}

impl ExportProfile {
    /// Create a profile from a preset
    pub fn from_preset(preset: ExportPreset) -> Self {
        match preset {
            ExportPreset::Youtube1080p => Self {
                preset: ExportPreset::Youtube1080p,
                ..Default::default()
            },
            ExportPreset::Youtube4k => Self {
                preset: ExportPreset::Youtube4k,
                width: 3840,
                height: 2160,
                video_bitrate: Some("35M".to_string()),
                audio_bitrate: Some("320k".to_string()),
                crf: Some(18),
                ..Default::default()
            },
            ExportPreset::ShortsVertical => Self {
                preset: ExportPreset::ShortsVertical,
                width: 1080,
                height: 1920,
                ..Default::default()
            },
            ExportPreset::WebmVp9 => Self {
                preset: ExportPreset::WebmVp9,
                video_codec: VideoCodec::Vp9,
                audio_codec: AudioCodec::Opus,
                video_bitrate: Some("6M".to_string()),
                audio_bitrate: Some("128k".to_string()),
                crf: Some(31),
                ..Default::default()
            },
            ExportPreset::Custom => Self::default(),
        }
    }

    /// Output geometry carried into the render plan
    pub fn geometry(&self) -> OutputGeometry {
        OutputGeometry {
            width: self.width,
            height: self.height,
            fps: self.fps,
            pixel_format: self.pixel_format.clone(),
        }
    }
}

/// Global output geometry of a render plan
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputGeometry {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub pixel_format: String,
}

// =============================================================================
// Encoder Boundary
// =============================================================================

/// Progress reported by an external encoder
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodeProgress {
    /// Current phase (e.g., "render", "mux")
    pub phase: String,
    /// Progress percentage (0-100)
    pub percent: f32,
    /// Current status message
    pub message: String,
}

/// Outcome returned by an external encoder
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodeOutcome {
    pub success: bool,
    /// Output file size in bytes
    pub file_size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Encoder log output
    pub log: String,
}

/// Cooperative cancellation signal handed to an encoder
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns true once cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Encoder-side failure
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("Encode cancelled")]
    Cancelled,
    #[error("Encode failed: {0}")]
    Failed(String),
}

/// External encoder boundary.
///
/// Implementations consume a render plan, report progress through the
/// channel, and honor the cancel token. The core never implements this
/// against a real process.
#[async_trait]
pub trait Encoder: Send + Sync {
    async fn encode(
        &self,
        plan: &RenderPlan,
        progress: Sender<EncodeProgress>,
        cancel: CancelToken,
    ) -> Result<EncodeOutcome, EncodeError>;
}

// =============================================================================
// Tests
// =============================================================================
