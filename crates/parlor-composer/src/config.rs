//! Configuration types for the composer

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ComposerResult;

/// Media accepted by a picker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[default]
    Photo,
    Video,
    Any,
}

/// Options handed to the capture provider for one kind of capture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickerConfig {
    /// What the picker may return
    pub media_type: MediaType,
    /// Allow selecting several items
    pub multiple: bool,
    /// Show the cropping UI after capture
    pub cropping: bool,
    /// Free-form crop rectangle instead of a fixed aspect
    pub free_style_crop: bool,
    /// JPEG quality in `0.0..=1.0` (None = provider default)
    pub compress_image_quality: Option<f32>,
    /// Video compression preset name (None = provider default)
    pub compress_video_preset: Option<String>,
    /// Re-encode images as JPEG
    pub force_jpg: bool,
    /// Keep EXIF metadata
    pub include_exif: bool,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            media_type: MediaType::Photo,
            multiple: false,
            cropping: false,
            free_style_crop: false,
            compress_image_quality: None,
            compress_video_preset: None,
            force_jpg: false,
            include_exif: false,
        }
    }
}

impl PickerConfig {
    /// Camera photo: cropped, 80% JPEG with EXIF
    pub fn photo() -> Self {
        Self {
            media_type: MediaType::Photo,
            cropping: true,
            free_style_crop: true,
            compress_image_quality: Some(0.8),
            force_jpg: true,
            include_exif: true,
            ..Default::default()
        }
    }

    /// Camera video
    pub fn video() -> Self {
        Self {
            media_type: MediaType::Video,
            ..Default::default()
        }
    }

    /// Media library: multi-select, any media, videos passed through as is
    pub fn library() -> Self {
        Self {
            media_type: MediaType::Any,
            multiple: true,
            compress_video_preset: Some("Passthrough".to_string()),
            force_jpg: true,
            ..Default::default()
        }
    }
}

/// Main composer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerConfig {
    /// Camera photo configuration
    pub photo: PickerConfig,
    /// Camera video configuration
    pub video: PickerConfig,
    /// Media library configuration
    pub library: PickerConfig,
    /// Rename JPEG output whose filename does not say so
    pub force_jpg_extension: bool,
    /// Translation key for the upload error alert title
    pub error_title_key: String,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            photo: PickerConfig::photo(),
            video: PickerConfig::video(),
            library: PickerConfig::library(),
            force_jpg_extension: true,
            error_title_key: "Error_uploading".to_string(),
        }
    }
}

impl ComposerConfig {
    /// Parse from JSON; missing fields take their defaults
    pub fn from_json_str(json: &str) -> ComposerResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> ComposerResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ComposerConfig::default();
        assert!(config.force_jpg_extension);
        assert_eq!(config.error_title_key, "Error_uploading");
        assert_eq!(config.photo.compress_image_quality, Some(0.8));
        assert!(config.photo.cropping);
        assert_eq!(config.video.media_type, MediaType::Video);
        assert!(config.library.multiple);
        assert_eq!(config.library.media_type, MediaType::Any);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = ComposerConfig::from_json_str(
            r#"{"force_jpg_extension": false, "video": {"media_type": "video", "multiple": true}}"#,
        )
        .unwrap();
        assert!(!config.force_jpg_extension);
        assert!(config.video.multiple);
        assert!(!config.video.cropping);
        assert_eq!(config.photo, PickerConfig::photo());
    }

    #[test]
    fn test_bad_json_is_config_error() {
        let err = ComposerConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, crate::error::ComposerError::Config(_)));
    }
}
