//! Editor configuration.
//!
//! Every field has a default matching the stock certificate editor, so an
//! empty JSON object is a complete configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EditorError, EditorResult};

/// When properties-panel edits become history entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitPolicy {
    /// Every field edit records one entry.
    #[default]
    Immediate,
    /// Field edits are drafts until an explicit commit (blur/Enter).
    OnCommit,
}

/// What happens to a gesture interrupted without a pointer-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragCancelPolicy {
    /// Restore the pre-gesture state.
    #[default]
    Revert,
    /// Keep the last previewed state and record it.
    Commit,
}

/// Zoom bounds and step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    /// Smallest zoom factor.
    pub min: f64,
    /// Largest zoom factor.
    pub max: f64,
    /// Increment for zoom in/out.
    pub step: f64,
    /// Zoom factor of a new session.
    pub initial: f64,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min: 0.25,
            max: 2.0,
            step: 0.25,
            initial: 1.0,
        }
    }
}

impl ZoomConfig {
    /// Clamp a zoom factor into `[min, max]`.
    ///
    /// Inverted bounds resolve to `max` rather than panicking.
    #[must_use]
    pub fn clamp(&self, zoom: f64) -> f64 {
        zoom.max(self.min).min(self.max)
    }
}

/// Selection handle geometry, in scene units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandleConfig {
    /// Side length of a square handle's hit area.
    pub size: f64,
    /// Distance from the top edge to the rotation handle's center.
    pub rotation_offset: f64,
}

impl Default for HandleConfig {
    fn default() -> Self {
        Self {
            size: 12.0,
            rotation_offset: 24.0,
        }
    }
}

/// Configuration for a [`crate::SceneStore`] and its panels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Canvas width for new documents.
    pub canvas_width: f64,
    /// Canvas height for new documents.
    pub canvas_height: f64,
    /// Offset applied on both axes when duplicating.
    pub duplicate_offset: f64,
    /// Zoom settings.
    pub zoom: ZoomConfig,
    /// Maximum history entries; `None` keeps everything.
    pub history_limit: Option<usize>,
    /// Properties-panel history granularity.
    pub commit_policy: CommitPolicy,
    /// Interrupted gesture handling.
    pub drag_cancel: DragCancelPolicy,
    /// Handle geometry.
    pub handles: HandleConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            canvas_width: 1200.0,
            canvas_height: 900.0,
            duplicate_offset: 20.0,
            zoom: ZoomConfig::default(),
            history_limit: None,
            commit_policy: CommitPolicy::default(),
            drag_cancel: DragCancelPolicy::default(),
            handles: HandleConfig::default(),
        }
    }
}

impl EditorConfig {
    /// Parse and validate a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::Serialization`] for malformed JSON and
    /// [`EditorError::InvalidConfig`] for out-of-range values.
    pub fn from_json_str(json: &str) -> EditorResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::Io`] if the file cannot be read, otherwise as
    /// [`EditorConfig::from_json_str`].
    pub fn from_json_file(path: impl AsRef<Path>) -> EditorResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> EditorResult<()> {
        let positive = |name: &str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(EditorError::InvalidConfig(format!(
                    "{name} must be positive, got {value}"
                )))
            }
        };

        positive("canvas_width", self.canvas_width)?;
        positive("canvas_height", self.canvas_height)?;
        positive("zoom.min", self.zoom.min)?;
        positive("zoom.step", self.zoom.step)?;
        positive("handles.size", self.handles.size)?;

        if !self.duplicate_offset.is_finite() {
            return Err(EditorError::InvalidConfig(
                "duplicate_offset must be finite".to_string(),
            ));
        }
        if !(self.zoom.max.is_finite() && self.zoom.max >= self.zoom.min) {
            return Err(EditorError::InvalidConfig(format!(
                "zoom.max ({}) must be at least zoom.min ({})",
                self.zoom.max, self.zoom.min
            )));
        }
        if !(self.zoom.min..=self.zoom.max).contains(&self.zoom.initial) {
            return Err(EditorError::InvalidConfig(format!(
                "zoom.initial ({}) must lie within {}..={}",
                self.zoom.initial, self.zoom.min, self.zoom.max
            )));
        }
        if !(self.handles.rotation_offset.is_finite() && self.handles.rotation_offset >= 0.0) {
            return Err(EditorError::InvalidConfig(
                "handles.rotation_offset must be non-negative".to_string(),
            ));
        }
        if self.history_limit == Some(0) {
            return Err(EditorError::InvalidConfig(
                "history_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
