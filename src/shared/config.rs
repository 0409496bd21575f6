// This is free and unencumbered software released into the public domain.

use crate::shared::{AspectRatio, CaptureMode, FallbackRule, ResolutionSelector, Rotation};

#[derive(Clone, Debug)]
pub struct BridgeConfig {
    pub target_rotation: Rotation,
    pub capture_mode: CaptureMode,
    pub aspect_ratio: AspectRatio,
    pub fallback_rule: FallbackRule,
    pub event_capacity: usize,
    /// Trace every call and reply passing through the bridge.
    pub diagnostics: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            target_rotation: Rotation::Rotation0,
            capture_mode: CaptureMode::MinimizeLatency,
            aspect_ratio: AspectRatio::Ratio16x9,
            fallback_rule: FallbackRule::Auto,
            event_capacity: 64,
            diagnostics: false,
        }
    }
}

impl BridgeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolution_selector(&self) -> ResolutionSelector {
        ResolutionSelector {
            aspect_ratio: self.aspect_ratio,
            fallback_rule: self.fallback_rule,
        }
    }

    pub fn with_target_rotation(mut self, rotation: Rotation) -> Self {
        self.target_rotation = rotation;
        self
    }

    pub fn with_capture_mode(mut self, mode: CaptureMode) -> Self {
        self.capture_mode = mode;
        self
    }

    pub fn with_aspect_ratio(mut self, ratio: AspectRatio, fallback: FallbackRule) -> Self {
        self.aspect_ratio = ratio;
        self.fallback_rule = fallback;
        self
    }

    pub fn with_event_capacity(mut self, n: usize) -> Self {
        self.event_capacity = n.max(1);
        self
    }

    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = enabled;
        self
    }
}
