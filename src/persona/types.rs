//! Core persona types.
//!
//! A persona is the identity a page gets to see: user agent, language
//! preferences, timezone and screen geometry. Personas are immutable once
//! they are part of an active policy.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────
// Screen
// ─────────────────────────────────────────────────────────────────

/// Spoofed screen geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Screen {
    /// Screen width in CSS pixels.
    pub width: u32,

    /// Screen height in CSS pixels.
    pub height: u32,

    /// Bits per pixel reported as `colorDepth` / `pixelDepth`.
    pub color_depth: u32,

    /// Device pixel ratio; absent means 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pixel_ratio: Option<f64>,
}

impl Screen {
    pub fn new(width: u32, height: u32, color_depth: u32) -> Self {
        Self {
            width,
            height,
            color_depth,
            pixel_ratio: None,
        }
    }

    pub fn with_pixel_ratio(mut self, ratio: f64) -> Self {
        self.pixel_ratio = Some(ratio);
        self
    }

    /// Effective device pixel ratio.
    pub fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio.unwrap_or(1.0)
    }
}

impl Default for Screen {
    fn default() -> Self {
        Self::new(1920, 1080, 24)
    }
}

// ─────────────────────────────────────────────────────────────────
// Persona
// ─────────────────────────────────────────────────────────────────

/// A named identity profile selected by the resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    /// Unique key within a policy.
    pub id: String,

    /// Value for `navigator.userAgent` and the `User-Agent` header.
    pub user_agent: String,

    /// Comma-separated language tags with optional `;q=` weights,
    /// e.g. `en-US,en;q=0.9`.
    pub accept_language: String,

    /// IANA timezone name, e.g. `Europe/Berlin`.
    pub timezone: String,

    /// Screen geometry.
    pub screen: Screen,
}

impl Persona {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            user_agent: String::new(),
            accept_language: String::new(),
            timezone: "UTC".to_string(),
            screen: Screen::default(),
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_accept_language(mut self, accept_language: impl Into<String>) -> Self {
        self.accept_language = accept_language.into();
        self
    }

    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }

    pub fn with_screen(mut self, screen: Screen) -> Self {
        self.screen = screen;
        self
    }

    /// Language tags from `accept_language` with weights stripped, in
    /// declaration order. Empty entries are dropped.
    pub fn languages(&self) -> Vec<String> {
        self.accept_language
            .split(',')
            .filter_map(|entry| {
                let tag = entry.split(';').next().unwrap_or("").trim();
                (!tag.is_empty()).then(|| tag.to_string())
            })
            .collect()
    }

    /// First language tag, used for `navigator.language`.
    pub fn primary_language(&self) -> Option<String> {
        self.languages().into_iter().next()
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
