use serde::{Deserialize, Serialize};

/// Default accent color applied to a fresh session.
pub const DEFAULT_PRIMARY_COLOR: &str = "#3b82f6";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

/// Three-step scale shared by border radius and font size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    Small,
    #[default]
    Medium,
    Large,
}

/// Visual preferences. Persisted independently of the user and kept across logout.
///
/// Fields missing from a stored theme fall back to their defaults one by one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ThemeConfig {
    pub mode: ThemeMode,
    pub primary_color: String,
    pub border_radius: Scale,
    pub font_size: Scale,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            mode: ThemeMode::Light,
            primary_color: DEFAULT_PRIMARY_COLOR.to_string(),
            border_radius: Scale::Medium,
            font_size: Scale::Medium,
        }
    }
}

impl ThemeConfig {
    /// Overlay the fields present in `patch`, keeping the rest.
    pub fn merge(&self, patch: &ThemePatch) -> ThemeConfig {
        ThemeConfig {
            mode: patch.mode.unwrap_or(self.mode),
            primary_color: patch
                .primary_color
                .clone()
                .unwrap_or_else(|| self.primary_color.clone()),
            border_radius: patch.border_radius.unwrap_or(self.border_radius),
            font_size: patch.font_size.unwrap_or(self.font_size),
        }
    }

    pub fn is_dark(&self) -> bool {
        self.mode == ThemeMode::Dark
    }
}

/// Partial theme update used by the set-theme action.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<ThemeMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<Scale>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<Scale>,
}

impl ThemePatch {
    pub fn mode(mode: ThemeMode) -> Self {
        Self {
            mode: Some(mode),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.mode.is_none()
            && self.primary_color.is_none()
            && self.border_radius.is_none()
            && self.font_size.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageConfig {
    pub code: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rtl: Option<bool>,
}

impl LanguageConfig {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            flag: None,
            rtl: None,
        }
    }

    pub fn is_rtl(&self) -> bool {
        self.rtl.unwrap_or(false)
    }

    /// Look up one of the bundled languages by its code.
    pub fn find(code: &str) -> Option<LanguageConfig> {
        available_languages().into_iter().find(|l| l.code == code)
    }
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self::new("en", "English")
    }
}

/// Languages shipped with the dashboard, default first.
pub fn available_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig::new("en", "English"),
        LanguageConfig::new("fr", "Français"),
    ]
}
