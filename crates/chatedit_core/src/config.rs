//! Typed editor settings, loadable from defaults, a host settings file, or
//! environment variables.

use crate::constants::{
    DEFAULT_DIFF_TIMEOUT, DEFAULT_FAST_DIRTY_THRESHOLD, DEFAULT_MAX_HISTORY_BYTES,
    DEFAULT_MAX_HISTORY_EVENTS, DEFAULT_TAB_WIDTH, DEFAULT_UNDO_THRESHOLD, ENV_AUTO_INDENT,
    ENV_DIFF_TIMEOUT_MS, ENV_FAST_DIRTY, ENV_TABS_TO_SPACES, ENV_TAB_WIDTH, ENV_UNDO_THRESHOLD_MS,
};
use crate::dirty::DirtyPolicy;
use crate::error::{EditorError, Result};
use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Settings consumed by the engine.
///
/// Validated once when a [`crate::Buffer`] is constructed; the buffer never
/// re-reads the environment afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Columns between tab stops, used for visual-column math.
    pub tab_width: usize,
    /// Insert spaces up to the next tab stop instead of `\t`.
    pub tabs_to_spaces: bool,
    /// Copy the current line's indentation onto new lines.
    pub auto_indent: bool,
    /// Coalescing window for undo/redo.
    #[serde(rename = "undo_threshold_ms", deserialize_with = "duration_ms")]
    pub undo_threshold: Duration,
    /// Byte size above which `DirtyPolicy::Auto` picks the boolean flag.
    pub fast_dirty_threshold: usize,
    pub dirty_policy: DirtyPolicy,
    pub max_history_events: usize,
    pub max_history_bytes: usize,
    /// Deadline for `apply_diff`; `None` diffs without a deadline.
    #[serde(rename = "diff_timeout_ms", deserialize_with = "optional_duration_ms")]
    pub diff_timeout: Option<Duration>,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            tab_width: DEFAULT_TAB_WIDTH,
            tabs_to_spaces: false,
            auto_indent: true,
            undo_threshold: DEFAULT_UNDO_THRESHOLD,
            fast_dirty_threshold: DEFAULT_FAST_DIRTY_THRESHOLD,
            dirty_policy: DirtyPolicy::Auto,
            max_history_events: DEFAULT_MAX_HISTORY_EVENTS,
            max_history_bytes: DEFAULT_MAX_HISTORY_BYTES,
            diff_timeout: Some(DEFAULT_DIFF_TIMEOUT),
        }
    }
}

fn duration_ms<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
where
    D: serde::Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_millis)
}

fn optional_duration_ms<'de, D>(deserializer: D) -> std::result::Result<Option<Duration>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let millis = Option::<u64>::deserialize(deserializer)?;
    Ok(millis.filter(|ms| *ms > 0).map(Duration::from_millis))
}

/// Parse a boolean-like environment flag value.
///
/// # Supported Values
/// - Truthy: `1`, `true`, `yes`, `on`
/// - Falsy: `0`, `false`, `no`, `off`, empty string
///
/// Matching is case-insensitive and ignores surrounding whitespace.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn env_flag(name: &str) -> Option<bool> {
    let value = env::var(name).ok()?;
    match parse_env_flag(&value) {
        Some(enabled) => Some(enabled),
        None => {
            warn!(
                "Unrecognized value for {}='{}'; expected 1/0/true/false/yes/no/on/off. Using default.",
                name, value
            );
            None
        }
    }
}

fn env_number<T: FromStr>(name: &str) -> Option<T> {
    let value = env::var(name).ok()?;
    match value.trim().parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!("Unrecognized value for {}='{}'; expected a number. Using default.", name, value);
            None
        }
    }
}

impl EditorSettings {
    /// Load settings from `CHATEDIT_*` environment variables on top of the
    /// defaults.
    ///
    /// # Returns
    /// Populated settings; unrecognised values are logged and ignored.
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        if let Some(width) = env_number(ENV_TAB_WIDTH) {
            settings.tab_width = width;
        }
        if let Some(enabled) = env_flag(ENV_TABS_TO_SPACES) {
            settings.tabs_to_spaces = enabled;
        }
        if let Some(enabled) = env_flag(ENV_AUTO_INDENT) {
            settings.auto_indent = enabled;
        }
        if let Some(ms) = env_number::<u64>(ENV_UNDO_THRESHOLD_MS) {
            settings.undo_threshold = Duration::from_millis(ms);
        }
        if env_flag(ENV_FAST_DIRTY) == Some(true) {
            settings.dirty_policy = DirtyPolicy::Fast;
        }
        if let Some(ms) = env_number::<u64>(ENV_DIFF_TIMEOUT_MS) {
            settings.diff_timeout = (ms > 0).then(|| Duration::from_millis(ms));
        }
        settings
    }

    /// Check invariants the engine relies on.
    ///
    /// # Errors
    /// Returns [`EditorError::InvalidSettings`] for a zero tab width, a zero
    /// undo window, or a zero history bound.
    pub fn validate(&self) -> Result<()> {
        if self.tab_width == 0 {
            return Err(EditorError::InvalidSettings("tab_width must be at least 1".to_string()));
        }
        if self.undo_threshold.is_zero() {
            return Err(EditorError::InvalidSettings(
                "undo_threshold must be non-zero".to_string(),
            ));
        }
        if self.max_history_events == 0 || self.max_history_bytes == 0 {
            return Err(EditorError::InvalidSettings(
                "history bounds must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Text inserted for one level of indentation.
    pub fn indent_string(&self) -> String {
        if self.tabs_to_spaces {
            " ".repeat(self.tab_width)
        } else {
            "\t".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};

    fn env_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }

    /// Sets a variable for the guard's lifetime, restoring the prior value.
    struct EnvGuard {
        key: &'static str,
        previous: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &'static str, value: &str) -> Self {
            let previous = env::var(key).ok();
            env::set_var(key, value);
            Self { key, previous }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match self.previous.as_deref() {
                Some(previous) => env::set_var(self.key, previous),
                None => env::remove_var(self.key),
            }
        }
    }

    #[test]
    fn parse_env_flag_accepts_truthy_and_falsy_values() {
        for value in ["1", "true", "TRUE", " yes ", "on"] {
            assert_eq!(parse_env_flag(value), Some(true), "value: {}", value);
        }
        for value in ["", "0", "false", " no ", "off"] {
            assert_eq!(parse_env_flag(value), Some(false), "value: {}", value);
        }
        assert_eq!(parse_env_flag("maybe"), None);
    }

    #[test]
    fn from_env_overlays_recognized_values() {
        let _lock = env_lock().lock().expect("env lock");
        let _tab = EnvGuard::set(ENV_TAB_WIDTH, "8");
        let _spaces = EnvGuard::set(ENV_TABS_TO_SPACES, "yes");
        let _undo = EnvGuard::set(ENV_UNDO_THRESHOLD_MS, "750");
        let _diff = EnvGuard::set(ENV_DIFF_TIMEOUT_MS, "0");
        let settings = EditorSettings::from_env();
        assert_eq!(settings.tab_width, 8);
        assert!(settings.tabs_to_spaces);
        assert_eq!(settings.undo_threshold, Duration::from_millis(750));
        assert_eq!(settings.diff_timeout, None);
    }

    #[test]
    fn from_env_ignores_garbage() {
        let _lock = env_lock().lock().expect("env lock");
        let _tab = EnvGuard::set(ENV_TAB_WIDTH, "wide");
        let _indent = EnvGuard::set(ENV_AUTO_INDENT, "sometimes");
        let settings = EditorSettings::from_env();
        assert_eq!(settings.tab_width, DEFAULT_TAB_WIDTH);
        assert!(settings.auto_indent);
    }

    #[test]
    fn validate_rejects_zero_tab_width() {
        let settings = EditorSettings {
            tab_width: 0,
            ..EditorSettings::default()
        };
        assert!(matches!(settings.validate(), Err(EditorError::InvalidSettings(_))));
        assert!(EditorSettings::default().validate().is_ok());
    }

    #[test]
    fn deserializes_partial_settings_with_defaults() {
        let settings: EditorSettings = serde_json::from_str(
            r#"{"tab_width": 2, "undo_threshold_ms": 300, "dirty_policy": "accurate"}"#,
        )
        .expect("settings json");
        assert_eq!(settings.tab_width, 2);
        assert_eq!(settings.undo_threshold, Duration::from_millis(300));
        assert_eq!(settings.dirty_policy, DirtyPolicy::Accurate);
        assert!(settings.auto_indent);
    }

    #[test]
    fn indent_string_follows_tab_preference() {
        let mut settings = EditorSettings::default();
        assert_eq!(settings.indent_string(), "\t");
        settings.tabs_to_spaces = true;
        settings.tab_width = 2;
        assert_eq!(settings.indent_string(), "  ");
    }
}
