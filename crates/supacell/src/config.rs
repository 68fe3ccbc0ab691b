//! Environment-backed configuration for the Supabase client.
//!
//! Configuration is read once from the process environment and treated as
//! immutable afterwards. Loading never fails; absent variables default to
//! the empty string and are caught by [`AppConfig::validate`] instead.

use std::env;
use std::fmt;

use once_cell::sync::Lazy;

use crate::diagnostics::Diagnostics;

/// Environment variable holding the project URL.
pub const URL_VAR: &str = "NEXT_PUBLIC_SUPABASE_URL";

/// Environment variable holding the anon (publishable) key.
pub const ANON_KEY_VAR: &str = "NEXT_PUBLIC_SUPABASE_ANON_KEY";

// Placeholder values shipped in .env templates. A config still carrying
// them is treated as unset.
const URL_PLACEHOLDER: &str = "your-project-url-here";
const KEY_PLACEHOLDER: &str = "your-anon-key-here";

// How much of each value may appear in diagnostics: enough of the URL to
// recognize the project, never more than a prefix of the key.
pub(crate) const URL_PREFIX_LEN: usize = 30;
const KEY_PREFIX_LEN: usize = 20;

/// Project URL and anon key needed to address the backend.
#[derive(Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Project base URL, expected to start with `https://`.
    pub supabase_url: String,
    /// Anon key presented to the backend on every request.
    pub supabase_anon_key: String,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("supabase_url", &self.supabase_url)
            .field("supabase_anon_key", &"<redacted>")
            .finish()
    }
}

impl AppConfig {
    /// Read both settings from the process environment, falling back to the
    /// empty string when a variable is absent. A local `.env` file is picked
    /// up first when one exists.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            supabase_url: lookup(URL_VAR).unwrap_or_default(),
            supabase_anon_key: lookup(ANON_KEY_VAR).unwrap_or_default(),
        }
    }

    /// Run the shape checks and return the per-check outcome.
    pub fn validate(&self) -> ValidationReport {
        ValidationReport {
            has_url: !self.supabase_url.is_empty(),
            has_key: !self.supabase_anon_key.is_empty(),
            url_is_https: self.supabase_url.starts_with("https://"),
            url_is_placeholder: self.supabase_url.contains(URL_PLACEHOLDER),
            key_is_placeholder: self.supabase_anon_key.contains(KEY_PLACEHOLDER),
        }
    }
}

/// Outcome of the shape checks on an [`AppConfig`].
///
/// Carries only booleans, never raw values, so it is safe to log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationReport {
    /// URL field is non-empty.
    pub has_url: bool,
    /// Key field is non-empty.
    pub has_key: bool,
    /// URL starts with `https://`.
    pub url_is_https: bool,
    /// URL still carries the template placeholder.
    pub url_is_placeholder: bool,
    /// Key still carries the template placeholder.
    pub key_is_placeholder: bool,
}

impl ValidationReport {
    /// True when every check passed.
    pub fn is_valid(&self) -> bool {
        self.has_url
            && self.has_key
            && self.url_is_https
            && !self.url_is_placeholder
            && !self.key_is_placeholder
    }
}

/// Presence flags and truncated value prefixes reported when configuration
/// is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    /// URL variable was set to a non-empty value.
    pub has_url: bool,
    /// Key variable was set to a non-empty value.
    pub has_key: bool,
    /// First characters of the URL.
    pub url_prefix: String,
    /// First characters of the key, never the whole value.
    pub key_prefix: String,
}

impl LoadSummary {
    fn of(config: &AppConfig) -> Self {
        Self {
            has_url: !config.supabase_url.is_empty(),
            has_key: !config.supabase_anon_key.is_empty(),
            url_prefix: truncate_chars(&config.supabase_url, URL_PREFIX_LEN).to_owned(),
            key_prefix: truncate_chars(&config.supabase_anon_key, KEY_PREFIX_LEN).to_owned(),
        }
    }
}

/// Load configuration from the environment and report the outcome to the
/// given diagnostics sink.
pub fn load_config(diagnostics: &dyn Diagnostics) -> AppConfig {
    let config = AppConfig::from_env();
    diagnostics.config_loaded(&LoadSummary::of(&config));
    config
}

/// True iff both fields are non-empty, neither is a template placeholder,
/// and the URL uses the `https` scheme.
///
/// Pure; reporting a failed validation is the caller's job.
pub fn validate_config(config: &AppConfig) -> bool {
    config.validate().is_valid()
}

static PROCESS_CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

/// Configuration loaded once for the lifetime of the process.
pub fn process_config() -> &'static AppConfig {
    &PROCESS_CONFIG
}

/// Prefix of at most `len` characters, never splitting a char boundary.
pub(crate) fn truncate_chars(s: &str, len: usize) -> &str {
    match s.char_indices().nth(len) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
