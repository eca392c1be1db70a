use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ConciergeError, Result};
use crate::types::Locale;

/// Top-level configuration for the Concierge service.
///
/// Loaded from `~/.concierge/config.toml` by default. Each section corresponds
/// to one crate of the workspace. Secrets are never stored here; they are read
/// from the environment by the binary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConciergeConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub voice: VoiceConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
}

impl ConciergeConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ConciergeConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ConciergeError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
    /// Directory holding `system_prompt_<code>.txt` templates.
    pub prompt_dir: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            prompt_dir: "prompts".to_string(),
        }
    }
}

/// Catalog cache freshness policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// A snapshot older than this is stale.
    pub ttl_minutes: u64,
    /// Period of the background refresh tick.
    pub refresh_interval_minutes: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: 30,
            refresh_interval_minutes: 15,
        }
    }
}

/// Longest accepted TTL; larger values are clamped to it.
const MAX_TTL_MINUTES: u64 = 365 * 24 * 60;

impl CacheConfig {
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.ttl_minutes.min(MAX_TTL_MINUTES) as i64)
    }

    /// Period of the refresh tick, at least one minute and at most half the
    /// TTL, so no snapshot is served for longer than 1.5 x TTL.
    pub fn refresh_interval(&self) -> std::time::Duration {
        let half_ttl = self.ttl_minutes.min(MAX_TTL_MINUTES) / 2;
        let minutes = self.refresh_interval_minutes.min(half_ttl).max(1);
        std::time::Duration::from_secs(minutes * 60)
    }
}

/// Per-user conversation memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Maximum number of stored user/assistant turns per user.
    pub max_history: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { max_history: 20 }
    }
}

/// Chat-completion backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// OpenAI-compatible API root, without the trailing `/chat/completions`.
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Number of trailing history turns sent with each request.
    pub history_window: usize,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
            max_tokens: 500,
            temperature: 0.7,
            history_window: 10,
            timeout_secs: 60,
        }
    }
}

/// Voice message handling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Transcription API root, without the trailing `/audio/transcriptions`.
    pub base_url: String,
    pub model: String,
    /// Language hint used when the session has no locale yet.
    pub default_language: String,
    /// Path or name of the `ffmpeg` executable.
    pub ffmpeg_path: String,
    /// Directory for temporary audio files. Empty means the system temp dir.
    pub work_dir: String,
    pub timeout_secs: u64,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "whisper-1".to_string(),
            default_language: "ru".to_string(),
            ffmpeg_path: "ffmpeg".to_string(),
            work_dir: String::new(),
            timeout_secs: 60,
        }
    }
}

impl VoiceConfig {
    pub fn work_dir(&self) -> PathBuf {
        if self.work_dir.trim().is_empty() {
            std::env::temp_dir()
        } else {
            PathBuf::from(&self.work_dir)
        }
    }

    /// The configured default hint, or the primary locale when it is not a
    /// supported code.
    pub fn default_locale(&self) -> Locale {
        Locale::from_code(&self.default_language).unwrap_or(Locale::PRIMARY)
    }
}

/// Remote course spreadsheet and knowledge documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub spreadsheet_id: String,
    /// A1-notation range; the first row holds the column headers.
    pub sheet_range: String,
    /// Knowledge document for the primary locale.
    pub knowledge_doc_ru: String,
    /// Knowledge document for the secondary locale. May equal the primary one.
    pub knowledge_doc_ky: String,
    pub sheets_base_url: String,
    pub docs_base_url: String,
    pub timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            sheet_range: "Лист1".to_string(),
            knowledge_doc_ru: String::new(),
            knowledge_doc_ky: String::new(),
            sheets_base_url: "https://sheets.googleapis.com/v4".to_string(),
            docs_base_url: "https://docs.googleapis.com/v1".to_string(),
            timeout_secs: 30,
        }
    }
}

impl CatalogConfig {
    /// Document id for `locale`. A blank secondary id reuses the primary one.
    pub fn knowledge_doc(&self, locale: Locale) -> &str {
        match locale {
            Locale::Russian => &self.knowledge_doc_ru,
            Locale::Kyrgyz if self.knowledge_doc_ky.trim().is_empty() => &self.knowledge_doc_ru,
            Locale::Kyrgyz => &self.knowledge_doc_ky,
        }
    }
}

/// Telegram Bot API transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub api_base: String,
    /// Long-poll timeout passed to `getUpdates`.
    pub poll_timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.telegram.org".to_string(),
            poll_timeout_secs: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = ConciergeConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.cache.ttl_minutes, 30);
        assert_eq!(config.cache.refresh_interval_minutes, 15);
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.llm.max_tokens, 500);
        assert_eq!(config.llm.history_window, 10);
        assert_eq!(config.llm.timeout_secs, 60);
        assert_eq!(config.voice.default_language, "ru");
        assert_eq!(config.catalog.sheet_range, "Лист1");
    }

    #[test]
    fn test_load_valid_config() {
        let content = r#"
[general]
log_level = "debug"
prompt_dir = "/etc/concierge/prompts"

[cache]
ttl_minutes = 5
refresh_interval_minutes = 2

[llm]
model = "gpt-4o-mini"
temperature = 0.2

[catalog]
spreadsheet_id = "sheet-1"
knowledge_doc_ru = "doc-ru"
knowledge_doc_ky = "doc-ky"
"#;
        let file = create_temp_config(content);
        let config = ConciergeConfig::load(file.path()).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.general.prompt_dir, "/etc/concierge/prompts");
        assert_eq!(config.cache.ttl_minutes, 5);
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert!((config.llm.temperature - 0.2).abs() < f32::EPSILON);
        // Unset fields in a present section keep their defaults
        assert_eq!(config.llm.max_tokens, 500);
        assert_eq!(config.catalog.knowledge_doc(Locale::Kyrgyz), "doc-ky");
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let content = r#"
[session]
max_history = 6
"#;
        let file = create_temp_config(content);
        let config = ConciergeConfig::load(file.path()).unwrap();
        assert_eq!(config.session.max_history, 6);
        assert_eq!(config.cache.ttl_minutes, 30);
        assert_eq!(config.telegram.poll_timeout_secs, 30);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = ConciergeConfig::load_or_default(Path::new("/nonexistent/config.toml"));
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn test_config_load_invalid_toml() {
        let file = create_temp_config("this is {{ not valid TOML");
        let result = ConciergeConfig::load(file.path());
        assert!(matches!(result, Err(ConciergeError::Config(_))));
    }

    #[test]
    fn test_config_save_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("dir").join("config.toml");

        let mut config = ConciergeConfig::default();
        config.catalog.spreadsheet_id = "abc".to_string();
        config.save(&path).unwrap();

        assert!(path.exists());
        let reloaded = ConciergeConfig::load(&path).unwrap();
        assert_eq!(reloaded.catalog.spreadsheet_id, "abc");
        assert_eq!(reloaded.llm.model, config.llm.model);
    }

    #[test]
    fn test_secondary_knowledge_doc_falls_back_to_primary() {
        let catalog = CatalogConfig {
            knowledge_doc_ru: "shared".to_string(),
            ..CatalogConfig::default()
        };
        assert_eq!(catalog.knowledge_doc(Locale::Russian), "shared");
        assert_eq!(catalog.knowledge_doc(Locale::Kyrgyz), "shared");
    }

    #[test]
    fn test_durations() {
        let cache = CacheConfig::default();
        assert_eq!(cache.ttl(), chrono::Duration::minutes(30));
        assert_eq!(cache.refresh_interval(), std::time::Duration::from_secs(900));

        let zero = CacheConfig {
            ttl_minutes: 0,
            refresh_interval_minutes: 0,
        };
        // A zero tick would spin; it is clamped to one minute.
        assert_eq!(zero.refresh_interval(), std::time::Duration::from_secs(60));
    }

    #[test]
    fn test_refresh_tick_capped_at_half_ttl() {
        let cache = CacheConfig {
            ttl_minutes: 30,
            refresh_interval_minutes: 20,
        };
        assert_eq!(cache.refresh_interval(), std::time::Duration::from_secs(15 * 60));
    }

    #[test]
    fn test_huge_ttl_is_clamped() {
        let cache = CacheConfig {
            ttl_minutes: u64::MAX,
            refresh_interval_minutes: u64::MAX,
        };
        assert_eq!(cache.ttl(), chrono::Duration::minutes(MAX_TTL_MINUTES as i64));
        assert!(cache.ttl() > chrono::Duration::zero());
        assert_eq!(
            cache.refresh_interval(),
            std::time::Duration::from_secs(MAX_TTL_MINUTES / 2 * 60)
        );
    }

    #[test]
    fn test_voice_defaults() {
        let voice = VoiceConfig::default();
        assert_eq!(voice.default_locale(), Locale::Russian);
        assert_eq!(voice.work_dir(), std::env::temp_dir());

        let custom = VoiceConfig {
            default_language: "ky".to_string(),
            work_dir: "/var/tmp/concierge".to_string(),
            ..VoiceConfig::default()
        };
        assert_eq!(custom.default_locale(), Locale::Kyrgyz);
        assert_eq!(custom.work_dir(), PathBuf::from("/var/tmp/concierge"));
    }
}
