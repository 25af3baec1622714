use journal_render::{
    AssetUrlResolver, AssetUrlScheme, MarkdownOptions, PolicyError, SanitizationPolicy,
};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Overrides `assets.base-url` when set.
pub const ASSET_BASE_URL_ENV: &str = "JOURNAL_ASSET_BASE_URL";

static CONFIG: OnceCell<Config> = OnceCell::new();

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config.toml: {0}")]
    Toml(#[from] toml::de::Error),
}

pub struct LoadedConfig {
    pub config: Config,
    pub file_path: PathBuf,
    pub maybe_error: Option<ConfigError>,
}

/// Returns the default config file location.
///
/// Linux: ~/.config/journal/config.toml
/// macOS: ~/Library/Application Support/org.journal.journal/config.toml
/// Windows: ~\AppData\Roaming\journal\journal\config\config.toml
pub fn default_config_file() -> PathBuf {
    directories::ProjectDirs::from("org", "journal", "journal")
        .map(|dirs| dirs.config_dir().join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

/// Loads the config from `specified_config_file` or the default location.
///
/// A missing file yields the default config. A malformed one yields the
/// default config as well, with the parse error handed back to the caller.
pub fn load_config(specified_config_file: Option<PathBuf>) -> LoadedConfig {
    let config_file = specified_config_file.unwrap_or_else(default_config_file);

    let mut maybe_error = None;
    let mut config = match std::fs::read_to_string(&config_file) {
        Ok(contents) => toml::from_str(&contents).unwrap_or_else(|err| {
            tracing::warn!(?config_file, %err, "Failed to parse config, using defaults");
            maybe_error.replace(ConfigError::Toml(err));
            Config::default()
        }),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Config::default(),
        Err(err) => {
            maybe_error.replace(ConfigError::Io(err));
            Config::default()
        }
    };

    if let Ok(base_url) = std::env::var(ASSET_BASE_URL_ENV) {
        config.assets.base_url = base_url;
    }

    LoadedConfig {
        config,
        file_path: config_file,
        maybe_error,
    }
}

/// Initializes the global [`Config`] once and returns it.
///
/// Later calls return the config loaded by the first one.
pub fn load_config_on_startup(
    specified_config_file: Option<PathBuf>,
) -> (&'static Config, Option<ConfigError>) {
    let mut maybe_error = None;

    let config = CONFIG.get_or_init(|| {
        let LoadedConfig {
            config,
            file_path,
            maybe_error: err,
        } = load_config(specified_config_file);
        tracing::debug!(?file_path, "Loaded config");
        maybe_error = err;
        config
    });

    (config, maybe_error)
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct LogConfig {
    /// Specify the log file path.
    ///
    /// Logs go to stderr when unset.
    pub log_file: Option<String>,

    /// Specify the max log level.
    pub max_level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_file: None,
            max_level: "debug".into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct AssetsConfig {
    /// Prefix turning a bare asset filename into a fetchable URL.
    ///
    /// Can be overridden by the `JOURNAL_ASSET_BASE_URL` environment variable.
    pub base_url: String,

    /// How the filename is attached to `base-url`.
    ///
    /// ```toml
    /// [assets]
    /// base-url = "https://journal.example.com/v1/assets"
    /// url-scheme = "query"
    /// ```
    pub url_scheme: AssetUrlScheme,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            base_url: "/web/assets".into(),
            url_scheme: AssetUrlScheme::Path,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct MarkdownConfig {
    /// Enable GitHub Flavored Markdown extensions.
    pub gfm: bool,

    /// Render newlines inside a paragraph as `<br>`.
    pub hard_line_breaks: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            gfm: true,
            hard_line_breaks: true,
        }
    }
}

/// Sanitizer allow-list overrides.
///
/// Unset lists fall back to the built-in allow-list.
#[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct SanitizeConfig {
    pub allowed_tags: Option<Vec<String>>,

    pub allowed_attributes: Option<Vec<String>>,

    /// Keep `data-*` attributes.
    pub allow_data_attributes: bool,
}

#[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Config {
    /// Log configuration.
    pub log: LogConfig,

    /// Asset URL configuration.
    pub assets: AssetsConfig,

    /// Markdown configuration.
    pub markdown: MarkdownConfig,

    /// Sanitizer configuration.
    pub sanitize: SanitizeConfig,
}

impl Config {
    pub fn asset_resolver(&self) -> AssetUrlResolver {
        AssetUrlResolver::new(self.assets.base_url.clone(), self.assets.url_scheme)
    }

    pub fn markdown_options(&self) -> MarkdownOptions {
        let mut options = if self.markdown.gfm {
            MarkdownOptions::gfm()
        } else {
            MarkdownOptions::commonmark()
        };
        options.hard_line_breaks = self.markdown.hard_line_breaks;
        options
    }

    /// Builds the sanitization policy, rejecting overrides that would admit
    /// script execution.
    pub fn sanitization_policy(&self) -> Result<SanitizationPolicy, PolicyError> {
        let SanitizeConfig {
            allowed_tags,
            allowed_attributes,
            allow_data_attributes,
        } = &self.sanitize;

        if allowed_tags.is_none() && allowed_attributes.is_none() && !allow_data_attributes {
            return Ok(SanitizationPolicy::default());
        }

        let default_policy = SanitizationPolicy::default();
        let tags: Vec<String> = match allowed_tags {
            Some(tags) => tags.clone(),
            None => default_policy.allowed_tags().map(String::from).collect(),
        };
        let attributes: Vec<String> = match allowed_attributes {
            Some(attributes) => attributes.clone(),
            None => default_policy
                .allowed_attributes()
                .map(String::from)
                .collect(),
        };

        SanitizationPolicy::new(tags, attributes, *allow_data_attributes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config() {
        let toml_content = r#"
          [log]
          max-level = "trace"
          log-file = "/tmp/journal.log"

          [assets]
          base-url = "https://journal.example.com/v1/assets"
          url-scheme = "query"

          [markdown]
          hard-line-breaks = false

          [sanitize]
          allowed-tags = ["p", "img"]
"#;
        let user_config: Config =
            toml::from_str(toml_content).expect("Failed to deserialize config");

        assert_eq!(
            user_config,
            Config {
                log: LogConfig {
                    log_file: Some("/tmp/journal.log".to_string()),
                    max_level: "trace".to_string(),
                },
                assets: AssetsConfig {
                    base_url: "https://journal.example.com/v1/assets".to_string(),
                    url_scheme: AssetUrlScheme::Query,
                },
                markdown: MarkdownConfig {
                    gfm: true,
                    hard_line_breaks: false,
                },
                sanitize: SanitizeConfig {
                    allowed_tags: Some(vec!["p".to_string(), "img".to_string()]),
                    ..Default::default()
                },
            }
        );
    }

    #[test]
    fn test_config_serialize() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).expect("Serialize config is okay");
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(deserialized, config);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        assert!(toml::from_str::<Config>("[assets]\nbase = \"x\"").is_err());
        assert!(toml::from_str::<Config>("[assets]\nurl-scheme = \"ftp\"").is_err());
    }

    #[test]
    fn test_asset_resolver_from_config() {
        let config: Config = toml::from_str(
            "[assets]\nbase-url = \"https://h/v1/assets\"\nurl-scheme = \"query\"",
        )
        .unwrap();
        assert_eq!(
            config.asset_resolver().resolve("a b.jpg"),
            "https://h/v1/assets?path=a%20b.jpg"
        );
    }

    #[test]
    fn test_default_policy_from_config() {
        assert_eq!(
            Config::default().sanitization_policy().unwrap(),
            SanitizationPolicy::default()
        );
    }

    #[test]
    fn test_policy_overrides() {
        let config: Config = toml::from_str("[sanitize]\nallowed-tags = [\"p\", \"b\"]").unwrap();
        let policy = config.sanitization_policy().unwrap();
        assert_eq!(policy.allowed_tags().collect::<Vec<_>>(), vec!["b", "p"]);
        assert!(policy.allowed_attributes().any(|attr| attr == "href"));

        let config: Config =
            toml::from_str("[sanitize]\nallowed-attributes = [\"onload\"]").unwrap();
        assert!(matches!(
            config.sanitization_policy(),
            Err(PolicyError::ForbiddenAttribute(_))
        ));
    }

    #[test]
    fn test_markdown_options() {
        let config: Config = toml::from_str("[markdown]\ngfm = false").unwrap();
        let options = config.markdown_options();
        assert!(!options.enable_tables);
        assert!(options.hard_line_breaks);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let LoadedConfig {
            config,
            maybe_error,
            ..
        } = load_config(Some(PathBuf::from("/nonexistent/journal/config.toml")));
        assert!(maybe_error.is_none());
        assert_eq!(config.markdown, MarkdownConfig::default());
    }

    #[test]
    fn test_load_malformed_file_reports_error() {
        let path = std::env::temp_dir().join(format!(
            "journal-config-test-{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "[assets\nbase-url = 1").unwrap();

        let LoadedConfig {
            config,
            maybe_error,
            ..
        } = load_config(Some(path.clone()));
        std::fs::remove_file(&path).ok();

        assert!(matches!(maybe_error, Some(ConfigError::Toml(_))));
        assert_eq!(config.sanitize, SanitizeConfig::default());
    }
}
