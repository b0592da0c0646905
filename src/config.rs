use clap::Parser;
use clap::builder::FalseyValueParser;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::env;

/// Backend address used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Backend base URL
    #[arg(long, env = "API_URL")]
    pub api_url: Option<String>,

    /// File the session cookie is persisted to between runs
    #[arg(long, env = "SESSION_COOKIE_FILE")]
    pub cookie_file: Option<String>,

    /// Emit JSON log lines
    #[arg(long, env = "LOG_JSON", value_parser = FalseyValueParser::new())]
    pub log_json: bool,

    /// Frame width in columns (defaults to the terminal width)
    #[arg(long)]
    pub width: Option<u16>,

    /// Frame height in rows (defaults to the terminal height)
    #[arg(long)]
    pub height: Option<u16>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub ui: UiConfig,
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    #[serde(default)]
    pub cookie_file: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UiConfig {
    pub title: String,
    pub subtitle: String,
    /// Pinned frame width; `None` follows the terminal.
    #[serde(default)]
    pub width: Option<u16>,
    /// Pinned frame height; `None` follows the terminal.
    #[serde(default)]
    pub height: Option<u16>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    pub json: bool,
    pub filter: String,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    /// Layering, lowest to highest: defaults, config file, `KUAKUA_` env,
    /// then CLI flags (which also cover their own env vars via clap).
    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        let mut builder = Config::builder()
            .set_default("api.base_url", DEFAULT_API_URL)?
            .set_default("ui.title", "KuaKua Qun")?
            .set_default("ui.subtitle", "Your Supportive Chat Space")?
            .set_default("log.json", false)?
            .set_default("log.filter", "warn")?;

        if let Some(path) = &cli.config {
            builder = builder.add_source(File::with_name(path));
        }

        // E.g. KUAKUA_API__BASE_URL=https://chat.example.com
        builder = builder.add_source(
            Environment::with_prefix("KUAKUA")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        if let Some(url) = cli.api_url.filter(|u| !u.trim().is_empty()) {
            builder = builder.set_override("api.base_url", url)?;
        }
        if let Some(path) = cli.cookie_file {
            builder = builder.set_override("session.cookie_file", path)?;
        }
        if cli.log_json {
            builder = builder.set_override("log.json", true)?;
        }
        if let Some(width) = cli.width {
            builder = builder.set_override("ui.width", u64::from(width))?;
        }
        if let Some(height) = cli.height {
            builder = builder.set_override("ui.height", u64::from(height))?;
        }

        // RUST_LOG wins over the configured filter.
        if let Ok(filter) = env::var("RUST_LOG") {
            if !filter.trim().is_empty() {
                builder = builder.set_override("log.filter", filter)?;
            }
        }

        let cfg = builder.build()?;
        cfg.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_flags_override_defaults() {
        let config = AppConfig::load_from_args([
            "kuakua-chat",
            "--api-url",
            "http://chat.internal:9000",
            "--cookie-file",
            "/tmp/kuakua-session",
            "--width",
            "120",
        ])
        .unwrap();

        assert_eq!(config.api.base_url, "http://chat.internal:9000");
        assert_eq!(
            config.session.cookie_file.as_deref(),
            Some("/tmp/kuakua-session")
        );
        assert_eq!(config.ui.width, Some(120));
        assert_eq!(config.ui.height, None);
    }

    #[test]
    fn test_log_json_is_a_plain_flag() {
        let config = AppConfig::load_from_args(["kuakua-chat", "--log-json"]).unwrap();
        assert!(config.log.json);
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        let err = AppConfig::load_from_args(["kuakua-chat", "--no-such-flag"]).unwrap_err();
        assert!(err.to_string().contains("no-such-flag"));
    }
}
