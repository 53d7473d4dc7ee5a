use clap::Parser;
use std::path::PathBuf;

/// Media concierge - search and request movies and TV shows by chatting
#[derive(Parser, Debug, Clone)]
#[command(name = "marquee", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "MARQUEE_CONFIG", default_value = "marquee.toml")]
    pub config: PathBuf,

    /// Catalog server URL (e.g. http://localhost:5055)
    #[arg(long, env = "MARQUEE_CATALOG_URL")]
    pub catalog_url: Option<String>,

    /// Catalog API key
    #[arg(long, env = "MARQUEE_CATALOG_API_KEY", hide_env_values = true)]
    pub catalog_api_key: Option<String>,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    /// Gemini model name
    #[arg(long, env = "MARQUEE_MODEL")]
    pub model: Option<String>,

    /// Maximum engine rounds per message
    #[arg(long, env = "MARQUEE_MAX_ROUNDS")]
    pub max_rounds: Option<u32>,

    /// Probe the catalog connection and exit
    #[arg(long)]
    pub check: bool,

    /// Print the URL the connection probe would hit and exit
    #[arg(long)]
    pub print_probe_url: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["marquee"]);
        assert_eq!(cli.config, PathBuf::from("marquee.toml"));
        assert!(!cli.check);
        assert!(!cli.print_probe_url);
    }

    #[test]
    fn test_cli_with_args() {
        let cli = Cli::parse_from([
            "marquee",
            "--config",
            "custom.toml",
            "--catalog-url",
            "http://localhost:5055/",
            "--catalog-api-key",
            "abc",
            "--model",
            "gemini-1.5-flash",
            "--max-rounds",
            "4",
            "--check",
        ]);
        assert_eq!(cli.config, PathBuf::from("custom.toml"));
        assert_eq!(cli.catalog_url.as_deref(), Some("http://localhost:5055/"));
        assert_eq!(cli.catalog_api_key.as_deref(), Some("abc"));
        assert_eq!(cli.model.as_deref(), Some("gemini-1.5-flash"));
        assert_eq!(cli.max_rounds, Some(4));
        assert!(cli.check);
    }
}
