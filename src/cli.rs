//! Command-line interface definitions for NewsByte.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Most options can also come from environment variables or from the YAML
//! settings file (see [`crate::config`]); flags given here win.

use clap::Parser;

/// Command-line arguments for the NewsByte chat.
///
/// # Examples
///
/// ```sh
/// # Talk to GNews directly
/// GNEWS_API_KEY=... newsbyte
///
/// # Go through a proxy that injects the key server-side
/// newsbyte --endpoint http://localhost:3000/api/news
///
/// # No typing delays, nothing written to disk
/// newsbyte --no-delay --ephemeral
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML settings file
    #[arg(short, long, env = "NEWSBYTE_CONFIG")]
    pub config: Option<String>,

    /// News search endpoint (GNews-compatible, or a proxy in front of it)
    #[arg(short, long, env = "NEWS_ENDPOINT")]
    pub endpoint: Option<String>,

    /// API key sent as the `token` query parameter
    #[arg(long, env = "GNEWS_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Number of articles to request per search
    #[arg(short, long)]
    pub max_results: Option<usize>,

    /// Language code sent with each search
    #[arg(long)]
    pub lang: Option<String>,

    /// Where to keep the usage count
    #[arg(long)]
    pub usage_file: Option<String>,

    /// Keep the usage count in memory only
    #[arg(long)]
    pub ephemeral: bool,

    /// Skip the typing delays between messages
    #[arg(long)]
    pub no_delay: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["newsbyte"]);

        assert_eq!(cli.max_results, None);
        assert!(!cli.ephemeral);
        assert!(!cli.no_delay);
    }

    #[test]
    fn test_cli_long_flags() {
        let cli = Cli::parse_from([
            "newsbyte",
            "--endpoint",
            "http://localhost:3000/api/news",
            "--max-results",
            "5",
            "--usage-file",
            "/tmp/usage.json",
            "--no-delay",
        ]);

        assert_eq!(
            cli.endpoint.as_deref(),
            Some("http://localhost:3000/api/news")
        );
        assert_eq!(cli.max_results, Some(5));
        assert_eq!(cli.usage_file.as_deref(), Some("/tmp/usage.json"));
        assert!(cli.no_delay);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from(["newsbyte", "-c", "/tmp/newsbyte.yaml", "-m", "2"]);

        assert_eq!(cli.config.as_deref(), Some("/tmp/newsbyte.yaml"));
        assert_eq!(cli.max_results, Some(2));
    }
}
