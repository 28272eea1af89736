//! CLI arguments and environment resolution.
//!
//! CI provides the revision and the API token through the environment
//! (`BUILD_SOURCE_VERSION`, `SPLUNK_API`); everything else is a flag with a
//! default suited to a local management port.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use crate::pipeline::PipelineOptions;
use crate::splunk::SplunkConfig;

/// Environment variable the CI system sets to the commit under test.
pub const REVISION_ENV: &str = "BUILD_SOURCE_VERSION";
/// Environment variable carrying the backend API token.
pub const TOKEN_ENV: &str = "SPLUNK_API";

#[derive(Parser, Debug)]
#[command(name = "detci")]
#[command(
    about = "Registers changed detection documents as scheduled alerts, \
             fires their test cases, and verifies every alert fired"
)]
pub struct Args {
    /// Revision whose changed files are processed (default: $BUILD_SOURCE_VERSION)
    #[arg(long)]
    pub revision: Option<String>,

    /// Repository root the change-set paths are relative to
    #[arg(long, default_value = ".")]
    pub repo_root: PathBuf,

    /// Management base URL of the alerting backend
    #[arg(long, default_value = "https://localhost:8089")]
    pub splunk_url: String,

    /// API token (default: $SPLUNK_API)
    #[arg(long)]
    pub token: Option<String>,

    /// App namespace for saved searches
    #[arg(long, default_value = "search")]
    pub app: String,

    /// Owner namespace for saved searches
    #[arg(long, default_value = "admin")]
    pub owner: String,

    /// Accept a self-signed management-port certificate
    #[arg(long)]
    pub insecure: bool,

    /// Stimulus interpreter executable
    #[arg(long, default_value = "pwsh")]
    pub interpreter: String,

    /// Fixed arguments passed to the interpreter before the payload
    #[arg(
        long = "interpreter-arg",
        default_values_t = [
            "-NoProfile".to_string(),
            "-NonInteractive".to_string(),
            "-Command".to_string(),
        ]
    )]
    pub interpreter_args: Vec<String>,

    /// Seconds between fired-alert polls
    #[arg(long, default_value = "5")]
    pub poll_interval: u64,

    /// Overall validation window in seconds; must exceed the alert cadence
    #[arg(long, default_value = "120")]
    pub validation_timeout: u64,

    /// Seconds to wait before the first poll
    #[arg(long, default_value = "0")]
    pub settle: u64,

    /// HTTP request timeout in seconds
    #[arg(long, default_value = "30")]
    pub http_timeout: u64,
}

/// Fully resolved configuration for one run.
#[derive(Debug, Clone)]
pub struct Config {
    pub revision: String,
    pub repo_root: PathBuf,
    pub splunk: SplunkConfig,
    pub interpreter: String,
    pub interpreter_args: Vec<String>,
    pub options: PipelineOptions,
}

impl Config {
    pub fn resolve(args: Args) -> anyhow::Result<Config> {
        let revision = args
            .revision
            .or_else(|| std::env::var(REVISION_ENV).ok())
            .with_context(|| format!("no revision: pass --revision or set {REVISION_ENV}"))?;

        let token = args
            .token
            .or_else(|| std::env::var(TOKEN_ENV).ok())
            .with_context(|| format!("no API token: pass --token or set {TOKEN_ENV}"))?;

        Ok(Config {
            revision,
            repo_root: args.repo_root.clone(),
            splunk: SplunkConfig {
                base_url: args.splunk_url,
                token,
                app: args.app,
                owner: args.owner,
                timeout: Duration::from_secs(args.http_timeout),
                accept_invalid_certs: args.insecure,
            },
            interpreter: args.interpreter,
            interpreter_args: args.interpreter_args,
            options: PipelineOptions {
                docs_root: args.repo_root,
                settle: Duration::from_secs(args.settle),
                poll_interval: Duration::from_secs(args.poll_interval),
                validation_timeout: Duration::from_secs(args.validation_timeout),
                ..PipelineOptions::default()
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_a_local_management_port() {
        let args = Args::try_parse_from(["detci", "--revision", "HEAD", "--token", "t"]).unwrap();
        assert_eq!(args.splunk_url, "https://localhost:8089");
        assert_eq!(args.app, "search");
        assert_eq!(args.owner, "admin");
        assert_eq!(args.validation_timeout, 120);
        assert!(!args.insecure);

        let config = Config::resolve(args).unwrap();
        assert_eq!(config.revision, "HEAD");
        assert_eq!(config.interpreter, "pwsh");
        assert_eq!(
            config.interpreter_args,
            vec!["-NoProfile", "-NonInteractive", "-Command"]
        );
    }

    #[test]
    fn validation_window_dominates_the_default_cadence() {
        // Default profile schedules every minute; the poll window must be
        // longer or validation races the first evaluation.
        let args = Args::try_parse_from(["detci", "--revision", "r", "--token", "t"]).unwrap();
        assert!(Duration::from_secs(args.validation_timeout) > Duration::from_secs(60));
    }
}
