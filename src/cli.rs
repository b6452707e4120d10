use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;

/// Command line overrides. Unset flags are skipped so they don't shadow
/// values coming from the environment or the YAML file.
#[derive(Debug, Default, Parser, Serialize)]
#[command(name = "snake-scores", about = "Score submission and leaderboard API for the Snake game")]
pub struct Cli {
    /// Local YAML configuration file, loaded if present
    #[arg(long, default_value = ".env.local.yaml")]
    #[serde(skip)]
    pub config: PathBuf,

    /// Port to listen on
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Address to bind
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    /// Frontend origin allowed to call the API from a browser
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frontend_origin: Option<String>,

    /// One of TRACE, DEBUG, INFO, WARN, ERROR
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_level: Option<String>,

    /// Number of most recent scores to retain
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_scores: Option<usize>,
}
