use crate::cli::Cli;
use crate::core::leaderboard::MAX_SCORES;
use crate::error::{ScoresError, ScoresResult};
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::Deserialize;
use tracing::Level;

const TRACE_LEVELS: [&str; 5] = ["TRACE", "DEBUG", "INFO", "WARN", "ERROR"];

// Environment variables read by the service, matched case-insensitively.
// Example: FRONTEND_ORIGIN="https://snake.example.com" sets frontend_origin.
const ENV_KEYS: [&str; 4] = ["port", "frontend_origin", "trace_level", "max_scores"];

// Shells and containers often export HOST as the machine name, so the bind
// address is only read from SNAKE_HOST.
const ENV_PREFIX: &str = "SNAKE_";
const PREFIXED_ENV_KEYS: [&str; 1] = ["host"];

// Settings are layered: defaults < YAML file < environment < command line.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Settings {
    #[serde(default = "default_trace_level")]
    trace_level: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    // Origin of the game frontend, allowed through CORS alongside localhost:3000.
    #[serde(default = "default_frontend_origin")]
    pub frontend_origin: String,
    #[serde(default = "default_max_scores")]
    pub max_scores: usize,
}

impl Settings {
    pub fn new(cli: &Cli) -> ScoresResult<Self> {
        Settings::from_figment(Settings::figment(cli))
    }

    pub fn figment(cli: &Cli) -> Figment {
        Figment::new()
            .merge(Yaml::file(&cli.config))
            .merge(Env::raw().only(&ENV_KEYS))
            .merge(Env::prefixed(ENV_PREFIX).only(&PREFIXED_ENV_KEYS))
            .merge(Serialized::defaults(cli))
    }

    pub fn from_figment(figment: Figment) -> ScoresResult<Self> {
        let settings: Settings = figment.extract()?;
        if settings.max_scores == 0 {
            return Err(ScoresError::Config(
                "max_scores must be at least 1".to_string(),
            ));
        }
        Ok(settings)
    }

    pub fn get_trace_level(&self) -> Level {
        get_trace_level(&self.trace_level)
    }
}

fn get_trace_level(level_str: &str) -> Level {
    match level_str.to_uppercase().as_str() {
        level if level == TRACE_LEVELS[0] => Level::TRACE,
        level if level == TRACE_LEVELS[1] => Level::DEBUG,
        level if level == TRACE_LEVELS[2] => Level::INFO,
        level if level == TRACE_LEVELS[3] => Level::WARN,
        level if level == TRACE_LEVELS[4] => Level::ERROR,
        // Default trace level
        _ => Level::INFO,
    }
}

fn default_trace_level() -> String {
    "INFO".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_frontend_origin() -> String {
    "http://localhost:3000".to_string()
}

fn default_max_scores() -> usize {
    MAX_SCORES
}
