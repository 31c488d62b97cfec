pub mod config;
pub mod types;

pub use config::{load_config, load_config_from_env, ConfigError, EngineConfig};
pub use types::{
    Device, Keyword, RankMatch, RefreshResult, ScrapeFailure, ScrapeSettings, ScrapeSuccess,
    SerpEntry,
};
