use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tasknote_core::agenda::AgendaConfig;

pub const CONFIG_FILE: &str = "tasknote.toml";
const ENV_PREFIX: &str = "TASKNOTE_";

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// SQLite file path or `sqlite:` URL
    pub database_path: String,
    /// Whose completion ledger the commands read and write
    pub owner: String,
    pub agenda: AgendaConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: "tasknote.db".to_string(),
            owner: "local".to_string(),
            agenda: AgendaConfig::default(),
        }
    }
}

impl Config {
    pub fn new() -> Result<Self, figment::Error> {
        Self::figment(CONFIG_FILE).extract()
    }

    /// Defaults, then the TOML file, then `TASKNOTE_*` variables.
    /// Nested keys use a double underscore: `TASKNOTE_AGENDA__LOOKAHEAD_DAYS`.
    pub fn figment(path: &str) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }
}
