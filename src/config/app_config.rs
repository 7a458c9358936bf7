use std::{collections::BTreeMap, path::Path};

use config::{Config, ConfigError, Environment, File, Source};
use serde::{Deserialize, Deserializer};

use super::{RoomConfig, ServerConfig};

/// Default location of the application configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "configs/app.yaml";

/// Prefix of the environment variables overriding the configuration file.
pub const ENV_PREFIX: &str = "ALERT_RELAY";

/// Application configuration for alert-relay.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// The rooms alerts can be routed to, sorted by name. In the file they are
    /// a map keyed by room name, so the environment can address each room.
    #[serde(default, deserialize_with = "deserialize_rooms")]
    pub rooms: Vec<RoomConfig>,
}

/// Reads the room map and names every room after its key.
fn deserialize_rooms<'de, D>(deserializer: D) -> Result<Vec<RoomConfig>, D::Error>
where
    D: Deserializer<'de>,
{
    let rooms = BTreeMap::<String, RoomConfig>::deserialize(deserializer)?;
    Ok(rooms
        .into_iter()
        .map(|(name, mut room)| {
            room.name = name;
            room
        })
        .collect())
}

impl AppConfig {
    /// Creates a new `AppConfig` from a YAML file, with `ALERT_RELAY__`
    /// prefixed environment variables taking precedence.
    ///
    /// An explicitly given file must exist. Without one, the default file is
    /// read when present and the environment alone is used otherwise.
    pub fn new(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match config_path {
            Some(path) => File::from(path),
            None => File::from(Path::new(DEFAULT_CONFIG_PATH)).required(false),
        };
        Self::load(file, Environment::with_prefix(ENV_PREFIX).separator("__"))
    }

    fn load<S>(file: S, env: Environment) -> Result<Self, ConfigError>
    where
        S: Source + Send + Sync + 'static,
    {
        let s = Config::builder().add_source(file).add_source(env).build()?;
        s.try_deserialize()
    }

    /// Returns the configuration of the named room, if any. When a name is
    /// declared twice the last declaration is returned, matching routing.
    pub fn room(&self, name: &str) -> Option<&RoomConfig> {
        self.rooms.iter().rev().find(|r| r.name == name)
    }
}
