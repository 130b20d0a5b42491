use serde::{Deserialize, Serialize};

fn default_host() -> String {
    "localhost".to_owned()
}

fn default_port() -> u16 {
    6379
}

fn default_connections() -> u32 {
    8
}

/// Configuration for connecting the redis client.
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct RedisConfig {
    /// Host name of the Redis instance.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port of the Redis instance.
    #[serde(default = "default_port")]
    pub port: u16,

    /// The maximum number of pooled connections.
    ///
    /// Defaults to 8.
    #[serde(default = "default_connections")]
    pub max_connections: u32,
}

impl RedisConfig {
    /// Returns the `redis://` connection url for this instance.
    pub fn url(&self) -> String {
        format!("redis://{}:{}", self.host, self.port)
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_connections: default_connections(),
        }
    }
}
