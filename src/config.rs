/// Parse the configuration file.
use arc_swap::ArcSwap;
use log::{error, info};
use once_cell::sync::Lazy;
use serde_derive::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio_postgres::config::SslMode;

use crate::errors::Error;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Globally available configuration.
static CONFIG: Lazy<ArcSwap<Config>> = Lazy::new(|| ArcSwap::from_pointee(Config::default()));

/// Where and how to reach the pgstac database.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Database {
    #[serde(default = "Database::default_host")]
    pub host: String,

    #[serde(default = "Database::default_port")]
    pub port: u16,

    #[serde(default = "Database::default_user")]
    pub user: String,

    #[serde(default = "Database::default_password")]
    pub password: String,

    #[serde(default = "Database::default_dbname")]
    pub dbname: String,

    #[serde(default = "Database::default_sslmode")]
    pub sslmode: String,

    /// Milliseconds; 0 waits for the OS.
    #[serde(default = "Database::default_connect_timeout")]
    pub connect_timeout: u64,

    #[serde(default = "Database::default_application_name")]
    pub application_name: String,
}

impl Database {
    pub fn default_host() -> String {
        "localhost".into()
    }

    pub fn default_port() -> u16 {
        5439
    }

    pub fn default_user() -> String {
        "username".into()
    }

    pub fn default_password() -> String {
        "password".into()
    }

    pub fn default_dbname() -> String {
        "postgis".into()
    }

    pub fn default_sslmode() -> String {
        "disable".into()
    }

    pub fn default_connect_timeout() -> u64 {
        5000
    }

    pub fn default_application_name() -> String {
        "pgstac-concurrenttest".into()
    }

    /// Address used in log lines, e.g. `localhost:5439/postgis`.
    pub fn address(&self) -> String {
        format!("{}:{}/{}", self.host, self.port, self.dbname)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.host.is_empty() {
            error!("database.host must not be empty");
            return Err(Error::BadConfig);
        }

        if self.port == 0 {
            error!("database.port must be between 1 and 65535");
            return Err(Error::BadConfig);
        }

        if self.user.is_empty() {
            error!("database.user must not be empty");
            return Err(Error::BadConfig);
        }

        if self.dbname.is_empty() {
            error!("database.dbname must not be empty");
            return Err(Error::BadConfig);
        }

        match self.sslmode.as_ref() {
            "disable" => (),
            other => {
                error!(
                    "database.sslmode must be 'disable', TLS is not supported, got: '{}'",
                    other
                );
                return Err(Error::BadConfig);
            }
        };

        Ok(())
    }

    /// Connection parameters in the form the driver understands.
    pub fn to_pg_config(&self) -> tokio_postgres::Config {
        let mut pg_config = tokio_postgres::Config::new();

        pg_config
            .host(&self.host)
            .port(self.port)
            .user(&self.user)
            .password(&self.password)
            .dbname(&self.dbname)
            .application_name(&self.application_name)
            .ssl_mode(SslMode::Disable);

        if self.connect_timeout > 0 {
            pg_config.connect_timeout(Duration::from_millis(self.connect_timeout));
        }

        pg_config
    }
}

impl Default for Database {
    fn default() -> Database {
        Database {
            host: Self::default_host(),
            port: Self::default_port(),
            user: Self::default_user(),
            password: Self::default_password(),
            dbname: Self::default_dbname(),
            sslmode: Self::default_sslmode(),
            connect_timeout: Self::default_connect_timeout(),
            application_name: Self::default_application_name(),
        }
    }
}

/// What to run and how many times at once.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Search {
    #[serde(default = "Search::default_query")]
    pub query: String,

    #[serde(default = "Search::default_workers")]
    pub workers: usize,
}

impl Search {
    pub fn default_query() -> String {
        r#"SELECT search('{"limit": 1}'::jsonb);"#.into()
    }

    pub fn default_workers() -> usize {
        12
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.query.trim().is_empty() {
            error!("search.query must not be empty");
            return Err(Error::BadConfig);
        }

        if self.workers == 0 {
            error!("search.workers must be at least 1");
            return Err(Error::BadConfig);
        }

        Ok(())
    }
}

impl Default for Search {
    fn default() -> Search {
        Search {
            query: Self::default_query(),
            workers: Self::default_workers(),
        }
    }
}

/// Configuration wrapper.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    // Simple fields go before tables, otherwise the serializer
    // emits a ValueAfterTable error.
    #[serde(default = "Config::default_path")]
    pub path: String,

    #[serde(default)]
    pub database: Database,

    #[serde(default)]
    pub search: Search,
}

impl Config {
    pub fn default_path() -> String {
        String::from("pgstac.toml")
    }

    /// Defaults that did not come from any file.
    pub fn built_in() -> Config {
        Config {
            path: String::new(),
            ..Config::default()
        }
    }

    /// Deserialize and validate, remembering where the text came from.
    pub fn from_toml(contents: &str, path: &str) -> Result<Config, Error> {
        let mut config: Config = toml::from_str(contents).map_err(|err| {
            error!("Could not parse config file '{}': {}", path, err);
            Error::BadConfig
        })?;

        config.validate()?;
        config.path = path.to_string();

        Ok(config)
    }

    /// The file this configuration was read from, for humans.
    pub fn source(&self) -> &str {
        if self.path.is_empty() {
            "built-in defaults"
        } else {
            &self.path
        }
    }

    /// Print current configuration.
    pub fn show(&self) {
        info!("Version: {}", VERSION);
        info!("Config file: {}", self.source());
        info!("Database: {}", self.database.address());
        info!("User: {}", self.database.user);
        info!("SSL mode: {}", self.database.sslmode);
        info!("Connection timeout: {}ms", self.database.connect_timeout);
        info!("Workers: {}", self.search.workers);
    }

    pub fn validate(&self) -> Result<(), Error> {
        self.database.validate()?;
        self.search.validate()?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Config {
        Config {
            path: Self::default_path(),
            database: Database::default(),
            search: Search::default(),
        }
    }
}

/// Get a read-only instance of the configuration
/// from anywhere in the app.
pub fn get_config() -> Config {
    (*(*CONFIG.load())).clone()
}

/// Use the built-in defaults, no file involved.
pub fn use_defaults() -> Result<(), Error> {
    let config = Config::built_in();
    config.validate()?;
    CONFIG.store(Arc::new(config));
    Ok(())
}

/// Load, validate and publish the configuration file at `path`.
pub async fn parse(path: &str) -> Result<(), Error> {
    let contents = tokio::fs::read_to_string(path).await.map_err(|err| {
        error!("Could not read config file '{}': {}", path, err);
        Error::BadConfig
    })?;

    let config = Config::from_toml(&contents, path)?;
    CONFIG.store(Arc::new(config));

    Ok(())
}
