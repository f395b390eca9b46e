use chrono::Duration;
use log::{error, info, warn};
use mongodb::Client as MongoClient;
use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Rocket,
};
use serde::{Deserialize, Serialize};

use crate::model::{
    feed::FeedPolicy,
    mongodb::ensure_indexes_exist,
    store::{MemoryStore, MongoStore, Questions},
};

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    recency_window_days: u32,
    report_floor: u32,
    report_ratio: f64,
    batch_size: u32,
    max_option_length: usize,
    allowed_origin: String,
}

impl Default for Config {
    fn default() -> Self {
        let policy = FeedPolicy::default();
        Self {
            recency_window_days: 10,
            report_floor: policy.report_floor,
            report_ratio: policy.report_ratio,
            batch_size: policy.batch_size,
            max_option_length: 50,
            allowed_origin: "*".to_string(),
        }
    }
}

impl Config {
    /// How far back the feed looks for questions.
    pub fn recency_window(&self) -> Duration {
        Duration::days(self.recency_window_days.into())
    }

    /// The feed selection parameters.
    pub fn feed_policy(&self) -> FeedPolicy {
        FeedPolicy {
            recency_window: self.recency_window(),
            report_floor: self.report_floor,
            report_ratio: self.report_ratio,
            batch_size: self.batch_size,
        }
    }

    /// Options longer than this many characters are truncated on submission.
    pub fn max_option_length(&self) -> usize {
        self.max_option_length
    }

    /// Value of the `Access-Control-Allow-Origin` header.
    pub fn allowed_origin(&self) -> &str {
        &self.allowed_origin
    }
}

/// A fairing that loads the application config and puts it in managed state.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        if config.report_ratio.is_nan() || config.report_ratio <= 0.0 || config.batch_size == 0 {
            error!("`report_ratio` and `batch_size` must both be positive");
            return Err(rocket);
        }

        // Manage the state.
        rocket = rocket.manage(config);
        Ok(rocket)
    }
}

/// Which backing store to serve questions from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Mongodb,
    Memory,
}

/// Configuration for the database.
#[derive(Deserialize)]
struct DbConfig {
    #[serde(default)]
    store: StoreKind,
    #[serde(default = "default_db_name")]
    db_name: String,
    // secrets
    db_uri: Option<String>,
}

fn default_db_name() -> String {
    "pebblevote".to_string()
}

/// A fairing that loads the storage config, connects to the database,
/// performs any setup necessary, and places a [`Questions`] handle into
/// managed state.
pub struct DatabaseFairing;

#[rocket::async_trait]
impl Fairing for DatabaseFairing {
    fn info(&self) -> Info {
        Info {
            name: "MongoDB",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // A store may already have been supplied, e.g. by tests.
        if rocket.state::<Questions>().is_some() {
            return Ok(rocket);
        }

        // Load the config.
        let config = match rocket.figment().extract::<DbConfig>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load database config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        let questions = match config.store {
            StoreKind::Memory => {
                warn!("Using the in-memory store; questions will not survive a restart");
                Questions::from(MemoryStore::new())
            }
            StoreKind::Mongodb => {
                let Some(db_uri) = config.db_uri else {
                    error!("`db_uri` must be set to use the MongoDB store");
                    return Err(rocket);
                };
                info!("Loaded database config, connecting...");
                // Construct the connection pool.
                let client = match MongoClient::with_uri_str(db_uri).await {
                    Ok(client) => client,
                    Err(e) => {
                        error!("Failed to connect to database: {e}");
                        return Err(rocket);
                    }
                };
                let db = client.database(&config.db_name);

                // Ensure the required indexes exist.
                if let Err(e) = ensure_indexes_exist(&db).await {
                    error!("Failed to connect to database: {e}");
                    return Err(rocket);
                }
                info!("...database connection online!");
                Questions::from(MongoStore::new(&db))
            }
        };

        // Manage the state.
        rocket = rocket.manage(questions);
        Ok(rocket)
    }
}
