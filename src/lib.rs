#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{Build, Rocket};

pub mod api;
pub mod config;
pub mod cors;
pub mod error;
pub mod logging;
pub mod model;

pub use config::Config;

use config::{ConfigFairing, DatabaseFairing};
use cors::CorsFairing;
use logging::LoggerFairing;
use model::store::Questions;

/// Build the server, connecting to the store named in the configuration.
pub fn build() -> Rocket<Build> {
    mount(rocket::build()).attach(DatabaseFairing)
}

/// Build the server on top of an existing store.
pub fn rocket_for_store(rocket: Rocket<Build>, questions: impl Into<Questions>) -> Rocket<Build> {
    mount(rocket).manage(questions.into())
}

fn mount(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket
        .attach(LoggerFairing)
        .attach(ConfigFairing)
        .attach(CorsFairing)
        .mount("/", api::routes())
        .register("/", api::catchers())
}
