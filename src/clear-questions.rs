//! Maintenance tool that removes every question from the database.
//! This is never exposed over HTTP.

use clap::{Arg, ArgAction, ArgMatches, Command};
use mongodb::{error::Error as DbError, Client};
use thiserror::Error;

use pebblevote_backend::model::store::{MongoStore, QuestionStore};

const PROGRAM_NAME: &str = "clear-questions";

const ABOUT_TEXT: &str = "Delete ALL questions, votes, reports and skips.

EXIT CODES:
     0: Questions removed.
     1: Error.
     2: Refused to run without --yes.";

const DB_URI: &str = "DB_URI";
const DB_NAME: &str = "DB_NAME";
const YES: &str = "YES";

/// Construct the CLI configuration.
fn cli() -> Command {
    // Make the build dirty when the toml changes.
    include_str!("../Cargo.toml");

    clap::command!(PROGRAM_NAME)
        .about(ABOUT_TEXT)
        .arg(
            Arg::new(DB_URI)
                .long("db-uri")
                .env("ROCKET_DB_URI")
                .help("MongoDB connection string")
                .action(ArgAction::Set)
                .required(true),
        )
        .arg(
            Arg::new(DB_NAME)
                .long("db-name")
                .env("ROCKET_DB_NAME")
                .help("Database holding the questions")
                .action(ArgAction::Set)
                .default_value("pebblevote"),
        )
        .arg(
            Arg::new(YES)
                .long("yes")
                .help("Confirm that every question should be deleted")
                .action(ArgAction::SetTrue),
        )
}

/// Errors that this program may produce.
#[derive(Debug, Error)]
enum Error {
    /// A required argument had no value.
    #[error("missing argument `{0}`")]
    MissingArgument(&'static str),
    /// The database could not be reached.
    #[error("failed to connect: {0}")]
    Connection(#[source] DbError),
    /// The database refused the deletion.
    #[error(transparent)]
    Store(#[from] pebblevote_backend::error::Error),
}

async fn run(matches: &ArgMatches) -> Result<u64, Error> {
    let uri = matches
        .get_one::<String>(DB_URI)
        .ok_or(Error::MissingArgument("--db-uri"))?;
    let name = matches
        .get_one::<String>(DB_NAME)
        .ok_or(Error::MissingArgument("--db-name"))?;

    let client = Client::with_uri_str(uri).await.map_err(Error::Connection)?;
    let store = MongoStore::new(&client.database(name));
    Ok(store.clear().await?)
}

#[rocket::main]
async fn main() {
    let matches = cli().get_matches();
    if !matches.get_flag(YES) {
        eprintln!("Refusing to delete every question without --yes");
        std::process::exit(2);
    }

    match run(&matches).await {
        Ok(removed) => println!("Cleaned: removed {removed} questions"),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
