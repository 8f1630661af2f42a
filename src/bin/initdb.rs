//! A helper program to create the database tables.

use std::error::Error;

use dotenv::dotenv;
use structopt::StructOpt;

use moodtrack::config::{get_variable, get_variable_or};
use moodtrack::db::PgDb;
use moodtrack::log::{debug, info, initialize_logger};

#[derive(Debug, StructOpt)]
#[structopt(name = "initdb", about = "Create any missing mood tracking tables")]
struct Opt {
    /// The database to initialize. Defaults to
    /// MOODTRACK_DB_CONNECTION_STRING.
    #[structopt(long)]
    connection_string: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();

    let opt = Opt::from_args();

    let logger = initialize_logger(&get_variable_or("MOODTRACK_LOG_LEVEL", "debug"));

    let connection_string = opt
        .connection_string
        .unwrap_or_else(|| get_variable("MOODTRACK_DB_CONNECTION_STRING"));

    debug!(logger, "Connecting to database...");
    let pool = sqlx::Pool::connect(&connection_string).await?;
    let db = PgDb::new(pool);

    debug!(logger, "Creating tables...");
    db.initialize_schema().await?;

    info!(logger, "Completed initialization.");

    Ok(())
}
