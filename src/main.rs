use std::error::Error;
use std::sync::Arc;

use futures::future::FutureExt;
use reqwest::Client;
use tokio::sync::mpsc;
use warp::Filter;

use moodtrack::analysis::OpenAiAnalyzer;
use moodtrack::config::{get_variable, get_variable_or, Config};
use moodtrack::db::PgDb;
use moodtrack::environment::Environment;
use moodtrack::log::{info, initialize_logger};
use moodtrack::music::SpotifyCatalog;
use moodtrack::routes;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();

    let logger = initialize_logger(&get_variable_or("MOODTRACK_LOG_LEVEL", "info"));

    let main_port: u16 = get_variable("MOODTRACK_PORT")
        .parse()
        .expect("parse MOODTRACK_PORT as u16");
    let admin_port: u16 = get_variable("MOODTRACK_ADMIN_PORT")
        .parse()
        .expect("parse MOODTRACK_ADMIN_PORT as u16");

    info!(logger, "Starting..."; "main_port" => main_port, "admin_port" => admin_port);
    let logger = Arc::new(logger);

    info!(logger, "Creating database pool...");
    let connection_string = get_variable("MOODTRACK_DB_CONNECTION_STRING");
    let pool = sqlx::Pool::connect(&connection_string)
        .await
        .expect("create database pool from MOODTRACK_DB_CONNECTION_STRING");
    let db = Arc::new(PgDb::new(pool));

    // both services share one connection pool
    let client = Client::new();
    let analyzer =
        Arc::new(OpenAiAnalyzer::from_env(client.clone()).expect("parse OPENAI_BASE_URL"));
    let catalog = Arc::new(SpotifyCatalog::from_env(client).expect("parse Spotify API URLs"));

    let config = Config::from_env();
    info!(logger, "Loaded configuration"; "config" => ?config);

    let environment = Environment::new(logger.clone(), db, analyzer, catalog, config);

    let (termination_sender, mut termination_receiver) = mpsc::channel::<()>(1);

    let terminate = Arc::new(move || {
        let termination_sender = termination_sender.clone();

        async move {
            // the receiver only goes away once shutdown has started
            termination_sender.send(()).await.ok();
        }
        .boxed()
    });

    let should_terminate = async move {
        termination_receiver.recv().await;
    }
    .shared();

    let ctrlc = {
        let should_terminate = should_terminate.clone();
        let terminate = terminate.clone();

        let signal = tokio::signal::ctrl_c();

        async move {
            tokio::select! {
                _ = should_terminate => {},
                _ = signal => {
                    terminate().await;
                }
            }
        }
    };

    let main_server = {
        let should_terminate = should_terminate.clone();

        let routes = routes::make_api(environment.clone());

        let (_, main_server) =
            warp::serve(routes).bind_with_graceful_shutdown(([0, 0, 0, 0], main_port), async {
                should_terminate.await;
            });

        main_server
    };

    let admin_server = {
        let should_terminate = should_terminate.clone();
        let terminate = terminate.clone();

        let routes = routes::admin::make_healthz_route(environment.clone()).or(
            routes::admin::make_termination_route(environment.clone(), terminate),
        );

        let (_, admin_server) =
            warp::serve(routes).bind_with_graceful_shutdown(([0, 0, 0, 0], admin_port), async {
                should_terminate.await;
            });

        admin_server
    };

    tokio::join!(ctrlc, main_server, admin_server);

    info!(logger, "Exiting gracefully...");

    Ok(())
}
