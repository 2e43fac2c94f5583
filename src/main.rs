//! Binary entry point: parse the command line, open the database, run the
//! menu loop, and close the connection on the way out.
use anyhow::Context;
use clap::Parser;
use log::{error, info};

use retail_terminal::{init_logging, open_database, run_app, seed_demo_data, App, AppConfig, Cli};

fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_cli(Cli::parse())?;
    init_logging(&config)?;

    info!("Connecting to database {}", config.connection_url());
    let mut conn = open_database(&config.database_path)?;
    info!("Done");

    if config.seed_demo && seed_demo_data(&mut conn)? {
        info!("demo data loaded into {}", config.database_path.display());
    }

    let mut app = App::new(conn, config);
    let outcome = run_app(&mut app);
    if let Err(err) = &outcome {
        error!("menu loop failed: {err:#}");
    }

    info!("Disconnecting from database...");
    app.into_connection()
        .close()
        .map_err(|(_, err)| err)
        .context("failed to close database connection")?;
    info!("Done");

    outcome
}
