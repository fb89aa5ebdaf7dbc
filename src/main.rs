use clap::Parser;
use color_eyre::Result;
use tablebox::theme::theme_from_name;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::App;

mod app;
mod cli;
mod config;
mod data;
mod tui;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let _guard = initialize_logging()?;
    info!("Starting tablebox");

    let args = cli::Args::parse();

    let config = config::load(args.config.as_deref())?;
    let theme = theme_from_name(&config.theme.name);
    let options = config.table.options(&theme);

    let table = match &args.data {
        Some(path) => data::build_table(data::load(path, args.kv)?, &config.columns, options)?,
        None => data::sample_table(&config.columns, options)?,
    };

    let mut screenshot = config.screenshot.options(&theme);
    if let Some(dir) = args.screenshot_dir {
        screenshot.dir = dir;
    }

    let mut app = App::new(table, theme, screenshot);
    app.run().await?;

    Ok(())
}

fn initialize_logging() -> Result<WorkerGuard> {
    let directory = dirs::data_local_dir().map_or_else(
        || std::path::PathBuf::from("logs"),
        |path| path.join("tablebox").join("logs"),
    );
    std::fs::create_dir_all(&directory)?;

    let file_appender = tracing_appender::rolling::daily(&directory, "tablebox.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true),
        )
        .init();

    Ok(guard)
}
