use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use shelf_kernel::settings::Settings;
use time::Date;

#[derive(Parser)]
#[command(name = "shelf", about = "Scrape the book catalog and serve it over HTTP")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run migrations and start the HTTP server
    Serve,
    /// Scrape the catalog and write the dated CSV only
    Scrape {
        /// Index pages to walk (default: scraper.pages)
        #[arg(short = 'n', long, value_parser = clap::value_parser!(u32).range(1..))]
        pages: Option<u32>,
        /// Directory for the CSV (default: scraper.output_dir)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
    /// Run migrations, scrape, and load new books into the store
    Seed {
        /// Index pages to walk (default: scraper.pages)
        #[arg(short = 'n', long, value_parser = clap::value_parser!(u32).range(1..))]
        pages: Option<u32>,
    },
    /// Run migrations only
    Migrate,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // The local offset is only readable before the runtime spawns threads.
    let today = shelf_scraper::output::run_date();

    tokio::runtime::Runtime::new()
        .context("failed to start the async runtime")?
        .block_on(run(cli, today))
}

async fn run(cli: Cli, today: Date) -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load SHELF settings")?;
    shelf_telemetry::init(&settings.telemetry)?;

    match cli.command {
        Commands::Serve => {
            let app = shelf_app::bootstrap(&settings).await?;
            let served = shelf_http::start_server(&app.registry, &settings).await;
            app.db.close().await;
            served
        }
        Commands::Scrape { pages, output_dir } => {
            let pages = pages.unwrap_or(settings.scraper.pages);
            let scraper = shelf_app::http_scraper(&settings, output_dir)?;
            let output = scraper
                .run_dated(pages, today)
                .await
                .context("scrape failed")?;
            println!(
                "Scraped {} books into {}",
                output.records.len(),
                output.output_path.display()
            );
            Ok(())
        }
        Commands::Seed { pages } => {
            let pages = pages.unwrap_or(settings.scraper.pages);
            let app = shelf_app::bootstrap(&settings).await?;
            let scraper = shelf_app::http_scraper(&settings, None)?;
            let result = shelf_app::seed::seed(&scraper, &app.db.books(), pages, today).await;
            app.db.close().await;

            let report = result?;
            println!(
                "Scraped {} books: {} inserted, {} already stored ({})",
                report.scraped,
                report.inserted,
                report.skipped,
                report.output_path.display()
            );
            Ok(())
        }
        Commands::Migrate => {
            let app = shelf_app::bootstrap(&settings).await?;
            app.db.close().await;
            println!("Migrations applied");
            Ok(())
        }
    }
}
