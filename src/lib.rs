//! SHELF application library.
//!
//! Wires the catalog and auth modules onto a shared database and exposes the
//! seeding workflow used by the `shelf` CLI.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use shelf_authz::JwtService;
use shelf_db::Database;
use shelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};
use shelf_scraper::{HttpPageSource, Scraper};

pub mod modules;
pub mod seed;

/// Connected database plus the registry of modules built on it.
pub struct App {
    pub db: Database,
    pub registry: ModuleRegistry,
}

/// Build the module registry over an open database.
pub fn build_registry(db: &Database, settings: &Settings) -> ModuleRegistry {
    let jwt = Arc::new(JwtService::from_settings(&settings.auth));
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, db, jwt);
    registry
}

/// Apply every module's migrations.
pub async fn migrate(db: &Database, registry: &ModuleRegistry) -> anyhow::Result<()> {
    db.run_migrations(&registry.collect_migrations()).await
}

/// Connect, migrate and initialize every module.
pub async fn bootstrap(settings: &Settings) -> anyhow::Result<App> {
    let db = Database::connect(&settings.database).await?;
    let registry = build_registry(&db, settings);

    migrate(&db, &registry).await?;
    registry
        .init_modules(&InitCtx { settings })
        .await
        .context("module initialization failed")?;

    tracing::info!(modules = registry.module_count(), "bootstrap complete");
    Ok(App { db, registry })
}

/// Scraper over the live site, configured from `settings.scraper`.
pub fn http_scraper(
    settings: &Settings,
    output_dir: Option<PathBuf>,
) -> anyhow::Result<Scraper<HttpPageSource>> {
    let source = HttpPageSource::new(settings.scraper.user_agent.as_deref())?;
    let output_dir = output_dir.unwrap_or_else(|| settings.scraper.output_dir.clone());
    Ok(Scraper::new(source, &settings.scraper.base_url, output_dir)?)
}
