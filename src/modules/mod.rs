pub mod auth;
pub mod books;

use std::sync::Arc;

use shelf_authz::JwtService;
use shelf_db::Database;
use shelf_kernel::ModuleRegistry;

/// Register all project-specific modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, db: &Database, jwt: Arc<JwtService>) {
    registry.register(Arc::new(auth::AuthModule::new(db.users(), jwt)));
    registry.register(Arc::new(books::BooksModule::new(db.books())));
}
