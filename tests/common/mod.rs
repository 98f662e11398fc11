use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

/// Fresh in-memory SQLite database with the full schema applied. One
/// connection only, so every statement sees the same memory file.
pub async fn test_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1);
    let db = Database::connect(opts)
        .await
        .expect("failed to open in-memory sqlite");
    Migrator::up(&db, None).await.expect("migrations failed");
    db
}
