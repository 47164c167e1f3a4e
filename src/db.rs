use std::time::Duration;

use anyhow::Result;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

use crate::migrator::Migrator;

pub type OrmConn = DatabaseConnection;

/// Create a SeaORM connection.
///
/// In-memory SQLite databases live and die with their connection, so the
/// pool is pinned to a single connection for them.
pub async fn create_orm_conn(database_url: &str, max_connections: u32) -> Result<OrmConn> {
    let mut opts = ConnectOptions::new(database_url.to_owned());
    if database_url.starts_with("sqlite") && database_url.contains(":memory:") {
        opts.max_connections(1).min_connections(1);
    } else {
        opts.max_connections(max_connections)
            .connect_timeout(Duration::from_secs(8));
    }
    opts.sqlx_logging(false);

    let conn = Database::connect(opts).await?;
    Ok(conn)
}

/// Apply all pending schema migrations.
pub async fn run_migrations(conn: &OrmConn) -> Result<()> {
    Migrator::up(conn, None).await?;
    Ok(())
}
