use std::path::Path;

use sqlx::migrate::Migrator;
use tracing::info;

use super::handle::{Database, DatabaseError};

/// Applies the ordered `.sql` files under `dir` that have not run yet.
/// Files are executed sequentially in filename order.
pub async fn run_migrations(db: &Database, dir: &Path) -> Result<(), DatabaseError> {
    let migrator = Migrator::new(dir)
        .await
        .map_err(|e| DatabaseError::Migration(e.to_string()))?;
    migrator
        .run(db.pool())
        .await
        .map_err(|e| DatabaseError::Migration(e.to_string()))?;

    info!("Applied migrations from {}", dir.display());
    Ok(())
}
