use anyhow::{Context, Result};
use log::info;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::path::Path;
use std::sync::Arc;

/// DbConnection owns the process-wide SQLite pool
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Open (creating if needed) the database file at `path`
    pub async fn open(path: &Path) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            // Parent rows may be deleted while children still reference them
            .foreign_keys(false);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open database at {}", path.display()))?;

        Self::setup_schema(&pool).await?;
        info!("📦 Database ready at {}", path.display());

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Initialize an in-memory database for tests
    #[cfg(test)]
    pub async fn init_test() -> Result<Self> {
        use std::str::FromStr;

        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(false);

        // A single connection that never expires, otherwise the memory database vanishes
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create all tables if missing and apply column migrations
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS animal_types (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT UNIQUE NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS animals (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                type_id INTEGER NOT NULL,
                sex TEXT,
                age_months INTEGER,
                intake_date TEXT,
                notes TEXT,
                FOREIGN KEY (type_id) REFERENCES animal_types (id)
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sponsors (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                phone TEXT,
                email TEXT
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS donations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                sponsor_id INTEGER NOT NULL,
                animal_id INTEGER,
                amount REAL NOT NULL DEFAULT 0,
                method TEXT,
                note TEXT,
                FOREIGN KEY (sponsor_id) REFERENCES sponsors (id),
                FOREIGN KEY (animal_id) REFERENCES animals (id)
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_donations_date
            ON donations(date);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS vaccines (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                animal_id INTEGER NOT NULL,
                vaccine TEXT NOT NULL,
                applied_on TEXT NOT NULL,
                next_due TEXT,
                notes TEXT,
                FOREIGN KEY (animal_id) REFERENCES animals (id)
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS dewormings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                animal_id INTEGER NOT NULL,
                product TEXT NOT NULL,
                applied_on TEXT NOT NULL,
                next_due TEXT,
                notes TEXT,
                FOREIGN KEY (animal_id) REFERENCES animals (id)
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS adopters (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                document TEXT,
                phone TEXT,
                email TEXT,
                address TEXT
            );
            "#,
        )
        .execute(pool)
        .await?;

        // status is IN_PROGRESS / ADOPTED / REJECTED, exit_date set once ADOPTED
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS adoptions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                animal_id INTEGER NOT NULL,
                adopter_id INTEGER NOT NULL,
                status TEXT NOT NULL,
                exit_date TEXT,
                observations TEXT,
                FOREIGN KEY (animal_id) REFERENCES animals (id),
                FOREIGN KEY (adopter_id) REFERENCES adopters (id)
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_adoptions_animal_id
            ON adoptions(animal_id);
            "#,
        )
        .execute(pool)
        .await?;

        Self::migrate_sponsor_notes(pool).await?;

        Ok(())
    }

    /// Older databases were created without `sponsors.notes`
    async fn migrate_sponsor_notes(pool: &SqlitePool) -> Result<()> {
        let columns = sqlx::query("PRAGMA table_info(sponsors)")
            .fetch_all(pool)
            .await?;

        let has_notes = columns
            .iter()
            .any(|row| row.get::<String, _>("name") == "notes");

        if !has_notes {
            info!("Adding notes column to sponsors table");
            sqlx::query("ALTER TABLE sponsors ADD COLUMN notes TEXT")
                .execute(pool)
                .await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn table_names(db: &DbConnection) -> Vec<String> {
        sqlx::query("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .fetch_all(db.pool())
            .await
            .expect("Failed to list tables")
            .iter()
            .map(|row| row.get::<String, _>("name"))
            .collect()
    }

    #[tokio::test]
    async fn test_schema_has_all_tables() {
        let db = DbConnection::init_test().await.expect("Failed to init db");
        let tables = table_names(&db).await;

        for expected in [
            "adopters",
            "adoptions",
            "animal_types",
            "animals",
            "dewormings",
            "donations",
            "sponsors",
            "vaccines",
        ] {
            assert!(tables.contains(&expected.to_string()), "missing table {}", expected);
        }
    }

    #[tokio::test]
    async fn test_schema_setup_is_idempotent() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("shelter.db");

        let first = DbConnection::open(&path).await.expect("First open failed");
        sqlx::query("INSERT INTO animal_types (name) VALUES ('Dog')")
            .execute(first.pool())
            .await
            .expect("Insert failed");
        first.pool().close().await;

        let second = DbConnection::open(&path).await.expect("Second open failed");
        let count: i64 = sqlx::query("SELECT COUNT(*) AS n FROM animal_types")
            .fetch_one(second.pool())
            .await
            .expect("Count failed")
            .get("n");
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_legacy_sponsors_table_gains_notes_column() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("legacy.db");

        // Build a legacy sponsors table by hand
        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true);
        let legacy = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .expect("Failed to create legacy db");
        sqlx::query("CREATE TABLE sponsors (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL, phone TEXT, email TEXT)")
            .execute(&legacy)
            .await
            .expect("Failed to create legacy table");
        legacy.close().await;

        let db = DbConnection::open(&path).await.expect("Open failed");
        sqlx::query("INSERT INTO sponsors (name, notes) VALUES ('Ana', 'monthly')")
            .execute(db.pool())
            .await
            .expect("notes column should exist after migration");
    }
}
