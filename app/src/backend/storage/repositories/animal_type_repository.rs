use anyhow::Result;
use sqlx::Row;
use shared::AnimalType;
use crate::backend::storage::connection::DbConnection;

/// Repository for animal type operations
#[derive(Clone)]
pub struct AnimalTypeRepository {
    db: DbConnection,
}

impl AnimalTypeRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Insert a type and return its new id
    pub async fn insert(&self, name: &str) -> Result<i64> {
        let result = sqlx::query("INSERT INTO animal_types (name) VALUES (?)")
            .bind(name)
            .execute(self.db.pool())
            .await?;
        Ok(result.last_insert_rowid())
    }

    /// List all types ordered by name
    pub async fn list(&self) -> Result<Vec<AnimalType>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name
            FROM animal_types
            ORDER BY name ASC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows
            .iter()
            .map(|row| AnimalType {
                id: row.get("id"),
                name: row.get("name"),
            })
            .collect())
    }

    pub async fn get(&self, id: i64) -> Result<Option<AnimalType>> {
        let row = sqlx::query("SELECT id, name FROM animal_types WHERE id = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(row.map(|r| AnimalType {
            id: r.get("id"),
            name: r.get("name"),
        }))
    }

    /// Returns the id of another type already using `name`, if any
    pub async fn find_by_name(&self, name: &str) -> Result<Option<i64>> {
        let row = sqlx::query("SELECT id FROM animal_types WHERE name = ?")
            .bind(name)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(row.map(|r| r.get("id")))
    }

    /// Rename a type; false when the id does not exist
    pub async fn update(&self, id: i64, name: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE animal_types SET name = ? WHERE id = ?")
            .bind(name)
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Hard delete; animals pointing at this type keep their type_id
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM animal_types WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
