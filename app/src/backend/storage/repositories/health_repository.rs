use anyhow::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use shared::{HealthKind, HealthRecord, HealthRecordRequest};
use crate::backend::storage::connection::DbConnection;

/// Table and product column backing each kind of health record
fn table_for(kind: HealthKind) -> (&'static str, &'static str) {
    match kind {
        HealthKind::Vaccine => ("vaccines", "vaccine"),
        HealthKind::Deworming => ("dewormings", "product"),
    }
}

/// Repository for vaccine and deworming records
#[derive(Clone)]
pub struct HealthRepository {
    db: DbConnection,
}

impl HealthRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn map_row(kind: HealthKind, row: &SqliteRow) -> HealthRecord {
        HealthRecord {
            id: row.get("id"),
            kind,
            animal_id: row.get("animal_id"),
            animal_name: row.get("animal_name"),
            product: row.get("product"),
            applied_on: row.get("applied_on"),
            next_due: row.get("next_due"),
            notes: row.get("notes"),
        }
    }

    fn select_sql(kind: HealthKind, join: &str) -> String {
        let (table, product) = table_for(kind);
        format!(
            r#"
            SELECT h.id, h.animal_id, COALESCE(a.name, '') AS animal_name,
                   h.{product} AS product, h.applied_on, h.next_due, h.notes
            FROM {table} h
            {join} animals a ON a.id = h.animal_id
            "#
        )
    }

    pub async fn insert(&self, kind: HealthKind, request: &HealthRecordRequest) -> Result<i64> {
        let (table, product) = table_for(kind);
        let sql = format!(
            "INSERT INTO {table} (animal_id, {product}, applied_on, next_due, notes) VALUES (?, ?, ?, ?, ?)"
        );
        let result = sqlx::query(&sql)
            .bind(request.animal_id)
            .bind(&request.product)
            .bind(&request.applied_on)
            .bind(&request.next_due)
            .bind(&request.notes)
            .execute(self.db.pool())
            .await?;
        Ok(result.last_insert_rowid())
    }

    /// List records newest first, optionally for one animal
    pub async fn list(&self, kind: HealthKind, animal_id: Option<i64>) -> Result<Vec<HealthRecord>> {
        let mut sql = Self::select_sql(kind, "LEFT JOIN");
        if animal_id.is_some() {
            sql.push_str(" WHERE h.animal_id = ?");
        }
        sql.push_str(" ORDER BY h.id DESC");

        let mut query = sqlx::query(&sql);
        if let Some(animal_id) = animal_id {
            query = query.bind(animal_id);
        }
        let rows = query.fetch_all(self.db.pool()).await?;
        Ok(rows.iter().map(|r| Self::map_row(kind, r)).collect())
    }

    pub async fn get(&self, kind: HealthKind, id: i64) -> Result<Option<HealthRecord>> {
        let sql = format!("{} WHERE h.id = ?", Self::select_sql(kind, "LEFT JOIN"));
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(row.as_ref().map(|r| Self::map_row(kind, r)))
    }

    pub async fn update(&self, kind: HealthKind, id: i64, request: &HealthRecordRequest) -> Result<bool> {
        let (table, product) = table_for(kind);
        let sql = format!(
            "UPDATE {table} SET animal_id = ?, {product} = ?, applied_on = ?, next_due = ?, notes = ? WHERE id = ?"
        );
        let result = sqlx::query(&sql)
            .bind(request.animal_id)
            .bind(&request.product)
            .bind(&request.applied_on)
            .bind(&request.next_due)
            .bind(&request.notes)
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, kind: HealthKind, id: i64) -> Result<bool> {
        let (table, _) = table_for(kind);
        let sql = format!("DELETE FROM {table} WHERE id = ?");
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Full history for a profile sheet, newest application first
    pub async fn history_for_animal(&self, kind: HealthKind, animal_id: i64) -> Result<Vec<HealthRecord>> {
        let sql = format!(
            "{} WHERE h.animal_id = ? ORDER BY h.applied_on DESC, h.id DESC",
            Self::select_sql(kind, "LEFT JOIN")
        );
        let rows = sqlx::query(&sql)
            .bind(animal_id)
            .fetch_all(self.db.pool())
            .await?;
        Ok(rows.iter().map(|r| Self::map_row(kind, r)).collect())
    }

    /// Records with a non-empty next-due value whose animal still exists
    pub async fn due_candidates(&self, kind: HealthKind) -> Result<Vec<HealthRecord>> {
        let sql = format!(
            "{} WHERE h.next_due IS NOT NULL AND h.next_due <> '' ORDER BY h.id ASC",
            Self::select_sql(kind, "JOIN")
        );
        let rows = sqlx::query(&sql).fetch_all(self.db.pool()).await?;
        Ok(rows.iter().map(|r| Self::map_row(kind, r)).collect())
    }
}
