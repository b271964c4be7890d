use anyhow::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite};
use shared::{LookupItem, Sponsor, SponsorRequest};
use crate::backend::storage::connection::DbConnection;

/// Repository for sponsor operations
#[derive(Clone)]
pub struct SponsorRepository {
    db: DbConnection,
}

impl SponsorRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn map_row(row: &SqliteRow) -> Sponsor {
        Sponsor {
            id: row.get("id"),
            name: row.get("name"),
            phone: row.get("phone"),
            email: row.get("email"),
            notes: row.get("notes"),
        }
    }

    pub async fn insert(&self, request: &SponsorRequest) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO sponsors (name, phone, email, notes)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&request.name)
        .bind(&request.phone)
        .bind(&request.email)
        .bind(&request.notes)
        .execute(self.db.pool())
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// List sponsors newest first; `search` matches name, phone or email
    pub async fn list(&self, search: Option<&str>) -> Result<Vec<Sponsor>> {
        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT id, name, phone, email, notes FROM sponsors",
        );

        if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = format!("%{}%", term);
            query.push(" WHERE name LIKE ");
            query.push_bind(pattern.clone());
            query.push(" OR phone LIKE ");
            query.push_bind(pattern.clone());
            query.push(" OR email LIKE ");
            query.push_bind(pattern);
        }
        query.push(" ORDER BY id DESC");

        let rows = query.build().fetch_all(self.db.pool()).await?;
        Ok(rows.iter().map(Self::map_row).collect())
    }

    pub async fn get(&self, id: i64) -> Result<Option<Sponsor>> {
        let row = sqlx::query("SELECT id, name, phone, email, notes FROM sponsors WHERE id = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(row.as_ref().map(Self::map_row))
    }

    pub async fn update(&self, id: i64, request: &SponsorRequest) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE sponsors
            SET name = ?, phone = ?, email = ?, notes = ?
            WHERE id = ?
            "#,
        )
        .bind(&request.name)
        .bind(&request.phone)
        .bind(&request.email)
        .bind(&request.notes)
        .bind(id)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Hard delete; donations keep their sponsor_id
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sponsors WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM sponsors")
            .fetch_one(self.db.pool())
            .await?;
        Ok(row.get("n"))
    }

    pub async fn lookup(&self) -> Result<Vec<LookupItem>> {
        let rows = sqlx::query("SELECT id, name FROM sponsors ORDER BY name ASC")
            .fetch_all(self.db.pool())
            .await?;
        Ok(rows
            .iter()
            .map(|r| LookupItem {
                id: r.get("id"),
                name: r.get("name"),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sponsor(name: &str, phone: &str, email: &str) -> SponsorRequest {
        SponsorRequest {
            name: name.to_string(),
            phone: Some(phone.to_string()),
            email: Some(email.to_string()),
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_search_matches_any_contact_field() {
        let db = DbConnection::init_test().await.expect("Failed to init db");
        let repo = SponsorRepository::new(db);
        repo.insert(&sponsor("Ana Ruiz", "555-0101", "ana@example.com")).await.expect("insert");
        repo.insert(&sponsor("Bruno", "555-0202", "bruno@mail.org")).await.expect("insert");

        assert_eq!(repo.list(None).await.expect("list").len(), 2);
        assert_eq!(repo.list(Some("  ")).await.expect("list").len(), 2);

        let by_phone = repo.list(Some("0202")).await.expect("list");
        assert_eq!(by_phone.len(), 1);
        assert_eq!(by_phone[0].name, "Bruno");

        let by_email = repo.list(Some("example.com")).await.expect("list");
        assert_eq!(by_email.len(), 1);
        assert_eq!(by_email[0].name, "Ana Ruiz");
    }

    #[tokio::test]
    async fn test_notes_round_trip_through_update() {
        let db = DbConnection::init_test().await.expect("Failed to init db");
        let repo = SponsorRepository::new(db);
        let id = repo.insert(&sponsor("Ana", "1", "a@b.c")).await.expect("insert");

        let mut updated = sponsor("Ana María", "2", "a@b.c");
        updated.notes = Some("Prefers transfers".to_string());
        assert!(repo.update(id, &updated).await.expect("update"));

        let stored = repo.get(id).await.expect("get").expect("exists");
        assert_eq!(stored.name, "Ana María");
        assert_eq!(stored.notes.as_deref(), Some("Prefers transfers"));
        assert_eq!(repo.count().await.expect("count"), 1);
    }
}
