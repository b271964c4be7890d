use anyhow::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite};
use shared::{Adopter, AdopterRequest, LookupItem};
use crate::backend::storage::connection::DbConnection;

/// Repository for adopter operations
#[derive(Clone)]
pub struct AdopterRepository {
    db: DbConnection,
}

impl AdopterRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn map_row(row: &SqliteRow) -> Adopter {
        Adopter {
            id: row.get("id"),
            name: row.get("name"),
            document: row.get("document"),
            phone: row.get("phone"),
            email: row.get("email"),
            address: row.get("address"),
        }
    }

    pub async fn insert(&self, request: &AdopterRequest) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO adopters (name, document, phone, email, address)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&request.name)
        .bind(&request.document)
        .bind(&request.phone)
        .bind(&request.email)
        .bind(&request.address)
        .execute(self.db.pool())
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// List adopters newest first; `search` matches name or document
    pub async fn list(&self, search: Option<&str>) -> Result<Vec<Adopter>> {
        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT id, name, document, phone, email, address FROM adopters",
        );
        if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = format!("%{}%", term);
            query.push(" WHERE name LIKE ");
            query.push_bind(pattern.clone());
            query.push(" OR document LIKE ");
            query.push_bind(pattern);
        }
        query.push(" ORDER BY id DESC");

        let rows = query.build().fetch_all(self.db.pool()).await?;
        Ok(rows.iter().map(Self::map_row).collect())
    }

    pub async fn get(&self, id: i64) -> Result<Option<Adopter>> {
        let row = sqlx::query(
            "SELECT id, name, document, phone, email, address FROM adopters WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(row.as_ref().map(Self::map_row))
    }

    pub async fn update(&self, id: i64, request: &AdopterRequest) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE adopters
            SET name = ?, document = ?, phone = ?, email = ?, address = ?
            WHERE id = ?
            "#,
        )
        .bind(&request.name)
        .bind(&request.document)
        .bind(&request.phone)
        .bind(&request.email)
        .bind(&request.address)
        .bind(id)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM adopters WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn lookup(&self) -> Result<Vec<LookupItem>> {
        let rows = sqlx::query("SELECT id, name FROM adopters ORDER BY name ASC")
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

    #[tokio::test]
    async fn test_adopter_crud() {
        let db = DbConnection::init_test().await.expect("Failed to init db");
        let repo = AdopterRepository::new(db);

        let id = repo
            .insert(&AdopterRequest {
                name: "Carla".to_string(),
                document: Some("12345678".to_string()),
                ..Default::default()
            })
            .await
            .expect("insert");

        let found = repo.list(Some("3456")).await.expect("list");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, id);

        let updated = AdopterRequest {
            name: "Carla P.".to_string(),
            address: Some("Main St 1".to_string()),
            ..Default::default()
        };
        assert!(repo.update(id, &updated).await.expect("update"));
        let stored = repo.get(id).await.expect("get").expect("exists");
        assert_eq!(stored.document, None);
        assert_eq!(stored.address.as_deref(), Some("Main St 1"));

        assert!(repo.delete(id).await.expect("delete"));
        assert!(repo.lookup().await.expect("lookup").is_empty());
    }
}
