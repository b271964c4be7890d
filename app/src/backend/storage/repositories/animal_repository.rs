use anyhow::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite};
use shared::{Animal, AnimalDetail, AnimalFilter, AnimalRequest, LookupItem, TypeCount};
use crate::backend::storage::connection::DbConnection;

const ANIMAL_COLUMNS: &str = r#"
    SELECT a.id, a.name, a.type_id, COALESCE(t.name, '') AS type_name,
           a.sex, a.age_months, a.intake_date, a.notes
    FROM animals a
    LEFT JOIN animal_types t ON t.id = a.type_id
"#;

/// Repository for animal operations
#[derive(Clone)]
pub struct AnimalRepository {
    db: DbConnection,
}

impl AnimalRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn map_row(row: &SqliteRow) -> Animal {
        Animal {
            id: row.get("id"),
            name: row.get("name"),
            type_id: row.get("type_id"),
            type_name: row.get("type_name"),
            sex: row.get("sex"),
            age_months: row.get("age_months"),
            intake_date: row.get("intake_date"),
            notes: row.get("notes"),
        }
    }

    pub async fn insert(&self, request: &AnimalRequest) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO animals (name, type_id, sex, age_months, intake_date, notes)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&request.name)
        .bind(request.type_id)
        .bind(&request.sex)
        .bind(request.age_months)
        .bind(&request.intake_date)
        .bind(&request.notes)
        .execute(self.db.pool())
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// List animals newest first, narrowed by whichever filter fields are set
    pub async fn list(&self, filter: &AnimalFilter) -> Result<Vec<Animal>> {
        let mut query = QueryBuilder::<Sqlite>::new(ANIMAL_COLUMNS);
        query.push(" WHERE 1 = 1");

        if let Some(name) = filter.name.as_deref().filter(|n| !n.is_empty()) {
            query.push(" AND a.name LIKE ");
            query.push_bind(format!("%{}%", name));
        }
        if let Some(sex) = filter.sex.as_deref().filter(|s| !s.is_empty()) {
            query.push(" AND a.sex = ");
            query.push_bind(sex.to_string());
        }
        if let Some(type_id) = filter.type_id {
            query.push(" AND a.type_id = ");
            query.push_bind(type_id);
        }
        query.push(" ORDER BY a.id DESC");

        let rows = query.build().fetch_all(self.db.pool()).await?;
        Ok(rows.iter().map(Self::map_row).collect())
    }

    pub async fn get(&self, id: i64) -> Result<Option<Animal>> {
        let sql = format!("{} WHERE a.id = ?", ANIMAL_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(row.as_ref().map(Self::map_row))
    }

    /// Base attributes for a profile sheet
    pub async fn get_detail(&self, id: i64) -> Result<Option<AnimalDetail>> {
        Ok(self.get(id).await?.map(|a| AnimalDetail {
            id: a.id,
            name: a.name,
            type_name: a.type_name,
            sex: a.sex,
            age_months: a.age_months,
            intake_date: a.intake_date,
            notes: a.notes,
        }))
    }

    /// Full-row overwrite; false when the id does not exist
    pub async fn update(&self, id: i64, request: &AnimalRequest) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE animals
            SET name = ?, type_id = ?, sex = ?, age_months = ?, intake_date = ?, notes = ?
            WHERE id = ?
            "#,
        )
        .bind(&request.name)
        .bind(request.type_id)
        .bind(&request.sex)
        .bind(request.age_months)
        .bind(&request.intake_date)
        .bind(&request.notes)
        .bind(id)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM animals WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM animals")
            .fetch_one(self.db.pool())
            .await?;
        Ok(row.get("n"))
    }

    /// Id/name pairs ordered by name, for pickers
    pub async fn lookup(&self) -> Result<Vec<LookupItem>> {
        let rows = sqlx::query("SELECT id, name FROM animals ORDER BY name ASC")
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

    /// Animal counts per type name, largest first
    pub async fn count_by_type(&self) -> Result<Vec<TypeCount>> {
        let rows = sqlx::query(
            r#"
            SELECT COALESCE(t.name, '') AS type_name, COUNT(*) AS n
            FROM animals a
            LEFT JOIN animal_types t ON t.id = a.type_id
            GROUP BY COALESCE(t.name, '')
            ORDER BY n DESC, type_name ASC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows
            .iter()
            .map(|r| TypeCount {
                type_name: r.get("type_name"),
                count: r.get("n"),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::storage::repositories::AnimalTypeRepository;

    async fn setup() -> (AnimalRepository, i64, i64) {
        let db = DbConnection::init_test().await.expect("Failed to init db");
        let types = AnimalTypeRepository::new(db.clone());
        let dog = types.insert("Dog").await.expect("insert type");
        let cat = types.insert("Cat").await.expect("insert type");
        (AnimalRepository::new(db), dog, cat)
    }

    fn request(name: &str, type_id: i64, sex: &str) -> AnimalRequest {
        AnimalRequest {
            name: name.to_string(),
            type_id: Some(type_id),
            sex: Some(sex.to_string()),
            age_months: Some(12),
            intake_date: Some("2024-03-01".to_string()),
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_list_filters_combine() {
        let (repo, dog, cat) = setup().await;
        repo.insert(&request("Luna", dog, "F")).await.expect("insert");
        repo.insert(&request("Lucas", dog, "M")).await.expect("insert");
        repo.insert(&request("Michi", cat, "F")).await.expect("insert");

        let all = repo.list(&AnimalFilter::default()).await.expect("list");
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].name, "Michi");

        let filter = AnimalFilter {
            name: Some("Lu".to_string()),
            sex: Some("F".to_string()),
            type_id: None,
        };
        let found = repo.list(&filter).await.expect("list");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Luna");
        assert_eq!(found[0].type_name, "Dog");

        let cats = repo
            .list(&AnimalFilter { type_id: Some(cat), ..Default::default() })
            .await
            .expect("list");
        assert_eq!(cats.len(), 1);
    }

    #[tokio::test]
    async fn test_deleted_type_leaves_empty_type_name() {
        let db = DbConnection::init_test().await.expect("Failed to init db");
        let types = AnimalTypeRepository::new(db.clone());
        let repo = AnimalRepository::new(db);
        let bird = types.insert("Bird").await.expect("insert type");
        let id = repo.insert(&request("Kiwi", bird, "M")).await.expect("insert");

        assert!(types.delete(bird).await.expect("delete type"));

        let animal = repo.get(id).await.expect("get").expect("animal still exists");
        assert_eq!(animal.type_id, bird);
        assert_eq!(animal.type_name, "");
    }

    #[tokio::test]
    async fn test_count_by_type_orders_by_count() {
        let (repo, dog, cat) = setup().await;
        repo.insert(&request("A", cat, "F")).await.expect("insert");
        repo.insert(&request("B", dog, "F")).await.expect("insert");
        repo.insert(&request("C", dog, "M")).await.expect("insert");

        let counts = repo.count_by_type().await.expect("count");
        assert_eq!(counts[0], TypeCount { type_name: "Dog".to_string(), count: 2 });
        assert_eq!(counts[1], TypeCount { type_name: "Cat".to_string(), count: 1 });
        assert_eq!(repo.count().await.expect("count"), 3);
    }
}
