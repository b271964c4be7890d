use anyhow::{anyhow, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite};
use shared::{Adoption, AdoptionRequest, AdoptionStatus, LatestAdoption, LookupItem};
use crate::backend::storage::connection::DbConnection;

const ADOPTION_COLUMNS: &str = r#"
    SELECT ad.id, ad.animal_id, COALESCE(a.name, '') AS animal_name,
           ad.adopter_id, COALESCE(p.name, '') AS adopter_name,
           ad.status, ad.exit_date, ad.observations
    FROM adoptions ad
    LEFT JOIN animals a ON a.id = ad.animal_id
    LEFT JOIN adopters p ON p.id = ad.adopter_id
"#;

fn parse_status(row: &SqliteRow) -> Result<AdoptionStatus> {
    let raw: String = row.get("status");
    raw.parse().map_err(|e: String| anyhow!(e))
}

/// Repository for adoption operations
#[derive(Clone)]
pub struct AdoptionRepository {
    db: DbConnection,
}

impl AdoptionRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn map_row(row: &SqliteRow) -> Result<Adoption> {
        Ok(Adoption {
            id: row.get("id"),
            animal_id: row.get("animal_id"),
            animal_name: row.get("animal_name"),
            adopter_id: row.get("adopter_id"),
            adopter_name: row.get("adopter_name"),
            status: parse_status(row)?,
            exit_date: row.get("exit_date"),
            observations: row.get("observations"),
        })
    }

    pub async fn insert(&self, request: &AdoptionRequest) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO adoptions (animal_id, adopter_id, status, exit_date, observations)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(request.animal_id)
        .bind(request.adopter_id)
        .bind(request.status.as_str())
        .bind(&request.exit_date)
        .bind(&request.observations)
        .execute(self.db.pool())
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// List adoptions newest first, optionally with one status
    pub async fn list(&self, status: Option<AdoptionStatus>) -> Result<Vec<Adoption>> {
        let mut query = QueryBuilder::<Sqlite>::new(ADOPTION_COLUMNS);
        if let Some(status) = status {
            query.push(" WHERE UPPER(ad.status) = ");
            query.push_bind(status.as_str());
        }
        query.push(" ORDER BY ad.id DESC");

        let rows = query.build().fetch_all(self.db.pool()).await?;
        rows.iter().map(Self::map_row).collect()
    }

    pub async fn get(&self, id: i64) -> Result<Option<Adoption>> {
        let sql = format!("{} WHERE ad.id = ?", ADOPTION_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;
        row.as_ref().map(Self::map_row).transpose()
    }

    pub async fn update(&self, id: i64, request: &AdoptionRequest) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE adoptions
            SET animal_id = ?, adopter_id = ?, status = ?, exit_date = ?, observations = ?
            WHERE id = ?
            "#,
        )
        .bind(request.animal_id)
        .bind(request.adopter_id)
        .bind(request.status.as_str())
        .bind(&request.exit_date)
        .bind(&request.observations)
        .bind(id)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM adoptions WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_by_status(&self, status: AdoptionStatus) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM adoptions WHERE UPPER(status) = ?")
            .bind(status.as_str())
            .fetch_one(self.db.pool())
            .await?;
        Ok(row.get("n"))
    }

    /// Most recently inserted adoption for an animal
    pub async fn latest_for_animal(&self, animal_id: i64) -> Result<Option<LatestAdoption>> {
        let row = sqlx::query(
            r#"
            SELECT ad.status, COALESCE(p.name, '') AS adopter_name, ad.exit_date, ad.observations
            FROM adoptions ad
            LEFT JOIN adopters p ON p.id = ad.adopter_id
            WHERE ad.animal_id = ?
            ORDER BY ad.id DESC
            LIMIT 1
            "#,
        )
        .bind(animal_id)
        .fetch_optional(self.db.pool())
        .await?;

        match row {
            Some(r) => Ok(Some(LatestAdoption {
                status: parse_status(&r)?,
                adopter_name: r.get("adopter_name"),
                exit_date: r.get("exit_date"),
                observations: r.get("observations"),
            })),
            None => Ok(None),
        }
    }

    /// Animals that have never been marked ADOPTED, ordered by name
    pub async fn available_animals(&self) -> Result<Vec<LookupItem>> {
        let rows = sqlx::query(
            r#"
            SELECT a.id, a.name
            FROM animals a
            WHERE NOT EXISTS (
                SELECT 1 FROM adoptions ad
                WHERE ad.animal_id = a.id
                  AND UPPER(ad.status) = 'ADOPTED'
            )
            ORDER BY a.name ASC
            "#,
        )
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
    use crate::backend::storage::repositories::{AdopterRepository, AnimalRepository};
    use shared::{AdopterRequest, AnimalRequest};

    struct Fixture {
        repo: AdoptionRepository,
        animals: AnimalRepository,
        adopter_id: i64,
    }

    async fn setup() -> Fixture {
        let db = DbConnection::init_test().await.expect("Failed to init db");
        let adopters = AdopterRepository::new(db.clone());
        let adopter_id = adopters
            .insert(&AdopterRequest { name: "Carla".to_string(), ..Default::default() })
            .await
            .expect("insert adopter");
        Fixture {
            repo: AdoptionRepository::new(db.clone()),
            animals: AnimalRepository::new(db),
            adopter_id,
        }
    }

    async fn add_animal(fixture: &Fixture, name: &str) -> i64 {
        fixture
            .animals
            .insert(&AnimalRequest { name: name.to_string(), type_id: Some(1), ..Default::default() })
            .await
            .expect("insert animal")
    }

    fn adoption(animal_id: i64, adopter_id: i64, status: AdoptionStatus) -> AdoptionRequest {
        AdoptionRequest {
            animal_id: Some(animal_id),
            adopter_id: Some(adopter_id),
            status,
            exit_date: None,
            observations: None,
        }
    }

    #[tokio::test]
    async fn test_available_animals_excludes_any_adopted_row() {
        let f = setup().await;
        let luna = add_animal(&f, "Luna").await;
        let max = add_animal(&f, "Max").await;
        let bobby = add_animal(&f, "Bobby").await;

        f.repo.insert(&adoption(luna, f.adopter_id, AdoptionStatus::Adopted)).await.expect("insert");
        // A later rejection does not make Max available again
        f.repo.insert(&adoption(max, f.adopter_id, AdoptionStatus::Adopted)).await.expect("insert");
        f.repo.insert(&adoption(max, f.adopter_id, AdoptionStatus::Rejected)).await.expect("insert");

        let available = f.repo.available_animals().await.expect("available");
        let ids: Vec<i64> = available.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![bobby]);
    }

    #[tokio::test]
    async fn test_latest_for_animal_uses_insertion_order() {
        let f = setup().await;
        let luna = add_animal(&f, "Luna").await;
        assert!(f.repo.latest_for_animal(luna).await.expect("latest").is_none());

        f.repo.insert(&adoption(luna, f.adopter_id, AdoptionStatus::Adopted)).await.expect("insert");
        f.repo.insert(&adoption(luna, f.adopter_id, AdoptionStatus::InProgress)).await.expect("insert");

        let latest = f.repo.latest_for_animal(luna).await.expect("latest").expect("exists");
        assert_eq!(latest.status, AdoptionStatus::InProgress);
        assert_eq!(latest.adopter_name, "Carla");
    }

    #[tokio::test]
    async fn test_counts_and_status_filter() {
        let f = setup().await;
        let luna = add_animal(&f, "Luna").await;
        f.repo.insert(&adoption(luna, f.adopter_id, AdoptionStatus::InProgress)).await.expect("insert");
        f.repo.insert(&adoption(luna, f.adopter_id, AdoptionStatus::Adopted)).await.expect("insert");

        assert_eq!(f.repo.count_by_status(AdoptionStatus::Adopted).await.expect("count"), 1);
        assert_eq!(f.repo.count_by_status(AdoptionStatus::Rejected).await.expect("count"), 0);

        let adopted = f.repo.list(Some(AdoptionStatus::Adopted)).await.expect("list");
        assert_eq!(adopted.len(), 1);
        assert_eq!(adopted[0].animal_name, "Luna");
        assert_eq!(f.repo.list(None).await.expect("list").len(), 2);
    }
}
