use anyhow::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite};
use shared::{Donation, DonationRequest, ProfileDonation};
use crate::backend::storage::connection::DbConnection;

const DONATION_COLUMNS: &str = r#"
    SELECT d.id, d.date, d.sponsor_id, COALESCE(s.name, '') AS sponsor_name,
           d.animal_id, COALESCE(a.name, '') AS animal_name,
           d.amount, d.method, d.note
    FROM donations d
    LEFT JOIN sponsors s ON s.id = d.sponsor_id
    LEFT JOIN animals a ON a.id = d.animal_id
"#;

/// Repository for donation operations
#[derive(Clone)]
pub struct DonationRepository {
    db: DbConnection,
}

impl DonationRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn map_row(row: &SqliteRow) -> Donation {
        Donation {
            id: row.get("id"),
            date: row.get("date"),
            sponsor_id: row.get("sponsor_id"),
            sponsor_name: row.get("sponsor_name"),
            animal_id: row.get("animal_id"),
            animal_name: row.get("animal_name"),
            amount: row.get("amount"),
            method: row.get("method"),
            note: row.get("note"),
        }
    }

    pub async fn insert(&self, request: &DonationRequest) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO donations (date, sponsor_id, animal_id, amount, method, note)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&request.date)
        .bind(request.sponsor_id)
        .bind(request.animal_id)
        .bind(request.amount)
        .bind(&request.method)
        .bind(&request.note)
        .execute(self.db.pool())
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// List donations newest first, optionally for one sponsor
    pub async fn list(&self, sponsor_id: Option<i64>) -> Result<Vec<Donation>> {
        let mut query = QueryBuilder::<Sqlite>::new(DONATION_COLUMNS);
        if let Some(sponsor_id) = sponsor_id {
            query.push(" WHERE d.sponsor_id = ");
            query.push_bind(sponsor_id);
        }
        query.push(" ORDER BY d.id DESC");

        let rows = query.build().fetch_all(self.db.pool()).await?;
        Ok(rows.iter().map(Self::map_row).collect())
    }

    pub async fn get(&self, id: i64) -> Result<Option<Donation>> {
        let sql = format!("{} WHERE d.id = ?", DONATION_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(row.as_ref().map(Self::map_row))
    }

    pub async fn update(&self, id: i64, request: &DonationRequest) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE donations
            SET date = ?, sponsor_id = ?, animal_id = ?, amount = ?, method = ?, note = ?
            WHERE id = ?
            "#,
        )
        .bind(&request.date)
        .bind(request.sponsor_id)
        .bind(request.animal_id)
        .bind(request.amount)
        .bind(&request.method)
        .bind(&request.note)
        .bind(id)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM donations WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Sum of amounts dated on or after `start` (YYYY-MM-DD)
    pub async fn total_since(&self, start: &str) -> Result<f64> {
        let row = sqlx::query("SELECT TOTAL(amount) AS total FROM donations WHERE date >= ?")
            .bind(start)
            .fetch_one(self.db.pool())
            .await?;
        Ok(row.get("total"))
    }

    /// Sum of amounts in the half-open range `[start, end)`
    pub async fn total_between(&self, start: &str, end: &str) -> Result<f64> {
        let row = sqlx::query(
            "SELECT TOTAL(amount) AS total FROM donations WHERE date >= ? AND date < ?",
        )
        .bind(start)
        .bind(end)
        .fetch_one(self.db.pool())
        .await?;
        Ok(row.get("total"))
    }

    /// Every donation earmarked for an animal, newest first
    pub async fn list_for_animal(&self, animal_id: i64) -> Result<Vec<ProfileDonation>> {
        let rows = sqlx::query(
            r#"
            SELECT d.date, COALESCE(s.name, '') AS sponsor_name, d.amount, d.method, d.note
            FROM donations d
            LEFT JOIN sponsors s ON s.id = d.sponsor_id
            WHERE d.animal_id = ?
            ORDER BY d.date DESC, d.id DESC
            "#,
        )
        .bind(animal_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows
            .iter()
            .map(|r| ProfileDonation {
                date: r.get("date"),
                sponsor_name: r.get("sponsor_name"),
                amount: r.get("amount"),
                method: r.get("method"),
                note: r.get("note"),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::storage::repositories::SponsorRepository;
    use shared::SponsorRequest;

    fn donation(date: &str, sponsor_id: i64, amount: f64) -> DonationRequest {
        DonationRequest {
            date: date.to_string(),
            sponsor_id: Some(sponsor_id),
            animal_id: None,
            amount,
            method: Some("Cash".to_string()),
            note: None,
        }
    }

    async fn setup() -> (DonationRepository, SponsorRepository, i64) {
        let db = DbConnection::init_test().await.expect("Failed to init db");
        let sponsors = SponsorRepository::new(db.clone());
        let sponsor_id = sponsors
            .insert(&SponsorRequest { name: "Ana".to_string(), ..Default::default() })
            .await
            .expect("insert sponsor");
        (DonationRepository::new(db), sponsors, sponsor_id)
    }

    #[tokio::test]
    async fn test_totals_respect_half_open_ranges() {
        let (repo, _sponsors, sponsor_id) = setup().await;
        repo.insert(&donation("2024-01-15", sponsor_id, 100.0)).await.expect("insert");
        repo.insert(&donation("2024-02-01", sponsor_id, 50.0)).await.expect("insert");

        assert_eq!(repo.total_since("2024-02-01").await.expect("total"), 50.0);
        assert_eq!(repo.total_between("2024-01-01", "2024-02-01").await.expect("total"), 100.0);
        assert_eq!(repo.total_between("2024-02-01", "2024-03-01").await.expect("total"), 50.0);
        assert_eq!(repo.total_between("2023-12-01", "2024-01-01").await.expect("total"), 0.0);
    }

    #[tokio::test]
    async fn test_deleting_sponsor_leaves_dangling_donation() {
        let (repo, sponsors, sponsor_id) = setup().await;
        let id = repo.insert(&donation("2024-05-02", sponsor_id, 20.0)).await.expect("insert");

        assert!(sponsors.delete(sponsor_id).await.expect("delete sponsor"));

        let stored = repo.get(id).await.expect("get").expect("donation survives");
        assert_eq!(stored.sponsor_id, sponsor_id);
        assert_eq!(stored.sponsor_name, "");
        assert_eq!(repo.list(Some(sponsor_id)).await.expect("list").len(), 1);
    }
}
