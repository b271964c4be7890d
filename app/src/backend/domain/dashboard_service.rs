use anyhow::{anyhow, Result};
use chrono::{Datelike, Months, NaiveDate};
use log::info;

use crate::backend::domain::health_service::HealthService;
use crate::backend::domain::models::validation::DATE_FORMAT;
use crate::backend::storage::{AdoptionRepository, AnimalRepository, DbConnection, DonationRepository, SponsorRepository};
use shared::{AdoptionStatus, DashboardSummary, MonthlyTotal};

/// Number of calendar months in the donation chart, current month included
pub const SERIES_MONTHS: u32 = 6;

/// First day of each of the trailing `count` months, oldest first
pub fn month_starts(today: NaiveDate, count: u32) -> Result<Vec<NaiveDate>> {
    let current = today
        .with_day(1)
        .ok_or_else(|| anyhow!("No first day for {}", today))?;

    (0..count)
        .rev()
        .map(|back| {
            current
                .checked_sub_months(Months::new(back))
                .ok_or_else(|| anyhow!("Month out of range: {} minus {}", current, back))
        })
        .collect()
}

/// Service computing the dashboard figures
#[derive(Clone)]
pub struct DashboardService {
    animals: AnimalRepository,
    sponsors: SponsorRepository,
    donations: DonationRepository,
    adoptions: AdoptionRepository,
    health: HealthService,
}

impl DashboardService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            animals: AnimalRepository::new(db.clone()),
            sponsors: SponsorRepository::new(db.clone()),
            donations: DonationRepository::new(db.clone()),
            adoptions: AdoptionRepository::new(db.clone()),
            health: HealthService::new(db),
        }
    }

    /// Donation totals for each month in `[start, next_start)`, oldest first
    pub async fn donation_series(&self, today: NaiveDate) -> Result<Vec<MonthlyTotal>> {
        let mut series = Vec::with_capacity(SERIES_MONTHS as usize);

        for month_start in month_starts(today, SERIES_MONTHS)? {
            let next_start = month_start
                .checked_add_months(Months::new(1))
                .ok_or_else(|| anyhow!("Month out of range after {}", month_start))?;

            let total = self
                .donations
                .total_between(
                    &month_start.format(DATE_FORMAT).to_string(),
                    &next_start.format(DATE_FORMAT).to_string(),
                )
                .await?;

            series.push(MonthlyTotal {
                label: month_start.format("%Y-%m").to_string(),
                month_start,
                total,
            });
        }

        Ok(series)
    }

    pub async fn summary(&self, today: NaiveDate, horizon_days: i64, soon_days: i64) -> Result<DashboardSummary> {
        info!("📊 Building dashboard for {}", today);

        let month_start = today
            .with_day(1)
            .ok_or_else(|| anyhow!("No first day for {}", today))?;

        let summary = DashboardSummary {
            total_animals: self.animals.count().await?,
            total_sponsors: self.sponsors.count().await?,
            current_month: month_start.format("%Y-%m").to_string(),
            // No upper bound: future-dated donations count toward this month
            donations_this_month: self
                .donations
                .total_since(&month_start.format(DATE_FORMAT).to_string())
                .await?,
            adopted_count: self.adoptions.count_by_status(AdoptionStatus::Adopted).await?,
            in_progress_count: self.adoptions.count_by_status(AdoptionStatus::InProgress).await?,
            donation_series: self.donation_series(today).await?,
            animals_by_type: self.animals.count_by_type().await?,
            upcoming: self.health.upcoming(today, horizon_days, soon_days).await?,
        };

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{DonationRequest, SponsorRequest};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    async fn seed_donations(db: &DbConnection, rows: &[(&str, f64)]) {
        let sponsor_id = SponsorRepository::new(db.clone())
            .insert(&SponsorRequest { name: "Ana".to_string(), ..Default::default() })
            .await
            .expect("insert sponsor");
        let donations = DonationRepository::new(db.clone());
        for (date, amount) in rows {
            donations
                .insert(&DonationRequest {
                    date: date.to_string(),
                    sponsor_id: Some(sponsor_id),
                    amount: *amount,
                    ..Default::default()
                })
                .await
                .expect("insert donation");
        }
    }

    #[test]
    fn test_month_starts_cross_year_boundary() {
        let starts = month_starts(date(2024, 2, 29), 6).expect("starts");
        assert_eq!(
            starts,
            vec![
                date(2023, 9, 1),
                date(2023, 10, 1),
                date(2023, 11, 1),
                date(2023, 12, 1),
                date(2024, 1, 1),
                date(2024, 2, 1),
            ]
        );
    }

    #[tokio::test]
    async fn test_month_to_date_total() {
        let db = DbConnection::init_test().await.expect("Failed to init db");
        seed_donations(&db, &[("2024-01-15", 100.0), ("2024-02-01", 50.0)]).await;

        let summary = DashboardService::new(db)
            .summary(date(2024, 2, 20), 30, 7)
            .await
            .expect("summary");
        assert_eq!(summary.donations_this_month, 50.0);
        assert_eq!(summary.current_month, "2024-02");
        assert_eq!(summary.total_sponsors, 1);
        assert_eq!(summary.total_animals, 0);
    }

    #[tokio::test]
    async fn test_series_uses_calendar_months() {
        let db = DbConnection::init_test().await.expect("Failed to init db");
        seed_donations(
            &db,
            &[
                ("2023-08-31", 999.0),
                ("2023-09-01", 1.0),
                ("2024-01-31", 10.0),
                ("2024-02-01", 20.0),
                ("2024-02-29", 5.0),
            ],
        )
        .await;

        let series = DashboardService::new(db)
            .donation_series(date(2024, 2, 10))
            .await
            .expect("series");

        let labels: Vec<&str> = series.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, vec!["2023-09", "2023-10", "2023-11", "2023-12", "2024-01", "2024-02"]);
        let totals: Vec<f64> = series.iter().map(|m| m.total).collect();
        assert_eq!(totals, vec![1.0, 0.0, 0.0, 0.0, 10.0, 25.0]);
    }
}
