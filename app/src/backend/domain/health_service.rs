use anyhow::Result;
use chrono::{Duration, NaiveDate};
use log::{debug, info, warn};
use std::collections::BTreeSet;

use crate::backend::domain::models::validation::{self, ValidationError, DATE_FORMAT};
use crate::backend::storage::{AnimalRepository, DbConnection, HealthRepository};
use shared::{HealthKind, HealthRecord, HealthRecordRequest, Reminder, Urgency};

/// Maximum animal names listed in the startup notice
pub const NOTICE_NAME_LIMIT: usize = 15;

/// Filter health records down to those due within `horizon_days` of `today`.
///
/// Records whose next-due value is blank or not a `YYYY-MM-DD` date are
/// skipped. The result is sorted by due date; the sort is stable, so on ties
/// the input order (vaccines before dewormings) is kept.
pub fn upcoming_reminders(
    candidates: &[HealthRecord],
    today: NaiveDate,
    horizon_days: i64,
    soon_days: i64,
) -> Vec<Reminder> {
    // Horizons past the calendar's end reach as far as it goes
    let limit = Duration::try_days(horizon_days)
        .and_then(|d| today.checked_add_signed(d))
        .unwrap_or(NaiveDate::MAX);

    let mut reminders: Vec<Reminder> = candidates
        .iter()
        .filter_map(|record| {
            let raw = record.next_due.as_deref()?.trim();
            let due_date = match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
                Ok(d) => d,
                Err(_) => {
                    debug!("Skipping unparseable next-due '{}' on {} {}", raw, record.kind, record.id);
                    return None;
                }
            };
            if due_date < today || due_date > limit {
                return None;
            }

            let days_left = (due_date - today).num_days();
            Some(Reminder {
                kind: record.kind,
                animal_name: record.animal_name.clone(),
                due_date,
                days_left,
                urgency: if days_left <= soon_days { Urgency::Soon } else { Urgency::Normal },
            })
        })
        .collect();

    reminders.sort_by_key(|r| r.due_date);
    reminders
}

/// Summary of soon-due applications shown when the app starts
#[derive(Debug, Clone, PartialEq)]
pub struct HealthNotice {
    pub soon_count: usize,
    pub soon_days: i64,
    /// Distinct animal names, sorted, at most [`NOTICE_NAME_LIMIT`]
    pub animal_names: Vec<String>,
    pub more_names: bool,
}

impl HealthNotice {
    pub fn message(&self) -> String {
        let mut names = self.animal_names.join(", ");
        if self.more_names {
            names.push_str(", ...");
        }
        let mut message = format!(
            "{} health application(s) due within {} days",
            self.soon_count, self.soon_days
        );
        if !names.is_empty() {
            message.push_str(": ");
            message.push_str(&names);
        }
        message
    }
}

/// Build the startup notice, or `None` when nothing is due soon
pub fn soon_notice(reminders: &[Reminder], soon_days: i64) -> Option<HealthNotice> {
    let soon: Vec<&Reminder> = reminders
        .iter()
        .filter(|r| r.urgency == Urgency::Soon)
        .collect();
    if soon.is_empty() {
        return None;
    }

    let names: BTreeSet<&str> = soon
        .iter()
        .map(|r| r.animal_name.trim())
        .filter(|n| !n.is_empty() && !n.chars().all(|c| c.is_ascii_digit()))
        .collect();

    Some(HealthNotice {
        soon_count: soon.len(),
        soon_days,
        animal_names: names.iter().take(NOTICE_NAME_LIMIT).map(|n| n.to_string()).collect(),
        more_names: names.len() > NOTICE_NAME_LIMIT,
    })
}

/// Service for vaccine and deworming records
#[derive(Clone)]
pub struct HealthService {
    records: HealthRepository,
    animals: AnimalRepository,
}

impl HealthService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            records: HealthRepository::new(db.clone()),
            animals: AnimalRepository::new(db),
        }
    }

    async fn validate(&self, kind: HealthKind, request: HealthRecordRequest) -> Result<HealthRecordRequest> {
        let animal_id = validation::required_id("Animal", request.animal_id)?;
        if self.animals.get(animal_id).await?.is_none() {
            return Err(ValidationError::UnknownReference { entity: "Animal", id: animal_id }.into());
        }

        Ok(HealthRecordRequest {
            animal_id: Some(animal_id),
            product: validation::required(kind.product_label(), &request.product)?,
            applied_on: validation::required_date("Application date", &request.applied_on)?,
            // Stored as entered; reminder scanning skips values that do not parse
            next_due: validation::optional(request.next_due),
            notes: validation::optional(request.notes),
        })
    }

    pub async fn create_record(&self, kind: HealthKind, request: HealthRecordRequest) -> Result<HealthRecord> {
        let request = self.validate(kind, request).await?;
        let id = self.records.insert(kind, &request).await?;
        info!("💉 Recorded {} '{}' with ID: {}", kind, request.product, id);

        self.records
            .get(kind, id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("{} {} vanished after insert", kind, id))
    }

    pub async fn list_records(&self, kind: HealthKind, animal_id: Option<i64>) -> Result<Vec<HealthRecord>> {
        let records = self.records.list(kind, animal_id).await?;
        info!("Found {} {} records", records.len(), kind);
        Ok(records)
    }

    pub async fn get_record(&self, kind: HealthKind, id: i64) -> Result<Option<HealthRecord>> {
        self.records.get(kind, id).await
    }

    pub async fn update_record(&self, kind: HealthKind, id: i64, request: HealthRecordRequest) -> Result<bool> {
        let request = self.validate(kind, request).await?;
        let updated = self.records.update(kind, id, &request).await?;
        if updated {
            info!("Updated {} {}", kind, id);
        } else {
            warn!("{} record not found: {}", kind, id);
        }
        Ok(updated)
    }

    pub async fn delete_record(&self, kind: HealthKind, id: i64) -> Result<bool> {
        let deleted = self.records.delete(kind, id).await?;
        if deleted {
            info!("🗑️ Deleted {} {}", kind, id);
        } else {
            warn!("{} record not found: {}", kind, id);
        }
        Ok(deleted)
    }

    /// Upcoming vaccinations and dewormings within the horizon
    pub async fn upcoming(&self, today: NaiveDate, horizon_days: i64, soon_days: i64) -> Result<Vec<Reminder>> {
        let mut candidates = self.records.due_candidates(HealthKind::Vaccine).await?;
        candidates.extend(self.records.due_candidates(HealthKind::Deworming).await?);

        let reminders = upcoming_reminders(&candidates, today, horizon_days, soon_days);
        info!("Found {} upcoming health applications", reminders.len());
        Ok(reminders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::AnimalRequest;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).expect("valid date")
    }

    fn candidate(kind: HealthKind, animal: &str, next_due: &str) -> HealthRecord {
        HealthRecord {
            id: 1,
            kind,
            animal_id: 1,
            animal_name: animal.to_string(),
            product: "X".to_string(),
            applied_on: "2024-01-01".to_string(),
            next_due: Some(next_due.to_string()),
            notes: None,
        }
    }

    #[test]
    fn test_window_boundaries() {
        let today = date("2024-06-10");
        let due = |offset: i64| (today + Duration::days(offset)).format(DATE_FORMAT).to_string();
        let candidates: Vec<HealthRecord> = [-1, 0, 7, 8, 30, 31]
            .iter()
            .map(|offset| candidate(HealthKind::Vaccine, &format!("A{}", offset), &due(*offset)))
            .collect();

        let reminders = upcoming_reminders(&candidates, today, 30, 7);
        let days: Vec<i64> = reminders.iter().map(|r| r.days_left).collect();
        assert_eq!(days, vec![0, 7, 8, 30]);

        let urgency: Vec<Urgency> = reminders.iter().map(|r| r.urgency).collect();
        assert_eq!(urgency, vec![Urgency::Soon, Urgency::Soon, Urgency::Normal, Urgency::Normal]);
    }

    #[test]
    fn test_huge_horizon_does_not_overflow() {
        let today = date("2026-10-16");
        assert!(upcoming_reminders(&[], today, 100_000_000, 7).is_empty());

        let far = vec![candidate(HealthKind::Vaccine, "Luna", "2100-01-01")];
        let reminders = upcoming_reminders(&far, today, i64::MAX, 7);
        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].urgency, Urgency::Normal);
    }

    #[test]
    fn test_malformed_dates_are_skipped() {
        let today = date("2024-06-10");
        let candidates = vec![
            candidate(HealthKind::Vaccine, "Luna", "soon"),
            candidate(HealthKind::Vaccine, "Luna", "2024/06/12"),
            candidate(HealthKind::Vaccine, "Luna", ""),
            candidate(HealthKind::Deworming, "Max", " 2024-06-12 "),
        ];

        let reminders = upcoming_reminders(&candidates, today, 30, 7);
        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].animal_name, "Max");
        assert_eq!(reminders[0].days_left, 2);
    }

    #[test]
    fn test_sort_is_stable_on_equal_dates() {
        let today = date("2024-06-10");
        let candidates = vec![
            candidate(HealthKind::Vaccine, "Late", "2024-06-20"),
            candidate(HealthKind::Vaccine, "Luna", "2024-06-15"),
            candidate(HealthKind::Deworming, "Max", "2024-06-15"),
        ];

        let reminders = upcoming_reminders(&candidates, today, 30, 7);
        let order: Vec<(HealthKind, &str)> = reminders
            .iter()
            .map(|r| (r.kind, r.animal_name.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                (HealthKind::Vaccine, "Luna"),
                (HealthKind::Deworming, "Max"),
                (HealthKind::Vaccine, "Late"),
            ]
        );
    }

    #[test]
    fn test_notice_lists_distinct_names() {
        let today = date("2024-06-10");
        let candidates = vec![
            candidate(HealthKind::Vaccine, "Max", "2024-06-11"),
            candidate(HealthKind::Deworming, "Max", "2024-06-12"),
            candidate(HealthKind::Vaccine, "Bella", "2024-06-13"),
            candidate(HealthKind::Vaccine, "123", "2024-06-13"),
            candidate(HealthKind::Vaccine, "Later", "2024-06-30"),
        ];
        let reminders = upcoming_reminders(&candidates, today, 30, 7);

        let notice = soon_notice(&reminders, 7).expect("notice");
        assert_eq!(notice.soon_count, 4);
        assert_eq!(notice.animal_names, vec!["Bella", "Max"]);
        assert!(!notice.more_names);
        assert_eq!(notice.message(), "4 health application(s) due within 7 days: Bella, Max");
    }

    #[test]
    fn test_notice_truncates_names() {
        let today = date("2024-06-10");
        let candidates: Vec<HealthRecord> = (0..20)
            .map(|i| candidate(HealthKind::Vaccine, &format!("Pet{:02}", i), "2024-06-11"))
            .collect();
        let reminders = upcoming_reminders(&candidates, today, 30, 7);

        let notice = soon_notice(&reminders, 7).expect("notice");
        assert_eq!(notice.animal_names.len(), NOTICE_NAME_LIMIT);
        assert!(notice.more_names);
        assert!(notice.message().ends_with(", ..."));

        assert!(soon_notice(&[], 7).is_none());
    }

    #[tokio::test]
    async fn test_upcoming_reads_both_tables() {
        let db = DbConnection::init_test().await.expect("Failed to init db");
        let animal_id = AnimalRepository::new(db.clone())
            .insert(&AnimalRequest { name: "Luna".to_string(), type_id: Some(1), ..Default::default() })
            .await
            .expect("insert animal");
        let service = HealthService::new(db);

        for (kind, due) in [(HealthKind::Deworming, "2024-06-12"), (HealthKind::Vaccine, "2024-06-12")] {
            service
                .create_record(
                    kind,
                    HealthRecordRequest {
                        animal_id: Some(animal_id),
                        product: "P".to_string(),
                        applied_on: "2024-05-12".to_string(),
                        next_due: Some(due.to_string()),
                        notes: None,
                    },
                )
                .await
                .expect("create");
        }

        let reminders = service.upcoming(date("2024-06-10"), 30, 7).await.expect("upcoming");
        assert_eq!(reminders.len(), 2);
        assert_eq!(reminders[0].kind, HealthKind::Vaccine);
        assert_eq!(reminders[1].kind, HealthKind::Deworming);
    }

    #[tokio::test]
    async fn test_create_record_requires_existing_animal_and_product() {
        let db = DbConnection::init_test().await.expect("Failed to init db");
        let service = HealthService::new(db);

        let request = HealthRecordRequest {
            animal_id: Some(5),
            product: "Rabies".to_string(),
            applied_on: "2024-05-12".to_string(),
            next_due: None,
            notes: None,
        };
        let err = service.create_record(HealthKind::Vaccine, request).await.unwrap_err();
        assert_eq!(
            err.downcast::<ValidationError>().expect("validation error"),
            ValidationError::UnknownReference { entity: "Animal", id: 5 }
        );
    }
}
