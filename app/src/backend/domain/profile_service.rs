use anyhow::Result;
use chrono::NaiveDate;
use log::info;

use crate::backend::domain::models::document::{or_blank, Block, PrintableDocument, TableBlock};
use crate::backend::domain::models::validation::DATE_FORMAT;
use crate::backend::storage::{AdoptionRepository, AnimalRepository, DbConnection, DonationRepository, HealthRepository};
use shared::{format_amount, AnimalProfile, AnimalStatus, HealthKind, HealthRecord, NO_RECORDS};

/// Service assembling per-animal profile sheets
#[derive(Clone)]
pub struct ProfileService {
    animals: AnimalRepository,
    health: HealthRepository,
    donations: DonationRepository,
    adoptions: AdoptionRepository,
}

impl ProfileService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            animals: AnimalRepository::new(db.clone()),
            health: HealthRepository::new(db.clone()),
            donations: DonationRepository::new(db.clone()),
            adoptions: AdoptionRepository::new(db),
        }
    }

    /// Gather everything printed on a profile sheet; `None` when the animal does not exist
    pub async fn profile(&self, animal_id: i64) -> Result<Option<AnimalProfile>> {
        let animal = match self.animals.get_detail(animal_id).await? {
            Some(animal) => animal,
            None => return Ok(None),
        };

        let latest_adoption = self.adoptions.latest_for_animal(animal_id).await?;
        let status = AnimalStatus::from_latest(latest_adoption.as_ref().map(|a| a.status));

        let profile = AnimalProfile {
            animal,
            vaccines: self.health.history_for_animal(HealthKind::Vaccine, animal_id).await?,
            dewormings: self.health.history_for_animal(HealthKind::Deworming, animal_id).await?,
            donations: self.donations.list_for_animal(animal_id).await?,
            latest_adoption,
            status,
        };

        info!(
            "📄 Loaded profile for animal {} ({} vaccines, {} dewormings, {} donations)",
            animal_id,
            profile.vaccines.len(),
            profile.dewormings.len(),
            profile.donations.len()
        );
        Ok(Some(profile))
    }
}

/// `profile_<name_with_underscores>_<id>_<YYYY-MM-DD>.pdf`
/// Keep letters, digits, `-` and `_`; everything else becomes `_`
fn file_name_part(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

pub fn default_profile_file_name(profile: &AnimalProfile, today: NaiveDate) -> String {
    format!(
        "profile_{}_{}_{}.pdf",
        file_name_part(&profile.animal.name),
        profile.animal.id,
        today.format(DATE_FORMAT)
    )
}

fn health_table(records: &[HealthRecord], kind: HealthKind) -> TableBlock {
    TableBlock {
        columns: vec![
            kind.product_label().to_string(),
            "Applied".to_string(),
            "Next due".to_string(),
            "Notes".to_string(),
        ],
        rows: records
            .iter()
            .map(|r| {
                vec![
                    or_blank(Some(&r.product)),
                    or_blank(Some(&r.applied_on)),
                    or_blank(r.next_due.as_deref()),
                    or_blank(r.notes.as_deref()),
                ]
            })
            .collect(),
        empty_message: NO_RECORDS.to_string(),
    }
}

/// Printable profile sheet
pub fn profile_document(profile: &AnimalProfile, today: NaiveDate) -> PrintableDocument {
    let animal = &profile.animal;
    let mut document = PrintableDocument::new(animal.name.clone())
        .subtitle(format!("Animal profile - ID #{} - {}", animal.id, or_blank(Some(&animal.type_name))))
        .footer(format!("Generated by Shelter Records - {}", today.format(DATE_FORMAT)));

    document.push(Block::Chips(vec![
        format!("Sex: {}", or_blank(animal.sex.as_deref())),
        format!(
            "Age: {} months",
            animal.age_months.map_or_else(|| or_blank(None), |a| a.to_string())
        ),
        format!("Intake: {}", or_blank(animal.intake_date.as_deref())),
    ]));
    document.push(Block::Badge {
        label: profile.status.label().to_string(),
        color: profile.status.color().to_string(),
    });

    document.push(Block::Heading("General data".to_string()));
    document.push(Block::KeyValues(vec![
        ("Type".to_string(), or_blank(Some(&animal.type_name))),
        ("Notes".to_string(), or_blank(animal.notes.as_deref())),
    ]));

    let adoption = profile.latest_adoption.as_ref();
    document.push(Block::Heading("Current situation".to_string()));
    document.push(Block::KeyValues(vec![
        ("Status".to_string(), profile.status.label().to_string()),
        ("Adopter".to_string(), or_blank(adoption.map(|a| a.adopter_name.as_str()))),
        ("Exit date".to_string(), or_blank(adoption.and_then(|a| a.exit_date.as_deref()))),
        ("Observations".to_string(), or_blank(adoption.and_then(|a| a.observations.as_deref()))),
    ]));

    document.push(Block::Heading(format!("Vaccines ({})", profile.vaccines.len())));
    document.push(Block::Table(health_table(&profile.vaccines, HealthKind::Vaccine)));

    document.push(Block::Heading(format!("Dewormings ({})", profile.dewormings.len())));
    document.push(Block::Table(health_table(&profile.dewormings, HealthKind::Deworming)));

    document.push(Block::Heading("Economic support".to_string()));
    document.push(Block::KeyValues(vec![(
        "Total donated to this animal".to_string(),
        format_amount(profile.total_donated()),
    )]));
    document.push(Block::Table(TableBlock {
        columns: ["Date", "Sponsor", "Amount", "Method", "Note"]
            .iter()
            .map(|c| c.to_string())
            .collect(),
        rows: profile
            .displayed_donations()
            .iter()
            .map(|d| {
                vec![
                    or_blank(Some(&d.date)),
                    or_blank(Some(&d.sponsor_name)),
                    format_amount(d.amount),
                    or_blank(d.method.as_deref()),
                    or_blank(d.note.as_deref()),
                ]
            })
            .collect(),
        empty_message: NO_RECORDS.to_string(),
    }));
    if profile.has_more_donations() {
        document.push(Block::Note(format!(
            "Showing the latest {} donations",
            AnimalProfile::DONATION_DISPLAY_LIMIT
        )));
    }

    document
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{
        AdopterRequest, AdoptionRequest, AdoptionStatus, AnimalRequest, DonationRequest, HealthRecordRequest,
        SponsorRequest,
    };
    use crate::backend::storage::{AdopterRepository, SponsorRepository};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).expect("valid date")
    }

    async fn seed_animal(db: &DbConnection, name: &str) -> i64 {
        AnimalRepository::new(db.clone())
            .insert(&AnimalRequest { name: name.to_string(), type_id: Some(1), ..Default::default() })
            .await
            .expect("insert animal")
    }

    #[tokio::test]
    async fn test_missing_animal_has_no_profile() {
        let db = DbConnection::init_test().await.expect("Failed to init db");
        assert!(ProfileService::new(db).profile(1).await.expect("profile").is_none());
    }

    #[tokio::test]
    async fn test_status_follows_latest_adoption() {
        let db = DbConnection::init_test().await.expect("Failed to init db");
        let animal_id = seed_animal(&db, "Luna").await;
        let service = ProfileService::new(db.clone());

        let profile = service.profile(animal_id).await.expect("profile").expect("exists");
        assert_eq!(profile.status, AnimalStatus::InShelter);

        let adopter_id = AdopterRepository::new(db.clone())
            .insert(&AdopterRequest { name: "Carla".to_string(), ..Default::default() })
            .await
            .expect("insert adopter");
        let adoptions = AdoptionRepository::new(db);
        for status in [AdoptionStatus::Rejected, AdoptionStatus::Adopted] {
            adoptions
                .insert(&AdoptionRequest {
                    animal_id: Some(animal_id),
                    adopter_id: Some(adopter_id),
                    status,
                    exit_date: None,
                    observations: None,
                })
                .await
                .expect("insert adoption");

            let profile = service.profile(animal_id).await.expect("profile").expect("exists");
            let expected = AnimalStatus::from_latest(Some(status));
            assert_eq!(profile.status, expected);
        }

        let profile = service.profile(animal_id).await.expect("profile").expect("exists");
        assert_eq!(profile.latest_adoption.map(|a| a.adopter_name), Some("Carla".to_string()));
    }

    #[tokio::test]
    async fn test_profile_document_truncates_donations() {
        let db = DbConnection::init_test().await.expect("Failed to init db");
        let animal_id = seed_animal(&db, "Don Gato").await;
        let sponsor_id = SponsorRepository::new(db.clone())
            .insert(&SponsorRequest { name: "Ana".to_string(), ..Default::default() })
            .await
            .expect("insert sponsor");
        let donations = DonationRepository::new(db.clone());
        for day in 1..=12 {
            donations
                .insert(&DonationRequest {
                    date: format!("2024-05-{:02}", day),
                    sponsor_id: Some(sponsor_id),
                    animal_id: Some(animal_id),
                    amount: 1000.0,
                    ..Default::default()
                })
                .await
                .expect("insert donation");
        }
        HealthRepository::new(db.clone())
            .insert(
                HealthKind::Vaccine,
                &HealthRecordRequest {
                    animal_id: Some(animal_id),
                    product: "Rabies".to_string(),
                    applied_on: "2024-05-01".to_string(),
                    next_due: None,
                    notes: None,
                },
            )
            .await
            .expect("insert vaccine");

        let profile = ProfileService::new(db)
            .profile(animal_id)
            .await
            .expect("profile")
            .expect("exists");
        assert_eq!(profile.donations[0].date, "2024-05-12");
        assert_eq!(profile.total_donated(), 12000.0);

        let document = profile_document(&profile, today());
        let tables: Vec<&TableBlock> = document.tables().collect();
        assert_eq!(tables.len(), 3);
        assert_eq!(tables[0].rows.len(), 1);
        assert!(tables[1].rows.is_empty());
        assert_eq!(tables[2].rows.len(), 10);
        assert!(document
            .blocks
            .contains(&Block::Note("Showing the latest 10 donations".to_string())));
        assert!(document.blocks.contains(&Block::KeyValues(vec![(
            "Total donated to this animal".to_string(),
            "12.000".to_string()
        )])));

        assert_eq!(
            default_profile_file_name(&profile, today()),
            format!("profile_Don_Gato_{}_2024-06-10.pdf", animal_id)
        );
    }

    #[test]
    fn test_file_name_part_strips_path_characters() {
        let part = file_name_part(" ../Luna/Max: 2 ");
        assert_eq!(part, "___Luna_Max__2");
        assert!(!part.contains('/'));
        assert!(!part.contains(".."));
        assert_eq!(file_name_part("Niña-2"), "Niña-2");
    }
}
