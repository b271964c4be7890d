use anyhow::Result;
use log::{info, warn};

use crate::backend::domain::models::validation::{self, ValidationError};
use crate::backend::storage::{AnimalRepository, DbConnection, DonationRepository, SponsorRepository};
use shared::{Donation, DonationRequest};

/// Service for recording donations
#[derive(Clone)]
pub struct DonationService {
    donations: DonationRepository,
    sponsors: SponsorRepository,
    animals: AnimalRepository,
}

impl DonationService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            donations: DonationRepository::new(db.clone()),
            sponsors: SponsorRepository::new(db.clone()),
            animals: AnimalRepository::new(db),
        }
    }

    async fn validate(&self, request: DonationRequest) -> Result<DonationRequest> {
        let date = validation::required_date("Date", &request.date)?;
        let sponsor_id = validation::required_id("Sponsor", request.sponsor_id)?;
        if self.sponsors.get(sponsor_id).await?.is_none() {
            return Err(ValidationError::UnknownReference { entity: "Sponsor", id: sponsor_id }.into());
        }
        if let Some(animal_id) = request.animal_id {
            if self.animals.get(animal_id).await?.is_none() {
                return Err(ValidationError::UnknownReference { entity: "Animal", id: animal_id }.into());
            }
        }
        if request.amount < 0.0 || !request.amount.is_finite() {
            return Err(ValidationError::NegativeAmount.into());
        }

        Ok(DonationRequest {
            date,
            sponsor_id: Some(sponsor_id),
            animal_id: request.animal_id,
            amount: request.amount,
            method: validation::optional(request.method),
            note: validation::optional(request.note),
        })
    }

    pub async fn create_donation(&self, request: DonationRequest) -> Result<Donation> {
        let request = self.validate(request).await?;
        let id = self.donations.insert(&request).await?;
        info!(
            "💰 Recorded donation {} of {:.2} from sponsor {} on {}",
            id,
            request.amount,
            request.sponsor_id.unwrap_or_default(),
            request.date
        );

        self.donations
            .get(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Donation {} vanished after insert", id))
    }

    pub async fn list_donations(&self, sponsor_id: Option<i64>) -> Result<Vec<Donation>> {
        let donations = self.donations.list(sponsor_id).await?;
        info!("Found {} donations", donations.len());
        Ok(donations)
    }

    pub async fn get_donation(&self, id: i64) -> Result<Option<Donation>> {
        self.donations.get(id).await
    }

    pub async fn update_donation(&self, id: i64, request: DonationRequest) -> Result<bool> {
        let request = self.validate(request).await?;
        let updated = self.donations.update(id, &request).await?;
        if updated {
            info!("Updated donation {}", id);
        } else {
            warn!("Donation not found: {}", id);
        }
        Ok(updated)
    }

    pub async fn delete_donation(&self, id: i64) -> Result<bool> {
        let deleted = self.donations.delete(id).await?;
        if deleted {
            info!("🗑️ Deleted donation {}", id);
        } else {
            warn!("Donation not found: {}", id);
        }
        Ok(deleted)
    }
}
