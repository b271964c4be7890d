use anyhow::Result;
use chrono::NaiveDate;
use log::{info, warn};

use crate::backend::domain::models::validation::{self, ValidationError, DATE_FORMAT};
use crate::backend::storage::{AdopterRepository, AdoptionRepository, AnimalRepository, DbConnection};
use shared::{Adopter, AdopterRequest, Adoption, AdoptionRequest, AdoptionStatus, LookupItem};

/// Service for adopters and adoption records
#[derive(Clone)]
pub struct AdoptionService {
    adopters: AdopterRepository,
    adoptions: AdoptionRepository,
    animals: AnimalRepository,
}

impl AdoptionService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            adopters: AdopterRepository::new(db.clone()),
            adoptions: AdoptionRepository::new(db.clone()),
            animals: AnimalRepository::new(db),
        }
    }

    // ----- adopters -----

    fn validate_adopter(request: AdopterRequest) -> Result<AdopterRequest> {
        Ok(AdopterRequest {
            name: validation::required("Name", &request.name)?,
            document: validation::optional(request.document),
            phone: validation::optional(request.phone),
            email: validation::optional(request.email),
            address: validation::optional(request.address),
        })
    }

    pub async fn create_adopter(&self, request: AdopterRequest) -> Result<Adopter> {
        let request = Self::validate_adopter(request)?;
        let id = self.adopters.insert(&request).await?;
        info!("🏠 Created adopter '{}' with ID: {}", request.name, id);

        Ok(Adopter {
            id,
            name: request.name,
            document: request.document,
            phone: request.phone,
            email: request.email,
            address: request.address,
        })
    }

    pub async fn list_adopters(&self, search: Option<&str>) -> Result<Vec<Adopter>> {
        self.adopters.list(search).await
    }

    pub async fn get_adopter(&self, id: i64) -> Result<Option<Adopter>> {
        self.adopters.get(id).await
    }

    pub async fn update_adopter(&self, id: i64, request: AdopterRequest) -> Result<bool> {
        let request = Self::validate_adopter(request)?;
        let updated = self.adopters.update(id, &request).await?;
        if updated {
            info!("Updated adopter {} ('{}')", id, request.name);
        } else {
            warn!("Adopter not found: {}", id);
        }
        Ok(updated)
    }

    /// Hard delete; adoptions keep their adopter_id
    pub async fn delete_adopter(&self, id: i64) -> Result<bool> {
        let deleted = self.adopters.delete(id).await?;
        if deleted {
            info!("🗑️ Deleted adopter {}", id);
        } else {
            warn!("Adopter not found: {}", id);
        }
        Ok(deleted)
    }

    pub async fn lookup_adopters(&self) -> Result<Vec<LookupItem>> {
        self.adopters.lookup().await
    }

    // ----- adoptions -----

    /// Validate references and dates; an ADOPTED row without an exit date gets `today`
    async fn validate_adoption(&self, request: AdoptionRequest, today: NaiveDate) -> Result<AdoptionRequest> {
        let animal_id = validation::required_id("Animal", request.animal_id)?;
        let adopter_id = validation::required_id("Adopter", request.adopter_id)?;

        if self.animals.get(animal_id).await?.is_none() {
            return Err(ValidationError::UnknownReference { entity: "Animal", id: animal_id }.into());
        }
        if self.adopters.get(adopter_id).await?.is_none() {
            return Err(ValidationError::UnknownReference { entity: "Adopter", id: adopter_id }.into());
        }

        let mut exit_date = validation::optional_date("Exit date", request.exit_date)?;
        if request.status == AdoptionStatus::Adopted && exit_date.is_none() {
            exit_date = Some(today.format(DATE_FORMAT).to_string());
        }

        Ok(AdoptionRequest {
            animal_id: Some(animal_id),
            adopter_id: Some(adopter_id),
            status: request.status,
            exit_date,
            observations: validation::optional(request.observations),
        })
    }

    pub async fn create_adoption(&self, request: AdoptionRequest, today: NaiveDate) -> Result<Adoption> {
        let request = self.validate_adoption(request, today).await?;
        let id = self.adoptions.insert(&request).await?;
        info!(
            "🏠 Recorded adoption {} for animal {} with status {}",
            id,
            request.animal_id.unwrap_or_default(),
            request.status
        );

        self.adoptions
            .get(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Adoption {} vanished after insert", id))
    }

    pub async fn list_adoptions(&self, status: Option<AdoptionStatus>) -> Result<Vec<Adoption>> {
        let adoptions = self.adoptions.list(status).await?;
        info!("Found {} adoptions", adoptions.len());
        Ok(adoptions)
    }

    pub async fn get_adoption(&self, id: i64) -> Result<Option<Adoption>> {
        self.adoptions.get(id).await
    }

    pub async fn update_adoption(&self, id: i64, request: AdoptionRequest, today: NaiveDate) -> Result<bool> {
        let request = self.validate_adoption(request, today).await?;
        let updated = self.adoptions.update(id, &request).await?;
        if updated {
            info!("Updated adoption {} to status {}", id, request.status);
        } else {
            warn!("Adoption not found: {}", id);
        }
        Ok(updated)
    }

    pub async fn delete_adoption(&self, id: i64) -> Result<bool> {
        let deleted = self.adoptions.delete(id).await?;
        if deleted {
            info!("🗑️ Deleted adoption {}", id);
        } else {
            warn!("Adoption not found: {}", id);
        }
        Ok(deleted)
    }

    /// Animals that can still be offered for adoption
    pub async fn available_animals(&self) -> Result<Vec<LookupItem>> {
        self.adoptions.available_animals().await
    }
}
