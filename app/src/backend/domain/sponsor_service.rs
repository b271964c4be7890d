use anyhow::Result;
use log::{info, warn};

use crate::backend::domain::models::validation;
use crate::backend::storage::{DbConnection, SponsorRepository};
use shared::{LookupItem, Sponsor, SponsorRequest};

/// Service for managing sponsors
#[derive(Clone)]
pub struct SponsorService {
    sponsors: SponsorRepository,
}

impl SponsorService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            sponsors: SponsorRepository::new(db),
        }
    }

    fn validate(request: SponsorRequest) -> Result<SponsorRequest> {
        Ok(SponsorRequest {
            name: validation::required("Name", &request.name)?,
            phone: validation::optional(request.phone),
            email: validation::optional(request.email),
            notes: validation::optional(request.notes),
        })
    }

    pub async fn create_sponsor(&self, request: SponsorRequest) -> Result<Sponsor> {
        let request = Self::validate(request)?;
        let id = self.sponsors.insert(&request).await?;
        info!("🤝 Created sponsor '{}' with ID: {}", request.name, id);

        Ok(Sponsor {
            id,
            name: request.name,
            phone: request.phone,
            email: request.email,
            notes: request.notes,
        })
    }

    /// List sponsors; `search` matches name, phone or email
    pub async fn list_sponsors(&self, search: Option<&str>) -> Result<Vec<Sponsor>> {
        let sponsors = self.sponsors.list(search).await?;
        info!("Found {} sponsors", sponsors.len());
        Ok(sponsors)
    }

    pub async fn get_sponsor(&self, id: i64) -> Result<Option<Sponsor>> {
        self.sponsors.get(id).await
    }

    pub async fn update_sponsor(&self, id: i64, request: SponsorRequest) -> Result<bool> {
        let request = Self::validate(request)?;
        let updated = self.sponsors.update(id, &request).await?;
        if updated {
            info!("Updated sponsor {} ('{}')", id, request.name);
        } else {
            warn!("Sponsor not found: {}", id);
        }
        Ok(updated)
    }

    /// Hard delete; donations from this sponsor are kept
    pub async fn delete_sponsor(&self, id: i64) -> Result<bool> {
        let deleted = self.sponsors.delete(id).await?;
        if deleted {
            info!("🗑️ Deleted sponsor {}", id);
        } else {
            warn!("Sponsor not found: {}", id);
        }
        Ok(deleted)
    }

    pub async fn lookup_sponsors(&self) -> Result<Vec<LookupItem>> {
        self.sponsors.lookup().await
    }
}
