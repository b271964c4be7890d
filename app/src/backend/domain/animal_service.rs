use anyhow::Result;
use log::{info, warn};

use crate::backend::domain::models::validation::{self, ValidationError};
use crate::backend::storage::{AnimalRepository, AnimalTypeRepository, DbConnection};
use shared::{Animal, AnimalFilter, AnimalRequest, AnimalType, LookupItem};

/// True when the error came from a UNIQUE constraint
fn is_unique_violation(err: &anyhow::Error) -> bool {
    match err.downcast_ref::<sqlx::Error>() {
        Some(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
        _ => false,
    }
}

/// Service for animals and their types
#[derive(Clone)]
pub struct AnimalService {
    types: AnimalTypeRepository,
    animals: AnimalRepository,
}

impl AnimalService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            types: AnimalTypeRepository::new(db.clone()),
            animals: AnimalRepository::new(db),
        }
    }

    /// Create a new animal type; names are unique
    pub async fn create_type(&self, name: &str) -> Result<AnimalType> {
        let name = validation::required("Name", name)?;

        if self.types.find_by_name(&name).await?.is_some() {
            return Err(ValidationError::DuplicateTypeName(name).into());
        }

        let id = match self.types.insert(&name).await {
            Ok(id) => id,
            Err(e) if is_unique_violation(&e) => {
                return Err(ValidationError::DuplicateTypeName(name).into());
            }
            Err(e) => return Err(e),
        };

        info!("🐾 Created animal type '{}' with ID: {}", name, id);
        Ok(AnimalType { id, name })
    }

    pub async fn list_types(&self) -> Result<Vec<AnimalType>> {
        self.types.list().await
    }

    /// Rename a type; false when it does not exist
    pub async fn rename_type(&self, id: i64, name: &str) -> Result<bool> {
        let name = validation::required("Name", name)?;

        if let Some(existing) = self.types.find_by_name(&name).await? {
            if existing != id {
                return Err(ValidationError::DuplicateTypeName(name).into());
            }
        }

        let updated = self.types.update(id, &name).await?;
        if updated {
            info!("Renamed animal type {} to '{}'", id, name);
        } else {
            warn!("Animal type not found: {}", id);
        }
        Ok(updated)
    }

    pub async fn delete_type(&self, id: i64) -> Result<bool> {
        let deleted = self.types.delete(id).await?;
        if deleted {
            info!("🗑️ Deleted animal type {}", id);
        } else {
            warn!("Animal type not found: {}", id);
        }
        Ok(deleted)
    }

    async fn validate(&self, request: AnimalRequest) -> Result<AnimalRequest> {
        let name = validation::required("Name", &request.name)?;
        let type_id = validation::required_id("Type", request.type_id)?;
        if self.types.get(type_id).await?.is_none() {
            return Err(ValidationError::UnknownReference { entity: "Animal type", id: type_id }.into());
        }
        if request.age_months.map_or(false, |age| age < 0) {
            return Err(ValidationError::NegativeAge.into());
        }

        Ok(AnimalRequest {
            name,
            type_id: Some(type_id),
            sex: validation::optional(request.sex),
            age_months: request.age_months,
            intake_date: validation::optional_date("Intake date", request.intake_date)?,
            notes: validation::optional(request.notes),
        })
    }

    pub async fn create_animal(&self, request: AnimalRequest) -> Result<Animal> {
        let request = self.validate(request).await?;
        let id = self.animals.insert(&request).await?;
        info!("🐾 Created animal '{}' with ID: {}", request.name, id);

        self.animals
            .get(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Animal {} vanished after insert", id))
    }

    pub async fn list_animals(&self, filter: &AnimalFilter) -> Result<Vec<Animal>> {
        let animals = self.animals.list(filter).await?;
        info!("Found {} animals", animals.len());
        Ok(animals)
    }

    pub async fn get_animal(&self, id: i64) -> Result<Option<Animal>> {
        self.animals.get(id).await
    }

    /// Overwrite every field of an animal; false when it does not exist
    pub async fn update_animal(&self, id: i64, request: AnimalRequest) -> Result<bool> {
        let request = self.validate(request).await?;
        let updated = self.animals.update(id, &request).await?;
        if updated {
            info!("Updated animal {} ('{}')", id, request.name);
        } else {
            warn!("Animal not found: {}", id);
        }
        Ok(updated)
    }

    /// Hard delete; health, donation and adoption rows keep their animal_id
    pub async fn delete_animal(&self, id: i64) -> Result<bool> {
        let deleted = self.animals.delete(id).await?;
        if deleted {
            info!("🗑️ Deleted animal {}", id);
        } else {
            warn!("Animal not found: {}", id);
        }
        Ok(deleted)
    }

    pub async fn lookup_animals(&self) -> Result<Vec<LookupItem>> {
        self.animals.lookup().await
    }
}
