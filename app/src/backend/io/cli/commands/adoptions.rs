use anyhow::Result;
use chrono::NaiveDate;

use crate::backend::io::cli::output::{cell, confirm, Output};
use crate::backend::io::cli::AdoptionCommands;
use crate::backend::AppState;
use shared::{AdoptionRequest, AdoptionStatus};

pub async fn cmd_adoptions(state: &AppState, out: &Output, command: AdoptionCommands, today: NaiveDate) -> Result<()> {
    let service = &state.adoption_service;

    match command {
        AdoptionCommands::List { status } => {
            let adoptions = service.list_adoptions(status.map(AdoptionStatus::from)).await?;
            let rows = adoptions
                .iter()
                .map(|a| {
                    vec![
                        a.id.to_string(),
                        a.animal_name.clone(),
                        a.adopter_name.clone(),
                        a.status.to_string(),
                        cell(a.exit_date.as_deref()),
                        cell(a.observations.as_deref()),
                    ]
                })
                .collect();
            out.list(
                &adoptions,
                &["ID", "Animal", "Adopter", "Status", "Exit date", "Observations"],
                rows,
            )
        }
        AdoptionCommands::Add { fields } => {
            let request = AdoptionRequest {
                animal_id: fields.animal_id,
                adopter_id: fields.adopter_id,
                status: fields
                    .status
                    .map(AdoptionStatus::from)
                    .unwrap_or(AdoptionStatus::InProgress),
                exit_date: fields.exit_date,
                observations: fields.observations,
            };
            let adoption = service.create_adoption(request, today).await?;
            if out.is_json() {
                return out.print_json(&adoption);
            }
            out.done(&format!(
                "Recorded adoption {}: {} -> {} ({})",
                adoption.id, adoption.animal_name, adoption.adopter_name, adoption.status
            ));
            Ok(())
        }
        AdoptionCommands::Update { id, fields } => {
            let Some(existing) = service.get_adoption(id).await? else {
                println!("Adoption {} not found.", id);
                return Ok(());
            };
            let request = AdoptionRequest {
                animal_id: fields.animal_id.or(Some(existing.animal_id)),
                adopter_id: fields.adopter_id.or(Some(existing.adopter_id)),
                status: fields.status.map(AdoptionStatus::from).unwrap_or(existing.status),
                exit_date: fields.exit_date.or(existing.exit_date),
                observations: fields.observations.or(existing.observations),
            };
            if service.update_adoption(id, request, today).await? {
                out.done(&format!("Updated adoption {}", id));
            }
            Ok(())
        }
        AdoptionCommands::Delete { id, yes } => {
            if !confirm(&format!("Delete adoption {}?", id), yes)? {
                println!("Cancelled.");
                return Ok(());
            }
            if service.delete_adoption(id).await? {
                out.done(&format!("Deleted adoption {}", id));
            } else {
                println!("Adoption {} not found.", id);
            }
            Ok(())
        }
        AdoptionCommands::Available => {
            let animals = service.available_animals().await?;
            let rows = animals
                .iter()
                .map(|a| vec![a.id.to_string(), a.name.clone()])
                .collect();
            out.list(&animals, &["ID", "Name"], rows)
        }
    }
}
