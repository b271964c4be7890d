use anyhow::Result;

use crate::backend::io::cli::output::{cell, confirm, Output};
use crate::backend::io::cli::AdopterCommands;
use crate::backend::AppState;
use shared::AdopterRequest;

pub async fn cmd_adopters(state: &AppState, out: &Output, command: AdopterCommands) -> Result<()> {
    let service = &state.adoption_service;

    match command {
        AdopterCommands::List { search } => {
            let adopters = service.list_adopters(search.as_deref()).await?;
            let rows = adopters
                .iter()
                .map(|a| {
                    vec![
                        a.id.to_string(),
                        a.name.clone(),
                        cell(a.document.as_deref()),
                        cell(a.phone.as_deref()),
                        cell(a.email.as_deref()),
                        cell(a.address.as_deref()),
                    ]
                })
                .collect();
            out.list(&adopters, &["ID", "Name", "Document", "Phone", "Email", "Address"], rows)
        }
        AdopterCommands::Add { name, fields } => {
            let adopter = service
                .create_adopter(AdopterRequest {
                    name,
                    document: fields.document,
                    phone: fields.phone,
                    email: fields.email,
                    address: fields.address,
                })
                .await?;
            if out.is_json() {
                return out.print_json(&adopter);
            }
            out.done(&format!("Added adopter {} (ID: {})", adopter.name, adopter.id));
            Ok(())
        }
        AdopterCommands::Update { id, name, fields } => {
            let Some(existing) = service.get_adopter(id).await? else {
                println!("Adopter {} not found.", id);
                return Ok(());
            };
            let request = AdopterRequest {
                name: name.unwrap_or(existing.name),
                document: fields.document.or(existing.document),
                phone: fields.phone.or(existing.phone),
                email: fields.email.or(existing.email),
                address: fields.address.or(existing.address),
            };
            if service.update_adopter(id, request).await? {
                out.done(&format!("Updated adopter {}", id));
            }
            Ok(())
        }
        AdopterCommands::Delete { id, yes } => {
            let Some(adopter) = service.get_adopter(id).await? else {
                println!("Adopter {} not found.", id);
                return Ok(());
            };
            if !confirm(&format!("Delete adopter '{}' (ID: {})?", adopter.name, id), yes)? {
                println!("Cancelled.");
                return Ok(());
            }
            if service.delete_adopter(id).await? {
                out.done(&format!("Deleted adopter {}", adopter.name));
            }
            Ok(())
        }
    }
}
