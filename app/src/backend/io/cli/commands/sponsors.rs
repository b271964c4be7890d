use anyhow::Result;

use crate::backend::io::cli::output::{cell, confirm, Output};
use crate::backend::io::cli::SponsorCommands;
use crate::backend::AppState;
use shared::SponsorRequest;

pub async fn cmd_sponsors(state: &AppState, out: &Output, command: SponsorCommands) -> Result<()> {
    let service = &state.sponsor_service;

    match command {
        SponsorCommands::List { search } => {
            let sponsors = service.list_sponsors(search.as_deref()).await?;
            let rows = sponsors
                .iter()
                .map(|s| {
                    vec![
                        s.id.to_string(),
                        s.name.clone(),
                        cell(s.phone.as_deref()),
                        cell(s.email.as_deref()),
                        cell(s.notes.as_deref()),
                    ]
                })
                .collect();
            out.list(&sponsors, &["ID", "Name", "Phone", "Email", "Notes"], rows)
        }
        SponsorCommands::Add { name, fields } => {
            let sponsor = service
                .create_sponsor(SponsorRequest {
                    name,
                    phone: fields.phone,
                    email: fields.email,
                    notes: fields.notes,
                })
                .await?;
            if out.is_json() {
                return out.print_json(&sponsor);
            }
            out.done(&format!("Added sponsor {} (ID: {})", sponsor.name, sponsor.id));
            Ok(())
        }
        SponsorCommands::Update { id, name, fields } => {
            let Some(existing) = service.get_sponsor(id).await? else {
                println!("Sponsor {} not found.", id);
                return Ok(());
            };
            let request = SponsorRequest {
                name: name.unwrap_or(existing.name),
                phone: fields.phone.or(existing.phone),
                email: fields.email.or(existing.email),
                notes: fields.notes.or(existing.notes),
            };
            if service.update_sponsor(id, request).await? {
                out.done(&format!("Updated sponsor {}", id));
            }
            Ok(())
        }
        SponsorCommands::Delete { id, yes } => {
            let Some(sponsor) = service.get_sponsor(id).await? else {
                println!("Sponsor {} not found.", id);
                return Ok(());
            };
            // Donations keep their sponsor id and show a blank name afterwards
            if !confirm(&format!("Delete sponsor '{}' (ID: {})?", sponsor.name, id), yes)? {
                println!("Cancelled.");
                return Ok(());
            }
            if service.delete_sponsor(id).await? {
                out.done(&format!("Deleted sponsor {}", sponsor.name));
            }
            Ok(())
        }
    }
}
