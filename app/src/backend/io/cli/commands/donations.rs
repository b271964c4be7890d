use anyhow::Result;
use chrono::NaiveDate;

use crate::backend::domain::models::validation::DATE_FORMAT;
use crate::backend::io::cli::output::{cell, confirm, Output};
use crate::backend::io::cli::{DonationArgs, DonationCommands};
use crate::backend::AppState;
use shared::{format_amount, Donation, DonationRequest};

fn merged_request(existing: &Donation, fields: DonationArgs, no_animal: bool) -> DonationRequest {
    let animal_id = if no_animal {
        None
    } else {
        fields.animal_id.or(existing.animal_id)
    };

    DonationRequest {
        date: fields.date.unwrap_or_else(|| existing.date.clone()),
        sponsor_id: fields.sponsor_id.or(Some(existing.sponsor_id)),
        animal_id,
        amount: fields.amount.unwrap_or(existing.amount),
        method: fields.method.or_else(|| existing.method.clone()),
        note: fields.note.or_else(|| existing.note.clone()),
    }
}

pub async fn cmd_donations(state: &AppState, out: &Output, command: DonationCommands, today: NaiveDate) -> Result<()> {
    let service = &state.donation_service;

    match command {
        DonationCommands::List { sponsor_id } => {
            let donations = service.list_donations(sponsor_id).await?;
            let rows = donations
                .iter()
                .map(|d| {
                    vec![
                        d.id.to_string(),
                        d.date.clone(),
                        d.sponsor_name.clone(),
                        d.animal_name.clone(),
                        format_amount(d.amount),
                        cell(d.method.as_deref()),
                        cell(d.note.as_deref()),
                    ]
                })
                .collect();
            out.list(
                &donations,
                &["ID", "Date", "Sponsor", "Animal", "Amount", "Method", "Note"],
                rows,
            )
        }
        DonationCommands::Add { fields } => {
            let request = DonationRequest {
                date: fields
                    .date
                    .unwrap_or_else(|| today.format(DATE_FORMAT).to_string()),
                sponsor_id: fields.sponsor_id,
                animal_id: fields.animal_id,
                amount: fields.amount.unwrap_or(0.0),
                method: fields.method,
                note: fields.note,
            };
            let donation = service.create_donation(request).await?;
            if out.is_json() {
                return out.print_json(&donation);
            }
            out.done(&format!(
                "Recorded donation {} of {} from {}",
                donation.id,
                format_amount(donation.amount),
                donation.sponsor_name
            ));
            Ok(())
        }
        DonationCommands::Update { id, no_animal, fields } => {
            let Some(existing) = service.get_donation(id).await? else {
                println!("Donation {} not found.", id);
                return Ok(());
            };
            if service.update_donation(id, merged_request(&existing, fields, no_animal)).await? {
                out.done(&format!("Updated donation {}", id));
            }
            Ok(())
        }
        DonationCommands::Delete { id, yes } => {
            if !confirm(&format!("Delete donation {}?", id), yes)? {
                println!("Cancelled.");
                return Ok(());
            }
            if service.delete_donation(id).await? {
                out.done(&format!("Deleted donation {}", id));
            } else {
                println!("Donation {} not found.", id);
            }
            Ok(())
        }
    }
}
