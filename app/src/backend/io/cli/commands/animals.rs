use anyhow::Result;
use chrono::NaiveDate;

use crate::backend::domain::{default_profile_file_name, profile_document};
use crate::backend::io::cli::commands::reports::export_to;
use crate::backend::io::cli::output::{cell, confirm, Output};
use crate::backend::io::cli::{AnimalArgs, AnimalCommands};
use crate::backend::AppState;
use shared::{format_amount, Animal, AnimalFilter, AnimalProfile, AnimalRequest};

/// Overlay supplied options on the stored animal
fn merged_request(existing: &Animal, name: Option<String>, fields: AnimalArgs) -> AnimalRequest {
    AnimalRequest {
        name: name.unwrap_or_else(|| existing.name.clone()),
        type_id: fields.type_id.or(Some(existing.type_id)),
        sex: fields.sex.or_else(|| existing.sex.clone()),
        age_months: fields.age_months.or(existing.age_months),
        intake_date: fields.intake_date.or_else(|| existing.intake_date.clone()),
        notes: fields.notes.or_else(|| existing.notes.clone()),
    }
}

fn print_profile(profile: &AnimalProfile) {
    let animal = &profile.animal;
    println!("{} (ID: {}) - {}", animal.name, animal.id, animal.type_name);
    println!("Status: {}", profile.status);
    println!(
        "Sex: {} | Age: {} | Intake: {}",
        cell(animal.sex.as_deref()),
        animal.age_months.map(|a| format!("{} months", a)).unwrap_or_default(),
        cell(animal.intake_date.as_deref())
    );
    if let Some(notes) = &animal.notes {
        println!("Notes: {}", notes);
    }

    if let Some(adoption) = &profile.latest_adoption {
        println!(
            "Latest adoption: {} by {} (exit: {})",
            adoption.status,
            adoption.adopter_name,
            cell(adoption.exit_date.as_deref())
        );
    }

    println!();
    println!("Vaccines ({})", profile.vaccines.len());
    for v in &profile.vaccines {
        println!("  {}  {}  next: {}", v.applied_on, v.product, cell(v.next_due.as_deref()));
    }
    println!("Dewormings ({})", profile.dewormings.len());
    for d in &profile.dewormings {
        println!("  {}  {}  next: {}", d.applied_on, d.product, cell(d.next_due.as_deref()));
    }

    println!();
    println!("Total donated: {}", format_amount(profile.total_donated()));
    for donation in profile.displayed_donations() {
        println!(
            "  {}  {:>10}  {}",
            donation.date,
            format_amount(donation.amount),
            donation.sponsor_name
        );
    }
    if profile.has_more_donations() {
        println!("  Showing the latest {} donations", AnimalProfile::DONATION_DISPLAY_LIMIT);
    }
}

pub async fn cmd_animals(state: &AppState, out: &Output, command: AnimalCommands, today: NaiveDate) -> Result<()> {
    let service = &state.animal_service;

    match command {
        AnimalCommands::List { name, sex, type_id } => {
            let filter = AnimalFilter { name, sex, type_id };
            let animals = service.list_animals(&filter).await?;
            let rows = animals
                .iter()
                .map(|a| {
                    vec![
                        a.id.to_string(),
                        a.name.clone(),
                        a.type_name.clone(),
                        cell(a.sex.as_deref()),
                        cell(a.age_months),
                        cell(a.intake_date.as_deref()),
                    ]
                })
                .collect();
            out.list(&animals, &["ID", "Name", "Type", "Sex", "Age (months)", "Intake"], rows)
        }
        AnimalCommands::Add { name, fields } => {
            let request = AnimalRequest {
                name,
                type_id: fields.type_id,
                sex: fields.sex,
                age_months: fields.age_months,
                intake_date: fields.intake_date,
                notes: fields.notes,
            };
            let animal = service.create_animal(request).await?;
            if out.is_json() {
                return out.print_json(&animal);
            }
            out.done(&format!("Added {} (ID: {})", animal.name, animal.id));
            Ok(())
        }
        AnimalCommands::Update { id, name, fields } => {
            let Some(existing) = service.get_animal(id).await? else {
                println!("Animal {} not found.", id);
                return Ok(());
            };
            if service.update_animal(id, merged_request(&existing, name, fields)).await? {
                out.done(&format!("Updated animal {}", id));
            }
            Ok(())
        }
        AnimalCommands::Delete { id, yes } => {
            let Some(animal) = service.get_animal(id).await? else {
                println!("Animal {} not found.", id);
                return Ok(());
            };
            if !confirm(&format!("Delete '{}' (ID: {})?", animal.name, id), yes)? {
                println!("Cancelled.");
                return Ok(());
            }
            if service.delete_animal(id).await? {
                out.done(&format!("Deleted {}", animal.name));
            }
            Ok(())
        }
        AnimalCommands::Show { id } => {
            let Some(profile) = state.profile_service.profile(id).await? else {
                println!("Animal {} not found.", id);
                return Ok(());
            };
            if out.is_json() {
                return out.print_json(&profile);
            }
            print_profile(&profile);
            Ok(())
        }
        AnimalCommands::Profile { id, output } => {
            let Some(profile) = state.profile_service.profile(id).await? else {
                println!("Animal {} not found.", id);
                return Ok(());
            };

            let target = output.unwrap_or_else(|| state.export_dir().join(default_profile_file_name(&profile, today)));
            let document = profile_document(&profile, today);
            let pdf = state.pdf_pipeline.clone();
            export_to(state, out, target, Box::new(move || pdf.render(&document))).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_keeps_fields_that_were_not_given() {
        let existing = Animal {
            id: 4,
            name: "Luna".to_string(),
            type_id: 1,
            type_name: "Dog".to_string(),
            sex: Some("F".to_string()),
            age_months: Some(14),
            intake_date: Some("2024-01-02".to_string()),
            notes: Some("Shy".to_string()),
        };
        let fields = AnimalArgs {
            age_months: Some(15),
            notes: Some(String::new()),
            ..Default::default()
        };

        let request = merged_request(&existing, None, fields);
        assert_eq!(request.name, "Luna");
        assert_eq!(request.type_id, Some(1));
        assert_eq!(request.sex.as_deref(), Some("F"));
        assert_eq!(request.age_months, Some(15));
        // Blank clears the field once the service trims it
        assert_eq!(request.notes.as_deref(), Some(""));
    }
}
