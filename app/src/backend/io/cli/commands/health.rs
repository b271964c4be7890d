use anyhow::Result;
use chrono::NaiveDate;

use crate::backend::domain::models::validation::DATE_FORMAT;
use crate::backend::io::cli::output::{cell, confirm, Output};
use crate::backend::io::cli::HealthCommands;
use crate::backend::AppState;
use shared::{HealthKind, HealthRecordRequest};

pub async fn cmd_health(
    state: &AppState,
    out: &Output,
    kind: HealthKind,
    command: HealthCommands,
    today: NaiveDate,
) -> Result<()> {
    let service = &state.health_service;
    let label = kind.label().to_lowercase();

    match command {
        HealthCommands::List { animal_id } => {
            let records = service.list_records(kind, animal_id).await?;
            let rows = records
                .iter()
                .map(|r| {
                    vec![
                        r.id.to_string(),
                        r.animal_name.clone(),
                        r.product.clone(),
                        r.applied_on.clone(),
                        cell(r.next_due.as_deref()),
                        cell(r.notes.as_deref()),
                    ]
                })
                .collect();
            out.list(
                &records,
                &["ID", "Animal", kind.product_label(), "Applied", "Next due", "Notes"],
                rows,
            )
        }
        HealthCommands::Add { fields } => {
            let request = HealthRecordRequest {
                animal_id: fields.animal_id,
                product: fields.product.unwrap_or_default(),
                applied_on: fields
                    .applied_on
                    .unwrap_or_else(|| today.format(DATE_FORMAT).to_string()),
                next_due: fields.next_due,
                notes: fields.notes,
            };
            let record = service.create_record(kind, request).await?;
            if out.is_json() {
                return out.print_json(&record);
            }
            out.done(&format!(
                "Recorded {} {} for {} (ID: {})",
                label, record.product, record.animal_name, record.id
            ));
            Ok(())
        }
        HealthCommands::Update { id, fields } => {
            let Some(existing) = service.get_record(kind, id).await? else {
                println!("{} {} not found.", kind.label(), id);
                return Ok(());
            };
            let request = HealthRecordRequest {
                animal_id: fields.animal_id.or(Some(existing.animal_id)),
                product: fields.product.unwrap_or(existing.product),
                applied_on: fields.applied_on.unwrap_or(existing.applied_on),
                next_due: fields.next_due.or(existing.next_due),
                notes: fields.notes.or(existing.notes),
            };
            if service.update_record(kind, id, request).await? {
                out.done(&format!("Updated {} {}", label, id));
            }
            Ok(())
        }
        HealthCommands::Delete { id, yes } => {
            if !confirm(&format!("Delete {} {}?", label, id), yes)? {
                println!("Cancelled.");
                return Ok(());
            }
            if service.delete_record(kind, id).await? {
                out.done(&format!("Deleted {} {}", label, id));
            } else {
                println!("{} {} not found.", kind.label(), id);
            }
            Ok(())
        }
    }
}
