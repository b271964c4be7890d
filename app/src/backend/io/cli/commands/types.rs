use anyhow::Result;

use crate::backend::io::cli::output::{confirm, Output};
use crate::backend::io::cli::TypeCommands;
use crate::backend::AppState;

pub async fn cmd_types(state: &AppState, out: &Output, command: TypeCommands) -> Result<()> {
    let service = &state.animal_service;

    match command {
        TypeCommands::List => {
            let types = service.list_types().await?;
            let rows = types
                .iter()
                .map(|t| vec![t.id.to_string(), t.name.clone()])
                .collect();
            out.list(&types, &["ID", "Name"], rows)
        }
        TypeCommands::Add { name } => {
            let animal_type = service.create_type(&name).await?;
            if out.is_json() {
                return out.print_json(&animal_type);
            }
            out.done(&format!("Added type '{}' (ID: {})", animal_type.name, animal_type.id));
            Ok(())
        }
        TypeCommands::Rename { id, name } => {
            if service.rename_type(id, &name).await? {
                out.done(&format!("Renamed type {} to '{}'", id, name.trim()));
            } else {
                println!("Animal type {} not found.", id);
            }
            Ok(())
        }
        TypeCommands::Delete { id, yes } => {
            if !confirm(&format!("Delete animal type {}?", id), yes)? {
                println!("Cancelled.");
                return Ok(());
            }
            if service.delete_type(id).await? {
                out.done(&format!("Deleted animal type {}", id));
            } else {
                println!("Animal type {} not found.", id);
            }
            Ok(())
        }
    }
}
