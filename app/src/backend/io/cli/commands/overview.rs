use anyhow::Result;
use chrono::NaiveDate;

use crate::backend::config::CONFIG_FILE_NAME;
use crate::backend::io::cli::output::{format_table, Output};
use crate::backend::AppState;
use shared::{format_amount, Reminder, Urgency};

pub fn cmd_init(state: &AppState, out: &Output) -> Result<()> {
    if out.is_json() {
        return out.print_json(&serde_json::json!({
            "data_dir": state.data_dir,
            "config": state.data_dir.join(CONFIG_FILE_NAME),
            "database": state.config.database_path(&state.data_dir),
            "exports": state.export_dir(),
        }));
    }

    println!("Shelter Records is ready.");
    println!("  Data directory: {}", state.data_dir.display());
    println!("  Config file:    {}", state.data_dir.join(CONFIG_FILE_NAME).display());
    println!("  Database:       {}", state.config.database_path(&state.data_dir).display());
    println!("  Exports:        {}", state.export_dir().display());
    Ok(())
}

fn reminder_rows(reminders: &[Reminder]) -> Vec<Vec<String>> {
    reminders
        .iter()
        .map(|r| {
            let flag = match r.urgency {
                Urgency::Soon => "⚠ soon",
                Urgency::Normal => "",
            };
            vec![
                r.kind.label().to_string(),
                r.animal_name.clone(),
                r.due_date.to_string(),
                r.days_left.to_string(),
                flag.to_string(),
            ]
        })
        .collect()
}

const REMINDER_HEADERS: [&str; 5] = ["Kind", "Animal", "Due", "Days left", ""];

pub async fn cmd_reminders(state: &AppState, out: &Output, days: Option<i64>, today: NaiveDate) -> Result<()> {
    let horizon = days.unwrap_or(state.config.reminder_horizon_days);
    let reminders = state
        .health_service
        .upcoming(today, horizon, state.config.soon_threshold_days)
        .await?;

    if !out.is_json() {
        println!("Health applications due in the next {} days", horizon);
        println!();
    }
    out.list(&reminders, &REMINDER_HEADERS, reminder_rows(&reminders))
}

pub async fn cmd_dashboard(state: &AppState, out: &Output, today: NaiveDate) -> Result<()> {
    let summary = state
        .dashboard_service
        .summary(
            today,
            state.config.reminder_horizon_days,
            state.config.soon_threshold_days,
        )
        .await?;

    if out.is_json() {
        return out.print_json(&summary);
    }

    println!("Dashboard ({})", today);
    println!("{:-<50}", "");
    println!("Animals:                 {}", summary.total_animals);
    println!("Sponsors:                {}", summary.total_sponsors);
    println!("Donations {}:       {}", summary.current_month, format_amount(summary.donations_this_month));
    println!("Adopted:                 {}", summary.adopted_count);
    println!("Adoptions in progress:   {}", summary.in_progress_count);

    println!();
    println!("Donations by month");
    let peak = summary
        .donation_series
        .iter()
        .map(|m| m.total)
        .fold(0.0_f64, f64::max);
    for month in &summary.donation_series {
        let bar_len = if peak > 0.0 {
            ((month.total / peak) * 30.0).round() as usize
        } else {
            0
        };
        println!("  {}  {:>12}  {}", month.label, format_amount(month.total), "█".repeat(bar_len));
    }

    println!();
    println!("Animals by type");
    let type_rows: Vec<Vec<String>> = summary
        .animals_by_type
        .iter()
        .map(|t| vec![t.type_name.clone(), t.count.to_string()])
        .collect();
    print!("{}", format_table(&["Type", "Count"], &type_rows));

    println!();
    println!("Upcoming health applications");
    print!("{}", format_table(&REMINDER_HEADERS, &reminder_rows(&summary.upcoming)));
    Ok(())
}
