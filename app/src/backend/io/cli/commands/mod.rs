mod adopters;
mod adoptions;
mod animals;
mod donations;
mod health;
mod overview;
mod reports;
mod sponsors;
mod types;

pub use adopters::cmd_adopters;
pub use adoptions::cmd_adoptions;
pub use animals::cmd_animals;
pub use donations::cmd_donations;
pub use health::cmd_health;
pub use overview::{cmd_dashboard, cmd_init, cmd_reminders};
pub use reports::cmd_report;
pub use sponsors::cmd_sponsors;
pub use types::cmd_types;
