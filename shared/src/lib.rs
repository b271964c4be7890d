use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A kind of animal kept by the shelter (dog, cat, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimalType {
    pub id: i64,
    pub name: String,
}

/// An animal as shown in lists, with its type resolved to a display name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animal {
    pub id: i64,
    pub name: String,
    pub type_id: i64,
    /// Empty when the referenced type no longer exists
    pub type_name: String,
    pub sex: Option<String>,
    pub age_months: Option<i64>,
    pub intake_date: Option<String>, // ISO 8601 date format (YYYY-MM-DD)
    pub notes: Option<String>,
}

/// Full-row input for creating or overwriting an animal
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimalRequest {
    pub name: String,
    pub type_id: Option<i64>,
    pub sex: Option<String>,
    pub age_months: Option<i64>,
    pub intake_date: Option<String>,
    pub notes: Option<String>,
}

/// Optional filters for the animal list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimalFilter {
    /// Substring match on the animal name
    pub name: Option<String>,
    pub sex: Option<String>,
    pub type_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sponsor {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SponsorRequest {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
}

/// A donation with sponsor and animal resolved to display names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Donation {
    pub id: i64,
    pub date: String,
    pub sponsor_id: i64,
    pub sponsor_name: String,
    pub animal_id: Option<i64>,
    pub animal_name: String,
    pub amount: f64,
    pub method: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DonationRequest {
    pub date: String,
    pub sponsor_id: Option<i64>,
    pub animal_id: Option<i64>,
    pub amount: f64,
    pub method: Option<String>,
    pub note: Option<String>,
}

/// Which health table a record lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HealthKind {
    Vaccine,
    Deworming,
}

impl HealthKind {
    pub fn label(&self) -> &'static str {
        match self {
            HealthKind::Vaccine => "Vaccine",
            HealthKind::Deworming => "Deworming",
        }
    }

    /// Name of the field holding the vaccine or product name
    pub fn product_label(&self) -> &'static str {
        match self {
            HealthKind::Vaccine => "Vaccine",
            HealthKind::Deworming => "Product",
        }
    }
}

impl fmt::Display for HealthKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A vaccination or deworming application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthRecord {
    pub id: i64,
    pub kind: HealthKind,
    pub animal_id: i64,
    pub animal_name: String,
    /// Vaccine name or deworming product
    pub product: String,
    pub applied_on: String,
    /// Free text as entered; may be empty or not a valid date
    pub next_due: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthRecordRequest {
    pub animal_id: Option<i64>,
    pub product: String,
    pub applied_on: String,
    pub next_due: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adopter {
    pub id: i64,
    pub name: String,
    pub document: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdopterRequest {
    pub name: String,
    pub document: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

/// Status of a single adoption record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdoptionStatus {
    InProgress,
    Adopted,
    Rejected,
}

impl AdoptionStatus {
    pub const ALL: [AdoptionStatus; 3] = [
        AdoptionStatus::InProgress,
        AdoptionStatus::Adopted,
        AdoptionStatus::Rejected,
    ];

    /// Value stored in the `status` column
    pub fn as_str(&self) -> &'static str {
        match self {
            AdoptionStatus::InProgress => "IN_PROGRESS",
            AdoptionStatus::Adopted => "ADOPTED",
            AdoptionStatus::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for AdoptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdoptionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "IN_PROGRESS" => Ok(AdoptionStatus::InProgress),
            "ADOPTED" => Ok(AdoptionStatus::Adopted),
            "REJECTED" => Ok(AdoptionStatus::Rejected),
            other => Err(format!("Unknown adoption status: {}", other)),
        }
    }
}

/// An adoption with animal and adopter resolved to display names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adoption {
    pub id: i64,
    pub animal_id: i64,
    pub animal_name: String,
    pub adopter_id: i64,
    pub adopter_name: String,
    pub status: AdoptionStatus,
    pub exit_date: Option<String>,
    pub observations: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdoptionRequest {
    pub animal_id: Option<i64>,
    pub adopter_id: Option<i64>,
    pub status: AdoptionStatus,
    pub exit_date: Option<String>,
    pub observations: Option<String>,
}

/// Where an animal currently stands, derived from its latest adoption row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnimalStatus {
    Adopted,
    InProcess,
    InShelter,
}

impl AnimalStatus {
    /// `latest` is the status of the most recently inserted adoption row, if any
    pub fn from_latest(latest: Option<AdoptionStatus>) -> Self {
        match latest {
            Some(AdoptionStatus::Adopted) => AnimalStatus::Adopted,
            Some(_) => AnimalStatus::InProcess,
            None => AnimalStatus::InShelter,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AnimalStatus::Adopted => "ADOPTED",
            AnimalStatus::InProcess => "IN PROCESS",
            AnimalStatus::InShelter => "IN SHELTER",
        }
    }

    /// Badge colour used on printed profile sheets
    pub fn color(&self) -> &'static str {
        match self {
            AnimalStatus::Adopted => "#16a34a",
            AnimalStatus::InProcess => "#f59e0b",
            AnimalStatus::InShelter => "#2563eb",
        }
    }
}

impl fmt::Display for AnimalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Id/name pair used by pickers (available animals, sponsors, adopters)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupItem {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Urgency {
    /// Due within the "soon" threshold (7 days by default)
    Soon,
    Normal,
}

/// An upcoming vaccination or deworming inside the reminder horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub kind: HealthKind,
    pub animal_name: String,
    pub due_date: NaiveDate,
    pub days_left: i64,
    pub urgency: Urgency,
}

/// Donation total for one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTotal {
    /// `YYYY-MM`
    pub label: String,
    pub month_start: NaiveDate,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeCount {
    pub type_name: String,
    pub count: i64,
}

/// Everything the dashboard shows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_animals: i64,
    pub total_sponsors: i64,
    /// `YYYY-MM` of the month the month-to-date total covers
    pub current_month: String,
    pub donations_this_month: f64,
    pub adopted_count: i64,
    pub in_progress_count: i64,
    pub donation_series: Vec<MonthlyTotal>,
    pub animals_by_type: Vec<TypeCount>,
    pub upcoming: Vec<Reminder>,
}

/// The fixed set of tabular reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportKind {
    Animals,
    AnimalTypes,
    Sponsors,
    Adopters,
    Donations,
    Adoptions,
}

impl ReportKind {
    pub const ALL: [ReportKind; 6] = [
        ReportKind::Animals,
        ReportKind::AnimalTypes,
        ReportKind::Sponsors,
        ReportKind::Adopters,
        ReportKind::Donations,
        ReportKind::Adoptions,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ReportKind::Animals => "Animals",
            ReportKind::AnimalTypes => "Animal Types",
            ReportKind::Sponsors => "Sponsors",
            ReportKind::Adopters => "Adopters",
            ReportKind::Donations => "Donations",
            ReportKind::Adoptions => "Adoptions",
        }
    }

    /// Lowercase, underscore-separated label used in file names
    pub fn slug(&self) -> String {
        self.label().to_lowercase().replace(' ', "_")
    }

    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            ReportKind::Animals => &["ID", "Name", "Type", "Sex", "Age (months)", "Intake"],
            ReportKind::AnimalTypes => &["ID", "Name"],
            ReportKind::Sponsors => &["ID", "Name", "Phone", "Email"],
            ReportKind::Adopters => &["ID", "Name", "Document", "Phone", "Email"],
            ReportKind::Donations => &["ID", "Date", "Sponsor", "Animal", "Amount", "Method"],
            ReportKind::Adoptions => &["ID", "Animal", "Adopter", "Status", "Exit date"],
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single materialized report value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReportCell {
    Text(String),
    Integer(i64),
    Money(f64),
    Empty,
}

impl ReportCell {
    /// Text cell, or `Empty` when the value is missing or blank
    pub fn text(value: Option<String>) -> Self {
        match value {
            Some(v) if !v.trim().is_empty() => ReportCell::Text(v),
            _ => ReportCell::Empty,
        }
    }
}

impl fmt::Display for ReportCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportCell::Text(s) => f.write_str(s),
            ReportCell::Integer(n) => write!(f, "{}", n),
            ReportCell::Money(v) => f.write_str(&format_amount(*v)),
            ReportCell::Empty => Ok(()),
        }
    }
}

/// Marker rendered in place of a table that has no rows
pub const NO_RECORDS: &str = "No records";

/// A report row set with its fixed column schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportTable {
    pub kind: ReportKind,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<ReportCell>>,
}

impl ReportTable {
    pub fn new(kind: ReportKind, rows: Vec<Vec<ReportCell>>) -> Self {
        Self {
            kind,
            columns: kind.columns().iter().map(|c| c.to_string()).collect(),
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Animal attributes shown at the top of a profile sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimalDetail {
    pub id: i64,
    pub name: String,
    pub type_name: String,
    pub sex: Option<String>,
    pub age_months: Option<i64>,
    pub intake_date: Option<String>,
    pub notes: Option<String>,
}

/// A donation line on a profile sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileDonation {
    pub date: String,
    pub sponsor_name: String,
    pub amount: f64,
    pub method: Option<String>,
    pub note: Option<String>,
}

/// The latest adoption row for an animal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestAdoption {
    pub status: AdoptionStatus,
    pub adopter_name: String,
    pub exit_date: Option<String>,
    pub observations: Option<String>,
}

/// Everything printed on an animal's profile sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimalProfile {
    pub animal: AnimalDetail,
    /// Newest application first
    pub vaccines: Vec<HealthRecord>,
    /// Newest application first
    pub dewormings: Vec<HealthRecord>,
    /// Newest first, all rows
    pub donations: Vec<ProfileDonation>,
    pub latest_adoption: Option<LatestAdoption>,
    pub status: AnimalStatus,
}

impl AnimalProfile {
    /// Maximum donation rows printed on a sheet
    pub const DONATION_DISPLAY_LIMIT: usize = 10;

    pub fn total_donated(&self) -> f64 {
        self.donations.iter().map(|d| d.amount).sum()
    }

    pub fn displayed_donations(&self) -> &[ProfileDonation] {
        let end = self.donations.len().min(Self::DONATION_DISPLAY_LIMIT);
        &self.donations[..end]
    }

    pub fn has_more_donations(&self) -> bool {
        self.donations.len() > Self::DONATION_DISPLAY_LIMIT
    }
}

/// Format an amount with no decimals and `.` as the thousands separator
pub fn format_amount(value: f64) -> String {
    let rounded = value.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    if negative {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount_groups_thousands() {
        assert_eq!(format_amount(0.0), "0");
        assert_eq!(format_amount(999.0), "999");
        assert_eq!(format_amount(1234.4), "1.234");
        assert_eq!(format_amount(1234567.0), "1.234.567");
        assert_eq!(format_amount(-2500.0), "-2.500");
    }

    #[test]
    fn test_animal_status_from_latest() {
        assert_eq!(AnimalStatus::from_latest(None), AnimalStatus::InShelter);
        assert_eq!(
            AnimalStatus::from_latest(Some(AdoptionStatus::Adopted)),
            AnimalStatus::Adopted
        );
        assert_eq!(
            AnimalStatus::from_latest(Some(AdoptionStatus::InProgress)),
            AnimalStatus::InProcess
        );
        assert_eq!(
            AnimalStatus::from_latest(Some(AdoptionStatus::Rejected)),
            AnimalStatus::InProcess
        );
    }

    #[test]
    fn test_adoption_status_parsing_is_case_insensitive() {
        assert_eq!("adopted".parse::<AdoptionStatus>(), Ok(AdoptionStatus::Adopted));
        assert_eq!(" in_progress ".parse::<AdoptionStatus>(), Ok(AdoptionStatus::InProgress));
        assert!("returned".parse::<AdoptionStatus>().is_err());
    }

    #[test]
    fn test_report_kind_slug_and_columns() {
        assert_eq!(ReportKind::AnimalTypes.slug(), "animal_types");
        assert_eq!(ReportKind::Donations.columns().len(), 6);
        let table = ReportTable::new(ReportKind::Sponsors, Vec::new());
        assert!(table.is_empty());
        assert_eq!(table.columns, vec!["ID", "Name", "Phone", "Email"]);
    }

    #[test]
    fn test_profile_donation_truncation() {
        let donation = ProfileDonation {
            date: "2024-01-01".to_string(),
            sponsor_name: "Ana".to_string(),
            amount: 10.0,
            method: None,
            note: None,
        };
        let profile = AnimalProfile {
            animal: AnimalDetail {
                id: 1,
                name: "Luna".to_string(),
                type_name: "Dog".to_string(),
                sex: None,
                age_months: None,
                intake_date: None,
                notes: None,
            },
            vaccines: Vec::new(),
            dewormings: Vec::new(),
            donations: vec![donation; 12],
            latest_adoption: None,
            status: AnimalStatus::InShelter,
        };

        assert_eq!(profile.displayed_donations().len(), 10);
        assert!(profile.has_more_donations());
        assert_eq!(profile.total_donated(), 120.0);
    }
}
