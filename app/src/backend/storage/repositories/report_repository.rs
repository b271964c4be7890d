use anyhow::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use shared::{ReportCell, ReportKind};
use crate::backend::storage::connection::DbConnection;

/// Read-only queries backing the tabular reports
#[derive(Clone)]
pub struct ReportRepository {
    db: DbConnection,
}

fn text(row: &SqliteRow, column: &str) -> ReportCell {
    ReportCell::text(row.get::<Option<String>, _>(column))
}

fn integer(row: &SqliteRow, column: &str) -> ReportCell {
    match row.get::<Option<i64>, _>(column) {
        Some(v) => ReportCell::Integer(v),
        None => ReportCell::Empty,
    }
}

impl ReportRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Rows for a report, newest id first, cells in column order.
    ///
    /// Rows whose type, sponsor, animal or adopter is gone are left out; a
    /// donation without an animal is kept with an empty animal cell.
    pub async fn rows(&self, kind: ReportKind) -> Result<Vec<Vec<ReportCell>>> {
        let sql = match kind {
            ReportKind::Animals => {
                r#"
                SELECT a.id, a.name, t.name AS type_name, a.sex, a.age_months, a.intake_date
                FROM animals a
                JOIN animal_types t ON t.id = a.type_id
                ORDER BY a.id DESC
                "#
            }
            ReportKind::AnimalTypes => "SELECT id, name FROM animal_types ORDER BY id DESC",
            ReportKind::Sponsors => "SELECT id, name, phone, email FROM sponsors ORDER BY id DESC",
            ReportKind::Adopters => {
                "SELECT id, name, document, phone, email FROM adopters ORDER BY id DESC"
            }
            ReportKind::Donations => {
                r#"
                SELECT d.id, d.date, s.name AS sponsor_name, a.name AS animal_name, d.amount, d.method
                FROM donations d
                JOIN sponsors s ON s.id = d.sponsor_id
                LEFT JOIN animals a ON a.id = d.animal_id
                ORDER BY d.id DESC
                "#
            }
            ReportKind::Adoptions => {
                r#"
                SELECT ad.id, a.name AS animal_name, p.name AS adopter_name, ad.status, ad.exit_date
                FROM adoptions ad
                JOIN animals a ON a.id = ad.animal_id
                JOIN adopters p ON p.id = ad.adopter_id
                ORDER BY ad.id DESC
                "#
            }
        };

        let rows = sqlx::query(sql).fetch_all(self.db.pool()).await?;

        Ok(rows
            .iter()
            .map(|row| match kind {
                ReportKind::Animals => vec![
                    integer(row, "id"),
                    text(row, "name"),
                    text(row, "type_name"),
                    text(row, "sex"),
                    integer(row, "age_months"),
                    text(row, "intake_date"),
                ],
                ReportKind::AnimalTypes => vec![integer(row, "id"), text(row, "name")],
                ReportKind::Sponsors => vec![
                    integer(row, "id"),
                    text(row, "name"),
                    text(row, "phone"),
                    text(row, "email"),
                ],
                ReportKind::Adopters => vec![
                    integer(row, "id"),
                    text(row, "name"),
                    text(row, "document"),
                    text(row, "phone"),
                    text(row, "email"),
                ],
                ReportKind::Donations => vec![
                    integer(row, "id"),
                    text(row, "date"),
                    text(row, "sponsor_name"),
                    text(row, "animal_name"),
                    ReportCell::Money(row.get::<Option<f64>, _>("amount").unwrap_or(0.0)),
                    text(row, "method"),
                ],
                ReportKind::Adoptions => vec![
                    integer(row, "id"),
                    text(row, "animal_name"),
                    text(row, "adopter_name"),
                    text(row, "status"),
                    text(row, "exit_date"),
                ],
            })
            .collect())
    }
}
