// 📤 CSV export - admin data dumps
//
// Each export writes a header row plus one row per record to any
// io::Write, so the same code backs file dumps from the CLI and download
// responses from the server.

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::io::Write;

/// The export targets the admin surface offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Users,
    Cars,
    Predictions,
    Invoices,
}

impl ExportKind {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "users" => Some(ExportKind::Users),
            "cars" => Some(ExportKind::Cars),
            "predictions" => Some(ExportKind::Predictions),
            "invoices" => Some(ExportKind::Invoices),
            _ => None,
        }
    }

    pub fn filename(&self) -> &'static str {
        match self {
            ExportKind::Users => "users_export.csv",
            ExportKind::Cars => "cars_export.csv",
            ExportKind::Predictions => "predictions_export.csv",
            ExportKind::Invoices => "invoices_export.csv",
        }
    }
}

/// Run one export; returns the number of data rows written.
pub fn export_csv<W: Write>(conn: &Connection, kind: ExportKind, writer: W) -> Result<usize> {
    match kind {
        ExportKind::Users => export_users(conn, writer),
        ExportKind::Cars => export_cars(conn, writer),
        ExportKind::Predictions => export_predictions(conn, writer),
        ExportKind::Invoices => export_invoices(conn, writer),
    }
}

/// Non-admin accounts only; password hashes are never exported.
fn export_users<W: Write>(conn: &Connection, writer: W) -> Result<usize> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record([
        "id",
        "username",
        "email",
        "full_name",
        "phone",
        "created_at",
        "last_login",
    ])?;

    let mut stmt = conn.prepare(
        "SELECT id, username, email, full_name, phone, created_at, last_login
         FROM users WHERE is_admin = 0 ORDER BY id",
    )?;

    let mut rows = stmt.query([])?;
    let mut count = 0;

    while let Some(row) = rows.next()? {
        csv.write_record([
            row.get::<_, i64>(0)?.to_string(),
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, Option<String>>(4)?.unwrap_or_default(),
            row.get::<_, Option<String>>(5)?.unwrap_or_default(),
            row.get::<_, Option<String>>(6)?.unwrap_or_default(),
        ])?;
        count += 1;
    }

    csv.flush().context("Failed to flush users export")?;
    Ok(count)
}

fn export_cars<W: Write>(conn: &Connection, writer: W) -> Result<usize> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record([
        "id",
        "brand",
        "model",
        "year",
        "fuel_type",
        "transmission",
        "engine_capacity",
        "mileage",
        "base_price",
        "depreciation_rate",
    ])?;

    let cars = crate::db::all_cars(conn)?;
    let count = cars.len();

    for car in cars {
        csv.write_record([
            car.id.to_string(),
            car.brand,
            car.model,
            car.year.to_string(),
            car.fuel_type,
            car.transmission,
            car.engine_capacity.to_string(),
            car.mileage_rating.to_string(),
            car.base_price.to_string(),
            car.depreciation_rate.to_string(),
        ])?;
    }

    csv.flush().context("Failed to flush cars export")?;
    Ok(count)
}

/// Predictions joined with car and user context, as the admin view shows.
fn export_predictions<W: Write>(conn: &Connection, writer: W) -> Result<usize> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record([
        "id",
        "username",
        "brand",
        "model",
        "car_age",
        "car_condition",
        "kilometers_driven",
        "state",
        "city",
        "predicted_price",
        "prediction_date",
        "invoice_generated",
    ])?;

    let mut stmt = conn.prepare(
        "SELECT p.id, u.username, c.brand, c.model, p.car_age, p.car_condition,
                p.kilometers_driven, p.state, p.city, p.predicted_price,
                p.prediction_date, p.invoice_generated
         FROM predictions p
         JOIN cars c ON p.car_id = c.id
         JOIN users u ON p.user_id = u.id
         ORDER BY p.id",
    )?;

    let mut rows = stmt.query([])?;
    let mut count = 0;

    while let Some(row) = rows.next()? {
        csv.write_record([
            row.get::<_, i64>(0)?.to_string(),
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, i64>(4)?.to_string(),
            row.get::<_, String>(5)?,
            row.get::<_, i64>(6)?.to_string(),
            row.get::<_, Option<String>>(7)?.unwrap_or_default(),
            row.get::<_, String>(8)?,
            row.get::<_, i64>(9)?.to_string(),
            row.get::<_, String>(10)?,
            row.get::<_, bool>(11)?.to_string(),
        ])?;
        count += 1;
    }

    csv.flush().context("Failed to flush predictions export")?;
    Ok(count)
}

fn export_invoices<W: Write>(conn: &Connection, writer: W) -> Result<usize> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record([
        "id",
        "invoice_number",
        "prediction_id",
        "user_id",
        "amount",
        "service_charge",
        "total_amount",
        "generated_at",
    ])?;

    let mut stmt = conn.prepare(
        "SELECT id, invoice_number, prediction_id, user_id, amount,
                service_charge, total_amount, generated_at
         FROM invoices ORDER BY id",
    )?;

    let mut rows = stmt.query([])?;
    let mut count = 0;

    while let Some(row) = rows.next()? {
        csv.write_record([
            row.get::<_, i64>(0)?.to_string(),
            row.get::<_, String>(1)?,
            row.get::<_, i64>(2)?.to_string(),
            row.get::<_, i64>(3)?.to_string(),
            row.get::<_, i64>(4)?.to_string(),
            row.get::<_, i64>(5)?.to_string(),
            row.get::<_, i64>(6)?.to_string(),
            row.get::<_, Option<String>>(7)?.unwrap_or_default(),
        ])?;
        count += 1;
    }

    csv.flush().context("Failed to flush invoices export")?;
    Ok(count)
}

// ============================================================================
// TESTS
// ============================================================================
