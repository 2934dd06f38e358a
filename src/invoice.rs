// 🧾 Invoices - record-keeping + printable document
//
// One invoice per prediction, generated idempotently. The renderer emits
// the invoice as plain text with the same content blocks the customer-
// facing document carries (bill-to, service details, billing summary).

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::db;

/// Flat fee charged for a valuation, rupees.
pub const SERVICE_CHARGE: i64 = 500;

// ============================================================================
// INVOICE RECORD
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: i64,
    pub prediction_id: i64,
    pub invoice_number: String,
    pub user_id: i64,
    pub amount: i64,
    pub service_charge: i64,
    pub total_amount: i64,
    pub generated_at: String,
}

fn invoice_from_row(row: &Row) -> rusqlite::Result<Invoice> {
    Ok(Invoice {
        id: row.get(0)?,
        prediction_id: row.get(1)?,
        invoice_number: row.get(2)?,
        user_id: row.get(3)?,
        amount: row.get(4)?,
        service_charge: row.get(5)?,
        total_amount: row.get(6)?,
        generated_at: row.get(7)?,
    })
}

const INVOICE_COLUMNS: &str =
    "id, prediction_id, invoice_number, user_id, amount, service_charge, total_amount, generated_at";

pub fn get_invoice(conn: &Connection, invoice_id: i64) -> Result<Option<Invoice>> {
    let invoice = conn
        .query_row(
            &format!("SELECT {} FROM invoices WHERE id = ?1", INVOICE_COLUMNS),
            params![invoice_id],
            invoice_from_row,
        )
        .optional()
        .context("Failed to query invoice")?;

    Ok(invoice)
}

pub fn invoice_for_prediction(conn: &Connection, prediction_id: i64) -> Result<Option<Invoice>> {
    let invoice = conn
        .query_row(
            &format!(
                "SELECT {} FROM invoices WHERE prediction_id = ?1",
                INVOICE_COLUMNS
            ),
            params![prediction_id],
            invoice_from_row,
        )
        .optional()
        .context("Failed to query invoice by prediction")?;

    Ok(invoice)
}

/// Generate (or fetch) the invoice for a prediction. Idempotent: a second
/// call returns the existing invoice instead of creating another.
/// `Ok(None)` when the prediction does not exist or belongs to another
/// user.
pub fn generate_invoice(
    conn: &Connection,
    prediction_id: i64,
    user_id: i64,
) -> Result<Option<Invoice>> {
    let prediction = match db::get_prediction(conn, prediction_id)? {
        Some(p) if p.user_id == user_id => p,
        _ => return Ok(None),
    };

    if let Some(existing) = invoice_for_prediction(conn, prediction_id)? {
        return Ok(Some(existing));
    }

    let invoice_number = format!(
        "INV-{}-{:04}",
        Utc::now().format("%Y%m%d"),
        prediction.id
    );

    // The valuation itself is free; only the service fee is billed.
    conn.execute(
        "INSERT INTO invoices (prediction_id, invoice_number, user_id, amount, service_charge, total_amount, generated_at)
         VALUES (?1, ?2, ?3, 0, ?4, ?5, ?6)",
        params![
            prediction_id,
            invoice_number,
            user_id,
            SERVICE_CHARGE,
            SERVICE_CHARGE,
            Utc::now().to_rfc3339(),
        ],
    )
    .context("Failed to insert invoice")?;

    db::mark_invoice_generated(conn, prediction_id)?;

    get_invoice(conn, conn.last_insert_rowid())
}

// ============================================================================
// INVOICE DOCUMENT
// ============================================================================

/// Everything the printable document needs, joined across invoice,
/// prediction, car and user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceDetails {
    pub invoice_number: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub car_brand: String,
    pub car_model: String,
    pub car_year: i32,
    pub car_condition: String,
    pub kilometers_driven: u64,
    pub city: String,
    pub predicted_price: i64,
    pub service_charge: i64,
    pub total_amount: i64,
    pub generated_at: String,
}

pub fn invoice_details(conn: &Connection, invoice_id: i64) -> Result<Option<InvoiceDetails>> {
    let details = conn
        .query_row(
            "SELECT i.invoice_number, u.full_name, u.email, u.phone,
                    c.brand, c.model, c.year,
                    p.car_condition, p.kilometers_driven, p.city, p.predicted_price,
                    i.service_charge, i.total_amount, i.generated_at
             FROM invoices i
             JOIN predictions p ON i.prediction_id = p.id
             JOIN cars c ON p.car_id = c.id
             JOIN users u ON i.user_id = u.id
             WHERE i.id = ?1",
            params![invoice_id],
            |row| {
                Ok(InvoiceDetails {
                    invoice_number: row.get(0)?,
                    customer_name: row.get(1)?,
                    customer_email: row.get(2)?,
                    customer_phone: row.get(3)?,
                    car_brand: row.get(4)?,
                    car_model: row.get(5)?,
                    car_year: row.get(6)?,
                    car_condition: row.get(7)?,
                    kilometers_driven: row.get(8)?,
                    city: row.get(9)?,
                    predicted_price: row.get(10)?,
                    service_charge: row.get(11)?,
                    total_amount: row.get(12)?,
                    generated_at: row.get(13)?,
                })
            },
        )
        .optional()
        .context("Failed to load invoice details")?;

    Ok(details)
}

/// Render the invoice as a plain-text document.
pub fn render_invoice(details: &InvoiceDetails) -> String {
    let mut out = String::new();

    out.push_str("============================================\n");
    out.push_str("            CAR VALUATOR\n");
    out.push_str("============================================\n\n");
    out.push_str(&format!("Invoice #{}\n", details.invoice_number));
    out.push_str(&format!("Date: {}\n\n", details.generated_at));

    out.push_str("Bill To:\n");
    out.push_str(&format!("  {}\n", details.customer_name));
    out.push_str(&format!("  Email: {}\n", details.customer_email));
    out.push_str(&format!(
        "  Phone: {}\n\n",
        details.customer_phone.as_deref().unwrap_or("N/A")
    ));

    out.push_str("Service Details:\n");
    out.push_str(&format!(
        "  Car:               {} {} ({})\n",
        details.car_brand, details.car_model, details.car_year
    ));
    out.push_str(&format!("  Condition:         {}\n", details.car_condition));
    out.push_str(&format!(
        "  Kilometers Driven: {} km\n",
        format_indian_currency(details.kilometers_driven as i64)
    ));
    out.push_str(&format!("  City:              {}\n", details.city));
    out.push_str(&format!(
        "  Predicted Price:   Rs. {}\n\n",
        format_indian_currency(details.predicted_price)
    ));

    out.push_str("Billing Summary:\n");
    out.push_str(&format!(
        "  Valuation Service: Rs. {}\n",
        format_indian_currency(details.service_charge)
    ));
    out.push_str(&format!(
        "  Total Amount:      Rs. {}\n\n",
        format_indian_currency(details.total_amount)
    ));

    out.push_str("Thank you for using Car Valuator!\n");
    out.push_str("This invoice is for price valuation services only.\n");

    out
}

// ============================================================================
// CURRENCY FORMATTING
// ============================================================================

/// Indian-style digit grouping: last three digits, then pairs.
/// 12345678 -> "1,23,45,678".
pub fn format_indian_currency(amount: i64) -> String {
    if amount == 0 {
        return "0".to_string();
    }
    if amount < 0 {
        return format!("-{}", format_indian_currency(-amount));
    }

    let digits = amount.to_string();
    if digits.len() <= 3 {
        return digits;
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    let mut rest = head;

    while !rest.is_empty() {
        let cut = rest.len().saturating_sub(2);
        groups.push(&rest[cut..]);
        rest = &rest[..cut];
    }

    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}

// ============================================================================
// TESTS
// ============================================================================
