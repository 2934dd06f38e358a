// 🗄️ SQLite persistence - schema, seed catalog, prediction history
//
// All storage concerns live here: the pricing engine itself only sees the
// CarCatalog trait, implemented below over a rusqlite connection.

use crate::auth;
use crate::catalog::{Car, CarCatalog};
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

/// Default database filename, created in the working directory like the
/// original deployment.
pub const DEFAULT_DB_PATH: &str = "car_valuator.db";

// ============================================================================
// SCHEMA
// ============================================================================

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT UNIQUE NOT NULL,
            email TEXT UNIQUE NOT NULL,
            password_hash TEXT NOT NULL,
            full_name TEXT NOT NULL,
            phone TEXT,
            is_admin INTEGER DEFAULT 0,
            created_at TEXT DEFAULT CURRENT_TIMESTAMP,
            last_login TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS cars (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            brand TEXT NOT NULL,
            model TEXT NOT NULL,
            year INTEGER NOT NULL,
            fuel_type TEXT NOT NULL,
            transmission TEXT NOT NULL,
            engine_capacity REAL NOT NULL,
            mileage REAL NOT NULL,
            base_price INTEGER NOT NULL,
            depreciation_rate REAL DEFAULT 0.15,
            created_at TEXT DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT DEFAULT CURRENT_TIMESTAMP,
            UNIQUE(brand, model, year, fuel_type, transmission)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS predictions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            car_id INTEGER NOT NULL,
            car_age INTEGER NOT NULL,
            car_condition TEXT NOT NULL,
            kilometers_driven INTEGER NOT NULL,
            city TEXT NOT NULL,
            state TEXT,
            predicted_price INTEGER NOT NULL,
            prediction_date TEXT DEFAULT CURRENT_TIMESTAMP,
            invoice_generated INTEGER DEFAULT 0,
            FOREIGN KEY (user_id) REFERENCES users (id),
            FOREIGN KEY (car_id) REFERENCES cars (id)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS invoices (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            prediction_id INTEGER NOT NULL,
            invoice_number TEXT UNIQUE NOT NULL,
            user_id INTEGER NOT NULL,
            amount INTEGER NOT NULL,
            service_charge INTEGER DEFAULT 500,
            total_amount INTEGER NOT NULL,
            generated_at TEXT DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (prediction_id) REFERENCES predictions (id),
            FOREIGN KEY (user_id) REFERENCES users (id)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS sessions (
            token TEXT PRIMARY KEY,
            user_id INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users (id)
        )",
        [],
    )?;

    // ==========================================================================
    // Indexes
    // ==========================================================================
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_cars_brand ON cars(brand)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_predictions_user ON predictions(user_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_invoices_prediction ON invoices(prediction_id)",
        [],
    )?;

    Ok(())
}

/// Create the default administrator account if it does not exist yet.
pub fn ensure_admin_user(conn: &Connection) -> Result<()> {
    let password_hash = auth::hash_password("admin123");

    conn.execute(
        "INSERT OR IGNORE INTO users (username, email, password_hash, full_name, is_admin)
         VALUES (?1, ?2, ?3, ?4, 1)",
        params![
            "admin",
            "admin@carvaluator.com",
            password_hash,
            "System Administrator"
        ],
    )
    .context("Failed to create default admin user")?;

    Ok(())
}

// ============================================================================
// CATALOG - car queries
// ============================================================================

/// New car attributes for catalog administration (id assigned by SQLite).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCar {
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub fuel_type: String,
    pub transmission: String,
    pub engine_capacity: f64,
    pub mileage_rating: f64,
    pub base_price: i64,
    pub depreciation_rate: f64,
}

fn car_from_row(row: &Row) -> rusqlite::Result<Car> {
    Ok(Car {
        id: row.get(0)?,
        brand: row.get(1)?,
        model: row.get(2)?,
        year: row.get(3)?,
        fuel_type: row.get(4)?,
        transmission: row.get(5)?,
        engine_capacity: row.get(6)?,
        mileage_rating: row.get(7)?,
        base_price: row.get(8)?,
        depreciation_rate: row.get(9)?,
    })
}

const CAR_COLUMNS: &str = "id, brand, model, year, fuel_type, transmission,
    engine_capacity, mileage, base_price, depreciation_rate";

pub fn insert_car(conn: &Connection, car: &NewCar) -> Result<i64> {
    conn.execute(
        "INSERT OR IGNORE INTO cars (
            brand, model, year, fuel_type, transmission,
            engine_capacity, mileage, base_price, depreciation_rate
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            car.brand,
            car.model,
            car.year,
            car.fuel_type,
            car.transmission,
            car.engine_capacity,
            car.mileage_rating,
            car.base_price,
            car.depreciation_rate,
        ],
    )
    .context("Failed to insert car")?;

    Ok(conn.last_insert_rowid())
}

pub fn get_car(conn: &Connection, car_id: i64) -> Result<Option<Car>> {
    let car = conn
        .query_row(
            &format!("SELECT {} FROM cars WHERE id = ?1", CAR_COLUMNS),
            params![car_id],
            car_from_row,
        )
        .optional()
        .context("Failed to query car")?;

    Ok(car)
}

pub fn all_cars(conn: &Connection) -> Result<Vec<Car>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM cars ORDER BY brand, model",
        CAR_COLUMNS
    ))?;

    let cars = stmt
        .query_map([], car_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to list cars")?;

    Ok(cars)
}

pub fn cars_by_brand(conn: &Connection, brand: &str) -> Result<Vec<Car>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM cars WHERE LOWER(brand) = LOWER(?1) ORDER BY model",
        CAR_COLUMNS
    ))?;

    let cars = stmt
        .query_map(params![brand], car_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to list cars by brand")?;

    Ok(cars)
}

pub fn car_count(conn: &Connection) -> Result<i64> {
    let count = conn.query_row("SELECT COUNT(*) FROM cars", [], |row| row.get(0))?;
    Ok(count)
}

// ============================================================================
// SQLITE CATALOG - the CarCatalog collaborator
// ============================================================================

/// Read-only catalog view over an open connection, handed to the pricing
/// engine as its lookup collaborator.
pub struct SqliteCatalog<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteCatalog<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        SqliteCatalog { conn }
    }
}

impl CarCatalog for SqliteCatalog<'_> {
    fn get_car(&self, car_id: i64) -> Result<Option<Car>> {
        get_car(self.conn, car_id)
    }
}

// ============================================================================
// PREDICTION HISTORY
// ============================================================================

/// Stored prediction, one row per estimate a user ran.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub id: i64,
    pub user_id: i64,
    pub car_id: i64,
    pub car_age: u32,
    pub car_condition: String,
    pub kilometers_driven: u64,
    pub city: String,
    pub state: String,
    pub predicted_price: i64,
    pub prediction_date: String,
    pub invoice_generated: bool,
}

fn prediction_from_row(row: &Row) -> rusqlite::Result<PredictionRecord> {
    Ok(PredictionRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        car_id: row.get(2)?,
        car_age: row.get(3)?,
        car_condition: row.get(4)?,
        kilometers_driven: row.get(5)?,
        city: row.get(6)?,
        state: row.get::<_, Option<String>>(7)?.unwrap_or_default(),
        predicted_price: row.get(8)?,
        prediction_date: row.get(9)?,
        invoice_generated: row.get(10)?,
    })
}

const PREDICTION_COLUMNS: &str = "id, user_id, car_id, car_age, car_condition,
    kilometers_driven, city, state, predicted_price, prediction_date, invoice_generated";

/// Record a finished prediction; returns the new row id.
pub fn insert_prediction(
    conn: &Connection,
    user_id: i64,
    request: &crate::engine::PredictionRequest,
    predicted_price: i64,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO predictions (
            user_id, car_id, car_age, car_condition, kilometers_driven,
            city, state, predicted_price, prediction_date
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            user_id,
            request.car_id,
            request.car_age,
            request.condition,
            request.kilometers_driven,
            request.city,
            request.state,
            predicted_price,
            Utc::now().to_rfc3339(),
        ],
    )
    .context("Failed to insert prediction")?;

    Ok(conn.last_insert_rowid())
}

pub fn get_prediction(conn: &Connection, prediction_id: i64) -> Result<Option<PredictionRecord>> {
    let prediction = conn
        .query_row(
            &format!(
                "SELECT {} FROM predictions WHERE id = ?1",
                PREDICTION_COLUMNS
            ),
            params![prediction_id],
            prediction_from_row,
        )
        .optional()
        .context("Failed to query prediction")?;

    Ok(prediction)
}

pub fn predictions_for_user(conn: &Connection, user_id: i64) -> Result<Vec<PredictionRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM predictions WHERE user_id = ?1 ORDER BY prediction_date DESC",
        PREDICTION_COLUMNS
    ))?;

    let predictions = stmt
        .query_map(params![user_id], prediction_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to list predictions")?;

    Ok(predictions)
}

/// Flip the invoice_generated flag once an invoice exists for a prediction.
pub fn mark_invoice_generated(conn: &Connection, prediction_id: i64) -> Result<()> {
    conn.execute(
        "UPDATE predictions SET invoice_generated = 1 WHERE id = ?1",
        params![prediction_id],
    )
    .context("Failed to mark prediction invoiced")?;

    Ok(())
}

// ============================================================================
// SEED CATALOG
// ============================================================================

/// Seed the catalog with the standard multi-brand dataset. Idempotent:
/// rows already present are left alone. Returns how many were added.
pub fn seed_catalog(conn: &Connection) -> Result<usize> {
    // (brand, model, year, fuel, transmission, engine l, rated km/l, base price, yearly rate)
    let seed: &[(&str, &str, i32, &str, &str, f64, f64, i64, f64)] = &[
        // Maruti Suzuki
        ("Maruti Suzuki", "Swift", 2023, "Petrol", "Manual", 1.2, 23.2, 650_000, 0.12),
        ("Maruti Suzuki", "Swift", 2022, "Petrol", "AMT", 1.2, 22.8, 620_000, 0.12),
        ("Maruti Suzuki", "Baleno", 2023, "Petrol", "Automatic", 1.2, 22.9, 750_000, 0.12),
        ("Maruti Suzuki", "Dzire", 2023, "Petrol", "Manual", 1.2, 24.1, 680_000, 0.12),
        ("Maruti Suzuki", "Vitara Brezza", 2023, "Petrol", "Automatic", 1.5, 18.7, 850_000, 0.13),
        ("Maruti Suzuki", "Ertiga", 2023, "Petrol", "Manual", 1.5, 19.3, 900_000, 0.13),
        ("Maruti Suzuki", "Wagon R", 2023, "Petrol", "Manual", 1.0, 25.2, 550_000, 0.12),
        ("Maruti Suzuki", "Alto K10", 2023, "Petrol", "Manual", 1.0, 24.9, 450_000, 0.12),
        // Hyundai
        ("Hyundai", "i20", 2023, "Petrol", "Manual", 1.2, 20.4, 720_000, 0.13),
        ("Hyundai", "Creta", 2023, "Petrol", "Automatic", 1.5, 17.4, 1_200_000, 0.14),
        ("Hyundai", "Creta", 2023, "Diesel", "Manual", 1.5, 21.4, 1_250_000, 0.14),
        ("Hyundai", "Venue", 2023, "Petrol", "Manual", 1.2, 18.2, 750_000, 0.14),
        ("Hyundai", "Verna", 2023, "Petrol", "CVT", 1.5, 18.4, 1_100_000, 0.14),
        ("Hyundai", "Tucson", 2023, "Petrol", "Automatic", 2.0, 13.9, 2_800_000, 0.16),
        // Tata
        ("Tata", "Nexon", 2023, "Petrol", "Manual", 1.2, 17.6, 850_000, 0.13),
        ("Tata", "Nexon", 2023, "Electric", "Automatic", 0.0, 312.0, 1_600_000, 0.10),
        ("Tata", "Harrier", 2023, "Diesel", "Automatic", 2.0, 16.8, 1_600_000, 0.15),
        ("Tata", "Safari", 2023, "Diesel", "Automatic", 2.0, 16.1, 1_800_000, 0.15),
        ("Tata", "Punch", 2023, "Petrol", "Manual", 1.2, 18.8, 650_000, 0.13),
        ("Tata", "Tiago", 2023, "Petrol", "Manual", 1.2, 20.0, 550_000, 0.13),
        // Mahindra
        ("Mahindra", "XUV700", 2023, "Petrol", "Automatic", 2.0, 13.0, 1_500_000, 0.16),
        ("Mahindra", "XUV300", 2023, "Petrol", "Manual", 1.2, 17.0, 900_000, 0.16),
        ("Mahindra", "Scorpio-N", 2023, "Diesel", "Manual", 2.2, 15.4, 1_300_000, 0.16),
        ("Mahindra", "Thar", 2023, "Petrol", "Manual", 2.0, 15.2, 1_400_000, 0.15),
        // Honda
        ("Honda", "City", 2023, "Petrol", "CVT", 1.5, 17.8, 1_200_000, 0.14),
        ("Honda", "City", 2023, "Petrol", "Manual", 1.5, 18.4, 1_150_000, 0.14),
        ("Honda", "Amaze", 2023, "Petrol", "CVT", 1.2, 18.3, 750_000, 0.14),
        // Toyota
        ("Toyota", "Innova Crysta", 2023, "Diesel", "Manual", 2.4, 15.6, 1_900_000, 0.12),
        ("Toyota", "Fortuner", 2023, "Diesel", "Automatic", 2.8, 14.2, 3_500_000, 0.13),
        ("Toyota", "Glanza", 2023, "Petrol", "Manual", 1.2, 22.9, 680_000, 0.13),
        ("Toyota", "Camry", 2023, "Petrol", "Automatic", 2.5, 13.4, 4_200_000, 0.15),
        // Kia
        ("Kia", "Seltos", 2023, "Petrol", "Automatic", 1.5, 16.8, 1_100_000, 0.15),
        ("Kia", "Sonet", 2023, "Petrol", "Manual", 1.2, 18.4, 750_000, 0.15),
        ("Kia", "Carnival", 2023, "Diesel", "Automatic", 2.2, 14.1, 3_500_000, 0.16),
        // MG
        ("MG", "Hector", 2023, "Petrol", "CVT", 1.5, 13.9, 1_400_000, 0.17),
        ("MG", "ZS EV", 2023, "Electric", "Automatic", 0.0, 419.0, 2_500_000, 0.12),
        // Skoda
        ("Skoda", "Kushaq", 2023, "Petrol", "Automatic", 1.0, 18.1, 1_200_000, 0.16),
        ("Skoda", "Slavia", 2023, "Petrol", "Automatic", 1.0, 18.7, 1_200_000, 0.16),
        // Volkswagen
        ("Volkswagen", "Taigun", 2023, "Petrol", "DSG", 1.0, 18.7, 1_250_000, 0.16),
        ("Volkswagen", "Virtus", 2023, "Petrol", "Manual", 1.0, 19.4, 1_200_000, 0.16),
        // Nissan / Renault
        ("Nissan", "Magnite", 2023, "Petrol", "CVT", 1.0, 20.0, 700_000, 0.18),
        ("Renault", "Kiger", 2023, "Petrol", "AMT", 1.0, 20.5, 650_000, 0.18),
        ("Renault", "Triber", 2023, "Petrol", "Manual", 1.0, 20.0, 600_000, 0.18),
        // BMW
        ("BMW", "3 Series", 2023, "Petrol", "Automatic", 2.0, 16.1, 4_500_000, 0.20),
        ("BMW", "X1", 2023, "Petrol", "Automatic", 2.0, 14.8, 4_200_000, 0.20),
        ("BMW", "X5", 2023, "Petrol", "Automatic", 3.0, 12.1, 8_500_000, 0.24),
        // Audi
        ("Audi", "A4", 2023, "Petrol", "Automatic", 2.0, 15.4, 4_500_000, 0.21),
        ("Audi", "Q5", 2023, "Petrol", "Automatic", 2.0, 13.6, 6_500_000, 0.22),
        ("Audi", "e-tron", 2023, "Electric", "Automatic", 0.0, 379.0, 10_000_000, 0.15),
        // Mercedes-Benz
        ("Mercedes-Benz", "C-Class", 2023, "Petrol", "Automatic", 2.0, 14.2, 5_500_000, 0.21),
        ("Mercedes-Benz", "E-Class", 2023, "Petrol", "Automatic", 2.0, 13.1, 7_500_000, 0.22),
        ("Mercedes-Benz", "GLC", 2023, "Petrol", "Automatic", 2.0, 12.8, 6_500_000, 0.22),
        // Jaguar / Land Rover / Volvo
        ("Jaguar", "F-Pace", 2023, "Petrol", "Automatic", 2.0, 12.9, 7_000_000, 0.24),
        ("Land Rover", "Range Rover Evoque", 2023, "Petrol", "Automatic", 2.0, 11.8, 7_000_000, 0.25),
        ("Volvo", "XC60", 2023, "Petrol", "Automatic", 2.0, 12.8, 6_500_000, 0.23),
        // Premium & exotics
        ("Porsche", "Cayenne", 2023, "Petrol", "Automatic", 3.0, 10.2, 13_500_000, 0.26),
        ("Lamborghini", "Urus", 2023, "Petrol", "Automatic", 4.0, 8.1, 42_000_000, 0.32),
        ("Rolls-Royce", "Ghost", 2023, "Petrol", "Automatic", 6.6, 7.8, 55_000_000, 0.35),
        // Jeep / Ford / Citroen
        ("Jeep", "Compass", 2023, "Petrol", "Automatic", 1.4, 14.1, 2_000_000, 0.18),
        ("Ford", "EcoSport", 2022, "Petrol", "Automatic", 1.5, 15.9, 950_000, 0.17),
        ("Citroen", "C3", 2023, "Petrol", "Manual", 1.2, 19.8, 650_000, 0.16),
    ];

    let before = car_count(conn)?;

    for (brand, model, year, fuel, transmission, engine, mileage, price, rate) in seed {
        insert_car(
            conn,
            &NewCar {
                brand: brand.to_string(),
                model: model.to_string(),
                year: *year,
                fuel_type: fuel.to_string(),
                transmission: transmission.to_string(),
                engine_capacity: *engine,
                mileage_rating: *mileage,
                base_price: *price,
                depreciation_rate: *rate,
            },
        )?;
    }

    let after = car_count(conn)?;
    Ok((after - before) as usize)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::PredictionRequest;

    fn test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        conn
    }

    fn test_request(car_id: i64) -> PredictionRequest {
        PredictionRequest {
            car_id,
            car_age: 2,
            condition: "good".to_string(),
            kilometers_driven: 28_000,
            state: "karnataka".to_string(),
            city: "bangalore".to_string(),
        }
    }

    #[test]
    fn test_setup_is_idempotent() {
        let conn = test_db();
        setup_database(&conn).unwrap();
        setup_database(&conn).unwrap();
    }

    #[test]
    fn test_seed_catalog_idempotent() {
        let conn = test_db();

        let first = seed_catalog(&conn).unwrap();
        assert!(first > 50);

        // Re-seeding inserts nothing new
        let second = seed_catalog(&conn).unwrap();
        assert_eq!(second, 0);
        assert_eq!(car_count(&conn).unwrap() as usize, first);
    }

    #[test]
    fn test_get_car_roundtrip() {
        let conn = test_db();
        let id = insert_car(
            &conn,
            &NewCar {
                brand: "Maruti Suzuki".to_string(),
                model: "Swift".to_string(),
                year: 2023,
                fuel_type: "Petrol".to_string(),
                transmission: "Manual".to_string(),
                engine_capacity: 1.2,
                mileage_rating: 23.2,
                base_price: 650_000,
                depreciation_rate: 0.12,
            },
        )
        .unwrap();

        let car = get_car(&conn, id).unwrap().unwrap();
        assert_eq!(car.brand, "Maruti Suzuki");
        assert_eq!(car.base_price, 650_000);
        assert!((car.depreciation_rate - 0.12).abs() < 1e-9);

        assert!(get_car(&conn, id + 1000).unwrap().is_none());
    }

    #[test]
    fn test_cars_by_brand_case_insensitive() {
        let conn = test_db();
        seed_catalog(&conn).unwrap();

        let lower = cars_by_brand(&conn, "hyundai").unwrap();
        let exact = cars_by_brand(&conn, "Hyundai").unwrap();

        assert!(!lower.is_empty());
        assert_eq!(lower.len(), exact.len());
        assert!(lower.iter().all(|c| c.brand == "Hyundai"));
    }

    #[test]
    fn test_sqlite_catalog_implements_lookup() {
        let conn = test_db();
        seed_catalog(&conn).unwrap();

        let catalog = SqliteCatalog::new(&conn);
        let car = catalog.get_car(1).unwrap();
        assert!(car.is_some());
        assert!(catalog.get_car(99_999).unwrap().is_none());
    }

    #[test]
    fn test_prediction_history() {
        let conn = test_db();
        seed_catalog(&conn).unwrap();
        ensure_admin_user(&conn).unwrap();

        let request = test_request(1);
        let id = insert_prediction(&conn, 1, &request, 512_000).unwrap();

        let stored = get_prediction(&conn, id).unwrap().unwrap();
        assert_eq!(stored.predicted_price, 512_000);
        assert_eq!(stored.car_condition, "good");
        assert_eq!(stored.state, "karnataka");
        assert!(!stored.invoice_generated);

        let history = predictions_for_user(&conn, 1).unwrap();
        assert_eq!(history.len(), 1);

        mark_invoice_generated(&conn, id).unwrap();
        assert!(get_prediction(&conn, id).unwrap().unwrap().invoice_generated);
    }

    #[test]
    fn test_ensure_admin_user_idempotent() {
        let conn = test_db();
        ensure_admin_user(&conn).unwrap();
        ensure_admin_user(&conn).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM users WHERE username = 'admin'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }
}
