// 🚗 Car Catalog - reference data seam
//
// The pricing engine never touches storage directly; it reads car records
// through the CarCatalog trait. Production uses the SQLite-backed catalog
// in db.rs, tests and embedders can use MemoryCatalog.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// CAR RECORD
// ============================================================================

/// Static catalog attributes of a car model. Read-only from the engine's
/// point of view; created and updated only by catalog administration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Car {
    pub id: i64,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub fuel_type: String,
    pub transmission: String,

    /// Engine displacement in litres (0.0 for electric).
    pub engine_capacity: f64,

    /// Rated efficiency, km/l (or km of range per charge for EVs).
    pub mileage_rating: f64,

    /// Catalog sticker price in new condition, whole rupees.
    pub base_price: i64,

    /// Per-car yearly depreciation fraction in [0, 1). Carried through the
    /// prediction call chain but the chain itself uses fixed bracket
    /// constants; only the breakdown's displayed percentage reads it.
    pub depreciation_rate: f64,
}

// ============================================================================
// CATALOG LOOKUP TRAIT
// ============================================================================

/// Catalog read access. `Ok(None)` means the car id does not exist - the
/// one hard failure mode of the pricing engine. `Err` is reserved for
/// storage faults.
pub trait CarCatalog {
    fn get_car(&self, car_id: i64) -> Result<Option<Car>>;
}

// ============================================================================
// IN-MEMORY CATALOG
// ============================================================================

/// HashMap-backed catalog for tests and DB-less embedding.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    cars: HashMap<i64, Car>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        MemoryCatalog {
            cars: HashMap::new(),
        }
    }

    /// Insert or replace a car record.
    pub fn insert(&mut self, car: Car) {
        self.cars.insert(car.id, car);
    }

    pub fn len(&self) -> usize {
        self.cars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cars.is_empty()
    }
}

impl CarCatalog for MemoryCatalog {
    fn get_car(&self, car_id: i64) -> Result<Option<Car>> {
        Ok(self.cars.get(&car_id).cloned())
    }
}

// ============================================================================
// TESTS
// ============================================================================
