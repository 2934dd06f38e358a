// 📊 Adjustment Tables - Multipliers as Data
// Regional, condition and drivetrain multipliers for the pricing chain.
//
// Every table carries its own fallback value: an unrecognized key never
// errors, it degrades to the documented default. The defaults are part of
// the model's observable behavior and must not change casually.

use std::collections::HashMap;

// ============================================================================
// MULTIPLIER TABLE
// ============================================================================

/// Case-insensitive lookup table with a defined fallback multiplier.
///
/// Keys are stored lowercase; `get` lowercases the query, so "Maharashtra",
/// "MAHARASHTRA" and "maharashtra" all resolve to the same entry.
#[derive(Debug, Clone)]
pub struct MultiplierTable {
    entries: HashMap<String, f64>,
    fallback: f64,
}

impl MultiplierTable {
    /// Build a table from (key, multiplier) pairs plus the fallback used
    /// for any key not present.
    pub fn new(fallback: f64, entries: &[(&str, f64)]) -> Self {
        let entries = entries
            .iter()
            .map(|(key, value)| (key.to_lowercase(), *value))
            .collect();

        MultiplierTable { entries, fallback }
    }

    /// Look up a multiplier. Unknown keys resolve to the fallback.
    pub fn get(&self, key: &str) -> f64 {
        self.entries
            .get(&key.to_lowercase())
            .copied()
            .unwrap_or(self.fallback)
    }

    /// Whether the key has an explicit entry (fallback not counted).
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(&key.to_lowercase())
    }

    /// The fallback multiplier for unknown keys.
    pub fn fallback(&self) -> f64 {
        self.fallback
    }

    /// Number of explicit entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// STANDARD TABLE SET
// ============================================================================

/// The full set of adjustment tables used by the pricing chain.
#[derive(Debug, Clone)]
pub struct AdjustmentTables {
    /// State-level market demand multipliers. Fallback 0.92.
    pub state: MultiplierTable,

    /// City-level fine adjustments, layered on top of the state multiplier.
    /// Fallback 1.00.
    pub city: MultiplierTable,

    /// Area-type multipliers. Fully populated but consulted by no stage of
    /// the current chain - inert configuration carried for completeness.
    pub area_type: MultiplierTable,

    /// Vehicle condition multipliers. Fallback 0.70 (treat unknown as fair).
    pub condition: MultiplierTable,

    /// Fuel type adjustments. Fallback 1.00.
    pub fuel_type: MultiplierTable,

    /// Transmission adjustments. Fallback 1.00.
    pub transmission: MultiplierTable,
}

impl AdjustmentTables {
    /// The standard production table set.
    pub fn standard() -> Self {
        let state = MultiplierTable::new(
            0.92,
            &[
                ("maharashtra", 1.15),
                ("delhi", 1.12),
                ("karnataka", 1.10),
                ("tamil-nadu", 1.08),
                ("telangana", 1.06),
                ("gujarat", 1.05),
                ("west-bengal", 1.03),
                ("haryana", 1.08),
                ("uttar-pradesh", 0.96),
                ("rajasthan", 0.98),
                ("punjab", 1.02),
                ("madhya-pradesh", 0.97),
                ("bihar", 0.90),
                ("odisha", 0.92),
                ("kerala", 1.04),
                ("andhra-pradesh", 0.95),
                ("jharkhand", 0.91),
                ("assam", 0.88),
                ("chhattisgarh", 0.89),
                ("himachal-pradesh", 0.94),
                ("uttarakhand", 0.93),
                ("goa", 1.07),
                ("jammu-kashmir", 0.87),
                ("ladakh", 0.85),
                ("arunachal-pradesh", 0.86),
                ("manipur", 0.87),
                ("meghalaya", 0.86),
                ("mizoram", 0.85),
                ("nagaland", 0.86),
                ("sikkim", 0.88),
                ("tripura", 0.87),
            ],
        );

        let city = MultiplierTable::new(
            1.00,
            &[
                ("mumbai", 1.05),
                ("pune", 1.02),
                ("new-delhi", 1.03),
                ("bangalore", 1.04),
                ("chennai", 1.02),
                ("hyderabad", 1.01),
                ("kolkata", 1.01),
                ("ahmedabad", 1.02),
                ("surat", 1.01),
                ("jaipur", 1.01),
                ("lucknow", 1.00),
                ("kanpur", 0.98),
                ("nagpur", 0.99),
                ("indore", 1.00),
                ("bhopal", 0.99),
                ("visakhapatnam", 0.99),
                ("kochi", 1.02),
                ("thiruvananthapuram", 1.01),
                ("coimbatore", 1.01),
                ("gurgaon", 1.03),
                ("faridabad", 1.02),
            ],
        );

        let area_type = MultiplierTable::new(
            1.00,
            &[
                ("metro", 1.10),
                ("urban", 1.00),
                ("suburban", 0.95),
                ("rural", 0.85),
            ],
        );

        let condition = MultiplierTable::new(
            0.70,
            &[
                ("excellent", 1.00),
                ("good", 0.85),
                ("fair", 0.70),
                ("poor", 0.55),
            ],
        );

        let fuel_type = MultiplierTable::new(
            1.00,
            &[
                ("petrol", 1.00),
                ("diesel", 1.08),
                ("cng", 0.95),
                ("electric", 1.20),
                ("hybrid", 1.15),
            ],
        );

        let transmission = MultiplierTable::new(
            1.00,
            &[
                ("manual", 1.00),
                ("automatic", 1.12),
                ("cvt", 1.08),
                ("dsg", 1.15),
                ("amt", 1.05),
            ],
        );

        AdjustmentTables {
            state,
            city,
            area_type,
            condition,
            fuel_type,
            transmission,
        }
    }
}

impl Default for AdjustmentTables {
    fn default() -> Self {
        Self::standard()
    }
}

// ============================================================================
// TESTS
// ============================================================================
