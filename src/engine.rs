// 💰 Pricing Engine - multiplicative resale valuation
//
// Deterministic multi-factor chain over a catalog base price, plus the
// stage-by-stage breakdown used for display. The one nondeterministic
// input (market noise) sits behind the MarketNoise trait so tests can pin
// it to a fixed factor.
//
// Stage order is part of the model: depreciation, condition, mileage,
// state, city, fuel, transmission, market noise, age factor, then round
// to the nearest thousand and clamp to the 50,000 floor.

use crate::catalog::{Car, CarCatalog};
use crate::tables::AdjustmentTables;
use anyhow::Result;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// No prediction goes below this, whatever the inputs.
pub const PRICE_FLOOR: i64 = 50_000;

/// Assumed average yearly usage, km.
pub const EXPECTED_KM_PER_YEAR: u64 = 15_000;

// ============================================================================
// MARKET NOISE
// ============================================================================

/// Source of the market-noise multiplier. Every prediction draws one fresh
/// factor; the production source samples uniformly from [0.90, 1.10].
pub trait MarketNoise: Send + Sync {
    fn factor(&self) -> f64;
}

/// Production noise: uniform ±10% demand fluctuation.
#[derive(Debug, Default)]
pub struct UniformNoise;

impl MarketNoise for UniformNoise {
    fn factor(&self) -> f64 {
        rand::thread_rng().gen_range(0.90..=1.10)
    }
}

/// Fixed noise for tests and reproducible runs.
#[derive(Debug, Clone, Copy)]
pub struct FixedNoise(pub f64);

impl MarketNoise for FixedNoise {
    fn factor(&self) -> f64 {
        self.0
    }
}

// ============================================================================
// REQUEST & BREAKDOWN TYPES
// ============================================================================

/// Transient prediction input. Age and kilometers are unsigned, so the
/// "age >= 0" boundary rule holds by construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub car_id: i64,
    pub car_age: u32,
    pub condition: String,
    pub kilometers_driven: u64,
    pub state: String,
    pub city: String,
}

/// One multiplicative stage of the breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stage {
    pub multiplier: f64,
    /// Signed delta this stage applied (price_after - price_before).
    pub adjustment: f64,
    /// Running price after this stage.
    pub price_after: f64,
}

/// Depreciation reported as an absolute loss. The displayed percentage is
/// the car's own depreciation_rate; the amount comes from the bracketed
/// constants the chain actually uses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepreciationStage {
    pub amount: f64,
    pub percentage: f64,
    pub price_after: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarDetails {
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub fuel_type: String,
    pub transmission: String,
}

/// Stage-by-stage trace of the pricing chain, for UI transparency.
///
/// Records depreciation through city only. `final_price` comes from a
/// second, independent `predict_price` run - its noise draw is resampled,
/// so it is not reconstructable from the five displayed stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub base_price: i64,
    pub car_details: CarDetails,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depreciation: Option<DepreciationStage>,
    pub condition: Stage,
    pub mileage: Stage,
    pub state: Stage,
    pub city: Stage,
    pub final_price: i64,
}

// ============================================================================
// STAGE FUNCTIONS
// ============================================================================

/// Age-bracketed depreciation. First year loses a flat 15%, years 2-3 lose
/// 8% each, years 4-5 lose 6% each, everything after loses 4% per year.
/// The per-car depreciation_rate is deliberately not consulted here.
pub fn depreciated_price(base_price: f64, car_age: u32) -> f64 {
    match car_age {
        0 => base_price,
        1 => base_price * 0.85,
        2..=3 => base_price * 0.85 * 0.92_f64.powi(car_age as i32 - 1),
        4..=5 => base_price * 0.85 * 0.92_f64.powi(2) * 0.94_f64.powi(car_age as i32 - 3),
        _ => {
            base_price
                * 0.85
                * 0.92_f64.powi(2)
                * 0.94_f64.powi(2)
                * 0.96_f64.powi(car_age as i32 - 5)
        }
    }
}

/// Odometer correction against the expected 15,000 km/year. Under-driving
/// earns an unbounded bonus (5% per 100,000 km saved); over-driving is
/// penalized 10% per 50,000 excess km, capped at 30%.
pub fn mileage_multiplier(kilometers_driven: u64, car_age: u32) -> f64 {
    let expected_km = (car_age as u64 * EXPECTED_KM_PER_YEAR) as f64;
    let actual_km = kilometers_driven as f64;

    if actual_km <= expected_km {
        1.0 + (expected_km - actual_km) / 100_000.0 * 0.05
    } else {
        let excess_km = actual_km - expected_km;
        let penalty = (excess_km / 50_000.0 * 0.10).min(0.30);
        1.0 - penalty
    }
}

/// Age-based market percentage: 1.15 for a new car, sliding toward 0.85 at
/// age 25. Not clamped - ages beyond 25 keep sliding below 0.85.
pub fn market_percentage(car_age: u32) -> f64 {
    0.85 + 0.30 * (1.0 - car_age as f64 / 25.0)
}

// ============================================================================
// PRICING ENGINE
// ============================================================================

/// Stateless-per-call valuation over immutable tables. Safe to share
/// across threads; each call reads one car record and draws one noise
/// sample.
pub struct PricingEngine {
    tables: AdjustmentTables,
    noise: Box<dyn MarketNoise>,
}

impl PricingEngine {
    /// Engine with the standard tables and production noise.
    pub fn new() -> Self {
        PricingEngine {
            tables: AdjustmentTables::standard(),
            noise: Box::new(UniformNoise),
        }
    }

    /// Engine with an injected noise source (tests, reproducible runs).
    pub fn with_noise(noise: Box<dyn MarketNoise>) -> Self {
        PricingEngine {
            tables: AdjustmentTables::standard(),
            noise,
        }
    }

    pub fn tables(&self) -> &AdjustmentTables {
        &self.tables
    }

    /// Estimate the resale price. `Ok(None)` means the car id is unknown;
    /// every other lookup degrades to its table default instead of failing.
    pub fn predict_price(
        &self,
        catalog: &dyn CarCatalog,
        request: &PredictionRequest,
    ) -> Result<Option<i64>> {
        let car = match catalog.get_car(request.car_id)? {
            Some(car) => car,
            None => return Ok(None),
        };

        Ok(Some(self.run_chain(&car, request)))
    }

    /// Full chain for a resolved car record. Separated out so the
    /// breakdown shares the exact arithmetic.
    fn run_chain(&self, car: &Car, request: &PredictionRequest) -> i64 {
        let base_price = car.base_price as f64;

        let depreciated = depreciated_price(base_price, request.car_age);
        let condition_adjusted = depreciated * self.tables.condition.get(&request.condition);
        let mileage_adjusted = condition_adjusted
            * mileage_multiplier(request.kilometers_driven, request.car_age);
        let state_adjusted = mileage_adjusted * self.tables.state.get(&request.state);
        let city_adjusted = state_adjusted * self.tables.city.get(&request.city);
        let fuel_adjusted = city_adjusted * self.tables.fuel_type.get(&car.fuel_type);
        let transmission_adjusted = fuel_adjusted * self.tables.transmission.get(&car.transmission);

        let final_price = transmission_adjusted
            * self.noise.factor()
            * market_percentage(request.car_age);

        let rounded = (final_price / 1000.0).round() * 1000.0;
        (rounded as i64).max(PRICE_FLOOR)
    }

    /// Stage-by-stage trace for display. Replays depreciation through the
    /// city adjustment, then calls `predict_price` again for the headline
    /// number (independent noise draw, by design).
    pub fn price_breakdown(
        &self,
        catalog: &dyn CarCatalog,
        request: &PredictionRequest,
    ) -> Result<Option<PriceBreakdown>> {
        let car = match catalog.get_car(request.car_id)? {
            Some(car) => car,
            None => return Ok(None),
        };

        let base_price = car.base_price as f64;
        let mut current_price = base_price;

        let depreciation = if request.car_age > 0 {
            let after = depreciated_price(current_price, request.car_age);
            let stage = DepreciationStage {
                amount: current_price - after,
                percentage: car.depreciation_rate * 100.0,
                price_after: after,
            };
            current_price = after;
            Some(stage)
        } else {
            None
        };

        let condition_multiplier = self.tables.condition.get(&request.condition);
        let condition = apply_stage(&mut current_price, condition_multiplier);

        let mileage = apply_stage(
            &mut current_price,
            mileage_multiplier(request.kilometers_driven, request.car_age),
        );

        let state = apply_stage(&mut current_price, self.tables.state.get(&request.state));
        let city = apply_stage(&mut current_price, self.tables.city.get(&request.city));

        let final_price = match self.predict_price(catalog, request)? {
            Some(price) => price,
            None => return Ok(None),
        };

        Ok(Some(PriceBreakdown {
            base_price: car.base_price,
            car_details: CarDetails {
                brand: car.brand,
                model: car.model,
                year: car.year,
                fuel_type: car.fuel_type,
                transmission: car.transmission,
            },
            depreciation,
            condition,
            mileage,
            state,
            city,
            final_price,
        }))
    }
}

impl Default for PricingEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Advance the running price by one multiplier, recording the stage.
fn apply_stage(current_price: &mut f64, multiplier: f64) -> Stage {
    let after = *current_price * multiplier;
    let stage = Stage {
        multiplier,
        adjustment: after - *current_price,
        price_after: after,
    };
    *current_price = after;
    stage
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MemoryCatalog;

    const EPS: f64 = 1e-6;

    fn swift() -> Car {
        Car {
            id: 1,
            brand: "Maruti Suzuki".to_string(),
            model: "Swift".to_string(),
            year: 2023,
            fuel_type: "Petrol".to_string(),
            transmission: "Manual".to_string(),
            engine_capacity: 1.2,
            mileage_rating: 23.2,
            base_price: 650_000,
            depreciation_rate: 0.12,
        }
    }

    fn creta_diesel() -> Car {
        Car {
            id: 2,
            brand: "Hyundai".to_string(),
            model: "Creta".to_string(),
            year: 2023,
            fuel_type: "Diesel".to_string(),
            transmission: "Automatic".to_string(),
            engine_capacity: 1.5,
            mileage_rating: 21.4,
            base_price: 1_250_000,
            depreciation_rate: 0.14,
        }
    }

    fn catalog() -> MemoryCatalog {
        let mut catalog = MemoryCatalog::new();
        catalog.insert(swift());
        catalog.insert(creta_diesel());
        catalog
    }

    fn fixed_engine() -> PricingEngine {
        PricingEngine::with_noise(Box::new(FixedNoise(1.0)))
    }

    fn request(car_id: i64, car_age: u32, condition: &str, km: u64, state: &str, city: &str) -> PredictionRequest {
        PredictionRequest {
            car_id,
            car_age,
            condition: condition.to_string(),
            kilometers_driven: km,
            state: state.to_string(),
            city: city.to_string(),
        }
    }

    // ------------------------------------------------------------------
    // Stage functions
    // ------------------------------------------------------------------

    #[test]
    fn test_depreciation_brackets() {
        let base = 1_000_000.0;

        assert!((depreciated_price(base, 0) - base).abs() < EPS);
        assert!((depreciated_price(base, 1) - base * 0.85).abs() < EPS);
        assert!((depreciated_price(base, 2) - base * 0.85 * 0.92).abs() < EPS);
        assert!((depreciated_price(base, 3) - base * 0.85 * 0.92 * 0.92).abs() < EPS);
        assert!((depreciated_price(base, 4) - base * 0.85 * 0.92 * 0.92 * 0.94).abs() < EPS);
        assert!(
            (depreciated_price(base, 5) - base * 0.85 * 0.92 * 0.92 * 0.94 * 0.94).abs() < EPS
        );
        assert!(
            (depreciated_price(base, 7)
                - base * 0.85 * 0.92 * 0.92 * 0.94 * 0.94 * 0.96 * 0.96)
                .abs()
                < EPS
        );
    }

    #[test]
    fn test_depreciation_monotonically_non_increasing() {
        let base = 2_000_000.0;
        for age in 0..30 {
            assert!(
                depreciated_price(base, age + 1) <= depreciated_price(base, age) + EPS,
                "price rose between age {} and {}",
                age,
                age + 1
            );
        }
    }

    #[test]
    fn test_mileage_exactly_expected_is_neutral() {
        // Driving exactly age x 15,000 km earns neither bonus nor penalty
        assert!((mileage_multiplier(15_000, 1) - 1.0).abs() < EPS);
        assert!((mileage_multiplier(75_000, 5) - 1.0).abs() < EPS);
        assert!((mileage_multiplier(0, 0) - 1.0).abs() < EPS);
    }

    #[test]
    fn test_mileage_under_driving_bonus() {
        // 3-year-old car, 15,000 actual vs 45,000 expected: 30,000 km saved
        let m = mileage_multiplier(15_000, 3);
        assert!((m - (1.0 + 30_000.0 / 100_000.0 * 0.05)).abs() < EPS);
        assert!(m > 1.0);
    }

    #[test]
    fn test_mileage_penalty_capped_at_30_percent() {
        // 1-year-old car with a million km: raw penalty far exceeds the cap
        let m = mileage_multiplier(1_000_000, 1);
        assert!((m - 0.70).abs() < EPS);
    }

    #[test]
    fn test_market_percentage_range() {
        assert!((market_percentage(0) - 1.15).abs() < EPS);
        assert!((market_percentage(25) - 0.85).abs() < EPS);
        // Not clamped: a 30-year-old car goes below 0.85
        assert!(market_percentage(30) < 0.85);
    }

    // ------------------------------------------------------------------
    // predict_price
    // ------------------------------------------------------------------

    #[test]
    fn test_reference_scenario_exact_price() {
        // Swift, 1 year old, excellent, exactly expected km, Maharashtra /
        // Mumbai, noise pinned to 1.0:
        //   650,000 x 0.85 = 552,500        (depreciation)
        //   x 1.00         = 552,500        (condition excellent)
        //   x 1.00         = 552,500        (mileage neutral)
        //   x 1.15         = 635,375        (state)
        //   x 1.05         = 667,143.75     (city)
        //   x 1.00 x 1.00                   (fuel petrol, manual)
        //   x 1.00                          (noise, pinned)
        //   x 1.138        = 759,209.59     (age factor)
        //   -> 759,000 after rounding
        let engine = fixed_engine();
        let catalog = catalog();
        let req = request(1, 1, "excellent", 15_000, "maharashtra", "mumbai");

        let price = engine.predict_price(&catalog, &req).unwrap().unwrap();
        assert_eq!(price, 759_000);
    }

    #[test]
    fn test_unknown_car_returns_none() {
        let engine = fixed_engine();
        let catalog = catalog();
        let req = request(999, 1, "good", 10_000, "delhi", "new-delhi");

        assert!(engine.predict_price(&catalog, &req).unwrap().is_none());
        assert!(engine.price_breakdown(&catalog, &req).unwrap().is_none());
    }

    #[test]
    fn test_price_always_rounded_and_floored() {
        let engine = PricingEngine::new(); // real noise on purpose
        let catalog = catalog();

        for age in [0u32, 1, 3, 6, 12, 27] {
            for km in [0u64, 15_000, 90_000, 400_000] {
                for condition in ["excellent", "good", "fair", "poor", "unknown"] {
                    let req = request(1, age, condition, km, "bihar", "patna");
                    let price = engine.predict_price(&catalog, &req).unwrap().unwrap();

                    assert_eq!(price % 1000, 0, "not a multiple of 1000: {}", price);
                    assert!(price >= PRICE_FLOOR, "below floor: {}", price);
                }
            }
        }
    }

    #[test]
    fn test_floor_kicks_in_for_worthless_inputs() {
        let engine = fixed_engine();
        let mut catalog = MemoryCatalog::new();
        let mut cheap = swift();
        cheap.id = 3;
        cheap.base_price = 60_000;
        catalog.insert(cheap);

        // Ancient, thrashed, poor condition in a weak market
        let req = request(3, 28, "poor", 900_000, "ladakh", "leh");
        let price = engine.predict_price(&catalog, &req).unwrap().unwrap();
        assert_eq!(price, PRICE_FLOOR);
    }

    #[test]
    fn test_condition_ordering_holds() {
        let engine = fixed_engine();
        let catalog = catalog();

        let price_for = |condition: &str| {
            let req = request(1, 3, condition, 40_000, "karnataka", "bangalore");
            engine.predict_price(&catalog, &req).unwrap().unwrap()
        };

        let excellent = price_for("excellent");
        let good = price_for("good");
        let fair = price_for("fair");
        let poor = price_for("poor");

        assert!(excellent >= good);
        assert!(good >= fair);
        assert!(fair >= poor);
        assert!(excellent > poor);
    }

    #[test]
    fn test_unknown_state_equals_default_multiplier() {
        // "atlantis" is not in the table; "odisha" is, at exactly the
        // fallback value 0.92 - both must price identically
        let engine = fixed_engine();
        let catalog = catalog();

        let unknown = request(1, 2, "good", 25_000, "atlantis", "nowhere");
        let explicit = request(1, 2, "good", 25_000, "odisha", "nowhere");

        assert_eq!(
            engine.predict_price(&catalog, &unknown).unwrap(),
            engine.predict_price(&catalog, &explicit).unwrap()
        );
    }

    #[test]
    fn test_fuel_and_transmission_read_from_car_record() {
        // Same request against petrol/manual vs diesel/automatic cars with
        // equal base prices must differ by exactly 1.08 x 1.12 before
        // rounding
        let engine = fixed_engine();
        let mut catalog = MemoryCatalog::new();

        let mut petrol = swift();
        petrol.id = 10;
        petrol.base_price = 1_000_000;
        catalog.insert(petrol);

        let mut diesel = creta_diesel();
        diesel.id = 11;
        diesel.base_price = 1_000_000;
        catalog.insert(diesel);

        let req_petrol = request(10, 1, "excellent", 15_000, "goa", "panaji");
        let req_diesel = request(11, 1, "excellent", 15_000, "goa", "panaji");

        let p = engine.predict_price(&catalog, &req_petrol).unwrap().unwrap() as f64;
        let d = engine.predict_price(&catalog, &req_diesel).unwrap().unwrap() as f64;

        // Rounding to the nearest 1000 allows up to 500 slack on each side
        assert!((d - p * 1.08 * 1.12).abs() < 1500.0);
        assert!(d > p);
    }

    // ------------------------------------------------------------------
    // price_breakdown
    // ------------------------------------------------------------------

    #[test]
    fn test_breakdown_stage_chain_is_consistent() {
        let engine = fixed_engine();
        let catalog = catalog();
        let req = request(2, 4, "good", 90_000, "tamil-nadu", "chennai");

        let breakdown = engine.price_breakdown(&catalog, &req).unwrap().unwrap();

        // Depreciation present for age > 0, amounts add up
        let dep = breakdown.depreciation.as_ref().unwrap();
        let base = breakdown.base_price as f64;
        assert!((dep.amount - (base - dep.price_after)).abs() < EPS);
        assert!((dep.percentage - 14.0).abs() < EPS);

        // Each stage's price_after = previous price x its multiplier
        let mut running = dep.price_after;
        for stage in [
            &breakdown.condition,
            &breakdown.mileage,
            &breakdown.state,
            &breakdown.city,
        ] {
            assert!(
                (stage.price_after - running * stage.multiplier).abs() < EPS,
                "stage chain broke at multiplier {}",
                stage.multiplier
            );
            assert!((stage.adjustment - (stage.price_after - running)).abs() < EPS);
            running = stage.price_after;
        }
    }

    #[test]
    fn test_breakdown_matches_predict_chain_prefix() {
        // With noise pinned, composing base price with the five recorded
        // stages must reproduce the running prices predict_price uses
        // before its fuel/transmission/noise/age stages
        let engine = fixed_engine();
        let catalog = catalog();
        let req = request(1, 3, "fair", 60_000, "maharashtra", "pune");

        let breakdown = engine.price_breakdown(&catalog, &req).unwrap().unwrap();

        let expected_city_adjusted = depreciated_price(650_000.0, 3)
            * 0.70
            * mileage_multiplier(60_000, 3)
            * 1.15
            * 1.02;
        assert!((breakdown.city.price_after - expected_city_adjusted).abs() < EPS);
    }

    #[test]
    fn test_breakdown_final_price_equals_predict_with_pinned_noise() {
        // The headline number comes from an independent predict_price call;
        // with the noise pinned the two paths must agree exactly
        let engine = fixed_engine();
        let catalog = catalog();
        let req = request(1, 2, "good", 20_000, "kerala", "kochi");

        let breakdown = engine.price_breakdown(&catalog, &req).unwrap().unwrap();
        let direct = engine.predict_price(&catalog, &req).unwrap().unwrap();

        assert_eq!(breakdown.final_price, direct);
    }

    #[test]
    fn test_breakdown_new_car_has_no_depreciation_stage() {
        let engine = fixed_engine();
        let catalog = catalog();
        let req = request(1, 0, "excellent", 0, "delhi", "new-delhi");

        let breakdown = engine.price_breakdown(&catalog, &req).unwrap().unwrap();
        assert!(breakdown.depreciation.is_none());
        assert_eq!(breakdown.base_price, 650_000);
        assert_eq!(breakdown.car_details.brand, "Maruti Suzuki");
        assert_eq!(breakdown.car_details.fuel_type, "Petrol");
    }

    #[test]
    fn test_breakdown_serializes_without_null_depreciation() {
        let engine = fixed_engine();
        let catalog = catalog();
        let req = request(1, 0, "excellent", 0, "delhi", "new-delhi");

        let breakdown = engine.price_breakdown(&catalog, &req).unwrap().unwrap();
        let json = serde_json::to_value(&breakdown).unwrap();

        assert!(json.get("depreciation").is_none());
        assert!(json.get("final_price").is_some());
    }

    #[test]
    fn test_uniform_noise_stays_in_band() {
        let noise = UniformNoise;
        for _ in 0..200 {
            let f = noise.factor();
            assert!((0.90..=1.10).contains(&f), "noise out of band: {}", f);
        }
    }
}
