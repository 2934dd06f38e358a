// Car Valuator - Core Library
// Exposes all modules for use in the CLI, API server, and tests

pub mod auth;
pub mod catalog;
pub mod db;
pub mod engine;     // Pricing chain + breakdown
pub mod export;     // Admin CSV dumps
pub mod invoice;
pub mod tables;     // Multiplier tables with fallbacks

// Re-export commonly used types
pub use catalog::{Car, CarCatalog, MemoryCatalog};
pub use db::{
    all_cars, car_count, cars_by_brand, ensure_admin_user, get_car, get_prediction,
    insert_car, insert_prediction, mark_invoice_generated, predictions_for_user,
    seed_catalog, setup_database, NewCar, PredictionRecord, SqliteCatalog, DEFAULT_DB_PATH,
};
pub use engine::{
    depreciated_price, market_percentage, mileage_multiplier, CarDetails, DepreciationStage,
    FixedNoise, MarketNoise, PredictionRequest, PriceBreakdown, PricingEngine, Stage,
    UniformNoise, EXPECTED_KM_PER_YEAR, PRICE_FLOOR,
};
pub use export::{export_csv, ExportKind};
pub use invoice::{
    format_indian_currency, generate_invoice, get_invoice, invoice_details,
    invoice_for_prediction, render_invoice, Invoice, InvoiceDetails, SERVICE_CHARGE,
};
pub use tables::{AdjustmentTables, MultiplierTable};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
