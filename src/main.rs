use anyhow::{anyhow, Context, Result};
use rusqlite::Connection;
use std::env;
use std::fs::File;
use std::path::Path;

use car_valuator::{
    db, export::ExportKind, format_indian_currency, generate_invoice, invoice_details,
    render_invoice, PredictionRequest, PricingEngine, SqliteCatalog,
};

// CLI predictions are recorded under the built-in admin account.
const CLI_USER_ID: i64 = 1;

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("init") => run_init(),
        Some("predict") => run_predict(&args[2..], false),
        Some("breakdown") => run_predict(&args[2..], true),
        Some("invoice") => run_invoice(&args[2..]),
        Some("export") => run_export(&args[2..]),
        _ => {
            print_usage();
            Ok(())
        }
    }
}

fn print_usage() {
    println!("🚗 Car Valuator {}", car_valuator::VERSION);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Usage:");
    println!("  car-valuator init");
    println!("  car-valuator predict   <car_id> <age> <condition> <km> <state> <city>");
    println!("  car-valuator breakdown <car_id> <age> <condition> <km> <state> <city>");
    println!("  car-valuator invoice   <prediction_id>");
    println!("  car-valuator export    <users|cars|predictions|invoices> <path>");
}

fn open_db() -> Result<Connection> {
    let db_path = Path::new(db::DEFAULT_DB_PATH);

    if !db_path.exists() {
        return Err(anyhow!(
            "Database not found at {:?}. Run: car-valuator init",
            db_path
        ));
    }

    Connection::open(db_path).context("Failed to open database")
}

fn run_init() -> Result<()> {
    println!("🔧 Initializing database...");

    let conn = Connection::open(db::DEFAULT_DB_PATH).context("Failed to open database")?;
    db::setup_database(&conn)?;
    println!("✓ Schema created (WAL mode)");

    db::ensure_admin_user(&conn)?;
    println!("✓ Default admin account ready");

    let added = db::seed_catalog(&conn)?;
    let total = db::car_count(&conn)?;
    println!("✓ Catalog seeded: {} new cars ({} total)", added, total);

    println!("\n✅ Ready. Try: car-valuator predict 1 1 excellent 15000 maharashtra mumbai");
    Ok(())
}

fn parse_request(args: &[String]) -> Result<PredictionRequest> {
    if args.len() != 6 {
        return Err(anyhow!(
            "expected: <car_id> <age> <condition> <km> <state> <city>"
        ));
    }

    Ok(PredictionRequest {
        car_id: args[0].parse().context("car_id must be an integer")?,
        car_age: args[1].parse().context("age must be a non-negative integer")?,
        condition: args[2].clone(),
        kilometers_driven: args[3].parse().context("km must be a non-negative integer")?,
        state: args[4].clone(),
        city: args[5].clone(),
    })
}

fn run_predict(args: &[String], show_breakdown: bool) -> Result<()> {
    let request = parse_request(args)?;
    let conn = open_db()?;
    let catalog = SqliteCatalog::new(&conn);
    let engine = PricingEngine::new();

    if show_breakdown {
        let Some(breakdown) = engine.price_breakdown(&catalog, &request)? else {
            return Err(anyhow!("Car {} not found in catalog", request.car_id));
        };

        println!(
            "🚗 {} {} ({})",
            breakdown.car_details.brand, breakdown.car_details.model, breakdown.car_details.year
        );
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        println!(
            "  Base price              Rs. {:>14}",
            format_indian_currency(breakdown.base_price)
        );

        if let Some(dep) = &breakdown.depreciation {
            println!(
                "  Depreciation            Rs. {:>14}   (-{:.0})",
                format_indian_currency(dep.price_after.round() as i64),
                dep.amount
            );
        }

        for (name, stage) in [
            ("Condition", &breakdown.condition),
            ("Mileage", &breakdown.mileage),
            ("State", &breakdown.state),
            ("City", &breakdown.city),
        ] {
            println!(
                "  {:<22}  Rs. {:>14}   (x{:.3})",
                name,
                format_indian_currency(stage.price_after.round() as i64),
                stage.multiplier
            );
        }

        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        println!(
            "  Estimated price         Rs. {:>14}",
            format_indian_currency(breakdown.final_price)
        );
        return Ok(());
    }

    let Some(price) = engine.predict_price(&catalog, &request)? else {
        return Err(anyhow!("Car {} not found in catalog", request.car_id));
    };

    let prediction_id = db::insert_prediction(&conn, CLI_USER_ID, &request, price)?;

    println!("💰 Estimated price: Rs. {}", format_indian_currency(price));
    println!("   Saved as prediction #{}", prediction_id);
    Ok(())
}

fn run_invoice(args: &[String]) -> Result<()> {
    let prediction_id: i64 = args
        .first()
        .ok_or_else(|| anyhow!("expected: <prediction_id>"))?
        .parse()
        .context("prediction_id must be an integer")?;

    let conn = open_db()?;

    let Some(invoice) = generate_invoice(&conn, prediction_id, CLI_USER_ID)? else {
        return Err(anyhow!("Prediction {} not found", prediction_id));
    };

    let details = invoice_details(&conn, invoice.id)?
        .ok_or_else(|| anyhow!("Invoice {} has no joined details", invoice.id))?;

    println!("{}", render_invoice(&details));
    Ok(())
}

fn run_export(args: &[String]) -> Result<()> {
    let (kind_name, path) = match args {
        [kind, path] => (kind, path),
        _ => return Err(anyhow!("expected: <users|cars|predictions|invoices> <path>")),
    };

    let kind = ExportKind::parse(kind_name)
        .ok_or_else(|| anyhow!("Unknown export type: {}", kind_name))?;

    let conn = open_db()?;
    let file = File::create(path).with_context(|| format!("Failed to create {}", path))?;
    let rows = car_valuator::export_csv(&conn, kind, file)?;

    println!("📤 Exported {} rows to {}", rows, path);
    Ok(())
}
