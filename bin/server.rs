// Car Valuator - Web Server
// JSON API over the pricing engine and catalog

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use rusqlite::Connection;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;

use car_valuator::{
    all_cars, cars_by_brand, db, insert_prediction, PredictionRequest, PriceBreakdown,
    PricingEngine, SqliteCatalog,
};

// API predictions are recorded under the built-in admin account.
const API_USER_ID: i64 = 1;

/// Shared application state
#[derive(Clone)]
struct AppState {
    db: Arc<Mutex<Connection>>,
    engine: Arc<PricingEngine>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

impl ApiResponse<()> {
    fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: (),
            error: Some(message.into()),
        }
    }
}

#[derive(Serialize)]
struct PredictResponse {
    prediction_id: i64,
    predicted_price: i64,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/cars - Full catalog, ordered brand/model
async fn get_cars(State(state): State<AppState>) -> impl IntoResponse {
    let conn = state.db.lock().unwrap();

    match all_cars(&conn) {
        Ok(cars) => (StatusCode::OK, Json(ApiResponse::ok(cars))).into_response(),
        Err(e) => {
            eprintln!("Error listing cars: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::err("Failed to list cars")),
            )
                .into_response()
        }
    }
}

/// GET /api/cars/:brand - Catalog filtered by brand (case-insensitive)
async fn get_cars_by_brand(
    State(state): State<AppState>,
    Path(brand): Path<String>,
) -> impl IntoResponse {
    let conn = state.db.lock().unwrap();

    match cars_by_brand(&conn, &brand) {
        Ok(cars) => (StatusCode::OK, Json(ApiResponse::ok(cars))).into_response(),
        Err(e) => {
            eprintln!("Error listing cars for brand {}: {}", brand, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::err("Failed to list cars")),
            )
                .into_response()
        }
    }
}

/// POST /api/predict - Run a prediction and record it in the history
async fn predict(
    State(state): State<AppState>,
    Json(request): Json<PredictionRequest>,
) -> impl IntoResponse {
    let conn = state.db.lock().unwrap();
    let catalog = SqliteCatalog::new(&conn);

    match state.engine.predict_price(&catalog, &request) {
        Ok(Some(price)) => match insert_prediction(&conn, API_USER_ID, &request, price) {
            Ok(prediction_id) => (
                StatusCode::OK,
                Json(ApiResponse::ok(PredictResponse {
                    prediction_id,
                    predicted_price: price,
                })),
            )
                .into_response(),
            Err(e) => {
                eprintln!("Error storing prediction: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiResponse::err("Failed to store prediction")),
                )
                    .into_response()
            }
        },
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::err(format!("Car {} not found", request.car_id))),
        )
            .into_response(),
        Err(e) => {
            eprintln!("Error predicting price: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::err("Prediction failed")),
            )
                .into_response()
        }
    }
}

/// POST /api/breakdown - Stage-by-stage price breakdown
async fn breakdown(
    State(state): State<AppState>,
    Json(request): Json<PredictionRequest>,
) -> impl IntoResponse {
    let conn = state.db.lock().unwrap();
    let catalog = SqliteCatalog::new(&conn);

    match state.engine.price_breakdown(&catalog, &request) {
        Ok(Some(breakdown)) => {
            (StatusCode::OK, Json(ApiResponse::<PriceBreakdown>::ok(breakdown))).into_response()
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::err(format!("Car {} not found", request.car_id))),
        )
            .into_response(),
        Err(e) => {
            eprintln!("Error building breakdown: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::err("Breakdown failed")),
            )
                .into_response()
        }
    }
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() {
    println!("🌐 Car Valuator - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // Open database
    let db_path = std::path::Path::new(db::DEFAULT_DB_PATH);

    if !db_path.exists() {
        eprintln!("❌ Database not found at {:?}", db_path);
        eprintln!("   Run: cargo run init");
        eprintln!("   to create and seed the catalog first.");
        std::process::exit(1);
    }

    let conn = Connection::open(db_path).expect("Failed to open database");
    println!("✓ Database opened: {:?}", db_path);

    // Create shared state
    let state = AppState {
        db: Arc::new(Mutex::new(conn)),
        engine: Arc::new(PricingEngine::new()),
    };

    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/cars", get(get_cars))
        .route("/cars/:brand", get(get_cars_by_brand))
        .route("/predict", post(predict))
        .route("/breakdown", post(breakdown))
        .with_state(state);

    let app = Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive());

    // Start server
    let addr = "0.0.0.0:3000";
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    println!("\n🚀 Server running on http://localhost:3000");
    println!("   Catalog:  GET  http://localhost:3000/api/cars");
    println!("   Predict:  POST http://localhost:3000/api/predict");
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
