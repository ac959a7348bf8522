use axum::Router;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use dotenvy::dotenv;
use tower_http::cors::CorsLayer;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use foodcourt_api::handlers::{
    customer_router, order_router, report_router, restaurant_router, ApiDoc, AppState,
};
use foodcourt_api::store::Store;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
    let store = Store::connect(&database_url)?;

    let mut conn = store.conn()?;
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run migrations");
    drop(conn);

    let state = AppState { store };

    let app = Router::new()
        .merge(customer_router())
        .merge(restaurant_router())
        .merge(order_router())
        .merge(report_router())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(CorsLayer::permissive());

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    info!("Foodcourt API listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
