use chrono::Utc;
use devmeet_api::{build_router, state::AppState};
use devmeet_config::Settings;
use devmeet_db::{connect, indexes::ensure_indexes};
use devmeet_services::seed::seed_sample_data;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file (silently ignore if missing)
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "devmeet_api=debug,devmeet_services=debug,devmeet_db=debug,tower_http=debug".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load config
    let settings = Settings::load()?;
    info!("Starting DevMeet API on {}:{}", settings.app.host, settings.app.port);

    // Connect to MongoDB
    let db = connect(&settings).await?;

    // Ensure indexes
    ensure_indexes(&db).await?;

    let app_state = AppState::new(db, settings.clone());

    if settings.app.seed_sample_data {
        match seed_sample_data(
            &app_state.events,
            &app_state.sessions,
            &app_state.questions,
            &app_state.feedback,
            Utc::now().date_naive(),
        )
        .await?
        {
            Some(report) => info!(
                events = report.events,
                sessions = report.sessions,
                questions = report.questions,
                "Sample data seeded"
            ),
            None => info!("Events already present, sample data skipped"),
        }
    }

    // Build router
    let app = build_router(app_state);

    // Start server
    let addr = format!("{}:{}", settings.app.host, settings.app.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
