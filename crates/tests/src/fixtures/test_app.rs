use devmeet_api::{build_router, state::AppState};
use devmeet_config::Settings;
use devmeet_db::{connect, indexes::ensure_indexes};
use mongodb::Database;
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// A running test application with its own MongoDB database.
pub struct TestApp {
    pub addr: SocketAddr,
    pub base_url: String,
    pub db: Database,
    pub settings: Settings,
    pub client: reqwest::Client,
}

impl TestApp {
    /// Spawn a new test server connected to the test MongoDB.
    ///
    /// Expects MongoDB at localhost:27019; set DEVMEET__DATABASE__URL to
    /// point elsewhere. Each call gets a unique database name. Panics when
    /// no server answers.
    pub async fn spawn() -> Self {
        let db_name = format!("devmeet_test_{}", uuid::Uuid::new_v4().simple());

        let mut settings = Settings::load().unwrap_or_else(|_| test_settings());
        settings.database.name = db_name;
        settings.database.server_selection_timeout_ms = Some(2_000);
        settings.app.seed_sample_data = false;

        let db = connect(&settings)
            .await
            .expect("Failed to connect to test MongoDB");

        ensure_indexes(&db).await.expect("Failed to create indexes");

        let app_state = AppState::new(db.clone(), settings.clone());
        let app = build_router(app_state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let base_url = format!("http://{}", addr);
        let client = reqwest::Client::builder()
            .build()
            .expect("Failed to build HTTP client");

        Self {
            addr,
            base_url,
            db,
            settings,
            client,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn ws_url(&self, query: &str) -> String {
        format!("ws://{}/ws{}", self.addr, query)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let db = self.db.clone();
        // Best effort cleanup: drop the test database
        tokio::spawn(async move {
            let _ = db.drop().await;
        });
    }
}

fn test_settings() -> Settings {
    Settings {
        app: devmeet_config::AppSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec![],
            seed_sample_data: false,
        },
        database: devmeet_config::DatabaseSettings {
            url: std::env::var("DEVMEET__DATABASE__URL")
                .unwrap_or_else(|_| "mongodb://localhost:27019".to_string()),
            name: "devmeet_test".to_string(),
            max_pool_size: Some(10),
            min_pool_size: Some(1),
            server_selection_timeout_ms: Some(2_000),
        },
    }
}
