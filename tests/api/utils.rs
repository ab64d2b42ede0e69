use std::collections::HashMap;
use std::sync::Arc;

use chairside::config::{
    ApplicationSettings, DatabaseSettings, GeoSettings, ResetSettings, Settings,
};
use chairside::geo::{GeoPoint, Geocoder};
use chairside::models::{Office, OfficeProfile, SlotTime};
use chairside::startup::Application;
use chairside::store::{MemoryStore, Store};
use chairside::telemetry::{get_subscriber, init_subscriber};
use once_cell::sync::Lazy;
use secrecy::Secret;

static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber);
    }
});

/// Fixed ZIP centroids so search tests do not depend on the bundled table.
struct TestGeocoder(HashMap<String, GeoPoint>);

impl Geocoder for TestGeocoder {
    fn locate(&self, zip: &str) -> Option<GeoPoint> {
        self.0.get(zip).copied()
    }
}

fn test_geocoder() -> TestGeocoder {
    let mut zips = HashMap::new();
    // Midtown Manhattan.
    zips.insert(
        "10001".to_string(),
        GeoPoint { latitude: 40.7506, longitude: -73.9972 },
    );
    // Philadelphia, ~80 miles from 10001.
    zips.insert(
        "19103".to_string(),
        GeoPoint { latitude: 39.9526, longitude: -75.1652 },
    );
    TestGeocoder(zips)
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    /// Seeds an office straight into the store, bypassing the HTTP surface.
    pub async fn seed_office(&self, name: &str, lat: f64, lon: f64, slots: &[i64]) -> Office {
        let mut office = Office::register(OfficeProfile {
            name: name.into(),
            address: "1 Main St".into(),
            phone: Some("555-0100".into()),
            email: None,
            website: None,
            zip_code: "10001".into(),
            state: Some("NY".into()),
            latitude: lat,
            longitude: lon,
        });
        office.available_slots = slots.iter().map(|&ms| SlotTime(ms)).collect();
        self.store.insert_office(&office).await.unwrap();
        office
    }
}

pub async fn spawn_app() -> TestApp {
    Lazy::force(&TRACING);

    let config = Settings {
        application: ApplicationSettings {
            host: "127.0.0.1".into(),
            port: 0,
        },
        // Unused: the app is wired with the in-memory store.
        database: DatabaseSettings {
            username: "postgres".into(),
            password: Secret::new("password".into()),
            port: 5432,
            host: "localhost".into(),
            database_name: "chairside_test".into(),
            require_ssl: false,
        },
        geo: GeoSettings {
            zip_table_path: "unused".into(),
        },
        reset: ResetSettings { hour: 0 },
    };

    let store = Arc::new(MemoryStore::new());
    let application =
        Application::build_with_store(config, store.clone(), Arc::new(test_geocoder()))
            .await
            .expect("Failed to build application.");
    let port = application.port();
    tokio::spawn(application.run_until_stopped());

    TestApp {
        address: format!("http://127.0.0.1:{port}"),
        port,
        store,
    }
}
