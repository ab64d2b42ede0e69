use std::path::Path;
use std::sync::Arc;

use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

use crate::config::{DatabaseSettings, Settings};
use crate::geo::{Geocoder, ZipTable};
use crate::notifier::Notifier;
use crate::query::QueryService;
use crate::reconciler::Reconciler;
use crate::routes::{
    book_slot, create_office, get_office, health_check, list_offices, office_bookings,
    search_offices, set_availability, toggle_slot, update_office, ws_subscribe,
};
use crate::store::{PgStore, Store};

pub struct Application {
    port: u16,
    server: Server,
    reconciler: Arc<Reconciler>,
}

impl Application {
    pub async fn build(config: Settings) -> Result<Self, anyhow::Error> {
        let pool = get_connection_pool(&config.database);
        let store: Arc<dyn Store> = Arc::new(PgStore::new(pool));
        let geocoder: Arc<dyn Geocoder> =
            Arc::new(ZipTable::from_path(Path::new(&config.geo.zip_table_path))?);
        Self::build_with_store(config, store, geocoder).await
    }

    /// Wires the server around an injected store and geocoder. The test suite
    /// uses this with the in-memory backend.
    pub async fn build_with_store(
        config: Settings,
        store: Arc<dyn Store>,
        geocoder: Arc<dyn Geocoder>,
    ) -> Result<Self, anyhow::Error> {
        let address = format!("{}:{}", config.application.host, config.application.port);
        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr()?.port();
        let (server, reconciler) = run(listener, store, geocoder)?;

        Ok(Self {
            port,
            server,
            reconciler,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Handle for the reset worker.
    pub fn reconciler(&self) -> Arc<Reconciler> {
        self.reconciler.clone()
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn get_connection_pool(config: &DatabaseSettings) -> PgPool {
    PgPoolOptions::new()
        .acquire_timeout(std::time::Duration::from_secs(2))
        .connect_lazy_with(config.with_db())
}

pub fn run(
    listener: TcpListener,
    store: Arc<dyn Store>,
    geocoder: Arc<dyn Geocoder>,
) -> Result<(Server, Arc<Reconciler>), anyhow::Error> {
    let notifier = Notifier::default();
    let reconciler = Arc::new(Reconciler::new(store.clone(), notifier.clone()));
    let query_service = web::Data::new(QueryService::new(store.clone(), geocoder));
    let store_data: web::Data<dyn Store> = web::Data::from(store);
    let notifier_data = web::Data::new(notifier);
    let reconciler_data: web::Data<Reconciler> = web::Data::from(reconciler.clone());

    let server: Server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .route("/offices", web::post().to(create_office))
            .route("/offices", web::get().to(list_offices))
            // Registered before /offices/{id} so "search" is not read as an id.
            .route("/offices/search", web::get().to(search_offices))
            .route("/offices/{id}", web::get().to(get_office))
            .route("/offices/{id}", web::put().to(update_office))
            .route("/offices/{id}/availability", web::post().to(set_availability))
            .route(
                "/offices/{id}/availability/toggle",
                web::post().to(toggle_slot),
            )
            .route("/offices/{id}/bookings", web::get().to(office_bookings))
            .route("/bookings", web::post().to(book_slot))
            .route("/ws", web::get().to(ws_subscribe))
            .app_data(query_service.clone())
            .app_data(store_data.clone())
            .app_data(notifier_data.clone())
            .app_data(reconciler_data.clone())
    })
    .listen(listener)?
    .run();
    Ok((server, reconciler))
}
