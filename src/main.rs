use chairside::config::get_configuration;
use chairside::scheduler::run_reset_worker;
use chairside::startup::Application;
use chairside::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise logger
    let subscriber = get_subscriber("chairside".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    // Read configuration
    let config = get_configuration().expect("Failed to read configuration.");
    let reset_hour = config.reset.hour;

    // Run the app alongside the daily availability reset worker
    let application = Application::build(config).await?;
    let reconciler = application.reconciler();

    let application_task = tokio::spawn(application.run_until_stopped());
    let worker_task = tokio::spawn(run_reset_worker(reconciler, reset_hour));

    tokio::select! {
        o = application_task => {
            tracing::info!("API task exited: {o:?}");
        }
        o = worker_task => {
            tracing::info!("Reset worker exited: {o:?}");
        }
    };

    Ok(())
}
