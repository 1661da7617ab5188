//! Servo Tracker
//!
//! Main entry point: waits for the actuator, connects to the detection
//! runner, then runs the control loop until either side goes away.

use servo_tracker::{
    actuator_link::TcpActuatorSink,
    config::AppConfig,
    control_loop::ControlLoop,
    detection_feed::WebSocketDetectionSource,
    servo_controller::ModeArbiter,
};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "servo_tracker=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting servo tracker v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = AppConfig::from_env()?;
    tracing::info!(
        detection_url = %config.detection_url,
        actuator_addr = %config.actuator_addr(),
        image_width = config.image.width,
        image_height = config.image.height,
        flip_vertical = config.flip_vertical,
        timeout_ms = config.detection_timeout.as_millis() as u64,
        "Configuration loaded"
    );

    // Actuator dials in first; the link is held for the whole run
    let addr = config.actuator_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Waiting for actuator on {}", addr);
    let sink = TcpActuatorSink::accept(&listener).await?;

    let source = WebSocketDetectionSource::connect(&config.detection_url).await?;

    let arbiter = ModeArbiter::new(&config);
    let stats = ControlLoop::new(arbiter, source, sink)
        .with_idle_tick(config.idle_tick)
        .run()
        .await?;

    tracing::info!(cycles = stats.cycles, "Servo tracker stopped");
    Ok(())
}
