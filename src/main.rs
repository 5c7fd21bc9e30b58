use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use timervisor::{
    Args, InputWatcher, LogWriter, ShutdownCoordinator, StdinButton, Subscribe, Supervisor,
};

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .with_target(false)
        .init();

    let (hardware, server, cfg) = args.into_configs().map_err(|e| {
        error!(error = %e, label = e.as_label(), "invalid configuration");
        e
    })?;
    info!(?hardware, ?server, "configuration loaded");

    let subscribers: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let (supervisor, handle) = Supervisor::builder(hardware.clone(), server)
        .with_config(cfg)
        .with_subscribers(subscribers)
        .build();

    ShutdownCoordinator::install()
        .context("installing signal handlers")?
        .spawn(handle.commands(), handle.token());

    // No GPIO driver in this binary: each line on stdin counts as a button press.
    info!(pin = hardware.button_pin(), "press Enter to toggle the timer");
    InputWatcher::new(StdinButton::new(), hardware.debounce()).spawn(handle.commands(), handle.token());

    supervisor.run().await.context("supervisor loop failed")?;
    info!("shut down cleanly");

    // The stdin reader sits in a blocking read that would hold the runtime open.
    std::process::exit(0);
}
