//! Diagnostic binary that listens for protocol blobs.
//!
//! Binds a [`BlobEndpoint`], runs the polling loop and logs each reassembled
//! blob.

mod cli;

use std::{process::ExitCode, time::Duration};

use blobwire::{
    channel::ChannelConfig,
    endpoint::BlobEndpoint,
    fragment::{AssemblerConfig, QueueId},
};
use clap::Parser;

fn main() -> ExitCode {
    // Applications embedding the library should install their own subscriber.
    tracing_subscriber::fmt::init();

    let cli = cli::Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "blobwire stopped");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &cli::Cli) -> Result<(), Box<dyn std::error::Error>> {
    install_metrics_exporter(cli)?;

    let assembler = AssemblerConfig::default().with_stale_after(Duration::from_secs(cli.stale_secs));
    let mut endpoint = BlobEndpoint::bind(&ChannelConfig::new(cli.bind), assembler)?;
    tracing::info!(local_addr = %endpoint.local_addr(), "listening for blobs");

    if let (Some(peer), Some(message)) = (cli.send_to, cli.message.as_deref()) {
        let id = endpoint.send_blob(peer, QueueId::new(cli.queue), message.as_bytes())?;
        tracing::info!(blob_id = %id, %peer, "sent blob");
    }

    let timeout = Duration::from_millis(cli.poll_ms);
    let mut received = 0_usize;
    loop {
        endpoint.poll(timeout)?;
        for blob in endpoint.drain_blobs() {
            received += 1;
            tracing::info!(
                blob_id = %blob.id(),
                queue_id = %blob.queue_id(),
                len = blob.payload().len(),
                "blob received"
            );
        }
        if cli.max_blobs.is_some_and(|max| received >= max) {
            return Ok(());
        }
    }
}

#[cfg(feature = "metrics")]
fn install_metrics_exporter(cli: &cli::Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(addr) = cli.metrics_addr {
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()?;
        tracing::info!(%addr, "serving metrics");
    }
    Ok(())
}

#[cfg(not(feature = "metrics"))]
fn install_metrics_exporter(cli: &cli::Cli) -> Result<(), Box<dyn std::error::Error>> {
    if cli.metrics_addr.is_some() {
        tracing::warn!("built without the `metrics` feature; ignoring --metrics-addr");
    }
    Ok(())
}
