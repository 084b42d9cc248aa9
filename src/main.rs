// Copyright (c) 2025, The Ruskit Authors
// MIT License
// All rights reserved.

mod params;

use amqp_provision::{
    channel::AmqpConnector, definition::TopologyDefinition, topology::provision,
};
use anyhow::{Context, Result};
use clap::Parser;
use params::Params;
use std::path::Path;
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let params = Params::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "amqp_provision=info".into()),
        )
        .init();

    let def = load_topology(params.topology.as_deref())?;

    if params.dry_run {
        log_plan(&def);
        return Ok(());
    }

    let cfg = params.broker_config();
    let report = provision(&AmqpConnector, &cfg, &def)
        .await
        .with_context(|| format!("failure to provision `{}` on `{}`", cfg.vhost, cfg.host))?;

    info!("provisioned {}", report);

    Ok(())
}

fn load_topology(path: Option<&Path>) -> Result<TopologyDefinition> {
    match path {
        None => Ok(TopologyDefinition::stomp_interop()),
        Some(path) => {
            let doc = std::fs::read_to_string(path)
                .with_context(|| format!("failure to read topology `{}`", path.display()))?;

            TopologyDefinition::from_json(&doc)
                .with_context(|| format!("invalid topology `{}`", path.display()))
        }
    }
}

fn log_plan(def: &TopologyDefinition) {
    for exch in def.exchanges() {
        info!("would declare exchange: {} {}", exch.name(), exch.attributes());
    }
    for queue in def.queues() {
        info!("would declare queue: {} {}", queue.name(), queue.attributes());
    }
    for binding in def.bindings() {
        info!(
            "would bind queue: {} to the exchange: {} with the key: {}",
            binding.queue_name(),
            binding.exchange_name(),
            binding.key()
        );
    }
}
