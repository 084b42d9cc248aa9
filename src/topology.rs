// Copyright (c) 2025, The Ruskit Authors
// MIT License
// All rights reserved.

//! # Topology Provisioning
//!
//! This module applies a `TopologyDefinition` to the broker. Exchanges are declared
//! first, then queues, then the bindings between them, each operation awaited before
//! the next one is issued since a binding needs both endpoints to exist.
//!
//! Provisioning is idempotent because it only ever declares: an entity that already
//! exists with the same attributes is left as is. The first failing operation stops
//! the run; whatever was declared before it stays on the broker.
//!
//! The main components are:
//! - `Provisioner`: runs the declare sequence on an open channel
//! - `provision`: connects, runs a `Provisioner` and releases channel and connection

use crate::{
    broker::{BrokerChannel, BrokerConnection, BrokerConnector},
    config::BrokerConfig,
    definition::TopologyDefinition,
    errors::{Operation, ProvisionError},
    exchange::ExchangeDefinition,
    queue::{QueueBinding, QueueDefinition},
};
use std::fmt;
use tracing::{debug, error, info, warn};

/// Progress of a provisioning run.
///
/// `Idle → DeclaringExchanges → DeclaringQueues → Binding → Done`, or `Error` from
/// any of the declaring states on the first failure. `Done` and `Error` are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionState {
    Idle,
    DeclaringExchanges,
    DeclaringQueues,
    Binding,
    Done,
    Error,
}

impl fmt::Display for ProvisionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self {
            ProvisionState::Idle => "idle",
            ProvisionState::DeclaringExchanges => "declaring exchanges",
            ProvisionState::DeclaringQueues => "declaring queues",
            ProvisionState::Binding => "binding",
            ProvisionState::Done => "done",
            ProvisionState::Error => "error",
        };
        f.write_str(state)
    }
}

/// Counts of the operations a successful run issued.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProvisionReport {
    pub exchanges: usize,
    pub queues: usize,
    pub bindings: usize,
}

impl fmt::Display for ProvisionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} exchange(s), {} queue(s), {} binding(s)",
            self.exchanges, self.queues, self.bindings
        )
    }
}

/// Declares a topology over a single channel.
///
/// A provisioner runs once. It borrows the channel; opening and closing it is the
/// caller's job (see [`provision`]).
pub struct Provisioner<'c, C: BrokerChannel> {
    channel: &'c C,
    state: ProvisionState,
}

impl<'c, C: BrokerChannel> Provisioner<'c, C> {
    pub fn new(channel: &'c C) -> Provisioner<'c, C> {
        Provisioner {
            channel,
            state: ProvisionState::Idle,
        }
    }

    pub fn state(&self) -> ProvisionState {
        self.state
    }

    /// Installs the topology on the broker.
    ///
    /// This method performs the following operations in order:
    /// 1. Declares all exchanges
    /// 2. Declares all queues
    /// 3. Binds queues to exchanges
    ///
    /// # Returns
    /// The operation counts on success, or the first failure with the operation and
    /// entity it concerned
    pub async fn install(
        &mut self,
        def: &TopologyDefinition,
    ) -> Result<ProvisionReport, ProvisionError> {
        if self.state != ProvisionState::Idle {
            return Err(ProvisionError::ExecutorReused(self.state.to_string()));
        }

        match self.run(def).await {
            Ok(report) => {
                self.state = ProvisionState::Done;
                info!("topology installed: {}", report);
                Ok(report)
            }
            Err(err) => {
                error!(
                    error = err.to_string(),
                    state = %self.state,
                    "topology installation stopped"
                );
                self.state = ProvisionState::Error;
                Err(err)
            }
        }
    }

    async fn run(&mut self, def: &TopologyDefinition) -> Result<ProvisionReport, ProvisionError> {
        self.state = ProvisionState::DeclaringExchanges;
        self.install_exchanges(def.exchanges()).await?;

        self.state = ProvisionState::DeclaringQueues;
        self.install_queues(def.queues()).await?;

        self.state = ProvisionState::Binding;
        self.binding_queues(def.bindings()).await?;

        Ok(ProvisionReport {
            exchanges: def.exchanges().len(),
            queues: def.queues().len(),
            bindings: def.bindings().len(),
        })
    }

    async fn install_exchanges(
        &self,
        exchanges: &[ExchangeDefinition],
    ) -> Result<(), ProvisionError> {
        for exch in exchanges {
            debug!("creating exchange: {}", exch.name);

            match self.channel.declare_exchange(exch).await {
                Err(err) => {
                    error!(
                        error = err.to_string(),
                        name = exch.name.as_str(),
                        "error to declare the exchange"
                    );
                    Err(ProvisionError::from_broker(
                        Operation::DeclareExchange,
                        exch.name.as_str(),
                        exch.attributes(),
                        err,
                    ))
                }
                _ => Ok(()),
            }?;

            debug!("exchange: {} was created", exch.name);
        }

        Ok(())
    }

    async fn install_queues(&self, queues: &[QueueDefinition]) -> Result<(), ProvisionError> {
        for queue in queues {
            debug!("creating queue: {}", queue.name);

            match self.channel.declare_queue(queue).await {
                Err(err) => {
                    error!(
                        error = err.to_string(),
                        name = queue.name.as_str(),
                        "error to declare the queue"
                    );
                    Err(ProvisionError::from_broker(
                        Operation::DeclareQueue,
                        queue.name.as_str(),
                        queue.attributes(),
                        err,
                    ))
                }
                _ => {
                    debug!("queue: {} was created", queue.name);
                    Ok(())
                }
            }?;
        }

        Ok(())
    }

    async fn binding_queues(&self, bindings: &[QueueBinding]) -> Result<(), ProvisionError> {
        for binding in bindings {
            debug!(
                "binding queue: {} to the exchange: {} with the key: {}",
                binding.queue_name, binding.exchange_name, binding.routing_key
            );

            match self.channel.bind_queue(binding).await {
                Err(err) => {
                    error!(error = err.to_string(), "error to bind queue to exchange");
                    Err(ProvisionError::from_broker(
                        Operation::BindQueue,
                        binding.queue_name.as_str(),
                        format!(
                            "{{exchange: {}, routing_key: {}}}",
                            binding.exchange_name, binding.routing_key
                        ),
                        err,
                    ))
                }
                _ => Ok(()),
            }?;
        }

        debug!("queues were bound");

        Ok(())
    }
}

/// Provisions `def` on the broker described by `cfg`.
///
/// Connects, opens a channel and installs the topology. The channel and the
/// connection are closed on every path once they were opened; a failure to close
/// is logged and never replaces the outcome of the installation.
pub async fn provision<B>(
    broker: &B,
    cfg: &BrokerConfig,
    def: &TopologyDefinition,
) -> Result<ProvisionReport, ProvisionError>
where
    B: BrokerConnector,
{
    info!(host = %cfg.host, vhost = %cfg.vhost, "provisioning topology");

    let conn = broker.connect(cfg).await?;

    let result = match conn.channel().await {
        Ok(channel) => {
            let result = Provisioner::new(&channel).install(def).await;

            if let Err(err) = channel.close().await {
                warn!(error = err.to_string(), "failure to close the channel");
            }

            result
        }
        Err(err) => Err(err),
    };

    if let Err(err) = conn.close().await {
        warn!(error = err.to_string(), "failure to close the connection");
    }

    result
}
