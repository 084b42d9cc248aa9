// Copyright (c) 2025, The Ruskit Authors
// MIT License
// All rights reserved.

//! # Broker Capabilities
//!
//! The narrow set of broker operations provisioning needs. The AMQP client
//! implements these in [`crate::channel`]; tests provide in-memory doubles.
//!
//! Every operation is a full round trip: it resolves only once the broker has
//! answered, so callers awaiting one operation before issuing the next observe
//! the effects of the earlier one.

use crate::{
    config::BrokerConfig,
    errors::{BrokerError, ProvisionError},
    exchange::ExchangeDefinition,
    queue::{QueueBinding, QueueDefinition},
};
use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

/// Opens authenticated connections to the broker.
#[async_trait]
pub trait BrokerConnector: Send + Sync {
    type Connection: BrokerConnection;

    /// Fails with `ProvisionError::Connection` when the broker is unreachable and
    /// `ProvisionError::Auth` when the credentials or the virtual host are refused.
    async fn connect(&self, cfg: &BrokerConfig) -> Result<Self::Connection, ProvisionError>;
}

/// An open broker connection.
#[async_trait]
pub trait BrokerConnection: Send + Sync {
    type Channel: BrokerChannel;

    async fn channel(&self) -> Result<Self::Channel, ProvisionError>;

    async fn close(&self) -> Result<(), BrokerError>;
}

/// The declare and bind operations of an open channel.
///
/// Declares are never passive: an entity that already exists with identical
/// attributes is left untouched, one with different attributes fails with
/// `BrokerError::Conflict`.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BrokerChannel: Send + Sync {
    async fn declare_exchange(&self, def: &ExchangeDefinition) -> Result<(), BrokerError>;

    async fn declare_queue(&self, def: &QueueDefinition) -> Result<(), BrokerError>;

    async fn bind_queue(&self, binding: &QueueBinding) -> Result<(), BrokerError>;

    async fn close(&self) -> Result<(), BrokerError>;
}
