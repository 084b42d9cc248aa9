// Copyright (c) 2025, The Ruskit Authors
// MIT License
// All rights reserved.

//! # AMQP Connection and Channel
//!
//! This module implements the broker capabilities on top of lapin. It establishes
//! connections to the broker, opens channels on them, and translates declare and
//! bind requests into AMQP methods. Broker replies are classified into
//! `BrokerError` variants so that callers can tell attribute conflicts apart from
//! other failures.

use crate::{
    broker::{BrokerChannel, BrokerConnection, BrokerConnector},
    config::BrokerConfig,
    errors::{BrokerError, ProvisionError},
    exchange::ExchangeDefinition,
    queue::{QueueBinding, QueueDefinition},
};
use async_trait::async_trait;
use lapin::{
    options::{ExchangeDeclareOptions, QueueBindOptions, QueueDeclareOptions},
    protocol::{AMQPErrorKind, AMQPHardError, AMQPSoftError},
    types::{FieldTable, LongString},
    Channel, Connection, ConnectionProperties,
};
use tracing::{debug, error};

const REPLY_SUCCESS: u16 = 200;

/// Connects to the broker with lapin.
#[derive(Debug, Clone, Copy, Default)]
pub struct AmqpConnector;

/// A lapin connection.
pub struct AmqpConnection {
    conn: Connection,
}

/// A lapin channel.
pub struct AmqpChannel {
    channel: Channel,
}

#[async_trait]
impl BrokerConnector for AmqpConnector {
    type Connection = AmqpConnection;

    /// Creates a new AMQP connection.
    ///
    /// The connection is named after `cfg.connection_name` so it can be identified
    /// in the broker's management tools.
    async fn connect(&self, cfg: &BrokerConfig) -> Result<AmqpConnection, ProvisionError> {
        debug!(host = %cfg.host, vhost = %cfg.vhost, tls = cfg.tls, "creating amqp connection...");
        let options = ConnectionProperties::default()
            .with_connection_name(LongString::from(cfg.connection_name.clone()));

        match Connection::connect(&cfg.uri(), options).await {
            Ok(conn) => {
                debug!("amqp connected");
                Ok(AmqpConnection { conn })
            }
            Err(err) => {
                error!(error = err.to_string(), host = %cfg.host, "failure to connect");
                Err(connect_error(cfg, &err))
            }
        }
    }
}

#[async_trait]
impl BrokerConnection for AmqpConnection {
    type Channel = AmqpChannel;

    async fn channel(&self) -> Result<AmqpChannel, ProvisionError> {
        debug!("creating amqp channel...");
        match self.conn.create_channel().await {
            Ok(channel) => {
                debug!("channel created");
                Ok(AmqpChannel { channel })
            }
            Err(err) => {
                error!(error = err.to_string(), "error to create the channel");
                Err(ProvisionError::Channel(err.to_string()))
            }
        }
    }

    async fn close(&self) -> Result<(), BrokerError> {
        self.conn
            .close(REPLY_SUCCESS, "OK")
            .await
            .map_err(|err| broker_error(&err))
    }
}

#[async_trait]
impl BrokerChannel for AmqpChannel {
    async fn declare_exchange(&self, def: &ExchangeDefinition) -> Result<(), BrokerError> {
        self.channel
            .exchange_declare(
                &def.name,
                def.kind.into(),
                ExchangeDeclareOptions {
                    passive: false,
                    durable: def.durable,
                    auto_delete: def.delete,
                    internal: false,
                    nowait: false,
                },
                FieldTable::default(),
            )
            .await
            .map_err(|err| broker_error(&err))
    }

    async fn declare_queue(&self, def: &QueueDefinition) -> Result<(), BrokerError> {
        self.channel
            .queue_declare(
                &def.name,
                QueueDeclareOptions {
                    passive: false,
                    durable: def.durable,
                    exclusive: false,
                    auto_delete: def.delete,
                    nowait: false,
                },
                FieldTable::default(),
            )
            .await
            .map(|_| ())
            .map_err(|err| broker_error(&err))
    }

    async fn bind_queue(&self, binding: &QueueBinding) -> Result<(), BrokerError> {
        self.channel
            .queue_bind(
                &binding.queue_name,
                &binding.exchange_name,
                &binding.routing_key,
                QueueBindOptions { nowait: false },
                FieldTable::default(),
            )
            .await
            .map_err(|err| broker_error(&err))
    }

    async fn close(&self) -> Result<(), BrokerError> {
        self.channel
            .close(REPLY_SUCCESS, "OK")
            .await
            .map_err(|err| broker_error(&err))
    }
}

/// Classifies the broker's reply code for a failed channel method.
fn broker_error(err: &lapin::Error) -> BrokerError {
    let message = err.to_string();

    match err {
        lapin::Error::ProtocolError(amqp) => match amqp.kind() {
            AMQPErrorKind::Soft(AMQPSoftError::PRECONDITIONFAILED) => {
                BrokerError::Conflict(message)
            }
            AMQPErrorKind::Soft(AMQPSoftError::ACCESSREFUSED) => {
                BrokerError::AccessRefused(message)
            }
            AMQPErrorKind::Soft(AMQPSoftError::NOTFOUND) => BrokerError::NotFound(message),
            _ => BrokerError::Protocol(message),
        },
        _ => BrokerError::Protocol(message),
    }
}

/// Refused logins and refused virtual hosts are authentication failures, anything
/// else means the broker could not be reached.
fn connect_error(cfg: &BrokerConfig, err: &lapin::Error) -> ProvisionError {
    if let lapin::Error::ProtocolError(amqp) = err {
        if matches!(
            amqp.kind(),
            AMQPErrorKind::Soft(AMQPSoftError::ACCESSREFUSED)
                | AMQPErrorKind::Hard(AMQPHardError::NOTALLOWED)
        ) {
            return ProvisionError::Auth {
                host: cfg.host.clone(),
                user: cfg.user.clone(),
                reason: err.to_string(),
            };
        }
    }

    ProvisionError::Connection {
        host: cfg.host.clone(),
        reason: err.to_string(),
    }
}
