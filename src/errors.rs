// Copyright (c) 2025, The Ruskit Authors
// MIT License
// All rights reserved.

//! # Error Types for Topology Provisioning
//!
//! Three layers of errors are defined here. `ValidationError` rejects a malformed
//! topology before the broker is ever contacted, `BrokerError` is the broker's reply
//! to a single channel operation, and `ProvisionError` is what a provisioning run
//! reports to its caller, carrying the operation and entity that failed.

use std::fmt;
use thiserror::Error;

/// Reasons a topology definition is rejected at construction time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Two exchanges share the same name
    #[error("exchange `{0}` is declared more than once")]
    DuplicateExchange(String),

    /// Two queues share the same name
    #[error("queue `{0}` is declared more than once")]
    DuplicateQueue(String),

    /// An exchange, a queue or a binding endpoint has an empty name
    #[error("{kind} name must not be empty")]
    EmptyName { kind: &'static str },

    /// A binding points at an exchange the definition does not declare
    #[error("binding of queue `{queue}` references undeclared exchange `{exchange}`")]
    UnknownExchange { queue: String, exchange: String },

    /// A binding points at a queue the definition does not declare
    #[error("binding to exchange `{exchange}` references undeclared queue `{queue}`")]
    UnknownQueue { queue: String, exchange: String },

    /// The exchange type is not one of topic, direct, fanout or headers
    #[error("unknown exchange kind `{0}`")]
    UnknownExchangeKind(String),

    /// The topology document could not be parsed
    #[error("malformed topology document: {0}")]
    Malformed(String),
}

/// Failure reported by the broker for a single channel operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BrokerError {
    /// The entity exists with different attributes (406 PRECONDITION_FAILED)
    #[error("precondition failed: {0}")]
    Conflict(String),

    /// The user is not allowed to perform the operation (403 ACCESS_REFUSED)
    #[error("access refused: {0}")]
    AccessRefused(String),

    /// A referenced entity does not exist (404 NOT_FOUND)
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other transport or protocol failure
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// The kind of broker operation a provisioning run was issuing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    DeclareExchange,
    DeclareQueue,
    BindQueue,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::DeclareExchange => write!(f, "declare exchange"),
            Operation::DeclareQueue => write!(f, "declare queue"),
            Operation::BindQueue => write!(f, "bind queue"),
        }
    }
}

/// Errors surfaced by a provisioning run.
///
/// None of these are retried or rolled back. Entities declared before the failure stay
/// on the broker.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProvisionError {
    /// The topology definition is invalid
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The broker could not be reached
    #[error("failure to connect to `{host}`: {reason}")]
    Connection { host: String, reason: String },

    /// The broker rejected the credentials or the virtual host
    #[error("authentication rejected for user `{user}` on `{host}`: {reason}")]
    Auth {
        host: String,
        user: String,
        reason: String,
    },

    /// A channel could not be opened on the connection
    #[error("failure to create a channel: {0}")]
    Channel(String),

    /// The entity already exists on the broker with different attributes
    #[error("failure to {operation} `{target}`, requested {requested} conflicts with the existing entity: {message}")]
    DeclareConflict {
        operation: Operation,
        target: String,
        requested: String,
        message: String,
    },

    /// The broker failed the operation for any other reason
    #[error("failure to {operation} `{target}`: {source}")]
    BrokerProtocol {
        operation: Operation,
        target: String,
        source: BrokerError,
    },

    /// The executor has already run and cannot be started again
    #[error("provisioning executor already ran (state: {0})")]
    ExecutorReused(String),
}

impl ProvisionError {
    /// Wraps a broker reply with the context of the operation that produced it.
    pub fn from_broker(
        operation: Operation,
        target: impl Into<String>,
        requested: impl Into<String>,
        err: BrokerError,
    ) -> ProvisionError {
        match err {
            BrokerError::Conflict(message) => ProvisionError::DeclareConflict {
                operation,
                target: target.into(),
                requested: requested.into(),
                message,
            },
            other => ProvisionError::BrokerProtocol {
                operation,
                target: target.into(),
                source: other,
            },
        }
    }
}
