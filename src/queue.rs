// Copyright (c) 2025, The Ruskit Authors
// MIT License
// All rights reserved.

//! # Queue Definitions
//!
//! This module provides types for describing queues and the bindings that connect
//! them to exchanges.

use serde::Deserialize;

/// Definition of a queue with its declare attributes.
///
/// This struct implements the builder pattern. A new definition is neither durable
/// nor auto-deleted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueueDefinition {
    pub(crate) name: String,
    pub(crate) durable: bool,
    #[serde(rename = "auto_delete")]
    pub(crate) delete: bool,
}

impl QueueDefinition {
    /// Creates a new queue definition with the given name.
    ///
    /// # Parameters
    /// * `name` - The name of the queue
    ///
    /// # Returns
    /// A new queue definition with default settings
    pub fn new(name: &str) -> QueueDefinition {
        QueueDefinition {
            name: name.to_owned(),
            durable: false,
            delete: false,
        }
    }

    /// Makes the queue durable, persisting across broker restarts.
    ///
    /// Durable queues will survive broker restart, preserving messages.
    ///
    /// # Returns
    /// Self for method chaining
    pub fn durable(mut self) -> Self {
        self.durable = true;
        self
    }

    /// Sets the queue to auto-delete when its last consumer goes away.
    ///
    /// # Returns
    /// Self for method chaining
    pub fn delete(mut self) -> Self {
        self.delete = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_durable(&self) -> bool {
        self.durable
    }

    pub fn is_auto_delete(&self) -> bool {
        self.delete
    }

    /// Human readable attribute set, used when reporting a declare conflict.
    pub fn attributes(&self) -> String {
        format!(
            "{{durable: {}, auto_delete: {}}}",
            self.durable, self.delete
        )
    }
}

/// Configuration for binding a queue to an exchange.
///
/// A binding has no name of its own; it is identified by the
/// (queue, exchange, routing key) tuple.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueueBinding {
    #[serde(rename = "queue")]
    pub(crate) queue_name: String,
    #[serde(rename = "exchange")]
    pub(crate) exchange_name: String,
    pub(crate) routing_key: String,
}

impl QueueBinding {
    /// Creates a new queue binding for the given queue.
    ///
    /// By default, the exchange name and routing key are empty strings.
    /// These should be set using the `exchange` and `routing_key` methods.
    ///
    /// # Parameters
    /// * `queue` - The name of the queue to bind
    ///
    /// # Returns
    /// A new queue binding with default settings
    pub fn new(queue: &str) -> QueueBinding {
        QueueBinding {
            queue_name: queue.to_owned(),
            exchange_name: String::new(),
            routing_key: String::new(),
        }
    }

    /// Sets the exchange to bind the queue to.
    pub fn exchange(mut self, exchange: &str) -> Self {
        self.exchange_name = exchange.to_owned();
        self
    }

    /// Sets the routing key, or pattern for topic exchanges.
    pub fn routing_key(mut self, key: &str) -> Self {
        self.routing_key = key.to_owned();
        self
    }

    pub fn queue_name(&self) -> &str {
        &self.queue_name
    }

    pub fn exchange_name(&self) -> &str {
        &self.exchange_name
    }

    pub fn key(&self) -> &str {
        &self.routing_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_defaults_are_not_durable_nor_auto_deleted() {
        let def = QueueDefinition::new("manager.firewall");
        assert_eq!(def.name(), "manager.firewall");
        assert!(!def.is_durable());
        assert!(!def.is_auto_delete());

        let def = def.durable();
        assert!(def.is_durable());
        assert_eq!(def.attributes(), "{durable: true, auto_delete: false}");
    }

    #[test]
    fn binding_builder_sets_both_endpoints() {
        let binding = QueueBinding::new("manager.firewall")
            .exchange("commands")
            .routing_key("firewall");

        assert_eq!(binding.queue_name(), "manager.firewall");
        assert_eq!(binding.exchange_name(), "commands");
        assert_eq!(binding.key(), "firewall");
    }
}
