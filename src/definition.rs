// Copyright (c) 2025, The Ruskit Authors
// MIT License
// All rights reserved.

//! # Topology Definition
//!
//! A `TopologyDefinition` is the desired state of the broker: the exchanges, queues
//! and bindings that must exist. It is plain data, validated once when it is built,
//! and consumed by the provisioning executor in a fixed order (exchanges, then queues,
//! then bindings) since a binding needs both of its endpoints to exist.
//!
//! Definitions are assembled with `TopologyBuilder` or loaded from a JSON document.

use crate::{
    errors::ValidationError,
    exchange::{ExchangeDefinition, ExchangeDocument},
    queue::{QueueBinding, QueueDefinition},
};
use serde::Deserialize;
use std::collections::HashSet;

/// Validated desired-state catalog of a broker topology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologyDefinition {
    exchanges: Vec<ExchangeDefinition>,
    queues: Vec<QueueDefinition>,
    bindings: Vec<QueueBinding>,
}

impl TopologyDefinition {
    /// Starts an empty topology builder.
    pub fn builder() -> TopologyBuilder {
        TopologyBuilder::default()
    }

    /// The topology STOMP producers and consumers rely on.
    ///
    /// Two durable topic exchanges, `jobs` and `commands`, and the durable
    /// `manager.firewall` queue receiving `firewall` commands.
    pub fn stomp_interop() -> TopologyDefinition {
        TopologyDefinition {
            exchanges: vec![
                ExchangeDefinition::new("jobs").topic().durable(),
                ExchangeDefinition::new("commands").topic().durable(),
            ],
            queues: vec![QueueDefinition::new("manager.firewall").durable()],
            bindings: vec![QueueBinding::new("manager.firewall")
                .exchange("commands")
                .routing_key("firewall")],
        }
    }

    /// Loads and validates a topology from a JSON document.
    ///
    /// ```json
    /// {
    ///   "exchanges": [{ "name": "jobs", "kind": "topic", "durable": true, "auto_delete": false }],
    ///   "queues": [{ "name": "jobs.all", "durable": true, "auto_delete": false }],
    ///   "bindings": [{ "queue": "jobs.all", "exchange": "jobs", "routing_key": "#" }]
    /// }
    /// ```
    ///
    /// Every attribute is required.
    pub fn from_json(document: &str) -> Result<TopologyDefinition, ValidationError> {
        let doc: TopologyDocument = serde_json::from_str(document)
            .map_err(|err| ValidationError::Malformed(err.to_string()))?;

        let mut builder = TopologyDefinition::builder();
        for exchange in doc.exchanges {
            builder = builder.exchange(exchange.try_into()?);
        }
        for queue in doc.queues {
            builder = builder.queue(queue);
        }
        for binding in doc.bindings {
            builder = builder.queue_binding(binding);
        }

        builder.build()
    }

    pub fn exchanges(&self) -> &[ExchangeDefinition] {
        &self.exchanges
    }

    pub fn queues(&self) -> &[QueueDefinition] {
        &self.queues
    }

    pub fn bindings(&self) -> &[QueueBinding] {
        &self.bindings
    }
}

/// Collects entities in declaration order and validates them on `build`.
#[derive(Debug, Clone, Default)]
pub struct TopologyBuilder {
    exchanges: Vec<ExchangeDefinition>,
    queues: Vec<QueueDefinition>,
    bindings: Vec<QueueBinding>,
}

impl TopologyBuilder {
    /// Adds an exchange definition to the topology.
    pub fn exchange(mut self, def: ExchangeDefinition) -> Self {
        self.exchanges.push(def);
        self
    }

    /// Adds a queue definition to the topology.
    pub fn queue(mut self, def: QueueDefinition) -> Self {
        self.queues.push(def);
        self
    }

    /// Adds a queue-to-exchange binding to the topology.
    pub fn queue_binding(mut self, binding: QueueBinding) -> Self {
        self.bindings.push(binding);
        self
    }

    /// Validates the collected entities.
    ///
    /// Fails when a name is empty, when a name is repeated within the exchanges or
    /// within the queues, or when a binding references an exchange or queue the
    /// topology does not declare. An empty queue name would make the broker generate
    /// a fresh queue on every run, and the empty exchange is the reserved default one.
    pub fn build(self) -> Result<TopologyDefinition, ValidationError> {
        let mut exchanges = HashSet::new();
        for exch in &self.exchanges {
            if exch.name.is_empty() {
                return Err(ValidationError::EmptyName { kind: "exchange" });
            }
            if !exchanges.insert(exch.name.as_str()) {
                return Err(ValidationError::DuplicateExchange(exch.name.clone()));
            }
        }

        let mut queues = HashSet::new();
        for queue in &self.queues {
            if queue.name.is_empty() {
                return Err(ValidationError::EmptyName { kind: "queue" });
            }
            if !queues.insert(queue.name.as_str()) {
                return Err(ValidationError::DuplicateQueue(queue.name.clone()));
            }
        }

        for binding in &self.bindings {
            if binding.queue_name.is_empty() {
                return Err(ValidationError::EmptyName {
                    kind: "binding queue",
                });
            }
            if binding.exchange_name.is_empty() {
                return Err(ValidationError::EmptyName {
                    kind: "binding exchange",
                });
            }

            if !exchanges.contains(binding.exchange_name.as_str()) {
                return Err(ValidationError::UnknownExchange {
                    queue: binding.queue_name.clone(),
                    exchange: binding.exchange_name.clone(),
                });
            }

            if !queues.contains(binding.queue_name.as_str()) {
                return Err(ValidationError::UnknownQueue {
                    queue: binding.queue_name.clone(),
                    exchange: binding.exchange_name.clone(),
                });
            }
        }

        Ok(TopologyDefinition {
            exchanges: self.exchanges,
            queues: self.queues,
            bindings: self.bindings,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TopologyDocument {
    exchanges: Vec<ExchangeDocument>,
    queues: Vec<QueueDefinition>,
    bindings: Vec<QueueBinding>,
}
