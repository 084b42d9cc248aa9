use amqp_provision::{
    broker::{BrokerChannel, BrokerConnection, BrokerConnector},
    config::BrokerConfig,
    errors::{BrokerError, ProvisionError},
    exchange::ExchangeDefinition,
    queue::{QueueBinding, QueueDefinition},
};
use async_trait::async_trait;
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{Arc, Mutex},
};

/// What the broker currently holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Topology {
    pub exchanges: BTreeMap<String, ExchangeDefinition>,
    pub queues: BTreeMap<String, QueueDefinition>,
    pub bindings: BTreeSet<(String, String, String)>,
}

#[derive(Debug, Default)]
struct State {
    topology: Topology,
    operations: Vec<String>,
    open_connections: usize,
    open_channels: usize,
    unreachable: bool,
    channel_refused: bool,
}

/// In-memory broker following AMQP declare semantics.
///
/// Accepts the `guest`/`guest` credentials only.
#[derive(Clone)]
pub struct MemoryBroker {
    user: String,
    password: String,
    state: Arc<Mutex<State>>,
}

impl Default for MemoryBroker {
    fn default() -> Self {
        MemoryBroker {
            user: "guest".to_owned(),
            password: "guest".to_owned(),
            state: Arc::default(),
        }
    }
}

impl MemoryBroker {
    pub fn new() -> MemoryBroker {
        MemoryBroker::default()
    }

    pub fn unreachable(self) -> Self {
        self.state.lock().unwrap().unreachable = true;
        self
    }

    pub fn refusing_channels(self) -> Self {
        self.state.lock().unwrap().channel_refused = true;
        self
    }

    /// An exchange that existed before provisioning started.
    pub fn with_exchange(self, def: ExchangeDefinition) -> Self {
        self.state
            .lock()
            .unwrap()
            .topology
            .exchanges
            .insert(def.name().to_owned(), def);
        self
    }

    pub fn with_queue(self, def: QueueDefinition) -> Self {
        self.state
            .lock()
            .unwrap()
            .topology
            .queues
            .insert(def.name().to_owned(), def);
        self
    }

    pub fn topology(&self) -> Topology {
        self.state.lock().unwrap().topology.clone()
    }

    /// Channel operations in the order the broker received them.
    pub fn operations(&self) -> Vec<String> {
        self.state.lock().unwrap().operations.clone()
    }

    pub fn clear_operations(&self) {
        self.state.lock().unwrap().operations.clear();
    }

    pub fn open_connections(&self) -> usize {
        self.state.lock().unwrap().open_connections
    }

    pub fn open_channels(&self) -> usize {
        self.state.lock().unwrap().open_channels
    }
}

pub struct MemoryConnection {
    state: Arc<Mutex<State>>,
}

pub struct MemoryChannel {
    state: Arc<Mutex<State>>,
}

#[async_trait]
impl BrokerConnector for MemoryBroker {
    type Connection = MemoryConnection;

    async fn connect(&self, cfg: &BrokerConfig) -> Result<MemoryConnection, ProvisionError> {
        let mut state = self.state.lock().unwrap();

        if state.unreachable {
            return Err(ProvisionError::Connection {
                host: cfg.host.clone(),
                reason: "connection refused".to_owned(),
            });
        }

        if cfg.user != self.user || cfg.password != self.password {
            return Err(ProvisionError::Auth {
                host: cfg.host.clone(),
                user: cfg.user.clone(),
                reason: "ACCESS_REFUSED - Login was refused".to_owned(),
            });
        }

        state.open_connections += 1;

        Ok(MemoryConnection {
            state: self.state.clone(),
        })
    }
}

#[async_trait]
impl BrokerConnection for MemoryConnection {
    type Channel = MemoryChannel;

    async fn channel(&self) -> Result<MemoryChannel, ProvisionError> {
        let mut state = self.state.lock().unwrap();

        if state.channel_refused {
            return Err(ProvisionError::Channel("channel_max reached".to_owned()));
        }

        state.open_channels += 1;

        Ok(MemoryChannel {
            state: self.state.clone(),
        })
    }

    async fn close(&self) -> Result<(), BrokerError> {
        let mut state = self.state.lock().unwrap();
        state.open_connections -= 1;
        state.operations.push("close connection".to_owned());
        Ok(())
    }
}

#[async_trait]
impl BrokerChannel for MemoryChannel {
    async fn declare_exchange(&self, def: &ExchangeDefinition) -> Result<(), BrokerError> {
        let mut state = self.state.lock().unwrap();
        state
            .operations
            .push(format!("declare exchange {}", def.name()));

        match state.topology.exchanges.get(def.name()) {
            Some(existing) if existing != def => Err(BrokerError::Conflict(format!(
                "inequivalent arguments for exchange '{}': received {} but current is {}",
                def.name(),
                def.attributes(),
                existing.attributes()
            ))),
            Some(_) => Ok(()),
            None => {
                state
                    .topology
                    .exchanges
                    .insert(def.name().to_owned(), def.clone());
                Ok(())
            }
        }
    }

    async fn declare_queue(&self, def: &QueueDefinition) -> Result<(), BrokerError> {
        let mut state = self.state.lock().unwrap();
        state.operations.push(format!("declare queue {}", def.name()));

        match state.topology.queues.get(def.name()) {
            Some(existing) if existing != def => Err(BrokerError::Conflict(format!(
                "inequivalent arguments for queue '{}': received {} but current is {}",
                def.name(),
                def.attributes(),
                existing.attributes()
            ))),
            Some(_) => Ok(()),
            None => {
                state
                    .topology
                    .queues
                    .insert(def.name().to_owned(), def.clone());
                Ok(())
            }
        }
    }

    async fn bind_queue(&self, binding: &QueueBinding) -> Result<(), BrokerError> {
        let mut state = self.state.lock().unwrap();
        state.operations.push(format!(
            "bind queue {} {} {}",
            binding.queue_name(),
            binding.exchange_name(),
            binding.key()
        ));

        if !state.topology.exchanges.contains_key(binding.exchange_name()) {
            return Err(BrokerError::NotFound(format!(
                "no exchange '{}'",
                binding.exchange_name()
            )));
        }

        if !state.topology.queues.contains_key(binding.queue_name()) {
            return Err(BrokerError::NotFound(format!(
                "no queue '{}'",
                binding.queue_name()
            )));
        }

        state.topology.bindings.insert((
            binding.queue_name().to_owned(),
            binding.exchange_name().to_owned(),
            binding.key().to_owned(),
        ));

        Ok(())
    }

    async fn close(&self) -> Result<(), BrokerError> {
        let mut state = self.state.lock().unwrap();
        state.open_channels -= 1;
        state.operations.push("close channel".to_owned());
        Ok(())
    }
}
