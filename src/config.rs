// Copyright (c) 2025, The Ruskit Authors
// MIT License
// All rights reserved.

//! # Broker Connection Configuration
//!
//! `BrokerConfig` carries everything needed to reach the broker. It is passed
//! explicitly into the provisioning entry point.

use std::fmt;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 5672;
pub const DEFAULT_TLS_PORT: u16 = 5671;
pub const DEFAULT_USER: &str = "guest";
pub const DEFAULT_PASSWORD: &str = "guest";
pub const DEFAULT_VHOST: &str = "/";
pub const DEFAULT_CONNECTION_NAME: &str = "amqp-provision";

/// Connection parameters for the broker.
#[derive(Clone, PartialEq, Eq)]
pub struct BrokerConfig {
    pub host: String,
    /// Explicit port; the scheme's default (5672, or 5671 with TLS) when unset.
    pub port: Option<u16>,
    pub user: String,
    pub password: String,
    pub vhost: String,
    pub tls: bool,
    pub connection_name: String,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        BrokerConfig {
            host: DEFAULT_HOST.to_owned(),
            port: None,
            user: DEFAULT_USER.to_owned(),
            password: DEFAULT_PASSWORD.to_owned(),
            vhost: DEFAULT_VHOST.to_owned(),
            tls: false,
            connection_name: DEFAULT_CONNECTION_NAME.to_owned(),
        }
    }
}

impl BrokerConfig {
    pub fn host(mut self, host: &str) -> Self {
        self.host = host.to_owned();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// The port the connection goes to.
    pub fn effective_port(&self) -> u16 {
        match (self.port, self.tls) {
            (Some(port), _) => port,
            (None, true) => DEFAULT_TLS_PORT,
            (None, false) => DEFAULT_PORT,
        }
    }

    pub fn credentials(mut self, user: &str, password: &str) -> Self {
        self.user = user.to_owned();
        self.password = password.to_owned();
        self
    }

    pub fn vhost(mut self, vhost: &str) -> Self {
        self.vhost = vhost.to_owned();
        self
    }

    /// Enables TLS. Without an explicit port the AMQPS default is used.
    pub fn tls(mut self) -> Self {
        self.tls = true;
        self
    }

    pub fn connection_name(mut self, name: &str) -> Self {
        self.connection_name = name.to_owned();
        self
    }

    /// Renders the AMQP URI for this configuration.
    ///
    /// User, password and virtual host are percent-encoded, so the default vhost `/`
    /// is sent as `%2F`.
    pub fn uri(&self) -> String {
        let scheme = if self.tls { "amqps" } else { "amqp" };

        format!(
            "{}://{}:{}@{}:{}/{}",
            scheme,
            urlencoding::encode(&self.user),
            urlencoding::encode(&self.password),
            self.host,
            self.effective_port(),
            urlencoding::encode(&self.vhost)
        )
    }
}

impl fmt::Debug for BrokerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrokerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("vhost", &self.vhost)
            .field("tls", &self.tls)
            .field("connection_name", &self.connection_name)
            .finish()
    }
}
