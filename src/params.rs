// Copyright (c) 2025, The Ruskit Authors
// MIT License
// All rights reserved.

use amqp_provision::config::{
    BrokerConfig, DEFAULT_CONNECTION_NAME, DEFAULT_HOST, DEFAULT_PASSWORD, DEFAULT_USER,
    DEFAULT_VHOST,
};
use clap::{builder::BoolishValueParser, Parser};
use std::path::PathBuf;

/// Creates the exchanges, queues and bindings STOMP producers and consumers share.
#[derive(Parser, Debug)]
#[command(name = "amqp-provision")]
pub struct Params {
    /// AMQP server to connect to
    #[arg(long, env = "AMQP_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Broker port, 5672 or 5671 with --ssl when omitted
    #[arg(long, env = "AMQP_PORT")]
    pub port: Option<u16>,

    /// User id to authenticate as
    #[arg(short = 'u', long, env = "AMQP_USERID", default_value = DEFAULT_USER)]
    pub userid: String,

    /// Password to authenticate with
    #[arg(
        short = 'p',
        long,
        env = "AMQP_PASSWORD",
        default_value = DEFAULT_PASSWORD,
        hide_env_values = true
    )]
    pub password: String,

    /// Virtual host to provision
    #[arg(long, env = "AMQP_VHOST", default_value = DEFAULT_VHOST)]
    pub vhost: String,

    /// Enable TLS
    #[arg(long, env = "AMQP_SSL", value_parser = BoolishValueParser::new())]
    pub ssl: bool,

    /// Connection name shown by the broker
    #[arg(long, env = "AMQP_CONNECTION_NAME", default_value = DEFAULT_CONNECTION_NAME)]
    pub connection_name: String,

    /// JSON topology document, the built-in STOMP topology when omitted
    #[arg(long, env = "AMQP_TOPOLOGY")]
    pub topology: Option<PathBuf>,

    /// Validate the topology and log the plan without connecting
    #[arg(long)]
    pub dry_run: bool,
}

impl Params {
    pub fn broker_config(&self) -> BrokerConfig {
        let mut cfg = BrokerConfig::default()
            .host(&self.host)
            .credentials(&self.userid, &self.password)
            .vhost(&self.vhost)
            .connection_name(&self.connection_name);

        if self.ssl {
            cfg = cfg.tls();
        }

        if let Some(port) = self.port {
            cfg = cfg.port(port);
        }

        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_fill_the_broker_config() {
        let params = Params::try_parse_from([
            "amqp-provision",
            "--host",
            "broker.internal",
            "-u",
            "ops",
            "-p",
            "secret",
            "--vhost",
            "data",
            "--ssl",
        ])
        .unwrap();

        let cfg = params.broker_config();
        assert_eq!(cfg.host, "broker.internal");
        assert_eq!(cfg.user, "ops");
        assert_eq!(cfg.password, "secret");
        assert_eq!(cfg.vhost, "data");
        assert!(cfg.tls);
        assert_eq!(cfg.effective_port(), 5671);
    }

    #[test]
    fn explicit_port_wins_over_tls_default() {
        let params =
            Params::try_parse_from(["amqp-provision", "--ssl", "--port", "5672"]).unwrap();

        assert_eq!(params.broker_config().effective_port(), 5672);
    }

    // The other tests in this module pass --ssl, so the variable does not leak into them.
    #[test]
    fn ssl_accepts_boolish_environment_values() {
        let cases = [
            ("1", true),
            ("yes", true),
            ("true", true),
            ("0", false),
            ("no", false),
        ];

        for (value, expected) in cases {
            std::env::set_var("AMQP_SSL", value);
            let params = Params::try_parse_from(["amqp-provision"]).unwrap();
            assert_eq!(params.ssl, expected, "AMQP_SSL={}", value);
        }
        std::env::remove_var("AMQP_SSL");
    }

    #[test]
    fn positional_arguments_are_rejected() {
        assert!(Params::try_parse_from(["amqp-provision", "localhost"]).is_err());
    }
}
