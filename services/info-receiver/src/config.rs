use std::{
    env,
    net::{IpAddr, Ipv4Addr, SocketAddr},
};

use receiver_common::env_or;

pub const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiverConfig {
    pub host: IpAddr,
    pub port: u16,
}

impl Default for ReceiverConfig {
    // All interfaces, so devices on the LAN can reach it.
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
        }
    }
}

impl ReceiverConfig {
    pub fn from_env() -> Self {
        Self::from_env_keys("BIND_HOST", "PORT")
    }

    fn from_env_keys(host_key: &str, port_key: &str) -> Self {
        let defaults = Self::default();
        let host = match env::var(host_key) {
            Ok(raw) => raw.trim().parse::<IpAddr>().unwrap_or_else(|_| {
                tracing::warn!(key = host_key, value = %raw, "invalid bind host, using default");
                defaults.host
            }),
            Err(_) => defaults.host,
        };

        Self {
            host,
            port: env_or(port_key, defaults.port),
        }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
