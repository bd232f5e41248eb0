//! One connection per configured server

use std::sync::Arc;

use crate::config::McpConfig;
use crate::logging::Logger;

use super::client::{McpClient, McpError};
use super::transport::ToolTransport;

/// A server that could not be reached
#[derive(Debug)]
pub struct ConnectFailure {
    pub server: String,
    pub error: McpError,
}

/// Connected transports, in configuration order
#[derive(Clone, Default)]
pub struct ServerPool {
    transports: Vec<Arc<dyn ToolTransport>>,
}

impl ServerPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect to every configured server
    ///
    /// Servers that fail to connect are logged and reported, never fatal.
    pub async fn connect(config: &McpConfig, logger: Arc<dyn Logger>) -> (Self, Vec<ConnectFailure>) {
        let mut pool = Self::new();
        let mut failures = Vec::new();

        for (name, entry) in &config.servers {
            match McpClient::connect(name, entry, Arc::clone(&logger)).await {
                Ok(client) => pool.add(Arc::new(client)),
                Err(error) => {
                    logger.warn(&format!(
                        "[ServerPool] Skipping '{}' ({}): {}",
                        name,
                        entry.target(),
                        error
                    ));
                    failures.push(ConnectFailure {
                        server: name.clone(),
                        error,
                    });
                }
            }
        }

        (pool, failures)
    }

    pub fn add(&mut self, transport: Arc<dyn ToolTransport>) {
        self.transports.push(transport);
    }

    pub fn with(mut self, transport: Arc<dyn ToolTransport>) -> Self {
        self.add(transport);
        self
    }

    pub fn transports(&self) -> &[Arc<dyn ToolTransport>] {
        &self.transports
    }

    pub fn get(&self, server: &str) -> Option<&Arc<dyn ToolTransport>> {
        self.transports.iter().find(|t| t.server_name() == server)
    }

    pub fn len(&self) -> usize {
        self.transports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transports.is_empty()
    }
}

impl std::fmt::Debug for ServerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.transports.iter().map(|t| t.server_name()))
            .finish()
    }
}
