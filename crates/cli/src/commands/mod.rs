// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod account;
pub mod pending;
pub mod record;
pub mod run;
pub mod status;
pub mod sync;

use std::path::PathBuf;
use std::sync::Arc;

use trail_core::{CredentialStore, PersistentQueue, TokenSource};

use crate::auth::AuthClient;
use crate::config::{load_config, resolve_state_dir, Config, StatePaths};
use crate::error::Result;
use crate::sync::{
    Connectivity, ConnectivityMonitor, HttpSink, MonitorConfig, SyncEngine, SyncEngineConfig,
    TcpProbe,
};

/// Resolved state directory and configuration for one invocation.
pub struct Context {
    pub paths: StatePaths,
    pub config: Config,
}

impl Context {
    /// Resolve the state directory and load the config.
    pub fn load(state_dir: Option<PathBuf>, config: Option<PathBuf>) -> Result<Self> {
        let paths = StatePaths::new(resolve_state_dir(state_dir));
        let config = load_config(config, &paths)?;
        tracing::debug!(
            state_dir = %paths.root().display(),
            server_url = %config.server_url,
            "context loaded"
        );
        Ok(Context { paths, config })
    }

    /// Open (creating if needed) the pending record queue.
    pub fn open_queue(&self) -> Result<Arc<PersistentQueue>> {
        self.paths.ensure()?;
        Ok(Arc::new(PersistentQueue::open(&self.paths.queue_db())?))
    }

    pub fn credentials(&self) -> CredentialStore {
        CredentialStore::in_dir(self.paths.root())
    }

    /// Stable id of this device, generated on first use.
    pub fn device_id(&self) -> Result<String> {
        Ok(trail_core::identity::device_id(self.paths.root())?)
    }

    pub fn auth_client(&self) -> Result<AuthClient> {
        AuthClient::new(&self.config.server_url, self.config.http_timeouts())
    }

    /// Connectivity monitor probing the collector over TCP.
    pub fn monitor(&self) -> Result<Arc<ConnectivityMonitor>> {
        let probe = TcpProbe::new(self.config.probe_addr()?, self.config.probe_timeout());
        Ok(Arc::new(ConnectivityMonitor::new(
            Arc::new(probe),
            MonitorConfig {
                poll_interval: self.config.poll_interval(),
            },
        )))
    }

    /// Sync engine delivering over HTTP. Must be called inside a runtime.
    pub fn engine(
        &self,
        queue: Arc<PersistentQueue>,
        connectivity: Arc<dyn Connectivity>,
    ) -> Result<SyncEngine<HttpSink>> {
        let sink = HttpSink::new(&self.config.server_url, self.config.http_timeouts())?;
        let tokens: Arc<dyn TokenSource> = Arc::new(self.credentials());
        Ok(SyncEngine::new(
            queue,
            sink,
            tokens,
            connectivity,
            SyncEngineConfig {
                endpoint_prefix: self.config.data_prefix.clone(),
            },
        ))
    }
}

/// Build the Tokio runtime for commands that touch the network.
pub fn runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?)
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
