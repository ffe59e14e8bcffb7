//! In-memory service registry
//!
//! Implements both [`Discovery`] (connecting to the registry) and
//! [`ServiceLocator`] (resolving a record). Per-name [`LookupPolicy`] lets
//! simulations and tests inject latency and failures.

use async_trait::async_trait;
use log::{debug, warn};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use trader_core::{ServiceRecord, ServiceRequest};
use trader_ports::{Discovery, ServiceHandle, ServiceLocator, TraderError, TraderResult};

use crate::error::GatewayError;

/// How lookups for one service name behave
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupPolicy {
    /// Time before the lookup completes
    pub latency: Duration,
    /// Complete with this error instead of resolving
    pub failure: Option<TraderError>,
}

impl LookupPolicy {
    pub fn delayed(latency: Duration) -> Self {
        Self {
            latency,
            failure: None,
        }
    }

    pub fn failing(latency: Duration, error: TraderError) -> Self {
        Self {
            latency,
            failure: Some(error),
        }
    }
}

struct Entry {
    record: ServiceRecord,
    handle: ServiceHandle,
}

#[derive(Default)]
struct RegistryState {
    entries: Vec<Entry>,
    /// Keyed by lowercase service name
    policies: HashMap<String, LookupPolicy>,
    unavailable: Option<String>,
    connect_latency: Duration,
}

/// In-memory service registry
///
/// Clones share state, so a trader holding a connected locator sees later
/// publications.
#[derive(Clone, Default)]
pub struct LocalRegistry {
    state: Arc<RwLock<RegistryState>>,
}

impl LocalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a service. The record's kind must match the handle's kind and
    /// the name must not already be taken for that kind.
    pub fn publish(&self, record: ServiceRecord, handle: ServiceHandle) -> Result<(), GatewayError> {
        if record.kind != handle.kind() {
            return Err(GatewayError::KindMismatch {
                name: record.name,
                declared: record.kind,
                actual: handle.kind(),
            });
        }

        let mut state = self.state.write();
        let request = ServiceRequest::new(record.name.clone(), record.kind);
        if state.entries.iter().any(|e| request.matches(&e.record)) {
            return Err(GatewayError::AlreadyPublished(record.name));
        }

        debug!("Publishing service {}", request);
        state.entries.push(Entry { record, handle });
        Ok(())
    }

    /// Remove every record with this name. Returns how many were removed.
    pub fn unpublish(&self, name: &str) -> usize {
        let mut state = self.state.write();
        let before = state.entries.len();
        state
            .entries
            .retain(|e| !e.record.name.eq_ignore_ascii_case(name));
        before - state.entries.len()
    }

    /// Published records
    pub fn records(&self) -> Vec<ServiceRecord> {
        self.state
            .read()
            .entries
            .iter()
            .map(|e| e.record.clone())
            .collect()
    }

    /// Set the lookup policy for a service name
    pub fn set_policy(&self, name: &str, policy: LookupPolicy) {
        self.state
            .write()
            .policies
            .insert(name.to_ascii_lowercase(), policy);
    }

    /// Make `connect` fail with [`TraderError::RegistryUnavailable`]
    pub fn set_unavailable(&self, reason: impl Into<String>) {
        self.state.write().unavailable = Some(reason.into());
    }

    pub fn set_available(&self) {
        self.state.write().unavailable = None;
    }

    pub fn set_connect_latency(&self, latency: Duration) {
        self.state.write().connect_latency = latency;
    }

    fn policy_for(&self, name: &str) -> LookupPolicy {
        self.state
            .read()
            .policies
            .get(&name.to_ascii_lowercase())
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl ServiceLocator for LocalRegistry {
    async fn lookup(&self, request: &ServiceRequest) -> TraderResult<ServiceHandle> {
        let policy = self.policy_for(&request.name);
        if !policy.latency.is_zero() {
            tokio::time::sleep(policy.latency).await;
        }

        if let Some(error) = policy.failure {
            warn!("Lookup for {} failed: {}", request, error);
            return Err(error);
        }

        let state = self.state.read();
        state
            .entries
            .iter()
            .find(|e| request.matches(&e.record))
            .map(|e| e.handle.clone())
            .ok_or_else(|| TraderError::service_not_found(request.name.clone(), request.kind))
    }
}

#[async_trait]
impl Discovery for LocalRegistry {
    async fn connect(&self) -> TraderResult<Arc<dyn ServiceLocator>> {
        let latency = self.state.read().connect_latency;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        if let Some(reason) = self.state.read().unavailable.clone() {
            return Err(TraderError::RegistryUnavailable(reason));
        }
        Ok(Arc::new(self.clone()))
    }
}
