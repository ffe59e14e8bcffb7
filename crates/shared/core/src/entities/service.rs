//! Service discovery records and lookup criteria

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Kind of capability a registry record exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceKind {
    /// Remote-call proxy (e.g. the portfolio ledger)
    RpcProxy,
    /// Push source of messages (e.g. the market-data feed)
    StreamSource,
}

impl ServiceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RpcProxy => "rpc-proxy",
            Self::StreamSource => "stream-source",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed lookup criteria: logical service name plus kind
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub name: String,
    pub kind: ServiceKind,
}

impl ServiceRequest {
    pub fn new(name: impl Into<String>, kind: ServiceKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn rpc_proxy(name: impl Into<String>) -> Self {
        Self::new(name, ServiceKind::RpcProxy)
    }

    pub fn stream_source(name: impl Into<String>) -> Self {
        Self::new(name, ServiceKind::StreamSource)
    }

    /// Name matches ignoring ASCII case, kind must be equal
    pub fn matches(&self, record: &ServiceRecord) -> bool {
        self.kind == record.kind && self.name.eq_ignore_ascii_case(&record.name)
    }
}

impl fmt::Display for ServiceRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.kind)
    }
}

/// Metadata a registry publishes for one service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub name: String,
    pub kind: ServiceKind,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl ServiceRecord {
    pub fn new(name: impl Into<String>, kind: ServiceKind) -> Self {
        Self {
            name: name.into(),
            kind,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_matches_case_insensitive_name() {
        let record = ServiceRecord::new("Portfolio", ServiceKind::RpcProxy);
        assert!(ServiceRequest::rpc_proxy("portfolio").matches(&record));
        assert!(ServiceRequest::rpc_proxy("PORTFOLIO").matches(&record));
        assert!(!ServiceRequest::rpc_proxy("portfolios").matches(&record));
    }

    #[test]
    fn test_request_requires_same_kind() {
        let record = ServiceRecord::new("market-data", ServiceKind::StreamSource);
        assert!(ServiceRequest::stream_source("market-data").matches(&record));
        assert!(!ServiceRequest::rpc_proxy("market-data").matches(&record));
    }

    #[test]
    fn test_display() {
        let request = ServiceRequest::stream_source("market-data");
        assert_eq!(request.to_string(), "market-data (stream-source)");
    }
}
