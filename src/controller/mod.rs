//! Snapshot sources.
//!
//! A source produces the current AP list. The production source is the
//! ArubaOS 8 REST client in `client`; tests substitute their own.

pub mod client;

use thiserror::Error;

use crate::snapshot::ApRecord;

pub use client::{BssEntry, ControllerClient, LldpNeighbor};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("invalid controller url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("request to {endpoint} failed: {source}")]
    Http {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("login failed: {0}")]
    Auth(String),

    #[error("unexpected response from {endpoint}: {reason}")]
    UnexpectedPayload { endpoint: String, reason: String },

    #[error("{operation} is not available on a {kind}")]
    Unsupported {
        operation: &'static str,
        kind: &'static str,
    },
}

/// Anything that can report the controller's AP database.
pub trait SnapshotSource {
    fn name(&self) -> &str;
    fn fetch_ap_database(&mut self) -> Result<Vec<ApRecord>, SourceError>;
}

/// Management node flavour. Only a named controller exposes the BSS table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerKind {
    Conductor,
    Controller { name: String },
}

impl ControllerKind {
    pub fn label(&self) -> &'static str {
        match self {
            ControllerKind::Conductor => "conductor",
            ControllerKind::Controller { .. } => "controller",
        }
    }

    pub fn supports_bss_table(&self) -> bool {
        matches!(self, ControllerKind::Controller { .. })
    }

    /// REST base for a named controller: `https://<name>:4343/v1`.
    pub fn controller_url(name: &str) -> String {
        format!("https://{name}:4343/v1")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_named_controller_has_bss_table() {
        assert!(!ControllerKind::Conductor.supports_bss_table());
        assert!(ControllerKind::Controller { name: "mc1".into() }.supports_bss_table());
    }

    #[test]
    fn controller_url_uses_rest_port() {
        assert_eq!(
            ControllerKind::controller_url("mc1.example.net"),
            "https://mc1.example.net:4343/v1"
        );
    }
}
