use crate::foundation::UtxoError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kaspa network variant. Routes to the matching public REST endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    pub fn api_base_url(&self) -> &'static str {
        match self {
            Network::Mainnet => "https://api.kaspa.org",
            Network::Testnet => "https://api-tn10.kaspa.org",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = UtxoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            other => Err(UtxoError::ParseError(format!("unknown network: {}", other))),
        }
    }
}

/// Globally unique identity of a UTXO.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Outpoint {
    /// 64-char hex transaction id.
    pub transaction_id: String,
    pub index: u32,
}

impl Outpoint {
    pub fn new(transaction_id: impl Into<String>, index: u32) -> Self {
        Self { transaction_id: transaction_id.into(), index }
    }

    /// Canonical `"{transaction_id}:{index}"` key used by the lock table
    /// and for cache-entry equality.
    pub fn key(&self) -> String {
        format!("{}:{}", self.transaction_id, self.index)
    }
}

impl fmt::Display for Outpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.transaction_id, self.index)
    }
}
