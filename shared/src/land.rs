use serde::{Deserialize, Serialize};

/// Owner address the platform reserves for lands nobody has claimed yet.
pub const UNCLAIMED_OWNER: &str = "0x0000000000000000000000000000000000000000";

pub type LandCollection = Vec<LandRecord>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandRecord {
    pub id: u32,
    #[serde(default)]
    pub owner_address: Option<String>,
    #[serde(default)]
    pub resources: Vec<ResourceEntry>,
}

impl LandRecord {
    pub fn unclaimed(id: u32) -> Self {
        Self {
            id,
            owner_address: None,
            resources: Vec::new(),
        }
    }

    pub fn owned_by(id: u32, owner: impl Into<String>) -> Self {
        Self {
            id,
            owner_address: Some(owner.into()),
            resources: Vec::new(),
        }
    }

    /// True when no owner is recorded or the owner is the reserved address.
    pub fn is_unclaimed(&self) -> bool {
        match self.owner_address.as_deref() {
            None => true,
            Some(addr) => addr.trim().is_empty() || same_address(addr, UNCLAIMED_OWNER),
        }
    }

    /// Owner address normalized for comparison, `None` when unclaimed.
    pub fn normalized_owner(&self) -> Option<String> {
        if self.is_unclaimed() {
            return None;
        }
        self.owner_address.as_deref().map(normalize_address)
    }

    /// A land produces while at least one of its resources is staked.
    pub fn is_producing(&self) -> bool {
        self.resources.iter().any(|r| r.staked)
    }

    /// Total hourly output of the staked resources.
    pub fn staked_rate(&self) -> u64 {
        self.resources
            .iter()
            .filter(|r| r.staked)
            .map(|r| r.rate as u64)
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Wood,
    Stone,
    Iron,
    Gold,
    Food,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceEntry {
    pub kind: ResourceKind,
    /// Units produced per hour while staked.
    #[serde(default)]
    pub rate: u32,
    #[serde(default)]
    pub staked: bool,
}

/// Wallet addresses are hex; compare them case-insensitively.
pub fn normalize_address(addr: &str) -> String {
    addr.trim().to_ascii_lowercase()
}

pub fn same_address(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}
