//! Search scope and filter contract.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::entity::NetworkId;

/// Which networks a search targets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkScope {
    /// The configured default network.
    #[default]
    Default,
    /// An explicit set of networks. May be empty after invalid ids were dropped.
    Explicit(Vec<NetworkId>),
    /// Every network the registry has an adapter for.
    All,
}

impl NetworkScope {
    pub fn explicit<I>(ids: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<NetworkId>,
    {
        NetworkScope::Explicit(ids.into_iter().map(Into::into).collect())
    }

    /// Parse caller-supplied network arguments.
    ///
    /// No arguments selects the default network and the literal `all` selects
    /// every configured network. Entries that are not numeric chain ids are
    /// dropped, so a list of only invalid entries yields an empty explicit scope.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Self {
        if args.is_empty() {
            return NetworkScope::Default;
        }
        if args
            .iter()
            .any(|a| a.as_ref().trim().eq_ignore_ascii_case("all"))
        {
            return NetworkScope::All;
        }
        let mut ids = Vec::with_capacity(args.len());
        for arg in args {
            match arg.as_ref().parse::<NetworkId>() {
                Ok(id) => ids.push(id),
                Err(_) => warn!(network = %arg.as_ref(), "ignoring invalid network id"),
            }
        }
        NetworkScope::Explicit(ids)
    }
}

/// Entity filters. Every field is optional; an unset field or empty list means
/// no constraint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchParams {
    pub networks: NetworkScope,
    /// Case-insensitive substring match on the display name.
    pub name: Option<String>,
    /// Restrict to these local ids.
    pub ids: Vec<String>,
    pub mcp: Option<bool>,
    pub a2a: Option<bool>,
    /// Exact, case-insensitive.
    pub ens: Option<String>,
    /// Exact, case-insensitive.
    pub did: Option<String>,
    /// Exact, case-insensitive.
    pub wallet_address: Option<String>,
    pub supported_trusts: Vec<String>,
    pub a2a_skills: Vec<String>,
    pub mcp_tools: Vec<String>,
    pub mcp_prompts: Vec<String>,
    pub mcp_resources: Vec<String>,
    pub active: Option<bool>,
    pub x402_support: Option<bool>,
    /// Matches when any listed owner owns the record.
    pub owners: Vec<String>,
    /// Matches when any listed operator operates the record.
    pub operators: Vec<String>,
}

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_networks(mut self, networks: NetworkScope) -> Self {
        self.networks = networks;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_a2a_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.a2a_skills = skills.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }
}
