use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use serde_json::Value;

use crate::{
    correlator::PresentationExchange,
    error::{HarnessError, HarnessErrorKind, HarnessResult},
    format::CredentialFormat,
    timestamp::NonRevokedInterval,
};

pub const TAG_CRED_PROPOSAL_START: &str = "CredProposalStart";
pub const TAG_PROOF_TYPE_PREFIX: &str = "ProofType_";

/// Credential ids issued during a scenario, per credential type, in issuance order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CredentialIdRegistry(HashMap<String, Vec<String>>);

impl CredentialIdRegistry {
    pub fn record(&mut self, cred_type_name: &str, credential_id: &str) {
        self.0
            .entry(cred_type_name.to_string())
            .or_default()
            .push(credential_id.to_string());
    }

    /// The most recently issued credential id of `cred_type_name`.
    pub fn latest(&self, cred_type_name: &str) -> HarnessResult<&str> {
        self.0
            .get(cred_type_name)
            .and_then(|ids| ids.last())
            .map(String::as_str)
            .ok_or_else(|| {
                HarnessError::from_msg(
                    HarnessErrorKind::MissingContext,
                    format!("No credential of type {cred_type_name} was issued in this scenario"),
                )
            })
    }

    pub fn issued(&self, cred_type_name: &str) -> &[String] {
        self.0.get(cred_type_name).map_or(&[], Vec::as_slice)
    }
}

/// Pairwise connection ids keyed by (initiator, counterpart) agent name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConnectionRegistry(HashMap<String, HashMap<String, String>>);

impl ConnectionRegistry {
    pub fn insert(&mut self, initiator: &str, counterpart: &str, connection_id: &str) {
        self.0
            .entry(initiator.to_string())
            .or_default()
            .insert(counterpart.to_string(), connection_id.to_string());
    }

    pub fn get(&self, initiator: &str, counterpart: &str) -> Option<&str> {
        self.0
            .get(initiator)
            .and_then(|connections| connections.get(counterpart))
            .map(String::as_str)
    }

    pub fn contains(&self, initiator: &str, counterpart: &str) -> bool {
        self.get(initiator, counterpart).is_some()
    }

    pub fn connection_id(&self, initiator: &str, counterpart: &str) -> HarnessResult<&str> {
        self.get(initiator, counterpart).ok_or_else(|| {
            HarnessError::from_msg(
                HarnessErrorKind::MissingContext,
                format!("No connection established between {initiator} and {counterpart}"),
            )
        })
    }
}

/// Data that lives for the whole scenario.
#[derive(Clone, Debug, Default)]
pub struct Registries {
    pub schemas: IndexMap<String, Value>,
    pub support_revocation: HashMap<String, bool>,
    pub credential_data: HashMap<String, Value>,
    pub credential_ids: CredentialIdRegistry,
    pub connections: ConnectionRegistry,
    pub verifications: HashMap<String, String>,
}

/// Data of the exchange (issuance or presentation) currently in flight.
#[derive(Clone, Debug, Default)]
pub struct ExchangeState {
    pub cred_format: Option<CredentialFormat>,
    pub connectionless: bool,
    pub support_revocation: bool,
    pub non_revoked: Option<NonRevokedInterval>,
    pub schema: Option<Value>,
    pub credential_data: Option<Value>,
    pub presentation: PresentationExchange,
}

impl ExchangeState {
    pub fn cred_format(&self) -> HarnessResult<CredentialFormat> {
        self.cred_format.ok_or_else(|| {
            HarnessError::from_msg(
                HarnessErrorKind::MissingContext,
                "No credential format selected for this scenario",
            )
        })
    }
}

/// Mutable state of one scenario, passed by reference through every step.
#[derive(Clone, Debug, Default)]
pub struct ScenarioContext {
    pub tags: HashSet<String>,
    pub registries: Registries,
    pub exchange: ExchangeState,
}

impl ScenarioContext {
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Value of the first tag starting with `prefix`, with the prefix stripped.
    pub fn tag_value(&self, prefix: &str) -> Option<&str> {
        self.tags.iter().find_map(|tag| tag.strip_prefix(prefix))
    }

    pub fn register_schema(&mut self, name: &str, schema: Value, support_revocation: bool) {
        self.registries.schemas.insert(name.to_string(), schema);
        self.registries
            .support_revocation
            .insert(name.to_string(), support_revocation);
    }

    pub fn schema_names(&self) -> Vec<String> {
        self.registries.schemas.keys().cloned().collect()
    }
}
