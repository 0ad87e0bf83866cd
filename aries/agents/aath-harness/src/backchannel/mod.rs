pub mod http;

use std::fmt;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{HarnessError, HarnessErrorKind, HarnessResult};

pub const TOPIC_PROOF_V2: &str = "proof-v2";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ProofOperation {
    SendProposal,
    SendRequest,
    CreateSendConnectionlessRequest,
    SendPresentation,
    VerifyPresentation,
}

impl ProofOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            ProofOperation::SendProposal => "send-proposal",
            ProofOperation::SendRequest => "send-request",
            ProofOperation::CreateSendConnectionlessRequest => {
                "create-send-connectionless-request"
            }
            ProofOperation::SendPresentation => "send-presentation",
            ProofOperation::VerifyPresentation => "verify-presentation",
        }
    }
}

impl fmt::Display for ProofOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// States a present-proof v2 exchange reports through a backchannel.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProofState {
    ProposalSent,
    ProposalReceived,
    RequestSent,
    RequestReceived,
    PresentationSent,
    PresentationReceived,
    Done,
    Abandoned,
}

impl ProofState {
    pub fn as_str(self) -> &'static str {
        match self {
            ProofState::ProposalSent => "proposal-sent",
            ProofState::ProposalReceived => "proposal-received",
            ProofState::RequestSent => "request-sent",
            ProofState::RequestReceived => "request-received",
            ProofState::PresentationSent => "presentation-sent",
            ProofState::PresentationReceived => "presentation-received",
            ProofState::Done => "done",
            ProofState::Abandoned => "abandoned",
        }
    }
}

impl fmt::Display for ProofState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of a backchannel command, `{"id": ..., "data": ...}`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BackchannelCommand {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl BackchannelCommand {
    pub fn with_data(data: Value) -> Self {
        Self {
            id: None,
            data: Some(data),
        }
    }

    pub fn with_id(id: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            data: None,
        }
    }

    pub fn with_id_and_data(id: &str, data: Value) -> Self {
        Self {
            id: Some(id.to_string()),
            data: Some(data),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackchannelResponse {
    pub status: u16,
    pub body: String,
}

impl BackchannelResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Fails unless the backchannel answered 200, carrying status and body in the error.
    pub fn ensure_ok(self) -> HarnessResult<Self> {
        match self.status {
            200 => Ok(self),
            status => Err(HarnessError::from_msg(
                HarnessErrorKind::UnexpectedResponse,
                format!("resp_status {status} is not 200; {}", self.body),
            )),
        }
    }

    pub fn json<T: DeserializeOwned>(&self) -> HarnessResult<T> {
        serde_json::from_str(&self.body).map_err(|err| {
            HarnessError::from_msg(
                HarnessErrorKind::UnexpectedResponse,
                format!("Backchannel response {:?} is not the expected JSON: {err}", self.body),
            )
        })
    }
}

/// Fields of a present-proof command response the harness looks at.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct ExchangeResponse {
    pub state: String,
    #[serde(default)]
    pub thread_id: Option<String>,
    #[serde(default)]
    pub presentation_exchange_id: Option<String>,
    #[serde(default)]
    pub verified: Option<Value>,
}

impl ExchangeResponse {
    pub fn expect_state(&self, expected: ProofState) -> HarnessResult<()> {
        soft_assert_eq!(
            self.state.as_str(),
            expected.as_str(),
            "unexpected exchange state in command response"
        );
        Ok(())
    }

    /// `verified` as the `"true"`/`"false"` string the harness stores.
    pub fn verified(&self) -> HarnessResult<String> {
        match &self.verified {
            Some(Value::String(verified)) => Ok(verified.clone()),
            Some(Value::Bool(verified)) => Ok(verified.to_string()),
            other => Err(HarnessError::from_msg(
                HarnessErrorKind::UnexpectedResponse,
                format!("verify-presentation response has no usable verified field: {other:?}"),
            )),
        }
    }
}

/// Transport to an agent-under-test backchannel.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Backchannel: Send + Sync {
    async fn post_command(
        &self,
        agent: &Url,
        topic: &str,
        operation: &str,
        command: &BackchannelCommand,
    ) -> HarnessResult<BackchannelResponse>;

    /// Waits until the agent reports `state` for the exchange `thread_id`.
    async fn expected_agent_state(
        &self,
        agent: &Url,
        topic: &str,
        thread_id: &str,
        state: ProofState,
    ) -> HarnessResult<bool>;
}
