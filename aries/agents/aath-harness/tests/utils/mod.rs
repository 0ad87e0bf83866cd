#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use aath_harness::{
    backchannel::{Backchannel, BackchannelCommand, BackchannelResponse, ProofState},
    context::ScenarioContext,
    error::{HarnessError, HarnessErrorKind, HarnessResult},
    format::CredentialFormat,
    harness::Harness,
    steps::setup::SetupSteps,
    HarnessConfig,
};
use async_trait::async_trait;
use reqwest::Url;
use serde_json::{json, Value};

pub const ISSUER: &str = "Acme";
pub const PROVER: &str = "Bob";
pub const VERIFIER: &str = "Faber";

pub const AGENTS: [(&str, &str); 3] = [
    (ISSUER, "http://0.0.0.0:9020"),
    (PROVER, "http://0.0.0.0:9030"),
    (VERIFIER, "http://0.0.0.0:9040"),
];

pub type FakeHarness = Harness<FakeBackchannel, FakeSetupSteps>;

#[derive(Clone, Debug)]
pub struct RecordedCommand {
    pub agent: String,
    pub topic: String,
    pub operation: String,
    pub command: BackchannelCommand,
}

#[derive(Debug, Default)]
struct AgentNetwork {
    names: HashMap<String, String>,
    states: HashMap<(String, String), ProofState>,
    commands: Vec<RecordedCommand>,
    exchanges: usize,
    verified: Option<Value>,
}

impl AgentNetwork {
    fn next_thread(&mut self) -> (String, String) {
        self.exchanges += 1;
        (
            format!("thread-{}", self.exchanges),
            format!("pres-ex-{}", self.exchanges),
        )
    }

    fn peer_of(&self, connection_id: &str) -> Option<String> {
        let (_, peer) = connection_id.split_once("-to-")?;
        self.names.get(peer).cloned()
    }

    fn answer(&mut self, agent: &str, operation: &str, command: &BackchannelCommand) -> Value {
        let data = command.data.clone().unwrap_or(Value::Null);
        let connection_id = data["presentation_proposal"]["connection_id"]
            .as_str()
            .map(str::to_string);
        match operation {
            "send-proposal" => {
                let (thread_id, _) = self.next_thread();
                self.set(agent, &thread_id, ProofState::ProposalSent);
                if let Some(verifier) = connection_id.and_then(|id| self.peer_of(&id)) {
                    self.set(&verifier, &thread_id, ProofState::ProposalReceived);
                }
                json!({"state": "proposal-sent", "thread_id": thread_id})
            }
            "send-request" => {
                let thread_id = match &command.id {
                    Some(thread_id) => thread_id.clone(),
                    None => self.next_thread().0,
                };
                self.set(agent, &thread_id, ProofState::RequestSent);
                if let Some(prover) = connection_id.and_then(|id| self.peer_of(&id)) {
                    self.set(&prover, &thread_id, ProofState::RequestReceived);
                }
                json!({"state": "request-sent", "thread_id": thread_id})
            }
            "create-send-connectionless-request" => {
                let (thread_id, presentation_exchange_id) = self.next_thread();
                self.set(agent, &thread_id, ProofState::RequestSent);
                json!({
                    "state": "request-sent",
                    "thread_id": thread_id,
                    "presentation_exchange_id": presentation_exchange_id
                })
            }
            "send-presentation" => {
                let thread_id = command.id.clone().unwrap_or_default();
                self.set(agent, &thread_id, ProofState::PresentationSent);
                let verifier = self
                    .states
                    .keys()
                    .find(|(owner, thread)| *thread == thread_id && owner != agent)
                    .map(|(owner, _)| owner.clone())
                    .or_else(|| {
                        data["~service"]["serviceEndpoint"]
                            .as_str()
                            .map(str::to_string)
                    });
                if let Some(verifier) = verifier {
                    self.set(&verifier, &thread_id, ProofState::PresentationReceived);
                }
                json!({"state": "presentation-sent", "thread_id": thread_id})
            }
            "verify-presentation" => {
                let thread_id = command.id.clone().unwrap_or_default();
                let participants: Vec<String> = self
                    .states
                    .keys()
                    .filter(|(_, thread)| *thread == thread_id)
                    .map(|(owner, _)| owner.clone())
                    .collect();
                for owner in participants {
                    self.set(&owner, &thread_id, ProofState::Done);
                }
                let mut response = json!({"state": "done", "thread_id": thread_id});
                if let Some(verified) = &self.verified {
                    response["verified"] = verified.clone();
                }
                response
            }
            _ => Value::Null,
        }
    }

    fn set(&mut self, agent: &str, thread_id: &str, state: ProofState) {
        self.states
            .insert((normalize(agent), thread_id.to_string()), state);
    }
}

fn normalize(agent: &str) -> String {
    agent.trim_end_matches('/').to_string()
}

/// In-memory stand-in for the backchannels of the agents listed in [`AGENTS`].
#[derive(Clone, Debug, Default)]
pub struct FakeBackchannel {
    network: Arc<Mutex<AgentNetwork>>,
}

impl FakeBackchannel {
    pub fn new() -> Self {
        let backchannel = Self::default();
        backchannel.network.lock().unwrap().names = AGENTS
            .iter()
            .map(|(name, url)| (name.to_string(), url.to_string()))
            .collect();
        backchannel
    }

    /// `verified` field the verifier reports on `verify-presentation`.
    pub fn report_verified(&self, verified: Value) {
        self.network.lock().unwrap().verified = Some(verified);
    }

    pub fn verifying(self, verified: Value) -> Self {
        self.report_verified(verified);
        self
    }

    pub fn commands(&self) -> Vec<RecordedCommand> {
        self.network.lock().unwrap().commands.clone()
    }

    pub fn command(&self, operation: &str) -> RecordedCommand {
        self.commands()
            .into_iter()
            .rev()
            .find(|recorded| recorded.operation == operation)
            .unwrap_or_else(|| panic!("no {operation} command was sent"))
    }
}

#[async_trait]
impl Backchannel for FakeBackchannel {
    async fn post_command(
        &self,
        agent: &Url,
        topic: &str,
        operation: &str,
        command: &BackchannelCommand,
    ) -> HarnessResult<BackchannelResponse> {
        let mut network = self.network.lock().unwrap();
        let agent = normalize(agent.as_str());
        network.commands.push(RecordedCommand {
            agent: agent.clone(),
            topic: topic.to_string(),
            operation: operation.to_string(),
            command: command.clone(),
        });
        match network.answer(&agent, operation, command) {
            Value::Null => Ok(BackchannelResponse::new(
                404,
                format!("{operation} is not supported"),
            )),
            body => Ok(BackchannelResponse::new(200, body.to_string())),
        }
    }

    async fn expected_agent_state(
        &self,
        agent: &Url,
        _topic: &str,
        thread_id: &str,
        state: ProofState,
    ) -> HarnessResult<bool> {
        let network = self.network.lock().unwrap();
        Ok(network
            .states
            .get(&(normalize(agent.as_str()), thread_id.to_string()))
            == Some(&state))
    }
}

/// Records the setup steps it is asked to run and fakes their effect on the context.
#[derive(Clone, Debug, Default)]
pub struct FakeSetupSteps {
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeSetupSteps {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl SetupSteps for FakeSetupSteps {
    async fn establish_connection(
        &self,
        ctx: &mut ScenarioContext,
        inviter: &str,
        invitee: &str,
    ) -> HarnessResult<()> {
        self.record(format!("connect {inviter} {invitee}"));
        let connections = &mut ctx.registries.connections;
        connections.insert(inviter, invitee, &format!("{inviter}-to-{invitee}"));
        connections.insert(invitee, inviter, &format!("{invitee}-to-{inviter}"));
        Ok(())
    }

    async fn prepare_issuer(
        &self,
        _ctx: &mut ScenarioContext,
        issuer: &str,
        format: CredentialFormat,
    ) -> HarnessResult<()> {
        self.record(format!("prepare {issuer} {format}"));
        Ok(())
    }

    async fn propose_credential(
        &self,
        _ctx: &mut ScenarioContext,
        holder: &str,
        issuer: &str,
        format: CredentialFormat,
        credential_data: &str,
    ) -> HarnessResult<()> {
        self.record(format!("propose {holder} {issuer} {format} {credential_data}"));
        Ok(())
    }

    async fn offer_credential(
        &self,
        ctx: &mut ScenarioContext,
        issuer: &str,
        format: CredentialFormat,
    ) -> HarnessResult<()> {
        if ctx.exchange.credential_data.is_none() {
            return Err(HarnessError::from_msg(
                HarnessErrorKind::MissingContext,
                "offer without credential data",
            ));
        }
        self.record(format!("offer {issuer} {format}"));
        Ok(())
    }

    async fn request_credential(
        &self,
        _ctx: &mut ScenarioContext,
        holder: &str,
        format: CredentialFormat,
    ) -> HarnessResult<()> {
        self.record(format!("request {holder} {format}"));
        Ok(())
    }

    async fn issue_credential(
        &self,
        _ctx: &mut ScenarioContext,
        issuer: &str,
        format: CredentialFormat,
    ) -> HarnessResult<()> {
        self.record(format!("issue {issuer} {format}"));
        Ok(())
    }

    async fn acknowledge_credential(
        &self,
        _ctx: &mut ScenarioContext,
        holder: &str,
        format: CredentialFormat,
    ) -> HarnessResult<()> {
        self.record(format!("ack {holder} {format}"));
        Ok(())
    }

    async fn assert_credential_issued(
        &self,
        ctx: &mut ScenarioContext,
        holder: &str,
        format: CredentialFormat,
    ) -> HarnessResult<()> {
        let schema_name = ctx
            .exchange
            .schema
            .as_ref()
            .and_then(|schema| schema["schema_name"].as_str())
            .map(str::to_string)
            .ok_or_else(|| {
                HarnessError::from_msg(HarnessErrorKind::MissingContext, "no schema_name")
            })?;
        let issued = ctx.registries.credential_ids.issued(&schema_name).len();
        ctx.registries
            .credential_ids
            .record(&schema_name, &format!("cred-{schema_name}-{}", issued + 1));
        self.record(format!("issued {holder} {format}"));
        Ok(())
    }
}

pub fn test_config() -> HarnessConfig {
    AGENTS.iter().fold(
        HarnessConfig::new(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data")),
        |config, (name, url)| config.with_agent(name, url).unwrap(),
    )
}

pub fn fake_harness(backchannel: FakeBackchannel) -> (FakeHarness, FakeSetupSteps) {
    let setup = FakeSetupSteps::default();
    let harness = Harness::new(test_config(), backchannel, setup.clone());
    (harness, setup)
}

/// Scenario tagged with the driver's license schema and the given tags.
pub fn scenario_context(tags: &[&str], support_revocation: bool) -> ScenarioContext {
    let mut ctx = ScenarioContext::new(tags.iter().copied());
    ctx.register_schema(
        "Schema_DriversLicense_v2",
        json!({
            "schema_name": "Schema_DriversLicense_v2",
            "schema_version": "1.0.1",
            "attributes": ["address", "DL_number", "expiry", "age"]
        }),
        support_revocation,
    );
    ctx
}
