pub mod issuance;
pub mod presentation;
pub mod setup;

use crate::{
    backchannel::{
        Backchannel, BackchannelCommand, ExchangeResponse, ProofOperation, ProofState,
        TOPIC_PROOF_V2,
    },
    error::{HarnessError, HarnessErrorKind, HarnessResult},
    harness::Harness,
    steps::setup::SetupSteps,
};

impl<B: Backchannel, S: SetupSteps> Harness<B, S> {
    /// Sends a `proof-v2` command and requires an HTTP 200 answer.
    pub(crate) async fn post_proof_command(
        &self,
        agent_name: &str,
        operation: ProofOperation,
        command: &BackchannelCommand,
    ) -> HarnessResult<ExchangeResponse> {
        let agent = self.config.agent_url(agent_name)?;
        let response = self
            .backchannel
            .post_command(agent, TOPIC_PROOF_V2, operation.as_str(), command)
            .await?
            .ensure_ok()
            .map_err(|err| err.extend(format!("{agent_name} failed {operation}")))?;
        response.json()
    }

    pub(crate) async fn expect_proof_state(
        &self,
        agent_name: &str,
        thread_id: &str,
        state: ProofState,
    ) -> HarnessResult<()> {
        let agent = self.config.agent_url(agent_name)?;
        match self
            .backchannel
            .expected_agent_state(agent, TOPIC_PROOF_V2, thread_id, state)
            .await?
        {
            true => Ok(()),
            false => Err(HarnessError::from_msg(
                HarnessErrorKind::UnexpectedState,
                format!("{agent_name} did not reach {TOPIC_PROOF_V2} state {state} for thread {thread_id}"),
            )),
        }
    }
}
