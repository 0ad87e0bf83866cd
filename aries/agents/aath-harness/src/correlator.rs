use crate::{
    backchannel::ExchangeResponse,
    error::{HarnessError, HarnessErrorKind, HarnessResult},
};

/// Identifiers of the one presentation exchange a scenario is currently driving.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PresentationExchange {
    verifier: Option<String>,
    prover: Option<String>,
    thread_id: Option<String>,
    presentation_exchange_id: Option<String>,
    proposal_pending: bool,
}

fn missing(what: &str) -> HarnessError {
    HarnessError::from_msg(
        HarnessErrorKind::MissingContext,
        format!("No {what} recorded for the current presentation exchange"),
    )
}

impl PresentationExchange {
    /// Starts an exchange from the prover's proposal; the verifier's request must reuse its thread.
    pub fn begin_with_proposal(&mut self, prover: &str, verifier: &str, thread_id: &str) {
        *self = Self {
            verifier: Some(verifier.to_string()),
            prover: Some(prover.to_string()),
            thread_id: Some(thread_id.to_string()),
            presentation_exchange_id: None,
            proposal_pending: true,
        };
    }

    /// Thread of a proposal from `prover` to `verifier` that has not been answered yet.
    pub fn pending_proposal(&self, verifier: &str, prover: &str) -> Option<&str> {
        match self.proposal_pending
            && self.verifier.as_deref() == Some(verifier)
            && self.prover.as_deref() == Some(prover)
        {
            true => self.thread_id.as_deref(),
            false => None,
        }
    }

    /// Records the identifiers returned by the verifier's initial request command.
    pub fn begin(
        &mut self,
        verifier: &str,
        prover: &str,
        response: &ExchangeResponse,
        connectionless: bool,
    ) -> HarnessResult<()> {
        let thread_id = response
            .thread_id
            .clone()
            .ok_or_else(|| {
                HarnessError::from_msg(
                    HarnessErrorKind::UnexpectedResponse,
                    format!("Presentation request response carries no thread_id: {response:?}"),
                )
            })?;
        if let Some(proposal_thread_id) = self.pending_proposal(verifier, prover) {
            soft_assert_eq!(
                thread_id.as_str(),
                proposal_thread_id,
                "request must continue the proposal thread"
            );
        }
        let presentation_exchange_id = match connectionless {
            true => Some(response.presentation_exchange_id.clone().ok_or_else(|| {
                HarnessError::from_msg(
                    HarnessErrorKind::UnexpectedResponse,
                    format!(
                        "Connectionless request response carries no presentation_exchange_id: \
                         {response:?}"
                    ),
                )
            })?),
            false => None,
        };
        *self = Self {
            verifier: Some(verifier.to_string()),
            prover: Some(prover.to_string()),
            thread_id: Some(thread_id),
            presentation_exchange_id,
            proposal_pending: false,
        };
        Ok(())
    }

    pub fn thread_id(&self) -> HarnessResult<&str> {
        self.thread_id
            .as_deref()
            .ok_or_else(|| missing("presentation thread id"))
    }

    pub fn presentation_exchange_id(&self) -> HarnessResult<&str> {
        self.presentation_exchange_id
            .as_deref()
            .ok_or_else(|| missing("presentation exchange id"))
    }

    pub fn verifier(&self) -> HarnessResult<&str> {
        self.verifier.as_deref().ok_or_else(|| missing("verifier"))
    }
}
