use typed_builder::TypedBuilder;

use crate::{
    backchannel::{Backchannel, BackchannelCommand, ProofOperation, ProofState},
    context::ScenarioContext,
    error::{HarnessError, HarnessErrorKind, HarnessResult},
    harness::Harness,
    steps::setup::SetupSteps,
    timestamp::{now_epoch, NonRevokedInterval},
};

/// Parameters of one complete present-proof v2 scenario outline row.
#[derive(Clone, Debug, TypedBuilder)]
pub struct ProofScenario {
    #[builder(setter(into))]
    pub issuer: String,
    #[builder(setter(into))]
    pub prover: String,
    #[builder(setter(into))]
    pub verifier: String,
    #[builder(setter(into))]
    pub credential_data: String,
    #[builder(setter(into))]
    pub request_for_proof: String,
    #[builder(setter(into))]
    pub presentation: String,
    #[builder(default, setter(into, strip_option))]
    pub proposal: Option<String>,
    #[builder(default)]
    pub connectionless: bool,
}

impl<B: Backchannel, S: SetupSteps> Harness<B, S> {
    /// Non-revocation timeframe applied to the next Indy presentation request.
    pub fn set_non_revoked_interval(
        &self,
        ctx: &mut ScenarioContext,
        from: Option<&str>,
        to: &str,
    ) -> HarnessResult<()> {
        let interval = NonRevokedInterval::relative(from, to, now_epoch())?;
        debug!("presentation::set_non_revoked_interval >> {interval:?}");
        ctx.exchange.non_revoked = Some(interval);
        Ok(())
    }

    /// `"{verifier}" sends a {request_for_proof} presentation with formats to "{prover}"`
    pub async fn send_presentation_request(
        &self,
        ctx: &mut ScenarioContext,
        verifier: &str,
        request_for_proof: &str,
        prover: &str,
    ) -> HarnessResult<()> {
        info!(
            "presentation::send_presentation_request >> verifier: {verifier}, prover: {prover}, \
             request: {request_for_proof}"
        );
        let template = self.fixtures.request_for_proof(request_for_proof)?;
        let connectionless = ctx.exchange.connectionless;
        let (operation, connection_id) = match connectionless {
            true => (ProofOperation::CreateSendConnectionlessRequest, None),
            false => (
                ProofOperation::SendRequest,
                Some(
                    ctx.registries
                        .connections
                        .connection_id(verifier, prover)?
                        .to_string(),
                ),
            ),
        };
        let data = self
            .composer
            .presentation_request(ctx, template, connection_id.as_deref())?;
        debug!("presentation::send_presentation_request >> {data}");
        let command = match ctx.exchange.presentation.pending_proposal(verifier, prover) {
            Some(thread_id) => BackchannelCommand::with_id_and_data(thread_id, data),
            None => BackchannelCommand::with_data(data),
        };

        let response = self.post_proof_command(verifier, operation, &command).await?;
        response.expect_state(ProofState::RequestSent)?;
        ctx.exchange
            .presentation
            .begin(verifier, prover, &response, connectionless)?;

        // A connectionless prover only learns of the request through the presentation step.
        if !connectionless {
            let thread_id = ctx.exchange.presentation.thread_id()?;
            self.expect_proof_state(prover, thread_id, ProofState::RequestReceived)
                .await?;
        }
        Ok(())
    }

    /// `"{prover}" makes a {proposal} presentation proposal with formats to "{verifier}"`
    pub async fn send_presentation_proposal(
        &self,
        ctx: &mut ScenarioContext,
        prover: &str,
        proposal: &str,
        verifier: &str,
    ) -> HarnessResult<()> {
        info!(
            "presentation::send_presentation_proposal >> prover: {prover}, verifier: {verifier}, \
             proposal: {proposal}"
        );
        let template = self.fixtures.request_for_proof(proposal)?;
        let connection_id = ctx.registries.connections.connection_id(prover, verifier)?;
        let data = self
            .composer
            .presentation_proposal(ctx, template, connection_id)?;

        let response = self
            .post_proof_command(
                prover,
                ProofOperation::SendProposal,
                &BackchannelCommand::with_data(data),
            )
            .await?;
        response.expect_state(ProofState::ProposalSent)?;
        let thread_id = response.thread_id.ok_or_else(|| {
            HarnessError::from_msg(
                HarnessErrorKind::UnexpectedResponse,
                "Presentation proposal response carries no thread_id",
            )
        })?;
        ctx.exchange
            .presentation
            .begin_with_proposal(prover, verifier, &thread_id);
        self.expect_proof_state(verifier, &thread_id, ProofState::ProposalReceived)
            .await
    }

    /// `"{prover}" makes the {presentation} of the proof with formats`
    pub async fn make_presentation(
        &self,
        ctx: &mut ScenarioContext,
        prover: &str,
        presentation: &str,
    ) -> HarnessResult<()> {
        info!("presentation::make_presentation >> prover: {prover}, presentation: {presentation}");
        let template = self.fixtures.presentation(presentation)?;
        let mut data = self.composer.presentation(ctx, template, now_epoch())?;

        let exchange = &ctx.exchange.presentation;
        let thread_id = exchange.thread_id()?;
        let verifier = exchange.verifier()?;
        if ctx.exchange.connectionless {
            data = self.composer.with_service_decorator(
                data,
                exchange.presentation_exchange_id()?,
                self.config.agent_endpoint(verifier)?,
            )?;
        }
        debug!("presentation::make_presentation >> {data}");

        let response = self
            .post_proof_command(
                prover,
                ProofOperation::SendPresentation,
                &BackchannelCommand::with_id_and_data(thread_id, data),
            )
            .await?;
        response.expect_state(ProofState::PresentationSent)?;
        self.expect_proof_state(verifier, thread_id, ProofState::PresentationReceived)
            .await
    }

    /// `"{verifier}" acknowledges the proof with formats`
    pub async fn acknowledge_proof(
        &self,
        ctx: &mut ScenarioContext,
        verifier: &str,
    ) -> HarnessResult<()> {
        info!("presentation::acknowledge_proof >> verifier: {verifier}");
        let thread_id = ctx.exchange.presentation.thread_id()?.to_string();
        let response = self
            .post_proof_command(
                verifier,
                ProofOperation::VerifyPresentation,
                &BackchannelCommand::with_id(&thread_id),
            )
            .await?;
        response.expect_state(ProofState::Done)?;

        if ctx.exchange.support_revocation {
            let verified = response.verified()?;
            debug!("presentation::acknowledge_proof >> thread {thread_id} verified: {verified}");
            ctx.registries.verifications.insert(thread_id, verified);
        }
        Ok(())
    }

    /// `"{prover}" has the proof with formats verified`
    pub async fn assert_proof_verified(
        &self,
        ctx: &mut ScenarioContext,
        prover: &str,
    ) -> HarnessResult<()> {
        info!("presentation::assert_proof_verified >> prover: {prover}");
        let thread_id = ctx.exchange.presentation.thread_id()?;
        self.expect_proof_state(prover, thread_id, ProofState::Done)
            .await?;
        if !ctx.registries.verifications.is_empty() {
            soft_assert_eq!(
                ctx.registries.verifications.get(thread_id).map(String::as_str),
                Some("true"),
                "presentation on thread {} was not verified",
                thread_id
            );
        }
        Ok(())
    }

    /// `"{prover}" has the proof with formats unverified`
    pub async fn assert_proof_unverified(
        &self,
        ctx: &mut ScenarioContext,
        prover: &str,
    ) -> HarnessResult<()> {
        info!("presentation::assert_proof_unverified >> prover: {prover}");
        let thread_id = ctx.exchange.presentation.thread_id()?;
        self.expect_proof_state(prover, thread_id, ProofState::Done)
            .await?;
        match ctx.registries.verifications.get(thread_id).map(String::as_str) {
            Some("true") => Err(HarnessError::from_msg(
                HarnessErrorKind::UnexpectedResponse,
                format!("presentation on thread {thread_id} was verified"),
            )),
            Some(_) => Ok(()),
            None => Err(HarnessError::from_msg(
                HarnessErrorKind::MissingContext,
                format!("No verification result recorded for thread {thread_id}"),
            )),
        }
    }

    /// Issues the credential, then drives one presentation exchange to a verified proof.
    pub async fn present_proof(
        &self,
        ctx: &mut ScenarioContext,
        scenario: &ProofScenario,
    ) -> HarnessResult<()> {
        ctx.exchange.connectionless = scenario.connectionless;
        self.has_issued_credential(
            ctx,
            &scenario.prover,
            &scenario.issuer,
            &scenario.credential_data,
        )
        .await?;
        if let Some(proposal) = &scenario.proposal {
            self.send_presentation_proposal(ctx, &scenario.prover, proposal, &scenario.verifier)
                .await?;
        }
        self.send_presentation_request(
            ctx,
            &scenario.verifier,
            &scenario.request_for_proof,
            &scenario.prover,
        )
        .await?;
        self.make_presentation(ctx, &scenario.prover, &scenario.presentation)
            .await?;
        self.acknowledge_proof(ctx, &scenario.verifier).await?;
        self.assert_proof_verified(ctx, &scenario.prover).await
    }
}
