use crate::{
    backchannel::Backchannel,
    context::{ScenarioContext, TAG_CRED_PROPOSAL_START},
    error::{HarnessError, HarnessErrorKind, HarnessResult},
    format::CredentialFormat,
    harness::Harness,
    steps::setup::SetupSteps,
};

impl<B: Backchannel, S: SetupSteps> Harness<B, S> {
    /// `"{prover}" has an issued credential with formats from {issuer} with {credential_data}`
    ///
    /// Issues one credential per registered schema, in registration order, from `issuer` to
    /// `prover`. Credential data of a schema is loaded once per scenario.
    pub async fn has_issued_credential(
        &self,
        ctx: &mut ScenarioContext,
        prover: &str,
        issuer: &str,
        credential_data: &str,
    ) -> HarnessResult<()> {
        info!(
            "issuance::has_issued_credential >> prover: {prover}, issuer: {issuer}, \
             credential_data: {credential_data}"
        );
        let schemas = ctx.schema_names();
        if schemas.is_empty() {
            return Err(HarnessError::from_msg(
                HarnessErrorKind::MissingScenarioTag,
                "Schema not tagged in Feature File Scenario. Use @SchemaName as a feature tag \
                 that points to a corresponding file.",
            ));
        }
        for schema in &schemas {
            if !ctx.registries.credential_data.contains_key(schema) {
                let attributes = self.fixtures.credential_attributes(schema, credential_data)?;
                ctx.registries
                    .credential_data
                    .insert(schema.clone(), attributes);
            }
        }

        if !ctx.registries.connections.contains(prover, issuer) {
            self.setup.establish_connection(ctx, issuer, prover).await?;
        }

        let format = match CredentialFormat::from_tags(&ctx.tags).or(ctx.exchange.cred_format) {
            Some(format) => format,
            None => {
                return Err(HarnessError::from_msg(
                    HarnessErrorKind::MissingScenarioTag,
                    "Credential format not tagged in Feature File Scenario. Use \
                     @CredFormat_Indy or @CredFormat_JSON-LD.",
                ))
            }
        };
        ctx.exchange.cred_format = Some(format);

        for schema in &schemas {
            ctx.exchange.support_revocation = ctx
                .registries
                .support_revocation
                .get(schema)
                .copied()
                .unwrap_or(false);
            ctx.exchange.schema = ctx.registries.schemas.get(schema).cloned();
            self.setup.prepare_issuer(ctx, issuer, format).await?;
        }

        self.config.agent_url(prover)?;
        self.config.agent_url(issuer)?;

        let propose_first = ctx.has_tag(TAG_CRED_PROPOSAL_START);
        for schema in &schemas {
            ctx.exchange.credential_data = ctx
                .registries
                .credential_data
                .get(schema)
                .map(|data| self.composer.credential_data(data));
            ctx.exchange.schema = ctx.registries.schemas.get(schema).cloned();
            debug!(
                "issuance::has_issued_credential >> issuing {schema} with {:?}",
                ctx.exchange.credential_data
            );
            if propose_first {
                self.setup
                    .propose_credential(ctx, prover, issuer, format, credential_data)
                    .await?;
            }
            self.setup.offer_credential(ctx, issuer, format).await?;
            self.setup.request_credential(ctx, prover, format).await?;
            self.setup.issue_credential(ctx, issuer, format).await?;
            self.setup.acknowledge_credential(ctx, prover, format).await?;
            self.setup
                .assert_credential_issued(ctx, prover, format)
                .await?;
        }
        Ok(())
    }
}
