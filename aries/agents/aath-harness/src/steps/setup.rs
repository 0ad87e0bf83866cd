use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::{context::ScenarioContext, error::HarnessResult, format::CredentialFormat};

/// Connection, ledger and issue-credential steps the presentation scenarios build upon.
///
/// Implementations record what they establish on the context: connection ids in
/// `registries.connections` (both directions) and issued credential ids in
/// `registries.credential_ids`, keyed by the schema's `schema_name`.
/// The schema and attributes of the credential being issued are read from
/// `exchange.schema` and `exchange.credential_data`.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SetupSteps: Send + Sync {
    async fn establish_connection(
        &self,
        ctx: &mut ScenarioContext,
        inviter: &str,
        invitee: &str,
    ) -> HarnessResult<()>;

    /// Makes sure `issuer` has a schema and credential definition for `exchange.schema`.
    async fn prepare_issuer(
        &self,
        ctx: &mut ScenarioContext,
        issuer: &str,
        format: CredentialFormat,
    ) -> HarnessResult<()>;

    async fn propose_credential(
        &self,
        ctx: &mut ScenarioContext,
        holder: &str,
        issuer: &str,
        format: CredentialFormat,
        credential_data: &str,
    ) -> HarnessResult<()>;

    async fn offer_credential(
        &self,
        ctx: &mut ScenarioContext,
        issuer: &str,
        format: CredentialFormat,
    ) -> HarnessResult<()>;

    async fn request_credential(
        &self,
        ctx: &mut ScenarioContext,
        holder: &str,
        format: CredentialFormat,
    ) -> HarnessResult<()>;

    async fn issue_credential(
        &self,
        ctx: &mut ScenarioContext,
        issuer: &str,
        format: CredentialFormat,
    ) -> HarnessResult<()>;

    async fn acknowledge_credential(
        &self,
        ctx: &mut ScenarioContext,
        holder: &str,
        format: CredentialFormat,
    ) -> HarnessResult<()>;

    async fn assert_credential_issued(
        &self,
        ctx: &mut ScenarioContext,
        holder: &str,
        format: CredentialFormat,
    ) -> HarnessResult<()>;
}
