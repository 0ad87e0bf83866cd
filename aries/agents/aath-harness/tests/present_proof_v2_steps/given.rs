//! Given steps for present-proof v2 scenarios.

use aath_harness::steps::setup::SetupSteps;
use eyre::WrapErr;
use rstest_bdd_macros::given;
use serde_json::json;

use super::world::{run_async, ProofWorld};

fn register_schema(world: &mut ProofWorld, schema: &str, support_revocation: bool) {
    world.ctx.register_schema(
        schema,
        json!({"schema_name": schema, "schema_version": "1.0.1"}),
        support_revocation,
    );
}

#[given(r#"the scenario is tagged "{tag}""#)]
fn scenario_tagged(world: &mut ProofWorld, tag: String) {
    world.ctx.tags.insert(tag);
}

#[given(r#"the scenario is not tagged "{tag}""#)]
fn scenario_not_tagged(world: &mut ProofWorld, tag: String) {
    world.ctx.tags.remove(&tag);
}

#[given(r#"the "{schema}" schema is registered"#)]
fn schema_registered(world: &mut ProofWorld, schema: String) {
    register_schema(world, &schema, false);
}

#[given(r#"the "{schema}" schema supports revocation"#)]
fn schema_supports_revocation(world: &mut ProofWorld, schema: String) {
    register_schema(world, &schema, true);
}

#[given("the presentation is connectionless")]
fn presentation_is_connectionless(world: &mut ProofWorld) {
    world.ctx.exchange.connectionless = true;
}

#[given(r#"the verifier reports verified "{verified}""#)]
fn verifier_reports(world: &mut ProofWorld, verified: String) {
    world.backchannel.report_verified(json!(verified));
}

#[given(r#"the non-revocation interval is from "{from}" to "{to}""#)]
fn non_revocation_interval(
    world: &mut ProofWorld,
    from: String,
    to: String,
) -> Result<(), eyre::Report> {
    world
        .harness
        .set_non_revoked_interval(&mut world.ctx, Some(&from), &to)
        .wrap_err("set non-revocation interval")?;
    Ok(())
}

#[given(r#""{inviter}" and "{invitee}" have an existing connection"#)]
fn existing_connection(
    world: &mut ProofWorld,
    inviter: String,
    invitee: String,
) -> Result<(), eyre::Report> {
    run_async(
        world
            .setup
            .establish_connection(&mut world.ctx, &inviter, &invitee),
    )
    .wrap_err("establish connection")?;
    Ok(())
}

#[given(r#""{prover}" has an issued credential with formats from {issuer} with {credential_data}"#)]
fn has_issued_credential(
    world: &mut ProofWorld,
    prover: String,
    issuer: String,
    credential_data: String,
) -> Result<(), eyre::Report> {
    run_async(world.harness.has_issued_credential(
        &mut world.ctx,
        &prover,
        &issuer,
        &credential_data,
    ))
    .wrap_err("issue credential")?;
    Ok(())
}
