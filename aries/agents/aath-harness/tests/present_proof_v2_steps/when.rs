//! When steps for present-proof v2 scenarios.

use eyre::WrapErr;
use rstest_bdd_macros::when;

use super::world::{run_async, ProofWorld};

#[when(r#""{verifier}" sends a {request_for_proof} presentation with formats to "{prover}""#)]
fn send_presentation_request(
    world: &mut ProofWorld,
    verifier: String,
    request_for_proof: String,
    prover: String,
) -> Result<(), eyre::Report> {
    run_async(world.harness.send_presentation_request(
        &mut world.ctx,
        &verifier,
        &request_for_proof,
        &prover,
    ))
    .wrap_err("send presentation request")?;
    Ok(())
}

#[when(r#""{verifier}" tries to send a {request_for_proof} presentation with formats to "{prover}""#)]
fn try_send_presentation_request(
    world: &mut ProofWorld,
    verifier: String,
    request_for_proof: String,
    prover: String,
) {
    world.last_error = run_async(world.harness.send_presentation_request(
        &mut world.ctx,
        &verifier,
        &request_for_proof,
        &prover,
    ))
    .err();
}

#[when(r#""{prover}" makes a {proposal} presentation proposal with formats to "{verifier}""#)]
fn send_presentation_proposal(
    world: &mut ProofWorld,
    prover: String,
    proposal: String,
    verifier: String,
) -> Result<(), eyre::Report> {
    run_async(world.harness.send_presentation_proposal(
        &mut world.ctx,
        &prover,
        &proposal,
        &verifier,
    ))
    .wrap_err("send presentation proposal")?;
    Ok(())
}

#[when(r#""{prover}" makes the {presentation} of the proof with formats"#)]
fn make_presentation(
    world: &mut ProofWorld,
    prover: String,
    presentation: String,
) -> Result<(), eyre::Report> {
    run_async(
        world
            .harness
            .make_presentation(&mut world.ctx, &prover, &presentation),
    )
    .wrap_err("make presentation")?;
    Ok(())
}

#[when(r#""{verifier}" acknowledges the proof with formats"#)]
fn acknowledge_proof(world: &mut ProofWorld, verifier: String) -> Result<(), eyre::Report> {
    run_async(world.harness.acknowledge_proof(&mut world.ctx, &verifier))
        .wrap_err("acknowledge proof")?;
    Ok(())
}
