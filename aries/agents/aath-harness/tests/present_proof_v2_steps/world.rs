//! Scenario world for present-proof v2 behaviour tests.

use aath_harness::{context::ScenarioContext, error::HarnessError};
use rstest::fixture;

use crate::utils::{fake_harness, FakeBackchannel, FakeHarness, FakeSetupSteps};

pub struct ProofWorld {
    pub harness: FakeHarness,
    pub backchannel: FakeBackchannel,
    pub setup: FakeSetupSteps,
    pub ctx: ScenarioContext,
    /// Error of the last step expected to fail.
    pub last_error: Option<HarnessError>,
}

impl Default for ProofWorld {
    fn default() -> Self {
        let backchannel = FakeBackchannel::new();
        let (harness, setup) = fake_harness(backchannel.clone());
        Self {
            harness,
            backchannel,
            setup,
            ctx: ScenarioContext::default(),
            last_error: None,
        }
    }
}

#[fixture]
pub fn world() -> ProofWorld {
    ProofWorld::default()
}

pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
