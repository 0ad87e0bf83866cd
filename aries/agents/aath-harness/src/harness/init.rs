use std::sync::Arc;

use crate::{
    backchannel::{http::HttpBackchannel, Backchannel},
    composer::PayloadComposer,
    config::HarnessConfig,
    error::HarnessResult,
    fixtures::FixtureResolver,
    harness::Harness,
    steps::setup::SetupSteps,
};

impl<B: Backchannel, S: SetupSteps> Harness<B, S> {
    pub fn new(config: HarnessConfig, backchannel: B, setup: S) -> Self {
        let fixtures = FixtureResolver::new(config.data_dir().clone());
        Self {
            config: Arc::new(config),
            fixtures,
            composer: Arc::new(PayloadComposer::default()),
            backchannel: Arc::new(backchannel),
            setup: Arc::new(setup),
        }
    }

    #[must_use]
    pub fn with_composer(mut self, composer: PayloadComposer) -> Self {
        self.composer = Arc::new(composer);
        self
    }
}

impl<S: SetupSteps> Harness<HttpBackchannel, S> {
    /// Harness talking HTTP to the backchannels named in `config`.
    pub fn initialize(config: HarnessConfig, setup: S) -> HarnessResult<Self> {
        let backchannel = HttpBackchannel::new(&config)?;
        info!(
            "Harness::initialize << fixtures from {:?}",
            config.data_dir()
        );
        Ok(Self::new(config, backchannel, setup))
    }
}
