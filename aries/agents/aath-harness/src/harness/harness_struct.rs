use std::sync::Arc;

use crate::{composer::PayloadComposer, config::HarnessConfig, fixtures::FixtureResolver};

pub struct Harness<B, S> {
    pub(crate) config: Arc<HarnessConfig>,
    pub(crate) fixtures: FixtureResolver,
    pub(crate) composer: Arc<PayloadComposer>,
    pub(crate) backchannel: Arc<B>,
    pub(crate) setup: Arc<S>,
}

// Implemented by hand so that B and S need not be Clone themselves.
impl<B, S> Clone for Harness<B, S> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            fixtures: self.fixtures.clone(),
            composer: self.composer.clone(),
            backchannel: self.backchannel.clone(),
            setup: self.setup.clone(),
        }
    }
}

impl<B, S> std::fmt::Debug for Harness<B, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Harness")
            .field("config", &self.config)
            .field("fixtures", &self.fixtures)
            .finish_non_exhaustive()
    }
}
