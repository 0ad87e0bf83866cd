#[macro_use]
extern crate log;
#[macro_use]
extern crate serde;
#[macro_use]
extern crate serde_json;

#[macro_use]
pub mod error;

pub mod backchannel;
pub mod composer;
pub mod config;
pub mod context;
pub mod correlator;
pub mod fixtures;
pub mod format;
pub mod harness;
pub mod logger;
pub mod steps;
pub mod timestamp;

pub use backchannel::{http::HttpBackchannel, Backchannel};
pub use config::{HarnessConfig, PollConfig};
pub use context::ScenarioContext;
pub use error::{HarnessError, HarnessErrorKind, HarnessResult};
pub use format::CredentialFormat;
pub use harness::Harness;
pub use steps::{presentation::ProofScenario, setup::SetupSteps};
