use std::{error::Error, fmt};

#[derive(Copy, Clone, Eq, PartialEq, Debug, thiserror::Error)]
pub enum HarnessErrorKind {
    // Fixtures
    #[error("Fixture file not found")]
    FixtureNotFound,
    #[error("Fixture has invalid structure")]
    InvalidFixture,

    // Scenario authoring
    #[error("Scenario is missing a required tag")]
    MissingScenarioTag,
    #[error("Scenario context is missing a required value")]
    MissingContext,
    #[error("Unknown credential format")]
    UnknownCredentialFormat,
    #[error("No backchannel configured for agent")]
    UnknownAgent,

    // Backchannel
    #[error("Unexpected backchannel response")]
    UnexpectedResponse,
    #[error("Agent did not reach the expected state")]
    UnexpectedState,
    #[error("Backchannel request failed")]
    BackchannelRequest,

    // Ambient
    #[error("Invalid configuration")]
    InvalidConfiguration,
    #[error("Unable to serialize")]
    SerializationError,
    #[error("IO error")]
    IOError,
    #[error("Logging error")]
    LoggingError,
}

#[derive(thiserror::Error)]
pub struct HarnessError {
    msg: String,
    kind: HarnessErrorKind,
}

fn format_error(err: &HarnessError, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "Error: {}: {}", err.kind(), err.msg())?;
    let mut current = err.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n{cause}")?;
        current = cause.source();
    }
    Ok(())
}

impl fmt::Display for HarnessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        format_error(self, f)
    }
}

impl fmt::Debug for HarnessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        format_error(self, f)
    }
}

impl HarnessError {
    pub fn from_msg<D>(kind: HarnessErrorKind, msg: D) -> HarnessError
    where
        D: fmt::Display,
    {
        HarnessError {
            msg: msg.to_string(),
            kind,
        }
    }

    pub fn from_kind(kind: HarnessErrorKind) -> HarnessError {
        let msg = kind.to_string();
        HarnessError { msg, kind }
    }

    pub fn kind(&self) -> HarnessErrorKind {
        self.kind
    }

    pub fn msg(&self) -> &str {
        &self.msg
    }

    pub fn extend<D>(self, msg: D) -> HarnessError
    where
        D: fmt::Display,
    {
        HarnessError {
            msg: format!("{}\n{}", self.msg, msg),
            kind: self.kind,
        }
    }
}

impl From<serde_json::Error> for HarnessError {
    fn from(err: serde_json::Error) -> HarnessError {
        HarnessError::from_msg(
            HarnessErrorKind::SerializationError,
            format!("(De)serialization failed; err: {err}"),
        )
    }
}

impl From<std::io::Error> for HarnessError {
    fn from(err: std::io::Error) -> HarnessError {
        HarnessError::from_msg(HarnessErrorKind::IOError, format!("IO failed; err: {err}"))
    }
}

impl From<reqwest::Error> for HarnessError {
    fn from(err: reqwest::Error) -> HarnessError {
        HarnessError::from_msg(
            HarnessErrorKind::BackchannelRequest,
            format!("HTTP client could not reach backchannel; err: {err}"),
        )
    }
}

pub type HarnessResult<T> = Result<T, HarnessError>;

/// Fails the current step with [`HarnessErrorKind::UnexpectedResponse`] when both sides differ.
#[macro_export]
macro_rules! soft_assert_eq {
    ($left:expr, $right:expr, $($context:tt)+) => {{
        match (&$left, &$right) {
            (left_val, right_val) => {
                if !(*left_val == *right_val) {
                    return Err($crate::error::HarnessError::from_msg(
                        $crate::error::HarnessErrorKind::UnexpectedResponse,
                        format!(
                            r#"assertion failed: `(left == right)`
  left: `{:?}`,
 right: `{:?}`; {}"#,
                            left_val,
                            right_val,
                            format!($($context)+)
                        ),
                    ));
                }
            }
        }
    }};
    ($left:expr, $right:expr) => {
        $crate::soft_assert_eq!($left, $right, "values differ")
    };
}
