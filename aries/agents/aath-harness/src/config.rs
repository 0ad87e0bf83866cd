use std::{collections::HashMap, env, path::PathBuf, time::Duration};

use reqwest::Url;

use crate::error::{HarnessError, HarnessErrorKind, HarnessResult};

pub const DEFAULT_DATA_DIR: &str = "features/data";

/// How long, and how often, a backchannel is polled for an expected exchange state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollConfig {
    pub wait_time: Duration,
    pub sleep_time: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            wait_time: Duration::from_millis(2000),
            sleep_time: Duration::from_millis(500),
        }
    }
}

/// Backchannel of one agent: the url as configured and its parsed form.
#[derive(Clone, Debug, PartialEq, Eq)]
struct AgentEndpoint {
    configured: String,
    url: Url,
}

#[derive(Clone, Debug)]
pub struct HarnessConfig {
    agents: HashMap<String, AgentEndpoint>,
    data_dir: PathBuf,
    poll: PollConfig,
    request_timeout: Duration,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            agents: HashMap::new(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            poll: PollConfig::default(),
            request_timeout: Duration::from_secs(50),
        }
    }
}

fn parse_agent_url(name: &str, url: &str) -> HarnessResult<Url> {
    Url::parse(url).map_err(|err| {
        HarnessError::from_msg(
            HarnessErrorKind::InvalidConfiguration,
            format!("Backchannel url {url:?} of agent {name} is invalid: {err}"),
        )
    })
}

fn parse_env_number(var: &str) -> HarnessResult<Option<u64>> {
    match env::var(var) {
        Ok(value) => value.trim().parse().map(Some).map_err(|err| {
            HarnessError::from_msg(
                HarnessErrorKind::InvalidConfiguration,
                format!("{var}={value:?} is not a number: {err}"),
            )
        }),
        Err(_) => Ok(None),
    }
}

impl HarnessConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Builds a config from `Name=url` entries, e.g. `Acme=http://0.0.0.0:9020`.
    pub fn from_userdata<I, S>(entries: I) -> HarnessResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut config = Self::default();
        for entry in entries {
            let entry = entry.as_ref().trim();
            if entry.is_empty() {
                continue;
            }
            let (name, url) = entry.split_once('=').ok_or_else(|| {
                HarnessError::from_msg(
                    HarnessErrorKind::InvalidConfiguration,
                    format!("Agent entry {entry:?} is not of the form Name=url"),
                )
            })?;
            config = config.with_agent(name.trim(), url.trim())?;
        }
        Ok(config)
    }

    /// Reads `AATH_USERDATA`, `AATH_DATA_DIR`, `AATH_STATE_WAIT_SECS` and
    /// `AATH_STATE_SLEEP_MILLIS`.
    pub fn from_env() -> HarnessResult<Self> {
        let userdata = env::var("AATH_USERDATA").unwrap_or_default();
        let mut config = Self::from_userdata(userdata.split(','))?;
        if let Ok(data_dir) = env::var("AATH_DATA_DIR") {
            config.data_dir = PathBuf::from(data_dir);
        }
        if let Some(secs) = parse_env_number("AATH_STATE_WAIT_SECS")? {
            config.poll.wait_time = Duration::from_secs(secs);
        }
        if let Some(millis) = parse_env_number("AATH_STATE_SLEEP_MILLIS")? {
            config.poll.sleep_time = Duration::from_millis(millis);
        }
        info!(
            "HarnessConfig::from_env << agents: {:?}, data_dir: {:?}",
            config.agents.keys().collect::<Vec<_>>(),
            config.data_dir
        );
        Ok(config)
    }

    pub fn with_agent(mut self, name: &str, url: &str) -> HarnessResult<Self> {
        let endpoint = AgentEndpoint {
            configured: url.to_string(),
            url: parse_agent_url(name, url)?,
        };
        self.agents.insert(name.to_string(), endpoint);
        Ok(self)
    }

    #[must_use]
    pub fn with_poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    fn endpoint(&self, name: &str) -> HarnessResult<&AgentEndpoint> {
        self.agents.get(name).ok_or_else(|| {
            HarnessError::from_msg(
                HarnessErrorKind::UnknownAgent,
                format!("No backchannel url configured for agent {name}"),
            )
        })
    }

    pub fn agent_url(&self, name: &str) -> HarnessResult<&Url> {
        Ok(&self.endpoint(name)?.url)
    }

    /// The agent's url exactly as configured, without the normalization `Url` applies.
    pub fn agent_endpoint(&self, name: &str) -> HarnessResult<&str> {
        Ok(&self.endpoint(name)?.configured)
    }

    pub fn data_dir(&self) -> &PathBuf {
        &self.data_dir
    }

    pub fn poll(&self) -> PollConfig {
        self.poll
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}
