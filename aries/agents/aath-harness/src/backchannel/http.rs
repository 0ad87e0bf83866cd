use std::time::Instant;

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client, Url};

use crate::{
    backchannel::{Backchannel, BackchannelCommand, BackchannelResponse, ProofState},
    config::{HarnessConfig, PollConfig},
    error::{HarnessError, HarnessErrorKind, HarnessResult},
};

#[derive(Deserialize)]
struct StateResponse {
    state: String,
}

/// Talks to agent backchannels over HTTP, `POST|GET <agent>/agent/command/<topic>/...`.
#[derive(Clone, Debug)]
pub struct HttpBackchannel {
    client: Client,
    poll: PollConfig,
}

fn command_url(agent: &Url, topic: &str, path: &str) -> HarnessResult<Url> {
    let url = format!(
        "{}/agent/command/{topic}/{path}",
        agent.as_str().trim_end_matches('/')
    );
    Url::parse(&url).map_err(|err| {
        HarnessError::from_msg(
            HarnessErrorKind::InvalidConfiguration,
            format!("Cannot build backchannel url {url:?}: {err}"),
        )
    })
}

impl HttpBackchannel {
    pub fn new(config: &HarnessConfig) -> HarnessResult<Self> {
        let client = reqwest::ClientBuilder::new()
            .timeout(config.request_timeout())
            .build()
            .map_err(|err| {
                HarnessError::from_msg(
                    HarnessErrorKind::InvalidConfiguration,
                    format!("Building reqwest client failed: {err}"),
                )
            })?;
        Ok(Self {
            client,
            poll: config.poll(),
        })
    }

    async fn get_state(&self, url: &Url) -> HarnessResult<Option<String>> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            debug!("HttpBackchannel::get_state << {url} answered {status}: {body}");
            return Ok(None);
        }
        let state: StateResponse = serde_json::from_str(&body)?;
        Ok(Some(state.state))
    }
}

#[async_trait]
impl Backchannel for HttpBackchannel {
    async fn post_command(
        &self,
        agent: &Url,
        topic: &str,
        operation: &str,
        command: &BackchannelCommand,
    ) -> HarnessResult<BackchannelResponse> {
        let url = command_url(agent, topic, operation)?;
        debug!("HttpBackchannel::post_command >> POST {url}, command: {command:?}");
        let response = self
            .client
            .post(url.clone())
            .header(CONTENT_TYPE, "application/json")
            .json(command)
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!("HttpBackchannel::post_command << POST {url} status: {status}, body: {body}");
        Ok(BackchannelResponse::new(status, body))
    }

    async fn expected_agent_state(
        &self,
        agent: &Url,
        topic: &str,
        thread_id: &str,
        state: ProofState,
    ) -> HarnessResult<bool> {
        let url = command_url(agent, topic, thread_id)?;
        let started = Instant::now();
        let mut observed = None;
        loop {
            observed = self.get_state(&url).await?.or(observed);
            if observed.as_deref() == Some(state.as_str()) {
                return Ok(true);
            }
            if started.elapsed() >= self.poll.wait_time {
                break;
            }
            tokio::time::sleep(self.poll.sleep_time).await;
        }
        warn!(
            "From {agent}, expected state {state} but received {} for {topic} thread {thread_id}",
            observed.as_deref().unwrap_or("no state")
        );
        Ok(false)
    }
}
