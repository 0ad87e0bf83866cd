use serde_json::Value;

use crate::error::{HarnessError, HarnessErrorKind, HarnessResult};

pub fn now_epoch() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Resolves `"now"`, `"+60"`, `"-120"` (or a bare integer offset) to epoch seconds.
pub fn resolve_relative_timestamp(instruction: &Value, now: i64) -> HarnessResult<i64> {
    let offset = match instruction {
        Value::String(text) if text.trim() == "now" => 0,
        Value::String(text) => text.trim().parse::<i64>().map_err(|err| {
            HarnessError::from_msg(
                HarnessErrorKind::InvalidFixture,
                format!("Relative timestamp {text:?} is neither \"now\" nor an offset: {err}"),
            )
        })?,
        Value::Number(number) => number.as_i64().ok_or_else(|| {
            HarnessError::from_msg(
                HarnessErrorKind::InvalidFixture,
                format!("Relative timestamp {number} is not an integer offset"),
            )
        })?,
        other => {
            return Err(HarnessError::from_msg(
                HarnessErrorKind::InvalidFixture,
                format!("Relative timestamp {other} has unsupported type"),
            ))
        }
    };
    now.checked_add(offset).ok_or_else(|| {
        HarnessError::from_msg(
            HarnessErrorKind::InvalidFixture,
            format!("Relative timestamp {instruction} overflows when applied to {now}"),
        )
    })
}

/// Time window for which non-revocation of a credential must be proven.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonRevokedInterval {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<i64>,
    pub to: i64,
}

impl NonRevokedInterval {
    pub fn relative(from: Option<&str>, to: &str, now: i64) -> HarnessResult<Self> {
        let from = from
            .map(|from| resolve_relative_timestamp(&Value::from(from), now))
            .transpose()?;
        let to = resolve_relative_timestamp(&Value::from(to), now)?;
        if let Some(from) = from {
            if from > to {
                return Err(HarnessError::from_msg(
                    HarnessErrorKind::InvalidFixture,
                    format!("Non-revocation interval starts ({from}) after it ends ({to})"),
                ));
            }
        }
        Ok(Self { from, to })
    }
}
