use std::{collections::HashSet, fmt, str::FromStr};

use crate::error::{HarnessError, HarnessErrorKind, HarnessResult};

pub const TAG_CRED_FORMAT_INDY: &str = "CredFormat_Indy";
pub const TAG_CRED_FORMAT_JSON_LD: &str = "CredFormat_JSON-LD";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CredentialFormat {
    Indy,
    JsonLd,
}

impl CredentialFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            CredentialFormat::Indy => "indy",
            CredentialFormat::JsonLd => "json-ld",
        }
    }

    /// Reads the format from `CredFormat_*` scenario tags, `None` when untagged.
    pub fn from_tags(tags: &HashSet<String>) -> Option<Self> {
        if tags.contains(TAG_CRED_FORMAT_INDY) {
            Some(CredentialFormat::Indy)
        } else if tags.contains(TAG_CRED_FORMAT_JSON_LD) {
            Some(CredentialFormat::JsonLd)
        } else {
            None
        }
    }
}

impl fmt::Display for CredentialFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CredentialFormat {
    type Err = HarnessError;

    fn from_str(s: &str) -> HarnessResult<Self> {
        match s {
            "indy" => Ok(CredentialFormat::Indy),
            "json-ld" => Ok(CredentialFormat::JsonLd),
            other => Err(HarnessError::from_msg(
                HarnessErrorKind::UnknownCredentialFormat,
                format!("Unknown cred format {other}"),
            )),
        }
    }
}
