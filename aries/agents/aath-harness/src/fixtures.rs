use std::{
    fmt,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde_json::Value;

use crate::error::{HarnessError, HarnessErrorKind, HarnessResult};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FixtureKind {
    CredentialData,
    RequestForProof,
    Presentation,
}

impl fmt::Display for FixtureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            FixtureKind::CredentialData => "credential data",
            FixtureKind::RequestForProof => "request for proof",
            FixtureKind::Presentation => "presentation",
        };
        f.write_str(kind)
    }
}

/// Loads JSON test data from the conventional fixture directory.
#[derive(Clone, Debug)]
pub struct FixtureResolver {
    data_dir: PathBuf,
}

fn take_key(mut document: Value, key: &str, origin: &Path) -> HarnessResult<Value> {
    document
        .get_mut(key)
        .map(Value::take)
        .ok_or_else(|| {
            HarnessError::from_msg(
                HarnessErrorKind::InvalidFixture,
                format!("Fixture {} has no {key:?} entry", origin.display()),
            )
        })
}

impl FixtureResolver {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn path(&self, kind: FixtureKind, name: &str) -> PathBuf {
        let file_name = match kind {
            FixtureKind::CredentialData => format!("cred_data_{}.json", name.to_lowercase()),
            FixtureKind::RequestForProof | FixtureKind::Presentation => format!("{name}.json"),
        };
        self.data_dir.join(file_name)
    }

    pub fn resolve(&self, kind: FixtureKind, name: &str) -> HarnessResult<Value> {
        let path = self.path(kind, name);
        debug!("FixtureResolver::resolve >> {kind} fixture {}", path.display());
        let contents = std::fs::read_to_string(&path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => HarnessError::from_msg(
                HarnessErrorKind::FixtureNotFound,
                format!("No {kind} fixture {name:?} at {}", path.display()),
            ),
            _ => HarnessError::from(err),
        })?;
        serde_json::from_str(&contents).map_err(|err| {
            HarnessError::from_msg(
                HarnessErrorKind::InvalidFixture,
                format!("Fixture {} is not valid JSON: {err}", path.display()),
            )
        })
    }

    /// Attribute values of one variant (e.g. `Data_DL_MaxValues`) of a schema's credential data.
    pub fn credential_attributes(&self, schema: &str, variant: &str) -> HarnessResult<Value> {
        let document = self.resolve(FixtureKind::CredentialData, schema)?;
        let path = self.path(FixtureKind::CredentialData, schema);
        let variant_data = take_key(document, variant, &path)?;
        take_key(variant_data, "attributes", &path)
    }

    pub fn request_for_proof(&self, name: &str) -> HarnessResult<Value> {
        let document = self.resolve(FixtureKind::RequestForProof, name)?;
        take_key(
            document,
            "presentation_proposal",
            &self.path(FixtureKind::RequestForProof, name),
        )
    }

    pub fn presentation(&self, name: &str) -> HarnessResult<Value> {
        let document = self.resolve(FixtureKind::Presentation, name)?;
        take_key(
            document,
            "presentation",
            &self.path(FixtureKind::Presentation, name),
        )
    }
}
