use std::fmt;

use serde_json::{Map, Value};

use crate::{
    context::{CredentialIdRegistry, ScenarioContext, TAG_PROOF_TYPE_PREFIX},
    error::{HarnessError, HarnessErrorKind, HarnessResult},
    format::CredentialFormat,
    timestamp::resolve_relative_timestamp,
};

pub const PRESENTATION_REQUEST_COMMENT: &str = "This is a comment for the request for presentation.";
pub const PRESENTATION_PROPOSAL_COMMENT: &str = "This is a comment for the presentation proposal.";

const REQUESTED_SECTIONS: [&str; 2] = ["requested_attributes", "requested_predicates"];

/// Amends a JSON-LD presentation definition with data only known at runtime.
pub trait DefinitionAmender: Send + Sync {
    fn amend(&self, ctx: &ScenarioContext, definition: Value) -> HarnessResult<Value>;
}

/// Stamps the `ProofType_<type>` scenario tag into the definition's linked-data proof formats.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProofTypeAmender;

impl DefinitionAmender for ProofTypeAmender {
    fn amend(&self, ctx: &ScenarioContext, mut definition: Value) -> HarnessResult<Value> {
        let Some(proof_type) = ctx.tag_value(TAG_PROOF_TYPE_PREFIX) else {
            return Ok(definition);
        };
        if let Some(formats) = definition
            .pointer_mut("/presentation_definition/format")
            .and_then(Value::as_object_mut)
        {
            for ld_format in ["ldp_vp", "ldp_vc"] {
                if let Some(Value::Object(format)) = formats.get_mut(ld_format) {
                    format.insert("proof_type".to_string(), json!([proof_type]));
                }
            }
        }
        Ok(definition)
    }
}

/// Per credential format handling of presentation request and presentation templates.
pub trait FormatHandler {
    fn amend_request(&self, ctx: &ScenarioContext, template: Value) -> HarnessResult<Value>;

    fn resolve_presentation(
        &self,
        credential_ids: &CredentialIdRegistry,
        template: Value,
        now: i64,
    ) -> HarnessResult<Value>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct IndyHandler;

pub struct JsonLdHandler {
    amender: Box<dyn DefinitionAmender>,
}

impl fmt::Debug for JsonLdHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonLdHandler").finish_non_exhaustive()
    }
}

fn invalid_template(msg: String) -> HarnessError {
    HarnessError::from_msg(HarnessErrorKind::InvalidFixture, msg)
}

fn entry_cred_type(entry: &Map<String, Value>, referent: &str) -> HarnessResult<String> {
    match entry.get("cred_type_name") {
        Some(Value::String(name)) => Ok(name.clone()),
        _ => Err(invalid_template(format!(
            "Presentation entry {referent} has a cred_id but no cred_type_name"
        ))),
    }
}

impl IndyHandler {
    fn resolve_entry(
        credential_ids: &CredentialIdRegistry,
        referent: &str,
        entry: &mut Map<String, Value>,
        now: i64,
    ) -> HarnessResult<()> {
        if !entry.contains_key("cred_id") {
            return Ok(());
        }
        let cred_type_name = entry_cred_type(entry, referent)?;
        let cred_id = credential_ids.latest(&cred_type_name)?;
        entry.insert("cred_id".to_string(), Value::from(cred_id));
        if let Some(instruction) = entry.get("timestamp") {
            let timestamp = resolve_relative_timestamp(instruction, now)?;
            entry.insert("timestamp".to_string(), Value::from(timestamp));
        }
        entry.remove("cred_type_name");
        Ok(())
    }
}

impl FormatHandler for IndyHandler {
    fn amend_request(&self, ctx: &ScenarioContext, mut template: Value) -> HarnessResult<Value> {
        if let Some(non_revoked) = ctx.exchange.non_revoked {
            let request = template.as_object_mut().ok_or_else(|| {
                invalid_template("Indy request template is not an object".to_string())
            })?;
            request.insert("non_revoked".to_string(), serde_json::to_value(non_revoked)?);
        }
        Ok(template)
    }

    fn resolve_presentation(
        &self,
        credential_ids: &CredentialIdRegistry,
        mut template: Value,
        now: i64,
    ) -> HarnessResult<Value> {
        for section in REQUESTED_SECTIONS {
            let Some(Value::Object(entries)) = template.get_mut(section) else {
                continue;
            };
            for (referent, entry) in entries.iter_mut() {
                if let Value::Object(entry) = entry {
                    Self::resolve_entry(credential_ids, referent, entry, now)?;
                }
            }
        }
        Ok(template)
    }
}

impl JsonLdHandler {
    pub fn new(amender: impl DefinitionAmender + 'static) -> Self {
        Self {
            amender: Box::new(amender),
        }
    }
}

impl FormatHandler for JsonLdHandler {
    fn amend_request(&self, ctx: &ScenarioContext, template: Value) -> HarnessResult<Value> {
        self.amender.amend(ctx, template)
    }

    fn resolve_presentation(
        &self,
        credential_ids: &CredentialIdRegistry,
        mut template: Value,
        _now: i64,
    ) -> HarnessResult<Value> {
        let presentation = template.as_object_mut().ok_or_else(|| {
            invalid_template("JSON-LD presentation template is not an object".to_string())
        })?;
        let record_ids = match presentation.get("record_ids") {
            Some(Value::Object(record_ids)) => record_ids.clone(),
            Some(other) => {
                return Err(invalid_template(format!(
                    "record_ids must map input descriptors to credential types, got {other}"
                )))
            }
            None => Map::new(),
        };
        let mut resolved = Map::new();
        for (input_descriptor_id, cred_type_names) in record_ids {
            let cred_type_names = cred_type_names.as_array().ok_or_else(|| {
                invalid_template(format!(
                    "record_ids.{input_descriptor_id} must be a list of credential types"
                ))
            })?;
            let ids = cred_type_names
                .iter()
                .map(|cred_type_name| {
                    let cred_type_name = cred_type_name.as_str().ok_or_else(|| {
                        invalid_template(format!(
                            "record_ids.{input_descriptor_id} holds a non-string credential type"
                        ))
                    })?;
                    credential_ids.latest(cred_type_name).map(Value::from)
                })
                .collect::<HarnessResult<Vec<_>>>()?;
            resolved.insert(input_descriptor_id, Value::Array(ids));
        }
        presentation.insert("record_ids".to_string(), Value::Object(resolved));
        Ok(template)
    }
}

/// Turns fixture templates into the payloads sent to backchannels.
#[derive(Debug)]
pub struct PayloadComposer {
    indy: IndyHandler,
    json_ld: JsonLdHandler,
}

impl Default for PayloadComposer {
    fn default() -> Self {
        Self::new(ProofTypeAmender)
    }
}

impl PayloadComposer {
    pub fn new(amender: impl DefinitionAmender + 'static) -> Self {
        Self {
            indy: IndyHandler,
            json_ld: JsonLdHandler::new(amender),
        }
    }

    pub fn handler(&self, format: CredentialFormat) -> &dyn FormatHandler {
        match format {
            CredentialFormat::Indy => &self.indy,
            CredentialFormat::JsonLd => &self.json_ld,
        }
    }

    /// Issuer side credential data is sent as loaded.
    pub fn credential_data(&self, template: &Value) -> Value {
        template.clone()
    }

    /// `{"presentation_proposal": {...}}` carrying the amended request template.
    pub fn presentation_request(
        &self,
        ctx: &ScenarioContext,
        template: Value,
        connection_id: Option<&str>,
    ) -> HarnessResult<Value> {
        let format = ctx.exchange.cred_format()?;
        let data = self.handler(format).amend_request(ctx, template)?;
        let mut proposal = json!({
            "format": format,
            "comment": PRESENTATION_REQUEST_COMMENT,
            "data": data,
        });
        if let Some(connection_id) = connection_id {
            proposal["connection_id"] = Value::from(connection_id);
        }
        Ok(json!({ "presentation_proposal": proposal }))
    }

    pub fn presentation_proposal(
        &self,
        ctx: &ScenarioContext,
        template: Value,
        connection_id: &str,
    ) -> HarnessResult<Value> {
        let format = ctx.exchange.cred_format()?;
        Ok(json!({
            "presentation_proposal": {
                "format": format,
                "comment": PRESENTATION_PROPOSAL_COMMENT,
                "data": template,
                "connection_id": connection_id,
            }
        }))
    }

    /// Resolves credential ids and timestamps, then stamps the format.
    pub fn presentation(
        &self,
        ctx: &ScenarioContext,
        template: Value,
        now: i64,
    ) -> HarnessResult<Value> {
        let format = ctx.exchange.cred_format()?;
        let mut presentation = self.handler(format).resolve_presentation(
            &ctx.registries.credential_ids,
            template,
            now,
        )?;
        let fields = presentation.as_object_mut().ok_or_else(|| {
            invalid_template("Presentation template is not an object".to_string())
        })?;
        fields.insert("format".to_string(), serde_json::to_value(format)?);
        Ok(presentation)
    }

    /// Adds the `~service` reply-routing decorator of a connectionless presentation.
    pub fn with_service_decorator(
        &self,
        mut presentation: Value,
        presentation_exchange_id: &str,
        verifier_endpoint: &str,
    ) -> HarnessResult<Value> {
        let fields = presentation.as_object_mut().ok_or_else(|| {
            invalid_template("Presentation template is not an object".to_string())
        })?;
        fields.insert(
            "~service".to_string(),
            json!({
                "recipientKeys": [presentation_exchange_id],
                "routingKeys": null,
                "serviceEndpoint": verifier_endpoint,
            }),
        );
        Ok(presentation)
    }
}
