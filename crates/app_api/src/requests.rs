use serde::Deserialize;

/// Body of the report calls. They take no parameters and reject unknown fields.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct EmptyRequest {}
