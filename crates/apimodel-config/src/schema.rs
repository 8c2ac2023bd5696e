use schemars::schema::RootSchema;
use schemars::schema_for;

use crate::ApiModelConfig;

/// JSON schema for `apimodel.toml`, for editor tooling and CI validation.
#[must_use]
pub fn json_schema() -> RootSchema {
    let mut schema = schema_for!(ApiModelConfig);
    if let Some(metadata) = schema.schema.metadata.as_mut() {
        metadata.title = Some("apimodel.toml".to_owned());
    }
    schema
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_lists_every_section() {
        let value = serde_json::to_value(json_schema()).unwrap();
        let properties = value["properties"].as_object().unwrap();
        for key in ["logging", "signature", "classpath"] {
            assert!(properties.contains_key(key), "missing `{key}`");
        }
        assert_eq!(value["title"], "apimodel.toml");
        assert_eq!(value["additionalProperties"], false);
    }
}
