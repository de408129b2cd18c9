use serde::Deserialize;
use thinker_core::ExternalId;

use crate::error::IdentityError;

/// Body shared by the login and migration endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineAuthRequest {
    #[serde(default, alias = "lineUserId")]
    pub external_id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub picture_url: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
}

impl LineAuthRequest {
    /// Required-field and format checks, done before any collaborator call.
    pub(crate) fn validate(&self) -> Result<(ExternalId, &str), IdentityError> {
        let raw = non_blank(&self.external_id)
            .ok_or_else(|| IdentityError::InvalidInput("externalId is required".into()))?;
        let id = ExternalId::parse(raw)?;
        let token = non_blank(&self.access_token)
            .ok_or_else(|| IdentityError::InvalidInput("accessToken is required".into()))?;
        Ok((id, token))
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn accepts_either_id_field() {
        let a: LineAuthRequest =
            serde_json::from_value(json!({ "lineUserId": "Uabc", "accessToken": "t" })).unwrap();
        let b: LineAuthRequest =
            serde_json::from_value(json!({ "externalId": "Uabc", "accessToken": "t" })).unwrap();
        assert_eq!(a.validate().unwrap().0, b.validate().unwrap().0);
    }

    #[test]
    fn missing_or_malformed_fields() {
        let missing_id = LineAuthRequest {
            access_token: Some("t".into()),
            ..Default::default()
        };
        assert!(matches!(missing_id.validate(), Err(IdentityError::InvalidInput(_))));

        let bad_id = LineAuthRequest {
            external_id: Some("abc".into()),
            access_token: Some("t".into()),
            ..Default::default()
        };
        assert!(matches!(bad_id.validate(), Err(IdentityError::InvalidIdentifier(_))));

        let no_token = LineAuthRequest {
            external_id: Some("Uabc".into()),
            access_token: Some("  ".into()),
            ..Default::default()
        };
        assert!(matches!(no_token.validate(), Err(IdentityError::InvalidInput(_))));
    }
}
