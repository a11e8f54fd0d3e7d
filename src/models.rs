use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

/// Claims carried by a verified one-time portal token
///
/// Produced only by [`crate::portal::token::verify_portal_token`]; holding a
/// value of this type means the signature, expiry and application id have all
/// been checked. `email` and `display_name` are normalized to `None` when the
/// token omits them or carries a non-string value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalClaims {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

/// The locally trusted identity stored in the session cookie
///
/// Serialized as base64url JSON into the cookie value. The cookie is not
/// signed; it relies on transport security plus the `HttpOnly`/`Secure`
/// attributes, so nothing secret may ever be added here.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SessionRecord {
    pub uid: String,
    pub email: Option<String>,
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
}

impl From<PortalClaims> for SessionRecord {
    fn from(claims: PortalClaims) -> Self {
        Self {
            uid: claims.uid,
            email: claims.email,
            display_name: claims.display_name,
        }
    }
}

/// Body of a successful session exchange response
#[derive(Serialize, Deserialize, Debug)]
pub struct SessionExchangeResponse {
    pub token: String,
    pub email: Option<String>,
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
    pub uid: String,
    pub redirect: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_record_serializes_null_fields() {
        let record = SessionRecord {
            uid: "user-1".to_string(),
            email: None,
            display_name: None,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["uid"], "user-1");
        // Absent optionals must serialize as explicit nulls so the cookie
        // payload shape is stable across issuers.
        assert!(json["email"].is_null());
        assert!(json["displayName"].is_null());
    }

    #[test]
    fn test_session_record_from_claims() {
        let claims = PortalClaims {
            uid: "user-2".to_string(),
            email: Some("user@example.com".to_string()),
            display_name: None,
        };

        let record = SessionRecord::from(claims);
        assert_eq!(record.uid, "user-2");
        assert_eq!(record.email.as_deref(), Some("user@example.com"));
        assert_eq!(record.display_name, None);
    }

    #[test]
    fn test_display_name_uses_wire_casing() {
        let record: SessionRecord =
            serde_json::from_str(r#"{"uid":"u","email":null,"displayName":"Dana"}"#).unwrap();
        assert_eq!(record.display_name.as_deref(), Some("Dana"));
    }
}
