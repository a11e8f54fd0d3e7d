//! Signed portal token codec and verification
//!
//! The portal hands the browser a compact one-time token of the form
//! `base64url(payload JSON) + "." + base64url(HMAC-SHA256(payload segment))`,
//! signed with a secret shared between the portal and this application.
//! Verification is a pure function over the token, the secret, the expected
//! application id and the caller-supplied clock, so it never reads ambient
//! state and is trivially testable.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::Sha256;

use crate::models::PortalClaims;

type HmacSha256 = Hmac<Sha256>;

/// Raw length of an HMAC-SHA256 digest
const HMAC_SHA256_LEN: usize = 32;

/// Verify a one-time portal token and extract its claims
///
/// Returns `None` for anything other than a well-formed, correctly signed,
/// unexpired token issued to `app_id`. A malformed or forged token is an
/// expected input on this path, not an error condition, so there is no
/// `Result` here and no way for untrusted input to cause a panic.
///
/// The checks run in order:
/// 1. exactly two non-empty dot-separated segments
/// 2. signature match (constant-time, length checked before comparison)
/// 3. payload decodes to JSON with `uid` string, `appId` string, `exp` number
/// 4. `exp` is in the future relative to `now_ms`
/// 5. `appId` equals this application's id
#[must_use]
#[allow(clippy::cast_precision_loss)] // exp comparison happens in f64, as issued
pub fn verify_portal_token(
    token: &str,
    secret: &[u8],
    app_id: &str,
    now_ms: i64,
) -> Option<PortalClaims> {
    let mut segments = token.split('.');
    let payload_b64 = segments.next()?;
    let sig_b64 = segments.next()?;
    if segments.next().is_some() || payload_b64.is_empty() || sig_b64.is_empty() {
        return None;
    }

    // Decode the supplied signature first; rejecting a wrong-length value
    // here keeps the comparison below strictly length-matched.
    let provided_sig = URL_SAFE_NO_PAD.decode(sig_b64).ok()?;
    if provided_sig.len() != HMAC_SHA256_LEN {
        return None;
    }

    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(payload_b64.as_bytes());
    // verify_slice performs a constant-time comparison
    mac.verify_slice(&provided_sig).ok()?;

    // Signature is genuine; only now is the payload worth parsing.
    let payload_raw = URL_SAFE_NO_PAD.decode(payload_b64).ok()?;
    let payload: Value = serde_json::from_slice(&payload_raw).ok()?;
    let obj = payload.as_object()?;

    let uid = obj.get("uid")?.as_str()?;
    if uid.is_empty() {
        return None;
    }
    let token_app_id = obj.get("appId")?.as_str()?;
    let exp = obj.get("exp")?.as_f64()?;

    if !exp.is_finite() || now_ms as f64 >= exp {
        return None;
    }

    // A token minted for a different downstream application is rejected even
    // though its signature is valid under the shared secret.
    if token_app_id != app_id {
        return None;
    }

    Some(PortalClaims {
        uid: uid.to_owned(),
        email: obj.get("email").and_then(Value::as_str).map(ToOwned::to_owned),
        display_name: obj
            .get("displayName")
            .and_then(Value::as_str)
            .map(ToOwned::to_owned),
    })
}

/// Encode and sign a portal token payload
///
/// The issuing half of the wire format. The portal service is the production
/// issuer; this crate uses it to mint tokens in tests.
///
/// # Panics
///
/// Never in practice: HMAC-SHA256 accepts keys of any length.
#[must_use]
pub fn sign_portal_payload(payload: &Value, secret: &[u8]) -> String {
    let payload_b64 = URL_SAFE_NO_PAD.encode(payload.to_string());
    let mut mac =
        HmacSha256::new_from_slice(secret).expect("HMAC-SHA256 accepts keys of any length");
    mac.update(payload_b64.as_bytes());
    let signature = mac.finalize().into_bytes();
    format!("{payload_b64}.{}", URL_SAFE_NO_PAD.encode(signature))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SECRET: &[u8] = b"portal-shared-secret";
    const APP_ID: &str = "rams";
    const NOW_MS: i64 = 1_700_000_000_000;

    fn valid_payload() -> Value {
        json!({
            "uid": "user-123",
            "appId": APP_ID,
            "exp": NOW_MS + 60_000,
            "email": "user@example.com",
            "displayName": "Test User",
        })
    }

    #[test]
    fn test_valid_token_verifies() {
        let token = sign_portal_payload(&valid_payload(), SECRET);
        let claims = verify_portal_token(&token, SECRET, APP_ID, NOW_MS).unwrap();

        assert_eq!(claims.uid, "user-123");
        assert_eq!(claims.email.as_deref(), Some("user@example.com"));
        assert_eq!(claims.display_name.as_deref(), Some("Test User"));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = sign_portal_payload(&valid_payload(), b"a-different-secret");
        assert!(verify_portal_token(&token, SECRET, APP_ID, NOW_MS).is_none());
    }

    #[test]
    fn test_expired_token_rejected() {
        let mut payload = valid_payload();
        payload["exp"] = json!(NOW_MS - 1);
        let token = sign_portal_payload(&payload, SECRET);
        assert!(verify_portal_token(&token, SECRET, APP_ID, NOW_MS).is_none());
    }

    #[test]
    fn test_expiry_boundary_is_exclusive() {
        // A token expiring exactly now is already invalid.
        let mut payload = valid_payload();
        payload["exp"] = json!(NOW_MS);
        let token = sign_portal_payload(&payload, SECRET);
        assert!(verify_portal_token(&token, SECRET, APP_ID, NOW_MS).is_none());
    }

    #[test]
    fn test_wrong_app_id_rejected() {
        let mut payload = valid_payload();
        payload["appId"] = json!("other-app");
        let token = sign_portal_payload(&payload, SECRET);
        assert!(verify_portal_token(&token, SECRET, APP_ID, NOW_MS).is_none());
    }

    #[test]
    fn test_malformed_shapes_rejected() {
        for token in [
            "",
            ".",
            "onlyonesegment",
            "a.b.c",
            ".signature",
            "payload.",
            "not-base64!.not-base64!",
        ] {
            assert!(
                verify_portal_token(token, SECRET, APP_ID, NOW_MS).is_none(),
                "token shape should be rejected: {token:?}"
            );
        }
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let token = sign_portal_payload(&valid_payload(), SECRET);
        let (_, sig) = token.split_once('.').unwrap();

        let mut forged = valid_payload();
        forged["uid"] = json!("someone-else");
        let forged_b64 = URL_SAFE_NO_PAD.encode(forged.to_string());

        let spliced = format!("{forged_b64}.{sig}");
        assert!(verify_portal_token(&spliced, SECRET, APP_ID, NOW_MS).is_none());
    }

    #[test]
    fn test_signature_length_mismatch_rejected() {
        let token = sign_portal_payload(&valid_payload(), SECRET);
        let (payload, _) = token.split_once('.').unwrap();

        // A syntactically valid base64url signature of the wrong length must
        // be rejected before any comparison happens.
        let short_sig = URL_SAFE_NO_PAD.encode(b"short");
        let truncated = format!("{payload}.{short_sig}");
        assert!(verify_portal_token(&truncated, SECRET, APP_ID, NOW_MS).is_none());
    }

    #[test]
    fn test_missing_mandatory_fields_rejected() {
        for field in ["uid", "appId", "exp"] {
            let mut payload = valid_payload();
            payload.as_object_mut().unwrap().remove(field);
            let token = sign_portal_payload(&payload, SECRET);
            assert!(
                verify_portal_token(&token, SECRET, APP_ID, NOW_MS).is_none(),
                "payload missing {field} should be rejected"
            );
        }
    }

    #[test]
    fn test_wrong_typed_fields_rejected() {
        let mut payload = valid_payload();
        payload["exp"] = json!("soon");
        let token = sign_portal_payload(&payload, SECRET);
        assert!(verify_portal_token(&token, SECRET, APP_ID, NOW_MS).is_none());

        let mut payload = valid_payload();
        payload["uid"] = json!(42);
        let token = sign_portal_payload(&payload, SECRET);
        assert!(verify_portal_token(&token, SECRET, APP_ID, NOW_MS).is_none());
    }

    #[test]
    fn test_optional_fields_normalized_to_none() {
        let payload = json!({
            "uid": "user-123",
            "appId": APP_ID,
            "exp": NOW_MS + 60_000,
            // displayName carries a non-string value; it must coerce to None
            "displayName": 7,
        });
        let token = sign_portal_payload(&payload, SECRET);
        let claims = verify_portal_token(&token, SECRET, APP_ID, NOW_MS).unwrap();

        assert_eq!(claims.email, None);
        assert_eq!(claims.display_name, None);
    }
}
