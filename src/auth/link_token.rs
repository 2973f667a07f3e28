use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use super::LinkShareAuth;
use crate::error::{Error, Result};
use crate::types::{LinkSharing, Right};

const LINK_SHARE_TOKEN_TYPE: &str = "link_share";

/// Claims carried by a link share token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkShareClaims {
    #[serde(rename = "type")]
    pub token_type: String,
    pub id: i64,
    pub hash: String,
    pub list_id: i64,
    pub right: Right,
    #[serde(rename = "sharedByID")]
    pub shared_by_id: i64,
    pub exp: i64,
}

/// Signs and verifies stateless link share tokens (`claims.signature`,
/// both base64url, HMAC-SHA256 over the encoded claims).
#[derive(Clone)]
pub struct LinkShareTokens {
    secret: Vec<u8>,
    ttl_secs: i64,
}

impl LinkShareTokens {
    #[must_use]
    pub fn new(secret: impl Into<Vec<u8>>, ttl_secs: i64) -> Self {
        Self {
            secret: secret.into(),
            ttl_secs,
        }
    }

    fn mac(&self) -> Result<Hmac<Sha256>> {
        Hmac::<Sha256>::new_from_slice(&self.secret)
            .map_err(|e| Error::Config(format!("invalid link share secret: {e}")))
    }

    pub fn issue(&self, share: &LinkSharing) -> Result<String> {
        let claims = LinkShareClaims {
            token_type: LINK_SHARE_TOKEN_TYPE.to_string(),
            id: share.id,
            hash: share.hash.clone(),
            list_id: share.list_id,
            right: share.right,
            shared_by_id: share.shared_by_id,
            exp: Utc::now().timestamp() + self.ttl_secs,
        };

        let payload = serde_json::to_vec(&claims)
            .map_err(|e| Error::Internal(format!("failed to encode claims: {e}")))?;
        let encoded = URL_SAFE_NO_PAD.encode(payload);

        let mut mac = self.mac()?;
        mac.update(encoded.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{encoded}.{signature}"))
    }

    /// Rebuilds the link share principal from a token without touching the database.
    pub fn verify(&self, token: &str) -> Result<LinkShareAuth> {
        let (encoded, signature) = token.split_once('.').ok_or(Error::LinkShareTokenInvalid)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| Error::LinkShareTokenInvalid)?;

        let mut mac = self.mac()?;
        mac.update(encoded.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| Error::LinkShareTokenInvalid)?;

        let payload = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|_| Error::LinkShareTokenInvalid)?;
        let claims: LinkShareClaims =
            serde_json::from_slice(&payload).map_err(|_| Error::LinkShareTokenInvalid)?;

        if claims.token_type != LINK_SHARE_TOKEN_TYPE {
            return Err(Error::LinkShareTokenInvalid);
        }
        if claims.exp < Utc::now().timestamp() {
            return Err(Error::TokenExpired);
        }

        Ok(LinkShareAuth {
            id: claims.id,
            hash: claims.hash,
            list_id: claims.list_id,
            right: claims.right,
            shared_by_id: claims.shared_by_id,
        })
    }

    /// Quick check used to route a bearer token to the right verifier.
    #[must_use]
    pub fn looks_like_link_token(token: &str) -> bool {
        token.contains('.')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn share() -> LinkSharing {
        LinkSharing {
            id: 5,
            hash: "h".repeat(40),
            list_id: 9,
            right: Right::READ_WRITE,
            shared_by_id: 2,
            ..Default::default()
        }
    }

    #[test]
    fn test_issue_and_verify() {
        let tokens = LinkShareTokens::new("secret", 3600);
        let token = tokens.issue(&share()).unwrap();

        let auth = tokens.verify(&token).unwrap();
        assert_eq!(auth.id, 5);
        assert_eq!(auth.list_id, 9);
        assert_eq!(auth.right, Right::READ_WRITE);
        assert_eq!(auth.shared_by_id, 2);
    }

    #[test]
    fn test_claims_use_wire_names() {
        let tokens = LinkShareTokens::new("secret", 3600);
        let token = tokens.issue(&share()).unwrap();
        let (encoded, _) = token.split_once('.').unwrap();
        let claims: serde_json::Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(encoded).unwrap()).unwrap();

        assert_eq!(claims["type"], "link_share");
        assert_eq!(claims["sharedByID"], 2);
        assert_eq!(claims["right"], 1);
    }

    #[test]
    fn test_rejects_other_secret() {
        let token = LinkShareTokens::new("secret", 3600).issue(&share()).unwrap();
        let result = LinkShareTokens::new("other", 3600).verify(&token);
        assert!(matches!(result, Err(Error::LinkShareTokenInvalid)));
    }

    #[test]
    fn test_rejects_tampered_claims() {
        let tokens = LinkShareTokens::new("secret", 3600);
        let token = tokens.issue(&share()).unwrap();
        let (_, signature) = token.split_once('.').unwrap();

        let mut forged = share();
        forged.right = Right::ADMIN;
        let forged_token = tokens.issue(&forged).unwrap();
        let (forged_claims, _) = forged_token.split_once('.').unwrap();

        let result = tokens.verify(&format!("{forged_claims}.{signature}"));
        assert!(matches!(result, Err(Error::LinkShareTokenInvalid)));
    }

    #[test]
    fn test_rejects_expired() {
        let tokens = LinkShareTokens::new("secret", -10);
        let token = tokens.issue(&share()).unwrap();
        assert!(matches!(tokens.verify(&token), Err(Error::TokenExpired)));
    }
}
