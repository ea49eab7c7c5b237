use chrono::Utc;
use md5::{Digest, Md5};

use crate::params::QueryParams;

/// Seconds a signed request stays valid on the server
pub const EXPIRY_WINDOW_SECS: i64 = 600;

pub const SIGNATURE_PARAM: &str = "sig";
pub const EXPIRE_PARAM: &str = "expire";
pub const API_KEY_PARAM: &str = "api_key";

/// Compute the request signature over `params` and the shared secret.
///
/// Every parameter except `sig` is concatenated as `key=value` in sorted key
/// order with no separator, the raw secret is appended, and the result is
/// hashed with MD5 and rendered as lowercase hex. Values are hashed before
/// any percent-encoding.
pub fn sign(params: &QueryParams, secret: &str) -> String {
    let mut hasher = Md5::new();
    for (key, value) in params.iter().filter(|(key, _)| *key != SIGNATURE_PARAM) {
        hasher.update(key.as_bytes());
        hasher.update(b"=");
        hasher.update(value.as_bytes());
    }
    hasher.update(secret.as_bytes());

    hex::encode(hasher.finalize())
}

/// Unix time at which a request signed now stops being accepted
pub fn expiry_from_now() -> i64 {
    Utc::now().timestamp() + EXPIRY_WINDOW_SECS
}

/// Parameters awaiting a signature. Built fresh for every outbound call.
#[derive(Debug, Clone)]
pub struct SignedRequest<'a> {
    params: QueryParams,
    api_key: &'a str,
    secret: &'a str,
    expire: i64,
}

impl<'a> SignedRequest<'a> {
    /// Start a request expiring [`EXPIRY_WINDOW_SECS`] from now
    pub fn new(params: QueryParams, api_key: &'a str, secret: &'a str) -> Self {
        Self::with_expiry(params, api_key, secret, expiry_from_now())
    }

    pub fn with_expiry(
        params: QueryParams,
        api_key: &'a str,
        secret: &'a str,
        expire: i64,
    ) -> Self {
        Self {
            params,
            api_key,
            secret,
            expire,
        }
    }

    pub fn expire(&self) -> i64 {
        self.expire
    }

    /// Adds `expire` and `api_key`, then signs and attaches `sig`.
    ///
    /// Both added fields are covered by the signature.
    pub fn finish(self) -> QueryParams {
        let mut params = self.params;
        params.remove(SIGNATURE_PARAM);
        params.set(EXPIRE_PARAM, self.expire.to_string());
        params.set(API_KEY_PARAM, self.api_key);

        let signature = sign(&params, self.secret);
        params.set(SIGNATURE_PARAM, signature);
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> QueryParams {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_sign_known_answer() {
        let params = params(&[("a", "1"), ("b", "2")]);
        assert_eq!(sign(&params, "secret"), "d37cfe88ec8ff020e497f5197bf3ba1c");
    }

    #[test]
    fn test_sign_is_order_independent() {
        let forward = params(&[("a", "1"), ("b", "2")]);
        let reverse = params(&[("b", "2"), ("a", "1")]);
        assert_eq!(sign(&forward, "secret"), sign(&reverse, "secret"));
    }

    #[test]
    fn test_sign_changes_with_any_value() {
        let original = params(&[("a", "1"), ("b", "2")]);
        let changed = params(&[("a", "1"), ("b", "3")]);

        assert_eq!(sign(&changed, "secret"), "d86f8668604cdece90b1f2e08ee32fbf");
        assert_ne!(sign(&original, "secret"), sign(&changed, "secret"));
    }

    #[test]
    fn test_sign_ignores_existing_signature() {
        let unsigned = params(&[("a", "1"), ("b", "2")]);
        let signed = params(&[("a", "1"), ("b", "2"), ("sig", "stale")]);
        assert_eq!(sign(&unsigned, "secret"), sign(&signed, "secret"));
    }

    #[test]
    fn test_finish_signs_expire_and_api_key() {
        let base = params(&[
            ("from_date", "2012-02-14"),
            ("to_date", "2012-02-14"),
            ("event", r#"["Viewed report"]"#),
        ]);

        let signed = SignedRequest::with_expiry(
            base,
            "f0aa346688cee071cd85d857285a3464",
            "test-secret",
            1329760783,
        )
        .finish();

        assert_eq!(signed.get("expire"), Some("1329760783"));
        assert_eq!(
            signed.get("api_key"),
            Some("f0aa346688cee071cd85d857285a3464")
        );
        assert_eq!(signed.get("sig"), Some("1b71869aeadee0b92021f72d60dc0490"));
    }

    #[test]
    fn test_new_request_expires_in_window() {
        let before = Utc::now().timestamp();
        let request = SignedRequest::new(QueryParams::new(), "key", "secret");
        let after = Utc::now().timestamp();

        assert!(request.expire() >= before + EXPIRY_WINDOW_SECS);
        assert!(request.expire() <= after + EXPIRY_WINDOW_SECS);
    }
}
