//! Key fixtures and token minting shared by the auth unit tests.

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::Value;

pub const TRUSTED_PRIVATE_PEM: &str = include_str!("../../../tests/fixtures/trusted_private.pem");
pub const TRUSTED_PUBLIC_PEM: &str = include_str!("../../../tests/fixtures/trusted_public.pem");
pub const ROGUE_PRIVATE_PEM: &str = include_str!("../../../tests/fixtures/rogue_private.pem");
pub const ROGUE_PUBLIC_PEM: &str = include_str!("../../../tests/fixtures/rogue_public.pem");
/// JWK set holding the trusted key as `trusted-2024`.
pub const JWKS: &str = include_str!("../../../tests/fixtures/jwks.json");
/// JWK set holding the rogue key as `rogue-2024`.
pub const JWKS_ROTATED: &str = include_str!("../../../tests/fixtures/jwks_rotated.json");

pub const ISSUER: &str = "https://issuer.example.com/";
pub const AUDIENCE: &str = "https://api.example.com";

pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

pub fn claims(sub: &str) -> Value {
    serde_json::json!({
        "sub": sub,
        "iss": ISSUER,
        "aud": AUDIENCE,
        "iat": now(),
        "exp": now() + 3600,
    })
}

pub fn sign_rs256(claims: &Value, kid: Option<&str>, private_pem: &str) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = kid.map(str::to_string);
    let key = EncodingKey::from_rsa_pem(private_pem.as_bytes()).unwrap();
    jsonwebtoken::encode(&header, claims, &key).unwrap()
}
