//! Structural recognition of the bearer access token minted by Chat
//! Management (`chat_management::token::minter::Claims`), shared so the
//! Gateway and Chat Management never drift on the claim shape.
//!
//! This does not verify the token's signature - that requires either a live
//! JWKS fetch from Chat Management's `/.well-known/jwks.json` or a shared
//! `KeyStore`, neither of which this scaffold wires up. Callers must not
//! treat a structurally valid token as authenticated.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chat_management::token::minter::Claims;

/// Decodes the claims without verifying the signature. Returns `None` if
/// the token isn't even shaped like a chat-management access token.
///
/// TODO: replace with real signature verification once the Gateway has a
/// way to obtain Chat Management's current `KeyStore` (JWKS client or
/// shared secret store).
pub fn peek_claims(token: &str) -> Option<Claims> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    serde_json::from_slice(&bytes).ok()
}
