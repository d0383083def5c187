//! `SignatureVerifier` collaborator (section 6).
//!
//! The core is explicitly agnostic to signature schemes: signatures are
//! opaque validated tokens supplied by an external verifier. This module
//! only defines the contract and a minimal structural-validity
//! implementation useful for tests and as a starting point for a real
//! verifier wired in by the outer node.

/// Verifies an opaque signature token against a public key and payload.
///
/// Implementations of the cryptographic scheme itself (Ed25519, Dilithium,
/// ...) live outside this crate's scope; this trait is the seam.
pub trait SignatureVerifier: Send + Sync {
    /// Returns `true` if `sig` is a valid signature of `payload` under `pubkey`.
    fn verify(&self, pubkey: &[u8], payload: &[u8], sig: &[u8]) -> bool;
}

/// Structural-only verifier: accepts any non-empty signature token.
///
/// Used by tests and by components that only need to check "a signature
/// was supplied" (validation rule in section 4.3) without performing real
/// cryptography.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSignatureVerifier;

impl SignatureVerifier for NoopSignatureVerifier {
    fn verify(&self, _pubkey: &[u8], _payload: &[u8], sig: &[u8]) -> bool {
        !sig.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_verifier_rejects_empty_signature() {
        let v = NoopSignatureVerifier;
        assert!(!v.verify(b"pk", b"payload", b""));
        assert!(v.verify(b"pk", b"payload", b"sig"));
    }
}
