//! Validation worker (spec section 4.3, "Validation worker").

use crate::errors::ValidationError;
use lscc_core::crypto::SignatureVerifier;
use lscc_state::Transaction;

/// A validation request drained by the worker; `shard_exists` lets the
/// caller inject shard-registry knowledge without this crate depending
/// on `ShardManager` directly.
pub struct ValidationRequest<'a> {
    pub transaction: &'a Transaction,
    pub from_shard: u32,
    pub to_shard: u32,
}

/// Runs the three checks from spec section 4.3 in order: `cross_shard`,
/// `balance`, `signature`.
pub fn validate<F>(
    request: &ValidationRequest<'_>,
    shard_exists: F,
    verifier: &dyn SignatureVerifier,
) -> Result<(), ValidationError>
where
    F: Fn(u32) -> bool,
{
    if request.from_shard == request.to_shard {
        return Err(ValidationError::UnknownShard(request.to_shard));
    }
    if !shard_exists(request.from_shard) {
        return Err(ValidationError::UnknownShard(request.from_shard));
    }
    if !shard_exists(request.to_shard) {
        return Err(ValidationError::UnknownShard(request.to_shard));
    }
    if request.transaction.sender.is_empty() || request.transaction.receiver.is_empty() {
        return Err(ValidationError::UnknownShard(request.to_shard));
    }

    if request.transaction.amount == 0 {
        return Err(ValidationError::InvalidAmount);
    }

    if !verifier.verify(
        request.transaction.sender.as_bytes(),
        request.transaction.id.as_bytes(),
        &request.transaction.signature,
    ) {
        return Err(ValidationError::InvalidSignature);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lscc_core::crypto::NoopSignatureVerifier;
    use lscc_state::Transaction;

    fn tx(signature: Vec<u8>) -> Transaction {
        Transaction::new("alice".into(), "bob".into(), 10, 1, 1, signature, 1_000, vec![])
    }

    #[test]
    fn rejects_same_shard_as_not_cross_shard() {
        let t = tx(b"sig".to_vec());
        let req = ValidationRequest {
            transaction: &t,
            from_shard: 0,
            to_shard: 0,
        };
        let verifier = NoopSignatureVerifier;
        assert!(validate(&req, |_| true, &verifier).is_err());
    }

    #[test]
    fn rejects_empty_signature() {
        let t = tx(vec![]);
        let req = ValidationRequest {
            transaction: &t,
            from_shard: 0,
            to_shard: 1,
        };
        let verifier = NoopSignatureVerifier;
        assert_eq!(validate(&req, |_| true, &verifier), Err(ValidationError::InvalidSignature));
    }

    #[test]
    fn accepts_well_formed_request() {
        let t = tx(b"a-non-empty-signature".to_vec());
        let req = ValidationRequest {
            transaction: &t,
            from_shard: 0,
            to_shard: 1,
        };
        let verifier = NoopSignatureVerifier;
        assert!(validate(&req, |_| true, &verifier).is_ok());
    }
}
