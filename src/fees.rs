//! Fee envelope resolution.
//!
//! One submission carries a compute limit from `eth_estimateGas` and a unit
//! price composed of the endpoint's current gas price plus the caller's gwei
//! addend. Composition happens in [`U256`] and is checked into the signable
//! width at the end; fee values routinely exceed what narrower arithmetic
//! would carry exactly.

use crate::{constants::WEI_PER_GWEI, error::SubmitError};
use alloy::{
    network::TransactionBuilder,
    primitives::{Address, Bytes, U256},
    providers::Provider,
    rpc::types::TransactionRequest,
};

/// Fee parameters of one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeEnvelope {
    /// Compute limit for the transaction.
    pub gas_limit: u64,
    /// Unit price, in wei.
    pub gas_price: u128,
}

/// Scales a gwei amount to wei.
pub fn gwei_to_wei(gwei: U256) -> U256 {
    gwei.saturating_mul(U256::from(WEI_PER_GWEI))
}

/// Composes the signable unit price: queried base price plus addend, exact.
pub fn compose_gas_price(base: U256, addend_wei: U256) -> Result<u128, SubmitError> {
    let total = base
        .checked_add(addend_wei)
        .ok_or_else(|| SubmitError::Malformed("gas price addition overflows".into()))?;
    u128::try_from(total)
        .map_err(|_| SubmitError::Malformed("gas price exceeds the signable range".into()))
}

/// Resolves the fee envelope for one payload against the endpoint.
pub async fn resolve_fees<P: Provider>(
    provider: &P,
    from: Address,
    to: Address,
    input: &Bytes,
    extra_fee_gwei: U256,
) -> Result<FeeEnvelope, SubmitError> {
    let request = TransactionRequest::default()
        .with_from(from)
        .with_to(to)
        .with_input(input.clone());
    let gas_limit =
        provider.estimate_gas(request).await.map_err(SubmitError::from_transport)?;
    let base = provider.get_gas_price().await.map_err(SubmitError::from_transport)?;
    let gas_price = compose_gas_price(U256::from(base), gwei_to_wei(extra_fee_gwei))?;
    Ok(FeeEnvelope { gas_limit, gas_price })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gwei_scales_to_wei() {
        assert_eq!(gwei_to_wei(U256::from(3)), U256::from(3_000_000_000u64));
        assert_eq!(gwei_to_wei(U256::ZERO), U256::ZERO);
    }

    #[test]
    fn composition_is_exact_above_double_precision() {
        // Both terms above 2^53, where floating-point composition would drift.
        let base = U256::from(1u128 << 60);
        let addend = U256::from((1u128 << 60) + 7);
        assert_eq!(compose_gas_price(base, addend).unwrap(), (1u128 << 61) + 7);
    }

    #[test]
    fn zero_addend_keeps_base_price() {
        let base = U256::from(200_000_000_000u128);
        assert_eq!(compose_gas_price(base, U256::ZERO).unwrap(), 200_000_000_000);
    }

    #[test]
    fn unsignable_price_is_rejected() {
        let err = compose_gas_price(U256::MAX, U256::ZERO).unwrap_err();
        assert!(matches!(err, SubmitError::Malformed(_)));

        let err = compose_gas_price(U256::MAX, U256::from(1)).unwrap_err();
        assert!(matches!(err, SubmitError::Malformed(_)));
    }
}
