//! Check-in contract binding.

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes};
use alloy::rpc::types::TransactionRequest;
use alloy::sol;
use alloy::sol_types::SolCall;

use crate::blockchain::types::{BlockchainError, BlockchainResult};

sol! {
    /// Daily check-in contract surface.
    interface IDailyCheckin {
        function checkIn(address referrer) external;
        function hasCheckedInToday(address player) external view returns (bool);
    }
}

/// Calldata for `checkIn(referrer)`.
pub fn check_in_calldata(referrer: Address) -> Bytes {
    IDailyCheckin::checkInCall { referrer }.abi_encode().into()
}

/// Calldata for `hasCheckedInToday(player)`.
pub fn has_checked_in_today_calldata(player: Address) -> Bytes {
    IDailyCheckin::hasCheckedInTodayCall { player }.abi_encode().into()
}

/// Decode the boolean returned by `hasCheckedInToday`.
pub fn decode_has_checked_in_today(output: &[u8]) -> BlockchainResult<bool> {
    IDailyCheckin::hasCheckedInTodayCall::abi_decode_returns(output)
        .map_err(|e| BlockchainError::Contract(format!("hasCheckedInToday: {}", e)))
}

/// Read-only `hasCheckedInToday(player)` call.
pub fn has_checked_in_today_request(contract: Address, player: Address) -> TransactionRequest {
    TransactionRequest::default()
        .with_to(contract)
        .with_input(has_checked_in_today_calldata(player))
}

/// Unsigned `checkIn` call from `from` to the contract, without gas or fee fields.
pub fn check_in_request(contract: Address, from: Address, referrer: Address) -> TransactionRequest {
    TransactionRequest::default()
        .with_from(from)
        .with_to(contract)
        .with_input(check_in_calldata(referrer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::U256;
    use alloy::sol_types::SolValue;

    #[test]
    fn test_check_in_selector() {
        let data = check_in_calldata(Address::ZERO);
        // selector + one padded address word
        assert_eq!(data.len(), 4 + 32);
        assert_eq!(&data[..4], IDailyCheckin::checkInCall::SELECTOR.as_slice());
    }

    #[test]
    fn test_decode_has_checked_in_today() {
        let encoded_true = true.abi_encode();
        assert!(decode_has_checked_in_today(&encoded_true).unwrap());

        let encoded_false = U256::ZERO.abi_encode();
        assert!(!decode_has_checked_in_today(&encoded_false).unwrap());
    }

    #[test]
    fn test_decode_rejects_empty_output() {
        let err = decode_has_checked_in_today(&[]).unwrap_err();
        assert!(err.to_string().contains("hasCheckedInToday"));
    }

    #[test]
    fn test_check_in_request_fields() {
        let contract = Address::repeat_byte(0x21);
        let from = Address::repeat_byte(0x01);
        let request = check_in_request(contract, from, Address::ZERO);
        assert_eq!(request.from, Some(from));
        assert_eq!(request.input.input(), Some(&check_in_calldata(Address::ZERO)));
    }
}
