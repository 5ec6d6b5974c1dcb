//! L1→L2 address aliasing.
//!
//! When an L1 account sends a message through the Inbox, the L2 sees it as
//! coming from `address + ALIAS_OFFSET (mod 2^160)`. Funds sent to the plain
//! address by mistake end up on that aliased address.

use alloy_primitives::{address, aliases::U160, Address};
use thiserror::Error;

/// Offset added by `AddressAliasHelper.applyL1ToL2Alias`.
pub const ALIAS_OFFSET: Address = address!("0x1111000000000000000000000000000000001111");

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("address is empty")]
    Empty,

    #[error("address must start with 0x")]
    MissingPrefix,

    #[error("address must have 40 hex digits, got {0}")]
    InvalidLength(usize),

    #[error("address contains non-hex characters")]
    InvalidHex,

    #[error("address checksum does not match")]
    InvalidChecksum,
}

fn to_u160(address: Address) -> U160 {
    U160::from_be_bytes(address.0 .0)
}

fn from_u160(value: U160) -> Address {
    Address::from(value.to_be_bytes::<20>())
}

/// Address an L1 sender appears as on L2.
pub fn apply_alias(address: Address) -> Address {
    from_u160(to_u160(address).wrapping_add(to_u160(ALIAS_OFFSET)))
}

/// Inverse of [`apply_alias`].
pub fn undo_alias(address: Address) -> Address {
    from_u160(to_u160(address).wrapping_sub(to_u160(ALIAS_OFFSET)))
}

/// Strictly parse a user supplied address.
///
/// Requires the `0x` prefix and 40 hex digits. Mixed-case input must carry
/// a valid EIP-55 checksum; all-lower or all-upper input is accepted as is.
pub fn parse_address(input: &str) -> Result<Address, AddressError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(AddressError::Empty);
    }

    let Some(digits) = input.strip_prefix("0x") else {
        return Err(AddressError::MissingPrefix);
    };

    if digits.len() != 40 {
        return Err(AddressError::InvalidLength(digits.len()));
    }

    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(AddressError::InvalidHex);
    }

    let address: Address = digits.parse().map_err(|_| AddressError::InvalidHex)?;

    let has_lower = digits.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = digits.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper && address.to_checksum(None) != input {
        return Err(AddressError::InvalidChecksum);
    }

    Ok(address)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_apply_alias_known_values() {
        assert_eq!(apply_alias(Address::ZERO), ALIAS_OFFSET);
        assert_eq!(
            apply_alias(address!("eeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee")),
            address!("ffffeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeffff")
        );
    }

    #[test]
    fn test_apply_alias_wraps_around() {
        assert_eq!(
            apply_alias(address!("ffffffffffffffffffffffffffffffffffffffff")),
            address!("1111000000000000000000000000000000001110")
        );
        assert_eq!(
            undo_alias(Address::ZERO),
            address!("eeeeffffffffffffffffffffffffffffffffeeef")
        );
    }

    #[test]
    fn test_alias_round_trip() {
        let samples = [
            Address::ZERO,
            Address::from([0xff; 20]),
            ALIAS_OFFSET,
            address!("5CFFA347b0aE99cc01E5c01714cA5658e54a23D1"),
            address!("eeeeffffffffffffffffffffffffffffffffeeef"),
        ];

        for a in samples {
            assert_eq!(undo_alias(apply_alias(a)), a);
            assert_eq!(apply_alias(undo_alias(a)), a);
        }
    }

    #[test]
    fn test_apply_alias_injective() {
        let mut aliased = HashSet::new();
        for i in 0..=255u8 {
            let mut bytes = [0u8; 20];
            bytes[0] = i;
            bytes[19] = i.wrapping_mul(31);
            assert!(aliased.insert(apply_alias(Address::from(bytes))));
        }
        assert_eq!(aliased.len(), 256);
    }

    #[test]
    fn test_parse_address_accepts() {
        let checksummed = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
        let expected = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

        assert_eq!(parse_address(checksummed), Ok(expected));
        assert_eq!(parse_address(&checksummed.to_lowercase()), Ok(expected));
        assert_eq!(
            parse_address("0xF39FD6E51AAD88F6F4CE6AB8827279CFFFB92266"),
            Ok(expected)
        );
        assert_eq!(parse_address(&format!(" {checksummed} ")), Ok(expected));
    }

    #[test]
    fn test_parse_address_rejects() {
        assert_eq!(parse_address(""), Err(AddressError::Empty));
        assert_eq!(parse_address("   "), Err(AddressError::Empty));
        assert_eq!(
            parse_address("5cffa347b0ae99cc01e5c01714ca5658e54a23d1"),
            Err(AddressError::MissingPrefix)
        );
        assert_eq!(
            parse_address("0x5cffa347b0ae99cc01e5c01714ca5658e54a23"),
            Err(AddressError::InvalidLength(38))
        );
        assert_eq!(
            parse_address("0x5cffa347b0ae99cc01e5c01714ca5658e54a23zz"),
            Err(AddressError::InvalidHex)
        );
        assert_eq!(
            parse_address("0xF39Fd6e51aad88F6F4ce6aB8827279cffFb92266"),
            Err(AddressError::InvalidChecksum)
        );
    }
}
