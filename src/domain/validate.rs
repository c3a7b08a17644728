//! Address format checks (shape only, no checksum verification)

use super::Chain;
use crate::error::ValidationError;

const BASE58: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

pub fn validate_address(chain: Chain, address: &str) -> Result<(), ValidationError> {
    let address = address.trim();
    if address.is_empty() {
        return Err(ValidationError::MissingField("address"));
    }

    let valid = match chain {
        Chain::Bitcoin => is_bitcoin(address),
        Chain::Solana => (32..=44).contains(&address.len()) && is_base58(address),
        Chain::Tron => {
            address.len() == 34 && address.starts_with('T') && is_base58(&address[1..])
        }
        Chain::Cardano => address.strip_prefix("addr1").is_some_and(|rest| {
            rest.len() == 98
                && rest
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        }),
        _ => is_evm(address),
    };

    if valid {
        Ok(())
    } else {
        Err(ValidationError::InvalidAddress {
            chain: chain.name().to_string(),
        })
    }
}

fn is_evm(address: &str) -> bool {
    address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .is_some_and(|hex| hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

fn is_bitcoin(address: &str) -> bool {
    if let Some(rest) = address.strip_prefix("bc1") {
        return (11..=71).contains(&rest.len())
            && rest
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
    }
    (26..=35).contains(&address.len())
        && (address.starts_with('1') || address.starts_with('3'))
        && is_base58(address)
}

fn is_base58(value: &str) -> bool {
    value.chars().all(|c| BASE58.contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evm_addresses() {
        assert!(validate_address(Chain::Ethereum, "0x742d35Cc6634C0532925a3b844Bc454e4438f44e").is_ok());
        assert!(validate_address(Chain::Polygon, "0x742d35Cc6634C0532925a3b844Bc454e4438f44").is_err());
        assert!(validate_address(Chain::Base, "742d35Cc6634C0532925a3b844Bc454e4438f44e").is_err());
    }

    #[test]
    fn test_non_evm_addresses() {
        assert!(validate_address(Chain::Bitcoin, "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa").is_ok());
        assert!(validate_address(Chain::Bitcoin, "bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq").is_ok());
        assert!(validate_address(Chain::Solana, "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM").is_ok());
        assert!(validate_address(Chain::Tron, "TLa2f6VPqDgRE67v1736s7bJ8Ray5wYjU7").is_ok());
        assert!(validate_address(Chain::Solana, "0OIl").is_err());
    }

    #[test]
    fn test_missing_address() {
        assert_eq!(
            validate_address(Chain::Ethereum, "  "),
            Err(ValidationError::MissingField("address"))
        );
    }
}
