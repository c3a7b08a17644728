//! Supported networks and their native-unit conventions

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    Ethereum,
    Polygon,
    Bsc,
    Arbitrum,
    Optimism,
    Avalanche,
    Base,
    Blast,
    Linea,
    Scroll,
    Zksync,
    Solana,
    Bitcoin,
    Cardano,
    Tron,
}

impl Chain {
    pub const ALL: [Chain; 15] = [
        Chain::Ethereum,
        Chain::Polygon,
        Chain::Bsc,
        Chain::Arbitrum,
        Chain::Optimism,
        Chain::Avalanche,
        Chain::Base,
        Chain::Blast,
        Chain::Linea,
        Chain::Scroll,
        Chain::Zksync,
        Chain::Solana,
        Chain::Bitcoin,
        Chain::Cardano,
        Chain::Tron,
    ];

    /// Lower-case id used in backend URL paths
    pub fn slug(&self) -> &'static str {
        match self {
            Chain::Ethereum => "ethereum",
            Chain::Polygon => "polygon",
            Chain::Bsc => "bsc",
            Chain::Arbitrum => "arbitrum",
            Chain::Optimism => "optimism",
            Chain::Avalanche => "avalanche",
            Chain::Base => "base",
            Chain::Blast => "blast",
            Chain::Linea => "linea",
            Chain::Scroll => "scroll",
            Chain::Zksync => "zksync",
            Chain::Solana => "solana",
            Chain::Bitcoin => "bitcoin",
            Chain::Cardano => "cardano",
            Chain::Tron => "tron",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Chain::Ethereum => "Ethereum",
            Chain::Polygon => "Polygon",
            Chain::Bsc => "BNB Smart Chain",
            Chain::Arbitrum => "Arbitrum",
            Chain::Optimism => "Optimism",
            Chain::Avalanche => "Avalanche",
            Chain::Base => "Base",
            Chain::Blast => "Blast",
            Chain::Linea => "Linea",
            Chain::Scroll => "Scroll",
            Chain::Zksync => "zkSync Era",
            Chain::Solana => "Solana",
            Chain::Bitcoin => "Bitcoin",
            Chain::Cardano => "Cardano",
            Chain::Tron => "TRON",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Chain::Polygon => "MATIC",
            Chain::Bsc => "BNB",
            Chain::Avalanche => "AVAX",
            Chain::Solana => "SOL",
            Chain::Bitcoin => "BTC",
            Chain::Cardano => "ADA",
            Chain::Tron => "TRX",
            _ => "ETH",
        }
    }

    /// Decimal places of the smallest native unit (wei, lamports, satoshi, ...)
    pub fn decimals(&self) -> u32 {
        match self {
            Chain::Solana => 9,
            Chain::Bitcoin => 8,
            Chain::Cardano | Chain::Tron => 6,
            _ => 18,
        }
    }

    pub fn is_evm(&self) -> bool {
        !matches!(
            self,
            Chain::Solana | Chain::Bitcoin | Chain::Cardano | Chain::Tron
        )
    }

    /// Digits shown for amounts in this chain's native token
    pub fn display_decimals(&self) -> u32 {
        match self {
            Chain::Bitcoin => 8,
            Chain::Solana => 4,
            _ => 6,
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Chain {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        if wanted.is_empty() {
            return Err(ValidationError::MissingField("blockchain"));
        }
        let alias = match wanted.as_str() {
            "eth" => "ethereum",
            "matic" | "pol" => "polygon",
            "bnb" => "bsc",
            "arb" => "arbitrum",
            "op" => "optimism",
            "avax" => "avalanche",
            "sol" => "solana",
            "btc" => "bitcoin",
            "ada" => "cardano",
            "trx" => "tron",
            other => other,
        };
        Chain::ALL
            .into_iter()
            .find(|chain| chain.slug() == alias)
            .ok_or(ValidationError::UnknownChain(wanted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_slug_and_alias() {
        assert_eq!("Ethereum".parse::<Chain>(), Ok(Chain::Ethereum));
        assert_eq!("btc".parse::<Chain>(), Ok(Chain::Bitcoin));
        assert_eq!(
            "dogecoin".parse::<Chain>(),
            Err(ValidationError::UnknownChain("dogecoin".into()))
        );
        assert_eq!(
            " ".parse::<Chain>(),
            Err(ValidationError::MissingField("blockchain"))
        );
    }

    #[test]
    fn test_native_units() {
        assert_eq!(Chain::Bitcoin.decimals(), 8);
        assert_eq!(Chain::Solana.decimals(), 9);
        assert_eq!(Chain::Base.decimals(), 18);
        assert_eq!(Chain::Base.symbol(), "ETH");
        assert!(Chain::Arbitrum.is_evm());
        assert!(!Chain::Tron.is_evm());
    }
}
