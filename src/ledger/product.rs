use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Purchasable consumable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Product {
    ArcadeHint,
    ArcadeExtraTry,
    ArcadeNewGame,
}

impl Product {
    pub const ALL: [Self; 3] = [Self::ArcadeHint, Self::ArcadeExtraTry, Self::ArcadeNewGame];

    /// Identifier used by the payment provider and storage
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ArcadeHint => "arcade_hint",
            Self::ArcadeExtraTry => "arcade_extra_try",
            Self::ArcadeNewGame => "arcade_new_game",
        }
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown product: {0}")]
pub struct UnknownProduct(pub String);

impl FromStr for Product {
    type Err = UnknownProduct;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownProduct(s.to_string()))
    }
}
