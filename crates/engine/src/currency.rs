use serde::{Deserialize, Serialize};

use crate::EngineError;

/// In-game currency held in a [`Wallet`](crate::Wallet).
///
/// Quest completion only ever grants `Gold`; `Diamond` is granted by channels
/// outside the engine and can only be spent here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Currency {
    Gold,
    Diamond,
}

impl Currency {
    pub const ALL: [Currency; 2] = [Currency::Gold, Currency::Diamond];

    /// Canonical currency code, as stored in the database.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Gold => "gold",
            Currency::Diamond => "diamond",
        }
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "gold" => Ok(Currency::Gold),
            "diamond" => Ok(Currency::Diamond),
            other => Err(EngineError::InvalidValue(format!(
                "unsupported currency: {other}"
            ))),
        }
    }
}
