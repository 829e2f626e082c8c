use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Buy,
    Sell,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Buy => "BUY",
            Direction::Sell => "SELL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MarketContext {
    Bullish,
    Bearish,
    Undetermined,
}

impl fmt::Display for MarketContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketContext::Bullish => write!(f, "BULLISH"),
            MarketContext::Bearish => write!(f, "BEARISH"),
            MarketContext::Undetermined => write!(f, "UNDETERMINED"),
        }
    }
}

impl MarketContext {
    /// The trade direction this context calls for, if any.
    pub fn to_direction(self) -> Option<Direction> {
        match self {
            MarketContext::Bullish => Some(Direction::Buy),
            MarketContext::Bearish => Some(Direction::Sell),
            MarketContext::Undetermined => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtremumKind {
    High,
    Low,
}

impl fmt::Display for ExtremumKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtremumKind::High => write!(f, "high"),
            ExtremumKind::Low => write!(f, "low"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_maps_to_direction() {
        assert_eq!(MarketContext::Bullish.to_direction(), Some(Direction::Buy));
        assert_eq!(MarketContext::Bearish.to_direction(), Some(Direction::Sell));
        assert_eq!(MarketContext::Undetermined.to_direction(), None);
    }

    #[test]
    fn serde_uses_wire_names() {
        assert_eq!(serde_json::to_string(&Direction::Sell).unwrap(), "\"SELL\"");
        assert_eq!(
            serde_json::to_string(&MarketContext::Bullish).unwrap(),
            "\"BULLISH\""
        );
    }
}
