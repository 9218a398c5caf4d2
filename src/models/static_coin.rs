// ============================================================================
// Structure : StaticCoin
// ============================================================================
// Ligne du tableau statique : jeu fixe construit au démarrage, jamais modifié
// ============================================================================

use rust_decimal::Decimal;

use crate::models::Trend;

/// Une crypto du tableau statique (prix et variation numériques)
#[derive(Debug, Clone, PartialEq)]
pub struct StaticCoin {
    pub name: String,
    pub symbol: String,
    pub price: Decimal,
    pub change: Decimal,
}

impl StaticCoin {
    pub fn new(name: &str, symbol: &str, price: Decimal, change: Decimal) -> Self {
        Self {
            name: name.to_string(),
            symbol: symbol.to_string(),
            price,
            change,
        }
    }

    pub fn trend(&self) -> Trend {
        Trend::from_change(self.change)
    }

    /// Prix brut, sans groupement : "$65000", "$0.55"
    pub fn display_price(&self) -> String {
        format!("${}", self.price)
    }

    /// Variation signée telle quelle : "2.4%", "-1.2%"
    pub fn display_change(&self) -> String {
        format!("{}%", self.change)
    }
}

/// Les 4 lignes du tableau statique
pub fn static_coins() -> Vec<StaticCoin> {
    vec![
        StaticCoin::new("Bitcoin", "BTC", Decimal::new(65000, 0), Decimal::new(24, 1)),
        StaticCoin::new("Ethereum", "ETH", Decimal::new(3200, 0), Decimal::new(-12, 1)),
        StaticCoin::new("Solana", "SOL", Decimal::new(150, 0), Decimal::new(31, 1)),
        StaticCoin::new("Cardano", "ADA", Decimal::new(55, 2), Decimal::new(-5, 1)),
    ]
}
