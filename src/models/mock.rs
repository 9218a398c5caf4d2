// ============================================================================
// Jeu de données de secours
// ============================================================================
// Utilisé chaque fois que l'API est injoignable ou renvoie une réponse
// invalide : le dashboard affiche toujours quelque chose.
// ============================================================================

use crate::models::CoinRecord;

/// Les 8 cryptos affichées quand l'API ne répond pas
pub fn mock_coins() -> Vec<CoinRecord> {
    vec![
        CoinRecord::new("bitcoin", "Bitcoin", "BTC", "45230.50", "2.45", "885000000000", "28500000000"),
        CoinRecord::new("ethereum", "Ethereum", "ETH", "2890.75", "-1.23", "347000000000", "15200000000"),
        CoinRecord::new("binance-coin", "BNB", "BNB", "312.40", "3.67", "48000000000", "1200000000"),
        CoinRecord::new("solana", "Solana", "SOL", "98.25", "5.12", "42000000000", "2100000000"),
        CoinRecord::new("ripple", "XRP", "XRP", "0.5234", "-0.89", "28000000000", "1500000000"),
        CoinRecord::new("cardano", "Cardano", "ADA", "0.4567", "1.78", "16000000000", "450000000"),
        CoinRecord::new("dogecoin", "Dogecoin", "DOGE", "0.0823", "4.23", "11500000000", "680000000"),
        CoinRecord::new("polkadot", "Polkadot", "DOT", "6.78", "-2.15", "9200000000", "320000000"),
    ]
}
