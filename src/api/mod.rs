// ============================================================================
// Module : api
// ============================================================================
// Clients API pour récupérer les données de marché
// ============================================================================

pub mod coincap; // Client API CoinCap

// Re-export des types principaux
pub use coincap::{CoinClient, DataSource, FetchOutcome};
