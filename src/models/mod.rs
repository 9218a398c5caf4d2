// ============================================================================
// Module : models
// ============================================================================
// Structures de données de l'application
//
// CONCEPT RUST : Modules et visibilité
// - "pub mod" : déclare un sous-module public
// - "pub use" : re-export pour simplifier les imports
// ============================================================================

pub mod coin;        // CoinRecord (données de l'API)
pub mod mock;        // Jeu de données de secours
pub mod search;      // Filtre de recherche
pub mod static_coin; // Tableau statique

// Au lieu de : use cryptodash::models::coin::CoinRecord;
// On peut faire : use cryptodash::models::CoinRecord;
pub use coin::{CoinListResponse, CoinRecord, Trend};
pub use mock::mock_coins;
pub use search::{filter_coins, matches, Searchable};
pub use static_coin::{static_coins, StaticCoin};
