// ============================================================================
// CryptoDash - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests
// ============================================================================

pub mod api;    // Client API CoinCap
pub mod app;    // État de l'application
pub mod config; // Configuration
pub mod models; // Structures de données
pub mod poller; // Timer de rafraîchissement
pub mod ui;     // Interface utilisateur
