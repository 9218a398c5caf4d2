// ============================================================================
// Filtre de recherche
// ============================================================================
// Sous-chaîne insensible à la casse sur le nom OU le symbole
//
// CONCEPT RUST : Trait + générique
// - Searchable est implémenté par CoinRecord et StaticCoin
// - filter_coins<T> fonctionne pour les deux sans dispatch dynamique
// ============================================================================

use crate::models::{CoinRecord, StaticCoin};

/// Un élément filtrable par nom ou symbole
pub trait Searchable {
    fn name(&self) -> &str;
    fn symbol(&self) -> &str;
}

impl Searchable for CoinRecord {
    fn name(&self) -> &str {
        &self.name
    }

    fn symbol(&self) -> &str {
        &self.symbol
    }
}

impl Searchable for StaticCoin {
    fn name(&self) -> &str {
        &self.name
    }

    fn symbol(&self) -> &str {
        &self.symbol
    }
}

/// Vérifie si un élément correspond au terme de recherche
///
/// Un terme vide correspond à tout.
pub fn matches<T: Searchable>(item: &T, term: &str) -> bool {
    let needle = term.to_lowercase();
    item.name().to_lowercase().contains(&needle) || item.symbol().to_lowercase().contains(&needle)
}

/// Filtre une collection en conservant l'ordre
pub fn filter_coins<T: Searchable + Clone>(items: &[T], term: &str) -> Vec<T> {
    items
        .iter()
        .filter(|item| matches(*item, term))
        .cloned()
        .collect()
}
