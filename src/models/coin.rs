// ============================================================================
// Structure : CoinRecord
// ============================================================================
// Snapshot d'une cryptomonnaie tel que renvoyé par l'API CoinCap
//
// CONCEPTS RUST :
// 1. Serde : désérialisation JSON avec renommage camelCase
// 2. Prix en String : on garde la précision des très petites valeurs
//    (ex: "0.0000123") et on ne parse qu'au moment de l'affichage,
//    en Decimal (pas de f64) pour arrondir comme un humain
// 3. Immutabilité : un CoinRecord n'est jamais modifié, la collection
//    entière est remplacée à chaque cycle de rafraîchissement
// ============================================================================

use std::str::FromStr;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

/// Classification visuelle de la variation sur 24h
///
/// Zéro est classé positif.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Positive,
    Negative,
}

impl Trend {
    /// Classe une variation en pourcentage
    pub fn from_change(change: Decimal) -> Self {
        if change >= Decimal::ZERO {
            Trend::Positive
        } else {
            Trend::Negative
        }
    }

    /// Flèche directionnelle
    pub fn glyph(&self) -> char {
        match self {
            Trend::Positive => '▲',
            Trend::Negative => '▼',
        }
    }

    pub fn is_positive(&self) -> bool {
        *self == Trend::Positive
    }
}

/// Une cryptomonnaie avec ses données de marché
///
/// CONCEPT RUST : #[serde(rename_all = "camelCase")]
/// - "priceUsd" (JSON) -> price_usd (Rust)
/// - "changePercent24Hr" (JSON) -> change_percent_24hr (Rust)
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinRecord {
    /// Identifiant stable (ex: "bitcoin"), sert de clé pour le flash du prix
    pub id: String,

    /// Nom affiché (ex: "Bitcoin")
    pub name: String,

    /// Ticker (ex: "BTC"), jamais vide
    pub symbol: String,

    /// Prix en USD, chaîne décimale
    #[serde(default, deserialize_with = "null_as_empty")]
    pub price_usd: String,

    /// Variation sur 24h en pourcentage, chaîne décimale signée
    #[serde(default, deserialize_with = "null_as_empty")]
    pub change_percent_24hr: String,

    /// Capitalisation en USD
    #[serde(default, deserialize_with = "null_as_empty")]
    pub market_cap_usd: String,

    /// Volume échangé sur 24h en USD
    #[serde(rename = "volumeUsd24Hr", default, deserialize_with = "null_as_empty")]
    pub volume_usd_24hr: String,
}

/// Enveloppe de la réponse de l'API : { "data": [...] }
#[derive(Debug, Deserialize)]
pub struct CoinListResponse {
    pub data: Vec<CoinRecord>,
}

/// L'API CoinCap renvoie parfois `null` pour les champs numériques
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}

/// Parse une chaîne décimale, None si vide ou invalide
///
/// Accepte aussi la notation scientifique ("1.5e-7"), en dernier recours
/// via f64 pour les chaînes trop longues pour Decimal.
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
        .or_else(|| raw.parse::<f64>().ok().and_then(Decimal::from_f64))
}

impl CoinRecord {
    /// Constructeur pratique (jeu de données de secours, tests)
    pub fn new(
        id: &str,
        name: &str,
        symbol: &str,
        price_usd: &str,
        change_percent_24hr: &str,
        market_cap_usd: &str,
        volume_usd_24hr: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            symbol: symbol.to_string(),
            price_usd: price_usd.to_string(),
            change_percent_24hr: change_percent_24hr.to_string(),
            market_cap_usd: market_cap_usd.to_string(),
            volume_usd_24hr: volume_usd_24hr.to_string(),
        }
    }

    pub fn price(&self) -> Option<Decimal> {
        parse_decimal(&self.price_usd)
    }

    /// Variation sur 24h, 0 si absente ou invalide
    pub fn change_percent(&self) -> Decimal {
        parse_decimal(&self.change_percent_24hr).unwrap_or(Decimal::ZERO)
    }

    pub fn market_cap(&self) -> Option<Decimal> {
        parse_decimal(&self.market_cap_usd)
    }

    pub fn volume(&self) -> Option<Decimal> {
        parse_decimal(&self.volume_usd_24hr)
    }

    pub fn trend(&self) -> Trend {
        Trend::from_change(self.change_percent())
    }

    /// Glyphe de la carte : première lettre du symbole
    pub fn icon(&self) -> char {
        self.symbol.chars().next().unwrap_or('?')
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
