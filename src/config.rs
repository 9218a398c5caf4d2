// ============================================================================
// Configuration
// ============================================================================
// Paramètres du dashboard avec valeurs par défaut, surchargeables via
// variables d'environnement.
//
// CONCEPT RUST : Default trait
// - Config::default() donne une configuration utilisable telle quelle
// - from_env() part du défaut et applique les surcharges valides
// ============================================================================

use std::time::Duration;

use tracing::{debug, warn};

/// Endpoint CoinCap (liste des actifs)
pub const DEFAULT_API_URL: &str = "https://api.coincap.io/v2/assets";

/// Nombre de cryptos demandées à l'API
pub const DEFAULT_LIMIT: usize = 10;

/// Intervalle entre deux cycles de rafraîchissement
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Durée du flash "mise à jour" sur les prix
pub const PRICE_FLASH_DURATION: Duration = Duration::from_millis(500);

/// Configuration du dashboard
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// URL de base de l'API (sans query string)
    pub api_url: String,

    /// Paramètre `limit` de la requête
    pub limit: usize,

    /// Période du timer de rafraîchissement
    pub refresh_interval: Duration,

    /// Timeout par requête. None : comportement par défaut de reqwest
    pub request_timeout: Option<Duration>,

    /// Durée du flash après chaque mise à jour
    pub flash_duration: Duration,

    /// Si true, toute erreur de fetch est remplacée par le jeu de secours.
    /// Si false, l'erreur remonte jusqu'à l'écran d'erreur.
    pub fallback_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            limit: DEFAULT_LIMIT,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            request_timeout: None,
            flash_duration: PRICE_FLASH_DURATION,
            fallback_enabled: true,
        }
    }
}

impl Config {
    /// Construit la configuration depuis l'environnement du processus
    ///
    /// Variables reconnues :
    /// - CRYPTODASH_API_URL
    /// - CRYPTODASH_LIMIT
    /// - CRYPTODASH_REFRESH_SECS
    /// - CRYPTODASH_TIMEOUT_SECS
    /// - CRYPTODASH_NO_FALLBACK (présente = fallback désactivé)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Même logique que from_env() avec une source de variables injectable
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("CRYPTODASH_API_URL") {
            let url = url.trim().to_string();
            if url.is_empty() {
                warn!("CRYPTODASH_API_URL is empty, keeping default");
            } else {
                config.api_url = url;
            }
        }

        if let Some(limit) = parse_positive(&lookup, "CRYPTODASH_LIMIT") {
            config.limit = limit as usize;
        }

        if let Some(secs) = parse_positive(&lookup, "CRYPTODASH_REFRESH_SECS") {
            config.refresh_interval = Duration::from_secs(secs);
        }

        if let Some(secs) = parse_positive(&lookup, "CRYPTODASH_TIMEOUT_SECS") {
            config.request_timeout = Some(Duration::from_secs(secs));
        }

        if lookup("CRYPTODASH_NO_FALLBACK").is_some() {
            config.fallback_enabled = false;
        }

        debug!(?config, "Configuration loaded");
        config
    }
}

/// Parse un entier strictement positif, log et ignore les valeurs invalides
fn parse_positive<F>(lookup: &F, key: &str) -> Option<u64>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<u64>() {
        Ok(value) if value > 0 => Some(value),
        _ => {
            warn!(key, value = %raw, "Invalid value, keeping default");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api_url, "https://api.coincap.io/v2/assets");
        assert_eq!(config.limit, 10);
        assert_eq!(config.refresh_interval, Duration::from_millis(60_000));
        assert_eq!(config.flash_duration, Duration::from_millis(500));
        assert!(config.request_timeout.is_none());
        assert!(config.fallback_enabled);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("CRYPTODASH_API_URL", "http://localhost:8080/assets"),
            ("CRYPTODASH_LIMIT", "25"),
            ("CRYPTODASH_REFRESH_SECS", "15"),
            ("CRYPTODASH_TIMEOUT_SECS", "5"),
            ("CRYPTODASH_NO_FALLBACK", "1"),
        ]));

        assert_eq!(config.api_url, "http://localhost:8080/assets");
        assert_eq!(config.limit, 25);
        assert_eq!(config.refresh_interval, Duration::from_secs(15));
        assert_eq!(config.request_timeout, Some(Duration::from_secs(5)));
        assert!(!config.fallback_enabled);
    }

    #[test]
    fn test_invalid_values_ignored() {
        let config = Config::from_lookup(lookup_from(&[
            ("CRYPTODASH_LIMIT", "abc"),
            ("CRYPTODASH_REFRESH_SECS", "0"),
            ("CRYPTODASH_API_URL", "  "),
        ]));

        assert_eq!(config, Config::default());
    }
}
