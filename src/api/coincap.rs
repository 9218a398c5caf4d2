// ============================================================================
// API Client : CoinCap
// ============================================================================
// Récupère la liste des cryptos depuis l'API CoinCap, avec repli sur le
// jeu de données de secours en cas d'échec
//
// CONCEPTS RUST :
// 1. async/await : l'appel réseau ne bloque pas la boucle UI
// 2. anyhow::Result + context : erreurs explicites côté fetch strict
// 3. Absorption d'erreur : fetch_or_fallback() ne renvoie jamais d'erreur
// ============================================================================

use anyhow::{Context, Result};
use tracing::{debug, info, instrument, warn};

use crate::config::Config;
use crate::models::{mock_coins, CoinListResponse, CoinRecord};

/// Provenance d'une collection affichée
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    /// Données fraîches de l'API
    Live,

    /// Jeu de secours (API injoignable ou réponse invalide)
    Fallback,
}

impl DataSource {
    pub fn label(&self) -> &'static str {
        match self {
            DataSource::Live => "LIVE",
            DataSource::Fallback => "MOCK",
        }
    }
}

/// Résultat d'un cycle de fetch : toujours une collection à afficher
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    pub coins: Vec<CoinRecord>,
    pub source: DataSource,
}

/// Client HTTP pour l'endpoint des actifs
///
/// CONCEPT RUST : Clone bon marché
/// - reqwest::Client est un Arc interne, cloner ne recrée pas le pool
/// - Le poller clone le client dans sa tâche de fond
#[derive(Debug, Clone)]
pub struct CoinClient {
    http: reqwest::Client,
    base_url: String,
    limit: usize,
}

impl CoinClient {
    /// Crée le client à partir de la configuration
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));

        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        let http = builder
            .build()
            .context("Échec de la création du client HTTP")?;

        Ok(Self {
            http,
            base_url: config.api_url.clone(),
            limit: config.limit,
        })
    }

    /// URL complète avec le paramètre limit
    pub fn build_url(&self) -> String {
        format!("{}?limit={}", self.base_url, self.limit)
    }

    /// Fetch strict : toute erreur (réseau, statut HTTP, JSON) est renvoyée
    #[instrument(skip(self), fields(limit = self.limit))]
    pub async fn fetch_coins(&self) -> Result<Vec<CoinRecord>> {
        let url = self.build_url();
        debug!(url = %url, "Sending HTTP request to CoinCap");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .context("Échec de la requête HTTP vers CoinCap")?;

        let status = response.status();
        debug!(status = %status, "Received HTTP response");

        if !status.is_success() {
            anyhow::bail!("CoinCap a retourné une erreur : HTTP {}", status);
        }

        let body: CoinListResponse = response
            .json()
            .await
            .context("Échec du parsing JSON de la réponse CoinCap")?;

        info!(coins = body.data.len(), "Successfully fetched coin list");
        Ok(body.data)
    }

    /// Fetch avec repli : ne renvoie jamais d'erreur
    ///
    /// En cas d'échec, log un diagnostic et substitue mock_coins().
    pub async fn fetch_or_fallback(&self) -> FetchOutcome {
        match self.fetch_coins().await {
            Ok(coins) => FetchOutcome {
                coins,
                source: DataSource::Live,
            },
            Err(e) => {
                warn!(error = ?e, "Using mock data due to API error");
                FetchOutcome {
                    coins: mock_coins(),
                    source: DataSource::Fallback,
                }
            }
        }
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
// Les appels HTTP sont testés contre un petit serveur TCP local qui renvoie
// une réponse figée : aucun accès réseau externe.
// ============================================================================
