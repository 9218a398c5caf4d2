// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état global du dashboard
//
// CONCEPTS RUST :
// 1. State Management : tout l'état de l'UI dans une seule structure
// 2. Machine à états : ViewState + table de transitions explicite
// 3. Remplacement en bloc : la collection n'est jamais modifiée en place
//
// PATTERN : "Application State"
// - Le rendu lit depuis App
// - Les événements du poller et du clavier passent par les méthodes de App
// ============================================================================

use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

use crate::api::DataSource;
use crate::config::PRICE_FLASH_DURATION;
use crate::models::{filter_coins, static_coins, CoinRecord, StaticCoin};
use crate::poller::PollEvent;

// ============================================================================
// Enum : ViewState
// ============================================================================
// Trois états mutuellement exclusifs pour la zone principale.
//
// Avec la politique de repli active (défaut), aucun événement Failed n'est
// émis : Error est inatteignable. Il le devient dès que le repli est
// désactivé dans la configuration.
// ============================================================================

/// État visuel de la zone principale
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    /// Premier chargement en cours
    Loading,

    /// Échec sans aucune donnée à afficher
    Error(String),

    /// Collection affichée
    Data,
}

/// Entrées de la machine à états
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    /// Début de cycle. `has_data` : une collection est déjà affichée
    CycleStarted { has_data: bool },

    /// Collection reçue (API ou repli)
    Loaded,

    /// Fetch en échec
    Failed { message: String, has_data: bool },
}

impl ViewState {
    /// Table de transitions
    ///
    /// | état    | événement                  | suivant |
    /// |---------|----------------------------|---------|
    /// | *       | CycleStarted (sans données) | Loading |
    /// | s       | CycleStarted (avec données) | s       |
    /// | *       | Loaded                     | Data    |
    /// | *       | Failed (sans données)      | Error   |
    /// | s       | Failed (avec données)      | s       |
    pub fn transition(self, event: &ViewEvent) -> ViewState {
        match event {
            ViewEvent::CycleStarted { has_data: false } => ViewState::Loading,
            ViewEvent::CycleStarted { has_data: true } => self,
            ViewEvent::Loaded => ViewState::Data,
            ViewEvent::Failed {
                message,
                has_data: false,
            } => ViewState::Error(message.clone()),
            ViewEvent::Failed { has_data: true, .. } => self,
        }
    }
}

/// Présentation de la collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardMode {
    /// Grille de cartes alimentée par l'API
    Cards,

    /// Tableau statique
    Table,
}

impl DashboardMode {
    pub fn toggle(self) -> Self {
        match self {
            DashboardMode::Cards => DashboardMode::Table,
            DashboardMode::Table => DashboardMode::Cards,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DashboardMode::Cards => "Cards",
            DashboardMode::Table => "Table",
        }
    }
}

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Dernière collection reçue du poller
    pub coins: Vec<CoinRecord>,

    /// Jeu fixe du tableau, construit une seule fois
    pub static_coins: Vec<StaticCoin>,

    /// Terme de recherche courant
    pub search: String,

    /// true pendant la saisie dans la barre de recherche
    pub search_active: bool,

    /// Loading / Error / Data
    pub view: ViewState,

    /// Cartes ou tableau
    pub mode: DashboardMode,

    /// Heure du dernier cycle terminé
    pub last_update: Option<DateTime<Local>>,

    /// Provenance de la collection affichée
    pub source: Option<DataSource>,

    /// Fin du flash "mise à jour" sur les prix
    pub flash_until: Option<Instant>,

    /// Durée du flash
    pub flash_duration: Duration,

    /// Two-step quit : première pression de 'q'
    pub confirm_quit: bool,

    /// Retry demandé, consommé par la boucle principale
    pub retry_requested: bool,
}

impl App {
    pub fn new() -> Self {
        Self {
            running: true,
            coins: Vec::new(),
            static_coins: static_coins(),
            search: String::new(),
            search_active: false,
            view: ViewState::Loading,
            mode: DashboardMode::Cards,
            last_update: None,
            source: None,
            flash_until: None,
            flash_duration: PRICE_FLASH_DURATION,
            confirm_quit: false,
            retry_requested: false,
        }
    }

    /// Utilise une durée de flash spécifique (config)
    pub fn with_flash_duration(mut self, duration: Duration) -> Self {
        self.flash_duration = duration;
        self
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    // ========================================================================
    // Événements du poller
    // ========================================================================

    /// Applique un événement du poller à l'état
    pub fn apply_poll_event(&mut self, event: PollEvent) {
        let has_data = !self.coins.is_empty();

        match event {
            PollEvent::CycleStarted => {
                debug!(has_data, "Poll cycle started");
                self.transition(ViewEvent::CycleStarted { has_data });
            }
            PollEvent::Loaded {
                outcome,
                fetched_at,
            } => {
                info!(
                    coins = outcome.coins.len(),
                    source = outcome.source.label(),
                    "Replacing coin collection"
                );
                // Remplacement complet : pas de diff, pas de merge
                self.coins = outcome.coins;
                self.source = Some(outcome.source);
                self.last_update = Some(fetched_at);
                self.flash_until = Some(Instant::now() + self.flash_duration);
                self.transition(ViewEvent::Loaded);
            }
            PollEvent::Failed(message) => {
                warn!(error = %message, has_data, "Poll cycle failed");
                self.transition(ViewEvent::Failed { message, has_data });
            }
        }
    }

    fn transition(&mut self, event: ViewEvent) {
        let previous = std::mem::replace(&mut self.view, ViewState::Loading);
        self.view = previous.transition(&event);
    }

    // ========================================================================
    // Filtrage
    // ========================================================================

    /// Cartes visibles : la dernière collection filtrée par la recherche
    pub fn visible_coins(&self) -> Vec<CoinRecord> {
        filter_coins(&self.coins, &self.search)
    }

    /// Lignes visibles du tableau statique
    pub fn visible_static(&self) -> Vec<StaticCoin> {
        filter_coins(&self.static_coins, &self.search)
    }

    // ========================================================================
    // Recherche (saisie live)
    // ========================================================================

    pub fn start_search(&mut self) {
        self.search_active = true;
    }

    /// Chaque frappe refiltre immédiatement
    pub fn append_char(&mut self, c: char) {
        self.search.push(c);
    }

    pub fn backspace(&mut self) {
        self.search.pop();
    }

    /// Enter : quitte la saisie en gardant le filtre
    pub fn confirm_search(&mut self) {
        self.search_active = false;
    }

    /// Esc : vide le filtre
    pub fn cancel_search(&mut self) {
        self.search_active = false;
        self.search.clear();
    }

    pub fn is_searching(&self) -> bool {
        self.search_active
    }

    // ========================================================================
    // Flash des prix
    // ========================================================================

    /// Vrai pendant `flash_duration` après chaque mise à jour
    pub fn is_flashing(&self) -> bool {
        self.flash_until
            .map(|until| Instant::now() < until)
            .unwrap_or(false)
    }

    /// Appelé à chaque itération : efface le flash expiré
    pub fn tick(&mut self) {
        if let Some(until) = self.flash_until {
            if Instant::now() >= until {
                self.flash_until = None;
            }
        }
    }

    // ========================================================================
    // Mode, retry, quit
    // ========================================================================

    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.toggle();
    }

    pub fn request_retry(&mut self) {
        self.retry_requested = true;
    }

    /// Retourne et réinitialise la demande de retry
    pub fn take_retry_request(&mut self) -> bool {
        std::mem::take(&mut self.retry_requested)
    }

    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::FetchOutcome;
    use crate::models::mock_coins;

    fn loaded(coins: Vec<CoinRecord>) -> PollEvent {
        PollEvent::Loaded {
            outcome: FetchOutcome {
                coins,
                source: DataSource::Fallback,
            },
            fetched_at: Local::now(),
        }
    }

    #[test]
    fn test_app_creation() {
        let app = App::new();
        assert!(app.is_running());
        assert!(app.coins.is_empty());
        assert_eq!(app.static_coins.len(), 4);
        assert_eq!(app.view, ViewState::Loading);
        assert_eq!(app.mode, DashboardMode::Cards);
    }

    #[test]
    fn test_transition_table() {
        let started_empty = ViewEvent::CycleStarted { has_data: false };
        let started_full = ViewEvent::CycleStarted { has_data: true };

        assert_eq!(ViewState::Data.transition(&started_empty), ViewState::Loading);
        assert_eq!(ViewState::Data.transition(&started_full), ViewState::Data);
        assert_eq!(ViewState::Loading.transition(&ViewEvent::Loaded), ViewState::Data);
        assert_eq!(
            ViewState::Error("x".into()).transition(&ViewEvent::Loaded),
            ViewState::Data
        );

        let failed_empty = ViewEvent::Failed {
            message: "boom".into(),
            has_data: false,
        };
        assert_eq!(
            ViewState::Loading.transition(&failed_empty),
            ViewState::Error("boom".into())
        );

        let failed_full = ViewEvent::Failed {
            message: "boom".into(),
            has_data: true,
        };
        assert_eq!(ViewState::Data.transition(&failed_full), ViewState::Data);
    }

    #[test]
    fn test_cycle_replaces_collection() {
        let mut app = App::new();

        app.apply_poll_event(PollEvent::CycleStarted);
        assert_eq!(app.view, ViewState::Loading);

        app.apply_poll_event(loaded(mock_coins()));
        assert_eq!(app.view, ViewState::Data);
        assert_eq!(app.coins.len(), 8);
        assert_eq!(app.source, Some(DataSource::Fallback));
        assert!(app.last_update.is_some());

        // Deuxième cycle : pas de retour en Loading, collection remplacée
        app.apply_poll_event(PollEvent::CycleStarted);
        assert_eq!(app.view, ViewState::Data);

        let smaller: Vec<CoinRecord> = mock_coins().into_iter().take(3).collect();
        app.apply_poll_event(loaded(smaller));
        assert_eq!(app.coins.len(), 3);
    }

    #[test]
    fn test_failure_without_data_shows_error() {
        let mut app = App::new();
        app.apply_poll_event(PollEvent::CycleStarted);
        app.apply_poll_event(PollEvent::Failed("HTTP 503".into()));
        assert_eq!(app.view, ViewState::Error("HTTP 503".into()));

        // Un retry réussi ramène les données
        app.apply_poll_event(loaded(mock_coins()));
        assert_eq!(app.view, ViewState::Data);
    }

    #[test]
    fn test_failure_keeps_stale_data() {
        let mut app = App::new();
        app.apply_poll_event(loaded(mock_coins()));
        app.apply_poll_event(PollEvent::Failed("timeout".into()));

        assert_eq!(app.view, ViewState::Data);
        assert_eq!(app.coins.len(), 8);
    }

    #[test]
    fn test_search_filters_last_collection() {
        let mut app = App::new();
        app.apply_poll_event(loaded(mock_coins()));

        app.start_search();
        for c in "eth".chars() {
            app.append_char(c);
        }
        let visible = app.visible_coins();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].symbol, "ETH");

        // Le tableau statique est filtré avec le même terme
        assert_eq!(app.visible_static().len(), 1);

        app.backspace();
        app.backspace();
        app.backspace();
        assert_eq!(app.visible_coins().len(), 8);

        app.append_char('x');
        app.cancel_search();
        assert!(!app.is_searching());
        assert!(app.search.is_empty());
    }

    #[test]
    fn test_flash_expires() {
        let mut app = App::new().with_flash_duration(Duration::from_millis(0));
        app.apply_poll_event(loaded(mock_coins()));

        assert!(!app.is_flashing());
        app.tick();
        assert!(app.flash_until.is_none());

        let mut app = App::new().with_flash_duration(Duration::from_secs(60));
        app.apply_poll_event(loaded(mock_coins()));
        assert!(app.is_flashing());
        app.tick();
        assert!(app.flash_until.is_some());
    }

    #[test]
    fn test_retry_request_is_consumed() {
        let mut app = App::new();
        assert!(!app.take_retry_request());

        app.request_retry();
        assert!(app.take_retry_request());
        assert!(!app.take_retry_request());
    }

    #[test]
    fn test_toggle_mode_and_quit() {
        let mut app = App::new();
        app.toggle_mode();
        assert_eq!(app.mode, DashboardMode::Table);
        app.toggle_mode();
        assert_eq!(app.mode, DashboardMode::Cards);

        app.request_quit();
        assert!(app.is_awaiting_quit_confirmation());
        app.cancel_quit();
        assert!(!app.is_awaiting_quit_confirmation());
        app.quit();
        assert!(!app.is_running());
    }
}
