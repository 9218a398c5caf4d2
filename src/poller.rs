// ============================================================================
// Poller : cycle de rafraîchissement périodique
// ============================================================================
// Possède l'unique timer répétitif de l'application. Chaque tick exécute un
// cycle fetch + notification vers la boucle UI.
//
// CONCEPTS RUST :
// 1. tokio::spawn + JoinHandle : le timer est une tâche de fond annulable
// 2. tokio::time::interval : premier tick immédiat, puis période fixe
// 3. mpsc channel : le poller envoie des PollEvent, l'UI les consomme
//    avec try_recv() sans jamais bloquer
// 4. RAII : Drop arrête le timer, un garde compte les timers actifs
// ============================================================================

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::api::{CoinClient, DataSource, FetchOutcome};
use crate::config::Config;

/// Événements envoyés par le poller à la boucle UI
#[derive(Debug, Clone)]
pub enum PollEvent {
    /// Début d'un cycle (l'UI passe en Loading si rien n'est affiché)
    CycleStarted,

    /// Nouvelle collection à afficher (remplace l'ancienne en entier)
    Loaded {
        outcome: FetchOutcome,
        fetched_at: DateTime<Local>,
    },

    /// Échec du fetch. N'arrive que si le repli est désactivé.
    Failed(String),
}

/// Compte les timers vivants : +1 à la création, -1 au drop de la tâche
struct TimerGuard {
    active: Arc<AtomicUsize>,
}

impl TimerGuard {
    fn new(active: Arc<AtomicUsize>) -> Self {
        active.fetch_add(1, Ordering::SeqCst);
        Self { active }
    }
}

impl Drop for TimerGuard {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Contrôleur du rafraîchissement
///
/// Invariant : au plus un timer actif. start() annule le précédent avant
/// d'en armer un nouveau.
pub struct Poller {
    client: CoinClient,
    refresh_interval: Duration,
    fallback_enabled: bool,
    events: mpsc::Sender<PollEvent>,
    runtime: Handle,
    timer: Option<JoinHandle<()>>,
    active: Arc<AtomicUsize>,
}

impl Poller {
    /// Crée un poller arrêté
    ///
    /// # Arguments
    /// * `config` - intervalle et politique de repli
    /// * `client` - client API
    /// * `events` - canal vers la boucle UI
    /// * `runtime` - runtime tokio sur lequel tourne le timer
    pub fn new(
        config: &Config,
        client: CoinClient,
        events: mpsc::Sender<PollEvent>,
        runtime: Handle,
    ) -> Self {
        Self {
            client,
            refresh_interval: config.refresh_interval,
            fallback_enabled: config.fallback_enabled,
            events,
            runtime,
            timer: None,
            active: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Lance un cycle immédiat puis un cycle toutes les `refresh_interval`
    ///
    /// Appelé au démarrage et à chaque retry : le timer précédent est
    /// annulé, il n'y en a jamais deux en parallèle.
    pub fn start(&mut self) {
        self.stop();

        let client = self.client.clone();
        let events = self.events.clone();
        let period = self.refresh_interval;
        let fallback_enabled = self.fallback_enabled;
        let guard = TimerGuard::new(self.active.clone());

        info!(interval_secs = period.as_secs_f64(), "Starting polling");

        let handle = self.runtime.spawn(async move {
            let _guard = guard;

            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if !run_cycle(&client, &events, fallback_enabled).await {
                    // La boucle UI est partie, plus personne n'écoute
                    debug!("Event receiver dropped, polling task exiting");
                    break;
                }
            }
        });

        self.timer = Some(handle);
    }

    /// Annule le timer actif s'il existe
    pub fn stop(&mut self) {
        if let Some(handle) = self.timer.take() {
            debug!("Cancelling active polling timer");
            handle.abort();
        }
    }

    /// Vrai si un timer a été armé et pas encore annulé
    pub fn is_running(&self) -> bool {
        self.timer
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Nombre de tâches timer encore vivantes
    pub fn active_timers(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Un cycle complet : notifie le début, fetch, envoie le résultat
///
/// Retourne false si le récepteur a disparu.
async fn run_cycle(
    client: &CoinClient,
    events: &mpsc::Sender<PollEvent>,
    fallback_enabled: bool,
) -> bool {
    if events.send(PollEvent::CycleStarted).is_err() {
        return false;
    }

    let event = if fallback_enabled {
        let outcome = client.fetch_or_fallback().await;
        PollEvent::Loaded {
            outcome,
            fetched_at: Local::now(),
        }
    } else {
        match client.fetch_coins().await {
            Ok(coins) => PollEvent::Loaded {
                outcome: FetchOutcome {
                    coins,
                    source: DataSource::Live,
                },
                fetched_at: Local::now(),
            },
            Err(e) => {
                error!(error = ?e, "Fetch failed and fallback is disabled");
                PollEvent::Failed(format!("{:#}", e))
            }
        }
    };

    events.send(event).is_ok()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::coincap::tests::{client_for, closed_url};
    use crate::models::mock_coins;
    use std::time::Instant;

    fn config(interval: Duration, fallback_enabled: bool) -> Config {
        Config {
            refresh_interval: interval,
            fallback_enabled,
            ..Config::default()
        }
    }

    /// Attend le prochain événement sans bloquer le runtime
    async fn next_event(rx: &mpsc::Receiver<PollEvent>, timeout: Duration) -> Option<PollEvent> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(event) = rx.try_recv() {
                return Some(event);
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        None
    }

    /// Collecte tous les événements reçus pendant `window`
    async fn collect_for(rx: &mpsc::Receiver<PollEvent>, window: Duration) -> Vec<PollEvent> {
        tokio::time::sleep(window).await;
        rx.try_iter().collect()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_immediate_cycle_with_fallback() {
        let url = closed_url().await;
        let (tx, rx) = mpsc::channel();
        let mut poller = Poller::new(
            &config(Duration::from_secs(60), true),
            client_for(&url),
            tx,
            Handle::current(),
        );

        poller.start();

        let first = next_event(&rx, Duration::from_secs(5)).await;
        assert!(matches!(first, Some(PollEvent::CycleStarted)));

        match next_event(&rx, Duration::from_secs(5)).await {
            Some(PollEvent::Loaded { outcome, .. }) => {
                assert_eq!(outcome.source, DataSource::Fallback);
                assert_eq!(outcome.coins, mock_coins());
            }
            other => panic!("expected Loaded, got {:?}", other),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_restart_keeps_single_timer() {
        let url = closed_url().await;
        let (tx, _rx) = mpsc::channel();
        let mut poller = Poller::new(
            &config(Duration::from_secs(60), true),
            client_for(&url),
            tx,
            Handle::current(),
        );

        poller.start();
        poller.start();
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(poller.is_running());
        assert_eq!(poller.active_timers(), 1);

        poller.stop();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!poller.is_running());
        assert_eq!(poller.active_timers(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_no_duplicate_cycles_after_restart() {
        let url = closed_url().await;
        let (tx, rx) = mpsc::channel();
        let mut poller = Poller::new(
            &config(Duration::from_millis(250), true),
            client_for(&url),
            tx,
            Handle::current(),
        );

        poller.start();
        poller.start();

        // Un seul timer : ticks à 0, 250 et 500 ms (+1 si la première tâche
        // a eu le temps de démarrer avant l'annulation). Deux timers en
        // donneraient au moins 6.
        let events = collect_for(&rx, Duration::from_millis(600)).await;
        let cycles = events
            .iter()
            .filter(|e| matches!(e, PollEvent::CycleStarted))
            .count();

        assert!(cycles >= 1, "no cycle observed");
        assert!(cycles <= 4, "duplicate timers: {} cycles", cycles);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_failure_surfaces_without_fallback() {
        let url = closed_url().await;
        let (tx, rx) = mpsc::channel();
        let mut poller = Poller::new(
            &config(Duration::from_secs(60), false),
            client_for(&url),
            tx,
            Handle::current(),
        );

        poller.start();

        assert!(matches!(
            next_event(&rx, Duration::from_secs(5)).await,
            Some(PollEvent::CycleStarted)
        ));
        assert!(matches!(
            next_event(&rx, Duration::from_secs(5)).await,
            Some(PollEvent::Failed(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_drop_cancels_timer() {
        let url = closed_url().await;
        let (tx, _rx) = mpsc::channel();
        let mut poller = Poller::new(
            &config(Duration::from_secs(60), true),
            client_for(&url),
            tx,
            Handle::current(),
        );
        poller.start();

        let active = poller.active.clone();
        drop(poller);
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(active.load(Ordering::SeqCst), 0);
    }
}
