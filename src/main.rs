// ============================================================================
// CryptoDash - Dashboard crypto dans le terminal
// ============================================================================
// Affiche les prix des principales cryptos en cartes ou en tableau,
// filtrables au clavier, rafraîchis depuis CoinCap toutes les 60 secondes.
// Si l'API ne répond pas, un jeu de données de secours est affiché.
//
// ARCHITECTURE :
// 1. Runtime tokio : exécute le timer de rafraîchissement (Poller)
// 2. Event loop synchrone : rendu ratatui + clavier crossterm
// 3. Channel mpsc : le Poller envoie des PollEvent, la boucle les applique
// ============================================================================

use std::io;
use std::sync::mpsc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info};

use cryptodash::api::CoinClient;
use cryptodash::app::App;
use cryptodash::config::Config;
use cryptodash::poller::{PollEvent, Poller};
use cryptodash::ui::{events::EventHandler, render};

// ============================================================================
// Initialisation du logging
// ============================================================================
// Les println! ne fonctionnent pas une fois le TUI lancé : on log vers un
// fichier avec rotation quotidienne.
// ============================================================================

/// Initialise le système de logging vers fichier
///
/// Les logs sont écrits dans :
/// - Linux : ~/.local/share/cryptodash/logs/cryptodash.log
/// - macOS : ~/Library/Application Support/cryptodash/logs/cryptodash.log
/// - Windows : C:\Users\<user>\AppData\Local\cryptodash\logs\cryptodash.log
/// - Sinon : ./logs/cryptodash.log
///
/// # Utilisation
/// ```bash
/// tail -f ~/.local/share/cryptodash/logs/cryptodash.log
/// RUST_LOG=cryptodash=trace cargo run
/// ```
fn init_logging() -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = dirs::data_local_dir()
        .map(|dir| dir.join("cryptodash").join("logs"))
        .unwrap_or_else(|| std::path::PathBuf::from("./logs"));

    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "cryptodash.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false) // Pas de codes couleur dans le fichier
                .with_target(true)
                .with_thread_ids(true) // Le poller tourne sur les threads tokio
                .with_line_number(true),
        )
        .with(
            // Par défaut : debug pour cryptodash, info pour les dépendances
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cryptodash=debug,info".into()),
        )
        .init();

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    init_logging().unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    info!("CryptoDash starting up");
    let config = Config::from_env();

    // Runtime tokio dédié au timer et aux appels HTTP
    // CONCEPT : main() reste synchrone pour le TUI
    let runtime = tokio::runtime::Runtime::new().context("Échec de la création du runtime tokio")?;

    let client = CoinClient::new(&config)?;
    let (event_tx, event_rx) = mpsc::channel::<PollEvent>();
    let mut poller = Poller::new(&config, client, event_tx, runtime.handle().clone());

    let mut app = App::new().with_flash_duration(config.flash_duration);

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    // Premier cycle immédiat, puis toutes les refresh_interval
    poller.start();

    let events = EventHandler::new();
    info!("Starting event loop");
    let result = run(&mut terminal, &mut app, &events, &mut poller, &event_rx);

    // Restaure le terminal (même en cas d'erreur)
    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    poller.stop();
    runtime.shutdown_timeout(Duration::from_millis(500));

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

// ============================================================================
// Event Loop Principal
// ============================================================================
// À chaque itération :
//   0. Appliquer les événements du poller (nouvelles données)
//   1. Relancer le polling si un retry a été demandé
//   2. Dessiner l'interface (render)
//   3. Traiter le clavier (input)
//   4. Mettre à jour l'état (tick : fin du flash)
// ============================================================================

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
    poller: &mut Poller,
    poll_rx: &mpsc::Receiver<PollEvent>,
) -> Result<()> {
    while app.is_running() {
        // try_iter() ne bloque pas : on vide ce qui est arrivé depuis la frame précédente
        for event in poll_rx.try_iter() {
            app.apply_poll_event(event);
        }

        if app.take_retry_request() {
            info!(was_running = poller.is_running(), "Restarting polling on user request");
            poller.start();
        }

        terminal.draw(|frame| render(frame, &*app))?;

        match events.next() {
            Ok(event) => handle_event(app, event),
            Err(e) => debug!(error = ?e, "Failed to read terminal event"),
        }

        app.tick();
    }

    Ok(())
}

// ============================================================================
// Gestion des événements
// ============================================================================

/// Traite un événement clavier et met à jour l'état de l'application
fn handle_event(app: &mut App, event: cryptodash::ui::events::Event) {
    use cryptodash::ui::events::{
        get_char_from_event, is_backspace_event, is_enter_event, is_escape_event,
        is_force_quit_event, is_quit_event, is_retry_event, is_search_char_event,
        is_search_event, is_toggle_mode_event, Event,
    };

    match event {
        Event::Key(_) if is_force_quit_event(&event) => {
            info!("User forced quit");
            app.quit();
        }

        // ========================================
        // Saisie de la recherche : capture toutes les touches
        // ========================================
        Event::Key(_) if app.is_searching() && is_escape_event(&event) => {
            debug!("Search cleared");
            app.cancel_search();
        }
        Event::Key(_) if app.is_searching() && is_enter_event(&event) => {
            debug!(term = %app.search, "Search kept");
            app.confirm_search();
        }
        Event::Key(_) if app.is_searching() && is_backspace_event(&event) => {
            app.backspace();
        }
        Event::Key(_) if app.is_searching() && is_search_char_event(&event) => {
            if let Some(c) = get_char_from_event(&event) {
                app.append_char(c);
            }
        }
        Event::Key(_) if app.is_searching() => {}

        // ========================================
        // Navigation normale
        // ========================================
        Event::Key(_) if is_quit_event(&event) => {
            if app.is_awaiting_quit_confirmation() {
                info!("User confirmed quit");
                app.quit();
            } else {
                info!("User requested quit (awaiting confirmation)");
                app.request_quit();
            }
        }

        Event::Key(_) if is_search_event(&event) => {
            app.cancel_quit();
            app.start_search();
        }

        Event::Key(_) if is_retry_event(&event) => {
            app.cancel_quit();
            app.request_retry();
        }

        Event::Key(_) if is_toggle_mode_event(&event) => {
            app.cancel_quit();
            app.toggle_mode();
            debug!(mode = app.mode.label(), "Display mode toggled");
        }

        // Esc hors saisie : efface un filtre conservé
        Event::Key(_) if is_escape_event(&event) => {
            app.cancel_quit();
            app.cancel_search();
        }

        Event::Key(_) => {
            // Toute autre touche : annule la confirmation de quit
            app.cancel_quit();
        }

        Event::Tick => {}
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================

/// Configure le terminal en mode TUI (raw mode + alternate screen)
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("Échec de l'activation du raw mode")?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

/// Restaure le terminal à son état normal
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
