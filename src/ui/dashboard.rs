// ============================================================================
// Dashboard - Rendu de l'interface principale
// ============================================================================
// Redessine toute l'interface à chaque frame : pas de diff incrémental,
// la collection visible est reconstruite en une passe.
//
// CONCEPTS RATATUI :
// 1. Layout : header / recherche / contenu / footer
// 2. Grille de cartes : Layout imbriqués (lignes puis colonnes)
// 3. Table : tableau statique avec Row et Cell
// 4. Style : vert = hausse, rouge = baisse
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::api::DataSource;
use crate::app::{App, DashboardMode, ViewState};
use crate::models::{CoinRecord, StaticCoin, Trend};
use crate::ui::format::{format_change, format_large_number, format_optional, format_price};

/// Largeur minimale d'une carte (colonnes)
const CARD_WIDTH: u16 = 30;

/// Hauteur d'une carte : 6 lignes de contenu + bordures
const CARD_HEIGHT: u16 = 8;

/// Dessine l'interface complète
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = create_layout(frame.size());

    render_header(frame, app, chunks[0]);
    render_search_bar(frame, app, chunks[1]);

    // Le tableau statique ne dépend pas du polling : affiché dès le départ.
    // Loading / Error / Data ne concerne que les cartes.
    match app.mode {
        DashboardMode::Table => render_table(frame, app, chunks[2]),
        DashboardMode::Cards => match &app.view {
            ViewState::Loading => render_loading(frame, chunks[2]),
            ViewState::Error(message) => render_error(frame, message, chunks[2]),
            ViewState::Data => render_cards(frame, app, chunks[2]),
        },
    }

    render_footer(frame, app, chunks[3]);
}

/// Header, recherche, contenu, footer
fn create_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Recherche
            Constraint::Min(0),    // Contenu
            Constraint::Length(3), // Footer
        ])
        .split(area)
        .to_vec()
}

fn trend_style(trend: Trend) -> Style {
    match trend {
        Trend::Positive => Style::default().fg(Color::Green),
        Trend::Negative => Style::default().fg(Color::Red),
    }
}

// ============================================================================
// Header : titre, dernière mise à jour, provenance
// ============================================================================

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" CryptoDash ")
        .title_alignment(Alignment::Center);

    let updated = app
        .last_update
        .map(|at| at.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_string());

    let mut spans = vec![
        Span::styled("Last update: ", Style::default().fg(Color::Gray)),
        Span::styled(updated, Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
        Span::raw("   "),
        Span::styled(format!("[{}]", app.mode.label()), Style::default().fg(Color::Cyan)),
    ];

    if let Some(source) = app.source {
        let color = match source {
            DataSource::Live => Color::Green,
            DataSource::Fallback => Color::Yellow,
        };
        spans.push(Span::raw("   "));
        spans.push(Span::styled(
            source.label(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Barre de recherche
// ============================================================================

fn render_search_bar(frame: &mut Frame, app: &App, area: Rect) {
    let border_color = if app.is_searching() { Color::Green } else { Color::DarkGray };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Search ");

    let line = if app.search.is_empty() && !app.is_searching() {
        Line::from(Span::styled(
            "Press / to filter by name or symbol",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut spans = vec![Span::styled(&app.search, Style::default().fg(Color::White))];
        if app.is_searching() {
            spans.push(Span::styled(
                "█",
                Style::default().fg(Color::White).add_modifier(Modifier::SLOW_BLINK),
            ));
        }
        Line::from(spans)
    };

    frame.render_widget(Paragraph::new(line).block(block), area);
}

// ============================================================================
// États Loading / Error
// ============================================================================

fn render_loading(frame: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Loading crypto data...",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
    ];

    let paragraph = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

fn render_error(frame: &mut Frame, message: &str, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Failed to load crypto data",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(message.to_string(), Style::default().fg(Color::Gray))),
        Line::from(""),
        Line::from(vec![
            Span::raw("Press "),
            Span::styled("[r]", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::raw(" to retry"),
        ]),
    ];

    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

fn render_no_match(frame: &mut Frame, area: Rect, search: &str) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("No coin matches \"{}\"", search),
            Style::default().fg(Color::Gray),
        )),
    ];

    let paragraph = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Grille de cartes
// ============================================================================

/// Dessine la collection filtrée en grille
///
/// Les cartes qui ne tiennent pas verticalement ne sont pas dessinées.
fn render_cards(frame: &mut Frame, app: &App, area: Rect) {
    let coins = app.visible_coins();
    if coins.is_empty() {
        render_no_match(frame, area, &app.search);
        return;
    }

    let columns = (area.width / CARD_WIDTH).max(1) as usize;
    let max_rows = (area.height / CARD_HEIGHT).max(1) as usize;
    let flashing = app.is_flashing();

    let rows: Vec<&[CoinRecord]> = coins.chunks(columns).take(max_rows).collect();

    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            rows.iter()
                .map(|_| Constraint::Length(CARD_HEIGHT))
                .chain(std::iter::once(Constraint::Min(0)))
                .collect::<Vec<_>>(),
        )
        .split(area);

    for (row, row_area) in rows.iter().zip(row_areas.iter()) {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, columns as u32); columns])
            .split(*row_area);

        for (coin, cell) in row.iter().zip(cells.iter()) {
            render_card(frame, coin, flashing, *cell);
        }
    }
}

/// Une carte : glyphe, nom, symbole, prix, variation, cap, volume
fn render_card(frame: &mut Frame, coin: &CoinRecord, flashing: bool, area: Rect) {
    let (trend, change) = format_change(coin.change_percent());

    let mut price_style = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
    if flashing {
        price_style = price_style.add_modifier(Modifier::REVERSED);
    }

    let label = Style::default().fg(Color::Gray);
    let text = vec![
        Line::from(vec![
            Span::styled(
                format!(" {} ", coin.icon()),
                Style::default().fg(Color::Black).bg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::styled(&coin.name, Style::default().add_modifier(Modifier::BOLD)),
        ]),
        Line::from(Span::styled(&coin.symbol, Style::default().fg(Color::Cyan))),
        Line::from(Span::styled(format_optional(coin.price(), format_price), price_style)),
        Line::from(Span::styled(change, trend_style(trend))),
        Line::from(vec![
            Span::styled("Market Cap  ", label),
            Span::raw(format_optional(coin.market_cap(), format_large_number)),
        ]),
        Line::from(vec![
            Span::styled("24h Volume  ", label),
            Span::raw(format_optional(coin.volume(), format_large_number)),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    frame.render_widget(Paragraph::new(text).block(block), area);
}

// ============================================================================
// Tableau statique
// ============================================================================

fn render_table(frame: &mut Frame, app: &App, area: Rect) {
    let coins: Vec<StaticCoin> = app.visible_static();
    if coins.is_empty() {
        render_no_match(frame, area, &app.search);
        return;
    }

    let header = Row::new(vec!["Name", "Symbol", "Price", "24h %"])
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    let rows = coins.iter().map(|coin| {
        Row::new(vec![
            Cell::from(coin.name.clone()),
            Cell::from(coin.symbol.clone()),
            Cell::from(coin.display_price()),
            Cell::from(coin.display_change()).style(trend_style(coin.trend())),
        ])
    });

    let widths = [
        Constraint::Percentage(35),
        Constraint::Percentage(15),
        Constraint::Percentage(25),
        Constraint::Percentage(25),
    ];

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Crypto Prices "),
    );

    frame.render_widget(table, area);
}

// ============================================================================
// Footer : raccourcis
// ============================================================================

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let key = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);

    let shortcuts = if app.is_awaiting_quit_confirmation() {
        Line::from(vec![
            Span::styled("⚠  Press ", key),
            Span::styled(
                "[q]",
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
            Span::styled(" again to quit, any other key to cancel ⚠", key),
        ])
    } else if app.is_searching() {
        Line::from(vec![
            Span::styled("[Enter]", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            Span::raw(" Keep filter  "),
            Span::styled("[Esc]", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::raw(" Clear"),
        ])
    } else {
        Line::from(vec![
            Span::styled("[q]", key),
            Span::raw(" Quit  "),
            Span::styled("[/]", key),
            Span::raw(" Search  "),
            Span::styled("[Tab]", key),
            Span::raw(" Cards/Table  "),
            Span::styled("[r]", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            Span::raw(" Refresh"),
        ])
    };

    let paragraph = Paragraph::new(shortcuts)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::FetchOutcome;
    use crate::models::mock_coins;
    use crate::poller::PollEvent;
    use ratatui::{backend::TestBackend, Terminal};

    /// Dessine l'app dans un terminal virtuel et renvoie le texte affiché
    fn draw(app: &App) -> String {
        let backend = TestBackend::new(120, 60);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();

        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn app_with_mock() -> App {
        let mut app = App::new();
        app.apply_poll_event(PollEvent::Loaded {
            outcome: FetchOutcome {
                coins: mock_coins(),
                source: DataSource::Fallback,
            },
            fetched_at: chrono::Local::now(),
        });
        app
    }

    #[test]
    fn test_loading_screen() {
        let screen = draw(&App::new());
        assert!(screen.contains("Loading crypto data..."));
    }

    #[test]
    fn test_error_screen() {
        let mut app = App::new();
        app.apply_poll_event(PollEvent::Failed("HTTP 503".into()));
        let screen = draw(&app);
        assert!(screen.contains("Failed to load crypto data"));
        assert!(screen.contains("HTTP 503"));
    }

    #[test]
    fn test_bitcoin_card() {
        let screen = draw(&app_with_mock());
        assert!(screen.contains("Bitcoin"));
        assert!(screen.contains("$45,230.50"));
        assert!(screen.contains("▲ 2.45%"));
        assert!(screen.contains("$885.00B"));
        assert!(screen.contains("$28.50B"));
        assert!(screen.contains("MOCK"));
    }

    #[test]
    fn test_filtered_cards() {
        let mut app = app_with_mock();
        app.append_char('e');
        app.append_char('t');
        app.append_char('h');

        let screen = draw(&app);
        assert!(screen.contains("Ethereum"));
        assert!(screen.contains("▼ 1.23%"));
        assert!(!screen.contains("Bitcoin"));
    }

    #[test]
    fn test_table_mode() {
        let mut app = app_with_mock();
        app.toggle_mode();

        let screen = draw(&app);
        assert!(screen.contains("Crypto Prices"));
        assert!(screen.contains("$65000"));
        assert!(screen.contains("-1.2%"));
    }

    #[test]
    fn test_table_shown_before_first_fetch() {
        let mut app = App::new();
        app.toggle_mode();

        let screen = draw(&app);
        assert!(screen.contains("$65000"));
        assert!(!screen.contains("Loading crypto data..."));

        // Même un échec du polling n'affecte pas le tableau
        app.apply_poll_event(PollEvent::Failed("HTTP 503".into()));
        let screen = draw(&app);
        assert!(screen.contains("$0.55"));
        assert!(!screen.contains("Failed to load crypto data"));
    }

    #[test]
    fn test_no_match() {
        let mut app = app_with_mock();
        app.append_char('z');
        let screen = draw(&app);
        assert!(screen.contains("No coin matches \"z\""));
    }
}
