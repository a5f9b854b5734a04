use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Alignment, Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row as TableRow, Table, TableState};

use asset_board::config::AppConfig;
use asset_board::provider::spawn_provider;
use asset_board::rows::{Row, Tier, format_thousands};
use asset_board::state::{
    AppState, Column, Delta, LoadStatus, ProviderCommand, apply_delta, column_label, sort_arrow,
};

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
}

impl App {
    fn new(config: &AppConfig, cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        Self {
            state: AppState::new(config),
            should_quit: false,
            cmd_tx,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.search_active {
            self.on_search_key(key);
            return;
        }
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('/') => self.state.search_active = true,
            KeyCode::Char('c') => self.state.clear_search(Instant::now()),
            KeyCode::Char(c @ '0'..='9') => {
                if let Some(column) = column_for_key(c) {
                    self.state.sort_by(column);
                }
            }
            KeyCode::Char('t') => self.state.cycle_team_filter_next(),
            KeyCode::Char('T') => self.state.cycle_team_filter_prev(),
            KeyCode::Char('r') | KeyCode::Char('R') => self.request_load(true),
            KeyCode::Char('e') | KeyCode::Char('E') => self.request_export(),
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Esc => self.state.help_overlay = false,
            _ => {}
        }
    }

    fn on_search_key(&mut self, key: KeyEvent) {
        let now = Instant::now();
        match key.code {
            KeyCode::Enter => {
                self.state.apply_search_now();
                self.state.search_active = false;
            }
            KeyCode::Esc => self.state.search_active = false,
            KeyCode::Backspace => self.state.pop_search_char(now),
            KeyCode::Char(c) => self.state.push_search_char(c, now),
            _ => {}
        }
    }

    fn request_load(&mut self, announce: bool) {
        let Some(tx) = &self.cmd_tx else {
            if announce {
                self.state.push_log("[INFO] Data load unavailable");
            }
            return;
        };
        let source = self.state.data_source.clone();
        if tx.send(ProviderCommand::Load { source }).is_err() {
            self.state.push_log("[WARN] Load request failed");
        } else if announce {
            self.state.push_log(format!(
                "[INFO] Loading {}",
                self.state.data_source.label()
            ));
        }
    }

    fn request_export(&mut self) {
        if self.state.export.active && !self.state.export.done {
            self.state.push_log("[INFO] Export already running");
            return;
        }
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[INFO] Export unavailable");
            return;
        };
        let rows: Vec<Row> = self.state.visible_rows().into_iter().cloned().collect();
        let path = self.state.export_path.clone();
        if tx.send(ProviderCommand::Export { path, rows }).is_err() {
            self.state.push_log("[WARN] Export request failed");
        }
    }
}

fn column_for_key(key: char) -> Option<Column> {
    let idx = match key {
        '1'..='9' => key as usize - '1' as usize,
        '0' => 9,
        _ => return None,
    };
    Column::ALL.get(idx).copied()
}

fn main() -> io::Result<()> {
    let config = AppConfig::from_env();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_provider(tx, cmd_rx);

    let mut app = App::new(&config, Some(cmd_tx));
    app.request_load(true);
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    // Short tick so a pending search fires close to its debounce deadline.
    let tick_rate = Duration::from_millis(25);
    let mut table_state = TableState::default();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }
        let now = Instant::now();
        app.state.tick(now);
        app.state.maybe_clear_export(now);

        terminal.draw(|f| ui(f, &app.state, &mut table_state))?;

        if event::poll(tick_rate)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.on_key(key);
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, state: &AppState, table_state: &mut TableState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(state)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let filters = Paragraph::new(filter_line(state));
    frame.render_widget(filters, chunks[1]);

    render_table(frame, chunks[2], state, table_state);

    let console = Paragraph::new(console_text(state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[3]);

    let footer = Paragraph::new(footer_text(state)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[4]);

    if state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> Line<'static> {
    let status = match &state.load_status {
        LoadStatus::Idle => Span::styled("Idle", Style::default().fg(Color::DarkGray)),
        LoadStatus::Loading { source } => Span::styled(
            format!("Loading {source}..."),
            Style::default().fg(Color::Yellow),
        ),
        LoadStatus::Loaded { source, rows, at } => Span::styled(
            format!("{rows} rows from {source} at {}", at.format("%H:%M:%S")),
            Style::default().fg(Color::Green),
        ),
        LoadStatus::Failed { error, .. } => Span::styled(
            format!("Error loading data: {error}"),
            Style::default().fg(Color::Red),
        ),
    };
    let mut spans = vec![
        Span::styled(
            "ASSET BOARD",
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | "),
        status,
    ];
    if state.export.active {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(
            state.export.message.clone(),
            Style::default().fg(Color::Cyan),
        ));
    }
    Line::from(spans)
}

fn filter_line(state: &AppState) -> Line<'static> {
    let search_style = if state.search_active {
        Style::default().fg(Color::White).bg(Color::DarkGray)
    } else {
        Style::default()
    };
    let pending = if state.search_debounce.is_pending() {
        "…"
    } else {
        ""
    };
    let teams = state.team_options();
    let team_label = state.team_filter.label().to_string();
    let team_pos = teams
        .iter()
        .position(|t| *t == team_label)
        .map(|p| p + 1)
        .unwrap_or(1);
    Line::from(vec![
        Span::raw(" Search: "),
        Span::styled(format!("[{}]{pending}", state.search_input), search_style),
        Span::raw("   Team: "),
        Span::styled(
            format!("{team_label} ({team_pos}/{})", teams.len()),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            "   Showing {}/{}",
            state.visible_indices().len(),
            state.store.len()
        )),
    ])
}

fn render_table(frame: &mut Frame, area: Rect, state: &AppState, table_state: &mut TableState) {
    let rows = state.visible_rows();
    if rows.is_empty() {
        let message = if state.store.is_empty() {
            "No data loaded"
        } else {
            "No rows match the current filters"
        };
        let empty = Paragraph::new(message)
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(empty, area);
        return;
    }

    let header_style = Style::default().add_modifier(Modifier::BOLD);
    let header = TableRow::new(Column::ALL.iter().map(|column| {
        let text = format!("{}{}", column_label(*column), sort_arrow(state, *column));
        let style = match column {
            Column::Tier(tier) => header_style.fg(tier_color(*tier)),
            _ => header_style,
        };
        aligned_cell(text, *column, style)
    }));

    let body = rows.iter().map(|row| {
        TableRow::new(Column::ALL.iter().map(|column| {
            let (text, style) = cell_text(row, *column);
            aligned_cell(text, *column, style)
        }))
    });

    let table = Table::new(body, column_widths())
        .header(header)
        .block(Block::default().borders(Borders::ALL))
        .highlight_style(Style::default().fg(Color::White).bg(Color::DarkGray));

    table_state.select(Some(state.selected.min(rows.len() - 1)));
    frame.render_stateful_widget(table, area, table_state);
}

fn cell_text(row: &Row, column: Column) -> (String, Style) {
    match column {
        Column::Rank => (row.rank.to_string(), Style::default().fg(Color::Gray)),
        Column::Player => (row.player.clone(), Style::default().fg(Color::Gray)),
        Column::Team => (row.team.clone(), Style::default().fg(Color::Gray)),
        Column::Tier(tier) => (
            format_thousands(row.values.get(tier)),
            Style::default().fg(tier_color(tier)),
        ),
    }
}

fn aligned_cell(text: String, column: Column, style: Style) -> Cell<'static> {
    let alignment = if column.is_numeric() {
        Alignment::Right
    } else {
        Alignment::Left
    };
    Cell::from(Line::from(text).alignment(alignment)).style(style)
}

fn column_widths() -> [Constraint; 10] {
    [
        Constraint::Length(6),
        Constraint::Min(20),
        Constraint::Length(16),
        Constraint::Length(11),
        Constraint::Length(11),
        Constraint::Length(11),
        Constraint::Length(11),
        Constraint::Length(11),
        Constraint::Length(11),
        Constraint::Length(11),
    ]
}

fn tier_color(tier: Tier) -> Color {
    match tier {
        Tier::Common => Color::Blue,
        Tier::Uncommon => Color::Green,
        Tier::Rare => Color::Rgb(251, 146, 60),
        Tier::Epic => Color::Red,
        Tier::Legendary => Color::Magenta,
        Tier::Mystic => Color::Yellow,
        Tier::Iconic => Color::Rgb(244, 114, 182),
    }
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    let start = state.logs.len().saturating_sub(3);
    state
        .logs
        .iter()
        .skip(start)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn footer_text(state: &AppState) -> String {
    if state.search_active {
        "Type to search | Enter Apply | Backspace Delete | Esc Done".to_string()
    } else {
        "/ Search | c Clear | 1-9,0 Sort | t/T Team | r Reload | e Export | j/k Move | ? Help | q Quit"
            .to_string()
    }
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let mut lines = vec![
        "Asset Board - Help".to_string(),
        String::new(),
        "  /            Search player names".to_string(),
        "  c            Clear search".to_string(),
        "  t / T        Next / previous team".to_string(),
        "  r            Reload data".to_string(),
        "  e            Export visible rows (.xlsx)".to_string(),
        "  j/k or ↑/↓   Move".to_string(),
        "  ?            Toggle help".to_string(),
        "  q            Quit".to_string(),
        String::new(),
        "Sort (press again to reverse):".to_string(),
    ];
    for (idx, column) in Column::ALL.iter().enumerate() {
        let key = if idx == 9 { 0 } else { idx + 1 };
        lines.push(format!("  {key}            {}", column_label(*column)));
    }

    let help = Paragraph::new(lines.join("\n"))
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
