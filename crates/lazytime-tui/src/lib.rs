// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use lazytime_app::{
    AppCommand, AppEvent, AppMode, AppState, FilterState, FormField, FormState, KeyInput,
    ListPanel, NoteStore, Section,
};
use log::debug;
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph};
use std::io;

const ACCENT: Color = Color::Indexed(63);
const SELECTED: Color = Color::Indexed(170);
const ITEM_HEIGHT: u16 = 2;
// Panel borders, the filter line, the help line and the status line.
const CHROME_ROWS: u16 = 5;
const FILTER_MARK_ACTIVE: &str = "▼";
const SELECT_MARK: &str = "│ ";
const FORM_HINT: &str = "Press Enter to continue or Esc to cancel";

pub fn run_app<S: NoteStore + ?Sized>(state: &mut AppState, store: &mut S) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let result = match Terminal::new(backend).context("create terminal") {
        Ok(mut terminal) => event_loop(&mut terminal, state, store),
        Err(error) => Err(error),
    };

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn event_loop<B: Backend, S: NoteStore + ?Sized>(
    terminal: &mut Terminal<B>,
    state: &mut AppState,
    store: &mut S,
) -> Result<()> {
    let size = terminal.size().context("read terminal size")?;
    start_session(state, store, size.height);

    loop {
        terminal
            .draw(|frame| render(frame, state))
            .context("draw frame")?;

        match event::read().context("read event")? {
            Event::Key(key) => {
                if handle_key_event(state, store, key) {
                    return Ok(());
                }
            }
            Event::Resize(width, height) => {
                debug!("event=terminal_resize module=tui status=ok width={width} height={height}");
                state.resize_panels(list_rows(height));
            }
            _ => {}
        }
    }
}

/// Loads every section and sizes the panels for a terminal `height` rows tall.
pub fn start_session<S: NoteStore + ?Sized>(state: &mut AppState, store: &mut S, height: u16) {
    state.dispatch(store, AppCommand::Reload);
    state.resize_panels(list_rows(height));
}

/// Rows of list items that fit in a panel for a terminal `height` rows tall.
pub fn list_rows(height: u16) -> usize {
    usize::from((height.saturating_sub(CHROME_ROWS) / ITEM_HEIGHT).max(1))
}

pub fn key_input_for(key: KeyEvent) -> Option<KeyInput> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    let input = match key.code {
        KeyCode::Char(ch) if key.modifiers.contains(KeyModifiers::CONTROL) => {
            KeyInput::Ctrl(ch.to_ascii_lowercase())
        }
        KeyCode::Char(ch) => KeyInput::Char(ch),
        KeyCode::Enter => KeyInput::Enter,
        KeyCode::Esc => KeyInput::Esc,
        KeyCode::Backspace => KeyInput::Backspace,
        KeyCode::Delete => KeyInput::Delete,
        KeyCode::Left => KeyInput::Left,
        KeyCode::Right => KeyInput::Right,
        KeyCode::Up => KeyInput::Up,
        KeyCode::Down => KeyInput::Down,
        KeyCode::Home => KeyInput::Home,
        KeyCode::End => KeyInput::End,
        KeyCode::PageUp => KeyInput::PageUp,
        KeyCode::PageDown => KeyInput::PageDown,
        KeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => KeyInput::BackTab,
        KeyCode::Tab => KeyInput::Tab,
        KeyCode::BackTab => KeyInput::BackTab,
        _ => return None,
    };
    Some(input)
}

/// Returns true when the session should end.
pub fn handle_key_event<S: NoteStore + ?Sized>(
    state: &mut AppState,
    store: &mut S,
    key: KeyEvent,
) -> bool {
    let Some(input) = key_input_for(key) else {
        return false;
    };
    let events = state.handle_key(store, input);
    events.contains(&AppEvent::QuitRequested)
}

pub fn render(frame: &mut ratatui::Frame<'_>, state: &AppState) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3); 3])
        .split(layout[0]);

    for section in Section::COLUMN_ORDER {
        let focused = state.mode == AppMode::Nav && state.focus == section;
        render_panel(
            frame,
            columns[section.column()],
            state.panel(section),
            focused,
        );
    }

    let help = Paragraph::new(help_text(state)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, layout[1]);

    let status = Paragraph::new(status_text(state)).style(Style::default().fg(Color::Yellow));
    frame.render_widget(status, layout[2]);

    if let AppMode::Form(form) = &state.mode {
        render_form(frame, form);
    }
}

fn render_panel(frame: &mut ratatui::Frame<'_>, area: Rect, panel: &ListPanel, focused: bool) {
    let border_style = if focused {
        Style::default().fg(ACCENT)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let block = Block::default()
        .title(panel_title(panel))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border_style);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(inner);

    let filter_line = Paragraph::new(filter_line_text(panel))
        .style(Style::default().fg(Color::Gray));
    frame.render_widget(filter_line, parts[0]);
    if focused && panel.is_filtering() {
        let x = parts[0].x + 1 + panel.filter_cursor() as u16;
        frame.set_cursor_position(Position::new(
            x.min(parts[0].right().saturating_sub(1)),
            parts[0].y,
        ));
    }

    let items: Vec<ListItem<'_>> = panel
        .visible_entries()
        .map(|entry| {
            ListItem::new(Text::from(vec![
                Line::from(entry.title.clone()),
                Line::from(Span::styled(
                    entry.description.clone(),
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::DIM),
                )),
            ]))
        })
        .collect();

    let highlight = if focused {
        Style::default().fg(SELECTED).add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };
    let list = List::new(items)
        .highlight_style(highlight)
        .highlight_symbol(SELECT_MARK);

    let mut list_state = ListState::default();
    if panel.visible_len() > 0 {
        list_state.select(Some(panel.cursor()));
    }
    *list_state.offset_mut() = panel.offset();
    frame.render_stateful_widget(list, parts[1], &mut list_state);
}

fn render_form(frame: &mut ratatui::Frame<'_>, form: &FormState) {
    let area = centered_rect(70, 60, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(form.title())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(ACCENT));
    let inner = block.inner(area);
    let body = Paragraph::new(form_lines(form)).block(block);
    frame.render_widget(body, area);

    let cursor = form_cursor(form, inner);
    if inner.contains(cursor) {
        frame.set_cursor_position(cursor);
    }
}

fn panel_title(panel: &ListPanel) -> String {
    let label = panel.section().label();
    match panel.filter_state() {
        FilterState::Applied => format!(" {label} {FILTER_MARK_ACTIVE} "),
        FilterState::Unfiltered | FilterState::Filtering => format!(" {label} "),
    }
}

fn filter_line_text(panel: &ListPanel) -> String {
    match panel.filter_state() {
        FilterState::Unfiltered => {
            let count = panel.entries().len();
            let noun = if count == 1 { "item" } else { "items" };
            format!("{count} {noun}")
        }
        FilterState::Filtering => format!("/{}", panel.filter_text()),
        FilterState::Applied => format!(
            "/{} ({} of {})",
            panel.filter_text(),
            panel.visible_len(),
            panel.entries().len()
        ),
    }
}

fn form_prompt(field: FormField) -> String {
    format!("{}: ", field.label())
}

fn form_lines(form: &FormState) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for field in FormField::ALL {
        let active = form.active() == field;
        let prompt_style = if active {
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let value = form.value(field);
        let value_span = if value.is_empty() {
            Span::styled(
                field.placeholder().to_owned(),
                Style::default().fg(Color::DarkGray),
            )
        } else {
            Span::raw(value.to_owned())
        };
        lines.push(Line::from(vec![
            Span::styled(form_prompt(field), prompt_style),
            value_span,
        ]));
        lines.push(Line::default());
    }

    match form.error() {
        Some(error) => lines.push(Line::from(Span::styled(
            error.to_owned(),
            Style::default().fg(Color::Red),
        ))),
        None => lines.push(Line::default()),
    }
    lines.push(Line::from(Span::styled(
        FORM_HINT,
        Style::default().fg(Color::DarkGray),
    )));
    lines
}

fn form_cursor(form: &FormState, inner: Rect) -> Position {
    let field = form.active();
    let column = form_prompt(field).chars().count() + form.input(field).cursor();
    Position::new(
        inner.x.saturating_add(column as u16),
        inner.y.saturating_add(field.index() as u16 * 2),
    )
}

fn help_text(state: &AppState) -> &'static str {
    match &state.mode {
        AppMode::Form(_) => "  enter: next/save • tab/shift+tab: field • esc: cancel",
        AppMode::Nav if state.focused_panel().is_filtering() => {
            "  type to filter • up/down: move • enter: apply • esc: clear"
        }
        AppMode::Nav => {
            "  /: search • l: forward • h: backward • a: add • d: delete • u: update • q: quit"
        }
    }
}

fn status_text(state: &AppState) -> String {
    state.status_line.clone().unwrap_or_default()
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
