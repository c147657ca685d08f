// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use dealgrid_app::{
    BulkAction, CellValue, ColumnAction, ColumnId, ColumnKey, ColumnKind, Deal, DealId,
    DealStage, GridCommand, GridEvent, GridState, HostRequest, RowAction, SortDirection,
    SortField, Totals, ViewCommand, ViewSlot, edit_seed, field_template, sort_indicator,
};
use dealgrid_app::validation::{format_compact_money, format_date, parse_money};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(4);
const POLL_INTERVAL: Duration = Duration::from_millis(120);
const PIXELS_PER_CELL: u16 = 8;
const MIN_CELL_WIDTH: u16 = 3;
const RESIZE_STEP: i32 = 10;
pub const DEFAULT_PAGE_ROWS: usize = 10;

/// Host side of the grid: receives every request the grid cannot complete
/// on its own (editors, email, scheduling, column tools).
pub trait AppRuntime {
    fn handle_request(&mut self, request: &HostRequest) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiOptions {
    /// Rows moved by ctrl+d and ctrl+u.
    pub page_rows: usize,
}

impl Default for UiOptions {
    fn default() -> Self {
        Self {
            page_rows: DEFAULT_PAGE_ROWS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InternalEvent {
    ClearStatus { token: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PromptKind {
    Search,
    Command,
    Edit { id: DealId, column: ColumnId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Prompt {
    kind: PromptKind,
    buffer: String,
}

impl Prompt {
    fn new(kind: PromptKind, seed: impl Into<String>) -> Self {
        Self {
            kind,
            buffer: seed.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ViewData {
    cursor_row: usize,
    cursor_col: usize,
    prompt: Option<Prompt>,
    help_visible: bool,
    notice: Option<String>,
    status_token: u64,
    page_rows: usize,
}

impl ViewData {
    fn new(options: UiOptions) -> Self {
        Self {
            cursor_row: 0,
            cursor_col: 0,
            prompt: None,
            help_visible: false,
            notice: None,
            status_token: 0,
            page_rows: options.page_rows.max(1),
        }
    }
}

/// Context a `:` command resolves against.
#[derive(Debug, Clone, Copy)]
struct PromptContext<'a> {
    row: Option<&'a DealId>,
    column: Option<&'a ColumnId>,
    has_selection: bool,
}

pub fn run_app<S: ViewSlot, R: AppRuntime>(
    grid: &mut GridState<S>,
    runtime: &mut R,
    options: UiOptions,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    let result = run_loop(&mut terminal, grid, runtime, options);

    disable_raw_mode().context("disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen).context("leave alternate screen")?;
    terminal.show_cursor().context("show cursor")?;

    result
}

fn run_loop<S: ViewSlot, R: AppRuntime>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    grid: &mut GridState<S>,
    runtime: &mut R,
    options: UiOptions,
) -> Result<()> {
    let (internal_tx, internal_rx) = mpsc::channel();
    let mut view_data = ViewData::new(options);

    loop {
        process_internal_events(grid, &mut view_data, &internal_rx);
        clamp_cursor(grid, &mut view_data);
        terminal
            .draw(|frame| render(frame, grid, &view_data))
            .context("draw frame")?;

        if !event::poll(POLL_INTERVAL).context("poll terminal events")? {
            continue;
        }

        match event::read().context("read terminal event")? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if handle_key_event(grid, runtime, &mut view_data, &internal_tx, key) {
                    break;
                }
            }
            _ => {}
        }
    }

    Ok(())
}

fn process_internal_events<S: ViewSlot>(
    grid: &mut GridState<S>,
    view_data: &mut ViewData,
    internal_rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = internal_rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                view_data.notice = None;
                grid.dispatch(GridCommand::ClearAnnouncement);
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

/// Returns true when the app should quit.
fn handle_key_event<S: ViewSlot, R: AppRuntime>(
    grid: &mut GridState<S>,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.help_visible {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
            view_data.help_visible = false;
        }
        return false;
    }

    if view_data.prompt.is_some() {
        handle_prompt_key(grid, runtime, view_data, internal_tx, key);
        return false;
    }

    handle_grid_key(grid, runtime, view_data, internal_tx, key);
    false
}

fn handle_prompt_key<S: ViewSlot, R: AppRuntime>(
    grid: &mut GridState<S>,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Esc => view_data.prompt = None,
        KeyCode::Backspace => {
            if let Some(prompt) = view_data.prompt.as_mut() {
                prompt.buffer.pop();
            }
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            if let Some(prompt) = view_data.prompt.as_mut() {
                prompt.buffer.push(ch);
            }
        }
        KeyCode::Enter => {
            let Some(prompt) = view_data.prompt.take() else {
                return;
            };
            submit_prompt(grid, runtime, view_data, internal_tx, prompt);
        }
        _ => {}
    }
}

fn submit_prompt<S: ViewSlot, R: AppRuntime>(
    grid: &mut GridState<S>,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    prompt: Prompt,
) {
    let command = match prompt.kind {
        PromptKind::Search => {
            GridCommand::View(ViewCommand::SetSearch(prompt.buffer.trim().to_owned()))
        }
        PromptKind::Edit { id, column } => GridCommand::EditCell {
            id,
            column,
            raw: prompt.buffer,
        },
        PromptKind::Command => {
            let row = current_deal_id(grid, view_data);
            let column = current_column(grid, view_data);
            let context = PromptContext {
                row: row.as_ref(),
                column: column.as_ref(),
                has_selection: !grid.view().selected_ids().is_empty(),
            };
            match command_for_prompt(&prompt.buffer, context) {
                Ok(command) => command,
                Err(message) => {
                    emit_notice(view_data, internal_tx, message);
                    return;
                }
            }
        }
    };
    dispatch(grid, runtime, view_data, internal_tx, command);
}

fn handle_grid_key<S: ViewSlot, R: AppRuntime>(
    grid: &mut GridState<S>,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let row_count = grid.visible_rows().len();
    let column_count = grid.view().visible_columns().len();
    let page = view_data.page_rows as isize;
    let row = current_deal_id(grid, view_data);
    let column = current_column(grid, view_data);

    let command = match (key.code, key.modifiers) {
        (KeyCode::Char('d'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            move_row(view_data, row_count, page);
            None
        }
        (KeyCode::Char('u'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            move_row(view_data, row_count, -page);
            None
        }
        (KeyCode::Char('j'), _) | (KeyCode::Down, _) => {
            move_row(view_data, row_count, 1);
            None
        }
        (KeyCode::Char('k'), _) | (KeyCode::Up, _) => {
            move_row(view_data, row_count, -1);
            None
        }
        (KeyCode::Char('h'), _) | (KeyCode::Left, _) => {
            view_data.cursor_col = view_data.cursor_col.saturating_sub(1);
            None
        }
        (KeyCode::Char('l'), _) | (KeyCode::Right, _) => {
            if view_data.cursor_col + 1 < column_count {
                view_data.cursor_col += 1;
            }
            None
        }
        (KeyCode::Char('g'), _) => {
            view_data.cursor_row = 0;
            None
        }
        (KeyCode::Char('G'), _) => {
            view_data.cursor_row = row_count.saturating_sub(1);
            None
        }
        (KeyCode::Char('?'), _) => {
            view_data.help_visible = true;
            None
        }
        (KeyCode::Char('/'), _) => {
            let seed = grid.view().filters.search.clone();
            view_data.prompt = Some(Prompt::new(PromptKind::Search, seed));
            None
        }
        (KeyCode::Char(':'), _) => {
            view_data.prompt = Some(Prompt::new(PromptKind::Command, ""));
            None
        }
        (KeyCode::Char(' '), _) => {
            row.map(|id| GridCommand::View(ViewCommand::ToggleRowSelection(id)))
        }
        (KeyCode::Char('a'), _) => Some(GridCommand::ToggleSelectAll),
        (KeyCode::Enter, _) => row.map(|id| GridCommand::View(ViewCommand::ToggleExpanded(id))),
        (KeyCode::Char('s'), KeyModifiers::NONE) => match column.as_ref().and_then(sort_field_for) {
            Some(field) => Some(GridCommand::View(ViewCommand::ToggleHeaderSort(field))),
            None => {
                let name = column.as_ref().map(|column| grid.column_name(column));
                emit_notice(
                    view_data,
                    internal_tx,
                    format!("Column {} is not sortable", name.unwrap_or_default()),
                );
                None
            }
        },
        (KeyCode::Char('S'), _) => Some(GridCommand::View(ViewCommand::ClearSort)),
        (KeyCode::Char('c'), KeyModifiers::NONE) => column.map(|column| GridCommand::Column {
            column,
            action: ColumnAction::Hide,
        }),
        (KeyCode::Char('C'), _) => Some(GridCommand::View(ViewCommand::ShowAllColumns)),
        (KeyCode::Char('<'), _) => column.map(|column| move_command(grid, column, -1)),
        (KeyCode::Char('>'), _) => column.map(|column| move_command(grid, column, 1)),
        (KeyCode::Char('-'), _) => column.map(|column| resize_command(grid, column, -RESIZE_STEP)),
        (KeyCode::Char('+'), _) | (KeyCode::Char('='), _) => {
            column.map(|column| resize_command(grid, column, RESIZE_STEP))
        }
        (KeyCode::Char('t'), KeyModifiers::NONE) => current_deal(grid, view_data)
            .map(|(_, stage, _)| GridCommand::View(ViewCommand::ToggleStageFilter(stage))),
        (KeyCode::Char('w'), KeyModifiers::NONE) => current_deal(grid, view_data)
            .map(|(_, _, owner)| GridCommand::View(ViewCommand::ToggleOwnerFilter(owner))),
        (KeyCode::Char('F'), _) => Some(GridCommand::View(ViewCommand::ClearFilters)),
        (KeyCode::Char('d'), KeyModifiers::NONE) => row.map(|id| GridCommand::Row {
            id,
            action: RowAction::Duplicate,
        }),
        (KeyCode::Char('x'), KeyModifiers::NONE) => row.map(|id| GridCommand::Row {
            id,
            action: RowAction::Delete,
        }),
        (KeyCode::Char('X'), _) => Some(GridCommand::Bulk(BulkAction::Delete)),
        (KeyCode::Char('e'), KeyModifiers::NONE) => {
            open_editor(grid, view_data, internal_tx, row, column);
            None
        }
        _ => None,
    };

    if let Some(command) = command {
        let moved = match &command {
            GridCommand::View(ViewCommand::MoveColumn { column, .. }) => Some(column.clone()),
            _ => None,
        };
        dispatch(grid, runtime, view_data, internal_tx, command);
        if let Some(moved) = moved
            && let Some(index) = grid
                .view()
                .visible_columns()
                .iter()
                .position(|column| column == &moved)
        {
            view_data.cursor_col = index;
        }
    }
}

fn open_editor<S: ViewSlot>(
    grid: &GridState<S>,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    row: Option<DealId>,
    column: Option<ColumnId>,
) {
    let (Some(id), Some(column)) = (row, column) else {
        return;
    };
    let Some(kind) = ColumnKind::resolve(&column) else {
        return;
    };
    if matches!(
        kind,
        ColumnKind::Static(ColumnKey::Select) | ColumnKind::Static(ColumnKey::Expand)
    ) {
        let name = grid.column_name(&column);
        emit_notice(
            view_data,
            internal_tx,
            format!("Column {name} is not editable"),
        );
        return;
    }
    let Some(seed) = grid.deals().get(&id).and_then(|deal| edit_seed(deal, kind)) else {
        return;
    };
    view_data.prompt = Some(Prompt::new(PromptKind::Edit { id, column }, seed));
}

/// Steps past hidden columns so every move changes what is on screen.
fn move_command<S: ViewSlot>(grid: &GridState<S>, column: ColumnId, step: isize) -> GridCommand {
    let slots = grid
        .view()
        .columns
        .iter()
        .filter(|descriptor| !descriptor.locked)
        .collect::<Vec<_>>();
    let offset = slots
        .iter()
        .position(|descriptor| descriptor.id == column)
        .and_then(|from| {
            let mut index = from as isize + step;
            while index >= 0 && (index as usize) < slots.len() {
                if slots[index as usize].visible {
                    return Some(index - from as isize);
                }
                index += step;
            }
            None
        })
        .unwrap_or(step);
    GridCommand::View(ViewCommand::MoveColumn { column, offset })
}

fn resize_command<S: ViewSlot>(grid: &GridState<S>, column: ColumnId, delta: i32) -> GridCommand {
    let current = i32::from(grid.view().column_width(&column));
    let width = u16::try_from((current + delta).max(0)).unwrap_or(u16::MAX);
    GridCommand::View(ViewCommand::ResizeColumn { column, width })
}

fn dispatch<S: ViewSlot, R: AppRuntime>(
    grid: &mut GridState<S>,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: GridCommand,
) {
    let events = grid.dispatch(command);
    view_data.notice = None;
    for event in &events {
        if let GridEvent::Handoff(request) = event
            && let Err(error) = runtime.handle_request(request)
        {
            warn!(error = %format!("{error:#}"), kind = request.kind(), "host request failed");
            view_data.notice = Some(format!("{} failed: {error}", request.kind()));
        }
    }
    clamp_cursor(grid, view_data);
    schedule_status_clear(view_data, internal_tx);
}

fn emit_notice(view_data: &mut ViewData, internal_tx: &Sender<InternalEvent>, message: String) {
    debug!(notice = %message, "ui notice");
    view_data.notice = Some(message);
    schedule_status_clear(view_data, internal_tx);
}

fn schedule_status_clear(view_data: &mut ViewData, internal_tx: &Sender<InternalEvent>) {
    view_data.status_token = view_data.status_token.wrapping_add(1);
    let token = view_data.status_token;
    let tx = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_AFTER);
        let _ = tx.send(InternalEvent::ClearStatus { token });
    });
}

fn move_row(view_data: &mut ViewData, row_count: usize, delta: isize) {
    if row_count == 0 {
        view_data.cursor_row = 0;
        return;
    }
    let last = row_count - 1;
    view_data.cursor_row = view_data.cursor_row.saturating_add_signed(delta).min(last);
}

fn clamp_cursor<S: ViewSlot>(grid: &GridState<S>, view_data: &mut ViewData) {
    let rows = grid.visible_rows().len();
    let columns = grid.view().visible_columns().len();
    view_data.cursor_row = view_data.cursor_row.min(rows.saturating_sub(1));
    view_data.cursor_col = view_data.cursor_col.min(columns.saturating_sub(1));
}

fn current_deal_id<S: ViewSlot>(grid: &GridState<S>, view_data: &ViewData) -> Option<DealId> {
    grid.visible_rows()
        .get(view_data.cursor_row)
        .map(|deal| deal.id.clone())
}

fn current_deal<S: ViewSlot>(
    grid: &GridState<S>,
    view_data: &ViewData,
) -> Option<(DealId, DealStage, String)> {
    grid.visible_rows()
        .get(view_data.cursor_row)
        .map(|deal| (deal.id.clone(), deal.stage, deal.owner.clone()))
}

fn current_column<S: ViewSlot>(grid: &GridState<S>, view_data: &ViewData) -> Option<ColumnId> {
    grid.view()
        .visible_columns()
        .get(view_data.cursor_col)
        .cloned()
}

fn sort_field_for(column: &ColumnId) -> Option<SortField> {
    ColumnKind::resolve(column)?.sort_field()
}

/// Parses a `:` command line into a grid command. Row verbs act on the
/// selection when one exists and on the cursor row otherwise.
fn command_for_prompt(input: &str, context: PromptContext<'_>) -> Result<GridCommand, String> {
    let input = input.trim();
    let (verb, rest) = match input.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (input, ""),
    };

    let row = || {
        context
            .row
            .cloned()
            .ok_or_else(|| "No deal under the cursor".to_owned())
    };
    let column = || {
        context
            .column
            .cloned()
            .ok_or_else(|| "No column under the cursor".to_owned())
    };
    let required = |name: &str| {
        if rest.is_empty() {
            Err(format!("{verb} needs a {name}"))
        } else {
            Ok(rest.to_owned())
        }
    };

    let command = match verb {
        "stage" => {
            let code = required("stage")?;
            if context.has_selection {
                GridCommand::Bulk(BulkAction::ChangeStage(code))
            } else {
                GridCommand::Row {
                    id: row()?,
                    action: RowAction::ChangeStage(code),
                }
            }
        }
        "owner" => {
            let code = required("owner")?;
            if context.has_selection {
                GridCommand::Bulk(BulkAction::ChangeOwner(code))
            } else {
                GridCommand::Row {
                    id: row()?,
                    action: RowAction::ChangeOwner(code),
                }
            }
        }
        "archive" if context.has_selection => GridCommand::Bulk(BulkAction::Archive),
        "archive" => GridCommand::Row {
            id: row()?,
            action: RowAction::Archive,
        },
        "email" if context.has_selection => GridCommand::Bulk(BulkAction::Email),
        "email" => GridCommand::Row {
            id: row()?,
            action: RowAction::SendEmail,
        },
        "edit" => GridCommand::Row {
            id: row()?,
            action: RowAction::Edit,
        },
        "call" => GridCommand::Row {
            id: row()?,
            action: RowAction::ScheduleCall,
        },
        "meeting" => GridCommand::Row {
            id: row()?,
            action: RowAction::ScheduleMeeting,
        },
        "sort" => {
            let mut words = rest.split_whitespace();
            let field = words
                .next()
                .ok_or_else(|| "sort needs a column".to_owned())?;
            let field = SortField::parse(field).ok_or_else(|| format!("Unknown sort column {field}"))?;
            let direction = match words.next() {
                Some(word) => {
                    SortDirection::parse(word).ok_or_else(|| format!("Unknown direction {word}"))?
                }
                None => SortDirection::Asc,
            };
            GridCommand::Column {
                column: ColumnId::from(field.as_str()),
                action: ColumnAction::Sort(direction),
            }
        }
        "range" => {
            let mut words = rest.split_whitespace();
            let (Some(min), Some(max)) = (words.next(), words.next()) else {
                return Err("range needs a minimum and a maximum".to_owned());
            };
            let min = parse_money(min).map_err(|error| format!("Invalid range: {error}"))?;
            let max = parse_money(max).map_err(|error| format!("Invalid range: {error}"))?;
            GridCommand::View(ViewCommand::SetValueRange(min, max))
        }
        "rename" => GridCommand::View(ViewCommand::RenameHeader {
            column: column()?,
            label: rest.to_owned(),
        }),
        "field" => {
            let name = required("field")?;
            let template = field_template(&name).ok_or_else(|| format!("Unknown field {name}"))?;
            GridCommand::View(ViewCommand::ToggleDynamicField(ColumnId::from(template.id)))
        }
        "width" => {
            let width = required("width")?;
            let width = width
                .parse::<u16>()
                .map_err(|_| format!("Invalid width {width}"))?;
            GridCommand::View(ViewCommand::ResizeColumn {
                column: column()?,
                width,
            })
        }
        "pin" => GridCommand::Column {
            column: column()?,
            action: ColumnAction::Pin,
        },
        "fit" => GridCommand::Column {
            column: column()?,
            action: ColumnAction::ResizeToFit,
        },
        "filter" => GridCommand::Column {
            column: column()?,
            action: ColumnAction::Filter,
        },
        "move" => GridCommand::Column {
            column: column()?,
            action: ColumnAction::Move,
        },
        "reset" => GridCommand::View(ViewCommand::Reset),
        "" => return Err("Empty command".to_owned()),
        other => return Err(format!("Unknown command {other}")),
    };
    Ok(command)
}

fn render<S: ViewSlot>(frame: &mut ratatui::Frame<'_>, grid: &GridState<S>, view_data: &ViewData) {
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
            Constraint::Length(2),
        ])
        .split(area);

    let title = Paragraph::new(title_text(grid))
        .block(Block::default().borders(Borders::ALL).title("dealgrid"));
    frame.render_widget(title, chunks[0]);

    render_table(frame, chunks[1], grid, view_data);

    let summary = Paragraph::new(summary_text(&grid.totals()))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("summary"));
    frame.render_widget(summary, chunks[2]);

    let status = Paragraph::new(status_text(grid, view_data));
    frame.render_widget(status, chunks[3]);

    if view_data.help_visible {
        let popup = centered_rect(70, 80, area);
        frame.render_widget(Clear, popup);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().borders(Borders::ALL).title("help"));
        frame.render_widget(help, popup);
    }
}

fn render_table<S: ViewSlot>(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    grid: &GridState<S>,
    view_data: &ViewData,
) {
    let view = grid.view();
    let columns = view.visible_columns();
    let widths = columns
        .iter()
        .map(|column| Constraint::Length(px_to_cells(view.column_width(column))))
        .collect::<Vec<_>>();

    let header = Row::new(
        columns
            .iter()
            .enumerate()
            .map(|(index, column)| {
                let style = if index == view_data.cursor_col {
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().add_modifier(Modifier::BOLD)
                };
                Cell::from(header_text(grid, column)).style(style)
            })
            .collect::<Vec<_>>(),
    );

    let title_index = columns
        .iter()
        .position(|column| column.as_str() == ColumnKey::Title.as_str());

    let mut rows = Vec::new();
    let mut cursor_line = 0;
    for (row_index, deal) in grid.visible_rows().into_iter().enumerate() {
        let is_cursor = row_index == view_data.cursor_row;
        if is_cursor {
            cursor_line = rows.len();
        }
        let cells = columns
            .iter()
            .enumerate()
            .map(|(col_index, column)| {
                let text = grid
                    .cell(deal, column)
                    .map(|cell| cell.display())
                    .unwrap_or_default();
                let cell = Cell::from(text);
                if is_cursor && col_index == view_data.cursor_col {
                    cell.style(
                        Style::default()
                            .fg(Color::Black)
                            .bg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    )
                } else {
                    cell
                }
            })
            .collect::<Vec<_>>();
        let mut row = Row::new(cells);
        if view.is_selected(&deal.id) {
            row = row.style(Style::default().fg(Color::Green));
        }
        rows.push(row);

        if view.is_expanded(&deal.id)
            && let Some(title_index) = title_index
        {
            let lines = detail_lines(deal);
            let height = u16::try_from(lines.len()).unwrap_or(u16::MAX);
            let cells = (0..columns.len())
                .map(|index| {
                    if index == title_index {
                        Cell::from(
                            lines
                                .iter()
                                .map(|line| Line::from(Span::raw(line.clone())))
                                .collect::<Vec<_>>(),
                        )
                    } else {
                        Cell::from("")
                    }
                })
                .collect::<Vec<_>>();
            rows.push(
                Row::new(cells)
                    .height(height)
                    .style(Style::default().fg(Color::Gray)),
            );
        }
    }

    let table = Table::new(rows, widths)
        .header(header)
        .row_highlight_style(Style::default().bg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL).title("deals"));

    let mut state = TableState::default().with_selected(Some(cursor_line));
    frame.render_stateful_widget(table, area, &mut state);
}

fn px_to_cells(width: u16) -> u16 {
    (width / PIXELS_PER_CELL).max(MIN_CELL_WIDTH)
}

fn header_text<S: ViewSlot>(grid: &GridState<S>, column: &ColumnId) -> String {
    let label = grid.view().header_label(column);
    match sort_indicator(grid.view(), column) {
        Some(indicator) if label.is_empty() => indicator,
        Some(indicator) => format!("{label} {indicator}"),
        None => label,
    }
}

fn detail_lines(deal: &Deal) -> Vec<String> {
    let mut lines = vec![
        format!("activity: {}", deal.activity),
        format!("contacts: {}", deal.contacts_joined()),
        format!("account: {}", deal.account),
        format!("last touch: {}", format_date(deal.last_interaction)),
        format!(
            "forecast: {}",
            CellValue::Money(deal.forecast_value).display()
        ),
        format!("quotes: {}", deal.quote_count),
    ];
    for (field, value) in &deal.custom_fields {
        let label = field_template(field.as_str())
            .map(|template| template.label.to_owned())
            .unwrap_or_else(|| field.to_string());
        lines.push(format!("{label}: {value}"));
    }
    lines
}

fn title_text<S: ViewSlot>(grid: &GridState<S>) -> String {
    let view = grid.view();
    let sorting = if view.sorting.is_empty() {
        "none".to_owned()
    } else {
        view.sorting
            .iter()
            .map(|key| format!("{} {}", key.field.label(), key.direction.as_str()))
            .collect::<Vec<_>>()
            .join(", ")
    };
    let mut filters = Vec::new();
    if !view.filters.search.trim().is_empty() {
        filters.push(format!("\"{}\"", view.filters.search.trim()));
    }
    if !view.filters.stages.is_empty() {
        filters.push(
            view.filters
                .stages
                .iter()
                .map(|stage| stage.label())
                .collect::<Vec<_>>()
                .join("|"),
        );
    }
    if !view.filters.owners.is_empty() {
        filters.push(view.filters.owners.iter().cloned().collect::<Vec<_>>().join("|"));
    }
    filters.push(view.filters.deal_value_range.label());
    format!("sort: {sorting}  filter: {}", filters.join(" "))
}

fn summary_text(totals: &Totals) -> String {
    let mut parts = vec![
        format!("{}/{} deals", totals.visible, totals.total),
        format!("{} selected", totals.selected),
        format!("value {}", format_compact_money(totals.sum_value as f64)),
        format!("forecast {}", format_compact_money(totals.sum_forecast as f64)),
        format!("avg {}", format_compact_money(totals.average_value)),
        format!("won {:.0}%", totals.conversion_rate),
    ];
    let stages = totals
        .stage_counts
        .iter()
        .map(|(stage, count)| format!("{} {count}", stage.label()))
        .collect::<Vec<_>>();
    if !stages.is_empty() {
        parts.push(stages.join(" · "));
    }
    parts.join(" | ")
}

fn status_text<S: ViewSlot>(grid: &GridState<S>, view_data: &ViewData) -> String {
    if let Some(prompt) = &view_data.prompt {
        let prefix = match &prompt.kind {
            PromptKind::Search => "/".to_owned(),
            PromptKind::Command => ":".to_owned(),
            PromptKind::Edit { column, .. } => format!("{}: ", grid.column_name(column)),
        };
        return format!("{prefix}{}", prompt.buffer);
    }
    if let Some(notice) = &view_data.notice {
        return notice.clone();
    }
    match grid.announcement() {
        Some(message) => message.to_owned(),
        None => "? help  : command  / search  ctrl+q quit".to_owned(),
    }
}

fn help_overlay_text() -> &'static str {
    "\
navigation
  j/k ↑/↓      move row
  h/l ←/→      move column
  g/G          first/last row
  ctrl+d/u     page down/up

rows
  space        toggle selection
  a            select all visible
  enter        expand/collapse
  e            edit cell
  d            duplicate
  x            delete row
  X            delete selected

columns
  s            cycle sort (asc, desc, off)
  S            clear sort
  c/C          hide column/show all
  </>          move column
  -/+          narrower/wider

filters
  /            search
  t            toggle stage filter
  w            toggle owner filter
  F            clear filters

commands (:)
  stage <code>  owner <code>  archive  email
  edit  call  meeting  sort <column> [asc|desc]
  range <min> <max>  rename [label]  field <name>
  width <px>  pin  fit  filter  move  reset

esc closes prompts and help, ctrl+q quits"
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

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
