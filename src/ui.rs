use crate::cli::parse_interval;
use crate::instance::Role;
use crate::module::Module;
use crate::widgets::{InputField, InputFieldAction, InputStyle};

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{LogMsg, Logger};
use ratatui::layout::Flex;
use ratatui::{prelude::*, widgets::*};
use register::{canonical_address, Bank};
use std::io::stdout;
use std::time::Duration;
use style::palette::tailwind;
use tokio::runtime::Runtime;
use unicode_width::UnicodeWidthStr;
use util::str;

const PALETTES: [tailwind::Palette; 4] = [
    tailwind::BLUE,
    tailwind::INDIGO,
    tailwind::EMERALD,
    tailwind::RED,
];

const REGISTER_INFO_TEXT: &str =
    "(q) quit | (h/l) bank | (j/k) row | (e) edit | (w) watch | (r) refresh | (W) write";
const SESSION_INFO_TEXT: &str =
    "(m) role | (s) start | (x) stop | (i) ip | (p) port | (v) interval | (t) color";
const WINDOW_INFO_TEXT: &str =
    "([ ]) start -/+ | (- +) count -/+ | (PageUp/PageDown) log up/down | (g/G) log top/bottom";

const LOG_HEADER: &str = " Modbus Log";

#[derive(Clone, Debug)]
struct RowColorPair {
    pub normal: Color,
    pub alt: Color,
}

impl RowColorPair {
    pub const fn new(normal: Color, alt: Color) -> Self {
        Self { normal, alt }
    }

    pub fn get(&self, i: usize) -> Color {
        if i % 2 == 0 {
            self.normal
        } else {
            self.alt
        }
    }
}

#[derive(Clone, Debug)]
struct ColorPair<Forground: Clone, Background: Clone> {
    pub fg: Forground,
    pub bg: Background,
}

impl<Forground: Clone, Background: Clone> ColorPair<Forground, Background> {
    pub const fn new(fg: Forground, bg: Background) -> Self {
        Self { fg, bg }
    }
}

struct TableColors {
    buffer: ColorPair<Color, Color>,
    header: ColorPair<Color, Color>,
    border: Color,
    selected_border: Color,
    selected_color: ColorPair<Color, Color>,
    selected_color_error: ColorPair<Color, Color>,
    selected_color_success: ColorPair<Color, Color>,
    row_color: ColorPair<Color, RowColorPair>,
    row_error_color: ColorPair<Color, RowColorPair>,
    row_success_color: ColorPair<Color, RowColorPair>,
}

impl TableColors {
    const fn new(color: &tailwind::Palette) -> Self {
        Self {
            buffer: ColorPair::new(tailwind::SLATE.c200, tailwind::SLATE.c950),
            header: ColorPair::new(tailwind::SLATE.c200, color.c900),
            border: tailwind::SLATE.c600,
            selected_border: color.c400,
            selected_color: ColorPair::new(tailwind::SLATE.c200, color.c400),
            selected_color_error: ColorPair::new(tailwind::WHITE, tailwind::RED.c900),
            selected_color_success: ColorPair::new(tailwind::WHITE, tailwind::GREEN.c950),
            row_color: ColorPair::new(
                tailwind::SLATE.c200,
                RowColorPair::new(tailwind::SLATE.c950, tailwind::SLATE.c900),
            ),
            row_error_color: ColorPair::new(
                tailwind::SLATE.c200,
                RowColorPair::new(tailwind::RED.c950, tailwind::RED.c800),
            ),
            row_success_color: ColorPair::new(
                tailwind::SLATE.c200,
                RowColorPair::new(tailwind::GREEN.c900, tailwind::GREEN.c800),
            ),
        }
    }
}

struct LogTable {
    table_state: TableState,
    vertical_scroll: ScrollbarState,
    reached_end_of_table: bool,
}

/// What the open input field changes once confirmed
#[derive(Clone, Copy)]
enum EditTarget {
    Cell(Bank, usize),
    Ip,
    Port,
    Interval,
}

struct Editor {
    target: EditTarget,
    field: InputField,
}

pub struct App {
    module: Module,
    log: Logger,
    log_entries: Vec<LogMsg>,
    log_table: LogTable,
    selected_bank: usize,
    selected_rows: [usize; 4],
    editor: Option<Editor>,
    colors: TableColors,
    color_index: usize,
    history_len: usize,
}

impl App {
    pub fn new(module: Module, log: Logger, history_len: usize) -> Self {
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic| {
            let _ = disable_raw_mode();
            let _ = crossterm::execute!(stdout(), LeaveAlternateScreen);
            original_hook(panic);
        }));

        Self {
            module,
            log,
            log_entries: Vec::new(),
            log_table: LogTable {
                table_state: TableState::default(),
                vertical_scroll: ScrollbarState::new(history_len),
                reached_end_of_table: true,
            },
            selected_bank: 0,
            selected_rows: [0; 4],
            editor: None,
            colors: TableColors::new(&PALETTES[0]),
            color_index: 0,
            history_len: history_len.max(1),
        }
    }

    fn bank(&self) -> Bank {
        Bank::ALL[self.selected_bank]
    }

    fn row(&self) -> usize {
        self.selected_rows[self.selected_bank]
    }

    pub fn next_bank(&mut self) {
        self.selected_bank = (self.selected_bank + 1) % Bank::ALL.len();
    }

    pub fn previous_bank(&mut self) {
        self.selected_bank = (self.selected_bank + Bank::ALL.len() - 1) % Bank::ALL.len();
    }

    pub fn move_down(&mut self) {
        let len = self.module.table().len(self.bank());
        let row = &mut self.selected_rows[self.selected_bank];
        *row = std::cmp::min(*row + 1, len.saturating_sub(1));
    }

    pub fn move_up(&mut self) {
        let row = &mut self.selected_rows[self.selected_bank];
        *row = row.saturating_sub(1);
    }

    /// Keep row selections inside of the current windows
    fn clamp_rows(&mut self) {
        for bank in Bank::ALL {
            let len = self.module.table().len(bank);
            let row = &mut self.selected_rows[bank.index()];
            *row = std::cmp::min(*row, len.saturating_sub(1));
        }
    }

    pub fn log_move_bottom(&mut self) {
        if let Some(i) = self.log_entries.len().checked_sub(1) {
            self.log_table.reached_end_of_table = true;
            self.log_table.table_state.select(Some(i));
            self.log_table.vertical_scroll = self.log_table.vertical_scroll.position(i);
        }
    }

    pub fn log_move_top(&mut self) {
        self.log_table.reached_end_of_table = self.log_entries.len() <= 1;
        self.log_table.table_state.select(Some(0));
        self.log_table.vertical_scroll = self.log_table.vertical_scroll.position(0);
    }

    pub fn log_move_down(&mut self) {
        if !self.log_entries.is_empty() {
            let last = self.log_entries.len() - 1;
            let i = self
                .log_table
                .table_state
                .selected()
                .map(|i| std::cmp::min(i + 1, last))
                .unwrap_or(0);
            self.log_table.reached_end_of_table = i == last;
            self.log_table.table_state.select(Some(i));
            self.log_table.vertical_scroll = self.log_table.vertical_scroll.position(i);
        }
    }

    pub fn log_move_up(&mut self) {
        if !self.log_entries.is_empty() {
            let i = self
                .log_table
                .table_state
                .selected()
                .map(|i| i.saturating_sub(1))
                .unwrap_or(0);
            self.log_table.reached_end_of_table = i == (self.log_entries.len() - 1);
            self.log_table.table_state.select(Some(i));
            self.log_table.vertical_scroll = self.log_table.vertical_scroll.position(i);
        }
    }

    pub fn switch_color(&mut self) {
        self.color_index = (self.color_index + 1) % PALETTES.len();
        self.colors = TableColors::new(&PALETTES[self.color_index]);
    }

    /// Move new log messages into the history, dropping the oldest beyond its length
    fn update_log(&mut self) {
        self.log_entries.extend(self.log.drain());
        if self.log_entries.len() > self.history_len {
            let len_to_remove = self.log_entries.len() - self.history_len;
            self.log_entries.drain(..len_to_remove);
            if !self.log_table.reached_end_of_table {
                if let Some(i) = self.log_table.table_state.selected() {
                    let i = i.saturating_sub(len_to_remove);
                    self.log_table.table_state.select(Some(i));
                    self.log_table.vertical_scroll = self.log_table.vertical_scroll.position(i);
                }
            }
        }
        self.log_table.vertical_scroll = self
            .log_table
            .vertical_scroll
            .content_length(self.log_entries.len());
        if self.log_table.reached_end_of_table {
            self.log_move_bottom();
        }
    }

    fn open_editor(&mut self) {
        let bank = self.bank();
        let row = self.row();
        let Some(cell) = self.module.table().rows(bank).get(row) else {
            return;
        };
        let offset = *self.module.config().window(bank).start() + row as u16;
        let title = canonical_address(bank, offset);
        let input = cell.text().clone();
        self.open(EditTarget::Cell(bank, row), title, input);
    }

    /// Endpoint and interval only change between sessions
    fn open_setting(&mut self, target: EditTarget) {
        if let Err(e) = self.module.instance().ensure_idle() {
            self.log.err(e.to_string());
            return;
        }
        let endpoint = self.module.endpoint();
        let (title, input) = match target {
            EditTarget::Ip => (str!("IP"), endpoint.ip.clone()),
            EditTarget::Port => (str!("Port"), endpoint.port.to_string()),
            EditTarget::Interval => (
                str!("Interval [s]"),
                self.module
                    .poll()
                    .interval()
                    .map(|v| v.as_secs_f64().to_string())
                    .unwrap_or_default(),
            ),
            EditTarget::Cell(..) => return,
        };
        self.open(target, title, input);
    }

    fn open(&mut self, target: EditTarget, title: String, input: String) {
        let field = InputField::new(input)
            .title(format!(" {} ", title))
            .style(InputStyle {
                default: Style::new()
                    .fg(self.colors.buffer.fg)
                    .bg(self.colors.buffer.bg),
                focused: Style::new()
                    .fg(self.colors.selected_border)
                    .bg(self.colors.buffer.bg),
                cursor: Style::new()
                    .fg(self.colors.selected_color.fg)
                    .bg(self.colors.selected_color.bg),
            });
        self.editor = Some(Editor { target, field });
    }

    fn confirm(&mut self, target: EditTarget, input: &str) {
        let result = match target {
            EditTarget::Cell(bank, row) => {
                self.module.edit(bank, row, input);
                return;
            }
            EditTarget::Ip => self.module.set_ip(input).map_err(|e| e.to_string()),
            EditTarget::Port => match input.trim().parse::<u16>() {
                Ok(port) => self.module.set_port(port).map_err(|e| e.to_string()),
                Err(e) => Err(format!("'{}' is not a valid port. [{}]", input, e)),
            },
            EditTarget::Interval if input.trim().is_empty() => {
                self.module.set_interval(None).map_err(|e| e.to_string())
            }
            EditTarget::Interval => parse_interval(input)
                .and_then(|v| self.module.set_interval(Some(v)).map_err(|e| e.to_string())),
        };
        match result {
            Ok(()) => {
                let endpoint = self.module.endpoint();
                let interval = match self.module.poll().interval() {
                    Some(v) => format!("{:.2} s", v.as_secs_f64()),
                    None => str!("manual"),
                };
                self.log.info(format!(
                    "Endpoint set to {}:{}, refresh {}.",
                    endpoint.ip, endpoint.port, interval
                ));
            }
            Err(e) => self.log.err(e),
        }
    }

    fn handle_editor(&mut self, modifiers: KeyModifiers, code: KeyCode) {
        let Some(editor) = self.editor.as_mut() else {
            return;
        };
        match editor.field.handle_events(modifiers, code) {
            InputFieldAction::InputConfirm => {
                if let Some(editor) = self.editor.take() {
                    self.confirm(editor.target, editor.field.input());
                }
            }
            InputFieldAction::InputCancel => self.editor = None,
            InputFieldAction::InputTaken | InputFieldAction::InputIgnored => {}
        }
    }

    fn adjust_window(&mut self, start_delta: i32, count_delta: i32) {
        let bank = self.bank();
        match self.module.adjust_window(bank, start_delta, count_delta) {
            Ok(()) => {
                let window = self.module.config().window(bank);
                self.log.info(format!(
                    "{} window set to start {} and count {}.",
                    bank,
                    window.start(),
                    window.count()
                ));
            }
            Err(e) => self.log.err(e.to_string()),
        }
        self.clamp_rows();
    }

    /// Returns false once the application should quit
    fn handle_key(&mut self, runtime: &Runtime, modifiers: KeyModifiers, code: KeyCode) -> bool {
        if self.editor.is_some() {
            self.handle_editor(modifiers, code);
            return true;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return false,
            KeyCode::Tab | KeyCode::Char('l') | KeyCode::Right => self.next_bank(),
            KeyCode::BackTab | KeyCode::Char('h') | KeyCode::Left => self.previous_bank(),
            KeyCode::Char('j') | KeyCode::Down => self.move_down(),
            KeyCode::Char('k') | KeyCode::Up => self.move_up(),
            KeyCode::Char('e') | KeyCode::Enter => self.open_editor(),
            KeyCode::Char('w') => {
                let bank = self.bank();
                let watched = self.module.toggle_watch(bank);
                self.log.info(format!(
                    "{} {}.",
                    bank,
                    if watched { "watched" } else { "no longer watched" }
                ));
            }
            KeyCode::Char('m') => {
                let role = self.module.instance().role().toggled();
                match self.module.set_role(role) {
                    Ok(()) => self.log.info(format!("Role set to {}.", role)),
                    Err(e) => self.log.err(e.to_string()),
                }
            }
            // Start failures are logged by the session itself
            KeyCode::Char('s') => {
                let _ = runtime.block_on(self.module.start());
            }
            KeyCode::Char('x') => runtime.block_on(self.module.stop()),
            KeyCode::Char('r') => {
                if runtime.block_on(self.module.refresh()).is_none() {
                    self.log.err("Refresh requires an active session.");
                }
            }
            KeyCode::Char('W') => {
                if let Err(e) = runtime.block_on(self.module.write()) {
                    self.log.err(e.to_string());
                }
            }
            KeyCode::Char('[') => self.adjust_window(-1, 0),
            KeyCode::Char(']') => self.adjust_window(1, 0),
            KeyCode::Char('-') => self.adjust_window(0, -1),
            KeyCode::Char('+') => self.adjust_window(0, 1),
            KeyCode::Char('i') => self.open_setting(EditTarget::Ip),
            KeyCode::Char('p') => self.open_setting(EditTarget::Port),
            KeyCode::Char('v') => self.open_setting(EditTarget::Interval),
            KeyCode::Char('t') => self.switch_color(),
            KeyCode::PageUp => self.log_move_up(),
            KeyCode::PageDown => self.log_move_down(),
            KeyCode::Char('g') => self.log_move_top(),
            KeyCode::Char('G') => self.log_move_bottom(),
            _ => {}
        }
        true
    }

    pub fn run(self, runtime: &Runtime) -> anyhow::Result<()> {
        enable_raw_mode()?;
        let mut terminal = App::create_terminal()?;

        let mut app = self;
        loop {
            runtime.block_on(app.module.tick_if_due());
            app.update_log();

            terminal.draw(|f| ui(f, &mut app))?;

            // Handle inputs
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press
                        && !app.handle_key(runtime, key.modifiers, key.code)
                    {
                        break;
                    }
                }
            }
        }

        runtime.block_on(app.module.stop());

        disable_raw_mode()?;

        // restore terminal
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        Ok(())
    }

    fn create_terminal() -> anyhow::Result<Terminal<CrosstermBackend<std::io::Stdout>>> {
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(terminal)
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let rects = Layout::vertical([
        Constraint::Min(8),
        Constraint::Length(4),
        Constraint::Length(1),
        Constraint::Max(10),
    ])
    .split(f.area());

    let banks = Layout::horizontal([Constraint::Ratio(1, 4); 4]).split(rects[0]);
    for bank in Bank::ALL {
        render_bank(f, app, bank, banks[bank.index()]);
    }
    if let Some(editor) = app.editor.as_ref() {
        let area = match editor.target {
            EditTarget::Cell(bank, _) => popup_area(banks[bank.index()], 24, 3),
            _ => popup_area(rects[0], 32, 3),
        };
        f.render_widget(Clear, area);
        f.render_widget(&editor.field, area);
    }
    render_register_footer(f, app, rects[1]);

    render_log_header(f, app, rects[2]);
    render_log(f, app, rects[3]);
    render_scrollbar(f, &mut app.log_table.vertical_scroll, rects[3]);
}

fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let [area] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(area);
    area
}

fn render_bank(f: &mut Frame, app: &App, bank: Bank, area: Rect) {
    let selected = app.selected_bank == bank.index();
    let header_style = Style::default()
        .fg(app.colors.header.fg)
        .bg(app.colors.header.bg);
    let selected_style = Style::default()
        .fg(app.colors.selected_color.fg)
        .bg(app.colors.selected_color.bg);

    let window = app.module.config().window(bank);
    let watched = app.module.watch().is_watched(bank);

    let header = ["Address", "Value"]
        .into_iter()
        .map(Cell::from)
        .collect::<Row>()
        .style(header_style)
        .height(1);

    let rows = app
        .module
        .table()
        .rows(bank)
        .iter()
        .zip(window.offsets())
        .enumerate()
        .map(|(i, (cell, offset))| {
            let colors = if *cell.error() {
                &app.colors.row_error_color
            } else {
                &app.colors.row_color
            };
            Row::new([
                Cell::from(canonical_address(bank, offset)),
                Cell::from(cell.text().clone()),
            ])
            .style(Style::new().fg(colors.fg).bg(colors.bg.get(i)))
        });

    let border = if selected {
        app.colors.selected_border
    } else {
        app.colors.border
    };
    let block = Block::bordered()
        .border_style(Style::new().fg(border))
        .title(Line::from(format!(" {} ", bank)).bold())
        .title_bottom(Line::from(format!(
            " {} | start {} | count {} ",
            if watched { "● watch" } else { "○ watch" },
            window.start(),
            window.count()
        )));

    let table = Table::new(rows, [Constraint::Length(8), Constraint::Min(6)])
        .header(header)
        .block(block)
        .row_highlight_style(selected_style)
        .bg(app.colors.buffer.bg)
        .highlight_spacing(HighlightSpacing::Always)
        .highlight_symbol("▶ ");

    let mut state = TableState::default().with_selected(selected.then_some(app.row()));
    f.render_stateful_widget(table, area, &mut state);
}

fn render_scrollbar(f: &mut Frame, state: &mut ScrollbarState, area: Rect) {
    f.render_stateful_widget(
        Scrollbar::default()
            .orientation(ScrollbarOrientation::VerticalRight)
            .begin_symbol(None)
            .end_symbol(None),
        area.inner(Margin {
            vertical: 1,
            horizontal: 0,
        }),
        state,
    );
}

fn render_register_footer(f: &mut Frame, app: &App, area: Rect) {
    let rects = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .split(area);

    let instance = app.module.instance();
    let endpoint = app.module.endpoint();
    let interval = match app.module.poll().interval() {
        Some(v) => format!("refresh every {:.2} s", v.as_secs_f64()),
        None => str!("manual refresh"),
    };
    let addr = match instance.local_addr() {
        Some(addr) => addr.to_string(),
        None => format!("{}:{}", endpoint.ip, endpoint.port),
    };
    let status = format!(
        " {} | {} | {} | {}",
        instance.status_text(),
        instance.role(),
        addr,
        interval
    );
    let status_bg = match (instance.is_active(), instance.role()) {
        (true, Role::Client) => tailwind::GREEN.c900,
        (true, Role::Server) => tailwind::EMERALD.c900,
        (false, _) => app.colors.header.bg,
    };

    let status_footer = Paragraph::new(Line::from(status))
        .style(Style::new().fg(app.colors.header.fg).bg(status_bg))
        .centered();
    let info_footer = Paragraph::new(Line::from(REGISTER_INFO_TEXT))
        .style(Style::new().fg(tailwind::WHITE).bg(tailwind::SLATE.c900))
        .centered();
    let session_footer = Paragraph::new(Line::from(SESSION_INFO_TEXT))
        .style(Style::new().fg(tailwind::WHITE).bg(tailwind::SLATE.c900))
        .centered();
    let window_footer = Paragraph::new(Line::from(WINDOW_INFO_TEXT))
        .style(Style::new().fg(tailwind::WHITE).bg(tailwind::SLATE.c900))
        .centered();
    f.render_widget(status_footer, rects[0]);
    f.render_widget(info_footer, rects[1]);
    f.render_widget(session_footer, rects[2]);
    f.render_widget(window_footer, rects[3]);
}

fn render_log_header(f: &mut Frame, app: &App, area: Rect) {
    let header = Paragraph::new(Line::from(LOG_HEADER))
        .style(
            Style::new()
                .fg(app.colors.header.fg)
                .bg(app.colors.header.bg),
        )
        .left_aligned();
    f.render_widget(header, area);
}

fn render_log(f: &mut Frame, app: &mut App, area: Rect) {
    let header_style = Style::default()
        .fg(app.colors.header.fg)
        .bg(app.colors.header.bg);
    let selected_style = match app
        .log_table
        .table_state
        .selected()
        .and_then(|i| app.log_entries.get(i))
    {
        Some(LogMsg::Err(_)) => Style::default()
            .fg(app.colors.selected_color_error.fg)
            .bg(app.colors.selected_color_error.bg),
        Some(LogMsg::Ok(_)) => Style::default()
            .fg(app.colors.selected_color_success.fg)
            .bg(app.colors.selected_color_success.bg),
        _ => Style::default()
            .fg(app.colors.selected_color.fg)
            .bg(app.colors.selected_color.bg),
    };

    let header = ["Timestamp", "Message"]
        .into_iter()
        .map(Cell::from)
        .collect::<Row>()
        .style(header_style)
        .height(1);

    let timestamp_width = LogMsg::info("").timestamp().width() as u16;

    let rows = app.log_entries.iter().enumerate().map(|(i, item)| {
        let colors = match item {
            LogMsg::Info(_) => &app.colors.row_color,
            LogMsg::Err(_) => &app.colors.row_error_color,
            LogMsg::Ok(_) => &app.colors.row_success_color,
        };
        Row::new([
            Cell::from(str!(item.timestamp())),
            Cell::from(str!(item.message())),
        ])
        .style(Style::new().fg(colors.fg).bg(colors.bg.get(i)))
        .height(1)
    });

    let bar = " █ ";
    let t = Table::new(
        rows,
        [Constraint::Length(timestamp_width + 1), Constraint::Min(10)],
    )
    .header(header)
    .row_highlight_style(selected_style)
    .highlight_symbol(Text::from(bar).style(header_style))
    .fg(app.colors.buffer.fg)
    .bg(app.colors.buffer.bg)
    .highlight_spacing(HighlightSpacing::Always);

    f.render_stateful_widget(t, area, &mut app.log_table.table_state);
}
