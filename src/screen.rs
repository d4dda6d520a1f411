use std::cell::Cell as SharedCell;
use std::io::{self, stdout};
use std::rc::Rc;
use std::time::{Duration, Instant};

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState},
    DefaultTerminal, Frame,
};

use crate::date_range::{month_grid, CalendarPage, DateRangeSelector, Endpoint};
use crate::error::Result;
use crate::filters::{FilterPanel, Totals};
use crate::fmt::{self, money, number};
use crate::forms::{GenerateDialog, GenerateField, GenerateForm, IncludeForm};
use crate::hover::{RowInteraction, RowRect, RowSelection};
use crate::installments::{self, InstallmentDetail};
use crate::models::{Receivable, Status};
use crate::theme::{Theme, ThemeContext};
use crate::tui::{self, Palette};

const TICK: Duration = Duration::from_millis(50);
const MENU_ITEMS: &[&str] = &["Visualizar", "Copiar", "Enviar", "Imprimir"];
const MENU_WIDTH: u16 = 14;
const MENU_HEIGHT: u16 = MENU_ITEMS.len() as u16 + 2;
const CHECKBOX_WIDTH: u16 = 4;
const DASH: &str = "\u{2014}";
const KEY_HELP: &str = concat!(
    "\u{2191}/\u{2193}:linha  enter:ações  espaço:marcar  a:todas  m:marcados  ",
    "s:situação  d:período  k:tipo data  f:cliente  i:incluir  g:gerar  v:ver  t:tema  q:sair",
);

enum InputMode {
    Normal,
    EditClient(String),
}

struct DatePicker {
    selector: DateRangeSelector,
    preset_cursor: usize,
    endpoint: Endpoint,
    day_cursor: NaiveDate,
    day_cells: Vec<(Rect, NaiveDate)>,
    preset_cells: Vec<(Rect, usize)>,
}

impl DatePicker {
    fn new(today: NaiveDate, filters: &FilterPanel) -> Self {
        let mut selector = DateRangeSelector::new(today);
        if filters.period.start.is_some() && filters.period.end.is_some() {
            selector = selector.with_range(filters.period);
        }
        Self {
            day_cursor: selector.range().start.unwrap_or(today),
            selector,
            preset_cursor: 0,
            endpoint: Endpoint::Start,
            day_cells: Vec::new(),
            preset_cells: Vec::new(),
        }
    }

    /// Pick a day for the current endpoint, then move on to the other end.
    fn pick(&mut self, day: NaiveDate) {
        self.selector.select_manual_date(self.endpoint, day);
        self.day_cursor = day;
        self.endpoint = match self.endpoint {
            Endpoint::Start => Endpoint::End,
            Endpoint::End => Endpoint::Start,
        };
    }
}

enum Modal {
    None,
    DateRange(Box<DatePicker>),
    Details {
        row_id: String,
        schedule: Vec<InstallmentDetail>,
    },
    Include(IncludeForm),
    Generate {
        dialog: GenerateDialog,
        field: usize,
    },
}

pub enum ScreenAction {
    Continue,
    Close,
}

/// The accounts receivable screen: filters, totals, the receivables table
/// with its floating action menu, and the dialogs.
pub struct ReceivablesScreen {
    all_rows: Vec<Receivable>,
    rows: Vec<Receivable>,
    filters: FilterPanel,
    selection: RowSelection,
    hover: RowInteraction,
    theme: ThemeContext,
    current_theme: Rc<SharedCell<Theme>>,
    today: NaiveDate,
    offset: usize,
    cursor: usize,
    visible_count: usize,
    menu_cursor: usize,
    mode: InputMode,
    modal: Modal,
    status_message: Option<String>,
    table_body: Rect,
    menu_area: Option<Rect>,
    pointer_row: Option<String>,
    pointer_on_menu: bool,
}

impl ReceivablesScreen {
    pub fn new(all_rows: Vec<Receivable>, mut theme: ThemeContext, today: NaiveDate) -> Self {
        let current_theme = Rc::new(SharedCell::new(theme.get()));
        let sink = Rc::clone(&current_theme);
        theme.subscribe(move |t| sink.set(t));

        let filters = FilterPanel::default();
        let rows = filters.apply(&all_rows);
        Self {
            all_rows,
            rows,
            filters,
            selection: RowSelection::new(),
            hover: RowInteraction::with_offset(f32::from(MENU_WIDTH + 2)),
            theme,
            current_theme,
            today,
            offset: 0,
            cursor: 0,
            visible_count: 1,
            menu_cursor: 0,
            mode: InputMode::Normal,
            modal: Modal::None,
            status_message: None,
            table_body: Rect::default(),
            menu_area: None,
            pointer_row: None,
            pointer_on_menu: false,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        let hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let _ = execute!(stdout(), DisableMouseCapture);
            ratatui::restore();
            hook(info);
        }));

        let mut terminal = ratatui::init();
        execute!(stdout(), EnableMouseCapture)?;
        let result = self.event_loop(&mut terminal);
        let _ = execute!(stdout(), DisableMouseCapture);
        ratatui::restore();
        result.map_err(Into::into)
    }

    fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> io::Result<()> {
        loop {
            terminal.draw(|frame| self.draw_frame(frame))?;

            if event::poll(TICK)? {
                let now = Instant::now();
                match event::read()? {
                    Event::Key(key) => {
                        if key.kind != KeyEventKind::Press {
                            continue;
                        }
                        if key.modifiers.contains(KeyModifiers::CONTROL)
                            && key.code == KeyCode::Char('c')
                        {
                            break;
                        }
                        if let ScreenAction::Close = self.handle_key_event(key.code, now) {
                            break;
                        }
                    }
                    Event::Mouse(mouse) => self.handle_mouse_event(mouse, now),
                    _ => {}
                }
            }
            self.tick(Instant::now());
        }
        Ok(())
    }

    /// Advance timers: hover dismissal and deferred plan generation.
    pub fn tick(&mut self, now: Instant) {
        if self.hover.tick(now) {
            self.menu_area = None;
        }
        if let Modal::Generate { dialog, .. } = &mut self.modal {
            dialog.tick(now);
        }
    }

    fn refresh(&mut self) {
        self.rows = self.filters.apply(&self.all_rows);
        self.selection.retain_listed(&self.rows);
        self.hover.close();
        self.pointer_row = None;
        self.offset = 0;
        self.cursor = 0;
    }

    fn palette(&self) -> Palette {
        Palette::for_theme(self.current_theme.get())
    }

    // -----------------------------------------------------------------------
    // Drawing
    // -----------------------------------------------------------------------

    pub fn draw_frame(&mut self, frame: &mut Frame) {
        let palette = self.palette();
        let area = frame.area();
        let [title_area, filter_area, totals_area, table_area, status_area, keys_area] =
            Layout::vertical([
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Fill(1),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .areas(area);

        let title = Line::from(vec![
            Span::styled("Contas a Receber", palette.header),
            Span::styled(format!("   tema: {}", self.current_theme.get()), palette.footer),
        ]);
        frame.render_widget(Paragraph::new(title), title_area);

        self.draw_filters(frame, filter_area, &palette);
        self.draw_totals(frame, totals_area, &palette);
        self.draw_table(frame, table_area, &palette);
        self.draw_menu(frame, table_area, &palette);

        let end_row = (self.offset + self.visible_count).min(self.rows.len());
        let mut status = format!(
            "Linhas {}-{} de {} | {}",
            if self.rows.is_empty() { 0 } else { self.offset + 1 },
            end_row,
            self.rows.len(),
            self.filters.describe(),
        );
        if let Some(msg) = &self.status_message {
            status.push_str(&format!(" | {msg}"));
        }
        frame.render_widget(Paragraph::new(status).style(palette.footer), status_area);

        let keys = match &self.mode {
            InputMode::EditClient(input) => format!("Cliente: {input}\u{2588}"),
            InputMode::Normal => KEY_HELP.into(),
        };
        frame.render_widget(Paragraph::new(keys).style(palette.footer), keys_area);

        if matches!(self.modal, Modal::DateRange(_)) {
            self.draw_date_picker(frame, area, &palette);
        }
        match &self.modal {
            Modal::None | Modal::DateRange(_) => {}
            Modal::Details { .. } => self.draw_details(frame, area, &palette),
            Modal::Include(_) => self.draw_include(frame, area, &palette),
            Modal::Generate { .. } => self.draw_generate(frame, area, &palette),
        }
    }

    fn draw_filters(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let label = |s: &'static str| Span::styled(s, palette.header);
        let client = if self.filters.client.is_empty() {
            "(todos)".to_string()
        } else {
            self.filters.client.clone()
        };
        let period = if self.filters.period.is_unbounded() {
            "(qualquer)".to_string()
        } else {
            self.filters.period.label()
        };
        let lines = vec![
            Line::from(vec![label("Cliente: "), Span::raw(client)]),
            Line::from(vec![
                label("Período: "),
                Span::raw(period),
                label("   Tipo Data: "),
                Span::raw(self.filters.date_kind.label()),
            ]),
            Line::from(vec![label("Situação: "), Span::raw(self.filters.situation.label())]),
        ];
        frame.render_widget(Paragraph::new(lines), area);
    }

    fn draw_totals(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let totals = Totals::compute(&self.rows, &self.selection, self.today);
        let line = Line::from(vec![
            Span::raw(format!("Selecionados ({}): ", self.selection.len())),
            Span::styled(money(totals.selected), palette.amount),
            Span::raw("  Vencidos: "),
            Span::styled(money(totals.overdue), palette.overdue),
            Span::raw("  A vencer: "),
            Span::styled(money(totals.upcoming), palette.amount),
            Span::raw("  Capital: "),
            Span::raw(money(totals.capital)),
            Span::raw("  Total: "),
            Span::styled(money(totals.total), palette.header),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn draw_table(&mut self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let narrow = area.width < 120;
        let header_overhead = 2u16;
        self.table_body = Rect {
            y: area.y + header_overhead,
            height: area.height.saturating_sub(header_overhead),
            ..area
        };
        self.visible_count = (self.table_body.height as usize).max(1);
        if self.cursor >= self.offset + self.visible_count {
            self.offset = self.cursor + 1 - self.visible_count;
        }

        let hovered = self.hover.active_row().map(str::to_string);
        let rows: Vec<Row> = self
            .rows
            .iter()
            .skip(self.offset)
            .take(self.visible_count)
            .map(|r| {
                let overdue = r.status == Status::Open && r.due < self.today;
                let check = if self.selection.is_selected(&r.id) {
                    "[x]"
                } else {
                    "[ ]"
                };
                let opt = |v: Option<Decimal>| v.map(money).unwrap_or_else(|| DASH.into());
                let days = r
                    .days_overdue
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| DASH.into());
                let total = r.total.unwrap_or(r.amount);
                let mut cells = vec![Cell::from(check), Cell::from(r.client.clone())];
                if !narrow {
                    cells.push(Cell::from(r.company.clone()));
                    cells.push(Cell::from(r.order.clone()));
                    cells.push(Cell::from(r.invoice.clone()));
                }
                cells.push(Cell::from(r.installment.clone()));
                cells.push(Cell::from(fmt::date(r.due)));
                cells.push(Cell::from(money(r.amount)));
                cells.push(Cell::from(days));
                if !narrow {
                    cells.push(Cell::from(opt(r.fine)));
                    cells.push(Cell::from(opt(r.interest)));
                }
                cells.push(Cell::from(palette.money_span(total, overdue)));
                let row = Row::new(cells);
                if hovered.as_deref() == Some(r.id.as_str()) {
                    row.style(palette.hovered)
                } else {
                    row
                }
            })
            .collect();

        let (header, widths): (Vec<&str>, Vec<Constraint>) = if narrow {
            (
                vec!["", "Cliente", "Parc", "Vencimento", "Valor", "Dias", "Valor Total"],
                vec![
                    Constraint::Length(CHECKBOX_WIDTH - 1),
                    Constraint::Fill(1),
                    Constraint::Length(4),
                    Constraint::Length(10),
                    Constraint::Length(14),
                    Constraint::Length(4),
                    Constraint::Length(14),
                ],
            )
        } else {
            (
                vec![
                    "", "Cliente", "Emp", "Pedido", "Nota", "Parc", "Vencimento", "Valor", "Dias",
                    "Multa", "Juros", "Valor Total",
                ],
                vec![
                    Constraint::Length(CHECKBOX_WIDTH - 1),
                    Constraint::Fill(1),
                    Constraint::Length(3),
                    Constraint::Length(6),
                    Constraint::Length(6),
                    Constraint::Length(4),
                    Constraint::Length(10),
                    Constraint::Length(14),
                    Constraint::Length(4),
                    Constraint::Length(12),
                    Constraint::Length(12),
                    Constraint::Length(14),
                ],
            )
        };

        let mut state = TableState::default();
        if !self.rows.is_empty() {
            state.select(Some(self.cursor - self.offset));
        }
        let table = Table::new(rows, widths)
            .header(Row::new(header).style(palette.table_header).bottom_margin(1))
            .column_spacing(1)
            .row_highlight_style(palette.selected);
        frame.render_stateful_widget(table, area, &mut state);

        if self.rows.is_empty() {
            frame.render_widget(
                Paragraph::new("Nenhum registro encontrado.").style(palette.footer),
                self.table_body,
            );
        }
    }

    fn draw_menu(&mut self, frame: &mut Frame, table_area: Rect, palette: &Palette) {
        let Some(anchor) = self.hover.anchor() else {
            self.menu_area = None;
            return;
        };
        let x = anchor.x.max(f32::from(table_area.x)) as u16;
        let top = (anchor.y - f32::from(MENU_HEIGHT) / 2.0).max(f32::from(table_area.y)) as u16;
        let top = top.min(table_area.bottom().saturating_sub(MENU_HEIGHT));
        let menu = Rect::new(x, top, MENU_WIDTH, MENU_HEIGHT).intersection(frame.area());
        self.menu_area = Some(menu);

        let pinned = self.hover.is_pinned();
        let fading = self.hover.dismissal_pending();
        let lines: Vec<Line> = MENU_ITEMS
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let style = if pinned && i == self.menu_cursor {
                    palette.selected
                } else if fading {
                    palette.footer
                } else {
                    palette.menu
                };
                let width = MENU_WIDTH as usize - 3;
                Line::from(Span::styled(format!(" {item:<width$}"), style))
            })
            .collect();
        frame.render_widget(Clear, menu);
        frame.render_widget(
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL).style(palette.menu)),
            menu,
        );
    }

    fn modal_block<'a>(title: &'a str, palette: &Palette) -> Block<'a> {
        Block::default()
            .borders(Borders::ALL)
            .title(Span::styled(title, palette.header))
            .style(palette.modal)
    }

    fn draw_date_picker(&mut self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let Modal::DateRange(picker) = &mut self.modal else {
            return;
        };
        let outer = tui::centered(area, 74, 14);
        frame.render_widget(Clear, outer);
        let block = Self::modal_block(" Prazo ", palette);
        let inner = block.inner(outer);
        frame.render_widget(block, outer);

        let [presets_area, left_area, right_area] = Layout::horizontal([
            Constraint::Length(16),
            Constraint::Length(23),
            Constraint::Length(23),
        ])
        .spacing(2)
        .areas(inner);

        let active = picker.selector.active_preset();
        picker.preset_cells.clear();
        let presets = picker.selector.presets();
        let preset_lines: Vec<Line> = presets
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let mut style = Style::default();
                if Some(p.label) == active {
                    style = palette.header;
                }
                if i == picker.preset_cursor {
                    style = style.add_modifier(Modifier::REVERSED);
                }
                if (i as u16) < presets_area.height {
                    picker.preset_cells.push((
                        Rect::new(presets_area.x, presets_area.y + i as u16, presets_area.width, 1),
                        i,
                    ));
                }
                Line::from(Span::styled(p.label, style))
            })
            .collect();
        frame.render_widget(Paragraph::new(preset_lines), presets_area);

        picker.day_cells.clear();
        let range = picker.selector.range();
        for (page, cal_area) in [
            (picker.selector.left_page(), left_area),
            (picker.selector.right_page(), right_area),
        ] {
            let mut lines = vec![
                Line::from(Span::styled(month_title(page), palette.header)),
                Line::from("Do Se Te Qa Qi Sx Sa"),
            ];
            for (w, week) in month_grid(page).iter().enumerate() {
                let mut spans = Vec::new();
                for (d, cell) in week.iter().enumerate() {
                    match cell {
                        Some(day) => {
                            let mut style = Style::default();
                            if range.contains(*day) && !range.is_unbounded() {
                                style = palette.selected;
                            }
                            if *day == picker.day_cursor {
                                style = style.add_modifier(Modifier::REVERSED);
                            }
                            spans.push(Span::styled(format!("{:>2}", day.day()), style));
                            picker.day_cells.push((
                                Rect::new(
                                    cal_area.x + d as u16 * 3,
                                    cal_area.y + 2 + w as u16,
                                    2,
                                    1,
                                ),
                                *day,
                            ));
                        }
                        None => spans.push(Span::raw("  ")),
                    }
                    spans.push(Span::raw(" "));
                }
                lines.push(Line::from(spans));
            }
            let which = match picker.endpoint {
                Endpoint::Start => "início",
                Endpoint::End => "fim",
            };
            if cal_area == left_area {
                lines.push(Line::from(Span::styled(
                    format!("{}  (marcando {which})", range.label()),
                    palette.footer,
                )));
            }
            frame.render_widget(Paragraph::new(lines), cal_area);
        }
    }

    fn draw_details(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let Modal::Details { row_id, schedule } = &self.modal else {
            return;
        };
        let outer = tui::centered(area, 110, schedule.len() as u16 + 5);
        frame.render_widget(Clear, outer);
        let title = format!(" Parcelas do título {row_id} ");
        let block = Self::modal_block(&title, palette);
        let inner = block.inner(outer);
        frame.render_widget(block, outer);

        let rows: Vec<Row> = schedule
            .iter()
            .map(|d| {
                Row::new(vec![
                    Cell::from(d.number.to_string()),
                    Cell::from(fmt::date(d.due_date)),
                    Cell::from(money(d.amount)),
                    Cell::from(d.days.to_string()),
                    Cell::from(money(d.fine)),
                    Cell::from(money(d.interest)),
                    Cell::from(money(d.discount)),
                    Cell::from(money(d.paid)),
                    Cell::from(fmt::date(d.payment_date)),
                    Cell::from(d.kind),
                ])
            })
            .collect();
        let widths = [
            Constraint::Length(4),
            Constraint::Length(10),
            Constraint::Length(12),
            Constraint::Length(4),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(12),
            Constraint::Length(10),
            Constraint::Length(7),
        ];
        let table = Table::new(rows, widths)
            .header(
                Row::new(vec![
                    "Par", "Vencimento", "Valor", "Dias", "Multa", "Juros", "Desconto",
                    "Valor Pago", "Pagamento", "Tipo",
                ])
                .style(palette.table_header)
                .bottom_margin(1),
            )
            .column_spacing(1);
        frame.render_widget(table, inner);
    }

    fn draw_include(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let Modal::Include(form) = &self.modal else {
            return;
        };
        let outer = tui::centered(area, 70, 21);
        frame.render_widget(Clear, outer);
        let block = Self::modal_block(" Incluir Parcela ", palette);
        let inner = block.inner(outer);
        frame.render_widget(block, outer);

        let width = inner.width.saturating_sub(12) as usize;
        let mut lines = Vec::new();
        for (name, value) in [
            ("Fatura", &form.invoice),
            ("Cliente", &form.client),
            ("Empresa", &form.company),
            ("Vendedor", &form.seller),
            ("Data", &form.invoice_date),
            ("Valor", &form.total),
            ("Pedido", &form.order),
            ("Nota", &form.fiscal_note),
            ("Cupom", &form.coupon),
            ("OS", &form.service_order),
            ("Histórico", &form.history),
            ("Obs", &form.notes),
        ] {
            let (wrapped, _) = tui::wrap_text(value, width);
            for (i, part) in wrapped.lines().enumerate() {
                let label = if i == 0 { format!("{name:<10}: ") } else { " ".repeat(12) };
                lines.push(Line::from(vec![
                    Span::styled(label, palette.header),
                    Span::raw(part.to_string()),
                ]));
            }
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "enter:confirmar e gerar parcelas  g:gerar parcelas  esc:fechar",
            palette.footer,
        )));
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn draw_generate(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let Modal::Generate { dialog, field } = &self.modal else {
            return;
        };
        let rows_needed = dialog.count() as u16 + GenerateField::ALL.len() as u16 + 10;
        let outer = tui::centered(area, 72, rows_needed);
        frame.render_widget(Clear, outer);
        let block = Self::modal_block(" Gerar Parcelas ", palette);
        let inner = block.inner(outer);
        frame.render_widget(block, outer);

        let form = dialog.form();
        let mut lines = vec![
            Line::from(vec![
                Span::styled("Cliente: ", palette.header),
                Span::raw(form.client.clone()),
            ]),
            Line::from(vec![
                Span::styled("Tipo: ", palette.header),
                Span::raw(form.kind.clone()),
                Span::styled("  Espécie: ", palette.header),
                Span::raw(form.species.clone()),
            ]),
            Line::from(format!(
                "[{}] Acréscimo  [{}] Desconto  [{}] Outros",
                if form.surcharge { "x" } else { " " },
                if form.discount { "x" } else { " " },
                if form.other { "x" } else { " " },
            )),
        ];
        for (i, f) in GenerateField::ALL.iter().enumerate() {
            let cursor = if i == *field { "\u{2588}" } else { "" };
            let style = if i == *field { palette.selected } else { Style::default() };
            lines.push(Line::from(vec![
                Span::styled(format!("{:<14}", f.label()), palette.header),
                Span::styled(format!("{}{cursor}", form.field(*f)), style),
            ]));
        }
        lines.push(Line::from(""));
        if dialog.is_generating() {
            lines.push(Line::from(Span::styled("Gerando...", palette.footer)));
        } else if dialog.count() == 0 {
            lines.push(Line::from(Span::styled("Nenhuma parcela.", palette.footer)));
        } else {
            lines.push(Line::from(Span::styled(
                format!("{:>4}  {:>5}  {:<10}  {:>16}", "Nº", "Dias", "Vencimento", "Valor"),
                palette.table_header,
            )));
            for inst in dialog.installments() {
                lines.push(Line::from(format!(
                    "{:>4}  {:>5}  {:<10}  {:>16}",
                    inst.sequence_number,
                    inst.days_from_start,
                    inst.display_due_date(),
                    inst.display_amount(),
                )));
            }
        }
        lines.push(Line::from(vec![
            Span::styled("Total: R$ ", palette.header),
            Span::raw(dialog.total_label()),
            Span::styled(format!("   Parcelas: {}", dialog.count()), palette.header),
        ]));
        lines.push(Line::from(Span::styled(
            "tab:campo  F5:gerar  F6/F7/F8:acréscimo/desconto/outros  enter:confirmar  esc:fechar",
            palette.footer,
        )));
        frame.render_widget(Paragraph::new(lines), inner);
    }

    // -----------------------------------------------------------------------
    // Keyboard
    // -----------------------------------------------------------------------

    pub fn handle_key_event(&mut self, code: KeyCode, now: Instant) -> ScreenAction {
        self.status_message = None;

        if !matches!(self.modal, Modal::None) {
            self.handle_modal_key(code, now);
            return ScreenAction::Continue;
        }

        if let InputMode::EditClient(input) = &mut self.mode {
            match code {
                KeyCode::Esc => self.mode = InputMode::Normal,
                KeyCode::Enter => {
                    self.filters.client = input.trim().to_string();
                    self.mode = InputMode::Normal;
                    self.refresh();
                }
                KeyCode::Backspace => {
                    input.pop();
                }
                KeyCode::Char(c) => input.push(c),
                _ => {}
            }
            return ScreenAction::Continue;
        }

        if self.hover.is_pinned() {
            match code {
                KeyCode::Esc => self.hover.close(),
                KeyCode::Up => self.menu_cursor = self.menu_cursor.saturating_sub(1),
                KeyCode::Down => {
                    self.menu_cursor = (self.menu_cursor + 1).min(MENU_ITEMS.len() - 1);
                }
                KeyCode::Enter => self.invoke_menu_item(self.menu_cursor),
                _ => {}
            }
            return ScreenAction::Continue;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return ScreenAction::Close,
            KeyCode::Down => {
                if self.cursor + 1 < self.rows.len() {
                    self.cursor += 1;
                }
            }
            KeyCode::Up => {
                self.cursor = self.cursor.saturating_sub(1);
                if self.cursor < self.offset {
                    self.offset = self.cursor;
                }
            }
            KeyCode::Enter => {
                if let Some(row) = self.rows.get(self.cursor) {
                    let id = row.id.clone();
                    let rect = self.row_rect(self.cursor);
                    self.menu_cursor = 0;
                    self.hover.click_row(&id, rect);
                }
            }
            KeyCode::Char(' ') => {
                if let Some(row) = self.rows.get(self.cursor) {
                    let id = row.id.clone();
                    self.selection.toggle(&id);
                }
            }
            KeyCode::Char('a') => {
                let ids: Vec<String> = self.rows.iter().map(|r| r.id.clone()).collect();
                self.selection.toggle_all(ids.iter().map(String::as_str));
            }
            KeyCode::Char('m') => {
                self.status_message = Some(if self.selection.is_empty() {
                    "Nenhum título marcado".into()
                } else {
                    let ids: Vec<&str> = self.selection.selected_ids().collect();
                    format!("Marcados: {}", ids.join(", "))
                });
            }
            KeyCode::Char('s') => {
                self.filters.situation = self.filters.situation.next();
                self.refresh();
            }
            KeyCode::Char('k') => {
                self.filters.date_kind = self.filters.date_kind.toggle();
                self.refresh();
            }
            KeyCode::Char('f') => {
                self.mode = InputMode::EditClient(self.filters.client.clone());
            }
            KeyCode::Char('d') => {
                self.modal = Modal::DateRange(Box::new(DatePicker::new(self.today, &self.filters)));
            }
            KeyCode::Char('i') => self.modal = Modal::Include(IncludeForm::default()),
            KeyCode::Char('g') => self.open_generate(GenerateForm::default()),
            KeyCode::Char('v') => {
                if let Some(id) = self.rows.get(self.cursor).map(|r| r.id.clone()) {
                    self.open_details(&id);
                }
            }
            KeyCode::Char('t') => match self.theme.toggle() {
                Ok(theme) => self.status_message = Some(format!("Tema: {theme}")),
                Err(e) => self.status_message = Some(format!("Falha ao salvar tema: {e}")),
            },
            _ => {}
        }
        ScreenAction::Continue
    }

    fn handle_modal_key(&mut self, code: KeyCode, now: Instant) {
        match &mut self.modal {
            Modal::None => {}
            Modal::Details { .. } => {
                if matches!(code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
                    self.modal = Modal::None;
                }
            }
            Modal::Include(form) => match code {
                KeyCode::Esc => self.modal = Modal::None,
                KeyCode::Enter => {
                    let seeded = form.confirm();
                    self.open_generate(seeded);
                }
                KeyCode::Char('g') => self.open_generate(GenerateForm::default()),
                _ => {}
            },
            Modal::Generate { dialog, field } => match code {
                KeyCode::Esc => {
                    dialog.close();
                    self.modal = Modal::None;
                }
                KeyCode::Tab | KeyCode::Down => {
                    if GenerateField::ALL[*field] == GenerateField::Amount {
                        dialog.mask_amount(now);
                    }
                    *field = (*field + 1) % GenerateField::ALL.len();
                }
                KeyCode::BackTab | KeyCode::Up => {
                    *field = (*field + GenerateField::ALL.len() - 1) % GenerateField::ALL.len();
                }
                KeyCode::F(5) => dialog.request_generate(now),
                KeyCode::F(6) => dialog.toggle_surcharge(),
                KeyCode::F(7) => dialog.toggle_discount(),
                KeyCode::F(8) => dialog.toggle_other(),
                KeyCode::Backspace => {
                    let f = GenerateField::ALL[*field];
                    let mut value = dialog.form().field(f).to_string();
                    value.pop();
                    dialog.set_field(f, &value, now);
                }
                KeyCode::Char(c) => {
                    let f = GenerateField::ALL[*field];
                    let mut value = dialog.form().field(f).to_string();
                    value.push(c);
                    dialog.set_field(f, &value, now);
                }
                KeyCode::Enter => self.confirm_generate(),
                _ => {}
            },
            Modal::DateRange(picker) => match code {
                KeyCode::Esc => self.modal = Modal::None,
                KeyCode::Char('o') => {
                    self.filters.period = picker.selector.range();
                    self.modal = Modal::None;
                    self.refresh();
                }
                KeyCode::Char('x') => {
                    self.filters.period = Default::default();
                    self.modal = Modal::None;
                    self.refresh();
                }
                KeyCode::Up => picker.preset_cursor = picker.preset_cursor.saturating_sub(1),
                KeyCode::Down => {
                    let last = picker.selector.presets().len() - 1;
                    picker.preset_cursor = (picker.preset_cursor + 1).min(last);
                }
                KeyCode::Enter => {
                    let label = picker.selector.presets()[picker.preset_cursor].label;
                    if let Err(e) = picker.selector.select_preset(label) {
                        self.status_message = Some(e.to_string());
                    } else if let Some(start) = picker.selector.range().start {
                        picker.day_cursor = start;
                    }
                }
                KeyCode::Left => {
                    picker.day_cursor = picker.day_cursor.pred_opt().unwrap_or(picker.day_cursor);
                }
                KeyCode::Right => {
                    picker.day_cursor = picker.day_cursor.succ_opt().unwrap_or(picker.day_cursor);
                }
                KeyCode::Char(' ') => {
                    let day = picker.day_cursor;
                    picker.pick(day);
                }
                KeyCode::Tab => {
                    picker.endpoint = match picker.endpoint {
                        Endpoint::Start => Endpoint::End,
                        Endpoint::End => Endpoint::Start,
                    };
                }
                KeyCode::Char('c') => {
                    picker.selector.clear();
                    picker.day_cursor = picker.selector.today();
                }
                KeyCode::Char('[') => picker.selector.step_left(-1),
                KeyCode::Char(']') => picker.selector.step_left(1),
                KeyCode::Char('{') => picker.selector.step_right(-1),
                KeyCode::Char('}') => picker.selector.step_right(1),
                KeyCode::Char('-') => picker.selector.step_left_year(-1),
                KeyCode::Char('+') => picker.selector.step_left_year(1),
                KeyCode::Char('(') => picker.selector.step_right_year(-1),
                KeyCode::Char(')') => picker.selector.step_right_year(1),
                _ => {}
            },
        }
    }

    // -----------------------------------------------------------------------
    // Mouse
    // -----------------------------------------------------------------------

    pub fn handle_mouse_event(&mut self, mouse: MouseEvent, now: Instant) {
        let (col, row) = (mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Moved if matches!(self.modal, Modal::None) => {
                self.pointer_moved(col, row, now);
            }
            MouseEventKind::Down(MouseButton::Left) => {
                if let Modal::DateRange(picker) = &mut self.modal {
                    let hit = |r: &Rect| tui::contains(*r, col, row);
                    if let Some(&(_, day)) = picker.day_cells.iter().find(|(r, _)| hit(r)) {
                        picker.pick(day);
                    } else if let Some(&(_, i)) = picker.preset_cells.iter().find(|(r, _)| hit(r)) {
                        picker.preset_cursor = i;
                        let label = picker.selector.presets()[i].label;
                        if let Err(e) = picker.selector.select_preset(label) {
                            self.status_message = Some(e.to_string());
                        }
                    }
                    return;
                }
                if matches!(self.modal, Modal::None) {
                    self.pointer_clicked(col, row);
                }
            }
            MouseEventKind::ScrollDown if matches!(self.modal, Modal::None) => {
                if self.offset + self.visible_count < self.rows.len() {
                    self.offset += 1;
                    self.cursor = self.cursor.max(self.offset);
                }
            }
            MouseEventKind::ScrollUp if matches!(self.modal, Modal::None) => {
                self.offset = self.offset.saturating_sub(1);
                if self.cursor >= self.offset + self.visible_count {
                    self.cursor = self.offset + self.visible_count - 1;
                }
            }
            _ => {}
        }
    }

    fn row_rect(&self, index: usize) -> RowRect {
        let y = self.table_body.y as usize + index.saturating_sub(self.offset);
        RowRect {
            x: f32::from(self.table_body.right()),
            y: y as f32,
            width: f32::from(self.table_body.width),
            height: 1.0,
        }
    }

    fn row_at(&self, col: u16, row: u16) -> Option<usize> {
        if !tui::contains(self.table_body, col, row) {
            return None;
        }
        let index = self.offset + (row - self.table_body.y) as usize;
        (index < self.rows.len()).then_some(index)
    }

    fn pointer_moved(&mut self, col: u16, row: u16, now: Instant) {
        let on_menu = self.menu_area.is_some_and(|m| tui::contains(m, col, row));
        if on_menu != self.pointer_on_menu {
            self.pointer_on_menu = on_menu;
            if on_menu {
                self.hover.pointer_enter_menu(now);
            } else {
                self.hover.pointer_leave_menu(now);
            }
        }
        if on_menu {
            return;
        }

        let under = self.row_at(col, row);
        let under_id = under.map(|i| self.rows[i].id.clone());
        if under_id == self.pointer_row {
            return;
        }
        if self.pointer_row.is_some() {
            self.hover.pointer_leave_row(now);
        }
        if let (Some(index), Some(id)) = (under, &under_id) {
            self.hover.pointer_enter_row(id, self.row_rect(index), now);
        }
        self.pointer_row = under_id;
    }

    fn pointer_clicked(&mut self, col: u16, row: u16) {
        if let Some(menu) = self.menu_area.filter(|m| tui::contains(*m, col, row)) {
            let item = row.saturating_sub(menu.y + 1) as usize;
            if item < MENU_ITEMS.len() {
                self.invoke_menu_item(item);
            }
            return;
        }
        match self.row_at(col, row) {
            Some(index) => {
                self.cursor = index;
                let id = self.rows[index].id.clone();
                if col < self.table_body.x + CHECKBOX_WIDTH {
                    self.selection.toggle(&id);
                } else {
                    self.menu_cursor = 0;
                    self.hover.click_row(&id, self.row_rect(index));
                }
            }
            None => self.hover.click_outside(),
        }
    }

    // -----------------------------------------------------------------------
    // Actions
    // -----------------------------------------------------------------------

    fn invoke_menu_item(&mut self, item: usize) {
        let target = self.hover.action_target(&self.rows).cloned();
        self.hover.invoke_action();
        self.menu_area = None;
        let Some(row) = target else {
            self.status_message = Some("Registro não encontrado".into());
            return;
        };
        match MENU_ITEMS.get(item).copied() {
            Some("Visualizar") => self.open_details(&row.id),
            Some("Copiar") => {
                self.status_message = Some(format!(
                    "Cliente: {} | Valor: {} | Vencimento: {}",
                    row.client,
                    money(row.amount),
                    fmt::date(row.due)
                ));
            }
            Some("Enviar") => {
                self.status_message = Some(format!("Enviar dados de: {}", row.client));
            }
            Some("Imprimir") => {
                self.status_message = Some(format!("Imprimindo dados de: {}", row.client));
            }
            _ => {}
        }
    }

    fn open_details(&mut self, id: &str) {
        match self.all_rows.iter().find(|r| r.id == id) {
            Some(row) => {
                self.modal = Modal::Details {
                    row_id: id.to_string(),
                    schedule: installments::details(row),
                };
            }
            None => self.status_message = Some("Registro não encontrado".into()),
        }
    }

    fn open_generate(&mut self, form: GenerateForm) {
        self.modal = Modal::Generate {
            dialog: GenerateDialog::open(form, self.today),
            field: 0,
        };
    }

    fn confirm_generate(&mut self) {
        let Modal::Generate { dialog, .. } = std::mem::replace(&mut self.modal, Modal::None) else {
            return;
        };
        self.status_message = Some(match dialog.confirm() {
            Some(plan) => format!(
                "{} parcelas geradas com sucesso! Total: R$ {}",
                installments::count(&plan),
                number(installments::total(&plan))
            ),
            None => "Nenhuma parcela para salvar".into(),
        });
    }

    #[cfg(test)]
    fn status(&self) -> Option<&str> {
        self.status_message.as_deref()
    }
}

fn month_title(page: CalendarPage) -> String {
    const NAMES: &[&str] = &[
        "Janeiro", "Fevereiro", "Março", "Abril", "Maio", "Junho", "Julho", "Agosto", "Setembro",
        "Outubro", "Novembro", "Dezembro",
    ];
    let name = NAMES.get(page.month as usize - 1).unwrap_or(&"???");
    format!("{name} {}", page.year)
}

/// Start the interactive screen over the mock dataset.
pub fn run(theme: ThemeContext) -> Result<()> {
    let today = chrono::Local::now().date_naive();
    let mut screen = ReceivablesScreen::new(crate::models::mock_receivables(), theme, today);
    screen.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date_range::PRESETS;
    use crate::models::mock_receivables;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn screen() -> (ReceivablesScreen, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let theme = ThemeContext::load_with_signal(dir.path().join("settings.json"), None);
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        (ReceivablesScreen::new(mock_receivables(), theme, today), dir)
    }

    fn draw(s: &mut ReceivablesScreen) {
        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
        terminal.draw(|f| s.draw_frame(f)).unwrap();
    }

    #[test]
    fn test_situation_cycle_refilters() {
        let (mut s, _dir) = screen();
        assert_eq!(s.rows.len(), 2);
        s.handle_key_event(KeyCode::Char('s'), Instant::now());
        assert!(s.rows.iter().all(|r| r.status == Status::Settled));
    }

    #[test]
    fn test_hover_menu_follows_pointer_and_dismisses() {
        let (mut s, _dir) = screen();
        draw(&mut s);
        let t0 = Instant::now();
        let body = s.table_body;
        s.pointer_moved(body.x + 10, body.y, t0);
        assert_eq!(s.hover.active_row(), Some("1"));
        s.pointer_moved(body.x + 10, body.bottom() - 1, t0);
        assert!(s.hover.dismissal_pending());
        s.tick(t0 + Duration::from_millis(299));
        assert_eq!(s.hover.active_row(), Some("1"));
        s.tick(t0 + Duration::from_millis(300));
        assert_eq!(s.hover.active_row(), None);
    }

    #[test]
    fn test_click_row_then_view_opens_details() {
        let (mut s, _dir) = screen();
        draw(&mut s);
        let body = s.table_body;
        s.pointer_clicked(body.x + 10, body.y + 1);
        assert!(s.hover.is_pinned());
        draw(&mut s);
        s.handle_key_event(KeyCode::Enter, Instant::now());
        assert!(matches!(
            &s.modal,
            Modal::Details { row_id, schedule } if row_id == "3" && schedule.len() == 13
        ));
    }

    #[test]
    fn test_checkbox_click_toggles_selection() {
        let (mut s, _dir) = screen();
        draw(&mut s);
        let body = s.table_body;
        s.pointer_clicked(body.x, body.y);
        assert!(s.selection.is_selected("1"));
        assert!(!s.hover.is_pinned());
    }

    #[test]
    fn test_generate_flow_reports_total() {
        let (mut s, _dir) = screen();
        let t0 = Instant::now();
        s.handle_key_event(KeyCode::Char('i'), t0);
        s.handle_key_event(KeyCode::Enter, t0);
        assert!(matches!(s.modal, Modal::Generate { .. }));
        draw(&mut s);
        s.handle_key_event(KeyCode::Enter, t0);
        assert_eq!(s.status(), Some("10 parcelas geradas com sucesso! Total: R$ 730.000,00"));
    }

    #[test]
    fn test_date_picker_applies_period() {
        let (mut s, _dir) = screen();
        let t0 = Instant::now();
        s.filters.situation = crate::models::Situation::All;
        s.handle_key_event(KeyCode::Char('d'), t0);
        draw(&mut s);
        // "All Time" is the last preset
        for _ in 0..PRESETS.len() {
            s.handle_key_event(KeyCode::Down, t0);
        }
        s.handle_key_event(KeyCode::Enter, t0);
        s.handle_key_event(KeyCode::Char('o'), t0);
        assert!(matches!(s.modal, Modal::None));
        assert_eq!(s.filters.period.end, Some(s.today));
        assert_eq!(s.rows.len(), 5);
    }

    #[test]
    fn test_select_all_then_report_marked() {
        let (mut s, _dir) = screen();
        let t0 = Instant::now();
        s.handle_key_event(KeyCode::Char('a'), t0);
        s.handle_key_event(KeyCode::Char('m'), t0);
        assert_eq!(s.status(), Some("Marcados: 1, 3"));
        s.handle_key_event(KeyCode::Char('a'), t0);
        s.handle_key_event(KeyCode::Char('m'), t0);
        assert_eq!(s.status(), Some("Nenhum título marcado"));
    }

    #[test]
    fn test_mouse_click_on_preset_selects_range() {
        let (mut s, _dir) = screen();
        s.handle_key_event(KeyCode::Char('d'), Instant::now());
        draw(&mut s);
        let Modal::DateRange(picker) = &s.modal else {
            panic!("date picker not open");
        };
        let (cell, _) = picker.preset_cells[2];
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: cell.x,
            row: cell.y,
            modifiers: KeyModifiers::NONE,
        };
        s.handle_mouse_event(click, Instant::now());
        let Modal::DateRange(picker) = &s.modal else {
            panic!("date picker closed");
        };
        assert_eq!(picker.preset_cursor, 2);
        assert_eq!(picker.selector.active_preset(), Some("This Week"));
        assert_eq!(s.status(), None);
    }

    #[test]
    fn test_theme_toggle_updates_palette_source() {
        let (mut s, _dir) = screen();
        assert_eq!(s.current_theme.get(), Theme::Light);
        s.handle_key_event(KeyCode::Char('t'), Instant::now());
        assert_eq!(s.current_theme.get(), Theme::Dark);
    }
}
