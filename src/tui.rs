use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use rust_decimal::Decimal;

use crate::fmt::money;
use crate::theme::Theme;

/// Colours for one theme. The orange accent follows the screen's brand.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub header: Style,
    pub footer: Style,
    pub table_header: Style,
    pub selected: Style,
    pub hovered: Style,
    pub overdue: Style,
    pub amount: Style,
    pub menu: Style,
    pub modal: Style,
}

const ORANGE: Color = Color::Rgb(243, 112, 33);

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                header: Style::new().fg(ORANGE).add_modifier(Modifier::BOLD),
                footer: Style::new().fg(Color::DarkGray),
                table_header: Style::new()
                    .fg(Color::White)
                    .bg(ORANGE)
                    .add_modifier(Modifier::BOLD),
                selected: Style::new()
                    .bg(Color::Rgb(40, 40, 60))
                    .add_modifier(Modifier::BOLD),
                hovered: Style::new().bg(Color::Rgb(30, 41, 59)),
                overdue: Style::new().fg(Color::Red),
                amount: Style::new().fg(Color::Rgb(80, 220, 100)),
                menu: Style::new().fg(Color::White).bg(Color::Rgb(51, 65, 85)),
                modal: Style::new().fg(Color::Gray).bg(Color::Rgb(15, 23, 42)),
            },
            Theme::Light => Self {
                header: Style::new().fg(ORANGE).add_modifier(Modifier::BOLD),
                footer: Style::new().fg(Color::Gray),
                table_header: Style::new()
                    .fg(Color::White)
                    .bg(ORANGE)
                    .add_modifier(Modifier::BOLD),
                selected: Style::new()
                    .bg(Color::Rgb(255, 237, 213))
                    .fg(Color::Black)
                    .add_modifier(Modifier::BOLD),
                hovered: Style::new().bg(Color::Rgb(243, 244, 246)).fg(Color::Black),
                overdue: Style::new().fg(Color::Rgb(185, 28, 28)),
                amount: Style::new().fg(Color::Rgb(0, 147, 0)),
                menu: Style::new().fg(Color::Black).bg(Color::Rgb(229, 231, 235)),
                modal: Style::new().fg(Color::Black).bg(Color::White),
            },
        }
    }

    /// Amount cell; overdue amounts are highlighted.
    pub fn money_span(&self, amount: Decimal, overdue: bool) -> Span<'static> {
        let style = if overdue { self.overdue } else { self.amount };
        Span::styled(money(amount), style)
    }
}

/// Wrap text to a given width. Returns (wrapped_string, line_count).
pub fn wrap_text(text: &str, width: usize) -> (String, u16) {
    if width == 0 {
        return (text.to_string(), 1);
    }
    let wrapped = textwrap::fill(text, width);
    let lines = wrapped.lines().count().max(1) as u16;
    (wrapped, lines)
}

/// A box of at most `width` x `height` centred in `area`.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(row);
    cell
}

pub fn contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x && column < area.right() && row >= area.y && row < area.bottom()
}
