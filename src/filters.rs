use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::date_range::DateRange;
use crate::hover::RowSelection;
use crate::models::{Receivable, Situation, Status};

/// Which date the Período filter applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateKind {
    #[default]
    Due,
    Issued,
}

impl DateKind {
    pub fn label(self) -> &'static str {
        match self {
            DateKind::Due => "Vencimento",
            DateKind::Issued => "Emissão",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            DateKind::Due => DateKind::Issued,
            DateKind::Issued => DateKind::Due,
        }
    }
}

/// State of the filter panel. Empty text fields and an unbounded period do
/// not filter.
#[derive(Debug, Clone, Default)]
pub struct FilterPanel {
    pub client: String,
    pub period: DateRange,
    pub date_kind: DateKind,
    pub company: String,
    pub invoice: String,
    pub duplicate: String,
    pub order: String,
    pub quote: String,
    pub seller: String,
    pub situation: Situation,
}

fn field_matches(filter: &str, value: &str) -> bool {
    let needle = filter.trim();
    needle.is_empty() || value.to_lowercase().contains(&needle.to_lowercase())
}

impl FilterPanel {
    pub fn matches(&self, row: &Receivable) -> bool {
        let day = match self.date_kind {
            DateKind::Due => row.due,
            DateKind::Issued => row.issued,
        };
        self.situation.matches(row.status)
            && self.period.contains(day)
            && field_matches(&self.client, &row.client)
            && field_matches(&self.company, &row.company)
            && field_matches(&self.invoice, &row.invoice)
            && field_matches(&self.duplicate, &row.duplicate)
            && field_matches(&self.order, &row.order)
            && field_matches(&self.quote, &row.quote)
            && field_matches(&self.seller, &row.seller)
    }

    pub fn apply(&self, rows: &[Receivable]) -> Vec<Receivable> {
        rows.iter().filter(|r| self.matches(r)).cloned().collect()
    }

    /// One-line summary for status bars.
    pub fn describe(&self) -> String {
        let mut parts = vec![format!("Situação: {}", self.situation.label())];
        if !self.period.is_unbounded() {
            parts.push(format!("{}: {}", self.date_kind.label(), self.period.label()));
        }
        for (name, value) in [
            ("Cliente", &self.client),
            ("Empresa", &self.company),
            ("Nota", &self.invoice),
            ("Duplicata", &self.duplicate),
            ("Pedido", &self.order),
            ("Orçamento", &self.quote),
            ("Vendedor", &self.seller),
        ] {
            if !value.trim().is_empty() {
                parts.push(format!("{name}: {}", value.trim()));
            }
        }
        parts.join(" | ")
    }
}

/// Summary figures shown above the table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Totals {
    pub selected: Decimal,
    pub overdue: Decimal,
    pub upcoming: Decimal,
    pub capital: Decimal,
    pub total: Decimal,
}

impl Totals {
    pub fn compute(rows: &[Receivable], selection: &RowSelection, today: NaiveDate) -> Self {
        let mut totals = Totals::default();
        for row in rows {
            let row_total = row.total.unwrap_or(row.amount);
            totals.capital += row.amount;
            totals.total += row_total;
            if selection.is_selected(&row.id) {
                totals.selected += row_total;
            }
            if row.status == Status::Open {
                if row.due < today {
                    totals.overdue += row_total;
                } else {
                    totals.upcoming += row_total;
                }
            }
        }
        totals
    }
}
