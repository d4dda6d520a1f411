use chrono::NaiveDate;
use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use crate::cli::{parse_date_arg, today};
use crate::date_range::{DateRange, DateRangeSelector};
use crate::error::{ReceivablesError, Result};
use crate::filters::{DateKind, FilterPanel, Totals};
use crate::fmt::{self, money};
use crate::hover::RowSelection;
use crate::models::{mock_receivables, Receivable, Situation, Status};

pub struct ListArgs<'a> {
    pub situation: &'a str,
    pub preset: Option<&'a str>,
    pub from: Option<&'a str>,
    pub to: Option<&'a str>,
    pub issued: bool,
    pub client: Option<&'a str>,
}

pub fn run(args: ListArgs<'_>) -> Result<()> {
    let today = today();
    let filters = build_filters(&args, today)?;
    let rows = filters.apply(&mock_receivables());
    println!("{}", format_list(&filters, &rows, today));
    Ok(())
}

pub fn build_filters(args: &ListArgs<'_>, today: NaiveDate) -> Result<FilterPanel> {
    let situation: Situation = args.situation.parse().map_err(ReceivablesError::Other)?;
    let period = match (args.preset, args.from, args.to) {
        (Some(label), _, _) => {
            let mut selector = DateRangeSelector::new(today);
            selector.select_preset(label)?;
            selector.range()
        }
        (None, Some(from), Some(to)) => DateRange::new(parse_date_arg(from)?, parse_date_arg(to)?),
        _ => DateRange::default(),
    };
    Ok(FilterPanel {
        client: args.client.unwrap_or_default().to_string(),
        period,
        date_kind: if args.issued { DateKind::Issued } else { DateKind::Due },
        situation,
        ..FilterPanel::default()
    })
}

pub fn format_list(filters: &FilterPanel, rows: &[Receivable], today: NaiveDate) -> String {
    let mut out = format!("{}\n", filters.describe());
    if rows.is_empty() {
        out.push_str("Nenhum registro encontrado.");
        return out;
    }

    let mut table = Table::new();
    table.set_header(vec![
        "ID", "Cliente", "Pedido", "Nota", "Parc", "Emissão", "Vencimento", "Valor", "Dias",
        "Valor Total",
    ]);
    for r in rows {
        let total = r.total.map(money).unwrap_or_else(|| "\u{2014}".into());
        let total = if r.status == Status::Open && r.due < today {
            total.red().to_string()
        } else {
            total
        };
        table.add_row(vec![
            Cell::new(&r.id),
            Cell::new(&r.client),
            Cell::new(&r.order),
            Cell::new(&r.invoice),
            Cell::new(&r.installment),
            Cell::new(fmt::date(r.issued)),
            Cell::new(fmt::date(r.due)),
            Cell::new(money(r.amount)).set_alignment(CellAlignment::Right),
            Cell::new(r.days_overdue.map(|d| d.to_string()).unwrap_or_default()),
            Cell::new(total).set_alignment(CellAlignment::Right),
        ]);
    }

    let totals = Totals::compute(rows, &RowSelection::new(), today);
    out.push_str(&format!(
        "Contas a Receber\n{table}\n{} {}  {} {}  {} {}  {} {}",
        "Vencidos:".bold(),
        money(totals.overdue),
        "A vencer:".bold(),
        money(totals.upcoming),
        "Capital:".bold(),
        money(totals.capital),
        "Total:".bold(),
        money(totals.total),
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(situation: &str) -> ListArgs<'_> {
        ListArgs {
            situation,
            preset: None,
            from: None,
            to: None,
            issued: false,
            client: None,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn test_build_filters_situation_and_period() {
        let period = ListArgs {
            from: Some("01/01/2024"),
            to: Some("29/02/2024"),
            ..args("baixadas")
        };
        let filters = build_filters(&period, today()).unwrap();
        let rows = filters.apply(&mock_receivables());
        let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["10", "11"]);
    }

    #[test]
    fn test_build_filters_rejects_bad_input() {
        assert!(build_filters(&args("pendentes"), today()).is_err());
        let unknown_preset = ListArgs {
            preset: Some("Next Week"),
            ..args("todos")
        };
        assert!(matches!(
            build_filters(&unknown_preset, today()),
            Err(ReceivablesError::UnknownPreset(_))
        ));
        let bad_date = ListArgs {
            from: Some("31/02/2024"),
            to: Some("01/03/2024"),
            ..args("todos")
        };
        assert!(matches!(
            build_filters(&bad_date, today()),
            Err(ReceivablesError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_format_list_shows_totals() {
        let filters = build_filters(&args("abertas"), today()).unwrap();
        let rows = filters.apply(&mock_receivables());
        let out = format_list(&filters, &rows, today());
        assert!(out.contains("Situação: Abertas"));
        assert!(out.contains("R$ 2.172,10"));
    }

    #[test]
    fn test_format_list_empty() {
        let nobody = ListArgs {
            client: Some("nobody"),
            ..args("todos")
        };
        let filters = build_filters(&nobody, today()).unwrap();
        let out = format_list(&filters, &[], today());
        assert!(out.ends_with("Nenhum registro encontrado."));
    }
}
