use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use crate::cli::{parse_date_arg, today};
use crate::error::Result;
use crate::fmt::number;
use crate::installments::{self, Installment, PlanRequest};

pub fn run(amount: &str, interval: &str, count: Option<&str>, start: Option<&str>) -> Result<()> {
    let start = match start {
        Some(s) => parse_date_arg(s)?,
        None => today(),
    };
    let plan = match PlanRequest::from_form(amount, interval, count, start) {
        Some(request) => installments::generate(&request),
        None => Vec::new(),
    };
    println!("{}", format_plan(&plan));
    Ok(())
}

pub fn format_plan(plan: &[Installment]) -> String {
    if plan.is_empty() {
        return "Nenhuma parcela gerada.".to_string();
    }
    let mut table = Table::new();
    table.set_header(vec!["Nº", "Dias", "Vencimento", "Valor"]);
    for inst in plan {
        table.add_row(vec![
            Cell::new(inst.sequence_number),
            Cell::new(inst.days_from_start).set_alignment(CellAlignment::Right),
            Cell::new(inst.display_due_date()),
            Cell::new(inst.display_amount()).set_alignment(CellAlignment::Right),
        ]);
    }
    format!(
        "Parcelas\n{table}\n{} R$ {}   {} {}",
        "Total:".bold(),
        number(installments::total(plan)),
        "Parcelas:".bold(),
        installments::count(plan),
    )
}
