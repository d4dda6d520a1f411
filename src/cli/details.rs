use comfy_table::{Cell, CellAlignment, Table};

use crate::error::{ReceivablesError, Result};
use crate::fmt::{self, money};
use crate::installments::{details, InstallmentDetail};
use crate::models::{mock_receivables, Receivable};

pub fn run(id: &str) -> Result<()> {
    let rows = mock_receivables();
    let row = rows
        .iter()
        .find(|r| r.id == id)
        .ok_or_else(|| ReceivablesError::UnknownReceivable(id.to_string()))?;
    println!("{}", format_details(row, &details(row)));
    Ok(())
}

pub fn format_details(row: &Receivable, schedule: &[InstallmentDetail]) -> String {
    let heading = format!("Título {} - {}", row.id, row.client);
    if schedule.is_empty() {
        return format!("{heading}\nNenhuma parcela.");
    }
    let mut table = Table::new();
    table.set_header(vec![
        "Par", "Vencimento", "Valor", "Dias", "Multa", "Juros", "Desconto", "Valor Pago",
        "Pagamento", "Tipo",
    ]);
    let right = |s: String| Cell::new(s).set_alignment(CellAlignment::Right);
    for d in schedule {
        table.add_row(vec![
            Cell::new(d.number),
            Cell::new(fmt::date(d.due_date)),
            right(money(d.amount)),
            Cell::new(d.days),
            right(money(d.fine)),
            right(money(d.interest)),
            right(money(d.discount)),
            right(money(d.paid)),
            Cell::new(fmt::date(d.payment_date)),
            Cell::new(d.kind),
        ]);
    }
    format!("{heading}\n{table}")
}
