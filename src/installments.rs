use chrono::{Datelike, Days, Months, NaiveDate};
use rust_decimal::Decimal;

use crate::fmt::{self, cents, money, parse_money};
use crate::models::Receivable;

pub const DEFAULT_INSTALLMENT_COUNT: u32 = 10;
pub const DEFAULT_DAY_INTERVAL: u32 = 30;

/// Input to the installment generator.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanRequest {
    pub total_amount: Decimal,
    pub installment_count: u32,
    pub day_interval: u32,
    pub start_date: NaiveDate,
}

impl PlanRequest {
    pub fn new(total_amount: Decimal, day_interval: u32, start_date: NaiveDate) -> Self {
        Self {
            total_amount,
            installment_count: DEFAULT_INSTALLMENT_COUNT,
            day_interval,
            start_date,
        }
    }

    pub fn with_count(mut self, installment_count: u32) -> Self {
        self.installment_count = installment_count;
        self
    }

    /// Build a request from raw form fields. Returns None when the amount is
    /// missing, unparseable or not positive; a bad or zero interval/count
    /// falls back to the defaults.
    pub fn from_form(
        amount: &str,
        interval: &str,
        count: Option<&str>,
        start_date: NaiveDate,
    ) -> Option<Self> {
        let total_amount = parse_money(amount).filter(|v| *v > Decimal::ZERO)?;
        let day_interval = parse_positive(interval).unwrap_or(DEFAULT_DAY_INTERVAL);
        let installment_count = count
            .and_then(parse_positive)
            .unwrap_or(DEFAULT_INSTALLMENT_COUNT);
        Some(Self::new(total_amount, day_interval, start_date).with_count(installment_count))
    }
}

fn parse_positive(s: &str) -> Option<u32> {
    s.trim().parse::<u32>().ok().filter(|n| *n > 0)
}

/// One scheduled partial payment.
#[derive(Debug, Clone, PartialEq)]
pub struct Installment {
    pub sequence_number: u32,
    pub days_from_start: u32,
    pub due_date: NaiveDate,
    pub amount: Decimal,
}

impl Installment {
    pub fn display_amount(&self) -> String {
        money(self.amount)
    }

    pub fn display_due_date(&self) -> String {
        fmt::date(self.due_date)
    }
}

/// Split the total into `installment_count` parts spaced `day_interval` days
/// apart. Each part is rounded to cents and the rounding remainder lands on
/// the last installment, so the plan always sums to the total.
pub fn generate(request: &PlanRequest) -> Vec<Installment> {
    if request.total_amount <= Decimal::ZERO || request.installment_count == 0 {
        return Vec::new();
    }

    let n = request.installment_count;
    let share = cents(request.total_amount / Decimal::from(n));
    let remainder = request.total_amount - share * Decimal::from(n);

    let mut plan = Vec::with_capacity(n as usize);
    for i in 1..=n {
        let Some((days_from_start, due_date)) =
            due_after(request.start_date, i, request.day_interval)
        else {
            tracing::warn!(sequence = i, "due date out of range; no installments");
            return Vec::new();
        };
        let amount = if i == n { share + remainder } else { share };
        plan.push(Installment {
            sequence_number: i,
            days_from_start,
            due_date,
            amount,
        });
    }

    tracing::debug!(
        total = %request.total_amount,
        count = plan.len(),
        interval = request.day_interval,
        "installment plan generated"
    );
    plan
}

/// Offset and due date of installment `i`; None when either overflows.
fn due_after(start: NaiveDate, i: u32, interval: u32) -> Option<(u32, NaiveDate)> {
    let days = i.checked_mul(interval)?;
    let due = start.checked_add_days(Days::new(u64::from(days)))?;
    Some((days, due))
}

/// Parse the raw form fields and generate; bad input yields no installments.
pub fn generate_from_form(
    amount: &str,
    interval: &str,
    count: Option<&str>,
    start_date: NaiveDate,
) -> Vec<Installment> {
    match PlanRequest::from_form(amount, interval, count, start_date) {
        Some(request) => generate(&request),
        None => {
            tracing::debug!(amount, "amount not parseable; no installments");
            Vec::new()
        }
    }
}

pub fn total(installments: &[Installment]) -> Decimal {
    installments.iter().map(|i| i.amount).sum()
}

pub fn count(installments: &[Installment]) -> usize {
    installments.len()
}

// ---------------------------------------------------------------------------
// Installment detail schedule (view dialog)
// ---------------------------------------------------------------------------

const DETAIL_COUNT: u32 = 13;
const DETAIL_DUE_DAY: u32 = 5;
const DETAIL_PAYMENT_LAG_DAYS: u64 = 5;

/// One row of the "view installment" dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct InstallmentDetail {
    pub number: u32,
    pub due_date: NaiveDate,
    pub amount: Decimal,
    pub days: u32,
    pub fine: Decimal,
    pub interest: Decimal,
    pub discount: Decimal,
    pub paid: Decimal,
    pub payment_date: NaiveDate,
    pub kind: &'static str,
}

/// Monthly schedule for a receivable: 13 installments due on the 5th of
/// consecutive months from the row's due month, with a flat fine and interest.
pub fn details(row: &Receivable) -> Vec<InstallmentDetail> {
    let Some(row_total) = row.total else {
        return Vec::new();
    };
    let Some(first_due) = NaiveDate::from_ymd_opt(row.due.year(), row.due.month(), DETAIL_DUE_DAY)
    else {
        return Vec::new();
    };

    let fine = Decimal::new(121, 2);
    let interest = Decimal::new(254, 2);
    let base = cents(row_total / Decimal::from(DETAIL_COUNT));

    (0..DETAIL_COUNT)
        .filter_map(|index| {
            let due_date = first_due.checked_add_months(Months::new(index))?;
            let payment_date = due_date.checked_add_days(Days::new(DETAIL_PAYMENT_LAG_DAYS))?;
            Some(InstallmentDetail {
                number: index + 1,
                due_date,
                amount: base,
                days: DETAIL_PAYMENT_LAG_DAYS as u32,
                fine,
                interest,
                discount: Decimal::ZERO,
                paid: base + fine + interest,
                payment_date,
                kind: "Boleto",
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::models::mock_receivables;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_default_count_is_ten() {
        let plan = generate(&PlanRequest::new(dec("10000"), 30, day(2024, 1, 1)));
        assert_eq!(count(&plan), 10);
        assert_eq!(total(&plan), dec("10000"));
    }

    #[test]
    fn test_remainder_lands_on_last_installment() {
        let plan = generate(&PlanRequest::new(dec("100"), 30, day(2024, 1, 1)).with_count(3));
        let amounts: Vec<Decimal> = plan.iter().map(|i| i.amount).collect();
        assert_eq!(amounts, vec![dec("33.33"), dec("33.33"), dec("33.34")]);
        assert_eq!(total(&plan), dec("100"));
    }

    #[test]
    fn test_sum_within_tolerance_for_awkward_totals() {
        for raw in ["0.01", "0.07", "1234.57", "99999.99", "10.05"] {
            let t = dec(raw);
            let plan = generate(&PlanRequest::new(t, 7, day(2024, 1, 1)));
            assert_eq!(plan.len(), 10);
            assert!((total(&plan) - t).abs() <= dec("0.09"), "{raw}");
        }
    }

    #[test]
    fn test_due_dates_spaced_by_interval() {
        for interval in [1u32, 7, 15, 30, 45] {
            let plan = generate(&PlanRequest::new(dec("500"), interval, day(2024, 2, 28)));
            for pair in plan.windows(2) {
                assert!(pair[1].due_date > pair[0].due_date);
                assert_eq!(
                    (pair[1].due_date - pair[0].due_date).num_days(),
                    i64::from(interval)
                );
                assert_eq!(pair[1].sequence_number, pair[0].sequence_number + 1);
            }
        }
    }

    #[test]
    fn test_zero_interval_from_form_uses_default() {
        let start = day(2024, 1, 1);
        let plan = generate_from_form("1.000,00", "0", None, start);
        assert_eq!(plan[0].days_from_start, DEFAULT_DAY_INTERVAL);
        let plan = generate_from_form("1.000,00", "abc", None, start);
        assert_eq!(plan[1].days_from_start, 2 * DEFAULT_DAY_INTERVAL);
    }

    #[test]
    fn test_bad_amount_yields_empty_plan() {
        let start = day(2024, 1, 1);
        for raw in ["", "abc", "R$", "0,00", "-10,00", "—"] {
            assert!(generate_from_form(raw, "30", None, start).is_empty(), "{raw}");
        }
    }

    #[test]
    fn test_zero_count_request_is_empty() {
        let plan = generate(&PlanRequest::new(dec("100"), 30, day(2024, 1, 1)).with_count(0));
        assert!(plan.is_empty());
    }

    #[test]
    fn test_out_of_range_due_dates_give_full_plan_or_none() {
        let start = day(2024, 1, 1);
        // the 10th due date lands past the last representable year
        assert!(generate_from_form("1.000,00", "10000000", None, start).is_empty());
        assert!(generate(&PlanRequest::new(dec("1000"), u32::MAX, start)).is_empty());

        let plan = generate_from_form("1.000,00", "20000", None, start);
        assert_eq!(plan.len(), 10);
        assert_eq!(total(&plan), dec("1000"));
    }

    #[test]
    fn test_form_count_is_honoured() {
        let plan = generate_from_form("1.200,00", "15", Some("4"), day(2024, 1, 1));
        assert_eq!(plan.len(), 4);
        assert_eq!(plan[0].display_amount(), "R$ 300,00");
    }

    #[test]
    fn test_end_to_end_ten_thousand_every_thirty_days() {
        let today = day(2026, 10, 18);
        let plan = generate_from_form("10.000,00", "30", None, today);
        assert_eq!(plan.len(), 10);
        assert_eq!(plan[0].sequence_number, 1);
        assert_eq!(plan[0].display_amount(), "R$ 1.000,00");
        assert_eq!(plan[0].due_date, today + Days::new(30));
        assert_eq!(plan[9].due_date, today + Days::new(300));
        assert_eq!(plan[9].display_due_date(), fmt::date(today + Days::new(300)));
    }

    #[test]
    fn test_details_monthly_on_fifth() {
        let rows = mock_receivables();
        let row = rows.iter().find(|r| r.id == "1").unwrap();
        let schedule = details(row);
        assert_eq!(schedule.len(), 13);
        assert_eq!(schedule[0].due_date, day(2022, 11, 5));
        assert_eq!(schedule[2].due_date, day(2023, 1, 5));
        assert_eq!(schedule[12].due_date, day(2023, 11, 5));
        assert_eq!(schedule[0].payment_date, day(2022, 11, 10));
        // 522,10 / 13 = 40,16
        assert_eq!(schedule[0].amount, dec("40.16"));
        assert_eq!(schedule[0].paid, dec("43.91"));
        assert_eq!(schedule[0].kind, "Boleto");
    }

    #[test]
    fn test_details_without_total_is_empty() {
        let mut row = mock_receivables().remove(0);
        row.total = None;
        assert!(details(&row).is_empty());
    }
}
