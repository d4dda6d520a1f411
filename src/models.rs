use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Partition of receivables shown by the Situação filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Situation {
    #[default]
    Open,
    Settled,
    Cancelled,
    All,
}

impl Situation {
    pub const ALL: [Situation; 4] = [
        Situation::Open,
        Situation::Settled,
        Situation::Cancelled,
        Situation::All,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Situation::Open => "Abertas",
            Situation::Settled => "Baixadas",
            Situation::Cancelled => "Canceladas",
            Situation::All => "Todos",
        }
    }

    /// Whether a row with `status` belongs to this partition.
    pub fn matches(self, status: Status) -> bool {
        match self {
            Situation::All => true,
            Situation::Open => status == Status::Open,
            Situation::Settled => status == Status::Settled,
            Situation::Cancelled => status == Status::Cancelled,
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|s| *s == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl FromStr for Situation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "abertas" | "open" => Ok(Situation::Open),
            "baixadas" | "settled" => Ok(Situation::Settled),
            "canceladas" | "cancelled" => Ok(Situation::Cancelled),
            "todos" | "all" => Ok(Situation::All),
            other => Err(format!(
                "unknown situation '{other}' (abertas, baixadas, canceladas, todos)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Open,
    Settled,
    Cancelled,
}

/// One receivable installment as listed in the table.
#[derive(Debug, Clone, PartialEq)]
pub struct Receivable {
    pub id: String,
    pub client: String,
    pub company: String,
    pub seller: String,
    pub order: String,
    pub invoice: String,
    pub duplicate: String,
    pub quote: String,
    pub installment: String,
    pub issued: NaiveDate,
    pub due: NaiveDate,
    pub amount: Decimal,
    pub days_overdue: Option<u32>,
    pub fine: Option<Decimal>,
    pub interest: Option<Decimal>,
    pub total: Option<Decimal>,
    pub status: Status,
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn cents(v: i64) -> Decimal {
    Decimal::new(v, 2)
}

/// The fixed dataset the screen lists.
pub fn mock_receivables() -> Vec<Receivable> {
    let seller = "12 - ICARO ALEGRANDRO PEREIRA NASCIMENTO - 886.654.258-33";
    vec![
        Receivable {
            id: "1".into(),
            client: "15 - SOLUGAO TI ASSISTENCIA".into(),
            company: "2".into(),
            seller: seller.into(),
            order: "752".into(),
            invoice: "567".into(),
            duplicate: "567-10".into(),
            quote: "".into(),
            installment: "10".into(),
            issued: ymd(2022, 1, 4),
            due: ymd(2022, 11, 4),
            amount: cents(23892),
            days_overdue: Some(5),
            fine: Some(cents(1195)),
            interest: Some(cents(478)),
            total: Some(cents(52210)),
            status: Status::Open,
        },
        Receivable {
            id: "3".into(),
            client: "1652 - WEB PALMAS PAPELARIA E INFORMATICA".into(),
            company: "2".into(),
            seller: seller.into(),
            order: "752".into(),
            invoice: "567".into(),
            duplicate: "567-10".into(),
            quote: "118".into(),
            installment: "10".into(),
            issued: ymd(2020, 1, 31),
            due: ymd(2020, 10, 31),
            amount: cents(150000),
            days_overdue: Some(15),
            fine: Some(cents(7500)),
            interest: Some(cents(3000)),
            total: Some(cents(165000)),
            status: Status::Open,
        },
        Receivable {
            id: "10".into(),
            client: "564 - MERCADINHO POPULAR".into(),
            company: "3".into(),
            seller: seller.into(),
            order: "3321".into(),
            invoice: "883".into(),
            duplicate: "883-03".into(),
            quote: "".into(),
            installment: "03".into(),
            issued: ymd(2023, 11, 10),
            due: ymd(2024, 2, 10),
            amount: cents(82000),
            days_overdue: Some(0),
            fine: Some(Decimal::ZERO),
            interest: Some(Decimal::ZERO),
            total: Some(cents(82000)),
            status: Status::Settled,
        },
        Receivable {
            id: "11".into(),
            client: "98 - BARATÃO SUPERMERCADO".into(),
            company: "1".into(),
            seller: seller.into(),
            order: "4412".into(),
            invoice: "982".into(),
            duplicate: "982-02".into(),
            quote: "".into(),
            installment: "02".into(),
            issued: ymd(2023, 12, 3),
            due: ymd(2024, 2, 3),
            amount: cents(45200),
            days_overdue: Some(0),
            fine: Some(Decimal::ZERO),
            interest: Some(Decimal::ZERO),
            total: Some(cents(45200)),
            status: Status::Settled,
        },
        Receivable {
            id: "20".into(),
            client: "87 - PEDRO DISTRIBUIDORA".into(),
            company: "9".into(),
            seller: seller.into(),
            order: "7782".into(),
            invoice: "8821".into(),
            duplicate: "8821-01".into(),
            quote: "".into(),
            installment: "01".into(),
            issued: ymd(2023, 10, 20),
            due: ymd(2023, 11, 20),
            amount: cents(19900),
            days_overdue: None,
            fine: None,
            interest: None,
            total: Some(cents(19900)),
            status: Status::Cancelled,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_situation_parse_accepts_both_languages() {
        assert_eq!("abertas".parse::<Situation>(), Ok(Situation::Open));
        assert_eq!("Settled".parse::<Situation>(), Ok(Situation::Settled));
        assert_eq!(" TODOS ".parse::<Situation>(), Ok(Situation::All));
        assert!("pending".parse::<Situation>().is_err());
    }

    #[test]
    fn test_situation_cycles() {
        assert_eq!(Situation::Open.next(), Situation::Settled);
        assert_eq!(Situation::All.next(), Situation::Open);
    }

    #[test]
    fn test_mock_ids_unique() {
        let rows = mock_receivables();
        let mut ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), rows.len());
    }
}
