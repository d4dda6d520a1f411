//! Form state behind the "include installment" and "generate installments"
//! dialogs.

use std::time::{Duration, Instant};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::fmt::{mask_money_input, number};
use crate::installments::{self, Installment};
use crate::timer::Deferred;

pub const EDIT_REGENERATE_DELAY: Duration = Duration::from_millis(300);
pub const BUTTON_GENERATE_DELAY: Duration = Duration::from_millis(500);

/// Header data of a new invoice, entered before generating its installments.
#[derive(Debug, Clone, PartialEq)]
pub struct IncludeForm {
    pub invoice: String,
    pub client: String,
    pub company: String,
    pub seller: String,
    pub invoice_date: String,
    pub total: String,
    pub order: String,
    pub fiscal_note: String,
    pub coupon: String,
    pub service_order: String,
    pub history: String,
    pub notes: String,
}

impl Default for IncludeForm {
    fn default() -> Self {
        Self {
            invoice: "77".into(),
            client: "1652 - WEB PALMAS PAPELARIA E INFORMATICA - 10.552.934/0001-90".into(),
            company: "2 - PALMAS TEC DISTRIBUIDORA EIRELI - 11.882.938/0001-00".into(),
            seller: "12 - ICARO ALERRANDRO PEREIRA NASCIMENTO - 886.654.258-33".into(),
            invoice_date: "10/10/2021".into(),
            total: "730.000,00".into(),
            order: "23154".into(),
            fiscal_note: "5312".into(),
            coupon: "231".into(),
            service_order: String::new(),
            history: String::new(),
            notes: String::new(),
        }
    }
}

impl IncludeForm {
    /// Confirming the invoice opens the generator seeded with its values.
    pub fn confirm(&self) -> GenerateForm {
        GenerateForm {
            company: self.company.clone(),
            client: self.client.clone(),
            amount: self.total.clone(),
            interval: installments::DEFAULT_DAY_INTERVAL.to_string(),
            ..GenerateForm::default()
        }
    }
}

/// Editable fields of the generate dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateField {
    Amount,
    Interval,
    Count,
    Carrier,
}

impl GenerateField {
    pub const ALL: [GenerateField; 4] = [
        GenerateField::Amount,
        GenerateField::Interval,
        GenerateField::Count,
        GenerateField::Carrier,
    ];

    pub fn label(self) -> &'static str {
        match self {
            GenerateField::Amount => "Valor",
            GenerateField::Interval => "Prazo (dias)",
            GenerateField::Count => "Parcelas",
            GenerateField::Carrier => "Portador",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerateForm {
    pub company: String,
    pub client: String,
    pub kind: String,
    pub surcharge: bool,
    pub discount: bool,
    pub other: bool,
    pub amount: String,
    pub species: String,
    pub carrier: String,
    pub interval: String,
    pub count: String,
}

impl Default for GenerateForm {
    fn default() -> Self {
        Self {
            company: "2 - PALMAS TEC DISTRIBUIDORA EIRELI - 11.882.936/0001-00".into(),
            client: "1652 - WEB PALMAS PAPELARIA E INFORMATICA - 10.552.934/0001-90".into(),
            kind: "À Vista".into(),
            surcharge: false,
            discount: false,
            other: false,
            amount: "10.000,00".into(),
            species: "Dinheiro".into(),
            carrier: String::new(),
            interval: installments::DEFAULT_DAY_INTERVAL.to_string(),
            count: installments::DEFAULT_INSTALLMENT_COUNT.to_string(),
        }
    }
}

impl GenerateForm {
    pub fn field(&self, field: GenerateField) -> &str {
        match field {
            GenerateField::Amount => &self.amount,
            GenerateField::Interval => &self.interval,
            GenerateField::Count => &self.count,
            GenerateField::Carrier => &self.carrier,
        }
    }

    fn field_mut(&mut self, field: GenerateField) -> &mut String {
        match field {
            GenerateField::Amount => &mut self.amount,
            GenerateField::Interval => &mut self.interval,
            GenerateField::Count => &mut self.count,
            GenerateField::Carrier => &mut self.carrier,
        }
    }

    fn plan(&self, start: NaiveDate) -> Vec<Installment> {
        installments::generate_from_form(&self.amount, &self.interval, Some(&self.count), start)
    }
}

/// The generate dialog: form fields, the current plan and the deferred
/// regeneration that simulates background work.
pub struct GenerateDialog {
    form: GenerateForm,
    plan: Vec<Installment>,
    pending: Deferred<GenerateForm>,
    start: NaiveDate,
}

impl GenerateDialog {
    /// Opening generates the initial plan straight away.
    pub fn open(form: GenerateForm, start: NaiveDate) -> Self {
        let plan = form.plan(start);
        Self {
            form,
            plan,
            pending: Deferred::new(),
            start,
        }
    }

    pub fn form(&self) -> &GenerateForm {
        &self.form
    }

    pub fn installments(&self) -> &[Installment] {
        &self.plan
    }

    pub fn is_generating(&self) -> bool {
        self.pending.is_pending()
    }

    /// Replace a field. Amount and interval edits schedule a regeneration.
    pub fn set_field(&mut self, field: GenerateField, value: &str, now: Instant) {
        *self.form.field_mut(field) = value.to_string();
        let triggers = matches!(
            field,
            GenerateField::Amount | GenerateField::Interval | GenerateField::Count
        );
        if triggers && !value.trim().is_empty() && !self.form.amount.is_empty() {
            self.pending.defer(now, EDIT_REGENERATE_DELAY, self.form.clone());
        }
    }

    /// Reformat the amount field with thousands grouping.
    pub fn mask_amount(&mut self, now: Instant) {
        let masked = mask_money_input(&self.form.amount);
        self.set_field(GenerateField::Amount, &masked, now);
    }

    pub fn toggle_surcharge(&mut self) {
        self.form.surcharge = !self.form.surcharge;
    }

    pub fn toggle_discount(&mut self) {
        self.form.discount = !self.form.discount;
    }

    pub fn toggle_other(&mut self) {
        self.form.other = !self.form.other;
    }

    /// The "generate" button.
    pub fn request_generate(&mut self, now: Instant) {
        if self.form.amount.trim().is_empty() || self.form.interval.trim().is_empty() {
            return;
        }
        self.pending.defer(now, BUTTON_GENERATE_DELAY, self.form.clone());
    }

    /// Run a due regeneration. Returns true when the plan changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.pending.poll(now) {
            Some(snapshot) => {
                self.plan = snapshot.plan(self.start);
                true
            }
            None => false,
        }
    }

    pub fn total(&self) -> Decimal {
        installments::total(&self.plan)
    }

    pub fn total_label(&self) -> String {
        number(self.total())
    }

    pub fn count(&self) -> usize {
        installments::count(&self.plan)
    }

    /// Closing defuses any queued regeneration.
    pub fn close(&mut self) {
        self.pending.defuse();
    }

    /// Confirm and close; None when there is nothing to save.
    pub fn confirm(mut self) -> Option<Vec<Installment>> {
        self.close();
        if self.plan.is_empty() {
            None
        } else {
            Some(self.plan)
        }
    }
}
