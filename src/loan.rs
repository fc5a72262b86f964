use chrono::{Months, NaiveDate};
use log::{debug, trace};
use rust_decimal::{Decimal, MathematicalOps};
use std::fmt;

use crate::error::{LoanError, LoanResult};
use crate::precision::{nth_root, Precision};

const DATE_FORMAT: &str = "%Y-%m-%d";
const MONTHS_PER_YEAR: u32 = 12;

/// A fixed-rate consumer loan.
///
/// `apr` is fractional (0.05 for 5%), `nterms` counts monthly payments and
/// `start_date` is the disbursement date.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, PartialEq, Debug)]
pub struct LoanTerms {
    pub apr: Decimal,
    pub principal: Decimal,
    pub nterms: u32,
    pub start_date: NaiveDate,
}

impl LoanTerms {
    pub fn new(
        apr: Decimal,
        principal: Decimal,
        nterms: u32,
        start_date: NaiveDate,
    ) -> LoanResult<Self> {
        validate(apr, principal, nterms)?;
        Ok(Self {
            apr,
            principal,
            nterms,
            start_date,
        })
    }

    /// Same as `new`, with the start date given as `YYYY-MM-DD`.
    pub fn parse(
        apr: Decimal,
        principal: Decimal,
        nterms: u32,
        start_date: &str,
    ) -> LoanResult<Self> {
        Self::new(apr, principal, nterms, parse_start_date(start_date)?)
    }

    pub fn monthly_rate(&self, precision: &Precision) -> LoanResult<Decimal> {
        compute_monthly_rate(self.apr, precision)
    }

    pub fn annuity(&self, precision: &Precision) -> LoanResult<Decimal> {
        compute_annuity(self.apr, self.principal, self.nterms, precision)
    }

    pub fn schedule(&self, precision: &Precision) -> LoanResult<Schedule> {
        generate_schedule_for(self, precision)
    }
}

/// One period of an amortization schedule. Period 0 is the disbursement.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, PartialEq, Debug)]
pub struct ScheduleRow {
    pub period: u32,
    pub date: NaiveDate,
    pub payment: Decimal,
    pub interest: Decimal,
    pub principal: Decimal,
    pub balance: Decimal,
}

impl ScheduleRow {
    pub fn new(
        period: u32,
        date: NaiveDate,
        payment: Decimal,
        interest: Decimal,
        principal: Decimal,
        balance: Decimal,
    ) -> Self {
        Self {
            period,
            date,
            payment,
            interest,
            principal,
            balance,
        }
    }

    // the opening balance is reported as given, not rounded
    fn opening(principal: Decimal, start_date: NaiveDate, precision: &Precision) -> Self {
        let zero = precision.round(Decimal::ZERO);
        Self::new(0, start_date, zero, zero, zero, principal)
    }
}

impl fmt::Display for ScheduleRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pmt number {}, date {}, payment {}, interest paid {}, principal paid {}, ending balance {}",
            self.period, self.date, self.payment, self.interest, self.principal, self.balance
        )
    }
}

/// Period-by-period cashflows of a loan, `nterms + 1` rows long.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, PartialEq, Debug)]
pub struct Schedule {
    monthly_rate: Decimal,
    annuity: Decimal,
    rows: Vec<ScheduleRow>,
}

impl Schedule {
    pub fn rows(&self) -> &[ScheduleRow] {
        &self.rows
    }

    /// Monthly rate at full precision.
    pub fn monthly_rate(&self) -> Decimal {
        self.monthly_rate
    }

    /// Level payment at full precision; rows carry the rounded amount.
    pub fn annuity(&self) -> Decimal {
        self.annuity
    }

    pub fn payment_count(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }

    pub fn row(&self, period: usize) -> Option<&ScheduleRow> {
        self.rows.get(period)
    }

    pub fn row_info(&self, period: usize) -> String {
        match self.row(period) {
            Some(row) => row.to_string(),
            None => "No payment information.".to_string(),
        }
    }

    /// `None` only for a schedule without rows, e.g. one deserialized empty.
    pub fn final_balance(&self) -> Option<Decimal> {
        self.rows.last().map(|row| row.balance)
    }

    /// Date of the last payment.
    pub fn maturity_date(&self) -> Option<NaiveDate> {
        self.rows.last().map(|row| row.date)
    }

    pub fn total_interest(&self) -> Decimal {
        self.rows.iter().map(|row| row.interest).sum()
    }

    pub fn total_paid(&self) -> Decimal {
        self.rows.iter().map(|row| row.payment).sum()
    }

    pub fn show_amortization(&self) {
        for row in &self.rows {
            println!("{}", row);
        }
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<10} {:>14} {:>20} {:>21} {:>16}",
            "Date", "Annuity", "Interest Component", "Principal Component", "Balance"
        )?;
        for row in &self.rows {
            writeln!(
                f,
                "{:<10} {:>14} {:>20} {:>21} {:>16}",
                row.date.format(DATE_FORMAT).to_string(),
                row.payment.to_string(),
                row.interest.to_string(),
                row.principal.to_string(),
                row.balance.to_string()
            )?;
        }
        Ok(())
    }
}

/// Rounds a monetary amount the way schedule rows are presented.
pub fn round_to_cent(amount: Decimal, precision: &Precision) -> Decimal {
    precision.round(amount)
}

pub fn parse_start_date(date: &str) -> LoanResult<NaiveDate> {
    Ok(NaiveDate::parse_from_str(date.trim(), DATE_FORMAT)?)
}

/// Effective monthly rate of an annual rate: `(1 + apr)^(1/12) - 1`.
pub fn compute_monthly_rate(apr: Decimal, precision: &Precision) -> LoanResult<Decimal> {
    if apr < Decimal::ZERO {
        return Err(LoanError::invalid_input("apr", "must not be negative"));
    }
    if apr.is_zero() {
        return Ok(Decimal::ZERO);
    }

    let root = Decimal::ONE
        .checked_add(apr)
        .and_then(|growth| nth_root(growth, MONTHS_PER_YEAR, precision))
        .ok_or_else(|| LoanError::invalid_input("apr", "monthly rate is not representable"))?;
    Ok(root - Decimal::ONE)
}

/// Level monthly payment that amortizes `principal` over `nterms` months.
pub fn compute_annuity(
    apr: Decimal,
    principal: Decimal,
    nterms: u32,
    precision: &Precision,
) -> LoanResult<Decimal> {
    validate(apr, principal, nterms)?;
    let rate = compute_monthly_rate(apr, precision)?;
    let annuity = level_payment(principal, rate, nterms)?;
    debug!(
        "apr {}, principal {}, terms {}: monthly rate {}, annuity {}",
        apr, principal, nterms, rate, annuity
    );
    Ok(annuity)
}

pub fn generate_schedule(
    apr: Decimal,
    principal: Decimal,
    nterms: u32,
    start_date: NaiveDate,
    precision: &Precision,
) -> LoanResult<Schedule> {
    validate(apr, principal, nterms)?;
    let monthly_rate = compute_monthly_rate(apr, precision)?;
    let annuity = level_payment(principal, monthly_rate, nterms)?;
    debug!(
        "scheduling {} payments of {} from {}",
        nterms, annuity, start_date
    );

    let mut rows = Vec::with_capacity(nterms as usize + 1);
    rows.push(ScheduleRow::opening(principal, start_date, precision));

    let present = |amount: Decimal| {
        precision.round_exact(amount).ok_or_else(|| {
            LoanError::invalid_input("principal", "amounts are too large to carry cents")
        })
    };

    let mut balance = principal;
    let mut date = start_date;
    for period in 1..=nterms {
        let interest = monthly_rate
            .checked_mul(balance)
            .ok_or_else(|| LoanError::invalid_input("principal", "interest overflows"))?;
        let principal_paid = annuity - interest;
        // a final overshoot below zero is folded back
        balance = (balance - principal_paid).abs();
        date = next_pmt_date(&date)?;
        trace!(
            "Pmt # {}, date {}, interest {}, principal {}, end bal {}",
            period,
            date,
            interest,
            principal_paid,
            balance
        );

        rows.push(ScheduleRow::new(
            period,
            date,
            present(annuity)?,
            present(interest)?,
            present(principal_paid)?,
            present(balance)?,
        ));
    }

    Ok(Schedule {
        monthly_rate,
        annuity,
        rows,
    })
}

pub fn generate_schedule_for(terms: &LoanTerms, precision: &Precision) -> LoanResult<Schedule> {
    generate_schedule(
        terms.apr,
        terms.principal,
        terms.nterms,
        terms.start_date,
        precision,
    )
}

fn validate(apr: Decimal, principal: Decimal, nterms: u32) -> LoanResult<()> {
    if apr < Decimal::ZERO {
        return Err(LoanError::invalid_input("apr", "must not be negative"));
    }
    if principal <= Decimal::ZERO {
        return Err(LoanError::invalid_input("principal", "must be positive"));
    }
    if nterms == 0 {
        return Err(LoanError::invalid_input("nterms", "must be at least one"));
    }
    Ok(())
}

fn level_payment(principal: Decimal, rate: Decimal, nterms: u32) -> LoanResult<Decimal> {
    let terms = Decimal::from(nterms);
    if rate.is_zero() {
        return Ok(principal / terms);
    }

    let overflow = || LoanError::invalid_input("principal", "annuity is not representable");
    let periodic_interest = principal.checked_mul(rate).ok_or_else(overflow)?;

    // past the Decimal range factor / (factor - 1) is 1 at full precision
    let Some(factor) = (Decimal::ONE + rate).checked_powu(u64::from(nterms)) else {
        return Ok(periodic_interest);
    };
    let denom = factor - Decimal::ONE;
    if denom.is_zero() {
        return Ok(principal / terms);
    }
    factor
        .checked_div(denom)
        .and_then(|ratio| periodic_interest.checked_mul(ratio))
        .ok_or_else(overflow)
}

fn next_pmt_date(&begin_date: &NaiveDate) -> LoanResult<NaiveDate> {
    begin_date
        .checked_add_months(Months::new(1))
        .ok_or_else(|| {
            LoanError::InvalidDate(format!("{} does not return a new payment date", begin_date))
        })
}
