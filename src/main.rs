use amortization::loan::*;
use amortization::{LoanResult, Precision};
use chrono::NaiveDate;
use log::{error, info};
use rust_decimal_macros::dec;
use simple_logger::SimpleLogger;

fn main() {
    if let Err(e) = SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .init()
    {
        eprintln!("logger unavailable: {}", e);
    }

    if let Err(e) = run() {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> LoanResult<()> {
    let precision = Precision::default();
    let terms = LoanTerms::parse(dec!(0.05), dec!(10000), 12, "2024-01-01")?;
    let schedule = terms.schedule(&precision)?;

    info!(
        "{} payments of {} at monthly rate {}",
        schedule.payment_count(),
        round_to_cent(schedule.annuity(), &precision),
        schedule.monthly_rate()
    );
    print!("{}", schedule);
    info!(
        "total interest {}, total paid {}",
        schedule.total_interest(),
        schedule.total_paid()
    );
    if let Some(maturity) = schedule.maturity_date() {
        info!("maturity {}", maturity);
    }
    Ok(())
}

// verifies that types can implement the gated traits below
fn is_normal<T: Sized + Send + Sync + Unpin>() {}

#[test]
fn normal_types() {
    is_normal::<LoanTerms>();
    is_normal::<ScheduleRow>();
    is_normal::<Schedule>();
    is_normal::<Precision>();
    is_normal::<NaiveDate>();
}
