use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};
use rust_decimal_macros::dec;

/// Arithmetic settings threaded through every loan calculation.
///
/// Values are kept at full `Decimal` precision internally; `scale` and
/// `rounding` only apply when an amount is presented in a schedule row.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Precision {
    /// decimal places of presented monetary amounts
    pub scale: u32,
    pub rounding: RoundingStrategy,
    /// upper bound on Newton steps when taking roots
    pub root_iterations: u32,
    pub root_tolerance: Decimal,
}

impl Default for Precision {
    fn default() -> Self {
        Self {
            scale: 2,
            rounding: RoundingStrategy::MidpointAwayFromZero,
            root_iterations: 64,
            root_tolerance: dec!(0.000000000000000000000000001),
        }
    }
}

impl Precision {
    pub fn with_scale(mut self, scale: u32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_rounding(mut self, rounding: RoundingStrategy) -> Self {
        self.rounding = rounding;
        self
    }

    /// Rounds `amount` to `scale` places, padding with zeros.
    ///
    /// A Decimal holds 28 to 29 significant digits, so an amount whose
    /// integer part leaves fewer than `scale` digits comes back with a
    /// shorter scale. `round_exact` reports that case.
    pub fn round(&self, amount: Decimal) -> Decimal {
        let mut rounded = amount.round_dp_with_strategy(self.scale, self.rounding);
        rounded.rescale(self.scale);
        rounded
    }

    /// `round`, or `None` when the result cannot carry `scale` places.
    pub fn round_exact(&self, amount: Decimal) -> Option<Decimal> {
        Some(self.round(amount)).filter(|rounded| rounded.scale() == self.scale)
    }
}

/// n-th root of a non-negative `x` by Newton's method, seeded from an f64 estimate.
pub(crate) fn nth_root(x: Decimal, n: u32, precision: &Precision) -> Option<Decimal> {
    if n == 0 || x.is_sign_negative() {
        return None;
    }
    if n == 1 || x.is_zero() || x == Decimal::ONE {
        return Some(x);
    }

    let n_dec = Decimal::from(n);
    let mut guess = x
        .to_f64()
        .and_then(|v| Decimal::from_f64(v.powf(1.0 / f64::from(n))))
        .filter(|g| g.is_sign_positive() && !g.is_zero())
        .unwrap_or(Decimal::ONE);

    for _ in 0..precision.root_iterations {
        let g_n_minus_1 = guess.checked_powu(u64::from(n - 1))?;
        if g_n_minus_1.is_zero() {
            break;
        }
        let g_n = g_n_minus_1.checked_mul(guess)?;
        let delta = g_n
            .checked_sub(x)?
            .checked_div(n_dec.checked_mul(g_n_minus_1)?)?;
        guess -= delta;
        if delta.abs() <= precision.root_tolerance {
            break;
        }
    }
    Some(guess)
}
