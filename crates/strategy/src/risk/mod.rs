//! Risk-adaptive strategies: RB and AA.
//!
//! Both keep a risk factor `r ∈ [-1, 1]` and a target price `τ` derived
//! from a reference price `p*`, the decayed average of recent transaction
//! prices. Every new shout nudges `r` according to whether `τ` would have
//! left surplus on the table:
//!
//! ```text
//! shout ──► p* (last ≤ 8 prices before it) ──► τ = model(value, p*, r)
//!                                                   │
//!            transacted at q? ── τ vs q ──► pressure ┤
//!            unmatched rival? ── τ vs price ─────────┘
//!                                                   ▼
//!                             δ = r(1 + d·λr) + d·λa;   r ← r + β(δ − r)
//! ```
//!
//! Pressure moves `r` the same way under both models: up when `τ` left
//! surplus on the table, down when it was beaten. The models differ only
//! in how `r` bends `τ`.

mod aa;
mod adapter;
mod rb;

pub use aa::{Aa, AaModel};
pub use adapter::{Pressure, RiskAdapter, RiskSnapshot, TargetModel, reference_price};
pub use rb::{Rb, RbModel};

use agora_core::{Price, Side};

/// Transactions averaged into `p*`
pub const WINDOW: usize = 8;
pub const LAMBDA_R: f64 = 0.05;
pub const LAMBDA_A: f64 = 0.025;
/// Fraction of the gap to the target covered per shout
pub const ETA: f64 = 4.0;

/// Move one `1/ETA` step from `from` toward `toward`, rounding toward the
/// side's more aggressive price
fn step_toward(side: Side, from: Price, toward: f64) -> Price {
    let raw = f64::from(from) + (toward - f64::from(from)) / ETA;
    match side {
        Side::Buy => raw.ceil() as Price,
        Side::Sell => raw.floor() as Price,
    }
}
