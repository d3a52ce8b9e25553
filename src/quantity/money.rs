use std::{
    fmt::{Display, Formatter},
    ops::Mul,
};

use serde::{Deserialize, Serialize};

/// US dollars, also used as a per-staffer-hour rate.
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    PartialOrd,
    Serialize,
    Deserialize,
    derive_more::Add,
    derive_more::AddAssign,
    derive_more::From,
    derive_more::FromStr,
    derive_more::Neg,
    derive_more::Sub,
    derive_more::Sum,
)]
pub struct Dollars(pub f64);

impl Dollars {
    pub const ZERO: Self = Self(0.0);
}

impl Mul<f64> for Dollars {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self(self.0 * rhs)
    }
}

impl Display for Dollars {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}
