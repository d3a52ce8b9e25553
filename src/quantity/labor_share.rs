use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use crate::prelude::*;

/// Fraction of the available staff assigned to dock duty in a given hour.
#[serde_as]
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct LaborShare(#[serde_as(as = "serde_with::DisplayFromStr")] pub f64);

impl LaborShare {
    pub const FULL: Self = Self(1.0);
    pub const ZERO: Self = Self(0.0);

    #[must_use]
    pub fn is_valid(self) -> bool {
        (0.0..=1.0).contains(&self.0)
    }
}

impl From<LaborShare> for f64 {
    fn from(share: LaborShare) -> Self {
        share.0
    }
}

impl FromStr for LaborShare {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        let share = Self(
            value.parse::<f64>().with_context(|| format!("unparseable labor share `{value}`"))?,
        );
        ensure!(share.is_valid(), "labor share must lie in [0, 1], got {}", share.0);
        Ok(share)
    }
}

impl Display for LaborShare {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_ok() -> Result {
        assert_eq!("0.8".parse::<LaborShare>()?, LaborShare(0.8));
        assert_eq!("0".parse::<LaborShare>()?, LaborShare::ZERO);
        assert_eq!("1".parse::<LaborShare>()?, LaborShare::FULL);
        Ok(())
    }

    #[test]
    fn test_from_str_rejects_out_of_domain() {
        assert!("1.5".parse::<LaborShare>().is_err());
        assert!("-0.1".parse::<LaborShare>().is_err());
        assert!("half".parse::<LaborShare>().is_err());
    }
}
