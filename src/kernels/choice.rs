//! Kernel descriptions: the closed set of covariance families a surrogate
//! specification can name, and the string tags of the hyperparameter
//! search space that select among them.
use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    kernels::errors::{KernelError, KernelResult},
    priors::{Prior, botorch_lengthscale_prior},
};

/// Matern smoothness parameter. Only the two half-integer values used by
/// the search space are representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub enum MaternNu {
    OneAndHalf,
    TwoAndHalf,
}

impl MaternNu {
    pub fn value(self) -> f64 {
        match self {
            MaternNu::OneAndHalf => 1.5,
            MaternNu::TwoAndHalf => 2.5,
        }
    }
}

impl TryFrom<f64> for MaternNu {
    type Error = KernelError;

    fn try_from(nu: f64) -> Result<Self, Self::Error> {
        if nu == 1.5 {
            Ok(MaternNu::OneAndHalf)
        } else if nu == 2.5 {
            Ok(MaternNu::TwoAndHalf)
        } else {
            Err(KernelError::UnsupportedMaternNu { nu })
        }
    }
}

impl From<MaternNu> for f64 {
    fn from(nu: MaternNu) -> f64 {
        nu.value()
    }
}

/// Abstract description of a covariance function.
///
/// - `Rbf` / `Matern`: stationary kernels with one lengthscale per active
///   dimension when `ard` is set, one shared lengthscale otherwise.
/// - `Polynomial`: `(x·x' + c)^power` with a positive offset `c`. Has no
///   lengthscales and therefore never uses ARD.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum KernelChoice {
    Rbf { ard: bool, lengthscale_prior: Option<Prior> },
    Matern { nu: MaternNu, ard: bool, lengthscale_prior: Option<Prior> },
    Polynomial { power: u32, offset_prior: Option<Prior> },
}

/// Largest polynomial power accepted by the kernel factories.
pub const MAX_POLYNOMIAL_POWER: u32 = 64;

/// Reject polynomial powers outside `[1, MAX_POLYNOMIAL_POWER]`.
pub(crate) fn verify_polynomial_power(power: u32) -> KernelResult<()> {
    if power == 0 {
        return Err(KernelError::InvalidPolynomialPower {
            power,
            reason: "Polynomial power must be at least 1.",
        });
    }
    if power > MAX_POLYNOMIAL_POWER {
        return Err(KernelError::InvalidPolynomialPower {
            power,
            reason: "Polynomial power exceeds MAX_POLYNOMIAL_POWER.",
        });
    }
    Ok(())
}

impl KernelChoice {
    pub fn rbf(ard: bool, lengthscale_prior: Prior) -> Self {
        KernelChoice::Rbf { ard, lengthscale_prior: Some(lengthscale_prior) }
    }

    pub fn matern(nu: MaternNu, ard: bool, lengthscale_prior: Prior) -> Self {
        KernelChoice::Matern { nu, ard, lengthscale_prior: Some(lengthscale_prior) }
    }

    /// Polynomial kernel without an offset prior.
    ///
    /// # Errors
    /// [`KernelError::InvalidPolynomialPower`] unless
    /// `1 <= power <= MAX_POLYNOMIAL_POWER`.
    pub fn polynomial(power: u32) -> KernelResult<Self> {
        verify_polynomial_power(power)?;
        Ok(KernelChoice::Polynomial { power, offset_prior: None })
    }

    /// Concrete kernel selected by a search-space tag.
    pub fn from_tag(tag: KernelTag, ard: bool, lengthscale_prior: Prior) -> Self {
        match tag {
            KernelTag::Rbf => KernelChoice::rbf(ard, lengthscale_prior),
            KernelTag::Matern15 => KernelChoice::matern(MaternNu::OneAndHalf, ard, lengthscale_prior),
            KernelTag::Matern25 => KernelChoice::matern(MaternNu::TwoAndHalf, ard, lengthscale_prior),
        }
    }

    /// Default kernel of multi-task surrogates: Matern 2.5 with ARD and the
    /// botorch lengthscale prior.
    pub fn default_multitask() -> Self {
        KernelChoice::matern(MaternNu::TwoAndHalf, true, botorch_lengthscale_prior())
    }

    /// Whether the kernel uses one lengthscale per active dimension.
    /// Always `false` for polynomial kernels.
    pub fn ard(&self) -> bool {
        match self {
            KernelChoice::Rbf { ard, .. } | KernelChoice::Matern { ard, .. } => *ard,
            KernelChoice::Polynomial { .. } => false,
        }
    }

    pub fn lengthscale_prior(&self) -> Option<&Prior> {
        match self {
            KernelChoice::Rbf { lengthscale_prior, .. }
            | KernelChoice::Matern { lengthscale_prior, .. } => lengthscale_prior.as_ref(),
            KernelChoice::Polynomial { .. } => None,
        }
    }

    /// Search-space tag of this kernel, if it has one.
    pub fn tag(&self) -> Option<KernelTag> {
        match self {
            KernelChoice::Rbf { .. } => Some(KernelTag::Rbf),
            KernelChoice::Matern { nu: MaternNu::OneAndHalf, .. } => Some(KernelTag::Matern15),
            KernelChoice::Matern { nu: MaternNu::TwoAndHalf, .. } => Some(KernelTag::Matern25),
            KernelChoice::Polynomial { .. } => None,
        }
    }
}

/// Kernel values of the hyperparameter search space.
///
/// Parses exactly `"rbf"`, `"matern_1.5"` and `"matern_2.5"`; anything else
/// is [`KernelError::UnknownKernelKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KernelTag {
    Rbf,
    Matern15,
    Matern25,
}

impl KernelTag {
    pub const ALL: [KernelTag; 3] = [KernelTag::Rbf, KernelTag::Matern15, KernelTag::Matern25];

    pub fn as_str(self) -> &'static str {
        match self {
            KernelTag::Rbf => "rbf",
            KernelTag::Matern15 => "matern_1.5",
            KernelTag::Matern25 => "matern_2.5",
        }
    }
}

impl fmt::Display for KernelTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KernelTag {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KernelTag::ALL
            .into_iter()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| KernelError::UnknownKernelKind { tag: s.to_string() })
    }
}
