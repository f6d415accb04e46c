//! Shared types for the spotlend programs: addresses, the token movement
//! interface, the core error taxonomy and fixed-point unit helpers.

pub mod error;
pub mod math;
pub mod token;

pub use error::{CoreError, CoreResult};
pub use token::{Token, TokenError, TokenInterface};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of an account, pool or pair
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Sink for permanently locked pair shares
    pub fn zero() -> Self {
        Self("0x0".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// One side of the reserve pair
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Asset {
    A,
    B,
}

impl Asset {
    /// The other side of the pair
    pub fn other(self) -> Self {
        match self {
            Asset::A => Asset::B,
            Asset::B => Asset::A,
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Asset::A => f.write_str("A"),
            Asset::B => f.write_str("B"),
        }
    }
}

/// Mutable access to both token ledgers of the pair, keyed by [`Asset`]
pub struct TokenPair<'a, T: TokenInterface> {
    pub a: &'a mut T,
    pub b: &'a mut T,
}

impl<'a, T: TokenInterface> TokenPair<'a, T> {
    pub fn new(a: &'a mut T, b: &'a mut T) -> Self {
        Self { a, b }
    }

    pub fn get(&self, asset: Asset) -> &T {
        match asset {
            Asset::A => &*self.a,
            Asset::B => &*self.b,
        }
    }

    pub fn get_mut(&mut self, asset: Asset) -> &mut T {
        match asset {
            Asset::A => &mut *self.a,
            Asset::B => &mut *self.b,
        }
    }
}
