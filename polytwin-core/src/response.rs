//! Predicted output properties.

use std::{fmt, ops::Index, ops::IndexMut};

use crate::{Result, error::TwinError};

/// Number of response columns.
pub const RESPONSE_COUNT: usize = 3;

/// One of the three predicted properties.
///
/// # Examples
/// ```
/// use polytwin_core::Response;
///
/// assert_eq!(Response::from_name("final_mfi").expect("known"), Response::FinalMfi);
/// assert!(Response::from_name("Bogus").is_err());
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum Response {
    /// Notched impact strength.
    Impact,
    /// Tensile strength.
    Tensile,
    /// Melt-flow index of the finished compound.
    FinalMfi,
}

impl Response {
    /// All responses in column order.
    pub const ALL: [Self; RESPONSE_COUNT] = [Self::Impact, Self::Tensile, Self::FinalMfi];

    /// Column position of this response.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Impact => 0,
            Self::Tensile => 1,
            Self::FinalMfi => 2,
        }
    }

    /// Training-set column name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Impact => "Impact",
            Self::Tensile => "Tensile",
            Self::FinalMfi => "Final_MFI",
        }
    }

    /// Display unit.
    #[must_use]
    pub const fn unit(self) -> &'static str {
        match self {
            Self::Impact => "kJ/m²",
            Self::Tensile => "MPa",
            Self::FinalMfi => "g/10min",
        }
    }

    /// Resolves a column name, ignoring ASCII case and surrounding whitespace.
    ///
    /// # Errors
    /// Returns [`TwinError::UnknownResponse`] for any other name.
    pub fn from_name(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        Self::ALL
            .into_iter()
            .find(|response| response.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| TwinError::UnknownResponse {
                name: trimmed.to_owned(),
            })
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A total map from [`Response`] to `T`.
///
/// Every response always has a value, so lookups cannot fail.
///
/// # Examples
/// ```
/// use polytwin_core::{Response, ResponseMap};
///
/// let map = ResponseMap::from_fn(|response| response.index() * 10);
/// assert_eq!(map[Response::Tensile], 10);
/// assert_eq!(map.iter().count(), 3);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResponseMap<T> {
    values: [T; RESPONSE_COUNT],
}

impl<T> ResponseMap<T> {
    /// Builds a map by evaluating `f` for every response.
    pub fn from_fn(mut f: impl FnMut(Response) -> T) -> Self {
        Self {
            values: Response::ALL.map(&mut f),
        }
    }

    /// Builds a map by evaluating a fallible `f` for every response in
    /// column order, stopping at the first error.
    ///
    /// # Errors
    /// Propagates the first error returned by `f`.
    pub fn try_from_fn<E>(
        mut f: impl FnMut(Response) -> core::result::Result<T, E>,
    ) -> core::result::Result<Self, E> {
        let [impact, tensile, final_mfi] = Response::ALL;
        Ok(Self {
            values: [f(impact)?, f(tensile)?, f(final_mfi)?],
        })
    }

    /// Returns the value stored for `response`.
    #[must_use]
    pub fn get(&self, response: Response) -> &T {
        &self[response]
    }

    /// Iterates `(response, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (Response, &T)> {
        Response::ALL.into_iter().zip(self.values.iter())
    }

    /// Maps every value through `f`.
    pub fn map<U>(self, mut f: impl FnMut(Response, T) -> U) -> ResponseMap<U> {
        let [impact, tensile, final_mfi] = self.values;
        ResponseMap {
            values: [
                f(Response::Impact, impact),
                f(Response::Tensile, tensile),
                f(Response::FinalMfi, final_mfi),
            ],
        }
    }
}

impl<T> Index<Response> for ResponseMap<T> {
    type Output = T;

    fn index(&self, response: Response) -> &T {
        let [impact, tensile, final_mfi] = &self.values;
        match response {
            Response::Impact => impact,
            Response::Tensile => tensile,
            Response::FinalMfi => final_mfi,
        }
    }
}

impl<T> IndexMut<Response> for ResponseMap<T> {
    fn index_mut(&mut self, response: Response) -> &mut T {
        let [impact, tensile, final_mfi] = &mut self.values;
        match response {
            Response::Impact => impact,
            Response::Tensile => tensile,
            Response::FinalMfi => final_mfi,
        }
    }
}
