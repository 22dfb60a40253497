//! Throttle contract and rate descriptors.
//!
//! A throttle is configured as a (factory, rate) pair and instantiated fresh
//! for every request. Shared counter state belongs to the factory
//! implementation, which owns its own synchronization; the gate only
//! orchestrates calls and aggregates wait durations.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::request::Parts;
use thiserror::Error;

use crate::gate::RequestContext;

/// A parsed rate descriptor: `requests` per `window`.
///
/// String form is `"<n>/<unit>"` with unit one of `s`, `m`, `h`, `d`,
/// e.g. `"60/m"` for sixty requests per minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rate {
    pub requests: u32,
    pub window: Duration,
}

impl Rate {
    pub const fn new(requests: u32, window: Duration) -> Self {
        Self { requests, window }
    }

    /// Per-minute shorthand.
    pub const fn per_minute(requests: u32) -> Self {
        Self::new(requests, Duration::from_secs(60))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid rate descriptor {0:?}, expected \"<n>/<s|m|h|d>\"")]
pub struct RateParseError(pub String);

impl FromStr for Rate {
    type Err = RateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || RateParseError(s.to_string());

        let (count, unit) = s.split_once('/').ok_or_else(err)?;
        let requests: u32 = count.trim().parse().map_err(|_| err())?;
        if requests == 0 {
            return Err(err());
        }

        let window = match unit.trim() {
            "s" | "sec" | "second" => Duration::from_secs(1),
            "m" | "min" | "minute" => Duration::from_secs(60),
            "h" | "hour" => Duration::from_secs(3600),
            "d" | "day" => Duration::from_secs(86_400),
            _ => return Err(err()),
        };

        Ok(Self { requests, window })
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match self.window.as_secs() {
            1 => "s".to_string(),
            60 => "m".to_string(),
            3600 => "h".to_string(),
            86_400 => "d".to_string(),
            secs => format!("{}s", secs),
        };
        write!(f, "{}/{}", self.requests, unit)
    }
}

/// Per-request throttle instance.
pub trait Throttle {
    /// Record this request against the limit. Returns `false` when over it.
    /// Called on every configured throttle, even after an earlier denial, so
    /// each can update its own tracking state.
    fn allow_request(&mut self, ctx: &RequestContext, req: &Parts) -> bool;

    /// How long the client must wait before retrying.
    fn wait(&self) -> Duration;
}

/// Builds a throttle instance for a single request.
pub trait ThrottleFactory: Send + Sync {
    fn build(&self, rate: &Rate) -> Box<dyn Throttle>;
}

/// A configured throttle: the strategy plus the rate it is instantiated with.
#[derive(Clone)]
pub struct ThrottleBinding {
    factory: Arc<dyn ThrottleFactory>,
    rate: Rate,
}

impl ThrottleBinding {
    pub fn new(factory: Arc<dyn ThrottleFactory>, rate: Rate) -> Self {
        Self { factory, rate }
    }

    pub fn rate(&self) -> Rate {
        self.rate
    }

    pub(crate) fn instantiate(&self) -> Box<dyn Throttle> {
        self.factory.build(&self.rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_units() {
        assert_eq!(
            "100/s".parse::<Rate>().unwrap(),
            Rate::new(100, Duration::from_secs(1))
        );
        assert_eq!("60/m".parse::<Rate>().unwrap(), Rate::per_minute(60));
        assert_eq!(
            "1000/h".parse::<Rate>().unwrap(),
            Rate::new(1000, Duration::from_secs(3600))
        );
        assert_eq!(
            "10/d".parse::<Rate>().unwrap(),
            Rate::new(10, Duration::from_secs(86_400))
        );
    }

    #[test]
    fn accepts_long_unit_names_and_whitespace() {
        assert_eq!("5/minute".parse::<Rate>().unwrap(), Rate::per_minute(5));
        assert_eq!(" 30 / h ".parse::<Rate>().unwrap().requests, 30);
    }

    #[test]
    fn rejects_malformed_descriptors() {
        for bad in ["", "60", "/m", "60/", "60/fortnight", "x/m", "0/m", "-1/m"] {
            assert!(bad.parse::<Rate>().is_err(), "{:?} should not parse", bad);
        }
    }

    #[test]
    fn display_round_trips() {
        for raw in ["100/s", "60/m", "1000/h", "10/d"] {
            let rate: Rate = raw.parse().unwrap();
            assert_eq!(rate.to_string(), raw);
        }
    }
}
