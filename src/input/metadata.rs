//! Sidecar `.inf` metadata parser.
//!
//! The sidecar is a plain-text file of `description = value` lines. Only the
//! fields the core needs are extracted: the number of time-series samples, the
//! sample interval, and an optional object name.

use std::fs;
use std::path::Path;

use crate::error::{ExploreError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct InfMetadata {
    /// Number of points in the original time series.
    pub n: u64,
    /// Width of each time-series bin in seconds.
    pub dt: f64,
    /// Object being observed, when recorded.
    pub object: Option<String>,
}

impl InfMetadata {
    pub fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            ExploreError::InputFormat(format!("cannot read metadata '{}': {}", path.display(), e))
        })?;
        Self::parse(&text).map_err(|msg| {
            ExploreError::InputFormat(format!("metadata '{}': {}", path.display(), msg))
        })
    }

    fn parse(text: &str) -> std::result::Result<Self, String> {
        let mut n = None;
        let mut dt = None;
        let mut object = None;

        for line in text.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();

            if key.starts_with("Number of bins in the time series") {
                n = Some(
                    value
                        .parse::<f64>()
                        .map_err(|_| format!("bad sample count '{value}'"))?
                        as u64,
                );
            } else if key.starts_with("Width of each time series bin") {
                dt = Some(
                    value
                        .parse::<f64>()
                        .map_err(|_| format!("bad bin width '{value}'"))?,
                );
            } else if key.starts_with("Object being observed") && !value.is_empty() {
                object = Some(value.to_string());
            }
        }

        Ok(Self {
            n: n.ok_or("missing 'Number of bins in the time series'")?,
            dt: dt.ok_or("missing 'Width of each time series bin (sec)'")?,
            object,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
 Data file name without suffix          =  fake_psr
 Telescope used                         =  Parkes
 Object being observed                  =  J0737-3039A
 Number of bins in the time series      =  131072
 Width of each time series bin (sec)    =  0.000125
";

    #[test]
    fn parses_the_fields_the_core_needs() {
        let meta = InfMetadata::parse(SAMPLE).expect("parse");
        assert_eq!(meta.n, 131_072);
        assert!((meta.dt - 0.000_125).abs() < 1e-12);
        assert_eq!(meta.object.as_deref(), Some("J0737-3039A"));
    }

    #[test]
    fn object_is_optional() {
        let text = "\
 Number of bins in the time series      =  1024
 Width of each time series bin (sec)    =  0.01
";
        let meta = InfMetadata::parse(text).expect("parse");
        assert_eq!(meta.object, None);
    }

    #[test]
    fn missing_sample_count_is_an_error() {
        let text = " Width of each time series bin (sec)    =  0.01\n";
        assert!(InfMetadata::parse(text).is_err());
    }
}
