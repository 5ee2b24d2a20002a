use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_TOLERANCE: f32 = 5.0;
pub const DEFAULT_FALLBACK_DELAY: Duration = Duration::from_millis(100);

/// Tuning knobs for [`ScrollRestoration`](super::ScrollRestoration).
///
/// Both values depend on how fast the host lays out, so they are
/// configurable rather than baked in.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestorationConfig {
    /// A write counts as restored when every axis lands strictly closer than
    /// this to the saved offset.
    pub tolerance: f32,
    /// Delay of the one extra attempt armed on each activation.
    #[serde(rename = "fallback_delay_ms", with = "millis")]
    pub fallback_delay: Duration,
}

impl Default for RestorationConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            fallback_delay: DEFAULT_FALLBACK_DELAY,
        }
    }
}

impl RestorationConfig {
    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_fallback_delay(mut self, delay: Duration) -> Self {
        self.fallback_delay = delay;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(ConfigError::InvalidTolerance(self.tolerance));
        }
        Ok(())
    }
}

mod millis {
    use serde::ser::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        let ms = u64::try_from(d.as_millis()).map_err(|_| {
            S::Error::custom(format!("fallback delay {d:?} does not fit in u64 milliseconds"))
        })?;
        s.serialize_u64(ms)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_behavior() {
        let c = RestorationConfig::default();
        assert_eq!(c.tolerance, 5.0);
        assert_eq!(c.fallback_delay, Duration::from_millis(100));
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let c: RestorationConfig = serde_json::from_str(r#"{ "fallback_delay_ms": 250 }"#).unwrap();
        assert_eq!(c.fallback_delay, Duration::from_millis(250));
        assert_eq!(c.tolerance, DEFAULT_TOLERANCE);

        let c: RestorationConfig = serde_json::from_str(r#"{ "tolerance": 1.5 }"#).unwrap();
        assert_eq!(c.tolerance, 1.5);
        assert_eq!(c.fallback_delay, DEFAULT_FALLBACK_DELAY);
    }

    #[test]
    fn serializes_delay_as_millis() {
        let json = serde_json::to_value(RestorationConfig::default()).unwrap();
        assert_eq!(json["fallback_delay_ms"], 100);
        assert_eq!(json["tolerance"], 5.0);
    }

    #[test]
    fn oversized_delay_fails_to_serialize() {
        let c = RestorationConfig::default().with_fallback_delay(Duration::MAX);
        let err = serde_json::to_string(&c).unwrap_err();
        assert!(err.to_string().contains("fallback delay"));
    }

    #[test]
    fn rejects_non_positive_or_nan_tolerance() {
        for bad in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let err = RestorationConfig::default()
                .with_tolerance(bad)
                .validate()
                .unwrap_err();
            assert!(matches!(err, ConfigError::InvalidTolerance(_)));
        }
    }
}
