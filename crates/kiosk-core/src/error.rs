use thiserror::Error;

#[derive(Debug, Error)]
pub enum KioskError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Unknown relative day: {0}")]
    UnknownDay(String),

    #[error("Phenomenon '{phen}' missing from ephemeris")]
    MissingPhenomenon { phen: String },

    #[error("Unparseable time of day: {value:?}")]
    TimeFormat { value: String },

    #[error("Unparseable illumination: {value:?}")]
    Illumination { value: String },
}

impl KioskError {
    /// Short code used in log fields and the `/health` payload.
    pub fn code(&self) -> &'static str {
        match self {
            KioskError::Config(_) => "CONFIG_ERROR",
            KioskError::UnknownCategory(_) => "UNKNOWN_CATEGORY",
            KioskError::UnknownDay(_) => "UNKNOWN_DAY",
            KioskError::MissingPhenomenon { .. } => "MISSING_PHENOMENON",
            KioskError::TimeFormat { .. } => "TIME_FORMAT",
            KioskError::Illumination { .. } => "ILLUMINATION",
        }
    }
}

pub type Result<T> = std::result::Result<T, KioskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(KioskError::Config("x".into()).code(), "CONFIG_ERROR");
        assert_eq!(KioskError::UnknownCategory("sailboats".into()).code(), "UNKNOWN_CATEGORY");
        let e = KioskError::MissingPhenomenon { phen: "R".into() };
        assert_eq!(e.code(), "MISSING_PHENOMENON");
        assert_eq!(e.to_string(), "Phenomenon 'R' missing from ephemeris");
        let e = KioskError::TimeFormat { value: "25:99".into() };
        assert_eq!(e.code(), "TIME_FORMAT");
        assert_eq!(e.to_string(), "Unparseable time of day: \"25:99\"");
    }
}
