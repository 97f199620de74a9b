use std::fmt;

/// Severity of one evaluated metric or one service report.
///
/// `Ok < Warn < Crit` is the severity order used for precedence scans.
/// `Unknown` only arises from a not-found policy and sorts between
/// `Ok` and `Warn`, matching where the formatter scans it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WarningLevel {
    Ok,
    Unknown,
    Warn,
    Crit,
}

impl WarningLevel {
    /// Bucket scan order used by the service formatter, most severe first.
    pub const PRECEDENCE: [WarningLevel; 4] = [
        WarningLevel::Crit,
        WarningLevel::Warn,
        WarningLevel::Unknown,
        WarningLevel::Ok,
    ];

    /// Case-insensitive parse of a configured not-found level.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "OK" => Some(Self::Ok),
            "WARN" | "WARNING" => Some(Self::Warn),
            "CRIT" | "CRITICAL" => Some(Self::Crit),
            "UNKNOWN" => Some(Self::Unknown),
            _ => None,
        }
    }

    /// Numeric return code for the passive-check transport.
    pub fn nagios_code(self, unknown_code: u8) -> u8 {
        match self {
            Self::Ok => 0,
            Self::Warn => 1,
            Self::Crit => 2,
            Self::Unknown => unknown_code,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Warn => "WARN",
            Self::Crit => "CRIT",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for WarningLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}
