use serde::{Deserialize, Serialize};

/// Severity implied by a set of interface changes.
///
/// Ordering is semantic: `None < Patch < Minor < Major`. `None` only appears
/// as an aggregate over an empty change set; individual records always carry
/// at least `Patch`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    None,
    Patch,
    Minor,
    Major,
}

/// The version-bump category a release author claims. There is no declared
/// `none`; an unchanged surface still allows any bump.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Bump {
    Patch,
    Minor,
    Major,
}

/// Outcome of gating an aggregate severity against a declared bump.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Verdict {
    pub pass: bool,
    pub severity: Severity,
    pub declared: Bump,
}

impl Bump {
    /// The severity level this bump is allowed to cover.
    pub fn covers(self) -> Severity {
        match self {
            Bump::Patch => Severity::Patch,
            Bump::Minor => Severity::Minor,
            Bump::Major => Severity::Major,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::None => write!(f, "none"),
            Severity::Patch => write!(f, "patch"),
            Severity::Minor => write!(f, "minor"),
            Severity::Major => write!(f, "major"),
        }
    }
}

impl std::fmt::Display for Bump {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Bump::Patch => write!(f, "patch"),
            Bump::Minor => write!(f, "minor"),
            Bump::Major => write!(f, "major"),
        }
    }
}

impl std::str::FromStr for Bump {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "patch" => Ok(Bump::Patch),
            "minor" => Ok(Bump::Minor),
            "major" => Ok(Bump::Major),
            _ => Err(format!("Invalid bump '{}'. Use: patch, minor, major", s)),
        }
    }
}
