//! Supported snippet categories

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::UnknownVariant;

/// Closed set of categories a snippet may be filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Frontend,
    Backend,
    Database,
    DevOps,
    Mobile,
    Desktop,
    Algorithm,
    #[serde(rename = "Data Structure")]
    DataStructure,
    Utility,
    Configuration,
    Testing,
    Documentation,
}

impl Category {
    /// Every supported category, in picker order.
    pub const ALL: [Self; 12] = [
        Self::Frontend,
        Self::Backend,
        Self::Database,
        Self::DevOps,
        Self::Mobile,
        Self::Desktop,
        Self::Algorithm,
        Self::DataStructure,
        Self::Utility,
        Self::Configuration,
        Self::Testing,
        Self::Documentation,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Frontend => "Frontend",
            Self::Backend => "Backend",
            Self::Database => "Database",
            Self::DevOps => "DevOps",
            Self::Mobile => "Mobile",
            Self::Desktop => "Desktop",
            Self::Algorithm => "Algorithm",
            Self::DataStructure => "Data Structure",
            Self::Utility => "Utility",
            Self::Configuration => "Configuration",
            Self::Testing => "Testing",
            Self::Documentation => "Documentation",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "category",
                value: s.to_string(),
            })
    }
}
