//! Supported snippet languages

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::UnknownVariant;
use crate::util::capitalize_first;

/// Closed set of languages a snippet may be tagged with.
///
/// Serialized as the lowercase identifier stored in the `language` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Javascript,
    Typescript,
    Python,
    Java,
    Cpp,
    C,
    Csharp,
    Go,
    Rust,
    Php,
    Ruby,
    Swift,
    Kotlin,
    Dart,
    Scala,
    R,
    Matlab,
    Sql,
    Html,
    Css,
    Scss,
    Json,
    Xml,
    Yaml,
    Bash,
    Powershell,
    Dockerfile,
    Nginx,
}

impl Language {
    /// Every supported language, in picker order.
    pub const ALL: [Self; 28] = [
        Self::Javascript,
        Self::Typescript,
        Self::Python,
        Self::Java,
        Self::Cpp,
        Self::C,
        Self::Csharp,
        Self::Go,
        Self::Rust,
        Self::Php,
        Self::Ruby,
        Self::Swift,
        Self::Kotlin,
        Self::Dart,
        Self::Scala,
        Self::R,
        Self::Matlab,
        Self::Sql,
        Self::Html,
        Self::Css,
        Self::Scss,
        Self::Json,
        Self::Xml,
        Self::Yaml,
        Self::Bash,
        Self::Powershell,
        Self::Dockerfile,
        Self::Nginx,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Javascript => "javascript",
            Self::Typescript => "typescript",
            Self::Python => "python",
            Self::Java => "java",
            Self::Cpp => "cpp",
            Self::C => "c",
            Self::Csharp => "csharp",
            Self::Go => "go",
            Self::Rust => "rust",
            Self::Php => "php",
            Self::Ruby => "ruby",
            Self::Swift => "swift",
            Self::Kotlin => "kotlin",
            Self::Dart => "dart",
            Self::Scala => "scala",
            Self::R => "r",
            Self::Matlab => "matlab",
            Self::Sql => "sql",
            Self::Html => "html",
            Self::Css => "css",
            Self::Scss => "scss",
            Self::Json => "json",
            Self::Xml => "xml",
            Self::Yaml => "yaml",
            Self::Bash => "bash",
            Self::Powershell => "powershell",
            Self::Dockerfile => "dockerfile",
            Self::Nginx => "nginx",
        }
    }

    /// Label shown in pickers (`python` -> `Python`)
    #[must_use]
    pub fn display_name(self) -> String {
        capitalize_first(self.as_str())
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|language| language.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "language",
                value: s.to_string(),
            })
    }
}
