use crate::ts::TreeSitterError;
use ast_grep_language::SupportLang;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct SitterConfig {
    #[serde(default)]
    pub meta: Metadata,
    #[serde(default)]
    pub parser: ParserSection,
}

impl SitterConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        let language = self.parser.language.trim();
        if language.is_empty() {
            issues.push(ValidationIssue::MissingField {
                field: "parser.language",
            });
        } else if SupportLang::from_str(language).is_err() {
            issues.push(ValidationIssue::UnknownLanguage {
                name: language.to_string(),
            });
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }

    /// The bundled grammar named by `parser.language`.
    pub fn support_lang(&self) -> Result<SupportLang, TreeSitterError> {
        let name = self.parser.language.trim();
        SupportLang::from_str(name).map_err(|_| TreeSitterError::UnknownLanguage {
            name: name.to_string(),
        })
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ParserSection {
    /// Grammar name or alias, e.g. `"json"`, `"rust"`, `"rs"`.
    #[serde(default)]
    pub language: String,
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    MissingField { field: &'static str },
    UnknownLanguage { name: String },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::MissingField { field } => {
                write!(f, "config missing required field '{field}'")
            }
            ValidationIssue::UnknownLanguage { name } => {
                write!(f, "unknown language '{name}'")
            }
        }
    }
}
