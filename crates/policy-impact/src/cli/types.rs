//! CLI value enums and their domain conversions.

use crate::domain::{DependencyStrength, DependentType};
use crate::impact::ReportFormat;
use clap::ValueEnum;

/// Dependent type for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependentTypeArg {
    /// Care workflow
    Workflow,
    /// Platform module
    Module,
    /// Document template
    Template,
    /// Assessment form
    Assessment,
    /// Training unit
    Training,
    /// Stand-alone document
    Document,
}

impl From<DependentTypeArg> for DependentType {
    fn from(arg: DependentTypeArg) -> Self {
        match arg {
            DependentTypeArg::Workflow => Self::Workflow,
            DependentTypeArg::Module => Self::Module,
            DependentTypeArg::Template => Self::Template,
            DependentTypeArg::Assessment => Self::Assessment,
            DependentTypeArg::Training => Self::Training,
            DependentTypeArg::Document => Self::Document,
        }
    }
}

/// Dependency strength for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrengthArg {
    /// Change breaks the dependent
    Strong,
    /// Change needs adjustment
    Medium,
    /// Informational
    Weak,
}

impl From<StrengthArg> for DependencyStrength {
    fn from(arg: StrengthArg) -> Self {
        match arg {
            StrengthArg::Strong => Self::Strong,
            StrengthArg::Medium => Self::Medium,
            StrengthArg::Weak => Self::Weak,
        }
    }
}

/// Report format for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormatArg {
    /// Structured JSON report
    #[default]
    Json,
    /// HTML page
    Html,
    /// PDF (not supported)
    Pdf,
}

impl From<ReportFormatArg> for ReportFormat {
    fn from(arg: ReportFormatArg) -> Self {
        match arg {
            ReportFormatArg::Json => Self::Json,
            ReportFormatArg::Html => Self::Html,
            ReportFormatArg::Pdf => Self::Pdf,
        }
    }
}
