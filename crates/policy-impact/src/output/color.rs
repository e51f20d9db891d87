//! Color helpers for CLI output.
//!
//! Risk colors: critical red, high yellow, medium cyan, low green.
//! Identifiers are dimmed, headers bold.

use super::OutputConfig;
use crate::domain::{DependencyStrength, RiskLevel};
use colored::Colorize;

/// Color a risk level by severity.
pub fn colorize_risk(level: RiskLevel, config: &OutputConfig) -> String {
    let text = level.as_str();
    if !config.use_colors {
        return text.to_string();
    }
    match level {
        RiskLevel::Critical => text.red().bold().to_string(),
        RiskLevel::High => text.yellow().to_string(),
        RiskLevel::Medium => text.cyan().to_string(),
        RiskLevel::Low => text.green().to_string(),
    }
}

/// Color a strength with the color of the risk it implies.
pub fn colorize_strength(strength: DependencyStrength, config: &OutputConfig) -> String {
    let text = strength.as_str();
    if !config.use_colors {
        return text.to_string();
    }
    match RiskLevel::from(strength) {
        RiskLevel::Critical => text.red().to_string(),
        RiskLevel::High => text.yellow().to_string(),
        RiskLevel::Medium => text.cyan().to_string(),
        RiskLevel::Low => text.green().to_string(),
    }
}

/// Section header.
pub fn bold(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.bold().to_string()
}

/// Identifiers and secondary detail.
pub fn dimmed(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.dimmed().to_string()
}
