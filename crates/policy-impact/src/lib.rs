//! Policy dependency graph and change-impact analysis.
//!
//! Policies are depended on by workflows, modules, templates, assessments,
//! training units and documents. This crate records those dependencies,
//! builds the graph reachable from a policy, and scores what a change to
//! the policy would put at risk before it is published.
//!
//! The engine lives in [`dependency`] and [`impact`]; it reaches policies and
//! records only through the traits in [`storage`]. The remaining modules host
//! the engine as a command-line tool over a local project directory.

#![forbid(unsafe_code)]

// Engine
pub mod config;
pub mod dependency;
pub mod domain;
pub mod error;
pub mod impact;
pub mod storage;

// Command-line host
pub mod app;
pub mod cli;
pub mod commands;
pub mod output;
