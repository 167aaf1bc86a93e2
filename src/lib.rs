#![allow(unused_assignments)] // thiserror/miette proc macros trigger false positives

pub mod cli;
pub mod config;
pub mod customize;
pub mod error;
pub mod hypervisor;
pub mod install;
pub mod key;
pub mod logging;
pub mod passwd;
pub mod progress;
pub mod runner;
