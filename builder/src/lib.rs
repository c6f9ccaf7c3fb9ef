// Allow large errors because diagnostics carry context - we expect large errors.
#![allow(clippy::result_large_err)]

//! Builds program models from construction records.
//!
//! Each document is processed declaration by declaration: an entity is
//! fully constructed, its references resolved and its default
//! implementation synthesized before the next declaration begins, so a
//! declaration can rely on everything declared before it. Cross-document
//! ordering is the scheduler's job.

extern crate plcgen_dsl;

mod context;
mod enumeration;
mod expressions;
mod function_block;
mod library;
mod method;
mod process;
mod registry;
mod resolve;
mod scheduler;
mod statemachine;
mod structure;
mod synth_admission;
mod synth_logging;
mod synth_wiring;
mod variable;

#[cfg(test)]
mod model_tests;

pub use context::BuildContext;
pub use library::build_library;
pub use registry::Registry;
pub use resolve::{lookup, resolve_ref};
pub use scheduler::{DocumentSource, Scheduler};

/// Conventional path of the process base every process extends unless its
/// record names another.
pub const BASE_PROCESS: &str = "common.BaseProcess";

/// Conventional path of the enumeration that request methods return.
pub const REQUEST_RESULTS: &str = "common.RequestResults";
