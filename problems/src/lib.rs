//! Problem codes and messages for model building.
//!
//! The enumeration is generated at build time from
//! `resources/problem-codes.csv` so that the user-facing codes live in one
//! reviewable place.

include!(concat!(env!("OUT_DIR"), "/problems.rs"));
