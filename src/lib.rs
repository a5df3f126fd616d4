//! # BARCH image tool
//!
//! Command line front end for the [`barch`] codec.
#![warn(missing_docs)]

#[allow(missing_docs)]
pub mod cli;
