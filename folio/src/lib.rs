//! Expose folio's internal API for the xtask and for integration tests. It is
//! not meant as a stable library interface.
pub mod cli;
pub mod fragment;
pub mod site;
