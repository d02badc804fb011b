//! Reference strategy tests
//!
//! Each strategy is exercised against the process-diagram fixture:
//! - Resolution, set and clear of scalar references
//! - Live collection views and their mutation rules
//! - Rename and removal propagation
//! - Build-time binding and schema errors

pub mod tests_attribute_reference;
pub mod tests_build;
pub mod tests_element_collection;
