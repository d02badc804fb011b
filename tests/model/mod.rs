//! Model tree tests
//!
//! Tree edits that keep references consistent: identifier changes, element
//! removal and element replacement.
