//! Property-based tests for the filtered view builder

mod view_properties;
