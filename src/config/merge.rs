//! Layer merge rules for the configuration builder.

pub mod merge_policy;
