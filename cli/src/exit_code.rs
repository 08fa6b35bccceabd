/// The command completed.
pub const NO_ERROR: i32 = 0;

/// The command completed, but produced no usable output.
pub const NON_FATAL_ERROR: i32 = 1;

/// The command aborted.
pub const FATAL_ERROR: i32 = 2;
