//! Input bounds enforced at the request edge, before anything reaches the
//! booking engine.

/// Longest accepted item name.
pub const MAX_NAME_LEN: usize = 256;

/// Longest accepted item description.
pub const MAX_DESCRIPTION_LEN: usize = 4096;
