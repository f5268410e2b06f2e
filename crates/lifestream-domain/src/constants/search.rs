//! Query path constants.

/// Default number of results returned by a query.
pub const DEFAULT_TOP_K: usize = 10;

/// Upper bound on `top_k` accepted by the query endpoint.
pub const MAX_TOP_K: usize = 50;
