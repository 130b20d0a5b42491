/// Value of the `Server` response header.
pub const SERVER: &str = concat!("utapi/", env!("CARGO_PKG_VERSION"));

/// The API version accepted by the query endpoint.
pub const API_VERSION: &str = "20160815";

/// Maximum size of a JSON request body.
pub const MAX_JSON_SIZE: usize = 262_144;
