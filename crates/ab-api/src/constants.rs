/// The default collection endpoint of the address book service
pub const DEFAULT_ADDRESSES_ENDPOINT: &str = "http://127.0.0.1:5000/api/addresses";

/// The content type sent with every request that carries a body
pub const JSON_CONTENT_TYPE: &str = "application/json";
