//! Zoho CRM API constants

/// REST API version segment used in every CRM URL
pub const API_VERSION: &str = "v8";

pub const DEFAULT_API_DOMAIN: &str = "https://www.zohoapis.com";
pub const DEFAULT_ACCOUNTS_URL: &str = "https://accounts.zoho.com/oauth/v2/token";

pub const DEFAULT_MODULE: &str = "Leads";
pub const DEFAULT_STATUS_FIELD: &str = "Lead_Status";

/// Records per write request (the API accepts at most 100)
pub const DEFAULT_CHUNK_SIZE: usize = 100;
pub const MAX_CHUNK_SIZE: usize = 100;

/// Records per page when reading a custom view (the API accepts at most 200)
pub const DEFAULT_PAGE_SIZE: u32 = 200;
pub const MAX_PAGE_SIZE: u32 = 200;

/// Environment variables holding process-wide credential defaults
pub mod env {
    pub const CLIENT_ID: &str = "ZOHO_CLIENT_ID";
    pub const CLIENT_SECRET: &str = "ZOHO_CLIENT_SECRET";
    pub const REFRESH_TOKEN: &str = "ZOHO_REFRESH_TOKEN";
    pub const API_DOMAIN: &str = "ZOHO_API_DOMAIN";
    pub const ACCOUNTS_URL: &str = "ZOHO_ACCOUNTS_URL";
}

/// Error codes for per-record failures synthesized locally
pub mod codes {
    pub const INVALID_INPUT_ROW: &str = "INVALID_INPUT_ROW";
    pub const MISSING_IN_RESPONSE: &str = "MISSING_IN_RESPONSE";
    pub const REQUEST_FAILED: &str = "REQUEST_FAILED";
    pub const FAILED_RETRIES: &str = "FAILED_RETRIES";
    pub const UNKNOWN_ERROR: &str = "UNKNOWN_ERROR";
}
