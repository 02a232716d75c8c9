//! Dispatcher constants.

/// Placeholder in a memo template that is substituted with a unique token.
pub const ID_PLACEHOLDER: &str = "{{id}}";

/// Number of items fetched per page in claim mode.
pub const DEFAULT_PAGE_SIZE: u64 = 50;

/// Maximum number of candidates drawn before unique token generation gives up.
pub const DEFAULT_TOKEN_ATTEMPTS: u32 = 8;

/// Delay between unique token generation attempts, in milliseconds.
pub const DEFAULT_TOKEN_BACKOFF_MS: u64 = 200;

/// Number of wei in one gwei.
pub const WEI_PER_GWEI: u128 = 1_000_000_000;

/// Default ledger JSON-RPC endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://bsc-dataseed.binance.org";

/// Default inscription listing endpoint.
pub const DEFAULT_ITEMS_API: &str = "https://api.evm.ink/v1/graphql/";

/// Default inscription existence-check endpoint.
pub const DEFAULT_EXISTS_API: &str = "https://api.ethscriptions.com/api/ethscriptions/exists";

/// Default network scope for inscription listing queries.
pub const DEFAULT_NETWORK: &str = "eip155:56";
