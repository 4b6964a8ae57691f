//! Shared constants for folio.

/// Default HTTP port (matches the portfolio front end's dev proxy).
pub const DEFAULT_PORT: u16 = 3000;

/// Default bind address.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "folio.toml";

/// Name of the redb database inside the data directory.
pub const DB_FILE_NAME: &str = "folio.redb";

/// Largest image the upload pipeline may register (10 MiB).
pub const MAX_IMAGE_SIZE: u64 = 10 * 1024 * 1024;

/// Environment variable overriding the data directory.
pub const HOME_ENV: &str = "FOLIO_HOME";

/// Upper bound on one upstream fetch by the homepage image proxy.
pub const IMAGE_FETCH_TIMEOUT_SECS: u64 = 30;

/// Cache policy for proxied homepage images; image URLs never change content.
pub const IMAGE_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";
