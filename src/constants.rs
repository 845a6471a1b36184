/// Source defaults and the placeholder strings written when a card lacks a field.
/// Placeholders are part of the stored document, so they must stay stable.

// Source site
pub const DEFAULT_BASE_URL: &str = "https://www.sensacine.com/cines/ciudades-72368/";
pub const DEFAULT_VENUE_URL_BASE: &str = "https://www.sensacine.com/cines/cine/";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";

// Timeouts (connect short, read long)
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 3_050;
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 27_000;

// Enrichment window
pub const DEFAULT_ENRICHMENT_DAYS: u32 = 7;
pub const MAX_ENRICHMENT_DAYS: u32 = 14;
pub const DEFAULT_ENRICHMENT_CONCURRENCY: usize = 4;

// Venue placeholders
pub const NAME_NOT_AVAILABLE: &str = "Name not available";
pub const ADDRESS_NOT_AVAILABLE: &str = "Address not available";
pub const SCREENS_NOT_AVAILABLE: &str = "Number of screens not available";
pub const URL_NOT_AVAILABLE: &str = "URL not available";

// Item placeholders use the listing site's language
pub const TITLE_NOT_AVAILABLE: &str = "Título no disponible";
pub const DIRECTOR_NOT_AVAILABLE: &str = "Director no disponible";
pub const SYNOPSIS_NOT_AVAILABLE: &str = "Sinopsis no disponible";

// Day-view fragment appended to a venue URL
pub const DAY_FRAGMENT_KEY: &str = "shwt_date";

// Store and server
pub const DEFAULT_DB_PATH: &str = "data/snapshots.db";
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_SERVER_PORT: u16 = 8080;
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
