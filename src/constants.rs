// Labels and defaults shared across the list controllers and the catalog client

/// Label used for items without a release date.
pub const UPCOMING_LABEL: &str = "Upcoming";

pub const RELEASE_YEAR_FILTER_LABEL: &str = "Release Year";
pub const CATEGORY_FILTER_LABEL: &str = "Genre";

// === Catalog API ===
pub const DEFAULT_API_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// === List behaviour ===
pub const DEFAULT_QUERY_THROTTLE_MS: u64 = 1000;
pub const DEFAULT_SEARCH_RESULT_LIMIT: usize = 12;
