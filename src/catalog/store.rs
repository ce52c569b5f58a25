use crate::catalog::errors::CatalogError;
use crate::catalog::satellite::SatelliteEntry;
use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};
use std::fs;
use std::path::PathBuf;

const CELESTRAK_URL: &str = "https://celestrak.org/NORAD/elements/gp.php?GROUP=active&FORMAT=tle";
const CACHE_FILE: &str = "active_satellites.tle";
const DEFAULT_MAX_AGE_HOURS: i64 = 24;

/// Freshness policy for locally cached catalog data, injected into the
/// store so the propagation core never touches files or the network.
pub trait CachePolicy {
    /// Whether the local copy is recent enough to use without fetching.
    fn is_fresh(&self) -> bool;
    /// Downloads the catalog, refreshes the local copy, and returns the raw
    /// text.
    fn fetch(&self) -> Result<String, CatalogError>;
    /// Reads the local copy regardless of age.
    fn load_local(&self) -> Result<String, CatalogError>;
}

/// File-age freshness over a CelesTrak GP download.
pub struct FileCache {
    path: PathBuf,
    url: String,
    max_age: Duration,
}

impl FileCache {
    pub fn new(path: PathBuf, url: impl Into<String>, max_age: Duration) -> Self {
        FileCache {
            path,
            url: url.into(),
            max_age,
        }
    }

    /// Default layout: the active-satellite GP set under the user cache
    /// directory, refreshed daily (CelesTrak updates a few times per day).
    pub fn default_celestrak() -> Self {
        let cache_dir = dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("orbitwatch");
        FileCache::new(
            cache_dir.join(CACHE_FILE),
            CELESTRAK_URL,
            Duration::hours(DEFAULT_MAX_AGE_HOURS),
        )
    }
}

impl CachePolicy for FileCache {
    fn is_fresh(&self) -> bool {
        let modified = match fs::metadata(&self.path).and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(_) => return false,
        };
        let age = Utc::now() - DateTime::<Utc>::from(modified);
        age < self.max_age
    }

    fn fetch(&self) -> Result<String, CatalogError> {
        info!("fetching catalog from {}", self.url);
        let client = reqwest::blocking::Client::new();
        let response = client.get(&self.url).send()?;
        let status = response.status();

        if status == reqwest::StatusCode::FORBIDDEN {
            return Err(CatalogError::HttpForbidden);
        }
        if !status.is_success() {
            return Err(CatalogError::ReqwestError(
                response.error_for_status().unwrap_err(),
            ));
        }

        let body = response.text()?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, &body)?;
        Ok(body)
    }

    fn load_local(&self) -> Result<String, CatalogError> {
        Ok(fs::read_to_string(&self.path)?)
    }
}

/// Loads and parses the object catalog through an injected cache policy.
pub struct TleStore<C: CachePolicy> {
    cache: C,
}

impl TleStore<FileCache> {
    pub fn with_default_cache() -> Self {
        TleStore::new(FileCache::default_celestrak())
    }
}

impl<C: CachePolicy> TleStore<C> {
    pub fn new(cache: C) -> Self {
        TleStore { cache }
    }

    /// Returns the parsed catalog. A fresh local copy short-circuits the
    /// network; a failed fetch falls back to a stale local copy so an
    /// offline run can still proceed with old data.
    pub fn load(&self) -> Result<Vec<SatelliteEntry>, CatalogError> {
        let text = if self.cache.is_fresh() {
            debug!("catalog cache is fresh, using local copy");
            self.cache.load_local()?
        } else {
            match self.cache.fetch() {
                Ok(text) => text,
                Err(fetch_error) => {
                    warn!(
                        "catalog fetch failed ({}), trying stale local copy",
                        fetch_error
                    );
                    self.cache.load_local().map_err(|_| fetch_error)?
                }
            }
        };

        Self::parse(&text)
    }

    /// Parses 3-line element sets (name line followed by the two data
    /// lines, the CelesTrak `FORMAT=tle` layout).
    pub fn parse(text: &str) -> Result<Vec<SatelliteEntry>, CatalogError> {
        let elements =
            sgp4::parse_3les(text).map_err(|e| CatalogError::TleParse(e.to_string()))?;
        if elements.is_empty() {
            return Err(CatalogError::EmptyCatalog);
        }

        let entries: Vec<SatelliteEntry> = elements
            .into_iter()
            .map(SatelliteEntry::from_elements)
            .collect();
        info!("parsed {} element sets", entries.len());
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    const ISS_3LE: &str = "ISS (ZARYA)\n\
        1 25544U 98067A   20194.88612269 -.00002218  00000-0 -31515-4 0  9992\n\
        2 25544  51.6461 221.2784 0001413  89.1723 280.4612 15.49507896236008\n";

    struct ScriptedCache {
        fresh: bool,
        remote: Option<&'static str>,
        local: Option<&'static str>,
        fetch_calls: Cell<usize>,
    }

    impl ScriptedCache {
        fn new(fresh: bool, remote: Option<&'static str>, local: Option<&'static str>) -> Self {
            ScriptedCache {
                fresh,
                remote,
                local,
                fetch_calls: Cell::new(0),
            }
        }
    }

    impl CachePolicy for ScriptedCache {
        fn is_fresh(&self) -> bool {
            self.fresh
        }

        fn fetch(&self) -> Result<String, CatalogError> {
            self.fetch_calls.set(self.fetch_calls.get() + 1);
            self.remote
                .map(str::to_owned)
                .ok_or(CatalogError::HttpForbidden)
        }

        fn load_local(&self) -> Result<String, CatalogError> {
            self.local.map(str::to_owned).ok_or_else(|| {
                CatalogError::IoError(std::io::Error::from(std::io::ErrorKind::NotFound))
            })
        }
    }

    #[test]
    fn test_fresh_cache_skips_the_network() {
        let store = TleStore::new(ScriptedCache::new(true, None, Some(ISS_3LE)));
        let entries = store.load().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(store.cache.fetch_calls.get(), 0);
    }

    #[test]
    fn test_stale_cache_fetches() {
        let store = TleStore::new(ScriptedCache::new(false, Some(ISS_3LE), None));
        let entries = store.load().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(store.cache.fetch_calls.get(), 1);
    }

    #[test]
    fn test_failed_fetch_falls_back_to_stale_local_copy() {
        let store = TleStore::new(ScriptedCache::new(false, None, Some(ISS_3LE)));
        let entries = store.load().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(store.cache.fetch_calls.get(), 1);
    }

    #[test]
    fn test_no_source_at_all_reports_the_fetch_error() {
        let store = TleStore::new(ScriptedCache::new(false, None, None));
        let result = store.load();
        assert!(matches!(result, Err(CatalogError::HttpForbidden)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(TleStore::<FileCache>::parse("not a tle").is_err());
    }

    #[test]
    fn test_parse_rejects_empty_catalog() {
        assert!(matches!(
            TleStore::<FileCache>::parse(""),
            Err(CatalogError::EmptyCatalog)
        ));
    }

    #[test]
    fn test_parsed_entry_identity() {
        let entries = TleStore::<FileCache>::parse(ISS_3LE).unwrap();
        assert_eq!(entries[0].identity().name, "ISS (ZARYA)");
        assert_eq!(entries[0].identity().catalog_number, 25544);
    }
}
