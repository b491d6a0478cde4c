//! HTTP client for the OCSF schema server
//!
//! Every public call issues blocking requests against the configured server.
//! Paths are relative to `server.base_url`:
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET | `api/versions` | [`OcsfApiClient::get_versions`] |
//! | GET | `{version}/export/schema` | [`OcsfApiClient::get_schema`] |
//! | GET | `{version}/api/profiles` | [`OcsfApiClient::get_profiles`] |
//! | GET | `{version}/api/extensions` | [`OcsfApiClient::get_extensions`] |

use std::cell::RefCell;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{OcsfApiError, Result};
use crate::schema::{Extensions, OcsfSchema, Profiles, SchemaDocument};
use crate::version::{SchemaVersions, VersionSelector};

const VERSIONS_PATH: [&str; 2] = ["api", "versions"];
const SCHEMA_PATH: [&str; 2] = ["export", "schema"];
const PROFILES_PATH: [&str; 2] = ["api", "profiles"];
const EXTENSIONS_PATH: [&str; 2] = ["api", "extensions"];

/// One entry of the live server's versions listing
#[derive(Debug, Deserialize)]
struct VersionEntry {
    version: String,
}

/// Versions payload: a bare array, or the live server's `{default, versions}` object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum VersionsResponse {
    Plain(Vec<String>),
    Listing {
        #[serde(default)]
        default: Option<VersionEntry>,
        versions: Vec<VersionEntry>,
    },
}

impl VersionsResponse {
    fn into_parts(self) -> (Vec<String>, Option<String>) {
        match self {
            VersionsResponse::Plain(versions) => (versions, None),
            VersionsResponse::Listing { default, versions } => (
                versions.into_iter().map(|v| v.version).collect(),
                default.map(|d| d.version),
            ),
        }
    }
}

/// Blocking client for the OCSF schema server.
///
/// Not `Sync`: when `fetch.cache_versions` is set the versions listing is
/// memoized in a `RefCell`.
#[derive(Debug)]
pub struct OcsfApiClient {
    http: reqwest::blocking::Client,
    base_url: Url,
    config: ClientConfig,
    versions: RefCell<Option<SchemaVersions>>,
}

impl OcsfApiClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut raw = config.server.base_url.clone();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let invalid = |source| OcsfApiError::InvalidBaseUrl {
            url: config.server.base_url.clone(),
            source,
        };
        let base_url = Url::parse(&raw).map_err(invalid)?;
        if base_url.cannot_be_a_base() {
            return Err(invalid(url::ParseError::RelativeUrlWithCannotBeABaseBase));
        }

        let http = reqwest::blocking::Client::builder()
            .timeout(config.server.timeout())
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(OcsfApiError::ClientInit)?;

        Ok(Self {
            http,
            base_url,
            config,
            versions: RefCell::new(None),
        })
    }

    /// Client for the public server with default settings
    pub fn with_defaults() -> Result<Self> {
        Self::new(ClientConfig::default())
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetch the version identifiers published by the server, in server order
    pub fn get_versions(&self) -> Result<Vec<String>> {
        let (versions, _) = self.fetch_versions()?;
        Ok(versions)
    }

    /// Fetch the versions listing together with the server's default
    pub fn get_version_set(&self) -> Result<SchemaVersions> {
        let (versions, default) = self.fetch_versions()?;
        SchemaVersions::from_identifiers(versions, default)
    }

    /// Fetch a complete schema.
    ///
    /// The selector is resolved against a fresh versions listing (or the
    /// memoized one), then the export document is fetched. Profiles and
    /// extensions are attached when the configuration asks for them. Any
    /// failure aborts the whole call.
    pub fn get_schema(&self, selector: impl Into<VersionSelector>) -> Result<OcsfSchema> {
        let selector = selector.into();
        let version = self.resolve(&selector)?;
        tracing::debug!(%selector, %version, "resolved schema version");

        let document: SchemaDocument = self.fetch_json(self.versioned(&version, SCHEMA_PATH)?)?;
        let mut schema = OcsfSchema::from_document(version.as_str(), document);

        if self.config.fetch.profiles {
            schema.profiles = Some(self.get_profiles(&version)?);
        }
        if self.config.fetch.extensions {
            schema.extensions = Some(self.get_extensions(&version)?);
        }

        tracing::info!(
            version = %schema.version,
            classes = schema.classes.len(),
            objects = schema.objects.len(),
            "fetched schema"
        );
        Ok(schema)
    }

    /// Fetch the profiles of an already-resolved version
    pub fn get_profiles(&self, version: &str) -> Result<Profiles> {
        self.fetch_json(self.versioned(version, PROFILES_PATH)?)
    }

    /// Fetch the extensions of an already-resolved version
    pub fn get_extensions(&self, version: &str) -> Result<Extensions> {
        self.fetch_json(self.versioned(version, EXTENSIONS_PATH)?)
    }

    /// Resolve a selector to a concrete version identifier
    pub fn resolve(&self, selector: &VersionSelector) -> Result<String> {
        if !self.config.fetch.cache_versions {
            let versions = self.get_version_set()?;
            return versions.resolve(selector).map(|v| v.version().to_string());
        }

        let mut cached = self.versions.borrow_mut();
        let versions = match cached.take() {
            Some(versions) => versions,
            None => self.get_version_set()?,
        };
        let resolved = versions.resolve(selector).map(|v| v.version().to_string());
        *cached = Some(versions);
        resolved
    }

    fn fetch_versions(&self) -> Result<(Vec<String>, Option<String>)> {
        let response: VersionsResponse = self.fetch_json(self.endpoint(&VERSIONS_PATH))?;
        Ok(response.into_parts())
    }

    /// Append path segments to the base URL. Each segment is percent-encoded,
    /// so `/`, `?` and `#` inside a segment stay inside it.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// URL of a per-version document. `.`, `..` and empty identifiers are
    /// rejected since they cannot name a single path segment.
    fn versioned(&self, version: &str, path: [&str; 2]) -> Result<Url> {
        if matches!(version, "" | "." | "..") {
            return Err(OcsfApiError::UnknownVersion(version.to_string()));
        }
        Ok(self.endpoint(&[version, path[0], path[1]]))
    }

    fn fetch_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let endpoint = format!("GET {url}");
        tracing::debug!(%url, "requesting");

        let unavailable = |source| OcsfApiError::ServiceUnavailable {
            endpoint: endpoint.clone(),
            source,
        };

        let body = self
            .http
            .get(url.clone())
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.text())
            .map_err(unavailable)?;

        serde_json::from_str(&body).map_err(|source| OcsfApiError::MalformedResponse {
            endpoint: endpoint.clone(),
            source,
        })
    }
}
