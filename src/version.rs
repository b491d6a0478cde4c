//! Schema versioning utilities
//!
//! The OCSF server publishes its versions as plain identifier strings. This
//! module orders them by semantic-version precedence and resolves a
//! [`VersionSelector`] to one concrete identifier.

use semver::Version;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use crate::error::{OcsfApiError, Result};

/// Parse a version identifier leniently.
///
/// Accepts a leading `v` and pads a missing minor or patch component with
/// zero, so `"v1.2"` canonicalizes to `1.2.0`. Returns `None` for anything
/// that still is not semver.
pub fn canonicalize(identifier: &str) -> Option<Version> {
    let trimmed = identifier.trim();
    let trimmed = trimmed.strip_prefix(['v', 'V']).unwrap_or(trimmed);
    if let Ok(version) = Version::parse(trimmed) {
        return Some(version);
    }

    let split = trimmed.find(['-', '+']).unwrap_or(trimmed.len());
    let (core, rest) = trimmed.split_at(split);
    let padded = match core.split('.').count() {
        1 => format!("{core}.0.0{rest}"),
        2 => format!("{core}.0{rest}"),
        _ => return None,
    };
    Version::parse(&padded).ok()
}

/// A single schema version identifier as reported by the server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct SchemaVersion {
    /// Identifier exactly as published (e.g., "1.3.0-dev")
    version: String,
    /// Canonical semver, if the identifier parses
    semver: Option<Version>,
}

impl SchemaVersion {
    pub fn new(version: impl Into<String>) -> Self {
        let version = version.into();
        let semver = canonicalize(&version);
        Self { version, semver }
    }

    /// The identifier string (e.g., "1.2.0")
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Parsed semantic version, `None` when the identifier is not semver
    pub fn semver(&self) -> Option<&Version> {
        self.semver.as_ref()
    }

    /// True when the version carries a pre-release label (e.g., "-dev")
    pub fn is_prerelease(&self) -> bool {
        self.semver.as_ref().is_some_and(|v| !v.pre.is_empty())
    }

    /// True for a parseable version without a pre-release label
    pub fn is_stable(&self) -> bool {
        self.semver.as_ref().is_some_and(|v| v.pre.is_empty())
    }

    /// Check whether `identifier` names this version, either verbatim or
    /// after canonicalization.
    pub fn matches(&self, identifier: &str) -> bool {
        if self.version == identifier {
            return true;
        }
        match (&self.semver, canonicalize(identifier)) {
            (Some(own), Some(other)) => *own == other,
            _ => false,
        }
    }
}

impl From<String> for SchemaVersion {
    fn from(version: String) -> Self {
        Self::new(version)
    }
}

impl From<&str> for SchemaVersion {
    fn from(version: &str) -> Self {
        Self::new(version)
    }
}

impl From<SchemaVersion> for String {
    fn from(version: SchemaVersion) -> Self {
        version.version
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.version)
    }
}

impl PartialEq for SchemaVersion {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
    }
}

impl Eq for SchemaVersion {}

impl PartialEq<str> for SchemaVersion {
    fn eq(&self, other: &str) -> bool {
        self.version == other
    }
}

impl PartialEq<&str> for SchemaVersion {
    fn eq(&self, other: &&str) -> bool {
        self.version == *other
    }
}

/// Semver precedence, then identifier text. Unparseable identifiers sort last.
fn by_precedence(a: &SchemaVersion, b: &SchemaVersion) -> Ordering {
    match (&a.semver, &b.semver) {
        (Some(x), Some(y)) => x.cmp(y).then_with(|| a.version.cmp(&b.version)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.version.cmp(&b.version),
    }
}

fn latest_of(versions: &[SchemaVersion], stable_only: bool) -> Option<&SchemaVersion> {
    versions
        .iter()
        .filter(|v| v.semver.is_some())
        .filter(|v| !stable_only || v.is_stable())
        .max_by(|a, b| by_precedence(a, b))
}

/// Which version a caller is asking for
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum VersionSelector {
    /// The registry default
    #[default]
    Default,
    /// Most recent version, pre-releases included
    Latest,
    /// Most recent version without a pre-release label
    LatestStable,
    /// A specific version identifier
    Exact(String),
}

impl VersionSelector {
    pub const LATEST: &'static str = "latest";
    pub const LATEST_STABLE: &'static str = "latest_stable";

    /// Interpret a selector string. Keywords are case-insensitive and
    /// `latest-stable` is accepted as a spelling of `latest_stable`.
    pub fn parse(selector: &str) -> Self {
        let trimmed = selector.trim();
        if trimmed.eq_ignore_ascii_case(Self::LATEST) {
            VersionSelector::Latest
        } else if trimmed.eq_ignore_ascii_case(Self::LATEST_STABLE)
            || trimmed.eq_ignore_ascii_case("latest-stable")
        {
            VersionSelector::LatestStable
        } else {
            VersionSelector::Exact(trimmed.to_string())
        }
    }
}

impl FromStr for VersionSelector {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for VersionSelector {
    fn from(selector: &str) -> Self {
        Self::parse(selector)
    }
}

impl From<String> for VersionSelector {
    fn from(selector: String) -> Self {
        Self::parse(&selector)
    }
}

impl From<Option<&str>> for VersionSelector {
    fn from(selector: Option<&str>) -> Self {
        selector.map(Self::parse).unwrap_or_default()
    }
}

impl From<&SchemaVersion> for VersionSelector {
    fn from(version: &SchemaVersion) -> Self {
        VersionSelector::Exact(version.version.clone())
    }
}

impl fmt::Display for VersionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionSelector::Default => f.write_str("default"),
            VersionSelector::Latest => f.write_str(Self::LATEST),
            VersionSelector::LatestStable => f.write_str(Self::LATEST_STABLE),
            VersionSelector::Exact(version) => f.write_str(version),
        }
    }
}

/// The set of versions known to the server plus its designated default.
///
/// The default is a fallback and does not have to appear in `versions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaVersions {
    default: SchemaVersion,
    versions: Vec<SchemaVersion>,
}

impl SchemaVersions {
    pub fn new(default: SchemaVersion, versions: Vec<SchemaVersion>) -> Self {
        for version in versions.iter().filter(|v| v.semver.is_none()) {
            tracing::warn!(version = %version, "ignoring non-semver identifier for ordering");
        }
        Self { default, versions }
    }

    /// Build a registry from bare identifiers.
    ///
    /// Without an explicit default, the latest stable version is used, or the
    /// latest pre-release when nothing stable exists.
    pub fn from_identifiers(identifiers: Vec<String>, default: Option<String>) -> Result<Self> {
        let versions: Vec<SchemaVersion> = identifiers.into_iter().map(SchemaVersion::from).collect();
        let default = match default {
            Some(default) => SchemaVersion::from(default),
            None => latest_of(&versions, true)
                .or_else(|| latest_of(&versions, false))
                .cloned()
                .ok_or(OcsfApiError::EmptyRegistry)?,
        };
        Ok(Self::new(default, versions))
    }

    pub fn default_version(&self) -> &SchemaVersion {
        &self.default
    }

    /// Versions in the order they were supplied
    pub fn versions(&self) -> &[SchemaVersion] {
        &self.versions
    }

    /// Versions in ascending precedence; unparseable identifiers last
    pub fn sorted(&self) -> Vec<&SchemaVersion> {
        let mut sorted: Vec<_> = self.versions.iter().collect();
        sorted.sort_by(|a, b| by_precedence(a, b));
        sorted
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.versions.iter().any(|v| v.matches(identifier))
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Greatest version by semver precedence, pre-releases included
    pub fn latest(&self) -> Result<&SchemaVersion> {
        latest_of(&self.versions, false).ok_or(OcsfApiError::EmptyRegistry)
    }

    /// Greatest version without a pre-release label
    pub fn latest_stable(&self) -> Result<&SchemaVersion> {
        match latest_of(&self.versions, true) {
            Some(version) => Ok(version),
            None if self.latest().is_err() => Err(OcsfApiError::EmptyRegistry),
            None => Err(OcsfApiError::NoStableVersion),
        }
    }

    /// Resolve a selector to one concrete version
    pub fn resolve(&self, selector: &VersionSelector) -> Result<&SchemaVersion> {
        match selector {
            VersionSelector::Default => Ok(&self.default),
            VersionSelector::Latest => self.latest(),
            VersionSelector::LatestStable => self.latest_stable(),
            VersionSelector::Exact(wanted) => self
                .find(wanted)
                .ok_or_else(|| OcsfApiError::UnknownVersion(wanted.clone())),
        }
    }

    fn find(&self, wanted: &str) -> Option<&SchemaVersion> {
        let candidates = || self.versions.iter().chain(std::iter::once(&self.default));

        if let Some(exact) = candidates().find(|v| v.version == wanted) {
            return Some(exact);
        }
        candidates()
            .filter(|v| v.matches(wanted))
            .min_by(|a, b| a.version.cmp(&b.version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn registry(default: &str, versions: &[&str]) -> SchemaVersions {
        SchemaVersions::new(
            SchemaVersion::new(default),
            versions.iter().map(|v| SchemaVersion::new(*v)).collect(),
        )
    }

    #[test]
    fn test_latest_and_latest_stable() {
        let versions = registry("1.2.0", &["1.0.0", "1.2.0", "1.1.0", "1.3.0-dev"]);

        assert_eq!(versions.latest().unwrap().version(), "1.3.0-dev");
        assert_eq!(versions.latest_stable().unwrap().version(), "1.2.0");
        assert_eq!(versions.default_version().version(), "1.2.0");
    }

    #[test]
    fn test_latest_is_greatest_member() {
        let versions = registry("0.1.0", &["0.9.1", "1.10.0", "1.9.0", "1.10.0-rc.1", "0.10.0"]);
        let latest = versions.latest().unwrap().semver().unwrap().clone();

        for v in versions.versions() {
            assert!(&latest >= v.semver().unwrap());
        }
        assert_eq!(versions.latest().unwrap().version(), "1.10.0");
    }

    #[test]
    fn test_prerelease_sorts_before_release() {
        let versions = registry("1.2.0", &["1.3.0", "1.3.0-dev", "1.2.0"]);
        assert_eq!(versions.latest().unwrap().version(), "1.3.0");

        let sorted: Vec<_> = versions.sorted().iter().map(|v| v.version()).collect();
        assert_eq!(sorted, vec!["1.2.0", "1.3.0-dev", "1.3.0"]);
    }

    #[test]
    fn test_all_prerelease_has_no_stable() {
        let versions = registry("1.0.0-rc.1", &["1.0.0-rc.1", "1.1.0-dev"]);

        assert_eq!(versions.latest().unwrap().version(), "1.1.0-dev");
        assert!(matches!(versions.latest_stable(), Err(OcsfApiError::NoStableVersion)));
    }

    #[test]
    fn test_empty_registry() {
        let versions = registry("1.0.0", &[]);

        assert!(matches!(versions.latest(), Err(OcsfApiError::EmptyRegistry)));
        assert!(matches!(versions.latest_stable(), Err(OcsfApiError::EmptyRegistry)));
        // The default still resolves.
        assert_eq!(versions.resolve(&VersionSelector::Default).unwrap().version(), "1.0.0");
    }

    #[test]
    fn test_unparseable_identifiers_are_not_ordered() {
        let versions = registry("1.0.0", &["nightly", "1.0.0", "0.9.0"]);

        assert_eq!(versions.latest().unwrap().version(), "1.0.0");
        assert_eq!(versions.sorted().last().unwrap().version(), "nightly");
        // Still selectable verbatim.
        let selector = VersionSelector::parse("nightly");
        assert_eq!(versions.resolve(&selector).unwrap().version(), "nightly");
    }

    #[test]
    fn test_resolve_exact() {
        let versions = registry("1.2.0", &["1.0.0", "1.2.0", "1.1.0", "1.3.0-dev"]);

        let resolved = versions.resolve(&"1.2.0".into()).unwrap();
        assert_eq!(resolved.version(), "1.2.0");

        let missing = versions.resolve(&"9.9.9".into());
        assert!(matches!(missing, Err(OcsfApiError::UnknownVersion(v)) if v == "9.9.9"));
    }

    #[test]
    fn test_resolve_canonical_equivalent() {
        let versions = registry("1.2.0", &["1.0.0", "1.2.0", "1.3.0-dev"]);

        assert_eq!(versions.resolve(&"v1.2.0".into()).unwrap().version(), "1.2.0");
        assert_eq!(versions.resolve(&"1.2".into()).unwrap().version(), "1.2.0");
        assert_eq!(versions.resolve(&"1".into()).unwrap().version(), "1.0.0");
        assert_eq!(versions.resolve(&"1.3-dev".into()).unwrap().version(), "1.3.0-dev");
    }

    #[test]
    fn test_resolve_keywords() {
        let versions = registry("1.1.0", &["1.0.0", "1.1.0", "1.2.0", "1.3.0-dev"]);

        assert_eq!(versions.resolve(&VersionSelector::Default).unwrap().version(), "1.1.0");
        assert_eq!(versions.resolve(&"LATEST".into()).unwrap().version(), "1.3.0-dev");
        assert_eq!(versions.resolve(&"latest_stable".into()).unwrap().version(), "1.2.0");
    }

    #[test]
    fn test_resolve_default_outside_list() {
        let versions = registry("2.0.0-alpha", &["1.0.0"]);
        assert_eq!(versions.resolve(&"2.0.0-alpha".into()).unwrap().version(), "2.0.0-alpha");
    }

    #[test]
    fn test_tie_broken_lexically() {
        let versions = registry("1.0.0", &["v1.2.0", "1.2.0"]);
        assert_eq!(versions.latest().unwrap().version(), "v1.2.0");
    }

    #[test]
    fn test_selector_parsing() {
        assert_eq!(VersionSelector::parse("Latest"), VersionSelector::Latest);
        assert_eq!(VersionSelector::parse("LATEST_STABLE"), VersionSelector::LatestStable);
        assert_eq!(VersionSelector::parse("latest-stable"), VersionSelector::LatestStable);
        assert_eq!(VersionSelector::parse(" 1.2.0 "), VersionSelector::Exact("1.2.0".into()));
        assert_eq!(VersionSelector::from(None::<&str>), VersionSelector::Default);
    }

    #[test]
    fn test_from_identifiers_picks_default() {
        let ids = vec!["1.0.0".to_string(), "1.1.0".to_string(), "1.2.0-dev".to_string()];
        let versions = SchemaVersions::from_identifiers(ids, None).unwrap();
        assert_eq!(versions.default_version().version(), "1.1.0");

        let only_pre = SchemaVersions::from_identifiers(vec!["0.1.0-dev".to_string()], None).unwrap();
        assert_eq!(only_pre.default_version().version(), "0.1.0-dev");

        let empty = SchemaVersions::from_identifiers(Vec::new(), None);
        assert!(matches!(empty, Err(OcsfApiError::EmptyRegistry)));
    }

    #[test]
    fn test_canonicalize() {
        assert_eq!(canonicalize("v1.2.3"), Some(Version::new(1, 2, 3)));
        assert_eq!(canonicalize("2"), Some(Version::new(2, 0, 0)));
        assert_eq!(canonicalize("1.3-dev").unwrap().pre.as_str(), "dev");
        assert_eq!(canonicalize("not-a-version"), None);
        assert_eq!(canonicalize(""), None);
    }

    fn version_identifier() -> impl Strategy<Value = String> {
        let pre = prop::option::of(prop_oneof![Just("dev"), Just("alpha"), Just("rc.1"), Just("rc.2")]);
        (0u64..4, 0u64..4, 0u64..4, pre).prop_map(|(major, minor, patch, pre)| match pre {
            Some(pre) => format!("{major}.{minor}.{patch}-{pre}"),
            None => format!("{major}.{minor}.{patch}"),
        })
    }

    fn registry_of(identifiers: &[String]) -> SchemaVersions {
        SchemaVersions::new(
            SchemaVersion::new("0.0.0"),
            identifiers.iter().map(|v| SchemaVersion::new(v.as_str())).collect(),
        )
    }

    proptest! {
        /// `latest` is at least every member, pre-releases included.
        #[test]
        fn latest_is_greatest(identifiers in prop::collection::vec(version_identifier(), 1..12)) {
            let versions = registry_of(&identifiers);
            let latest = versions.latest().unwrap();
            prop_assert!(identifiers.contains(&latest.version().to_string()));

            for v in versions.versions() {
                prop_assert!(latest.semver().unwrap() >= v.semver().unwrap());
            }
        }

        /// `latest_stable` is stable and at least every stable member; it
        /// fails with `NoStableVersion` exactly when every version is a pre-release.
        #[test]
        fn latest_stable_is_greatest_stable(identifiers in prop::collection::vec(version_identifier(), 1..12)) {
            let versions = registry_of(&identifiers);
            let all_prerelease = versions.versions().iter().all(|v| v.is_prerelease());

            match versions.latest_stable() {
                Ok(stable) => {
                    prop_assert!(!all_prerelease);
                    prop_assert!(stable.is_stable());
                    for v in versions.versions().iter().filter(|v| v.is_stable()) {
                        prop_assert!(stable.semver().unwrap() >= v.semver().unwrap());
                    }
                }
                Err(OcsfApiError::NoStableVersion) => {
                    prop_assert!(all_prerelease);
                }
                Err(other) => {
                    prop_assert!(false, "unexpected error: {}", other);
                }
            }
        }
    }

    #[test]
    fn test_serde_as_plain_string() {
        let v: SchemaVersion = serde_json::from_str("\"1.3.0-dev\"").unwrap();
        assert!(v.is_prerelease());
        assert_eq!(serde_json::to_string(&v).unwrap(), "\"1.3.0-dev\"");
    }
}
