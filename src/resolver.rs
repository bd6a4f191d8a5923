use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::error::{OwlFhirError, Result};

/// A caller-supplied pointer to an OWL document: a local path or an
/// http(s) URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OntologyReference {
    Local(PathBuf),
    Remote(Url),
}

impl OntologyReference {
    /// Interprets the input as a URL when it carries an http(s) scheme and
    /// a host, as the original CLI contract does; everything else is a
    /// filesystem path.
    pub fn parse(input: &str) -> Self {
        if let Ok(url) = Url::parse(input) {
            if matches!(url.scheme(), "http" | "https") && url.has_host() {
                return Self::Remote(url);
            }
        }
        Self::Local(PathBuf::from(input))
    }

    /// File-name portion, used for format detection and id derivation.
    pub fn file_name(&self) -> Option<String> {
        match self {
            Self::Local(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned()),
            Self::Remote(url) => url
                .path_segments()
                .and_then(|mut segments| segments.next_back())
                .filter(|segment| !segment.is_empty())
                .map(str::to_string),
        }
    }

    /// File stem without format extensions, the default `CodeSystem.id`
    /// source. Only known ontology suffixes are stripped, so dotted
    /// version stamps like `mondo.2023-01.owl` keep their date.
    pub fn stem(&self) -> Option<String> {
        const FORMAT_EXTENSIONS: &[&str] = &["owl", "rdf", "xml", "json", "obographs", "ttl", "obo"];

        let name = self.file_name()?;
        let mut stem = name.as_str();
        while let Some((rest, ext)) = stem.rsplit_once('.') {
            if rest.is_empty() || !FORMAT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()) {
                break;
            }
            stem = rest;
        }
        if stem.is_empty() {
            None
        } else {
            Some(stem.to_string())
        }
    }
}

impl fmt::Display for OntologyReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(path) => write!(f, "{}", path.display()),
            Self::Remote(url) => write!(f, "{url}"),
        }
    }
}

impl From<&str> for OntologyReference {
    fn from(input: &str) -> Self {
        Self::parse(input)
    }
}

impl From<PathBuf> for OntologyReference {
    fn from(path: PathBuf) -> Self {
        Self::Local(path)
    }
}

/// Fetches ontology text for a reference.
#[async_trait]
pub trait OntologyFetcher: Send + Sync {
    async fn fetch(&self, reference: &OntologyReference) -> Result<String>;
}

/// Reads local files; any I/O failure is a Resolution error.
#[derive(Debug, Clone, Default)]
pub struct LocalFetcher;

#[async_trait]
impl OntologyFetcher for LocalFetcher {
    async fn fetch(&self, reference: &OntologyReference) -> Result<String> {
        match reference {
            OntologyReference::Local(path) => read_local(path).await,
            OntologyReference::Remote(url) => Err(OwlFhirError::resolution_without_source(
                format!("{url} is remote and this fetcher only reads local files"),
            )),
        }
    }
}

async fn read_local(path: &Path) -> Result<String> {
    debug!(path = %path.display(), "reading local ontology");
    tokio::fs::read_to_string(path)
        .await
        .map_err(|err| OwlFhirError::resolution(path.display().to_string(), err))
}

/// Default fetcher: local reads plus remote downloads with an on-disk
/// cache keyed by the URL.
#[derive(Debug, Clone)]
pub struct ReferenceFetcher {
    #[cfg(feature = "remote")]
    client: reqwest::Client,
    cache_dir: Option<PathBuf>,
    use_cached: bool,
}

impl Default for ReferenceFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceFetcher {
    pub fn new() -> Self {
        Self {
            #[cfg(feature = "remote")]
            client: reqwest::Client::new(),
            cache_dir: dirs::cache_dir().map(|dir| dir.join("owl-on-fhir")),
            use_cached: false,
        }
    }

    /// Reuse previously downloaded ontologies instead of re-fetching.
    pub fn with_cached_downloads(mut self, use_cached: bool) -> Self {
        self.use_cached = use_cached;
        self
    }

    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(cache_dir.into());
        self
    }

    #[cfg(feature = "remote")]
    fn cache_path(&self, url: &Url) -> Option<PathBuf> {
        use sha2::{Digest, Sha256};
        let dir = self.cache_dir.as_ref()?;
        let mut hasher = Sha256::new();
        hasher.update(url.as_str().as_bytes());
        let digest = format!("{:x}", hasher.finalize());
        let extension = url
            .path()
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| ext.len() <= 8)
            .unwrap_or("owl");
        Some(dir.join(format!("{}.{extension}", &digest[..16])))
    }

    #[cfg(feature = "remote")]
    async fn download(&self, url: &Url) -> Result<String> {
        let cache_path = self.cache_path(url);

        if self.use_cached {
            if let Some(cached) = &cache_path {
                if let Ok(text) = tokio::fs::read_to_string(cached).await {
                    debug!(url = %url, cache = %cached.display(), "using cached download");
                    return Ok(text);
                }
            }
        }

        debug!(url = %url, "downloading ontology");
        let response = self.client.get(url.clone()).send().await?;
        if !response.status().is_success() {
            return Err(OwlFhirError::download(format!(
                "GET {url} returned {}",
                response.status()
            )));
        }
        let text = response.text().await?;

        // Cache write failures are not fatal; the download already succeeded.
        if let Some(cached) = &cache_path {
            if let Some(parent) = cached.parent() {
                let _ = tokio::fs::create_dir_all(parent).await;
            }
            let _ = tokio::fs::write(cached, &text).await;
        }
        Ok(text)
    }
}

#[async_trait]
impl OntologyFetcher for ReferenceFetcher {
    async fn fetch(&self, reference: &OntologyReference) -> Result<String> {
        match reference {
            OntologyReference::Local(path) => read_local(path).await,
            #[cfg(feature = "remote")]
            OntologyReference::Remote(url) => self.download(url).await,
            #[cfg(not(feature = "remote"))]
            OntologyReference::Remote(url) => Err(OwlFhirError::resolution_without_source(
                format!("{url} requires the `remote` feature"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_become_remote_references() {
        assert!(matches!(
            OntologyReference::parse("https://example.org/onto/hp.owl"),
            OntologyReference::Remote(_)
        ));
        assert!(matches!(
            OntologyReference::parse("data/hp.owl"),
            OntologyReference::Local(_)
        ));
        // A Windows drive or scheme-less string stays a path.
        assert!(matches!(
            OntologyReference::parse("file.owl"),
            OntologyReference::Local(_)
        ));
    }

    #[test]
    fn stem_strips_only_format_extensions() {
        assert_eq!(
            OntologyReference::parse("out/mondo.owl").stem().as_deref(),
            Some("mondo")
        );
        assert_eq!(
            OntologyReference::parse("https://example.org/x/hp.obographs.json")
                .stem()
                .as_deref(),
            Some("hp")
        );
        // A dotted version stamp is not an extension and stays in the id.
        assert_eq!(
            OntologyReference::parse("out/mondo.2023-01.owl")
                .stem()
                .as_deref(),
            Some("mondo.2023-01")
        );
    }

    #[tokio::test]
    async fn missing_file_is_a_resolution_error() {
        let err = LocalFetcher
            .fetch(&OntologyReference::parse("/definitely/not/here.owl"))
            .await
            .unwrap_err();
        assert!(matches!(err, OwlFhirError::Resolution { .. }));
    }

    #[cfg(feature = "remote")]
    fn seed_cache(fetcher: &ReferenceFetcher, url: &Url, content: &str) -> PathBuf {
        let path = fetcher.cache_path(url).unwrap();
        std::fs::write(&path, content).unwrap();
        path
    }

    #[cfg(feature = "remote")]
    #[test]
    fn cache_path_keys_on_url_digest_and_extension() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = ReferenceFetcher::new().with_cache_dir(dir.path());

        let url = Url::parse("http://example.org/onto/hp.owl").unwrap();
        let path = fetcher.cache_path(&url).unwrap();
        assert!(path.starts_with(dir.path()));
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.ends_with(".owl"));
        assert_eq!(name.len(), "0123456789abcdef.owl".len());

        // Same URL, same key; different URL, different key.
        assert_eq!(fetcher.cache_path(&url), Some(path.clone()));
        let other = Url::parse("http://example.org/onto/mondo.owl").unwrap();
        assert_ne!(fetcher.cache_path(&other), Some(path));
    }

    #[cfg(feature = "remote")]
    #[tokio::test]
    async fn cached_download_is_reused_without_network() {
        let dir = tempfile::tempdir().unwrap();
        // An unroutable port; any network attempt fails immediately.
        let url = Url::parse("http://127.0.0.1:1/onto/hp.owl").unwrap();

        let fetcher = ReferenceFetcher::new()
            .with_cache_dir(dir.path())
            .with_cached_downloads(true);
        seed_cache(&fetcher, &url, "<cached/>");

        let text = fetcher
            .fetch(&OntologyReference::Remote(url))
            .await
            .unwrap();
        assert_eq!(text, "<cached/>");
    }

    #[cfg(feature = "remote")]
    #[tokio::test]
    async fn cache_is_ignored_unless_reuse_is_requested() {
        let dir = tempfile::tempdir().unwrap();
        let url = Url::parse("http://127.0.0.1:1/onto/hp.owl").unwrap();

        let fetcher = ReferenceFetcher::new().with_cache_dir(dir.path());
        seed_cache(&fetcher, &url, "<cached/>");

        let err = fetcher
            .fetch(&OntologyReference::Remote(url))
            .await
            .unwrap_err();
        assert!(matches!(err, OwlFhirError::Download { .. }));
    }
}
