use std::borrow::Cow;
use std::path::{Path, PathBuf};

use base64::Engine as _;

use crate::errors::{Result, ViewerError};

/// Where an asset's bytes come from.
///
/// Relative references inside a model (external buffers, images) are
/// resolved against the model's own source with [`AssetSource::join`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetSource {
    File(PathBuf),
    #[cfg(feature = "http")]
    Http(url::Url),
}

impl AssetSource {
    /// Interprets `source` as a URL when it carries an `http(s)://` scheme and
    /// as a file path otherwise.
    ///
    /// On the web there is no file system: relative paths are resolved
    /// against the page location.
    pub fn parse(source: &str) -> Result<Self> {
        if is_http(source) {
            #[cfg(feature = "http")]
            {
                return Ok(Self::Http(url::Url::parse(source)?));
            }
            #[cfg(not(feature = "http"))]
            {
                return Err(ViewerError::Http(format!(
                    "cannot load '{source}': the `http` feature is disabled"
                )));
            }
        }

        #[cfg(all(target_arch = "wasm32", feature = "http"))]
        {
            let base = page_location()?;
            Ok(Self::Http(url::Url::parse(&base)?.join(source)?))
        }
        #[cfg(not(all(target_arch = "wasm32", feature = "http")))]
        {
            Ok(Self::File(PathBuf::from(source)))
        }
    }

    /// Resolves `uri` relative to this source.
    pub fn join(&self, uri: &str) -> Result<Self> {
        match self {
            Self::File(path) => {
                if is_http(uri) {
                    return Self::parse(uri);
                }
                let base = path.parent().unwrap_or_else(|| Path::new(""));
                Ok(Self::File(base.join(percent_decode(uri).as_ref())))
            }
            #[cfg(feature = "http")]
            Self::Http(url) => Ok(Self::Http(url.join(uri)?)),
        }
    }

    /// File name component, used to name the loaded model.
    #[must_use]
    pub fn filename(&self) -> Cow<'_, str> {
        match self {
            Self::File(path) => path
                .file_name()
                .map_or_else(|| path.to_string_lossy(), |n| n.to_string_lossy()),
            #[cfg(feature = "http")]
            Self::Http(url) => url
                .path_segments()
                .and_then(|mut s| s.next_back())
                .filter(|s| !s.is_empty())
                .map_or(Cow::Borrowed(url.as_str()), |s| {
                    Cow::Owned(percent_decode(s).into_owned())
                }),
        }
    }

    pub async fn read_bytes(&self) -> Result<Vec<u8>> {
        match self {
            Self::File(path) => read_file(path).await,
            #[cfg(feature = "http")]
            Self::Http(url) => fetch(url).await,
        }
    }
}

impl std::fmt::Display for AssetSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            #[cfg(feature = "http")]
            Self::Http(url) => write!(f, "{url}"),
        }
    }
}

/// Reads a URI referenced from inside a model: either an inline `data:` URI
/// or a path relative to `base`.
pub async fn read_uri(base: &AssetSource, uri: &str) -> Result<Vec<u8>> {
    if uri.starts_with("data:") {
        return decode_data_uri(uri);
    }
    base.join(uri)?.read_bytes().await
}

/// Decodes an RFC 2397 `data:` URI.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| ViewerError::DataUri("missing `data:` prefix".into()))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| ViewerError::DataUri("missing `,` separator".into()))?;

    if meta.ends_with(";base64") {
        Ok(base64::engine::general_purpose::STANDARD.decode(payload)?)
    } else {
        Ok(percent_decode(payload).into_owned().into_bytes())
    }
}

fn is_http(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

fn percent_decode(input: &str) -> Cow<'_, str> {
    if !input.contains('%') {
        return Cow::Borrowed(input);
    }
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && let Some(hex) = input.get(i + 1..i + 3)
            && let Ok(byte) = u8::from_str_radix(hex, 16)
        {
            out.push(byte);
            i += 3;
            continue;
        }
        out.push(bytes[i]);
        i += 1;
    }
    Cow::Owned(String::from_utf8_lossy(&out).into_owned())
}

#[cfg(not(target_arch = "wasm32"))]
async fn read_file(path: &Path) -> Result<Vec<u8>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ViewerError::AssetNotFound(path.display().to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(target_arch = "wasm32")]
#[allow(clippy::unused_async)]
async fn read_file(path: &Path) -> Result<Vec<u8>> {
    Err(ViewerError::Wasm(format!(
        "no file system on the web, cannot read {}",
        path.display()
    )))
}

#[cfg(feature = "http")]
async fn fetch(url: &url::Url) -> Result<Vec<u8>> {
    log::debug!("GET {url}");
    let response = ehttp::fetch_async(ehttp::Request::get(url.as_str()))
        .await
        .map_err(ViewerError::Http)?;

    if response.status == 404 {
        return Err(ViewerError::AssetNotFound(url.to_string()));
    }
    if !response.ok {
        return Err(ViewerError::HttpStatus {
            url: url.to_string(),
            status: response.status,
        });
    }
    Ok(response.bytes)
}

#[cfg(all(target_arch = "wasm32", feature = "http"))]
fn page_location() -> Result<String> {
    web_sys::window()
        .ok_or_else(|| ViewerError::Wasm("no global `window`".into()))?
        .location()
        .href()
        .map_err(|e| ViewerError::Wasm(format!("{e:?}")))
}
