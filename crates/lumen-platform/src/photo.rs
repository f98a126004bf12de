use derive_more::{AsRef, Deref, Display, From, Into};
use directories::UserDirs;
use fs_err as fs;
use serde::{Deserialize, Serialize};
use serde_with::DeserializeFromStr;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;
use tempfile::NamedTempFile;
use thiserror::Error;
use url::Url;

const FILE_SCHEME: &str = "file://";

/// Schemes used by photo pickers for assets that live inside a platform library rather
/// than at a readable path.
const LIBRARY_SCHEMES: &[&str] = &["library://", "ph://", "assets-library://", "content://"];

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct AssetId(String);

crate::impl_string_newtype!(AssetId);

/// An opaque photo reference as handed over by a picker, a command line or a config file.
#[derive(Debug, Clone, PartialEq, Eq, DeserializeFromStr)]
pub enum PhotoRef {
    /// Already a `file://` URI.
    FileUri(LoadableUri),
    /// An absolute filesystem path without a scheme.
    Path(PathBuf),
    /// An asset that must be copied out of the photo library first.
    Library(AssetId),
}

impl FromStr for PhotoRef {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ResolveError::EmptyReference);
        }

        if s.starts_with(FILE_SCHEME) {
            return LoadableUri::parse(s).map(Self::FileUri);
        }

        if let Some(id) = LIBRARY_SCHEMES
            .iter()
            .find_map(|scheme| s.strip_prefix(scheme))
        {
            let id = id.trim_matches('/');
            return if id.is_empty() {
                Err(ResolveError::UnsupportedReference(s.to_string()))
            } else {
                Ok(Self::Library(AssetId::from(id)))
            };
        }

        let path = Path::new(s);
        if path.is_absolute() {
            Ok(Self::Path(path.to_path_buf()))
        } else {
            Err(ResolveError::UnsupportedReference(s.to_string()))
        }
    }
}

/// A percent-encoded `file://` URI that an image loader can open directly, kept together
/// with the decoded local path it names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoadableUri {
    uri: Url,
    path: PathBuf,
}

impl LoadableUri {
    /// Encodes an absolute path. Relative paths have no URI form.
    pub fn from_path(path: &Path) -> Result<Self, ResolveError> {
        let uri = Url::from_file_path(path)
            .map_err(|()| ResolveError::UnsupportedReference(path.display().to_string()))?;
        Ok(Self {
            uri,
            path: path.to_path_buf(),
        })
    }

    /// Accepts local `file://` URIs only; remote hosts cannot be opened as paths.
    pub fn parse(s: &str) -> Result<Self, ResolveError> {
        let unsupported = || ResolveError::UnsupportedReference(s.to_string());
        let uri = Url::parse(s).map_err(|_| unsupported())?;
        if uri.scheme() != "file" {
            return Err(unsupported());
        }
        let path = uri.to_file_path().map_err(|()| unsupported())?;
        Ok(Self { uri, path })
    }

    pub fn as_str(&self) -> &str {
        self.uri.as_str()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn to_path(&self) -> PathBuf {
        self.path.clone()
    }
}

impl fmt::Display for LoadableUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.uri.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("photo reference is empty")]
    EmptyReference,
    #[error("unsupported photo reference '{0}'")]
    UnsupportedReference(String),
    #[error("library asset '{0}' not found")]
    AssetNotFound(AssetId),
    #[error("no cache directory available for library copies")]
    CacheDirNotFound,
    #[error("failed to copy library asset '{asset}': {source}")]
    Copy {
        asset: AssetId,
        #[source]
        source: std::io::Error,
    },
}

/// Turns any [`PhotoRef`] into something loadable, or says why it cannot.
pub trait PathResolver {
    fn resolve(&self, reference: &PhotoRef) -> Result<LoadableUri, ResolveError>;
}

/// Locates library assets on disk.
pub trait PhotoLibrary {
    fn locate(&self, asset: &AssetId) -> Option<PathBuf>;
}

/// A photo library backed by a plain directory; asset ids are paths relative to it.
#[derive(Debug, Clone)]
pub struct DirectoryLibrary {
    root: PathBuf,
}

impl DirectoryLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The user's pictures directory, if the platform defines one.
    pub fn pictures() -> Option<Self> {
        UserDirs::new()
            .and_then(|dirs| dirs.picture_dir().map(Path::to_path_buf))
            .map(Self::new)
    }
}

impl PhotoLibrary for DirectoryLibrary {
    fn locate(&self, asset: &AssetId) -> Option<PathBuf> {
        let relative = Path::new(asset.as_str());
        // ids must stay inside the library root
        if relative
            .components()
            .any(|c| !matches!(c, std::path::Component::Normal(_)))
        {
            return None;
        }
        let path = self.root.join(relative);
        path.is_file().then_some(path)
    }
}

/// Resolves local references in place and copies library assets into a cache directory.
pub struct CachingResolver<L> {
    library: L,
    cache_dir: Option<PathBuf>,
}

impl<L: PhotoLibrary> CachingResolver<L> {
    pub fn new(library: L, cache_dir: Option<PathBuf>) -> Self {
        Self { library, cache_dir }
    }

    /// Uses `$XDG_CACHE_HOME/lumen/photos` for copies.
    pub fn with_default_cache(library: L) -> Self {
        let cache_dir = xdg::BaseDirectories::new()
            .get_cache_home()
            .map(|home| home.join("lumen").join("photos"));
        Self::new(library, cache_dir)
    }

    /// Mirrors the asset id as a relative path under the cache directory, so distinct ids
    /// never share a cache file.
    fn cache_path(cache_dir: &Path, asset: &AssetId) -> Result<PathBuf, ResolveError> {
        let relative = Path::new(asset.as_str());
        let mut components = relative.components().peekable();
        if components.peek().is_none() || components.any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(ResolveError::UnsupportedReference(asset.to_string()));
        }
        Ok(cache_dir.join(relative))
    }

    fn copy_to_cache(&self, asset: &AssetId) -> Result<PathBuf, ResolveError> {
        let source = self
            .library
            .locate(asset)
            .ok_or_else(|| ResolveError::AssetNotFound(asset.clone()))?;
        let cache_dir = self
            .cache_dir
            .as_ref()
            .ok_or(ResolveError::CacheDirNotFound)?;
        let target = Self::cache_path(cache_dir, asset)?;

        if target.is_file() {
            log::debug!("Reusing cached copy of '{}'", asset);
            return Ok(target);
        }

        // stage next to the target so a failed copy never leaves a partial file behind
        let copy = || -> std::io::Result<()> {
            let parent = target.parent().unwrap_or(cache_dir);
            fs::create_dir_all(parent)?;
            let mut staged = NamedTempFile::new_in(parent)?;
            std::io::copy(&mut fs::File::open(&source)?, &mut staged)?;
            staged.persist(&target).map_err(|e| e.error)?;
            Ok(())
        };
        copy().map_err(|source| ResolveError::Copy {
            asset: asset.clone(),
            source,
        })?;

        log::debug!("Copied '{}' to {}", asset, target.display());
        Ok(target)
    }
}

impl<L: PhotoLibrary> PathResolver for CachingResolver<L> {
    fn resolve(&self, reference: &PhotoRef) -> Result<LoadableUri, ResolveError> {
        match reference {
            PhotoRef::FileUri(uri) => Ok(uri.clone()),
            PhotoRef::Path(path) => LoadableUri::from_path(path),
            PhotoRef::Library(asset) => LoadableUri::from_path(&self.copy_to_cache(asset)?),
        }
    }
}

/// Library that never contains anything; used when no pictures directory exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyLibrary;

impl PhotoLibrary for EmptyLibrary {
    fn locate(&self, _asset: &AssetId) -> Option<PathBuf> {
        None
    }
}

/// The resolver for the current user: pictures directory as library, XDG cache for copies.
pub fn default_resolver() -> Box<dyn PathResolver> {
    match DirectoryLibrary::pictures() {
        Some(library) => Box::new(CachingResolver::with_default_cache(library)),
        None => Box::new(CachingResolver::with_default_cache(EmptyLibrary)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn resolver_in(dir: &TempDir) -> CachingResolver<DirectoryLibrary> {
        let library = dir.path().join("library");
        fs::create_dir_all(&library).unwrap();
        CachingResolver::new(
            DirectoryLibrary::new(library),
            Some(dir.path().join("cache")),
        )
    }

    #[test]
    fn test_reference_parsing() {
        let cases = vec![
            (
                "file:///tmp/a.jpg",
                PhotoRef::FileUri(LoadableUri::from_path(Path::new("/tmp/a.jpg")).unwrap()),
            ),
            (
                "file://localhost/tmp/a.jpg",
                PhotoRef::FileUri(LoadableUri::from_path(Path::new("/tmp/a.jpg")).unwrap()),
            ),
            ("/tmp/a.jpg", PhotoRef::Path(PathBuf::from("/tmp/a.jpg"))),
            ("  /tmp/b.png ", PhotoRef::Path(PathBuf::from("/tmp/b.png"))),
            ("library://2024/a.jpg", PhotoRef::Library(AssetId::from("2024/a.jpg"))),
            ("ph://ABC-123", PhotoRef::Library(AssetId::from("ABC-123"))),
            (
                "assets-library://asset/x.JPG",
                PhotoRef::Library(AssetId::from("asset/x.JPG")),
            ),
            ("content://media/1", PhotoRef::Library(AssetId::from("media/1"))),
        ];

        for (input, expected) in cases {
            assert_eq!(input.parse::<PhotoRef>().unwrap(), expected, "{input}");
        }
    }

    #[test]
    fn test_reference_rejections() {
        assert!(matches!(
            "".parse::<PhotoRef>(),
            Err(ResolveError::EmptyReference)
        ));
        for input in [
            "photos/a.jpg",
            "https://x/a.jpg",
            "file://relative",
            "file://server/share/a.jpg",
            "ph://",
        ] {
            assert!(
                matches!(
                    input.parse::<PhotoRef>(),
                    Err(ResolveError::UnsupportedReference(_))
                ),
                "{input}"
            );
        }
    }

    #[test]
    fn test_reference_deserialization() {
        let r: PhotoRef = serde_json::from_str("\"/srv/p.jpg\"").unwrap();
        assert_eq!(r, PhotoRef::Path(PathBuf::from("/srv/p.jpg")));
        assert!(serde_json::from_str::<PhotoRef>("\"p.jpg\"").is_err());
    }

    #[test]
    fn test_local_references_pass_through() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver_in(&dir);

        let uri = resolver
            .resolve(&"file:///tmp/a.jpg".parse().unwrap())
            .unwrap();
        assert_eq!(uri.as_str(), "file:///tmp/a.jpg");

        let uri = resolver.resolve(&"/tmp/a.jpg".parse().unwrap()).unwrap();
        assert_eq!(uri.as_str(), "file:///tmp/a.jpg");
        assert_eq!(uri.to_path(), PathBuf::from("/tmp/a.jpg"));
    }

    #[test]
    fn test_library_asset_is_copied_once() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver_in(&dir);
        let album = dir.path().join("library").join("album");
        fs::create_dir_all(&album).unwrap();
        fs::write(album.join("a.jpg"), b"jpeg").unwrap();

        let reference: PhotoRef = "library://album/a.jpg".parse().unwrap();
        let uri = resolver.resolve(&reference).unwrap();
        let copied = uri.to_path();
        assert_eq!(copied, dir.path().join("cache").join("album").join("a.jpg"));
        assert_eq!(fs::read(&copied).unwrap(), b"jpeg");

        // a second resolve reuses the cached copy even if the source changes
        fs::write(album.join("a.jpg"), b"changed").unwrap();
        assert_eq!(resolver.resolve(&reference).unwrap(), uri);
        assert_eq!(fs::read(&copied).unwrap(), b"jpeg");
    }

    #[test]
    fn test_uris_are_percent_encoded() {
        let dir = TempDir::new().unwrap();
        let photo = dir.path().join("my photo #1.jpg");
        fs::write(&photo, b"jpeg").unwrap();

        let uri = LoadableUri::from_path(&photo).unwrap();
        assert!(uri.as_str().ends_with("/my%20photo%20%231.jpg"), "{uri}");
        assert_eq!(uri.to_path(), photo);

        // picker-style URIs come in encoded and must name the real file
        let reference: PhotoRef = uri.as_str().parse().unwrap();
        let resolved = resolver_in(&dir).resolve(&reference).unwrap();
        assert_eq!(resolved.path(), photo.as_path());
        assert!(resolved.path().is_file());

        let plain: PhotoRef = photo.to_string_lossy().parse().unwrap();
        assert_eq!(resolver_in(&dir).resolve(&plain).unwrap(), uri);
    }

    #[test]
    fn test_similar_asset_ids_get_distinct_copies() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver_in(&dir);
        let library = dir.path().join("library");
        fs::create_dir_all(library.join("album")).unwrap();
        fs::write(library.join("album").join("a.jpg"), b"nested").unwrap();
        fs::write(library.join("album_a.jpg"), b"flat").unwrap();

        let nested = resolver
            .resolve(&"library://album/a.jpg".parse().unwrap())
            .unwrap();
        let flat = resolver
            .resolve(&"library://album_a.jpg".parse().unwrap())
            .unwrap();
        assert_ne!(nested, flat);
        assert_eq!(fs::read(nested.path()).unwrap(), b"nested");
        assert_eq!(fs::read(flat.path()).unwrap(), b"flat");
    }

    /// Library whose every asset lives at one fixed path.
    struct FixedLibrary(PathBuf);

    impl PhotoLibrary for FixedLibrary {
        fn locate(&self, _asset: &AssetId) -> Option<PathBuf> {
            Some(self.0.clone())
        }
    }

    #[test]
    fn test_failed_copy_leaves_no_cached_file() {
        let dir = TempDir::new().unwrap();
        let cache = dir.path().join("cache");
        // a directory opens fine but fails on the first read
        let unreadable = dir.path().join("not-a-photo");
        fs::create_dir_all(&unreadable).unwrap();
        let resolver = CachingResolver::new(FixedLibrary(unreadable.clone()), Some(cache.clone()));
        let reference: PhotoRef = "library://a.jpg".parse().unwrap();

        for _ in 0..2 {
            assert!(matches!(
                resolver.resolve(&reference),
                Err(ResolveError::Copy { .. })
            ));
        }
        assert!(!cache.join("a.jpg").exists());
        assert_eq!(fs::read_dir(&cache).unwrap().count(), 0);

        // once the source is readable the copy goes through
        fs::remove_dir(&unreadable).unwrap();
        fs::write(&unreadable, b"jpeg").unwrap();
        let uri = resolver.resolve(&reference).unwrap();
        assert_eq!(fs::read(uri.path()).unwrap(), b"jpeg");
    }

    #[test]
    fn test_library_failures_surface() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver_in(&dir);
        let missing: PhotoRef = "ph://nope".parse().unwrap();
        assert!(matches!(
            resolver.resolve(&missing),
            Err(ResolveError::AssetNotFound(_))
        ));

        let escaping: PhotoRef = "library://../secret.jpg".parse().unwrap();
        assert!(matches!(
            resolver.resolve(&escaping),
            Err(ResolveError::AssetNotFound(_))
        ));

        fs::write(dir.path().join("library").join("a.jpg"), b"x").unwrap();
        let library = DirectoryLibrary::new(dir.path().join("library"));
        let no_cache = CachingResolver::new(library, None);
        assert!(matches!(
            no_cache.resolve(&"ph://a.jpg".parse().unwrap()),
            Err(ResolveError::CacheDirNotFound)
        ));

        // cache "directory" is a file, so the copy itself fails
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"").unwrap();
        let blocked = CachingResolver::new(
            DirectoryLibrary::new(dir.path().join("library")),
            Some(blocker.join("cache")),
        );
        assert!(matches!(
            blocked.resolve(&"ph://a.jpg".parse().unwrap()),
            Err(ResolveError::Copy { .. })
        ));
    }
}
