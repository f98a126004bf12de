use derive_more::{AsRef, Deref, Display, From, Into};
use freedesktop_icons::lookup;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Either a themed icon name (`"image-x-generic"`), an absolute image path, or a plain
/// glyph that is drawn as text when nothing resolves.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct IconName(String);

crate::impl_string_newtype!(IconName);

const ICON_LOOKUP_SIZE: u16 = 256;

static RESOLVED: OnceLock<RwLock<HashMap<IconName, Option<PathBuf>>>> = OnceLock::new();

fn lookup_uncached(icon_name: &IconName) -> Option<PathBuf> {
    if icon_name.is_empty() {
        return None;
    }

    let path = Path::new(icon_name.as_str());
    if path.is_absolute() {
        return path.exists().then(|| path.to_path_buf());
    }

    lookup(icon_name.as_str())
        .with_size(ICON_LOOKUP_SIZE)
        .with_scale(1)
        .find()
}

/// Resolves an icon to an image file, memoising misses as well as hits since theme
/// lookups walk the filesystem.
pub fn find_icon_path(icon_name: &IconName) -> Option<PathBuf> {
    let cache = RESOLVED.get_or_init(|| RwLock::new(HashMap::new()));
    if let Some(hit) = cache.read().get(icon_name) {
        return hit.clone();
    }

    let resolved = lookup_uncached(icon_name);
    cache.write().insert(icon_name.clone(), resolved.clone());
    resolved
}

/// Forgets every memoised lookup, e.g. after the icon theme changed.
pub fn clear_cache() {
    if let Some(cache) = RESOLVED.get() {
        cache.write().clear();
    }
}
