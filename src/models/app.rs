use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use image::{ImageFormat, Rgba, RgbaImage};
use serde::Serialize;

use crate::platform::icon_extractor::IconResolver;
use crate::utils::{app_lifecycle, AppResult};

/// Suffix that marks a directory entry as an application bundle.
pub const BUNDLE_SUFFIX: &str = ".app";

/// Edge length of normalized icons, in pixels.
pub const DEFAULT_ICON_SIZE: u32 = 64;

/// One installed application, as seen by the last scan.
///
/// Equality, hashing and identity depend only on the bundle path. The icon
/// is resolved lazily, once per instance.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRecord {
    identity: PathBuf,
    display_name: String,
    bundle_identifier: Option<String>,
    #[serde(skip)]
    icon: OnceLock<Arc<AppIcon>>,
}

impl ApplicationRecord {
    /// Returns `None` for an empty path.
    pub(crate) fn new(
        identity: PathBuf,
        display_name: String,
        bundle_identifier: Option<String>,
    ) -> Option<Self> {
        if identity.as_os_str().is_empty() {
            return None;
        }
        Some(Self {
            identity,
            display_name,
            bundle_identifier,
            icon: OnceLock::new(),
        })
    }

    /// Absolute bundle path; the record's unique key.
    pub fn identity(&self) -> &Path {
        &self.identity
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn bundle_identifier(&self) -> Option<&str> {
        self.bundle_identifier.as_deref()
    }

    /// Resolve the icon on first call and return the memoized handle after.
    /// Never fails: unresolvable icons become the generic placeholder.
    pub fn icon(&self, resolver: &dyn IconResolver) -> Arc<AppIcon> {
        self.icon
            .get_or_init(|| {
                let size = resolver.icon_size();
                match resolver.resolve(&self.identity, size) {
                    Ok(icon) => Arc::new(icon),
                    Err(e) => {
                        log::debug!("Icon fallback for {}: {}", self.identity.display(), e);
                        Arc::new(AppIcon::placeholder(size))
                    }
                }
            })
            .clone()
    }

    /// Open the bundle with the system's default handler.
    pub fn launch(&self) {
        log::info!("Launching {}", self.identity.display());
        app_lifecycle::open_app(&self.identity);
    }
}

impl PartialEq for ApplicationRecord {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity
    }
}

impl Eq for ApplicationRecord {}

impl Hash for ApplicationRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity.hash(state);
    }
}

/// Square RGBA bitmap at a normalized size.
#[derive(Debug, Clone, PartialEq)]
pub struct AppIcon {
    pub image: RgbaImage,
    pub placeholder: bool,
}

impl AppIcon {
    pub fn new(image: RgbaImage) -> Self {
        Self { image, placeholder: false }
    }

    /// Generic icon: a rounded grey tile.
    pub fn placeholder(size: u32) -> Self {
        let size = size.max(1);
        let radius = (size as f32 * 0.2).max(1.0);
        let image = RgbaImage::from_fn(size, size, |x, y| {
            if in_rounded_square(x, y, size, radius) {
                Rgba([142, 142, 147, 255])
            } else {
                Rgba([0, 0, 0, 0])
            }
        });
        Self { image, placeholder: true }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn to_png(&self) -> AppResult<Vec<u8>> {
        let mut buf = std::io::Cursor::new(Vec::new());
        self.image.write_to(&mut buf, ImageFormat::Png)?;
        Ok(buf.into_inner())
    }
}

fn in_rounded_square(x: u32, y: u32, size: u32, radius: f32) -> bool {
    let (fx, fy) = (x as f32 + 0.5, y as f32 + 0.5);
    let max = size as f32;
    let cx = fx.clamp(radius, max - radius);
    let cy = fy.clamp(radius, max - radius);
    let (dx, dy) = (fx - cx, fy - cy);
    dx * dx + dy * dy <= radius * radius
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingResolver {
        calls: AtomicUsize,
        fail: bool,
    }

    impl IconResolver for CountingResolver {
        fn icon_size(&self) -> u32 {
            16
        }

        fn resolve(&self, _app_path: &Path, size: u32) -> AppResult<AppIcon> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(crate::utils::AppError::NotFound("icon".into()));
            }
            Ok(AppIcon::new(RgbaImage::from_pixel(size, size, Rgba([255, 0, 0, 255]))))
        }
    }

    fn record(path: &str, name: &str) -> ApplicationRecord {
        ApplicationRecord::new(PathBuf::from(path), name.to_string(), None).unwrap()
    }

    #[test]
    fn rejects_empty_identity() {
        assert!(ApplicationRecord::new(PathBuf::new(), "X".into(), None).is_none());
    }

    #[test]
    fn equality_depends_only_on_path() {
        let a = record("/Applications/Foo.app", "Foo");
        let b = ApplicationRecord::new(
            PathBuf::from("/Applications/Foo.app"),
            "Other".into(),
            Some("com.acme.foo".into()),
        )
        .unwrap();
        let resolver = CountingResolver { calls: AtomicUsize::new(0), fail: false };
        a.icon(&resolver);

        assert_eq!(a, b);
        let set: HashSet<_> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
        assert_ne!(record("/Applications/Foo.app", "Foo"), record("/Applications/Bar.app", "Foo"));
    }

    #[test]
    fn icon_is_resolved_once_per_instance() {
        let app = record("/Applications/Foo.app", "Foo");
        let resolver = CountingResolver { calls: AtomicUsize::new(0), fail: false };

        let first = app.icon(&resolver);
        let second = app.icon(&resolver);

        assert_eq!(resolver.calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!((first.width(), first.height()), (16, 16));
        assert!(!first.placeholder);
    }

    #[test]
    fn failed_resolution_yields_placeholder() {
        let app = record("/Applications/Broken.app", "Broken");
        let resolver = CountingResolver { calls: AtomicUsize::new(0), fail: true };

        let icon = app.icon(&resolver);
        assert!(icon.placeholder);
        assert_eq!(icon.width(), 16);
        app.icon(&resolver);
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn placeholder_has_transparent_corners() {
        let icon = AppIcon::placeholder(64);
        assert_eq!(icon.image.get_pixel(0, 0)[3], 0);
        assert_eq!(icon.image.get_pixel(32, 32)[3], 255);
        assert!(icon.to_png().unwrap().starts_with(&[0x89, b'P', b'N', b'G']));
    }
}
