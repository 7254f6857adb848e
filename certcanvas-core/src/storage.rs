//! Collaborators at the edge of the editor: template storage and asset upload.
//!
//! The store never talks to storage itself. The helpers at the bottom of
//! this module run the external call first and only touch the store once it
//! has succeeded, so a failed save, load or upload leaves the scene exactly
//! as it was.

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{EditorError, EditorResult};
use crate::schema::TemplateDocument;
use crate::store::SceneStore;
use crate::{ElementId, ElementPatch, NewElement};

/// Saves and loads template documents.
pub trait TemplateStorage {
    /// Persist a document under `name` and return the key to load it by.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be encoded or written.
    fn save(&self, name: &str, document: &TemplateDocument) -> EditorResult<String>;

    /// Load a previously saved document.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::TemplateNotFound`] for an unknown key, or an
    /// error if the stored data cannot be read or parsed.
    fn load(&self, key: &str) -> EditorResult<TemplateDocument>;

    /// Keys of every stored template.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be listed.
    fn list(&self) -> EditorResult<Vec<String>>;
}

/// Turns an uploaded file into a URI usable as `src` or background.
pub trait AssetUploader {
    /// Upload `bytes` named `file_name` and return its URI.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::Upload`] if the file is rejected, or an I/O
    /// error if it cannot be stored.
    fn upload(&self, file_name: &str, bytes: &[u8]) -> EditorResult<String>;
}

/// Templates as pretty-printed JSON files in a directory.
#[derive(Debug, Clone)]
pub struct FsTemplateStorage {
    data_dir: PathBuf,
}

impl FsTemplateStorage {
    /// Use `data_dir`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::Io`] if the directory cannot be created.
    pub fn new(data_dir: impl Into<PathBuf>) -> EditorResult<Self> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;
        Ok(Self { data_dir })
    }

    /// The storage directory.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", sanitize_filename(key)))
    }
}

impl TemplateStorage for FsTemplateStorage {
    fn save(&self, name: &str, document: &TemplateDocument) -> EditorResult<String> {
        let key = sanitize_filename(name);
        let json = document.to_json_pretty()?;
        std::fs::write(self.path_for(&key), json)?;
        debug!(%key, elements = document.elements.len(), "template saved");
        Ok(key)
    }

    fn load(&self, key: &str) -> EditorResult<TemplateDocument> {
        let path = self.path_for(key);
        let json = match std::fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(EditorError::TemplateNotFound(key.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        TemplateDocument::from_json(&json)
    }

    fn list(&self) -> EditorResult<Vec<String>> {
        let mut keys = Vec::new();
        for entry in std::fs::read_dir(&self.data_dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    keys.push(stem.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}

/// Embeds uploads inline as base64 `data:` URIs.
#[derive(Debug, Clone, Default)]
pub struct DataUriUploader {
    /// Largest accepted file, `None` for no limit.
    pub max_bytes: Option<usize>,
}

impl AssetUploader for DataUriUploader {
    fn upload(&self, file_name: &str, bytes: &[u8]) -> EditorResult<String> {
        let mime = image_mime(file_name)?;
        check_size(bytes, self.max_bytes)?;
        Ok(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
    }
}

/// Copies uploads into a directory and returns `file://` URIs.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FsAssetUploader {
    asset_dir: PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FsAssetUploader {
    /// Use `asset_dir`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::Io`] if the directory cannot be created or
    /// resolved to an absolute path.
    pub fn new(asset_dir: impl AsRef<Path>) -> EditorResult<Self> {
        std::fs::create_dir_all(asset_dir.as_ref())?;
        let asset_dir = asset_dir.as_ref().canonicalize()?;
        Ok(Self { asset_dir })
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl AssetUploader for FsAssetUploader {
    fn upload(&self, file_name: &str, bytes: &[u8]) -> EditorResult<String> {
        image_mime(file_name)?;
        check_size(bytes, None)?;
        let name = Path::new(file_name);
        let stem = name.file_stem().and_then(|s| s.to_str()).unwrap_or("asset");
        let ext = name.extension().and_then(|e| e.to_str()).unwrap_or_default();
        // Unique prefix so two uploads of the same name never collide.
        let stored = format!(
            "{}-{}.{}",
            Uuid::new_v4().simple(),
            sanitize_filename(stem),
            sanitize_filename(ext)
        );
        let path = self.asset_dir.join(stored);
        std::fs::write(&path, bytes)?;
        url::Url::from_file_path(&path)
            .map(String::from)
            .map_err(|()| EditorError::Upload(format!("no file URI for {}", path.display())))
    }
}

fn check_size(bytes: &[u8], max_bytes: Option<usize>) -> EditorResult<()> {
    if bytes.is_empty() {
        return Err(EditorError::Upload("file is empty".to_string()));
    }
    match max_bytes {
        Some(max) if bytes.len() > max => Err(EditorError::Upload(format!(
            "file is {} bytes, limit is {max}",
            bytes.len()
        ))),
        _ => Ok(()),
    }
}

/// MIME type of an image file, judged by extension.
///
/// # Errors
///
/// Returns [`EditorError::Upload`] for anything that is not a known image type.
pub fn image_mime(file_name: &str) -> EditorResult<&'static str> {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "png" => Ok("image/png"),
        "jpg" | "jpeg" => Ok("image/jpeg"),
        "gif" => Ok("image/gif"),
        "webp" => Ok("image/webp"),
        "svg" => Ok("image/svg+xml"),
        "bmp" => Ok("image/bmp"),
        _ => Err(EditorError::Upload(format!(
            "unsupported image type: {file_name}"
        ))),
    }
}

/// Replace any character that is not alphanumeric, `-`, or `_` with `_`.
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Save the store's document.
///
/// # Errors
///
/// Propagates the storage error after logging it.
pub fn save_template(
    store: &SceneStore,
    storage: &impl TemplateStorage,
    name: &str,
) -> EditorResult<String> {
    storage.save(name, &store.document()).inspect_err(|e| {
        warn!("Failed to save template {name}: {e}");
    })
}

/// Load a stored document into the store, replacing its scene and history.
///
/// # Errors
///
/// Propagates storage and validation errors after logging them; the store
/// is unchanged on error.
pub fn load_template(
    store: &mut SceneStore,
    storage: &impl TemplateStorage,
    key: &str,
) -> EditorResult<()> {
    storage
        .load(key)
        .and_then(|document| store.load_document(document))
        .inspect_err(|e| {
            warn!("Failed to load template {key}: {e}");
        })
}

/// Upload a file and use it as the background.
///
/// # Errors
///
/// Propagates the upload error after logging it.
pub fn upload_background(
    store: &mut SceneStore,
    uploader: &impl AssetUploader,
    file_name: &str,
    bytes: &[u8],
) -> EditorResult<String> {
    let uri = uploader.upload(file_name, bytes).inspect_err(|e| {
        warn!("Failed to upload background {file_name}: {e}");
    })?;
    store.set_background(Some(uri.clone()));
    Ok(uri)
}

/// Upload a file and add it to the scene as an image element.
///
/// # Errors
///
/// Propagates the upload error after logging it.
pub fn upload_image(
    store: &mut SceneStore,
    uploader: &impl AssetUploader,
    file_name: &str,
    bytes: &[u8],
) -> EditorResult<ElementId> {
    let src = uploader.upload(file_name, bytes).inspect_err(|e| {
        warn!("Failed to upload image {file_name}: {e}");
    })?;
    Ok(store.create_element(NewElement::Image { src }, &ElementPatch::default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ElementKind, ShapeType};

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("diploma 2024/v1"), "diploma_2024_v1");
        assert_eq!(sanitize_filename("../etc/passwd"), "___etc_passwd");
    }

    #[test]
    fn test_image_mime() {
        assert_eq!(image_mime("logo.PNG").ok(), Some("image/png"));
        assert_eq!(image_mime("photo.jpeg").ok(), Some("image/jpeg"));
        assert!(matches!(image_mime("notes.txt"), Err(EditorError::Upload(_))));
        assert!(image_mime("noext").is_err());
    }

    #[test]
    fn test_data_uri_upload() {
        let uploader = DataUriUploader::default();
        let uri = uploader.upload("dot.png", b"\x89PNG").expect("upload");
        assert_eq!(uri, "data:image/png;base64,iVBORw==");
    }

    #[test]
    fn test_data_uri_limits() {
        let uploader = DataUriUploader { max_bytes: Some(2) };
        assert!(matches!(uploader.upload("a.png", b"abc"), Err(EditorError::Upload(_))));
        assert!(matches!(uploader.upload("a.png", b""), Err(EditorError::Upload(_))));
    }

    #[test]
    fn test_fs_storage_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = FsTemplateStorage::new(dir.path().join("templates")).expect("storage");

        let mut store = SceneStore::default();
        store.create_element(NewElement::Shape(ShapeType::Circle), &ElementPatch::default());
        let key = save_template(&store, &storage, "Gold Award").expect("save");
        assert_eq!(key, "Gold_Award");
        assert_eq!(storage.list().expect("list"), vec!["Gold_Award".to_string()]);

        let mut other = SceneStore::default();
        load_template(&mut other, &storage, &key).expect("load");
        assert_eq!(other.document(), store.document());
    }

    #[test]
    fn test_missing_template() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = FsTemplateStorage::new(dir.path()).expect("storage");
        let mut store = SceneStore::default();
        store.create_element(NewElement::Text, &ElementPatch::default());
        let before = store.document();

        let err = load_template(&mut store, &storage, "nope").expect_err("missing");
        assert!(matches!(err, EditorError::TemplateNotFound(_)));
        assert_eq!(store.document(), before);
    }

    #[test]
    fn test_invalid_stored_template_leaves_store() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = FsTemplateStorage::new(dir.path()).expect("storage");
        std::fs::write(
            dir.path().join("broken.json"),
            r#"{"elements": [], "canvasWidth": 0, "canvasHeight": 900}"#,
        )
        .expect("write");
        let mut store = SceneStore::default();
        let err = load_template(&mut store, &storage, "broken").expect_err("invalid");
        assert!(matches!(err, EditorError::InvalidDocument(_)));
        assert!(store.history().is_empty());
    }

    #[test]
    fn test_upload_image_and_background() {
        let mut store = SceneStore::default();
        let uploader = DataUriUploader::default();

        let id = upload_image(&mut store, &uploader, "seal.gif", b"GIF89a").expect("upload");
        let Some(ElementKind::Image(image)) = store.scene().get(&id).map(|e| e.kind().clone()) else {
            panic!("expected image element");
        };
        assert!(image.src.starts_with("data:image/gif;base64,"));

        upload_background(&mut store, &uploader, "paper.jpg", b"\xff\xd8").expect("background");
        assert!(store
            .scene()
            .background_image()
            .is_some_and(|bg| bg.starts_with("data:image/jpeg")));
    }

    #[test]
    fn test_failed_upload_leaves_store() {
        let mut store = SceneStore::default();
        let uploader = DataUriUploader::default();
        assert!(upload_image(&mut store, &uploader, "virus.exe", b"MZ").is_err());
        assert!(upload_background(&mut store, &uploader, "x.doc", b"x").is_err());
        assert!(store.scene().is_empty());
        assert!(store.scene().background_image().is_none());
        assert!(store.history().is_empty());
    }

    #[test]
    fn test_fs_asset_upload() {
        let dir = tempfile::tempdir().expect("tempdir");
        let uploader = FsAssetUploader::new(dir.path().join("assets")).expect("uploader");
        let uri = uploader.upload("logo.svg", b"<svg/>").expect("upload");
        assert!(uri.starts_with("file://"));
        assert!(uri.ends_with("-logo.svg"));
        let path = url::Url::parse(&uri)
            .expect("uri")
            .to_file_path()
            .expect("file path");
        assert_eq!(std::fs::read(path).expect("stored"), b"<svg/>");
    }

    #[test]
    fn test_fs_asset_upload_encodes_reserved_characters() {
        let dir = tempfile::tempdir().expect("tempdir");
        let uploader = FsAssetUploader::new(dir.path().join("my assets")).expect("uploader");
        let uri = uploader.upload("logo.png", b"png").expect("upload");
        assert!(!uri.contains(' '));
        assert!(uri.contains("/my%20assets/"));
        let path = url::Url::parse(&uri)
            .expect("uri")
            .to_file_path()
            .expect("file path");
        assert!(path.starts_with(dir.path().canonicalize().expect("canonical")));
        assert_eq!(std::fs::read(path).expect("stored"), b"png");
    }
}
