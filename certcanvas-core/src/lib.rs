//! # CertCanvas Core
//!
//! Editor logic for certificate templates: a scene of absolutely
//! positioned, z-ordered elements with linear undo/redo.
//! Compiles to WASM for use in the browser.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │ Toolbar │ Canvas input │ Layers  │ Properties    │
//! └────┬─────────┬───────────────┬─────────┬─────────┘
//!      │  mutations only through the store │
//! ┌────▼─────────▼───────────────▼─────────▼─────────┐
//! │ SceneStore: Scene (elements, selection, zoom)    │
//! │             History (snapshot per mutation)      │
//! └────────────────────────┬─────────────────────────┘
//!                          │ TemplateDocument (JSON)
//!              ┌───────────▼──────────┐
//!              │ storage / uploaders  │
//!              └──────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod element;
pub mod error;
pub mod handles;
pub mod history;
pub mod interaction;
pub mod layers;
pub mod properties;
pub mod scene;
pub mod schema;
pub mod storage;
pub mod store;
pub mod validation;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use config::{CommitPolicy, DragCancelPolicy, EditorConfig, HandleConfig, ZoomConfig};
pub use element::{
    normalize_rotation, CropRect, Element, ElementId, ElementKind, ElementPatch, ElementType,
    FontWeight, ImageContent, LineStyle, LineType, NewElement, Placement, ShapeStyle, ShapeType,
    TextAlign, TextContent, UnknownVariant, MIN_ELEMENT_SIZE,
};
pub use error::{EditorError, EditorResult};
pub use handles::{handle_at, handle_positions, Handle};
pub use history::History;
pub use interaction::{CanvasInteraction, PointerDown};
pub use layers::{LayerIcon, LayerRow, LayersPanel};
pub use properties::{PanelState, PropertiesPanel, PropertyField};
pub use scene::Scene;
pub use schema::TemplateDocument;
#[cfg(not(target_arch = "wasm32"))]
pub use storage::FsAssetUploader;
pub use storage::{AssetUploader, DataUriUploader, FsTemplateStorage, TemplateStorage};
pub use store::SceneStore;
pub use validation::{validate_document, ValidationError};

/// CertCanvas core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
