//! nodeinit core library: feature selection, in-memory trees, settings, errors.
//!
//! - [`selection`]: [`FeatureSelection`] and its enums, schema validation
//! - [`tree`]: [`Tree`] / [`TreePath`] / [`Node`]
//! - [`settings`]: load / save `~/.nodeinit/config.yaml`
//! - [`error`]: [`ValidationError`], [`SettingsError`]

pub mod error;
pub mod selection;
pub mod settings;
pub mod tree;

pub use error::{SettingsError, ValidationError};
pub use selection::{
    ApiMethod, DatabaseKind, FeatureSelection, InstallationType, LanguageVariant, OrmFamily,
    SwaggerConfig, DEFAULT_SWAGGER_PATH, MIN_PROJECT_NAME_LEN,
};
pub use selection::is_valid_package_name;
pub use settings::Settings;
pub use tree::{Node, Tree, TreePath};
