//! Loading pipeline: finds the buildings file, deserializes it, resolves
//! colors and overlays, and builds the registry.
//!
//! Provides format detection (RON/JSON/TOML), file discovery, and
//! deserialization helpers alongside [`load_buildings`].

use crate::schema::{BuildingData, OverlayData, VariantData};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tilewire_core::geometry::Dimensions;
use tilewire_core::id::VariantId;
use tilewire_core::matrix::{MatrixError, OverlayMatrix, generate_matrix_rotations};
use tilewire_core::registry::{BuildingDef, Registry, RegistryBuilder, RegistryError};
use tilewire_core::variant::{Color, OverlayProvider, VariantDescriptor};

/// Base name of the building definitions file.
pub const BUILDINGS_FILE: &str = "buildings";

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// A required data file was not found in the given directory.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: String, dir: PathBuf },

    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    #[error("invalid color '{value}' for {building}/{variant} in {file}")]
    InvalidColor {
        file: PathBuf,
        building: String,
        variant: String,
        value: String,
    },

    #[error("invalid overlay for {building}/{variant} in {file}")]
    InvalidMatrix {
        file: PathBuf,
        building: String,
        variant: String,
        #[source]
        source: MatrixError,
    },

    /// The definitions parsed but the registry rejected them.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Scan a directory for `{base_name}.ron`, `.toml`, or `.json`.
///
/// Returns `Ok(None)` if no file is found, or `Err(ConflictingFormats)` if
/// more than one format exists for the same base name.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut found: Option<PathBuf> = None;

    for ext in ["ron", "toml", "json"] {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if candidate.exists() {
            if let Some(existing) = found {
                return Err(DataLoadError::ConflictingFormats {
                    a: existing,
                    b: candidate,
                });
            }
            found = Some(candidate);
        }
    }

    if let Some(path) = &found {
        tracing::debug!(path = %path.display(), "found data file");
    }
    Ok(found)
}

/// Like [`find_data_file`], but returns an error if no file is found.
pub fn require_data_file(dir: &Path, base_name: &str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name.to_string(),
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Deserialization
// ===========================================================================

fn parse_error(path: &Path, e: impl ToString) -> DataLoadError {
    DataLoadError::Parse {
        file: path.to_path_buf(),
        detail: e.to_string(),
    }
}

/// Deserialize a list from a file. For TOML files, extracts the array at
/// `toml_key` from the top-level table. RON and JSON hold the list directly.
pub fn deserialize_list<T: DeserializeOwned>(
    path: &Path,
    toml_key: &str,
) -> Result<Vec<T>, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;

    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Json => serde_json::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Toml => {
            let table: toml::Value = toml::from_str(&content).map_err(|e| parse_error(path, e))?;
            let array = table
                .get(toml_key)
                .ok_or_else(|| parse_error(path, format!("missing key '{toml_key}' in TOML file")))?
                .clone();
            array
                .try_into()
                .map_err(|e: toml::de::Error| parse_error(path, e))
        }
    }
}

// ===========================================================================
// Resolution
// ===========================================================================

fn resolve_matrix(
    file: &Path,
    building: &str,
    variant: &str,
    cells: &[u8],
) -> Result<OverlayMatrix, DataLoadError> {
    OverlayMatrix::from_flat(cells).map_err(|source| DataLoadError::InvalidMatrix {
        file: file.to_path_buf(),
        building: building.to_string(),
        variant: variant.to_string(),
        source,
    })
}

fn resolve_overlay(
    file: &Path,
    building: &str,
    variant: &str,
    overlay: &OverlayData,
) -> Result<OverlayProvider, DataLoadError> {
    let rotations = |cells: &[u8]| {
        resolve_matrix(file, building, variant, cells).map(generate_matrix_rotations)
    };
    Ok(match overlay {
        OverlayData::None => OverlayProvider::None,
        OverlayData::Static(cells) => OverlayProvider::Static(rotations(cells)?),
        OverlayData::PerShape {
            straight,
            corner,
            tee,
            cross,
        } => OverlayProvider::PerShape([
            rotations(straight)?,
            rotations(corner)?,
            rotations(tee)?,
            rotations(cross)?,
        ]),
    })
}

fn resolve_variant(
    file: &Path,
    building: &str,
    data: VariantData,
) -> Result<VariantDescriptor, DataLoadError> {
    let color = Color::from_hex(&data.color).ok_or_else(|| DataLoadError::InvalidColor {
        file: file.to_path_buf(),
        building: building.to_string(),
        variant: data.id.clone(),
        value: data.color.clone(),
    })?;
    let overlay = resolve_overlay(file, building, &data.id, &data.overlay)?;

    let mut v = VariantDescriptor::new(VariantId::new(data.id), color);
    v.dimensions = Dimensions::new(data.dimensions.width, data.dimensions.height);
    v.rotatable = data.rotatable;
    v.removable = data.removable;
    v.layer = data.layer;
    v.layer_preview = data.layer_preview;
    v.availability = data.unlock;
    v.overlay = overlay;
    v.render_pins = data.render_pins;
    v.components = data.components;
    Ok(v)
}

/// Turn one parsed building into a registry definition. Structural checks
/// (default variant, slot bounds, setup/update agreement) are left to
/// [`RegistryBuilder::build`].
pub fn resolve_building(file: &Path, data: BuildingData) -> Result<BuildingDef, DataLoadError> {
    let mut def = BuildingDef::new(&data.name, data.kind);
    def.can_pipette = data.can_pipette;
    for variant in data.variants {
        def = def.with_variant(resolve_variant(file, &data.name, variant)?);
    }
    Ok(def)
}

/// Load `buildings.{ron,toml,json}` from `dir` into a validated registry.
pub fn load_buildings(dir: &Path) -> Result<Registry, DataLoadError> {
    let path = require_data_file(dir, BUILDINGS_FILE)?;
    let buildings: Vec<BuildingData> = deserialize_list(&path, "buildings")?;
    tracing::debug!(
        path = %path.display(),
        count = buildings.len(),
        "loaded building definitions"
    );

    let mut builder = RegistryBuilder::new();
    for data in buildings {
        builder.register_building(resolve_building(&path, data)?)?;
    }
    Ok(builder.build()?)
}

/// Directory holding the bundled definitions of the built-in buildings.
pub fn bundled_data_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data")
}

// ===========================================================================
// Tests
// ===========================================================================
