//! Placeholder icon sets: which sizes to render and where to write them.
//!
//! The default set is the web-app trio (`icon-192.png`, `icon-512.png`,
//! `apple-touch-icon.png`) in brand blue. A TOML manifest can describe a
//! different set:
//!
//! ```toml
//! color = "#2563eb"
//! compression_level = 9
//!
//! [[icon]]
//! size = 192
//! file = "icon-192.png"
//! ```

use std::fs;
use std::path::{Component, Path, PathBuf};

use log::{debug, info};
use serde::Deserialize;

use crate::color::Rgb;
use crate::error::{Error, Result};
use crate::png::{self, PngOptions};

/// One square icon to render.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IconSpec {
    /// Edge length in pixels.
    pub size: u32,
    /// File name relative to the output directory.
    #[serde(rename = "file")]
    pub file_name: String,
}

impl IconSpec {
    /// Create an icon spec.
    pub fn new(size: u32, file_name: impl Into<String>) -> Self {
        Self {
            size,
            file_name: file_name.into(),
        }
    }
}

/// A color plus the icons to render in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconSet {
    /// Fill color for every icon.
    pub color: Rgb,
    /// Icons in output order.
    pub icons: Vec<IconSpec>,
    /// Compression level from the manifest, if it set one.
    pub compression_level: Option<u8>,
}

impl Default for IconSet {
    fn default() -> Self {
        Self {
            color: Rgb::BRAND_BLUE,
            icons: vec![
                IconSpec::new(192, "icon-192.png"),
                IconSpec::new(512, "icon-512.png"),
                IconSpec::new(180, "apple-touch-icon.png"),
            ],
            compression_level: None,
        }
    }
}

/// Manifest file layout.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Manifest {
    color: Option<String>,
    compression_level: Option<u8>,
    #[serde(default, rename = "icon")]
    icons: Vec<IconSpec>,
}

/// An icon written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedIcon {
    /// Where the file was written.
    pub path: PathBuf,
    /// Edge length in pixels.
    pub size: u32,
    /// File size in bytes.
    pub bytes: usize,
}

impl IconSet {
    /// Parse a TOML manifest. Missing `color` keeps brand blue; an empty
    /// icon list keeps the default icons.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let manifest: Manifest =
            toml::from_str(text).map_err(|e| Error::Manifest(e.message().to_string()))?;

        let mut set = Self::default();
        if let Some(color) = manifest.color {
            set.color = color.parse()?;
        }
        if !manifest.icons.is_empty() {
            set.icons = manifest.icons;
        }
        if let Some(level) = manifest.compression_level {
            if !(1..=9).contains(&level) {
                return Err(Error::Manifest(format!("compression_level {level} is outside 1-9")));
            }
        }
        set.compression_level = manifest.compression_level;

        for icon in &set.icons {
            if icon.size == 0 || icon.size > png::MAX_DIMENSION {
                return Err(Error::Manifest(format!(
                    "icon {:?} has size {}, expected 1-{}",
                    icon.file_name,
                    icon.size,
                    png::MAX_DIMENSION
                )));
            }
            check_file_name(&icon.file_name)?;
        }
        Ok(set)
    }

    /// Read and parse a manifest file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        debug!("loaded icon manifest {}", path.display());
        Self::from_toml_str(&text)
    }

    /// Options to encode with: the manifest level if set, else the defaults.
    pub fn png_options(&self) -> PngOptions {
        match self.compression_level {
            Some(compression_level) => PngOptions { compression_level },
            None => PngOptions::default(),
        }
    }

    /// Write every icon into `dir`, creating it if needed.
    ///
    /// Stops at the first failure; icons already written stay on disk.
    pub fn write_all(
        &self,
        dir: impl AsRef<Path>,
        options: &PngOptions,
    ) -> Result<Vec<GeneratedIcon>> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;

        self.icons
            .iter()
            .map(|spec| write_icon(dir, spec, self.color, options))
            .collect()
    }
}

/// Encode one icon and write it to `dir/spec.file_name`, replacing any
/// existing file.
pub fn write_icon(
    dir: impl AsRef<Path>,
    spec: &IconSpec,
    color: Rgb,
    options: &PngOptions,
) -> Result<GeneratedIcon> {
    check_file_name(&spec.file_name)?;
    let data = png::encode_with_options(spec.size, spec.size, color, options)?;
    let path = dir.as_ref().join(&spec.file_name);
    fs::write(&path, &data).map_err(|e| Error::io(&path, e))?;

    info!(
        "wrote {} ({}x{}, {} bytes)",
        path.display(),
        spec.size,
        spec.size,
        data.len()
    );
    Ok(GeneratedIcon {
        path,
        size: spec.size,
        bytes: data.len(),
    })
}

/// Icon files must land directly in the output directory.
fn check_file_name(name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !name.trim().is_empty() => Ok(()),
        _ => Err(Error::Manifest(format!("icon file {name:?} must be a plain file name"))),
    }
}
