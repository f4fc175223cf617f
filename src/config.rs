use {
	crate::{error::Result, io_readToString},
	const_format::concatcp,
	serde::Deserialize,
	std::{
		fs::File,
		path::{Path, PathBuf},
	},
};

pub const DEFAULT_TILESET_NAME: &str = concatcp!("Converted by ", env!("CARGO_PKG_NAME"));
pub const MAP_VERSION: &str = "1.1";
pub const TARGET_EXTENSION: &str = "tmx";
pub const IMAGE_EXTENSION: &str = "png";

pub type ImagePathResolver = fn(&Path) -> PathBuf;

/// `tiles.xml` looks for `tiles.png` next to it.
pub fn siblingImagePath(inputPath: &Path) -> PathBuf {
	inputPath.with_extension(IMAGE_EXTENSION)
}

/// Which attributes end up in the TMX and how strictly the source is read.
/// Every field may be left out of the TOML file.
#[derive(Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertOptions {
	pub emitMapVersion: bool,
	pub emitLayerId: bool,
	pub emitTilesetDimensions: bool,
	pub strictLayers: bool,
	pub tilesetName: String,

	#[serde(skip, default = "defaultImagePathResolver")]
	pub imagePathResolver: ImagePathResolver,
}

fn defaultImagePathResolver() -> ImagePathResolver {
	siblingImagePath
}

impl Default for ConvertOptions {
	fn default() -> Self {
		Self {
			emitMapVersion: true,
			emitLayerId: true,
			emitTilesetDimensions: true,
			strictLayers: false,
			tilesetName: DEFAULT_TILESET_NAME.to_owned(),
			imagePathResolver: siblingImagePath,
		}
	}
}

impl ConvertOptions {
	pub fn fromToml(text: &str) -> Result<Self> {
		Ok(toml::from_str(text)?)
	}

	pub fn fromTomlFile(path: &Path) -> Result<Self> {
		Self::fromToml(&io_readToString(File::open(path)?)?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults() {
		let options = ConvertOptions::fromToml("").unwrap();
		assert!(options.emitMapVersion && options.emitLayerId && options.emitTilesetDimensions);
		assert!(!options.strictLayers);
		assert_eq!(options.tilesetName, "Converted by pyxel2tiled");
		assert_eq!((options.imagePathResolver)(Path::new("maps/town.xml")), Path::new("maps/town.png"));
	}

	#[test]
	fn partial_file() {
		let options = ConvertOptions::fromToml("emitMapVersion = false\nstrictLayers = true\n").unwrap();
		assert!(!options.emitMapVersion);
		assert!(options.emitLayerId);
		assert!(options.strictLayers);
	}

	#[test]
	fn unknown_key_is_rejected() {
		assert!(ConvertOptions::fromToml("emitMapVersoin = false").is_err());
	}

	#[test]
	fn from_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("pyxel2tiled.toml");
		std::fs::write(&path, "tilesetName = \"town\"\nemitLayerId = false\n").unwrap();
		let options = ConvertOptions::fromTomlFile(&path).unwrap();
		assert_eq!(options.tilesetName, "town");
		assert!(!options.emitLayerId);
	}
}
