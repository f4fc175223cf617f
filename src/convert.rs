use {
	crate::{
		assembly::{Map, MapAssembly},
		config::{ConvertOptions, TARGET_EXTENSION},
		error::Result,
		pngHeader::{self, ImageInfo},
		pyxel::PyxelReader,
		tmx::{self, TilesetImage},
	},
	std::{
		fs::{self, File},
		io::{BufRead, BufWriter, Write},
		path::{Path, PathBuf},
	},
	tracing::{info, warn},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
	pub outputPath: PathBuf,
	pub layerCount: usize,
	pub image: Option<ImageInfo>,
}

/// `town.xml` becomes `town.tmx`.
pub fn outputPath(inputPath: &Path) -> PathBuf {
	inputPath.with_extension(TARGET_EXTENSION)
}

pub fn assemble<R: BufRead>(source: R, options: &ConvertOptions) -> Result<Map> {
	assembleEvents(PyxelReader::new(source), options)
}

fn assembleEvents<R: BufRead>(events: PyxelReader<R>, options: &ConvertOptions) -> Result<Map> {
	let mut assembly = MapAssembly::new(options.strictLayers);
	for event in events {
		assembly.feed(event?)?;
	}
	assembly.finish()
}

/// Probe failures only cost the tileset its dimensions.
pub fn tilesetImage(inputPath: &Path, options: &ConvertOptions) -> TilesetImage {
	let imagePath = (options.imagePathResolver)(inputPath);
	let outputDir = outputPath(inputPath).parent().map(Path::to_path_buf).unwrap_or_default();
	let source = imageSource(&imagePath, &outputDir);
	let info = match pngHeader::probe(&imagePath) {
		Ok(info) => {
			info!(width = info.width, height = info.height, "{}", imagePath.display());
			Some(info)
		}
		Err(err) => {
			warn!("{err}");
			warn!("Open and save the tmx in Tiled to add the missing tileset info.");
			None
		}
	};
	TilesetImage { source, info }
}

/// `<image source>` as Tiled resolves it: relative to the TMX, `/`-separated.
/// An image outside the TMX's directory keeps its full path.
pub fn imageSource(imagePath: &Path, outputDir: &Path) -> String {
	match imagePath.strip_prefix(outputDir) {
		Ok(relative) => relative
			.components()
			.map(|component| component.as_os_str().to_string_lossy())
			.collect::<Vec<_>>()
			.join("/"),
		Err(_) => imagePath.to_string_lossy().into_owned(),
	}
}

/// Reads `inputPath`, writes the TMX next to it. Nothing is left behind on failure.
pub fn convertFile(inputPath: &Path, options: &ConvertOptions) -> Result<Conversion> {
	let map = assembleEvents(PyxelReader::fromPath(inputPath)?, options)?;
	let image = tilesetImage(inputPath, options);
	let outputPath = outputPath(inputPath);
	writeAtomically(&outputPath, |output| tmx::writeMap(output, &map, &image, options))?;
	info!("{} successfully converted to {}!", inputPath.display(), outputPath.display());
	Ok(Conversion { outputPath, layerCount: map.layers.len(), image: image.info })
}

fn writeAtomically(path: &Path, write: impl FnOnce(&mut BufWriter<File>) -> Result<()>) -> Result<()> {
	let partPath = {
		let mut partPath = path.as_os_str().to_owned();
		partPath.push(".part");
		PathBuf::from(partPath)
	};
	let result = (|| -> Result<()> {
		let output = &mut BufWriter::new(File::create(&partPath)?);
		write(output)?;
		output.flush()?;
		output.get_ref().sync_all()?;
		Ok(())
	})();
	match result {
		Ok(()) => Ok(fs::rename(&partPath, path)?),
		Err(err) => {
			_ = fs::remove_file(&partPath);
			Err(err)
		}
	}
}
