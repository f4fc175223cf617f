//! Tiled TMX: writing converted maps, and reading back the layer data of maps
//! this crate wrote.

use {
	crate::{
		assembly::{Map, ORIENTATION},
		config::{ConvertOptions, MAP_VERSION},
		error::{Error, Result},
		gid::FIRSTGID,
		gzip,
		layer::TILE_REF_SIZE,
		pngHeader::ImageInfo,
	},
	base64::{engine::general_purpose::STANDARD as BASE64, Engine},
	byteorder::{ByteOrder, LE},
	quick_xml::{
		events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
		Writer,
	},
	std::io::{BufRead, Write},
};

pub const ENCODING: &str = "base64";
pub const COMPRESSION: &str = "gzip";

/// The `<image>` of the single tileset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TilesetImage {
	/// File name relative to the TMX.
	pub source: String,
	/// `None` when the image could not be probed.
	pub info: Option<ImageInfo>,
}

pub fn writeMap<W: Write>(output: W, map: &Map, image: &TilesetImage, options: &ConvertOptions) -> Result<()> {
	let (writer, metadata) = (&mut Writer::new_with_indent(output, b' ', 2), &map.metadata);
	let [width, height, tileWidth, tileHeight] =
		[metadata.width, metadata.height, metadata.tileWidth, metadata.tileHeight].map(|value| value.to_string());
	let dimensions = if options.emitTilesetDimensions { image.info } else { None };

	writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

	let mut element = BytesStart::new("map");
	if options.emitMapVersion {
		element.push_attribute(("version", MAP_VERSION));
	}
	element.extend_attributes([
		("width", width.as_str()),
		("height", height.as_str()),
		("tilewidth", tileWidth.as_str()),
		("tileheight", tileHeight.as_str()),
		("orientation", ORIENTATION),
	]);
	writer.write_event(Event::Start(element))?;

	let firstgid = FIRSTGID.to_string();
	let mut element = BytesStart::new("tileset");
	element.extend_attributes([
		("firstgid", firstgid.as_str()),
		("name", options.tilesetName.as_str()),
		("tilewidth", tileWidth.as_str()),
		("tileheight", tileHeight.as_str()),
	]);
	if let Some(count) = dimensions.and_then(|image| tileCount(image, metadata.tileWidth, metadata.tileHeight)) {
		element.push_attribute(("tilecount", count.to_string().as_str()));
	}
	writer.write_event(Event::Start(element))?;
	let mut element = BytesStart::new("image");
	element.push_attribute(("source", image.source.as_str()));
	if let Some(ImageInfo { width, height }) = dimensions {
		element.push_attribute(("width", width.to_string().as_str()));
		element.push_attribute(("height", height.to_string().as_str()));
	}
	writer.write_event(Event::Empty(element))?;
	writer.write_event(Event::End(BytesEnd::new("tileset")))?;

	for layer in &map.layers {
		let mut element = BytesStart::new("layer");
		element.extend_attributes([("width", width.as_str()), ("height", height.as_str())]);
		if options.emitLayerId {
			element.push_attribute(("id", layer.id.to_string().as_str()));
		}
		element.push_attribute(("name", layer.name.as_str()));
		writer.write_event(Event::Start(element))?;
		let mut element = BytesStart::new("data");
		element.extend_attributes([("encoding", ENCODING), ("compression", COMPRESSION)]);
		writer.write_event(Event::Start(element))?;
		writer.write_event(Event::Text(BytesText::new(&BASE64.encode(&layer.compressedTileData))))?;
		writer.write_event(Event::End(BytesEnd::new("data")))?;
		writer.write_event(Event::End(BytesEnd::new("layer")))?;
	}

	writer.write_event(Event::End(BytesEnd::new("map")))?;
	writer.get_mut().write_all(b"\n")?;
	Ok(())
}

/// Whole tiles in the tileset image. `None` for zero-sized tiles or a count past `u32`.
fn tileCount(image: ImageInfo, tileWidth: u32, tileHeight: u32) -> Option<u32> {
	let columns = image.width.checked_div(tileWidth)?;
	columns.checked_mul(image.height.checked_div(tileHeight)?)
}

/// One `<layer>` of a TMX file, data decoded back into tile references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TmxLayer {
	pub id: Option<u32>,
	pub name: String,
	pub width: u32,
	pub height: u32,
	pub tileRefs: Vec<u32>,
}

impl TmxLayer {
	pub fn rows(&self) -> impl Iterator<Item = &[u32]> {
		self.tileRefs.chunks(self.width.max(1) as usize)
	}
}

/// Reads every tile layer. Only `base64` + `gzip` data is understood.
pub fn readLayers<R: BufRead>(input: R) -> Result<Vec<TmxLayer>> {
	let (mut reader, mut buffer, mut layers) = (quick_xml::Reader::from_reader(input), Vec::new(), Vec::new());
	reader.trim_text(true);
	let (mut current, mut inData) = (None::<TmxLayer>, false);
	loop {
		buffer.clear();
		match reader.read_event_into(&mut buffer)? {
			Event::Start(element) if element.name().as_ref() == b"layer" => {
				let attribute = |key: &str| -> Result<Option<String>> {
					Ok(match element.try_get_attribute(key).map_err(quick_xml::Error::from)? {
						Some(attribute) => Some(attribute.unescape_value()?.into_owned()),
						None => None,
					})
				};
				let number = |key: &'static str| -> Result<u32> {
					let value = attribute(key)?.ok_or_else(|| Error::malformed("layer", key, "is missing"))?;
					value.parse().map_err(|_| Error::malformed("layer", key, format!("{value:?} is not a valid number")))
				};
				current = Some(TmxLayer {
					id: attribute("id")?.and_then(|id| id.parse().ok()),
					name: attribute("name")?.unwrap_or_default(),
					width: number("width")?,
					height: number("height")?,
					tileRefs: Vec::new(),
				});
			}
			Event::Start(element) if element.name().as_ref() == b"data" => {
				for (key, expected) in [("encoding", ENCODING), ("compression", COMPRESSION)] {
					let value = match element.try_get_attribute(key).map_err(quick_xml::Error::from)? {
						Some(attribute) => attribute.unescape_value()?.into_owned(),
						None => String::new(),
					};
					if value != expected {
						return Err(Error::malformed("data", key, format!("{value:?} is not supported, only {expected:?}")));
					}
				}
				inData = true;
			}
			Event::Text(text) if inData => {
				let Some(layer) = current.as_mut() else {
					return Err(Error::Configuration("<data> outside of a <layer>".to_owned()));
				};
				let tileData = gzip::decompress(&BASE64.decode(text.unescape()?.trim())?)?;
				layer.tileRefs.extend(tileData.chunks_exact(TILE_REF_SIZE).map(LE::read_u32));
			}
			Event::End(element) if element.name().as_ref() == b"data" => inData = false,
			Event::End(element) if element.name().as_ref() == b"layer" => layers.extend(current.take()),
			Event::Eof => break,
			_ => {}
		}
	}
	Ok(layers)
}
