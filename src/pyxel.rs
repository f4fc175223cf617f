//! Streaming reader for the XML tilemaps Pyxel Edit exports:
//!
//! ```xml
//! <tilemap tileswide="2" tileshigh="1" tilewidth="8" tileheight="8">
//!   <layer number="0" name="bg">
//!     <tile x="0" y="0" index="0" tile="5" rot="0" flipX="false"/>
//!     <tile x="1" y="0" index="1" tile="5" rot="2" flipX="true"/>
//!   </layer>
//! </tilemap>
//! ```
//!
//! `x`, `y` and `index` are ignored: tiles are taken in document order.

use {
	crate::{
		assembly::{MapMetadata, SourceEvent},
		error::{Error, Result},
		gid::{Rotation, TileRecord},
	},
	core::str::FromStr,
	quick_xml::events::{BytesStart, Event},
	std::{
		fs::File,
		io::{BufRead, BufReader},
		path::Path,
	},
};

/// `tile` value Pyxel Edit writes for an unpainted cell.
pub const EMPTY_TILE: i64 = -1;

pub struct PyxelReader<R> {
	reader: quick_xml::Reader<R>,
	buffer: Vec<u8>,
}

impl PyxelReader<BufReader<File>> {
	pub fn fromPath(path: &Path) -> Result<Self> {
		Ok(Self::new(BufReader::new(File::open(path)?)))
	}
}

impl<R: BufRead> PyxelReader<R> {
	pub fn new(inner: R) -> Self {
		let mut reader = quick_xml::Reader::from_reader(inner);
		reader.trim_text(true);
		Self { reader, buffer: Vec::new() }
	}

	/// `None` at end of document.
	pub fn nextEvent(&mut self) -> Result<Option<SourceEvent>> {
		loop {
			self.buffer.clear();
			let sourceEvent = match self.reader.read_event_into(&mut self.buffer)? {
				Event::Start(element) | Event::Empty(element) => toSourceEvent(&element)?,
				Event::Eof => return Ok(None),
				_ => None,
			};
			if sourceEvent.is_some() {
				return Ok(sourceEvent);
			}
		}
	}
}

impl<R: BufRead> Iterator for PyxelReader<R> {
	type Item = Result<SourceEvent>;
	fn next(&mut self) -> Option<Self::Item> {
		self.nextEvent().transpose()
	}
}

fn toSourceEvent(element: &BytesStart<'_>) -> Result<Option<SourceEvent>> {
	Ok(Some(match element.name().as_ref() {
		b"tilemap" => {
			let attributes = Attributes::collect("tilemap", element)?;
			SourceEvent::TileMap(MapMetadata {
				width: attributes.positive("tileswide")?,
				height: attributes.positive("tileshigh")?,
				tileWidth: attributes.positive("tilewidth")?,
				tileHeight: attributes.positive("tileheight")?,
			})
		}
		b"layer" => {
			let attributes = Attributes::collect("layer", element)?;
			let number: u32 = attributes.parse("number")?;
			SourceEvent::Layer {
				// Tiled layer ids start at 1
				id: number.checked_add(1).ok_or_else(|| Error::malformed("layer", "number", "is too large"))?,
				name: attributes.required("name")?.to_owned(),
			}
		}
		b"tile" => {
			let attributes = Attributes::collect("tile", element)?;
			let rawIndex = match attributes.parse::<i64>("tile")? {
				EMPTY_TILE => None,
				index => Some(
					u32::try_from(index).map_err(|_| Error::malformed("tile", "tile", format!("{index} is out of range")))?,
				),
			};
			let rotation = match attributes.optional("rot") {
				None => Rotation::R0,
				Some(_) => Rotation::try_from(attributes.parse::<u32>("rot")?)
					.map_err(|rot| Error::malformed("tile", "rot", format!("{rot} is not one of 0, 1, 2, 3")))?,
			};
			let flipHorizontal = match attributes.optional("flipX") {
				None => false,
				Some(value) => parseBool(value).ok_or_else(|| Error::malformed("tile", "flipX", format!("{value:?} is not a boolean")))?,
			};
			SourceEvent::Tile(TileRecord { rawIndex, rotation, flipHorizontal })
		}
		_ => return Ok(None),
	}))
}

fn parseBool(value: &str) -> Option<bool> {
	if value.eq_ignore_ascii_case("true") {
		Some(true)
	} else if value.eq_ignore_ascii_case("false") {
		Some(false)
	} else {
		None
	}
}

/// Unescaped attributes of one element. Every one of them must be non-empty.
struct Attributes {
	element: &'static str,
	pairs: Vec<(String, String)>,
}

impl Attributes {
	fn collect(element: &'static str, start: &BytesStart<'_>) -> Result<Self> {
		let mut pairs = Vec::new();
		for attribute in start.attributes() {
			let attribute = attribute.map_err(quick_xml::Error::from)?;
			let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
			let value = attribute.unescape_value()?;
			if value.trim().is_empty() {
				return Err(Error::malformed(element, &key, "is empty"));
			}
			pairs.push((key, value.into_owned()));
		}
		Ok(Self { element, pairs })
	}

	fn optional(&self, key: &str) -> Option<&str> {
		self.pairs.iter().find(|(k, _)| k == key).map(|(_, value)| value.as_str())
	}

	fn required(&self, key: &str) -> Result<&str> {
		self.optional(key).ok_or_else(|| Error::malformed(self.element, key, "is missing"))
	}

	fn parse<T: FromStr>(&self, key: &str) -> Result<T> {
		let value = self.required(key)?;
		value.trim().parse().map_err(|_| Error::malformed(self.element, key, format!("{value:?} is not a valid number")))
	}

	fn positive(&self, key: &str) -> Result<u32> {
		match self.parse::<u32>(key)? {
			0 => Err(Error::malformed(self.element, key, "must be greater than 0")),
			value => Ok(value),
		}
	}
}
