//! Turns the stream of source elements into finished, compressed layers.

use {
	crate::{
		error::{Error, Result},
		gid::{TileRecord, FIRSTGID},
		layer::{Layer, LayerAccumulator},
	},
	core::mem,
	tracing::warn,
};

pub const ORIENTATION: &str = "orthogonal";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapMetadata {
	pub width: u32,
	pub height: u32,
	pub tileWidth: u32,
	pub tileHeight: u32,
}

impl MapMetadata {
	pub fn dimensions(&self) -> [u32; 2] {
		[self.width, self.height]
	}
}

/// What the source reader hands over, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceEvent {
	TileMap(MapMetadata),
	Layer { id: u32, name: String },
	Tile(TileRecord),
}

#[derive(Debug)]
enum State {
	AwaitingMapMeta,
	AwaitingLayer,
	AccumulatingTiles(LayerAccumulator),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Map {
	pub metadata: MapMetadata,
	pub layers: Vec<Layer>,
}

#[derive(Debug)]
pub struct MapAssembly {
	state: State,
	metadata: Option<MapMetadata>,
	layers: Vec<Layer>,
	firstgid: u32,
	strictLayers: bool,
}

impl Default for MapAssembly {
	fn default() -> Self {
		Self::new(false)
	}
}

impl MapAssembly {
	/// With `strictLayers` an unfilled layer is an error rather than a dropped layer.
	pub fn new(strictLayers: bool) -> Self {
		Self { state: State::AwaitingMapMeta, metadata: None, layers: Vec::new(), firstgid: FIRSTGID, strictLayers }
	}

	pub fn feed(&mut self, event: SourceEvent) -> Result<()> {
		match event {
			SourceEvent::TileMap(metadata) => self.onMapMeta(metadata),
			SourceEvent::Layer { id, name } => self.onLayer(id, name),
			SourceEvent::Tile(tile) => self.onTile(&tile),
		}
	}

	pub fn onMapMeta(&mut self, metadata: MapMetadata) -> Result<()> {
		if let Some(first) = self.metadata {
			warn!(?first, ignored = ?metadata, "more than one <tilemap> element, keeping the first");
			return Ok(());
		}
		for (attribute, size) in [("tilewidth", metadata.tileWidth), ("tileheight", metadata.tileHeight)] {
			if size == 0 {
				return Err(Error::malformed("tilemap", attribute, "tiles must be at least one pixel"));
			}
		}
		self.metadata = Some(metadata);
		self.state = State::AwaitingLayer;
		Ok(())
	}

	pub fn onLayer(&mut self, id: u32, name: String) -> Result<()> {
		if let State::AccumulatingTiles(unfilled) = mem::replace(&mut self.state, State::AwaitingLayer) {
			self.dropIncomplete(unfilled)?;
		}
		let layer = LayerAccumulator::beginLayer(id, name, self.metadata.as_ref().map(MapMetadata::dimensions))?;
		if layer.isFull() {
			// 0 tiles wide or high; nothing will ever be appended
			self.layers.push(layer.finalize()?);
		} else {
			self.state = State::AccumulatingTiles(layer);
		}
		Ok(())
	}

	pub fn onTile(&mut self, tile: &TileRecord) -> Result<()> {
		let State::AccumulatingTiles(layer) = &mut self.state else {
			return Err(Error::Configuration(match self.state {
				State::AwaitingMapMeta => "<tile> element before the <tilemap> element".to_owned(),
				_ => "<tile> element outside of a <layer> that still needs tiles".to_owned(),
			}));
		};
		let tileRef = tile
			.tileRef(self.firstgid)
			.ok_or_else(|| Error::TileIndexOutOfRange { index: tile.rawIndex.unwrap_or_default() })?;
		layer.appendTile(tileRef)?;
		if layer.isFull() {
			if let State::AccumulatingTiles(layer) = mem::replace(&mut self.state, State::AwaitingLayer) {
				self.layers.push(layer.finalize()?);
			}
		}
		Ok(())
	}

	/// End of input.
	pub fn finish(mut self) -> Result<Map> {
		if let State::AccumulatingTiles(unfilled) = mem::replace(&mut self.state, State::AwaitingLayer) {
			self.dropIncomplete(unfilled)?;
		}
		let metadata = self
			.metadata
			.ok_or_else(|| Error::Configuration("no <tilemap> element in the source document".to_owned()))?;
		Ok(Map { metadata, layers: self.layers })
	}

	fn dropIncomplete(&self, unfilled: LayerAccumulator) -> Result<()> {
		let (filled, capacity) = (unfilled.len(), unfilled.capacity());
		if self.strictLayers {
			return Err(Error::IncompleteLayer { name: unfilled.name().to_owned(), filled, capacity });
		}
		warn!(layer = unfilled.name(), filled, capacity, "dropping incomplete layer");
		Ok(())
	}
}
