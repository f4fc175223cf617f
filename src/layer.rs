use {
	crate::{
		error::{Error, Result},
		gzip,
	},
	byteorder::{ByteOrder, WriteBytesExt, LE},
	tracing::debug,
};

pub const TILE_REF_SIZE: usize = 4;

/// A finished layer: row-major tile references, little-endian, plus their gzip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
	pub id: u32,
	pub name: String,
	pub tileData: Box<[u8]>,
	pub compressedTileData: Box<[u8]>,
}

impl Layer {
	pub fn tileRefs(&self) -> impl Iterator<Item = u32> + '_ {
		self.tileData.chunks_exact(TILE_REF_SIZE).map(LE::read_u32)
	}

	pub fn len(&self) -> usize {
		self.tileData.len() / TILE_REF_SIZE
	}

	pub fn is_empty(&self) -> bool {
		self.tileData.is_empty()
	}
}

/// The layer currently being filled, one `<tile>` at a time.
#[derive(Debug)]
pub struct LayerAccumulator {
	id: u32,
	name: String,
	capacity: usize,
	tileData: Vec<u8>,
}

impl LayerAccumulator {
	/// `dimensions` is `[width, height]` in tiles, known only once `<tilemap>` was seen.
	pub fn beginLayer(id: u32, name: String, dimensions: Option<[u32; 2]>) -> Result<Self> {
		let Some([width, height]) = dimensions else {
			return Err(Error::Configuration(format!(
				"layer {name:?} precedes the <tilemap> element that gives the map dimensions"
			)));
		};
		let capacity = (width as usize)
			.checked_mul(height as usize)
			.filter(|capacity| capacity.checked_mul(TILE_REF_SIZE).is_some())
			.ok_or_else(|| Error::Configuration(format!("a {width}x{height} layer does not fit in memory")))?;
		// grows with appendTile; the declared size alone is never allocated up front
		Ok(Self { id, name, capacity, tileData: Vec::new() })
	}

	pub fn appendTile(&mut self, tileRef: u32) -> Result<()> {
		if self.isFull() {
			return Err(Error::Overflow { layer: self.name.clone(), capacity: self.capacity });
		}
		self.tileData.write_u32::<LE>(tileRef)?;
		Ok(())
	}

	pub fn isFull(&self) -> bool {
		self.len() == self.capacity
	}

	pub fn len(&self) -> usize {
		self.tileData.len() / TILE_REF_SIZE
	}

	pub fn capacity(&self) -> usize {
		self.capacity
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn finalize(self) -> Result<Layer> {
		let Self { id, name, capacity, tileData } = self;
		if tileData.len() != capacity * TILE_REF_SIZE {
			return Err(Error::IncompleteLayer { name, filled: tileData.len() / TILE_REF_SIZE, capacity });
		}
		let compressedTileData = gzip::compress(&tileData)?.into_boxed_slice();
		debug!(id, name = %name, tiles = capacity, compressed = compressedTileData.len(), "layer finalized");
		Ok(Layer { id, name, tileData: tileData.into_boxed_slice(), compressedTileData })
	}
}
