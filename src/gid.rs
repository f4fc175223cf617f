//! Tile references: a global tile id in the low 29 bits, Tiled's three flip
//! flags in the top 3.

use core::fmt;

pub const FLIPPED_HORIZONTALLY: u32 = 0x8000_0000;
pub const FLIPPED_VERTICALLY: u32 = 0x4000_0000;
pub const FLIPPED_DIAGONALLY: u32 = 0x2000_0000;
pub const FLAGS_MASK: u32 = FLIPPED_HORIZONTALLY | FLIPPED_VERTICALLY | FLIPPED_DIAGONALLY;
pub const GID_MASK: u32 = !FLAGS_MASK;

/// The single tileset always starts here.
pub const FIRSTGID: u32 = 1;

/// An empty cell.
pub const EMPTY: u32 = 0;

const H: u32 = FLIPPED_HORIZONTALLY;
const V: u32 = FLIPPED_VERTICALLY;
const D: u32 = FLIPPED_DIAGONALLY;

/*
	Pyxel Edit rotates clockwise in 90 degree steps after an optional horizontal flip.
	Tiled applies the diagonal flip first, then horizontal, then vertical.

	rotation | no flipX | flipX
	---------+----------+------
	       0 |          | H
	       1 | H D      | H V D
	       2 | H V      | V
	       3 | V D      | D
*/
static FLAGS: [[u32; 2]; 4] = [[0, H], [H | D, H | V | D], [H | V, V], [V | D, D]];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Rotation {
	R0 = 0,
	R90 = 1,
	R180 = 2,
	R270 = 3,
}

impl Rotation {
	pub const ALL: [Rotation; 4] = [Rotation::R0, Rotation::R90, Rotation::R180, Rotation::R270];
}

impl TryFrom<u32> for Rotation {
	type Error = u32;
	fn try_from(rotationClass: u32) -> Result<Self, Self::Error> {
		Ok(match rotationClass {
			0 => Rotation::R0,
			1 => Rotation::R90,
			2 => Rotation::R180,
			3 => Rotation::R270,
			_ => return Err(rotationClass),
		})
	}
}

impl fmt::Display for Rotation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", *self as u8)
	}
}

#[inline]
pub fn flagBits(rotation: Rotation, flipHorizontal: bool) -> u32 {
	FLAGS[rotation as usize][flipHorizontal as usize]
}

/// Packs a 0-based tileset index. `rawIndex + firstgid` must pass [`checkedGid`];
/// [`TileRecord::tileRef`] is the checked entry point.
#[inline]
pub fn encode(rawIndex: u32, rotation: Rotation, flipHorizontal: bool, firstgid: u32) -> u32 {
	debug_assert!(checkedGid(rawIndex, firstgid).is_some(), "tile index {rawIndex} does not fit beside the flip flags");
	encodeGid(rawIndex.wrapping_add(firstgid), rotation, flipHorizontal)
}

/// Packs an id that already has `firstgid` added.
#[inline]
pub fn encodeGid(gid: u32, rotation: Rotation, flipHorizontal: bool) -> u32 {
	debug_assert_eq!(gid & FLAGS_MASK, 0, "gid {gid} collides with the flip flags");
	gid | flagBits(rotation, flipHorizontal)
}

/// `None` when `rawIndex + firstgid` would spill into the flag bits.
pub fn checkedGid(rawIndex: u32, firstgid: u32) -> Option<u32> {
	rawIndex.checked_add(firstgid).filter(|&gid| gid & FLAGS_MASK == 0)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decoded {
	pub gid: u32,
	pub rotation: Rotation,
	pub flipHorizontal: bool,
}

/// Inverse of [`encodeGid`]. The table covers all eight flag combinations exactly once.
pub fn decode(tileRef: u32) -> Decoded {
	let flags = tileRef & FLAGS_MASK;
	for rotation in Rotation::ALL {
		for flipHorizontal in [false, true] {
			if flagBits(rotation, flipHorizontal) == flags {
				return Decoded { gid: tileRef & GID_MASK, rotation, flipHorizontal };
			}
		}
	}
	unreachable!("flag table is a bijection")
}

/// One `<tile>` of the source map. `rawIndex` is `None` for an empty cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileRecord {
	pub rawIndex: Option<u32>,
	pub rotation: Rotation,
	pub flipHorizontal: bool,
}

impl TileRecord {
	pub fn tileRef(&self, firstgid: u32) -> Option<u32> {
		match self.rawIndex {
			None => Some(EMPTY),
			Some(rawIndex) => Some(encodeGid(checkedGid(rawIndex, firstgid)?, self.rotation, self.flipHorizontal)),
		}
	}
}
