//! Pixel dimensions of the tileset image, read straight from the PNG IHDR chunk
//! without decoding anything else.

use {
	byteorder::{ReadBytesExt, BE},
	std::{
		fs::File,
		io::{self, BufReader, Read},
		path::{Path, PathBuf},
	},
};

pub const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n'];

/// IHDR length and chunk type, between the magic and the width.
const SKIPPED_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
	pub width: u32,
	pub height: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
	#[error("{0:?} not found")]
	Missing(PathBuf),

	#[error("{0:?} exists but it's not a PNG image")]
	NotPng(PathBuf),

	#[error("{path:?}: {source}")]
	Io { path: PathBuf, source: io::Error },
}

/// PNG stores every integer big-endian regardless of the host.
pub fn readBigEndianU32(reader: &mut impl Read) -> io::Result<u32> {
	reader.read_u32::<BE>()
}

/// `Ok(None)` when the magic does not match.
pub fn readHeader(reader: &mut impl Read) -> io::Result<Option<ImageInfo>> {
	let mut magic = [0; PNG_MAGIC.len()];
	match reader.read_exact(&mut magic) {
		Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
		result => result?,
	}
	if magic != PNG_MAGIC {
		return Ok(None);
	}
	reader.read_exact(&mut [0; SKIPPED_LEN])?;
	Ok(Some(ImageInfo { width: readBigEndianU32(reader)?, height: readBigEndianU32(reader)? }))
}

pub fn probe(path: &Path) -> Result<ImageInfo, ProbeError> {
	let ioError = |source| ProbeError::Io { path: path.to_owned(), source };
	let file = match File::open(path) {
		Err(err) if err.kind() == io::ErrorKind::NotFound => return Err(ProbeError::Missing(path.to_owned())),
		result => result.map_err(ioError)?,
	};
	readHeader(&mut BufReader::new(file)).map_err(ioError)?.ok_or_else(|| ProbeError::NotPng(path.to_owned()))
}
