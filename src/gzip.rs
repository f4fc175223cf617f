use {
	flate2::{read::GzDecoder, write::GzEncoder, Compression},
	std::io::{self, Read, Write},
};

/// What TMX calls `compression="gzip"`.
pub fn compress(bytes: &[u8]) -> io::Result<Vec<u8>> {
	let mut encoder = GzEncoder::new(Vec::with_capacity(bytes.len() / 4), Compression::default());
	encoder.write_all(bytes)?;
	encoder.finish()
}

pub fn decompress(compressed: &[u8]) -> io::Result<Vec<u8>> {
	let mut bytes = Vec::with_capacity(compressed.len() * 4);
	GzDecoder::new(compressed).read_to_end(&mut bytes)?;
	Ok(bytes)
}
