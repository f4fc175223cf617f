#![warn(clippy::pedantic, elided_lifetimes_in_paths, explicit_outlives_requirements)]
#![allow(non_snake_case)]

pub mod assembly;
pub mod config;
pub mod convert;
pub mod error;
pub mod gid;
pub mod gzip;
pub mod layer;
pub mod pngHeader;
pub mod pyxel;
pub mod tmx;

pub use {
	assembly::{Map, MapAssembly, MapMetadata, SourceEvent},
	config::ConvertOptions,
	convert::{convertFile, Conversion},
	error::{Error, Result},
	gid::{decode, encode, Rotation, TileRecord},
	layer::{Layer, LayerAccumulator},
};

use std::{
	fs::File,
	io::{self, Read},
};

pub fn io_readToString(mut reader: impl Read) -> io::Result<String> {
	let mut string = String::new();
	reader.read_to_string(&mut string)?;
	Ok(string)
}

#[cfg(unix)]
pub fn stdoutRaw() -> File {
	use std::os::unix::io::FromRawFd;
	unsafe { File::from_raw_fd(1) }
}

#[cfg(windows)]
pub fn stdoutRaw() -> File {
	use std::os::windows::io::{AsRawHandle, FromRawHandle};
	unsafe { File::from_raw_handle(io::stdout().as_raw_handle()) }
}
