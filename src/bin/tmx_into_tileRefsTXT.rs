#![warn(clippy::pedantic, elided_lifetimes_in_paths, explicit_outlives_requirements)]
#![allow(non_snake_case)]

// Prints the layers of a TMX written by pyxel2tiled, one map row per line.
// Each cell is `gid` plus `r<rotation>` and `x` when flipped horizontally, `.` when empty.

use {
	anyhow::Context,
	clap::Parser,
	pyxel2tiled::{
		gid::{self, EMPTY},
		stdoutRaw, tmx,
	},
	std::{
		fs::File,
		io::{BufReader, BufWriter, Write},
		path::PathBuf,
	},
};

fn main() -> anyhow::Result<()> {
	#[derive(Parser)]
	struct Args {
		tmxPath: PathBuf,

		/// Print raw 32-bit references in hex instead
		#[clap(long)]
		hex: bool,
	}
	let Args { tmxPath, hex } = Args::parse();
	let layers = tmx::readLayers(BufReader::new(
		File::open(&tmxPath).with_context(|| format!("{}", tmxPath.display()))?,
	))?;
	let stdout = &mut BufWriter::new(stdoutRaw());
	for layer in &layers {
		writeln!(
			stdout,
			"[{}] {:?} {}x{}",
			layer.id.map_or_else(|| "-".to_owned(), |id| id.to_string()),
			layer.name,
			layer.width,
			layer.height
		)?;
		for row in layer.rows() {
			let mut cells = row.iter().map(|&tileRef| {
				if hex {
					format!("{tileRef:08X}")
				} else if tileRef == EMPTY {
					".".to_owned()
				} else {
					let gid::Decoded { gid, rotation, flipHorizontal } = gid::decode(tileRef);
					format!("{gid}r{rotation}{}", if flipHorizontal { "x" } else { "" })
				}
			});
			if let Some(first) = cells.next() {
				write!(stdout, "{first}")?;
			}
			for cell in cells {
				write!(stdout, "\t{cell}")?;
			}
			writeln!(stdout)?;
		}
	}
	stdout.flush()?;
	Ok(())
}
