#![warn(clippy::pedantic, elided_lifetimes_in_paths, explicit_outlives_requirements)]
#![allow(non_snake_case)]

use {
	anyhow::Context,
	clap::{CommandFactory, Parser},
	const_format::concatcp,
	pyxel2tiled::{convertFile, ConvertOptions},
	std::{path::PathBuf, process::ExitCode},
	tracing::error,
	tracing_subscriber::EnvFilter,
};

const RULE: &str = "===========";
const BANNER: &str = concatcp!(
	RULE,
	"\n",
	env!("CARGO_PKG_NAME"),
	"\n",
	RULE,
	"\nConverts xml tilemaps exported by Pyxel Edit\nto the Tiled format (tmx).\n"
);

fn main() -> ExitCode {
	#[derive(Parser)]
	#[clap(name = env!("CARGO_PKG_NAME"), version, about = "Converts Pyxel Edit XML tilemaps to Tiled TMX maps")]
	struct Args {
		/// Pyxel Edit tilemap export, e.g. town.xml; town.tmx is written next to it
		input: Option<PathBuf>,

		/// TOML file with conversion options
		#[clap(long)]
		config: Option<PathBuf>,

		/// Fail on a layer with fewer tiles than the map has cells instead of dropping it
		#[clap(long)]
		strictLayers: bool,

		#[clap(long)]
		noMapVersion: bool,

		#[clap(long)]
		noLayerId: bool,

		/// Leave tilecount and image width/height out even when the PNG could be read
		#[clap(long)]
		noTilesetDimensions: bool,
	}

	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.with_writer(std::io::stderr)
		.with_target(false)
		.init();

	let Args { input, config, strictLayers, noMapVersion, noLayerId, noTilesetDimensions } = Args::parse();
	let Some(input) = input else {
		println!("{BANNER}");
		_ = Args::command().print_help();
		return ExitCode::FAILURE;
	};
	let run = || -> anyhow::Result<()> {
		let mut options = match &config {
			Some(path) => ConvertOptions::fromTomlFile(path).with_context(|| format!("{}", path.display()))?,
			None => ConvertOptions::default(),
		};
		options.strictLayers |= strictLayers;
		options.emitMapVersion &= !noMapVersion;
		options.emitLayerId &= !noLayerId;
		options.emitTilesetDimensions &= !noTilesetDimensions;
		convertFile(&input, &options).with_context(|| format!("{}", input.display()))?;
		Ok(())
	};
	match run() {
		Ok(()) => ExitCode::SUCCESS,
		Err(err) => {
			error!("{err:#}");
			ExitCode::FAILURE
		}
	}
}
