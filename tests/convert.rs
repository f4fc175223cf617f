#![allow(non_snake_case)]

use {
	base64::{engine::general_purpose::STANDARD as BASE64, Engine},
	pyxel2tiled::{
		convert::outputPath, convertFile, gid::FLIPPED_VERTICALLY, gzip, tmx, ConvertOptions, Error,
	},
	std::{
		fs::{self, File},
		path::{Path, PathBuf},
		process::Command,
	},
	tempfile::TempDir,
};

const TWO_TILES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<tilemap tileswide="2" tileshigh="1" tilewidth="8" tileheight="8">
  <layer number="0" name="bg">
    <tile x="0" y="0" index="0" tile="5" rot="0" flipX="false"/>
    <tile x="1" y="0" index="1" tile="5" rot="2" flipX="true"/>
  </layer>
</tilemap>
"#;

fn writeSource(dir: &TempDir, xml: &str) -> PathBuf {
	let path = dir.path().join("town.xml");
	fs::write(&path, xml).unwrap();
	path
}

fn writePng(path: &Path, width: u32, height: u32) {
	let mut encoder = png::Encoder::new(File::create(path).unwrap(), width, height);
	encoder.set_color(png::ColorType::Grayscale);
	encoder.write_header().unwrap().write_image_data(&vec![0; (width * height) as usize]).unwrap();
}

/// The base64 text of every `<data>` element, in order.
fn dataTexts(tmx: &str) -> Vec<&str> {
	tmx.split(r#"<data encoding="base64" compression="gzip">"#)
		.skip(1)
		.map(|rest| &rest[..rest.find("</data>").unwrap()])
		.collect()
}

#[test]
fn two_tile_map_end_to_end() {
	let dir = tempfile::tempdir().unwrap();
	let input = writeSource(&dir, TWO_TILES);
	let conversion = convertFile(&input, &ConvertOptions::default()).unwrap();
	assert_eq!(conversion.outputPath, dir.path().join("town.tmx"));
	assert_eq!(conversion.layerCount, 1);
	assert_eq!(conversion.image, None);

	let tmx = fs::read_to_string(&conversion.outputPath).unwrap();
	assert!(tmx.contains(r#"width="2" height="1" tilewidth="8" tileheight="8" orientation="orthogonal""#));
	assert_eq!(tmx.matches("<layer ").count(), 1);
	let texts = dataTexts(&tmx);
	assert_eq!(texts.len(), 1);
	let tileData = gzip::decompress(&BASE64.decode(texts[0]).unwrap()).unwrap();
	let expected: Vec<u8> = [6_u32, 6 | FLIPPED_VERTICALLY].iter().flat_map(|tileRef| tileRef.to_le_bytes()).collect();
	assert_eq!(tileData, expected);
}

#[test]
fn missing_image_still_converts() {
	let dir = tempfile::tempdir().unwrap();
	let input = writeSource(&dir, TWO_TILES);
	convertFile(&input, &ConvertOptions::default()).unwrap();
	let tmx = fs::read_to_string(outputPath(&input)).unwrap();
	assert!(!tmx.contains("tilecount"));
	assert!(tmx.contains(r#"<image source="town.png"/>"#));
}

#[test]
fn probed_image_adds_tileset_dimensions() {
	let dir = tempfile::tempdir().unwrap();
	let input = writeSource(&dir, TWO_TILES);
	writePng(&dir.path().join("town.png"), 32, 16);
	let conversion = convertFile(&input, &ConvertOptions::default()).unwrap();
	assert!(conversion.image.is_some());
	let tmx = fs::read_to_string(conversion.outputPath).unwrap();
	assert!(tmx.contains(r#"tilecount="8""#));
	assert!(tmx.contains(r#"<image source="town.png" width="32" height="16"/>"#));
}

#[test]
fn non_png_image_is_only_a_warning() {
	let dir = tempfile::tempdir().unwrap();
	let input = writeSource(&dir, TWO_TILES);
	fs::write(dir.path().join("town.png"), "GIF89a, honestly").unwrap();
	let conversion = convertFile(&input, &ConvertOptions::default()).unwrap();
	assert_eq!(conversion.image, None);
}

#[test]
fn image_path_resolver_is_configurable() {
	let dir = tempfile::tempdir().unwrap();
	let input = writeSource(&dir, TWO_TILES);
	fs::create_dir(dir.path().join("art")).unwrap();
	writePng(&dir.path().join("art").join("town.png"), 16, 16);
	let options = ConvertOptions {
		imagePathResolver: |input| input.parent().unwrap().join("art").join(input.with_extension("png").file_name().unwrap()),
		..ConvertOptions::default()
	};
	let conversion = convertFile(&input, &options).unwrap();
	assert_eq!(conversion.image.map(|info| (info.width, info.height)), Some((16, 16)));
	let tmx = fs::read_to_string(conversion.outputPath).unwrap();
	assert!(tmx.contains(r#"<image source="art/town.png" width="16" height="16"/>"#));
}

#[test]
fn empty_required_attribute_writes_nothing() {
	let dir = tempfile::tempdir().unwrap();
	let input = writeSource(&dir, &TWO_TILES.replace(r#"tileswide="2""#, r#"tileswide="""#));
	match convertFile(&input, &ConvertOptions::default()) {
		Err(Error::MalformedInput { element: "tilemap", attribute, .. }) => assert_eq!(attribute, "tileswide"),
		other => panic!("expected malformed input, got {other:?}"),
	}
	assert!(!outputPath(&input).exists());
	assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn output_reads_back_through_tmx_reader() {
	let dir = tempfile::tempdir().unwrap();
	let xml = r#"<tilemap tileswide="2" tileshigh="2" tilewidth="8" tileheight="8">
  <layer number="0" name="ground">
    <tile tile="0" rot="0" flipX="false"/><tile tile="1" rot="1" flipX="false"/>
    <tile tile="-1" rot="0" flipX="false"/><tile tile="3" rot="3" flipX="true"/>
  </layer>
  <layer number="1" name="decor">
    <tile tile="4"/><tile tile="4"/><tile tile="4"/>
  </layer>
</tilemap>"#;
	let input = writeSource(&dir, xml);
	let conversion = convertFile(&input, &ConvertOptions::default()).unwrap();
	assert_eq!(conversion.layerCount, 1, "the three-tile layer is dropped");
	let layers = tmx::readLayers(std::io::BufReader::new(File::open(conversion.outputPath).unwrap())).unwrap();
	assert_eq!(layers[0].id, Some(1));
	assert_eq!(layers[0].tileRefs, [1, 0xA000_0002, 0, 0x2000_0004]);
}

#[test]
fn strict_layers_rejects_short_layer() {
	let dir = tempfile::tempdir().unwrap();
	let input = writeSource(&dir, &TWO_TILES.replace("    <tile x=\"1\"", "    <skipped x=\"1\""));
	let options = ConvertOptions { strictLayers: true, ..ConvertOptions::default() };
	assert!(matches!(convertFile(&input, &options), Err(Error::IncompleteLayer { filled: 1, capacity: 2, .. })));
	assert!(!outputPath(&input).exists());
}

#[test]
fn cli_exit_codes() {
	let exe = env!("CARGO_BIN_EXE_pyxel2tiled");
	let usage = Command::new(exe).output().unwrap();
	assert_eq!(usage.status.code(), Some(1));
	assert!(String::from_utf8_lossy(&usage.stdout).contains("Pyxel Edit"));

	let dir = tempfile::tempdir().unwrap();
	let input = writeSource(&dir, TWO_TILES);
	let converted = Command::new(exe).arg(&input).env_remove("RUST_LOG").output().unwrap();
	assert_eq!(converted.status.code(), Some(0));
	assert!(outputPath(&input).exists());
	let log = String::from_utf8_lossy(&converted.stderr);
	assert!(log.contains("town.png\" not found"), "{log}");
	assert!(log.contains("Open and save the tmx in Tiled"), "{log}");

	fs::write(dir.path().join("town.png"), "GIF89a, honestly").unwrap();
	let converted = Command::new(exe).arg(&input).env_remove("RUST_LOG").output().unwrap();
	assert_eq!(converted.status.code(), Some(0));
	assert!(String::from_utf8_lossy(&converted.stderr).contains("it's not a PNG image"));

	let broken = dir.path().join("broken.xml");
	fs::write(&broken, TWO_TILES.replace(r#"tileheight="8""#, r#"tileheight="""#)).unwrap();
	assert_eq!(Command::new(exe).arg(&broken).status().unwrap().code(), Some(1));
	assert!(!outputPath(&broken).exists());
}

#[test]
fn cli_config_file() {
	let dir = tempfile::tempdir().unwrap();
	let input = writeSource(&dir, TWO_TILES);
	let config = dir.path().join("options.toml");
	fs::write(&config, "emitMapVersion = false\nemitLayerId = false\n").unwrap();
	let status = Command::new(env!("CARGO_BIN_EXE_pyxel2tiled")).arg(&input).arg("--config").arg(&config).status().unwrap();
	assert_eq!(status.code(), Some(0));
	let tmx = fs::read_to_string(outputPath(&input)).unwrap();
	assert!(!tmx.contains("version=\"1.1\""));
	assert!(tmx.contains(r#"<layer width="2" height="1" name="bg">"#));
}
