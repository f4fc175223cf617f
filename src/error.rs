use std::io;

pub type Result<T, E = Error> = core::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("something wrong with the <{element}> element: attribute {attribute:?} {reason}")]
	MalformedInput { element: &'static str, attribute: String, reason: String },

	#[error("{0}")]
	Configuration(String),

	#[error("layer {layer:?} already holds all of its {capacity} tiles")]
	Overflow { layer: String, capacity: usize },

	#[error("layer {name:?} ended after {filled} of {capacity} tiles")]
	IncompleteLayer { name: String, filled: usize, capacity: usize },

	#[error("tile index {index} does not fit below the flip flag bits")]
	TileIndexOutOfRange { index: u32 },

	#[error("XML: {0}")]
	Xml(#[from] quick_xml::Error),

	#[error(transparent)]
	Io(#[from] io::Error),

	#[error("base64: {0}")]
	Base64(#[from] base64::DecodeError),

	#[error("config: {0}")]
	ConfigFile(#[from] toml::de::Error),
}

impl Error {
	pub(crate) fn malformed(element: &'static str, attribute: &str, reason: impl Into<String>) -> Self {
		Error::MalformedInput { element, attribute: attribute.to_owned(), reason: reason.into() }
	}
}
