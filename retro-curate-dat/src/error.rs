use retro_curate_core::{CurateError, ErrorKind};

/// Errors that can occur while loading metadata.
#[derive(Debug, thiserror::Error)]
pub enum DatError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot read {path}: {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("Invalid DAT file: {0}")]
    InvalidDat(String),

    #[error("Invalid machine database: {0}")]
    InvalidMachineXml(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Curate(#[from] CurateError),
}

impl DatError {
    pub fn invalid_dat(msg: impl Into<String>) -> Self {
        Self::InvalidDat(msg.into())
    }

    pub fn invalid_machine_xml(msg: impl Into<String>) -> Self {
        Self::InvalidMachineXml(msg.into())
    }

    pub fn cache(msg: impl Into<String>) -> Self {
        Self::Cache(msg.into())
    }

    pub fn file(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::File {
            path: path.display().to_string(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) | Self::File { .. } | Self::Cache(_) => ErrorKind::Io,
            Self::XmlParse(_)
            | Self::XmlAttribute(_)
            | Self::InvalidDat(_)
            | Self::InvalidMachineXml(_)
            | Self::Json(_) => ErrorKind::Metadata,
            Self::Curate(e) => e.kind(),
        }
    }
}
