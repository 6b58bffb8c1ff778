//! Save options

/// Deflate effort used for package parts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionLevel {
    /// Store parts uncompressed
    None,
    Fast,
    #[default]
    Default,
    Best,
}

impl CompressionLevel {
    pub(crate) fn method(&self) -> zip::CompressionMethod {
        match self {
            CompressionLevel::None => zip::CompressionMethod::Stored,
            _ => zip::CompressionMethod::Deflated,
        }
    }

    pub(crate) fn level(&self) -> Option<i64> {
        match self {
            CompressionLevel::None => None,
            CompressionLevel::Fast => Some(1),
            CompressionLevel::Default => Some(6),
            CompressionLevel::Best => Some(9),
        }
    }
}

impl std::str::FromStr for CompressionLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "store" => Ok(CompressionLevel::None),
            "fast" => Ok(CompressionLevel::Fast),
            "default" => Ok(CompressionLevel::Default),
            "best" => Ok(CompressionLevel::Best),
            other => Err(format!("unknown compression level '{}'", other)),
        }
    }
}

/// Options applied when a package is written
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveOptions {
    pub compression: CompressionLevel,
}

impl SaveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_compression(mut self, compression: CompressionLevel) -> Self {
        self.compression = compression;
        self
    }
}
