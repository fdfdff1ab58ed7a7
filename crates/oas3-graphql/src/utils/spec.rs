use std::path::Path;

use anyhow::Context as _;
use fmmap::tokio::{AsyncMmapFile, AsyncMmapFileExt};

use crate::generator::document::OpenApiDocument;

/// Memory-maps an OpenAPI JSON document for parsing.
pub struct SpecLoader {
  file: AsyncMmapFile,
}

impl SpecLoader {
  pub async fn open(path: &Path) -> anyhow::Result<Self> {
    let file = AsyncMmapFile::open(path)
      .await
      .with_context(|| format!("opening {}", path.display()))?;
    Ok(Self { file })
  }

  pub fn parse(&self) -> anyhow::Result<OpenApiDocument> {
    Ok(OpenApiDocument::from_slice(self.file.as_slice())?)
  }
}
