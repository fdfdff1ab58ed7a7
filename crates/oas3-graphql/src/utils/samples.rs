use std::{ffi::OsStr, path::Path};

use anyhow::Context as _;

use crate::generator::responses::OverrideSamples;

/// Reads every `*.json` file in `dir` into memory, keyed by file name and
/// sorted so repeated runs see the same samples in the same order.
pub async fn load_samples(dir: &Path) -> anyhow::Result<OverrideSamples> {
  let mut entries = tokio::fs::read_dir(dir)
    .await
    .with_context(|| format!("reading override directory {}", dir.display()))?;

  let mut files = Vec::new();
  while let Some(entry) = entries.next_entry().await? {
    let path = entry.path();
    if path.extension().and_then(OsStr::to_str) != Some("json") || !entry.file_type().await?.is_file() {
      continue;
    }
    if let Some(name) = path.file_name().and_then(OsStr::to_str) {
      files.push((name.to_string(), path));
    }
  }
  files.sort_by(|(a, _), (b, _)| a.cmp(b));

  let mut samples = OverrideSamples::new();
  for (name, path) in files {
    let contents = tokio::fs::read_to_string(&path)
      .await
      .with_context(|| format!("reading override sample {}", path.display()))?;
    samples.insert(name, contents);
  }
  Ok(samples)
}
