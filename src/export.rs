// =============================================================================
// Export document — analysis prompt + trailing indicator rows
// =============================================================================
//
// One file per ticker, `<TICKER>_tech_data.json`, overwritten on every fetch:
//
//   { "Analysis": "<fixed prompt>", "StockData": [ { "Date": .., ... }, ... ] }
//
// Each write goes through its own tmp sibling + rename, so a concurrent
// download never sees a half-written file and concurrent fetches of the same
// ticker end with whichever rename lands last.
// =============================================================================

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::types::IndicatorRow;

/// Instruction prompt shipped with every export, identical for all tickers.
pub const ANALYSIS_PROMPT: &str = "Act like a stock option trading expert for the Indian stock market.\n\
I will give you technical data of a stock for the last 5 trading sessions. \
You need to analyze the trend based on the last 5 days and also analyze the technical tools \
like values of each tool (increased or decreased) and its current value, what may happen with its probability. \
Also, search for the latest option chain data of the stock if available and give an overall recommendation.\n\
The recommendation should be based on a strategy - proper strategy with entry and exits and what to do if gone in favor or if in reverse direction how to manage";

const FILE_SUFFIX: &str = "_tech_data.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    #[serde(rename = "Analysis")]
    pub analysis: String,
    #[serde(rename = "StockData")]
    pub stock_data: Vec<IndicatorRow>,
}

impl ExportDocument {
    pub fn new(rows: Vec<IndicatorRow>) -> Self {
        Self {
            analysis: ANALYSIS_PROMPT.to_string(),
            stock_data: rows,
        }
    }

    /// Pretty JSON with 4-space indentation, as written to disk.
    pub fn to_pretty_json(&self) -> Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)
            .context("failed to serialise export document")?;
        String::from_utf8(buf).context("export document is not valid UTF-8")
    }
}

pub fn export_filename(ticker: &str) -> String {
    format!("{ticker}{FILE_SUFFIX}")
}

/// A bare file name that cannot escape the directory it is joined onto.
pub fn is_safe_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && !name.contains("..")
        && !name.contains(['/', '\\', '\0'])
}

/// Write the export for `ticker` into `dir`, replacing any previous one.
///
/// Returns the file name (relative to `dir`) and the document that was
/// written.
pub fn save_export(
    dir: &Path,
    ticker: &str,
    rows: Vec<IndicatorRow>,
) -> Result<(String, ExportDocument)> {
    let filename = export_filename(ticker);
    if !is_safe_file_name(&filename) {
        anyhow::bail!("refusing to export ticker {ticker:?}: not a plain file name");
    }

    let document = ExportDocument::new(rows);
    let content = document.to_pretty_json()?;

    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create export dir {}", dir.display()))?;

    let path = dir.join(&filename);
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create tmp export in {}", dir.display()))?;

    tmp.write_all(content.as_bytes())
        .with_context(|| format!("failed to write tmp export to {}", tmp.path().display()))?;

    tmp.persist(&path)
        .map_err(|e| e.error)
        .with_context(|| format!("failed to rename tmp export to {}", path.display()))?;

    info!(
        path = %path.display(),
        rows = document.stock_data.len(),
        "export written"
    );
    Ok((filename, document))
}
