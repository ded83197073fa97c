// =============================================================================
// HTML pages — MiniJinja templates
// =============================================================================
//
// Templates are compiled into the binary and registered with `.html` names,
// which turns on MiniJinja's HTML auto-escaping for every interpolated value.

use anyhow::{Context, Result};
use minijinja::Environment;
use serde::Serialize;

use crate::types::IndicatorRow;

const INDEX_TEMPLATE: &str = include_str!("../../templates/index.html");
const FETCH_ERROR_TEMPLATE: &str = include_str!("../../templates/fetch_error.html");

/// Indicator rows laid out for the HTML table.
#[derive(Debug, Serialize)]
pub struct TableView {
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

impl TableView {
    pub fn from_rows(rows: &[IndicatorRow]) -> Self {
        Self {
            columns: IndicatorRow::COLUMNS.to_vec(),
            rows: rows.iter().map(IndicatorRow::display_cells).collect(),
        }
    }
}

/// Everything the index page can show. Only `tickers` is required; the rest
/// is filled in after a successful fetch.
#[derive(Debug, Serialize)]
pub struct IndexView<'a> {
    pub tickers: &'a [String],
    pub selected: Option<&'a str>,
    pub table: Option<TableView>,
    pub download_name: Option<&'a str>,
    pub json_data: Option<String>,
}

impl<'a> IndexView<'a> {
    pub fn form(tickers: &'a [String]) -> Self {
        Self {
            tickers,
            selected: None,
            table: None,
            download_name: None,
            json_data: None,
        }
    }
}

pub struct Pages {
    env: Environment<'static>,
}

impl Pages {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.add_template("index.html", INDEX_TEMPLATE)
            .context("failed to compile index template")?;
        env.add_template("fetch_error.html", FETCH_ERROR_TEMPLATE)
            .context("failed to compile fetch error template")?;
        Ok(Self { env })
    }

    pub fn index(&self, view: &IndexView<'_>) -> Result<String> {
        self.env
            .get_template("index.html")?
            .render(view)
            .context("failed to render index page")
    }

    /// The generic failure fragment shown for any pipeline error.
    pub fn fetch_error(&self, ticker: &str) -> Result<String> {
        self.env
            .get_template("fetch_error.html")?
            .render(minijinja::context! { ticker })
            .context("failed to render fetch error")
    }
}
