use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnalyzeEnvelope {
    #[serde(rename = "analyzeResult")]
    #[schemars(description = "The layout-analysis result produced by the document-analysis service")]
    pub analyze_result: AnalyzeResult,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResult {
    #[schemars(
        description = "Full extracted text of the document in reading order. Only used by the raw-text fallback."
    )]
    pub content: String,

    #[serde(default)]
    #[schemars(
        description = "Tables in document order. One logical table may be split across several entries when it spans pages."
    )]
    pub tables: Vec<AnalysisTable>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisTable {
    pub row_count: usize,
    pub column_count: usize,
    #[serde(default)]
    pub cells: Vec<AnalysisCell>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisCell {
    #[serde(default)]
    #[schemars(description = "Cell role as reported by the service, e.g. 'columnHeader'")]
    pub kind: Option<String>,

    pub row_index: usize,
    pub column_index: usize,

    #[serde(default)]
    pub row_span: Option<usize>,
    #[serde(default)]
    pub column_span: Option<usize>,

    #[serde(default)]
    #[schemars(description = "Recognized text of the cell. Missing content reads as empty text.")]
    pub content: String,

    #[serde(default)]
    pub spans: Vec<Span>,

    #[serde(default)]
    pub bounding_regions: Vec<BoundingRegion>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Span {
    pub offset: usize,
    pub length: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BoundingRegion {
    pub page_number: u32,
    #[serde(default)]
    pub polygon: Vec<f64>,
}

impl AnalyzeResult {
    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(AnalyzeEnvelope)
    }

    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}

/// A positioned piece of text inside one table fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub row_index: usize,
    pub col_index: usize,
    pub text: String,
    pub byte_offset: Option<usize>,
    pub page_number: Option<u32>,
}

/// One table fragment as delivered by the analysis service.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub row_count: usize,
    pub col_count: usize,
    pub cells: Vec<Cell>,
}

/// The parts of an analysis result the ledger engine works on.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub content: String,
    pub tables: Vec<Table>,
}

impl From<&AnalysisCell> for Cell {
    fn from(cell: &AnalysisCell) -> Self {
        Self {
            row_index: cell.row_index,
            col_index: cell.column_index,
            text: cell.content.clone(),
            byte_offset: cell.spans.first().map(|s| s.offset),
            page_number: cell.bounding_regions.first().map(|r| r.page_number),
        }
    }
}

impl From<&AnalysisTable> for Table {
    fn from(table: &AnalysisTable) -> Self {
        Self {
            row_count: table.row_count,
            col_count: table.column_count,
            cells: table.cells.iter().map(Cell::from).collect(),
        }
    }
}

impl From<&AnalyzeResult> for Document {
    fn from(result: &AnalyzeResult) -> Self {
        Self {
            content: result.content.clone(),
            tables: result.tables.iter().map(Table::from).collect(),
        }
    }
}
