//! Typed tool contract for the external orchestration layer
//!
//! The answering agent lives outside this crate; it only gets a fixed set
//! of tools with typed arguments and results. The orchestrator registers
//! the JSON-schema definitions below, the core executes `search` and
//! `calculate` and validates `chart` specs for the external renderer.
//! Nothing here dispatches dynamically.

use crate::error::{Error, Result};
use crate::retrieve::{RetrieveOptions, Retriever};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

/// The fixed set of tool kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    Search,
    Calculate,
    Chart,
}

impl ToolKind {
    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::Search => "search_filing",
            ToolKind::Calculate => "calculate",
            ToolKind::Chart => "create_chart",
        }
    }
}

/// Tool definition handed to the orchestrator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Get all available tool definitions
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: ToolKind::Search.name().to_string(),
            description: "Search the ingested filing for passages relevant to a question. \
                          Returns provenance-tagged passages ordered by relevance."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Natural-language question or keywords"
                    },
                    "top_k": {
                        "type": "integer",
                        "description": "Maximum passages to return",
                        "minimum": 1,
                        "maximum": 20
                    }
                },
                "required": ["query"]
            }),
        },
        ToolDefinition {
            name: ToolKind::Calculate.name().to_string(),
            description: "Compute a named financial figure from reported values. \
                          Use this instead of doing arithmetic by hand."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "op": {
                        "type": "string",
                        "enum": ["growth_rate", "ratio", "difference", "percent_of_total"]
                    },
                    "current": { "type": "number" },
                    "previous": { "type": "number" },
                    "numerator": { "type": "number" },
                    "denominator": { "type": "number" },
                    "minuend": { "type": "number" },
                    "subtrahend": { "type": "number" },
                    "part": { "type": "number" },
                    "total": { "type": "number" }
                },
                "required": ["op"]
            }),
        },
        ToolDefinition {
            name: ToolKind::Chart.name().to_string(),
            description: "Render a chart from labelled values. The core validates the \
                          spec; an external collaborator draws it."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "kind": {
                        "type": "string",
                        "enum": ["bar", "line", "area", "pie"]
                    },
                    "labels": { "type": "array", "items": { "type": "string" } },
                    "values": {
                        "type": "array",
                        "items": { "type": ["number", "null"] }
                    },
                    "title": { "type": "string" }
                },
                "required": ["kind", "labels", "values", "title"]
            }),
        },
    ]
}

/// Arguments for the search tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchArgs {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<usize>,
}

/// One provenance-tagged passage in a search result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPassage {
    pub text: String,
    pub relevance: f32,
    pub page_label: String,
    pub section_type: String,
}

/// Execute the search tool against the retrieval engine.
pub async fn run_search(
    retriever: &Retriever,
    options: &RetrieveOptions,
    args: &SearchArgs,
) -> Result<Vec<SearchPassage>> {
    info!("[tool:{}] {}", ToolKind::Search.name(), args.query);

    let mut options = options.clone();
    if let Some(top_k) = args.top_k {
        options.top_k = top_k.clamp(1, 20);
    }

    let ranked = retriever.retrieve(&args.query, &options).await?;

    Ok(ranked
        .into_iter()
        .map(|r| SearchPassage {
            text: r.chunk.text,
            relevance: r.score,
            page_label: r.chunk.page_label,
            section_type: r.chunk.section_type.as_str().to_string(),
        })
        .collect())
}

/// Render passages as tagged blocks for the answering agent's context
/// window. Empty input renders the explicit no-data marker rather than an
/// empty string.
pub fn render_passages(passages: &[SearchPassage]) -> String {
    if passages.is_empty() {
        return "NO_RELEVANT_DATA_FOUND".to_string();
    }

    passages
        .iter()
        .enumerate()
        .map(|(i, p)| {
            format!(
                "<DATA_CHUNK ID='{}' RELEVANCE='{:.3}'>\nSOURCE: Page {}, Section: {}\nCONTENT: {}\n</DATA_CHUNK>",
                i,
                p.relevance,
                p.page_label,
                p.section_type,
                p.text.trim()
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Arguments for the calculate tool, one variant per named operation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum CalcArgs {
    /// Period-over-period growth in percent
    GrowthRate { current: f64, previous: f64 },
    Ratio { numerator: f64, denominator: f64 },
    Difference { minuend: f64, subtrahend: f64 },
    /// Share of a total in percent
    PercentOfTotal { part: f64, total: f64 },
}

/// Execute the calculate tool.
pub fn run_calculate(args: &CalcArgs) -> Result<f64> {
    let value = match *args {
        CalcArgs::GrowthRate { current, previous } => {
            if previous == 0.0 {
                return Err(Error::Tool(
                    "growth_rate: previous value must be non-zero".to_string(),
                ));
            }
            (current - previous) / previous * 100.0
        }
        CalcArgs::Ratio {
            numerator,
            denominator,
        } => {
            if denominator == 0.0 {
                return Err(Error::Tool("ratio: denominator must be non-zero".to_string()));
            }
            numerator / denominator
        }
        CalcArgs::Difference {
            minuend,
            subtrahend,
        } => minuend - subtrahend,
        CalcArgs::PercentOfTotal { part, total } => {
            if total == 0.0 {
                return Err(Error::Tool(
                    "percent_of_total: total must be non-zero".to_string(),
                ));
            }
            part / total * 100.0
        }
    };

    if !value.is_finite() {
        return Err(Error::Tool("calculation overflowed".to_string()));
    }

    Ok(value)
}

/// Chart style tag understood by the external renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Line,
    Area,
    Pie,
}

/// Chart request as submitted by the orchestrator. Values may be null
/// when the agent could not recover a number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub values: Vec<Option<f64>>,
    pub title: String,
}

/// Validated chart data ready for the external renderer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartData {
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub title: String,
}

impl ChartSpec {
    /// Validate arity and clean null values to 0.0.
    pub fn validate(self) -> Result<ChartData> {
        if self.labels.is_empty() {
            return Err(Error::Tool("chart: labels must be non-empty".to_string()));
        }

        if self.labels.len() != self.values.len() {
            return Err(Error::Tool(format!(
                "chart: {} labels but {} values",
                self.labels.len(),
                self.values.len()
            )));
        }

        Ok(ChartData {
            kind: self.kind,
            labels: self.labels,
            values: self.values.into_iter().map(|v| v.unwrap_or(0.0)).collect(),
            title: self.title,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definitions_cover_every_kind() {
        let defs = tool_definitions();
        let names: Vec<&str> = defs.iter().map(|d| d.name.as_str()).collect();

        assert_eq!(
            names,
            vec!["search_filing", "calculate", "create_chart"]
        );
        assert!(defs.iter().all(|d| d.input_schema.is_object()));
    }

    #[test]
    fn test_calc_growth_rate() {
        let value = run_calculate(&CalcArgs::GrowthRate {
            current: 112_010.0,
            previous: 93_736.0,
        })
        .unwrap();
        assert!((value - 19.497).abs() < 0.01);
    }

    #[test]
    fn test_calc_rejects_zero_denominators() {
        assert!(run_calculate(&CalcArgs::GrowthRate {
            current: 1.0,
            previous: 0.0
        })
        .is_err());
        assert!(run_calculate(&CalcArgs::Ratio {
            numerator: 1.0,
            denominator: 0.0
        })
        .is_err());
        assert!(run_calculate(&CalcArgs::PercentOfTotal {
            part: 1.0,
            total: 0.0
        })
        .is_err());
    }

    #[test]
    fn test_calc_args_wire_format() {
        let args: CalcArgs = serde_json::from_str(
            r#"{ "op": "percent_of_total", "part": 178353, "total": 416161 }"#,
        )
        .unwrap();
        let value = run_calculate(&args).unwrap();
        assert!((value - 42.857).abs() < 0.01);
    }

    #[test]
    fn test_chart_null_values_cleaned() {
        let spec = ChartSpec {
            kind: ChartKind::Pie,
            labels: vec!["iPhone".to_string(), "Services".to_string()],
            values: vec![Some(211_013.0), None],
            title: "Revenue mix".to_string(),
        };

        let data = spec.validate().unwrap();
        assert_eq!(data.values, vec![211_013.0, 0.0]);
    }

    #[test]
    fn test_chart_arity_mismatch_rejected() {
        let spec = ChartSpec {
            kind: ChartKind::Bar,
            labels: vec!["2024".to_string(), "2025".to_string()],
            values: vec![Some(1.0)],
            title: "t".to_string(),
        };
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_render_passages_tags_provenance() {
        let passages = vec![SearchPassage {
            text: "|Cash|100|".to_string(),
            relevance: 0.91,
            page_label: "28".to_string(),
            section_type: "financial_statement".to_string(),
        }];

        let rendered = render_passages(&passages);
        assert!(rendered.contains("RELEVANCE='0.910'"));
        assert!(rendered.contains("Page 28"));
        assert!(rendered.contains("financial_statement"));
    }

    #[test]
    fn test_render_empty_is_explicit() {
        assert_eq!(render_passages(&[]), "NO_RELEVANT_DATA_FOUND");
    }
}
