//! Public request/response DTOs for the HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub struct HealthOut {
    pub status: &'static str,
    pub timestamp: String,
}

/// Body of POST /api/analyze. Fields are optional so the handler can name
/// the missing one in its 400 instead of relying on a serde error string.
#[derive(Deserialize)]
pub struct AnalyzeIn {
    pub content: Option<serde_json::Value>,
    #[serde(rename = "systemPrompt")]
    pub system_prompt: Option<String>,
    pub mode: Option<String>,
}

/// Body of POST /api/analyze-2ar (second-year variant).
#[derive(Deserialize)]
pub struct Analyze2arIn {
    #[serde(rename = "systemPrompt")]
    pub system_prompt: Option<String>,
    #[serde(rename = "userPrompt")]
    pub user_prompt: Option<String>,
}

/// Success body of POST /api/process-document.
#[derive(Serialize)]
pub struct ConvertOut {
    #[serde(rename = "pdfData")]
    pub pdf_data: String,
    pub equations: Vec<String>,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub format: &'static str,
}

/// Query of GET /api/islenskubraut/pdf.
#[derive(Debug, Deserialize)]
pub struct PdfQuery {
    pub flokkur: Option<String>,
    pub stig: Option<String>,
}
