//! HTTP endpoint handlers. Each handler validates its input, forwards to the
//! owning module and maps failures onto the `ApiError` taxonomy.

use std::sync::Arc;

use axum::{
    extract::{Multipart, Query, State},
    http::{header, HeaderValue},
    response::IntoResponse,
    Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde_json::Value;
use tracing::{error, info, instrument};

use crate::convert::{self, TempGuard, MAX_UPLOAD_BYTES};
use crate::error::{ApiError, ApiResult};
use crate::flashcards::{render_pdf, Stig};
use crate::protocol::*;
use crate::state::AppState;

const MAX_SYSTEM_PROMPT_CHARS: usize = 30_000;
const MAX_USER_PROMPT_CHARS: usize = 100_000;
const MAX_CONTENT_BYTES: usize = 5 * 1024 * 1024;

#[instrument(level = "info")]
pub async fn health() -> impl IntoResponse {
    Json(HealthOut { status: "ok", timestamp: chrono::Utc::now().to_rfc3339() })
}

/// Shared tail of the two analysis endpoints: size caps, then the upstream
/// call with taxonomy mapping.
async fn run_analysis(
    state: &AppState,
    system_prompt: &str,
    content: Value,
) -> ApiResult<Json<Value>> {
    if system_prompt.chars().count() > MAX_SYSTEM_PROMPT_CHARS {
        return Err(ApiError::Validation(
            "systemPrompt má ekki vera lengra en 30000 stafir.".into(),
        ));
    }
    let serialized_len = serde_json::to_string(&content)
        .map(|s| s.len())
        .unwrap_or(usize::MAX);
    if serialized_len > MAX_CONTENT_BYTES {
        return Err(ApiError::Validation("content má ekki vera stærra en 5MB.".into()));
    }

    let claude = state.claude.as_ref().ok_or(ApiError::Misconfigured)?;
    let out = claude.analyze(system_prompt, content).await?;
    Ok(Json(out))
}

#[instrument(level = "info", skip_all, fields(mode = body.mode.as_deref().unwrap_or("")))]
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AnalyzeIn>,
) -> ApiResult<Json<Value>> {
    let content = body
        .content
        .ok_or_else(|| ApiError::Validation("content vantar í beiðnina.".into()))?;
    let system_prompt = body
        .system_prompt
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("systemPrompt vantar í beiðnina.".into()))?;
    let mode = body
        .mode
        .ok_or_else(|| ApiError::Validation("mode vantar í beiðnina.".into()))?;
    if mode != "teacher" && mode != "student" {
        return Err(ApiError::Validation(
            "Invalid mode: mode verður að vera 'teacher' eða 'student'.".into(),
        ));
    }

    info!(target: "kvenno_backend", %mode, "Analysis requested");
    run_analysis(&state, &system_prompt, content).await
}

#[instrument(level = "info", skip_all)]
pub async fn analyze_2ar(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Analyze2arIn>,
) -> ApiResult<Json<Value>> {
    let system_prompt = body
        .system_prompt
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("systemPrompt vantar í beiðnina.".into()))?;
    let user_prompt = body
        .user_prompt
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("userPrompt vantar í beiðnina.".into()))?;
    if user_prompt.chars().count() > MAX_USER_PROMPT_CHARS {
        return Err(ApiError::Validation(
            "userPrompt má ekki vera lengra en 100000 stafir.".into(),
        ));
    }

    run_analysis(&state, &system_prompt, Value::String(user_prompt)).await
}

#[instrument(level = "info", skip_all)]
pub async fn process_document(mut multipart: Multipart) -> ApiResult<Json<ConvertOut>> {
    // Fail fast before touching the filesystem if the converter is missing.
    if !convert::soffice_available().await {
        return Err(ApiError::Dependency(
            "Skjalabreyting er ekki tiltæk: LibreOffice vantar á þjóninn.".into(),
        ));
    }

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::Validation("Ógild skráarsending.".into()))?
    {
        if field.name() == Some("file") {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let data = field
                .bytes()
                .await
                .map_err(|_| ApiError::Validation("Ógild skráarsending.".into()))?;
            upload = Some((file_name, data));
            break;
        }
    }
    let (file_name, data) = upload
        .ok_or_else(|| ApiError::Validation("Engin skrá fylgdi beiðninni (reitur 'file').".into()))?;

    // The extension check wins over any declared content type.
    if !file_name.to_lowercase().ends_with(".docx") {
        return Err(ApiError::Validation("Aðeins .docx skrár eru studdar.".into()));
    }
    if data.len() > MAX_UPLOAD_BYTES {
        return Err(ApiError::Validation("Skráin má ekki vera stærri en 10MB.".into()));
    }

    // Random basename: no attacker-controlled characters reach the
    // subprocess argument vector. The guard unlinks on every exit path.
    let source = std::env::temp_dir().join(convert::random_basename());
    let mut guard = TempGuard::new();
    tokio::fs::write(&source, &data).await.map_err(|e| {
        error!(target: "convert", error = %e, "Failed to persist upload");
        ApiError::Conversion
    })?;
    guard.track(source.clone());

    // Best-effort: a missing pandoc just means an empty equation list.
    let equations = convert::extract_equations(&source).await;

    let pdf_path = convert::convert_to_pdf(&source).await?;
    guard.track(pdf_path.clone());
    let pdf = tokio::fs::read(&pdf_path).await.map_err(|e| {
        error!(target: "convert", error = %e, "Failed to read converted output");
        ApiError::Conversion
    })?;

    info!(target: "convert", pdf_bytes = pdf.len(), equations = equations.len(), "Document converted");
    Ok(Json(ConvertOut {
        pdf_data: BASE64.encode(&pdf),
        equations,
        kind: "converted-pdf",
        format: "pdf",
    }))
}

#[instrument(level = "info", skip(state), fields(flokkur = q.flokkur.as_deref().unwrap_or(""), stig = q.stig.as_deref().unwrap_or("")))]
pub async fn flashcard_pdf(
    State(state): State<Arc<AppState>>,
    Query(q): Query<PdfQuery>,
) -> ApiResult<impl IntoResponse> {
    let flokkur = q
        .flokkur
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::Validation("flokkur vantar í fyrirspurnina.".into()))?;
    let stig_raw = q
        .stig
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::Validation("stig vantar í fyrirspurnina.".into()))?;
    let stig: Stig = stig_raw
        .parse()
        .map_err(|_| ApiError::Validation("stig verður að vera A1, A2 eða B1.".into()))?;

    let category = state
        .categories
        .get(&flokkur)
        .ok_or_else(|| ApiError::NotFound(format!("Flokkurinn '{}' fannst ekki.", flokkur)))?;

    let bytes = render_pdf(category, stig).map_err(|e| {
        error!(target: "kvenno_backend", error = %e, "Flashcard PDF generation failed");
        ApiError::PdfGeneration
    })?;

    let disposition =
        HeaderValue::from_str(&format!("attachment; filename=\"spjald-{}-{}.pdf\"", category.id, stig))
            .map_err(|_| ApiError::PdfGeneration)?;
    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}
