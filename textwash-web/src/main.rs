//! Servidor web Axum que expõe as ferramentas de anonimização do textwash

mod cache;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use textwash_core::{
    catalog::available_entities, AnonymizationResult, AnonymizeOptions, Language, MergedEntity,
    ReplacementMapping, Strategy,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cache::ModelCache;

/// Estado compartilhado da aplicação
struct AppState {
    models: ModelCache,
}

/// Configuração do processo, lida de variáveis de ambiente
struct Settings {
    data_dir: PathBuf,
    addr: SocketAddr,
}

impl Settings {
    fn from_env() -> anyhow::Result<Self> {
        let data_dir = match std::env::var("TEXTWASH_DATA_DIR") {
            Ok(dir) => PathBuf::from(dir),
            // Pasta data/ na raiz do workspace
            Err(_) => PathBuf::from(env!("CARGO_MANIFEST_DIR"))
                .parent()
                .context("workspace root")?
                .join("data"),
        };
        let addr = std::env::var("TEXTWASH_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse()
            .context("TEXTWASH_ADDR inválido")?;
        Ok(Self { data_dir, addr })
    }
}

/// Erro de API: vira `{"error": "..."}` com o status adequado
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<textwash_core::Error> for ApiError {
    fn from(err: textwash_core::Error) -> Self {
        use textwash_core::Error;
        let status = match &err {
            Error::InvalidLanguage(_) => StatusCode::BAD_REQUEST,
            Error::ModelNotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, format!("Tarefa interrompida: {}", err))
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, format!("Erro de E/S: {}", err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        warn!(status = %self.status, "{}", self.message);
        (self.status, Json(serde_json::json!({ "error": self.message }))).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

fn default_language() -> String {
    "en".to_string()
}

fn default_mode() -> String {
    "standard".to_string()
}

fn parse_language(code: &str) -> Result<Language, ApiError> {
    code.parse().map_err(ApiError::from)
}

#[derive(Deserialize)]
struct AnalyzeRequest {
    text: String,
    #[serde(default = "default_language")]
    language: String,
}

#[derive(Serialize)]
struct AnalyzeResponse {
    entities: Vec<MergedEntity>,
    /// Resumo legível: "No PII found." ou a lista `palavra: TIPO`
    summary: String,
}

#[derive(Deserialize)]
struct EntityTypesQuery {
    #[serde(default = "default_language")]
    language: String,
}

#[derive(Serialize)]
struct EntityTypesResponse {
    language: Language,
    entity_types: Vec<String>,
}

#[derive(Deserialize)]
struct AnonymizeRequest {
    text: String,
    #[serde(default = "default_language")]
    language: String,
    #[serde(default = "default_mode")]
    mode: String,
    #[serde(default)]
    restrict_to_entities: Option<Vec<String>>,
}

#[derive(Serialize)]
struct AnonymizeResponse {
    anonymized_text: String,
}

#[derive(Deserialize)]
struct AnonymizeWithKeyRequest {
    text: String,
    #[serde(default = "default_language")]
    language: String,
}

#[derive(Serialize)]
struct AnonymizeWithKeyResponse {
    anonymized_text: String,
    key: ReplacementMapping,
}

#[derive(Deserialize)]
struct AnonymizeFileRequest {
    input_path: PathBuf,
    output_path: PathBuf,
    #[serde(default = "default_language")]
    language: String,
    #[serde(default = "default_mode")]
    mode: String,
}

#[derive(Serialize)]
struct MessageResponse {
    message: String,
}

#[derive(Deserialize)]
struct AnonymizeBatchRequest {
    texts: Vec<String>,
    #[serde(default = "default_language")]
    language: String,
    #[serde(default = "default_mode")]
    mode: String,
    #[serde(default)]
    restrict_to_entities: Option<Vec<String>>,
}

#[derive(Serialize)]
struct AnonymizeBatchResponse {
    results: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::from_env()?;
    info!("Modelos em {}", settings.data_dir.display());

    let state = Arc::new(AppState {
        models: ModelCache::new(settings.data_dir),
    });

    let listener = tokio::net::TcpListener::bind(settings.addr)
        .await
        .with_context(|| format!("não foi possível escutar em {}", settings.addr))?;
    info!("🚀 Servidor textwash iniciado em http://{}", settings.addr);
    axum::serve(listener, app(state)).await?;
    Ok(())
}

fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/analyze", post(analyze_handler))
        .route("/entity-types", get(entity_types_handler))
        .route("/anonymize", post(anonymize_handler))
        .route("/anonymize-with-key", post(anonymize_with_key_handler))
        .route("/anonymize-file", post(anonymize_file_handler))
        .route("/anonymize-batch", post(anonymize_batch_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Executa a anonimização fora do runtime async (o pipeline é síncrono)
async fn run_anonymize(
    state: Arc<AppState>,
    language: Language,
    text: String,
    options: AnonymizeOptions,
) -> Result<AnonymizationResult, ApiError> {
    let result = tokio::task::spawn_blocking(move || {
        let anonymizer = state.models.get(language)?;
        anonymizer.anonymize(&text, &options)
    })
    .await??;
    Ok(result)
}

/// Detecta PII sem anonimizar
async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> ApiResult<AnalyzeResponse> {
    let language = parse_language(&req.language)?;
    info!("Analisando [{}]: {} chars", language, req.text.chars().count());

    let entities = tokio::task::spawn_blocking(move || {
        let anonymizer = state.models.get(language)?;
        anonymizer.analyze(&req.text)
    })
    .await??;

    let summary = if entities.is_empty() {
        "No PII found.".to_string()
    } else {
        let items: Vec<String> = entities
            .iter()
            .map(|e| format!("{}: {}", e.word, e.entity))
            .collect();
        format!("[{}]", items.join(", "))
    };
    Ok(Json(AnalyzeResponse { entities, summary }))
}

/// Lista os tipos de entidade que o modelo do idioma detecta
async fn entity_types_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EntityTypesQuery>,
) -> ApiResult<EntityTypesResponse> {
    let language = parse_language(&query.language)?;
    let config = state.models.config(language)?;
    let entity_types = available_entities(&config.model_dir)?;
    Ok(Json(EntityTypesResponse {
        language,
        entity_types,
    }))
}

/// Anonimiza o texto, opcionalmente restrito a alguns tipos
async fn anonymize_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnonymizeRequest>,
) -> ApiResult<AnonymizeResponse> {
    let language = parse_language(&req.language)?;
    let options = AnonymizeOptions::new(Strategy::from_name(&req.mode))
        .with_selected_entities(req.restrict_to_entities);
    info!(
        "Anonimizando [{} | {}]: {} chars",
        language,
        options.strategy.name(),
        req.text.chars().count()
    );

    let result = run_anonymize(state, language, req.text, options).await?;
    Ok(Json(AnonymizeResponse {
        anonymized_text: result.text,
    }))
}

/// Anonimiza e devolve também a chave (mapeamento original → substituto)
async fn anonymize_with_key_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnonymizeWithKeyRequest>,
) -> ApiResult<AnonymizeWithKeyResponse> {
    let language = parse_language(&req.language)?;
    let options = AnonymizeOptions::new(Strategy::Standard).with_mapping();

    let result = run_anonymize(state, language, req.text, options).await?;
    Ok(Json(AnonymizeWithKeyResponse {
        anonymized_text: result.text,
        key: result.mapping.unwrap_or_default(),
    }))
}

/// Anonimiza um arquivo inteiro e grava o resultado em `output_path`
async fn anonymize_file_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnonymizeFileRequest>,
) -> ApiResult<MessageResponse> {
    let language = parse_language(&req.language)?;
    // Só "não existe" vira 404; outras falhas de E/S (permissão etc.) são 500
    if !tokio::fs::try_exists(&req.input_path).await? {
        return Err(ApiError::new(StatusCode::NOT_FOUND, "Input file not found."));
    }

    let content = tokio::fs::read_to_string(&req.input_path).await?;
    let options = AnonymizeOptions::new(Strategy::from_name(&req.mode));
    let result = run_anonymize(state, language, content, options).await?;

    if let Some(parent) = req.output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&req.output_path, result.text).await?;

    let message = format!(
        "Processed {} -> {}",
        req.input_path.display(),
        req.output_path.display()
    );
    info!("{}", message);
    Ok(Json(MessageResponse { message }))
}

/// Anonimiza vários textos em paralelo
async fn anonymize_batch_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnonymizeBatchRequest>,
) -> ApiResult<AnonymizeBatchResponse> {
    let language = parse_language(&req.language)?;
    let options = AnonymizeOptions::new(Strategy::from_name(&req.mode))
        .with_selected_entities(req.restrict_to_entities);
    info!("Lote [{}]: {} textos", language, req.texts.len());

    let results = tokio::task::spawn_blocking(move || {
        let anonymizer = state.models.get(language)?;
        anonymizer.anonymize_batch(&req.texts, &options)
    })
    .await??;

    Ok(Json(AnonymizeBatchResponse {
        results: results.into_iter().map(|r| r.text).collect(),
    }))
}
