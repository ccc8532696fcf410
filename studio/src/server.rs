//! HTTP surface of the studio.
//!
//! `POST /api/compile` turns Solidity source into ABI + bytecode,
//! `POST /api/abi/functions` describes an ABI the way the contract panel
//! presents it, `GET /health` is a liveness probe.

use crate::compiler::{CompileOutcome, Compiler, Diagnostic};
use crate::form::{fields_for, FieldSpec};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use contract_abi::{classify_functions, constructor_parameters, parse_abi_value, signature_of, AbiFunction};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub compiler: Arc<dyn Compiler>,
}

impl AppState {
    pub fn new(compiler: Arc<dyn Compiler>) -> Self {
        Self { compiler }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> (StatusCode, Json<Self>) {
        (
            StatusCode::BAD_REQUEST,
            Json(Self {
                error: "BAD_REQUEST".to_string(),
                message: message.into(),
            }),
        )
    }

    pub fn internal_error(message: impl Into<String>) -> (StatusCode, Json<Self>) {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(Self {
                error: "INTERNAL_ERROR".to_string(),
                message: message.into(),
            }),
        )
    }
}

/// Request body for the compile endpoint
#[derive(Debug, Deserialize)]
pub struct CompileRequest {
    pub code: String,
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CompileResponse {
    pub contract_name: String,
    pub abi: serde_json::Value,
    pub bytecode: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Diagnostic>,
}

#[derive(Debug, Serialize)]
pub struct CompileErrors {
    pub errors: Vec<Diagnostic>,
}

/// POST /api/compile
pub async fn compile(State(state): State<AppState>, Json(req): Json<CompileRequest>) -> Response {
    let filename = req.filename.as_deref();

    match state.compiler.compile(&req.code, filename).await {
        Ok(CompileOutcome::Compiled(contract)) => {
            info!(contract = %contract.name, warnings = contract.warnings.len(), "Compiled");
            Json(CompileResponse {
                contract_name: contract.name,
                abi: contract.abi,
                bytecode: contract.bytecode,
                warnings: contract.warnings,
            })
            .into_response()
        }
        Ok(CompileOutcome::Failed(errors)) => {
            (StatusCode::BAD_REQUEST, Json(CompileErrors { errors })).into_response()
        }
        Err(e) => {
            warn!(error = %e, "Compiler invocation failed");
            ApiError::internal_error(e.to_string()).into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DescribeAbiRequest {
    /// ABI array or an artifact object with an `abi` field
    pub abi: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct FunctionSummary {
    pub signature: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mutability: Option<contract_abi::Mutability>,
    pub fields: Vec<FieldSpec>,
}

impl From<&AbiFunction> for FunctionSummary {
    fn from(function: &AbiFunction) -> Self {
        Self {
            signature: signature_of(function),
            mutability: function.mutability,
            fields: fields_for(&function.parameters),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DescribeAbiResponse {
    pub read: Vec<FunctionSummary>,
    pub write: Vec<FunctionSummary>,
    pub constructor: Vec<FieldSpec>,
}

/// POST /api/abi/functions
pub async fn describe_abi(
    Json(req): Json<DescribeAbiRequest>,
) -> Result<Json<DescribeAbiResponse>, (StatusCode, Json<ApiError>)> {
    let schema = parse_abi_value(req.abi).map_err(|e| ApiError::bad_request(e.to_string()))?;
    let (read, write) = classify_functions(&schema);

    Ok(Json(DescribeAbiResponse {
        read: read.into_iter().map(FunctionSummary::from).collect(),
        write: write.into_iter().map(FunctionSummary::from).collect(),
        constructor: fields_for(constructor_parameters(&schema)),
    }))
}

/// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/compile", post(compile))
        .route("/api/abi/functions", post(describe_abi))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Studio API listening on {}", addr);
    axum::serve(listener, router(state)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{CompileError, CompiledContract};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use contract_abi::ContractSchema;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    struct StubCompiler;

    #[async_trait]
    impl Compiler for StubCompiler {
        async fn compile(&self, code: &str, _filename: Option<&str>) -> Result<CompileOutcome, CompileError> {
            if code.contains("broken") {
                return Ok(CompileOutcome::Failed(vec![Diagnostic {
                    severity: "error".to_string(),
                    kind: Some("ParserError".to_string()),
                    message: "Expected ';'".to_string(),
                    formatted_message: None,
                }]));
            }
            if code.is_empty() {
                return Err(CompileError::NoContract("contract.sol".to_string()));
            }
            Ok(CompileOutcome::Compiled(CompiledContract {
                name: "A".to_string(),
                abi: json!([]),
                schema: ContractSchema::default(),
                bytecode: "6080".to_string(),
                warnings: vec![],
            }))
        }
    }

    fn app() -> Router {
        router(AppState::new(Arc::new(StubCompiler)))
    }

    async fn post_json(uri: &str, body: Value) -> (StatusCode, Value) {
        let resp = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_compile_success() {
        let (status, body) = post_json("/api/compile", json!({"code": "contract A {}"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["bytecode"], "6080");
        assert_eq!(body["contract_name"], "A");
        assert!(body.get("warnings").is_none());
    }

    #[tokio::test]
    async fn test_compile_errors_are_400() {
        let (status, body) = post_json("/api/compile", json!({"code": "broken"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["severity"], "error");
        assert_eq!(body["errors"][0]["type"], "ParserError");
    }

    #[tokio::test]
    async fn test_compiler_failure_is_500() {
        let (status, body) = post_json("/api/compile", json!({"code": ""})).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "INTERNAL_ERROR");
    }

    #[tokio::test]
    async fn test_describe_abi() {
        let abi = json!([
            {"type": "constructor", "inputs": [{"name": "paused", "type": "bool"}]},
            {"type": "function", "name": "balanceOf", "stateMutability": "view",
             "inputs": [{"name": "owner", "type": "address"}], "outputs": []},
            {"type": "function", "name": "mint", "inputs": [{"name": "", "type": "uint256"}], "outputs": []}
        ]);
        let (status, body) = post_json("/api/abi/functions", json!({ "abi": abi })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["read"][0]["signature"], "balanceOf(address)");
        assert_eq!(body["write"][0]["signature"], "mint(uint256)");
        assert_eq!(body["write"][0]["fields"][0]["label"], "arg0");
        assert_eq!(body["constructor"][0]["widget"], "bool_choice");
    }

    #[tokio::test]
    async fn test_describe_abi_rejects_garbage() {
        let (status, body) = post_json("/api/abi/functions", json!({ "abi": 42 })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_health() {
        let resp = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
