//! 파이프라인 실행 endpoint.

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use tracing::{error, info};

use stock_core::RunSummary;

use crate::error::{pipeline_error_response, ApiErrorResponse, ApiResult};
use crate::state::AppState;

/// 파이프라인을 한 번 실행하고 요약을 반환합니다.
///
/// 요청 본문은 필요 없습니다. 일부 심볼이 실패해도 200을 반환하므로
/// 호출자는 `errors`를 확인해야 합니다. 심볼 카탈로그를 읽지 못하면 500입니다.
///
/// 실행은 별도 태스크에서 진행되므로 요청 타임아웃이나 연결 종료로
/// 핸들러가 중단되어도 배치 저장까지 마칩니다. 실행 시간 제한은
/// `PIPELINE_DEADLINE_SECS`로 설정합니다.
///
/// POST /run, GET /run
pub async fn run_pipeline(State(state): State<Arc<AppState>>) -> ApiResult<Json<RunSummary>> {
    let guard = state.lock_run().await;
    let runner = state.runner.clone();
    info!("HTTP 트리거로 파이프라인 실행");

    let handle = tokio::spawn(async move {
        let _guard = guard;
        let result = runner.run_with_stats().await;
        if let Ok((_, stats)) = &result {
            stats.log_summary("시세 파이프라인 (HTTP)");
        }
        result
    });

    match handle.await {
        Ok(Ok((summary, _))) => {
            state.record_run(&summary).await;
            Ok(Json(summary))
        }
        Ok(Err(e)) => {
            error!(error = %e, "파이프라인 실행 실패");
            Err(pipeline_error_response(e))
        }
        Err(e) => {
            error!(error = %e, "파이프라인 실행 태스크 중단");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiErrorResponse::new("RUN_ABORTED", e.to_string())),
            ))
        }
    }
}
