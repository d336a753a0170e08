//! AWS Lambda handler for valuations
//!
//! Accepts one valuation request (or an array of them) as JSON and returns
//! the valuation results along with one plain-text report per company.
//!
//! Supports Lambda Function URLs for direct HTTP access.

use aws_lambda_events::event::lambda_function_urls::{LambdaFunctionUrlRequest, LambdaFunctionUrlResponse};
use chrono::Utc;
use equity_valuation::{
    inputs::parse_requests_json, report::render_reports, ValuationResult, ValuationRunner,
};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use log::{info, warn};
use serde::Serialize;

#[derive(Serialize)]
struct ValuationResponse {
    results: Vec<ValuationResult>,
    reports: Vec<String>,
    execution_time_ms: u64,
}

fn response(status_code: i64, body: String) -> LambdaFunctionUrlResponse {
    LambdaFunctionUrlResponse {
        status_code,
        headers: Default::default(),
        body: Some(body),
        is_base64_encoded: false,
        cookies: Vec::new(),
    }
}

fn error_response(status_code: i64, message: &str) -> LambdaFunctionUrlResponse {
    let body = serde_json::json!({ "error": message }).to_string();
    response(status_code, body)
}

/// Lambda handler function
async fn handler(event: LambdaEvent<LambdaFunctionUrlRequest>) -> Result<LambdaFunctionUrlResponse, Error> {
    let start = std::time::Instant::now();
    let request = event.payload;

    // CORS preflight
    if request.request_context.http.method.as_deref() == Some("OPTIONS") {
        return Ok(LambdaFunctionUrlResponse {
            body: None,
            ..response(200, String::new())
        });
    }

    if request.is_base64_encoded {
        return Ok(error_response(400, "Binary request bodies are not supported"));
    }
    let body = request.body.unwrap_or_default();

    let requests = match parse_requests_json(&body) {
        Ok(r) if !r.is_empty() => r,
        Ok(_) => return Ok(error_response(400, "No valuation requests in body")),
        Err(e) => {
            warn!("Rejected request: {}", e);
            return Ok(error_response(400, &format!("Invalid JSON: {}", e)));
        }
    };

    let runner = ValuationRunner::from_env();
    let results = runner.run_batch(&requests, Utc::now());

    let reports = render_reports(&results);

    let body = ValuationResponse {
        results,
        reports,
        execution_time_ms: start.elapsed().as_millis() as u64,
    };
    info!("Evaluated {} request(s) in {} ms", requests.len(), body.execution_time_ms);

    Ok(response(200, serde_json::to_string(&body)?))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}
