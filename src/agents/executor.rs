//! Tool execution against the catalog

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::agents::domain::{ToolCall, ToolResult};
use crate::agents::tools::{
    RequestMediaArgs, SearchMediaArgs, ToolRegistry, REQUEST_MEDIA, SEARCH_MEDIA,
};
use crate::catalog::{CatalogPort, CatalogResult};

/// Runs declared tools and turns every outcome into a [`ToolResult`].
///
/// Nothing here returns an error to the caller: validation failures,
/// transport failures, rejections, timeouts and unknown tool names all become
/// `{"error": ...}` payloads.
pub struct ToolExecutor {
    catalog: Arc<dyn CatalogPort>,
    registry: ToolRegistry,
    search_result_limit: usize,
    timeout: Duration,
}

impl ToolExecutor {
    pub fn new(catalog: Arc<dyn CatalogPort>, search_result_limit: usize, timeout: Duration) -> Self {
        Self {
            catalog,
            registry: ToolRegistry::new(),
            search_result_limit,
            timeout,
        }
    }

    pub async fn execute(&self, call: &ToolCall) -> ToolResult {
        if !self.registry.is_declared(&call.name) {
            warn!("Engine requested undeclared tool '{}'", call.name);
            return ToolResult::failure(call, "Unknown tool");
        }

        let start = Instant::now();
        let outcome = match tokio::time::timeout(self.timeout, self.dispatch(call)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!("Tool '{}' timed out after {:?}", call.name, self.timeout);
                return ToolResult::failure(
                    call,
                    format!("{} timed out after {}s", call.name, self.timeout.as_secs()),
                );
            }
        };

        let result = match outcome {
            Ok(payload) => ToolResult::success(call, payload),
            Err(e) => {
                warn!("Tool '{}' failed: {}", call.name, e);
                ToolResult::failure(call, e.to_string())
            }
        };
        debug!(
            "Tool '{}' finished in {}ms (error: {})",
            call.name,
            start.elapsed().as_millis(),
            result.is_error()
        );
        result
    }

    async fn dispatch(&self, call: &ToolCall) -> CatalogResult<Value> {
        match call.name.as_str() {
            SEARCH_MEDIA => {
                let args = SearchMediaArgs::from_arguments(&call.arguments)?;
                info!("Executing search: {}", args.query);
                let mut results = self.catalog.search(&args.query).await?;
                results.truncate(self.search_result_limit);
                Ok(json!({ "results": results }))
            }
            REQUEST_MEDIA => {
                let args = RequestMediaArgs::from_arguments(&call.arguments)?;
                info!("Executing request: {} ({} {})", args.title, args.media_type, args.media_id);
                let spec = args.into_spec()?;
                let details = self.catalog.request_media(&spec).await?;
                Ok(json!({
                    "success": true,
                    "message": "Request sent successfully",
                    "details": details
                }))
            }
            _ => Ok(json!({ "error": "Unknown tool" })),
        }
    }
}
