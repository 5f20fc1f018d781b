//! API 回應信封

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{OeeError, Result};

/// 後端統一回應格式 `{ success, data, message }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope {
    #[serde(default)]
    pub success: bool,

    #[serde(default)]
    pub data: Option<Value>,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub error: Option<String>,
}

impl ApiEnvelope {
    /// 失敗原因（優先使用 message，其次 error）
    pub fn failure_reason(&self) -> String {
        self.message
            .clone()
            .or_else(|| self.error.clone())
            .unwrap_or_else(|| "unsuccessful response".to_string())
    }
}

/// 拆開回應信封，取出 `data`
pub fn unwrap_envelope(response: &Value) -> Result<Value> {
    let envelope: ApiEnvelope = serde_json::from_value(response.clone())
        .map_err(|e| OeeError::InvalidEnvelope(e.to_string()))?;

    if !envelope.success {
        return Err(OeeError::FetchFailed(envelope.failure_reason()));
    }

    envelope
        .data
        .ok_or_else(|| OeeError::InvalidEnvelope("缺少 data 欄位".to_string()))
}
