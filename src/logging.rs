//! 日誌初始化
//!
//! 工作區各 crate 預設 info，其餘依賴只輸出 warn 以上；`RUST_LOG` 可覆蓋。

use tracing_subscriber::{fmt, EnvFilter};

/// 預設過濾指令
pub const DEFAULT_DIRECTIVES: &str = "warn,oee=info,oee_core=info,oee_calc=info,oee_cache=info";

/// 測試用過濾指令
pub const TEST_DIRECTIVES: &str = "warn,oee=debug,oee_core=debug,oee_calc=debug,oee_cache=debug";

/// 初始化日誌
///
/// 例如 `RUST_LOG=oee_calc=debug` 只開啟計算層的分步日誌。
///
/// ```no_run
/// oee::logging::init();
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .init();
}

/// 測試用日誌，可重複呼叫
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new(TEST_DIRECTIVES))
        .with_test_writer()
        .try_init();
}
