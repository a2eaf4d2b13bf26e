use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 沒有 RUST_LOG 時使用的預設過濾規則
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "wp_release=debug,info"
    } else {
        "wp_release=info"
    }
}

fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
}

/// 人類可讀格式；日誌走 stderr，stdout 留給 ZIP 清單與摘要
pub fn init_cli_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose)
                .without_time()
                .compact(),
        )
        .init();
}

/// CI 日誌收集使用 JSON 格式，一行一個事件
pub fn init_json_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .json()
                .flatten_event(true),
        )
        .init();
}

/// 依參數選擇日誌格式
pub fn init(verbose: bool, json: bool) {
    if json {
        init_json_logger(verbose);
    } else {
        init_cli_logger(verbose);
    }
}
