//! 可观测性

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::results::RESULTS_TARGET;

/// 日志：默认 info，可通过 RUST_LOG 覆盖；研究结果目标始终保持 info
pub fn init() {
    let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if let Ok(directive) = format!("{}=info", RESULTS_TARGET).parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();
}
