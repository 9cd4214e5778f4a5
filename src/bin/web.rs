//! Courier HTTP 服务
//!
//! 启动: cargo run --bin courier-web --features web
//! 监听地址取自 [server].bind（默认 0.0.0.0:8000），可用 COURIER__SERVER__BIND 覆盖。

#[cfg(feature = "web")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use std::sync::Arc;

    use anyhow::Context;
    use courier::core::create_orchestrator;
    use courier::integrations::http::{create_router, HttpState};

    courier::observability::init();

    let (cfg, orchestrator) = create_orchestrator(None).context("Failed to build orchestrator")?;
    let app = create_router(Arc::new(HttpState { orchestrator }));

    let listener = tokio::net::TcpListener::bind(&cfg.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", cfg.server.bind))?;
    tracing::info!("Courier server listening on http://{}", cfg.server.bind);
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(not(feature = "web"))]
fn main() {
    eprintln!("请使用 --features web 编译: cargo run --bin courier-web --features web");
    std::process::exit(1);
}
