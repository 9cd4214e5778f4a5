//! Courier 命令行入口
//!
//! 对一条消息跑一轮编排并打印最终回复：
//! `courier [--config path.toml] [--summary "..."] Send an email to a@b.com about the report`
//! 未给出消息时从 stdin 读取。日志输出到 stderr。

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use courier::core::create_orchestrator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    courier::observability::init();

    let mut config_path: Option<PathBuf> = None;
    let mut summary: Option<String> = None;
    let mut words = Vec::new();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => config_path = args.next().map(PathBuf::from),
            "--summary" => summary = args.next(),
            _ => words.push(arg),
        }
    }

    let message = if words.is_empty() {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .context("Failed to read message from stdin")?;
        input
    } else {
        words.join(" ")
    };

    let (_cfg, orchestrator) =
        create_orchestrator(config_path).context("Failed to build orchestrator")?;

    let reply = orchestrator.respond(&message, summary.as_deref()).await;
    println!("{}", reply);
    Ok(())
}
