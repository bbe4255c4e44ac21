use std::path::PathBuf;

use clap::Parser;

use device_redirect_lib::RunOptions;

/// 按设备跳转应用商店的重定向服务
#[derive(Debug, Parser)]
#[command(name = "device-redirect", version, about)]
struct Args {
    /// YAML 配置文件路径
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 覆盖监听端口
    #[arg(short, long)]
    port: Option<u16>,

    /// 输出调试日志
    #[arg(short, long)]
    verbose: bool,

    /// 启动时导入旧版 JSON 配置（只执行一次）
    #[arg(long, value_name = "FILE")]
    import_legacy: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    device_redirect_lib::run(RunOptions {
        config_path: args.config,
        port: args.port,
        verbose: args.verbose,
        import_legacy: args.import_legacy,
    })
    .await
}
