//! XJP Build Worker - 可执行入口
//!
//! 行为完全由环境变量驱动，没有 CLI 参数：
//! - `PROJECT_ID`: 项目 ID（必填）
//! - `REDIS_HOST` / `REDIS_PORT` / `REDIS_USERNAME` / `REDIS_PASSWORD`
//! - `S3_REGION` / `S3_ACCESS_KEY` / `S3_SECRET_ACCESS_KEY` / `S3_BUCKET_NAME`
//! - `BUILD_OUTPUT_DIR`: 构建工作目录（默认 `output`）
//! - `BUILD_COMMAND`: 安装+构建命令（默认 `npm install && npm run build`）

use tracing_subscriber::EnvFilter;

fn print_help() {
    println!("XJP Build Worker - 单周期构建 worker");
    println!();
    println!("USAGE:");
    println!("    xjp-build-worker");
    println!();
    println!("All behavior is driven by environment variables:");
    println!("    PROJECT_ID              Project identifier (required)");
    println!("    REDIS_HOST              Redis host (default 127.0.0.1)");
    println!("    REDIS_PORT              Redis port (default 6379)");
    println!("    REDIS_USERNAME          Redis username (optional)");
    println!("    REDIS_PASSWORD          Redis password (optional)");
    println!("    S3_REGION               Storage region");
    println!("    S3_ACCESS_KEY           Storage access key");
    println!("    S3_SECRET_ACCESS_KEY    Storage secret key");
    println!("    S3_BUCKET_NAME          Storage bucket");
    println!("    BUILD_OUTPUT_DIR        Build working directory (default output)");
    println!("    BUILD_COMMAND           Install+build command (default npm install && npm run build)");
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let rt = tokio::runtime::Runtime::new().expect("Failed to create runtime");
    let result = rt.block_on(xjp_build_worker::init_and_run_worker());

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
