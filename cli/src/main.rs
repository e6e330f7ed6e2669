//! 交易后台控制台 CLI
//!
//! 配置来源 (优先级从高到低):
//!
//! 1. 环境变量 (`CONSOLE_*`，`__` 分隔层级，例如 `CONSOLE_BACKEND__BASE_URL`)
//! 2. `{config_dir}/{APP_ENV}.toml`
//! 3. `{config_dir}/default.toml`
//!
//! 启动时会读取当前目录下的 `.env`。

mod app;
mod registry;
mod render;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console_config::AppConfig;
use console_session::SessionNotice;
use serde::Serialize;
use tracing::debug;

use crate::app::Console;

/// 交易后台控制台
#[derive(Parser, Debug)]
#[command(name = "console")]
#[command(version, about, long_about = None)]
struct Args {
    /// 配置目录
    #[arg(long, env = "CONSOLE_CONFIG_DIR", default_value = "config")]
    config_dir: String,

    /// 以 JSON 输出
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 登录并保存会话
    Login {
        #[arg(short, long)]
        username: String,

        #[arg(short, long, env = "CONSOLE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// 登出并清除保存的会话
    Logout,
    /// 显示当前登录的主体
    Whoami,
    /// 显示可见的导航菜单
    Menu,
    /// 打开页面，经过路由守卫
    Open { path: String },
    /// 列出所有注册的路由及当前主体的访问结果
    Routes,
    /// 以当前会话请求后端接口 (GET)
    Fetch { path: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let config = AppConfig::load(&args.config_dir)
        .with_context(|| format!("failed to load configuration from {}", args.config_dir))?;
    console_telemetry::init(&config.telemetry.log_level, config.wants_json_logs());
    debug!(app = %config.app_name, env = %config.app_env, "Configuration loaded");

    let mut console = Console::from_config(&config)?;
    console.start().await;
    if console.notice() == Some(SessionNotice::Expired) {
        eprintln!("Your session has expired. Please sign in again.");
    }

    match args.command {
        Command::Login { username, password } => {
            let principal = console.login(&username, &password).await?;
            emit(args.json, &principal, || {
                format!("Signed in.\n{}", render::principal(&principal))
            })?;
        }
        Command::Logout => {
            console.logout().await;
            println!("Signed out.");
        }
        Command::Whoami => match console.whoami() {
            Some(principal) => emit(args.json, &principal, || render::principal(&principal))?,
            None => println!("Not signed in."),
        },
        Command::Menu => {
            let menu = console.menu();
            emit(args.json, menu.entries(), || render::menu(&menu))?;
        }
        Command::Open { path } => {
            let outcome = console.open(&path);
            println!("{}", render::outcome(&outcome));
        }
        Command::Routes => {
            let rows = console.routes();
            emit(args.json, &rows, || render::routes(&rows))?;
        }
        Command::Fetch { path } => {
            let body = console.fetch(&path).await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
    }

    Ok(())
}

fn emit<T: Serialize + ?Sized>(json: bool, value: &T, text: impl FnOnce() -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", text());
    }
    Ok(())
}
