// ==========================================
// 联系人导入系统 - 命令行入口
// ==========================================
// 命令:
// - contact-intake import <FILE>          批量导入 CSV
// - contact-intake submit --first-name …  单条表单提交
// - contact-intake list                   查看最近入库记录
// ==========================================

use anyhow::Context;
use clap::{Parser, Subcommand};
use contact_intake::api::ImportApiResponse;
use contact_intake::app::AppState;
use contact_intake::config::IntakeConfig;
use contact_intake::domain::{ContactField, RawRecord};
use contact_intake::repository::ContactRepository;
use contact_intake::{logging, SubmissionOutcome};
use std::path::PathBuf;
use std::process::ExitCode;

/// 联系人导入系统 - 字段校验与入库
#[derive(Parser, Debug)]
#[command(name = "contact-intake")]
#[command(version, about, long_about = None)]
struct Cli {
    /// 数据库路径（覆盖 CONTACT_INTAKE_DB_PATH）
    #[arg(long, global = true)]
    db: Option<String>,

    /// 以 JSON 输出结果
    #[arg(long, global = true)]
    json: bool,

    /// 以 JSON 行格式输出日志
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 批量导入 CSV 文件
    Import {
        /// CSV 文件路径
        file: PathBuf,
    },

    /// 提交单条联系人记录
    Submit {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        second_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone_number: String,
        #[arg(long)]
        postal_code: String,
    },

    /// 查看最近入库的记录
    List {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    logging::init(cli.log_json);

    tracing::info!(version = contact_intake::VERSION, "{} 启动", contact_intake::APP_NAME);

    let config = IntakeConfig::from_env()
        .context("读取配置失败")?
        .with_db_path(cli.db.clone());

    let state = AppState::new(&config)
        .await
        .with_context(|| format!("初始化失败（数据库: {}）", config.db_path))?;

    match cli.command {
        Command::Import { file } => {
            let response = state
                .import_api
                .import_file(&file.to_string_lossy())
                .await
                .context("无法开始导入")?;
            print_import(&response, cli.json)?;
            Ok(if response.completed {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Submit {
            first_name,
            second_name,
            email,
            phone_number,
            postal_code,
        } => {
            let raw: RawRecord = [
                (ContactField::FirstName, first_name),
                (ContactField::SecondName, second_name),
                (ContactField::Email, email),
                (ContactField::PhoneNumber, phone_number),
                (ContactField::PostalCode, postal_code),
            ]
            .into_iter()
            .map(|(field, value)| (field.column().to_string(), value))
            .collect();

            let outcome = state.submission_handler.submit(&raw).await;
            let response = outcome.to_response();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                println!("[{}] {}", response.http_status, response.message);
            }
            Ok(match outcome {
                SubmissionOutcome::Stored { .. } => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            })
        }
        Command::List { limit } => {
            let contacts = state.contact_repo.list_recent(limit).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&contacts)?);
            } else {
                for c in &contacts {
                    println!(
                        "{}\t{} {}\t{}\t{}\t{}\t{}",
                        c.id,
                        c.record.first_name,
                        c.record.second_name,
                        c.record.email,
                        c.record.phone_number,
                        c.record.postal_code,
                        c.created_at.to_rfc3339()
                    );
                }
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn print_import(response: &ImportApiResponse, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(response)?);
        return Ok(());
    }

    println!("{}", response.summary);
    for diag in &response.summary.diagnostics {
        println!("  {}", diag);
    }
    if response.summary.diagnostics_dropped > 0 {
        println!("  …另有 {} 条诊断未显示", response.summary.diagnostics_dropped);
    }
    if let Some(reason) = &response.abort_reason {
        println!("导入中止: {}", reason);
    }
    Ok(())
}
