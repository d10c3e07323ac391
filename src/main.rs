// ==========================================
// 锻造 ERP 产量对账引擎 - 命令行入口
// ==========================================
// 用法:
//   steel-recon dashboard <department> <file> [group_by] [npd_mode]
//   steel-recon reconcile <raw> <planned> <production> <dispatch> [npd_mode]
// 输出: 报表 JSON 写到 stdout，日志写到 stderr
// 配置: STEEL_RECON_CONFIG 指定配置文件，否则读取用户配置目录
// ==========================================

use anyhow::{bail, Context, Result};
use steel_recon::api::{DashboardApi, DashboardRequest};
use steel_recon::config::ConfigManager;
use steel_recon::engine::StageRecords;
use steel_recon::logging;

const USAGE: &str = "用法:
  steel-recon dashboard <department> <file> [group_by] [npd_mode]
  steel-recon reconcile <raw> <planned> <production> <dispatch> [npd_mode]";

fn main() -> Result<()> {
    logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        bail!("缺少子命令\n{}", USAGE);
    };

    tracing::info!("{} v{}", steel_recon::APP_NAME, steel_recon::VERSION);

    let manager = ConfigManager::load_default().context("加载配置失败")?;
    let api = DashboardApi::from_config_manager(&manager).context("组装引擎配置失败")?;

    let output = match command.as_str() {
        "dashboard" => {
            if args.len() < 3 {
                bail!("dashboard 参数不足\n{}", USAGE);
            }
            let records = api
                .load_records(&args[2])
                .with_context(|| format!("读取记录文件失败: {}", args[2]))?;
            let request = DashboardRequest {
                group_by: args.get(3).cloned(),
                npd_mode: args.get(4).cloned(),
                ..Default::default()
            };
            let report = api.department_dashboard_by_name(&args[1], &records, &request)?;
            serde_json::to_string_pretty(&report)?
        }
        "reconcile" => {
            if args.len() < 5 {
                bail!("reconcile 参数不足\n{}", USAGE);
            }
            let load = |path: &String| {
                api.load_records(path)
                    .with_context(|| format!("读取记录文件失败: {}", path))
            };
            let records = StageRecords {
                raw_material: load(&args[1])?,
                planned: load(&args[2])?,
                production: load(&args[3])?,
                dispatch: load(&args[4])?,
            };
            let report = api.steel_reconciliation(&records, args.get(5).map(String::as_str))?;
            serde_json::to_string_pretty(&report)?
        }
        other => bail!("未知子命令: {}\n{}", other, USAGE),
    };

    println!("{}", output);
    Ok(())
}
