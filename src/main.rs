// ==========================================
// 班次 OEE 管理系统 - 命令行入口
// ==========================================
// 用法:
//   shift-oee [db_path] init
//   shift-oee [db_path] areas
//   shift-oee [db_path] add-area <code> <name> <PACKAGING|PRESS> <theoretical> [real]
//   shift-oee [db_path] dashboard [YYYY-MM-DD]
//   shift-oee [db_path] export <csv_path> [YYYY-MM-DD] [YYYY-MM-DD]
//   shift-oee [db_path] config [<key> <value>]
// ==========================================

use std::error::Error;
use std::fs::File;

use chrono::{Local, NaiveDate};
use shift_oee::app::{get_default_db_path, AppState};
use shift_oee::domain::{AreaKind, NewArea, RecordFilter};
use shift_oee::{logging, APP_NAME, VERSION};

type CliResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

const COMMANDS: [&str; 6] = ["init", "areas", "add-area", "dashboard", "export", "config"];

#[tokio::main]
async fn main() -> CliResult<()> {
    logging::init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let db_path = match args.first() {
        Some(first) if !COMMANDS.contains(&first.as_str()) => args.remove(0),
        _ => get_default_db_path(),
    };
    if args.is_empty() {
        print_usage();
        return Ok(());
    }
    let command = args.remove(0);

    tracing::info!("{} v{} - 数据库: {}", APP_NAME, VERSION, db_path);
    let state = AppState::new(db_path).await?;

    match command.as_str() {
        "init" => {
            println!("数据库已初始化: {}", state.db_path);
        }
        "areas" => {
            for area in state.area_api.list_all_areas()? {
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}",
                    area.code,
                    area.name,
                    area.kind,
                    area.theoretical_capacity,
                    area.real_capacity,
                    if area.active { "active" } else { "inactive" }
                );
            }
        }
        "add-area" => {
            let [code, name, kind, theoretical] = match args.get(..4) {
                Some([a, b, c, d]) => [a.clone(), b.clone(), c.clone(), d.clone()],
                _ => return Err("用法: add-area <code> <name> <PACKAGING|PRESS> <theoretical> [real]".into()),
            };
            let kind = AreaKind::from_str(&kind).ok_or_else(|| format!("未知区域类型: {}", kind))?;
            let theoretical_capacity: f64 = theoretical.parse()?;
            let real_capacity: f64 = match args.get(4) {
                Some(raw) => raw.parse()?,
                None => 0.0,
            };

            let area = state.area_api.create_area(NewArea {
                code,
                name,
                kind,
                theoretical_capacity,
                real_capacity,
            })?;
            println!("区域已创建: {} ({})", area.code, area.area_id);
        }
        "dashboard" => {
            let today = match args.first() {
                Some(raw) => parse_date(raw)?,
                None => Local::now().date_naive(),
            };
            let summary = state.dashboard_api.summary(&RecordFilter::default(), today)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);

            for stats in state.dashboard_api.stats_by_area(&RecordFilter::default())? {
                println!(
                    "{}\tOEE {:.1}\tA {:.1}\tP {:.1}\tQ {:.1}\t{}",
                    stats.code,
                    stats.averages.oee_avg,
                    stats.averages.availability_avg,
                    stats.averages.performance_avg,
                    stats.averages.quality_avg,
                    stats.status
                );
            }
        }
        "export" => {
            let path = args.first().ok_or("用法: export <csv_path> [date_from] [date_to]")?;
            let filter = RecordFilter {
                date_from: args.get(1).map(|s| parse_date(s)).transpose()?,
                date_to: args.get(2).map(|s| parse_date(s)).transpose()?,
                ..RecordFilter::default()
            };
            let file = File::create(path)?;
            let rows = state.export_api.export_csv(&filter, file)?;
            println!("已导出 {} 条记录: {}", rows, path);
        }
        "config" => match (args.first(), args.get(1)) {
            (Some(key), Some(value)) => {
                state.config_manager.set_global_config_value(key, value)?;
                println!("{} = {}", key, value);
            }
            (None, _) => {
                for (key, value) in state.config_manager.list_global_configs()? {
                    println!("{} = {}", key, value);
                }
            }
            (Some(_), None) => return Err("用法: config <key> <value>".into()),
        },
        other => {
            print_usage();
            return Err(format!("未知命令: {}", other).into());
        }
    }

    Ok(())
}

fn parse_date(raw: &str) -> CliResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| format!("日期格式错误 {}: {}", raw, e).into())
}

fn print_usage() {
    eprintln!("{} v{}", APP_NAME, VERSION);
    eprintln!("用法: shift-oee [db_path] <command>");
    eprintln!("  init");
    eprintln!("  areas");
    eprintln!("  add-area <code> <name> <PACKAGING|PRESS> <theoretical> [real]");
    eprintln!("  dashboard [YYYY-MM-DD]");
    eprintln!("  export <csv_path> [date_from] [date_to]");
    eprintln!("  config [<key> <value>]");
}
