use std::{env, sync::Arc};

use anyhow::Result;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::{config::App, event, logging};

/// 啟動排程，直到收到 Ctrl+C 才結束
pub async fn start(settings: App) -> Result<()> {
    let settings = Arc::new(settings);
    let mut sched = JobScheduler::new().await?;

    //                 sec  min   hour   day of month   month   day of week
    // UTC 時間
    sched
        .add(create_job(&settings.system.schedule, settings.clone())?)
        .await?;
    sched.start().await?;

    logging::info_console(format!(
        "coin_gainers scheduled '{}' (UTC) Rust OS/Arch: {}/{}",
        settings.system.schedule,
        env::consts::OS,
        env::consts::ARCH
    ));

    if settings.system.run_on_start {
        run(&settings).await;
    }

    tokio::signal::ctrl_c().await?;
    logging::info_console("shutting down scheduler".to_string());
    sched.shutdown().await?;

    Ok(())
}

fn create_job(cron_expr: &str, settings: Arc<App>) -> Result<Job> {
    Ok(Job::new_async(cron_expr, move |_uuid, _l| {
        let settings = settings.clone();
        Box::pin(async move {
            run(&settings).await;
        })
    })?)
}

/// 排程模式下單次執行失敗只記錄，不中斷排程
async fn run(settings: &App) {
    if let Err(why) = event::top_gainers::execute(settings).await {
        logging::error_console(format!("{:?}", why));
        logging::error_file_async(format!("Failed to execute top_gainers because {:?}", why));
    }
}
