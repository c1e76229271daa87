pub mod config;
pub mod crawler;
pub mod declare;
pub mod error;
pub mod event;
pub mod logging;
pub mod publish;
pub mod report;
pub mod scheduler;
pub mod util;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let result = run().await;
    if let Err(why) = &result {
        logging::error_console(format!("{:?}", why));
        logging::error_file_async(format!("coin_gainers failed because {:?}", why));
    }

    logging::flush();
    result
}

async fn run() -> anyhow::Result<()> {
    let settings = crate::config::App::load()?;

    if settings.system.schedule.trim().is_empty() {
        event::top_gainers::execute(&settings).await?;
        return Ok(());
    }

    scheduler::start(settings).await
}
