use mimalloc::MiMalloc;
use modules::{
    common::signal::SignalManager,
    context::{Initialize, RustBlastTask},
    database::manager::DatabaseManager,
    error::RustBlastResult,
    logger,
    rest::start_http_server,
    scheduler::trigger::CampaignSchedulerTask,
    settings::dir::DataDirManager,
};
use tracing::info;

mod modules;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

static LOGO: &str = r#"
  ____            _   ____  _           _
 |  _ \ _   _ ___| |_| __ )| | __ _ ___| |_
 | |_) | | | / __| __|  _ \| |/ _` / __| __|
 |  _ <| |_| \__ \ |_| |_) | | (_| \__ \ |_
 |_| \_\\__,_|___/\__|____/|_|\__,_|___/\__|

"#;

#[tokio::main]
async fn main() -> RustBlastResult<()> {
    logger::initialize_logging();
    info!("{}", LOGO);
    info!("Starting rustblast-server");
    info!("Version:  {}", rustblast_version!());

    if let Err(error) = initialize().await {
        eprintln!("{:?}", error);
        return Err(error);
    }

    start_http_server().await?;
    Ok(())
}

/// Initialize the system by validating settings and starting background tasks.
async fn initialize() -> RustBlastResult<()> {
    SignalManager::initialize().await?;
    DataDirManager::initialize().await?;
    DatabaseManager::initialize().await?;
    CampaignSchedulerTask::start();
    Ok(())
}
