use chrono::{Duration, Local};
use life_store_client::{LifeStoreClient, config::Config, http_client::ReqwestLifeStoreClient};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Example: expects SUPABASE_URL, SUPABASE_ANON_KEY and LIFE_DASHBOARD_USER_ID in env
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("config error: {}", e);
            return Ok(());
        }
    };
    let Some(user_id) = cfg.default_user_id.clone() else {
        eprintln!("LIFE_DASHBOARD_USER_ID is not set");
        return Ok(());
    };
    let client = ReqwestLifeStoreClient::from_config(&cfg);
    let since = Local::now().date_naive() - Duration::days(cfg.window_days as i64);

    let sleep = client.get_sleep_records(&user_id, since).await?;
    let moods = client.get_mental_health_logs(&user_id, since).await?;
    println!(
        "{} sleep records and {} mood logs since {}",
        sleep.len(),
        moods.len(),
        since
    );
    Ok(())
}
