use utapi_config::Config;

/// Print spawn infos to the log.
pub fn dump_spawn_infos(config: &Config) {
    utapi_log::info!("launching utapi from config {}", config.path().display());
    utapi_log::info!("  component: {}", config.component());
    utapi_log::info!("  log level: {}", config.logging().level);

    match config.redis() {
        Some(redis) => utapi_log::info!("  redis: {}", redis.url()),
        None => utapi_log::info!("  redis: -"),
    };

    match config.granularities() {
        Some(granularities) => {
            let tags: Vec<_> = granularities.iter().map(|g| g.tag()).collect();
            utapi_log::info!("  metrics: {}", tags.join(", "));
        }
        None => utapi_log::info!("  metrics: all"),
    }
}
