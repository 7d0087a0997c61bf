use switchboard_config::Config;
use switchboard_server::RunMode;

/// Print spawn infos to the log.
pub fn dump_spawn_infos(config: &Config, mode: RunMode) {
    if Config::config_exists(config.path()) {
        switchboard_log::info!(
            "launching switchboard from config folder {}",
            config.path().display()
        );
    } else {
        switchboard_log::info!("launching switchboard without config file");
    }

    match mode {
        RunMode::Lambda => switchboard_log::info!("  run mode: lambda"),
        RunMode::Http => switchboard_log::info!("  run mode: http ({})", config.listen_addr()),
    }

    switchboard_log::info!("  bundle path: {}", config.bundle_path().display());
    switchboard_log::info!("  bundle files: {}", config.bundle_files().join(", "));
    switchboard_log::info!("  log level: {}", config.logging().level);
}
