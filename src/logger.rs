//! logger.rs
//! Configuración del logger usando env_logger.

pub fn init_logger() {
    // RUST_LOG manda; si no está, "info" (y menos ruido de actix_server)
    let log_env = std::env::var("RUST_LOG").unwrap_or_else(|_| "info,actix_server=warn".to_string());

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_env))
        .format_timestamp_secs()
        .init();
}
