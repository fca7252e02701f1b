fn main() -> anyhow::Result<()> {
    // Set up logging for development
    env_logger::init();

    // Async store operations are spawned from UI callbacks, so the main
    // thread must be inside a runtime context for the whole session.
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()?;
    let _guard = runtime.enter();

    let store = flow_builder::persistence::FlowStore::new(
        &flow_builder::persistence::StoreConfig::default(),
    );

    #[cfg(feature = "api")]
    flow_builder::api::start_server("127.0.0.1:8000".to_string(), store.clone())?;

    // Run the flow builder application
    let result = flow_builder::run_app_with(store);

    #[cfg(feature = "api")]
    flow_builder::api::stop_server();

    // eframe::Error is not Send + Sync, so it cannot convert into
    // anyhow::Error directly.
    result.map_err(|e| anyhow::anyhow!("{e}"))
}
