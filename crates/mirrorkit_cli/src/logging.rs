use tracing_subscriber::EnvFilter;

/// Install the fmt subscriber; `RUST_LOG` wins over the verbosity flag.
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("mirrorkit=debug,mirrorkit_io_fs=debug")
        } else {
            EnvFilter::new("mirrorkit=info,mirrorkit_io_fs=info")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(verbose)
        .with_writer(std::io::stderr)
        .init();
}
