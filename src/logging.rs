use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Installs the global fmt subscriber. Safe to call more than once; later
/// calls are ignored.
pub fn init(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
