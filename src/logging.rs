use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const DEFAULT_DIRECTIVE: &str = "kvm_install_sshkey=warn";

/// Filter for the stderr layer: everything from this crate at debug when
/// verbose, otherwise `RUST_LOG` on top of warnings only.
pub fn terminal_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("kvm_install_sshkey=debug")
    } else {
        EnvFilter::builder()
            .with_default_directive(
                DEFAULT_DIRECTIVE
                    .parse()
                    .unwrap_or_else(|_| tracing::Level::WARN.into()),
            )
            .from_env_lossy()
    }
}

/// Install the global subscriber. stdout is left to user-facing messages.
pub fn init(verbose: bool) {
    let terminal_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(terminal_filter(verbose));

    tracing_subscriber::registry().with(terminal_layer).init();
}
