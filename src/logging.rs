use tracing_subscriber::EnvFilter;

/// Log targets of the binary and the library crates it drives.
const WORKSPACE_TARGETS: &[&str] = &[
    "hydromet",
    "hydromet_calendar",
    "hydromet_correction",
    "hydromet_forecast",
    "hydromet_radiation",
    "hydromet_station",
    "hydromet_zones",
];

/// Installs the global subscriber, writing to stderr.
///
/// `-v` raises workspace targets from `warn` to `info`, `-vv` to `debug`
/// and `-vvv` to `trace`. A set `RUST_LOG` takes precedence.
pub fn init(verbosity: u8) {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new(directives(verbosity)),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbosity >= 2)
        .init();
}

/// `EnvFilter` directives for `verbosity`.
fn directives(verbosity: u8) -> String {
    let level = ["warn", "info", "debug"]
        .get(usize::from(verbosity))
        .copied()
        .unwrap_or("trace");
    let mut out = String::new();
    for target in WORKSPACE_TARGETS {
        if !out.is_empty() {
            out.push(',');
        }
        out.push_str(target);
        out.push('=');
        out.push_str(level);
    }
    out
}
