//! Logging setup with indicatif integration
//!
//! Partition pipelines prefix their own lines with a `[CODE]` tag, so the
//! formatter here only adds the level.

use std::fmt;

use indicatif::MultiProgress;

/// Dependencies that flood `debug` (HTML tokenizer, connection pool).
/// Held at `info` unless `RUST_LOG` says otherwise.
const NOISY_TARGETS: &[&str] = &["html5ever", "selectors", "hyper_util", "reqwest"];

/// Padded level label, optionally ANSI-colored.
struct LevelTag {
    level: log::Level,
    color: bool,
}

impl fmt::Display for LevelTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (label, ansi) = match self.level {
            log::Level::Error => ("ERROR", "\x1b[31m"),
            log::Level::Warn => ("WARN ", "\x1b[33m"),
            log::Level::Info => ("INFO ", "\x1b[32m"),
            log::Level::Debug => ("DEBUG", "\x1b[36m"),
            log::Level::Trace => ("TRACE", "\x1b[35m"),
        };
        if self.color {
            write!(f, "[{ansi}{label}\x1b[0m]")
        } else {
            write!(f, "[{label}]")
        }
    }
}

/// Logger that prints through indicatif MultiProgress so lines never tear progress bars.
pub struct IndicatifLogger {
    inner: env_logger::Logger,
    multi: MultiProgress,
}

impl IndicatifLogger {
    pub fn new(inner: env_logger::Logger, multi: MultiProgress) -> Self {
        Self { inner, multi }
    }
}

impl log::Log for IndicatifLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.inner.enabled(metadata)
    }

    fn log(&self, record: &log::Record) {
        if self.inner.enabled(record.metadata()) {
            let tag = LevelTag {
                level: record.level(),
                color: true,
            };
            let line = format!("{tag} {}", record.args());
            self.multi.suspend(|| eprintln!("{line}"));
        }
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

/// Default level for the given verbosity flags. `debug` wins over `quiet`.
pub fn default_level(quiet: bool, debug: bool) -> &'static str {
    if debug {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    }
}

/// `env_logger` filter for the flags; at `debug` the noisy targets stay at `info`.
fn filter_spec(quiet: bool, debug: bool) -> String {
    let level = default_level(quiet, debug);
    if !debug {
        return level.to_string();
    }
    NOISY_TARGETS
        .iter()
        .fold(level.to_string(), |spec, target| format!("{spec},{target}=info"))
}

/// Initialize logging. `multi` selects the TTY path (through progress bars).
///
/// `RUST_LOG` overrides the filter chosen by the flags.
pub fn init_logging(quiet: bool, debug: bool, multi: Option<&MultiProgress>) {
    use std::io::Write;

    let spec = filter_spec(quiet, debug);
    let env = env_logger::Env::default().default_filter_or(spec);

    if let Some(multi) = multi {
        let logger = env_logger::Builder::from_env(env).build();
        let max_level = logger.filter();

        log::set_boxed_logger(Box::new(IndicatifLogger::new(logger, multi.clone())))
            .expect("failed to init logger");
        log::set_max_level(max_level);
    } else {
        // Non-TTY: plain labels, timestamp for long unattended runs
        env_logger::Builder::from_env(env)
            .format(|buf, record| {
                let tag = LevelTag {
                    level: record.level(),
                    color: false,
                };
                writeln!(buf, "{} {tag} {}", buf.timestamp_seconds(), record.args())
            })
            .init();
    }
}
