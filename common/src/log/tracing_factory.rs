use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::Level;
use tracing_appender::rolling;
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Whether the global subscriber has been installed.
static INITIALIZED: AtomicBool = AtomicBool::new(false);

#[derive(Debug, Clone, Default)]
pub struct TracingFactory {
    options: TracingFactoryOptions,
}

#[derive(Debug, Clone)]
pub struct TracingFactoryOptions {
    debug: bool,

    output_type: OutputType,

    level: Level,

    log_dir: Option<String>,
}

#[derive(Debug, Clone)]
pub enum OutputType {
    Stdout,

    File,
}

impl TracingFactory {
    pub fn init_log(debug: bool) -> Self {
        TracingFactory::init_log_with_options(TracingFactoryOptions::new_with_debug(debug))
    }

    /// Install the global subscriber once; later calls keep the first
    /// configuration.
    pub fn init_log_with_options(opt: TracingFactoryOptions) -> Self {
        let mut opts = opt;

        let dir = match &opts.log_dir {
            None => {
                let path = String::from("/tmp/mysql-driver/logs");
                opts.log_dir = Some(path.clone());
                path
            }
            Some(dir) => dir.clone(),
        };

        if INITIALIZED
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            let format = fmt::format()
                .with_file(true)
                .with_line_number(false)
                .with_target(false)
                .with_thread_ids(true)
                .with_thread_names(true)
                .compact();

            match opts.output_type {
                OutputType::Stdout => {
                    let _ = tracing_subscriber::fmt()
                        .with_max_level(opts.level)
                        .event_format(format)
                        .try_init();
                }
                OutputType::File => {
                    let file_appender = rolling::daily(dir, "driver.log");
                    let merge = file_appender.and(io::stdout);

                    let _ = tracing_subscriber::fmt()
                        .with_max_level(opts.level)
                        .event_format(format)
                        .with_writer(merge)
                        .try_init();
                }
            }
        }

        TracingFactory { options: opts }
    }

    pub fn get_log_dir(&self) -> &str {
        self.options.get_log_dir()
    }
}

impl Default for TracingFactoryOptions {
    fn default() -> Self {
        TracingFactoryOptions::new_with_debug(true)
    }
}

impl TracingFactoryOptions {
    pub fn new_with_debug(debug: bool) -> Self {
        TracingFactoryOptions::new_with_type(debug, OutputType::Stdout)
    }

    pub fn new_with_type(debug: bool, output_type: OutputType) -> Self {
        TracingFactoryOptions::new(debug, output_type, None)
    }

    pub fn new(debug: bool, output_type: OutputType, log_dir: Option<String>) -> Self {
        let level = if debug { Level::DEBUG } else { Level::INFO };

        TracingFactoryOptions {
            debug,
            output_type,
            level,
            log_dir,
        }
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    pub fn get_log_dir(&self) -> &str {
        match self.log_dir.as_ref() {
            None => "",
            Some(dir) => dir.as_str(),
        }
    }
}
