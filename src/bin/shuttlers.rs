// Shuttlers CLI
// Translates ShuttlePro v2 events into key and pointer actions

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[cfg(feature = "pure-rust")]
use clap::Parser;

#[cfg(feature = "pure-rust")]
use shuttlers_core::{
    Config, EffectorSink, RecordingSink, ShuttleDevice, Translator, UInputSink,
};

/// Longest wait between checks of the running flag
const IDLE_POLL: Duration = Duration::from_millis(250);

/// Delay before reopening a device that went away
const REOPEN_DELAY: Duration = Duration::from_secs(1);

/// Jog/shuttle device event translator
#[derive(Parser, Debug)]
#[command(name = "shuttlers")]
#[command(author = "shuttlers contributors")]
#[command(version = "0.3.0")]
#[command(about = "Jog/shuttle device event translator", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Event device to open instead of searching for one
    #[arg(value_name = "DEVICE")]
    device: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Validate config and exit
    #[arg(long)]
    check_config: bool,

    /// Log actions instead of injecting them
    #[arg(long)]
    dry_run: bool,

    /// Quit when the device disconnects instead of waiting for it
    #[arg(short = 'p', long)]
    exit_on_disconnect: bool,
}

/// How long the device read may block
fn poll_timeout(deadline: Option<Instant>, now: Instant) -> Duration {
    match deadline {
        Some(deadline) => deadline.saturating_duration_since(now).min(IDLE_POLL),
        None => IDLE_POLL,
    }
}

/// Main application state
#[cfg(feature = "pure-rust")]
struct Application {
    config: Config,
    args: Args,
    /// Flag to signal event loop to stop
    running: Arc<AtomicBool>,
}

#[cfg(feature = "pure-rust")]
impl Application {
    /// Create a new application from CLI arguments
    fn new(args: Args) -> Result<Self, Box<dyn std::error::Error>> {
        let config = match &args.config {
            Some(path) => Config::from_toml_path(path)?,
            None => Config::load_default()?,
        };

        Ok(Self {
            config,
            args,
            running: Arc::new(AtomicBool::new(true)),
        })
    }

    /// Validate configuration
    fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.config
            .bindings
            .validate(self.config.commands.len())?;
        println!(
            "Configuration is valid: {} layer(s), {} command(s)",
            self.config.bindings.layers().len(),
            self.config.commands.len()
        );
        Ok(())
    }

    fn exit_on_disconnect(&self) -> bool {
        self.args.exit_on_disconnect || self.config.exit_on_disconnect
    }

    /// CLI device > configured device > discovery
    fn device_path(&self) -> Result<PathBuf, Box<dyn std::error::Error>> {
        if let Some(path) = self.args.device.clone().or_else(|| self.config.device_path.clone()) {
            return Ok(path);
        }
        Ok(ShuttleDevice::discover()?)
    }

    fn install_signal_handler(&self) {
        use signal_hook::iterator::Signals;
        let running = self.running.clone();

        std::thread::spawn(move || {
            if let Ok(mut signals) =
                Signals::new([signal_hook::consts::SIGINT, signal_hook::consts::SIGTERM])
            {
                if let Some(signal) = signals.forever().next() {
                    log::info!("Received signal {}, shutting down", signal);
                    running.store(false, Ordering::SeqCst);
                }
            }
        });
    }

    /// Run with the configured effector
    fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.install_signal_handler();
        let commands = self.config.command_table();

        if self.args.dry_run {
            let mut sink = RecordingSink::logging().with_commands(commands);
            self.run_with(&mut sink)
        } else {
            let mut sink = UInputSink::new(commands)?;
            self.run_with(&mut sink)
        }
    }

    /// Open the device and translate frames until stopped
    fn run_with<S: EffectorSink>(&self, sink: &mut S) -> Result<(), Box<dyn std::error::Error>> {
        let mut translator = Translator::new(self.config.to_translator_config());
        let exit_on_disconnect = self.exit_on_disconnect();

        log::info!("shuttlers is running. Press Ctrl+C to exit.");

        while self.running.load(Ordering::SeqCst) {
            let opened = self
                .device_path()
                .and_then(|path| ShuttleDevice::open(path).map_err(Into::into));
            let mut device = match opened {
                Ok(device) => device,
                Err(e) if exit_on_disconnect => return Err(e),
                Err(e) => {
                    log::warn!("{}; retrying", e);
                    std::thread::sleep(REOPEN_DELAY);
                    continue;
                }
            };
            translator.reset();

            while self.running.load(Ordering::SeqCst) {
                let timeout = poll_timeout(translator.next_deadline(), Instant::now());
                match device.read_frame(Some(timeout)) {
                    Ok(Some(frame)) => {
                        translator.process_frame(frame.as_slice(), sink);
                    }
                    Ok(None) => {}
                    Err(e) => {
                        translator.cancel_repeat();
                        if exit_on_disconnect {
                            return Err(e.into());
                        }
                        log::warn!("Lost {}: {}", device.path().display(), e);
                        break;
                    }
                }
                translator.tick(Instant::now(), sink);
            }

            device.ungrab();
            if self.running.load(Ordering::SeqCst) {
                std::thread::sleep(REOPEN_DELAY);
            }
        }

        translator.cancel_repeat();
        log::info!("Stopped");
        Ok(())
    }
}

#[cfg(feature = "pure-rust")]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let app = Application::new(args)?;

    if app.args.check_config {
        return app.validate();
    }

    app.run()
}

// Stub for when pure-rust feature is not enabled
#[cfg(not(feature = "pure-rust"))]
fn main() {
    eprintln!("Error: shuttlers binary requires the 'pure-rust' feature to be enabled.");
    eprintln!("Please build with: cargo build --release --features pure-rust --bin shuttlers");
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(feature = "pure-rust")]
    fn test_args_parsing() {
        let args = Args::parse_from(["shuttlers", "--config", "/tmp/test.toml"]);

        assert_eq!(args.config, Some(PathBuf::from("/tmp/test.toml")));
        assert_eq!(args.device, None);
        assert!(!args.verbose);
        assert!(!args.check_config);
        assert!(!args.dry_run);
        assert!(!args.exit_on_disconnect);
    }

    #[test]
    #[cfg(feature = "pure-rust")]
    fn test_args_with_device_and_flags() {
        let args = Args::parse_from([
            "shuttlers",
            "-v",
            "-p",
            "--dry-run",
            "/dev/input/by-id/usb-Contour_Design_ShuttlePRO_v2-event-if00",
        ]);

        assert!(args.verbose);
        assert!(args.exit_on_disconnect);
        assert!(args.dry_run);
        assert_eq!(
            args.device,
            Some(PathBuf::from(
                "/dev/input/by-id/usb-Contour_Design_ShuttlePRO_v2-event-if00"
            ))
        );
    }

    #[test]
    #[cfg(feature = "pure-rust")]
    fn test_args_check_config() {
        let args = Args::parse_from(["shuttlers", "--config", "/tmp/test.toml", "--check-config"]);

        assert!(args.check_config);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/test.toml")));
    }

    #[test]
    fn test_poll_timeout_follows_repeat_deadline() {
        let now = Instant::now();
        assert_eq!(poll_timeout(None, now), IDLE_POLL);
        assert_eq!(
            poll_timeout(Some(now + Duration::from_millis(20)), now),
            Duration::from_millis(20)
        );
        assert_eq!(poll_timeout(Some(now + Duration::from_secs(5)), now), IDLE_POLL);
        assert_eq!(poll_timeout(Some(now), now + Duration::from_millis(3)), Duration::ZERO);
    }
}
