mod args;

use adb_bootstrap::adb::{self, RetryPolicy};
use adb_bootstrap::metrics::LogMetrics;
use adb_bootstrap::timeout::with_timeout;
use adb_bootstrap::{AdbError, AdbResult};
use args::Args;
use std::process::ExitCode;
use std::time::Duration;

fn main() -> ExitCode {
    let Some(args) = Args::parse() else {
        return ExitCode::SUCCESS;
    };

    let default_level = if args.debug_mode { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("❌ Failed to start tokio runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(&args)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args) -> AdbResult<()> {
    let mut policy = RetryPolicy::default();
    if let Some(n) = args.max_attempts {
        policy.max_attempts = n;
    }

    let work = async {
        let handle = adb::get_client_handle_with(&policy, &LogMetrics).await?;
        log::debug!("Using ADB server at {}", handle.address());
        let devices = handle.list_devices().await?;
        Ok::<_, AdbError>((handle.address(), devices))
    };

    let (address, devices) = match args.timeout_secs {
        Some(secs) => {
            with_timeout(Duration::from_secs(secs), work, "bootstrapping ADB client").await??
        }
        None => work.await?,
    };

    println!("🔌 ADB server: {address}");
    if devices.is_empty() {
        println!("❌ No devices found");
    } else {
        for device in &devices {
            println!("📱 {}\t{}", device.name, device.state);
        }
    }
    Ok(())
}
