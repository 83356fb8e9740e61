use std::env;

#[derive(Debug, PartialEq)]
pub struct Args {
    pub debug_mode: bool,
    pub timeout_secs: Option<u64>,
    pub max_attempts: Option<u32>,
}

impl Args {
    pub fn parse() -> Option<Self> {
        Self::parse_from(env::args().skip(1))
    }

    /// Parses flags (program name already stripped). `None` means the
    /// process should exit: help or version was printed, or a flag was bad.
    pub fn parse_from<I, S>(args: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut debug_mode = false;
        let mut timeout_secs: Option<u64> = None;
        let mut max_attempts: Option<u32> = None;

        for arg in args {
            let arg = arg.as_ref();
            if arg == "--help" || arg == "-h" {
                print_help();
                return None;
            } else if arg == "--version" || arg == "-v" {
                println!(
                    "ADB Bootstrap v{} ({})",
                    env!("APP_VERSION_DISPLAY"),
                    env!("APP_BUILD_YEAR")
                );
                return None;
            } else if arg == "--debug" {
                debug_mode = true;
            } else if let Some(val) = arg.strip_prefix("--timeout=") {
                match val.parse::<u64>() {
                    Ok(secs) if secs > 0 => timeout_secs = Some(secs),
                    _ => {
                        eprintln!("❌ Invalid timeout value: {}", val);
                        return None;
                    }
                }
            } else if let Some(val) = arg.strip_prefix("--retries=") {
                match val.parse::<u32>() {
                    Ok(n) if n > 0 => max_attempts = Some(n),
                    _ => {
                        eprintln!("❌ Invalid retries value: {}", val);
                        return None;
                    }
                }
            } else {
                eprintln!("❌ Unknown argument: {}", arg);
                print_help();
                return None;
            }
        }

        Some(Args {
            debug_mode,
            timeout_secs,
            max_attempts,
        })
    }
}

fn print_help() {
    println!("🤖 ADB Bootstrap");
    println!();
    println!("Starts (or finds) the ADB server and lists attached devices.");
    println!();
    println!("USAGE:");
    println!("    adb-bootstrap [FLAGS]");
    println!();
    println!("FLAGS:");
    println!("    --debug             Enable debug logging");
    println!("    --timeout=N         Give up after N seconds");
    println!("    --retries=N         Fallback probe attempts (default: 5)");
    println!("    --help, -h          Show this help message");
    println!("    --version, -v       Show version information");
    println!();
    println!("ENVIRONMENT:");
    println!("    ANDROID_HOME             SDK root; uses $ANDROID_HOME/platform-tools/adb");
    println!("    ANDROID_ADB_SERVER_PORT  ADB server port (default: 5037)");
    println!("    ADB_SERVER_SOCKET        tcp:<host>:<port> of the ADB server");
    println!("    RUST_LOG                 Log filter (overrides --debug)");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_flags() {
        let args = Args::parse_from(Vec::<String>::new()).unwrap();
        assert_eq!(
            args,
            Args {
                debug_mode: false,
                timeout_secs: None,
                max_attempts: None,
            }
        );
    }

    #[test]
    fn parses_all_flags() {
        let args = Args::parse_from(["--debug", "--timeout=10", "--retries=3"]).unwrap();
        assert!(args.debug_mode);
        assert_eq!(args.timeout_secs, Some(10));
        assert_eq!(args.max_attempts, Some(3));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(Args::parse_from(["--timeout=abc"]).is_none());
        assert!(Args::parse_from(["--retries=0"]).is_none());
        assert!(Args::parse_from(["--bogus"]).is_none());
    }
}
