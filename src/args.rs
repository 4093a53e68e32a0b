//! Command-line argument parsing.
//!
//! Flags may appear anywhere on the command line. The first bare word is the
//! subcommand; the bare words after it are its arguments.

/// What the process should do.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Track the sun until interrupted.
    Run {
        debug_enabled: bool,
        config_dir: Option<String>,
        json_output: bool,
    },
    /// Compute and print one snapshot, then exit.
    Status {
        debug_enabled: bool,
        config_dir: Option<String>,
    },
    /// Run the tracker on simulated time over `[start_time, end_time]`.
    Simulate {
        debug_enabled: bool,
        config_dir: Option<String>,
        json_output: bool,
        start_time: String,
        end_time: String,
        /// 0.0 is fast-forward.
        multiplier: f64,
    },
    ShowHelp,
    ShowVersion,
    /// Unknown or malformed arguments; help is shown and the exit code is non-zero.
    ShowHelpDueToError,
}

/// Result of parsing command-line arguments.
pub struct ParsedArgs {
    pub action: CliAction,
}

impl ParsedArgs {
    /// Parse `args`, including the program name in first position.
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args_vec: Vec<String> = args
            .into_iter()
            .skip(1)
            .map(|s| s.as_ref().to_string())
            .collect();

        let mut debug_enabled = false;
        let mut json_output = false;
        let mut display_help = false;
        let mut display_version = false;
        let mut config_dir: Option<String> = None;
        let mut unknown_arg_found = false;
        let mut positionals: Vec<String> = Vec::new();

        let mut i = 0;
        while i < args_vec.len() {
            let arg = &args_vec[i];
            match arg.as_str() {
                "--help" | "-h" => display_help = true,
                "--version" | "-V" | "-v" => display_version = true,
                "--debug" | "-d" => debug_enabled = true,
                "--json" | "-j" => json_output = true,
                "--config" | "-c" => {
                    if i + 1 < args_vec.len() && !args_vec[i + 1].starts_with('-') {
                        config_dir = Some(args_vec[i + 1].clone());
                        i += 1;
                    } else {
                        log_warning!("Missing directory for --config. Usage: --config <directory>");
                        unknown_arg_found = true;
                    }
                }
                _ if arg.starts_with('-') && arg.parse::<f64>().is_err() => {
                    log_warning!("Unknown argument: {}", arg);
                    unknown_arg_found = true;
                }
                _ => positionals.push(arg.clone()),
            }
            i += 1;
        }

        // Help and version take precedence over everything else.
        if display_version {
            return ParsedArgs {
                action: CliAction::ShowVersion,
            };
        }
        if display_help {
            return ParsedArgs {
                action: CliAction::ShowHelp,
            };
        }
        if unknown_arg_found {
            return ParsedArgs {
                action: CliAction::ShowHelpDueToError,
            };
        }

        let action = match positionals.split_first() {
            None => CliAction::Run {
                debug_enabled,
                config_dir,
                json_output,
            },
            Some((command, rest)) => match command.as_str() {
                "status" | "st" if rest.is_empty() => CliAction::Status {
                    debug_enabled,
                    config_dir,
                },
                "simulate" | "sim" => match parse_simulate(rest) {
                    Some((start_time, end_time, multiplier)) => CliAction::Simulate {
                        debug_enabled,
                        config_dir,
                        json_output,
                        start_time,
                        end_time,
                        multiplier,
                    },
                    None => {
                        log_warning!(
                            "Usage: suntrack simulate \"YYYY-MM-DD HH:MM:SS\" \"YYYY-MM-DD HH:MM:SS\" [multiplier]"
                        );
                        CliAction::ShowHelpDueToError
                    }
                },
                "status" | "st" => {
                    log_warning!("status takes no arguments");
                    CliAction::ShowHelpDueToError
                }
                other => {
                    log_warning!("Unknown command: {}", other);
                    CliAction::ShowHelpDueToError
                }
            },
        };

        ParsedArgs { action }
    }
}

/// `START END [MULTIPLIER]`; the multiplier defaults to 3600 (one hour per second).
fn parse_simulate(rest: &[String]) -> Option<(String, String, f64)> {
    match rest {
        [start, end] => Some((start.clone(), end.clone(), 3600.0)),
        [start, end, multiplier] => {
            let multiplier = multiplier.parse::<f64>().ok()?;
            if !multiplier.is_finite() || multiplier < 0.0 {
                log_warning!("Simulation multiplier must be 0 (fast-forward) or positive");
                return None;
            }
            Some((start.clone(), end.clone(), multiplier))
        }
        _ => None,
    }
}

/// Displays version information using the logger.
pub fn display_version_info() {
    log_version!();
    log_pipe!();
    println!("┗ {}", env!("CARGO_PKG_DESCRIPTION"));
}

/// Displays the help message using the logger.
pub fn display_help() {
    log_version!();
    log_block_start!(env!("CARGO_PKG_DESCRIPTION"));
    log_block_start!("Usage:");
    log_indented!("suntrack [OPTIONS] [COMMAND]");
    log_block_start!("Options:");
    log_indented!("-c, --config <dir>     Use custom configuration directory");
    log_indented!("-d, --debug            Enable detailed debug output");
    log_indented!("-j, --json             Print each published state as a JSON line");
    log_indented!("-h, --help             Print help information");
    log_indented!("-V, --version          Print version information");
    log_block_start!("Commands:");
    log_indented!("status, st             Print the current sun state as JSON and exit");
    log_indented!("simulate, sim <start> <end> [multiplier]");
    log_indented!("                       Track the sun over a simulated UTC window");
    log_indented!("                       Times are \"YYYY-MM-DD HH:MM:SS\"; multiplier 0 = fast-forward");
    log_block_start!("Signals:");
    log_indented!("SIGHUP, SIGUSR2        Reload configuration");
    log_indented!("SIGINT, SIGTERM        Stop tracking");
    log_end!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliAction {
        crate::common::logger::Log::set_enabled(false);
        let mut full = vec!["suntrack"];
        full.extend_from_slice(args);
        ParsedArgs::parse(full).action
    }

    #[test]
    fn test_parse_no_args() {
        assert_eq!(
            parse(&[]),
            CliAction::Run {
                debug_enabled: false,
                config_dir: None,
                json_output: false,
            }
        );
    }

    #[test]
    fn test_parse_run_flags() {
        assert_eq!(
            parse(&["-d", "--config", "/tmp/suntrack", "--json"]),
            CliAction::Run {
                debug_enabled: true,
                config_dir: Some("/tmp/suntrack".to_string()),
                json_output: true,
            }
        );
    }

    #[test]
    fn test_parse_config_missing_dir() {
        assert_eq!(parse(&["--config"]), CliAction::ShowHelpDueToError);
        assert_eq!(parse(&["-c", "-d"]), CliAction::ShowHelpDueToError);
    }

    #[test]
    fn test_help_and_version_take_precedence() {
        assert_eq!(parse(&["status", "--help"]), CliAction::ShowHelp);
        assert_eq!(parse(&["--bogus", "-V"]), CliAction::ShowVersion);
        assert_eq!(parse(&["-h", "-v"]), CliAction::ShowVersion);
    }

    #[test]
    fn test_parse_status() {
        assert_eq!(
            parse(&["status", "-c", "dir"]),
            CliAction::Status {
                debug_enabled: false,
                config_dir: Some("dir".to_string()),
            }
        );
        assert_eq!(parse(&["status", "extra"]), CliAction::ShowHelpDueToError);
    }

    #[test]
    fn test_parse_simulate() {
        assert_eq!(
            parse(&["simulate", "2020-06-21 00:00:00", "2020-06-22 00:00:00", "0"]),
            CliAction::Simulate {
                debug_enabled: false,
                config_dir: None,
                json_output: false,
                start_time: "2020-06-21 00:00:00".to_string(),
                end_time: "2020-06-22 00:00:00".to_string(),
                multiplier: 0.0,
            }
        );
    }

    #[test]
    fn test_parse_simulate_default_multiplier() {
        match parse(&["-j", "sim", "2020-06-21 00:00:00", "2020-06-22 00:00:00"]) {
            CliAction::Simulate {
                multiplier,
                json_output,
                ..
            } => {
                assert_eq!(multiplier, 3600.0);
                assert!(json_output);
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn test_parse_simulate_bad_arguments() {
        assert_eq!(parse(&["simulate", "2020-06-21 00:00:00"]), CliAction::ShowHelpDueToError);
        assert_eq!(
            parse(&["simulate", "a", "b", "fast"]),
            CliAction::ShowHelpDueToError
        );
        assert_eq!(parse(&["simulate", "a", "b", "-5"]), CliAction::ShowHelpDueToError);
    }

    #[test]
    fn test_unknown_command_and_flag() {
        assert_eq!(parse(&["reload"]), CliAction::ShowHelpDueToError);
        assert_eq!(parse(&["--bogus"]), CliAction::ShowHelpDueToError);
    }
}
