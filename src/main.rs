//! Binary entry point: parse arguments and dispatch.

use anyhow::Result;

use suntrack::args::{self, CliAction, ParsedArgs};
use suntrack::common::constants::EXIT_FAILURE;
use suntrack::common::logger::Log;
use suntrack::{Suntrack, app, commands, config};
use suntrack::{log_critical, log_end, log_indented, log_pipe};

fn main() {
    let parsed_args = ParsedArgs::parse(std::env::args());

    if let Err(e) = dispatch(parsed_args.action) {
        // JSON mode may have silenced the logger.
        Log::set_enabled(true);
        log_pipe!();
        log_critical!("{e}");
        for cause in e.chain().skip(1) {
            log_indented!("{cause}");
        }
        if app::is_configuration_error(&e) {
            log_indented!("Set latitude and longitude in suntrack.toml and try again");
        }
        log_end!();
        std::process::exit(EXIT_FAILURE);
    }
}

fn dispatch(action: CliAction) -> Result<()> {
    match action {
        CliAction::ShowVersion => {
            args::display_version_info();
            Ok(())
        }
        CliAction::ShowHelp => {
            args::display_help();
            Ok(())
        }
        CliAction::ShowHelpDueToError => {
            args::display_help();
            std::process::exit(EXIT_FAILURE);
        }
        CliAction::Run {
            debug_enabled,
            config_dir,
            json_output,
        } => {
            config::set_config_dir(config_dir)?;
            Suntrack::new(debug_enabled).json_output(json_output).run()
        }
        CliAction::Status {
            debug_enabled,
            config_dir,
        } => {
            config::set_config_dir(config_dir)?;
            commands::status::handle_status_command(debug_enabled)
        }
        CliAction::Simulate {
            debug_enabled,
            config_dir,
            json_output,
            start_time,
            end_time,
            multiplier,
        } => {
            config::set_config_dir(config_dir)?;
            commands::simulate::handle_simulate_command(
                &start_time,
                &end_time,
                multiplier,
                debug_enabled,
                json_output,
            )
        }
    }
}
