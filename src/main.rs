mod cli;
mod commands;
mod formatting;
mod progress;
mod settings;

use std::process::ExitCode;

use cli::Commands;
use commands::{run_capture, run_convert, run_snapshot};

#[tokio::main]
async fn main() -> ExitCode {
    run().await
}

async fn run() -> ExitCode {
    let raw_args: Vec<String> = std::env::args().collect();
    let args = cli::parse();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();

    match args.command {
        Commands::Capture {
            url,
            selector,
            viewport,
            settle_delay,
            light_only,
            offline,
            out_dir,
            name,
            nav_timeout,
            process_timeout,
            format,
            output,
        } => {
            run_capture(
                &raw_args,
                args.config,
                args.verbose,
                url,
                selector,
                viewport,
                settle_delay,
                light_only,
                offline,
                out_dir,
                name,
                nav_timeout,
                process_timeout,
                format,
                output,
            )
            .await
        }
        Commands::Convert {
            light,
            dark,
            offline,
            out_dir,
            name,
            format,
            output,
        } => {
            run_convert(
                args.config,
                args.verbose,
                light,
                dark,
                offline,
                out_dir,
                name,
                format,
                output,
            )
            .await
        }
        Commands::Snapshot {
            url,
            selector,
            theme,
            out,
            viewport,
            settle_delay,
            nav_timeout,
            process_timeout,
            format,
            output,
        } => {
            run_snapshot(
                &raw_args,
                args.config,
                args.verbose,
                url,
                selector,
                theme.into(),
                out,
                viewport,
                settle_delay,
                nav_timeout,
                process_timeout,
                format,
                output,
            )
            .await
        }
    }
}
