use std::process::ExitCode;

use clap::Parser;

use table_meta::{
    cli::Args,
    commands, logging,
    output::{self, Envelope},
    MetaError, MetaResult,
};

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(&args.log_level);

    let envelope = match run(&args) {
        Ok(out) => Envelope::ok(out.engine, out.data),
        Err(e) => Envelope::err(&e),
    };

    let mut stdout = std::io::stdout().lock();
    if let Err(e) = output::write_json_line(&mut stdout, &envelope) {
        tracing::error!(error = %e, "failed to write output");
        return ExitCode::FAILURE;
    }
    if envelope.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn run(args: &Args) -> MetaResult<commands::CommandOutput> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| MetaError::Internal(e.to_string()))?;
    rt.block_on(commands::run(args))
}
