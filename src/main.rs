//! timeload - measure how long each dependency in package.json takes to load

use clap::Parser;
use std::io::Write;
use std::process;
use timeload::{app::App, cli::Cli, error::ErrorReporter, output::SHOW_CURSOR};

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        // The progress display may have hidden the cursor
        let mut stdout = std::io::stdout();
        let _ = stdout.write_all(SHOW_CURSOR.as_bytes());
        let _ = stdout.flush();
        eprintln!("Application panic: {}", panic_info);
        process::exit(99);
    }));

    let cli = Cli::parse();
    let reporter = ErrorReporter::new(cli.use_colors(), cli.verbose || cli.debug);

    let result = match App::from_cli(cli) {
        Ok(app) => app.run().await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        reporter.report_error(&e);
        process::exit(e.exit_code());
    }
}
