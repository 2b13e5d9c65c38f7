use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use thermalprinter::{
    Barcode, BarcodeOptions, BarcodePosition, CodePage, Justify, MemoryPort, OutOptions, Printer,
    PrinterConfig, SerialPort, Size, Stats, Style, Underline,
};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

/// Set once Ctrl-C or SIGTERM arrived
static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// Prints on a DP-EH600 thermal printer
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Serial device of the printer
    #[clap(long, global = true, default_value = "/dev/ttyAMA0")]
    port: String,

    #[clap(long, global = true, default_value_t = 19200)]
    baud: u32,

    /// Do not update the statistics file
    #[clap(long, global = true)]
    no_stats: bool,

    /// Skip the heat configuration when the session opens
    #[clap(long, global = true)]
    no_setup: bool,

    /// Print the bytes that would be sent instead of opening the port
    #[clap(long, global = true)]
    dry_run: bool,

    #[clap(short, long, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Prints text, read from stdin when none is given
    Text {
        text: Vec<String>,
        #[clap(long)]
        bold: bool,
        #[clap(long)]
        inverse: bool,
        #[clap(long)]
        double_height: bool,
        #[clap(long)]
        double_width: bool,
        #[clap(long, value_enum)]
        underline: Option<Underline>,
        #[clap(long, value_enum)]
        justify: Option<Justify>,
        #[clap(long, value_enum)]
        size: Option<Size>,
        #[clap(long, value_enum)]
        codepage: Option<CodePage>,
        /// Shape as Persian and print right aligned
        #[clap(long)]
        persian: bool,
        /// Do not end with a line feed
        #[clap(long)]
        no_lf: bool,
    },
    /// Feeds paper
    Feed {
        #[clap(default_value_t = 1)]
        lines: u8,
    },
    Barcode {
        data: String,
        #[clap(value_enum)]
        kind: Barcode,
        #[clap(long)]
        height: Option<u8>,
        #[clap(long)]
        width: Option<u8>,
        #[clap(long)]
        left_margin: Option<u8>,
        #[clap(long, value_enum)]
        position: Option<BarcodePosition>,
    },
    /// Prints a picture, scaled down to the head width
    Image { path: String },
    /// Asks the printer for its paper, temperature and voltage status
    Status {
        /// Fail when the printer does not answer
        #[clap(long)]
        strict: bool,
    },
    /// Prints the self-test page
    TestPage,
    Reset,
    /// Lets the printer sleep after some idle seconds
    Sleep {
        #[clap(default_value_t = 0)]
        seconds: u16,
    },
    Wake,
    /// Shows the lifetime counters
    Stats,
}

fn setup_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "debug" } else { "info" })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Turns the first Ctrl-C or SIGTERM into `INTERRUPTED`, so the command in
/// progress finishes its paced wait and the session still gets closed. A
/// second Ctrl-C exits right away.
fn watch_signals() {
    thread::spawn(|| {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(e) => {
                warn!("cannot watch for Ctrl-C: {}", e);
                return;
            }
        };
        runtime.block_on(async {
            shutdown_signal().await;
            INTERRUPTED.store(true, Ordering::SeqCst);
            warn!("interrupted, closing the printer after the current command");
            if tokio::signal::ctrl_c().await.is_ok() {
                std::process::exit(130);
            }
        });
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("cannot listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("cannot listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

fn check_interrupted(interrupted: &AtomicBool) -> anyhow::Result<()> {
    if interrupted.load(Ordering::SeqCst) {
        bail!("interrupted");
    }
    Ok(())
}

fn config(cli: &Cli) -> PrinterConfig {
    PrinterConfig::new(&cli.port)
        .with_baud_rate(cli.baud)
        .with_stats(!cli.no_stats)
        .with_setup_cmd(!cli.no_setup)
}

fn text_options(command: &Commands) -> OutOptions {
    let Commands::Text {
        bold,
        inverse,
        double_height,
        double_width,
        underline,
        justify,
        size,
        codepage,
        persian,
        no_lf,
        ..
    } = command
    else {
        return OutOptions::default();
    };

    let mut style = Style::new();
    if *bold {
        style = style.bold(true);
    }
    if *inverse {
        style = style.inverse(true);
    }
    if *double_height {
        style = style.double_height(true);
    }
    if *double_width {
        style = style.double_width(true);
    }
    style.underline = *underline;
    style.justify = *justify;
    style.size = *size;
    style.codepage = *codepage;

    OutOptions::default()
        .line_feed(!no_lf)
        .persian(*persian)
        .style(style)
}

/// Runs `command`, then closes the session whatever happened, so the
/// statistics of the work already done are saved.
fn execute<P: SerialPort>(
    printer: &mut Printer<P>,
    command: &Commands,
    interrupted: &AtomicBool,
) -> anyhow::Result<()> {
    let result = run(printer, command, interrupted);
    let closed = printer.close();
    result?;
    closed?;
    Ok(())
}

fn run<P: SerialPort>(
    printer: &mut Printer<P>,
    command: &Commands,
    interrupted: &AtomicBool,
) -> anyhow::Result<()> {
    check_interrupted(interrupted)?;
    match command {
        Commands::Text { text, .. } => {
            let text = if text.is_empty() {
                let mut input = String::new();
                std::io::stdin()
                    .read_to_string(&mut input)
                    .context("cannot read stdin")?;
                input.trim_end_matches('\n').to_string()
            } else {
                text.join(" ")
            };
            check_interrupted(interrupted)?;
            printer.out_with(text, &text_options(command))?;
        }
        Commands::Feed { lines } => printer.feed(*lines)?,
        Commands::Barcode {
            data,
            kind,
            height,
            width,
            left_margin,
            position,
        } => {
            let options = BarcodeOptions {
                height: *height,
                width: *width,
                left_margin: *left_margin,
                position: *position,
            };
            printer.barcode_with(data, *kind, options)?;
        }
        Commands::Image { path } => printer.image_file(path)?,
        Commands::Status { strict } => {
            let status = printer.status(*strict)?;
            println!(
                "paper: {}, temperature: {}, voltage: {}",
                ok(status.paper),
                ok(status.temp),
                ok(status.voltage)
            );
        }
        Commands::TestPage => printer.test()?,
        Commands::Reset => printer.reset()?,
        Commands::Sleep { seconds } => printer.sleep(*seconds)?,
        Commands::Wake => {
            // a fresh session believes the printer is awake, `ESC 8 0 0` first
            // so that wake has something to undo
            printer.sleep(0)?;
            check_interrupted(interrupted)?;
            printer.wake()?;
        }
        // read straight from the file, no session
        Commands::Stats => {}
    }
    Ok(())
}

fn ok(state: bool) -> &'static str {
    if state {
        "ok"
    } else {
        "NOT OK"
    }
}

fn hex_dump(bytes: &[u8]) {
    for (idx, chunk) in bytes.chunks(16).enumerate() {
        let hex: Vec<String> = chunk.iter().map(|b| format!("{:02x}", b)).collect();
        let ascii: String = chunk
            .iter()
            .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
            .collect();
        println!("{:08x}  {:<47}  |{}|", idx * 16, hex.join(" "), ascii);
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);
    let config = config(&cli);

    if let Commands::Stats = cli.command {
        let path = config.stats_file();
        let stats = Stats::load(&path)?;
        println!(
            "{}: {} lines printed, {} lines fed",
            path.display(),
            stats.lines,
            stats.feeds
        );
        return Ok(());
    }

    watch_signals();

    if cli.dry_run {
        let mut printer = Printer::with_port(MemoryPort::new(), &config.with_stats(false))?;
        let result = execute(&mut printer, &cli.command, &INTERRUPTED);
        hex_dump(printer.port().written());
        return result;
    }

    let mut printer =
        Printer::open(config).with_context(|| format!("cannot open printer on {}", cli.port))?;
    debug!("{}", printer);
    execute(&mut printer, &cli.command, &INTERRUPTED)
}
