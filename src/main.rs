use parbench::config::HarnessConfig;
use parbench::error::user_friendly_message;
use parbench::simple::{ask_config, run_benchmark};
use parbench::Result;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "parbench=info";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let mut config = HarnessConfig::load().unwrap_or_else(|e| {
        eprintln!("{}", user_friendly_message(&e));
        HarnessConfig::default()
    });

    println!("Press Enter to accept default config or type 'c' to change:");
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    if input.trim().eq_ignore_ascii_case("c") {
        config = ask_config(config)?;
        if let Err(e) = config.save() {
            eprintln!("Could not save configuration: {}", user_friendly_message(&e));
        }
    }

    match run_benchmark(config).await {
        Ok(run) => {
            println!("\n{}\n", run.headline());
            println!("{}", run.render());
            if std::env::var("PARBENCH_JSON").map(|v| v == "1").unwrap_or(false) {
                println!("\n{}", run.to_json()?);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", user_friendly_message(&e));
            std::process::exit(1);
        }
    }
}
