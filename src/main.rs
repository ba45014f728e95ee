#[cfg(feature = "ui")]
mod ui;

#[cfg(feature = "ui")]
fn main() -> anyhow::Result<()> {
    use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

    let level = std::env::var("INGOT_LOG")
        .ok()
        .and_then(|s| s.parse::<log::LevelFilter>().ok())
        .unwrap_or(log::LevelFilter::Info);
    let _ = TermLogger::init(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto);

    ui::run_session()
}

#[cfg(not(feature = "ui"))]
fn main() -> anyhow::Result<()> {
    eprintln!(
        "Built without the `ui` feature; nothing to run. \
Enable it with `--features ui`, or just run tests with `--no-default-features`."
    );
    Ok(())
}
