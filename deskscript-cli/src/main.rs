use anyhow::{bail, Context};
use deskscript::script::ScriptHost;
use deskscript::Desktop;
use tracing::info;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let script = match args.next() {
        Some(path) => path,
        None => bail!("usage: deskscript <script.js|script.coffee>"),
    };

    let desktop = Desktop::new().context("failed to initialize the desktop provider")?;
    let host = ScriptHost::new(desktop);
    host.run_file(&script)
        .with_context(|| format!("script {script} failed"))?;

    info!(script, "script finished");
    Ok(())
}
