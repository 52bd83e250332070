use anyhow::{bail, Context};
use cutline_preview::{load_project, PlaybackDriver, TracingPlayer, TracingSurface};

const USAGE: &str = "usage: cutline-probe <project.json> [--from SECONDS] [--ticks N] [--precise]";

struct Args {
    path: String,
    from: Option<f64>,
    ticks: Option<u64>,
    precise: bool,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut path = None;
    let mut from = None;
    let mut ticks = None;
    let mut precise = false;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--from" => {
                let value = args.next().context("--from needs a value")?;
                from = Some(value.parse().with_context(|| format!("bad --from {value}"))?);
            }
            "--ticks" => {
                let value = args.next().context("--ticks needs a value")?;
                ticks = Some(value.parse().with_context(|| format!("bad --ticks {value}"))?);
            }
            "--precise" => precise = true,
            "-h" | "--help" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            other if path.is_none() && !other.starts_with('-') => path = Some(other.to_string()),
            other => bail!("unexpected argument {other}\n{USAGE}"),
        }
    }

    Ok(Args {
        path: path.context(USAGE)?,
        from,
        ticks,
        precise,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("CUTLINE_LOG")
                .or_else(|_| tracing_subscriber::EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = parse_args()?;
    let mut project = load_project(&args.path)
        .with_context(|| format!("failed to load project {}", args.path))?;
    if args.precise {
        project.settings = cutline_core::EditorSettings::precise();
    }

    let mut driver = PlaybackDriver::new(project);
    if let Some(from) = args.from {
        driver.seek(from);
    }

    let mut surface = TracingSurface::new();
    let mut player = TracingPlayer;
    let ticks = driver
        .run(&mut surface, &mut player, args.ticks)
        .await
        .context("playback failed")?;

    tracing::info!(ticks, frames = surface.frames(), "done");
    Ok(())
}
