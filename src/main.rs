//! Headless shell for the engine.
//!
//! Loads one URL in a [`Tab`], then prints the display list commands that
//! fall inside the first viewport (or the whole page with `--all`).

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use common::EngineConfig;
use js_dom_bindings::NullEngineFactory;
use net::{NetConfig, NetworkClient};
use page::Tab;
use paint::DisplayCommand;

/// Fetch a page, lay it out and dump what would be painted.
#[derive(Parser)]
#[command(name = "rust_browser")]
#[command(version)]
struct Cli {
    /// Page to load (`http:`, `https:`, `file:` or `about:bookmarks`)
    url: String,

    /// Viewport width in CSS pixels
    #[arg(long, default_value_t = 800.0)]
    width: f32,

    /// Viewport height in CSS pixels
    #[arg(long, default_value_t = 600.0)]
    height: f32,

    /// User-Agent header sent with every request
    #[arg(long, env = "BROWSER_USER_AGENT")]
    user_agent: Option<String>,

    /// Print the whole page instead of the first viewport
    #[arg(long)]
    all: bool,

    /// Print the parsed document tree before the display list
    #[arg(long)]
    dump_dom: bool,
}

fn main() -> ExitCode {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut net_config = NetConfig::default();
    if let Some(agent) = cli.user_agent {
        net_config.user_agent = agent;
    }
    let config = EngineConfig { viewport_width: cli.width, viewport_height: cli.height, ..EngineConfig::default() };

    let mut tab = Tab::new(NetworkClient::tcp(net_config), Box::new(NullEngineFactory), config);
    if let Err(e) = tab.load(&cli.url, None) {
        error!(url = %cli.url, "{e}");
        return ExitCode::FAILURE;
    }
    info!(url = %cli.url, secure = tab.is_secure(), "loaded");

    if cli.dump_dom {
        if let Some(root) = tab.dom().and_then(|dom| dom.root.map(|root| dom.dump(root))) {
            println!("{root}");
        }
    }

    let frame = tab.render();
    let commands: Vec<&DisplayCommand> = if cli.all {
        frame.display_list.iter().collect()
    } else {
        frame.visible(frame.scroll, cli.height).collect()
    };
    for command in commands {
        println!("{}", describe(command));
    }
    ExitCode::SUCCESS
}

fn describe(command: &DisplayCommand) -> String {
    match command {
        DisplayCommand::DrawText { top, left, text, font, color, .. } => {
            format!("text {left:.0},{top:.0} [{font}] {color} {text:?}")
        }
        DisplayCommand::DrawRect { rect, color } => {
            format!("rect {:.0},{:.0} {:.0}x{:.0} {color}", rect.x, rect.y, rect.w, rect.h)
        }
    }
}
