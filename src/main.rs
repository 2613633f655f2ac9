mod app;
mod config;
mod gitlog;
mod heat;
mod input;
mod palette;
mod render;
mod ticker;

use anyhow::Result;
use clap::Parser;
use config::Settings;
use std::ffi::OsString;
use std::fs::OpenOptions;

#[derive(Parser, Debug)]
#[command(name = "yulelog")]
#[command(about = "Terminal fireplace with a scrolling git history ticker")]
struct Cli {
    /// Use GitHub contribution graph-style visualization
    #[arg(long)]
    contribs: bool,
}

/// Accept the single-dash `-contribs` spelling as well, which clap would
/// otherwise read as a bundle of short flags.
fn go_style_args<I>(args: I) -> impl Iterator<Item = OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter().map(|a| {
        if a == "-contribs" {
            OsString::from("--contribs")
        } else {
            a
        }
    })
}

/// stdout is the screen, so logs go to a file. Set RUST_LOG to change the level.
fn init_logging() {
    let path = std::env::temp_dir().join("yulelog.log");
    let Ok(file) = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&path)
    else {
        return;
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse_from(go_style_args(std::env::args_os()));
    init_logging();
    log::info!("starting yulelog {:?}", cli);

    app::run(Settings::from_env(cli.contribs))
}
