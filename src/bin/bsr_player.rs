use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use bsr_player::app::{App, PlayOutcome};
use bsr_player::audio::LameTranscoder;
use bsr_player::catalog::BeatSaverClient;
use bsr_player::config::Config;
use bsr_player::domain::BsrId;
use bsr_player::error::PlayerError;
use bsr_player::fetch::HttpFetcher;
use bsr_player::output::ConsoleOutput;
use bsr_player::playback::RodioPlayer;

const EXIT_NOT_PLAYED: u8 = 2;

#[derive(Parser)]
#[command(name = "bsr-player")]
#[command(about = "BeatSaber music player: fetch a map by bsr id, cache its song as MP3 and play it")]
#[command(version)]
struct Cli {
    /// BeatSaver map key
    #[arg(long = "bsr", value_name = "ID")]
    bsr: BsrId,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(PlayOutcome::Played(_)) => ExitCode::SUCCESS,
        Ok(PlayOutcome::NotPlayed) => ExitCode::from(EXIT_NOT_PLAYED),
        Err(err) => {
            let code = map_exit_code(&err);
            eprintln!("{:?}", miette::Report::new(err));
            ExitCode::from(code)
        }
    }
}

fn map_exit_code(error: &PlayerError) -> u8 {
    match error {
        PlayerError::CatalogHttp(_)
        | PlayerError::CatalogStatus { .. }
        | PlayerError::CatalogResponse(_)
        | PlayerError::DownloadHttp(_)
        | PlayerError::DownloadStatus { .. } => 3,
        _ => 1,
    }
}

fn run(cli: Cli) -> Result<PlayOutcome, PlayerError> {
    let config = Config::default();
    let app = App::new(
        &config,
        BeatSaverClient::new(&config)?,
        HttpFetcher::new()?,
        LameTranscoder,
        RodioPlayer,
    );
    app.play(&cli.bsr, &ConsoleOutput)
}
