//! Rat Rider headless runner
//!
//! Plays a session at a fixed 60 Hz with the autopilot at the controls,
//! dispatches audio cues, persists the high score and can print the final
//! frame as JSON.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;
    use std::process::ExitCode;

    use clap::{Parser, ValueEnum};
    use rat_rider::audio::{AudioManager, LogBackend};
    use rat_rider::consts::FRAME_DT;
    use rat_rider::sim::{GameEvent, GameSession, PlayMode, TickInput, snapshot, tick};
    use rat_rider::{GameConfig, HighScoreFile, TuningPreset};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
    enum ModeArg {
        Single,
        Multi,
    }

    impl From<ModeArg> for PlayMode {
        fn from(mode: ModeArg) -> Self {
            match mode {
                ModeArg::Single => PlayMode::Single,
                ModeArg::Multi => PlayMode::Multi,
            }
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
    enum PresetArg {
        Classic,
        Casual,
    }

    impl From<PresetArg> for TuningPreset {
        fn from(preset: PresetArg) -> Self {
            match preset {
                PresetArg::Classic => TuningPreset::Classic,
                PresetArg::Casual => TuningPreset::Casual,
            }
        }
    }

    /// Play Rat Rider headless with the autopilot at the controls.
    #[derive(Debug, Parser)]
    #[command(author, version, about, long_about = None)]
    struct Args {
        /// One or two players
        #[arg(value_enum, default_value_t = ModeArg::Single)]
        mode: ModeArg,
        /// Seconds of play before stopping
        #[arg(long, value_name = "SECONDS", default_value_t = 60.0)]
        seconds: f32,
        /// RNG seed; random when omitted
        #[arg(long)]
        seed: Option<u64>,
        /// Tuning preset, ignored when --config is given
        #[arg(long, value_enum, default_value_t = PresetArg::Casual)]
        preset: PresetArg,
        /// JSON config file
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
        #[arg(long, value_name = "PATH", default_value = HighScoreFile::DEFAULT_FILE)]
        highscore: PathBuf,
        /// Background track; music is disabled when it is missing
        #[arg(long, value_name = "PATH", default_value = "background.ogg")]
        music: PathBuf,
        /// Master volume, clamped to 0.0 - 1.0
        #[arg(long, default_value_t = 0.8)]
        volume: f32,
        #[arg(long)]
        mute: bool,
        /// Print the final frame as JSON
        #[arg(long)]
        snapshot: bool,
    }

    /// Hand the frame's events to audio and storage
    fn dispatch(
        session: &mut GameSession,
        audio: &mut AudioManager<LogBackend>,
        scores: &HighScoreFile,
    ) {
        for event in session.drain_events() {
            audio.handle(&event);
            if let GameEvent::HighScoreBeaten(score) = event {
                if let Err(e) = scores.record(score) {
                    log::warn!("{e}");
                }
            }
        }
    }

    pub fn run() -> ExitCode {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

        let args = Args::parse();

        let config = match &args.config {
            Some(path) => GameConfig::load_or_default(path),
            None => GameConfig::from_preset(args.preset.into()),
        };
        let seed = args.seed.unwrap_or_else(rand::random);
        let scores = HighScoreFile::new(&args.highscore);
        let mut audio = AudioManager::new(LogBackend, Some(args.music.as_path()));
        audio.set_master_volume(args.volume);
        audio.set_muted(args.mute);

        let mut session = GameSession::new(config, seed);
        session.start(args.mode.into(), scores.load());

        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        let frames = (args.seconds.max(0.0) / FRAME_DT).ceil() as u64;
        dispatch(&mut session, &mut audio, &scores);
        for _ in 0..frames {
            if !session.mode.is_playing() {
                break;
            }
            tick(&mut session, &input, FRAME_DT);
            dispatch(&mut session, &mut audio, &scores);
        }

        match session.result {
            Some(result) => log::info!("Finished after {:.1}s: {result:?}", session.elapsed),
            None => log::info!(
                "Still running after {:.1}s, score {}",
                session.elapsed,
                session.score
            ),
        }

        if args.snapshot {
            match serde_json::to_string_pretty(&snapshot(&session)) {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    log::error!("Failed to serialize snapshot: {e}");
                    return ExitCode::FAILURE;
                }
            }
        }
        ExitCode::SUCCESS
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {}
