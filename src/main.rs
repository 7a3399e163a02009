// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use std::collections::BTreeSet;
use std::env;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use etude::audio::{self, ConsoleBackend};
use etude::music::{pitch_name, Pitch};
use etude::score::MemorySurface;
use etude::{FrameSink, FrameState, ParamChange, PracticeConfig, SessionController};

fn print_usage() {
    println!("ETUDE - Piano Sight-Reading Practice");
    println!();
    println!("Usage: etude [OPTIONS] [PARAM=VALUE ...]");
    println!();
    println!("Options:");
    println!("  --config <PATH>   Load settings from a YAML file");
    println!("  --loops <N>       Play N phrases, then stop (default 1)");
    println!("  --score           Print the MusicXML for the first phrase");
    println!("  --preview <NOTE>  Preview a single note (e.g. C4, F#3) and exit");
    println!("  --help            Show this help message");
    println!();
    println!("Parameters:");
    println!("  mode=c_major|g_major|a_minor");
    println!("  tempo=<BPM>       One of the configured tempos");
    println!("  difficulty=1|2|3");
    println!("  highlight=on|off");
}

struct Options {
    config: Option<String>,
    loops: u32,
    print_score: bool,
    preview: Option<String>,
    changes: Vec<ParamChange>,
}

fn parse_args(args: &[String]) -> Result<Option<Options>> {
    let mut options = Options {
        config: None,
        loops: 1,
        print_score: false,
        preview: None,
        changes: Vec::new(),
    };

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                return Ok(None);
            }
            "--config" => {
                let path = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a path"))?;
                options.config = Some(path.clone());
            }
            "--loops" => {
                let n = iter
                    .next()
                    .ok_or_else(|| anyhow!("--loops requires a number"))?;
                options.loops = n
                    .parse()
                    .map_err(|_| anyhow!("Invalid loop count: {}", n))?;
            }
            "--score" => options.print_score = true,
            "--preview" => {
                let note = iter
                    .next()
                    .ok_or_else(|| anyhow!("--preview requires a note name"))?;
                options.preview = Some(note.clone());
            }
            other if other.contains('=') => options.changes.push(ParamChange::parse(other)?),
            other => return Err(anyhow!("Unknown option: {}", other)),
        }
    }

    Ok(Some(options))
}

/// Prints the keys that light up whenever the set changes
struct ConsoleSink {
    last: BTreeSet<Pitch>,
}

impl FrameSink for ConsoleSink {
    fn present(&mut self, frame: &FrameState) {
        if frame.highlighted == self.last {
            return;
        }
        let names: Vec<String> = frame.highlighted.iter().map(|&p| pitch_name(p)).collect();
        println!("[{:>3.0}%] {}", frame.progress * 100.0, names.join(" "));
        self.last = frame.highlighted.clone();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let Some(options) = parse_args(&args)? else {
        return Ok(());
    };

    let config = match &options.config {
        Some(path) => PracticeConfig::load(path)?,
        None => PracticeConfig::default(),
    };

    let level = tracing::Level::from_str(&config.log_level).unwrap_or(tracing::Level::INFO);
    tracing_subscriber::fmt().with_max_level(level).init();

    let (backend, mut readiness) = ConsoleBackend::loading(config.sample_load_time());
    let backend = audio::shared(backend);

    let mut session = SessionController::new(config.clone(), backend, MemorySurface::new())?;
    for change in options.changes {
        session.apply(change)?;
    }

    if options.print_score {
        println!("{}", session.score_document());
    }

    println!("Loading samples...");
    readiness.wait().await?;

    if let Some(name) = options.preview {
        let event = etude::control::KeyboardEvent::parse(&name)
            .ok_or_else(|| anyhow!("Invalid note name: {}", name))?;
        session.handle_key(event);
        tokio::time::sleep(config.preview_duration()).await;
        return Ok(());
    }

    if options.loops == 0 {
        return Ok(());
    }

    let params = session.params();
    println!(
        "Playing {} phrase(s): {}, {} BPM, difficulty {}",
        options.loops, params.mode, params.tempo, params.difficulty
    );

    if !session.start() {
        return Err(anyhow!("Playback could not start"));
    }

    // Each loop is the phrase plus the guard pause
    let per_loop = session.current_phrase().duration() + config.loop_guard();
    let frames = (per_loop * options.loops).as_secs_f64() * config.frame_rate as f64;

    let mut sink = ConsoleSink {
        last: BTreeSet::new(),
    };
    session.run_display(&mut sink, frames.ceil() as u64).await;
    session.stop();

    println!(
        "Done: {} loop(s), {} phrase(s) generated",
        session.loop_count(),
        session.phrases_generated()
    );
    Ok(())
}
