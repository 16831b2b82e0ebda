//! Fractune command line: expand grammars, generate geometry, derive melodies
//! and inspect saved presets.

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde_json::json;

use fractune::config::{load_config, EngineConfig};
use fractune::context::GenerationContext;
use fractune::grammar::{expand, RuleSet};
use fractune::melody::{Note, Voice};
use fractune::preset::persistence::{load_history, load_preset, save_history};
use fractune::preset::Composition;
use fractune::spec::{FractalSpec, FractalType, DEFAULT_DEPTH};

/// Fractal geometry and melody generator
#[derive(Parser)]
#[command(name = "fractune")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite an axiom with L-system rules and print the result
    Expand {
        axiom: String,
        /// Rule as SYMBOL=REPLACEMENT; separate equally likely choices with '|'
        #[arg(short, long = "rule")]
        rules: Vec<String>,
        #[arg(short, long, default_value_t = DEFAULT_DEPTH)]
        depth: u32,
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Generate a fractal and print its geometry as JSON
    Generate {
        #[command(flatten)]
        fractal: FractalArgs,
    },

    /// Derive a note sequence from a fractal and print it as JSON
    Melody {
        #[command(flatten)]
        fractal: FractalArgs,
        /// Voice whose scale and timing to use
        #[arg(long, default_value = "melody")]
        voice: Voice,
    },

    /// Inspect saved presets
    Preset {
        #[command(subcommand)]
        command: PresetCommand,
    },
}

#[derive(clap::Args)]
struct FractalArgs {
    /// tree, koch, mandelbrot, dragon, barnsley, sierpinski or carpet
    #[arg(value_name = "TYPE")]
    kind: String,
    #[arg(short, long, default_value_t = DEFAULT_DEPTH as i64, allow_negative_numbers = true)]
    depth: i64,
    /// Rules object as JSON; the type's defaults when omitted
    #[arg(short, long)]
    rules: Option<String>,
    /// Use the type's built-in L-system instead of its scalar rules
    #[arg(long, conflicts_with = "rules")]
    lsystem: bool,
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum PresetCommand {
    /// List saved presets, newest first
    List,
    /// Print one saved preset
    Show { id: u64 },
    /// Add an exported preset file to the history
    Import { file: PathBuf },
    /// Render every voice of an exported preset file to notes
    Render {
        file: PathBuf,
        #[arg(short, long, default_value = "Untitled")]
        title: String,
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(e) = run(cli, load_config()) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli, config: EngineConfig) -> Result<(), Box<dyn Error>> {
    match cli.command {
        Commands::Expand {
            axiom,
            rules,
            depth,
            seed,
        } => {
            let mut set = RuleSet::new();
            for text in &rules {
                let (symbol, expansion) = RuleSet::parse_rule(text)?;
                set.insert(symbol, expansion);
            }
            let mut rng = match seed.or(config.seed) {
                Some(seed) => ChaCha8Rng::seed_from_u64(seed),
                None => ChaCha8Rng::from_entropy(),
            };
            let depth = depth.min(config.depth_cap());
            println!("{}", expand(&axiom, &set, depth, &mut rng));
        }
        Commands::Generate { fractal } => {
            let mut ctx = context_for(&fractal, config, Voice::Melody)?;
            let geometry = ctx.generate(Voice::Melody);
            println!("{}", serde_json::to_string(&geometry)?);
        }
        Commands::Melody { fractal, voice } => {
            let mut ctx = context_for(&fractal, config, voice)?;
            let bpm = ctx.config().bpm;
            let notes = ctx.notes(voice);
            let out = json!({
                "voice": voice,
                "bpm": bpm,
                "notes": notes.iter().map(|n| timed(n, bpm)).collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Commands::Preset { command } => run_preset(command, config)?,
    }
    Ok(())
}

fn run_preset(command: PresetCommand, mut config: EngineConfig) -> Result<(), Box<dyn Error>> {
    match command {
        PresetCommand::List => {
            let history = load_history(&config.preset_path())?;
            if history.is_empty() {
                println!("no saved presets");
            }
            for preset in history.iter() {
                println!(
                    "{}  melody={} bass={} drums={}",
                    preset.id,
                    summary(&preset.melody),
                    summary(&preset.bass),
                    summary(&preset.drums),
                );
            }
        }
        PresetCommand::Show { id } => {
            let history = load_history(&config.preset_path())?;
            println!("{}", history.export(id)?);
        }
        PresetCommand::Import { file } => {
            let path = config.preset_path();
            let mut history = load_history(&path)?;
            let id = history.push(load_preset(&file)?);
            save_history(&path, &history)?;
            println!("imported preset {id}");
        }
        PresetCommand::Render { file, title, seed } => {
            let preset = load_preset(&file)?;
            config.seed = seed.or(config.seed);
            let mut ctx = GenerationContext::new(config)?;
            ctx.load_preset(&preset);
            let composition: Composition = ctx.compose(title);
            println!("{}", serde_json::to_string_pretty(&composition)?);
        }
    }
    Ok(())
}

/// A context whose `voice` holds the spec described on the command line.
fn context_for(
    args: &FractalArgs,
    mut config: EngineConfig,
    voice: Voice,
) -> Result<GenerationContext, Box<dyn Error>> {
    let kind: FractalType = args.kind.parse()?;
    let spec = if args.lsystem {
        FractalSpec::lsystem_default(kind, args.depth)?
    } else {
        let rules = match &args.rules {
            Some(text) => serde_json::from_str(text)?,
            None => serde_json::Value::Null,
        };
        FractalSpec::from_parts(kind.name(), args.depth, rules)?
    };
    config.seed = args.seed.or(config.seed);
    let mut ctx = GenerationContext::new(config)?;
    ctx.set_spec(voice, spec);
    Ok(ctx)
}

fn summary(spec: &FractalSpec) -> String {
    let mode = if spec.params().is_lsystem() { "/l" } else { "" };
    format!("{}{mode}@{}", spec.kind(), spec.depth())
}

fn timed(note: &Note, bpm: f64) -> serde_json::Value {
    json!({
        "pitch": note.pitch,
        "midi": note.midi,
        "duration": note.duration,
        "start": note.start,
        "seconds": note.start.to_seconds(bpm),
        "velocity": note.velocity,
    })
}
