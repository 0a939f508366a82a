// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Four commands are supported:
//   1. `preprocess` — corpus files → pair table
//   2. `train`      — pair table → vocabulary, artifacts, epochs
//   3. `encode`     — sentence → padded ids
//   4. `decode`     — ids → sentence
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, DecodeArgs, EncodeArgs, PreprocessArgs, TrainArgs};

use crate::application::{
    infer_use_case::{parse_ids, InferUseCase},
    preprocess_use_case::PreprocessUseCase,
    train_use_case::TrainUseCase,
};

#[derive(Parser, Debug)]
#[command(
    name = "chatbot-pipeline",
    version,
    about = "Cornell Movie-Dialogs preprocessing, vocabulary and batching for seq2seq chatbots."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Dispatch to the matching use case; this layer only routes.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Preprocess(args) => run_preprocess(args),
            Commands::Train(args)      => run_train(args),
            Commands::Encode(args)     => run_encode(args),
            Commands::Decode(args)     => run_decode(args),
        }
    }
}

fn run_preprocess(args: PreprocessArgs) -> Result<()> {
    let summary = PreprocessUseCase::new(args.into()).execute()?;
    println!("Wrote {} pairs to {}", summary.pairs, summary.output.display());
    Ok(())
}

fn run_train(args: TrainArgs) -> Result<()> {
    tracing::info!("Loading pair table from: {}", args.data_dir.display());

    let save_dir = args.save_dir.clone();
    let summary  = TrainUseCase::new(args.into()).execute()?;

    println!(
        "Done. vocab_size={}, {} epoch rows, artifacts in {}",
        summary.vocab_size,
        summary.epochs.len(),
        save_dir.display()
    );
    Ok(())
}

fn run_encode(args: EncodeArgs) -> Result<()> {
    let use_case = InferUseCase::new((&args).into())?;
    let ids: Vec<String> = use_case.encode(&args.text).iter().map(|id| id.to_string()).collect();
    println!("{}", ids.join(","));
    Ok(())
}

fn run_decode(args: DecodeArgs) -> Result<()> {
    let use_case = InferUseCase::new((&args).into())?;
    println!("{}", use_case.decode(&parse_ids(&args.ids)?)?);
    Ok(())
}
