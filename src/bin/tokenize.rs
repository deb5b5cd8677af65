//! strata-tokenize: Tokenize text with a BERT vocabulary.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use serde::Serialize;

use strata_wordpiece::cli;
use strata_wordpiece::{BertTokenizer, Tokenizer, TokenizerConfig, Vocabulary};

#[derive(Parser)]
#[command(name = "strata-tokenize", about = "Tokenize text with a BERT WordPiece vocabulary")]
struct Args {
    /// Path to a vocab.txt file (one token per line)
    #[arg(short = 'v', long)]
    vocab: PathBuf,

    /// Path to a JSON tokenizer config
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Text to tokenize
    #[arg(short = 'p', long, conflicts_with_all = ["file", "stdin"])]
    prompt: Option<String>,

    /// Read text from file
    #[arg(short = 'f', long, conflicts_with = "stdin")]
    file: Option<PathBuf>,

    /// Read text from stdin
    #[arg(long)]
    stdin: bool,

    /// Keep the input's casing
    #[arg(long)]
    cased: bool,

    /// Output only token IDs in list format: [1, 2, 3]
    #[arg(long)]
    ids: bool,

    /// Print total token count
    #[arg(long)]
    show_count: bool,

    /// Also print the detokenized text
    #[arg(long)]
    detokenize: bool,

    /// Output format: text or json
    #[arg(long, default_value = "text", value_parser = validate_output_format)]
    output_format: String,

    /// Suppress all logging
    #[arg(long)]
    log_disable: bool,
}

fn validate_output_format(s: &str) -> Result<String, String> {
    match s {
        "text" | "json" => Ok(s.to_string()),
        _ => Err(format!("Unknown output format '{}'. Options: text, json", s)),
    }
}

#[derive(Serialize)]
struct TokenEntry {
    id: u32,
    text: String,
}

#[derive(Serialize)]
struct JsonOutput {
    tokens: Vec<TokenEntry>,
    count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    detokenized: Option<String>,
}

fn main() {
    let args = Args::parse();
    cli::init_logging(args.log_disable);

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let input = cli::read_input(
        args.prompt.as_deref(),
        args.file.as_deref(),
        args.stdin,
    )?;

    let mut config = match &args.config {
        Some(path) => TokenizerConfig::from_file(path)?,
        None => TokenizerConfig::default(),
    };
    if args.cased {
        config.lowercase = false;
    }

    let vocab = Vocabulary::from_file(&args.vocab)?;
    let tokenizer = BertTokenizer::new(vocab, config)?;

    let tokens = tokenizer.tokenize(&input)?;
    let token_ids = tokenizer.encode(&tokens)?;
    let detokenized = if args.detokenize {
        Some(tokenizer.detokenize(&tokens)?)
    } else {
        None
    };

    match args.output_format.as_str() {
        "json" => {
            let entries: Vec<TokenEntry> = token_ids
                .iter()
                .zip(tokens)
                .map(|(&id, text)| TokenEntry { id, text })
                .collect();
            let output = JsonOutput {
                count: entries.len(),
                tokens: entries,
                detokenized,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        _ => {
            if args.ids {
                let id_strs: Vec<String> = token_ids.iter().map(|id| id.to_string()).collect();
                println!("[{}]", id_strs.join(", "));
            } else {
                for (id, text) in token_ids.iter().zip(&tokens) {
                    println!("{:>5} -> '{}'", id, text);
                }
            }

            if args.show_count {
                println!("Total number of tokens: {}", token_ids.len());
            }

            if let Some(text) = detokenized {
                println!("{}", text);
            }
        }
    }

    Ok(())
}
