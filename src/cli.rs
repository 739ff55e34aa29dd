//! Minimal CLI: TDL in → OpenAI schema, `---`, Gemini schema out.
use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// compile a TDL document into OpenAI and Gemini structured-output schemas
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    /// input file; `-`, `/dev/stdin`, or no argument reads standard input
    input: Option<String>,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) {
        if let Err(error) = self.try_run() {
            eprintln!("Error: {error}");
            std::process::exit(1);
        }
    }

    fn try_run(&self) -> anyhow::Result<()> {
        let source = self.read_input()?;
        let conversion = crate::convert(&source)?;

        let openai = serde_json::to_string_pretty(&conversion.openai)?;
        let gemini = serde_json::to_string_pretty(&conversion.gemini)?;
        let rendered = format!("{openai}\n---\n{gemini}\n");

        match self.out.as_ref() {
            Some(out) => {
                if let Some(parent) = out.parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent)
                            .with_context(|| format!("failed to create {}", parent.display()))?;
                    }
                }
                std::fs::write(out, &rendered)
                    .with_context(|| format!("failed to write {}", out.display()))?;
            }
            None => print!("{rendered}"),
        }
        Ok(())
    }

    fn read_input(&self) -> anyhow::Result<String> {
        match self.input.as_deref() {
            None | Some("-") | Some("/dev/stdin") => {
                let mut buf = String::new();
                std::io::stdin()
                    .read_to_string(&mut buf)
                    .context("failed to read standard input")?;
                Ok(buf)
            }
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("failed to read source file: {path}")),
        }
    }
}
