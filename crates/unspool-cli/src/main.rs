use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use unspool_core::ast::{AstBackEnd, AstPrinter};
use unspool_core::ir::Module;

#[derive(Parser)]
#[command(name = "unspool", about = "Control-flow structuring back-end for lifted modules")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a JSON-serialized IR module in human-readable form.
    PrintIr {
        /// Path to a JSON IR module file.
        file: PathBuf,
    },
    /// Structure a module's control flow and print pseudo-C per function.
    Structure {
        /// Path to a JSON IR module file.
        file: PathBuf,
    },
}

fn load_module(path: &Path) -> Result<Module> {
    let file =
        File::open(path).with_context(|| format!("cannot open `{}`", path.display()))?;
    let module = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("cannot parse `{}` as an IR module", path.display()))?;
    Ok(module)
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::PrintIr { file } => {
            let module = load_module(&file)?;
            print!("{module}");
        }
        Command::Structure { file } => {
            let module = load_module(&file)?;
            let mut backend = AstBackEnd::new();
            backend.run_on_module(&module);

            for (id, func) in module.functions.iter() {
                let Some(ast) = backend.ast_for_function(id) else {
                    continue;
                };
                println!("fn {}() {{", func.name);
                print!("{}", AstPrinter::new(backend.arena(), func).print_indented(ast, 1));
                println!("}}");
                println!();
            }
        }
    }
    Ok(())
}
