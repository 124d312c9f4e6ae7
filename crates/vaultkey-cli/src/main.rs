use clap::Parser;
use vaultkey_cli::{CliArgs, VaultKeyCli};

fn main() {
    let args = CliArgs::parse();

    let result = VaultKeyCli::from_args("vaultkey", &args).and_then(|cli| cli.run(args));
    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
