use clap::CommandFactory;
use clap_mangen::Man;
use std::{env, fs, path::Path};

#[path = "src/cli.rs"]
#[expect(
    dead_code,
    reason = "Only type definitions are needed for man page generation"
)]
mod cli;

const MAN_DIR: &str = "target/generated-man";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=src/cli.rs");

    let cmd = cli::Cli::command();
    let package = env::var("CARGO_PKG_NAME")?;
    if cmd.get_name() != package {
        return Err(format!(
            "CLI name '{}' differs from package name '{package}'",
            cmd.get_name()
        )
        .into());
    }

    let out_dir = Path::new(MAN_DIR);
    fs::create_dir_all(out_dir)?;
    let mut page = Vec::new();
    Man::new(cmd).render(&mut page)?;
    fs::write(out_dir.join(format!("{package}.1")), page)?;
    Ok(())
}
