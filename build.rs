use clap::CommandFactory;
use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;

fn main() -> io::Result<()> {
    println!("cargo:rerun-if-changed=crates/carscope-cli/src/lib.rs");

    let man = clap_mangen::Man::new(carscope_cli::Args::command());
    let mut buffer: Vec<u8> = Default::default();
    man.render(&mut buffer)?;

    let out_dir = env::var("OUT_DIR")
        .map(PathBuf::from)
        .map_err(|e| io::Error::new(io::ErrorKind::NotFound, e))?;
    fs::write(out_dir.join("carscope.1"), &buffer)?;

    // OUT_DIR is target/<profile>/build/<pkg>/out; packaging picks the page up from target/release
    if env::var("PROFILE").unwrap_or_default() == "release" {
        if let Some(release_dir) = out_dir.ancestors().nth(3) {
            fs::write(release_dir.join("carscope.1"), &buffer)?;
        }
    }

    Ok(())
}
