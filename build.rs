// build.rs

use clap::{Arg, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

fn build_cli() -> Command {
    Command::new("mediashare")
        .version(env!("CARGO_PKG_VERSION"))
        .author("MediaShare Contributors")
        .about("Deployment tooling and runtime service for the MediaShare API")
        .subcommand_required(false)
        .subcommand(
            Command::new("init")
                .about("Render the deployment tree (Ansible project + container build files)")
                .arg(
                    Arg::new("dir")
                        .value_name("DIR")
                        .default_value(".")
                        .help("Target directory"),
                )
                .arg(
                    Arg::new("force")
                        .short('f')
                        .long("force")
                        .action(clap::ArgAction::SetTrue)
                        .help("Overwrite files that were edited locally"),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Validate every file of a deployment tree")
                .arg(
                    Arg::new("dir")
                        .value_name("DIR")
                        .default_value(".")
                        .help("Tree root"),
                ),
        )
        .subcommand(
            Command::new("verify")
                .about("Report files that drifted from the scaffold manifest")
                .arg(
                    Arg::new("dir")
                        .value_name("DIR")
                        .default_value(".")
                        .help("Tree root"),
                ),
        )
        .subcommand(
            Command::new("serve")
                .about("Run the MediaShare API server")
                .arg(
                    Arg::new("bind")
                        .short('b')
                        .long("bind")
                        .value_name("ADDR")
                        .default_value("0.0.0.0:8000")
                        .help("Address to listen on"),
                ),
        )
        .subcommand(
            Command::new("wait")
                .about("Poll a health endpoint until it answers 200")
                .arg(
                    Arg::new("url")
                        .value_name("URL")
                        .default_value("http://127.0.0.1:8000/health")
                        .help("Health endpoint URL"),
                )
                .arg(
                    Arg::new("attempts")
                        .short('a')
                        .long("attempts")
                        .default_value("10")
                        .help("Attempts before giving up"),
                )
                .arg(
                    Arg::new("delay")
                        .short('d')
                        .long("delay")
                        .default_value("5")
                        .help("Seconds to pause between attempts"),
                ),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completion scripts")
                .arg(
                    Arg::new("shell")
                        .required(true)
                        .value_parser(["bash", "zsh", "fish", "powershell"])
                        .help("Shell type"),
                ),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Create man directory
    let out_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir).expect("Failed to create man directory");

    // Generate main man page
    let cmd = build_cli();
    let man = Man::new(cmd);
    let mut buffer = Vec::new();
    man.render(&mut buffer)
        .expect("Failed to render man page");

    let man_path = man_dir.join("mediashare.1");
    fs::write(&man_path, buffer).expect("Failed to write man page");

    println!("cargo:warning=Man page generated at {}", man_path.display());
}
