use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::process;
use sv_autoexpand::{apply_edits, expand, ExpandRequest, ProjectFile};

#[derive(Parser)]
#[command(name = "sv_autoexpand")]
#[command(about = "Expand Verilog AUTO meta-comments in a source file.")]
#[command(version)]
struct Cli {
    /// The file whose AUTOs should be expanded
    file: PathBuf,

    /// Additional project files consulted for module definitions
    #[arg(short = 'p', long = "project")]
    project: Vec<PathBuf>,

    /// Rewrite the file in place instead of printing to stdout
    #[arg(short = 'w', long = "write")]
    write: bool,
}

fn main() {
    let cli = Cli::parse();

    let buffer_text = match fs::read_to_string(&cli.file) {
        Ok(text) => text,
        Err(err) => {
            eprintln!("Error reading {}: {}", cli.file.display(), err);
            process::exit(1);
        }
    };

    let mut project_files = Vec::new();
    for path in &cli.project {
        match fs::read_to_string(path) {
            Ok(text) => project_files.push(ProjectFile {
                uri: path.display().to_string(),
                text,
            }),
            Err(err) => {
                eprintln!("Error reading {}: {}", path.display(), err);
                process::exit(1);
            }
        }
    }

    let request = ExpandRequest {
        buffer_uri: cli.file.display().to_string(),
        buffer_text: buffer_text.clone(),
        cursor_range: None,
        project_files,
    };

    let edits = expand(&request);
    let expanded = apply_edits(&buffer_text, &edits);

    if cli.write {
        if expanded != buffer_text {
            if let Err(err) = fs::write(&cli.file, &expanded) {
                eprintln!("Error writing {}: {}", cli.file.display(), err);
                process::exit(1);
            }
        }
    } else {
        print!("{}", expanded);
    }
}
