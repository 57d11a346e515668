use crate::constants::{DEFAULT_ITERATIONS, IN_PLACE_WARNING};
use crate::error::{ResizeError, Result};
use crate::utils::{is_affirmative, strip_drag_quotes};
use clap::{ArgAction, Parser};
use console::Term;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Input;
use std::io::{self, BufRead, IsTerminal};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "img-fit",
    about = "Cut down on file size!",
    long_about = "img-fit shrinks JPEG and PNG files in place until each one fits under a target size. \
                  It repeatedly downscales and re-encodes every oversized image, searching for the \
                  largest scale whose output stays within the budget.",
    version,
    after_help = "EXAMPLES:\n  \
    img-fit ./photos -s 2\n  \
    img-fit scan.png cover.jpg -s 0.5 --iter 8 -y\n  \
    img-fit ./uploads -s 1 --lazy -v"
)]
pub struct Args {
    #[arg(
        help = "Files or folders to resize in place",
        long_help = "Files or folders to resize in place. Folders are searched recursively \
                     for .png, .jpg and .jpeg files. Prompted for when omitted."
    )]
    pub input: Vec<PathBuf>,

    #[arg(
        short = 'l',
        long,
        help = "Stop querying sizes when a suitable one is found"
    )]
    pub lazy: bool,

    #[arg(
        long = "iter",
        default_value_t = DEFAULT_ITERATIONS,
        help = "How many sizes to query for each image"
    )]
    pub iterations: u32,

    #[arg(
        short = 'v',
        long,
        action = ArgAction::Count,
        help = "Show each queried size (-vv for search internals)"
    )]
    pub verbose: u8,

    #[arg(
        short = 's',
        long,
        help = "Target size (in MB)",
        long_help = "Target size in decimal megabytes (1 MB = 1,000,000 bytes). Prompted for when omitted."
    )]
    pub size: Option<f64>,

    #[arg(short = 'y', long, help = "Automatically bypass in-place warning.")]
    pub yes: bool,

    #[arg(short = 'q', long, help = "Only print warnings and errors")]
    pub quiet: bool,

    #[arg(
        long,
        help = "Losslessly optimize PNG output with oxipng",
        long_help = "Run every PNG attempt through oxipng before measuring it. \
                     Slower, but lets larger scales fit the same budget."
    )]
    pub optimize_png: bool,
}

/// Parses a target size typed at the prompt.
pub fn parse_megabytes(input: &str) -> Result<f64> {
    let trimmed = input.trim();
    trimmed
        .parse::<f64>()
        .map_err(|_| ResizeError::InvalidNumber(trimmed.to_string()))
}

/// Reads one answer from `reader`, without the trailing line break.
///
/// End of input reads as an empty answer.
pub fn read_answer<R: BufRead>(reader: &mut R) -> Result<String> {
    let mut line = String::new();
    reader.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Asks `prompt` interactively on a terminal, or reads a plain line when
/// stdin is piped.
fn ask(prompt: &str, allow_empty: bool) -> Result<String> {
    if io::stdin().is_terminal() {
        let answer: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .allow_empty(allow_empty)
            .interact_text()?;
        return Ok(answer);
    }

    Term::stderr().write_line(prompt)?;
    read_answer(&mut io::stdin().lock())
}

pub fn prompt_input_path() -> Result<PathBuf> {
    let answer = ask(
        "Enter the file/folder path to resize. (You can drag on drop the file/folder on the terminal window)",
        false,
    )?;
    Ok(PathBuf::from(strip_drag_quotes(&answer)))
}

pub fn prompt_target_size() -> Result<f64> {
    let answer = ask("Enter the maximum size to optimize images for [megabytes]", false)?;
    parse_megabytes(&answer)
}

/// Asks before any file is overwritten. Only "y" or "yes" continue.
pub fn confirm_overwrite() -> Result<bool> {
    let answer = ask(IN_PLACE_WARNING, true)?;
    Ok(is_affirmative(&answer))
}

/// Keeps a double-clicked console window open until the user has read the summary.
pub fn pause_before_exit() {
    let _ = ask("Press enter to exit...", true);
}
