//! `pagemirror completions <shell>` – emit shell completion script.

use clap::CommandFactory;
use clap_complete::Shell;
use std::io;

use crate::cli::Cli;

pub fn run_completions(shell: Shell) {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "pagemirror", &mut io::stdout());
}
