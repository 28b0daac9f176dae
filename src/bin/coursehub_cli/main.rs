//! coursehub-cli: terminal front end for the coursehub API.
//! Request bodies reuse the server's http models; reads go through a
//! query cache that mutations invalidate.
#![deny(clippy::all, clippy::pedantic)]

mod args;
mod cache;
mod client;
mod handlers;
mod print;
mod session;
#[cfg(test)]
mod tests;

use std::process::ExitCode;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use args::{Cli, Commands, ShellLine};
use client::{CliError, Ctx, build_ctx_from_cli};
use handlers::{auth, blog, courses, dashboard};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let outcome = match build_ctx_from_cli(&cli) {
        Ok(ctx) => match cli.command {
            Commands::Shell => shell(&ctx).await,
            command => dispatch(&ctx, command).await,
        },
        Err(err) => Err(err),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(ctx: &Ctx, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Register(args) => auth::register(ctx, args).await?,
        Commands::Login { username, password } => auth::login(ctx, username, password).await?,
        Commands::Logout => auth::logout(ctx).await?,
        Commands::Whoami => auth::whoami(ctx).await?,
        Commands::Courses(cmd) => courses::handle(ctx, cmd.action).await?,
        Commands::Blog(cmd) => blog::handle(ctx, cmd.action).await?,
        Commands::Dashboard(cmd) => dashboard::handle(ctx, cmd.action).await?,
        Commands::Shell => println!("already in a shell"),
    }
    Ok(())
}

/// Runs one command per stdin line until EOF or `exit`. Failures are
/// printed and the loop goes on; the query cache lives for the session.
async fn shell(ctx: &Ctx) -> Result<(), CliError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout
            .write_all(b"coursehub> ")
            .await
            .map_err(CliError::Terminal)?;
        stdout.flush().await.map_err(CliError::Terminal)?;
        let Some(line) = lines.next_line().await.map_err(CliError::Terminal)? else {
            break;
        };
        let words = match split_line(&line) {
            Ok(words) => words,
            Err(err) => {
                eprintln!("error: {err}");
                continue;
            }
        };
        match words.first().map(String::as_str) {
            None => continue,
            Some("exit" | "quit") => break,
            Some(_) => {}
        }

        match ShellLine::try_parse_from(words) {
            Ok(parsed) => {
                if let Err(err) = dispatch(ctx, parsed.command).await {
                    eprintln!("error: {err}");
                }
            }
            Err(err) => eprintln!("{err}"),
        }
    }
    Ok(())
}

/// Splits on whitespace, keeping single- or double-quoted runs together.
fn split_line(line: &str) -> Result<Vec<String>, CliError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for ch in line.chars() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') => {
                quote = Some(ch);
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if quote.is_some() {
        return Err(CliError::InvalidInput("unterminated quote".into()));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}
