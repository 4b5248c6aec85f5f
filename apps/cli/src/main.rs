#![deny(warnings)]

//! Terminal front end for the Tro exchange calculator.

mod chat;
mod commands;
mod render;

use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use trade_session::{Session, SessionConfig};

use crate::chat::{BotSettings, ChatFeed, ChatMessage, ChatNotice};
use crate::commands::{parse_command, Command, HELP};

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    seed: Option<u64>,
    chat: bool,
    version: bool,
}

fn parse_args() -> Result<Args> {
    let mut args = Args::default();
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => {
                let path = it.next().context("--config needs a path")?;
                args.config = Some(PathBuf::from(path));
            }
            "--seed" => {
                let seed = it.next().context("--seed needs a number")?;
                args.seed = Some(seed.parse().with_context(|| format!("bad seed {seed:?}"))?);
            }
            "--chat" => args.chat = true,
            "--version" | "-V" => args.version = true,
            other => bail!("unknown argument {other:?}"),
        }
    }
    Ok(args)
}

/// Map a typed item name onto the table's spelling, ignoring case.
fn resolve_item(session: &Session, typed: &str) -> String {
    session
        .inventory()
        .table()
        .iter()
        .find(|e| e.name.eq_ignore_ascii_case(typed))
        .map(|e| e.name.clone())
        .unwrap_or_else(|| typed.to_string())
}

fn print_chat(message: &ChatMessage) {
    let who = if message.is_me { "you" } else { message.user.as_str() };
    println!("[chat {}] {}: {}", message.time, who, message.text);
}

/// Run one command. Returns false when the user asked to leave.
fn execute(session: &mut Session, feed: Option<&mut ChatFeed>, command: Command) -> bool {
    let events = match command {
        Command::Quantity { item, text } => {
            let item = resolve_item(session, &item);
            session.set_quantity(&item, &text)
        }
        Command::Unset { item } => {
            let item = resolve_item(session, &item);
            session.set_quantity(&item, "")
        }
        Command::Reset => session.clear_inventory(),
        Command::Set {
            converter,
            field,
            text,
        } => session.edit_field(&converter, field, &text),
        Command::Enter { converter, field } => session.confirm(&converter, field),
        Command::Calc { converter } => session.calculate(&converter),
        Command::ClearLog => session.clear_log(),
        Command::Show => {
            println!("{}", render::overview(session));
            return true;
        }
        Command::Log => {
            println!("{}", render::log(session));
            return true;
        }
        Command::Say(text) => {
            match feed {
                Some(feed) => {
                    if let Some(posted) = feed.post(&text) {
                        print_chat(posted);
                    }
                }
                None => println!("chat is off; start with --chat"),
            }
            return true;
        }
        Command::Help => {
            println!("{HELP}");
            return true;
        }
        Command::Quit => return false,
    };
    println!("{}", render::events(&events));
    true
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args()?;
    if args.version {
        println!(
            "tro {} ({} {})",
            env!("CARGO_PKG_VERSION"),
            env!("TRO_GIT_SHA"),
            env!("TRO_BUILD_DATE")
        );
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::default(),
    };
    if args.seed.is_some() {
        config.rng_seed = args.seed;
    }
    let mut session = Session::new(config)?;
    info!(chat = args.chat, "ready");

    let (mut feed, _bots, mut notices) = if args.chat {
        let seed = args.seed.unwrap_or_else(rand::random);
        let (timer, rx) = chat::start_bots(seed, BotSettings::default());
        (Some(ChatFeed::new()), Some(timer), Some(rx))
    } else {
        (None, None, None)
    };
    if let Some(feed) = &feed {
        feed.messages().for_each(print_chat);
    }

    println!("{}", render::overview(&session));
    println!("type `help` for commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_command(&line) {
                    Ok(command) => {
                        if !execute(&mut session, feed.as_mut(), command) {
                            break;
                        }
                    }
                    Err(msg) => println!("{msg}"),
                }
            }
            Some(notice) = async {
                match notices.as_mut() {
                    Some(rx) => rx.recv().await,
                    None => std::future::pending().await,
                }
            } => match notice {
                ChatNotice::Typing(user) => println!("[chat] {user} is typing..."),
                ChatNotice::Message(message) => {
                    if let Some(feed) = feed.as_mut() {
                        print_chat(feed.push(message));
                    }
                }
            },
        }
    }
    debug!("input closed");
    Ok(())
}
