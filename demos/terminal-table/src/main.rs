use std::collections::BTreeMap;

use fourcards::prelude::*;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Terminal presentation
// ---------------------------------------------------------------------------

/// Prints every projection as a line on stdout.
struct Terminal;

fn cards(cards: &[CardRef]) -> String {
    cards
        .iter()
        .enumerate()
        .map(|(i, card)| format!("{}:{card}", i + 1))
        .collect::<Vec<_>>()
        .join("  ")
}

impl Presentation for Terminal {
    fn project_hand(&mut self, hand: &[CardRef]) {
        println!("hand     {}", cards(hand));
    }

    fn project_shown(&mut self, shown: &[CardRef]) {
        println!("table    {}", cards(shown));
    }

    fn project_captured(&mut self, players: &[PlayerSummary], captured: &BTreeMap<String, CardRef>) {
        for player in players {
            let top = captured
                .get(&player.username)
                .map(CardRef::as_str)
                .unwrap_or("-");
            println!(
                "seat     {} ({} captured, top {top})",
                player.username, player.captured_cards
            );
        }
    }

    fn project_turn(&mut self, turn_owner: Option<&str>) {
        println!("turn     {}", turn_owner.unwrap_or("-"));
    }

    fn project_deck_count(&mut self, count: u32) {
        println!("deck     {count} left");
    }

    fn project_playing_card(&mut self, card: Option<&CardRef>) {
        match card {
            Some(card) => println!("playing  {card}"),
            None => println!("playing  (face down)"),
        }
    }

    fn project_narration(&mut self, entry: &NarrationEntry) {
        let mark = match entry.severity {
            Severity::Info => "·",
            Severity::Warn => "!",
            Severity::Success => "*",
        };
        println!("{mark} {}", entry.text);
    }

    fn clear_narration(&mut self) {}

    fn project_protocol_version(&mut self, version: &str) {
        println!("server version {version}");
    }

    fn notify_connected(&mut self) {
        println!("connected");
    }

    fn notify_disconnected(&mut self, will_retry: bool) {
        if will_retry {
            println!("connection lost, reconnecting...");
        } else {
            println!("disconnected");
        }
    }

    fn notify_roster_changed(&mut self, roster: &[String], can_deal: bool) {
        println!("players  {}", roster.join(", "));
        if can_deal {
            println!("type `deal` to start");
        }
    }

    fn notify_awaiting_player_name(&mut self) {
        println!("pick a name with `join <name>`");
    }

    fn notify_game_start(&mut self) {
        println!("--- game started ---");
    }

    fn notify_game_over(&mut self, is_winner: bool, winner: &str) {
        if is_winner {
            println!("--- you won! `restart` for another round ---");
        } else {
            println!("--- {winner} won. `restart` for another round ---");
        }
    }

    fn notify_redirect_home(&mut self) {
        println!("this table is gone; start again without a table id");
    }

    fn persist_session(&mut self, session_id: &SessionId) {
        println!("table    {session_id} (share this id to invite players)");
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq)]
enum Command {
    Join(String),
    Deal,
    Play(CardSelection),
    Pass,
    Restart,
    Style(String),
    Leave,
    Quit,
}

fn parse_command(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let verb = words.next().ok_or("empty command")?;
    let arg = words.next();

    let position = |arg: Option<&str>| -> Result<usize, String> {
        let n: usize = arg
            .ok_or("missing card position")?
            .parse()
            .map_err(|_| "card position must be a number".to_string())?;
        if n == 0 {
            return Err("card positions start at 1".into());
        }
        Ok(n)
    };

    match verb {
        "join" => Ok(Command::Join(arg.ok_or("missing name")?.to_string())),
        "deal" => Ok(Command::Deal),
        "hand" => Ok(Command::Play(CardSelection::Hand(position(arg)?))),
        "shown" => Ok(Command::Play(CardSelection::Shown(position(arg)?))),
        "take" => Ok(Command::Play(CardSelection::Player(
            arg.ok_or("missing player name")?.to_string(),
        ))),
        "pass" => Ok(Command::Pass),
        "restart" => Ok(Command::Restart),
        "style" => Ok(Command::Style(arg.ok_or("missing style name")?.to_string())),
        "leave" => Ok(Command::Leave),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(format!("unknown command `{other}`")),
    }
}

const HELP: &str = "commands: join <name> | deal | hand <n> | shown <n> | take <player> | \
                    pass | restart | style <name> | leave | quit";

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let page = args
        .next()
        .unwrap_or_else(|| "http://127.0.0.1:4000/".to_string());
    let mut config = ClientConfig::from_page_url(&page)?;
    if let Some(name) = args.next() {
        config = config.with_player_name(name);
    }

    tracing::info!(endpoint = %config.endpoint, "starting terminal table");
    let client = SessionClient::connect(config, WebSocketConnector, Terminal);
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(e) => {
                println!("{e}\n{HELP}");
                continue;
            }
        };
        let result = match command {
            Command::Join(name) => client.join(name).await,
            Command::Deal => client.deal().await,
            Command::Play(selection) => client.play(selection).await,
            Command::Pass => client.pass().await,
            Command::Restart => client.restart().await,
            Command::Style(name) => client.deck_style(name).await,
            Command::Leave => {
                client.leave().await?;
                break;
            }
            Command::Quit => break,
        };
        if let Err(e) = result {
            println!("could not do that: {e}");
        }
    }

    client.close().await?;
    Ok(())
}
