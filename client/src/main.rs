use clap::Parser;
use client::input::{Input, InputManager};
use client::network::{ClientError, GameClient};
use client::rendering::{render, HELP_LINE};
use log::{error, info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::{interval, Duration, MissedTickBehavior};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:8973")]
    server: String,

    /// Player name to register with
    #[arg(short = 'n', long)]
    name: String,

    /// Milliseconds between two state polls
    #[arg(short = 'p', long, default_value = "500")]
    poll_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let mut commands = GameClient::connect(&args.server).await?;
    let slot = commands.register(&args.name).await?;
    println!("Registered as player {}", slot);
    println!("{}", HELP_LINE);

    let session = play(&mut commands, &args, slot).await;
    commands.leave(session).await
}

async fn play(
    commands: &mut GameClient<TcpStream>,
    args: &Args,
    slot: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let poller = GameClient::connect(&args.server)
        .await?
        .with_identity(slot, &args.name);
    let poll_task = tokio::spawn(poll_loop(poller, slot, args.poll_ms));

    let result = read_input(commands, slot).await;
    poll_task.abort();
    result
}

async fn read_input(
    commands: &mut GameClient<TcpStream>,
    slot: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut input_manager = InputManager::new(slot);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        for key in line.chars() {
            match input_manager.handle_key(key) {
                Some(Input::Command(command)) => match commands.send_command(command).await {
                    Ok(message) => info!("{}", message),
                    Err(ClientError::Rpc(e)) => warn!("Command rejected: {}", e),
                    Err(e) => {
                        error!("Lost connection to server: {}", e);
                        return Ok(());
                    }
                },
                Some(Input::Quit) => return Ok(()),
                None => {}
            }
        }
    }

    Ok(())
}

async fn poll_loop(mut client: GameClient<TcpStream>, slot: u32, poll_ms: u64) {
    let mut poll_interval = interval(Duration::from_millis(poll_ms.max(1)));
    poll_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        poll_interval.tick().await;

        match client.get_state().await {
            Ok(state) => {
                println!("{}", render(&state, slot));
            }
            Err(e) => {
                error!("Failed to fetch game state: {}", e);
                break;
            }
        }
    }
}
