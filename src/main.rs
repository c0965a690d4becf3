use anyhow::{Context, Result};
use babel_meetings::nats::responder;
use babel_meetings::{
    create_router, ids, AppState, Config, HttpRoomClient, NatsChannel, PageEvent, RoomBackend,
    RoomSession, TranscriptMessage,
};
use clap::{Parser, Subcommand};
use futures::stream::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "babel-meetings", version, about = "Live translated meeting client")]
struct Cli {
    /// Config file, without extension
    #[arg(long, default_value = "config/babel-meetings")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the development room backend (REST + channel responder)
    Serve,
    /// Join a room and follow the active speaker until Ctrl-C
    Join {
        /// Room to create or join; generated when omitted
        #[arg(long)]
        room_id: Option<String>,
    },
    /// Print a freshly generated room id
    RoomId,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Serve => serve(cfg).await,
        Command::Join { room_id } => join(cfg, room_id).await,
        Command::RoomId => {
            println!("{}", ids::create_room_id());
            Ok(())
        }
    }
}

async fn serve(cfg: Config) -> Result<()> {
    let state = AppState::new(cfg.service.rooms.clone());
    let sweep_period = Duration::from_secs(cfg.service.rooms.expiry_sweep_secs.max(1));
    let sweep_task = tokio::spawn(state.clone().expire_rooms(sweep_period));

    let nats = async_nats::connect(&cfg.channel.nats_url)
        .await
        .context("Failed to connect to NATS")?;
    let prefix = cfg.channel.subject_prefix.clone();
    let channel_state = state.clone();
    let channel_task =
        tokio::spawn(async move { responder::serve(nats, &prefix, channel_state).await });

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Room backend listening on {}", addr);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await
        .context("HTTP server failed")?;

    channel_task.abort();
    sweep_task.abort();
    info!("Room backend stopped");

    Ok(())
}

async fn join(cfg: Config, room_id: Option<String>) -> Result<()> {
    let catalog = &cfg.catalog;
    for code in [&cfg.session.spoken_language, &cfg.session.caption_language] {
        anyhow::ensure!(catalog.is_supported(code), "Unsupported language: {}", code);
    }

    let backend = Arc::new(HttpRoomClient::new(
        &cfg.backend.base_url,
        cfg.backend.request_timeout(),
    )?);
    let channel = Arc::new(
        NatsChannel::connect(&cfg.channel.nats_url, &cfg.channel.subject_prefix).await?,
    );

    let settings = backend
        .default_settings()
        .await
        .context("Failed to fetch default room settings")?;
    let room_id = room_id.unwrap_or_else(ids::create_room_id);

    // Fallible setup happens before joining; past this point only the
    // page-unload disconnect below exits the room.
    let mut arbiter = cfg.speaker.arbiter()?;
    let mut transcripts = channel.subscribe_transcripts(&room_id).await?;

    let mut session = RoomSession::new(cfg.session.clone(), backend, channel.clone());
    session.start(settings, &room_id).await?;

    if let Some(participant_id) = session.participant_id() {
        info!(
            "Joined {} as {}",
            room_id,
            catalog.display_name(participant_id, &cfg.session.spoken_language)
        );
    }

    let mut highlighted: Option<String> = None;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("Interrupted, leaving room");
                break;
            }
            msg = transcripts.next() => {
                let Some(msg) = msg else { break };

                let transcript = match serde_json::from_slice::<TranscriptMessage>(&msg.payload) {
                    Ok(transcript) => transcript,
                    Err(e) => {
                        warn!("Failed to parse transcript message: {}", e);
                        continue;
                    }
                };

                arbiter.push(transcript.speaker_id);

                if let Some(active) = arbiter.active_speaker() {
                    if highlighted.as_ref() != Some(&active) {
                        let language = transcript.language.as_deref().unwrap_or_default();
                        info!("Active speaker: {}", catalog.display_name(&active, language));
                        highlighted = Some(active);
                    }
                }
            }
        }
    }

    arbiter.clear();
    session.handle_page_event(PageEvent::BeforeUnload).await?;

    Ok(())
}
