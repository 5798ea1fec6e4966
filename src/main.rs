//! Coincap Slack Bot - Main Entry Point
//!
//! Wires the pieces together: one shared coin registry, two ingestion
//! tasks feeding it, a watchdog guarding the chat connection, and the
//! inbound message loop dispatching commands.

use anyhow::Context;
use tracing::{debug, error, info, warn};

use coincap_bot::commands::{parse, Dispatcher, Reply};
use coincap_bot::config::BotConfig;
use coincap_bot::feed::{self, CoinCapClient, TradeStream};
use coincap_bot::registry::Registry;
use coincap_bot::slack::{PostOptions, RtmSocket, SlackClient, SlackError, Watchdog};
use coincap_bot::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Note: No .env file found or error loading it: {}", e);
    }

    init_telemetry();

    let config = BotConfig::from_env().context("Failed to load configuration")?;
    info!("Configuration loaded: {:?}", config);

    let slack = SlackClient::new(config.slack_token.clone());
    let registry = Registry::handle();
    let coincap = CoinCapClient::with_base_url(config.api_url.clone());

    // The first snapshot is awaited so commands never race an empty
    // registry; a dead upstream at boot is fatal.
    feed::refresh_all(&coincap, &registry)
        .await
        .context("Initial coin refresh failed")?;
    info!("Initial coin registry populated");

    slack
        .post_message(
            &config.channel_name,
            "Hello world!",
            PostOptions::with_icon(&config.icon),
        )
        .await
        .context("Failed to post greeting")?;

    let refresh_task = tokio::spawn(feed::run_refresh_loop(
        coincap.clone(),
        registry.clone(),
        config.refresh_interval,
    ));

    let trade_task = tokio::spawn(
        TradeStream::with_url(config.ws_url.clone(), registry.clone()).run(),
    );

    let watchdog = Watchdog::new(config.watchdog_timeout);
    let watchdog_task = tokio::spawn(watchdog.clone().run(slack.clone()));

    let dispatcher = Dispatcher::new(registry, coincap);
    let rtm = RtmSocket::new(slack.clone());

    info!("Listening on channel {}", config.channel_id);

    tokio::select! {
        _ = message_loop(rtm, dispatcher, watchdog, slack, &config) => {
            error!("Message loop ended unexpectedly");
        }
        result = refresh_task => {
            error!("Refresh task stopped: {:?}", result);
        }
        result = trade_task => {
            error!("Trade stream task stopped: {:?}", result);
        }
        result = watchdog_task => {
            error!("Watchdog task stopped: {:?}", result);
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    info!("Shutting down");
    Ok(())
}

/// Reads inbound events forever, dispatching commands from the
/// configured channel.
async fn message_loop(
    mut rtm: RtmSocket,
    dispatcher: Dispatcher,
    watchdog: Watchdog,
    slack: SlackClient,
    config: &BotConfig,
) {
    loop {
        let event = rtm.next_event().await;

        // Any inbound event proves the connection is alive, command
        // or not.
        watchdog.touch();

        let Some(text) = event.message_text(&config.channel_id) else {
            continue;
        };

        let Some(command) = parse(text) else {
            continue;
        };
        debug!("Dispatching: {:?}", command);

        for reply in dispatcher.dispatch(command).await {
            if let Err(e) = send_reply(&slack, config, reply).await {
                warn!("Failed to send reply: {}", e);
            }
        }
    }
}

/// Delivers one reply to the configured channel.
async fn send_reply(
    slack: &SlackClient,
    config: &BotConfig,
    reply: Reply,
) -> Result<(), SlackError> {
    match reply {
        Reply::Text(text) => {
            slack
                .post_message(&config.channel_name, &text, PostOptions::with_icon(&config.icon))
                .await
        }
        Reply::Attachment(attachment) => {
            slack
                .post_message(
                    &config.channel_name,
                    "",
                    PostOptions::with_attachments(&config.icon, vec![attachment]),
                )
                .await
        }
        Reply::Table(body) => {
            let fenced = format!("```\n{}\n```", body);
            slack
                .post_message(
                    &config.channel_name,
                    &fenced,
                    PostOptions::with_icon(&config.icon),
                )
                .await
        }
        Reply::FileUpload { filename, bytes } => {
            slack
                .upload_file(&config.channel_name, &filename, "png", bytes)
                .await
        }
    }
}
