use crate::controller::Controller;
use crate::game::ClientGame;
use log::{debug, info};
use shared::protocol::Message;
use shared::transport::{recv_message, send_message};
use std::io;
use std::time::Duration;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::time::interval;

const INPUT_INTERVAL_MS: u64 = 50;
const STATUS_LOG_EVERY: u64 = 600;

pub struct Client {
    reader: OwnedReadHalf,
    writer: OwnedWriteHalf,
    pub game: ClientGame,
    controller: Controller,
}

impl Client {
    /// Connects and performs the handshake. The first frame must be
    /// `InitialState`; an `Error` frame means the server turned us away.
    pub async fn connect(
        server: &str,
        controller: Controller,
    ) -> Result<Client, Box<dyn std::error::Error>> {
        info!("Connecting to {}...", server);
        let stream = TcpStream::connect(server).await?;
        let (mut reader, writer) = stream.into_split();

        let handshake = match recv_message(&mut reader).await {
            Some(message) => message,
            None => {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "connection closed during handshake",
                )
                .into())
            }
        };

        let mut game = ClientGame::new();
        match handshake {
            Message::InitialState { .. } => game.handle_message(handshake),
            Message::Error { message } => {
                return Err(io::Error::new(io::ErrorKind::ConnectionRefused, message).into())
            }
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "server opened with something other than a handshake",
                )
                .into())
            }
        }

        Ok(Client {
            reader,
            writer,
            game,
            controller,
        })
    }

    /// Runs until the server goes away. Inputs are sampled and sent from a
    /// spawned task so the read loop owns its half exclusively; a frame
    /// must never be abandoned halfway through.
    pub async fn run(mut self) -> Result<(), Box<dyn std::error::Error>> {
        let mut writer = self.writer;
        let mut controller = self.controller;
        let send_task = tokio::spawn(async move {
            let mut send_interval = interval(Duration::from_millis(INPUT_INTERVAL_MS));
            let dt = INPUT_INTERVAL_MS as f32 / 1000.0;
            loop {
                send_interval.tick().await;
                let intent = controller.sample(dt);
                if let Err(e) = send_message(&mut writer, &intent.to_message()).await {
                    debug!("Input send failed: {}", e);
                    break;
                }
            }
        });

        let mut updates: u64 = 0;
        while let Some(message) = recv_message(&mut self.reader).await {
            let is_update = matches!(message, Message::GameStateUpdate { .. });
            self.game.handle_message(message);

            if is_update {
                updates += 1;
                if updates % STATUS_LOG_EVERY == 0 {
                    let health = self.game.local_player().map(|p| p.health).unwrap_or(0.0);
                    info!(
                        "{} players, {} enemies, {} npcs mirrored; health {:.0}",
                        self.game.players.len(),
                        self.game.enemies.len(),
                        self.game.npcs.len(),
                        health,
                    );
                }
            }
        }

        info!("Server closed the connection");
        send_task.abort();
        Ok(())
    }
}
