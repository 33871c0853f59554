//! Server network layer: TCP accept loop, per-connection tasks, and the tick loop

use crate::combat_manager::CombatManager;
use crate::game::{Game, LocalPlayer};
use crate::npc_manager::{NpcManager, VILLAGER_COUNT};
use crate::session::Session;
use crate::world::World;
use log::{debug, error, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use shared::anim::AssetTable;
use shared::protocol::Message;
use shared::transport::{recv_message, send_message};
use shared::MAX_TICK_DELTA;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Mutex};
use tokio::time::{interval, MissedTickBehavior};

/// Main server coordinating the listener, per-connection tasks and the
/// authoritative tick loop
pub struct Server {
    listener: TcpListener,
    session: Arc<Mutex<Session>>,
    game: Game,
    local: Option<LocalPlayer>,
    tick_duration: Duration,
    running: Arc<AtomicBool>,
}

impl Server {
    pub async fn new(
        host: &str,
        port: u16,
        tick_rate: u32,
        max_clients: usize,
        play: bool,
        enemy_count: usize,
    ) -> Result<Server, Box<dyn std::error::Error>> {
        let listener = TcpListener::bind((host, port)).await?;
        info!("Server listening on {}", listener.local_addr()?);

        let mut rng = StdRng::from_entropy();
        let world = World::generate(&mut rng);
        let quadtree = world.build_quadtree();

        let assets = AssetTable::default();
        let player_frames = assets
            .get("player")
            .ok_or("missing player animation table")?
            .clone();

        let mut npcs = NpcManager::new(StdRng::from_entropy());
        npcs.spawn_kingdom(VILLAGER_COUNT, &world, &assets);

        let mut combat = CombatManager::new(assets, StdRng::from_entropy());
        combat.spawn_overworld(enemy_count, &world);

        let mut session = Session::new(player_frames, combat, npcs, max_clients);
        let local = if play {
            let id = session.spawn_local_player();
            info!("Hosting as player {}", id);
            Some(LocalPlayer::new(id))
        } else {
            None
        };

        Ok(Server {
            listener,
            session: Arc::new(Mutex::new(session)),
            game: Game::new(world, quadtree),
            local,
            tick_duration: Duration::from_secs_f64(1.0 / tick_rate.max(1) as f64),
            running: Arc::new(AtomicBool::new(true)),
        })
    }

    /// The bound address, which matters when the server was started on port 0
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Stop flag for the run loop. Clear it and the loop finishes the
    /// iteration in flight, then returns.
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Main server loop alternating between accepting connections and
    /// ticking until the stop flag is cleared
    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let mut tick_interval = interval(self.tick_duration);
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick fires immediately; skip it so dt starts sane.
        tick_interval.tick().await;
        let mut last_tick = Instant::now();
        let mut tick_count: u64 = 0;

        info!("Server started successfully");

        while self.running.load(Ordering::Relaxed) {
            tokio::select! {
                // Handle incoming connections
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, addr)) => {
                            info!("Connection from {}", addr);
                            self.admit_connection(stream).await;
                        }
                        Err(e) => {
                            error!("Error accepting connection: {}", e);
                        }
                    }
                },

                // Handle server tick events
                _ = tick_interval.tick() => {
                    let now = Instant::now();
                    let dt = clamp_tick_delta(now.duration_since(last_tick).as_secs_f32());
                    last_tick = now;

                    self.tick(dt).await;

                    tick_count += 1;
                    if tick_count % 600 == 0 {
                        let session = self.session.lock().await;
                        debug!(
                            "Tick {}: {} players, {} enemies, {:.1}Hz",
                            tick_count,
                            session.player_count(),
                            session.combat.enemy_count(),
                            1.0 / dt.max(1e-6),
                        );
                    }
                },
            }
        }

        info!("Stop flag cleared, server loop finished");
        Ok(())
    }

    /// Runs one simulation step and queues the snapshot on every connection.
    /// The session lock is released before any queueing happens, so a slow
    /// client can never stall the tick.
    async fn tick(&mut self, dt: f32) {
        let mut session = self.session.lock().await;

        if let Some(local) = self.local.as_mut() {
            let heading = local.sample(dt);
            session.set_intent(local.id, heading, false, false);
        }

        self.game.step(&mut session, dt);

        let snapshot = session.snapshot_message();
        let handles = session.sender_handles();
        drop(session);

        let mut dead = Vec::new();
        for (id, tx) in handles {
            if tx.send(snapshot.clone()).is_err() {
                dead.push(id);
            }
        }

        if !dead.is_empty() {
            let mut session = self.session.lock().await;
            for id in dead {
                session.remove_and_notify(id);
            }
        }
    }

    /// Admits a new connection, or turns it away with an error message when
    /// the session is at capacity
    async fn admit_connection(&self, stream: TcpStream) {
        let (reader, writer) = stream.into_split();

        let mut session = self.session.lock().await;
        if session.is_full() {
            drop(session);
            info!("Turning away connection: server is full");
            tokio::spawn(async move {
                let mut writer = writer;
                let refusal = Message::Error {
                    message: "Server is full.".to_string(),
                };
                if let Err(e) = send_message(&mut writer, &refusal).await {
                    debug!("Failed to deliver refusal: {}", e);
                }
            });
            return;
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let id = session.admit(tx);
        drop(session);

        self.spawn_writer(id, writer, rx);
        self.spawn_reader(id, reader);
    }

    /// Spawns the task that drains one connection's outbound queue
    fn spawn_writer(
        &self,
        id: u32,
        mut writer: OwnedWriteHalf,
        mut rx: mpsc::UnboundedReceiver<Message>,
    ) {
        tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                if let Err(e) = send_message(&mut writer, &message).await {
                    debug!("Write to player {} failed: {}", id, e);
                    break;
                }
            }
        });
    }

    /// Spawns the task that reads one connection's intents until it dies
    fn spawn_reader(&self, id: u32, mut reader: OwnedReadHalf) {
        let session = Arc::clone(&self.session);
        tokio::spawn(async move {
            loop {
                match recv_message(&mut reader).await {
                    Some(Message::PlayerInput {
                        move_vector,
                        attack,
                        interact,
                    }) => {
                        let mut session = session.lock().await;
                        session.set_intent(id, move_vector, attack, interact);
                    }
                    Some(_) => {
                        warn!("Ignoring unexpected message type from player {}", id);
                    }
                    None => break,
                }
            }

            let mut session = session.lock().await;
            session.remove_and_notify(id);
        });
    }
}

fn clamp_tick_delta(dt: f32) -> f32 {
    if dt > MAX_TICK_DELTA {
        warn!("Tick fell behind ({:.0}ms), clamping", dt * 1000.0);
        MAX_TICK_DELTA
    } else {
        dt
    }
}
