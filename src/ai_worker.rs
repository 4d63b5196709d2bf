//! # AI Worker
//!
//! Runs searches on a background thread so the caller can render the latest
//! position before the (blocking, single-threaded) search starts. Requests
//! and responses travel over `std::sync::mpsc` channels and carry a request
//! id; a request older than the newest one seen is dropped, and a search
//! still queued behind a newer request is skipped.

use crate::config::AiConfig;
use crate::game_wrapper::{GameWrapper, MoveWrapper};
use crate::search::SearchResult;
use log::debug;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

/// Messages sent to the AI worker thread
#[derive(Debug)]
pub enum AIRequest {
    /// Search the given position and reply with a move
    Search {
        request_id: u64,
        game_state: GameWrapper,
        config: AiConfig,
    },
    /// Stop the AI worker thread
    Stop,
}

/// Messages received from the AI worker thread
#[derive(Debug)]
pub enum AIResponse {
    /// The worker picked up a request and started searching
    Thinking(u64),
    /// A search completed; `result.best_move` is `None` when the position has no legal move
    MoveReady {
        request_id: u64,
        result: SearchResult<MoveWrapper>,
    },
}

/// The AI worker that runs in a separate thread
pub struct AIWorker {
    /// Used by randomized opponents
    rng: Xoshiro256PlusPlus,
    /// Newest request id seen so far
    current_request_id: u64,
}

impl AIWorker {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
            current_request_id: 0,
        }
    }

    /// Starts the worker on its own thread and returns both channel ends
    pub fn spawn(self) -> (Sender<AIRequest>, Receiver<AIResponse>, JoinHandle<()>) {
        let (request_tx, request_rx) = mpsc::channel::<AIRequest>();
        let (response_tx, response_rx) = mpsc::channel::<AIResponse>();
        let handle = thread::spawn(move || self.run(request_rx, response_tx));
        (request_tx, response_rx, handle)
    }

    /// Main loop for the AI worker thread
    ///
    /// Processes requests until it receives `Stop` or the request channel closes.
    pub fn run(mut self, rx: Receiver<AIRequest>, tx: Sender<AIResponse>) {
        while let Ok(request) = rx.recv() {
            let mut pending = request;
            // Skip searches that a newer queued request already supersedes
            loop {
                match rx.try_recv() {
                    Ok(AIRequest::Stop) => return,
                    Ok(newer) => pending = newer,
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => break,
                }
            }

            match pending {
                AIRequest::Search {
                    request_id,
                    game_state,
                    config,
                } => {
                    if request_id < self.current_request_id {
                        debug!("ignoring stale search request {}", request_id);
                        continue;
                    }
                    self.current_request_id = request_id;

                    let _ = tx.send(AIResponse::Thinking(request_id));
                    let result = game_state.best_move(&config, &mut self.rng);
                    if tx.send(AIResponse::MoveReady { request_id, result }).is_err() {
                        break;
                    }
                }
                AIRequest::Stop => break,
            }
        }
    }
}
