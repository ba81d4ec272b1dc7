use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use rand::Rng;
use tracing::{debug, warn};

use bc_chain::{Block, Engine};
use bc_crypto::{RsaPublicKey, Wallet};
use bc_transaction::{MessageKind, NodeId, SignedEnvelope, Transaction, WireMessage};

use crate::config::NodeConfig;
use crate::error::NodeError;
use crate::event::NodeEvent;
use crate::state_log::StateLog;

/// One participant in the simulated network (`spec.md` §4.6, §3 "Node
/// state"). Runs on its own OS thread; all mutable state below is owned
/// exclusively by that thread (`spec.md` §5, "process model").
pub struct Node {
    id: NodeId,
    num_nodes: u32,
    wallet: Wallet,
    peer_keys: Arc<HashMap<NodeId, RsaPublicKey>>,
    inbox: Receiver<WireMessage>,
    peers: Vec<(NodeId, Sender<WireMessage>)>,
    is_miner: bool,
    is_dishonest: bool,
    dishonest_master: Option<NodeId>,
    engine: Engine,
    next_block: Option<Block>,
    log: StateLog,
    tick_interval: Duration,
    poll_interval: Duration,
    events: Option<Sender<NodeEvent>>,
}

impl Node {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: NodeConfig,
        wallet: Wallet,
        peer_keys: Arc<HashMap<NodeId, RsaPublicKey>>,
        inbox: Receiver<WireMessage>,
        peers: Vec<(NodeId, Sender<WireMessage>)>,
        events: Option<Sender<NodeEvent>>,
    ) -> Result<Self, NodeError> {
        let log = StateLog::open(config.id)?;
        let engine = Engine::new(config.engine_config());
        Ok(Self {
            id: config.id,
            num_nodes: config.num_nodes,
            wallet,
            peer_keys,
            inbox,
            peers,
            is_miner: config.is_miner,
            is_dishonest: config.is_dishonest,
            dishonest_master: config.dishonest_master,
            engine,
            next_block: None,
            log,
            tick_interval: config.tick_interval,
            poll_interval: config.poll_interval,
            events,
        })
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    fn emit(&self, event: NodeEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }

    /// The main event loop (`spec.md` §4.6 `start_operation`). Runs until
    /// `timeout` elapses, then drains the inbox and returns.
    pub fn start_operation(&mut self, timeout: Duration) -> Result<(), NodeError> {
        self.emit_init_transaction()?;

        let start = Instant::now();
        let mut last_generated = Instant::now();

        while start.elapsed() < timeout {
            // Checked before the inbox is drained so a block mined during
            // this iteration's `dispatch` is only broadcast on the next one,
            // letting peers' already-queued messages drain first
            // (`spec.md` §4.6).
            if let Some(block) = self.next_block.take() {
                self.broadcast_block(&block)?;
            }

            if let Ok(message) = self.inbox.recv_timeout(self.poll_interval) {
                self.dispatch(message)?;
            }

            if last_generated.elapsed() >= self.tick_interval {
                self.generate_and_broadcast()?;
                last_generated = Instant::now();
            }
        }

        while let Ok(message) = self.inbox.try_recv() {
            let _ = self.dispatch(message);
        }

        self.log.record_completion(self.id)?;
        self.emit(NodeEvent::Completed);
        println!("[INFO]: Completed execution for {}", self.id);
        Ok(())
    }

    /// `spec.md` §4.6 step 1: broadcast one `INIT` transaction to self. Every
    /// node receives every broadcast (`spec.md` §1 Non-goals), including the
    /// sender, so this node only sees its own `INIT` applied once it comes
    /// back around through `handle_transaction` like any other message — the
    /// orchestrator wires each node's own inbox sender into its `peers` list
    /// for exactly this reason.
    fn emit_init_transaction(&mut self) -> Result<(), NodeError> {
        let pem = bc_crypto::public_key_to_pem(self.wallet.public_key())?;
        let tx = Transaction::init(self.id, pem, self.engine.config().init_amount);
        self.broadcast_transaction(tx)
    }

    fn dispatch(&mut self, message: WireMessage) -> Result<(), NodeError> {
        match message.message {
            MessageKind::Transaction => self.handle_transaction(message),
            MessageKind::Block => self.handle_block(message),
        }
    }

    fn handle_transaction(&mut self, message: WireMessage) -> Result<(), NodeError> {
        let envelope: SignedEnvelope<Transaction> = serde_json::from_str(&message.pl)?;
        if !self.authenticate(message.sender, &envelope)? {
            debug!(sender = message.sender, "dropped unauthentic transaction");
            self.emit(NodeEvent::TransactionRejected { sender: message.sender });
            return Ok(());
        }

        let tx = envelope.payload;
        self.log.record_transaction(&tx)?;
        let mempool_full = self.engine.add_transaction(tx.clone());
        self.emit(NodeEvent::TransactionAccepted(tx));

        if mempool_full && self.is_miner {
            self.run_miner_step()?;
        }
        Ok(())
    }

    fn handle_block(&mut self, message: WireMessage) -> Result<(), NodeError> {
        if self.is_dishonest && self.dishonest_master != Some(message.sender) {
            debug!(sender = message.sender, "dishonest node ignoring non-master block");
            self.emit(NodeEvent::BlockIgnoredByDishonestNode { sender: message.sender });
            return Ok(());
        }

        let envelope: SignedEnvelope<bc_chain::BlockPayload> = serde_json::from_str(&message.pl)?;
        if !self.authenticate(message.sender, &envelope)? {
            debug!(sender = message.sender, "dropped unauthentic block");
            return Ok(());
        }

        match self.engine.add_block(envelope.payload)? {
            true => {
                let hashes = self.engine.store().main_chain_hashes();
                self.log.record_chain_state(&hashes)?;
                let tip_hash = hashes.last().cloned().unwrap_or_default();
                self.emit(NodeEvent::BlockAccepted {
                    hash: tip_hash,
                    main_chain_len: hashes.len(),
                });
            }
            false => {
                self.log.record_illegal_block(message.sender)?;
                self.emit(NodeEvent::IllegalBlock { sender: message.sender });
            }
        }
        Ok(())
    }

    fn authenticate<T: serde::Serialize>(
        &self,
        sender: NodeId,
        envelope: &SignedEnvelope<T>,
    ) -> Result<bool, NodeError> {
        match self.peer_keys.get(&sender) {
            Some(key) => Ok(envelope.authenticate(key)?),
            None => Ok(false),
        }
    }

    /// `spec.md` §4.6 step e: build the reward transaction, run
    /// proof-of-work to completion, sign the result, and cache it —
    /// broadcast is deferred to the next loop iteration (step d).
    fn run_miner_step(&mut self) -> Result<(), NodeError> {
        let pem = bc_crypto::public_key_to_pem(self.wallet.public_key())?;
        let reward = Transaction::mine(self.id, pem, self.engine.config().reward);

        if let Some(block) = self.engine.proof_of_work(reward)? {
            self.emit(NodeEvent::Mined { hash: block.hash().to_string() });
            self.next_block = Some(block);
        } else {
            warn!(node = self.id, "exhausted nonce space without meeting the target");
        }
        Ok(())
    }

    fn broadcast_block(&mut self, block: &Block) -> Result<(), NodeError> {
        let envelope = SignedEnvelope::sign(block.to_wire(), &self.wallet)?;
        let json = serde_json::to_string(&envelope)?;
        self.broadcast(WireMessage::block(self.id, json));
        Ok(())
    }

    fn broadcast_transaction(&mut self, tx: Transaction) -> Result<(), NodeError> {
        let envelope = SignedEnvelope::sign(tx, &self.wallet)?;
        let json = serde_json::to_string(&envelope)?;
        self.broadcast(WireMessage::transaction(self.id, json));
        Ok(())
    }

    fn broadcast(&self, message: WireMessage) {
        for (peer_id, sender) in &self.peers {
            if sender.send(message.clone()).is_err() {
                debug!(peer = *peer_id, "peer inbox closed, dropping broadcast");
            }
        }
    }

    /// `spec.md` §4.6 step f: pick a recipient, size a transfer against this
    /// node's unspent outputs, and greedily select inputs.
    fn generate_and_broadcast(&mut self) -> Result<(), NodeError> {
        let mut rng = rand::thread_rng();
        let recipient = rng.gen_range(0..self.num_nodes);

        let chain_blocks = self.engine.store().main_chain();
        let chain_txs = chain_blocks.iter().flat_map(|block| block.transactions());
        let mempool_txs = self.engine.mempool().iter();
        let outputs = bc_chain::unspent_outputs_for(self.id, chain_txs, mempool_txs)?;

        let balance: u64 = outputs.iter().map(|output| output.value).sum();
        if balance == 0 {
            return Ok(());
        }

        let amount = rng.gen_range(1..=balance);
        let Some(selection) = bc_chain::select_inputs(&outputs, amount) else {
            return Ok(());
        };

        let recipient_key = self
            .peer_keys
            .get(&recipient)
            .ok_or(NodeError::UnknownPeer(recipient))?;
        let recipient_pem = bc_crypto::public_key_to_pem(recipient_key)?;

        let tx = Transaction::transfer(
            self.id,
            recipient_pem,
            recipient,
            amount,
            selection.inputs,
            selection.change,
        );
        self.broadcast_transaction(tx)?;
        Ok(())
    }
}
