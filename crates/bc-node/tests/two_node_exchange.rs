use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use bc_chain::{Block, EngineConfig};
use bc_crypto::Wallet;
use bc_node::{Node, NodeConfig};
use bc_transaction::SignedEnvelope;
use crossbeam_channel::unbounded;

fn config(id: u32, is_dishonest: bool, dishonest_master: Option<u32>) -> NodeConfig {
    NodeConfig {
        id,
        num_nodes: 2,
        is_miner: false,
        is_dishonest,
        dishonest_master,
        block_length: 2,
        difficulty: 1,
        arity: 2,
        init_amount: 100,
        reward: 10,
        tick_interval: Duration::from_secs(3600),
        poll_interval: Duration::from_millis(5),
    }
}

fn mine_child_of(prev_hash: &str, difficulty: u32) -> Block {
    let probe = bc_chain::Engine::new(EngineConfig {
        block_length: 0,
        difficulty,
        arity: 2,
        init_amount: 0,
        reward: 0,
    });
    let mut block = Block::new(vec![], 2, prev_hash.to_string()).unwrap();
    let mut nonce = 0u32;
    loop {
        block.set_nonce(nonce);
        if probe.validate_block(block.to_wire()).is_ok() {
            return block;
        }
        nonce += 1;
    }
}

/// A block signed by node 0 and delivered over a real crossbeam channel is
/// authenticated, validated, and appended by a receiving node
/// (`spec.md` §8 invariant 5 / S3 machinery exercised end-to-end through the
/// node's own dispatch path rather than calling the engine directly).
#[test]
fn node_one_accepts_an_authentic_block_from_node_zero() {
    let wallet_0 = Wallet::generate().unwrap();
    let wallet_1 = Wallet::generate().unwrap();

    let mut keys = HashMap::new();
    keys.insert(0u32, wallet_0.public_key().clone());
    keys.insert(1u32, wallet_1.public_key().clone());
    let keys = Arc::new(keys);

    let (to_node_1, inbox_1) = unbounded();

    let genesis_hash = bc_chain::Engine::new(EngineConfig {
        block_length: 2,
        difficulty: 1,
        arity: 2,
        init_amount: 100,
        reward: 10,
    })
    .store()
    .tip()
    .unwrap()
    .hash()
    .to_string();

    let mined = mine_child_of(&genesis_hash, 1);
    let envelope = SignedEnvelope::sign(mined.to_wire(), &wallet_0).unwrap();
    let json = serde_json::to_string(&envelope).unwrap();
    to_node_1
        .send(bc_transaction::WireMessage::block(0, json))
        .unwrap();

    let mut node_1 = Node::new(config(1, false, None), wallet_1, keys, inbox_1, vec![], None).unwrap();
    node_1.start_operation(Duration::from_millis(100)).unwrap();

    assert_eq!(node_1.engine().store().main_chain().len(), 2);
    assert_eq!(node_1.engine().store().tip().unwrap().hash(), mined.hash());
}

/// A dishonest node with a different declared master drops the same block.
#[test]
fn dishonest_node_drops_a_block_from_a_non_master_sender() {
    let wallet_0 = Wallet::generate().unwrap();
    let wallet_1 = Wallet::generate().unwrap();

    let mut keys = HashMap::new();
    keys.insert(0u32, wallet_0.public_key().clone());
    keys.insert(1u32, wallet_1.public_key().clone());
    let keys = Arc::new(keys);

    let (to_node_1, inbox_1) = unbounded();

    let genesis_hash = bc_chain::Engine::new(EngineConfig {
        block_length: 2,
        difficulty: 1,
        arity: 2,
        init_amount: 100,
        reward: 10,
    })
    .store()
    .tip()
    .unwrap()
    .hash()
    .to_string();

    let mined = mine_child_of(&genesis_hash, 1);
    let envelope = SignedEnvelope::sign(mined.to_wire(), &wallet_0).unwrap();
    let json = serde_json::to_string(&envelope).unwrap();
    to_node_1
        .send(bc_transaction::WireMessage::block(0, json))
        .unwrap();

    // Dishonest node 1 trusts only a master other than node 0.
    let mut node_1 = Node::new(
        config(1, true, Some(9)),
        wallet_1,
        keys,
        inbox_1,
        vec![],
        None,
    )
    .unwrap();
    node_1.start_operation(Duration::from_millis(100)).unwrap();

    assert_eq!(node_1.engine().store().main_chain().len(), 1);
}
