use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use bc_transaction::{NodeId, Transaction};

use crate::error::NodeError;

/// The append-only per-node log at `./logs/log_<id>.txt` (`spec.md` §6,
/// "Persisted state"). Plain `std::fs`/`std::io` — this is the
/// protocol-mandated artefact `bc-forkview` reads, distinct from the
/// operational `tracing` output the node also emits.
pub struct StateLog {
    file: File,
}

impl StateLog {
    pub fn open(id: NodeId) -> Result<Self, NodeError> {
        Self::open_in(Path::new("./logs"), id)
    }

    pub fn open_in(dir: &Path, id: NodeId) -> Result<Self, NodeError> {
        fs::create_dir_all(dir)?;
        let path: PathBuf = dir.join(format!("log_{id}.txt"));
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { file })
    }

    /// `"Chain: "` followed by comma-separated block hashes, tip first,
    /// genesis last (`spec.md` §6 persisted-state format, §4.6 "log the new
    /// chain state").
    pub fn record_chain_state(&mut self, genesis_to_tip_hashes: &[String]) -> Result<(), NodeError> {
        let tip_to_genesis: Vec<&str> = genesis_to_tip_hashes.iter().rev().map(String::as_str).collect();
        writeln!(self.file, "Chain: {}", tip_to_genesis.join(", "))?;
        Ok(())
    }

    /// Pretty-printed (2-space indent) JSON transaction record.
    pub fn record_transaction(&mut self, tx: &Transaction) -> Result<(), NodeError> {
        let pretty = serde_json::to_string_pretty(tx)?;
        writeln!(self.file, "{pretty}")?;
        Ok(())
    }

    pub fn record_illegal_block(&mut self, sender: NodeId) -> Result<(), NodeError> {
        writeln!(self.file, "IllegalBlock: from node {sender}")?;
        Ok(())
    }

    pub fn record_completion(&mut self, id: NodeId) -> Result<(), NodeError> {
        writeln!(self.file, "[INFO]: Completed execution for {id}")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU32, Ordering};

    static COUNTER: AtomicU32 = AtomicU32::new(0);

    fn temp_subdir(label: &str) -> PathBuf {
        let n = COUNTER.fetch_add(1, Ordering::SeqCst);
        let mut dir = std::env::temp_dir();
        dir.push(format!("bc-node-test-{label}-{n}-{}", std::process::id()));
        dir
    }

    #[test]
    fn record_chain_state_writes_tip_first() {
        let dir = temp_subdir("chain-state");
        let mut log = StateLog::open_in(&dir, 0).unwrap();
        log.record_chain_state(&["genesis".into(), "b1".into(), "b2".into()])
            .unwrap();
        let contents = fs::read_to_string(dir.join("log_0.txt")).unwrap();
        assert_eq!(contents.trim(), "Chain: b2, b1, genesis");
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn record_transaction_writes_pretty_json() {
        let dir = temp_subdir("transaction");
        let mut log = StateLog::open_in(&dir, 1).unwrap();
        let tx = Transaction::init(1, "pem".into(), 100);
        log.record_transaction(&tx).unwrap();
        let contents = fs::read_to_string(dir.join("log_1.txt")).unwrap();
        assert!(contents.contains("\"type\": \"INIT\""));
        let _ = fs::remove_dir_all(dir);
    }
}
