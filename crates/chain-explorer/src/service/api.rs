use super::ChainExplorerService;
use crate::domain::entities::{
    ActivityPoint, AddressStats, Block, BlockSummary, BlockTransactions, ChainActivity,
    ChainSummary, TransactionRecord,
};
use crate::domain::errors::{ExplorerError, KVStoreError};
use crate::domain::keys::{decode_block_number, head_block_key, header_number_key};
use crate::domain::stats::AddressStatsCollector;
use crate::domain::{BlockNumber, Hash};
use crate::ports::inbound::ChainExplorerApi;
use crate::ports::outbound::KeyValueStore;
use tracing::{debug, info, warn};

impl<KV: KeyValueStore> ChainExplorerService<KV> {
    /// Feed every block of `[to, from]`, newest first, to `visit`.
    fn scan<F>(&self, from: BlockNumber, to: BlockNumber, mut visit: F) -> Result<(), ExplorerError>
    where
        F: FnMut(&Block) -> Result<(), ExplorerError>,
    {
        for block in self.walk(from, to)? {
            visit(&block?)?;
        }
        Ok(())
    }

    /// Record every transaction of `block` into `collector`.
    fn collect_block(
        &self,
        block: &Block,
        collector: &mut AddressStatsCollector,
    ) -> Result<(), ExplorerError> {
        for tx in block.transactions() {
            let sender = self.sender_of(block.number(), tx)?;
            collector.record(sender, tx.to, tx.value);
        }
        Ok(())
    }
}

impl<KV: KeyValueStore> ChainExplorerApi for ChainExplorerService<KV> {
    fn chain_summary(&self, tip: BlockNumber) -> Result<ChainSummary, ExplorerError> {
        let mut blocks = Vec::new();
        self.scan(tip, self.config.floor_block, |block| {
            blocks.push(block.summary());
            Ok(())
        })?;
        blocks.reverse();

        info!(tip, blocks = blocks.len(), "built chain summary");
        Ok(ChainSummary { tip, blocks })
    }

    fn recent_blocks(&self, tip: BlockNumber, limit: usize) -> Result<ChainSummary, ExplorerError> {
        let floor = self.config.floor_block;
        if tip < floor {
            return Err(ExplorerError::InvalidRange { from: tip, to: floor });
        }
        if limit == 0 {
            return Ok(ChainSummary {
                tip,
                blocks: Vec::new(),
            });
        }

        let span = u64::try_from(limit - 1).unwrap_or(u64::MAX);
        let lowest = tip.saturating_sub(span).max(floor);
        let mut blocks = self
            .walk(tip, lowest)?
            .map(|block| block.map(|b| b.summary()))
            .collect::<Result<Vec<BlockSummary>, _>>()?;
        blocks.reverse();

        debug!(tip, lowest, blocks = blocks.len(), "built recent block listing");
        Ok(ChainSummary { tip, blocks })
    }

    fn block_transactions(&self, number: BlockNumber) -> Result<BlockTransactions, ExplorerError> {
        let block = self.read_block(number)?;
        let transactions = block
            .transactions()
            .iter()
            .map(|tx| {
                Ok(TransactionRecord {
                    index: tx.index,
                    hash: tx.hash,
                    from: self.sender_of(number, tx)?,
                    to: tx.to,
                    value: tx.value,
                })
            })
            .collect::<Result<Vec<_>, ExplorerError>>()?;

        debug!(number, transactions = transactions.len(), "listed block transactions");
        Ok(BlockTransactions {
            number,
            hash: block.hash,
            transactions,
        })
    }

    fn address_statistics(&self, tip: BlockNumber) -> Result<Vec<AddressStats>, ExplorerError> {
        let mut collector = AddressStatsCollector::new();
        self.scan(tip, self.config.floor_block, |block| {
            self.collect_block(block, &mut collector)
        })?;

        info!(tip, addresses = collector.len(), "aggregated address statistics");
        Ok(collector.finish())
    }

    fn chain_activity(&self, tip: BlockNumber) -> Result<ChainActivity, ExplorerError> {
        let mut points = Vec::new();
        let mut collector = AddressStatsCollector::new();
        self.scan(tip, self.config.floor_block, |block| {
            points.push(ActivityPoint {
                number: block.number(),
                timestamp: block.header.timestamp,
                transaction_count: block.transactions().len(),
            });
            self.collect_block(block, &mut collector)
        })?;
        points.reverse();

        info!(
            tip,
            blocks = points.len(),
            addresses = collector.len(),
            "built chain activity"
        );
        Ok(ChainActivity {
            tip,
            points,
            addresses: collector.finish(),
        })
    }

    fn head_block_number(&self) -> Result<Option<BlockNumber>, ExplorerError> {
        let Some(hash_bytes) = self.store.get(head_block_key())? else {
            debug!("store has no head block marker");
            return Ok(None);
        };
        if hash_bytes.len() != Hash::len_bytes() {
            warn!(len = hash_bytes.len(), "head block marker is not a hash");
            return Err(KVStoreError::CorruptionError {
                message: format!("head block hash is {} bytes", hash_bytes.len()),
            }
            .into());
        }
        let hash = Hash::from_slice(&hash_bytes);

        let number_bytes = self.store.get(&header_number_key(&hash))?.ok_or_else(|| {
            KVStoreError::CorruptionError {
                message: format!("no block number recorded for head block {:?}", hash),
            }
        })?;
        let number = decode_block_number(&number_bytes).ok_or_else(|| {
            KVStoreError::CorruptionError {
                message: format!("head block number is {} bytes", number_bytes.len()),
            }
        })?;

        debug!(number, hash = ?hash, "resolved head block");
        Ok(Some(number))
    }

    fn resolve_tip(&self, explicit: Option<BlockNumber>) -> Result<BlockNumber, ExplorerError> {
        match explicit {
            Some(tip) => Ok(tip),
            None => self.head_block_number()?.ok_or(ExplorerError::UnknownTip),
        }
    }
}
