//! Block-wise analysis of a buffer
//!
//! Splits a buffer into fixed-size blocks (the last one may be short) and
//! records each block's CRC-32, entropy, class and compression advice.
//! Blocks with equal length and checksum are grouped as duplicates only after
//! a byte-wise comparison confirms them, so checksum collisions never merge
//! distinct content.
//!
//! With `parallel` set, blocks are analyzed on the rayon pool. The report is
//! identical to the sequential one.

use std::collections::HashMap;

use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;
use zc_core::{EntropyConfig, ScanConfig};

use crate::checksum::checksum;
use crate::compare::ordering;
use crate::entropy::{advise_for, classify_with, entropy, CompressionAdvice, EntropyClass};

/// Analysis of a single block
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockReport {
    pub index: usize,
    /// Byte offset of the block within the scanned buffer
    pub offset: u64,
    pub length: usize,
    pub checksum: u32,
    pub entropy: f64,
    pub class: EntropyClass,
    pub advice: CompressionAdvice,
}

/// Blocks with identical content
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    pub checksum: u32,
    pub length: usize,
    /// Block indices, ascending
    pub blocks: Vec<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClassCounts {
    pub constant: usize,
    pub structured: usize,
    pub text: usize,
    pub compressed: usize,
    pub random: usize,
}

impl ClassCounts {
    fn add(&mut self, class: EntropyClass) {
        match class {
            EntropyClass::Constant => self.constant += 1,
            EntropyClass::Structured => self.structured += 1,
            EntropyClass::Text => self.text += 1,
            EntropyClass::Compressed => self.compressed += 1,
            EntropyClass::Random => self.random += 1,
        }
    }

    pub fn get(&self, class: EntropyClass) -> usize {
        match class {
            EntropyClass::Constant => self.constant,
            EntropyClass::Structured => self.structured,
            EntropyClass::Text => self.text,
            EntropyClass::Compressed => self.compressed,
            EntropyClass::Random => self.random,
        }
    }
}

/// Entropy summary over all blocks (zeros when there are none)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EntropyStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub class_counts: ClassCounts,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanReport {
    pub block_size: usize,
    pub total_size: usize,
    /// CRC-32 of the whole buffer
    pub checksum: u32,
    /// Entropy of the whole buffer
    pub entropy: f64,
    pub blocks: Vec<BlockReport>,
    pub stats: EntropyStats,
    pub duplicates: Vec<DuplicateGroup>,
}

impl ScanReport {
    /// Bytes that would not need storing if duplicate blocks were deduplicated
    pub fn duplicate_bytes(&self) -> u64 {
        self.duplicates
            .iter()
            .map(|g| (g.length * (g.blocks.len() - 1)) as u64)
            .sum()
    }

    /// Bytes in blocks advised to be stored without compression
    pub fn incompressible_bytes(&self) -> u64 {
        self.blocks
            .iter()
            .filter(|b| b.advice == CompressionAdvice::Store)
            .map(|b| b.length as u64)
            .sum()
    }
}

/// Analyze `data` in blocks of `settings.block_size` bytes.
pub fn scan(data: &[u8], settings: &ScanConfig, thresholds: &EntropyConfig) -> ScanReport {
    let block_size = settings.block_size.max(1);

    let analyze =
        |(index, block): (usize, &[u8])| analyze_block(index, block_size, block, thresholds);
    let blocks: Vec<BlockReport> = if settings.parallel {
        data.par_chunks(block_size).enumerate().map(analyze).collect()
    } else {
        data.chunks(block_size).enumerate().map(analyze).collect()
    };

    let stats = summarize(&blocks);
    let duplicates = find_duplicates(data, block_size, &blocks);

    debug!(
        total_size = data.len(),
        block_size,
        blocks = blocks.len(),
        duplicate_groups = duplicates.len(),
        mean_entropy = stats.mean,
        "scan complete"
    );

    ScanReport {
        block_size,
        total_size: data.len(),
        checksum: checksum(data),
        entropy: entropy(data),
        blocks,
        stats,
        duplicates,
    }
}

fn analyze_block(
    index: usize,
    block_size: usize,
    block: &[u8],
    thresholds: &EntropyConfig,
) -> BlockReport {
    let bits = entropy(block);
    BlockReport {
        index,
        offset: (index * block_size) as u64,
        length: block.len(),
        checksum: checksum(block),
        entropy: bits,
        class: classify_with(bits, thresholds),
        advice: advise_for(block.len(), bits, thresholds),
    }
}

fn summarize(blocks: &[BlockReport]) -> EntropyStats {
    if blocks.is_empty() {
        return EntropyStats::default();
    }

    let mut stats = EntropyStats {
        min: f64::INFINITY,
        max: f64::NEG_INFINITY,
        ..EntropyStats::default()
    };
    let mut sum = 0.0;
    for block in blocks {
        stats.min = stats.min.min(block.entropy);
        stats.max = stats.max.max(block.entropy);
        sum += block.entropy;
        stats.class_counts.add(block.class);
    }
    stats.mean = sum / blocks.len() as f64;
    stats
}

fn block_bytes<'a>(data: &'a [u8], block_size: usize, block: &BlockReport) -> &'a [u8] {
    let start = block.index * block_size;
    &data[start..start + block.length]
}

fn find_duplicates(data: &[u8], block_size: usize, blocks: &[BlockReport]) -> Vec<DuplicateGroup> {
    let mut buckets: HashMap<(usize, u32), Vec<usize>> = HashMap::new();
    for block in blocks {
        buckets
            .entry((block.length, block.checksum))
            .or_default()
            .push(block.index);
    }

    let mut groups = Vec::new();
    for ((length, crc), members) in buckets {
        if members.len() < 2 {
            continue;
        }
        // Split a bucket into clusters of byte-identical blocks
        let mut clusters: Vec<Vec<usize>> = Vec::new();
        for index in members {
            let bytes = block_bytes(data, block_size, &blocks[index]);
            match clusters
                .iter_mut()
                .find(|c| ordering(block_bytes(data, block_size, &blocks[c[0]]), bytes).is_eq())
            {
                Some(cluster) => cluster.push(index),
                None => clusters.push(vec![index]),
            }
        }
        groups.extend(
            clusters
                .into_iter()
                .filter(|c| c.len() >= 2)
                .map(|indices| DuplicateGroup {
                    checksum: crc,
                    length,
                    blocks: indices,
                }),
        );
    }

    groups.sort_by_key(|g| g.blocks[0]);
    groups
}
