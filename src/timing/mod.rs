//! Bit-timing translation.
//!
//! Legacy callers describe the bus speed with the two SJA1000 bus timing
//! registers (BTR0/BTR1). The backend only accepts an abstract bitrate index.
//! Translation is a table lookup followed by a reduction of the decoded bit
//! timing to the nearest standard rate; it never touches the hardware.
//!
//! | BTR0 | BTR1 | Rate  |
//! |------|------|-------|
//! | 0x00 | 0x14 | 1M    |
//! | 0x00 | 0x16 | 800K  |
//! | 0x00 | 0x1C | 500K  |
//! | 0x01 | 0x1C | 250K  |
//! | 0x03 | 0x1C | 125K  |
//! | 0x04 | 0x1C | 100K  |
//! | 0x09 | 0x1C | 50K   |
//! | 0x18 | 0x1C | 20K   |
//! | 0x31 | 0x1C | 10K   |

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AdapterError, Result};

/// CAN clock of an SJA1000 fed with a 16 MHz oscillator
pub const SJA1000_CLOCK: u32 = 8_000_000;

/// Register patterns the adapter knows how to translate
pub const KNOWN_SJA1000_BTR: [u16; 9] = [
    0x0014, 0x0016, 0x001C, 0x011C, 0x031C, 0x041C, 0x091C, 0x181C, 0x311C,
];

/// Standard CAN bitrates accepted by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BitrateIndex {
    #[serde(rename = "1M")]
    Rate1M, // 1Mbit/sec
    #[serde(rename = "800K")]
    Rate800K, // 800kbit/sec
    #[serde(rename = "500K")]
    Rate500K, // 500kbit/sec
    #[serde(rename = "250K")]
    Rate250K, // 250kbit/sec
    #[serde(rename = "125K")]
    Rate125K, // 125kbit/sec
    #[serde(rename = "100K")]
    Rate100K, // 100kbit/sec
    #[serde(rename = "50K")]
    Rate50K, // 50kbit/sec
    #[serde(rename = "20K")]
    Rate20K, // 20kbit/sec
    #[serde(rename = "10K")]
    Rate10K, // 10kbit/sec
}

impl BitrateIndex {
    pub const ALL: [BitrateIndex; 9] = [
        BitrateIndex::Rate1M,
        BitrateIndex::Rate800K,
        BitrateIndex::Rate500K,
        BitrateIndex::Rate250K,
        BitrateIndex::Rate125K,
        BitrateIndex::Rate100K,
        BitrateIndex::Rate50K,
        BitrateIndex::Rate20K,
        BitrateIndex::Rate10K,
    ];

    pub fn bits_per_second(self) -> u32 {
        match self {
            BitrateIndex::Rate1M => 1_000_000,
            BitrateIndex::Rate800K => 800_000,
            BitrateIndex::Rate500K => 500_000,
            BitrateIndex::Rate250K => 250_000,
            BitrateIndex::Rate125K => 125_000,
            BitrateIndex::Rate100K => 100_000,
            BitrateIndex::Rate50K => 50_000,
            BitrateIndex::Rate20K => 20_000,
            BitrateIndex::Rate10K => 10_000,
        }
    }

    /// Backend index value (0 for 1M, counting down)
    pub fn code(self) -> i32 {
        match self {
            BitrateIndex::Rate1M => 0,
            BitrateIndex::Rate800K => -1,
            BitrateIndex::Rate500K => -2,
            BitrateIndex::Rate250K => -3,
            BitrateIndex::Rate125K => -4,
            BitrateIndex::Rate100K => -5,
            BitrateIndex::Rate50K => -6,
            BitrateIndex::Rate20K => -7,
            BitrateIndex::Rate10K => -8,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|idx| idx.code() == code)
    }

    /// Standard rate closest to `bitrate`
    pub fn nearest(bitrate: u32) -> Self {
        let mut best = BitrateIndex::Rate1M;
        for idx in Self::ALL {
            if idx.bits_per_second().abs_diff(bitrate) < best.bits_per_second().abs_diff(bitrate) {
                best = idx;
            }
        }
        best
    }
}

impl fmt::Display for BitrateIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BitrateIndex::Rate1M => "1M",
            BitrateIndex::Rate800K => "800K",
            BitrateIndex::Rate500K => "500K",
            BitrateIndex::Rate250K => "250K",
            BitrateIndex::Rate125K => "125K",
            BitrateIndex::Rate100K => "100K",
            BitrateIndex::Rate50K => "50K",
            BitrateIndex::Rate20K => "20K",
            BitrateIndex::Rate10K => "10K",
        };
        f.write_str(name)
    }
}

/// Bit-timing fields encoded in the SJA1000 BTR0/BTR1 registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitTiming {
    pub brp: u16,   // baud rate prescaler
    pub tseg1: u16, // time quanta before the sample point (incl. propagation)
    pub tseg2: u16, // time quanta after the sample point
    pub sjw: u16,   // synchronisation jump width
    pub sam: u8,    // triple sampling
}

impl BitTiming {
    /// Decodes a composite BTR0:BTR1 register value
    pub fn from_sja1000(btr0btr1: u16) -> Self {
        let [btr0, btr1] = btr0btr1.to_be_bytes();
        Self {
            brp: u16::from(btr0 & 0x3F) + 1,
            sjw: u16::from(btr0 >> 6) + 1,
            tseg1: u16::from(btr1 & 0x0F) + 1,
            tseg2: u16::from((btr1 >> 4) & 0x07) + 1,
            sam: btr1 >> 7,
        }
    }

    /// Time quanta per bit
    pub fn quanta(&self) -> u32 {
        1 + u32::from(self.tseg1) + u32::from(self.tseg2)
    }

    /// Nominal bitrate for the given CAN clock
    pub fn bitrate(&self, clock: u32) -> u32 {
        clock / (u32::from(self.brp) * self.quanta())
    }
}

/// Combines BTR0 (high byte) and BTR1 (low byte)
pub fn composite(timing0: u8, timing1: u8) -> u16 {
    u16::from_be_bytes([timing0, timing1])
}

/// Translates legacy timing registers into a backend bitrate index
pub fn translate_timing(timing0: u8, timing1: u8) -> Result<BitrateIndex> {
    let btr = composite(timing0, timing1);
    if !KNOWN_SJA1000_BTR.contains(&btr) {
        return Err(AdapterError::UnsupportedTiming(btr));
    }

    let timing = BitTiming::from_sja1000(btr);
    Ok(BitrateIndex::nearest(timing.bitrate(SJA1000_CLOCK)))
}

#[cfg(test)]
mod tests;
