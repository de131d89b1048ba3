//! Mapping from DUT pixels to waveform positions in the raw data block.
//!
//! Every raw block is the concatenation of all acquired waveforms, one per
//! channel, in `channels_names_list` order. The map resolves, once per run,
//! where the waveform for a given channel (or a given DUT pixel) begins, so
//! the per-event code never touches channel names again.

use fxhash::FxHashMap;

use super::error::ChannelMapError;
use super::run_settings::RunSettings;

/// Per-run lookup table from channel name / DUT pixel to the sample offset
/// where the corresponding waveform starts inside a raw block.
#[derive(Debug, Clone, Default)]
pub struct ChannelMap {
    offsets: FxHashMap<String, usize>,
    /// waveform_position[n_dut][x][y] = sample offset of that pixel's waveform
    waveform_position: Vec<Vec<Vec<usize>>>,
}

impl ChannelMap {
    /// Build the map from parsed run settings.
    ///
    /// Fails if a DUT references a channel that was not recorded, or if the
    /// recorded channel list contains duplicates.
    pub fn from_settings(settings: &RunSettings) -> Result<Self, ChannelMapError> {
        let mut offsets = FxHashMap::default();
        for (index, name) in settings.channels_names_list.iter().enumerate() {
            let offset = index * settings.n_samples_per_waveform;
            if offsets.insert(name.clone(), offset).is_some() {
                return Err(ChannelMapError::DuplicateChannel(name.clone()));
            }
        }

        let mut waveform_position = Vec::with_capacity(settings.duts.len());
        for dut in settings.duts.iter() {
            let mut matrix = Vec::with_capacity(dut.size_x());
            for row in dut.channels.iter() {
                let mut offsets_row = Vec::with_capacity(row.len());
                for channel in row.iter() {
                    let offset = offsets.get(channel).ok_or_else(|| {
                        ChannelMapError::ChannelNotRecorded(channel.clone(), dut.name.clone())
                    })?;
                    offsets_row.push(*offset);
                }
                matrix.push(offsets_row);
            }
            waveform_position.push(matrix);
        }

        Ok(Self {
            offsets,
            waveform_position,
        })
    }

    /// Sample offset of a channel's waveform, by channel name
    pub fn channel_offset(&self, channel: &str) -> Option<usize> {
        self.offsets.get(channel).copied()
    }

    /// Sample offset of the waveform read out at pixel (x, y) of a DUT
    pub fn position(&self, n_dut: usize, x: usize, y: usize) -> Option<usize> {
        self.waveform_position
            .get(n_dut)
            .and_then(|matrix| matrix.get(x))
            .and_then(|row| row.get(y))
            .copied()
    }

    /// The full offset matrix of one DUT
    pub fn dut_positions(&self, n_dut: usize) -> Option<&Vec<Vec<usize>>> {
        self.waveform_position.get(n_dut)
    }

    pub fn n_duts(&self) -> usize {
        self.waveform_position.len()
    }
}
