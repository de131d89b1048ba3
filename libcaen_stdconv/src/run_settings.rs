//! Run configuration decoded from the beginning-of-run event.
//!
//! The producer ships the whole run configuration as tags on the BORE:
//!
//! ```text
//! n_samples_per_waveform   1024
//! sampling_frequency_MHz   5000
//! number_of_DUTs           2
//! channels_names_list      ['CH0', 'CH1', 'CH2', 'CH3']
//! DUT_0_name               'DUT one'
//! DUT_0_channels_matrix    [['CH0', 'CH1'], ['CH2', 'CH3']]
//! DUT_0_n_channels         4
//! ```
//!
//! `channels_names_list` is the order in which the waveforms are concatenated
//! inside every raw data block; each `DUT_n_channels_matrix` is the physical
//! x-by-y arrangement of those channels on the DUT.

use crate::constants::{MAX_DUTS, MAX_RECORD_LENGTH, MAX_SAMPLING_FREQUENCY_MHZ, SAMPLE_SIZE_BYTES};

use super::error::{RunSettingsError, TagError};
use super::raw_event::RawEvent;
use super::tags;

/// The channel arrangement of a single DUT.
#[derive(Debug, Clone, PartialEq)]
pub struct DutLayout {
    pub name: String,
    /// channels[x][y] is the channel name read out at that pixel.
    /// Guaranteed rectangular and non-empty after parsing.
    pub channels: Vec<Vec<String>>,
}

impl DutLayout {
    /// Number of pixel rows (the x dimension)
    pub fn size_x(&self) -> usize {
        self.channels.len()
    }

    /// Number of pixel columns (the y dimension); 0 for an empty matrix
    pub fn size_y(&self) -> usize {
        self.channels.first().map(|row| row.len()).unwrap_or(0)
    }

    pub fn n_channels(&self) -> usize {
        self.size_x() * self.size_y()
    }
}

/// All run metadata needed to decode a raw data block.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub n_samples_per_waveform: usize,
    pub sampling_frequency_mhz: usize,
    pub channels_names_list: Vec<String>,
    pub duts: Vec<DutLayout>,
}

fn require_tag<'a>(bore: &'a RawEvent, tag: &str) -> Result<&'a str, RunSettingsError> {
    bore.get_tag(tag)
        .ok_or_else(|| RunSettingsError::MissingTag(tag.to_string()))
}

fn get_usize(bore: &RawEvent, tag: &str) -> Result<usize, RunSettingsError> {
    let value = require_tag(bore, tag)?;
    let parsed =
        tags::parse_int(value).map_err(|e| RunSettingsError::BadTag(tag.to_string(), e))?;
    usize::try_from(parsed).map_err(|_| {
        RunSettingsError::BadTag(tag.to_string(), TagError::NotAnInteger(value.to_string()))
    })
}

/// Reject zero and absurdly large scalars before they size any allocation
fn get_bounded(bore: &RawEvent, tag: &str, max: usize) -> Result<usize, RunSettingsError> {
    let value = get_usize(bore, tag)?;
    if value == 0 || value > max {
        return Err(RunSettingsError::OutOfRange(tag.to_string(), value, max));
    }
    Ok(value)
}

impl RunSettings {
    /// Decode the run settings out of a BORE's tags.
    pub fn from_bore(bore: &RawEvent) -> Result<Self, RunSettingsError> {
        let n_samples_per_waveform =
            get_bounded(bore, "n_samples_per_waveform", MAX_RECORD_LENGTH)?;
        let sampling_frequency_mhz =
            get_bounded(bore, "sampling_frequency_MHz", MAX_SAMPLING_FREQUENCY_MHZ)?;
        let number_of_duts = get_bounded(bore, "number_of_DUTs", MAX_DUTS)?;

        let list_tag = "channels_names_list";
        let channels_names_list = tags::parse_string_list(require_tag(bore, list_tag)?)
            .map_err(|e| RunSettingsError::BadTag(list_tag.to_string(), e))?;

        let mut duts = Vec::with_capacity(number_of_duts);
        for n_dut in 0..number_of_duts {
            let name_tag = format!("DUT_{n_dut}_name");
            let name = tags::parse_string(require_tag(bore, &name_tag)?)
                .map_err(|e| RunSettingsError::BadTag(name_tag.clone(), e))?;

            let matrix_tag = format!("DUT_{n_dut}_channels_matrix");
            let channels = tags::parse_string_matrix(require_tag(bore, &matrix_tag)?)
                .map_err(|e| RunSettingsError::BadTag(matrix_tag.clone(), e))?;

            if channels.is_empty() || channels[0].is_empty() {
                return Err(RunSettingsError::EmptyMatrix(name));
            }
            if channels.iter().any(|row| row.len() != channels[0].len()) {
                return Err(RunSettingsError::RaggedMatrix(name));
            }

            let layout = DutLayout { name, channels };

            // The producer also writes the channel count; cross-check it when present
            let count_tag = format!("DUT_{n_dut}_n_channels");
            if let Some(value) = bore.get_tag(&count_tag) {
                let declared = tags::parse_int(value)
                    .map_err(|e| RunSettingsError::BadTag(count_tag.clone(), e))?;
                if declared != layout.n_channels() as i64 {
                    return Err(RunSettingsError::ChannelCountMismatch(
                        layout.name.clone(),
                        declared.max(0) as usize,
                        layout.n_channels(),
                    ));
                }
            }

            duts.push(layout);
        }

        Ok(Self {
            n_samples_per_waveform,
            sampling_frequency_mhz,
            channels_names_list,
            duts,
        })
    }

    pub fn number_of_duts(&self) -> usize {
        self.duts.len()
    }

    /// Size in bytes every raw data block must have for these settings
    pub fn expected_block_size(&self) -> usize {
        self.channels_names_list.len() * self.n_samples_per_waveform * SAMPLE_SIZE_BYTES
    }

    /// Sample period in nanoseconds
    pub fn sample_period_ns(&self) -> f64 {
        1000.0 / self.sampling_frequency_mhz as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example_bore() -> RawEvent {
        let mut bore = RawEvent::new(0);
        bore.set_bore();
        bore.set_tag("n_samples_per_waveform", "1024");
        bore.set_tag("sampling_frequency_MHz", "5000");
        bore.set_tag("number_of_DUTs", "2");
        bore.set_tag(
            "channels_names_list",
            "['CH0', 'CH1', 'CH2', 'CH3', 'CH4', 'CH5', 'CH6', 'CH7']",
        );
        bore.set_tag("DUT_0_name", "'DUT one'");
        bore.set_tag(
            "DUT_0_channels_matrix",
            "[['CH0', 'CH1'], ['CH2', 'CH3']]",
        );
        bore.set_tag("DUT_0_n_channels", "4");
        bore.set_tag("DUT_1_name", "'DUT two'");
        bore.set_tag(
            "DUT_1_channels_matrix",
            "[['CH4', 'CH5'], ['CH6', 'CH7']]",
        );
        bore.set_tag("DUT_1_n_channels", "4");
        bore
    }

    #[test]
    fn test_from_bore() {
        let settings = RunSettings::from_bore(&example_bore()).unwrap();
        assert_eq!(settings.n_samples_per_waveform, 1024);
        assert_eq!(settings.sampling_frequency_mhz, 5000);
        assert_eq!(settings.number_of_duts(), 2);
        assert_eq!(settings.channels_names_list.len(), 8);
        assert_eq!(settings.duts[0].name, "DUT one");
        assert_eq!(settings.duts[0].size_x(), 2);
        assert_eq!(settings.duts[0].size_y(), 2);
        assert_eq!(settings.duts[1].channels[1][0], "CH6");
        assert_eq!(settings.expected_block_size(), 8 * 1024 * 4);
        assert_eq!(settings.sample_period_ns(), 0.2);
    }

    #[test]
    fn test_missing_tag() {
        let mut bore = example_bore();
        bore.set_tag("number_of_DUTs", "3"); // No tags for DUT_2
        match RunSettings::from_bore(&bore) {
            Err(RunSettingsError::MissingTag(tag)) => assert_eq!(tag, "DUT_2_name"),
            other => panic!("expected MissingTag, got {other:?}"),
        }
    }

    #[test]
    fn test_ragged_matrix() {
        let mut bore = example_bore();
        bore.set_tag("DUT_1_channels_matrix", "[['CH4', 'CH5'], ['CH6']]");
        assert!(matches!(
            RunSettings::from_bore(&bore),
            Err(RunSettingsError::RaggedMatrix(name)) if name == "DUT two"
        ));
    }

    #[test]
    fn test_channel_count_mismatch() {
        let mut bore = example_bore();
        bore.set_tag("DUT_0_n_channels", "3");
        assert!(matches!(
            RunSettings::from_bore(&bore),
            Err(RunSettingsError::ChannelCountMismatch(_, 3, 4))
        ));
    }

    #[test]
    fn test_out_of_range_scalars() {
        // A corrupted tag must not size an allocation
        let mut bore = example_bore();
        bore.set_tag("n_samples_per_waveform", "1000000000000000000");
        assert!(matches!(
            RunSettings::from_bore(&bore),
            Err(RunSettingsError::OutOfRange(tag, _, _)) if tag == "n_samples_per_waveform"
        ));

        let mut bore = example_bore();
        bore.set_tag("number_of_DUTs", "1000000000000000000");
        assert!(matches!(
            RunSettings::from_bore(&bore),
            Err(RunSettingsError::OutOfRange(tag, _, _)) if tag == "number_of_DUTs"
        ));

        // Zero would divide the sample period and make empty waveforms
        let mut bore = example_bore();
        bore.set_tag("sampling_frequency_MHz", "0");
        assert!(matches!(
            RunSettings::from_bore(&bore),
            Err(RunSettingsError::OutOfRange(tag, 0, _)) if tag == "sampling_frequency_MHz"
        ));
        let mut bore = example_bore();
        bore.set_tag("n_samples_per_waveform", "0");
        assert!(RunSettings::from_bore(&bore).is_err());
    }

    #[test]
    fn test_empty_layout_has_zero_size() {
        let layout = DutLayout {
            name: "empty".to_string(),
            channels: Vec::new(),
        };
        assert_eq!(layout.size_x(), 0);
        assert_eq!(layout.size_y(), 0);
        assert_eq!(layout.n_channels(), 0);
    }

    #[test]
    fn test_bad_integer_tag() {
        let mut bore = example_bore();
        bore.set_tag("n_samples_per_waveform", "lots");
        assert!(matches!(
            RunSettings::from_bore(&bore),
            Err(RunSettingsError::BadTag(tag, _)) if tag == "n_samples_per_waveform"
        ));
    }
}
