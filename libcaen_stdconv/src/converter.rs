//! The per-event conversion entry point.

use byteorder::{ByteOrder, LittleEndian};

use super::channel_map::ChannelMap;
use super::config::ConverterConfig;
use super::constants::SENSOR_TYPE;
use super::error::ConversionError;
use super::raw_event::RawEvent;
use super::run_settings::RunSettings;
use super::std_event::{StandardEvent, StandardPlane};
use super::waveform::Waveform;

/// The interface the host invokes through the converter factory.
///
/// Implementors keep per-run state between calls; the host feeds every event
/// of a run, BORE first, through the same converter instance.
pub trait StdEventConverter {
    /// Convert one raw event, appending any reconstructed planes to `std_event`
    fn converting(
        &mut self,
        raw: &RawEvent,
        std_event: &mut StandardEvent,
    ) -> Result<(), ConversionError>;
}

/// Converter for the CAEN DT5742 digitizer family.
///
/// The BORE carries the run configuration as tags; every event (the BORE
/// included) carries one raw block holding the little-endian f32 waveforms of
/// all acquired channels, concatenated in `channels_names_list` order. Each
/// DUT becomes one [`StandardPlane`] with the geometry of its channel matrix,
/// and each pixel whose waveform passes the hit threshold is pushed with its
/// charge and constant-fraction time.
#[derive(Debug, Default)]
pub struct Dt5742Converter {
    config: ConverterConfig,
    settings: Option<RunSettings>,
    map: Option<ChannelMap>,
}

impl Dt5742Converter {
    pub fn new(config: ConverterConfig) -> Self {
        Self {
            config,
            settings: None,
            map: None,
        }
    }

    pub fn run_settings(&self) -> Option<&RunSettings> {
        self.settings.as_ref()
    }

    pub fn channel_map(&self) -> Option<&ChannelMap> {
        self.map.as_ref()
    }

    pub fn is_initialized(&self) -> bool {
        self.settings.is_some()
    }

    /// Parse the BORE tags and rebuild the per-run state. A new BORE always
    /// wins over whatever run was active before.
    fn initialize(&mut self, bore: &RawEvent) -> Result<(), ConversionError> {
        let settings = RunSettings::from_bore(bore)?;
        let map = ChannelMap::from_settings(&settings)?;
        log::info!(
            "Run initialized: {} DUTs, {} channels, {} samples per waveform at {} MHz",
            settings.number_of_duts(),
            settings.channels_names_list.len(),
            settings.n_samples_per_waveform,
            settings.sampling_frequency_mhz
        );
        self.settings = Some(settings);
        self.map = Some(map);
        Ok(())
    }
}

impl StdEventConverter for Dt5742Converter {
    fn converting(
        &mut self,
        raw: &RawEvent,
        std_event: &mut StandardEvent,
    ) -> Result<(), ConversionError> {
        if raw.is_bore() {
            self.initialize(raw)?;
        }
        let settings = self.settings.as_ref().ok_or(ConversionError::NotInitialized)?;
        let map = self.map.as_ref().ok_or(ConversionError::NotInitialized)?;

        std_event.set_trigger_number(raw.trigger_number());

        let expected_size = settings.expected_block_size();
        let period_ns = settings.sample_period_ns();
        let n_samples = settings.n_samples_per_waveform;
        let mut samples = vec![0.0f32; settings.channels_names_list.len() * n_samples];

        for block_n in raw.block_num_list() {
            let Some(block) = raw.get_block(block_n) else {
                continue;
            };
            if block.len() != expected_size {
                return Err(ConversionError::BadBlockSize(
                    block_n,
                    block.len(),
                    expected_size,
                ));
            }
            LittleEndian::read_f32_into(block, &mut samples);

            for (n_dut, dut) in settings.duts.iter().enumerate() {
                let Some(positions) = map.dut_positions(n_dut) else {
                    continue;
                };
                let mut plane =
                    StandardPlane::new(n_dut as u32, SENSOR_TYPE, dut.size_x(), dut.size_y());
                for (x, row) in positions.iter().enumerate() {
                    for (y, offset) in row.iter().enumerate() {
                        let waveform =
                            Waveform::new(&samples[*offset..*offset + n_samples], period_ns);
                        if let Some(pulse) = waveform.analyze(&self.config) {
                            plane.push_pixel(x, y, pulse.charge, pulse.time_ns);
                        }
                    }
                }
                log::debug!(
                    "Block {}: DUT {:?} has {} hit pixel(s)",
                    block_n,
                    dut.name,
                    plane.hits().len()
                );
                std_event.add_plane(plane);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::waveform::Polarity;

    const N_SAMPLES: usize = 256;

    fn example_bore() -> RawEvent {
        let mut bore = RawEvent::new(0);
        bore.set_bore();
        bore.set_tag("n_samples_per_waveform", format!("{N_SAMPLES}"));
        bore.set_tag("sampling_frequency_MHz", "5000");
        bore.set_tag("number_of_DUTs", "2");
        bore.set_tag("channels_names_list", "['CH0', 'CH1', 'CH2', 'CH3']");
        bore.set_tag("DUT_0_name", "'DUT one'");
        bore.set_tag("DUT_0_channels_matrix", "[['CH0', 'CH1']]");
        bore.set_tag("DUT_0_n_channels", "2");
        bore.set_tag("DUT_1_name", "'DUT two'");
        bore.set_tag("DUT_1_channels_matrix", "[['CH3'], ['CH2']]");
        bore.set_tag("DUT_1_n_channels", "2");
        bore
    }

    /// Flat baseline with a triangular negative pulse around sample 130
    fn waveform_with_pulse() -> Vec<f32> {
        let mut samples = vec![100.0f32; N_SAMPLES];
        for n in 0..=10 {
            samples[120 + n] = 100.0 - 20.0 * n as f32;
            samples[140 - n] = 100.0 - 20.0 * n as f32;
        }
        samples
    }

    fn quiet_waveform() -> Vec<f32> {
        vec![100.0f32; N_SAMPLES]
    }

    fn make_block(channels: &[Vec<f32>]) -> Vec<u8> {
        let mut block = vec![0u8; channels.len() * N_SAMPLES * 4];
        let flat: Vec<f32> = channels.iter().flatten().copied().collect();
        LittleEndian::write_f32_into(&flat, &mut block);
        block
    }

    fn converter() -> Dt5742Converter {
        Dt5742Converter::new(ConverterConfig {
            polarity: Polarity::Negative,
            hit_threshold_adcu: 50.0,
            pedestal_window: 100,
            cfd_fraction: 0.2,
        })
    }

    #[test]
    fn test_bore_initializes_and_converts() {
        let mut bore = example_bore();
        bore.add_block(
            0,
            make_block(&[
                quiet_waveform(),
                waveform_with_pulse(), // CH1 -> DUT one pixel (0, 1)
                waveform_with_pulse(), // CH2 -> DUT two pixel (1, 0)
                quiet_waveform(),
            ]),
        );

        let mut conv = converter();
        let mut std_event = StandardEvent::new(0);
        conv.converting(&bore, &mut std_event).unwrap();

        assert!(conv.is_initialized());
        assert_eq!(std_event.planes().len(), 2);

        let plane0 = &std_event.planes()[0];
        assert_eq!(plane0.size(), (1, 2));
        assert_eq!(plane0.hits().len(), 1);
        assert_eq!((plane0.hits()[0].x, plane0.hits()[0].y), (0, 1));
        assert!(plane0.hits()[0].charge > 0.0);

        let plane1 = &std_event.planes()[1];
        assert_eq!(plane1.size(), (2, 1));
        assert_eq!(plane1.hits().len(), 1);
        assert_eq!((plane1.hits()[0].x, plane1.hits()[0].y), (1, 0));
    }

    #[test]
    fn test_bore_block_is_converted_like_data() {
        // The producer attaches the first trigger's waveforms to the BORE, so
        // a BORE with a block yields one plane per DUT even if nothing fired
        let mut bore = example_bore();
        bore.add_block(
            0,
            make_block(&[
                quiet_waveform(),
                quiet_waveform(),
                quiet_waveform(),
                quiet_waveform(),
            ]),
        );
        let mut conv = converter();
        let mut std_event = StandardEvent::new(0);
        conv.converting(&bore, &mut std_event).unwrap();
        assert_eq!(std_event.planes().len(), 2);
        assert!(std_event.planes().iter().all(|plane| plane.is_empty()));

        // A BORE without any block only initializes
        let mut conv = converter();
        let mut std_event = StandardEvent::new(0);
        conv.converting(&example_bore(), &mut std_event).unwrap();
        assert!(conv.is_initialized());
        assert!(std_event.planes().is_empty());
    }

    #[test]
    fn test_data_event_after_bore() {
        let mut conv = converter();
        let mut std_event = StandardEvent::new(0);
        conv.converting(&example_bore(), &mut std_event).unwrap();

        let mut event = RawEvent::new(7);
        event.add_block(
            7,
            make_block(&[
                quiet_waveform(),
                quiet_waveform(),
                quiet_waveform(),
                waveform_with_pulse(), // CH3 -> DUT two pixel (0, 0)
            ]),
        );
        let mut std_event = StandardEvent::new(0);
        conv.converting(&event, &mut std_event).unwrap();

        assert_eq!(std_event.trigger_number(), 7);
        assert!(std_event.planes()[0].is_empty());
        let hits = std_event.planes()[1].hits();
        assert_eq!(hits.len(), 1);
        assert_eq!((hits[0].x, hits[0].y), (0, 0));
        // Hit time comes from the constant-fraction crossing near sample 122
        assert!((hits[0].time_ns - 122.0 * 0.2).abs() < 0.5);
    }

    #[test]
    fn test_event_before_bore_fails() {
        let mut conv = converter();
        let mut event = RawEvent::new(0);
        event.add_block(0, vec![0u8; 16]);
        let mut std_event = StandardEvent::new(0);
        assert!(matches!(
            conv.converting(&event, &mut std_event),
            Err(ConversionError::NotInitialized)
        ));
    }

    #[test]
    fn test_bad_block_size() {
        let mut conv = converter();
        let mut std_event = StandardEvent::new(0);
        conv.converting(&example_bore(), &mut std_event).unwrap();

        let mut event = RawEvent::new(1);
        event.add_block(1, vec![0u8; 12]);
        assert!(matches!(
            conv.converting(&event, &mut StandardEvent::new(1)),
            Err(ConversionError::BadBlockSize(1, 12, expected)) if expected == 4 * N_SAMPLES * 4
        ));
    }

    #[test]
    fn test_new_bore_restarts_run() {
        let mut conv = converter();
        conv.converting(&example_bore(), &mut StandardEvent::new(0))
            .unwrap();

        // A fresh run with a different channel list
        let mut bore = RawEvent::new(0);
        bore.set_bore();
        bore.set_tag("n_samples_per_waveform", format!("{N_SAMPLES}"));
        bore.set_tag("sampling_frequency_MHz", "750");
        bore.set_tag("number_of_DUTs", "1");
        bore.set_tag("channels_names_list", "['CH6']");
        bore.set_tag("DUT_0_name", "'solo'");
        bore.set_tag("DUT_0_channels_matrix", "[['CH6']]");
        conv.converting(&bore, &mut StandardEvent::new(0)).unwrap();

        let settings = conv.run_settings().unwrap();
        assert_eq!(settings.number_of_duts(), 1);
        assert_eq!(settings.channels_names_list, vec!["CH6"]);
        assert_eq!(settings.sampling_frequency_mhz, 750);
    }
}
