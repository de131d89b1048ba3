//! Constants tied to the CAEN digitizer raw data format.

/// Samples are stored as f32 even though they are ADC units; the
/// CAENDigitizer library hands back floats and the producer keeps them.
pub const SAMPLE_SIZE_BYTES: usize = 4;

/// Record length the producer hardcodes into the digitizer.
pub const DEFAULT_RECORD_LENGTH: usize = 1024;

/// Upper bound accepted for `n_samples_per_waveform`. Far beyond any CAEN
/// record length, but small enough that a corrupted tag cannot drive the
/// block buffer allocation into the ground.
pub const MAX_RECORD_LENGTH: usize = 1 << 20;

/// Upper bound accepted for `number_of_DUTs`. A single digitizer has at most
/// 16 channels to distribute.
pub const MAX_DUTS: usize = 64;

/// Upper bound accepted for `sampling_frequency_MHz`.
pub const MAX_SAMPLING_FREQUENCY_MHZ: usize = 1_000_000;

/// Name under which the converter is registered with the factory. Must match
/// the sub-type string the producer stamps on every raw event.
pub const DT5748_NAME: &str = "CAEN_DT5748";

/// Sensor type reported on every plane of the standard event.
pub const SENSOR_TYPE: &str = "LGAD_CAEN";
