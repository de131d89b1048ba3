//! # caen_stdconv
//!
//! caen_stdconv converts raw events recorded with a CAEN DT5742 family
//! digitizer into a standardized event representation for downstream
//! analysis. The digitizer producer ships every run's configuration as text
//! tags on the beginning-of-run event (BORE) and every trigger's waveforms as
//! one binary block; this crate parses the former once per run and decodes
//! the latter per event.
//!
//! ## How the data looks
//!
//! The BORE carries, among others, the tags
//!
//! ```text
//! n_samples_per_waveform   1024
//! sampling_frequency_MHz   5000
//! number_of_DUTs           2
//! channels_names_list      ['CH0', 'CH1', 'CH2', 'CH3']
//! DUT_0_name               'DUT one'
//! DUT_0_channels_matrix    [['CH0', 'CH1'], ['CH2', 'CH3']]
//! ```
//!
//! where the values are Python `repr` output. `channels_names_list` fixes the
//! order in which the waveforms are concatenated inside every raw block (one
//! little-endian f32 array of `n_samples_per_waveform` samples per channel),
//! and each `DUT_n_channels_matrix` describes which channel is bonded to
//! which pixel of that DUT.
//!
//! ## What the converter does
//!
//! For every data event (the BORE itself included, since it carries the first
//! trigger) the converter slices each DUT pixel's waveform out of the block,
//! estimates the baseline over a leading window, and if the peak amplitude
//! passes the configured threshold pushes the pixel into that DUT's plane
//! with its collected charge and constant-fraction hit time.
//!
//! ```
//! use libcaen_stdconv::converter::{Dt5742Converter, StdEventConverter};
//! use libcaen_stdconv::raw_event::RawEvent;
//! use libcaen_stdconv::std_event::StandardEvent;
//!
//! let mut bore = RawEvent::new(0);
//! bore.set_bore();
//! bore.set_tag("n_samples_per_waveform", "1024");
//! bore.set_tag("sampling_frequency_MHz", "5000");
//! bore.set_tag("number_of_DUTs", "1");
//! bore.set_tag("channels_names_list", "['CH0', 'CH1']");
//! bore.set_tag("DUT_0_name", "'my detector'");
//! bore.set_tag("DUT_0_channels_matrix", "[['CH0', 'CH1']]");
//!
//! let mut converter = Dt5742Converter::default();
//! let mut std_event = StandardEvent::new(0);
//! converter.converting(&bore, &mut std_event).unwrap();
//! assert!(converter.is_initialized());
//! ```
//!
//! Hosts that dispatch by digitizer id instead instantiate through
//! [`factory::ConverterFactory`], which registers this converter under the
//! same string hash the acquisition side uses.
//!
//! ## Configuration
//!
//! The analysis settings are a YAML file (see
//! [`config::ConverterConfig`]):
//!
//! ```yml
//! polarity: negative
//! hit_threshold_adcu: 50.0
//! pedestal_window: 100
//! cfd_fraction: 0.2
//! ```
//!
//! The `caen_stdconv_cli` binary can write a template config (`new`) and
//! print the decoded run settings and waveform position table out of a saved
//! set of BORE tags (`inspect`).
pub mod channel_map;
pub mod config;
pub mod constants;
pub mod converter;
pub mod error;
pub mod factory;
pub mod raw_event;
pub mod run_settings;
pub mod std_event;
pub mod tags;
pub mod waveform;
