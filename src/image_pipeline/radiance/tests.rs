#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use crate::image_pipeline::calibration::{CalibrationEntry, CalibrationTable};
    use crate::image_pipeline::cfa::BayerPattern;
    use crate::image_pipeline::common::{ReconstructionError, ReconstructionWarning, Result};
    use crate::image_pipeline::debayer::{CpuDebayer, Debayer, RgbPlanes};
    use crate::image_pipeline::radiance::{
        BandOrder, RadianceReconstructor, ReconstructionConfig,
    };
    use crate::image_pipeline::raw::{DarkReference, FrameAttributes, RawFrame, RawFrameStack};
    use crate::image_pipeline::synthetic;

    const RGB: [u16; 3] = [1, 2, 5];

    /// Records every demosaic call and returns constant planes.
    struct MockDebayer {
        should_fail: bool,
        planes: [f64; 3],
        calls: Mutex<Vec<(usize, usize, BayerPattern)>>,
    }

    impl MockDebayer {
        fn new(planes: [f64; 3]) -> Self {
            Self {
                should_fail: false,
                planes,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl Debayer for MockDebayer {
        fn demosaic(
            &self,
            _samples: &[u16],
            width: usize,
            height: usize,
            pattern: BayerPattern,
        ) -> Result<RgbPlanes> {
            if self.should_fail {
                return Err(ReconstructionError::InvalidParameter("mock demosaic error".to_string()));
            }
            self.calls.lock().unwrap().push((width, height, pattern));
            Ok(RgbPlanes {
                width,
                height,
                planes: self.planes.map(|v| vec![v; width * height]),
            })
        }
    }

    fn sequential() -> ReconstructionConfig {
        ReconstructionConfig::builder().parallel(false).build()
    }

    fn assert_band_uniform(data: &[f64], value: f64) {
        for v in data {
            assert!((v - value).abs() < 1e-9, "{} != {}", v, value);
        }
    }

    #[test]
    fn test_config_builder() {
        let config = ReconstructionConfig::builder()
            .band_order(BandOrder::SetpointMajor)
            .normalize_gain(false)
            .parallel(false)
            .validate_dimensions(false)
            .max_dimension(Some(10000))
            .build();

        assert_eq!(config.band_order, BandOrder::SetpointMajor);
        assert!(!config.normalize_gain);
        assert!(!config.parallel);
        assert!(!config.validate_dimensions);
        assert_eq!(config.max_dimension, Some(10000));

        let default = ReconstructionConfig::default();
        assert_eq!(default.band_order, BandOrder::AscendingWavelength);
        assert!(default.normalize_gain);
    }

    #[test]
    fn test_synthetic_fixture_round_trip() {
        let exposure = 4.0;
        let stack = synthetic::raw_stack(3, 6, 6, BayerPattern::Rggb, RGB, exposure, 1.0).unwrap();
        let calibration = synthetic::calibration(3, (450.0, 850.0)).unwrap();
        let dark = DarkReference::constant(6, 6, 0);

        let result = RadianceReconstructor::new(ReconstructionConfig::default())
            .reconstruct(&stack, Some(&dark), &calibration)
            .unwrap();

        assert!(result.warnings.is_empty());
        assert_eq!(result.cube.shape(), (6, 6, 6));

        // Ascending wavelength interleaves setpoints peak by peak
        let order: Vec<(usize, usize)> = result.cube.infos().map(|i| (i.setpoint, i.peak)).collect();
        assert_eq!(order, vec![(0, 0), (1, 0), (2, 0), (1, 1), (2, 1), (2, 2)]);

        let expected = [5.0, 2.0, 1.0, 7.0, 6.0, 3.0];
        for (band, value) in result.cube.bands().iter().zip(expected) {
            assert_band_uniform(&band.data, value / exposure);
        }
        let bands: Vec<usize> = result.cube.infos().map(|i| i.band).collect();
        assert_eq!(bands, vec![1, 2, 3, 4, 5, 6]);

        let wavelengths = result.cube.wavelengths();
        assert!(wavelengths.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_setpoint_major_order() {
        let stack = synthetic::raw_stack(3, 4, 4, BayerPattern::Bggr, RGB, 1.0, 1.0).unwrap();
        let calibration = synthetic::calibration(3, (450.0, 850.0)).unwrap();
        let config = ReconstructionConfig::builder()
            .band_order(BandOrder::SetpointMajor)
            .build();

        let result = RadianceReconstructor::new(config)
            .reconstruct(&stack, None, &calibration)
            .unwrap();

        let expected = synthetic::expected_radiance(&calibration, RGB, 0, 1.0, 1.0);
        assert_eq!(result.cube.len(), expected.len());
        for (band, (setpoint, peak, value)) in result.cube.bands().iter().zip(expected) {
            assert_eq!((band.info.setpoint, band.info.peak), (setpoint, peak));
            assert_band_uniform(&band.data, value);
        }
    }

    #[test]
    fn test_dark_level_is_subtracted() {
        let stack = synthetic::raw_stack(6, 4, 6, BayerPattern::Grbg, RGB, 2.0, 1.0).unwrap();
        let calibration = synthetic::calibration(6, (400.0, 1000.0)).unwrap();
        let dark = DarkReference::constant(6, 4, 1);

        let result = RadianceReconstructor::new(
            ReconstructionConfig::builder().band_order(BandOrder::SetpointMajor).build(),
        )
        .reconstruct(&stack, Some(&dark), &calibration)
        .unwrap();

        assert!(result.warnings.is_empty());
        let expected = synthetic::expected_radiance(&calibration, RGB, 1, 2.0, 1.0);
        for (band, (_, _, value)) in result.cube.bands().iter().zip(expected) {
            assert_band_uniform(&band.data, value);
        }
    }

    #[test]
    fn test_band_count_matches_total_peaks() {
        for frames in 1..=7 {
            let stack = synthetic::raw_stack(frames, 4, 4, BayerPattern::Rggb, RGB, 1.0, 1.0).unwrap();
            let calibration = synthetic::calibration(frames, (400.0, 1000.0)).unwrap();
            let result = RadianceReconstructor::new(ReconstructionConfig::default())
                .reconstruct(&stack, None, &calibration)
                .unwrap();
            assert_eq!(result.cube.len(), calibration.total_peaks());
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut frames = Vec::new();
        for i in 0..5u16 {
            let data = (0..8 * 10).map(|p| (p as u16 * 37 + i * 101) % 4096).collect();
            frames.push(RawFrame {
                width: 10,
                height: 8,
                data,
                bits_per_sample: 12,
                exposure: 1.0 + i as f64,
                gain: 2.0,
                pattern: BayerPattern::Gbrg,
            });
        }
        let stack = RawFrameStack::new(frames.clone()).unwrap();
        let calibration = synthetic::calibration(5, (500.0, 900.0)).unwrap();
        let dark = DarkReference::constant(10, 8, 20);

        let parallel = RadianceReconstructor::new(ReconstructionConfig::default())
            .reconstruct(&stack, Some(&dark), &calibration)
            .unwrap();
        let serial = RadianceReconstructor::new(sequential())
            .reconstruct(&stack, Some(&dark), &calibration)
            .unwrap();
        let streamed = RadianceReconstructor::new(ReconstructionConfig::default())
            .reconstruct_frames(frames, Some(&dark), &calibration)
            .unwrap();

        assert_eq!(parallel.cube, serial.cube);
        assert_eq!(parallel.cube, streamed.cube);
        assert_eq!(parallel.warnings, serial.warnings);
        assert_eq!(parallel.warnings, streamed.warnings);
    }

    #[test]
    fn test_scaled_planes_scale_radiance() {
        let stack = synthetic::raw_stack(3, 4, 4, BayerPattern::Rggb, RGB, 1.0, 1.0).unwrap();
        let calibration = synthetic::calibration(3, (450.0, 850.0)).unwrap();

        let base = RadianceReconstructor::with_debayer(MockDebayer::new([1.0, 2.0, 5.0]), sequential())
            .reconstruct(&stack, None, &calibration)
            .unwrap();
        let scaled = RadianceReconstructor::with_debayer(MockDebayer::new([3.0, 6.0, 15.0]), sequential())
            .reconstruct(&stack, None, &calibration)
            .unwrap();

        for (b, s) in base.cube.to_array().iter().zip(scaled.cube.to_array()) {
            assert!((s - 3.0 * b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_gain_normalization_is_configurable() {
        let stack = synthetic::raw_stack(1, 4, 4, BayerPattern::Rggb, RGB, 2.0, 4.0).unwrap();
        let calibration = synthetic::calibration(1, (500.0, 500.0)).unwrap();

        let with_gain = RadianceReconstructor::new(sequential())
            .reconstruct(&stack, None, &calibration)
            .unwrap();
        assert_band_uniform(&with_gain.cube.bands()[0].data, 5.0 / 8.0);

        let without_gain = RadianceReconstructor::new(
            ReconstructionConfig::builder().normalize_gain(false).build(),
        )
        .reconstruct(&stack, None, &calibration)
        .unwrap();
        assert_band_uniform(&without_gain.cube.bands()[0].data, 5.0 / 2.0);
    }

    #[test]
    fn test_dark_underflow_clamps_and_warns() {
        let stack = synthetic::raw_stack(2, 4, 4, BayerPattern::Rggb, RGB, 1.0, 1.0).unwrap();
        let calibration = synthetic::calibration(2, (500.0, 700.0)).unwrap();
        // R samples (value 1) fall below a dark level of 2
        let dark = DarkReference::constant(4, 4, 2);

        let result = RadianceReconstructor::new(ReconstructionConfig::default())
            .reconstruct(&stack, Some(&dark), &calibration)
            .unwrap();

        assert_eq!(result.warnings.len(), 2);
        for (setpoint, warning) in result.warnings.iter().enumerate() {
            let ReconstructionWarning::NegativeSignal(w) = warning;
            assert_eq!(w.setpoint, setpoint);
            assert_eq!(w.clamped_pixels, 4);
        }
        assert!(result.cube.to_array().iter().all(|v| *v >= 0.0));
    }

    #[test]
    fn test_short_calibration_is_fatal() {
        let stack = synthetic::raw_stack(3, 4, 4, BayerPattern::Rggb, RGB, 1.0, 1.0).unwrap();
        let calibration = synthetic::calibration(2, (500.0, 700.0)).unwrap();
        let debayer = MockDebayer::new([1.0, 1.0, 1.0]);
        let reconstructor = RadianceReconstructor::with_debayer(debayer, ReconstructionConfig::default());

        let result = reconstructor.reconstruct(&stack, None, &calibration);
        assert!(matches!(
            result,
            Err(ReconstructionError::CalibrationIndex { index: 2, len: 2 })
        ));
        // Validation runs before any frame is touched
        assert!(reconstructor.debayer().calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_long_calibration_is_fatal() {
        let stack = synthetic::raw_stack(2, 4, 4, BayerPattern::Rggb, RGB, 1.0, 1.0).unwrap();
        let calibration = synthetic::calibration(3, (500.0, 700.0)).unwrap();
        let result = RadianceReconstructor::new(ReconstructionConfig::default())
            .reconstruct(&stack, None, &calibration);
        assert!(matches!(
            result,
            Err(ReconstructionError::FrameCountMismatch { frames: 2, entries: 3 })
        ));
    }

    #[test]
    fn test_dark_shape_mismatch_is_fatal() {
        let stack = synthetic::raw_stack(1, 4, 6, BayerPattern::Rggb, RGB, 1.0, 1.0).unwrap();
        let calibration = synthetic::calibration(1, (500.0, 500.0)).unwrap();
        let dark = DarkReference::constant(4, 4, 0);
        let result = RadianceReconstructor::new(ReconstructionConfig::default())
            .reconstruct(&stack, Some(&dark), &calibration);
        assert!(matches!(
            result,
            Err(ReconstructionError::ShapeMismatch { expected: (4, 6), found: (4, 4) })
        ));
    }

    #[test]
    fn test_streamed_frame_shape_mismatch_is_fatal() {
        let attrs = FrameAttributes { exposure: 1.0, gain: 1.0, pattern: BayerPattern::Rggb };
        let frame = |w: usize, h: usize| RawFrame {
            width: w,
            height: h,
            data: vec![0; w * h],
            bits_per_sample: 12,
            exposure: attrs.exposure,
            gain: attrs.gain,
            pattern: attrs.pattern,
        };
        let calibration = synthetic::calibration(2, (500.0, 700.0)).unwrap();
        let result = RadianceReconstructor::new(ReconstructionConfig::default())
            .reconstruct_frames(vec![frame(4, 4), frame(6, 4)], None, &calibration);
        assert!(matches!(result, Err(ReconstructionError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_non_positive_exposure_is_rejected() {
        let stack = synthetic::raw_stack(1, 4, 4, BayerPattern::Rggb, RGB, 0.0, 1.0).unwrap();
        let calibration = synthetic::calibration(1, (500.0, 500.0)).unwrap();
        let result = RadianceReconstructor::new(ReconstructionConfig::default())
            .reconstruct(&stack, None, &calibration);
        assert!(matches!(result, Err(ReconstructionError::InvalidParameter(_))));
    }

    #[test]
    fn test_dimension_validation_failure() {
        let stack = synthetic::raw_stack(1, 4, 40, BayerPattern::Rggb, RGB, 1.0, 1.0).unwrap();
        let calibration = synthetic::calibration(1, (500.0, 500.0)).unwrap();
        let config = ReconstructionConfig::builder().max_dimension(Some(32)).build();
        let result = RadianceReconstructor::new(config).reconstruct(&stack, None, &calibration);
        assert!(matches!(result, Err(ReconstructionError::InvalidDimensions(40, 4))));

        let config = ReconstructionConfig::builder().validate_dimensions(false).max_dimension(Some(32)).build();
        assert!(RadianceReconstructor::new(config).reconstruct(&stack, None, &calibration).is_ok());
    }

    #[test]
    fn test_debayer_failure_aborts() {
        let stack = synthetic::raw_stack(3, 4, 4, BayerPattern::Rggb, RGB, 1.0, 1.0).unwrap();
        let calibration = synthetic::calibration(3, (500.0, 700.0)).unwrap();
        let mut debayer = MockDebayer::new([1.0, 1.0, 1.0]);
        debayer.should_fail = true;
        let result = RadianceReconstructor::with_debayer(debayer, ReconstructionConfig::default())
            .reconstruct(&stack, None, &calibration);
        assert!(matches!(result, Err(ReconstructionError::InvalidParameter(_))));
    }

    #[test]
    fn test_patterns_reach_debayer() {
        let frames = [BayerPattern::Rggb, BayerPattern::Bggr]
            .into_iter()
            .map(|pattern| RawFrame {
                width: 4,
                height: 2,
                data: vec![0; 8],
                bits_per_sample: 12,
                exposure: 1.0,
                gain: 1.0,
                pattern,
            })
            .collect();
        let stack = RawFrameStack::new(frames).unwrap();
        let calibration = CalibrationTable::new(vec![
            CalibrationEntry::new(1, vec![600.0], vec![10.0], vec![vec![1.0, 0.0, 0.0]]).unwrap(),
            CalibrationEntry::new(1, vec![550.0], vec![10.0], vec![vec![0.0, 0.0, 1.0]]).unwrap(),
        ]);
        let reconstructor = RadianceReconstructor::with_debayer(MockDebayer::new([1.0, 2.0, 3.0]), sequential());

        let result = reconstructor.reconstruct(&stack, None, &calibration).unwrap();

        assert_eq!(
            *reconstructor.debayer().calls.lock().unwrap(),
            vec![(4, 2, BayerPattern::Rggb), (4, 2, BayerPattern::Bggr)]
        );
        assert_eq!(result.cube.wavelengths(), vec![550.0, 600.0]);
        assert_band_uniform(&result.cube.bands()[0].data, 3.0);
    }

    #[test]
    fn test_timings_cover_every_step() {
        let stack = synthetic::raw_stack(3, 4, 4, BayerPattern::Rggb, RGB, 1.0, 1.0).unwrap();
        let calibration = synthetic::calibration(3, (500.0, 700.0)).unwrap();
        let reconstructor = RadianceReconstructor::new(ReconstructionConfig::default());

        let (result, timings) = reconstructor
            .reconstruct_with_timings(&stack, None, &calibration)
            .unwrap();
        let plain = reconstructor.reconstruct(&stack, None, &calibration).unwrap();

        assert_eq!(result.cube, plain.cube);
        for step in ["validate", "dark_correction", "demosaic", "unmix", "concatenate"] {
            assert!(timings.get_step(step).is_some(), "missing step {}", step);
        }
    }

    fn flat_frame(width: usize, height: usize, value: u16, exposure: f64) -> RawFrame {
        RawFrame {
            width,
            height,
            data: vec![value; width * height],
            bits_per_sample: 12,
            exposure,
            gain: 1.0,
            pattern: BayerPattern::Rggb,
        }
    }

    #[test]
    fn test_process_frame_rejects_mismatched_dark() {
        let calibration = synthetic::calibration(1, (500.0, 500.0)).unwrap();
        let reconstructor =
            RadianceReconstructor::with_debayer(MockDebayer::new([1.0, 1.0, 1.0]), sequential());
        let frame = flat_frame(4, 4, 50, 1.0);
        let dark = DarkReference::constant(6, 4, 9);

        let result = reconstructor.process_frame(0, &frame, Some(&dark), calibration.entry(0).unwrap());
        assert!(matches!(
            result,
            Err(ReconstructionError::ShapeMismatch { expected: (4, 4), found: (4, 6) })
        ));
        assert!(reconstructor.debayer().calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_process_frame_rejects_zero_exposure() {
        let calibration = synthetic::calibration(1, (500.0, 500.0)).unwrap();
        let frame = flat_frame(4, 4, 50, 0.0);
        let result = RadianceReconstructor::new(sequential())
            .process_frame(0, &frame, None, calibration.entry(0).unwrap());
        assert!(matches!(result, Err(ReconstructionError::InvalidParameter(_))));
    }

    #[test]
    fn test_process_frame_matches_reconstruct() {
        let stack = synthetic::raw_stack(1, 4, 4, BayerPattern::Rggb, RGB, 2.0, 1.0).unwrap();
        let calibration = synthetic::calibration(1, (500.0, 500.0)).unwrap();
        let dark = DarkReference::constant(4, 4, 1);
        let reconstructor = RadianceReconstructor::new(sequential());

        let output = reconstructor
            .process_frame(0, &stack.frames()[0], Some(&dark), calibration.entry(0).unwrap())
            .unwrap();
        let whole = reconstructor.reconstruct(&stack, Some(&dark), &calibration).unwrap();

        assert!(output.warning.is_none());
        assert_eq!(output.bands.len(), 1);
        assert_eq!(output.bands[0].data, whole.cube.bands()[0].data);
        assert_band_uniform(&output.bands[0].data, 4.0 / 2.0);
    }

    #[test]
    fn test_samples_beyond_bit_depth_are_rejected() {
        let calibration = synthetic::calibration(1, (500.0, 500.0)).unwrap();
        let reconstructor = RadianceReconstructor::new(sequential());

        let frame = flat_frame(4, 4, 4096, 1.0);
        let result = reconstructor.process_frame(0, &frame, None, calibration.entry(0).unwrap());
        assert!(matches!(result, Err(ReconstructionError::InvalidParameter(_))));

        let stack = RawFrameStack::new(vec![frame]).unwrap();
        let result = reconstructor.reconstruct(&stack, None, &calibration);
        assert!(matches!(result, Err(ReconstructionError::InvalidParameter(_))));

        let frame = flat_frame(4, 4, 4095, 1.0);
        assert!(reconstructor
            .process_frame(0, &frame, None, calibration.entry(0).unwrap())
            .is_ok());
    }

    #[test]
    fn test_streamed_long_calibration_is_fatal() {
        let frames = vec![flat_frame(4, 4, 7, 1.0), flat_frame(4, 4, 7, 1.0)];
        let calibration = synthetic::calibration(3, (500.0, 700.0)).unwrap();
        let result = RadianceReconstructor::new(ReconstructionConfig::default())
            .reconstruct_frames(frames, None, &calibration);
        assert!(matches!(
            result,
            Err(ReconstructionError::FrameCountMismatch { frames: 2, entries: 3 })
        ));
    }

    #[test]
    fn test_streamed_short_calibration_is_fatal() {
        let frames = vec![flat_frame(4, 4, 7, 1.0); 3];
        let calibration = synthetic::calibration(2, (500.0, 700.0)).unwrap();
        let result = RadianceReconstructor::new(ReconstructionConfig::default())
            .reconstruct_frames(frames, None, &calibration);
        assert!(matches!(
            result,
            Err(ReconstructionError::CalibrationIndex { index: 2, len: 2 })
        ));
    }

    #[test]
    fn test_bayer_crate_backend_reconstruction() {
        let (h, w) = (8, 8);
        let stack = synthetic::raw_stack(3, h, w, BayerPattern::Grbg, RGB, 1.0, 1.0).unwrap();
        let calibration = synthetic::calibration(3, (450.0, 850.0)).unwrap();
        let config = ReconstructionConfig::builder()
            .band_order(BandOrder::SetpointMajor)
            .build();

        let result = RadianceReconstructor::with_debayer(CpuDebayer::new(), config)
            .reconstruct(&stack, None, &calibration)
            .unwrap();

        let expected = synthetic::expected_radiance(&calibration, RGB, 0, 1.0, 1.0);
        assert_eq!(result.cube.len(), expected.len());
        for (band, (setpoint, peak, value)) in result.cube.bands().iter().zip(expected) {
            assert_eq!((band.info.setpoint, band.info.peak), (setpoint, peak));
            // Only interior pixels; the two backends treat borders differently
            for y in 1..h - 1 {
                for x in 1..w - 1 {
                    assert!((band.data[y * w + x] - value).abs() < 1e-9);
                }
            }
        }
    }
}
