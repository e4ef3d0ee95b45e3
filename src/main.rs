use anyhow::Context;
use fpi_radiance::image_pipeline::{
    synthetic, BayerPattern, DarkReference, RadianceReconstructor, RadianceWriter,
    ReconstructionConfig, StandardTiffWriter, TiffCompression, WriterConfig,
};
use fpi_radiance::logger;

use tracing::{error, info, warn};

const FRAMES: usize = 6;
const HEIGHT: usize = 400;
const WIDTH: usize = 400;

fn main() -> anyhow::Result<()> {
    logger::init();

    info!("Starting fpi_radiance...");

    let config = ReconstructionConfig::builder()
        .normalize_gain(true)
        .parallel(true)
        .build();
    let reconstructor = RadianceReconstructor::new(config);

    info!("Band order: {:?}", reconstructor.config().band_order);
    info!(
        "Gain normalization: {}",
        if reconstructor.config().normalize_gain {
            "enabled"
        } else {
            "disabled"
        }
    );

    let stack = synthetic::raw_stack(FRAMES, HEIGHT, WIDTH, BayerPattern::Rggb, [100, 200, 500], 10.0, 1.0)?;
    let calibration = synthetic::calibration(FRAMES, (450.0, 850.0))?;
    let dark = DarkReference::constant(WIDTH, HEIGHT, 16);

    let (result, timings) = match reconstructor.reconstruct_with_timings(&stack, Some(&dark), &calibration) {
        Ok(out) => out,
        Err(e) => {
            error!("Reconstruction failed: {}", e);
            return Err(e.into());
        }
    };
    timings.log_summary();

    for warning in &result.warnings {
        warn!("{}", warning);
    }
    for info in result.cube.infos() {
        info!(
            "band {:>2}: {:.1} nm (setpoint {}, peak {})",
            info.band, info.wavelength, info.setpoint, info.peak
        );
    }

    let writer_config = WriterConfig {
        compression: TiffCompression::DeflateFast,
        describe_bands: true,
    };
    let mut output = std::fs::File::create("radiance.tiff").context("creating radiance.tiff")?;
    StandardTiffWriter.write_cube(&result.cube, &mut output, &writer_config)?;
    info!("Wrote {} band(s) to radiance.tiff", result.cube.len());

    Ok(())
}
