use argh::FromArgs;
use std::{path::PathBuf, time::Instant};

use strata::{
    image::RasterBuffer,
    imgproc::operation::FilterOperation,
    io::functional as F,
};

const DEFAULT_WORKERS: usize = 4;

#[derive(FromArgs, Debug)]
/// Apply a gaussian blur or a kuwahara filter to an image
struct Args {
    /// the operation to apply: 'blur' or 'kuwahara'
    #[argh(positional)]
    operation: FilterOperation,

    /// path to the input image (png or jpeg)
    #[argh(positional)]
    input: PathBuf,

    /// path to the output image (png or jpeg)
    #[argh(positional)]
    output: PathBuf,

    /// the filter radius
    #[argh(option, default = "3")]
    radius: usize,

    /// number of worker threads, 0 uses all available cores
    #[argh(option, default = "DEFAULT_WORKERS")]
    workers: usize,
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let workers = match args.workers {
        0 => std::thread::available_parallelism()?.get(),
        n => n,
    };

    let start = Instant::now();
    let src = F::read_image_rgba8(&args.input)?;
    let load_time = start.elapsed();

    log::info!("Image loaded: {} pixels", src.size());
    log::info!("Load time: {}ms", load_time.as_millis());

    let start = Instant::now();
    let mut dst = RasterBuffer::from_size_val(src.size(), 0)?;
    log::info!(
        "Applying {} with radius {} using {} workers",
        args.operation,
        args.radius,
        workers
    );
    args.operation.apply(&src, &mut dst, args.radius, workers)?;
    let filter_time = start.elapsed();
    log::info!("Filter time: {}ms", filter_time.as_millis());

    let start = Instant::now();
    F::write_image(&args.output, &dst)?;
    let save_time = start.elapsed();

    log::info!("Save time: {}ms", save_time.as_millis());
    log::info!(
        "Total time: {}ms",
        (load_time + filter_time + save_time).as_millis()
    );

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Args = argh::from_env();
    run(&args)
}
