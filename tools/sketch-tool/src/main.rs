// Command-line driver for the digit sketchpad.
//
// Usage:
//   sketch-tool render-preset -o <output.bmp> [--guides]
//   sketch-tool render-response <response.json> -o <dir> [--scale <n>]
//   sketch-tool predict [--config <file.toml>] [--grid <grid.json>] [-o <dir>]
//   sketch-tool scores <p0> <p1> ...

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context};
use digit_sketch::classifier::{failure_message, parse_response, Prediction};
use digit_sketch::config::SketchConfig;
use digit_sketch::preset::digit_two;
use digit_sketch::scores::render_scores;
use digit_sketch::visualizer::{compose_grid_image, render_grid, render_layers};
use log::info;
use sketch_tool::{load_grid, save_image, upscale, ClassifierClient};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "render-preset" => cmd_render_preset(&args[2..]),
        "render-response" => cmd_render_response(&args[2..]),
        "predict" => cmd_predict(&args[2..]),
        "scores" => cmd_scores(&args[2..]),
        _ => {
            eprintln!("Unknown command: {}", args[1]);
            print_usage();
            process::exit(1);
        }
    };

    if let Err(err) = result {
        eprintln!("error: {:#}", err);
        process::exit(1);
    }
}

fn print_usage() {
    eprintln!("sketch-tool - digit sketchpad from the command line");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  render-preset -o <output.bmp|raw> [--guides]");
    eprintln!("      Render the built-in example digit.");
    eprintln!();
    eprintln!("  render-response <response.json> -o <dir> [--scale <n>]");
    eprintln!("      Print the scores of a saved classifier response and write its feature maps.");
    eprintln!();
    eprintln!("  predict [--config <file.toml>] [--grid <grid.json>] [-o <dir>]");
    eprintln!("      Send a grid (the example digit by default) to the classifier.");
    eprintln!();
    eprintln!("  scores <p0> <p1> ...");
    eprintln!("      Rank a probability vector.");
}

/// Pull `flag <value>` pairs and bare switches out of `args`.
struct Options {
    values: Vec<(String, String)>,
    switches: Vec<String>,
    positional: Vec<String>,
}

impl Options {
    fn parse(args: &[String], with_value: &[&str]) -> anyhow::Result<Self> {
        let mut opts = Self {
            values: Vec::new(),
            switches: Vec::new(),
            positional: Vec::new(),
        };
        let mut i = 0;
        while i < args.len() {
            let arg = &args[i];
            if with_value.contains(&arg.as_str()) {
                let value = args
                    .get(i + 1)
                    .with_context(|| format!("{} needs a value", arg))?;
                opts.values.push((arg.clone(), value.clone()));
                i += 2;
            } else if arg.starts_with("--") {
                opts.switches.push(arg.clone());
                i += 1;
            } else {
                opts.positional.push(arg.clone());
                i += 1;
            }
        }
        Ok(opts)
    }

    fn value(&self, flag: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(f, _)| f == flag)
            .map(|(_, v)| v.as_str())
    }

    fn switch(&self, flag: &str) -> bool {
        self.switches.iter().any(|s| s == flag)
    }
}

fn cmd_render_preset(args: &[String]) -> anyhow::Result<()> {
    let opts = Options::parse(args, &["-o"])?;
    let output = opts.value("-o").unwrap_or("preset.bmp");
    let grid = digit_two();
    let img = if opts.switch("--guides") {
        compose_grid_image(&grid)
    } else {
        render_grid(&grid)
    };
    save_image(Path::new(output), &img).with_context(|| format!("saving {}", output))?;
    println!("Saved: {}", output);
    Ok(())
}

fn write_feature_maps(prediction: &Prediction, dir: &Path, scale: u32) -> anyhow::Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    for (name, images) in render_layers(&prediction.layers) {
        for (i, img) in images.iter().enumerate() {
            let path = dir.join(format!("{}_{:02}.bmp", name, i + 1));
            save_image(&path, &upscale(img, scale))
                .with_context(|| format!("saving {}", path.display()))?;
        }
        info!("{}: {} maps written", name, images.len());
    }
    Ok(())
}

fn print_prediction(prediction: &Prediction) -> anyhow::Result<()> {
    print!("{}", prediction.ranking()?);
    if let Some(latency) = prediction.latency_text() {
        println!("{}", latency);
    }
    Ok(())
}

fn scale_option(opts: &Options) -> anyhow::Result<u32> {
    opts.value("--scale")
        .map(|s| s.parse().context("--scale must be a positive integer"))
        .transpose()
        .map(|s| s.unwrap_or(8))
}

fn cmd_render_response(args: &[String]) -> anyhow::Result<()> {
    let opts = Options::parse(args, &["-o", "--scale"])?;
    let Some(input) = opts.positional.first() else {
        bail!("Usage: sketch-tool render-response <response.json> -o <dir>");
    };
    let dir = PathBuf::from(opts.value("-o").unwrap_or("feature-maps"));
    let scale = scale_option(&opts)?;

    let body = fs::read_to_string(input).with_context(|| format!("reading {}", input))?;
    let config = SketchConfig::default();
    let prediction = parse_response(&body, &config.layer_names)
        .map_err(|e| anyhow::anyhow!(failure_message(&e)))?;

    print_prediction(&prediction)?;
    write_feature_maps(&prediction, &dir, scale)
}

fn cmd_predict(args: &[String]) -> anyhow::Result<()> {
    let opts = Options::parse(args, &["--config", "--grid", "-o", "--scale"])?;
    let config = match opts.value("--config") {
        Some(path) => {
            let text = fs::read_to_string(path).with_context(|| format!("reading {}", path))?;
            SketchConfig::from_toml_str(&text)?
        }
        None => SketchConfig::default(),
    };
    let grid = match opts.value("--grid") {
        Some(path) => load_grid(Path::new(path))?,
        None => digit_two(),
    };
    if grid.is_blank() {
        bail!("grid is blank; nothing to classify");
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;
    let client = ClassifierClient::new(&config)?;
    let prediction = runtime
        .block_on(client.classify(&grid))
        .map_err(|e| anyhow::anyhow!(failure_message(&e)))?;

    print_prediction(&prediction)?;
    if let Some(dir) = opts.value("-o") {
        write_feature_maps(&prediction, Path::new(dir), scale_option(&opts)?)?;
    }
    Ok(())
}

fn cmd_scores(args: &[String]) -> anyhow::Result<()> {
    let probabilities = args
        .iter()
        .map(|a| a.parse::<f64>().with_context(|| format!("not a number: {}", a)))
        .collect::<anyhow::Result<Vec<f64>>>()?;
    print!("{}", render_scores(&probabilities)?);
    Ok(())
}
