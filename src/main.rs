// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;
use std::process;

use pico_args::Arguments;

const HELP: &str = "\
svgflat replaces linear gradient fills with flat colors.

USAGE:
  svgflat [OPTIONS] <in-svg> <out-svg>  # from file to file
  svgflat [OPTIONS] <in-svg>            # from file to stdout
  svgflat [OPTIONS] <in-svg> -c         # from file to stdout
  svgflat [OPTIONS] - <out-svg>         # from stdin to file
  svgflat [OPTIONS] - -c                # from stdin to stdout

OPTIONS:
  -h, --help                        Prints help information
  -V, --version                     Prints version information
  -c                                Prints the output SVG to the stdout

  --strategy STRATEGY               Selects the gradient stop that provides
                                    the flat color
                                    [default: first] [possible values: first, last]
  --stroke                          Flattens 'stroke' references too
  --remove-gradients                Removes gradients that are no longer referenced
  --indent INDENT                   Rewrites the whole file using the specified
                                    XML nodes indent
                                    [values: none, 0, 1, 2, 3, 4, tabs]
                                    [default: keep the input formatting]
  --attrs-indent INDENT             Rewrites the whole file using the specified
                                    XML attributes indent
                                    [values: none, 0, 1, 2, 3, 4, tabs]
                                    [default: keep the input formatting]

  --quiet                           Disables warnings
  --verbose                         Prints each replacement

ARGS:
  <in-svg>                          Input file
  <out-svg>                         Output file
";

#[derive(Debug)]
struct Args {
    strategy: svgflat::ColorStrategy,
    stroke: bool,
    remove_gradients: bool,
    indent: Option<svgflat::Indent>,
    attrs_indent: Option<svgflat::Indent>,

    quiet: bool,
    verbose: bool,

    input: String,
    output: Option<String>,
}

fn collect_args() -> Result<Args, pico_args::Error> {
    let mut input = Arguments::from_env();

    if input.contains(["-h", "--help"]) {
        print!("{}", HELP);
        process::exit(0);
    }

    if input.contains(["-V", "--version"]) {
        println!("{}", env!("CARGO_PKG_VERSION"));
        process::exit(0);
    }

    let to_stdout = input.contains("-c");

    let args = Args {
        strategy: input.opt_value_from_str("--strategy")?.unwrap_or_default(),
        stroke: input.contains("--stroke"),
        remove_gradients: input.contains("--remove-gradients"),
        indent: input.opt_value_from_fn("--indent", parse_indent)?,
        attrs_indent: input.opt_value_from_fn("--attrs-indent", parse_indent)?,

        quiet: input.contains("--quiet"),
        verbose: input.contains("--verbose"),

        input: input.free_from_str()?,
        output: if to_stdout {
            None
        } else {
            input.opt_free_from_str()?
        },
    };

    let remaining = input.finish();
    if !remaining.is_empty() {
        eprintln!("Warning: unused arguments left: {:?}.", remaining);
    }

    Ok(args)
}

fn parse_indent(s: &str) -> Result<svgflat::Indent, String> {
    let indent = match s {
        "none" => svgflat::Indent::None,
        "0" => svgflat::Indent::Spaces(0),
        "1" => svgflat::Indent::Spaces(1),
        "2" => svgflat::Indent::Spaces(2),
        "3" => svgflat::Indent::Spaces(3),
        "4" => svgflat::Indent::Spaces(4),
        "tabs" => svgflat::Indent::Tabs,
        _ => return Err("invalid INDENT value".to_string()),
    };

    Ok(indent)
}

#[derive(Clone, PartialEq, Debug)]
enum InputFrom<'a> {
    Stdin,
    File(&'a str),
}

#[derive(Clone, PartialEq, Debug)]
enum OutputTo<'a> {
    Stdout,
    File(&'a str),
}

/// A process failure with its exit code.
#[derive(Debug)]
enum Failure {
    Other(String),
    NotFound(String),
    Parsing(svgflat::Error),
}

impl Failure {
    fn exit_code(&self) -> i32 {
        match self {
            Failure::Other(_) => 1,
            Failure::NotFound(_) => 2,
            Failure::Parsing(_) => 3,
        }
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Failure::Other(e) => write!(f, "{}", e),
            Failure::NotFound(path) => write!(f, "input file '{}' not found", path),
            Failure::Parsing(e) => write!(f, "{}", e),
        }
    }
}

fn main() {
    let args = match collect_args() {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Error: {}.", e);
            process::exit(1);
        }
    };

    if !args.quiet {
        if let Ok(()) = log::set_logger(&LOGGER) {
            if args.verbose {
                log::set_max_level(log::LevelFilter::Info);
            } else {
                log::set_max_level(log::LevelFilter::Warn);
            }
        }
    }

    if let Err(e) = process(args) {
        eprintln!("Error: {}.", e);
        process::exit(e.exit_code());
    }
}

fn process(args: Args) -> Result<(), Failure> {
    let in_svg = match args.input.as_str() {
        "-" => InputFrom::Stdin,
        path => InputFrom::File(path),
    };

    let out_svg = match args.output {
        Some(ref path) => OutputTo::File(path),
        None => OutputTo::Stdout,
    };

    let pretty = if args.indent.is_some() || args.attrs_indent.is_some() {
        let def = svgflat::WriterOptions::default();
        Some(svgflat::WriterOptions {
            indent: args.indent.unwrap_or(def.indent),
            attributes_indent: args.attrs_indent.unwrap_or(def.attributes_indent),
            ..def
        })
    } else {
        None
    };

    let opt = svgflat::Options {
        strategy: args.strategy,
        paint: if args.stroke {
            svgflat::PaintAttributes::FillAndStroke
        } else {
            svgflat::PaintAttributes::Fill
        },
        remove_gradients: args.remove_gradients,
        pretty,
    };

    let input_svg = match in_svg {
        InputFrom::Stdin => load_stdin(),
        InputFrom::File(path) => {
            if !Path::new(path).exists() {
                return Err(Failure::NotFound(path.to_string()));
            }

            std::fs::read(path).map_err(|e| Failure::Other(e.to_string()))
        }
    }?;

    // No output file must be created on a parsing error.
    let s = svgflat::flatten_data(&input_svg, &opt).map_err(Failure::Parsing)?;

    match out_svg {
        OutputTo::Stdout => {
            io::stdout()
                .write_all(s.as_bytes())
                .map_err(|_| Failure::Other("failed to write to the stdout".to_string()))?;
        }
        OutputTo::File(path) => {
            let mut f = File::create(path)
                .map_err(|_| Failure::Other("failed to create the output file".to_string()))?;
            f.write_all(s.as_bytes())
                .map_err(|_| Failure::Other("failed to write to the output file".to_string()))?;
        }
    }

    Ok(())
}

fn load_stdin() -> Result<Vec<u8>, Failure> {
    let mut buf = Vec::new();
    let stdin = io::stdin();
    let mut handle = stdin.lock();

    handle
        .read_to_end(&mut buf)
        .map_err(|_| Failure::Other("failed to read from stdin".to_string()))?;

    Ok(buf)
}

/// A simple stderr logger.
static LOGGER: SimpleLogger = SimpleLogger;
struct SimpleLogger;
impl log::Log for SimpleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            let target = if record.target().len() > 0 {
                record.target()
            } else {
                record.module_path().unwrap_or_default()
            };

            let line = record.line().unwrap_or(0);

            match record.level() {
                log::Level::Error => eprintln!("Error (in {}:{}): {}", target, line, record.args()),
                log::Level::Warn => eprintln!("Warning (in {}:{}): {}", target, line, record.args()),
                log::Level::Info => eprintln!("Info (in {}:{}): {}", target, line, record.args()),
                log::Level::Debug => eprintln!("Debug (in {}:{}): {}", target, line, record.args()),
                log::Level::Trace => eprintln!("Trace (in {}:{}): {}", target, line, record.args()),
            }
        }
    }

    fn flush(&self) {}
}
