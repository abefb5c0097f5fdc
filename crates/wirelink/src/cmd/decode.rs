use std::fs;
use std::io::Read;

use wirelink_frame::Decoder;

use crate::cmd::DecodeArgs;
use crate::exit::{io_error, CliResult, SUCCESS};
use crate::output::{print_message, print_stats, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let capture = match &args.file {
        Some(path) => fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?,
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .map_err(|err| io_error("failed reading stdin", err))?;
            buf
        }
    };

    let mut decoder = Decoder::new();
    for message in decoder.feed(&capture) {
        print_message(&message, format);
    }

    if args.stats {
        print_stats(&decoder.stats(), format);
    }

    Ok(SUCCESS)
}
