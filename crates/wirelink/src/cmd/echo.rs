use std::fs;

use crate::cmd::{open_client, EchoArgs};
use crate::exit::{command_error, CliError, CliResult, FAILURE, SUCCESS};
use crate::output::{payload_preview, print_raw, OutputFormat};

pub fn run(args: EchoArgs, format: OutputFormat) -> CliResult<i32> {
    let payload = resolve_payload(&args)?;
    let mut client = open_client(&args.port)?;

    let reply = client
        .echo(&payload)
        .map_err(|err| command_error("echo failed", err))?;

    if reply.as_ref() != payload.as_slice() {
        return Err(CliError::new(FAILURE, "echo reply does not match request"));
    }

    match format {
        OutputFormat::Raw => print_raw(reply.as_ref()),
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({
                "bytes": reply.len(),
                "payload": payload_preview(reply.as_ref()),
            })
        ),
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("echo ok ({} bytes)", reply.len());
        }
    }

    Ok(SUCCESS)
}

fn resolve_payload(args: &EchoArgs) -> CliResult<Vec<u8>> {
    if let Some(data) = &args.data {
        return Ok(data.as_bytes().to_vec());
    }
    if let Some(path) = &args.file {
        return fs::read(path).map_err(|err| {
            crate::exit::io_error(&format!("failed reading {}", path.display()), err)
        });
    }
    Ok(b"ping".to_vec())
}
