use crate::cmd::{open_client, PortArgs};
use crate::exit::{command_error, CliResult, SUCCESS};
use crate::output::OutputFormat;

pub fn run(args: PortArgs, format: OutputFormat) -> CliResult<i32> {
    let mut client = open_client(&args)?;
    let uptime = client
        .uptime_ms()
        .map_err(|err| command_error("uptime query failed", err))?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::json!({ "uptime_ms": uptime }));
        }
        _ => println!("{uptime}"),
    }

    Ok(SUCCESS)
}
