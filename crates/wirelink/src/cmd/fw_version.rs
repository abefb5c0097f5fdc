use crate::cmd::{open_client, PortArgs};
use crate::exit::{command_error, CliResult, SUCCESS};
use crate::output::OutputFormat;

pub fn run(args: PortArgs, format: OutputFormat) -> CliResult<i32> {
    let mut client = open_client(&args)?;
    let version = client
        .firmware_version()
        .map_err(|err| command_error("firmware version query failed", err))?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::json!({ "fw_version": version }));
        }
        _ => println!("{version}"),
    }

    Ok(SUCCESS)
}
