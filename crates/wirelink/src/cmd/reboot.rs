use wirelink_command::CommandError;

use crate::cmd::{open_client, PortArgs};
use crate::exit::{command_error, CliResult, SUCCESS};
use crate::output::OutputFormat;

pub fn run(args: PortArgs, format: OutputFormat) -> CliResult<i32> {
    let mut client = open_client(&args)?;

    // The device may reset before the acknowledgement leaves its UART, so a
    // timeout here is a normal outcome, not a failure.
    let acknowledged = match client.reboot() {
        Ok(()) => true,
        Err(CommandError::Timeout(_)) => false,
        Err(err) => return Err(command_error("reboot failed", err)),
    };

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::json!({ "acknowledged": acknowledged }));
        }
        _ => {
            if acknowledged {
                println!("reboot acknowledged");
            } else {
                println!("reboot requested (device reset before acknowledging)");
            }
        }
    }

    Ok(SUCCESS)
}
