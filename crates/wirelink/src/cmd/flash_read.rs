use crate::cmd::{open_client, FlashReadArgs};
use crate::exit::{command_error, CliResult, SUCCESS};
use crate::output::{hex_dump, print_raw, OutputFormat};

pub fn run(args: FlashReadArgs, format: OutputFormat) -> CliResult<i32> {
    let mut client = open_client(&args.port)?;
    let data = client
        .flash_read(args.addr, args.len)
        .map_err(|err| command_error("flash read failed", err))?;

    match format {
        OutputFormat::Raw => print_raw(data.as_ref()),
        OutputFormat::Json => {
            let hex: String = data.iter().map(|byte| format!("{byte:02x}")).collect();
            println!(
                "{}",
                serde_json::json!({
                    "addr": args.addr,
                    "len": data.len(),
                    "data": hex,
                })
            );
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            print!("{}", hex_dump(data.as_ref()));
        }
    }

    Ok(SUCCESS)
}
