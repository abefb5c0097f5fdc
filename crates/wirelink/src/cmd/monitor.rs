use std::io::{ErrorKind, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use wirelink_channel::{LinkPort, DEFAULT_POLL_INTERVAL};
use wirelink_frame::Decoder;

use crate::cmd::MonitorArgs;
use crate::exit::{channel_error, io_error, CliError, CliResult, SUCCESS};
use crate::output::{print_message, OutputFormat};

pub fn run(args: MonitorArgs, format: OutputFormat) -> CliResult<i32> {
    let mut port =
        LinkPort::open(&args.port).map_err(|err| channel_error("open failed", err))?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut decoder = Decoder::new();
    let mut chunk = [0u8; 1024];
    let mut printed = 0usize;

    while running.load(Ordering::SeqCst) {
        let read = match port.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err)
                if err.kind() == ErrorKind::WouldBlock || err.kind() == ErrorKind::TimedOut =>
            {
                std::thread::sleep(DEFAULT_POLL_INTERVAL);
                continue;
            }
            Err(err) => return Err(io_error("read failed", err)),
        };

        for message in decoder.feed(&chunk[..read]) {
            print_message(&message, format);
            printed = printed.saturating_add(1);

            if let Some(count) = args.count {
                if printed >= count {
                    return Ok(SUCCESS);
                }
            }
        }
    }

    Ok(SUCCESS)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
