use std::fmt;
use std::io;

use wirelink_channel::ChannelError;
use wirelink_command::CommandError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => FAILURE,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::NotFound => USAGE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn channel_error(context: &str, err: ChannelError) -> CliError {
    match err {
        ChannelError::Io(source) => io_error(context, source),
        ChannelError::Open { .. } => CliError::new(FAILURE, format!("{context}: {err}")),
        ChannelError::Closed => CliError::new(FAILURE, format!("{context}: {err}")),
    }
}

pub fn command_error(context: &str, err: CommandError) -> CliError {
    match err {
        CommandError::Io(source) => io_error(context, source),
        CommandError::Timeout(_) => CliError::new(TIMEOUT, format!("{context}: {err}")),
        CommandError::InvalidArgument(_) => CliError::new(USAGE, format!("{context}: {err}")),
        CommandError::ChannelClosed => CliError::new(FAILURE, format!("{context}: {err}")),
        CommandError::Device { .. } => CliError::new(FAILURE, format!("{context}: {err}")),
        CommandError::Frame(_)
        | CommandError::ShortRequest(_)
        | CommandError::ShortResponse(_)
        | CommandError::TruncatedPayload { .. }
        | CommandError::UnexpectedShape { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
    }
}
