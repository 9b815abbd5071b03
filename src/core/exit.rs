use clap::error::ErrorKind;

pub const EXIT_SUCCESS: u8 = 0;

/// Invalid configuration or a fatal stage failure.
pub const EXIT_FAILURE: u8 = 1;

/// Every fatal stage passed but some endpoint's writes failed.
pub const EXIT_WRITE_FAILURE: u8 = 2;

/// Exit status for a command line rejected by the parser. Help and version
/// output is a successful run; anything else is invalid configuration.
pub fn usage_exit_status(err: &clap::Error) -> u8 {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => EXIT_SUCCESS,
        _ => EXIT_FAILURE,
    }
}
