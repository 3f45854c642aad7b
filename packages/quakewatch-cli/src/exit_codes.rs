pub const SUCCESS: i32 = 0;
/// Bad arguments, missing input file, or no port to monitor.
pub const INPUT_ERROR: i32 = 1;
/// The byte source could not be opened.
pub const SOURCE_ERROR: i32 = 2;
/// Output failure or a serial link lost mid-session.
pub const EXECUTION_ERROR: i32 = 3;
