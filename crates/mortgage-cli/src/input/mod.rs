pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Load typed input from `--input <file>` or, failing that, piped stdin.
/// Returns `None` when neither source supplied anything.
pub fn load<T: DeserializeOwned>(path: Option<&str>) -> Result<Option<T>, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return file::read_json(path).map(Some);
    }
    stdin::read_stdin()
}
