use super::types::CountryCode;

/// Capabilities the surrounding program lends to a session.
///
/// A terminal front end prints messages; a sandboxed caller such as the web
/// bridge swallows them. Hosts are handed to [`super::Engine`] at
/// construction and never swapped afterwards.
pub trait Host {
    fn output(&self, message: &str);

    /// Guesses the save's country from its raw bytes. `None` lets the engine
    /// fall back to its default.
    fn resolve_country(&self, _save_bytes: &[u8]) -> Option<CountryCode> {
        None
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SilentHost;

impl Host for SilentHost {
    fn output(&self, _message: &str) {}
}
