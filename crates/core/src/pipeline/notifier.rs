/// Delivers user-facing alerts.
///
/// Keeps the session independent of how alerts are shown (a dialog, stderr,
/// a status bar), so each front end supplies its own.
pub trait Notifier: Send {
    fn alert(&mut self, message: &str);
}
