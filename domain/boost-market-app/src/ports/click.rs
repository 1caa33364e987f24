use crate::domain::click::ClickEvent;

pub trait ClickSignalPort {
    /// Never blocks; a lost click is not an error for the caller.
    fn emit(&self, event: ClickEvent);
}
